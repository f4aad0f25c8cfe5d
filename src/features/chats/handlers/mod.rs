pub mod chat_handler;

pub use chat_handler::{append_message, chat_entry, create_chat, list_chats, list_messages};
