mod chat;
mod chat_image;
mod chat_message;

pub use chat::Chat;
pub use chat_image::ChatImage;
pub use chat_message::ChatMessage;
