mod chat_service;

pub use chat_service::{ChatGraphRow, ChatService, DeletePlan};
