pub mod assistant;
pub mod chats;
