mod chat_dto;

pub use chat_dto::{
    AppendMessageDto, ChatResponseDto, CreateChatDto, ImageInputDto, ImageResponseDto,
    MessageResponseDto,
};
