use utoipa::{Modify, OpenApi};

use crate::features::assistant::{dtos as assistant_dtos, handlers as assistant_handlers};
use crate::features::chats::{dtos as chats_dtos, handlers as chats_handlers};
use crate::shared::types::{ErrorResponse, MessageResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Chats
        chats_handlers::chat_handler::list_chats,
        chats_handlers::chat_handler::create_chat,
        chats_handlers::chat_handler::delete_chat,
        chats_handlers::chat_handler::update_chat_title,
        chats_handlers::chat_handler::list_messages,
        chats_handlers::chat_handler::append_message,
        // Assistant
        assistant_handlers::completion_handler::answer_question,
    ),
    components(schemas(
        MessageResponse,
        ErrorResponse,
        chats_dtos::ChatResponseDto,
        chats_dtos::CreateChatDto,
        chats_dtos::AppendMessageDto,
        chats_dtos::ImageInputDto,
        chats_dtos::ImageResponseDto,
        chats_dtos::MessageResponseDto,
        assistant_dtos::CompletionRequestDto,
        assistant_dtos::ModelSelectorDto,
        assistant_dtos::ChatTurnDto,
    )),
    tags(
        (name = "chats", description = "Conversation history management"),
        (name = "assistant", description = "AI provider routing")
    )
)]
pub struct ApiDoc;

/// Applies runtime swagger configuration to the generated document
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
