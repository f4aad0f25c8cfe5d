mod completion_dto;

pub use completion_dto::{ChatTurnDto, CompletionRequestDto, ModelSelectorDto};
