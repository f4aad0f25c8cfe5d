pub mod completion_handler;

pub use completion_handler::answer_question;
