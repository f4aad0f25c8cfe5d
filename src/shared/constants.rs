/// Methods accepted on the conversation resource, in the order the Allow
/// header reports them
pub const ALLOWED_CHAT_METHODS: [&str; 2] = ["DELETE", "PUT"];

/// Title length bounds enforced on create and update
pub const TITLE_MIN_CHARS: usize = 1;
pub const TITLE_MAX_CHARS: usize = 255;

/// Answer returned when an adapter produced no content
pub const FALLBACK_ANSWER: &str = "I am sorry. I can't find an answer to your question.";

/// Namespace value that disables context retrieval
pub const NAMESPACE_NONE: &str = "none";
