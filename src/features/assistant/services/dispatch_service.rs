use reqwest::Client;

use crate::core::config::AiConfig;
use crate::core::error::{AppError, Result};
use crate::features::assistant::clients::{
    embeddings, groq, openai, self_hosted, vector_store, WireMessage,
};
use crate::features::assistant::dtos::{ChatTurnDto, CompletionRequestDto};
use crate::shared::constants::{FALLBACK_ANSWER, NAMESPACE_NONE};
use crate::shared::prompts::render_system_prompt;

/// Closed set of provider routes. Each variant carries everything its
/// adapter needs, so configuration gaps surface during resolution rather
/// than mid-request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderRoute {
    OpenAi { api_key: String, model: String },
    Groq { api_key: String, model: String },
    HfSmall { url: String, model: String },
    HfLarge { url: String, model: String },
}

impl ProviderRoute {
    /// Resolve a category tag and model value against the configuration.
    /// Hosted categories never consult the self-hosted URLs.
    pub fn resolve(category: &str, model: &str, config: &AiConfig) -> Result<Self> {
        match category {
            "openai" => {
                let api_key = config.openai_api_key.clone().ok_or_else(|| {
                    AppError::Configuration("OPENAI_API_KEY is not set".to_string())
                })?;
                Ok(ProviderRoute::OpenAi {
                    api_key,
                    model: model.to_string(),
                })
            }
            "groq" => {
                let api_key = config.groq_api_key.clone().ok_or_else(|| {
                    AppError::Configuration("GROQ_API_KEY is not set".to_string())
                })?;
                Ok(ProviderRoute::Groq {
                    api_key,
                    model: model.to_string(),
                })
            }
            "hf-small" => {
                let base_url = config.hf_cpu_url.as_deref().ok_or_else(|| {
                    AppError::Configuration(format!(
                        "Url address for posting the data to {} is missing",
                        model
                    ))
                })?;
                Ok(ProviderRoute::HfSmall {
                    url: format!("{}/api/chat_cpu", base_url.trim_end_matches('/')),
                    model: model.to_string(),
                })
            }
            "hf-large" => {
                let base_url = config.hf_gpu_url.as_deref().ok_or_else(|| {
                    AppError::Configuration(format!(
                        "Url address for posting the data to {} is missing",
                        model
                    ))
                })?;
                Ok(ProviderRoute::HfLarge {
                    url: format!("{}/api/chat_gpu", base_url.trim_end_matches('/')),
                    model: model.to_string(),
                })
            }
            _ => Err(AppError::Upstream("Invalid model category".to_string())),
        }
    }
}

/// Service dispatching a chat question to exactly one provider adapter,
/// optionally augmenting the prompt with retrieved context first.
pub struct DispatchService {
    http: Client,
    config: AiConfig,
}

impl DispatchService {
    pub fn new(config: AiConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    /// Answer one question: validate, optionally fetch context, dispatch to
    /// the resolved adapter, and normalize the answer. No retries here;
    /// retry policy belongs to the adapters' backends.
    pub async fn answer(&self, request: CompletionRequestDto) -> Result<String> {
        let raw_question = request.question.as_deref().unwrap_or("").trim();
        if raw_question.is_empty() {
            return Err(AppError::BadRequest(
                "No question in the request".to_string(),
            ));
        }

        let selected = request
            .selected_model
            .as_ref()
            .filter(|m| m.value.as_deref().is_some_and(|v| !v.is_empty()))
            .ok_or_else(|| AppError::Upstream("Something went wrong".to_string()))?;
        let model = selected.value.as_deref().unwrap_or_default();

        let question = normalize_question(raw_question);

        // The raw question is embedded; normalization only affects the prompt
        let context = self
            .fetch_context(request.namespace.as_deref(), raw_question)
            .await?;

        let route = ProviderRoute::resolve(&selected.category, model, &self.config)?;

        let system_prompt = render_system_prompt(&request.base_prompt, &context);
        let messages = build_messages(&system_prompt, &request.chat_history, &question);

        let answer = match route {
            ProviderRoute::OpenAi { api_key, model } => {
                let config = openai::OpenAiCompatConfig {
                    api_key,
                    base_url: openai::OPENAI_BASE_URL.to_string(),
                };
                openai::chat_completion(&self.http, &config, &model, &messages).await?
            }
            ProviderRoute::Groq { api_key, model } => {
                groq::chat_completion(&self.http, &api_key, &model, &messages).await?
            }
            ProviderRoute::HfSmall { url, model } | ProviderRoute::HfLarge { url, model } => {
                self_hosted::chat(
                    &self.http,
                    &url,
                    &request.base_prompt,
                    &request.chat_history,
                    &question,
                    &context,
                    &model,
                )
                .await?
            }
        };

        Ok(finalize_answer(answer))
    }

    /// Fetch context for the question when a usable namespace is supplied.
    /// Absence of a namespace is not an error; the step is skipped entirely.
    async fn fetch_context(&self, namespace: Option<&str>, question: &str) -> Result<String> {
        let namespace = namespace.unwrap_or("").trim();
        if namespace.is_empty() || namespace == NAMESPACE_NONE {
            return Ok(String::new());
        }

        let api_key = self
            .config
            .openai_api_key
            .as_deref()
            .ok_or_else(|| AppError::Configuration("OPENAI_API_KEY is not set".to_string()))?;
        let store_url = self
            .config
            .vector_store_url
            .as_deref()
            .ok_or_else(|| AppError::Configuration("VECTOR_STORE_URL is not set".to_string()))?;
        let store_key = self.config.vector_store_api_key.as_deref().ok_or_else(|| {
            AppError::Configuration("VECTOR_STORE_API_KEY is not set".to_string())
        })?;

        let embedding =
            embeddings::embed(&self.http, api_key, &self.config.embedding_model, question).await?;

        vector_store::fetch_context(
            &self.http,
            store_url,
            store_key,
            &embedding,
            namespace,
            self.config.retrieval_top_k,
        )
        .await
    }
}

/// Collapse embedded newlines to spaces
fn normalize_question(question: &str) -> String {
    question.trim().replace("\r\n", " ").replace('\n', " ")
}

/// Assemble the wire conversation: system prompt, prior turns, then the
/// question. Turns with an empty side (the UI's greeting turn has no
/// question) contribute only the side they have.
fn build_messages(
    system_prompt: &str,
    history: &[ChatTurnDto],
    question: &str,
) -> Vec<WireMessage> {
    let mut messages = vec![WireMessage::system(system_prompt)];

    for turn in history {
        if !turn.question.is_empty() {
            messages.push(WireMessage::user(turn.question.clone()));
        }
        if !turn.answer.is_empty() {
            messages.push(WireMessage::assistant(turn.answer.clone()));
        }
    }

    messages.push(WireMessage::user(question));
    messages
}

/// Adapter text passes through verbatim; missing or empty content becomes
/// the fixed apology.
fn finalize_answer(answer: Option<String>) -> String {
    match answer {
        Some(text) if !text.is_empty() => text,
        _ => FALLBACK_ANSWER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::assistant::dtos::ModelSelectorDto;

    fn config_with_openai_key() -> AiConfig {
        AiConfig {
            openai_api_key: Some("sk-test".to_string()),
            ..AiConfig::empty()
        }
    }

    fn request(question: Option<&str>, category: &str, value: Option<&str>) -> CompletionRequestDto {
        CompletionRequestDto {
            base_prompt: "You are a helpful assistant.".to_string(),
            question: question.map(String::from),
            namespace: None,
            selected_model: Some(ModelSelectorDto {
                category: category.to_string(),
                value: value.map(String::from),
            }),
            chat_history: Vec::new(),
        }
    }

    #[test]
    fn openai_resolution_never_consults_self_hosted_urls() {
        // Both self-hosted URLs unset; the hosted category still resolves
        let route = ProviderRoute::resolve("openai", "gpt-4", &config_with_openai_key()).unwrap();
        assert_eq!(
            route,
            ProviderRoute::OpenAi {
                api_key: "sk-test".to_string(),
                model: "gpt-4".to_string(),
            }
        );
    }

    #[test]
    fn hosted_category_without_key_names_the_missing_value() {
        let err = ProviderRoute::resolve("openai", "gpt-4", &AiConfig::empty()).unwrap_err();
        assert!(matches!(
            err,
            AppError::Configuration(ref msg) if msg == "OPENAI_API_KEY is not set"
        ));

        let err = ProviderRoute::resolve("groq", "llama3-8b", &AiConfig::empty()).unwrap_err();
        assert!(matches!(
            err,
            AppError::Configuration(ref msg) if msg == "GROQ_API_KEY is not set"
        ));
    }

    #[test]
    fn self_hosted_without_url_fails_before_any_request() {
        for category in ["hf-small", "hf-large"] {
            let err = ProviderRoute::resolve(category, "flan-t5", &AiConfig::empty()).unwrap_err();
            assert!(matches!(
                err,
                AppError::Configuration(ref msg)
                    if msg == "Url address for posting the data to flan-t5 is missing"
            ));
        }
    }

    #[test]
    fn self_hosted_categories_resolve_to_their_endpoints() {
        let config = AiConfig {
            hf_cpu_url: Some("http://cpu-server:8000/".to_string()),
            hf_gpu_url: Some("http://gpu-server:8000".to_string()),
            ..AiConfig::empty()
        };

        let small = ProviderRoute::resolve("hf-small", "flan-t5", &config).unwrap();
        assert_eq!(
            small,
            ProviderRoute::HfSmall {
                url: "http://cpu-server:8000/api/chat_cpu".to_string(),
                model: "flan-t5".to_string(),
            }
        );

        let large = ProviderRoute::resolve("hf-large", "flan-ul2", &config).unwrap();
        assert_eq!(
            large,
            ProviderRoute::HfLarge {
                url: "http://gpu-server:8000/api/chat_gpu".to_string(),
                model: "flan-ul2".to_string(),
            }
        );
    }

    #[test]
    fn unrecognized_category_is_rejected() {
        let err = ProviderRoute::resolve("anthropic", "claude", &AiConfig::empty()).unwrap_err();
        assert!(matches!(
            err,
            AppError::Upstream(ref msg) if msg == "Invalid model category"
        ));
    }

    #[test]
    fn question_newlines_collapse_to_spaces() {
        assert_eq!(normalize_question("a\nb\nc"), "a b c");
        assert_eq!(normalize_question("  a\r\nb  "), "a b");
        assert_eq!(normalize_question("plain"), "plain");
    }

    #[test]
    fn messages_carry_system_history_then_question() {
        let history = vec![
            ChatTurnDto {
                question: String::new(),
                answer: "Hi, how can I assist you?".to_string(),
            },
            ChatTurnDto {
                question: "What is Rust?".to_string(),
                answer: "A systems language.".to_string(),
            },
        ];

        let messages = build_messages("system prompt", &history, "Who made it?");

        let roles: Vec<&str> = messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, ["system", "assistant", "user", "assistant", "user"]);
        assert_eq!(messages.first().unwrap().content, "system prompt");
        assert_eq!(messages.last().unwrap().content, "Who made it?");
    }

    #[test]
    fn answers_pass_through_verbatim_or_fall_back() {
        assert_eq!(
            finalize_answer(Some("  spaced answer  ".to_string())),
            "  spaced answer  "
        );
        assert_eq!(finalize_answer(Some(String::new())), FALLBACK_ANSWER);
        assert_eq!(finalize_answer(None), FALLBACK_ANSWER);
    }

    #[tokio::test]
    async fn missing_question_fails_before_anything_else() {
        let service = DispatchService::new(AiConfig::empty());

        for question in [None, Some(""), Some("   \n  ")] {
            let err = service
                .answer(request(question, "openai", Some("gpt-4")))
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                AppError::BadRequest(ref msg) if msg == "No question in the request"
            ));
        }
    }

    #[tokio::test]
    async fn missing_selector_value_is_a_generic_failure() {
        let service = DispatchService::new(AiConfig::empty());

        let mut no_selector = request(Some("hi"), "openai", Some("gpt-4"));
        no_selector.selected_model = None;
        let err = service.answer(no_selector).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Upstream(ref msg) if msg == "Something went wrong"
        ));

        let err = service
            .answer(request(Some("hi"), "openai", None))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Upstream(ref msg) if msg == "Something went wrong"
        ));
    }

    #[tokio::test]
    async fn self_hosted_without_url_fails_without_network() {
        let service = DispatchService::new(config_with_openai_key());

        let err = service
            .answer(request(Some("hi"), "hf-small", Some("flan-t5")))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Configuration(ref msg)
                if msg == "Url address for posting the data to flan-t5 is missing"
        ));
    }

    #[tokio::test]
    async fn absent_or_none_namespace_skips_retrieval() {
        // Retrieval config is entirely unset; if the namespace gate failed
        // to skip, these would error on missing configuration.
        let service = DispatchService::new(AiConfig::empty());

        for namespace in [None, Some(""), Some("none")] {
            let context = service.fetch_context(namespace, "question").await.unwrap();
            assert_eq!(context, "");
        }
    }

    #[tokio::test]
    async fn usable_namespace_requires_retrieval_config() {
        let service = DispatchService::new(AiConfig::empty());

        let err = service.fetch_context(Some("docs"), "question").await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Configuration(ref msg) if msg == "OPENAI_API_KEY is not set"
        ));
    }
}
