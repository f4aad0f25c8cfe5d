//! System-prompt composition for the provider adapters.
//!
//! Every adapter receives the same rendered system prompt: the caller's base
//! instruction, optionally followed by the context text fetched from the
//! vector store.

use minijinja::{context, Environment};
use std::sync::OnceLock;

static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

const SYSTEM_TEMPLATE_NAME: &str = "system";

const SYSTEM_TEMPLATE: &str = "\
{{ base_prompt }}
{%- if context %}

Use the following pieces of context to answer the question:
{{ context }}
{%- endif %}";

fn get_environment() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(|| {
        let mut env = Environment::new();
        env.add_template(SYSTEM_TEMPLATE_NAME, SYSTEM_TEMPLATE)
            .expect("system template is valid");
        env
    })
}

/// Render the system prompt. An empty context renders the base prompt alone.
pub fn render_system_prompt(base_prompt: &str, context: &str) -> String {
    let env = get_environment();
    let template = env
        .get_template(SYSTEM_TEMPLATE_NAME)
        .expect("system template is registered");

    template
        .render(context! { base_prompt => base_prompt, context => context })
        .unwrap_or_else(|e| {
            tracing::warn!("Failed to render system prompt: {}", e);
            base_prompt.to_string()
        })
}
