use async_trait::async_trait;
use eyre::Result;

use crate::cli::app::session::SessionState;
use crate::ollama_client::OllamaClient;

pub const SYSTEM_PROMPT: &str = "\
You are a helpful AI nutrition assistant. Provide detailed nutritional insights about food, recipes, and dietary information.
Respond comprehensively to queries about nutrition, ingredients, and health-related food topics.";

/// Seam for the completion model, so the shell and tests can swap backends.
#[async_trait]
pub trait CompletionBackend {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String>;
}

#[async_trait]
impl CompletionBackend for OllamaClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        Ok(self.generate(system, prompt).await?)
    }
}

/// Build the fixed context block sent with every conversational turn.
pub fn build_context(session: &SessionState, user_query: &str) -> String {
    format!(
        "Nutrition Context:\n\
         - Last Analyzed Food: {}\n\
         - Last Food Quantity: {} serving(s)\n\
         \n\
         User Query: {}\n\
         \n\
         Guidelines:\n\
         - Provide precise, scientifically-based nutrition advice\n\
         - Include specific nutritional values when possible\n\
         - Focus on health, diet, and food insights",
        session.last_analyzed_food.as_deref().unwrap_or("None"),
        session.last_food_quantity,
        user_query
    )
}

/// One blocking completion call per user turn. No retry, no streaming.
pub async fn generate_response(
    backend: &dyn CompletionBackend,
    session: &SessionState,
    user_query: &str,
) -> Result<String> {
    let context = build_context(session, user_query);
    backend.complete(SYSTEM_PROMPT, &context).await
}
