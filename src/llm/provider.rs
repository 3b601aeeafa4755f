use async_trait::async_trait;

use crate::errors::VigilError;

/// Narrow capability interface for the generative-model service. The
/// analyzer's cascade only ever needs a prompt-to-text completion, so tests
/// can substitute a stub without a live model server.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Generate a completion for the prompt at the given sampling temperature.
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, VigilError>;

    /// Model identifier for audit tagging.
    fn model_name(&self) -> &str;
}
