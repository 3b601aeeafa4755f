pub mod provider;
pub mod ollama;

pub use ollama::OllamaProvider;
pub use provider::CompletionProvider;
