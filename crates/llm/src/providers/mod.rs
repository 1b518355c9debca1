//! Concrete embedding provider clients.

pub mod ollama;
pub mod openai;
pub mod trigram;

pub use ollama::OllamaClient;
pub use openai::OpenAiClient;
pub use trigram::TrigramClient;
