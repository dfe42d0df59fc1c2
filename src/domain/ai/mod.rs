pub mod client;
pub mod dto;
pub mod handler;
pub mod parser;
pub mod prompt;
pub mod service;
pub mod template;

pub use client::{AiClient, AiClientTrait, GeminiClient, GeminiConfig, SafetySettings};
pub use service::AiService;
