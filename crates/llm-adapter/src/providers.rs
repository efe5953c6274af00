pub mod anthropic;
pub mod base;
pub mod client;
pub mod configs;
pub mod factory;
pub mod google;
pub mod groq;
pub mod openai;
pub mod unsupported;
pub mod utils;

#[cfg(test)]
pub mod mock;
