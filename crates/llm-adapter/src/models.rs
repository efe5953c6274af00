//! These models represent the vendor-neutral objects a caller exchanges with an adapter
//!
//! Each vendor speaks its own dialect for the same ideas:
//! - openai/azure/groq chat completion messages, tools and tool calls
//! - anthropic messages with typed content blocks and tool_use/tool_result blocks
//! - gemini contents made of parts, with function declarations and function calls
//!
//! Callers only ever build the normalized request types defined here and read the
//! normalized result. The vendor-native conversation history travels back and forth as
//! opaque json values, which must only be handed back to the adapter that produced them.
pub mod chat;
pub mod content;
pub mod speech;
pub mod tool;
