//! LLM Client Layer - the model-invocation collaborator
//!
//! This module provides:
//! - Message types for LLM communication
//! - LlmClient trait for API abstraction
//! - AnthropicClient implementation
//! - MockLlmClient for scripted runs
//! - LoggingClient and RetryingClient decorators

pub mod anthropic;
pub mod client;
pub mod logging;
pub mod retry;
pub mod types;

pub use anthropic::{AnthropicClient, AnthropicConfig};
pub use client::{LlmClient, MockLlmClient};
pub use logging::LoggingClient;
pub use retry::{RetryPolicy, RetryingClient};
pub use types::{
    CompletionRequest, CompletionResponse, Message, MessageRole, StopReason, ToolCall, ToolDefinition, Usage,
};
