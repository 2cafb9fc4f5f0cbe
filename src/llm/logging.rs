//! Pre/post invocation logging around any LlmClient

use async_trait::async_trait;

use super::client::LlmClient;
use super::types::{CompletionRequest, CompletionResponse};
use crate::error::LlmError;

/// Longest slice of prompt/response text written to the log
const PREVIEW_CHARS: usize = 200;

/// Wraps a client and logs every request before it is sent and every
/// response (or error) after it returns.
pub struct LoggingClient<L: LlmClient> {
    inner: L,
    label: String,
}

impl<L: LlmClient> LoggingClient<L> {
    pub fn new(inner: L, label: impl Into<String>) -> Self {
        Self {
            inner,
            label: label.into(),
        }
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }
}

fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().count() > PREVIEW_CHARS {
        out.push_str("...");
    }
    out.replace('\n', "\\n")
}

#[async_trait]
impl<L: LlmClient> LlmClient for LoggingClient<L> {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        log::info!(
            "[{}] -> model={} tools={} prompt=\"{}\"",
            self.label,
            request.model.as_deref().unwrap_or(self.inner.model()),
            request.tools.len(),
            preview(request.last_user_message().unwrap_or(""))
        );

        match self.inner.complete(request).await {
            Ok(response) => {
                let tools: Vec<&str> = response.tool_calls.iter().map(|c| c.name.as_str()).collect();
                log::info!(
                    "[{}] <- stop={:?} tokens={} tool_calls={:?} text=\"{}\"",
                    self.label,
                    response.stop_reason,
                    response.usage.total(),
                    tools,
                    preview(&response.content)
                );
                Ok(response)
            }
            Err(e) => {
                log::warn!("[{}] <- error: {}", self.label, e);
                Err(e)
            }
        }
    }

    fn model(&self) -> &str {
        self.inner.model()
    }
}
