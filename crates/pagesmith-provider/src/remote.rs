//! Remote chat-completion backend
//!
//! Speaks an OpenAI-style `/chat/completions` API. The generation path
//! extracts the HTML payload from the completion text (stripping a code
//! fence when the model adds one); the edit path requests a JSON object in
//! the [`EditBatch`] wire shape and degrades any shape failure to an empty
//! batch with a note.

use crate::backend::ContentBackend;
use crate::error::BackendError;
use async_trait::async_trait;
use pagesmith_patch::EditBatch;
use serde::Deserialize;
use std::time::Duration;

const GENERATE_SYSTEM_PROMPT: &str = "You are an expert frontend generator. \
Produce a single self-contained HTML5 document.\n\
- Include <head> with a viewport meta tag and a title\n\
- Keep all CSS in a <style> element and any JS inline\n\
- Compose sections based on the user's prompt\n\
- Avoid external images; use gradients or placeholders instead\n\
- The output MUST be one HTML file. Do not include explanations.";

const EDIT_SYSTEM_PROMPT: &str = "You are an HTML refinement assistant. \
Given a current HTML document and an instruction, propose a small set of \
targeted element replacements. Respond with a single JSON object of the \
shape {\"edits\": [{\"target\": {\"kind\": \"id\" | \"selector\", \
\"value\": string}, \"replacement\": string}], \"notes\": string}. Each \
replacement is a complete HTML fragment that replaces the targeted element \
entirely. Prefer id targets when the element has one. Do not include \
explanations outside the JSON object.";

/// Remote backend configuration, usually read from the environment.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    /// Bound on one round trip, so a hung backend cannot stall the
    /// caller's fallback indefinitely.
    pub request_timeout: Duration,
    /// Character budget for the document sent with an edit request.
    pub max_document_chars: usize,
}

impl RemoteConfig {
    /// Read configuration from `PAGESMITH_API_KEY`, `PAGESMITH_API_BASE`,
    /// `PAGESMITH_MODEL`, and `PAGESMITH_REQUEST_TIMEOUT_SECS`.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: std::env::var("PAGESMITH_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            base_url: std::env::var("PAGESMITH_API_BASE").unwrap_or(defaults.base_url),
            model: std::env::var("PAGESMITH_MODEL").unwrap_or(defaults.model),
            request_timeout: std::env::var("PAGESMITH_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map_or(defaults.request_timeout, Duration::from_secs),
            max_document_chars: defaults.max_document_chars,
        }
    }

    /// With an API key.
    #[inline]
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// With a base URL.
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            request_timeout: Duration::from_secs(30),
            max_document_chars: 60_000,
        }
    }
}

/// Chat-completion client implementing [`ContentBackend`].
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    config: RemoteConfig,
    http: reqwest::Client,
}

impl RemoteBackend {
    pub fn new(config: RemoteConfig) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| BackendError::Request {
                status: None,
                message: e.to_string(),
            })?;
        Ok(Self { config, http })
    }

    async fn complete(
        &self,
        system: &str,
        user: &str,
        json_mode: bool,
    ) -> Result<String, BackendError> {
        let Some(key) = self.config.api_key.as_deref().filter(|k| !k.is_empty()) else {
            return Err(BackendError::Unavailable);
        };

        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let mut body = serde_json::json!({
            "model": self.config.model,
            "temperature": 0.7,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
        });
        if json_mode {
            body["response_format"] = serde_json::json!({"type": "json_object"});
        }

        let response = self
            .http
            .post(&url)
            .bearer_auth(key)
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Request {
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Request {
                status: Some(status.as_u16()),
                message: upstream_message(&body, status.as_u16()),
            });
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| BackendError::Protocol(e.to_string()))?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| BackendError::Protocol("completion had no content".to_string()))
    }
}

#[async_trait]
impl ContentBackend for RemoteBackend {
    fn is_configured(&self) -> bool {
        self.config
            .api_key
            .as_deref()
            .is_some_and(|k| !k.is_empty())
    }

    async fn generate_document(&self, prompt: &str) -> Result<String, BackendError> {
        let user = format!("Prompt: {prompt}\n\nGenerate the complete HTML file.");
        let text = self.complete(GENERATE_SYSTEM_PROMPT, &user, false).await?;
        let html = extract_payload(&text);
        if html.is_empty() {
            return Err(BackendError::Protocol(
                "completion contained no document".to_string(),
            ));
        }
        Ok(html.to_string())
    }

    async fn propose_edits(
        &self,
        document: &str,
        instruction: &str,
    ) -> Result<EditBatch, BackendError> {
        let truncated = truncate_at_char_boundary(document, self.config.max_document_chars);
        let user = format!(
            "Current HTML document:\n{truncated}\n\nInstruction: {instruction}\n\n\
             Respond with the JSON object only."
        );
        let text = self.complete(EDIT_SYSTEM_PROMPT, &user, true).await?;
        let payload = extract_payload(&text);
        match serde_json::from_str::<EditBatch>(payload) {
            Ok(batch) => Ok(batch),
            Err(e) => {
                tracing::warn!(error = %e, "edit proposal did not match the batch shape");
                Ok(EditBatch::empty().with_note(format!("proposal was not a valid edit batch: {e}")))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Extract the useful payload from completion text: the body of the first
/// code fence when present, the whole (trimmed) text otherwise.
fn extract_payload(text: &str) -> &str {
    let trimmed = text.trim();
    if let Some(open) = trimmed.find("```") {
        let after = &trimmed[open + 3..];
        // Skip a language tag such as `html` or `json` on the fence line.
        let body_start = after.find('\n').map_or(0, |i| i + 1);
        let body = &after[body_start..];
        if let Some(close) = body.find("```") {
            return body[..close].trim();
        }
    }
    trimmed
}

/// Truncate to at most `max` bytes, never splitting a multi-byte character.
fn truncate_at_char_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// A short human-readable message for an upstream failure. Tries the
/// conventional `{"error": {"message": …}}` body; otherwise reports the
/// status without echoing the payload.
fn upstream_message(body: &str, status: u16) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: ErrorDetail,
    }
    #[derive(Deserialize)]
    struct ErrorDetail {
        message: String,
    }
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) if !parsed.error.message.is_empty() => parsed.error.message,
        _ => format!("upstream returned status {status}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_payload_extracted() {
        let text = "Here you go:\n```html\n<html><body>x</body></html>\n```\nEnjoy!";
        assert_eq!(extract_payload(text), "<html><body>x</body></html>");
    }

    #[test]
    fn fence_without_language_tag() {
        let text = "```\n{\"edits\": []}\n```";
        assert_eq!(extract_payload(text), "{\"edits\": []}");
    }

    #[test]
    fn unfenced_payload_used_whole() {
        assert_eq!(
            extract_payload("  <html></html>  "),
            "<html></html>"
        );
    }

    #[test]
    fn unterminated_fence_falls_back_to_whole_text() {
        let text = "```html\n<html></html>";
        assert_eq!(extract_payload(text), text.trim());
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let s = "héllo wörld";
        for max in 0..=s.len() {
            let t = truncate_at_char_boundary(s, max);
            assert!(t.len() <= max);
            assert!(s.starts_with(t));
        }
        assert_eq!(truncate_at_char_boundary(s, s.len() + 10), s);
    }

    #[test]
    fn unconfigured_backend_reports_so() {
        let backend = RemoteBackend::new(RemoteConfig::default()).expect("client should build");
        assert!(!backend.is_configured());

        let configured =
            RemoteBackend::new(RemoteConfig::default().with_api_key("k")).expect("should build");
        assert!(configured.is_configured());
    }

    #[tokio::test]
    async fn unconfigured_generate_fails_without_io() {
        let backend = RemoteBackend::new(RemoteConfig::default()).expect("client should build");
        let err = backend.generate_document("a site").await.unwrap_err();
        assert!(matches!(err, BackendError::Unavailable));
    }

    #[test]
    fn upstream_error_message_parsed() {
        let body = r#"{"error": {"message": "model overloaded"}}"#;
        assert_eq!(upstream_message(body, 503), "model overloaded");
        assert_eq!(
            upstream_message("<html>gateway</html>", 502),
            "upstream returned status 502"
        );
    }
}
