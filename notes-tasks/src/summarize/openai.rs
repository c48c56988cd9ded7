use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{fallback_summary, Summarizer};

pub const SYSTEM_PROMPT: &str = "Summarize the following note in clear, concise bullet points.";
pub const QUOTA_EXCEEDED_SUMMARY: &str = "⚠️ AI summary temporarily unavailable (quota exceeded). Try again later.";
pub const EMPTY_SUMMARY: &str = "AI did not return a summary.";

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),
    #[error("provider responded {status}: {message}")]
    Api { status: u16, message: String },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl ProviderError {
    fn from_response(status: u16, body: &str) -> Self {
        let Ok(ApiErrorBody { error }) = serde_json::from_str::<ApiErrorBody>(body) else {
            return Self::Api {
                status,
                message: body.to_owned(),
            };
        };

        let quota = error.code.as_deref() == Some("insufficient_quota")
            || error.message.to_lowercase().contains("quota");

        if quota {
            Self::QuotaExceeded(error.message)
        } else {
            Self::Api {
                status,
                message: error.message,
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    code: Option<String>,
}

pub struct OpenAiSummarizer {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiSummarizer {
    pub fn new(client: Client, config: OpenAiConfig) -> Self {
        Self { client, config }
    }

    /// `Ok(None)` when the provider answered without any usable text.
    pub async fn complete(&self, content: &str) -> Result<Option<String>, ProviderError> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(&ChatRequest {
                model: &self.config.model,
                messages: [
                    ChatMessage {
                        role: "system",
                        content: SYSTEM_PROMPT,
                    },
                    ChatMessage { role: "user", content },
                ],
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(ProviderError::from_response(status.as_u16(), &body));
        }

        let summary = response
            .json::<ChatResponse>()
            .await?
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.trim().is_empty());

        Ok(summary)
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, content: &str) -> String {
        match self.complete(content).await {
            Ok(Some(summary)) => summary,
            Ok(None) => EMPTY_SUMMARY.to_owned(),
            Err(ProviderError::QuotaExceeded(message)) => {
                tracing::error!("summarization quota exceeded: {message}");
                QUOTA_EXCEEDED_SUMMARY.to_owned()
            }
            Err(error) => {
                tracing::error!("summarization failed: {error}");
                fallback_summary(content)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        http::{header::AUTHORIZATION, HeaderMap, StatusCode},
        routing::post,
        Router,
    };
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    use super::*;

    async fn serve(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}")
    }

    async fn provider(status: StatusCode, body: Value) -> String {
        serve(Router::new().route(
            "/chat/completions",
            post(move || {
                let body = body.clone();
                async move { (status, axum::Json(body)) }
            }),
        ))
        .await
    }

    fn summarizer(base_url: String) -> OpenAiSummarizer {
        OpenAiSummarizer::new(
            Client::new(),
            OpenAiConfig {
                api_key: "sk-test".into(),
                base_url,
                model: "gpt-test".into(),
            },
        )
    }

    fn completion(content: Value) -> Value {
        json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] })
    }

    #[tokio::test]
    async fn sends_model_prompt_and_key() {
        let base_url = serve(Router::new().route(
            "/chat/completions",
            post(|headers: HeaderMap, axum::Json(request): axum::Json<Value>| async move {
                let auth = headers
                    .get(AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_owned();
                let echo = format!(
                    "{auth}|{}|{}|{}",
                    request["model"].as_str().unwrap_or_default(),
                    request["messages"][0]["content"].as_str().unwrap_or_default(),
                    request["messages"][1]["content"].as_str().unwrap_or_default(),
                );
                axum::Json(completion(json!(echo)))
            }),
        ))
        .await;

        let summary = summarizer(base_url).summarize("my note").await;

        assert_eq!(summary, format!("Bearer sk-test|gpt-test|{SYSTEM_PROMPT}|my note"));
    }

    #[tokio::test]
    async fn returns_first_choice() {
        let base_url = provider(StatusCode::OK, completion(json!("- point one\n- point two"))).await;

        let summary = summarizer(base_url).summarize("content").await;

        assert_eq!(summary, "- point one\n- point two");
    }

    #[tokio::test]
    async fn empty_choices() {
        let base_url = provider(StatusCode::OK, json!({ "choices": [] })).await;

        let summary = summarizer(base_url).summarize("content").await;

        assert_eq!(summary, EMPTY_SUMMARY);
    }

    #[tokio::test]
    async fn quota_by_code() {
        let base_url = provider(
            StatusCode::TOO_MANY_REQUESTS,
            json!({ "error": { "message": "You exceeded your current plan.", "code": "insufficient_quota" } }),
        )
        .await;

        let summary = summarizer(base_url).summarize("content").await;

        assert_eq!(summary, QUOTA_EXCEEDED_SUMMARY);
    }

    #[tokio::test]
    async fn quota_by_message() {
        let base_url = provider(
            StatusCode::FORBIDDEN,
            json!({ "error": { "message": "Monthly Quota reached", "code": null } }),
        )
        .await;

        let summary = summarizer(base_url).summarize("content").await;

        assert_eq!(summary, QUOTA_EXCEEDED_SUMMARY);
    }

    #[tokio::test]
    async fn provider_error_falls_back() {
        let base_url = provider(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": { "message": "The server had an error", "code": "server_error" } }),
        )
        .await;

        let summary = summarizer(base_url).summarize("short note").await;

        assert_eq!(summary, "📝 Mock Summary (fallback): short note...");
    }

    #[tokio::test]
    async fn malformed_body_falls_back() {
        let base_url = provider(StatusCode::OK, json!(["not", "a", "completion"])).await;

        let summary = summarizer(base_url).summarize("short note").await;

        assert_eq!(summary, "📝 Mock Summary (fallback): short note...");
    }

    #[tokio::test]
    async fn unreachable_provider_falls_back() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let summary = summarizer(format!("http://{addr}")).summarize("short note").await;

        assert_eq!(summary, "📝 Mock Summary (fallback): short note...");
    }

    #[test]
    fn classifies_error_bodies() {
        assert!(matches!(
            ProviderError::from_response(429, r#"{"error":{"message":"x","code":"insufficient_quota"}}"#),
            ProviderError::QuotaExceeded(_)
        ));
        assert!(matches!(
            ProviderError::from_response(502, "<html>bad gateway</html>"),
            ProviderError::Api { status: 502, .. }
        ));
    }
}
