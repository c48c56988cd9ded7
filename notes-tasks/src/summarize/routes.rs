use axum::extract::State;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    openapi::{
        aide::{
            axum::{routing::post, ApiRouter, IntoApiResponse},
            NoApi,
        },
        Json,
    },
    state::AppState,
};

use super::SharedSummarizer;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SummarizeRequest {
    /// Missing content is summarized as an empty note
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SummarizeResponse {
    pub summary: String,
}

pub fn router(state: AppState) -> ApiRouter {
    ApiRouter::new()
        .api_route("/api/summarize", post(summarize))
        .with_state(state)
}

async fn summarize(
    NoApi(State(summarizer)): NoApi<State<SharedSummarizer>>,
    Json(SummarizeRequest { content }): Json<SummarizeRequest>,
) -> impl IntoApiResponse {
    let summary = summarizer.summarize(&content).await;
    Json(SummarizeResponse { summary })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        db::init_test_db,
        errors::{ErrorResponse, Result},
        summarize::{MockSummarizer, SummarizeResponse},
        tests::test_server_with,
    };

    #[tokio::test]
    async fn summarize_counts_words() -> Result<()> {
        let server = test_server_with(init_test_db().await?, Arc::new(MockSummarizer::from_millis(0))).await?;

        let response = server
            .post("/api/summarize")
            .json(&json!({ "content": "one two three" }))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(
            response.json::<SummarizeResponse>().summary,
            "📝 Mock Summary: This note has 3 words. Looks good!"
        );
        Ok(())
    }

    #[tokio::test]
    async fn summarize_without_content() -> Result<()> {
        let server = test_server_with(init_test_db().await?, Arc::new(MockSummarizer::from_millis(0))).await?;

        let response = server.post("/api/summarize").json(&json!({})).await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert!(response.json::<SummarizeResponse>().summary.contains("0 words"));
        Ok(())
    }

    #[tokio::test]
    async fn summarize_rejects_non_json() -> Result<()> {
        let server = test_server_with(init_test_db().await?, Arc::new(MockSummarizer::from_millis(0))).await?;

        let response = server.post("/api/summarize").text("just text").await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<ErrorResponse>().error, "json_validation");
        Ok(())
    }
}
