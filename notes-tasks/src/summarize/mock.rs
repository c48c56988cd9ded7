use std::time::Duration;

use async_trait::async_trait;

use super::Summarizer;

pub struct MockSummarizer {
    delay: Duration,
}

impl MockSummarizer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_millis(delay_ms: u64) -> Self {
        Self::new(Duration::from_millis(delay_ms))
    }
}

pub fn mock_summary(content: &str) -> String {
    let words = content.split_whitespace().count();
    format!("📝 Mock Summary: This note has {words} words. Looks good!")
}

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(&self, content: &str) -> String {
        tokio::time::sleep(self.delay).await;
        mock_summary(content)
    }
}
