//! Sync client: the two end-to-end actions.
//!
//! - [`SyncClient::reindex`]: read the current page from an
//!   [`OutlineProvider`], flatten it, `POST {base}/ingest` the whole page as
//!   one JSON array, and report the service's reply through the [`Notifier`].
//! - [`SyncClient::ask`]: `POST {base}/query` a question and interpret the
//!   answer.
//!
//! Each call performs at most one round trip and ends in a terminal reported
//! state. Nothing is retried and no state is shared between calls apart from
//! the read-only base URL, so both actions may run concurrently.

use serde_json::Value;
use std::sync::Arc;

use crate::error::BridgeError;
use crate::flatten::flatten;
use crate::models::{
    IngestResponse, NotifyLevel, QueryRequest, QueryResult, ResponseBody, DEFAULT_TOP_K,
};
use crate::render::{error_message, ingest_summary};
use crate::traits::{Notifier, OutlineProvider, Transport};

/// Outcome of a `reindex` call that reached the service (or was skipped).
#[derive(Debug, Clone, PartialEq)]
pub enum ReindexOutcome {
    Ingested {
        page: String,
        records: usize,
        response: IngestResponse,
    },
    /// The bridge was not attached to an outline provider; nothing happened.
    Skipped,
}

pub struct SyncClient {
    base_url: String,
    top_k: usize,
    transport: Arc<dyn Transport>,
    notifier: Arc<dyn Notifier>,
}

impl SyncClient {
    /// `base_url` must already be normalized (no trailing slash).
    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn Transport>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            top_k: DEFAULT_TOP_K,
            transport,
            notifier,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Flatten the provider's current page and send it to the ingest endpoint.
    ///
    /// Every path notifies the user exactly once. No request is made when
    /// there is no current page or the page has no blocks.
    pub async fn reindex(
        &self,
        provider: &dyn OutlineProvider,
    ) -> Result<ReindexOutcome, BridgeError> {
        let result = self.try_reindex(provider).await;
        if let Err(err) = &result {
            tracing::warn!(error = %err, "reindex did not complete");
            self.notifier.notify(&err.to_string(), err.level());
        }
        result
    }

    async fn try_reindex(
        &self,
        provider: &dyn OutlineProvider,
    ) -> Result<ReindexOutcome, BridgeError> {
        let current = provider
            .current_page()
            .await
            .map_err(|e| BridgeError::Provider(format!("{:#}", e)))?
            .ok_or(BridgeError::NoContext)?;

        if current.blocks.is_empty() {
            return Err(BridgeError::EmptyDocument);
        }

        let page = current.label().to_string();
        let records = flatten(&current.blocks, &page);
        let count = records.len();
        let body =
            serde_json::to_value(&records).map_err(|e| BridgeError::Transport(e.to_string()))?;

        tracing::info!(page = %page, records = count, "ingesting page");
        let response = self
            .transport
            .post_json(&self.endpoint("ingest"), &body)
            .await
            .map_err(|e| BridgeError::Transport(format!("{:#}", e)))?;

        let response = IngestResponse::from_transport(&response);
        let level = if response.is_success() {
            NotifyLevel::Info
        } else {
            NotifyLevel::Warning
        };
        tracing::info!(status = response.status, json = response.body.is_json(), "ingest replied");
        self.notifier.notify(&ingest_summary(&response.body), level);

        Ok(ReindexOutcome::Ingested {
            page,
            records: count,
            response,
        })
    }

    /// Ask the query endpoint a question using the configured `top_k`.
    pub async fn ask(&self, question: &str) -> Result<QueryResult, BridgeError> {
        self.ask_with_top_k(question, self.top_k).await
    }

    /// Ask the query endpoint a question.
    ///
    /// A blank question is rejected without touching the network. Non-2xx
    /// replies become [`BridgeError::Remote`] carrying the body's `detail`
    /// (or the whole body); a 2xx reply that is not the expected JSON object
    /// still succeeds, with the text exposed in [`QueryResult::raw`].
    pub async fn ask_with_top_k(
        &self,
        question: &str,
        top_k: usize,
    ) -> Result<QueryResult, BridgeError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(BridgeError::Validation("Enter a question".to_string()));
        }

        let request = QueryRequest::new(question).with_top_k(top_k);
        let body: Value =
            serde_json::to_value(&request).map_err(|e| BridgeError::Transport(e.to_string()))?;

        tracing::info!(top_k, "querying service");
        let response = self
            .transport
            .post_json(&self.endpoint("query"), &body)
            .await
            .map_err(|e| BridgeError::Transport(format!("{:#}", e)))?;

        let parsed = ResponseBody::parse(&response.body);
        if !response.is_success() {
            tracing::warn!(status = response.status, "query rejected");
            return Err(BridgeError::Remote {
                status: response.status,
                message: error_message(&parsed),
            });
        }

        let result = QueryResult::from_body(&parsed);
        tracing::info!(sources = result.sources.len(), "query answered");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CurrentPage, OutlineNode, TransportResponse};
    use anyhow::Result;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct ScriptedTransport {
        reply: Option<TransportResponse>,
        calls: Mutex<Vec<(String, Value)>>,
    }

    impl ScriptedTransport {
        fn replying(status: u16, body: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Some(TransportResponse::new(status, body)),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: None,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(String, Value)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn post_json(&self, url: &str, body: &Value) -> Result<TransportResponse> {
            self.calls
                .lock()
                .unwrap()
                .push((url.to_string(), body.clone()));
            self.reply
                .clone()
                .ok_or_else(|| anyhow::anyhow!("connection refused"))
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        messages: Mutex<Vec<(String, NotifyLevel)>>,
    }

    impl RecordingNotifier {
        fn messages(&self) -> Vec<(String, NotifyLevel)> {
            self.messages.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, message: &str, level: NotifyLevel) {
            self.messages
                .lock()
                .unwrap()
                .push((message.to_string(), level));
        }
    }

    struct StaticProvider {
        blocks: Option<Vec<OutlineNode>>,
        name: Option<String>,
    }

    #[async_trait]
    impl OutlineProvider for StaticProvider {
        async fn current_outline(&self) -> Result<Option<Vec<OutlineNode>>> {
            Ok(self.blocks.clone())
        }
        async fn current_page_name(&self) -> Result<Option<String>> {
            Ok(self.name.clone())
        }
    }

    fn page(blocks: Vec<OutlineNode>) -> StaticProvider {
        StaticProvider {
            blocks: Some(blocks),
            name: Some("Rust".into()),
        }
    }

    fn client(
        transport: Arc<ScriptedTransport>,
    ) -> (SyncClient, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        let client = SyncClient::new("http://svc", transport, notifier.clone());
        (client, notifier)
    }

    #[tokio::test]
    async fn test_reindex_posts_flattened_page() {
        let transport = ScriptedTransport::replying(200, r#"{"ingested":3}"#);
        let (client, notifier) = client(transport.clone());
        let provider = page(vec![
            OutlineNode::new("a", "A").with_children(vec![OutlineNode::without_text("a1")]),
            OutlineNode::new("b", "B"),
        ]);

        let outcome = client.reindex(&provider).await.unwrap();

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "http://svc/ingest");
        assert_eq!(
            calls[0].1,
            json!([
                { "page": "Rust", "block_id": "a", "text": "A" },
                { "page": "Rust", "block_id": "a1", "text": "" },
                { "page": "Rust", "block_id": "b", "text": "B" }
            ])
        );
        match outcome {
            ReindexOutcome::Ingested { records, .. } => assert_eq!(records, 3),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(
            notifier.messages(),
            vec![(r#"Ingest: {"ingested":3}"#.to_string(), NotifyLevel::Info)]
        );
    }

    #[tokio::test]
    async fn test_reindex_empty_page_makes_no_request() {
        let transport = ScriptedTransport::replying(200, "{}");
        let (client, notifier) = client(transport.clone());

        let err = client.reindex(&page(vec![])).await.unwrap_err();

        assert_eq!(err, BridgeError::EmptyDocument);
        assert!(transport.calls().is_empty());
        assert_eq!(
            notifier.messages(),
            vec![(
                "No blocks found on current page".to_string(),
                NotifyLevel::Warning
            )]
        );
    }

    #[tokio::test]
    async fn test_reindex_without_page_context() {
        let transport = ScriptedTransport::replying(200, "{}");
        let (client, notifier) = client(transport.clone());
        let provider = StaticProvider {
            blocks: None,
            name: None,
        };

        let err = client.reindex(&provider).await.unwrap_err();

        assert_eq!(err, BridgeError::NoContext);
        assert!(transport.calls().is_empty());
        assert_eq!(notifier.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_reindex_unknown_page_name() {
        let transport = ScriptedTransport::replying(200, "{}");
        let (client, _) = client(transport.clone());
        let provider = StaticProvider {
            blocks: Some(vec![OutlineNode::new("a", "A")]),
            name: None,
        };

        client.reindex(&provider).await.unwrap();

        assert_eq!(transport.calls()[0].1[0]["page"], "Unknown");
    }

    /// Only answers whole-page reads; the piecewise getters must not be used.
    struct SnapshotProvider {
        reads: Mutex<usize>,
    }

    #[async_trait]
    impl OutlineProvider for SnapshotProvider {
        async fn current_outline(&self) -> Result<Option<Vec<OutlineNode>>> {
            anyhow::bail!("outline read separately")
        }
        async fn current_page_name(&self) -> Result<Option<String>> {
            anyhow::bail!("name read separately")
        }
        async fn current_page(&self) -> Result<Option<CurrentPage>> {
            *self.reads.lock().unwrap() += 1;
            Ok(Some(CurrentPage {
                name: Some("Snapshot".into()),
                blocks: vec![OutlineNode::new("s", "S")],
            }))
        }
    }

    #[tokio::test]
    async fn test_reindex_reads_page_once() {
        let transport = ScriptedTransport::replying(200, "{}");
        let (client, _) = client(transport.clone());
        let provider = SnapshotProvider {
            reads: Mutex::new(0),
        };

        client.reindex(&provider).await.unwrap();

        assert_eq!(*provider.reads.lock().unwrap(), 1);
        assert_eq!(
            transport.calls()[0].1,
            json!([{ "page": "Snapshot", "block_id": "s", "text": "S" }])
        );
    }

    #[tokio::test]
    async fn test_reindex_blank_page_name_is_unknown() {
        let transport = ScriptedTransport::replying(200, "{}");
        let (client, _) = client(transport.clone());
        let provider = StaticProvider {
            blocks: Some(vec![OutlineNode::new("a", "A")]),
            name: Some("   ".into()),
        };

        client.reindex(&provider).await.unwrap();

        assert_eq!(transport.calls()[0].1[0]["page"], "Unknown");
    }

    #[tokio::test]
    async fn test_reindex_raw_response_is_reported() {
        let transport = ScriptedTransport::replying(200, "accepted");
        let (client, notifier) = client(transport);

        let outcome = client
            .reindex(&page(vec![OutlineNode::new("a", "A")]))
            .await
            .unwrap();

        match outcome {
            ReindexOutcome::Ingested { response, .. } => {
                assert_eq!(response.body, ResponseBody::Raw("accepted".into()))
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(notifier.messages()[0].0, "Ingest raw: accepted");
    }

    #[tokio::test]
    async fn test_reindex_error_status_still_reports_body() {
        let transport = ScriptedTransport::replying(503, r#"{"detail":"busy"}"#);
        let (client, notifier) = client(transport);

        let outcome = client
            .reindex(&page(vec![OutlineNode::new("a", "A")]))
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            ReindexOutcome::Ingested { response, .. } if response.status == 503
        ));
        assert_eq!(
            notifier.messages(),
            vec![(r#"Ingest: {"detail":"busy"}"#.to_string(), NotifyLevel::Warning)]
        );
    }

    #[tokio::test]
    async fn test_reindex_transport_failure_is_reported() {
        let transport = ScriptedTransport::failing();
        let (client, notifier) = client(transport.clone());

        let err = client
            .reindex(&page(vec![OutlineNode::new("a", "A")]))
            .await
            .unwrap_err();

        assert!(matches!(err, BridgeError::Transport(_)));
        assert_eq!(transport.calls().len(), 1);
        let messages = notifier.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].1, NotifyLevel::Error);
        assert!(messages[0].0.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_ask_blank_question_makes_no_request() {
        let transport = ScriptedTransport::replying(200, "{}");
        let (client, _) = client(transport.clone());

        for question in ["", "   ", "\t\n"] {
            let err = client.ask(question).await.unwrap_err();
            assert_eq!(err, BridgeError::Validation("Enter a question".into()));
        }
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_ask_sends_trimmed_question_and_default_top_k() {
        let transport = ScriptedTransport::replying(200, r#"{"answer":"ok","sources":[]}"#);
        let (client, _) = client(transport.clone());

        client.ask("  what is X?  ").await.unwrap();

        let calls = transport.calls();
        assert_eq!(calls[0].0, "http://svc/query");
        assert_eq!(calls[0].1, json!({ "question": "what is X?", "top_k": 5 }));
    }

    #[tokio::test]
    async fn test_ask_with_top_k_override() {
        let transport = ScriptedTransport::replying(200, "{}");
        let (client, _) = client(transport.clone());

        client.ask_with_top_k("q", 12).await.unwrap();

        assert_eq!(transport.calls()[0].1["top_k"], 12);
    }

    #[tokio::test]
    async fn test_ask_parses_answer_and_sources() {
        let transport = ScriptedTransport::replying(
            200,
            r#"{"answer":"X is Y","sources":[{"page":"P","block_id":"b1","score":0.912}]}"#,
        );
        let (client, _) = client(transport);

        let result = client.ask("what is X?").await.unwrap();

        assert_eq!(result.answer, "X is Y");
        assert_eq!(result.sources.len(), 1);
        assert_eq!(result.sources[0].page, "P");
        assert_eq!(result.sources[0].block_id, "b1");
        assert_eq!(
            crate::render::format_score(result.sources[0].score).as_deref(),
            Some("0.912")
        );
    }

    #[tokio::test]
    async fn test_ask_remote_error_uses_detail() {
        let transport = ScriptedTransport::replying(500, r#"{"detail":"index unavailable"}"#);
        let (client, _) = client(transport);

        let err = client.ask("q").await.unwrap_err();

        assert_eq!(err.to_string(), "index unavailable");
        assert!(matches!(err, BridgeError::Remote { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_ask_non_json_success_exposes_raw_text() {
        let transport = ScriptedTransport::replying(200, "oops");
        let (client, _) = client(transport);

        let result = client.ask("q").await.unwrap();

        assert_eq!(result.raw.as_deref(), Some("oops"));
        assert!(result.answer.is_empty());
        assert!(result.sources.is_empty());
    }

    #[tokio::test]
    async fn test_ask_transport_failure() {
        let transport = ScriptedTransport::failing();
        let (client, notifier) = client(transport);

        let err = client.ask("q").await.unwrap_err();

        assert!(matches!(err, BridgeError::Transport(_)));
        assert!(notifier.messages().is_empty());
    }
}
