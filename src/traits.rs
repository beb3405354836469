//! Collaborator seams for the sync client.
//!
//! [`SyncClient`](crate::client::SyncClient) never reaches for a global host
//! handle. Everything it talks to is injected through the traits below:
//!
//! ```text
//! ┌──────────────────┐   ┌─────────────┐   ┌──────────────┐
//! │ OutlineProvider  │   │  Transport  │   │   Notifier   │
//! │ page blocks+name │   │ POST json   │   │ info/warn/err│
//! └────────┬─────────┘   └──────┬──────┘   └──────┬───────┘
//!          └────────────────────┼─────────────────┘
//!                               ▼
//!                          SyncClient
//! ```
//!
//! Built-in implementations: [`FileOutlineProvider`](crate::provider_fs::FileOutlineProvider),
//! [`HttpTransport`](crate::transport::HttpTransport) and
//! [`ConsoleNotifier`](crate::notify::ConsoleNotifier).

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::models::{CurrentPage, NotifyLevel, OutlineNode, TransportResponse};

// ═══════════════════════════════════════════════════════════════════════
// Outline Provider
// ═══════════════════════════════════════════════════════════════════════

/// Source of the page currently in front of the user.
///
/// # Example
///
/// ```rust
/// use anyhow::Result;
/// use async_trait::async_trait;
/// use outline_bridge::models::OutlineNode;
/// use outline_bridge::traits::OutlineProvider;
///
/// struct FixedPage(Vec<OutlineNode>);
///
/// #[async_trait]
/// impl OutlineProvider for FixedPage {
///     async fn current_outline(&self) -> Result<Option<Vec<OutlineNode>>> {
///         Ok(Some(self.0.clone()))
///     }
///     async fn current_page_name(&self) -> Result<Option<String>> {
///         Ok(Some("Fixed".to_string()))
///     }
/// }
/// ```
#[async_trait]
pub trait OutlineProvider: Send + Sync {
    /// Whether the provider can answer outline requests yet.
    ///
    /// Polled by [`Bridge::attach`](crate::bridge::Bridge::attach) before the
    /// bridge starts serving `reindex`.
    async fn is_ready(&self) -> bool {
        true
    }

    /// Top-level blocks of the current page.
    ///
    /// `Ok(None)` means there is no current page at all, which is distinct
    /// from a page with zero blocks (`Ok(Some(vec![]))`).
    async fn current_outline(&self) -> Result<Option<Vec<OutlineNode>>>;

    /// Display name of the current page, if known.
    async fn current_page_name(&self) -> Result<Option<String>>;

    /// Blocks and name of the current page, read together.
    ///
    /// This is what `reindex` calls. The default asks for the outline and
    /// then the name; providers that can read both at once should override it
    /// so the two never come from different versions of the page. A failure
    /// to name the page is logged and treated as an unnamed page.
    async fn current_page(&self) -> Result<Option<CurrentPage>> {
        let Some(blocks) = self.current_outline().await? else {
            return Ok(None);
        };
        let name = match self.current_page_name().await {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!(error = %format!("{:#}", e), "page name unavailable");
                None
            }
        };
        Ok(Some(CurrentPage { name, blocks }))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Notifier
// ═══════════════════════════════════════════════════════════════════════

/// Fire-and-forget user notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, level: NotifyLevel);
}

// ═══════════════════════════════════════════════════════════════════════
// Transport
// ═══════════════════════════════════════════════════════════════════════

/// One JSON request/response round trip.
///
/// Implementations return `Err` only when no response was produced
/// (connection refused, timeout, body read failure). Any HTTP status,
/// including 4xx and 5xx, is an `Ok` response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(&self, url: &str, body: &Value) -> Result<TransportResponse>;
}
