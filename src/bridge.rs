//! Host-facing invocation surface.
//!
//! A [`Bridge`] exposes the two actions a host wires to its buttons or
//! commands: [`reindex`](Bridge::reindex) and [`ask`](Bridge::ask).
//!
//! [`Bridge::attach`] waits (boundedly) for the outline provider to become
//! ready. If it never does, the bridge comes up *detached*: the timeout is
//! logged, `reindex` turns into a logged no-op, and `ask` keeps working
//! because it never needed the provider.

use std::sync::Arc;

use crate::client::{ReindexOutcome, SyncClient};
use crate::config::ReadinessConfig;
use crate::error::BridgeError;
use crate::models::QueryResult;
use crate::readiness::{wait_with_config, Readiness};
use crate::traits::OutlineProvider;

pub struct Bridge {
    client: SyncClient,
    provider: Option<Arc<dyn OutlineProvider>>,
}

impl Bridge {
    /// Bridge attached to `provider` without waiting for readiness.
    pub fn new(client: SyncClient, provider: Arc<dyn OutlineProvider>) -> Self {
        Self {
            client,
            provider: Some(provider),
        }
    }

    /// Bridge with no outline provider; only `ask` is functional.
    pub fn detached(client: SyncClient) -> Self {
        Self {
            client,
            provider: None,
        }
    }

    pub async fn attach(
        client: SyncClient,
        provider: Arc<dyn OutlineProvider>,
        readiness: &ReadinessConfig,
    ) -> Self {
        let state = wait_with_config(|| provider.is_ready(), readiness).await;
        match state {
            Readiness::Ready { attempts } => {
                tracing::debug!(attempts, "outline provider ready");
                Self::new(client, provider)
            }
            Readiness::TimedOut { attempts } => {
                tracing::warn!(
                    attempts,
                    "outline provider not available after waiting; running detached"
                );
                Self::detached(client)
            }
        }
    }

    pub fn is_attached(&self) -> bool {
        self.provider.is_some()
    }

    pub fn client(&self) -> &SyncClient {
        &self.client
    }

    pub async fn reindex(&self) -> Result<ReindexOutcome, BridgeError> {
        match &self.provider {
            Some(provider) => self.client.reindex(provider.as_ref()).await,
            None => {
                tracing::warn!("outline provider not available: reindex skipped");
                Ok(ReindexOutcome::Skipped)
            }
        }
    }

    pub async fn ask(&self, question: &str) -> Result<QueryResult, BridgeError> {
        self.client.ask(question).await
    }
}
