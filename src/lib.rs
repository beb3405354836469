//! # Outline Bridge
//!
//! A client-side bridge between a note-taking outline and a remote
//! retrieval service.
//!
//! Outline Bridge flattens a page's block tree into indexable records and
//! ships them to the service's ingest endpoint, and forwards free-text
//! questions to the service's query endpoint, rendering the answer with the
//! cited source blocks.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌───────────┐   ┌────────────┐   POST /ingest
//! │   Outline    │──▶│  Flatten  │──▶│ SyncClient │──────────────▶┐
//! │  Provider    │   │ (pre-ord) │   │            │               │ service
//! └──────────────┘   └───────────┘   │            │   POST /query │
//!                                    │            │◀─────────────▶┘
//!                                    └─────┬──────┘
//!                                          ▼
//!                                     ┌──────────┐
//!                                     │ Notifier │
//!                                     └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! obridge reindex ./pages/rust.md
//! obridge ask "what is ownership?"
//! obridge flatten ./pages/rust.md     # show the ingest payload only
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`flatten`] | Outline flattening |
//! | [`traits`] | Collaborator seams (provider, notifier, transport) |
//! | [`transport`] | reqwest-backed HTTP transport |
//! | [`client`] | `reindex` and `ask` |
//! | [`bridge`] | Host-facing invocation surface |
//! | [`readiness`] | Bounded availability polling |
//! | [`outline_md`] | Markdown outline parser |
//! | [`provider_fs`] | File-backed outline provider |
//! | [`render`] | Text rendering of answers and responses |

pub mod bridge;
pub mod client;
pub mod config;
pub mod error;
pub mod flatten;
pub mod logging;
pub mod models;
pub mod notify;
pub mod outline_md;
pub mod provider_fs;
pub mod readiness;
pub mod render;
pub mod traits;
pub mod transport;
