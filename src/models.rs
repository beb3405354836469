//! Core data models used throughout Outline Bridge.
//!
//! These types represent the outline blocks read from a page, the flat
//! records shipped to the ingest endpoint, and the request/response shapes
//! of the query endpoint.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// Number of sources requested from the query endpoint unless overridden.
pub const DEFAULT_TOP_K: usize = 5;

/// Page name used when the provider cannot name the current page.
pub const UNKNOWN_PAGE: &str = "Unknown";

/// A single block in a page outline.
///
/// (De)serializes in the native shape (`id`, `text`, `children`). The app's
/// export shape is converted by the file provider. A missing or `null` text
/// stays `None` here and is normalized during flattening; missing or `null`
/// children become an empty list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OutlineNode {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: Some(text.into()),
            children: Vec::new(),
        }
    }

    /// A block whose text field is absent.
    pub fn without_text(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<OutlineNode>) -> Self {
        self.children = children;
        self
    }

    /// Number of blocks in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(OutlineNode::subtree_len).sum::<usize>()
    }
}

/// Total number of blocks in a forest.
pub fn forest_len(forest: &[OutlineNode]) -> usize {
    forest.iter().map(OutlineNode::subtree_len).sum()
}

/// Snapshot of the current page: its name (if known) and its blocks.
///
/// Read in one piece so the name and the blocks always describe the same
/// version of the page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CurrentPage {
    pub name: Option<String>,
    pub blocks: Vec<OutlineNode>,
}

impl CurrentPage {
    /// Name stamped on every record of this page: the page name, or
    /// [`UNKNOWN_PAGE`] when it is missing or blank.
    pub fn label(&self) -> &str {
        page_label(self.name.as_deref())
    }
}

/// `name` unless it is missing or blank, else [`UNKNOWN_PAGE`].
pub fn page_label(name: Option<&str>) -> &str {
    match name {
        Some(name) if !name.trim().is_empty() => name,
        _ => UNKNOWN_PAGE,
    }
}

/// One indexable text unit, derived from exactly one outline block.
///
/// Serializes with the ingest wire keys `page`, `block_id`, `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatRecord {
    pub page: String,
    pub block_id: String,
    pub text: String,
}

/// Body of `POST /query`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRequest {
    pub question: String,
    pub top_k: usize,
}

impl QueryRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
}

/// A cited source block in a query answer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SourceRef {
    #[serde(default)]
    pub page: String,
    #[serde(default)]
    pub block_id: String,
    /// Relevance score; `None` when absent or not a number.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub score: Option<f64>,
}

/// Parsed answer from `POST /query`.
///
/// `raw` carries the response text when the service answered with something
/// that is not the expected JSON object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub answer: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sources: Vec<SourceRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl QueryResult {
    /// Interpret a successful query response body.
    pub fn from_body(body: &ResponseBody) -> Self {
        match body {
            ResponseBody::Json(value) => {
                serde_json::from_value(value.clone()).unwrap_or_else(|_| Self {
                    raw: Some(value.to_string()),
                    ..Self::default()
                })
            }
            ResponseBody::Raw(text) => Self {
                raw: Some(text.clone()),
                ..Self::default()
            },
        }
    }
}

/// A response body, decoded as JSON when possible.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Raw(String),
}

impl ResponseBody {
    /// Decode response text. Never fails: text that is not JSON is kept raw.
    pub fn parse(text: &str) -> Self {
        match serde_json::from_str(text) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Raw(text.to_string()),
        }
    }

    /// JSON view of the body; raw text is wrapped as `{"raw": text}`.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Json(value) => value.clone(),
            Self::Raw(text) => json!({ "raw": text }),
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json(_))
    }
}

/// Status and raw body text of one HTTP exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Result of `POST /ingest`, passed through to the user uninterpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestResponse {
    pub status: u16,
    pub body: ResponseBody,
}

impl IngestResponse {
    pub fn from_transport(response: &TransportResponse) -> Self {
        Self {
            status: response.status,
            body: ResponseBody::parse(&response.body),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Severity of a user notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for NotifyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_f64()))
}
