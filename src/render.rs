//! Text rendering for answers, sources and service responses.

use serde_json::Value;

use crate::models::{QueryResult, ResponseBody, SourceRef};

/// Scores are shown with fixed 3-decimal precision; missing scores show nothing.
pub fn format_score(score: Option<f64>) -> Option<String> {
    score.map(|s| format!("{:.3}", s))
}

/// `- {page} #{block_id} (score=0.912)`
pub fn render_source(source: &SourceRef) -> String {
    match format_score(source.score) {
        Some(score) => format!("- {} #{} (score={})", source.page, source.block_id, score),
        None => format!("- {} #{}", source.page, source.block_id),
    }
}

pub fn render_sources(sources: &[SourceRef]) -> String {
    sources
        .iter()
        .map(render_source)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Answer text followed by the source list.
///
/// When the service did not return a usable answer object, the raw body text
/// is shown in place of the answer.
pub fn render_answer(result: &QueryResult) -> String {
    let mut out = match (&result.raw, result.answer.is_empty()) {
        (Some(raw), true) => raw.clone(),
        _ => result.answer.clone(),
    };

    if !result.sources.is_empty() {
        if !out.is_empty() {
            out.push_str("\n\n");
        }
        out.push_str(&render_sources(&result.sources));
    }
    out
}

/// Notification text for an ingest response.
pub fn ingest_summary(body: &ResponseBody) -> String {
    match body {
        ResponseBody::Json(value) => format!("Ingest: {}", value),
        ResponseBody::Raw(text) => format!("Ingest raw: {}", text),
    }
}

/// Error message for a failed query.
///
/// Prefers the body's `detail` field, then the whole body serialized.
pub fn error_message(body: &ResponseBody) -> String {
    match body {
        ResponseBody::Json(value) => match value.get("detail") {
            Some(Value::String(detail)) if !detail.is_empty() => detail.clone(),
            Some(detail) if is_truthy(detail) => detail.to_string(),
            _ => value.to_string(),
        },
        ResponseBody::Raw(text) => text.clone(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
