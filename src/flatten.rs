//! Outline flattener.
//!
//! Turns a page's block forest into the ordered list of [`FlatRecord`]s
//! shipped to the ingest endpoint. Order is depth-first pre-order: a block
//! precedes all of its descendants and siblings keep their given order.
//! Every block yields exactly one record, whatever its text or shape.

use crate::models::{forest_len, FlatRecord, OutlineNode};

/// Flatten a forest of blocks belonging to `page_name`.
///
/// Pure and deterministic. Blocks with no text produce a record with an
/// empty `text`. An empty forest yields an empty list.
pub fn flatten(forest: &[OutlineNode], page_name: &str) -> Vec<FlatRecord> {
    let mut records = Vec::with_capacity(forest_len(forest));

    let mut stack: Vec<&OutlineNode> = forest.iter().rev().collect();
    while let Some(node) = stack.pop() {
        records.push(FlatRecord {
            page: page_name.to_string(),
            block_id: node.id.clone(),
            text: node.text.clone().unwrap_or_default(),
        });
        stack.extend(node.children.iter().rev());
    }

    records
}
