//! Markdown outline parser.
//!
//! Reads pages written in the bullet-outline format used by outliner note
//! apps:
//!
//! ```text
//! title:: Rust Notes
//!
//! - Ownership
//!   id:: 6571e0b4-1c1d-4b8e-9b7e-3f1f0c2a9d10
//!   Every value has one owner.
//!     - Borrowing
//!       collapsed:: true
//! - Lifetimes
//! ```
//!
//! - A line starting with `- ` (after indentation) opens a block. Nesting is
//!   the indentation depth: one tab or two spaces per level.
//! - Other lines continue the previous block's text.
//! - `key:: value` lines are block properties and stay out of the text.
//!   `id::` supplies the block id.
//! - Properties before the first block are page properties; `title::` names
//!   the page. Other text before the first block is ignored.
//!
//! Blocks without an `id::` get a stable id derived from the page name and
//! the block's position, so re-reading an unchanged page yields the same ids.

use sha2::{Digest, Sha256};

use crate::models::OutlineNode;

/// Length of generated block ids, in hex characters.
const GENERATED_ID_LEN: usize = 32;

/// A parsed page: optional title property plus its block forest.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MarkdownPage {
    pub title: Option<String>,
    pub blocks: Vec<OutlineNode>,
}

struct OpenBlock {
    level: usize,
    /// Characters of leading whitespace before continuation text.
    content_indent: usize,
    lines: Vec<String>,
    node: OutlineNode,
}

impl OpenBlock {
    fn finish(mut self) -> OutlineNode {
        let text = self.lines.join("\n");
        self.node.text = Some(text.trim_end().to_string());
        self.node
    }
}

/// Parse `text` as an outline page named `page_name`.
pub fn parse_markdown_outline(page_name: &str, text: &str) -> MarkdownPage {
    let mut title = None;
    let mut roots: Vec<OutlineNode> = Vec::new();
    let mut stack: Vec<OpenBlock> = Vec::new();

    for line in text.lines() {
        let (level, indent_chars) = indentation(line);
        let body = &line[indent_chars..];

        if let Some(content) = bullet_content(body) {
            close_to_level(&mut stack, &mut roots, level);
            stack.push(OpenBlock {
                level,
                content_indent: indent_chars + 2,
                lines: vec![content.to_string()],
                node: OutlineNode::default(),
            });
            continue;
        }

        match stack.last_mut() {
            None => {
                if let Some((key, value)) = property(body) {
                    if key.eq_ignore_ascii_case("title") && !value.is_empty() {
                        title = Some(value.to_string());
                    }
                }
            }
            Some(open) => {
                if let Some((key, value)) = property(body) {
                    if key.eq_ignore_ascii_case("id") && !value.is_empty() {
                        open.node.id = value.to_string();
                    }
                    continue;
                }
                open.lines
                    .push(strip_indent(line, open.content_indent).to_string());
            }
        }
    }
    close_to_level(&mut stack, &mut roots, 0);

    for (index, root) in roots.iter_mut().enumerate() {
        assign_ids(page_name, root, &mut vec![index]);
    }

    MarkdownPage {
        title,
        blocks: roots,
    }
}

/// Pop open blocks at `level` or deeper, attaching each to its parent.
fn close_to_level(stack: &mut Vec<OpenBlock>, roots: &mut Vec<OutlineNode>, level: usize) {
    while stack.last().is_some_and(|open| open.level >= level) {
        let Some(open) = stack.pop() else { break };
        let node = open.finish();
        match stack.last_mut() {
            Some(parent) => parent.node.children.push(node),
            None => roots.push(node),
        }
    }
}

/// Nesting level and number of leading whitespace characters.
fn indentation(line: &str) -> (usize, usize) {
    let mut tabs = 0;
    let mut spaces = 0;
    let mut chars = 0;
    for c in line.chars() {
        match c {
            '\t' => tabs += 1,
            ' ' => spaces += 1,
            _ => break,
        }
        chars += 1;
    }
    (tabs + spaces / 2, chars)
}

fn bullet_content(body: &str) -> Option<&str> {
    if body == "-" {
        Some("")
    } else {
        body.strip_prefix("- ")
    }
}

/// `key:: value`, where key is a single word.
fn property(body: &str) -> Option<(&str, &str)> {
    let (key, value) = body.split_once("::")?;
    let key = key.trim();
    if key.is_empty() || key.contains(char::is_whitespace) {
        return None;
    }
    if !(value.is_empty() || value.starts_with(' ')) {
        return None;
    }
    Some((key, value.trim()))
}

fn strip_indent(line: &str, max: usize) -> &str {
    let skip = line
        .char_indices()
        .take(max)
        .take_while(|(_, c)| *c == ' ' || *c == '\t')
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    &line[skip..]
}

fn assign_ids(page_name: &str, node: &mut OutlineNode, path: &mut Vec<usize>) {
    if node.id.is_empty() {
        node.id = generated_id(page_name, path);
    }
    for (index, child) in node.children.iter_mut().enumerate() {
        path.push(index);
        assign_ids(page_name, child, path);
        path.pop();
    }
}

fn generated_id(page_name: &str, path: &[usize]) -> String {
    let position = path
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(".");
    let mut hasher = Sha256::new();
    hasher.update(page_name.as_bytes());
    hasher.update([0u8]);
    hasher.update(position.as_bytes());
    let mut id = hex::encode(hasher.finalize());
    id.truncate(GENERATED_ID_LEN);
    id
}
