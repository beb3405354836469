//! File-backed outline provider.
//!
//! Serves the "current page" from disk, either a page file given by path or
//! a page looked up by name inside a graph directory. Two formats are read:
//!
//! - `.md`: bullet outlines, see [`outline_md`](crate::outline_md).
//! - `.json`: an array of block objects, or
//!   `{ "originalName" | "name": ..., "blocks": [...] }`. Block objects use
//!   either `id`/`text` or the app's export keys `uuid`/`content`, with
//!   optional `children`. In exports `id` is a numeric database key and
//!   `uuid` is the block id; collapsed children appear as `["uuid", ...]`
//!   references rather than objects and are skipped.
//!
//! A page file that does not exist means "no current page", not an error.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::models::{null_as_empty, CurrentPage, OutlineNode};
use crate::outline_md::parse_markdown_outline;
use crate::traits::OutlineProvider;

/// Where the current page comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum PageSource {
    File(PathBuf),
    Named { graph_dir: PathBuf, name: String },
}

#[derive(Debug, Clone)]
pub struct FileOutlineProvider {
    source: PageSource,
}

impl FileOutlineProvider {
    pub fn new(source: PageSource) -> Self {
        Self { source }
    }

    pub fn for_file(path: impl Into<PathBuf>) -> Self {
        Self::new(PageSource::File(path.into()))
    }

    pub fn for_page(graph_dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self::new(PageSource::Named {
            graph_dir: graph_dir.into(),
            name: name.into(),
        })
    }

    /// Interpret a CLI page argument.
    ///
    /// Anything that exists on disk or carries a page-file extension is a
    /// path; otherwise it is a page name, looked up in `graph_dir` when one
    /// is configured.
    pub fn resolve(page: &str, graph_dir: Option<&Path>) -> Self {
        let path = Path::new(page);
        if path.exists() || has_page_extension(path) {
            return Self::for_file(path);
        }
        match graph_dir {
            Some(dir) => Self::for_page(dir, page),
            None => Self::for_file(path),
        }
    }

    pub fn source(&self) -> &PageSource {
        &self.source
    }

    /// Path of the page file, if it currently exists.
    pub fn locate(&self) -> Option<PathBuf> {
        match &self.source {
            PageSource::File(path) => path.is_file().then(|| path.clone()),
            PageSource::Named { graph_dir, name } => find_page_file(graph_dir, name),
        }
    }

    /// Read and parse the page. `Ok(None)` when the page file is missing.
    pub fn load(&self) -> Result<Option<CurrentPage>> {
        let Some(path) = self.locate() else {
            return Ok(None);
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read page file: {}", path.display()))?;

        let fallback_name = match &self.source {
            PageSource::Named { name, .. } => name.clone(),
            PageSource::File(_) => page_name_from_path(&path),
        };

        let page = match extension(&path).as_deref() {
            Some("json") => {
                let mut page = parse_json_page(&content)
                    .with_context(|| format!("Invalid page JSON: {}", path.display()))?;
                page.name = page.name.or(Some(fallback_name));
                page
            }
            Some("md") | Some("markdown") => {
                let parsed = parse_markdown_outline(&fallback_name, &content);
                CurrentPage {
                    name: parsed.title.or(Some(fallback_name)),
                    blocks: parsed.blocks,
                }
            }
            _ => bail!("Unsupported page file type: {}", path.display()),
        };

        tracing::debug!(path = %path.display(), blocks = page.blocks.len(), "loaded page");
        Ok(Some(page))
    }
}

#[async_trait]
impl OutlineProvider for FileOutlineProvider {
    async fn is_ready(&self) -> bool {
        self.locate().is_some()
    }

    async fn current_outline(&self) -> Result<Option<Vec<OutlineNode>>> {
        Ok(self.load()?.map(|page| page.blocks))
    }

    async fn current_page_name(&self) -> Result<Option<String>> {
        Ok(self.load()?.and_then(|page| page.name))
    }

    async fn current_page(&self) -> Result<Option<CurrentPage>> {
        self.load()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonPage {
    Blocks(Vec<JsonBlock>),
    Page {
        #[serde(default, rename = "originalName")]
        original_name: Option<String>,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        blocks: Vec<JsonBlock>,
    },
}

/// A block object in either the native or the exported shape.
#[derive(Deserialize)]
struct JsonBlock {
    #[serde(default)]
    uuid: Option<String>,
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    children: Vec<Value>,
}

impl JsonBlock {
    fn into_node(self) -> Result<OutlineNode> {
        let id = match (self.uuid, self.id) {
            (Some(uuid), _) if !uuid.is_empty() => uuid,
            (_, Some(Value::String(id))) if !id.is_empty() => id,
            (_, id) => bail!("Block has no uuid or string id (id: {:?})", id),
        };
        let children = self
            .children
            .into_iter()
            .filter_map(|child| match child {
                Value::Object(_) => Some(child),
                other => {
                    tracing::debug!(block = %id, child = %other, "skipping collapsed child reference");
                    None
                }
            })
            .map(|child| serde_json::from_value::<JsonBlock>(child)?.into_node())
            .collect::<Result<Vec<_>>>()?;

        Ok(OutlineNode {
            text: self.content.or(self.text),
            id,
            children,
        })
    }
}

fn into_nodes(blocks: Vec<JsonBlock>) -> Result<Vec<OutlineNode>> {
    blocks.into_iter().map(JsonBlock::into_node).collect()
}

fn parse_json_page(content: &str) -> Result<CurrentPage> {
    let page = match serde_json::from_str::<JsonPage>(content)? {
        JsonPage::Blocks(blocks) => CurrentPage {
            name: None,
            blocks: into_nodes(blocks)?,
        },
        JsonPage::Page {
            original_name,
            name,
            blocks,
        } => CurrentPage {
            name: [original_name, name]
                .into_iter()
                .flatten()
                .find(|n| !n.trim().is_empty()),
            blocks: into_nodes(blocks)?,
        },
    };
    Ok(page)
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
}

fn has_page_extension(path: &Path) -> bool {
    matches!(extension(path).as_deref(), Some("md" | "markdown" | "json"))
}

/// Page name from a file stem, undoing namespace encoding (`a___b`, `a%2Fb`).
fn page_name_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    stem.replace("___", "/").replace("%2F", "/").replace("%2f", "/")
}

/// File stems a page name may be stored under, lowercased.
fn candidate_stems(name: &str) -> Vec<String> {
    let lower = name.trim().to_lowercase();
    let mut stems = vec![
        lower.clone(),
        lower.replace('/', "___"),
        lower.replace('/', "%2f"),
    ];
    stems.dedup();
    stems
}

/// Find the file for page `name` under `graph_dir`.
///
/// Markdown is preferred over JSON; ties break on path order.
pub fn find_page_file(graph_dir: &Path, name: &str) -> Option<PathBuf> {
    if !graph_dir.is_dir() {
        return None;
    }
    let stems = candidate_stems(name);

    let mut matches: Vec<PathBuf> = WalkDir::new(graph_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| has_page_extension(path))
        .filter(|path| {
            path.file_stem()
                .map(|s| stems.contains(&s.to_string_lossy().to_lowercase()))
                .unwrap_or(false)
        })
        .collect();

    matches.sort_by_key(|path| (extension(path).as_deref() == Some("json"), path.clone()));
    matches.into_iter().next()
}
