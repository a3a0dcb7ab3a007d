//! Shared document model (§3): a statute article or a judicial case.
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Stable document identifier; the `article_`/`case_` prefix is the source of truth for
/// [`DocType`] and is re-derived rather than duplicated on every load.
pub type DocId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocType {
    Article,
    Case,
}

impl DocType {
    /// Derive the type from an id's prefix. Panics on a malformed id since ids are
    /// produced exclusively by the loaders in `law-index`, never by user input.
    pub fn from_id(id: &str) -> Self {
        if id.starts_with("article_") {
            DocType::Article
        } else if id.starts_with("case_") {
            DocType::Case
        } else {
            panic!("document id {id:?} has neither article_ nor case_ prefix")
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentence {
    pub months: u32,
    pub fine_amount: u64,
    pub death_penalty: bool,
    pub life: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Document {
    Article {
        id: DocId,
        title: String,
        content: String,
        article_number: u32,
        chapter: String,
    },
    Case {
        id: DocId,
        title: String,
        content: String,
        case_id: String,
        accusations: BTreeSet<String>,
        relevant_articles: Vec<u32>,
        sentence: Sentence,
    },
}

impl Document {
    pub fn id(&self) -> &str {
        match self {
            Document::Article { id, .. } => id,
            Document::Case { id, .. } => id,
        }
    }

    pub fn doc_type(&self) -> DocType {
        match self {
            Document::Article { .. } => DocType::Article,
            Document::Case { .. } => DocType::Case,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Document::Article { title, .. } => title,
            Document::Case { title, .. } => title,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Document::Article { content, .. } => content,
            Document::Case { content, .. } => content,
        }
    }

    /// `title + content`, the text BM25/dense indexing is built over (§4.3).
    pub fn searchable_text(&self) -> String {
        format!("{} {}", self.title(), self.content())
    }

    pub fn content_preview(&self, max_chars: usize) -> String {
        self.content().chars().take(max_chars).collect()
    }

    pub fn article_number(&self) -> Option<u32> {
        match self {
            Document::Article { article_number, .. } => Some(*article_number),
            Document::Case { .. } => None,
        }
    }
}
