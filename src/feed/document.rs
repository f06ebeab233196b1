//! Feed Document
//!
//! In-memory model of the rendered feed: one node per view, newest first,
//! plus the compose form. Every mutation looks its target up by view id and
//! reports whether it was found.

use chrono::{DateTime, Local, Utc};
use std::path::PathBuf;

use super::session::LikeState;

/// Media element shown under a view's text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaElement {
    Video { src: String },
    Image { src: String },
}

impl MediaElement {
    pub fn src(&self) -> &str {
        match self {
            MediaElement::Video { src } | MediaElement::Image { src } => src,
        }
    }
}

/// A rendered comment
#[derive(Debug, Clone, PartialEq)]
pub struct CommentNode {
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl CommentNode {
    /// Timestamp in the user's local time zone
    pub fn display_time(&self) -> String {
        self.timestamp
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    }
}

/// A rendered view
#[derive(Debug, Clone, PartialEq)]
pub struct ViewNode {
    pub id: String,
    pub text: String,
    pub media: Option<MediaElement>,
    /// Displayed counter, adjusted locally by like toggles
    pub upvotes: u64,
    pub like: LikeState,
    pub comments: Vec<CommentNode>,
    /// Unsent text in the comment box
    pub comment_input: String,
}

impl ViewNode {
    pub fn like_label(&self) -> &'static str {
        self.like.label()
    }
}

/// Where an upserted node ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Inserted,
    Replaced,
}

/// The new-view form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComposeForm {
    pub text: String,
    pub media: Option<PathBuf>,
}

impl ComposeForm {
    pub fn reset(&mut self) {
        self.text.clear();
        self.media = None;
    }
}

/// The whole feed page
#[derive(Debug, Clone, Default)]
pub struct FeedDocument {
    nodes: Vec<ViewNode>,
    pub compose: ComposeForm,
}

impl FeedDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes in display order (top first)
    pub fn nodes(&self) -> &[ViewNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    pub fn node(&self, view_id: &str) -> Option<&ViewNode> {
        self.nodes.iter().find(|n| n.id == view_id)
    }

    pub fn node_mut(&mut self, view_id: &str) -> Option<&mut ViewNode> {
        self.nodes.iter_mut().find(|n| n.id == view_id)
    }

    /// Remove every view node; the compose form is untouched
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Insert at the top, or replace an existing node with the same id in place
    ///
    /// A replacement keeps the old comment list when `node` has none, and
    /// always keeps the unsent comment input.
    pub fn upsert_top(&mut self, mut node: ViewNode) -> Placement {
        match self.nodes.iter_mut().find(|n| n.id == node.id) {
            Some(existing) => {
                if node.comments.is_empty() {
                    node.comments = std::mem::take(&mut existing.comments);
                }
                node.comment_input = std::mem::take(&mut existing.comment_input);
                *existing = node;
                Placement::Replaced
            }
            None => {
                self.nodes.insert(0, node);
                Placement::Inserted
            }
        }
    }

    /// Append under a view's comment list; `false` if the view is not rendered
    pub fn append_comment(&mut self, view_id: &str, comment: CommentNode) -> bool {
        match self.node_mut(view_id) {
            Some(node) => {
                node.comments.push(comment);
                true
            }
            None => false,
        }
    }

    /// Type into a view's comment box; `false` if the view is not rendered
    pub fn set_comment_input(&mut self, view_id: &str, text: &str) -> bool {
        match self.node_mut(view_id) {
            Some(node) => {
                node.comment_input = text.to_string();
                true
            }
            None => false,
        }
    }
}
