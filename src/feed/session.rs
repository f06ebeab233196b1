//! Client Session State
//!
//! Tracks which views the local user has liked. The set is never persisted
//! and may drift from the backend if another session votes on the same view.

use std::collections::HashSet;

/// Like state of one view from the local user's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeState {
    NotLiked,
    Liked,
}

impl LikeState {
    /// Label of the like button while in this state
    pub fn label(self) -> &'static str {
        match self {
            LikeState::NotLiked => "Like",
            LikeState::Liked => "Unlike",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            LikeState::NotLiked => LikeState::Liked,
            LikeState::Liked => LikeState::NotLiked,
        }
    }
}

/// Per-process session of the local user
#[derive(Debug, Clone, Default)]
pub struct Session {
    liked: HashSet<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn like_state(&self, view_id: &str) -> LikeState {
        if self.liked.contains(view_id) {
            LikeState::Liked
        } else {
            LikeState::NotLiked
        }
    }

    pub fn is_liked(&self, view_id: &str) -> bool {
        self.liked.contains(view_id)
    }

    /// Record `view_id` as being in `state`
    pub fn set_like_state(&mut self, view_id: &str, state: LikeState) {
        match state {
            LikeState::Liked => {
                self.liked.insert(view_id.to_string());
            }
            LikeState::NotLiked => {
                self.liked.remove(view_id);
            }
        }
    }

    pub fn liked_count(&self) -> usize {
        self.liked.len()
    }
}
