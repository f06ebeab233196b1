//! Feed Client
//!
//! User actions (load, post, like, comment) and push event dispatch over a
//! shared [`FeedState`].
//!
//! The state lock is never held across a backend call, so push events and
//! in-flight actions interleave freely. Nothing ties "request sent" to
//! "local state updated" atomically.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::document::{CommentNode, FeedDocument};
use super::render;
use super::session::{LikeState, Session};
use crate::api::{ApiError, ApiResult, FeedBackend, MediaFile, NewView};
use crate::realtime::{PushEvent, PushSink};

pub const EMPTY_VIEW_ALERT: &str = "Please write something!";
pub const EMPTY_COMMENT_ALERT: &str = "Comment cannot be empty!";
pub const POSTED_ALERT: &str = "View posted successfully!";
pub const POST_FAILED_ALERT: &str = "Could not post view, please try again.";

/// User-facing alerts (blocking dialogs in a browser)
pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str);
}

/// Document plus session, guarded together
#[derive(Debug, Default)]
pub struct FeedState {
    pub document: FeedDocument,
    pub session: Session,
}

/// Result of a feed (re)load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedLoad {
    Loaded(usize),
    Failed,
}

/// Result of the post-view action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostOutcome {
    /// Rejected client-side, nothing was sent
    Invalid,
    Posted,
    Rejected(String),
    Failed,
}

/// Result of the like-toggle action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeOutcome {
    Liked,
    Unliked,
    /// Transport failure, local state untouched
    Unchanged,
}

/// Result of the add-comment action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentOutcome {
    /// Empty input, nothing was sent
    Invalid,
    /// No such view in the document, before sending or once the backend
    /// accepted the comment
    NotRendered,
    Added,
    Rejected(String),
    Failed,
}

/// Settle a finished like/unlike request against local state
///
/// `from` is the state observed when the action started. Any HTTP response
/// (2xx or not) applies the transition: the status is not distinguished from
/// success. A transport failure leaves everything as it was; the change is
/// only ever applied after completion, so there is nothing to roll back.
/// If the view is no longer rendered only the session is updated.
pub fn settle_like(
    state: &mut FeedState,
    view_id: &str,
    from: LikeState,
    result: &ApiResult<()>,
) -> LikeOutcome {
    match result {
        Ok(()) => {}
        Err(e) if e.has_status() => {
            tracing::warn!(
                "Vote on {} returned an error status, keeping local toggle: {}",
                view_id,
                e
            );
        }
        Err(e) => {
            tracing::error!("Error toggling like on {}: {}", view_id, e);
            return LikeOutcome::Unchanged;
        }
    }

    let to = from.toggled();
    state.session.set_like_state(view_id, to);

    if let Some(node) = state.document.node_mut(view_id) {
        node.upvotes = match to {
            LikeState::Liked => node.upvotes + 1,
            LikeState::NotLiked => node.upvotes.saturating_sub(1),
        };
        node.like = to;
    }

    match to {
        LikeState::Liked => LikeOutcome::Liked,
        LikeState::NotLiked => LikeOutcome::Unliked,
    }
}

/// Client bound to one backend and one notifier
#[derive(Clone)]
pub struct FeedClient {
    backend: Arc<dyn FeedBackend>,
    notifier: Arc<dyn Notifier>,
    state: Arc<Mutex<FeedState>>,
    media_base: String,
    page_size: u32,
}

impl FeedClient {
    /// `media_base` is prefixed to every view's media path
    pub fn new(
        backend: Arc<dyn FeedBackend>,
        notifier: Arc<dyn Notifier>,
        media_base: impl Into<String>,
        page_size: u32,
    ) -> Self {
        Self {
            backend,
            notifier,
            state: Arc::new(Mutex::new(FeedState::default())),
            media_base: media_base.into().trim_end_matches('/').to_string(),
            page_size,
        }
    }

    /// Run `f` with exclusive access to the document and session
    pub async fn with_state<R>(&self, f: impl FnOnce(&mut FeedState) -> R) -> R {
        let mut state = self.state.lock().await;
        f(&mut state)
    }

    pub async fn snapshot(&self) -> FeedDocument {
        self.state.lock().await.document.clone()
    }

    pub async fn render_html(&self) -> Result<String, askama::Error> {
        render::render_html(&self.state.lock().await.document)
    }

    pub async fn render_text(&self) -> String {
        render::render_text(&self.state.lock().await.document)
    }

    /// Fill in the compose form
    pub async fn compose(&self, text: &str, media: Option<std::path::PathBuf>) {
        let mut state = self.state.lock().await;
        state.document.compose.text = text.to_string();
        state.document.compose.media = media;
    }

    /// Type into a view's comment box; `false` if the view is not rendered
    pub async fn type_comment(&self, view_id: &str, text: &str) -> bool {
        self.state
            .lock()
            .await
            .document
            .set_comment_input(view_id, text)
    }

    /// Load the first page of views
    pub async fn load_feed(&self) -> FeedLoad {
        self.load_feed_page(1).await
    }

    /// Replace the feed with one page of views
    ///
    /// Views are inserted top-first in array order, so the displayed order
    /// is the reverse of the backend's. Failures are logged and leave the
    /// document unchanged.
    pub async fn load_feed_page(&self, page: u32) -> FeedLoad {
        let views = match self.backend.fetch_views(page, self.page_size).await {
            Ok(views) => views,
            Err(e) => {
                tracing::error!("Error fetching views: {}", e);
                return FeedLoad::Failed;
            }
        };

        let mut state = self.state.lock().await;
        let FeedState { document, session } = &mut *state;
        document.clear();
        for view in &views {
            render::insert_view(document, session, view, &self.media_base);
        }

        tracing::info!("Loaded {} views (page {})", views.len(), page);
        FeedLoad::Loaded(views.len())
    }

    /// Submit the compose form as a new view
    pub async fn post_view(&self) -> PostOutcome {
        let (text, media_path) = {
            let state = self.state.lock().await;
            (
                state.document.compose.text.clone(),
                state.document.compose.media.clone(),
            )
        };

        if text.is_empty() {
            self.notifier.alert(EMPTY_VIEW_ALERT);
            return PostOutcome::Invalid;
        }

        let media = match &media_path {
            Some(path) => match MediaFile::load(path).await {
                Ok(media) => Some(media),
                Err(e) => {
                    self.notifier.alert(&e.to_string());
                    return PostOutcome::Invalid;
                }
            },
            None => None,
        };

        match self.backend.submit_view(NewView { text, media }).await {
            Ok(()) => {
                self.notifier.alert(POSTED_ALERT);
                self.state.lock().await.document.compose.reset();
                self.load_feed().await;
                PostOutcome::Posted
            }
            Err(ApiError::Rejected { detail, .. }) => {
                self.notifier.alert(&detail);
                PostOutcome::Rejected(detail)
            }
            Err(e) => {
                tracing::error!("Error posting view: {}", e);
                self.notifier.alert(POST_FAILED_ALERT);
                PostOutcome::Failed
            }
        }
    }

    /// Upvote or downvote depending on the current like state
    ///
    /// The button is not disabled while the request is in flight: two quick
    /// toggles both see the same starting state and both apply it.
    pub async fn toggle_like(&self, view_id: &str) -> LikeOutcome {
        let from = self.state.lock().await.session.like_state(view_id);

        let result = match from {
            LikeState::NotLiked => self.backend.upvote(view_id).await,
            LikeState::Liked => self.backend.downvote(view_id).await,
        };

        let mut state = self.state.lock().await;
        settle_like(&mut state, view_id, from, &result)
    }

    /// Submit the text in a view's comment box
    ///
    /// On success the comment shown is the locally typed text stamped with
    /// the client clock; the response body is ignored.
    pub async fn add_comment(&self, view_id: &str) -> CommentOutcome {
        let text = {
            let state = self.state.lock().await;
            match state.document.node(view_id) {
                Some(node) => node.comment_input.clone(),
                None => {
                    tracing::warn!("Comment on view {} which is not rendered", view_id);
                    return CommentOutcome::NotRendered;
                }
            }
        };

        if text.is_empty() {
            self.notifier.alert(EMPTY_COMMENT_ALERT);
            return CommentOutcome::Invalid;
        }

        match self.backend.add_comment(view_id, &text).await {
            Ok(()) => {
                let mut state = self.state.lock().await;
                let comment = CommentNode {
                    text,
                    timestamp: chrono::Utc::now(),
                };
                if !state.document.append_comment(view_id, comment) {
                    tracing::warn!("View {} left the feed before its comment was shown", view_id);
                    return CommentOutcome::NotRendered;
                }
                state.document.set_comment_input(view_id, "");
                CommentOutcome::Added
            }
            Err(ApiError::Rejected { detail, .. }) => {
                self.notifier.alert(&detail);
                CommentOutcome::Rejected(detail)
            }
            Err(e) => {
                tracing::error!("Error adding comment: {}", e);
                CommentOutcome::Failed
            }
        }
    }

    /// Apply a push event to the document
    pub async fn apply_push(&self, event: PushEvent) {
        let mut state = self.state.lock().await;
        let FeedState { document, session } = &mut *state;

        match event {
            PushEvent::NewView(view) => {
                let placement = render::insert_view(document, session, &view, &self.media_base);
                tracing::debug!("New view {} ({:?})", view.id, placement);
            }
            PushEvent::NewComment(added) => {
                if !render::append_comment(document, &added.view_id, &added.comment) {
                    tracing::debug!("Dropped comment for unrendered view {}", added.view_id);
                }
            }
        }
    }
}

#[async_trait]
impl PushSink for FeedClient {
    async fn dispatch(&self, event: PushEvent) {
        self.apply_push(event).await;
    }
}
