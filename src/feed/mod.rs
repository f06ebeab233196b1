//! Feed
//!
//! Client-side model of the feed page and the actions that drive it.
//!
//! ## Architecture
//!
//! - **Session**: the local user's liked-set
//! - **Document**: rendered view nodes, newest first, keyed by view id
//! - **Render**: `View` → node, document → HTML or text
//! - **FeedClient**: load, post, like and comment actions plus push dispatch
//!
//! ## Data Flow
//!
//! 1. An action reads what it needs from the document and releases the lock
//! 2. The backend call runs without holding any state
//! 3. The outcome is applied to the document, re-checking that targets exist
//! 4. Push events take the same render path as feed loads

mod client;
mod document;
mod render;
mod session;

pub use client::{
    settle_like, CommentOutcome, FeedClient, FeedLoad, FeedState, LikeOutcome, Notifier,
    PostOutcome, EMPTY_COMMENT_ALERT, EMPTY_VIEW_ALERT, POSTED_ALERT, POST_FAILED_ALERT,
};
pub use document::{CommentNode, ComposeForm, FeedDocument, MediaElement, Placement, ViewNode};
pub use render::{
    append_comment, insert_view, media_element, render_comment, render_html, render_text,
    render_view,
};
pub use session::{LikeState, Session};
