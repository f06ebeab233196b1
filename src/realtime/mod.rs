//! Realtime Updates
//!
//! Listens on the backend's push socket for new views and comments.
//!
//! ## Protocol
//!
//! Inbound text frames are JSON:
//! - `{"event": "new_view", "data": View}`
//! - `{"event": "new_comment", "data": {"view_id": ..., "comment": Comment}}`
//!
//! Nothing is ever sent by the client.

mod listener;
mod messages;

pub use listener::{PushSink, RealtimeError, RealtimeListener, ReconnectPolicy};
pub use messages::{CommentAdded, PushEvent};
