//! View and Comment Rendering
//!
//! Maps backend records onto document nodes, and the document onto HTML
//! or plain text.

use askama::Template;
use std::fmt::Write as _;

use super::document::{CommentNode, FeedDocument, MediaElement, Placement, ViewNode};
use super::session::Session;
use crate::api::dto::{Comment, View};

/// Pick the media element for a view's media reference
///
/// `.mp4` and `.webm` become a video, anything else an image.
pub fn media_element(media_url: Option<&str>, media_base: &str) -> Option<MediaElement> {
    let path = media_url.filter(|p| !p.is_empty())?;
    let src = format!("{}{}", media_base, path);

    if path.ends_with(".mp4") || path.ends_with(".webm") {
        Some(MediaElement::Video { src })
    } else {
        Some(MediaElement::Image { src })
    }
}

pub fn render_comment(comment: &Comment) -> CommentNode {
    CommentNode {
        text: comment.text.clone(),
        timestamp: comment.timestamp,
    }
}

/// Build the node for `view`; the like label follows the session's liked-set
pub fn render_view(view: &View, session: &Session, media_base: &str) -> ViewNode {
    ViewNode {
        id: view.id.clone(),
        text: view.text.clone(),
        media: media_element(view.media_url.as_deref(), media_base),
        upvotes: view.upvotes,
        like: session.like_state(&view.id),
        comments: view.comments.iter().map(render_comment).collect(),
        comment_input: String::new(),
    }
}

/// Render `view` and place it at the top of the feed (or over its old node)
pub fn insert_view(
    document: &mut FeedDocument,
    session: &Session,
    view: &View,
    media_base: &str,
) -> Placement {
    document.upsert_top(render_view(view, session, media_base))
}

/// Append `comment` under `view_id`; `false` when that view is not rendered
pub fn append_comment(document: &mut FeedDocument, view_id: &str, comment: &Comment) -> bool {
    document.append_comment(view_id, render_comment(comment))
}

// ============================================
// Markup
// ============================================

#[derive(Template)]
#[template(path = "feed.html")]
struct FeedTemplate<'a> {
    views: Vec<ViewMarkup<'a>>,
}

struct ViewMarkup<'a> {
    id: &'a str,
    text: &'a str,
    video_src: Option<&'a str>,
    image_src: Option<&'a str>,
    upvotes: u64,
    like_label: &'static str,
    comments: Vec<CommentMarkup<'a>>,
    comment_input: &'a str,
}

struct CommentMarkup<'a> {
    text: &'a str,
    time: String,
}

impl<'a> From<&'a ViewNode> for ViewMarkup<'a> {
    fn from(node: &'a ViewNode) -> Self {
        let (video_src, image_src) = match &node.media {
            Some(MediaElement::Video { src }) => (Some(src.as_str()), None),
            Some(MediaElement::Image { src }) => (None, Some(src.as_str())),
            None => (None, None),
        };

        Self {
            id: &node.id,
            text: &node.text,
            video_src,
            image_src,
            upvotes: node.upvotes,
            like_label: node.like_label(),
            comments: node
                .comments
                .iter()
                .map(|c| CommentMarkup {
                    text: &c.text,
                    time: c.display_time(),
                })
                .collect(),
            comment_input: &node.comment_input,
        }
    }
}

/// Render the feed container as escaped HTML
pub fn render_html(document: &FeedDocument) -> Result<String, askama::Error> {
    FeedTemplate {
        views: document.nodes().iter().map(ViewMarkup::from).collect(),
    }
    .render()
}

/// Render the feed for a terminal
pub fn render_text(document: &FeedDocument) -> String {
    let mut out = String::new();

    if document.is_empty() {
        out.push_str("(no views)\n");
        return out;
    }

    for node in document.nodes() {
        let _ = writeln!(out, "[{}] {}", node.id, node.text);
        match &node.media {
            Some(MediaElement::Video { src }) => {
                let _ = writeln!(out, "    video: {}", src);
            }
            Some(MediaElement::Image { src }) => {
                let _ = writeln!(out, "    image: {}", src);
            }
            None => {}
        }
        let _ = writeln!(out, "    👍 {}  [{}]", node.upvotes, node.like_label());
        for comment in &node.comments {
            let _ = writeln!(out, "    - {} ({})", comment.text, comment.display_time());
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::session::LikeState;

    const BASE: &str = "http://127.0.0.1:8000";

    #[test]
    fn test_media_sniffing() {
        assert_eq!(
            media_element(Some("/media/clip.mp4"), BASE),
            Some(MediaElement::Video {
                src: "http://127.0.0.1:8000/media/clip.mp4".to_string()
            })
        );
        assert!(matches!(
            media_element(Some("/media/clip.webm"), BASE),
            Some(MediaElement::Video { .. })
        ));
        assert!(matches!(
            media_element(Some("/media/cat.png"), BASE),
            Some(MediaElement::Image { .. })
        ));
        // Extension match is case-sensitive
        assert!(matches!(
            media_element(Some("/media/CLIP.MP4"), BASE),
            Some(MediaElement::Image { .. })
        ));
        assert_eq!(media_element(None, BASE), None);
        assert_eq!(media_element(Some(""), BASE), None);
    }

    #[test]
    fn test_render_view_reflects_liked_set() {
        let view = View::new("a", "hello").upvotes(2);
        let mut session = Session::new();

        let node = render_view(&view, &session, BASE);
        assert_eq!(node.like, LikeState::NotLiked);
        assert_eq!(node.like_label(), "Like");
        assert_eq!(node.upvotes, 2);

        session.set_like_state("a", LikeState::Liked);
        let node = render_view(&view, &session, BASE);
        assert_eq!(node.like_label(), "Unlike");
    }

    #[test]
    fn test_render_view_embedded_comments() {
        let mut view = View::new("a", "hello");
        view.comments = vec![Comment::now("one"), Comment::now("two")];
        let node = render_view(&view, &Session::new(), BASE);
        assert_eq!(node.comments.len(), 2);
        assert_eq!(node.comments[1].text, "two");
    }

    #[test]
    fn test_duplicate_insert_keeps_single_node() {
        let mut doc = FeedDocument::new();
        let session = Session::new();
        let view = View::new("a", "hello");

        assert_eq!(insert_view(&mut doc, &session, &view, BASE), Placement::Inserted);
        assert_eq!(insert_view(&mut doc, &session, &view, BASE), Placement::Replaced);
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_html_escapes_and_ids() {
        let mut doc = FeedDocument::new();
        let session = Session::new();
        insert_view(
            &mut doc,
            &session,
            &View::new("a", "<script>alert(1)</script>").upvotes(3),
            BASE,
        );
        insert_view(&mut doc, &session, &View::new("b", "clip").media("/m/x.mp4"), BASE);
        append_comment(&mut doc, "a", &Comment::now("nice & short"));

        let html = render_html(&doc).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("id=\"upvotes-a\">3<"));
        assert!(html.contains("id=\"like-btn-a\">Like<"));
        assert!(html.contains("id=\"comments-b\""));
        assert!(html.contains("<video"));
        assert!(html.contains("nice &amp; short"));
        assert_eq!(html.matches("id=\"comment-text-a\"").count(), 1);

        // "b" was inserted last, so it comes first
        assert!(html.find("upvotes-b").unwrap() < html.find("upvotes-a").unwrap());
    }

    #[test]
    fn test_render_text() {
        let mut doc = FeedDocument::new();
        assert_eq!(render_text(&doc), "(no views)\n");

        insert_view(&mut doc, &Session::new(), &View::new("a", "hello").media("/m/cat.jpg"), BASE);
        let text = render_text(&doc);
        assert!(text.contains("[a] hello"));
        assert!(text.contains("image: http://127.0.0.1:8000/m/cat.jpg"));
        assert!(text.contains("👍 0  [Like]"));
    }
}
