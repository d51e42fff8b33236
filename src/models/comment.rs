// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Comment rows and the view shapes served to the frontend.
//!
//! Nesting is exactly one level deep. A [`TopLevelComment`] owns a list of
//! [`Reply`] values and a `Reply` has no reply list of its own, so a
//! reply-of-a-reply cannot be represented in a view. Rows in storage are
//! flat ([`ConceptComment`]) and the assembly step decides which rows are
//! reachable.

use serde::{Deserialize, Serialize, Serializer};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Stored comment or reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptComment {
    /// UUID v4, also the document ID
    pub id: String,
    /// Author
    pub user_id: String,
    pub concept_slug: String,
    /// Trimmed, never empty
    pub content: String,
    /// `None` for top-level comments
    pub parent_id: Option<String>,
    pub created_at: String,
}

impl ConceptComment {
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Author attribution embedded in each comment view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AuthorProfile {
    pub name: String,
}

/// A top-level comment with its replies, annotated for one viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TopLevelComment {
    pub id: String,
    pub content: String,
    pub created_at: String,
    pub user_id: String,
    pub profile: AuthorProfile,
    pub like_count: u32,
    pub user_liked: bool,
    pub replies: Vec<Reply>,
}

/// A reply to a top-level comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Reply {
    pub id: String,
    pub content: String,
    pub created_at: String,
    pub user_id: String,
    pub profile: AuthorProfile,
    pub like_count: u32,
    pub user_liked: bool,
    /// Always serialized as `[]` so replies share the comment JSON shape.
    #[cfg_attr(feature = "binding-generation", ts(type = "never[]"))]
    pub replies: NoReplies,
}

/// Placeholder for the reply list a [`Reply`] can never have.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoReplies;

impl Serialize for NoReplies {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(std::iter::empty::<()>())
    }
}

impl TopLevelComment {
    /// View of a comment that was just created: nobody has liked it and it
    /// has no replies yet.
    pub fn fresh(comment: ConceptComment, author_name: String) -> Self {
        Self {
            id: comment.id,
            content: comment.content,
            created_at: comment.created_at,
            user_id: comment.user_id,
            profile: AuthorProfile { name: author_name },
            like_count: 0,
            user_liked: false,
            replies: Vec::new(),
        }
    }
}

/// Everything the concept page needs about likes and comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ConceptEngagement {
    pub like_count: u32,
    pub user_liked: bool,
    pub comments: Vec<TopLevelComment>,
    /// Top-level comments plus all of their replies.
    pub total_comments: u32,
}
