// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Like records for concepts and comments.

use serde::{Deserialize, Serialize};

/// "User X likes concept Y."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptLike {
    /// Document ID, derived from the (user, concept) pair
    pub id: String,
    pub user_id: String,
    pub concept_slug: String,
    pub created_at: String,
}

impl ConceptLike {
    /// Build a like with its deterministic ID.
    pub fn new(user_id: &str, concept_slug: &str, created_at: String) -> Self {
        Self {
            id: Self::key(user_id, concept_slug),
            user_id: user_id.to_string(),
            concept_slug: concept_slug.to_string(),
            created_at,
        }
    }

    /// Storage key for a (user, concept) pair.
    ///
    /// At most one like per pair exists because the pair *is* the key.
    pub fn key(user_id: &str, concept_slug: &str) -> String {
        format!(
            "{}:{}",
            urlencoding::encode(user_id),
            urlencoding::encode(concept_slug)
        )
    }
}

/// "User X likes comment Y."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentLike {
    /// Document ID, derived from the (user, comment) pair
    pub id: String,
    pub user_id: String,
    pub comment_id: String,
    pub created_at: String,
}

impl CommentLike {
    pub fn new(user_id: &str, comment_id: &str, created_at: String) -> Self {
        Self {
            id: Self::key(user_id, comment_id),
            user_id: user_id.to_string(),
            comment_id: comment_id.to_string(),
            created_at,
        }
    }

    pub fn key(user_id: &str, comment_id: &str) -> String {
        format!(
            "{}:{}",
            urlencoding::encode(user_id),
            urlencoding::encode(comment_id)
        )
    }
}
