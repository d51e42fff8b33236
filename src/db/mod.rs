// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! The engagement and account services talk to a [`ContentStore`]. Two
//! adapters implement it: [`FirestoreDb`] for deployments and [`MemoryDb`]
//! for tests and local development.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::error::AppError;
use crate::models::{CommentLike, ConceptComment, ConceptLike, Profile};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    pub const PROFILES: &str = "profiles";
    pub const CONCEPT_LIKES: &str = "concept_likes";
    pub const CONCEPT_COMMENTS: &str = "concept_comments";
    pub const COMMENT_LIKES: &str = "comment_likes";
}

/// Persistence port for profiles, likes and comments.
///
/// Like inserts are conditional: the store guarantees at most one like per
/// (user, target) pair and reports `false` instead of writing a duplicate.
/// Deletes report whether a row was actually removed.
#[async_trait]
pub trait ContentStore: Send + Sync {
    // ─── Profiles ────────────────────────────────────────────────

    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, AppError>;

    /// Create or overwrite a profile.
    async fn upsert_profile(&self, profile: &Profile) -> Result<(), AppError>;

    /// Create a profile only if none exists. Returns `true` if created.
    async fn create_profile_if_absent(&self, profile: &Profile) -> Result<bool, AppError>;

    // ─── Concept likes ───────────────────────────────────────────

    async fn find_concept_like(
        &self,
        user_id: &str,
        concept_slug: &str,
    ) -> Result<Option<ConceptLike>, AppError>;

    /// Insert unless the pair already exists. Returns `true` if inserted.
    async fn insert_concept_like(&self, like: &ConceptLike) -> Result<bool, AppError>;

    /// Returns `true` if a like was removed.
    async fn delete_concept_like(&self, user_id: &str, concept_slug: &str)
        -> Result<bool, AppError>;

    async fn list_concept_likes(&self, concept_slug: &str) -> Result<Vec<ConceptLike>, AppError>;

    // ─── Comments ────────────────────────────────────────────────

    async fn get_comment(&self, comment_id: &str) -> Result<Option<ConceptComment>, AppError>;

    async fn insert_comment(&self, comment: &ConceptComment) -> Result<(), AppError>;

    /// Delete a comment only if `user_id` authored it. Returns `true` if a
    /// row matched both filters and was removed.
    async fn delete_comment_owned(&self, comment_id: &str, user_id: &str)
        -> Result<bool, AppError>;

    /// All comments and replies for a concept, oldest first.
    async fn list_comments(&self, concept_slug: &str) -> Result<Vec<ConceptComment>, AppError>;

    // ─── Comment likes ───────────────────────────────────────────

    async fn find_comment_like(
        &self,
        user_id: &str,
        comment_id: &str,
    ) -> Result<Option<CommentLike>, AppError>;

    async fn insert_comment_like(&self, like: &CommentLike) -> Result<bool, AppError>;

    async fn delete_comment_like(&self, user_id: &str, comment_id: &str) -> Result<bool, AppError>;

    /// Likes for any of the given comments.
    async fn list_comment_likes(&self, comment_ids: &[String])
        -> Result<Vec<CommentLike>, AppError>;
}

/// Sort comments oldest first, breaking ties by ID for a stable order.
pub(crate) fn sort_by_creation(comments: &mut [ConceptComment]) {
    comments.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}
