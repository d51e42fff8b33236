// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory `ContentStore` backed by `DashMap` tables.
//!
//! Used by the test suite and for `STORE_BACKEND=memory` local runs. The
//! uniqueness guarantees match the Firestore adapter: likes are keyed by
//! their (user, target) pair and inserted through the map's entry API, so
//! concurrent toggles cannot create duplicates.

use super::{sort_by_creation, ContentStore};
use crate::error::AppError;
use crate::models::{CommentLike, ConceptComment, ConceptLike, Profile};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Default)]
struct Tables {
    profiles: DashMap<String, Profile>,
    concept_likes: DashMap<String, ConceptLike>,
    comments: DashMap<String, ConceptComment>,
    comment_likes: DashMap<String, CommentLike>,
}

/// Row counts per table, for assertions in tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowCounts {
    pub profiles: usize,
    pub concept_likes: usize,
    pub comments: usize,
    pub comment_likes: usize,
}

/// In-memory database. Clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryDb {
    tables: Arc<Tables>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row_counts(&self) -> RowCounts {
        RowCounts {
            profiles: self.tables.profiles.len(),
            concept_likes: self.tables.concept_likes.len(),
            comments: self.tables.comments.len(),
            comment_likes: self.tables.comment_likes.len(),
        }
    }
}

fn insert_if_absent<T>(table: &DashMap<String, T>, key: &str, value: &T) -> bool
where
    T: Clone,
{
    match table.entry(key.to_string()) {
        Entry::Occupied(_) => false,
        Entry::Vacant(slot) => {
            slot.insert(value.clone());
            true
        }
    }
}

#[async_trait]
impl ContentStore for MemoryDb {
    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, AppError> {
        Ok(self.tables.profiles.get(user_id).map(|p| p.clone()))
    }

    async fn upsert_profile(&self, profile: &Profile) -> Result<(), AppError> {
        self.tables
            .profiles
            .insert(profile.user_id.clone(), profile.clone());
        Ok(())
    }

    async fn create_profile_if_absent(&self, profile: &Profile) -> Result<bool, AppError> {
        Ok(insert_if_absent(
            &self.tables.profiles,
            &profile.user_id,
            profile,
        ))
    }

    async fn find_concept_like(
        &self,
        user_id: &str,
        concept_slug: &str,
    ) -> Result<Option<ConceptLike>, AppError> {
        let key = ConceptLike::key(user_id, concept_slug);
        Ok(self.tables.concept_likes.get(&key).map(|l| l.clone()))
    }

    async fn insert_concept_like(&self, like: &ConceptLike) -> Result<bool, AppError> {
        Ok(insert_if_absent(&self.tables.concept_likes, &like.id, like))
    }

    async fn delete_concept_like(
        &self,
        user_id: &str,
        concept_slug: &str,
    ) -> Result<bool, AppError> {
        let key = ConceptLike::key(user_id, concept_slug);
        Ok(self.tables.concept_likes.remove(&key).is_some())
    }

    async fn list_concept_likes(&self, concept_slug: &str) -> Result<Vec<ConceptLike>, AppError> {
        Ok(self
            .tables
            .concept_likes
            .iter()
            .filter(|l| l.concept_slug == concept_slug)
            .map(|l| l.clone())
            .collect())
    }

    async fn get_comment(&self, comment_id: &str) -> Result<Option<ConceptComment>, AppError> {
        Ok(self.tables.comments.get(comment_id).map(|c| c.clone()))
    }

    async fn insert_comment(&self, comment: &ConceptComment) -> Result<(), AppError> {
        if !insert_if_absent(&self.tables.comments, &comment.id, comment) {
            return Err(AppError::Database(format!(
                "Comment {} already exists",
                comment.id
            )));
        }
        Ok(())
    }

    async fn delete_comment_owned(
        &self,
        comment_id: &str,
        user_id: &str,
    ) -> Result<bool, AppError> {
        Ok(self
            .tables
            .comments
            .remove_if(comment_id, |_, c| c.user_id == user_id)
            .is_some())
    }

    async fn list_comments(&self, concept_slug: &str) -> Result<Vec<ConceptComment>, AppError> {
        let mut comments: Vec<ConceptComment> = self
            .tables
            .comments
            .iter()
            .filter(|c| c.concept_slug == concept_slug)
            .map(|c| c.clone())
            .collect();
        sort_by_creation(&mut comments);
        Ok(comments)
    }

    async fn find_comment_like(
        &self,
        user_id: &str,
        comment_id: &str,
    ) -> Result<Option<CommentLike>, AppError> {
        let key = CommentLike::key(user_id, comment_id);
        Ok(self.tables.comment_likes.get(&key).map(|l| l.clone()))
    }

    async fn insert_comment_like(&self, like: &CommentLike) -> Result<bool, AppError> {
        Ok(insert_if_absent(&self.tables.comment_likes, &like.id, like))
    }

    async fn delete_comment_like(&self, user_id: &str, comment_id: &str) -> Result<bool, AppError> {
        let key = CommentLike::key(user_id, comment_id);
        Ok(self.tables.comment_likes.remove(&key).is_some())
    }

    async fn list_comment_likes(
        &self,
        comment_ids: &[String],
    ) -> Result<Vec<CommentLike>, AppError> {
        let wanted: HashSet<&str> = comment_ids.iter().map(String::as_str).collect();
        Ok(self
            .tables
            .comment_likes
            .iter()
            .filter(|l| wanted.contains(l.comment_id.as_str()))
            .map(|l| l.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(id: &str, user_id: &str, created_at: &str) -> ConceptComment {
        ConceptComment {
            id: id.to_string(),
            user_id: user_id.to_string(),
            concept_slug: "hooks".to_string(),
            content: "text".to_string(),
            parent_id: None,
            created_at: created_at.to_string(),
        }
    }

    #[tokio::test]
    async fn test_concept_like_insert_is_conditional() {
        let db = MemoryDb::new();
        let like = ConceptLike::new("u1", "hooks", "t".to_string());

        assert!(db.insert_concept_like(&like).await.unwrap());
        assert!(!db.insert_concept_like(&like).await.unwrap());
        assert_eq!(db.row_counts().concept_likes, 1);

        assert!(db.delete_concept_like("u1", "hooks").await.unwrap());
        assert!(!db.delete_concept_like("u1", "hooks").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_comment_requires_owner() {
        let db = MemoryDb::new();
        db.insert_comment(&comment("c1", "alice", "2026-01-01T00:00:00.000000Z"))
            .await
            .unwrap();

        assert!(!db.delete_comment_owned("c1", "bob").await.unwrap());
        assert!(db.get_comment("c1").await.unwrap().is_some());

        assert!(db.delete_comment_owned("c1", "alice").await.unwrap());
        assert!(db.get_comment("c1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_comments_sorted_oldest_first() {
        let db = MemoryDb::new();
        db.insert_comment(&comment("b", "u", "2026-01-02T00:00:00.000000Z"))
            .await
            .unwrap();
        db.insert_comment(&comment("a", "u", "2026-01-01T00:00:00.000000Z"))
            .await
            .unwrap();

        let ids: Vec<String> = db
            .list_comments("hooks")
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_create_profile_if_absent_keeps_existing() {
        let db = MemoryDb::new();
        let original = Profile {
            user_id: "u1".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            created_at: "t".to_string(),
        };
        assert!(db.create_profile_if_absent(&original).await.unwrap());

        let mut renamed = original.clone();
        renamed.name = "Someone Else".to_string();
        assert!(!db.create_profile_if_absent(&renamed).await.unwrap());

        assert_eq!(db.get_profile("u1").await.unwrap().unwrap().name, "Ada");
    }
}
