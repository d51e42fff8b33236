// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Likes and comments on concepts.
//!
//! Every mutation takes the request's [`Viewer`], requires an authenticated
//! user, performs its store writes and then invalidates the concept's route
//! in the [`RouteCache`]. Like counts are never stored; they are derived
//! from like rows when the page is assembled.

use crate::db::ContentStore;
use crate::error::{AppError, Result};
use crate::middleware::auth::{AuthUser, Viewer};
use crate::models::comment::NoReplies;
use crate::models::concept::concept_route;
use crate::models::profile::{name_from_email, DEFAULT_DISPLAY_NAME};
use crate::models::{
    AuthorProfile, CommentLike, ConceptComment, ConceptEngagement, ConceptLike, Reply,
    TopLevelComment,
};
use crate::services::route_cache::RouteCache;
use crate::time_utils::now_storage;
use futures_util::{stream, StreamExt};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

const MAX_CONCURRENT_PROFILE_LOOKUPS: usize = 10;

/// Viewer-independent state of one concept's likes and comments.
///
/// This is what the route cache holds; [`EngagementSnapshot::assemble`]
/// turns it into the per-viewer view on every request.
#[derive(Debug, Clone, Default)]
pub struct EngagementSnapshot {
    concept_likers: HashSet<String>,
    /// Oldest first
    comments: Vec<ConceptComment>,
    /// Comment ID -> IDs of users who liked it
    comment_likers: HashMap<String, HashSet<String>>,
    /// User ID -> display name
    author_names: HashMap<String, String>,
}

impl EngagementSnapshot {
    pub fn new(
        concept_likes: Vec<ConceptLike>,
        comments: Vec<ConceptComment>,
        comment_likes: Vec<CommentLike>,
        author_names: HashMap<String, String>,
    ) -> Self {
        let concept_likers = concept_likes.into_iter().map(|l| l.user_id).collect();

        let mut comment_likers: HashMap<String, HashSet<String>> = HashMap::new();
        for like in comment_likes {
            comment_likers
                .entry(like.comment_id)
                .or_default()
                .insert(like.user_id);
        }

        Self {
            concept_likers,
            comments,
            comment_likers,
            author_names,
        }
    }

    fn like_state(&self, comment_id: &str, viewer_id: Option<&str>) -> (u32, bool) {
        match self.comment_likers.get(comment_id) {
            Some(likers) => (
                u32::try_from(likers.len()).unwrap_or(u32::MAX),
                viewer_id.is_some_and(|id| likers.contains(id)),
            ),
            None => (0, false),
        }
    }

    fn author(&self, user_id: &str) -> AuthorProfile {
        AuthorProfile {
            name: self
                .author_names
                .get(user_id)
                .cloned()
                .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string()),
        }
    }

    /// Build the two-level comment tree annotated for `viewer_id`.
    ///
    /// Only replies whose parent is a top-level comment are reachable.
    /// Replies to replies and replies whose parent was deleted are dropped.
    pub fn assemble(&self, viewer_id: Option<&str>) -> ConceptEngagement {
        let mut replies_by_parent: HashMap<&str, Vec<&ConceptComment>> = HashMap::new();
        for comment in &self.comments {
            if let Some(parent_id) = comment.parent_id.as_deref() {
                replies_by_parent.entry(parent_id).or_default().push(comment);
            }
        }

        let comments: Vec<TopLevelComment> = self
            .comments
            .iter()
            .filter(|c| c.is_top_level())
            .map(|top| {
                let replies = replies_by_parent
                    .get(top.id.as_str())
                    .map(|rows| {
                        rows.iter()
                            .map(|reply| {
                                let (like_count, user_liked) =
                                    self.like_state(&reply.id, viewer_id);
                                Reply {
                                    id: reply.id.clone(),
                                    content: reply.content.clone(),
                                    created_at: reply.created_at.clone(),
                                    user_id: reply.user_id.clone(),
                                    profile: self.author(&reply.user_id),
                                    like_count,
                                    user_liked,
                                    replies: NoReplies,
                                }
                            })
                            .collect()
                    })
                    .unwrap_or_default();

                let (like_count, user_liked) = self.like_state(&top.id, viewer_id);
                TopLevelComment {
                    id: top.id.clone(),
                    content: top.content.clone(),
                    created_at: top.created_at.clone(),
                    user_id: top.user_id.clone(),
                    profile: self.author(&top.user_id),
                    like_count,
                    user_liked,
                    replies,
                }
            })
            .collect();

        let total: usize = comments.iter().map(|c| 1 + c.replies.len()).sum();

        ConceptEngagement {
            like_count: u32::try_from(self.concept_likers.len()).unwrap_or(u32::MAX),
            user_liked: viewer_id.is_some_and(|id| self.concept_likers.contains(id)),
            comments,
            total_comments: u32::try_from(total).unwrap_or(u32::MAX),
        }
    }
}

/// Likes, comments and the concept page read path.
#[derive(Clone)]
pub struct EngagementService {
    store: Arc<dyn ContentStore>,
    cache: Arc<RouteCache<EngagementSnapshot>>,
}

impl EngagementService {
    pub fn new(store: Arc<dyn ContentStore>, cache: Arc<RouteCache<EngagementSnapshot>>) -> Self {
        Self { store, cache }
    }

    fn invalidate(&self, concept_slug: &str) {
        self.cache.invalidate(&concept_route(concept_slug));
    }

    // ─── Likes ───────────────────────────────────────────────────

    /// Like the concept if the viewer hasn't, unlike it if they have.
    pub async fn toggle_concept_like(&self, viewer: &Viewer, concept_slug: &str) -> Result<()> {
        let user = viewer.require()?;

        match self.store.find_concept_like(&user.id, concept_slug).await? {
            Some(_) => {
                if !self.store.delete_concept_like(&user.id, concept_slug).await? {
                    tracing::debug!(
                        user_id = %user.id,
                        concept_slug,
                        "Concept like already removed by a concurrent request"
                    );
                }
                tracing::info!(user_id = %user.id, concept_slug, "Concept unliked");
            }
            None => {
                let like = ConceptLike::new(&user.id, concept_slug, now_storage());
                if !self.store.insert_concept_like(&like).await? {
                    tracing::warn!(
                        user_id = %user.id,
                        concept_slug,
                        "Concurrent concept like detected"
                    );
                    return Err(AppError::Conflict("Already liked".to_string()));
                }
                tracing::info!(user_id = %user.id, concept_slug, "Concept liked");
            }
        }

        self.invalidate(concept_slug);
        Ok(())
    }

    /// Like or unlike a comment. `concept_slug` only selects the route to
    /// invalidate.
    pub async fn toggle_comment_like(
        &self,
        viewer: &Viewer,
        comment_id: &str,
        concept_slug: &str,
    ) -> Result<()> {
        let user = viewer.require()?;

        match self.store.find_comment_like(&user.id, comment_id).await? {
            Some(_) => {
                if !self.store.delete_comment_like(&user.id, comment_id).await? {
                    tracing::debug!(
                        user_id = %user.id,
                        comment_id,
                        "Comment like already removed by a concurrent request"
                    );
                }
                tracing::info!(user_id = %user.id, comment_id, "Comment unliked");
            }
            None => {
                let like = CommentLike::new(&user.id, comment_id, now_storage());
                if !self.store.insert_comment_like(&like).await? {
                    tracing::warn!(
                        user_id = %user.id,
                        comment_id,
                        "Concurrent comment like detected"
                    );
                    return Err(AppError::Conflict("Already liked".to_string()));
                }
                tracing::info!(user_id = %user.id, comment_id, "Comment liked");
            }
        }

        self.invalidate(concept_slug);
        Ok(())
    }

    // ─── Comments ────────────────────────────────────────────────

    /// Post a comment, or a reply when `parent_id` is given.
    ///
    /// `parent_id` is stored as given. A reply pointing at a reply, or at a
    /// comment on another concept, is accepted but never shown.
    pub async fn add_comment(
        &self,
        viewer: &Viewer,
        concept_slug: &str,
        content: &str,
        parent_id: Option<String>,
    ) -> Result<TopLevelComment> {
        let user = viewer.require()?;

        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(AppError::BadRequest(AppError::EMPTY_COMMENT.to_string()));
        }

        let comment = ConceptComment {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            concept_slug: concept_slug.to_string(),
            content: trimmed.to_string(),
            parent_id,
            created_at: now_storage(),
        };

        self.store.insert_comment(&comment).await?;

        tracing::info!(
            user_id = %user.id,
            concept_slug,
            comment_id = %comment.id,
            is_reply = !comment.is_top_level(),
            "Comment added"
        );

        self.invalidate(concept_slug);

        let author_name = self.display_name(user).await?;
        Ok(TopLevelComment::fresh(comment, author_name))
    }

    /// Delete a comment the viewer wrote.
    ///
    /// Deleting someone else's comment, or one that doesn't exist, matches
    /// nothing and still succeeds.
    pub async fn delete_comment(
        &self,
        viewer: &Viewer,
        comment_id: &str,
        concept_slug: &str,
    ) -> Result<()> {
        let user = viewer.require()?;

        if self.store.delete_comment_owned(comment_id, &user.id).await? {
            tracing::info!(user_id = %user.id, comment_id, "Comment deleted");
        } else {
            tracing::debug!(
                user_id = %user.id,
                comment_id,
                "Delete matched no comment owned by user"
            );
        }

        self.invalidate(concept_slug);
        Ok(())
    }

    // ─── Read Path ───────────────────────────────────────────────

    /// Like state and full comment tree of a concept, as seen by `viewer`.
    pub async fn concept_engagement(
        &self,
        viewer: &Viewer,
        concept_slug: &str,
    ) -> Result<ConceptEngagement> {
        let route = concept_route(concept_slug);

        let snapshot = match self.cache.get(&route) {
            Some(snapshot) => snapshot,
            None => {
                let ticket = self.cache.ticket(&route);
                let snapshot = Arc::new(self.load_snapshot(concept_slug).await?);
                self.cache.publish(&route, ticket, Arc::clone(&snapshot));
                snapshot
            }
        };

        Ok(snapshot.assemble(viewer.user_id()))
    }

    async fn load_snapshot(&self, concept_slug: &str) -> Result<EngagementSnapshot> {
        let concept_likes = self.store.list_concept_likes(concept_slug).await?;
        let comments = self.store.list_comments(concept_slug).await?;

        let comment_ids: Vec<String> = comments.iter().map(|c| c.id.clone()).collect();
        let comment_likes = if comment_ids.is_empty() {
            Vec::new()
        } else {
            self.store.list_comment_likes(&comment_ids).await?
        };

        let authors: BTreeSet<String> = comments.iter().map(|c| c.user_id.clone()).collect();
        let author_names = self.author_names(authors).await?;

        tracing::debug!(
            concept_slug,
            likes = concept_likes.len(),
            comments = comments.len(),
            comment_likes = comment_likes.len(),
            "Loaded engagement snapshot"
        );

        Ok(EngagementSnapshot::new(
            concept_likes,
            comments,
            comment_likes,
            author_names,
        ))
    }

    async fn author_names(&self, user_ids: BTreeSet<String>) -> Result<HashMap<String, String>> {
        let store = &self.store;

        let profiles = stream::iter(user_ids)
            .map(|user_id| async move {
                let profile = store.get_profile(&user_id).await?;
                Ok::<_, AppError>((user_id, profile))
            })
            .buffer_unordered(MAX_CONCURRENT_PROFILE_LOOKUPS)
            .collect::<Vec<_>>()
            .await;

        let mut names = HashMap::new();
        for result in profiles {
            let (user_id, profile) = result?;
            if let Some(profile) = profile {
                names.insert(user_id, profile.name);
            }
        }
        Ok(names)
    }

    /// Name shown next to a new comment by `user`.
    async fn display_name(&self, user: &AuthUser) -> Result<String> {
        let name = match self.store.get_profile(&user.id).await? {
            Some(profile) => profile.name,
            None => name_from_email(&user.email)
                .unwrap_or(DEFAULT_DISPLAY_NAME)
                .to_string(),
        };
        Ok(name)
    }
}
