// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper implementing [`ContentStore`].
//!
//! Collections:
//! - `profiles` (document ID = user ID)
//! - `concept_likes` (document ID = encoded (user, slug) pair)
//! - `concept_comments` (document ID = comment UUID)
//! - `comment_likes` (document ID = encoded (user, comment) pair)
//!
//! Like documents are written with create-only inserts. Firestore rejects a
//! create for an existing document ID, so the one-like-per-pair rule holds
//! even when two toggles race.

use super::{collections, sort_by_creation, ContentStore};
use crate::error::AppError;
use crate::models::{CommentLike, ConceptComment, ConceptLike, Profile};
use async_trait::async_trait;
use firestore::errors::FirestoreError;
use firestore::{FirestoreQueryDirection, FirestoreWritePrecondition};
use futures_util::{stream, StreamExt};

const MAX_CONCURRENT_DB_OPS: usize = 10;
// Firestore caps `IN` filters at 30 values.
const IN_FILTER_LIMIT: usize = 30;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create an offline client for testing.
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    async fn get_by_id<T>(&self, collection: &str, id: &str) -> Result<Option<T>, AppError>
    where
        T: for<'de> serde::Deserialize<'de> + Send,
    {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collection)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create-only write. Returns `false` if the document ID is taken.
    async fn create<T>(&self, collection: &str, id: &str, object: &T) -> Result<bool, AppError>
    where
        T: serde::Serialize + for<'de> serde::Deserialize<'de> + Sync + Send,
    {
        let result: Result<(), FirestoreError> = self
            .get_client()?
            .fluent()
            .insert()
            .into(collection)
            .document_id(id)
            .object(object)
            .execute()
            .await;

        match result {
            Ok(()) => Ok(true),
            Err(FirestoreError::DataConflictError(_)) => Ok(false),
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    /// Delete a document that must exist. Returns `false` if it was absent.
    async fn delete_existing(&self, collection: &str, id: &str) -> Result<bool, AppError> {
        let result = self
            .get_client()?
            .fluent()
            .delete()
            .from(collection)
            .document_id(id)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .execute()
            .await;

        match result {
            Ok(()) => Ok(true),
            Err(FirestoreError::DataNotFoundError(_)) => Ok(false),
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }
}

#[async_trait]
impl ContentStore for FirestoreDb {
    // ─── Profile Operations ──────────────────────────────────────

    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, AppError> {
        self.get_by_id(collections::PROFILES, user_id).await
    }

    async fn upsert_profile(&self, profile: &Profile) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::PROFILES)
            .document_id(&profile.user_id)
            .object(profile)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn create_profile_if_absent(&self, profile: &Profile) -> Result<bool, AppError> {
        self.create(collections::PROFILES, &profile.user_id, profile)
            .await
    }

    // ─── Concept Like Operations ─────────────────────────────────

    async fn find_concept_like(
        &self,
        user_id: &str,
        concept_slug: &str,
    ) -> Result<Option<ConceptLike>, AppError> {
        self.get_by_id(
            collections::CONCEPT_LIKES,
            &ConceptLike::key(user_id, concept_slug),
        )
        .await
    }

    async fn insert_concept_like(&self, like: &ConceptLike) -> Result<bool, AppError> {
        self.create(collections::CONCEPT_LIKES, &like.id, like).await
    }

    async fn delete_concept_like(
        &self,
        user_id: &str,
        concept_slug: &str,
    ) -> Result<bool, AppError> {
        self.delete_existing(
            collections::CONCEPT_LIKES,
            &ConceptLike::key(user_id, concept_slug),
        )
        .await
    }

    async fn list_concept_likes(&self, concept_slug: &str) -> Result<Vec<ConceptLike>, AppError> {
        let concept_slug = concept_slug.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::CONCEPT_LIKES)
            .filter(move |q| q.field("concept_slug").eq(concept_slug.clone()))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Comment Operations ──────────────────────────────────────

    async fn get_comment(&self, comment_id: &str) -> Result<Option<ConceptComment>, AppError> {
        self.get_by_id(collections::CONCEPT_COMMENTS, comment_id)
            .await
    }

    async fn insert_comment(&self, comment: &ConceptComment) -> Result<(), AppError> {
        if !self
            .create(collections::CONCEPT_COMMENTS, &comment.id, comment)
            .await?
        {
            return Err(AppError::Database(format!(
                "Comment {} already exists",
                comment.id
            )));
        }
        Ok(())
    }

    /// Comments are immutable, so checking the author before deleting
    /// cannot be invalidated by a concurrent update.
    async fn delete_comment_owned(
        &self,
        comment_id: &str,
        user_id: &str,
    ) -> Result<bool, AppError> {
        match self.get_comment(comment_id).await? {
            Some(comment) if comment.user_id == user_id => {
                self.delete_existing(collections::CONCEPT_COMMENTS, comment_id)
                    .await
            }
            _ => Ok(false),
        }
    }

    async fn list_comments(&self, concept_slug: &str) -> Result<Vec<ConceptComment>, AppError> {
        let concept_slug = concept_slug.to_string();
        let mut comments: Vec<ConceptComment> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::CONCEPT_COMMENTS)
            .filter(move |q| q.field("concept_slug").eq(concept_slug.clone()))
            .order_by([("created_at", FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // Equal timestamps come back in arbitrary order
        sort_by_creation(&mut comments);
        Ok(comments)
    }

    // ─── Comment Like Operations ─────────────────────────────────

    async fn find_comment_like(
        &self,
        user_id: &str,
        comment_id: &str,
    ) -> Result<Option<CommentLike>, AppError> {
        self.get_by_id(
            collections::COMMENT_LIKES,
            &CommentLike::key(user_id, comment_id),
        )
        .await
    }

    async fn insert_comment_like(&self, like: &CommentLike) -> Result<bool, AppError> {
        self.create(collections::COMMENT_LIKES, &like.id, like).await
    }

    async fn delete_comment_like(&self, user_id: &str, comment_id: &str) -> Result<bool, AppError> {
        self.delete_existing(
            collections::COMMENT_LIKES,
            &CommentLike::key(user_id, comment_id),
        )
        .await
    }

    /// Queries in chunks because of the `IN` filter limit.
    async fn list_comment_likes(
        &self,
        comment_ids: &[String],
    ) -> Result<Vec<CommentLike>, AppError> {
        let client = self.get_client()?;

        let chunks: Vec<Vec<String>> = comment_ids
            .chunks(IN_FILTER_LIMIT)
            .map(<[String]>::to_vec)
            .collect();

        let results = stream::iter(chunks)
            .map(|chunk| async move {
                client
                    .fluent()
                    .select()
                    .from(collections::COMMENT_LIKES)
                    .filter(move |q| q.field("comment_id").is_in(chunk.clone()))
                    .obj::<CommentLike>()
                    .query()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))
            })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<Vec<CommentLike>, AppError>>>()
            .await;

        let mut likes = Vec::new();
        for chunk in results {
            likes.extend(chunk?);
        }
        Ok(likes)
    }
}
