// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Like and comment mutations.
//!
//! These routes are reachable anonymously so that the engagement service
//! can answer with its own "Not authenticated" error body.

use crate::error::Result;
use crate::middleware::auth::Viewer;
use crate::models::TopLevelComment;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{delete, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/concepts/{slug}/like", post(toggle_concept_like))
        .route("/api/concepts/{slug}/comments", post(add_comment))
        .route(
            "/api/concepts/{slug}/comments/{comment_id}",
            delete(delete_comment),
        )
        .route(
            "/api/concepts/{slug}/comments/{comment_id}/like",
            post(toggle_comment_like),
        )
}

/// Empty success body (`{}`).
#[derive(Debug, Default, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActionOk {}

async fn toggle_concept_like(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Path(slug): Path<String>,
) -> Result<Json<ActionOk>> {
    state.engagement.toggle_concept_like(&viewer, &slug).await?;
    Ok(Json(ActionOk {}))
}

#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub parent_id: Option<String>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AddCommentResponse {
    pub comment: TopLevelComment,
}

async fn add_comment(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Path(slug): Path<String>,
    Json(body): Json<AddCommentRequest>,
) -> Result<Json<AddCommentResponse>> {
    let comment = state
        .engagement
        .add_comment(&viewer, &slug, &body.content, body.parent_id)
        .await?;
    Ok(Json(AddCommentResponse { comment }))
}

async fn delete_comment(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Path((slug, comment_id)): Path<(String, String)>,
) -> Result<Json<ActionOk>> {
    state
        .engagement
        .delete_comment(&viewer, &comment_id, &slug)
        .await?;
    Ok(Json(ActionOk {}))
}

async fn toggle_comment_like(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Path((slug, comment_id)): Path<(String, String)>,
) -> Result<Json<ActionOk>> {
    state
        .engagement
        .toggle_comment_like(&viewer, &comment_id, &slug)
        .await?;
    Ok(Json(ActionOk {}))
}
