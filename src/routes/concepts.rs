// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Concept catalog and concept page routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::Viewer;
use crate::models::{Concept, ConceptCategory, ConceptEngagement, Difficulty};
use crate::services::catalog::RELATED_LIMIT;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/concepts", get(list_concepts))
        .route("/api/concepts/{slug}", get(get_concept))
}

/// Card shown in the catalog grid and the related list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ConceptSummary {
    pub slug: String,
    pub title: String,
    pub emoji: String,
    pub category: ConceptCategory,
    pub difficulty: Difficulty,
    pub short_desc: String,
    pub released: bool,
}

impl From<&Concept> for ConceptSummary {
    fn from(concept: &Concept) -> Self {
        Self {
            slug: concept.slug.clone(),
            title: concept.title.clone(),
            emoji: concept.emoji.clone(),
            category: concept.category,
            difficulty: concept.difficulty,
            short_desc: concept.short_desc.clone(),
            released: concept.released,
        }
    }
}

#[derive(Deserialize)]
struct ListQuery {
    #[serde(default)]
    category: Option<String>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ConceptListResponse {
    pub concepts: Vec<ConceptSummary>,
}

/// List the catalog, optionally for one category (`?category=Core%20CLI`).
async fn list_concepts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListQuery>,
) -> Result<Json<ConceptListResponse>> {
    let category = match params.category.as_deref() {
        None | Some("") | Some("All") => None,
        Some(label) => Some(
            ConceptCategory::from_label(label)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown category: {}", label)))?,
        ),
    };

    let concepts = state
        .catalog
        .list(category)
        .into_iter()
        .map(ConceptSummary::from)
        .collect();

    Ok(Json(ConceptListResponse { concepts }))
}

/// Everything the concept page renders.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ConceptPageResponse {
    pub concept: Concept,
    pub related: Vec<ConceptSummary>,
    pub engagement: ConceptEngagement,
}

async fn get_concept(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Path(slug): Path<String>,
) -> Result<Json<ConceptPageResponse>> {
    let concept = state
        .catalog
        .get_released(&slug)
        .ok_or_else(|| AppError::NotFound("Concept not found".to_string()))?;

    let related = state
        .catalog
        .related(&slug, RELATED_LIMIT)
        .into_iter()
        .map(ConceptSummary::from)
        .collect();

    let engagement = state.engagement.concept_engagement(&viewer, &slug).await?;

    Ok(Json(ConceptPageResponse {
        concept: concept.clone(),
        related,
        engagement,
    }))
}
