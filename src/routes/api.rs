// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::Result;
use crate::middleware::auth::Viewer;
use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes (require a signed-in user).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/me", get(get_me))
}

/// Current user response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserResponse {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub created_at: String,
}

/// Get current user profile.
async fn get_me(State(state): State<Arc<AppState>>, viewer: Viewer) -> Result<Json<UserResponse>> {
    let user = viewer.require()?;
    let profile = state.accounts.profile(user).await?;

    Ok(Json(UserResponse {
        user_id: profile.user_id,
        name: profile.name,
        email: profile.email,
        created_at: profile.created_at,
    }))
}
