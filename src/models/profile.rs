// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile model for storage and API.

use serde::{Deserialize, Serialize};

/// User profile stored alongside likes and comments.
///
/// One per identity-provider user; the user id doubles as the document ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Identity-provider user ID
    pub user_id: String,
    /// Display name shown next to comments
    pub name: String,
    /// Email address at the time of the last upsert
    pub email: String,
    /// When the profile was first created
    pub created_at: String,
}

/// Fallback display name when nothing better is known.
pub const DEFAULT_DISPLAY_NAME: &str = "User";

/// Derive a display name from an email address (its local part).
pub fn name_from_email(email: &str) -> Option<&str> {
    email.split('@').next().filter(|local| !local.is_empty())
}
