// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Signup, login and OAuth account flows.
//!
//! Credentials are checked by the [`IdentityProvider`]; this service keeps
//! the local [`Profile`] in step with it and hands back the [`AuthUser`]
//! the session cookie is minted for. A signup that still needs
//! confirmation gets a profile but no session.

use crate::db::ContentStore;
use crate::error::{AppError, FieldErrors, Result};
use crate::middleware::auth::AuthUser;
use crate::models::profile::{name_from_email, DEFAULT_DISPLAY_NAME};
use crate::models::Profile;
use crate::services::identity::{IdentityProvider, IdentityUser, SignUpOutcome};
use crate::time_utils::now_storage;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

const NAME_TOO_SHORT: &str = "Name must be at least 2 characters.";

/// Signup form as posted by the frontend.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupForm {
    /// Checked after trimming, outside the derive
    pub name: String,
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters."))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match."))]
    pub confirm_password: String,
}

impl SignupForm {
    /// Every problem with the form, keyed by field name.
    ///
    /// The email is checked as it will be stored, after trimming.
    pub fn field_errors(&self) -> FieldErrors {
        let mut fields = FieldErrors::new();

        let trimmed = Self {
            email: self.email.trim().to_string(),
            ..self.clone()
        };
        if let Err(errors) = trimmed.validate() {
            for (field, field_errors) in errors.field_errors() {
                if let Some(message) = field_errors.iter().find_map(|e| e.message.as_ref()) {
                    fields.insert(field.to_string(), message.to_string());
                }
            }
        }

        if self.name.trim().chars().count() < 2 {
            fields.insert("name".to_string(), NAME_TOO_SHORT.to_string());
        }

        fields
    }
}

/// Login form.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Name to show for a user arriving through OAuth.
///
/// Prefers the provider's full name, then its short name, then the email
/// local part.
pub fn display_name_for(user: &IdentityUser) -> String {
    let non_blank = |s: &Option<String>| {
        s.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    non_blank(&user.metadata.full_name)
        .or_else(|| non_blank(&user.metadata.name))
        .or_else(|| {
            user.email
                .as_deref()
                .and_then(name_from_email)
                .map(str::to_string)
        })
        .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string())
}

fn auth_user(user: IdentityUser, fallback_email: &str) -> AuthUser {
    AuthUser {
        id: user.id,
        email: user.email.unwrap_or_else(|| fallback_email.to_string()),
    }
}

/// Account flows.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn ContentStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl AccountService {
    pub fn new(store: Arc<dyn ContentStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    /// Register an account and create or refresh its profile.
    ///
    /// Returns the user to start a session for, or `None` when the
    /// provider wants the account confirmed first.
    pub async fn signup(&self, form: &SignupForm) -> Result<Option<AuthUser>> {
        let fields = form.field_errors();
        if !fields.is_empty() {
            return Err(AppError::Validation(fields));
        }

        let name = form.name.trim();
        let email = form.email.trim();

        let outcome = self.identity.sign_up(email, &form.password, name).await?;
        let user = outcome.user();

        let created_at = match self.store.get_profile(&user.id).await? {
            Some(existing) => existing.created_at,
            None => now_storage(),
        };
        self.store
            .upsert_profile(&Profile {
                user_id: user.id.clone(),
                name: name.to_string(),
                email: email.to_string(),
                created_at,
            })
            .await?;

        match outcome {
            SignUpOutcome::SignedIn(user) => {
                tracing::info!(user_id = %user.id, "Account created");
                Ok(Some(auth_user(user, email)))
            }
            SignUpOutcome::ConfirmationRequired(user) => {
                tracing::info!(user_id = %user.id, "Account created, awaiting confirmation");
                Ok(None)
            }
        }
    }

    /// Check credentials. The provider's rejection message is passed
    /// through unchanged.
    pub async fn login(&self, form: &LoginForm) -> Result<AuthUser> {
        let email = form.email.trim();
        let user = self
            .identity
            .sign_in_with_password(email, &form.password)
            .await?;

        tracing::info!(user_id = %user.id, "Password login");
        Ok(auth_user(user, email))
    }

    /// Finish an OAuth login. Creates a profile on first login and leaves
    /// an existing one untouched.
    pub async fn oauth_callback(&self, auth_code: &str, code_verifier: &str) -> Result<AuthUser> {
        let user = self.identity.exchange_code(auth_code, code_verifier).await?;

        let profile = Profile {
            user_id: user.id.clone(),
            name: display_name_for(&user),
            email: user.email.clone().unwrap_or_default(),
            created_at: now_storage(),
        };

        let created = self.store.create_profile_if_absent(&profile).await?;
        tracing::info!(user_id = %user.id, new_profile = created, "OAuth login");

        Ok(auth_user(user, ""))
    }

    /// Stored profile of the signed-in user.
    pub async fn profile(&self, user: &AuthUser) -> Result<Profile> {
        self.store
            .get_profile(&user.id)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
    }
}
