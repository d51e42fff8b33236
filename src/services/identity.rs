// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity provider client.
//!
//! Account credentials and OAuth live in an external GoTrue-compatible
//! auth server. This module only talks to it; sessions are our own JWTs
//! (see [`crate::middleware::auth`]).

use crate::error::AppError;
use async_trait::async_trait;
use serde::Deserialize;

/// User as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IdentityUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "user_metadata", default)]
    pub metadata: UserMetadata,
}

/// Profile hints supplied at signup or by the OAuth provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Result of a signup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// The provider issued a session; the user is signed in.
    SignedIn(IdentityUser),
    /// The account exists but must be confirmed before it can sign in.
    ConfirmationRequired(IdentityUser),
}

impl SignUpOutcome {
    pub fn user(&self) -> &IdentityUser {
        match self {
            Self::SignedIn(user) | Self::ConfirmationRequired(user) => user,
        }
    }
}

/// External authentication service.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register a new email/password account.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<SignUpOutcome, AppError>;

    /// Check email/password credentials.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<IdentityUser, AppError>;

    /// URL that starts an OAuth login with `provider` (e.g. `google`).
    ///
    /// The provider redirects back to `redirect_to` with a `code` that is
    /// redeemed with the verifier matching `code_challenge` (PKCE, S256).
    fn authorize_url(&self, provider: &str, redirect_to: &str, code_challenge: &str) -> String;

    /// Redeem an OAuth authorization code.
    async fn exchange_code(
        &self,
        auth_code: &str,
        code_verifier: &str,
    ) -> Result<IdentityUser, AppError>;
}

/// REST client for a GoTrue-compatible auth server.
#[derive(Clone)]
pub struct GoTrueClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

/// Session returned by the token endpoints. Only the user is kept.
#[derive(Deserialize)]
struct SessionResponse {
    user: IdentityUser,
}

/// Signup returns a session when email confirmation is off and a bare
/// user when it is on.
#[derive(Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(SessionResponse),
    User(IdentityUser),
}

/// Error bodies differ between endpoints and server versions.
#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
    }
}

impl GoTrueClient {
    /// `base_url` is the project URL; endpoints live under `/auth/v1`.
    pub fn new(base_url: &str, anon_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: format!("{}/auth/v1", base_url.trim_end_matches('/')),
            anon_key,
        }
    }

    async fn post_json<T: for<'de> Deserialize<'de>>(
        &self,
        path_and_query: &str,
        body: serde_json::Value,
    ) -> Result<T, AppError> {
        let url = format!("{}{}", self.base_url, path_and_query);

        let response = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Identity(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Check response and parse JSON body.
    ///
    /// Client errors carry a message meant for the user and become
    /// `IdentityRejected`; anything else is an upstream failure.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            if status.is_client_error() && status.as_u16() != 429 {
                let message = serde_json::from_str::<ErrorBody>(&body)
                    .ok()
                    .and_then(ErrorBody::into_message)
                    .unwrap_or_else(|| "Authentication failed".to_string());
                return Err(AppError::IdentityRejected(message));
            }

            if status.as_u16() == 429 {
                tracing::warn!("Identity provider rate limit hit (429)");
            }

            return Err(AppError::Identity(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Identity(format!("JSON parse error: {}", e)))
    }
}

#[async_trait]
impl IdentityProvider for GoTrueClient {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<SignUpOutcome, AppError> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "data": { "name": name },
        });

        let outcome = match self.post_json::<SignUpResponse>("/signup", body).await? {
            SignUpResponse::Session(session) => SignUpOutcome::SignedIn(session.user),
            SignUpResponse::User(user) => SignUpOutcome::ConfirmationRequired(user),
        };

        tracing::info!(
            user_id = %outcome.user().id,
            signed_in = matches!(outcome, SignUpOutcome::SignedIn(_)),
            "Identity provider signup succeeded"
        );
        Ok(outcome)
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<IdentityUser, AppError> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
        });

        let session: SessionResponse = self
            .post_json("/token?grant_type=password", body)
            .await?;
        Ok(session.user)
    }

    fn authorize_url(&self, provider: &str, redirect_to: &str, code_challenge: &str) -> String {
        format!(
            "{}/authorize?\
             provider={}&\
             redirect_to={}&\
             code_challenge={}&\
             code_challenge_method=s256",
            self.base_url,
            urlencoding::encode(provider),
            urlencoding::encode(redirect_to),
            urlencoding::encode(code_challenge),
        )
    }

    async fn exchange_code(
        &self,
        auth_code: &str,
        code_verifier: &str,
    ) -> Result<IdentityUser, AppError> {
        let body = serde_json::json!({
            "auth_code": auth_code,
            "code_verifier": code_verifier,
        });

        let session: SessionResponse = self.post_json("/token?grant_type=pkce", body).await?;
        Ok(session.user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, http::StatusCode, routing::post, Json, Router};
    use std::collections::HashMap;

    /// Serve a minimal fake auth server on an ephemeral port.
    async fn fake_server() -> String {
        let app = Router::new()
            .route(
                "/auth/v1/signup",
                post(|Json(body): Json<serde_json::Value>| async move {
                    if body["email"] == "taken@example.com" {
                        return (
                            StatusCode::UNPROCESSABLE_ENTITY,
                            Json(serde_json::json!({
                                "code": 422,
                                "msg": "User already registered"
                            })),
                        );
                    }
                    if body["email"] == "instant@example.com" {
                        return (
                            StatusCode::OK,
                            Json(serde_json::json!({
                                "access_token": "ignored",
                                "user": { "id": "instant-user", "email": body["email"] }
                            })),
                        );
                    }
                    // Confirmation required: bare user, no session
                    (
                        StatusCode::OK,
                        Json(serde_json::json!({
                            "id": "new-user",
                            "email": body["email"],
                            "user_metadata": { "name": body["data"]["name"] }
                        })),
                    )
                }),
            )
            .route(
                "/auth/v1/token",
                post(
                    |Query(q): Query<HashMap<String, String>>,
                     Json(body): Json<serde_json::Value>| async move {
                        let ok = match q.get("grant_type").map(String::as_str) {
                            Some("password") => body["password"] == "hunter22",
                            Some("pkce") => body["code_verifier"] == "verifier",
                            _ => false,
                        };
                        if !ok {
                            return (
                                StatusCode::BAD_REQUEST,
                                Json(serde_json::json!({
                                    "error": "invalid_grant",
                                    "error_description": "Invalid login credentials"
                                })),
                            );
                        }
                        (
                            StatusCode::OK,
                            Json(serde_json::json!({
                                "access_token": "ignored",
                                "user": {
                                    "id": "user-1",
                                    "email": "ada@example.com",
                                    "user_metadata": { "full_name": "Ada Lovelace" }
                                }
                            })),
                        )
                    },
                ),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_sign_up_bare_user_response() {
        let client = GoTrueClient::new(&fake_server().await, "anon".to_string());
        let outcome = client
            .sign_up("new@example.com", "hunter22", "Newbie")
            .await
            .unwrap();
        let user = match outcome {
            SignUpOutcome::ConfirmationRequired(user) => user,
            other => panic!("bare user must not count as signed in: {:?}", other),
        };
        assert_eq!(user.id, "new-user");
        assert_eq!(user.metadata.name.as_deref(), Some("Newbie"));
    }

    #[tokio::test]
    async fn test_sign_up_session_response() {
        let client = GoTrueClient::new(&fake_server().await, "anon".to_string());
        let outcome = client
            .sign_up("instant@example.com", "hunter22", "Quick")
            .await
            .unwrap();
        assert!(matches!(outcome, SignUpOutcome::SignedIn(ref u) if u.id == "instant-user"));
    }

    #[tokio::test]
    async fn test_sign_up_rejection_surfaces_message() {
        let client = GoTrueClient::new(&fake_server().await, "anon".to_string());
        let err = client
            .sign_up("taken@example.com", "hunter22", "Someone")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::IdentityRejected(ref m) if m == "User already registered"));
    }

    #[tokio::test]
    async fn test_password_sign_in() {
        let client = GoTrueClient::new(&fake_server().await, "anon".to_string());

        let user = client
            .sign_in_with_password("ada@example.com", "hunter22")
            .await
            .unwrap();
        assert_eq!(user.metadata.full_name.as_deref(), Some("Ada Lovelace"));

        let err = client
            .sign_in_with_password("ada@example.com", "wrong")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid login credentials");
    }

    #[tokio::test]
    async fn test_exchange_code() {
        let client = GoTrueClient::new(&fake_server().await, "anon".to_string());
        assert_eq!(
            client.exchange_code("code", "verifier").await.unwrap().id,
            "user-1"
        );
        assert!(client.exchange_code("code", "other").await.is_err());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_upstream_error() {
        let client = GoTrueClient::new("http://127.0.0.1:1", "anon".to_string());
        let err = client
            .sign_in_with_password("ada@example.com", "hunter22")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Identity(_)));
    }

    #[test]
    fn test_authorize_url() {
        let client = GoTrueClient::new("https://auth.example.com/", "anon".to_string());
        let url = client.authorize_url("google", "https://hub.example.com/auth/callback", "abc");
        assert_eq!(
            url,
            "https://auth.example.com/auth/v1/authorize?provider=google&\
             redirect_to=https%3A%2F%2Fhub.example.com%2Fauth%2Fcallback&\
             code_challenge=abc&code_challenge_method=s256"
        );
    }
}
