// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request},
    response::Response,
};
use concept_hub::config::{Config, SESSION_COOKIE};
use concept_hub::db::{FirestoreDb, MemoryDb};
use concept_hub::error::AppError;
use concept_hub::middleware::auth::{create_jwt, AuthUser};
use concept_hub::routes::create_router;
use concept_hub::services::identity::{SignUpOutcome, UserMetadata};
use concept_hub::services::{ConceptCatalog, IdentityProvider, IdentityUser};
use concept_hub::AppState;
use std::sync::{Arc, Mutex};

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Password the stub identity provider accepts.
#[allow(dead_code)]
pub const GOOD_PASSWORD: &str = "hunter22";

/// In-process identity provider.
///
/// Accepts [`GOOD_PASSWORD`] for any email, and OAuth codes of the form
/// `ok-<user id>`. Signups at `pending.example.com` need confirmation.
/// Records the last PKCE verifier it was given.
#[derive(Default)]
pub struct StubIdentity {
    pub last_verifier: Mutex<Option<String>>,
}

#[async_trait]
impl IdentityProvider for StubIdentity {
    async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        name: &str,
    ) -> Result<SignUpOutcome, AppError> {
        if email == "taken@example.com" {
            return Err(AppError::IdentityRejected(
                "User already registered".to_string(),
            ));
        }
        let user = IdentityUser {
            id: format!("user-{}", email),
            email: Some(email.to_string()),
            metadata: UserMetadata {
                full_name: None,
                name: Some(name.to_string()),
            },
        };
        if email.ends_with("@pending.example.com") {
            return Ok(SignUpOutcome::ConfirmationRequired(user));
        }
        Ok(SignUpOutcome::SignedIn(user))
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<IdentityUser, AppError> {
        if password != GOOD_PASSWORD {
            return Err(AppError::IdentityRejected(
                "Invalid login credentials".to_string(),
            ));
        }
        Ok(IdentityUser {
            id: format!("user-{}", email),
            email: Some(email.to_string()),
            metadata: UserMetadata::default(),
        })
    }

    fn authorize_url(&self, provider: &str, redirect_to: &str, code_challenge: &str) -> String {
        format!(
            "https://auth.test/authorize?provider={}&redirect_to={}&code_challenge={}",
            provider,
            urlencoding::encode(redirect_to),
            code_challenge
        )
    }

    async fn exchange_code(
        &self,
        auth_code: &str,
        code_verifier: &str,
    ) -> Result<IdentityUser, AppError> {
        *self.last_verifier.lock().unwrap() = Some(code_verifier.to_string());

        let id = auth_code
            .strip_prefix("ok-")
            .ok_or_else(|| AppError::IdentityRejected("invalid code".to_string()))?;
        Ok(IdentityUser {
            id: id.to_string(),
            email: Some(format!("{}@example.com", id)),
            metadata: UserMetadata {
                full_name: Some("OAuth Person".to_string()),
                name: None,
            },
        })
    }
}

/// Handles to the pieces behind a test router.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub db: MemoryDb,
    pub identity: Arc<StubIdentity>,
}

/// Create a test app over an in-memory store and the shipped catalog.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    create_test_app_with_config(Config::test_default())
}

fn shipped_catalog() -> ConceptCatalog {
    ConceptCatalog::load_from_file(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/data/concepts.json"
    ))
    .expect("Shipped catalog should load")
}

#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config) -> TestApp {
    let catalog = shipped_catalog();

    let db = MemoryDb::new();
    let identity = Arc::new(StubIdentity::default());

    let state = Arc::new(AppState::new(
        config,
        catalog,
        Arc::new(db.clone()),
        identity.clone(),
    ));

    TestApp {
        router: create_router(state.clone()),
        state,
        db,
        identity,
    }
}

/// Create a test router over an in-memory store that talks to a real
/// identity provider client.
#[allow(dead_code)]
pub fn create_test_router_with_identity(
    identity: Arc<dyn IdentityProvider>,
) -> (axum::Router, MemoryDb) {
    let db = MemoryDb::new();
    let state = Arc::new(AppState::new(
        Config::test_default(),
        shipped_catalog(),
        Arc::new(db.clone()),
        identity,
    ));
    (create_router(state), db)
}

/// Session token for `user_id` signed with the test key.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str) -> String {
    let user = AuthUser {
        id: user_id.to_string(),
        email: format!("{}@example.com", user_id),
    };
    create_jwt(&user, &Config::test_default().jwt_signing_key).unwrap()
}

/// `Cookie` header value carrying a session for `user_id`.
#[allow(dead_code)]
pub fn session_cookie(user_id: &str) -> String {
    format!("{}={}", SESSION_COOKIE, create_test_jwt(user_id))
}

/// Build a request, optionally signed in as `user`, with an optional JSON body.
#[allow(dead_code)]
pub fn request(
    method: &str,
    uri: &str,
    user: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(header::COOKIE, session_cookie(user));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// All `Set-Cookie` header values on a response.
#[allow(dead_code)]
pub fn set_cookie_headers(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}
