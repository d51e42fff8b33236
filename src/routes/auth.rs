// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account routes: signup, login, Google OAuth and logout.
//!
//! Successful logins set the `hub_session` cookie holding our own JWT.
//! Google logins also set a short-lived `hub_oauth` cookie holding the
//! state nonce, so only the browser that started a login can finish it.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::config::{Config, SESSION_COOKIE};
use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, AuthUser, SESSION_TTL_SECS};
use crate::routes::actions::ActionOk;
use crate::services::accounts::{LoginForm, SignupForm};
use crate::AppState;

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

/// How long a user may take on the provider's consent screen.
const STATE_TTL_MS: u128 = 10 * 60 * 1000;

const OAUTH_PROVIDER: &str = "google";
const OAUTH_COOKIE: &str = "hub_oauth";
const OAUTH_COOKIE_PATH: &str = "/auth";
const CALLBACK_FAILED_PATH: &str = "/login?error=auth_callback_failed";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/google", get(google_start))
        .route("/auth/callback", get(oauth_callback))
        .route("/auth/logout", post(logout))
}

// ─── Session Cookie ──────────────────────────────────────────

fn session_cookie(config: &Config, token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(config.site_url.starts_with("https://"))
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(
            i64::try_from(SESSION_TTL_SECS).unwrap_or(i64::MAX),
        ))
        .build()
}

fn oauth_cookie(config: &Config, nonce: String) -> Cookie<'static> {
    Cookie::build((OAUTH_COOKIE, nonce))
        .path(OAUTH_COOKIE_PATH)
        .http_only(true)
        .secure(config.site_url.starts_with("https://"))
        .same_site(SameSite::Lax)
        .max_age(time::Duration::milliseconds(
            i64::try_from(STATE_TTL_MS).unwrap_or(i64::MAX),
        ))
        .build()
}

fn start_session(state: &AppState, jar: CookieJar, user: &AuthUser) -> Result<CookieJar> {
    let token = create_jwt(user, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;
    Ok(jar.add(session_cookie(&state.config, token)))
}

/// User identity returned after signup or login.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionResponse {
    pub user_id: String,
    pub email: String,
}

impl From<AuthUser> for SessionResponse {
    fn from(user: AuthUser) -> Self {
        Self {
            user_id: user.id,
            email: user.email,
        }
    }
}

// ─── Password Accounts ───────────────────────────────────────

/// Sign up. Answers `{}` without a cookie when the account still has to
/// be confirmed.
async fn signup(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(form): Json<SignupForm>,
) -> Result<Response> {
    match state.accounts.signup(&form).await? {
        Some(user) => {
            let jar = start_session(&state, jar, &user)?;
            Ok((jar, Json(SessionResponse::from(user))).into_response())
        }
        None => Ok(Json(ActionOk {}).into_response()),
    }
}

async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(form): Json<LoginForm>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let user = state.accounts.login(&form).await?;
    let jar = start_session(&state, jar, &user)?;
    Ok((jar, Json(user.into())))
}

async fn logout(jar: CookieJar) -> (CookieJar, Json<ActionOk>) {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Json(ActionOk {}))
}

// ─── OAuth ───────────────────────────────────────────────────

fn now_millis() -> Result<u128> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_millis())
}

fn mac_hex(secret: &[u8], data: &str) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(data.as_bytes());
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// PKCE verifier for a state nonce. Derived from the state key, so it
/// never has to leave the server or be stored between the two requests.
fn pkce_verifier(secret: &[u8], nonce: &str) -> Option<String> {
    mac_hex(secret, &format!("pkce|{}", nonce))
}

fn pkce_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// Build a signed state parameter: base64("nonce|timestamp_hex|signature_hex").
fn sign_state(secret: &[u8], nonce: &str, now_ms: u128) -> Option<String> {
    let payload = format!("{}|{:x}", nonce, now_ms);
    let signature = mac_hex(secret, &payload)?;
    Some(URL_SAFE_NO_PAD.encode(format!("{}|{}", payload, signature)))
}

/// Verify a state parameter's signature and age. Returns its nonce.
fn verify_state(state: &str, secret: &[u8], now_ms: u128) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(state).ok()?;
    let state_str = String::from_utf8(bytes).ok()?;

    let mut parts = state_str.splitn(3, '|');
    let (nonce, timestamp_hex, signature_hex) = (parts.next()?, parts.next()?, parts.next()?);

    let expected = mac_hex(secret, &format!("{}|{}", nonce, timestamp_hex))?;
    if !bool::from(expected.as_bytes().ct_eq(signature_hex.as_bytes())) {
        tracing::warn!("OAuth state signature mismatch");
        return None;
    }

    let issued_ms = u128::from_str_radix(timestamp_hex, 16).ok()?;
    if now_ms.saturating_sub(issued_ms) > STATE_TTL_MS {
        tracing::warn!("OAuth state expired");
        return None;
    }

    Some(nonce.to_string())
}

/// Whether the nonce cookie sent by the browser matches the state's nonce.
fn nonce_matches(browser_nonce: Option<&str>, state_nonce: &str) -> bool {
    browser_nonce.is_some_and(|n| bool::from(n.as_bytes().ct_eq(state_nonce.as_bytes())))
}

/// Start Google login through the identity provider.
async fn google_start(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect)> {
    let key = &state.config.oauth_state_key;
    let nonce = uuid::Uuid::new_v4().simple().to_string();

    let (oauth_state, verifier) = sign_state(key, &nonce, now_millis()?)
        .zip(pkce_verifier(key, &nonce))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("HMAC init failed")))?;

    // The state rides along inside the callback URL
    let callback_url = format!(
        "{}?state={}",
        state.config.oauth_callback_url(),
        oauth_state
    );

    let auth_url = state.identity.authorize_url(
        OAUTH_PROVIDER,
        &callback_url,
        &pkce_challenge(&verifier),
    );

    tracing::info!(provider = OAUTH_PROVIDER, "Starting OAuth flow");
    let jar = jar.add(oauth_cookie(&state.config, nonce));
    Ok((jar, Redirect::temporary(&auth_url)))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback: exchange the code, create the profile on first login,
/// start a session and send the browser back to the frontend.
async fn oauth_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> (CookieJar, Redirect) {
    let frontend_url = state.config.frontend_url.trim_end_matches('/').to_string();

    // The nonce cookie is single use, whatever the outcome
    let browser_nonce = jar.get(OAUTH_COOKIE).map(|c| c.value().to_string());
    let jar = jar.remove(Cookie::build(OAUTH_COOKIE).path(OAUTH_COOKIE_PATH));

    match complete_oauth(&state, jar.clone(), browser_nonce, params).await {
        Ok(jar) => (jar, Redirect::temporary(&format!("{}/", frontend_url))),
        Err(e) => {
            tracing::warn!(error = %e, "OAuth callback failed");
            (
                jar,
                Redirect::temporary(&format!("{}{}", frontend_url, CALLBACK_FAILED_PATH)),
            )
        }
    }
}

async fn complete_oauth(
    state: &AppState,
    jar: CookieJar,
    browser_nonce: Option<String>,
    params: CallbackParams,
) -> Result<CookieJar> {
    if let Some(error) = params.error {
        return Err(AppError::IdentityRejected(error));
    }

    let (code, oauth_state) = params
        .code
        .zip(params.state)
        .ok_or_else(|| AppError::BadRequest("Missing code or state".to_string()))?;

    let key = &state.config.oauth_state_key;
    let nonce = verify_state(&oauth_state, key, now_millis()?)
        .ok_or_else(|| AppError::BadRequest("Invalid OAuth state".to_string()))?;

    if !nonce_matches(browser_nonce.as_deref(), &nonce) {
        return Err(AppError::BadRequest(
            "OAuth state was not issued to this browser".to_string(),
        ));
    }

    let verifier = pkce_verifier(key, &nonce)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("HMAC init failed")))?;

    let user = state.accounts.oauth_callback(&code, &verifier).await?;
    start_session(state, jar, &user)
}
