//! Google One Tap bridge.
//!
//! The sign-in pages embed the GSI widget with a hashed nonce; the raw
//! nonce stays in the server session. When Google posts the credential
//! back, the raw nonce is consumed (removed before use, never reusable)
//! and exchanged together with the id token for a session.

use axum::{
    extract::State,
    response::Redirect,
    Form,
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::models::user::{session_keys, store_session};
use crate::utils::nonce;
use crate::AppState;

/// Everything a template needs to render the One Tap widget.
#[derive(Debug, Clone)]
pub struct OneTapContext {
    pub client_id: String,
    pub hashed_nonce: String,
}

/// Mint a fresh nonce pair for this page render and stash the raw half in
/// the session. Returns `None` (and the page renders without the widget)
/// when the secure RNG or the session store is unavailable: a silent
/// degradation, not a failure of the page.
pub async fn prepare_one_tap(state: &AppState, session: &Session) -> Option<OneTapContext> {
    let pair = match nonce::generate() {
        Ok(pair) => pair,
        Err(e) => {
            tracing::warn!(error = %e, "Secure RNG unavailable; skipping One Tap prompt");
            return None;
        }
    };

    if let Err(e) = session.insert(session_keys::ONE_TAP_NONCE, &pair.raw).await {
        tracing::warn!(error = %e, "Failed to store One Tap nonce in session");
        return None;
    }

    Some(OneTapContext {
        client_id: state.identity.google_client_id().to_string(),
        hashed_nonce: pair.hashed,
    })
}

/// Credential POST from the GSI widget. Google also sends a
/// `g_csrf_token` field, which we do not use.
#[derive(Deserialize)]
pub struct OneTapCallback {
    pub credential: String,
}

pub async fn one_tap_callback(
    State(state): State<AppState>,
    session: Session,
    Form(payload): Form<OneTapCallback>,
) -> Redirect {
    // An already-signed-in user gets no second session.
    let existing: Option<String> = session
        .get(session_keys::ACCESS_TOKEN)
        .await
        .unwrap_or(None);
    if existing.is_some() {
        return Redirect::to("/home");
    }

    // Consume the nonce: removed from the session before the exchange so
    // it can never back a second attempt.
    let raw_nonce: Option<String> = session
        .remove(session_keys::ONE_TAP_NONCE)
        .await
        .unwrap_or(None);

    let Some(raw_nonce) = raw_nonce else {
        tracing::warn!("One Tap credential received without a pending nonce");
        return Redirect::to("/login");
    };

    match state
        .identity
        .exchange_identity_token("google", &payload.credential, &raw_nonce)
        .await
    {
        Ok(tokens) => {
            if let Err(e) = store_session(&session, &tokens).await {
                tracing::error!(error = %e, "Failed to persist session after One Tap exchange");
                return Redirect::to("/login");
            }
            tracing::info!("User signed in via Google One Tap");
            Redirect::to("/home")
        }
        Err(e) => {
            // Deliberately no user-facing error surface on this path.
            tracing::error!(error = %e, "Google One Tap sign-in failed");
            Redirect::to("/login")
        }
    }
}
