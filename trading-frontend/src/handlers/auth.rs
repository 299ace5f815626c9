//! Login, signup and logout flows against the hosted identity provider.

use askama::Template;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tower_sessions::Session;
use validator::Validate;

use crate::handlers::one_tap::{prepare_one_tap, OneTapContext};
use crate::models::form::FormState;
use crate::models::user::{session_keys, store_session};
use crate::utils::password::{strength_score, MIN_SIGNUP_STRENGTH};
use crate::AppState;

/// Fixed credentials behind the "Demo Login" control. The demo account is
/// seeded in the identity provider with virtual funds.
pub const DEMO_EMAIL: &str = "demo@tradingsim.co";
pub const DEMO_PASSWORD: &str = "demo123";

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub state: FormState,
    pub email: String,
    pub one_tap: Option<OneTapContext>,
}

#[derive(Template)]
#[template(path = "signup.html")]
pub struct SignupTemplate {
    pub state: FormState,
    pub full_name: String,
    pub email: String,
    pub one_tap: Option<OneTapContext>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Validate)]
pub struct SignupRequest {
    pub full_name: String,
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    /// Present only when the terms checkbox was ticked.
    #[serde(default)]
    pub terms: Option<String>,
}

pub async fn login_page(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    LoginTemplate {
        state: FormState::Idle,
        email: String::new(),
        one_tap: prepare_one_tap(&state, &session).await,
    }
}

pub async fn signup_page(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    SignupTemplate {
        state: FormState::Idle,
        full_name: String::new(),
        email: String::new(),
        one_tap: prepare_one_tap(&state, &session).await,
    }
}

pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Form(payload): Form<LoginRequest>,
) -> Response {
    attempt_login(&state, &session, &payload.email, &payload.password).await
}

/// One-click demo access: the fixed credentials run through the exact same
/// submit path as a manual login.
pub async fn demo_login_handler(State(state): State<AppState>, session: Session) -> Response {
    attempt_login(&state, &session, DEMO_EMAIL, DEMO_PASSWORD).await
}

async fn attempt_login(
    state: &AppState,
    session: &Session,
    email: &str,
    password: &str,
) -> Response {
    let rerender = |form_state: FormState, email: String, one_tap| {
        LoginTemplate {
            state: form_state,
            email,
            one_tap,
        }
        .into_response()
    };

    if email.trim().is_empty() || password.is_empty() {
        let one_tap = prepare_one_tap(state, session).await;
        return rerender(
            FormState::failed("Email and password are required"),
            email.to_string(),
            one_tap,
        );
    }

    match state.identity.sign_in_with_password(email, password).await {
        Ok(tokens) => {
            if let Err(e) = store_session(session, &tokens).await {
                tracing::error!(error = %e, "Failed to persist session after login");
                let one_tap = prepare_one_tap(state, session).await;
                return rerender(
                    FormState::failed("An error occurred during login"),
                    email.to_string(),
                    one_tap,
                );
            }

            tracing::info!(email = %email, "User logged in successfully");
            Redirect::to("/home").into_response()
        }
        Err(e) => {
            // The service's message is shown verbatim, with no mapping layer.
            let one_tap = prepare_one_tap(state, session).await;
            rerender(FormState::failed(e.to_string()), email.to_string(), one_tap)
        }
    }
}

pub async fn signup_handler(
    State(state): State<AppState>,
    session: Session,
    Form(payload): Form<SignupRequest>,
) -> Response {
    let rerender = |form_state: FormState, full_name: String, email: String, one_tap| {
        SignupTemplate {
            state: form_state,
            full_name,
            email,
            one_tap,
        }
        .into_response()
    };

    // Client-side gates, checked before any network call. The provider
    // still enforces its own policy server-side.
    let local_failure = if payload.terms.is_none() {
        Some("Please agree to the terms and conditions")
    } else if payload.password != payload.confirm_password {
        Some("Passwords do not match")
    } else if strength_score(&payload.password) < MIN_SIGNUP_STRENGTH {
        Some("Please choose a stronger password")
    } else if payload.validate().is_err() {
        Some("Please enter a valid email address")
    } else {
        None
    };

    if let Some(message) = local_failure {
        let one_tap = prepare_one_tap(&state, &session).await;
        return rerender(
            FormState::failed(message),
            payload.full_name,
            payload.email,
            one_tap,
        );
    }

    match state
        .identity
        .sign_up(&payload.email, &payload.password, &payload.full_name)
        .await
    {
        Ok(receipt) => {
            tracing::info!(user_id = %receipt.id, "Signup accepted, confirmation email pending");
            let one_tap = prepare_one_tap(&state, &session).await;
            // The form is cleared on success, matching a fresh page.
            rerender(
                FormState::succeeded(
                    "Registration successful! Please check your email to activate your account.",
                ),
                String::new(),
                String::new(),
                one_tap,
            )
        }
        Err(e) => {
            let one_tap = prepare_one_tap(&state, &session).await;
            rerender(
                FormState::failed(e.to_string()),
                payload.full_name,
                payload.email,
                one_tap,
            )
        }
    }
}

pub async fn logout_handler(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    // Revoke server-side first; the local session is cleared regardless of
    // the outcome, so logout stays idempotent.
    if let Some(access_token) = session
        .get::<String>(session_keys::ACCESS_TOKEN)
        .await
        .unwrap_or(None)
    {
        if let Err(e) = state.identity.sign_out(&access_token).await {
            tracing::error!("Failed to revoke token during logout: {}", e);
        } else {
            tracing::info!("Token revoked successfully");
        }
    }

    session.clear().await;

    Redirect::to("/")
}
