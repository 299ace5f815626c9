//! Password recovery: the forgot-password request form and the
//! reset-password page reached from the emailed link.
//!
//! The emailed link carries a one-time code. The reset page exchanges it
//! for a session before the user may set a new password; a spent or stale
//! code sends the user back to request a fresh link. Delayed redirects use
//! the HTTP `Refresh` header, so navigating away simply drops them.

use askama::Template;
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use tower_sessions::Session;
use validator::Validate;

use crate::models::form::FormState;
use crate::models::user::{session_keys, store_session};
use crate::utils::password::validate_policy;
use crate::utils::url::{absolute_url, request_origin};
use crate::AppState;

/// Seconds before the expired-link view bounces back to `/forgot-password`.
const EXPIRED_REDIRECT_SECS: u8 = 3;
/// Seconds before the post-update view bounces to `/login`.
const UPDATED_REDIRECT_SECS: u8 = 2;

#[derive(Template)]
#[template(path = "forgot_password.html")]
pub struct ForgotPasswordTemplate {
    pub state: FormState,
    pub email: String,
}

#[derive(Template)]
#[template(path = "reset_password.html")]
pub struct ResetPasswordTemplate {
    pub state: FormState,
    pub link_expired: bool,
}

#[derive(Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
}

#[derive(Deserialize)]
pub struct ResetQuery {
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub password: String,
    pub confirm_password: String,
}

pub async fn forgot_password_page() -> impl IntoResponse {
    ForgotPasswordTemplate {
        state: FormState::Idle,
        email: String::new(),
    }
}

pub async fn forgot_password_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(payload): Form<ForgotPasswordRequest>,
) -> Response {
    if payload.validate().is_err() {
        return ForgotPasswordTemplate {
            state: FormState::failed("Please enter a valid email address"),
            email: payload.email,
        }
        .into_response();
    }

    let redirect_to = absolute_url(
        state.site.public_url.as_deref(),
        request_origin(&headers).as_deref(),
        "/reset-password",
    );

    match state
        .identity
        .request_password_reset(&payload.email, &redirect_to)
        .await
    {
        // The provider does not reveal whether the address is registered,
        // and neither do we: any accepted send reads as success.
        Ok(()) => ForgotPasswordTemplate {
            state: FormState::succeeded(
                "Password reset instructions have been sent to your email address.",
            ),
            email: String::new(),
        }
        .into_response(),
        Err(e) => ForgotPasswordTemplate {
            state: FormState::failed(e.to_string()),
            email: payload.email,
        }
        .into_response(),
    }
}

/// Establish a reset session: an already-present session wins, otherwise
/// the one-time code from the emailed link is exchanged. With neither, the
/// link is treated as spent and the user is sent back to re-request one.
pub async fn reset_password_page(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<ResetQuery>,
) -> Response {
    let existing: Option<String> = session
        .get(session_keys::ACCESS_TOKEN)
        .await
        .unwrap_or(None);
    if existing.is_some() {
        return reset_form(FormState::Idle);
    }

    match params.code.as_deref().filter(|c| !c.is_empty()) {
        Some(code) => match state.identity.exchange_reset_code(code).await {
            Ok(tokens) => {
                if let Err(e) = store_session(&session, &tokens).await {
                    tracing::error!(error = %e, "Failed to persist reset session");
                    return expired_view();
                }
                reset_form(FormState::Idle)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Reset code exchange failed");
                expired_view()
            }
        },
        None => expired_view(),
    }
}

pub async fn reset_password_handler(
    State(state): State<AppState>,
    session: Session,
    Form(payload): Form<ResetPasswordRequest>,
) -> Response {
    // Both checks run before any network call.
    if payload.password != payload.confirm_password {
        return reset_form(FormState::failed("Passwords do not match."));
    }
    if let Err(rule) = validate_policy(&payload.password) {
        return reset_form(FormState::failed(rule));
    }

    let access_token: Option<String> = session
        .get(session_keys::ACCESS_TOKEN)
        .await
        .unwrap_or(None);
    let Some(access_token) = access_token else {
        return expired_view();
    };

    match state
        .identity
        .update_password(&access_token, &payload.password)
        .await
    {
        Ok(()) => {
            // Sign the reset session out so the user must authenticate with
            // the new password.
            if let Err(e) = state.identity.sign_out(&access_token).await {
                tracing::warn!(error = %e, "Failed to revoke reset session");
            }
            session.clear().await;

            (
                [("refresh", format!("{};url=/login", UPDATED_REDIRECT_SECS))],
                ResetPasswordTemplate {
                    state: FormState::succeeded(
                        "Your password has been updated successfully! \
                         You can now log in with your new password.",
                    ),
                    link_expired: false,
                },
            )
                .into_response()
        }
        Err(crate::services::identity_client::IdentityError::SessionMissing) => expired_view(),
        Err(e) => reset_form(FormState::failed(e.to_string())),
    }
}

fn reset_form(state: FormState) -> Response {
    ResetPasswordTemplate {
        state,
        link_expired: false,
    }
    .into_response()
}

fn expired_view() -> Response {
    (
        [(
            "refresh",
            format!("{};url=/forgot-password", EXPIRED_REDIRECT_SECS),
        )],
        ResetPasswordTemplate {
            state: FormState::Idle,
            link_expired: true,
        },
    )
        .into_response()
}
