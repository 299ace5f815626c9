//! Client for the hosted identity provider.
//!
//! This is the only code path that talks to the identity service. Every
//! operation is a single network call with no retries; failures surface
//! immediately and verbatim to the caller.

use reqwest::{Client, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;

use crate::config::IdentityServiceSettings;

#[derive(Debug, Error)]
pub enum IdentityError {
    /// The service rejected the request; the message is shown to the user
    /// as-is, with no translation layer.
    #[error("{0}")]
    Rejected(String),

    /// A one-time reset code was already consumed or has expired.
    #[error("Invalid or expired reset code")]
    CodeExpired,

    /// An operation that requires an active session was called without one.
    #[error("No active session")]
    SessionMissing,

    #[error("Identity service unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Token pair (plus user snapshot) returned by the identity provider on
/// every successful sign-in or code exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub user: Option<IdentityUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdentityUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Outcome of a signup request: the provider sends a confirmation email
/// before the account becomes usable.
#[derive(Debug, Clone, Deserialize)]
pub struct SignupReceipt {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub confirmation_sent_at: Option<String>,
}

pub struct IdentityClient {
    client: Client,
    settings: IdentityServiceSettings,
}

impl IdentityClient {
    pub fn new(settings: IdentityServiceSettings) -> Self {
        Self {
            client: Client::new(),
            settings,
        }
    }

    pub fn google_client_id(&self) -> &str {
        &self.settings.google_client_id
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.url.trim_end_matches('/'), path)
    }

    async fn post(&self, path: &str, body: serde_json::Value) -> Result<Response, IdentityError> {
        let url = self.url(path);
        let response = self
            .client
            .post(&url)
            .header("apikey", self.settings.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send POST request to {}: {}", url, e);
                e
            })?;
        Ok(response)
    }

    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SessionTokens, IdentityError> {
        let response = self
            .post(
                "/token?grant_type=password",
                serde_json::json!({
                    "email": email,
                    "password": password,
                }),
            )
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(IdentityError::Rejected(service_message(response).await))
        }
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<SignupReceipt, IdentityError> {
        let response = self
            .post(
                "/signup",
                serde_json::json!({
                    "email": email,
                    "password": password,
                    "data": { "full_name": full_name },
                }),
            )
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(IdentityError::Rejected(service_message(response).await))
        }
    }

    /// Ask the provider to email a reset link. The provider does not reveal
    /// whether the address is registered; neither do we.
    pub async fn request_password_reset(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), IdentityError> {
        let response = self
            .post(
                "/recover",
                serde_json::json!({
                    "email": email,
                    "redirect_to": redirect_to,
                }),
            )
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(IdentityError::Rejected(service_message(response).await))
        }
    }

    /// Consume a one-time recovery code for a working session. A code can
    /// be exchanged exactly once; any rejection means the link is spent or
    /// stale and the user must request a new one.
    pub async fn exchange_reset_code(&self, code: &str) -> Result<SessionTokens, IdentityError> {
        let response = self
            .post(
                "/verify",
                serde_json::json!({
                    "type": "recovery",
                    "token": code,
                }),
            )
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            tracing::warn!(
                status = %response.status(),
                "Reset code exchange rejected"
            );
            Err(IdentityError::CodeExpired)
        }
    }

    pub async fn update_password(
        &self,
        access_token: &str,
        new_password: &str,
    ) -> Result<(), IdentityError> {
        let url = self.url("/user");
        let response = self
            .client
            .put(&url)
            .header("apikey", self.settings.api_key.expose_secret())
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "password": new_password }))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send PUT request to {}: {}", url, e);
                e
            })?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED => Err(IdentityError::SessionMissing),
            _ => Err(IdentityError::Rejected(service_message(response).await)),
        }
    }

    /// Revoke the session server-side. Local session state is cleared by
    /// the caller regardless of the outcome here.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        let url = self.url("/logout");
        let response = self
            .client
            .post(&url)
            .header("apikey", self.settings.api_key.expose_secret())
            .bearer_auth(access_token)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(IdentityError::Rejected(service_message(response).await))
        }
    }

    /// Exchange a third-party identity token for a session. The provider
    /// hashes `raw_nonce` and compares it against the nonce claim inside
    /// the token, rejecting replayed or tampered prompts.
    pub async fn exchange_identity_token(
        &self,
        provider: &str,
        id_token: &str,
        raw_nonce: &str,
    ) -> Result<SessionTokens, IdentityError> {
        let response = self
            .post(
                "/token?grant_type=id_token",
                serde_json::json!({
                    "provider": provider,
                    "id_token": id_token,
                    "nonce": raw_nonce,
                }),
            )
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(IdentityError::Rejected(service_message(response).await))
        }
    }
}

/// Pull the human-readable message out of an error response body. The
/// provider uses a few different field names across endpoints.
async fn service_message(response: Response) -> String {
    let status = response.status();
    let body: serde_json::Value = response.json().await.unwrap_or_default();

    for field in ["error_description", "msg", "message", "error"] {
        if let Some(msg) = body.get(field).and_then(|v| v.as_str()) {
            return msg.to_string();
        }
    }

    format!("Authentication failed ({})", status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_tokens_deserialize_with_user_snapshot() {
        let tokens: SessionTokens = serde_json::from_str(
            r#"{
                "access_token": "at",
                "refresh_token": "rt",
                "expires_in": 3600,
                "user": {
                    "id": "u-1",
                    "email": "a@b.co",
                    "user_metadata": { "full_name": "A B" }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(tokens.access_token, "at");
        let user = tokens.user.unwrap();
        assert_eq!(user.id, "u-1");
        assert_eq!(user.user_metadata.full_name.as_deref(), Some("A B"));
    }

    #[test]
    fn session_tokens_tolerate_missing_user() {
        let tokens: SessionTokens =
            serde_json::from_str(r#"{"access_token":"at","refresh_token":"rt"}"#).unwrap();
        assert!(tokens.user.is_none());
        assert!(tokens.expires_in.is_none());
    }
}
