use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::services::identity_client::SessionTokens;
use crate::utils::jwt::decode_jwt_claims;

pub mod session_keys {
    pub const ACCESS_TOKEN: &str = "access_token";
    pub const REFRESH_TOKEN: &str = "refresh_token";
    pub const USER_ID: &str = "user_id";
    pub const EMAIL: &str = "email";
    pub const FULL_NAME: &str = "full_name";
    pub const AVATAR_URL: &str = "avatar_url";
    pub const ONE_TAP_NONCE: &str = "one_tap_nonce";
}

/// Profile row as persisted in the external data store.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default = "default_notifications")]
    pub notifications: bool,
    #[serde(default)]
    pub dark_mode: bool,
}

fn default_notifications() -> bool {
    true
}

impl UserProfile {
    pub fn display_name(&self) -> String {
        match &self.full_name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => self.email.split('@').next().unwrap_or("Trader").to_string(),
        }
    }

    pub fn initials(&self) -> String {
        let name = self.display_name();
        let mut chars = name.chars().filter(|c| c.is_alphanumeric());
        match (chars.next(), chars.next()) {
            (Some(a), Some(b)) => format!("{}{}", a, b).to_uppercase(),
            (Some(a), None) => a.to_uppercase().to_string(),
            _ => "T".to_string(),
        }
    }
}

/// Authenticated user context extracted from the session.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub access_token: String,
}

impl AuthUser {
    /// Fallback profile built from session data alone, used when the
    /// profile store is unreachable or has no row yet.
    pub fn profile_snapshot(&self) -> UserProfile {
        UserProfile {
            id: self.user_id.clone(),
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            avatar_url: self.avatar_url.clone(),
            notifications: true,
            dark_mode: false,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to extract session",
                )
                    .into_response()
            })?;

        let access_token: Option<String> = session
            .get(session_keys::ACCESS_TOKEN)
            .await
            .unwrap_or(None);
        let user_id: Option<String> = session.get(session_keys::USER_ID).await.unwrap_or(None);
        let email: Option<String> = session.get(session_keys::EMAIL).await.unwrap_or(None);

        match (access_token, user_id, email) {
            (Some(token), Some(uid), Some(email_val)) => {
                let full_name: Option<String> =
                    session.get(session_keys::FULL_NAME).await.unwrap_or(None);
                let avatar_url: Option<String> =
                    session.get(session_keys::AVATAR_URL).await.unwrap_or(None);

                Ok(AuthUser {
                    user_id: uid,
                    email: email_val,
                    full_name,
                    avatar_url,
                    access_token: token,
                })
            }
            _ => Err(Redirect::to("/login").into_response()),
        }
    }
}

/// Persist a freshly minted token pair (and the user snapshot it carries)
/// into the browser session.
pub async fn store_session(
    session: &Session,
    tokens: &SessionTokens,
) -> Result<(), tower_sessions::session::Error> {
    session
        .insert(session_keys::ACCESS_TOKEN, &tokens.access_token)
        .await?;
    session
        .insert(session_keys::REFRESH_TOKEN, &tokens.refresh_token)
        .await?;

    // Prefer the user object from the token response; fall back to the
    // claims embedded in the access token itself.
    let (user_id, email, full_name, avatar_url) = match &tokens.user {
        Some(user) => (
            user.id.clone(),
            user.email.clone(),
            user.user_metadata.full_name.clone(),
            user.user_metadata.avatar_url.clone(),
        ),
        None => match decode_jwt_claims(&tokens.access_token) {
            Ok(claims) => (claims.sub, claims.email, None, None),
            Err(e) => {
                tracing::warn!(error = %e, "Token response carried no user and claims were undecodable");
                (String::new(), None, None, None)
            }
        },
    };

    session.insert(session_keys::USER_ID, &user_id).await?;
    if let Some(email) = email {
        session.insert(session_keys::EMAIL, &email).await?;
    }
    if let Some(name) = full_name {
        session.insert(session_keys::FULL_NAME, &name).await?;
    }
    if let Some(url) = avatar_url {
        session.insert(session_keys::AVATAR_URL, &url).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(full_name: Option<&str>, email: &str) -> UserProfile {
        UserProfile {
            id: "u1".into(),
            email: email.into(),
            full_name: full_name.map(Into::into),
            avatar_url: None,
            notifications: true,
            dark_mode: false,
        }
    }

    #[test]
    fn display_name_prefers_full_name() {
        assert_eq!(
            profile(Some("Asha Rao"), "asha@example.com").display_name(),
            "Asha Rao"
        );
        assert_eq!(profile(None, "asha@example.com").display_name(), "asha");
    }

    #[test]
    fn initials_from_display_name() {
        assert_eq!(profile(Some("Asha Rao"), "a@example.com").initials(), "AS");
        assert_eq!(profile(None, "x@example.com").initials(), "X");
    }
}
