//! Profile & settings page: display name and preferences persisted to the
//! external data store, avatar upload into object storage, and an
//! in-session password change.

use askama::Template;
use axum::{
    extract::{Multipart, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::models::form::FormState;
use crate::models::user::{session_keys, AuthUser, UserProfile};
use crate::services::identity_client::IdentityError;
use crate::utils::password::validate_policy;
use crate::AppState;

/// Avatar uploads beyond this size are refused before hitting storage.
const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub profile: UserProfile,
    pub state: FormState,
}

#[derive(Deserialize)]
pub struct ProfileUpdateRequest {
    pub full_name: String,
    #[serde(default)]
    pub notifications: Option<String>,
    #[serde(default)]
    pub dark_mode: Option<String>,
}

#[derive(Deserialize)]
pub struct PasswordChangeRequest {
    pub new_password: String,
    pub confirm_password: String,
}

/// Load the stored profile row, falling back to the session snapshot when
/// the store has no row yet or is unreachable.
async fn load_profile(state: &AppState, user: &AuthUser) -> UserProfile {
    match state.profiles.fetch(&user.access_token, &user.user_id).await {
        Ok(Some(profile)) => profile,
        Ok(None) => user.profile_snapshot(),
        Err(e) => {
            tracing::warn!(error = %e, user_id = %user.user_id, "Profile fetch failed");
            user.profile_snapshot()
        }
    }
}

pub async fn profile_page(State(state): State<AppState>, user: AuthUser) -> impl IntoResponse {
    let profile = load_profile(&state, &user).await;
    ProfileTemplate {
        profile,
        state: FormState::Idle,
    }
}

pub async fn profile_update_handler(
    State(state): State<AppState>,
    session: Session,
    user: AuthUser,
    Form(payload): Form<ProfileUpdateRequest>,
) -> Response {
    let mut profile = load_profile(&state, &user).await;
    profile.full_name = Some(payload.full_name.trim().to_string()).filter(|n| !n.is_empty());
    profile.notifications = payload.notifications.is_some();
    profile.dark_mode = payload.dark_mode.is_some();

    match state.profiles.upsert(&user.access_token, &profile).await {
        Ok(()) => {
            // Keep the session's display name in step with the stored row.
            if let Some(name) = &profile.full_name {
                if let Err(e) = session.insert(session_keys::FULL_NAME, name).await {
                    tracing::warn!(error = %e, "Failed to refresh session display name");
                }
            }
            ProfileTemplate {
                profile,
                state: FormState::succeeded("Profile updated successfully!"),
            }
            .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, user_id = %user.user_id, "Profile upsert failed");
            ProfileTemplate {
                profile,
                state: FormState::failed("Could not save your profile. Please try again."),
            }
            .into_response()
        }
    }
}

pub async fn avatar_upload_handler(
    State(state): State<AppState>,
    session: Session,
    user: AuthUser,
    mut multipart: Multipart,
) -> Response {
    let mut upload: Option<(String, String, Vec<u8>)> = None;

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("avatar") => {
                let filename = field
                    .file_name()
                    .map(sanitize_filename)
                    .unwrap_or_else(|| "avatar".to_string());
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                match field.bytes().await {
                    Ok(bytes) => {
                        upload = Some((filename, content_type, bytes.to_vec()));
                        break;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to read avatar upload");
                        break;
                    }
                }
            }
            Ok(Some(_)) => continue,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "Malformed multipart body");
                break;
            }
        }
    }

    let profile = load_profile(&state, &user).await;

    let Some((filename, content_type, bytes)) = upload else {
        return ProfileTemplate {
            profile,
            state: FormState::failed("Please choose an image to upload."),
        }
        .into_response();
    };

    if !content_type.starts_with("image/") {
        return ProfileTemplate {
            profile,
            state: FormState::failed("Profile pictures must be image files."),
        }
        .into_response();
    }
    if bytes.is_empty() || bytes.len() > MAX_AVATAR_BYTES {
        return ProfileTemplate {
            profile,
            state: FormState::failed("Profile pictures must be between 1 byte and 5 MB."),
        }
        .into_response();
    }

    match state
        .profiles
        .upload_avatar(&user.access_token, &user.user_id, &filename, &content_type, bytes)
        .await
    {
        Ok(public_url) => {
            let mut profile = profile;
            profile.avatar_url = Some(public_url.clone());

            if let Err(e) = state.profiles.upsert(&user.access_token, &profile).await {
                tracing::error!(error = %e, "Failed to store avatar URL on profile");
                return ProfileTemplate {
                    profile,
                    state: FormState::failed("Could not save your profile picture."),
                }
                .into_response();
            }
            if let Err(e) = session.insert(session_keys::AVATAR_URL, &public_url).await {
                tracing::warn!(error = %e, "Failed to refresh session avatar");
            }

            ProfileTemplate {
                profile,
                state: FormState::succeeded("Profile picture updated!"),
            }
            .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, user_id = %user.user_id, "Avatar upload failed");
            ProfileTemplate {
                profile,
                state: FormState::failed("Could not upload your profile picture."),
            }
            .into_response()
        }
    }
}

pub async fn password_change_handler(
    State(state): State<AppState>,
    user: AuthUser,
    Form(payload): Form<PasswordChangeRequest>,
) -> Response {
    let profile = load_profile(&state, &user).await;

    if payload.new_password != payload.confirm_password {
        return ProfileTemplate {
            profile,
            state: FormState::failed("New passwords do not match"),
        }
        .into_response();
    }
    if let Err(rule) = validate_policy(&payload.new_password) {
        return ProfileTemplate {
            profile,
            state: FormState::failed(rule),
        }
        .into_response();
    }

    match state
        .identity
        .update_password(&user.access_token, &payload.new_password)
        .await
    {
        Ok(()) => ProfileTemplate {
            profile,
            state: FormState::succeeded("Password updated successfully!"),
        }
        .into_response(),
        Err(IdentityError::SessionMissing) => Redirect::to("/login").into_response(),
        Err(e) => ProfileTemplate {
            profile,
            state: FormState::failed(e.to_string()),
        }
        .into_response(),
    }
}

/// Keep only characters safe for an object-storage key.
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "avatar".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames_are_sanitized_for_storage_keys() {
        assert_eq!(sanitize_filename("me photo.png"), "me_photo.png");
        assert_eq!(sanitize_filename("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_filename(""), "avatar");
    }
}
