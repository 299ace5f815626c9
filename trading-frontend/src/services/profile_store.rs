//! Client for the hosted data store: profile rows plus avatar object
//! storage. Rows live in a `profiles` table keyed by user id; avatars go
//! into a public `avatars` bucket.

use anyhow::Result;
use reqwest::Client;
use secrecy::ExposeSecret;

use crate::config::ProfileStoreSettings;
use crate::models::user::UserProfile;

pub struct ProfileStore {
    client: Client,
    settings: ProfileStoreSettings,
}

impl ProfileStore {
    pub fn new(settings: ProfileStoreSettings) -> Self {
        Self {
            client: Client::new(),
            settings,
        }
    }

    fn rows_url(&self) -> String {
        format!("{}/rest/v1/profiles", self.settings.url.trim_end_matches('/'))
    }

    /// Fetch the profile row for a user, `None` when no row exists yet.
    pub async fn fetch(&self, access_token: &str, user_id: &str) -> Result<Option<UserProfile>> {
        let response = self
            .client
            .get(self.rows_url())
            .query(&[("id", format!("eq.{}", user_id))])
            .header("apikey", self.settings.api_key.expose_secret())
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("Profile fetch failed with status {}", response.status());
        }

        let mut rows: Vec<UserProfile> = response.json().await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    /// Insert-or-update the profile row, keyed by its id.
    pub async fn upsert(&self, access_token: &str, profile: &UserProfile) -> Result<()> {
        let response = self
            .client
            .post(self.rows_url())
            .header("apikey", self.settings.api_key.expose_secret())
            .header("Prefer", "resolution=merge-duplicates")
            .bearer_auth(access_token)
            .json(profile)
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("Profile upsert failed with status {}", response.status());
        }

        Ok(())
    }

    /// Upload an avatar image and return its public URL.
    pub async fn upload_avatar(
        &self,
        access_token: &str,
        user_id: &str,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<String> {
        let base = self.settings.url.trim_end_matches('/');
        let object_path = format!("avatars/{}/{}", user_id, filename);
        let upload_url = format!("{}/storage/v1/object/{}", base, object_path);

        let response = self
            .client
            .post(&upload_url)
            .header("apikey", self.settings.api_key.expose_secret())
            .header("content-type", content_type.to_string())
            .header("x-upsert", "true")
            .bearer_auth(access_token)
            .body(data)
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("Avatar upload failed with status {}", response.status());
        }

        Ok(format!("{}/storage/v1/object/public/{}", base, object_path))
    }
}
