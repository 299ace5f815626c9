pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;
pub mod utils;

use config::SiteSettings;
use services::{identity_client::IdentityClient, profile_store::ProfileStore};
use std::sync::Arc;

/// Shared application state containing service clients
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<IdentityClient>,
    pub profiles: Arc<ProfileStore>,
    pub site: SiteSettings,
}

impl AppState {
    pub fn new(identity: Arc<IdentityClient>, profiles: Arc<ProfileStore>, site: SiteSettings) -> Self {
        Self {
            identity,
            profiles,
            site,
        }
    }
}
