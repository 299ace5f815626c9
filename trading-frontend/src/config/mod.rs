use secrecy::Secret;
use serde::Deserialize;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub site: SiteSettings,
    pub identity_service: IdentityServiceSettings,
    pub profile_store: ProfileStoreSettings,
    pub observability: ObservabilitySettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Clone)]
pub struct SiteSettings {
    /// Browser-facing base URL of this frontend, used to build the
    /// password-reset redirect link. When absent, the request's own origin
    /// is used, then a localhost default.
    #[serde(default)]
    pub public_url: Option<String>,
}

#[derive(Deserialize, Clone)]
pub struct IdentityServiceSettings {
    /// Base URL of the hosted identity provider's auth API.
    pub url: String,
    /// Project API key sent alongside every auth call.
    pub api_key: Secret<String>,
    /// OAuth client id for the Google One Tap widget.
    pub google_client_id: String,
}

#[derive(Deserialize, Clone)]
pub struct ProfileStoreSettings {
    /// Base URL of the hosted data store (row API + object storage).
    pub url: String,
    pub api_key: Secret<String>,
}

#[derive(Deserialize, Clone)]
pub struct ObservabilitySettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// OTLP collector endpoint; spans are exported only when set.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");

    // Check if we're already in trading-frontend directory or need to navigate to it
    let configuration_directory = if base_path.ends_with("trading-frontend") {
        base_path.join("config")
    } else {
        base_path.join("trading-frontend").join("config")
    };

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")).required(true))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
