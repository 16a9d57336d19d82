//! Service configuration
//!
//! Settings are built from defaults overridden by `REGISTRY_*` environment
//! variables; nested keys use `__` (e.g. `REGISTRY_SERVER__PORT=9000`,
//! `REGISTRY_MAIL__SMTP_HOST=smtp.example.com`).

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// HTTP server settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Origin allowed by CORS
    pub frontend_origin: String,
    /// Base URL used to build links in outgoing emails
    pub app_base_url: String,
}

/// Object storage settings for gift images
#[derive(Debug, Clone, Deserialize)]
pub struct ImageSettings {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for S3-compatible stores
    pub endpoint: Option<String>,
    /// Public HTTPS prefix of stored objects
    pub public_base_url: Option<String>,
    pub folder: String,
}

impl ImageSettings {
    pub fn public_base_url(&self) -> String {
        match &self.public_base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}.s3.{}.amazonaws.com", self.bucket, self.region),
        }
    }
}

/// Outgoing email settings; without `smtp_host` mail is only logged
#[derive(Debug, Clone, Deserialize)]
pub struct MailSettings {
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    pub from_address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub images: ImageSettings,
    pub mail: MailSettings,
}

impl Settings {
    /// Load settings from the environment
    pub fn load() -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.frontend_origin", "http://localhost:3000")?
            .set_default("server.app_base_url", "http://localhost:3000")?
            .set_default("images.bucket", "gift-registry")?
            .set_default("images.region", "us-east-1")?
            .set_default("images.folder", "gift-registry")?
            .set_default("mail.smtp_port", 587)?
            .set_default("mail.from_address", "noreply@giftregistry.local")?
            .add_source(
                Environment::with_prefix("REGISTRY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.images.public_base_url().starts_with("https://") {
            return Err(ConfigError::Message(
                "images.public_base_url must start with https://".to_string(),
            ));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
