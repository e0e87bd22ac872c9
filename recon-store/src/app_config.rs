use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub webhooks: WebhookConfig,
    pub submit: SubmitConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WebhookConfig {
    /// Base URL of the n8n instance hosting the proxy webhooks.
    pub base_url: String,
    #[serde(default = "default_services_name_path")]
    pub services_name_path: String,
    #[serde(default = "default_contract_services_path")]
    pub contract_services_path: String,
    #[serde(default = "default_mapping_path")]
    pub mapping_path: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SubmitConfig {
    /// Fixed delay between consecutive mapping submissions.
    #[serde(default = "default_submit_delay_ms")]
    pub delay_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// "memory" or "file".
    #[serde(default = "default_session_backend")]
    pub backend: String,
    #[serde(default = "default_session_file")]
    pub file_path: String,
}

fn default_services_name_path() -> String {
    "/webhook/getservicesname".to_string()
}

fn default_contract_services_path() -> String {
    "/webhook/getservices".to_string()
}

fn default_mapping_path() -> String {
    "/webhook/sendmappingdatalatest".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_submit_delay_ms() -> u64 {
    400
}

fn default_session_backend() -> String {
    "file".to_string()
}

fn default_session_file() -> String {
    "data/session.json".to_string()
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file
            // Default to 'development' env
            // Note that this file is _optional_
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file
            // This file shouldn't be checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of RECON)
            // Eg.. `RECON_SERVER__PORT=8090` would set the server port
            .add_source(config::Environment::with_prefix("RECON").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
