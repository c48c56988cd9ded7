use std::sync::OnceLock;

use serde::Deserialize;

pub const DEV_SESSION_SECRET: &str = "notes-tasks-dev-secret";

#[derive(Deserialize, Debug)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default)]
    pub log_json: bool,

    // session
    #[serde(default = "default_session_secret")]
    pub session_secret: String,
    #[serde(default = "default_session_max_age_secs")]
    pub session_max_age_secs: i64,
    #[serde(default)]
    pub secure_cookies: bool,

    // summarizer
    pub openai_api_key: Option<String>,
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    #[serde(default = "default_mock_summary_delay_ms")]
    pub mock_summary_delay_ms: u64,

    // build
    #[serde(default = "default_local")]
    pub source: String,
    #[serde(default = "default_local")]
    pub git_commit: String,
    #[serde(default = "default_local")]
    pub pipeline_id: String,
    #[serde(default = "default_local")]
    pub version: String,
}

fn default_host() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    4000
}

fn default_database_url() -> String {
    "sqlite.db".into()
}

fn default_session_secret() -> String {
    DEV_SESSION_SECRET.into()
}

fn default_session_max_age_secs() -> i64 {
    60 * 60 * 24 * 30
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".into()
}

fn default_openai_model() -> String {
    "gpt-3.5-turbo".into()
}

fn default_mock_summary_delay_ms() -> u64 {
    1000
}

fn default_local() -> String {
    "local".into()
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        match envy::from_env::<Self>() {
            Ok(config) => config,
            Err(error) => panic!("invalid configuration: {error}"),
        }
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.session_secret == DEV_SESSION_SECRET
    }
}

static CONFIG: OnceLock<Config> = OnceLock::new();

pub fn config() -> &'static Config {
    CONFIG.get_or_init(Config::from_env)
}
