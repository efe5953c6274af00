use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },

    #[error("APP_SECRETS must be a json object of strings: {0}")]
    InvalidSecrets(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

/// Settings fields are the lower-cased environment variable names
pub fn to_env_var(field: &str) -> String {
    field.to_uppercase()
}
