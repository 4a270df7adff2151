use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    /// Minimum interval between accepted submissions, in milliseconds.
    pub rate_limit_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Config {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()),
            rate_limit_ms: match env::var("RATE_LIMIT_MS") {
                Ok(raw) => raw.parse()?,
                Err(_) => 1000,
            },
        })
    }
}
