use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    pub log_dir: String,

    /// Days of leave each employee gets per year.
    pub annual_leave_allowance: i64,

    // Rate limiting
    pub rate_per_min: u32,

    pub api_prefix: String,
}

fn parse_var<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .with_context(|| format!("{key} must be a number"))
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let port: u16 = parse_var("PORT", "3000")?;

        Ok(Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| format!("0.0.0.0:{port}")),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            annual_leave_allowance: parse_var("ANNUAL_LEAVE_ALLOWANCE", "20")?,
            rate_per_min: parse_var("RATE_PER_MIN", "1000")?,
            api_prefix: env::var("API_PREFIX").unwrap_or_default(),
        })
    }
}
