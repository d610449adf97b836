use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    str::FromStr,
};

use anyhow::{bail, Context};

pub const DEFAULT_LOG_FILTER: &str = "info,rolesim=debug";
pub const DEFAULT_UPLOAD_BASE_URL: &str = "https://files.rolesim.app/uploads";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl FromStr for AppEnv {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => bail!("unknown APP_ENV {other:?}, expected development or production"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub env: AppEnv,
    pub log_filter: String,
    /// No trailing slash.
    pub upload_base_url: String,
    /// Empty means any origin.
    pub cors_origins: Vec<String>,
    pub session_idle_minutes: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 5000,
            env: AppEnv::Development,
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
            upload_base_url: DEFAULT_UPLOAD_BASE_URL.to_owned(),
            cors_origins: Vec::new(),
            session_idle_minutes: 30,
        }
    }
}

fn parse<T>(key: &str, raw: Option<String>, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|err| anyhow::anyhow!("{err}"))
            .with_context(|| format!("invalid {key} {raw:?}")),
        _ => Ok(default),
    }
}

impl Config {
    /// Reads the process environment, `.env` included.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let session_idle_minutes = parse(
            "SESSION_IDLE_MINUTES",
            lookup("SESSION_IDLE_MINUTES"),
            defaults.session_idle_minutes,
        )?;
        if session_idle_minutes <= 0 {
            bail!("SESSION_IDLE_MINUTES must be positive, got {session_idle_minutes}");
        }

        let upload_base_url = lookup("UPLOAD_BASE_URL")
            .filter(|url| !url.trim().is_empty())
            .map(|url| url.trim().trim_end_matches('/').to_owned())
            .unwrap_or(defaults.upload_base_url);

        let cors_origins = lookup("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            host: parse("HOST", lookup("HOST"), defaults.host)?,
            port: parse("PORT", lookup("PORT"), defaults.port)?,
            env: parse("APP_ENV", lookup("APP_ENV"), defaults.env)?,
            log_filter: lookup("RUST_LOG")
                .filter(|filter| !filter.trim().is_empty())
                .unwrap_or(defaults.log_filter),
            upload_base_url,
            cors_origins,
            session_idle_minutes,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnv::Production
    }
}
