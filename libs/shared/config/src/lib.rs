use std::env;
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub redis_url: Option<String>,
    pub session_ttl_seconds: u64,
    pub slot_minutes: i64,
    pub availability_window_days: i64,
    pub server_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_service_key: String::new(),
            redis_url: None,
            session_ttl_seconds: 3600,
            slot_minutes: 30,
            availability_window_days: 14,
            server_port: 3000,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using in-memory store");
                    String::new()
                }),
            supabase_service_key: env::var("SUPABASE_SERVICE_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_SERVICE_KEY not set, using empty value");
                    String::new()
                }),
            redis_url: env::var("REDIS_URL").ok().or_else(|| {
                warn!("REDIS_URL not set, booking sessions will be kept in memory");
                None
            }),
            session_ttl_seconds: parse_checked("SESSION_TTL_SECONDS", defaults.session_ttl_seconds, |ttl| *ttl > 0),
            slot_minutes: parse_checked("SLOT_MINUTES", defaults.slot_minutes, |minutes| *minutes > 0),
            availability_window_days: parse_checked(
                "AVAILABILITY_WINDOW_DAYS",
                defaults.availability_window_days,
                |days| *days >= 0,
            ),
            server_port: parse_or("PORT", defaults.server_port),
        };

        if !config.is_configured() {
            warn!("Relational store not configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_service_key.is_empty()
    }

    pub fn is_session_store_configured(&self) -> bool {
        self.redis_url.as_deref().is_some_and(|url| !url.is_empty())
    }
}

fn parse_or<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    parse_checked(key, default, |_| true)
}

/// Like `parse_or`, but values failing `valid` are also replaced by the default.
fn parse_checked<T>(key: &str, default: T, valid: impl Fn(&T) -> bool) -> T
where
    T: FromStr + std::fmt::Display,
{
    parse_value(key, env::var(key).ok(), default, valid)
}

fn parse_value<T>(key: &str, raw: Option<String>, default: T, valid: impl Fn(&T) -> bool) -> T
where
    T: FromStr + std::fmt::Display,
{
    let Some(raw) = raw else {
        return default;
    };

    match raw.trim().parse::<T>() {
        Ok(value) if valid(&value) => value,
        _ => {
            warn!("{} has invalid value '{}', using default {}", key, raw, default);
            default
        }
    }
}
