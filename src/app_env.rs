use crate::domain::owner::OwnerLogin;
use anyhow::{Context, anyhow};
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use tracing::info;

/// URL for accessing the PostgreSQL database (should contain a database name in the path)
pub const DB_URL: &str = "DATABASE_URL";
/// Log level configuration for the application. For formatting info, see [tracing_subscriber's EnvFilter documentation](https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html)
pub const LOG_LEVEL: &str = "LOG_LEVEL";

/// OpenTelemetry span export URL. Should be http://localhost:4317 by default, as the service should
/// have an OpenTelemetry collector sidecar which directs metrics to the correct place
pub const OTEL_SPAN_EXPORT_URL: &str = "OTEL_SPAN_EXPORT_URL";
/// OpenTelemetry metrics export URL. Should be http://localhost:4317 by default, as the service should
/// have an OpenTelemetry collector sidecar which directs metrics to the correct place
pub const OTEL_METRIC_EXPORT_URL: &str = "OTEL_METRIC_EXPORT_URL";

/// Port the HTTP server listens on
pub const PORT: &str = "PORT";
/// Set to "true" or "1" to enable production mode (real OAuth, secure cookies)
pub const PRODUCTION: &str = "PRODUCTION";
/// Secret used to sign session cookies
pub const SESSION_SECRET: &str = "SESSION_SECRET";
/// How long a session cookie stays valid, in seconds
pub const SESSION_MAX_AGE: &str = "SESSION_MAX_AGE";
/// The OAuth state value sent to Wunderlist and expected back on the callback
pub const OAUTH_STATE: &str = "STATE";
/// Wunderlist application credentials
pub const WUNDERLIST_CLIENT_ID: &str = "WUNDERLIST_CLIENT_ID";
pub const WUNDERLIST_CLIENT_SECRET: &str = "WUNDERLIST_CLIENT_SECRET";
/// Base URL of the Wunderlist REST API
pub const WUNDERLIST_API_URL: &str = "WUNDERLIST_API_URL";
/// Base URL of the Wunderlist OAuth endpoints
pub const WUNDERLIST_OAUTH_URL: &str = "WUNDERLIST_OAUTH_URL";
/// Where Wunderlist sends the user back after authorizing. Wunderlist only accepts the
/// URL registered for the application.
pub const CALLBACK_URL: &str = "CALLBACK_URL";
/// Identity used for the fake login outside of production mode
pub const LOCAL_WID: &str = "LOCAL_WID";
pub const LOCAL_NAME: &str = "LOCAL_NAME";
pub const LOCAL_ACCESS_TOKEN: &str = "LOCAL_ACCESS_TOKEN";

const DEV_SESSION_SECRET: &str = "publists-development-session-secret";
const WEEK_IN_SECONDS: i64 = 60 * 60 * 24 * 7;
/// Upper bound for [SESSION_MAX_AGE], one year
const MAX_SESSION_MAX_AGE: i64 = 60 * 60 * 24 * 365;

/// Typed configuration for the whole application, read from the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub production: bool,
    pub database_url: String,
    pub session_secret: String,
    pub session_max_age: i64,
    pub oauth_state: Option<String>,
    pub wunderlist: WunderlistConfig,
    pub local_login: OwnerLogin,
}

/// Settings for talking to the Wunderlist API
#[derive(Debug, Clone)]
pub struct WunderlistConfig {
    pub client_id: String,
    pub client_secret: String,
    pub api_url: String,
    pub oauth_url: String,
    pub callback_url: String,
}

impl AppConfig {
    /// Reads every setting from the environment. Fails when a required variable is missing
    /// or a value can't be parsed.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let production = parse_flag(optional(PRODUCTION).as_deref());

        let session_secret = match optional(SESSION_SECRET) {
            Some(secret) => secret,
            None if production => {
                return Err(anyhow!("{SESSION_SECRET} must be set in production mode"));
            }
            None => {
                info!("{SESSION_SECRET} not set, using the development secret");
                DEV_SESSION_SECRET.to_owned()
            }
        };

        Ok(AppConfig {
            port: parsed_or(PORT, 8080)?,
            production,
            database_url: required(DB_URL)?,
            session_secret,
            session_max_age: checked_session_max_age(parsed_or(SESSION_MAX_AGE, WEEK_IN_SECONDS)?)?,
            oauth_state: optional(OAUTH_STATE),
            wunderlist: WunderlistConfig {
                client_id: optional(WUNDERLIST_CLIENT_ID).unwrap_or_default(),
                client_secret: optional(WUNDERLIST_CLIENT_SECRET).unwrap_or_default(),
                api_url: optional(WUNDERLIST_API_URL)
                    .unwrap_or_else(|| "https://a.wunderlist.com/api/v1".to_owned()),
                oauth_url: optional(WUNDERLIST_OAUTH_URL)
                    .unwrap_or_else(|| "https://www.wunderlist.com/oauth".to_owned()),
                callback_url: optional(CALLBACK_URL)
                    .unwrap_or_else(|| "https://publists.herokuapp.com/callback".to_owned()),
            },
            local_login: OwnerLogin {
                wid: optional(LOCAL_WID).unwrap_or_else(|| "local".to_owned()),
                name: optional(LOCAL_NAME).unwrap_or_else(|| "Local Owner".to_owned()),
                access_token: optional(LOCAL_ACCESS_TOKEN).unwrap_or_default(),
            },
        })
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.is_empty())
}

fn required(key: &str) -> Result<String, anyhow::Error> {
    optional(key).with_context(|| format!("environment variable {key} must be set"))
}

fn parsed_or<T>(key: &str, default: T) -> Result<T, anyhow::Error>
where
    T: FromStr + Display,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("invalid value for {key}: {raw}")),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

fn checked_session_max_age(seconds: i64) -> Result<i64, anyhow::Error> {
    if (1..=MAX_SESSION_MAX_AGE).contains(&seconds) {
        Ok(seconds)
    } else {
        Err(anyhow!(
            "{SESSION_MAX_AGE} must be between 1 and {MAX_SESSION_MAX_AGE} seconds, got {seconds}"
        ))
    }
}

fn parse_flag(raw: Option<&str>) -> bool {
    matches!(raw.map(str::to_ascii_lowercase).as_deref(), Some("true" | "1"))
}

#[cfg(test)]
pub mod test {
    use super::*;
    use speculoos::prelude::*;

    /// Configuration used by unit tests. Never touches the environment.
    pub fn test_config(production: bool) -> AppConfig {
        AppConfig {
            port: 0,
            production,
            database_url: "postgres://localhost/publists_test".to_owned(),
            session_secret: "test-secret-key-32-bytes-long!!".to_owned(),
            session_max_age: 3600,
            oauth_state: Some("expected-state".to_owned()),
            wunderlist: WunderlistConfig {
                client_id: "client-id".to_owned(),
                client_secret: "client-secret".to_owned(),
                api_url: "http://localhost:1/api/v1".to_owned(),
                oauth_url: "http://localhost:1/oauth".to_owned(),
                callback_url: "https://publists.example.com/callback".to_owned(),
            },
            local_login: OwnerLogin {
                wid: "local".to_owned(),
                name: "Local Owner".to_owned(),
                access_token: "local-token".to_owned(),
            },
        }
    }

    #[test]
    fn production_flag_accepts_true_and_one() {
        assert!(parse_flag(Some("true")));
        assert!(parse_flag(Some("TRUE")));
        assert!(parse_flag(Some("1")));
        assert!(!parse_flag(Some("false")));
        assert!(!parse_flag(Some("yes")));
        assert!(!parse_flag(None));
    }

    #[test]
    fn session_max_age_must_be_positive_and_bounded() {
        assert_that!(checked_session_max_age(WEEK_IN_SECONDS)).is_ok_containing(WEEK_IN_SECONDS);
        assert_that!(checked_session_max_age(MAX_SESSION_MAX_AGE)).is_ok_containing(MAX_SESSION_MAX_AGE);
        assert_that!(checked_session_max_age(0)).is_err();
        assert_that!(checked_session_max_age(-60)).is_err();
        assert_that!(checked_session_max_age(i64::MAX)).is_err();
    }
}
