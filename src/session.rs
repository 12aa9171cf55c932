//! Owner sessions, kept entirely in an HMAC-signed cookie.
//!
//! Token format: `base64(payload).base64(hmac_sha256(payload))`. The payload only names the
//! owner. Their token and public lists are always re-read from the store.

use crate::app_env::AppConfig;
use crate::domain::owner::Owner;
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use tracing::debug;

pub const SESSION_COOKIE: &str = "publists_session";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub wid: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn for_owner(owner: &Owner, max_age_seconds: i64) -> Self {
        let now = Utc::now();
        Session {
            wid: owner.wid.clone(),
            name: owner.name.clone(),
            created_at: now,
            expires_at: now + Duration::seconds(max_age_seconds),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session token is malformed")]
    Malformed,
    #[error("session signature does not match")]
    BadSignature,
    #[error("session has expired")]
    Expired,
    #[error("could not encode session: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("invalid session key")]
    Key,
}

fn mac_for(payload_b64: &str, secret: &str) -> Result<HmacSha256, SessionError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SessionError::Key)?;
    mac.update(payload_b64.as_bytes());
    Ok(mac)
}

/// Signs the session so it can be handed to the browser
pub fn create_session_token(session: &Session, secret: &str) -> Result<String, SessionError> {
    let payload = serde_json::to_vec(session)?;
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload);

    let signature = mac_for(&payload_b64, secret)?.finalize().into_bytes();
    let signature_b64 = URL_SAFE_NO_PAD.encode(signature);

    Ok(format!("{payload_b64}.{signature_b64}"))
}

/// Checks the signature and expiry of a token and decodes it
pub fn verify_session_token(token: &str, secret: &str) -> Result<Session, SessionError> {
    let (payload_b64, signature_b64) = token.split_once('.').ok_or(SessionError::Malformed)?;

    let signature = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| SessionError::Malformed)?;
    mac_for(payload_b64, secret)?
        .verify_slice(&signature)
        .map_err(|_| SessionError::BadSignature)?;

    let payload = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| SessionError::Malformed)?;
    let session: Session = serde_json::from_slice(&payload).map_err(|_| SessionError::Malformed)?;

    if session.is_expired() {
        return Err(SessionError::Expired);
    }

    Ok(session)
}

/// The session carried by the request, if it has a valid one
pub fn current_session(jar: &CookieJar, secret: &str) -> Option<Session> {
    let token = jar.get(SESSION_COOKIE)?;
    match verify_session_token(token.value(), secret) {
        Ok(session) => Some(session),
        Err(err) => {
            debug!("Ignoring session cookie: {err}");
            None
        }
    }
}

/// Adds a freshly signed session cookie for the owner to the jar
pub fn start_session(
    jar: CookieJar,
    owner: &Owner,
    config: &AppConfig,
) -> Result<CookieJar, SessionError> {
    let session = Session::for_owner(owner, config.session_max_age);
    let token = create_session_token(&session, &config.session_secret)?;

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.production);

    Ok(jar.add(cookie))
}

pub fn end_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}
