use std::{fmt::Debug, ops::Deref};

use base64::Engine;
use color_eyre::eyre::{eyre, Context};
use tower_cookies::{cookie::SameSite, Cookie, Cookies};

use crate::Result;

const RECOGNIZED_COOKIE: &str = "recognized_ingredients";

#[derive(Clone)]
pub struct CookieKey(pub tower_cookies::Key);

impl Deref for CookieKey {
    type Target = tower_cookies::Key;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl CookieKey {
    /// `SECRET_KEY` holds at least 64 base64 encoded bytes. Without it a
    /// fresh key is generated, so sessions won't survive a restart.
    pub fn from_env_or_generate() -> Result<Self> {
        let Some(secret) = crate::state::env_var("SECRET_KEY") else {
            tracing::info!("SECRET_KEY not set, generating a new cookie key");

            return Ok(Self(tower_cookies::Key::generate()));
        };

        Self::from_base64(&secret)
    }

    pub fn from_base64(secret: &str) -> Result<Self> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(secret.trim().as_bytes())
            .wrap_err("SECRET_KEY should be base64")?;

        let key = tower_cookies::Key::try_from(bytes.as_slice())
            .map_err(|e| eyre!("SECRET_KEY is not a usable key: {e}"))?;

        Ok(Self(key))
    }
}

impl Debug for CookieKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieKey")
            .field("value", &"[omitted]")
            .finish()
    }
}

/// Keeps the names from the latest photo around for the next page view.
pub(crate) fn remember_recognized(
    cookies: &Cookies,
    key: &CookieKey,
    ingredients: &[String],
) -> Result<()> {
    let value = serde_json::to_string(ingredients)?;

    let cookie = Cookie::build((RECOGNIZED_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    cookies.private(key).add(cookie);

    Ok(())
}

/// Names remembered by [`remember_recognized`]. A missing or tampered cookie
/// reads as nothing recognized.
pub(crate) fn recognized_ingredients(cookies: &Cookies, key: &CookieKey) -> Vec<String> {
    let Some(cookie) = cookies.private(key).get(RECOGNIZED_COOKIE) else {
        return vec![];
    };

    serde_json::from_str(cookie.value()).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Ignoring unreadable recognized ingredients cookie");

        vec![]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_keys_are_rejected() {
        let short = base64::engine::general_purpose::STANDARD.encode([7u8; 32]);

        assert!(CookieKey::from_base64(&short).is_err());
        assert!(CookieKey::from_base64("definitely not base64!").is_err());
    }

    #[test]
    fn long_keys_are_accepted() {
        let secret = base64::engine::general_purpose::STANDARD.encode([7u8; 64]);

        let key = CookieKey::from_base64(&secret).unwrap();

        assert_eq!(key.master(), [7u8; 64].as_slice());
        assert_eq!(format!("{key:?}"), "CookieKey { value: \"[omitted]\" }");
    }
}
