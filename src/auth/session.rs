//! Session credential lookup and cookie jar construction.

use std::fmt;
use std::sync::Arc;

use reqwest::cookie::Jar;
use thiserror::Error;
use tracing::debug;

/// Environment variable consulted when no `--sessdata` flag is given.
pub const SESSION_ENV_VAR: &str = "SESSDATA";

/// Name of the session cookie sent to the catalog API.
pub const SESSION_COOKIE_NAME: &str = "SESSDATA";

/// Origin the session cookie is scoped to.
pub const SESSION_COOKIE_ORIGIN: &str = "https://api.bilibili.com";

/// Errors raised while looking up credentials.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Neither the flag nor the environment variable carries a token.
    #[error(
        "missing session token: pass --sessdata <TOKEN> or set the {SESSION_ENV_VAR} environment variable"
    )]
    Missing,
}

/// An opaque session token.
///
/// Debug output is redacted so the token never ends up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Returns the raw token value (sensitive, never log).
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken([REDACTED])")
    }
}

/// Picks the session token: the flag value first, then the environment value.
///
/// Blank values count as absent. The environment value is passed in rather
/// than read here so callers decide where it comes from.
///
/// # Errors
///
/// Returns [`CredentialError::Missing`] when neither source has a token.
pub fn resolve_session_token(
    flag: Option<&str>,
    env_value: Option<&str>,
) -> Result<SessionToken, CredentialError> {
    let from_flag = flag.map(str::trim).filter(|v| !v.is_empty());
    let token = match from_flag {
        Some(token) => {
            debug!("using session token from command line");
            token
        }
        None => {
            let token = env_value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .ok_or(CredentialError::Missing)?;
            debug!(var = SESSION_ENV_VAR, "using session token from environment");
            token
        }
    };
    Ok(SessionToken(token.to_string()))
}

/// Builds a cookie jar holding the session cookie for the catalog API host.
#[must_use]
pub fn session_cookie_jar(token: &SessionToken) -> Arc<Jar> {
    let jar = Arc::new(Jar::default());
    let set_cookie = format!("{SESSION_COOKIE_NAME}={}", token.expose());

    if let Ok(origin) = SESSION_COOKIE_ORIGIN.parse::<url::Url>() {
        jar.add_cookie_str(&set_cookie, &origin);
        debug!(origin = SESSION_COOKIE_ORIGIN, "loaded session cookie into jar");
    }

    jar
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use reqwest::cookie::CookieStore;

    use super::*;

    #[test]
    fn test_flag_wins_over_environment() {
        let token = resolve_session_token(Some("from-flag"), Some("from-env")).unwrap();
        assert_eq!(token.expose(), "from-flag");
    }

    #[test]
    fn test_environment_used_without_flag() {
        let token = resolve_session_token(None, Some("from-env")).unwrap();
        assert_eq!(token.expose(), "from-env");
    }

    #[test]
    fn test_blank_flag_falls_back_to_environment() {
        let token = resolve_session_token(Some("  "), Some("from-env")).unwrap();
        assert_eq!(token.expose(), "from-env");
    }

    #[test]
    fn test_missing_everywhere_is_error() {
        let err = resolve_session_token(None, None).unwrap_err();
        assert!(matches!(err, CredentialError::Missing));
        assert!(err.to_string().contains("--sessdata"));

        let err = resolve_session_token(Some(""), Some("")).unwrap_err();
        assert!(matches!(err, CredentialError::Missing));
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let token = resolve_session_token(Some("secret-value"), None).unwrap();
        let debug = format!("{token:?}");
        assert!(!debug.contains("secret-value"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_cookie_jar_sends_session_to_api_host() {
        let token = resolve_session_token(Some("abc123"), None).unwrap();
        let jar = session_cookie_jar(&token);

        let api: url::Url = "https://api.bilibili.com/x/emote/setting/panel".parse().unwrap();
        let header = jar.cookies(&api).unwrap();
        assert_eq!(header.to_str().unwrap(), "SESSDATA=abc123");
    }

    #[test]
    fn test_cookie_jar_does_not_leak_to_other_hosts() {
        let token = resolve_session_token(Some("abc123"), None).unwrap();
        let jar = session_cookie_jar(&token);

        let cdn: url::Url = "https://i0.hdslb.com/bfs/emote/a.png".parse().unwrap();
        assert!(jar.cookies(&cdn).is_none());
    }
}
