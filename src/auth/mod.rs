//! Session credentials for the catalog API.
//!
//! The catalog endpoint needs a `SESSDATA` session cookie. This module finds
//! the token (command line first, then environment) and wraps it in a
//! `reqwest::cookie::Jar` for the HTTP client. Asset downloads do not need
//! it.

mod session;

pub use session::{
    CredentialError, SESSION_COOKIE_NAME, SESSION_COOKIE_ORIGIN, SESSION_ENV_VAR, SessionToken,
    resolve_session_token, session_cookie_jar,
};
