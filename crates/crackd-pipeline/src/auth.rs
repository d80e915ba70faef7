//! Session lookup contract for the auth collaborator.
//!
//! OAuth sign-in, redirects, and token exchange are owned by the auth
//! provider; this crate only consumes the resulting session. The workflow
//! reads the token once per run through this trait.

use std::env;

use crackd_core::models::AuthSession;

/// Hands over the active sign-in session, if any.
pub trait SessionProvider {
    fn active_session(&self) -> Option<AuthSession>;
}

/// Session read from the environment: CRACKD_ACCESS_TOKEN, plus optional
/// CRACKD_USER_ID and CRACKD_USER_EMAIL.
#[derive(Debug, Default)]
pub struct EnvSession;

impl SessionProvider for EnvSession {
    fn active_session(&self) -> Option<AuthSession> {
        let access_token = env::var("CRACKD_ACCESS_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())?;
        Some(AuthSession {
            access_token,
            user_id: env::var("CRACKD_USER_ID").ok().filter(|s| !s.is_empty()),
            email: env::var("CRACKD_USER_EMAIL").ok().filter(|s| !s.is_empty()),
        })
    }
}
