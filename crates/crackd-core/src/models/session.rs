//! Authenticated session as handed over by the auth collaborator.

/// Active sign-in session. The access token is read once per workflow run
/// and never persisted here; a token expiring mid-run fails the in-flight
/// call with an auth error instead of being refreshed.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub access_token: String,
    pub user_id: Option<String>,
    pub email: Option<String>,
}

impl AuthSession {
    pub fn new(access_token: impl Into<String>) -> Self {
        AuthSession {
            access_token: access_token.into(),
            user_id: None,
            email: None,
        }
    }
}
