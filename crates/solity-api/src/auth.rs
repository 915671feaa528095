use secrecy::{ExposeSecret, SecretString};

/// Account credentials supplied at setup. Immutable for the client's lifetime.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// Tokens obtained from a successful login.
///
/// Sent as the `Authorization` / `AuthorizationPwd` headers on every
/// authenticated request.
#[derive(Debug, Clone)]
pub struct Session {
    auth_token: SecretString,
    auth_pwd: SecretString,
}

impl Session {
    pub(crate) fn new(auth_token: String, auth_pwd: String) -> Self {
        Self {
            auth_token: SecretString::from(auth_token),
            auth_pwd: SecretString::from(auth_pwd),
        }
    }

    pub fn auth_token(&self) -> &SecretString {
        &self.auth_token
    }

    pub fn auth_pwd(&self) -> &SecretString {
        &self.auth_pwd
    }

    /// Two sessions are the same login if their tokens match.
    pub(crate) fn same_as(&self, other: &Session) -> bool {
        self.auth_token.expose_secret() == other.auth_token.expose_secret()
            && self.auth_pwd.expose_secret() == other.auth_pwd.expose_secret()
    }
}
