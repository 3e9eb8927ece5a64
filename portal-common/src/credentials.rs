//! Login credentials.

/// Username and password for the gateway portal.
///
/// Built once at startup and never persisted. `Debug` hides the password so
/// the struct can sit inside logged config.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Which credential was missing or blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingCredential {
    Username,
    Password,
}

impl std::fmt::Display for MissingCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MissingCredential::Username => write!(f, "username"),
            MissingCredential::Password => write!(f, "password"),
        }
    }
}

impl Credentials {
    /// Fails on the first field that is missing or blank.
    pub fn new(
        username: Option<String>,
        password: Option<String>,
    ) -> Result<Self, MissingCredential> {
        let username = username
            .filter(|u| !u.trim().is_empty())
            .ok_or(MissingCredential::Username)?;
        let password = password
            .filter(|p| !p.is_empty())
            .ok_or(MissingCredential::Password)?;
        Ok(Self { username, password })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
