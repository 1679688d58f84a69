use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
}

impl UserRole {
    /// Lenient parse used for credential files: only `admin` elevates.
    pub fn from_loose(s: &str) -> Self {
        s.parse().unwrap_or(Self::User)
    }
}

impl FromStr for UserRole {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::User => write!(f, "user"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Browse,
    Upload,
    Moderate,
}

/// Who is making the request and what they may do.
///
/// Built per request from the session and the current credential file, so a
/// role change or removal in `login-pass.json` takes effect on the next request.
#[derive(Debug, Clone, Serialize)]
pub struct Identity {
    pub username: String,
    pub role: UserRole,
    /// Session was issued through the admin secret.
    pub elevated: bool,
}

impl Identity {
    pub fn new(username: impl Into<String>, role: UserRole) -> Self {
        Self {
            username: username.into(),
            role,
            elevated: false,
        }
    }

    pub fn elevated(mut self) -> Self {
        self.elevated = true;
        self
    }

    pub fn can(&self, capability: Capability) -> bool {
        match capability {
            Capability::Browse | Capability::Upload => true,
            Capability::Moderate => self.role == UserRole::Admin || self.elevated,
        }
    }

    pub fn is_moderator(&self) -> bool {
        self.can(Capability::Moderate)
    }
}
