use crate::models::{Identity, UserRole};
use crate::services::auth;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

/// Shapes accepted for `login-pass.json`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UsersDocument {
    Wrapped { users: Vec<Value> },
    List(Vec<Value>),
    Single(Map<String, Value>),
}

/// Shapes accepted for `adminpass.json`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AdminDocument {
    Bare(String),
    Object {
        #[serde(default)]
        password: Option<Value>,
        #[serde(default)]
        admin_password: Option<Value>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUser {
    pub secret: String,
    pub role: UserRole,
}

pub type UserTable = BTreeMap<String, StoredUser>;

#[derive(Serialize)]
struct UserRecord<'a> {
    username: &'a str,
    password: &'a str,
    role: UserRole,
}

#[derive(Serialize)]
struct UsersFile<'a> {
    users: Vec<UserRecord<'a>>,
}

fn scalar(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

impl UsersDocument {
    fn into_table(self) -> UserTable {
        let entries = match self {
            Self::Wrapped { users } | Self::List(users) => users,
            Self::Single(map) if map.contains_key("username") => vec![Value::Object(map)],
            Self::Single(_) => Vec::new(),
        };

        let mut table = UserTable::new();
        for entry in entries {
            let Value::Object(fields) = entry else {
                continue;
            };
            let username = scalar(fields.get("username")).trim().to_string();
            let secret = scalar(fields.get("password"));
            let role = match fields.get("role") {
                Some(Value::String(role)) => UserRole::from_loose(role),
                _ => UserRole::User,
            };
            if !username.is_empty() && !secret.is_empty() {
                table.insert(username, StoredUser { secret, role });
            }
        }
        table
    }
}

impl AdminDocument {
    fn into_secret(self) -> String {
        match self {
            Self::Bare(secret) => secret,
            Self::Object {
                password,
                admin_password,
            } => {
                let primary = scalar(password.as_ref());
                if primary.is_empty() {
                    scalar(admin_password.as_ref())
                } else {
                    primary
                }
            }
        }
    }
}

/// Missing, empty or malformed files read as `None`.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("Could not read '{}'", path.display()))
        }
    };
    if content.trim().is_empty() {
        return Ok(None);
    }
    match serde_json::from_str(&content) {
        Ok(doc) => Ok(Some(doc)),
        Err(e) => {
            tracing::warn!(file = %path.display(), error = %e, "Ignoring malformed credential file");
            Ok(None)
        }
    }
}

/// Login accounts and the admin secret, read from JSON files on every lookup.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    users_path: PathBuf,
    admin_path: PathBuf,
}

impl CredentialStore {
    pub fn new(users_path: impl Into<PathBuf>, admin_path: impl Into<PathBuf>) -> Self {
        Self {
            users_path: users_path.into(),
            admin_path: admin_path.into(),
        }
    }

    pub fn users(&self) -> Result<UserTable> {
        Ok(read_json::<UsersDocument>(&self.users_path)?
            .map(UsersDocument::into_table)
            .unwrap_or_default())
    }

    pub fn admin_secret(&self) -> Result<Option<String>> {
        Ok(read_json::<AdminDocument>(&self.admin_path)?
            .map(AdminDocument::into_secret)
            .filter(|s| !s.is_empty()))
    }

    pub fn authenticate(&self, username: &str, password: &str) -> Result<Option<Identity>> {
        let users = self.users()?;
        match users.get(username.trim()) {
            Some(user) if auth::verify_secret(&user.secret, password) => {
                Ok(Some(Identity::new(username.trim(), user.role)))
            }
            Some(_) => Ok(None),
            None => {
                auth::burn_verification(password);
                Ok(None)
            }
        }
    }

    /// Current identity for a session's username; `None` once the account is gone.
    pub fn identity_for(&self, username: &str) -> Result<Option<Identity>> {
        Ok(self
            .users()?
            .get(username)
            .map(|user| Identity::new(username, user.role)))
    }

    pub fn verify_admin_secret(&self, password: &str) -> Result<bool> {
        match self.admin_secret()? {
            Some(secret) => Ok(auth::verify_secret(&secret, password)),
            None => Ok(false),
        }
    }

    pub fn upsert_user(&self, username: &str, password: &str, role: UserRole) -> Result<()> {
        auth::validate_username(username)?;
        let secret = auth::hash_password(password)?;
        let mut users = self.users()?;
        users.insert(username.to_string(), StoredUser { secret, role });
        self.write_users(&users)
    }

    pub fn set_password(&self, username: &str, password: &str) -> Result<()> {
        let mut users = self.users()?;
        let user = users
            .get_mut(username)
            .ok_or_else(|| anyhow::anyhow!("User '{}' not found", username))?;
        user.secret = auth::hash_password(password)?;
        self.write_users(&users)
    }

    pub fn remove_user(&self, username: &str) -> Result<bool> {
        let mut users = self.users()?;
        if users.remove(username).is_none() {
            return Ok(false);
        }
        self.write_users(&users)?;
        Ok(true)
    }

    pub fn set_admin_secret(&self, password: &str) -> Result<()> {
        let secret = auth::hash_password(password)?;
        let document = serde_json::json!({ "password": secret });
        write_atomic(&self.admin_path, &serde_json::to_string_pretty(&document)?)
    }

    fn write_users(&self, users: &UserTable) -> Result<()> {
        let document = UsersFile {
            users: users
                .iter()
                .map(|(username, user)| UserRecord {
                    username,
                    password: &user.secret,
                    role: user.role,
                })
                .collect(),
        };
        write_atomic(&self.users_path, &serde_json::to_string_pretty(&document)?)
    }
}

fn write_atomic(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let temp = path.with_extension("json.tmp");
    std::fs::write(&temp, content)?;
    std::fs::rename(&temp, path)
        .with_context(|| format!("Could not write '{}'", path.display()))?;
    Ok(())
}
