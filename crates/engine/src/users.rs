//! Principals allowed to use the calculator.
//!
//! The directory always contains the distinguished [`ADMIN_USERNAME`]
//! principal, which can never be deleted.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{
    BlobStore, EngineError, ResultEngine,
    storage::{SESSION_KEY, USERS_KEY},
};

pub const ADMIN_USERNAME: &str = "admin";
const ADMIN_DEFAULT_PASSWORD: &str = "admin123";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(EngineError::InvalidPrincipal(format!("invalid role: {other}"))),
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authenticated identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub role: Role,
}

impl Principal {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredPrincipal {
    username: String,
    password_hash: String,
    role: Role,
}

impl StoredPrincipal {
    fn new(username: &str, password: &str, role: Role) -> Self {
        Self {
            username: username.to_string(),
            password_hash: password_digest(username, password),
            role,
        }
    }

    fn principal(&self) -> Principal {
        Principal {
            username: self.username.clone(),
            role: self.role,
        }
    }
}

fn password_digest(username: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(username.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Principal directory and login session over a [`BlobStore`].
#[derive(Clone, Debug)]
pub struct UserDirectory<S> {
    store: S,
}

impl<S: BlobStore> UserDirectory<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn load(&self) -> ResultEngine<Vec<StoredPrincipal>> {
        let mut users = match self.store.read(USERS_KEY)? {
            Some(raw) => serde_json::from_str::<Vec<StoredPrincipal>>(&raw)?,
            None => Vec::new(),
        };
        if !users.iter().any(|user| user.username == ADMIN_USERNAME) {
            users.insert(
                0,
                StoredPrincipal::new(ADMIN_USERNAME, ADMIN_DEFAULT_PASSWORD, Role::Admin),
            );
        }
        Ok(users)
    }

    fn save(&self, users: &[StoredPrincipal]) -> ResultEngine<()> {
        self.store.write(USERS_KEY, &serde_json::to_string(users)?)
    }

    /// Checks credentials and opens a session for the principal.
    pub fn login(&self, username: &str, password: &str) -> ResultEngine<Principal> {
        let username = username.trim();
        let digest = password_digest(username, password);
        let principal = self
            .load()?
            .into_iter()
            .find(|user| user.username == username && user.password_hash == digest)
            .map(|user| user.principal())
            .ok_or(EngineError::InvalidCredentials)?;
        self.store.write(SESSION_KEY, &serde_json::to_string(username)?)?;
        tracing::info!(username, "logged in");
        Ok(principal)
    }

    pub fn logout(&self) -> ResultEngine<()> {
        self.store.remove(SESSION_KEY)
    }

    /// The principal of the open session, if any and if it still exists.
    pub fn current_principal(&self) -> ResultEngine<Option<Principal>> {
        let Some(raw) = self.store.read(SESSION_KEY)? else {
            return Ok(None);
        };
        let Ok(username) = serde_json::from_str::<String>(&raw) else {
            tracing::warn!("malformed session dropped");
            return Ok(None);
        };
        Ok(self
            .load()?
            .into_iter()
            .find(|user| user.username == username)
            .map(|user| user.principal()))
    }

    pub fn list_principals(&self) -> ResultEngine<Vec<Principal>> {
        Ok(self.load()?.iter().map(StoredPrincipal::principal).collect())
    }

    pub fn create_principal(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> ResultEngine<Principal> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(EngineError::InvalidPrincipal(
                "username and password are required".to_string(),
            ));
        }
        let mut users = self.load()?;
        if users.iter().any(|user| user.username == username) {
            return Err(EngineError::ExistingKey(format!("user {username}")));
        }
        let created = StoredPrincipal::new(username, password, role);
        let principal = created.principal();
        users.push(created);
        self.save(&users)?;
        tracing::info!(username, %role, "principal created");
        Ok(principal)
    }

    pub fn delete_principal(&self, username: &str) -> ResultEngine<()> {
        if username == ADMIN_USERNAME {
            return Err(EngineError::ProtectedPrincipal(username.to_string()));
        }
        let mut users = self.load()?;
        let before = users.len();
        users.retain(|user| user.username != username);
        if users.len() == before {
            return Err(EngineError::KeyNotFound(format!("user {username}")));
        }
        self.save(&users)?;
        tracing::info!(username, "principal deleted");
        Ok(())
    }
}

/// Fails with `Forbidden` unless `principal` is an admin.
pub fn require_admin(principal: &Principal) -> ResultEngine<()> {
    if principal.is_admin() {
        Ok(())
    } else {
        Err(EngineError::Forbidden(format!(
            "{} is not an administrator",
            principal.username
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryBlobStore;

    #[test]
    fn default_admin_can_log_in() {
        let users = UserDirectory::new(MemoryBlobStore::new());
        let admin = users.login("admin", "admin123").unwrap();
        assert!(admin.is_admin());
        assert_eq!(users.current_principal().unwrap(), Some(admin));
    }

    #[test]
    fn wrong_password_is_rejected() {
        let users = UserDirectory::new(MemoryBlobStore::new());
        assert_eq!(
            users.login("admin", "nope").unwrap_err(),
            EngineError::InvalidCredentials
        );
        assert_eq!(users.current_principal().unwrap(), None);
    }

    #[test]
    fn logout_clears_the_session() {
        let users = UserDirectory::new(MemoryBlobStore::new());
        users.login("admin", "admin123").unwrap();
        users.logout().unwrap();
        assert_eq!(users.current_principal().unwrap(), None);
    }

    #[test]
    fn admin_cannot_be_deleted() {
        let users = UserDirectory::new(MemoryBlobStore::new());
        assert_eq!(
            users.delete_principal("admin").unwrap_err(),
            EngineError::ProtectedPrincipal("admin".to_string())
        );
    }

    #[test]
    fn created_principal_logs_in_and_can_be_deleted() {
        let users = UserDirectory::new(MemoryBlobStore::new());
        users.create_principal("jan", "kierowca", Role::User).unwrap();
        assert_eq!(
            users.create_principal("jan", "x", Role::User).unwrap_err(),
            EngineError::ExistingKey("user jan".to_string())
        );
        let jan = users.login("jan", "kierowca").unwrap();
        assert!(require_admin(&jan).is_err());
        assert_eq!(users.list_principals().unwrap().len(), 2);

        users.delete_principal("jan").unwrap();
        assert_eq!(users.current_principal().unwrap(), None);
        assert!(users.delete_principal("jan").is_err());
    }

    #[test]
    fn empty_credentials_are_invalid() {
        let users = UserDirectory::new(MemoryBlobStore::new());
        assert!(matches!(
            users.create_principal(" ", "pw", Role::User),
            Err(EngineError::InvalidPrincipal(_))
        ));
    }
}
