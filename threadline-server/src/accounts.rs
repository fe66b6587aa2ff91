use std::{collections::HashMap, sync::Arc};

use anyhow::Context;
use chrono::Utc;
use threadline_api::{AuthToken, Error as ApiError, Time, User, UserId, Uuid};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Clone, Debug)]
struct DbUser {
    id: UserId,
    name: String,
    pass_hash: String,
}

#[derive(Clone, Copy, Debug)]
pub struct Session {
    pub user: UserId,
    pub created_at: Time,
}

/// Registered users and their open sessions. Sessions never expire.
#[derive(Debug, Default)]
pub struct AccountStore {
    users: Vec<DbUser>,
    sessions: HashMap<AuthToken, Session>,
}

impl AccountStore {
    pub fn new() -> AccountStore {
        AccountStore::default()
    }

    /// Store with the `demo`/`demo` account already registered
    pub fn demo(bcrypt_cost: u32) -> anyhow::Result<AccountStore> {
        let mut store = AccountStore::new();
        let pass_hash =
            bcrypt::hash("demo", bcrypt_cost).context("hashing demo user password")?;
        store
            .create_user(String::from("demo"), pass_hash)
            .context("registering demo user")?;
        Ok(store)
    }

    pub fn name_taken(&self, name: &str) -> bool {
        self.users
            .iter()
            .any(|u| u.name.to_lowercase() == name.to_lowercase())
    }

    pub fn create_user(&mut self, name: String, pass_hash: String) -> Result<User, ApiError> {
        if self.name_taken(&name) {
            return Err(ApiError::NameAlreadyUsed(name));
        }
        let user = DbUser {
            id: UserId(Uuid::new_v4()),
            name,
            pass_hash,
        };
        self.users.push(user.clone());
        Ok(User {
            id: user.id,
            username: user.name,
        })
    }

    /// Returns the user with exactly this name, along with its password hash
    pub fn find_login(&self, name: &str) -> Option<(User, String)> {
        self.users.iter().find(|u| u.name == name).map(|u| {
            (
                User {
                    id: u.id,
                    username: u.name.clone(),
                },
                u.pass_hash.clone(),
            )
        })
    }

    pub fn open_session(&mut self, user: UserId) -> AuthToken {
        let token = AuthToken(Uuid::new_v4());
        self.sessions.insert(
            token,
            Session {
                user,
                created_at: Utc::now(),
            },
        );
        token
    }

    pub fn recover_session(&self, token: &AuthToken) -> Result<User, ApiError> {
        let session = self
            .sessions
            .get(token)
            .ok_or(ApiError::PermissionDenied)?;
        tracing::debug!(user = ?session.user, opened = %session.created_at, "recovered session");
        self.users
            .iter()
            .find(|u| u.id == session.user)
            .map(|u| User {
                id: u.id,
                username: u.name.clone(),
            })
            .ok_or(ApiError::PermissionDenied)
    }
}

#[derive(Clone, Debug)]
pub struct Accounts(Arc<RwLock<AccountStore>>);

impl Accounts {
    pub fn new(store: AccountStore) -> Accounts {
        Accounts(Arc::new(RwLock::new(store)))
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, AccountStore> {
        self.0.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, AccountStore> {
        self.0.write().await
    }
}
