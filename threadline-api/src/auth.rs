use uuid::Uuid;

use crate::{Error, User, STUB_UUID};

#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewUser {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), Error> {
        validate_credentials(&self.username, &self.password)
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewSession {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl NewSession {
    pub fn validate(&self) -> Result<(), Error> {
        validate_credentials(&self.username, &self.password)
    }
}

fn validate_credentials(username: &str, password: &str) -> Result<(), Error> {
    if username.is_empty() || password.is_empty() {
        return Err(Error::CredentialsRequired);
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct AuthToken(pub Uuid);

impl AuthToken {
    pub fn stub() -> AuthToken {
        AuthToken(STUB_UUID)
    }
}

/// Returned by both registration and login
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct AuthResponse {
    pub token: AuthToken,
    pub user: User,
}
