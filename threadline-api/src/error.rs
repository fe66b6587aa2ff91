use anyhow::{anyhow, Context};
use serde_json::json;

use crate::CommentId;

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Unauthorized")]
    PermissionDenied,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Text is required")]
    TextRequired,

    #[error("Username and password are required")]
    CredentialsRequired,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Comment not found {0}")]
    CommentNotFound(CommentId),

    #[error("Parent comment not found {0}")]
    ParentNotFound(CommentId),

    #[error("Username already exists {0}")]
    NameAlreadyUsed(String),
}

impl Error {
    pub fn status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::PermissionDenied => StatusCode::UNAUTHORIZED,
            Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::TextRequired => StatusCode::BAD_REQUEST,
            Error::CredentialsRequired => StatusCode::BAD_REQUEST,
            Error::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Error::CommentNotFound(_) => StatusCode::NOT_FOUND,
            Error::ParentNotFound(_) => StatusCode::NOT_FOUND,
            Error::NameAlreadyUsed(_) => StatusCode::CONFLICT,
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        serde_json::to_vec(&match self {
            Error::Unknown(msg) => json!({
                "error": msg,
                "type": "unknown",
            }),
            Error::PermissionDenied => json!({
                "error": "Unauthorized",
                "type": "unauthorized",
            }),
            Error::InvalidCredentials => json!({
                "error": "Invalid credentials",
                "type": "invalid-credentials",
            }),
            Error::TextRequired => json!({
                "error": "Text is required",
                "type": "text-required",
            }),
            Error::CredentialsRequired => json!({
                "error": "Username and password are required",
                "type": "credentials-required",
            }),
            Error::InvalidBody(reason) => json!({
                "error": "Invalid request body",
                "type": "invalid-body",
                "reason": reason,
            }),
            Error::CommentNotFound(id) => json!({
                "error": "Comment not found",
                "type": "comment-not-found",
                "id": id,
            }),
            Error::ParentNotFound(id) => json!({
                "error": "Parent comment not found",
                "type": "parent-not-found",
                "id": id,
            }),
            Error::NameAlreadyUsed(n) => json!({
                "error": "Username already exists",
                "type": "conflict-name",
                "name": n,
            }),
        })
        .expect("serializing error")
    }

    pub fn parse(body: &[u8]) -> anyhow::Result<Error> {
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        let field = |name: &str| data.get(name).and_then(|v| v.as_str());
        Ok(
            match field("type").ok_or_else(|| anyhow!("error type is not a string"))? {
                "unknown" => Error::Unknown(String::from(field("error").unwrap_or(""))),
                "unauthorized" => Error::PermissionDenied,
                "invalid-credentials" => Error::InvalidCredentials,
                "text-required" => Error::TextRequired,
                "credentials-required" => Error::CredentialsRequired,
                "invalid-body" => Error::InvalidBody(String::from(field("reason").unwrap_or(""))),
                "comment-not-found" => Error::CommentNotFound(CommentId::from(
                    field("id").ok_or_else(|| anyhow!("comment not found without an id"))?,
                )),
                "parent-not-found" => Error::ParentNotFound(CommentId::from(
                    field("id").ok_or_else(|| anyhow!("parent not found without an id"))?,
                )),
                "conflict-name" => Error::NameAlreadyUsed(String::from(
                    field("name").ok_or_else(|| anyhow!("error is a name conflict without a name"))?,
                )),
                _ => return Err(anyhow!("error contents has unknown type")),
            },
        )
    }
}
