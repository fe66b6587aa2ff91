use bolero::generator::TypeGenerator;
use std::fmt;

use uuid::Uuid;

use crate::{Error, Time, UserId};

/// Author name used when a comment is submitted without one
pub const DEFAULT_AUTHOR: &str = "Guest";

#[derive(
    Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct CommentId(pub String);

impl CommentId {
    pub fn generate() -> CommentId {
        CommentId(Uuid::new_v4().to_string())
    }
}

impl From<&str> for CommentId {
    fn from(id: &str) -> CommentId {
        CommentId(String::from(id))
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,

    /// None for root comments
    pub parent_id: Option<CommentId>,

    pub text: String,
    pub author: String,
    pub timestamp: Time,
    pub likes: u64,
}

/// Identity under which a like is recorded.
///
/// Requests that do not carry a session all share the `Anonymous` identity, so
/// consecutive anonymous likes on a comment alternate between liking and
/// unliking it.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Liker {
    Anonymous,
    User(UserId),
}

#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CommentId>,
}

impl NewComment {
    pub fn new(text: String, author: Option<String>) -> NewComment {
        NewComment {
            text: Some(text),
            author,
            parent_id: None,
        }
    }

    pub fn replying_to(mut self, parent: CommentId) -> NewComment {
        self.parent_id = Some(parent);
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        match self.text.as_deref() {
            None | Some("") => Err(Error::TextRequired),
            Some(_) => Ok(()),
        }
    }

    /// Parent this comment will actually be attached to, an empty id meaning none
    pub fn effective_parent(&self) -> Option<&CommentId> {
        self.parent_id.as_ref().filter(|p| !p.0.is_empty())
    }

    pub fn into_comment(self, id: CommentId, timestamp: Time) -> Result<Comment, Error> {
        self.validate()?;
        let parent_id = self.effective_parent().cloned();
        let author = match self.author {
            Some(a) if !a.trim().is_empty() => a,
            _ => String::from(DEFAULT_AUTHOR),
        };
        Ok(Comment {
            id,
            parent_id,
            text: self.text.unwrap_or_default(),
            author,
            timestamp,
            likes: 0,
        })
    }
}

#[derive(
    Clone,
    Debug,
    Default,
    Eq,
    PartialEq,
    bolero::generator::TypeGenerator,
    serde::Deserialize,
    serde::Serialize,
)]
pub struct NewReply {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl NewReply {
    pub fn new(text: String, author: Option<String>) -> NewReply {
        NewReply {
            text: Some(text),
            author,
        }
    }

    pub fn into_new_comment(self, parent: CommentId) -> NewComment {
        NewComment {
            text: self.text,
            author: self.author,
            parent_id: Some(parent),
        }
    }
}
