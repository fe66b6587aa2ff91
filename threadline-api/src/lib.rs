use chrono::Utc;

pub use uuid::{uuid, Uuid};
pub type Time = chrono::DateTime<Utc>;

pub const STUB_UUID: Uuid = uuid!("ffffffff-ffff-ffff-ffff-ffffffffffff");

mod auth;
pub use auth::{AuthResponse, AuthToken, NewSession, NewUser};

mod comment;
pub use comment::{Comment, CommentId, Liker, NewComment, NewReply, DEFAULT_AUTHOR};

mod error;
pub use error::Error;

pub mod json;

mod tree;
pub use tree::{CommentNode, CommentTree, Node};

mod user;
pub use user::{User, UserId};

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Health {
    pub status: String,
    pub timestamp: Time,
}

impl Health {
    pub fn ok() -> Health {
        Health {
            status: String::from("OK"),
            timestamp: Utc::now(),
        }
    }
}
