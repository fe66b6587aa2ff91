use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use chrono::{Duration, Utc};
use threadline_api::{
    Comment, CommentId, CommentTree, Error as ApiError, Liker, NewComment, NewReply, Time,
};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Flat, insertion-ordered list of every comment, plus who liked what.
#[derive(Debug, Default)]
pub struct CommentStore {
    comments: Vec<Comment>,
    index: HashMap<CommentId, usize>,
    likes: HashMap<CommentId, HashSet<Liker>>,
}

impl CommentStore {
    pub fn new() -> CommentStore {
        CommentStore::default()
    }

    /// Store pre-filled with a short demo discussion
    pub fn demo() -> CommentStore {
        let now = Utc::now();
        let mut store = CommentStore::new();
        for (id, parent, text, author, age, likes) in [
            (
                "1",
                None,
                "This is a great article! Really enjoyed reading it.",
                "Alice Johnson",
                Duration::hours(2),
                12,
            ),
            (
                "2",
                None,
                "I have some thoughts on the third point mentioned here.",
                "Bob Smith",
                Duration::hours(4),
                8,
            ),
            (
                "3",
                Some("1"),
                "Totally agree! The examples were really helpful.",
                "Charlie Brown",
                Duration::hours(1),
                5,
            ),
            (
                "4",
                Some("1"),
                "Could you elaborate on the second section?",
                "Diana Prince",
                Duration::minutes(30),
                3,
            ),
            (
                "5",
                Some("3"),
                "Yes, the code examples were particularly clear.",
                "Eve Wilson",
                Duration::minutes(15),
                2,
            ),
        ] {
            store.append(Comment {
                id: CommentId::from(id),
                parent_id: parent.map(CommentId::from),
                text: String::from(text),
                author: String::from(author),
                timestamp: now - age,
                likes,
            });
        }
        store
    }

    /// Ids are assumed fresh, as generated by `CommentId::generate`
    pub fn append(&mut self, comment: Comment) {
        self.index.insert(comment.id.clone(), self.comments.len());
        self.comments.push(comment);
    }

    pub fn find_by_id(&self, id: &CommentId) -> Option<&Comment> {
        self.index.get(id).map(|&i| &self.comments[i])
    }

    pub fn all(&self) -> impl '_ + Clone + Iterator<Item = &Comment> {
        self.comments.iter()
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn tree(&self) -> CommentTree<'_> {
        CommentTree::build(self.all())
    }

    pub fn create_comment(&mut self, new: NewComment) -> Result<Comment, ApiError> {
        self.create_comment_at(new, CommentId::generate(), Utc::now())
    }

    fn create_comment_at(
        &mut self,
        new: NewComment,
        id: CommentId,
        timestamp: Time,
    ) -> Result<Comment, ApiError> {
        let comment = new.into_comment(id, timestamp)?;
        self.append(comment.clone());
        Ok(comment)
    }

    pub fn create_reply(
        &mut self,
        parent: CommentId,
        reply: NewReply,
    ) -> Result<Comment, ApiError> {
        let new = reply.into_new_comment(parent.clone());
        new.validate()?;
        if !self.index.contains_key(&parent) {
            return Err(ApiError::ParentNotFound(parent));
        }
        self.create_comment(new)
    }

    /// Like the comment if `liker` has not liked it yet, unlike it otherwise
    pub fn toggle_like(&mut self, id: &CommentId, liker: Liker) -> Result<Comment, ApiError> {
        let &idx = self
            .index
            .get(id)
            .ok_or_else(|| ApiError::CommentNotFound(id.clone()))?;
        let comment = &mut self.comments[idx];
        let likers = self.likes.entry(id.clone()).or_default();
        if likers.insert(liker) {
            comment.likes += 1;
        } else {
            likers.remove(&liker);
            comment.likes = comment.likes.saturating_sub(1);
        }
        Ok(comment.clone())
    }
}

/// Handle on the comment store shared by all the request handlers
#[derive(Clone, Debug)]
pub struct Comments(Arc<RwLock<CommentStore>>);

impl Comments {
    pub fn new(store: CommentStore) -> Comments {
        Comments(Arc::new(RwLock::new(store)))
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, CommentStore> {
        self.0.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, CommentStore> {
        self.0.write().await
    }
}
