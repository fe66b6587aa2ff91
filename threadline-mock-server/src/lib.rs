use std::collections::{HashMap, HashSet};

use threadline_api::{
    Comment, CommentId, CommentNode, Error, Liker, NewComment, NewReply, Time,
};

/// Straightforward model of the comment API, scanning the whole list on every
/// call. Ids and timestamps are provided by the caller so that results can be
/// compared field by field with the real server's.
pub struct MockServer {
    comments: Vec<Comment>,
    likes: HashMap<CommentId, HashSet<Liker>>,
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer {
            comments: Vec::new(),
            likes: HashMap::new(),
        }
    }

    /// Return the id of comment number `idx`, in insertion order
    pub fn test_get_comment_id(&self, idx: usize) -> &CommentId {
        &self
            .comments
            .get(idx)
            .unwrap_or_else(|| panic!("getting comment {idx} among {}", self.comments.len()))
            .id
    }

    /// Return the current number of comments
    pub fn test_num_comments(&self) -> usize {
        self.comments.len()
    }

    pub fn fetch_comments(&self) -> Vec<CommentNode> {
        self.children_of(None)
    }

    fn children_of(&self, parent: Option<&CommentId>) -> Vec<CommentNode> {
        self.comments
            .iter()
            .filter(|c| c.parent_id.as_ref() == parent)
            .map(|c| CommentNode {
                comment: c.clone(),
                children: self.children_of(Some(&c.id)),
            })
            .collect()
    }

    pub fn create_comment(
        &mut self,
        new: NewComment,
        id: CommentId,
        timestamp: Time,
    ) -> Result<Comment, Error> {
        let text = new.text.clone().unwrap_or_default();
        if text.is_empty() {
            return Err(Error::TextRequired);
        }
        let parent_id = new.parent_id.filter(|p| !p.0.is_empty());
        let author = new
            .author
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| String::from(threadline_api::DEFAULT_AUTHOR));
        let comment = Comment {
            id,
            parent_id,
            text,
            author,
            timestamp,
            likes: 0,
        };
        self.comments.push(comment.clone());
        Ok(comment)
    }

    pub fn reply(
        &mut self,
        parent: CommentId,
        reply: NewReply,
        id: CommentId,
        timestamp: Time,
    ) -> Result<Comment, Error> {
        if reply.text.as_deref().unwrap_or("").is_empty() {
            return Err(Error::TextRequired);
        }
        if !self.comments.iter().any(|c| c.id == parent) {
            return Err(Error::ParentNotFound(parent));
        }
        self.create_comment(reply.into_new_comment(parent), id, timestamp)
    }

    pub fn like(&mut self, id: &CommentId, liker: Liker) -> Result<Comment, Error> {
        let comment = self
            .comments
            .iter_mut()
            .find(|c| c.id == *id)
            .ok_or_else(|| Error::CommentNotFound(id.clone()))?;
        let likers = self.likes.entry(id.clone()).or_insert_with(HashSet::new);
        if likers.contains(&liker) {
            likers.remove(&liker);
            if comment.likes > 0 {
                comment.likes -= 1;
            }
        } else {
            likers.insert(liker);
            comment.likes += 1;
        }
        Ok(comment.clone())
    }
}
