use std::{collections::HashSet, fmt};

use crate::{
    api::{CommentId, CommentNode, Time},
    format_time_ago, Avatar,
};

/// Comments at this depth or deeper no longer offer to be replied to
pub const MAX_REPLY_DEPTH: usize = 3;

/// Number of replies shown before the rest is folded behind "more replies"
pub const VISIBLE_REPLIES: usize = 2;

/// Set of comments whose replies were all unfolded
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RevealState(HashSet<CommentId>);

impl RevealState {
    pub fn new() -> RevealState {
        RevealState::default()
    }

    /// Unfold every comment of the thread
    pub fn all(roots: &[CommentNode]) -> RevealState {
        fn add(res: &mut HashSet<CommentId>, nodes: &[CommentNode]) {
            for n in nodes {
                res.insert(n.comment.id.clone());
                add(res, &n.children);
            }
        }
        let mut res = HashSet::new();
        add(&mut res, roots);
        RevealState(res)
    }

    pub fn toggle(&mut self, id: &CommentId) {
        if !self.0.remove(id) {
            self.0.insert(id.clone());
        }
    }

    pub fn is_revealed(&self, id: &CommentId) -> bool {
        self.0.contains(id)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommentView {
    pub id: CommentId,
    pub author: String,
    pub avatar: Avatar,
    pub posted: String,
    pub text: String,
    pub likes: u64,
    pub depth: usize,
    pub can_reply: bool,

    /// Replies to display, already cut down unless revealed
    pub replies: Vec<CommentView>,

    /// Number of replies not displayed
    pub hidden_replies: usize,

    /// Whether the replies were unfolded past the default
    pub revealed: bool,
}

impl CommentView {
    fn render(node: &CommentNode, depth: usize, reveal: &RevealState, now: Time) -> CommentView {
        let c = &node.comment;
        let revealed = reveal.is_revealed(&c.id);
        let shown = match revealed {
            true => node.children.len(),
            false => VISIBLE_REPLIES.min(node.children.len()),
        };
        CommentView {
            id: c.id.clone(),
            author: c.author.clone(),
            avatar: Avatar::for_name(&c.author),
            posted: format_time_ago(c.timestamp, now),
            text: c.text.clone(),
            likes: c.likes,
            depth,
            can_reply: depth < MAX_REPLY_DEPTH,
            replies: node.children[..shown]
                .iter()
                .map(|n| CommentView::render(n, depth + 1, reveal, now))
                .collect(),
            hidden_replies: node.children.len() - shown,
            revealed,
        }
    }

    /// Label of the button unfolding the hidden replies, if any
    pub fn more_replies_label(&self) -> Option<String> {
        match self.hidden_replies {
            0 => None,
            1 => Some(String::from("+ 1 more reply")),
            n => Some(format!("+ {n} more replies")),
        }
    }

    /// Whether a "Show less" button folding the replies back applies
    pub fn can_show_less(&self) -> bool {
        self.revealed && self.replies.len() > VISIBLE_REPLIES
    }
}

/// Rendered thread, ready to be displayed
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ThreadView {
    pub comment_count: usize,
    pub roots: Vec<CommentView>,
}

impl ThreadView {
    pub fn render(roots: &[CommentNode], reveal: &RevealState, now: Time) -> ThreadView {
        ThreadView {
            comment_count: roots.len(),
            roots: roots
                .iter()
                .map(|n| CommentView::render(n, 0, reveal, now))
                .collect(),
        }
    }
}

impl fmt::Display for CommentView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indent = "    ".repeat(self.depth);
        writeln!(
            f,
            "{indent}[{}] {} • {} • {} like{} • {}",
            self.avatar.letter,
            self.author,
            self.posted,
            self.likes,
            if self.likes == 1 { "" } else { "s" },
            self.id,
        )?;
        for line in self.text.lines() {
            writeln!(f, "{indent}    {line}")?;
        }
        for r in &self.replies {
            write!(f, "{r}")?;
        }
        if let Some(label) = self.more_replies_label() {
            writeln!(f, "{indent}    {label}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ThreadView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Comments ({})", self.comment_count)?;
        if self.roots.is_empty() {
            writeln!(f)?;
            writeln!(f, "No comments yet")?;
            return writeln!(f, "Be the first to share your thoughts!");
        }
        for r in &self.roots {
            writeln!(f)?;
            write!(f, "{r}")?;
        }
        Ok(())
    }
}
