use std::collections::HashMap;

use serde::{Serialize, Serializer};

use crate::{Comment, CommentId, Time};

/// Threaded view over a flat list of comments.
///
/// Nodes are indices into the borrowed flat list, children get embedded only
/// when serializing. Roots and siblings keep the insertion order of the flat
/// list. A comment whose parent id resolves to no comment is part of neither
/// the roots nor any child list, and neither are its descendants; such comments
/// are reported by [`CommentTree::dangling`].
///
/// The tree is rebuilt from scratch on each read, which is linear in the number
/// of comments. Serialization recurses once per nesting level, encode it with
/// [`crate::json::to_vec`] when reply chains may be long.
pub struct CommentTree<'a> {
    comments: Vec<&'a Comment>,
    roots: Vec<usize>,
    children: Vec<Vec<usize>>,
    dangling: Vec<usize>,
}

impl<'a> CommentTree<'a> {
    pub fn build<I>(comments: I) -> CommentTree<'a>
    where
        I: IntoIterator<Item = &'a Comment>,
    {
        let comments = comments.into_iter().collect::<Vec<_>>();

        let mut index = HashMap::with_capacity(comments.len());
        for (i, c) in comments.iter().enumerate() {
            index.insert(&c.id, i);
        }

        let mut roots = Vec::new();
        let mut children = vec![Vec::new(); comments.len()];
        let mut dangling = Vec::new();
        for (i, c) in comments.iter().enumerate() {
            match &c.parent_id {
                None => roots.push(i),
                Some(parent) => match index.get(parent) {
                    Some(&p) => children[p].push(i),
                    None => dangling.push(i),
                },
            }
        }

        CommentTree {
            comments,
            roots,
            children,
            dangling,
        }
    }

    pub fn roots<'t>(&'t self) -> impl 't + Iterator<Item = Node<'t, 'a>> {
        self.roots.iter().map(move |&idx| Node { tree: self, idx })
    }

    /// Comments whose parent id does not match any comment
    pub fn dangling<'t>(&'t self) -> impl 't + Iterator<Item = &'a Comment> {
        self.dangling.iter().map(move |&i| self.comments[i])
    }

    /// Indices of the reachable comments, parents before their children
    fn preorder(&self) -> Vec<usize> {
        let mut res = Vec::new();
        let mut stack = self.roots.iter().rev().copied().collect::<Vec<_>>();
        while let Some(i) = stack.pop() {
            res.push(i);
            stack.extend(self.children[i].iter().rev());
        }
        res
    }

    /// Ids of all the comments reachable from a root, depth-first
    pub fn reachable_ids(&self) -> Vec<&'a CommentId> {
        self.preorder()
            .into_iter()
            .map(|i| &self.comments[i].id)
            .collect()
    }

    pub fn to_nodes(&self) -> Vec<CommentNode> {
        let mut built = (0..self.comments.len())
            .map(|_| None)
            .collect::<Vec<Option<CommentNode>>>();
        // children come after their parent in preorder, so are built first
        for i in self.preorder().into_iter().rev() {
            let children = self.children[i]
                .iter()
                .filter_map(|&c| built[c].take())
                .collect();
            built[i] = Some(CommentNode {
                comment: self.comments[i].clone(),
                children,
            });
        }
        self.roots.iter().filter_map(|&r| built[r].take()).collect()
    }
}

impl Serialize for CommentTree<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.roots())
    }
}

#[derive(Clone, Copy)]
pub struct Node<'t, 'a> {
    tree: &'t CommentTree<'a>,
    idx: usize,
}

impl<'t, 'a> Node<'t, 'a> {
    pub fn comment(&self) -> &'a Comment {
        self.tree.comments[self.idx]
    }

    pub fn children(&self) -> impl 't + Iterator<Item = Node<'t, 'a>> {
        let tree = self.tree;
        tree.children[self.idx]
            .iter()
            .map(move |&idx| Node { tree, idx })
    }
}

impl Serialize for Node<'_, '_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire<'t, 'a> {
            #[serde(flatten)]
            comment: &'a Comment,
            children: Vec<Node<'t, 'a>>,
        }
        Wire {
            comment: self.comment(),
            children: self.children().collect(),
        }
        .serialize(serializer)
    }
}

/// Owned comment with its replies, as received by clients
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(from = "WireNode")]
pub struct CommentNode {
    #[serde(flatten)]
    pub comment: Comment,

    pub children: Vec<CommentNode>,
}

/// Same layout as a flattened `CommentNode`, read field by field so that
/// nested replies are not buffered once per level
#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireNode {
    id: CommentId,
    parent_id: Option<CommentId>,
    text: String,
    author: String,
    timestamp: Time,
    likes: u64,

    #[serde(default)]
    children: Vec<CommentNode>,
}

impl From<WireNode> for CommentNode {
    fn from(n: WireNode) -> CommentNode {
        CommentNode {
            comment: Comment {
                id: n.id,
                parent_id: n.parent_id,
                text: n.text,
                author: n.author,
                timestamp: n.timestamp,
                likes: n.likes,
            },
            children: n.children,
        }
    }
}

impl CommentNode {
    /// Number of comments in this subtree, including self
    pub fn count(&self) -> usize {
        let mut res = 0;
        let mut stack = vec![self];
        while let Some(n) = stack.pop() {
            res += 1;
            stack.extend(&n.children);
        }
        res
    }
}
