//! Nested outline structure shared by the syllabus-content, specific-objectives
//! and schedule sections. The editing pages hold the canonical `Vec<OutlineNode>`
//! and replace it wholesale through these operations; nothing here mutates the
//! caller's data.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// One topic/objective/activity entry. An empty `subtopicos` marks a leaf.
/// The editors only ever nest one level deep, but the type allows more.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct OutlineNode {
    pub id: Uuid,
    pub titulo: String,
    #[serde(default)]
    pub subtopicos: Vec<OutlineNode>,
    #[serde(default)]
    pub ordem: i64,
}

impl OutlineNode {
    pub fn new(titulo: impl Into<String>, ordem: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            titulo: titulo.into(),
            subtopicos: Vec::new(),
            ordem,
        }
    }

    fn empty(ordem: i64) -> Self {
        Self::new("", ordem)
    }
}

fn renumber(mut nodes: Vec<OutlineNode>) -> Vec<OutlineNode> {
    for (index, node) in nodes.iter_mut().enumerate() {
        node.ordem = index as i64;
    }
    nodes
}

/// Append a new empty node at the end of the root sequence.
pub fn append_root(roots: &[OutlineNode]) -> Vec<OutlineNode> {
    let mut next = roots.to_vec();
    next.push(OutlineNode::empty(roots.len() as i64));
    next
}

/// Append a new empty child to the root node with `parent_id`. Parents are
/// looked up at the root level only; unknown ids leave the tree unchanged.
pub fn append_child(roots: &[OutlineNode], parent_id: Uuid) -> Vec<OutlineNode> {
    if !roots.iter().any(|node| node.id == parent_id) {
        return roots.to_vec();
    }
    roots
        .iter()
        .map(|node| {
            if node.id == parent_id {
                let mut parent = node.clone();
                parent
                    .subtopicos
                    .push(OutlineNode::empty(node.subtopicos.len() as i64));
                parent
            } else {
                node.clone()
            }
        })
        .collect()
}

/// Replace the title of the node with `node_id`, searched at the root level
/// and one level of nesting. Unknown ids are a no-op.
pub fn rename(roots: &[OutlineNode], node_id: Uuid, titulo: &str) -> Vec<OutlineNode> {
    roots
        .iter()
        .map(|node| {
            if node.id == node_id {
                let mut renamed = node.clone();
                renamed.titulo = titulo.to_string();
                return renamed;
            }
            let mut next = node.clone();
            for child in &mut next.subtopicos {
                if child.id == node_id {
                    child.titulo = titulo.to_string();
                }
            }
            next
        })
        .collect()
}

/// Remove the node with `node_id` wherever it is found, at the root level or
/// as a child of any root. Surviving siblings are renumbered.
pub fn delete(roots: &[OutlineNode], node_id: Uuid) -> Vec<OutlineNode> {
    if roots.iter().any(|node| node.id == node_id) {
        return renumber(
            roots
                .iter()
                .filter(|node| node.id != node_id)
                .cloned()
                .collect(),
        );
    }
    roots
        .iter()
        .map(|node| {
            if node.subtopicos.iter().any(|child| child.id == node_id) {
                let mut parent = node.clone();
                parent.subtopicos.retain(|child| child.id != node_id);
                parent.subtopicos = renumber(std::mem::take(&mut parent.subtopicos));
                parent
            } else {
                node.clone()
            }
        })
        .collect()
}

/// Move the root at `from` to position `to` (drag-and-drop semantics) and
/// renumber every root. Out-of-bounds indices are a no-op.
pub fn reorder_roots(roots: &[OutlineNode], from: usize, to: usize) -> Vec<OutlineNode> {
    if from >= roots.len() || to >= roots.len() {
        return roots.to_vec();
    }
    let mut next = roots.to_vec();
    let moved = next.remove(from);
    next.insert(to, moved);
    renumber(next)
}
