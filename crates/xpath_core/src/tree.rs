use std::collections::HashMap;

use engine_logging::engine_warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Marker used by flat payloads for nodes without a parent.
const ROOT_PARENT: &str = "#";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub id: String,
    pub label: String,
    pub children: Vec<TreeNode>,
    pub expandable: bool,
}

impl TreeNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>, children: Vec<TreeNode>) -> Self {
        let expandable = !children.is_empty();
        Self {
            id: id.into(),
            label: label.into(),
            children,
            expandable,
        }
    }
}

// Descendants are released from a heap stack, never recursively.
impl Drop for TreeNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Forest of result nodes delivered with the END event.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ResultTree {
    pub roots: Vec<TreeNode>,
}

impl ResultTree {
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut pending: Vec<&TreeNode> = self.roots.iter().collect();
        while let Some(node) = pending.pop() {
            count += 1;
            pending.extend(node.children.iter());
        }
        count
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("result payload is missing")]
    Missing,
    #[error("result payload is not a valid node array: {0}")]
    Json(String),
}

#[derive(Debug, Deserialize)]
struct WireNode {
    #[serde(default)]
    id: Option<serde_json::Value>,
    text: String,
    #[serde(default)]
    children: Vec<WireNode>,
    #[serde(default)]
    parent: Option<String>,
}

impl Drop for WireNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Parses an END payload into a result tree.
///
/// Accepts nested nodes (`{id?, text, children?}`) and flat parent-linked
/// nodes (`{id, parent, text}` with `"#"` marking roots). Nodes without an id
/// get one derived from their position, e.g. `"0.2"`.
pub fn parse_result_tree(payload: Option<&str>) -> Result<ResultTree, PayloadError> {
    let payload = payload
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .ok_or(PayloadError::Missing)?;

    let mut deserializer = serde_json::Deserializer::from_str(payload);
    deserializer.disable_recursion_limit();
    // Nesting depth is unbounded; deep levels run on heap-allocated stack segments.
    let nodes = Vec::<WireNode>::deserialize(serde_stacker::Deserializer::new(&mut deserializer))
        .map_err(|err| PayloadError::Json(err.to_string()))?;
    deserializer
        .end()
        .map_err(|err| PayloadError::Json(err.to_string()))?;

    if nodes.iter().any(|node| node.parent.is_some()) {
        Ok(assemble_flat(nodes))
    } else {
        Ok(ResultTree {
            roots: convert_nodes(nodes),
        })
    }
}

/// A node whose children are still being converted.
struct NestedFrame {
    id: String,
    label: String,
    /// `None` for the synthetic frame holding the top-level nodes.
    position: Option<String>,
    pending: std::vec::IntoIter<WireNode>,
    children: Vec<TreeNode>,
}

impl NestedFrame {
    fn open(mut wire: WireNode, position: String) -> Self {
        Self {
            id: node_id(wire.id.as_ref(), &position),
            label: std::mem::take(&mut wire.text),
            position: Some(position),
            pending: std::mem::take(&mut wire.children).into_iter(),
            children: Vec::new(),
        }
    }

    fn child_position(&self) -> String {
        let index = self.children.len();
        match &self.position {
            Some(position) => format!("{position}.{index}"),
            None => index.to_string(),
        }
    }
}

/// Converts a forest of wire nodes in post-order, without recursion.
fn convert_nodes(nodes: Vec<WireNode>) -> Vec<TreeNode> {
    let mut stack = vec![NestedFrame {
        id: String::new(),
        label: String::new(),
        position: None,
        pending: nodes.into_iter(),
        children: Vec::new(),
    }];

    while let Some(frame) = stack.last_mut() {
        if let Some(child) = frame.pending.next() {
            let position = frame.child_position();
            stack.push(NestedFrame::open(child, position));
            continue;
        }
        let Some(done) = stack.pop() else { break };
        match stack.last_mut() {
            Some(parent) => parent
                .children
                .push(TreeNode::new(done.id, done.label, done.children)),
            None => return done.children,
        }
    }
    Vec::new()
}

fn node_id(raw: Option<&serde_json::Value>, position: &str) -> String {
    match raw {
        Some(serde_json::Value::String(id)) if !id.is_empty() => id.clone(),
        Some(serde_json::Value::Null) | None => position.to_string(),
        Some(serde_json::Value::String(_)) => position.to_string(),
        Some(other) => other.to_string(),
    }
}

struct FlatEntry {
    node: Option<TreeNode>,
    parent: Option<String>,
}

fn assemble_flat(nodes: Vec<WireNode>) -> ResultTree {
    let mut entries = Vec::with_capacity(nodes.len());
    let mut ids: HashMap<String, usize> = HashMap::with_capacity(nodes.len());

    let parents: Vec<Option<String>> = nodes.iter().map(|wire| wire.parent.clone()).collect();
    for (index, (node, parent)) in convert_nodes(nodes).into_iter().zip(parents).enumerate() {
        if ids.insert(node.id.clone(), index).is_some() {
            engine_warn!("Duplicate node id {} in result payload", node.id);
        }
        entries.push(FlatEntry {
            node: Some(node),
            parent,
        });
    }

    let mut children_of: Vec<Vec<usize>> = vec![Vec::new(); entries.len()];
    let mut roots = Vec::new();
    for (index, entry) in entries.iter().enumerate() {
        match entry.parent.as_deref() {
            None | Some("") | Some(ROOT_PARENT) => roots.push(index),
            Some(parent) => match ids.get(parent) {
                Some(&parent_index) if parent_index != index => {
                    children_of[parent_index].push(index)
                }
                _ => {
                    engine_warn!("Result node has unknown parent {}; shown as a root", parent);
                    roots.push(index);
                }
            },
        }
    }

    // Post-order walk so every child is finished before its parent.
    let mut visited = 0;
    let mut stack: Vec<(usize, bool)> = roots.iter().rev().map(|&index| (index, false)).collect();
    while let Some((index, children_done)) = stack.pop() {
        if children_done {
            let adopted: Vec<TreeNode> = children_of[index]
                .iter()
                .filter_map(|&child| entries[child].node.take())
                .collect();
            if let Some(node) = entries[index].node.as_mut() {
                node.children.extend(adopted);
                node.expandable = !node.children.is_empty();
            }
            visited += 1;
        } else {
            stack.push((index, true));
            stack.extend(children_of[index].iter().rev().map(|&child| (child, false)));
        }
    }

    if visited < entries.len() {
        engine_warn!(
            "Dropped {} result nodes that form a parent cycle",
            entries.len() - visited
        );
    }

    let roots = roots
        .into_iter()
        .filter_map(|index| entries[index].node.take())
        .collect();
    ResultTree { roots }
}
