use crate::{ResultTree, TreeNode};

/// One visible line of the result view, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRow {
    pub id: String,
    pub depth: usize,
    pub label: String,
    pub expandable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderedView {
    pub rows: Vec<RenderedRow>,
}

impl RenderedView {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Indented text lines, one per row.
    pub fn lines(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| {
                let marker = if row.expandable { "+" } else { "-" };
                format!("{}{} {}", "  ".repeat(row.depth), marker, row.label)
            })
            .collect()
    }
}

/// Builds a fresh view of the whole tree. Never reuses a previous view.
pub fn render(tree: &ResultTree) -> RenderedView {
    let mut rows = Vec::with_capacity(tree.node_count());
    let mut pending: Vec<(&TreeNode, usize)> =
        tree.roots.iter().rev().map(|node| (node, 0)).collect();

    while let Some((node, depth)) = pending.pop() {
        rows.push(RenderedRow {
            id: node.id.clone(),
            depth,
            label: node.label.clone(),
            expandable: node.expandable,
        });
        pending.extend(node.children.iter().rev().map(|child| (child, depth + 1)));
    }

    RenderedView { rows }
}
