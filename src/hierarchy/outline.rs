//! Plain-text outline rendering
//!
//! Renders a hierarchy tree as an indented outline, optionally limited to a
//! maximum depth (the interactive tree view expands two levels by default).

use super::HierarchyNode;

/// Render a tree as an indented plain-text outline.
///
/// `max_depth` of `None` renders the full tree; `Some(n)` stops after `n`
/// levels and marks collapsed subtrees with an ellipsis line.
pub fn render_outline(nodes: &[HierarchyNode], max_depth: Option<usize>) -> String {
    let mut out = String::new();
    render(nodes, 1, max_depth, &mut out);
    out
}

fn render(nodes: &[HierarchyNode], depth: usize, max_depth: Option<usize>, out: &mut String) {
    for node in nodes {
        let indent = "  ".repeat(depth - 1);
        let text = node.text.replace(['\n', '\r'], " ");
        out.push_str(&format!(
            "{}- [{}] {}\n",
            indent,
            node.node_type.as_str(),
            text.trim()
        ));

        if node.children.is_empty() {
            continue;
        }
        match max_depth {
            Some(limit) if depth >= limit => {
                out.push_str(&format!("{}  ...\n", indent));
            }
            _ => render(&node.children, depth + 1, max_depth, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::NodeType;

    fn tree() -> Vec<HierarchyNode> {
        vec![HierarchyNode {
            children: vec![HierarchyNode {
                children: vec![HierarchyNode::new("p", 3, NodeType::Paragraph, "Deep text")],
                ..HierarchyNode::new("s", 2, NodeType::Subheading, "Sub")
            }],
            ..HierarchyNode::new("h", 1, NodeType::Heading, "Top")
        }]
    }

    #[test]
    fn renders_full_tree() {
        let out = render_outline(&tree(), None);
        assert_eq!(
            out,
            "- [heading] Top\n  - [subheading] Sub\n    - [paragraph] Deep text\n"
        );
    }

    #[test]
    fn depth_limit_collapses_subtrees() {
        let out = render_outline(&tree(), Some(2));
        assert!(out.contains("- [subheading] Sub"));
        assert!(!out.contains("Deep text"));
        assert!(out.contains("..."));
    }

    #[test]
    fn newlines_flattened() {
        let nodes = vec![HierarchyNode::new(
            "p",
            1,
            NodeType::Paragraph,
            "line one\nline two",
        )];
        assert_eq!(render_outline(&nodes, None), "- [paragraph] line one line two\n");
    }
}
