//! Document hierarchy model
//!
//! Types for the hierarchical document structure returned by the AI
//! analysis, plus traversal helpers and the degraded-output fallback.

mod outline;

pub use outline::render_outline;

use serde::{Deserialize, Serialize};

/// Structural role of a hierarchy node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Heading,
    Subheading,
    Paragraph,
    List,
    Table,
    Section,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Heading => "heading",
            NodeType::Subheading => "subheading",
            NodeType::Paragraph => "paragraph",
            NodeType::List => "list",
            NodeType::Table => "table",
            NodeType::Section => "section",
        }
    }
}

/// Optional per-node metadata reported by the analyzer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    /// Page the node was detected on (1-indexed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    /// Analyzer confidence in [0, 1]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Style label (e.g. "title", "caption")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

/// One structural unit of a document plus its nested children.
///
/// IDs are assigned by the analyzer and are not guaranteed unique;
/// consumers needing stable references fall back to positional indexing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub id: String,
    /// Nesting depth hint (1 = top level). Not enforced against tree depth.
    pub level: u32,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub text: String,
    #[serde(default)]
    pub children: Vec<HierarchyNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<NodeMetadata>,
}

impl HierarchyNode {
    /// Leaf node without metadata
    pub fn new(id: &str, level: u32, node_type: NodeType, text: &str) -> Self {
        Self {
            id: id.to_string(),
            level,
            node_type,
            text: text.to_string(),
            children: Vec::new(),
            metadata: None,
        }
    }
}

/// Summary statistics for a hierarchy tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_nodes: usize,
    pub headings: usize,
    pub paragraphs: usize,
    pub max_depth: usize,
}

impl Statistics {
    /// Compute statistics by traversing the tree.
    ///
    /// Headings count `heading`, `subheading` and `section` nodes;
    /// `max_depth` is the longest root-to-leaf path (roots at depth 1).
    pub fn from_nodes(nodes: &[HierarchyNode]) -> Self {
        let mut stats = Statistics::default();
        count(nodes, 1, &mut stats);
        return stats;

        fn count(nodes: &[HierarchyNode], depth: usize, stats: &mut Statistics) {
            for node in nodes {
                stats.total_nodes += 1;
                stats.max_depth = stats.max_depth.max(depth);
                match node.node_type {
                    NodeType::Heading | NodeType::Subheading | NodeType::Section => {
                        stats.headings += 1
                    }
                    NodeType::Paragraph => stats.paragraphs += 1,
                    NodeType::List | NodeType::Table => {}
                }
                count(&node.children, depth + 1, stats);
            }
        }
    }
}

/// Complete result of a hierarchy extraction run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub title: String,
    pub hierarchy: Vec<HierarchyNode>,
    pub statistics: Statistics,
    /// Set only when the analyzer's raw output had to be replaced by the
    /// fallback stub. Degraded output, never a hard error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_warning: Option<String>,
}

/// Warning message attached to fallback results
pub const PARSE_WARNING: &str = "AI response was not valid JSON, showing simplified structure";

/// Maximum characters of source text carried into the fallback paragraph
const FALLBACK_EXCERPT_CHARS: usize = 500;

/// Build the minimal two-node fallback hierarchy for unparsable AI output.
///
/// One `section` node wrapping one `paragraph` node holding the first 500
/// characters of the source text, both at confidence 0.5.
pub fn fallback_result(text_content: &str) -> ExtractionResult {
    let mut excerpt: String = text_content.chars().take(FALLBACK_EXCERPT_CHARS).collect();
    if text_content.chars().count() > FALLBACK_EXCERPT_CHARS {
        excerpt.push_str("...");
    }

    let paragraph = HierarchyNode {
        metadata: Some(NodeMetadata {
            confidence: Some(0.5),
            ..Default::default()
        }),
        ..HierarchyNode::new("p_1", 2, NodeType::Paragraph, &excerpt)
    };

    let section = HierarchyNode {
        children: vec![paragraph],
        metadata: Some(NodeMetadata {
            confidence: Some(0.5),
            ..Default::default()
        }),
        ..HierarchyNode::new("root_1", 1, NodeType::Section, "Document Content")
    };

    ExtractionResult {
        title: "Document".to_string(),
        hierarchy: vec![section],
        statistics: Statistics {
            total_nodes: 2,
            headings: 1,
            paragraphs: 1,
            max_depth: 2,
        },
        parse_warning: Some(PARSE_WARNING.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> Vec<HierarchyNode> {
        vec![HierarchyNode {
            children: vec![
                HierarchyNode::new("p1", 2, NodeType::Paragraph, "First paragraph"),
                HierarchyNode {
                    children: vec![HierarchyNode::new("p2", 3, NodeType::Paragraph, "Nested")],
                    ..HierarchyNode::new("h2", 2, NodeType::Subheading, "Subheading")
                },
                HierarchyNode::new("l1", 2, NodeType::List, "- item")
            ],
            ..HierarchyNode::new("h1", 1, NodeType::Heading, "Heading")
        }]
    }

    #[test]
    fn statistics_match_traversal() {
        let stats = Statistics::from_nodes(&sample_tree());
        assert_eq!(stats.total_nodes, 5);
        assert_eq!(stats.headings, 2);
        assert_eq!(stats.paragraphs, 2);
        assert_eq!(stats.max_depth, 3);
    }

    #[test]
    fn statistics_empty_tree() {
        assert_eq!(Statistics::from_nodes(&[]), Statistics::default());
    }

    #[test]
    fn fallback_is_two_nodes() {
        let result = fallback_result("Some document text");
        assert_eq!(result.title, "Document");
        assert_eq!(result.hierarchy.len(), 1);
        assert_eq!(result.hierarchy[0].node_type, NodeType::Section);
        assert_eq!(result.hierarchy[0].children.len(), 1);
        assert_eq!(result.hierarchy[0].children[0].text, "Some document text");
        assert!(result.parse_warning.is_some());

        // Self-reported statistics agree with an independent traversal
        assert_eq!(result.statistics, Statistics::from_nodes(&result.hierarchy));
    }

    #[test]
    fn fallback_truncates_long_text() {
        let long = "x".repeat(2000);
        let result = fallback_result(&long);
        let text = &result.hierarchy[0].children[0].text;
        assert_eq!(text.len(), 503); // 500 chars + "..."
        assert!(text.ends_with("..."));
    }

    #[test]
    fn fallback_truncation_is_char_safe() {
        let long = "é".repeat(600);
        let result = fallback_result(&long);
        assert_eq!(result.hierarchy[0].children[0].text.chars().count(), 503);
    }

    #[test]
    fn node_serialization_shape() {
        let node = HierarchyNode {
            metadata: Some(NodeMetadata {
                page_number: Some(3),
                confidence: Some(0.9),
                style: None,
            }),
            ..HierarchyNode::new("h1_1", 1, NodeType::Heading, "Intro")
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "heading");
        assert_eq!(json["metadata"]["pageNumber"], 3);
        assert!(json["metadata"].get("style").is_none());
    }

    #[test]
    fn result_roundtrip() {
        let result = fallback_result("roundtrip me");
        let json = serde_json::to_string_pretty(&result).unwrap();
        assert!(json.contains("parseWarning"));
        assert!(json.contains("totalNodes"));
        let back: ExtractionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn missing_children_defaults_to_empty() {
        let node: HierarchyNode = serde_json::from_str(
            r#"{"id": "a", "level": 1, "type": "paragraph", "text": "no children key"}"#,
        )
        .unwrap();
        assert!(node.children.is_empty());
        assert!(node.metadata.is_none());
    }
}
