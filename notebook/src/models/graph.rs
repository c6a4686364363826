use serde::{Deserialize, Serialize};

/// A document placed on the graph canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Source document id
    pub id: String,

    /// Display name of the document
    pub name: String,

    pub x: f64,
    pub y: f64,

    /// Frequency-ranked keywords, lowercase, at most ten
    pub keywords: Vec<String>,
}

/// An undirected link between two documents that share keywords.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source_id: String,
    pub target_id: String,

    /// Size of the keyword intersection
    pub shared_keywords: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl KnowledgeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
        Self { nodes, edges }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids of the documents linked to `id`, in edge order.
    pub fn neighbors(&self, id: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter_map(|edge| {
                if edge.source_id == id {
                    Some(edge.target_id.as_str())
                } else if edge.target_id == id {
                    Some(edge.source_id.as_str())
                } else {
                    None
                }
            })
            .collect()
    }
}
