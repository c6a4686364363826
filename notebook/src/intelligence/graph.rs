//! Keyword co-occurrence graph over the loaded sources.
//!
//! Nodes sit on a fixed circle in input order; there is no force layout.
//! Edges connect documents that share more than two keywords. The graph is
//! rebuilt from scratch on every call; pair comparison is O(n²·k), k ≤ 10.

use std::collections::HashSet;
use std::f64::consts::PI;

use crate::intelligence::keywords::extract_keywords;
use crate::models::{GraphEdge, GraphNode, KnowledgeGraph, SourceDocument};

pub const GRAPH_CENTER: (f64, f64) = (300.0, 300.0);
pub const GRAPH_RADIUS: f64 = 200.0;
/// An edge needs at least this many shared keywords.
pub const MIN_SHARED_KEYWORDS: usize = 3;

#[derive(Debug, Clone, Copy, Default)]
pub struct KnowledgeGraphService;

impl KnowledgeGraphService {
    pub fn new() -> Self {
        Self
    }

    pub fn build_graph(&self, documents: &[SourceDocument]) -> KnowledgeGraph {
        if documents.is_empty() {
            return KnowledgeGraph::new();
        }

        let count = documents.len();
        let nodes: Vec<GraphNode> = documents
            .iter()
            .enumerate()
            .map(|(index, doc)| {
                let (x, y) = circle_position(index, count);
                GraphNode {
                    id: doc.id.clone(),
                    name: doc.name.clone(),
                    x,
                    y,
                    keywords: extract_keywords(&doc.content),
                }
            })
            .collect();

        let keyword_sets: Vec<HashSet<String>> = nodes
            .iter()
            .map(|node| node.keywords.iter().map(|k| k.to_lowercase()).collect())
            .collect();

        let mut edges = Vec::new();
        for i in 0..count {
            for j in (i + 1)..count {
                let shared = keyword_sets[i].intersection(&keyword_sets[j]).count();
                if shared >= MIN_SHARED_KEYWORDS {
                    edges.push(GraphEdge {
                        source_id: nodes[i].id.clone(),
                        target_id: nodes[j].id.clone(),
                        shared_keywords: shared,
                    });
                }
            }
        }

        tracing::debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            "Built knowledge graph"
        );

        KnowledgeGraph::with_data(nodes, edges)
    }
}

/// Position of node `index` out of `count` on the layout circle.
pub fn circle_position(index: usize, count: usize) -> (f64, f64) {
    let angle = 2.0 * PI * index as f64 / count as f64;
    (
        GRAPH_CENTER.0 + GRAPH_RADIUS * angle.cos(),
        GRAPH_CENTER.1 + GRAPH_RADIUS * angle.sin(),
    )
}
