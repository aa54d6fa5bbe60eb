//! Canonical graph representation: dense node ids, undirected edges,
//! and the ingestion-session relabeling map.

use crate::error::{LinkgraphError, Result};
use crate::ingest::resolver::SchemaRegistry;
use crate::ingest::table::Table;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Zachary's karate club: 34 members, 78 friendship ties, the club split
/// between the instructor's and the president's factions. Node labels are
/// the dataset's native integers.
const KARATE_CLUB_EDGES: [(usize, usize); 78] = [
    (0, 1),
    (0, 2),
    (0, 3),
    (0, 4),
    (0, 5),
    (0, 6),
    (0, 7),
    (0, 8),
    (0, 10),
    (0, 11),
    (0, 12),
    (0, 13),
    (0, 17),
    (0, 19),
    (0, 21),
    (0, 31),
    (1, 2),
    (1, 3),
    (1, 7),
    (1, 13),
    (1, 17),
    (1, 19),
    (1, 21),
    (1, 30),
    (2, 3),
    (2, 7),
    (2, 8),
    (2, 9),
    (2, 13),
    (2, 27),
    (2, 28),
    (2, 32),
    (3, 7),
    (3, 12),
    (3, 13),
    (4, 6),
    (4, 10),
    (5, 6),
    (5, 10),
    (5, 16),
    (6, 16),
    (8, 30),
    (8, 32),
    (8, 33),
    (9, 33),
    (13, 33),
    (14, 32),
    (14, 33),
    (15, 32),
    (15, 33),
    (18, 32),
    (18, 33),
    (19, 33),
    (20, 32),
    (20, 33),
    (22, 32),
    (22, 33),
    (23, 25),
    (23, 27),
    (23, 29),
    (23, 32),
    (23, 33),
    (24, 25),
    (24, 27),
    (24, 31),
    (25, 31),
    (26, 29),
    (26, 33),
    (27, 33),
    (28, 31),
    (28, 33),
    (29, 32),
    (29, 33),
    (30, 32),
    (30, 33),
    (31, 32),
    (31, 33),
    (32, 33),
];

/// Bidirectional map between source identifiers and dense node indices.
/// Indices are contiguous from zero in interning order; the map is stable
/// only within a single ingestion call.
#[derive(Debug, Default)]
pub struct NodeIndexer {
    index_of: HashMap<String, usize>,
    labels: Vec<String>,
}

impl NodeIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the dense index for an identifier, assigning the next
    /// contiguous index on first sight.
    pub fn intern(&mut self, id: &str) -> usize {
        if let Some(&idx) = self.index_of.get(id) {
            return idx;
        }
        let idx = self.labels.len();
        self.index_of.insert(id.to_string(), idx);
        self.labels.push(id.to_string());
        idx
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_of.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn into_labels(self) -> Vec<String> {
        self.labels
    }
}

/// Undirected graph over dense node ids `0..N-1`.
///
/// Edges are stored once in canonical (min, max) order; duplicates
/// collapse. Self-loops are not rejected. `labels[i]` is the original
/// identifier node `i` was relabeled from.
#[derive(Debug, Clone)]
pub struct Graph {
    labels: Vec<String>,
    edges: Vec<(usize, usize)>,
    adjacency: Vec<Vec<usize>>,
}

impl Graph {
    /// Build a graph from labels and an edge iterator over dense ids.
    /// Endpoints must be valid indices into `labels`.
    pub fn from_edges(labels: Vec<String>, raw_edges: impl IntoIterator<Item = (usize, usize)>) -> Self {
        let node_count = labels.len();
        let mut seen = HashSet::new();
        let mut edges = Vec::new();
        let mut adjacency = vec![Vec::new(); node_count];

        for (u, v) in raw_edges {
            debug_assert!(u < node_count && v < node_count);
            let key = if u <= v { (u, v) } else { (v, u) };
            if !seen.insert(key) {
                continue;
            }
            edges.push(key);
            adjacency[key.0].push(key.1);
            if key.0 != key.1 {
                adjacency[key.1].push(key.0);
            }
        }

        Self {
            labels,
            edges,
            adjacency,
        }
    }

    pub fn node_count(&self) -> usize {
        self.labels.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Distinct undirected edges in canonical (min, max) order.
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    pub fn neighbors(&self, node: usize) -> &[usize] {
        &self.adjacency[node]
    }

    pub fn degree(&self, node: usize) -> usize {
        self.adjacency[node].len()
    }

    /// Original identifier for a dense node id.
    pub fn label(&self, node: usize) -> &str {
        &self.labels[node]
    }

    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        let key = if u <= v { (u, v) } else { (v, u) };
        self.edges.contains(&key)
    }
}

/// Node/edge list projection of a graph for visualization consumption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topology {
    pub nodes: Vec<TopologyNode>,
    pub edges: Vec<[usize; 2]>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologyNode {
    pub id: usize,
    pub label: String,
}

/// Project a graph into its node/edge list structure. Pure and lossless;
/// no model involvement.
pub fn export_topology(graph: &Graph) -> Topology {
    Topology {
        nodes: (0..graph.node_count())
            .map(|id| TopologyNode {
                id,
                label: graph.label(id).to_string(),
            })
            .collect(),
        edges: graph.edges().iter().map(|&(u, v)| [u, v]).collect(),
    }
}

/// Convert a raw table into a canonical graph.
///
/// Column resolution follows the registry's priority order; rows with a
/// missing source or target cell are dropped; duplicate undirected edges
/// collapse. Fails with `MalformedGraphInput` when fewer than two columns
/// are usable or no valid edge survives cleaning.
pub fn graph_from_table(table: &Table) -> Result<Graph> {
    let registry = SchemaRegistry::new();
    let mapping = registry.resolve(table.columns())?;

    let mut indexer = NodeIndexer::new();
    let mut raw_edges = Vec::new();
    let mut dropped = 0usize;

    for row in 0..table.row_count() {
        let source = table.cell(row, mapping.source);
        let target = table.cell(row, mapping.target);
        match (source, target) {
            (Some(s), Some(t)) => {
                let u = indexer.intern(s);
                let v = indexer.intern(t);
                raw_edges.push((u, v));
            }
            _ => dropped += 1,
        }
    }

    if dropped > 0 {
        log::debug!("Dropped {} row(s) with missing endpoints", dropped);
    }

    if raw_edges.is_empty() {
        return Err(LinkgraphError::MalformedGraphInput(format!(
            "no valid edges after cleaning ({} row(s) dropped)",
            dropped
        )));
    }

    let graph = Graph::from_edges(indexer.into_labels(), raw_edges);
    log::info!(
        "Ingested graph via {} schema: {} nodes, {} edges",
        mapping.schema,
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

/// The built-in reference graph: Zachary's karate club.
pub fn karate_club() -> Graph {
    let labels = (0..34).map(|i| i.to_string()).collect();
    Graph::from_edges(labels, KARATE_CLUB_EDGES.iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: &[&[Option<&str>]]) -> Table {
        Table::new(
            columns.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|c| c.map(|s| s.to_string())).collect())
                .collect(),
        )
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let t = table(
            &["Source", "Target"],
            &[
                &[Some("A"), Some("B")],
                &[Some("B"), Some("C")],
                &[Some("A"), Some("B")],
            ],
        );
        let graph = graph_from_table(&t).unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_reversed_duplicate_collapses() {
        let t = table(
            &["Source", "Target"],
            &[&[Some("A"), Some("B")], &[Some("B"), Some("A")]],
        );
        let graph = graph_from_table(&t).unwrap();
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_missing_endpoints_dropped() {
        let t = table(
            &["Source", "Target"],
            &[
                &[Some("A"), None],
                &[None, Some("B")],
                &[Some("A"), Some("C")],
            ],
        );
        let graph = graph_from_table(&t).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_all_rows_missing_is_malformed() {
        let t = table(
            &["Source", "Target"],
            &[&[Some("A"), None], &[None, None]],
        );
        let err = graph_from_table(&t).unwrap_err();
        assert!(matches!(err, LinkgraphError::MalformedGraphInput(_)));
    }

    #[test]
    fn test_empty_table_is_malformed() {
        let t = table(&["Source", "Target"], &[]);
        let err = graph_from_table(&t).unwrap_err();
        assert!(matches!(err, LinkgraphError::MalformedGraphInput(_)));
    }

    #[test]
    fn test_node_ids_contiguous_in_first_seen_order() {
        let t = table(
            &["Source", "Target"],
            &[&[Some("x"), Some("y")], &[Some("z"), Some("x")]],
        );
        let graph = graph_from_table(&t).unwrap();
        assert_eq!(graph.label(0), "x");
        assert_eq!(graph.label(1), "y");
        assert_eq!(graph.label(2), "z");
    }

    #[test]
    fn test_node_count_matches_distinct_values() {
        let t = table(
            &["Source", "Target"],
            &[
                &[Some("A"), Some("B")],
                &[Some("B"), Some("C")],
                &[Some("C"), Some("A")],
                &[Some("D"), Some("A")],
            ],
        );
        let graph = graph_from_table(&t).unwrap();
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 4);
    }

    #[test]
    fn test_self_loop_not_rejected() {
        let t = table(
            &["Source", "Target"],
            &[&[Some("A"), Some("A")], &[Some("A"), Some("B")]],
        );
        let graph = graph_from_table(&t).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.has_edge(0, 0));
    }

    #[test]
    fn test_positional_fallback_ingestion() {
        let t = table(
            &["from", "to", "kind"],
            &[&[Some("n1"), Some("n2"), Some("friend")]],
        );
        let graph = graph_from_table(&t).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_biological_schema_used_for_endpoints() {
        // Source/Target present in earlier positions must not shadow the
        // higher-priority biological schema.
        let t = table(
            &["Source", "Target", "Official Symbol", "Chemical Name"],
            &[&[Some("s1"), Some("t1"), Some("TP53"), Some("aspirin")]],
        );
        let graph = graph_from_table(&t).unwrap();
        assert_eq!(graph.label(0), "TP53");
        assert_eq!(graph.label(1), "aspirin");
    }

    #[test]
    fn test_karate_club_shape() {
        let graph = karate_club();
        assert_eq!(graph.node_count(), 34);
        assert_eq!(graph.edge_count(), 78);
        // The two faction leaders are the highest-degree nodes
        assert_eq!(graph.degree(33), 17);
        assert_eq!(graph.degree(0), 16);
        assert!(graph.has_edge(0, 1));
        assert!(graph.has_edge(32, 33));
        assert!(!graph.has_edge(0, 33));
    }

    #[test]
    fn test_karate_degrees_sum_to_twice_edges() {
        let graph = karate_club();
        let degree_sum: usize = (0..graph.node_count()).map(|n| graph.degree(n)).sum();
        assert_eq!(degree_sum, 2 * graph.edge_count());
    }

    #[test]
    fn test_export_topology_lossless() {
        let graph = karate_club();
        let topology = export_topology(&graph);
        assert_eq!(topology.nodes.len(), graph.node_count());
        assert_eq!(topology.edges.len(), graph.edge_count());
        assert_eq!(topology.nodes[5].id, 5);
        assert_eq!(topology.nodes[5].label, "5");
        for (i, &(u, v)) in graph.edges().iter().enumerate() {
            assert_eq!(topology.edges[i], [u, v]);
        }
    }

    #[test]
    fn test_indexer_reuses_indices() {
        let mut indexer = NodeIndexer::new();
        let a = indexer.intern("a");
        let b = indexer.intern("b");
        assert_eq!(indexer.intern("a"), a);
        assert_eq!(indexer.index_of("b"), Some(b));
        assert_eq!(indexer.index_of("c"), None);
        assert_eq!(indexer.len(), 2);
    }
}
