//! Directed graph of crawled pages and the links between them.
//!
//! Nodes are URL identities, edges are "page links to page". The graph only
//! grows during a crawl; the shortest-path query is a plain breadth-first
//! search over it.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Graph shared between the dispatcher, fetch tasks and whoever asks for paths.
pub type SharedGraph = Arc<RwLock<LinkGraph>>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("page not found in graph: {0}")]
    UnknownNode(String),

    #[error("no path from {from} to {to}")]
    Unreachable { from: String, to: String },
}

#[derive(Debug, Default)]
pub struct LinkGraph {
    graph: DiGraph<String, ()>,
    index: HashMap<String, NodeIndex>,
}

impl LinkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedGraph {
        Arc::new(RwLock::new(Self::new()))
    }

    pub fn add_vertex(&mut self, identity: &str) -> NodeIndex {
        if let Some(&node) = self.index.get(identity) {
            return node;
        }
        let node = self.graph.add_node(identity.to_string());
        self.index.insert(identity.to_string(), node);
        node
    }

    /// Record `from -> to`, creating either endpoint if needed.
    ///
    /// Returns false when the edge was already present.
    pub fn add_edge(&mut self, from: &str, to: &str) -> bool {
        let a = self.add_vertex(from);
        let b = self.add_vertex(to);
        if self.graph.find_edge(a, b).is_some() {
            return false;
        }
        self.graph.add_edge(a, b, ());
        true
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.index.contains_key(identity)
    }

    pub fn contains_edge(&self, from: &str, to: &str) -> bool {
        match (self.index.get(from), self.index.get(to)) {
            (Some(&a), Some(&b)) => self.graph.contains_edge(a, b),
            _ => false,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Link targets of `identity` in the order they were discovered.
    pub fn successors(&self, identity: &str) -> Vec<&str> {
        let Some(&node) = self.index.get(identity) else {
            return Vec::new();
        };
        self.ordered_successors(node)
            .into_iter()
            .map(|n| self.graph[n].as_str())
            .collect()
    }

    // petgraph walks outgoing edges newest-first
    fn ordered_successors(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut next: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(node, Direction::Outgoing)
            .collect();
        next.reverse();
        next
    }

    /// Fewest-hops path from `start` to `end`, both ends included.
    ///
    /// Among equally short paths the one using earlier-discovered links wins.
    pub fn shortest_path(&self, start: &str, end: &str) -> Result<Vec<String>, PathError> {
        let &source = self
            .index
            .get(start)
            .ok_or_else(|| PathError::UnknownNode(start.to_string()))?;
        let &target = self
            .index
            .get(end)
            .ok_or_else(|| PathError::UnknownNode(end.to_string()))?;

        let mut predecessor: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut queue = VecDeque::from([source]);
        let mut found = source == target;

        while let Some(node) = queue.pop_front() {
            if found {
                break;
            }
            for next in self.ordered_successors(node) {
                if next == source || predecessor.contains_key(&next) {
                    continue;
                }
                predecessor.insert(next, node);
                if next == target {
                    found = true;
                    break;
                }
                queue.push_back(next);
            }
        }

        if !found {
            return Err(PathError::Unreachable {
                from: start.to_string(),
                to: end.to_string(),
            });
        }

        let mut path = vec![self.graph[target].clone()];
        let mut current = target;
        while current != source {
            current = predecessor[&current];
            path.push(self.graph[current].clone());
        }
        path.reverse();
        Ok(path)
    }
}
