use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt::Display;
use std::hash::Hash;

use crate::PlanError;

/// Directed graph with a stable Kahn-style topological sort.
///
/// Tie-breaking is caller-driven: ready nodes leave the queue in insertion
/// order, so a caller that adds nodes and edges pre-sorted gets a sorted
/// tie-break. Duplicate edges are ignored; self-loops are not expected.
pub struct Graph<T> {
    nodes: Vec<T>,
    index: HashMap<T, usize>,
    edges: Vec<Vec<usize>>,
    in_degree: Vec<usize>,
    seen_edges: HashSet<(usize, usize)>,
}

impl<T: Clone + Eq + Hash + Display> Graph<T> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            edges: Vec::new(),
            in_degree: Vec::new(),
            seen_edges: HashSet::new(),
        }
    }

    pub fn add_node(&mut self, id: T) -> usize {
        if let Some(&i) = self.index.get(&id) {
            return i;
        }
        let i = self.nodes.len();
        self.nodes.push(id.clone());
        self.index.insert(id, i);
        self.edges.push(Vec::new());
        self.in_degree.push(0);
        i
    }

    pub fn add_edge(&mut self, from: T, to: T) {
        let f = self.add_node(from);
        let t = self.add_node(to);
        if self.seen_edges.insert((f, t)) {
            self.edges[f].push(t);
            self.in_degree[t] += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn toposort(&self) -> Result<Vec<T>, PlanError> {
        let mut in_degree = self.in_degree.clone();
        let mut queue: VecDeque<usize> = (0..self.nodes.len())
            .filter(|&i| in_degree[i] == 0)
            .collect();

        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(i) = queue.pop_front() {
            order.push(self.nodes[i].clone());
            for &child in &self.edges[i] {
                in_degree[child] -= 1;
                if in_degree[child] == 0 {
                    queue.push_back(child);
                }
            }
        }

        if order.len() != self.nodes.len() {
            let members: Vec<String> = (0..self.nodes.len())
                .filter(|&i| in_degree[i] > 0)
                .map(|i| self.nodes[i].to_string())
                .collect();
            return Err(PlanError::CycleDetected(members.join(", ")));
        }
        Ok(order)
    }
}

impl<T: Clone + Eq + Hash + Display> Default for Graph<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_chain() {
        let mut g = Graph::new();
        g.add_edge("a", "b");
        g.add_edge("b", "c");
        assert_eq!(g.toposort().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn diamond_dependency() {
        let mut g = Graph::new();
        for n in ["a", "b", "c", "d"] {
            g.add_node(n);
        }
        g.add_edge("a", "b");
        g.add_edge("a", "c");
        g.add_edge("b", "d");
        g.add_edge("c", "d");
        assert_eq!(g.toposort().unwrap(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn ties_resolve_in_insertion_order() {
        let mut g = Graph::new();
        g.add_node("c");
        g.add_node("a");
        g.add_node("b");
        assert_eq!(g.toposort().unwrap(), vec!["c", "a", "b"]);
    }

    #[test]
    fn duplicate_edges_are_ignored() {
        let mut g = Graph::new();
        g.add_edge("a", "b");
        g.add_edge("a", "b");
        assert_eq!(g.toposort().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn cycle_detected() {
        let mut g = Graph::new();
        g.add_edge("a", "b");
        g.add_edge("b", "a");
        let err = g.toposort().unwrap_err();
        assert!(err.to_string().contains("cycle"));
        assert!(err.to_string().contains('a'));
    }

    #[test]
    fn three_node_cycle_with_tail() {
        let mut g = Graph::new();
        g.add_edge("a", "b");
        g.add_edge("b", "c");
        g.add_edge("c", "a");
        g.add_edge("a", "d");
        let err = g.toposort().unwrap_err();
        assert!(matches!(err, PlanError::CycleDetected(_)));
    }

    #[test]
    fn empty_graph() {
        let g: Graph<String> = Graph::new();
        assert!(g.toposort().unwrap().is_empty());
    }
}
