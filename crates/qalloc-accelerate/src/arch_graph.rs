// This code is part of Qiskit.
//
// (C) Copyright IBM 2022
//
// This code is licensed under the Apache License, Version 2.0. You may
// obtain a copy of this license in the LICENSE.txt file in the root directory
// of this source tree or at http://www.apache.org/licenses/LICENSE-2.0.
//
// Any modifications or derivative works of this code must retain this
// copyright notice, and modified files need to carry a notice indicating
// that they have been altered from the originals.

//! The hardware coupling graph: a directed graph over physical qubits
//! whose edges are the two-qubit operations the target device supports
//! natively in a given direction.

use std::collections::VecDeque;

use hashbrown::HashSet;
use rustworkx_core::petgraph::graph::DiGraph;
use rustworkx_core::petgraph::visit::EdgeRef;

use crate::error::{AllocError, Result};
use crate::types::PhysId;

/// A directed coupling graph over physical qubits with O(1) edge lookup.
#[derive(Debug, Clone)]
pub struct ArchGraph {
    graph: DiGraph<(), ()>,
    edges: HashSet<(u32, u32)>,
}

impl ArchGraph {
    /// Builds an `ArchGraph` over `size` physical qubits from a directed
    /// edge list `(from, to)`. Rejects self-loops and duplicate edges as
    /// [`AllocError::InvalidInput`]; a coupling map is not expected to
    /// describe either.
    pub fn try_new(size: usize, directed_edges: &[(u32, u32)]) -> Result<Self> {
        let mut graph = DiGraph::<(), ()>::with_capacity(size, directed_edges.len());
        let nodes: Vec<_> = (0..size).map(|_| graph.add_node(())).collect();
        let mut edges = HashSet::with_capacity(directed_edges.len());
        for &(from, to) in directed_edges {
            if from == to {
                return Err(AllocError::InvalidInput(format!(
                    "architecture graph has a self-loop at qubit {from}"
                )));
            }
            if from as usize >= size || to as usize >= size {
                return Err(AllocError::InvalidInput(format!(
                    "edge ({from}, {to}) references a qubit outside 0..{size}"
                )));
            }
            if !edges.insert((from, to)) {
                return Err(AllocError::InvalidInput(format!(
                    "duplicate edge ({from}, {to}) in architecture graph"
                )));
            }
            graph.add_edge(nodes[from as usize], nodes[to as usize], ());
        }
        Ok(ArchGraph { graph, edges })
    }

    pub fn size(&self) -> usize {
        self.graph.node_count()
    }

    /// True if there is a directed edge `from -> to` in either direction
    /// (i.e. the underlying hardware connection exists at all, regardless
    /// of which direction it natively executes a CNOT in).
    pub fn has_edge(&self, from: PhysId, to: PhysId) -> bool {
        self.edges.contains(&(from.0, to.0)) || self.edges.contains(&(to.0, from.0))
    }

    /// True if `from -> to` only exists as the reverse of a native
    /// directed edge `to -> from`, meaning a CNOT(from, to) would need to
    /// be reversed via Hadamards to execute on this architecture.
    pub fn is_reverse_edge(&self, from: PhysId, to: PhysId) -> bool {
        !self.edges.contains(&(from.0, to.0)) && self.edges.contains(&(to.0, from.0))
    }

    /// Directed successors of `qubit`, i.e. qubits reachable by one native
    /// directed edge.
    pub fn succ(&self, qubit: PhysId) -> impl Iterator<Item = PhysId> + '_ {
        self.graph
            .edges(self.node_index(qubit))
            .map(|e| PhysId(e.target().index() as u32))
    }

    /// All physical qubits adjacent to `qubit` in either edge direction
    /// (i.e. treating the coupling graph as undirected for adjacency
    /// purposes, which is what swap insertion needs).
    pub fn neighbors(&self, qubit: PhysId) -> Vec<PhysId> {
        let mut out: Vec<PhysId> = self
            .graph
            .edges(self.node_index(qubit))
            .map(|e| PhysId(e.target().index() as u32))
            .collect();
        for &(from, to) in &self.edges {
            if to == qubit.0 {
                out.push(PhysId(from));
            }
        }
        out.sort_unstable();
        out.dedup();
        out
    }

    /// BFS distance from `source` to every reachable physical qubit,
    /// treating all edges as unit-weight and undirected (coupling graphs
    /// are connected bidirectionally for routing purposes even when a
    /// given CNOT direction is not native). Uses [`Self::neighbors`]'s
    /// already-symmetric adjacency rather than walking `self.graph`'s
    /// directed edges directly, so a reverse-only edge still counts as
    /// one hop.
    pub fn distances_from(&self, source: PhysId) -> Vec<Option<u32>> {
        let mut dist = vec![None; self.size()];
        dist[source.index()] = Some(0u32);
        let mut queue = VecDeque::new();
        queue.push_back(source);
        while let Some(u) = queue.pop_front() {
            let du = dist[u.index()].unwrap();
            for v in self.neighbors(u) {
                if dist[v.index()].is_none() {
                    dist[v.index()] = Some(du + 1);
                    queue.push_back(v);
                }
            }
        }
        dist
    }

    fn node_index(&self, qubit: PhysId) -> rustworkx_core::petgraph::graph::NodeIndex {
        rustworkx_core::petgraph::graph::NodeIndex::new(qubit.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize) -> ArchGraph {
        let edges: Vec<(u32, u32)> = (0..n as u32 - 1).map(|i| (i, i + 1)).collect();
        ArchGraph::try_new(n, &edges).unwrap()
    }

    #[test]
    fn rejects_self_loop() {
        assert!(ArchGraph::try_new(2, &[(0, 0)]).is_err());
    }

    #[test]
    fn rejects_duplicate_edge() {
        assert!(ArchGraph::try_new(2, &[(0, 1), (0, 1)]).is_err());
    }

    #[test]
    fn reverse_edge_detection() {
        let g = line(3);
        assert!(g.has_edge(PhysId(0), PhysId(1)));
        assert!(!g.is_reverse_edge(PhysId(0), PhysId(1)));
        assert!(g.is_reverse_edge(PhysId(1), PhysId(0)));
    }

    #[test]
    fn distances_on_a_line() {
        let g = line(4);
        let d = g.distances_from(PhysId(0));
        assert_eq!(d, vec![Some(0), Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn neighbors_are_undirected() {
        let g = line(3);
        let mut n1 = g.neighbors(PhysId(1));
        n1.sort_unstable();
        assert_eq!(n1, vec![PhysId(0), PhysId(2)]);
    }

    #[test]
    fn distances_treat_a_reverse_only_edge_as_one_hop() {
        // Only the directed edge 0 -> 1 exists; routing must still see
        // phys 1 and phys 0 as adjacent in both directions.
        let g = ArchGraph::try_new(2, &[(0, 1)]).unwrap();
        assert_eq!(g.distances_from(PhysId(1)), vec![Some(1), Some(0)]);
        assert_eq!(g.distances_from(PhysId(0)), vec![Some(0), Some(1)]);
    }
}
