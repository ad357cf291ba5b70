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

//! The Cayley graph of the symmetric group on `0..n`, generated by the
//! transpositions corresponding to [`ArchGraph`](crate::arch_graph::ArchGraph)
//! edges. A single BFS from the identity permutation gives, for any
//! permutation `G`, both its minimal number of swaps from the identity
//! and an explicit minimal swap sequence realizing it -- and, via the
//! relative-permutation trick in [`Self::swap_path`], the same for any
//! `(src, tgt)` pair without ever materializing an `(n!)^2` table.

use std::collections::VecDeque;

use crate::arch_graph::ArchGraph;
use crate::perm_index::{factorial, rank, unrank};
use crate::types::{Mapping, PhysId, Swap, SwapSeq};

pub struct CayleyGraph {
    n: usize,
    edges: Vec<(u32, u32)>,
    dist: Vec<u32>,
    parent: Vec<Option<u32>>,
    parent_edge: Vec<Option<(u32, u32)>>,
}

const UNREACHED: u32 = u32::MAX;

impl CayleyGraph {
    /// Builds the graph and runs the BFS from the identity permutation,
    /// for `n` qubits connected by `edges` (an undirected view of the
    /// architecture's coupling graph -- a swap is symmetric regardless of
    /// which CNOT direction is native).
    pub fn build(n: usize, edges: &[(u32, u32)]) -> Self {
        let states = factorial(n) as usize;
        let mut dist = vec![UNREACHED; states];
        let mut parent = vec![None; states];
        let mut parent_edge = vec![None; states];

        let identity: Vec<u32> = (0..n as u32).collect();
        let start = rank(&identity) as usize;
        dist[start] = 0;

        let mut queue = VecDeque::new();
        queue.push_back(start);

        while let Some(cur_rank) = queue.pop_front() {
            let cur = unrank(cur_rank as u64, n);
            for &(p, q) in edges {
                let mut next = cur.clone();
                next.swap(p as usize, q as usize);
                let next_rank = rank(&next) as usize;
                if dist[next_rank] == UNREACHED {
                    dist[next_rank] = dist[cur_rank] + 1;
                    parent[next_rank] = Some(cur_rank as u32);
                    parent_edge[next_rank] = Some((p, q));
                    queue.push_back(next_rank);
                }
            }
        }

        CayleyGraph {
            n,
            edges: edges.to_vec(),
            dist,
            parent,
            parent_edge,
        }
    }

    pub fn num_states(&self) -> usize {
        self.dist.len()
    }

    /// Number of swaps needed to realize permutation `perm` (a
    /// `Vec<u32>` of length `n`) starting from the identity. `None` if
    /// unreachable (the architecture's swap graph is disconnected).
    pub fn distance_from_identity(&self, perm_rank: u64) -> Option<u32> {
        match self.dist[perm_rank as usize] {
            UNREACHED => None,
            d => Some(d),
        }
    }

    fn swap_path_from_identity(&self, target_rank: u64) -> Option<Vec<(u32, u32)>> {
        if self.dist[target_rank as usize] == UNREACHED {
            return None;
        }
        let mut path = Vec::new();
        let mut cur = target_rank as usize;
        while let Some(edge) = self.parent_edge[cur] {
            path.push(edge);
            cur = self.parent[cur].unwrap() as usize;
        }
        path.reverse();
        Some(path)
    }

    /// The relative permutation `src⁻¹ ∘ tgt` (spec.md §4.5's
    /// `realTgt[i] = src⁻¹[tgt[i]]`), whose identity-to-itself swap
    /// sequence, applied directly to `src`, yields `tgt`.
    fn relative_rank(&self, src: &Mapping, tgt: &Mapping) -> u64 {
        let relative: Vec<u32> = (0..self.n as u32)
            .map(|p| src.phys_of(tgt.prog_of(PhysId(p))).0)
            .collect();
        rank(&relative)
    }

    /// Minimal number of swaps needed to turn `src` into `tgt`, without
    /// materializing the swap path itself.
    pub fn distance(&self, src: &Mapping, tgt: &Mapping) -> Option<u32> {
        self.distance_from_identity(self.relative_rank(src, tgt))
    }

    /// An explicit minimal-length swap sequence turning `src` into `tgt`.
    pub fn swap_path(&self, src: &Mapping, tgt: &Mapping) -> Option<SwapSeq> {
        let path = self.swap_path_from_identity(self.relative_rank(src, tgt))?;
        Some(
            path.into_iter()
                .map(|(p, q)| Swap::new(PhysId(p), PhysId(q)))
                .collect(),
        )
    }

    pub fn edges(&self) -> &[(u32, u32)] {
        &self.edges
    }
}

/// Builds the undirected edge set a [`CayleyGraph`] needs from an
/// [`ArchGraph`]'s directed coupling edges: a swap is physically
/// symmetric even when the CNOT it enables is directional.
pub fn undirected_edges(arch: &ArchGraph) -> Vec<(u32, u32)> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for p in 0..arch.size() as u32 {
        for q in arch.succ(PhysId(p)) {
            let key = if p <= q.0 { (p, q.0) } else { (q.0, p) };
            if seen.insert(key) {
                out.push(key);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_distance_is_zero() {
        let g = CayleyGraph::build(3, &[(0, 1), (1, 2)]);
        assert_eq!(g.distance_from_identity(0), Some(0));
    }

    #[test]
    fn swap_path_applied_to_src_yields_tgt() {
        let arch = ArchGraph::try_new(4, &[(0, 1), (1, 2), (2, 3)]).unwrap();
        let edges = undirected_edges(&arch);
        let g = CayleyGraph::build(4, &edges);

        let src = Mapping::identity(4);
        let tgt =
            Mapping::from_assignment(vec![PhysId(3), PhysId(2), PhysId(1), PhysId(0)]).unwrap();

        let path = g.swap_path(&src, &tgt).unwrap();
        let mut replayed = src.clone();
        for s in &path {
            replayed.apply_swap(*s);
        }
        assert_eq!(replayed, tgt);
    }

    #[test]
    fn swap_path_handles_non_involutive_src_and_tgt() {
        // A 3-cycle is not self-inverse, so this exercises relative_rank's
        // src/tgt composition order in a way a pure-transposition case can't.
        let arch = ArchGraph::try_new(3, &[(0, 1), (1, 2), (2, 0)]).unwrap();
        let edges = undirected_edges(&arch);
        let g = CayleyGraph::build(3, &edges);

        let src = Mapping::from_assignment(vec![PhysId(1), PhysId(2), PhysId(0)]).unwrap();
        let tgt = Mapping::from_assignment(vec![PhysId(2), PhysId(0), PhysId(1)]).unwrap();

        let path = g.swap_path(&src, &tgt).unwrap();
        let mut replayed = src.clone();
        for s in &path {
            replayed.apply_swap(*s);
        }
        assert_eq!(replayed, tgt);
    }

    #[test]
    fn distance_matches_path_length() {
        let arch = ArchGraph::try_new(3, &[(0, 1), (1, 2)]).unwrap();
        let edges = undirected_edges(&arch);
        let g = CayleyGraph::build(3, &edges);
        let src = Mapping::identity(3);
        let tgt = Mapping::from_assignment(vec![PhysId(1), PhysId(0), PhysId(2)]).unwrap();
        let d = g.distance(&src, &tgt).unwrap();
        let path = g.swap_path(&src, &tgt).unwrap();
        assert_eq!(d as usize, path.len());
    }
}
