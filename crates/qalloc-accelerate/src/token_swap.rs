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

//! 4-approximate token swapping, after Miltzow, Nagy, Rote, Schoenberger
//! (ESA 2016, DOI 10.4230/LIPIcs.ESA.2016.66): rearrange tokens (program
//! qubits) placed on graph vertices (physical qubits) into a target
//! placement using adjacent swaps, greedily moving each unhappy token one
//! step closer to its destination along a precomputed shortest-path
//! routing table.

use crate::arch_graph::ArchGraph;
use crate::error::{AllocError, Result};
use crate::types::{Mapping, PhysId, Swap, SwapSeq};

/// Precomputed all-pairs distances and a "good neighbor" routing table,
/// built once per [`ArchGraph`] and reused across every `find` call --
/// the "good-vertices matrix" from the reference algorithm.
pub struct ApproxTsFinder {
    dist: Vec<Vec<Option<u32>>>,
}

impl ApproxTsFinder {
    /// Runs one BFS per vertex to build the all-pairs distance table.
    pub fn preprocess(arch: &ArchGraph) -> Self {
        let dist = (0..arch.size())
            .map(|i| arch.distances_from(PhysId(i as u32)))
            .collect();
        ApproxTsFinder { dist }
    }

    pub(crate) fn distance(&self, a: PhysId, b: PhysId) -> Option<u32> {
        self.dist[a.index()][b.index()]
    }

    /// The neighbor of `u` (among `arch`'s neighbors) on a shortest path
    /// towards `dest`, i.e. the unique-enough "good" next hop. Ties break
    /// on lowest `PhysId`.
    pub(crate) fn good_neighbor(&self, arch: &ArchGraph, u: PhysId, dest: PhysId) -> Option<PhysId> {
        let cur = self.distance(u, dest)?;
        if cur == 0 {
            return None;
        }
        arch.neighbors(u)
            .into_iter()
            .filter(|&w| self.distance(w, dest) == Some(cur - 1))
            .min_by_key(|w| w.0)
    }

    /// Finds a sequence of adjacent swaps transforming `from` into `to`.
    /// Both mappings must be total over the same set of program qubits
    /// and physical qubits.
    pub fn find(&self, arch: &ArchGraph, from: &Mapping, to: &Mapping) -> Result<SwapSeq> {
        if from.size() != to.size() {
            return Err(AllocError::InvalidInput(
                "token swap source and target mappings have different sizes".to_string(),
            ));
        }

        let mut current = from.clone();
        let mut swaps = SwapSeq::new();

        // Destination physical qubit for the token currently placed at
        // each physical qubit, indexed by the token's program id.
        let dest_of_prog: Vec<PhysId> = (0..to.size())
            .map(|p| to.phys_of(crate::types::ProgId::from(p)))
            .collect();

        let size = arch.size();
        let max_iters = 16 * size * size + 64;
        let mut iters = 0;
        // Advancing the lowest-index unhappy token towards a good neighbor
        // can dead-end at a vertex that is currently happy: the swap
        // displaces that token rather than resolving a mutual cycle, which
        // does not strictly shrink the sum of all tokens' distances to
        // their destinations on that one step. Forbidding an immediate
        // undo of the previous swap is enough to keep such steps from
        // ping-ponging between the same two states forever; resolution
        // then proceeds through a short sequence of such displacements
        // until the tokens involved close a cycle (see the module doc).
        let mut last_swap: Option<Swap> = None;

        while current != *to {
            iters += 1;
            if iters > max_iters {
                return Err(AllocError::UnreachableLayout(
                    "token swap did not converge within the approximation bound".to_string(),
                ));
            }

            let mut chosen: Option<Swap> = None;
            let mut fallback: Option<Swap> = None;
            for u in 0..size as u32 {
                let u = PhysId(u);
                let tok = current.prog_of(u);
                let dest = dest_of_prog[tok.index()];
                if dest == u {
                    continue;
                }
                if let Some(w) = self.good_neighbor(arch, u, dest) {
                    let candidate = Swap::new(u, w);
                    if fallback.is_none() {
                        fallback = Some(candidate);
                    }
                    if Some(candidate) != last_swap {
                        chosen = Some(candidate);
                        break;
                    }
                }
            }
            let swap = chosen.or(fallback).ok_or_else(|| {
                AllocError::UnreachableLayout(
                    "no unhappy token has a good neighbor to advance towards".to_string(),
                )
            })?;
            current.apply_swap(swap);
            swaps.push(swap);
            last_swap = Some(swap);
        }

        Ok(swaps)
    }
}
