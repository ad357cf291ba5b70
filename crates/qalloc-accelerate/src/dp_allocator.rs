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

//! Exact dynamic-programming allocator: enumerates every permutation of
//! `0..n` as a candidate mapping at each dependency step and finds the
//! minimum-cost path through them. Only practical for small `n` (the
//! state space is `n!`), so it refuses to run above a configured
//! capacity threshold.

use rayon::prelude::*;

use crate::arch_graph::ArchGraph;
use crate::cayley_graph::{undirected_edges, CayleyGraph};
use crate::config::{REV_COST, SWAP_COST};
use crate::error::{AllocError, Result};
use crate::perm_index::{factorial, unrank};
use crate::types::{DepsSet, Mapping, PhysId, Solution, SwapSeq};

pub struct DpAllocator<'a> {
    arch: &'a ArchGraph,
    cayley: CayleyGraph,
    n: usize,
}

const UNREACHABLE_COST: u64 = u64::MAX;

impl<'a> DpAllocator<'a> {
    /// Builds the allocator's Cayley-graph BFS table for `arch`. Returns
    /// [`AllocError::CapacityExceeded`] if `arch.size()` exceeds `n_max`;
    /// the table is `O(n!)`, and `n! * n!` DP transitions are evaluated
    /// per dependency, so this is only sane for `n` up to roughly 7-8.
    pub fn new(arch: &'a ArchGraph, n_max: usize) -> Result<Self> {
        let n = arch.size();
        if n > n_max {
            tracing::warn!(n, n_max, "DP allocator capacity exceeded");
            return Err(AllocError::CapacityExceeded(format!(
                "DP allocator refuses to run on {n} qubits (n_max = {n_max})"
            )));
        }
        tracing::debug!(n, states = crate::perm_index::factorial(n), "building DP permutation table");
        let edges = undirected_edges(arch);
        let cayley = CayleyGraph::build(n, &edges);
        Ok(DpAllocator { arch, cayley, n })
    }

    /// Solves for the minimum-cost initial mapping and per-dependency
    /// swap sequence over the full `n!` permutation state space.
    pub fn allocate(&self, deps: &DepsSet) -> Result<Solution> {
        let num_states = self.cayley.num_states();
        let num_deps = deps.len();

        if num_states == 0 {
            return Err(AllocError::InvalidInput(
                "DP allocator requires at least one qubit".to_string(),
            ));
        }

        let mappings: Vec<Mapping> = (0..num_states as u64)
            .map(|r| Mapping::from_assignment(unrank(r, self.n).into_iter().map(PhysId).collect()).unwrap())
            .collect();

        // `cost[i]` / `parent[i]` describe the DP frontier after
        // processing dependency `i` (or the base case at `i == 0`).
        let mut cost: Vec<Vec<u64>> = Vec::with_capacity(num_deps + 1);
        let mut parent: Vec<Vec<Option<u32>>> = Vec::with_capacity(num_deps + 1);

        cost.push(vec![0u64; num_states]);
        parent.push(vec![None; num_states]);

        for dep in deps.iter() {
            let prev_cost = &cost[cost.len() - 1];

            let results: Vec<(u64, Option<u32>)> = (0..num_states)
                .into_par_iter()
                .map(|tgt_idx| {
                    let tgt = &mappings[tgt_idx];
                    let pu = tgt.phys_of(dep.from);
                    let pv = tgt.phys_of(dep.to);
                    if !self.arch.has_edge(pu, pv) {
                        return (UNREACHABLE_COST, None);
                    }
                    let rev_cost = if self.arch.is_reverse_edge(pu, pv) {
                        REV_COST
                    } else {
                        0
                    };

                    let mut best_cost = UNREACHABLE_COST;
                    let mut best_src: Option<u32> = None;
                    for src_idx in 0..num_states {
                        if prev_cost[src_idx] == UNREACHABLE_COST {
                            continue;
                        }
                        let swap_cost = if src_idx == tgt_idx {
                            0
                        } else {
                            match self.cayley.distance(&mappings[src_idx], tgt) {
                                Some(d) => d as u64 * SWAP_COST,
                                None => continue,
                            }
                        };
                        let total = prev_cost[src_idx] + swap_cost + rev_cost;
                        // Lowest source index wins ties, matching the
                        // universal tie-break rule.
                        if total < best_cost {
                            best_cost = total;
                            best_src = Some(src_idx as u32);
                        }
                    }
                    (best_cost, best_src)
                })
                .collect();

            let mut next_cost = Vec::with_capacity(num_states);
            let mut next_parent = Vec::with_capacity(num_states);
            for (c, p) in results {
                next_cost.push(c);
                next_parent.push(p);
            }
            cost.push(next_cost);
            parent.push(next_parent);
        }

        let final_cost = &cost[num_deps];
        let (best_final_idx, &best_cost) = final_cost
            .iter()
            .enumerate()
            .min_by_key(|&(idx, &c)| (c, idx))
            .ok_or_else(|| AllocError::Infeasible("no DP state reachable".to_string()))?;

        if best_cost == UNREACHABLE_COST {
            return Err(AllocError::Infeasible(
                "no sequence of mappings realizes every dependency on this architecture"
                    .to_string(),
            ));
        }

        // Walk back the chosen state at every step to recover the
        // per-dependency target mappings, then re-derive the swap
        // sequence between consecutive mappings from the Cayley graph.
        let mut chosen_idx = vec![0usize; num_deps + 1];
        chosen_idx[num_deps] = best_final_idx;
        for i in (1..=num_deps).rev() {
            let p = parent[i][chosen_idx[i]].ok_or_else(|| {
                AllocError::Infeasible("broken DP back-pointer chain".to_string())
            })?;
            chosen_idx[i - 1] = p as usize;
        }

        let initial = mappings[chosen_idx[0]].clone();
        let mut per_dep_swaps: Vec<SwapSeq> = Vec::with_capacity(num_deps);
        for i in 1..=num_deps {
            let src = &mappings[chosen_idx[i - 1]];
            let tgt = &mappings[chosen_idx[i]];
            let swaps = if chosen_idx[i - 1] == chosen_idx[i] {
                SwapSeq::new()
            } else {
                self.cayley
                    .swap_path(src, tgt)
                    .ok_or_else(|| AllocError::Infeasible("unreachable layout transition".into()))?
            };
            per_dep_swaps.push(swaps);
        }

        Ok(Solution {
            initial,
            per_dep_swaps,
            cost: best_cost,
        })
    }
}
