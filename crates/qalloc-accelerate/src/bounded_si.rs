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

//! Bounded beam-search dependency solver: scales to architectures too
//! large for the exact DP allocator by keeping only the `K` cheapest
//! partial mappings alive at each dependency, extending each one gate by
//! gate rather than enumerating the full permutation space.

use crate::arch_graph::ArchGraph;
use crate::config::{AllocatorConfig, REV_COST, SWAP_COST};
use crate::error::{AllocError, Result};
use crate::token_swap::ApproxTsFinder;
use crate::types::{Dep, DepsSet, Mapping, PhysId, ProgId, Solution, Swap, SwapSeq};

#[derive(Debug, Clone)]
struct PartialMapping {
    prog_to_phys: Vec<Option<PhysId>>,
    phys_to_prog: Vec<Option<ProgId>>,
}

impl PartialMapping {
    fn new(n: usize) -> Self {
        PartialMapping {
            prog_to_phys: vec![None; n],
            phys_to_prog: vec![None; n],
        }
    }

    fn phys_of(&self, prog: ProgId) -> Option<PhysId> {
        self.prog_to_phys[prog.index()]
    }

    fn assign(&mut self, prog: ProgId, phys: PhysId) {
        self.prog_to_phys[prog.index()] = Some(phys);
        self.phys_to_prog[phys.index()] = Some(prog);
    }

    fn apply_swap(&mut self, swap: Swap) {
        let Swap(a, b) = swap;
        let pa = self.phys_to_prog[a.index()];
        let pb = self.phys_to_prog[b.index()];
        self.phys_to_prog[a.index()] = pb;
        self.phys_to_prog[b.index()] = pa;
        if let Some(p) = pb {
            self.prog_to_phys[p.index()] = Some(a);
        }
        if let Some(p) = pa {
            self.prog_to_phys[p.index()] = Some(b);
        }
    }

    fn free_physical(&self) -> impl Iterator<Item = PhysId> + '_ {
        self.phys_to_prog
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_none())
            .map(|(i, _)| PhysId(i as u32))
    }

    /// Lowest-index-first completion of any still-unassigned program
    /// qubits into the remaining free physical qubits.
    fn complete(mut self) -> Mapping {
        let mut free: Vec<PhysId> = self.free_physical().collect();
        free.sort_unstable();
        let mut free_iter = free.into_iter();
        let n = self.prog_to_phys.len();
        for prog in 0..n {
            if self.prog_to_phys[prog].is_none() {
                let phys = free_iter.next().expect("free physical qubits exhausted");
                self.assign(ProgId::from(prog), phys);
            }
        }
        let assignment: Vec<PhysId> = self.prog_to_phys.into_iter().map(|p| p.unwrap()).collect();
        Mapping::from_assignment(assignment).expect("completed partial mapping must be total")
    }

    fn key(&self) -> Vec<i64> {
        self.prog_to_phys
            .iter()
            .map(|p| p.map(|x| x.0 as i64).unwrap_or(-1))
            .collect()
    }

    /// Seeds a fully-assigned partial mapping from a total [`Mapping`],
    /// used to start the beam from a finder's initial placement instead
    /// of the empty mapping.
    fn from_mapping(mapping: &Mapping) -> Self {
        let n = mapping.size();
        let mut pm = PartialMapping::new(n);
        for prog in 0..n {
            let prog_id = ProgId::from(prog);
            pm.assign(prog_id, mapping.phys_of(prog_id));
        }
        pm
    }
}

struct Candidate {
    /// The assignment as originally placed, before any routing swap.
    /// This is never touched by [`PartialMapping::apply_swap`] -- only
    /// by new placements -- so it survives unchanged into
    /// [`Solution::initial`].
    initial: PartialMapping,
    /// The current, live assignment: placements plus every swap applied
    /// so far while routing earlier dependencies.
    mapping: PartialMapping,
    cost: u64,
    per_dep_swaps: Vec<SwapSeq>,
}

pub struct BoundedSiSolver<'a> {
    arch: &'a ArchGraph,
    ts: ApproxTsFinder,
    beam_width: usize,
}

impl<'a> BoundedSiSolver<'a> {
    pub fn new(arch: &'a ArchGraph, config: &AllocatorConfig) -> Self {
        BoundedSiSolver {
            arch,
            ts: ApproxTsFinder::preprocess(arch),
            beam_width: config.beam_width.max(1),
        }
    }

    /// Solves starting from the empty mapping, per spec.md §4.6 step 1.
    pub fn solve(&self, deps: &DepsSet) -> Result<Solution> {
        self.solve_seeded(deps, None)
    }

    /// Solves starting from `initial` when given (the driver's mapping
    /// finder's seed), or the empty mapping otherwise. A fully-assigned
    /// seed constrains every dependency's placement to
    /// `extend_both_assigned`, so the only freedom left is the routing
    /// between already-placed qubits -- which is exactly how a finder's
    /// choice is meant to influence the resulting cost.
    pub fn solve_seeded(&self, deps: &DepsSet, initial: Option<&Mapping>) -> Result<Solution> {
        let n = self.arch.size();
        let start = match initial {
            Some(m) => PartialMapping::from_mapping(m),
            None => PartialMapping::new(n),
        };
        let mut candidates = vec![Candidate {
            initial: start.clone(),
            mapping: start,
            cost: 0,
            per_dep_swaps: Vec::with_capacity(deps.len()),
        }];

        for dep in deps {
            let mut next: Vec<Candidate> = Vec::new();
            for cand in candidates {
                // One candidate hitting a disconnected-route dead end (or
                // running out of free physical qubits) doesn't mean the
                // dependency itself is unsatisfiable -- other beam members
                // placed their qubits differently and may still extend.
                // Only an empty beam after trying every candidate means
                // the dependency truly can't be satisfied.
                if let Ok(extended) = self.extend_candidate(cand, dep) {
                    next.extend(extended);
                }
            }
            if next.is_empty() {
                return Err(AllocError::Infeasible(
                    "no candidate mapping could satisfy the next dependency".to_string(),
                ));
            }
            next.sort_by(|a, b| a.cost.cmp(&b.cost).then_with(|| a.mapping.key().cmp(&b.mapping.key())));
            next.dedup_by(|a, b| a.mapping.key() == b.mapping.key());
            if next.len() > self.beam_width {
                tracing::debug!(
                    kept = self.beam_width,
                    dropped = next.len() - self.beam_width,
                    "pruning bounded-SI candidate beam"
                );
            }
            next.truncate(self.beam_width);
            candidates = next;
        }

        let best = candidates
            .into_iter()
            .min_by(|a, b| a.cost.cmp(&b.cost).then_with(|| a.mapping.key().cmp(&b.mapping.key())))
            .ok_or_else(|| AllocError::Infeasible("beam emptied out".to_string()))?;

        // Any program qubit never touched by a dependency is filled in
        // lowest-physical-qubit-first at the very end, on both the
        // initial and the (otherwise unused, past this point) final
        // working mapping -- they must agree on where untouched qubits
        // land, so both complete from the same free-qubit ordering.
        Ok(Solution {
            per_dep_swaps: best.per_dep_swaps,
            cost: best.cost,
            initial: best.initial.complete(),
        })
    }

    fn extend_candidate(&self, cand: Candidate, dep: &Dep) -> Result<Vec<Candidate>> {
        let pu = cand.mapping.phys_of(dep.from);
        let pv = cand.mapping.phys_of(dep.to);

        match (pu, pv) {
            (Some(pu), Some(pv)) => self.extend_both_assigned(cand, dep, pu, pv),
            (Some(pu), None) => Ok(vec![self.extend_one_free(cand, dep, dep.to, pu)?]),
            (None, Some(pv)) => Ok(vec![self.extend_one_free(cand, dep, dep.from, pv)?]),
            (None, None) => Ok(vec![self.extend_both_free(cand, dep)?]),
        }
    }

    /// Both program qubits already have a physical home. If they are not
    /// adjacent, route the `from` token towards the `to` token (and,
    /// as a second beam member, the reverse), recording the real swaps
    /// needed so later dependencies see the updated mapping.
    fn extend_both_assigned(
        &self,
        cand: Candidate,
        dep: &Dep,
        pu: PhysId,
        pv: PhysId,
    ) -> Result<Vec<Candidate>> {
        if self.arch.has_edge(pu, pv) {
            let mut c = cand;
            let rev = if self.arch.is_reverse_edge(pu, pv) { REV_COST } else { 0 };
            c.cost += rev;
            c.per_dep_swaps.push(SwapSeq::new());
            return Ok(vec![c]);
        }

        let mut variants = Vec::new();
        if let Some(c) = self.route_together(&cand, dep, pu, pv)? {
            variants.push(c);
        }
        if let Some(c) = self.route_together(&cand, dep, pv, pu)? {
            variants.push(c);
        }
        if variants.is_empty() {
            return Err(AllocError::Infeasible(
                "no route exists to bring a dependency's qubits adjacent".to_string(),
            ));
        }
        Ok(variants)
    }

    /// Walks the token currently at `moving` one hop at a time towards
    /// `target`'s current position, along a shortest-path good neighbor,
    /// until the two are architecture-adjacent. Fails if no such route
    /// exists (the two are in different connected components).
    fn route_adjacent(
        &self,
        mapping: &mut PartialMapping,
        mut moving: PhysId,
        target: PhysId,
    ) -> Result<SwapSeq> {
        let mut swaps = SwapSeq::new();
        let max_iters = self.arch.size() + 4;
        let mut iters = 0;
        while !self.arch.has_edge(moving, target) {
            iters += 1;
            if iters > max_iters {
                return Err(AllocError::Infeasible(
                    "no route exists to bring a dependency's qubits adjacent".to_string(),
                ));
            }
            let next = self.ts.good_neighbor(self.arch, moving, target).ok_or_else(|| {
                AllocError::Infeasible(
                    "no route exists to bring a dependency's qubits adjacent".to_string(),
                )
            })?;
            let swap = Swap::new(moving, next);
            mapping.apply_swap(swap);
            swaps.push(swap);
            moving = next;
        }
        Ok(swaps)
    }

    /// Tries [`Self::route_adjacent`] for one beam variant; a connectivity
    /// failure here just means this particular variant doesn't survive,
    /// not that the whole dependency is infeasible (the caller tries the
    /// opposite direction too, see [`Self::extend_both_assigned`]).
    fn route_together(
        &self,
        cand: &Candidate,
        dep: &Dep,
        moving: PhysId,
        target: PhysId,
    ) -> Result<Option<Candidate>> {
        let mut mapping = cand.mapping.clone();
        let swaps = match self.route_adjacent(&mut mapping, moving, target) {
            Ok(s) => s,
            Err(_) => return Ok(None),
        };
        let pu = mapping.phys_of(dep.from).expect("dep.from already assigned");
        let pv = mapping.phys_of(dep.to).expect("dep.to already assigned");
        let rev = if self.arch.is_reverse_edge(pu, pv) { REV_COST } else { 0 };
        let mut c = Candidate {
            initial: cand.initial.clone(),
            mapping,
            cost: cand.cost + swaps.len() as u64 * SWAP_COST + rev,
            per_dep_swaps: cand.per_dep_swaps.clone(),
        };
        c.per_dep_swaps.push(swaps);
        Ok(Some(c))
    }

    /// One program qubit already has a physical home; place the free one
    /// on the nearest available physical neighbor (per the reference
    /// `getNearest` heuristic), then -- since the nearest free qubit is
    /// not always architecture-adjacent to the anchor -- route it the
    /// rest of the way so the dependency is guaranteed satisfiable when
    /// it executes.
    fn extend_one_free(
        &self,
        cand: Candidate,
        dep: &Dep,
        free_prog: ProgId,
        anchor: PhysId,
    ) -> Result<Candidate> {
        let mut mapping = cand.mapping.clone();
        let mut initial = cand.initial.clone();
        let target = self.nearest_free(&mapping, anchor);
        mapping.assign(free_prog, target);
        initial.assign(free_prog, target);

        let swaps = if self.arch.has_edge(target, anchor) {
            SwapSeq::new()
        } else {
            self.route_adjacent(&mut mapping, target, anchor)?
        };

        let pu = mapping.phys_of(dep.from).expect("dep.from already assigned");
        let pv = mapping.phys_of(dep.to).expect("dep.to already assigned");
        let rev = if self.arch.is_reverse_edge(pu, pv) { REV_COST } else { 0 };

        let mut c = Candidate {
            initial,
            mapping,
            cost: cand.cost + swaps.len() as u64 * SWAP_COST + rev,
            per_dep_swaps: cand.per_dep_swaps.clone(),
        };
        c.per_dep_swaps.push(swaps);
        Ok(c)
    }

    /// Neither program qubit is placed yet: pick any free, architecture-
    /// adjacent pair of physical qubits (lowest-indexed such pair). If
    /// none of the remaining free qubits are mutually adjacent, place on
    /// the two lowest-indexed free qubits and route them together, same
    /// as [`Self::extend_one_free`]'s fallback.
    fn extend_both_free(&self, cand: Candidate, dep: &Dep) -> Result<Candidate> {
        let mut mapping = cand.mapping.clone();
        let mut initial = cand.initial.clone();
        let free: Vec<PhysId> = {
            let mut f: Vec<PhysId> = mapping.free_physical().collect();
            f.sort_unstable();
            f
        };
        if free.len() < 2 {
            return Err(AllocError::Infeasible(
                "not enough free physical qubits remain to place a dependency".to_string(),
            ));
        }

        let pair = free.iter().enumerate().find_map(|(i, &a)| {
            free[i + 1..]
                .iter()
                .find(|&&b| self.arch.has_edge(a, b))
                .map(|&b| (a, b))
        });

        let (pa, pb) = pair.unwrap_or((free[0], free[1]));
        mapping.assign(dep.from, pa);
        mapping.assign(dep.to, pb);
        initial.assign(dep.from, pa);
        initial.assign(dep.to, pb);

        let swaps = if self.arch.has_edge(pa, pb) {
            SwapSeq::new()
        } else {
            self.route_adjacent(&mut mapping, pb, pa)?
        };

        let pu = mapping.phys_of(dep.from).expect("dep.from already assigned");
        let pv = mapping.phys_of(dep.to).expect("dep.to already assigned");
        let rev = if self.arch.is_reverse_edge(pu, pv) { REV_COST } else { 0 };

        let mut c = Candidate {
            initial,
            mapping,
            cost: cand.cost + swaps.len() as u64 * SWAP_COST + rev,
            per_dep_swaps: cand.per_dep_swaps.clone(),
        };
        c.per_dep_swaps.push(swaps);
        Ok(c)
    }

    fn nearest_free(&self, mapping: &PartialMapping, anchor: PhysId) -> PhysId {
        mapping
            .free_physical()
            .min_by_key(|&p| (self.ts.distance(anchor, p).unwrap_or(u32::MAX), p.0))
            .expect("at least one free physical qubit must remain")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Dep;

    #[test]
    fn single_dep_needs_no_swaps() {
        let arch = ArchGraph::try_new(4, &[(0, 1), (1, 2), (2, 3)]).unwrap();
        let config = AllocatorConfig::default();
        let solver = BoundedSiSolver::new(&arch, &config);
        let deps = vec![Dep::new(ProgId(0), ProgId(1))];
        let solution = solver.solve(&deps).unwrap();
        assert!(solution.per_dep_swaps[0].is_empty());
        assert!(arch.has_edge(
            solution.initial.phys_of(ProgId(0)),
            solution.initial.phys_of(ProgId(1))
        ));
    }

    #[test]
    fn reverse_only_edge_charges_rev_cost() {
        // Architecture only supports a native CNOT from phys 1 to phys 0.
        // Mapping prog1 (the dependency's control) to phys0 and prog0 (the
        // target) to phys1 means the physical gate needs the opposite
        // direction, so this must be charged REV_COST with zero swaps.
        let arch = ArchGraph::try_new(2, &[(1, 0)]).unwrap();
        let config = AllocatorConfig::default();
        let solver = BoundedSiSolver::new(&arch, &config);
        let deps = vec![Dep::new(ProgId(1), ProgId(0))];
        let solution = solver.solve(&deps).unwrap();
        assert!(solution.per_dep_swaps[0].is_empty());
        assert_eq!(solution.cost, REV_COST);
    }

    #[test]
    fn placement_into_a_constrained_free_slot_stays_feasible() {
        // After two earlier dependencies claim phys 1..3 on a 5-qubit
        // line, the only physical qubit left for a fresh program qubit is
        // the far end (phys 4) -- not adjacent to phys 0, which is where
        // its dependency partner already lives. The solver must still
        // route the two together rather than leave a non-adjacent pair.
        let arch = ArchGraph::try_new(5, &[(0, 1), (1, 2), (2, 3), (3, 4)]).unwrap();
        let config = AllocatorConfig::default();
        let solver = BoundedSiSolver::new(&arch, &config);
        let deps = vec![
            Dep::new(ProgId(0), ProgId(1)),
            Dep::new(ProgId(2), ProgId(3)),
            Dep::new(ProgId(0), ProgId(4)),
        ];
        let solution = solver.solve(&deps).unwrap();

        let mut mapping = solution.initial.clone();
        for (i, dep) in deps.iter().enumerate() {
            for s in &solution.per_dep_swaps[i] {
                mapping.apply_swap(*s);
            }
            assert!(
                arch.has_edge(mapping.phys_of(dep.from), mapping.phys_of(dep.to)),
                "dep {i} not adjacent after its routed swaps"
            );
        }
    }

    #[test]
    fn non_adjacent_assigned_pair_gets_routed() {
        let arch = ArchGraph::try_new(4, &[(0, 1), (1, 2), (2, 3)]).unwrap();
        let config = AllocatorConfig::default();
        let solver = BoundedSiSolver::new(&arch, &config);
        // Force 0 and 3 to be placed, then ask for a dependency between
        // them which is not adjacent on the line architecture.
        let deps = vec![
            Dep::new(ProgId(0), ProgId(1)),
            Dep::new(ProgId(2), ProgId(3)),
            Dep::new(ProgId(0), ProgId(3)),
        ];
        let solution = solver.solve(&deps).unwrap();
        assert!(solution.cost > 0);
        assert!(!solution.per_dep_swaps[2].is_empty());
    }
}
