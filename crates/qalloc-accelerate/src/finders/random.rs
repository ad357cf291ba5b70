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

//! Finds a uniformly random initial mapping from an externally supplied
//! seed, so results stay reproducible across runs.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

use crate::arch_graph::ArchGraph;
use crate::error::Result;
use crate::types::{Mapping, PhysId};

pub struct RandomMappingFinder;

impl RandomMappingFinder {
    /// Returns a uniformly random bijective mapping covering every
    /// physical qubit of `arch`, deterministic for a given `seed`. Only
    /// the first `num_prog` program qubits correspond to qubits the
    /// caller's program actually uses; the rest are ancilla slots that
    /// absorb the remaining physical qubits, exactly as
    /// [`PartialMapping::complete`](crate::bounded_si) fills unused slots.
    pub fn find(arch: &ArchGraph, num_prog: usize, seed: u64) -> Result<Mapping> {
        if num_prog > arch.size() {
            return Err(crate::error::AllocError::Infeasible(format!(
                "{num_prog} program qubits do not fit on {} physical qubits",
                arch.size()
            )));
        }
        let mut rng = Pcg64Mcg::seed_from_u64(seed);
        let mut physical: Vec<PhysId> = (0..arch.size()).map(PhysId::from).collect();
        physical.shuffle(&mut rng);
        Mapping::from_assignment(physical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_is_deterministic() {
        let arch = ArchGraph::try_new(5, &[(0, 1), (1, 2), (2, 3), (3, 4)]).unwrap();
        let a = RandomMappingFinder::find(&arch, 4, 7).unwrap();
        let b = RandomMappingFinder::find(&arch, 4, 7).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_can_differ() {
        let arch = ArchGraph::try_new(6, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5)]).unwrap();
        let a = RandomMappingFinder::find(&arch, 6, 1).unwrap();
        let b = RandomMappingFinder::find(&arch, 6, 2).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn rejects_too_many_program_qubits() {
        let arch = ArchGraph::try_new(2, &[(0, 1)]).unwrap();
        assert!(RandomMappingFinder::find(&arch, 3, 0).is_err());
    }
}
