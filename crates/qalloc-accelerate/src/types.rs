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

//! Core value types shared by every component: qubit indices, dependency
//! lists, swaps, and the final `Solution`.

use smallvec::SmallVec;

use crate::error::{AllocError, Result};

/// A physical qubit index, as addressed on the target [`crate::arch_graph::ArchGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhysId(pub u32);

/// A program (logical) qubit index, as addressed by a [`Dep`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProgId(pub u32);

impl PhysId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl ProgId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for PhysId {
    fn from(v: usize) -> Self {
        PhysId(v as u32)
    }
}

impl From<usize> for ProgId {
    fn from(v: usize) -> Self {
        ProgId(v as u32)
    }
}

/// A two-qubit gate dependency between two program qubits. Order matters:
/// `from` is the control, `to` the target, of the original two-qubit
/// operation as it appears in the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dep {
    pub from: ProgId,
    pub to: ProgId,
}

impl Dep {
    pub fn new(from: ProgId, to: ProgId) -> Self {
        Dep { from, to }
    }

    /// Builds a `Dep` from a raw qubit list, rejecting anything that isn't
    /// exactly a pair. A host handing over a multi-qubit gate (or a
    /// single-qubit one) as a dependency is malformed input, not an
    /// internal invariant violation, so this is a runtime check rather
    /// than a type-level one.
    pub fn from_slice(qubits: &[u32]) -> Result<Self> {
        match qubits {
            [a, b] => Ok(Dep::new(ProgId(*a), ProgId(*b))),
            other => Err(AllocError::InvalidInput(format!(
                "dependency must involve exactly two qubits, got {}",
                other.len()
            ))),
        }
    }
}

/// An ordered list of two-qubit dependencies, in program order. Order is
/// load-bearing: the DP allocator and the bounded-SI solver both process
/// dependencies strictly left to right.
pub type DepsSet = Vec<Dep>;

/// An unordered pair of adjacent physical qubits to swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Swap(pub PhysId, pub PhysId);

impl Swap {
    pub fn new(a: PhysId, b: PhysId) -> Self {
        if a.0 <= b.0 {
            Swap(a, b)
        } else {
            Swap(b, a)
        }
    }
}

/// Sequence of swaps applied in order to carry one mapping into another.
/// Most sequences are short (a handful of hops along the coupling graph),
/// so this is stack-allocated up to 8 elements before spilling to the heap.
pub type SwapSeq = SmallVec<[Swap; 8]>;

/// A total, invertible assignment of program qubits to physical qubits.
///
/// Both directions are kept consistent at all times: there is no separate
/// "inverse map" type a caller could let drift out of sync with the
/// forward map. Call [`Mapping::swap`] or [`Mapping::assign`] to mutate it;
/// both update `prog_to_phys` and `phys_to_prog` together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    prog_to_phys: Vec<PhysId>,
    phys_to_prog: Vec<ProgId>,
}

impl Mapping {
    /// Builds the identity mapping over `size` qubits (program qubit `i`
    /// maps to physical qubit `i`).
    pub fn identity(size: usize) -> Self {
        let prog_to_phys: Vec<PhysId> = (0..size).map(PhysId::from).collect();
        let phys_to_prog: Vec<ProgId> = (0..size).map(ProgId::from).collect();
        Mapping {
            prog_to_phys,
            phys_to_prog,
        }
    }

    /// Builds a mapping from an explicit program-to-physical assignment.
    /// Errors with [`AllocError::InvalidInput`] if the assignment is not a
    /// bijection over `0..assignment.len()`.
    pub fn from_assignment(assignment: Vec<PhysId>) -> Result<Self> {
        let size = assignment.len();
        let mut phys_to_prog = vec![ProgId(u32::MAX); size];
        for (p, &phys) in assignment.iter().enumerate() {
            if phys.index() >= size {
                return Err(AllocError::InvalidInput(format!(
                    "physical qubit {} out of range for mapping of size {}",
                    phys.0, size
                )));
            }
            if phys_to_prog[phys.index()].0 != u32::MAX {
                return Err(AllocError::InvalidInput(
                    "mapping assignment is not injective".to_string(),
                ));
            }
            phys_to_prog[phys.index()] = ProgId::from(p);
        }
        Ok(Mapping {
            prog_to_phys: assignment,
            phys_to_prog,
        })
    }

    pub fn size(&self) -> usize {
        self.prog_to_phys.len()
    }

    #[inline]
    pub fn phys_of(&self, prog: ProgId) -> PhysId {
        self.prog_to_phys[prog.index()]
    }

    #[inline]
    pub fn prog_of(&self, phys: PhysId) -> ProgId {
        self.phys_to_prog[phys.index()]
    }

    pub fn prog_to_phys(&self) -> &[PhysId] {
        &self.prog_to_phys
    }

    pub fn phys_to_prog(&self) -> &[ProgId] {
        &self.phys_to_prog
    }

    /// Applies a swap of two physical qubits' assigned program qubits,
    /// keeping both directions consistent.
    pub fn apply_swap(&mut self, swap: Swap) {
        let Swap(a, b) = swap;
        self.phys_to_prog.swap(a.index(), b.index());
        let pa = self.phys_to_prog[a.index()];
        let pb = self.phys_to_prog[b.index()];
        self.prog_to_phys[pa.index()] = a;
        self.prog_to_phys[pb.index()] = b;
    }

    /// Lexicographic order over `prog_to_phys`, used as the universal
    /// tie-break across every search/allocator component.
    pub fn lexicographic_key(&self) -> &[PhysId] {
        &self.prog_to_phys
    }
}

/// The final, fully-assigned output of an allocation run.
#[derive(Debug, Clone)]
pub struct Solution {
    /// The mapping programs qubits are assigned to before the first gate.
    pub initial: Mapping,
    /// Routed swaps to insert immediately before each dependency, in the
    /// same order as the input `DepsSet`.
    pub per_dep_swaps: Vec<SwapSeq>,
    /// Total accounted cost (`SWAP_COST` per swap plus `REV_COST` per
    /// reversed two-qubit gate).
    pub cost: u64,
}
