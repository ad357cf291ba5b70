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

use thiserror::Error;

/// Everything that can go wrong while allocating or routing. No partial
/// `Solution` is ever returned alongside one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocError {
    /// No valid mapping/routing exists for the given dependencies on the
    /// given architecture (e.g. more program qubits than physical ones).
    #[error("no feasible allocation exists: {0}")]
    Infeasible(String),

    /// A required physical qubit is unreachable from the current mapping
    /// under the architecture's connectivity (disconnected coupling graph).
    #[error("layout is unreachable: {0}")]
    UnreachableLayout(String),

    /// The exact DP allocator was asked to run on more qubits than its
    /// `n_max` capacity threshold allows.
    #[error("allocator capacity exceeded: {0}")]
    CapacityExceeded(String),

    /// Malformed input from the caller: a non-pairwise dependency, an
    /// out-of-range qubit index, a non-injective mapping, a malformed
    /// architecture graph, etc.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, AllocError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_stable() {
        assert_eq!(
            AllocError::InvalidInput("x".into()).to_string(),
            "invalid input: x"
        );
        assert_eq!(
            AllocError::CapacityExceeded("n=10".into()).to_string(),
            "allocator capacity exceeded: n=10"
        );
    }
}
