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

//! An undirected weighted interaction graph over program qubits, built by
//! counting how often each pair of program qubits participates together
//! in a [`crate::types::Dep`].

use ahash::AHashMap;
use itertools::Itertools;

use crate::types::{DepsSet, ProgId};

#[derive(Debug, Clone, Default)]
pub struct WeightedGraph {
    weights: AHashMap<(u32, u32), u64>,
}

impl WeightedGraph {
    /// Builds the interaction graph from an ordered dependency list by
    /// counting pair frequency, mirroring the reference implementation's
    /// `wMap[(from,to)]++` accumulation.
    pub fn from_deps(deps: &DepsSet) -> Self {
        let mut weights = AHashMap::new();
        for dep in deps {
            let key = ordered_pair(dep.from, dep.to);
            *weights.entry(key).or_insert(0) += 1;
        }
        WeightedGraph { weights }
    }

    pub fn weight(&self, a: ProgId, b: ProgId) -> u64 {
        self.weights
            .get(&ordered_pair(a, b))
            .copied()
            .unwrap_or(0)
    }

    /// All edges with nonzero weight, in `(ProgId, ProgId)` lexicographic
    /// order — the iteration order the matching finder relies on for
    /// deterministic tie-breaking.
    pub fn edges(&self) -> Vec<(ProgId, ProgId, u64)> {
        self.weights
            .iter()
            .map(|(&(a, b), &w)| (ProgId(a), ProgId(b), w))
            .sorted_by_key(|&(a, b, _)| (a, b))
            .collect()
    }
}

fn ordered_pair(a: ProgId, b: ProgId) -> (u32, u32) {
    if a.0 <= b.0 {
        (a.0, b.0)
    } else {
        (b.0, a.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Dep;

    #[test]
    fn counts_frequency_regardless_of_direction() {
        let deps = vec![
            Dep::new(ProgId(0), ProgId(1)),
            Dep::new(ProgId(1), ProgId(0)),
            Dep::new(ProgId(0), ProgId(1)),
        ];
        let g = WeightedGraph::from_deps(&deps);
        assert_eq!(g.weight(ProgId(0), ProgId(1)), 3);
        assert_eq!(g.weight(ProgId(1), ProgId(0)), 3);
        assert_eq!(g.weight(ProgId(2), ProgId(3)), 0);
    }

    #[test]
    fn edges_sorted_lexicographically() {
        let deps = vec![
            Dep::new(ProgId(2), ProgId(3)),
            Dep::new(ProgId(0), ProgId(1)),
        ];
        let g = WeightedGraph::from_deps(&deps);
        let edges = g.edges();
        assert_eq!(edges[0].0, ProgId(0));
        assert_eq!(edges[1].0, ProgId(2));
    }
}
