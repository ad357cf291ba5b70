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

//! Pure orchestration: pick a mapping finder, run an allocator, replay the
//! resulting swaps through the host's `insertSwapBefore` callback. This is
//! the only piece of the crate that knows about all the others; nothing
//! downstream of it (the host's IR/visitor framework) is in scope here.

use tracing::warn;

use crate::arch_graph::ArchGraph;
use crate::bounded_si::BoundedSiSolver;
use crate::config::AllocatorConfig;
use crate::dp_allocator::DpAllocator;
use crate::error::Result;
use crate::finders::{RandomMappingFinder, WeightedPmMappingFinder};
use crate::types::{DepsSet, Mapping, ProgId, Solution};

/// Which initial-mapping finder seeds the allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingFinderKind {
    /// Uniformly random, using `AllocatorConfig::seed`.
    Random,
    /// Greedy weighted-matching seed from interaction frequency.
    WeightedPm,
    /// Caller already has a `Mapping`; the driver runs neither finder.
    Fixed,
}

/// Which allocator routes the dependencies once seeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocatorKind {
    /// Exact DP allocator (§4.5); refuses above `AllocatorConfig::dp_n_max`.
    Exact,
    /// Bounded-SI beam search (§4.6); the only option for larger `n`.
    BoundedSi,
}

/// The callback contract: the host is told, for each dependency index,
/// which pair of *program* qubits to SWAP immediately before the
/// corresponding IR statement.
pub trait SwapSink {
    fn insert_swap_before(&mut self, dep_index: usize, prog_u: ProgId, prog_v: ProgId);
}

/// A `SwapSink` that just records the calls, for tests and for callers
/// that want the plain list rather than a live callback.
#[derive(Debug, Default)]
pub struct RecordingSwapSink {
    pub calls: Vec<(usize, ProgId, ProgId)>,
}

impl SwapSink for RecordingSwapSink {
    fn insert_swap_before(&mut self, dep_index: usize, prog_u: ProgId, prog_v: ProgId) {
        self.calls.push((dep_index, prog_u, prog_v));
    }
}

/// Adapts any `FnMut(usize, ProgId, ProgId)` closure into a `SwapSink`, for
/// callers that would rather pass a closure than implement the trait.
impl<F: FnMut(usize, ProgId, ProgId)> SwapSink for F {
    fn insert_swap_before(&mut self, dep_index: usize, prog_u: ProgId, prog_v: ProgId) {
        self(dep_index, prog_u, prog_v)
    }
}

/// Pure orchestration entry point: seed an initial mapping, run the
/// chosen allocator, replay the routed swaps on program qubits through
/// `sink`, and return the initial mapping for prologue emission.
///
/// `num_prog` is the number of program qubits actually used by `deps`
/// (qubits beyond this, up to `arch.size()`, are ancilla slots the finder
/// fills in but the host never sees on the `SwapSink`).
///
/// The finder's seed actually reaches the allocator: `AllocatorKind::BoundedSi`
/// starts its beam from the finder's mapping (see
/// [`BoundedSiSolver::solve_seeded`]) rather than the empty mapping, so
/// `MappingFinderKind::Random`/`WeightedPm`/`Fixed` each produce a
/// different `Solution`. `AllocatorKind::Exact` is a different story: it
/// is an exhaustive search over every permutation and always finds the
/// true optimum regardless of where it starts, so the finder's result
/// genuinely has no effect on its `Solution` beyond the early feasibility
/// check below -- that's intrinsic to exact search, not a no-op bug.
/// When `finder` is `Random` and `allocator` is `BoundedSi`,
/// `config.num_trials` independent seeds (`config.seed`, `config.seed +
/// 1`, ...) are each routed through the solver and the lowest-cost
/// `Solution` is kept, ties broken by lowest trial index.
pub fn allocate(
    arch: &ArchGraph,
    deps: &DepsSet,
    num_prog: usize,
    finder: MappingFinderKind,
    fixed_initial: Option<Mapping>,
    allocator: AllocatorKind,
    config: &AllocatorConfig,
    sink: &mut dyn SwapSink,
) -> Result<Mapping> {
    let seed_mapping = |trial_seed: u64| -> Result<Mapping> {
        match finder {
            MappingFinderKind::Random => RandomMappingFinder::find(arch, num_prog, trial_seed),
            MappingFinderKind::WeightedPm => WeightedPmMappingFinder::find(arch, num_prog, deps),
            MappingFinderKind::Fixed => Ok(fixed_initial
                .clone()
                .expect("MappingFinderKind::Fixed requires `fixed_initial`")),
        }
    };

    let run_trial = |initial: &Mapping| -> Result<Solution> {
        let result = match allocator {
            AllocatorKind::Exact => DpAllocator::new(arch, config.dp_n_max)?.allocate(deps),
            AllocatorKind::BoundedSi => {
                BoundedSiSolver::new(arch, config).solve_seeded(deps, Some(initial))
            }
        };
        result.map_err(|e| {
            warn!(error = %e, "allocation failed");
            e
        })
    };

    let base_initial = seed_mapping(config.seed)?;
    let mut best = run_trial(&base_initial)?;

    // Extra randomized trials only make sense for the random finder
    // feeding the bounded-SI solver: the DP allocator is exact regardless
    // of seed, and the weighted-PM / fixed finders are themselves
    // deterministic, so re-running them would just repeat the same trial.
    if matches!(finder, MappingFinderKind::Random) && matches!(allocator, AllocatorKind::BoundedSi)
    {
        for trial in 1..config.num_trials.max(1) as u64 {
            let initial = seed_mapping(config.seed.wrapping_add(trial))?;
            let solution = run_trial(&initial)?;
            if solution.cost < best.cost {
                best = solution;
            }
        }
    }

    replay(deps, &best, sink);
    Ok(best.initial)
}

fn replay(deps: &DepsSet, solution: &Solution, sink: &mut dyn SwapSink) {
    let mut assign: Vec<ProgId> = solution.initial.phys_to_prog().to_vec();

    for (i, _dep) in deps.iter().enumerate() {
        for swap in &solution.per_dep_swaps[i] {
            let crate::types::Swap(u, v) = *swap;
            let pu = assign[u.index()];
            let pv = assign[v.index()];
            sink.insert_swap_before(i, pu, pv);
            assign.swap(u.index(), v.index());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Dep;

    fn line(n: u32) -> ArchGraph {
        let edges: Vec<(u32, u32)> = (0..n - 1).map(|i| (i, i + 1)).collect();
        ArchGraph::try_new(n as usize, &edges).unwrap()
    }

    #[test]
    fn s1_trivial_adjacent_deps_need_no_swaps() {
        let arch = line(3);
        let deps = vec![
            Dep::new(ProgId(0), ProgId(1)),
            Dep::new(ProgId(1), ProgId(2)),
        ];
        let config = AllocatorConfig {
            seed: 0,
            ..Default::default()
        };
        let mut sink = RecordingSwapSink::default();
        let initial = allocate(
            &arch,
            &deps,
            3,
            MappingFinderKind::Fixed,
            Some(Mapping::identity(3)),
            AllocatorKind::Exact,
            &config,
            &mut sink,
        )
        .unwrap();
        assert_eq!(initial, Mapping::identity(3));
        assert!(sink.calls.is_empty());
    }

    #[test]
    fn s2_one_swap_needed_for_distant_dep() {
        let arch = line(3);
        let deps = vec![Dep::new(ProgId(0), ProgId(2))];
        let config = AllocatorConfig::default();
        let mut sink = RecordingSwapSink::default();
        allocate(
            &arch,
            &deps,
            3,
            MappingFinderKind::Fixed,
            Some(Mapping::identity(3)),
            AllocatorKind::Exact,
            &config,
            &mut sink,
        )
        .unwrap();
        assert_eq!(sink.calls.len(), 1);
    }

    #[test]
    fn s3_reverse_edge_only_costs_rev_cost_not_a_swap() {
        let arch = ArchGraph::try_new(2, &[(0, 1)]).unwrap();
        let deps = vec![Dep::new(ProgId(1), ProgId(0))];
        let config = AllocatorConfig::default();
        let mut sink = RecordingSwapSink::default();
        allocate(
            &arch,
            &deps,
            2,
            MappingFinderKind::Fixed,
            Some(Mapping::identity(2)),
            AllocatorKind::Exact,
            &config,
            &mut sink,
        )
        .unwrap();
        assert!(sink.calls.is_empty());
    }

    #[test]
    fn s4_disconnected_architecture_is_infeasible() {
        let arch = ArchGraph::try_new(2, &[]).unwrap();
        let deps = vec![Dep::new(ProgId(0), ProgId(1))];
        let config = AllocatorConfig::default();
        let mut sink = RecordingSwapSink::default();
        let err = allocate(
            &arch,
            &deps,
            2,
            MappingFinderKind::Fixed,
            Some(Mapping::identity(2)),
            AllocatorKind::Exact,
            &config,
            &mut sink,
        )
        .unwrap_err();
        assert!(matches!(err, crate::error::AllocError::Infeasible(_)));
    }

    #[test]
    fn s6_capacity_exceeded_for_large_n_on_exact_allocator() {
        let edges: Vec<(u32, u32)> = (0..9u32).map(|i| (i, i + 1)).collect();
        let arch = ArchGraph::try_new(10, &edges).unwrap();
        let deps = vec![Dep::new(ProgId(0), ProgId(1))];
        let config = AllocatorConfig::default();
        let mut sink = RecordingSwapSink::default();
        let err = allocate(
            &arch,
            &deps,
            10,
            MappingFinderKind::Random,
            None,
            AllocatorKind::Exact,
            &config,
            &mut sink,
        )
        .unwrap_err();
        assert!(matches!(err, crate::error::AllocError::CapacityExceeded(_)));
    }

    #[test]
    fn bounded_si_path_routes_on_a_larger_architecture() {
        let edges: Vec<(u32, u32)> = (0..9u32).map(|i| (i, i + 1)).collect();
        let arch = ArchGraph::try_new(10, &edges).unwrap();
        let deps = vec![
            Dep::new(ProgId(0), ProgId(1)),
            Dep::new(ProgId(5), ProgId(9)),
        ];
        let config = AllocatorConfig::default();
        let mut sink = RecordingSwapSink::default();
        let initial = allocate(
            &arch,
            &deps,
            10,
            MappingFinderKind::WeightedPm,
            None,
            AllocatorKind::BoundedSi,
            &config,
            &mut sink,
        )
        .unwrap();
        assert_eq!(initial.size(), 10);
    }

    #[test]
    fn determinism_same_seed_same_calls() {
        let edges: Vec<(u32, u32)> = (0..9u32).map(|i| (i, i + 1)).collect();
        let arch = ArchGraph::try_new(10, &edges).unwrap();
        let deps = vec![
            Dep::new(ProgId(0), ProgId(3)),
            Dep::new(ProgId(3), ProgId(8)),
        ];
        let config = AllocatorConfig {
            seed: 123,
            ..Default::default()
        };

        let run = || {
            let mut sink = RecordingSwapSink::default();
            let initial = allocate(
                &arch,
                &deps,
                10,
                MappingFinderKind::Random,
                None,
                AllocatorKind::BoundedSi,
                &config,
                &mut sink,
            )
            .unwrap();
            (initial, sink.calls)
        };

        let (init_a, calls_a) = run();
        let (init_b, calls_b) = run();
        assert_eq!(init_a, init_b);
        assert_eq!(calls_a, calls_b);
    }

    #[test]
    fn fixed_finder_seed_is_returned_unchanged_as_the_initial_mapping() {
        // A fully-assigned seed constrains bounded-SI to route between
        // already-placed qubits rather than choosing its own placement,
        // so the `initial` the driver returns must be exactly the seed
        // handed in -- this is the effect `MappingFinderKind::Fixed` is
        // documented to have, and the one a discarded finder result
        // would silently fail to produce.
        use crate::types::PhysId;

        let edges: Vec<(u32, u32)> = (0..4u32).map(|i| (i, i + 1)).collect();
        let arch = ArchGraph::try_new(5, &edges).unwrap();
        let deps = vec![Dep::new(ProgId(0), ProgId(4))];
        let config = AllocatorConfig::default();
        let fixed = Mapping::from_assignment(vec![
            PhysId(4),
            PhysId(3),
            PhysId(2),
            PhysId(1),
            PhysId(0),
        ])
        .unwrap();

        let mut sink = RecordingSwapSink::default();
        let initial = allocate(
            &arch,
            &deps,
            5,
            MappingFinderKind::Fixed,
            Some(fixed.clone()),
            AllocatorKind::BoundedSi,
            &config,
            &mut sink,
        )
        .unwrap();
        assert_eq!(initial, fixed);
    }

    #[test]
    fn num_trials_is_actually_consulted_for_the_random_finder() {
        // Reproduces the driver's own trial loop with the same two
        // building blocks (`RandomMappingFinder`, `BoundedSiSolver`)
        // independently, to confirm `allocate` doesn't just run the
        // first seed and ignore `num_trials` -- the exact bug this
        // regression test exists to catch.
        use crate::bounded_si::BoundedSiSolver;
        use crate::finders::RandomMappingFinder;

        let edges: Vec<(u32, u32)> = (0..9u32).map(|i| (i, i + 1)).collect();
        let arch = ArchGraph::try_new(10, &edges).unwrap();
        let deps = vec![
            Dep::new(ProgId(0), ProgId(9)),
            Dep::new(ProgId(2), ProgId(7)),
            Dep::new(ProgId(4), ProgId(5)),
        ];
        let config = AllocatorConfig {
            seed: 1,
            num_trials: 4,
            ..Default::default()
        };
        let solver = BoundedSiSolver::new(&arch, &config);

        let mut expected_initial = None;
        let mut best_cost = u64::MAX;
        for trial in 0..config.num_trials as u64 {
            let seeded = RandomMappingFinder::find(&arch, 10, config.seed.wrapping_add(trial)).unwrap();
            let solution = solver.solve_seeded(&deps, Some(&seeded)).unwrap();
            if solution.cost < best_cost {
                best_cost = solution.cost;
                expected_initial = Some(solution.initial);
            }
        }

        let mut sink = RecordingSwapSink::default();
        let initial = allocate(
            &arch,
            &deps,
            10,
            MappingFinderKind::Random,
            None,
            AllocatorKind::BoundedSi,
            &config,
            &mut sink,
        )
        .unwrap();

        assert_eq!(initial, expected_initial.unwrap());
    }
}
