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

//! `qalloc-accelerate`: a qubit mapping and routing engine for quantum
//! circuits. Given a sequence of two-qubit gate dependencies between
//! *program qubits* and a hardware coupling graph over *physical qubits*,
//! it produces an initial program-to-physical assignment and a sequence
//! of SWAP gates, interleaved with the original dependencies, such that
//! every two-qubit gate acts on a hardware-adjacent pair when it executes.
//!
//! The front-end (assembly parsing, IR, symbol tables, CLI, and emission
//! of the rewritten program) is out of scope -- see [`driver`] for the
//! boundary this crate exposes to that host.

pub mod arch_graph;
pub mod bounded_si;
pub mod cayley_graph;
pub mod config;
pub mod dp_allocator;
pub mod driver;
pub mod error;
pub mod finders;
pub mod perm_index;
pub mod py_api;
pub mod token_swap;
pub mod types;
pub mod weighted_graph;

pub use arch_graph::ArchGraph;
pub use config::AllocatorConfig;
pub use driver::{allocate, AllocatorKind, MappingFinderKind, RecordingSwapSink, SwapSink};
pub use error::{AllocError, Result};
pub use types::{Dep, DepsSet, Mapping, PhysId, ProgId, Solution, Swap, SwapSeq};
