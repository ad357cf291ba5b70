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

//! The Python-facing boundary: thin `pyo3` wrappers around the pure-Rust
//! `ArchGraph`/`Mapping` types, plus the `allocate` entry point that drives
//! the engine and calls back into a Python `insert_swap_before` callable --
//! the same split `qiskit-accelerate` draws between its plain-Rust core
//! types and the `#[pyclass]`/`#[pyfunction]` seams `qiskit-pyext`
//! re-exports.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::arch_graph::ArchGraph as CoreArchGraph;
use crate::config::AllocatorConfig;
use crate::driver::{self, AllocatorKind, MappingFinderKind, SwapSink};
use crate::error::AllocError;
use crate::types::{Dep, DepsSet, Mapping as CoreMapping, PhysId, ProgId};

impl From<AllocError> for PyErr {
    fn from(err: AllocError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

/// Python-visible wrapper around [`CoreArchGraph`].
#[pyclass(name = "ArchGraph", module = "qalloc_accelerate")]
#[derive(Clone)]
pub struct PyArchGraph(pub CoreArchGraph);

#[pymethods]
impl PyArchGraph {
    /// `ArchGraph(size, directed_edges)` -- `directed_edges` is a list of
    /// `(from, to)` pairs, matching `ArchGraph`'s own constructor.
    #[new]
    fn new(size: usize, directed_edges: Vec<(u32, u32)>) -> PyResult<Self> {
        Ok(PyArchGraph(CoreArchGraph::try_new(size, &directed_edges)?))
    }

    fn size(&self) -> usize {
        self.0.size()
    }

    fn has_edge(&self, u: u32, v: u32) -> bool {
        self.0.has_edge(PhysId(u), PhysId(v))
    }

    fn is_reverse_edge(&self, u: u32, v: u32) -> bool {
        self.0.is_reverse_edge(PhysId(u), PhysId(v))
    }
}

/// Python-visible wrapper around [`CoreMapping`], returned to the host as
/// `Solution.initial` for prologue emission.
#[pyclass(name = "Mapping", module = "qalloc_accelerate")]
#[derive(Clone)]
pub struct PyMapping(pub CoreMapping);

#[pymethods]
impl PyMapping {
    fn prog_to_phys(&self) -> Vec<u32> {
        self.0.prog_to_phys().iter().map(|p| p.0).collect()
    }

    fn phys_to_prog(&self) -> Vec<u32> {
        self.0.phys_to_prog().iter().map(|p| p.0).collect()
    }

    fn size(&self) -> usize {
        self.0.size()
    }
}

/// Adapts a Python callable into the [`SwapSink`] the driver calls back
/// into once per routed swap. A Python-side exception raised by the
/// callback is stashed via `PyErr::restore` rather than silently dropped;
/// `allocate` below checks for a pending exception after the run and
/// surfaces it instead of a successful `Mapping`.
struct PyCallbackSink<'py> {
    py: Python<'py>,
    callback: Bound<'py, PyAny>,
}

impl SwapSink for PyCallbackSink<'_> {
    fn insert_swap_before(&mut self, dep_index: usize, prog_u: ProgId, prog_v: ProgId) {
        if let Err(e) = self.callback.call1((dep_index, prog_u.0, prog_v.0)) {
            e.restore(self.py);
        }
    }
}

/// The engine's external entry point: seeds an initial mapping with the
/// weighted perfect-matching finder, routes every
/// dependency with the bounded-SI solver (or the exact DP allocator when
/// `use_exact` is set), and calls `insert_swap_before(dep_index, prog_u,
/// prog_v)` once per swap, in dependency order, before returning the
/// initial `Mapping` for the host's prologue.
#[pyfunction]
#[pyo3(signature = (arch, deps, num_prog, insert_swap_before, use_exact=false, seed=0))]
pub fn allocate(
    py: Python<'_>,
    arch: &PyArchGraph,
    deps: Vec<(u32, u32)>,
    num_prog: usize,
    insert_swap_before: Bound<'_, PyAny>,
    use_exact: bool,
    seed: u64,
) -> PyResult<PyMapping> {
    let deps: DepsSet = deps
        .into_iter()
        .map(|(a, b)| Dep::new(ProgId(a), ProgId(b)))
        .collect();
    let config = AllocatorConfig {
        seed,
        ..AllocatorConfig::default()
    };
    let allocator_kind = if use_exact {
        AllocatorKind::Exact
    } else {
        AllocatorKind::BoundedSi
    };
    let mut sink = PyCallbackSink {
        py,
        callback: insert_swap_before,
    };
    let initial = driver::allocate(
        &arch.0,
        &deps,
        num_prog,
        MappingFinderKind::WeightedPm,
        None,
        allocator_kind,
        &config,
        &mut sink,
    )?;
    if let Some(err) = PyErr::take(py) {
        return Err(err);
    }
    Ok(PyMapping(initial))
}

#[pymodule]
pub fn qalloc_accelerate(m: &Bound<PyModule>) -> PyResult<()> {
    m.add_class::<PyArchGraph>()?;
    m.add_class::<PyMapping>()?;
    m.add_wrapped(wrap_pyfunction!(allocate))?;
    Ok(())
}
