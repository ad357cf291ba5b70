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

//! The importable extension module. Mirrors the split between
//! `qiskit-accelerate` (the Rust library, which also defines the
//! `#[pyclass]`/`#[pyfunction]` seams) and `qiskit-pyext` (the thin
//! `cdylib` that gathers those seams into one Python-importable module) --
//! this crate adds no logic of its own, only registration.

use pyo3::prelude::*;

#[pymodule]
fn qalloc_pyext(py: Python, m: &Bound<PyModule>) -> PyResult<()> {
    let accelerate = PyModule::new_bound(py, "qalloc_accelerate")?;
    qalloc_accelerate::py_api::qalloc_accelerate(&accelerate)?;
    m.add_submodule(&accelerate)?;
    Ok(())
}
