use std::path::PathBuf;

use numpy::{PyArray1, PyArray2, PyArrayMethods};
use ply_reader::{read_ply_vertices, VertexCloud};
use pyo3::exceptions::PyRuntimeError;
use pyo3::prelude::*;

/// Decoded PLY vertices, read once on construction.
#[pyclass(name = "PLYReader", frozen)]
pub struct PyPlyReader {
    cloud: VertexCloud,
}

#[pymethods]
impl PyPlyReader {
    #[new]
    fn new(path: PathBuf) -> PyResult<Self> {
        let cloud = read_ply_vertices(&path).map_err(|e| {
            PyRuntimeError::new_err(format!("Failed to read PLY file {}: {e}", path.display()))
        })?;
        Ok(Self { cloud })
    }

    /// Vertex positions as an (N, 3) float32 array.
    fn get_vertices<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray2<f32>>> {
        PyArray1::from_slice(py, self.cloud.positions_flat()).reshape([self.cloud.len(), 3])
    }

    /// Per-vertex timestamps as an (N,) float32 array, or None if the file has none.
    fn get_timestamps<'py>(&self, py: Python<'py>) -> Option<Bound<'py, PyArray1<f32>>> {
        self.cloud
            .has_timestamps()
            .then(|| PyArray1::from_slice(py, self.cloud.timestamps()))
    }

    fn __len__(&self) -> usize {
        self.cloud.len()
    }
}

#[pymodule]
#[pyo3(name = "ply_reader")]
pub fn ply_reader_py(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add_class::<PyPlyReader>()?;
    Ok(())
}
