use serde::{Deserialize, Serialize};

use crate::types::Vertex;

/// Quality cuts a vertex must pass to be counted. All three are required.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VertexQualityCuts {
    pub min_ndof: f64,
    /// cm
    pub max_rho: f64,
    /// cm
    pub max_abs_z: f64,
}

impl Default for VertexQualityCuts {
    fn default() -> Self {
        Self {
            min_ndof: 4.0,
            max_rho: 2.0,
            max_abs_z: 24.0,
        }
    }
}

impl VertexQualityCuts {
    pub fn accepts(&self, v: &Vertex) -> bool {
        v.ndof >= self.min_ndof && v.rho() <= self.max_rho && v.z.abs() <= self.max_abs_z
    }
}

/// Event-level inputs shared by every electron of one event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EventContext {
    pub rho: f64,
    pub vertex_count: u32,
}

impl EventContext {
    pub fn build(vertices: &[Vertex], rho: f64, cuts: &VertexQualityCuts) -> Self {
        let vertex_count = vertices.iter().filter(|v| cuts.accepts(v)).count() as u32;
        Self { rho, vertex_count }
    }
}
