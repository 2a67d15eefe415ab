//! Wireframe models drawn by custom elements.

use nalgebra::{Rotation3, Vector3};
use trellis_layout::{Color, CustomData};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ModelId(pub u32);

impl ModelId {
    /// Handle to place in a custom element's `CustomData`.
    pub fn custom_data(self) -> CustomData {
        CustomData(self.0 as u64)
    }

    /// `None` when the data cannot name a model.
    pub fn from_custom_data(data: CustomData) -> Option<Self> {
        u32::try_from(data.0).ok().map(ModelId)
    }
}

/// Vertices in model space plus the index pairs of the edges between them.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vector3<f32>>,
    pub edges: Vec<(usize, usize)>,
}

impl Mesh {
    /// Axis-aligned cube centred on the origin.
    pub fn cube(size: f32) -> Self {
        let h = size / 2.0;
        let vertices = (0..8)
            .map(|i| {
                Vector3::new(
                    if i & 1 == 0 { -h } else { h },
                    if i & 2 == 0 { -h } else { h },
                    if i & 4 == 0 { -h } else { h },
                )
            })
            .collect();
        // vertices differing in exactly one bit share an edge
        let mut edges = Vec::with_capacity(12);
        for a in 0..8usize {
            for bit in [1usize, 2, 4] {
                let b = a | bit;
                if b != a {
                    edges.push((a, b));
                }
            }
        }
        Self { vertices, edges }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub mesh: Mesh,
    pub scale: f32,
    /// Euler angles (roll, pitch, yaw) in radians.
    pub rotation: Vector3<f32>,
    pub color: Color,
}

impl Model {
    pub fn new(mesh: Mesh, scale: f32, color: Color) -> Self {
        Self {
            mesh,
            scale,
            rotation: Vector3::zeros(),
            color,
        }
    }

    /// World-space vertices when placed at `position` with an extra `scale`.
    pub fn world_vertices(&self, position: Vector3<f32>, scale: f32) -> Vec<Vector3<f32>> {
        let rotation =
            Rotation3::from_euler_angles(self.rotation.x, self.rotation.y, self.rotation.z);
        let s = self.scale * scale;
        self.mesh
            .vertices
            .iter()
            .map(|v| position + rotation * (v * s))
            .collect()
    }
}

#[derive(Default)]
pub struct ModelTable {
    models: Vec<Model>,
}

impl ModelTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, model: Model) -> ModelId {
        self.models.push(model);
        ModelId((self.models.len() - 1) as u32)
    }

    pub fn get(&self, id: ModelId) -> Option<&Model> {
        self.models.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
