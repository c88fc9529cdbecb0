use std::collections::HashMap;

use anyhow::{anyhow, bail, Result};
use glam::{Vec3, Vec4};
use renderer::{BoxedDrawable, BufferTarget, Drawable, GeometryFactory, GlBackend, PrimitiveMode};

const X: f32 = 0.525_731_1;
const Z: f32 = 0.850_650_8;

const BASE_VERTICES: [[f32; 3]; 12] = [
    [-X, 0.0, Z],
    [X, 0.0, Z],
    [-X, 0.0, -Z],
    [X, 0.0, -Z],
    [0.0, Z, X],
    [0.0, Z, -X],
    [0.0, -Z, X],
    [0.0, -Z, -X],
    [Z, X, 0.0],
    [-Z, X, 0.0],
    [Z, -X, 0.0],
    [-Z, -X, 0.0],
];

const BASE_FACES: [[u32; 3]; 20] = [
    [0, 4, 1],
    [0, 9, 4],
    [9, 5, 4],
    [4, 5, 8],
    [4, 8, 1],
    [8, 10, 1],
    [8, 3, 10],
    [5, 3, 8],
    [5, 2, 3],
    [2, 7, 3],
    [7, 10, 3],
    [7, 6, 10],
    [7, 11, 6],
    [11, 0, 6],
    [0, 1, 6],
    [6, 1, 10],
    [9, 0, 11],
    [9, 11, 2],
    [9, 2, 5],
    [7, 2, 11],
];

/// CPU-side icosphere: an icosahedron whose faces are split into four,
/// `subdivisions` times, with shared edge midpoints pushed onto the sphere.
#[derive(Debug, Clone, PartialEq)]
pub struct IcosphereMesh {
    pub positions: Vec<Vec4>,
    pub normals: Vec<Vec4>,
    pub indices: Vec<u32>,
}

impl IcosphereMesh {
    pub fn generate(center: Vec3, radius: f32, subdivisions: u32) -> Self {
        let mut directions: Vec<Vec3> = BASE_VERTICES.iter().map(|v| Vec3::from_array(*v)).collect();
        let mut faces: Vec<[u32; 3]> = BASE_FACES.to_vec();

        for _ in 0..subdivisions {
            let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
            let mut midpoint = |a: u32, b: u32, directions: &mut Vec<Vec3>| -> u32 {
                let key = (a.min(b), a.max(b));
                *midpoints.entry(key).or_insert_with(|| {
                    let mid = (directions[a as usize] + directions[b as usize]).normalize();
                    directions.push(mid);
                    (directions.len() - 1) as u32
                })
            };

            let mut next = Vec::with_capacity(faces.len() * 4);
            for [a, b, c] in faces {
                let ab = midpoint(a, b, &mut directions);
                let bc = midpoint(b, c, &mut directions);
                let ca = midpoint(c, a, &mut directions);
                next.extend([[a, ab, ca], [b, bc, ab], [c, ca, bc], [ab, bc, ca]]);
            }
            faces = next;
        }

        let positions = directions
            .iter()
            .map(|dir| (center + *dir * radius).extend(1.0))
            .collect();
        let normals = directions.iter().map(|dir| dir.extend(0.0)).collect();
        let indices = faces.into_iter().flatten().collect();

        Self {
            positions,
            normals,
            indices,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// An icosphere uploaded to GPU buffers.
pub struct Icosphere<B: GlBackend> {
    position: Option<B::Buffer>,
    normal: Option<B::Buffer>,
    index: Option<B::Buffer>,
    count: u32,
}

impl<B: GlBackend> Icosphere<B> {
    pub fn create(gl: &B, center: Vec3, radius: f32, subdivisions: u32) -> Result<Self> {
        let mesh = IcosphereMesh::generate(center, radius, subdivisions);

        let uploads: [(BufferTarget, &[u8], &str); 3] = [
            (
                BufferTarget::Array,
                bytemuck::cast_slice(&mesh.positions),
                "position",
            ),
            (
                BufferTarget::Array,
                bytemuck::cast_slice(&mesh.normals),
                "normal",
            ),
            (
                BufferTarget::ElementArray,
                bytemuck::cast_slice(&mesh.indices),
                "index",
            ),
        ];
        let mut created = Vec::with_capacity(uploads.len());
        for (target, bytes, what) in uploads {
            match gl.create_buffer(target, bytes) {
                Ok(buffer) => created.push(buffer),
                Err(err) => {
                    for buffer in created {
                        gl.delete_buffer(buffer);
                    }
                    bail!(
                        "failed to upload icosphere {what} buffer at tessellation {subdivisions}: {err}"
                    );
                }
            }
        }
        let (position, normal, index) = (created[0], created[1], created[2]);

        let count = u32::try_from(mesh.indices.len())
            .map_err(|_| anyhow!("icosphere index count exceeds u32"))?;
        tracing::debug!(
            subdivisions,
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            "uploaded icosphere"
        );

        Ok(Self {
            position: Some(position),
            normal: Some(normal),
            index: Some(index),
            count,
        })
    }
}

fn bind<B: GlBackend>(gl: &B, target: BufferTarget, buffer: Option<B::Buffer>) -> bool {
    match buffer {
        Some(buffer) => {
            gl.bind_buffer(target, Some(buffer));
            true
        }
        None => false,
    }
}

impl<B: GlBackend> Drawable<B> for Icosphere<B> {
    fn bind_position(&self, gl: &B) -> bool {
        bind(gl, BufferTarget::Array, self.position)
    }

    fn bind_normal(&self, gl: &B) -> bool {
        bind(gl, BufferTarget::Array, self.normal)
    }

    fn bind_index(&self, gl: &B) -> bool {
        bind(gl, BufferTarget::ElementArray, self.index)
    }

    fn draw_mode(&self) -> PrimitiveMode {
        PrimitiveMode::Triangles
    }

    fn element_count(&self) -> u32 {
        self.count
    }

    fn destroy(&mut self, gl: &B) {
        for buffer in [self.position.take(), self.normal.take(), self.index.take()]
            .into_iter()
            .flatten()
        {
            gl.delete_buffer(buffer);
        }
        self.count = 0;
    }
}

/// Builds unit icospheres at the origin.
#[derive(Debug, Clone, Copy)]
pub struct IcosphereFactory {
    pub center: Vec3,
    pub radius: f32,
}

impl Default for IcosphereFactory {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            radius: 1.0,
        }
    }
}

impl<B: GlBackend + 'static> GeometryFactory<B> for IcosphereFactory {
    fn build(&mut self, gl: &B, tessellation: u32) -> Result<BoxedDrawable<B>> {
        let sphere = Icosphere::create(gl, self.center, self.radius, tessellation)?;
        Ok(Box::new(sphere))
    }
}
