//! Static full-screen quad and its GPU buffers.

use log::debug;

use crate::error::RenderError;
use crate::gpu::{AttribFormat, BufferTarget, Gpu, VertexAttribute};
use crate::shader::{ATTRIB_COLOR, ATTRIB_POSITION};

/// Packs a colour with red in the low byte and alpha in the high byte,
/// which is the byte order `[r, g, b, a]` the colour attribute reads.
pub const fn pack_rgba(r: u8, g: u8, b: u8, a: u8) -> u32 {
    u32::from_le_bytes([r, g, b, a])
}

const DARK_RED: u32 = pack_rgba(139, 0, 0, 255);
const GOLD: u32 = pack_rgba(255, 215, 0, 255);

/// Geometry as uploaded: positions, one packed colour per vertex, and
/// triangle-list indices.
#[derive(Debug, Copy, Clone)]
pub struct Mesh<'a> {
    pub positions: &'a [[f32; 3]],
    pub colors: &'a [u32],
    pub indices: &'a [u32],
}

pub const QUAD: Mesh<'static> = Mesh {
    positions: &[
        [-1.0, -1.0, 0.0],
        [1.0, -1.0, 0.0],
        [1.0, 1.0, 0.0],
        [-1.0, 1.0, 0.0],
    ],
    colors: &[DARK_RED, DARK_RED, GOLD, GOLD],
    indices: &[0, 1, 2, 2, 3, 0],
};

/// Vertex, colour and index buffers for one mesh, plus the vertex array
/// object they are drawn through.
pub struct GeometryBuffer<G: Gpu> {
    vertex_array: G::VertexArray,
    positions: G::Buffer,
    colors: G::Buffer,
    indices: G::Buffer,
    index_count: i32,
}

impl<G: Gpu> GeometryBuffer<G> {
    /// Uploads `mesh` and checks each buffer's reported size against the
    /// bytes sent. Anything created before a failure is deleted again.
    pub fn create(gpu: &G, mesh: &Mesh<'_>) -> Result<Self, RenderError> {
        let vertex_array = gpu
            .create_vertex_array()
            .map_err(|reason| RenderError::ResourceCreation {
                what: "vertex array",
                reason,
            })?;

        let uploads: [(&'static str, BufferTarget, &[u8]); 3] = [
            ("vertex", BufferTarget::Array, bytemuck::cast_slice(mesh.positions)),
            ("color", BufferTarget::Array, bytemuck::cast_slice(mesh.colors)),
            ("index", BufferTarget::ElementArray, bytemuck::cast_slice(mesh.indices)),
        ];

        let mut created: Vec<G::Buffer> = Vec::with_capacity(uploads.len());
        for (name, target, bytes) in uploads {
            match upload(gpu, name, target, bytes) {
                Ok(buffer) => created.push(buffer),
                Err(err) => {
                    for buffer in created {
                        gpu.delete_buffer(buffer);
                    }
                    gpu.delete_vertex_array(vertex_array);
                    return Err(err);
                }
            }
        }

        let [positions, colors, indices] = [created[0], created[1], created[2]];
        Ok(Self {
            vertex_array,
            positions,
            colors,
            indices,
            index_count: mesh.indices.len() as i32,
        })
    }

    pub fn index_count(&self) -> i32 {
        self.index_count
    }

    /// One indexed triangle-list draw of the whole mesh.
    pub fn draw(&self, gpu: &G) {
        let (position_location, _) = ATTRIB_POSITION;
        let (color_location, _) = ATTRIB_COLOR;
        let attributes = [
            VertexAttribute {
                location: position_location,
                buffer: self.positions,
                components: 3,
                format: AttribFormat::F32,
            },
            VertexAttribute {
                location: color_location,
                buffer: self.colors,
                components: 4,
                format: AttribFormat::U8Normalized,
            },
        ];
        gpu.draw_indexed(self.vertex_array, &attributes, self.indices, self.index_count);
    }

    pub fn release(self, gpu: &G) {
        gpu.delete_buffer(self.positions);
        gpu.delete_buffer(self.colors);
        gpu.delete_buffer(self.indices);
        gpu.delete_vertex_array(self.vertex_array);
    }
}

fn upload<G: Gpu>(
    gpu: &G,
    name: &'static str,
    target: BufferTarget,
    bytes: &[u8],
) -> Result<G::Buffer, RenderError> {
    let buffer = gpu
        .create_buffer()
        .map_err(|reason| RenderError::ResourceCreation {
            what: "buffer",
            reason,
        })?;
    let reported = gpu.upload_buffer(target, buffer, bytes);
    if reported != bytes.len() as i64 {
        gpu.delete_buffer(buffer);
        return Err(RenderError::BufferUploadSizeMismatch {
            buffer: name,
            expected: bytes.len(),
            actual: reported,
        });
    }
    debug!("uploaded {name} buffer ({reported} bytes)");
    Ok(buffer)
}
