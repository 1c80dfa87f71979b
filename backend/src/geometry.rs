use super::error::*;
use super::glutils::{check_gl_err, clear_gl_errors, GlApi};

/// How one float attribute is laid out inside an array buffer. `stride` and
/// `offset` are counted in floats.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VertexLayout {
    pub index: u32,
    pub components: i32,
    pub normalized: bool,
    pub stride: usize,
    pub offset: usize,
}

impl VertexLayout {
    /// Attribute 0, three tightly packed floats.
    pub const POSITION_3F: VertexLayout = VertexLayout {
        index: 0,
        components: 3,
        normalized: false,
        stride: 0,
        offset: 0,
    };
}

/// Vertex data living in GPU memory together with the vertex array that
/// describes it.
#[derive(Debug)]
pub struct Mesh {
    vao: u32,
    vbo: u32,
    vertex_count: i32,
    layout: VertexLayout,
}

impl Mesh {
    /// Copies `vertices` into a new static buffer and records `layout` in a
    /// new vertex array. Buffer and vertex array bindings are reset to 0
    /// before returning.
    pub fn upload(gl: &mut impl GlApi, vertices: &[f32], layout: VertexLayout) -> Result<Mesh> {
        let components = layout.components.max(1) as usize;
        if vertices.is_empty() || layout.components < 1 || vertices.len() % components != 0 {
            return MalformedVertexDataSnafu {
                len: vertices.len(),
                components: layout.components,
            }
            .fail();
        }

        let vao = gl.gen_vertex_array();
        if vao == 0 {
            return AllocationFailedSnafu {
                what: "vertex array",
            }
            .fail();
        }
        gl.bind_vertex_array(vao);

        let vbo = gl.gen_buffer();
        if vbo == 0 {
            gl.bind_vertex_array(0);
            return AllocationFailedSnafu {
                what: "vertex buffer",
            }
            .fail();
        }
        gl.bind_array_buffer(vbo);
        clear_gl_errors(gl);
        gl.array_buffer_data_static(vertices);

        let uploaded = check_gl_err(gl);
        if uploaded.is_ok() {
            gl.vertex_attrib_pointer(&layout);
            gl.enable_vertex_attrib_array(layout.index);
        }

        gl.bind_array_buffer(0);
        gl.bind_vertex_array(0);
        uploaded?;

        let vertex_count = (vertices.len() / components) as i32;
        log::debug!(
            "uploaded {} vertices (vao {}, vbo {})",
            vertex_count,
            vao,
            vbo
        );

        Ok(Mesh {
            vao,
            vbo,
            vertex_count,
            layout,
        })
    }

    pub fn vao(&self) -> u32 {
        self.vao
    }

    pub fn vbo(&self) -> u32 {
        self.vbo
    }

    pub fn vertex_count(&self) -> i32 {
        self.vertex_count
    }

    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }
}
