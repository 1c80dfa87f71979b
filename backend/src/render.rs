use super::assets::{FRAGMENT_SHADER, TRIANGLE_VERTICES, VERTEX_SHADER};
use super::error::*;
use super::geometry::{Mesh, VertexLayout};
use super::glutils::{GlApi, Primitive};
use super::math::model_transform;
use super::shaders::{ShaderProgram, UniformLocation};

pub const MODEL_UNIFORM: &str = "model";

/// Everything a frame needs, produced once by the setup sequence.
#[derive(Debug)]
pub struct RenderState {
    mesh: Mesh,
    program: ShaderProgram,
    model: UniformLocation,
}

#[derive(Debug, Default)]
pub struct RenderStateBuilder {
    mesh: Option<Mesh>,
    program: Option<ShaderProgram>,
}

impl RenderStateBuilder {
    pub fn geometry(mut self, mesh: Mesh) -> Self {
        self.mesh = Some(mesh);
        self
    }

    pub fn program(mut self, program: ShaderProgram) -> Self {
        self.program = Some(program);
        self
    }

    /// Fails unless both the geometry and a program exposing the model
    /// uniform were supplied; nothing is drawn without them.
    pub fn build(self) -> Result<RenderState> {
        let mesh = self.mesh.ok_or(Error::MissingGeometry)?;
        let program = self.program.ok_or(Error::MissingProgram)?;
        let model = program.uniform(MODEL_UNIFORM)?;
        Ok(RenderState {
            mesh,
            program,
            model,
        })
    }
}

impl RenderState {
    pub fn builder() -> RenderStateBuilder {
        RenderStateBuilder::default()
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn program(&self) -> &ShaderProgram {
        &self.program
    }

    /// Issues one frame's worth of commands. The order matters: each call
    /// relies on the binding made by the one before it.
    pub fn draw_frame(&self, gl: &mut impl GlApi) {
        gl.clear_color(0.0, 0.0, 0.0, 1.0);
        gl.clear_color_buffer();

        self.program.use_program(gl);
        self.program.set_mat4(gl, self.model, &model_transform());

        gl.bind_vertex_array(self.mesh.vao());
        gl.draw_arrays(Primitive::Triangles, 0, self.mesh.vertex_count());
        gl.bind_vertex_array(0);

        gl.use_program(0);
    }
}

/// One-time setup for the triangle: viewport, geometry upload and program
/// build. The frame loop must not start unless this succeeds.
pub fn setup(gl: &mut impl GlApi, framebuffer: (u32, u32)) -> Result<RenderState> {
    setup_with(gl, framebuffer, &TRIANGLE_VERTICES, VERTEX_SHADER, FRAGMENT_SHADER)
}

pub(crate) fn setup_with(
    gl: &mut impl GlApi,
    framebuffer: (u32, u32),
    vertices: &[f32],
    vertex_code: &str,
    fragment_code: &str,
) -> Result<RenderState> {
    let (width, height) = framebuffer;
    gl.viewport(0, 0, width as i32, height as i32);

    let mesh = Mesh::upload(gl, vertices, VertexLayout::POSITION_3F)?;
    let program = ShaderProgram::from_sources(gl, vertex_code, fragment_code, &[MODEL_UNIFORM])?;
    RenderState::builder()
        .geometry(mesh)
        .program(program)
        .build()
}
