use super::error::*;
use super::geometry::VertexLayout;
use super::shaders::ShaderStage;
use gl::{types::*, *};
use sdl2::video::GLContext;
use std::ffi::{CStr, CString};
use std::marker::PhantomData;

/// Size of the buffer driver diagnostics are read into. Longer messages are
/// truncated.
pub const INFO_LOG_CAPACITY: usize = 1024;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Primitive {
    Triangles,
}

/// The OpenGL entry points used by the renderer.
///
/// Every call goes to the context that is current on the calling thread, so
/// implementations are neither `Send` nor shared. Handles are the raw GL
/// names, where 0 means "no object".
pub trait GlApi {
    fn create_shader(&mut self, stage: ShaderStage) -> u32;
    fn shader_source(&mut self, shader: u32, source: &str);
    fn compile_shader(&mut self, shader: u32);
    fn shader_compile_status(&self, shader: u32) -> bool;
    fn shader_info_log(&self, shader: u32) -> String;
    fn delete_shader(&mut self, shader: u32);

    fn create_program(&mut self) -> u32;
    fn attach_shader(&mut self, program: u32, shader: u32);
    fn link_program(&mut self, program: u32);
    fn program_link_status(&self, program: u32) -> bool;
    fn validate_program(&mut self, program: u32);
    fn program_validate_status(&self, program: u32) -> bool;
    fn program_info_log(&self, program: u32) -> String;
    fn uniform_location(&mut self, program: u32, name: &CStr) -> i32;
    fn use_program(&mut self, program: u32);
    fn uniform_matrix4(&mut self, location: i32, columns: &[f32; 16]);

    fn gen_vertex_array(&mut self) -> u32;
    fn bind_vertex_array(&mut self, vao: u32);
    fn gen_buffer(&mut self) -> u32;
    fn bind_array_buffer(&mut self, buffer: u32);
    fn array_buffer_data_static(&mut self, data: &[f32]);
    fn vertex_attrib_pointer(&mut self, layout: &VertexLayout);
    fn enable_vertex_attrib_array(&mut self, index: u32);

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32);
    fn clear_color(&mut self, r: f32, g: f32, b: f32, a: f32);
    fn clear_color_buffer(&mut self);
    fn draw_arrays(&mut self, mode: Primitive, first: i32, count: i32);

    fn get_error(&mut self) -> u32;
}

pub fn check_gl_err(gl: &mut impl GlApi) -> Result<()> {
    match gl.get_error() {
        NO_ERROR => Ok(()),
        OUT_OF_MEMORY => AllocationFailedSnafu {
            what: "OpenGL object storage",
        }
        .fail(),
        code => GlSnafu { code }.fail(),
    }
}

/// Upper bound on flags drained by [`clear_gl_errors`]; without a current
/// context some drivers report an error on every query.
const MAX_STALE_ERRORS: usize = 16;

/// Drains error flags left by earlier calls so the next [`check_gl_err`]
/// only reports what happens after this point.
pub fn clear_gl_errors(gl: &mut impl GlApi) {
    for _ in 0..MAX_STALE_ERRORS {
        match gl.get_error() {
            NO_ERROR => return,
            code => log::warn!("discarding stale OpenGL error 0x{:04x}", code),
        }
    }
}

/// Turns a driver-filled log buffer into text, dropping the trailing nul and
/// anything past the reported length.
pub(crate) fn info_log_to_string(buffer: &[u8], written: GLsizei) -> String {
    let len = usize::try_from(written).unwrap_or(0).min(buffer.len());
    let text = &buffer[..len];
    let text = match text.iter().position(|b| *b == 0) {
        Some(nul) => &text[..nul],
        None => text,
    };
    String::from_utf8_lossy(text).trim_end().to_string()
}

#[derive(Debug, Clone)]
pub struct ContextInfo {
    pub vendor: String,
    pub renderer: String,
    pub version: String,
    pub glsl_version: String,
}

/// `GlApi` over the function pointers loaded by [`crate::system::System`].
///
/// Borrows the context it was created from and stays on the thread that
/// made it current.
///
/// ```compile_fail
/// fn assert_send<T: Send>() {}
/// assert_send::<backend::glutils::NativeGl<'static>>();
/// ```
///
/// ```compile_fail
/// fn outlive(system: backend::system::System) -> backend::glutils::NativeGl<'static> {
///     system.gl()
/// }
/// ```
#[derive(Debug)]
pub struct NativeGl<'ctx> {
    _ctx: PhantomData<&'ctx GLContext>,
    _not_send: PhantomData<*const ()>,
}

impl<'ctx> NativeGl<'ctx> {
    /// `ctx` must be current and `gl::load_with` must have run.
    pub(crate) fn new(_ctx: &'ctx GLContext) -> NativeGl<'ctx> {
        NativeGl {
            _ctx: PhantomData,
            _not_send: PhantomData,
        }
    }

    pub fn context_info(&self) -> ContextInfo {
        ContextInfo {
            vendor: gl_string(VENDOR),
            renderer: gl_string(RENDERER),
            version: gl_string(VERSION),
            glsl_version: gl_string(SHADING_LANGUAGE_VERSION),
        }
    }
}

fn gl_string(name: GLenum) -> String {
    let ptr = unsafe { gl::GetString(name) };
    if ptr.is_null() {
        return "<unknown>".to_string();
    }
    unsafe { CStr::from_ptr(ptr.cast()) }
        .to_string_lossy()
        .into_owned()
}

fn stage_enum(stage: ShaderStage) -> GLenum {
    match stage {
        ShaderStage::Vertex => VERTEX_SHADER,
        ShaderStage::Fragment => FRAGMENT_SHADER,
    }
}

impl GlApi for NativeGl<'_> {
    fn create_shader(&mut self, stage: ShaderStage) -> u32 {
        unsafe { gl::CreateShader(stage_enum(stage)) }
    }

    fn shader_source(&mut self, shader: u32, source: &str) {
        let len = source.len() as GLint;
        unsafe {
            gl::ShaderSource(shader, 1, &(source.as_bytes().as_ptr().cast()), &len);
        }
    }

    fn compile_shader(&mut self, shader: u32) {
        unsafe { gl::CompileShader(shader) };
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        let mut success = 0;
        unsafe { gl::GetShaderiv(shader, COMPILE_STATUS, &mut success) };
        success != 0
    }

    fn shader_info_log(&self, shader: u32) -> String {
        let mut v = vec![0u8; INFO_LOG_CAPACITY];
        let mut log_len = 0;
        unsafe {
            gl::GetShaderInfoLog(
                shader,
                INFO_LOG_CAPACITY as GLsizei,
                &mut log_len,
                v.as_mut_ptr().cast(),
            );
        }
        info_log_to_string(&v, log_len)
    }

    fn delete_shader(&mut self, shader: u32) {
        unsafe { gl::DeleteShader(shader) };
    }

    fn create_program(&mut self) -> u32 {
        unsafe { gl::CreateProgram() }
    }

    fn attach_shader(&mut self, program: u32, shader: u32) {
        unsafe { gl::AttachShader(program, shader) };
    }

    fn link_program(&mut self, program: u32) {
        unsafe { gl::LinkProgram(program) };
    }

    fn program_link_status(&self, program: u32) -> bool {
        let mut success = 0;
        unsafe { gl::GetProgramiv(program, LINK_STATUS, &mut success) };
        success != 0
    }

    fn validate_program(&mut self, program: u32) {
        unsafe { gl::ValidateProgram(program) };
    }

    fn program_validate_status(&self, program: u32) -> bool {
        let mut success = 0;
        unsafe { gl::GetProgramiv(program, VALIDATE_STATUS, &mut success) };
        success != 0
    }

    fn program_info_log(&self, program: u32) -> String {
        let mut v = vec![0u8; INFO_LOG_CAPACITY];
        let mut log_len = 0;
        unsafe {
            gl::GetProgramInfoLog(
                program,
                INFO_LOG_CAPACITY as GLsizei,
                &mut log_len,
                v.as_mut_ptr().cast(),
            );
        }
        info_log_to_string(&v, log_len)
    }

    fn uniform_location(&mut self, program: u32, name: &CStr) -> i32 {
        unsafe { gl::GetUniformLocation(program, name.as_ptr().cast()) }
    }

    fn use_program(&mut self, program: u32) {
        unsafe { gl::UseProgram(program) };
    }

    fn uniform_matrix4(&mut self, location: i32, columns: &[f32; 16]) {
        unsafe { gl::UniformMatrix4fv(location, 1, FALSE, columns.as_ptr()) };
    }

    fn gen_vertex_array(&mut self) -> u32 {
        let mut vao = 0;
        unsafe { gl::GenVertexArrays(1, &mut vao) };
        vao
    }

    fn bind_vertex_array(&mut self, vao: u32) {
        unsafe { gl::BindVertexArray(vao) };
    }

    fn gen_buffer(&mut self) -> u32 {
        let mut vbo = 0;
        unsafe { gl::GenBuffers(1, &mut vbo) };
        vbo
    }

    fn bind_array_buffer(&mut self, buffer: u32) {
        unsafe { gl::BindBuffer(ARRAY_BUFFER, buffer) };
    }

    fn array_buffer_data_static(&mut self, data: &[f32]) {
        unsafe {
            gl::BufferData(
                ARRAY_BUFFER,
                std::mem::size_of_val(data) as GLsizeiptr,
                data.as_ptr().cast(),
                STATIC_DRAW,
            )
        };
    }

    fn vertex_attrib_pointer(&mut self, layout: &VertexLayout) {
        unsafe {
            gl::VertexAttribPointer(
                layout.index,
                layout.components,
                FLOAT,
                if layout.normalized { TRUE } else { FALSE },
                (layout.stride * std::mem::size_of::<f32>()) as GLsizei,
                (layout.offset * std::mem::size_of::<f32>()) as *const _,
            )
        };
    }

    fn enable_vertex_attrib_array(&mut self, index: u32) {
        unsafe { gl::EnableVertexAttribArray(index) };
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { gl::Viewport(x, y, width, height) };
    }

    fn clear_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        unsafe { gl::ClearColor(r, g, b, a) };
    }

    fn clear_color_buffer(&mut self) {
        unsafe { gl::Clear(COLOR_BUFFER_BIT) };
    }

    fn draw_arrays(&mut self, mode: Primitive, first: i32, count: i32) {
        let mode = match mode {
            Primitive::Triangles => TRIANGLES,
        };
        unsafe { gl::DrawArrays(mode, first, count) };
    }

    fn get_error(&mut self) -> u32 {
        unsafe { gl::GetError() }
    }
}

/// Converts a uniform name for `glGetUniformLocation`.
pub(crate) fn uniform_cstring(name: &str) -> Result<CString> {
    use snafu::ResultExt;
    CString::new(name).context(InvalidUniformNameSnafu { name })
}
