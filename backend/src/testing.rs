//! A `GlApi` that runs without a GPU.
//!
//! It records every call and imitates a driver closely enough for the
//! renderer's control flow: shaders compile when they carry a `#version`
//! line and a `main`, programs link when every fragment input has a matching
//! vertex output, and uniforms declared as `uniform <type> <name>;` get
//! locations in declaration order starting at 0.

use crate::geometry::VertexLayout;
use crate::glutils::{GlApi, Primitive, INFO_LOG_CAPACITY};
use crate::shaders::ShaderStage;
use std::collections::HashMap;
use std::ffi::CStr;

#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    CreateShader(ShaderStage, u32),
    ShaderSource(u32),
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram(u32),
    AttachShader { program: u32, shader: u32 },
    LinkProgram(u32),
    ValidateProgram(u32),
    UniformLocation { program: u32, name: String },
    UseProgram(u32),
    UniformMatrix4 { location: i32, columns: [f32; 16] },
    GenVertexArray(u32),
    BindVertexArray(u32),
    GenBuffer(u32),
    BindArrayBuffer(u32),
    BufferData { buffer: u32, data: Vec<f32> },
    VertexAttribPointer(VertexLayout),
    EnableVertexAttribArray(u32),
    Viewport(i32, i32, i32, i32),
    ClearColor([f32; 4]),
    ClearColorBuffer,
    DrawArrays { mode: Primitive, first: i32, count: i32 },
}

/// What the pipeline looked like when a draw call was issued.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    pub program: u32,
    pub vertex_array: u32,
    pub vertices: Vec<f32>,
    pub count: i32,
}

#[derive(Debug)]
struct MockShader {
    stage: ShaderStage,
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Debug, Default)]
struct MockProgram {
    attached: Vec<u32>,
    linked: bool,
    validated: bool,
    log: String,
    uniforms: Vec<String>,
}

#[derive(Debug, Default)]
pub struct RecordingGl {
    pub calls: Vec<GlCall>,
    /// `create_program` returns 0.
    pub refuse_program: bool,
    /// `gen_vertex_array` and `gen_buffer` return 0.
    pub refuse_objects: bool,
    pub fail_validate: bool,
    /// `array_buffer_data_static` raises `GL_OUT_OF_MEMORY` and stores nothing.
    pub out_of_memory: bool,
    next_id: u32,
    shaders: HashMap<u32, MockShader>,
    programs: HashMap<u32, MockProgram>,
    buffers: HashMap<u32, Vec<f32>>,
    vertex_arrays: HashMap<u32, Option<u32>>,
    bound_vertex_array: u32,
    bound_array_buffer: u32,
    current_program: u32,
    pending_error: u32,
    draws: Vec<DrawRecord>,
}

impl RecordingGl {
    pub fn new() -> RecordingGl {
        RecordingGl::default()
    }

    pub fn raise_error(&mut self, code: u32) {
        if self.pending_error == gl::NO_ERROR {
            self.pending_error = code;
        }
    }

    pub fn bound_vertex_array(&self) -> u32 {
        self.bound_vertex_array
    }

    pub fn bound_array_buffer(&self) -> u32 {
        self.bound_array_buffer
    }

    pub fn current_program(&self) -> u32 {
        self.current_program
    }

    pub fn buffer_contents(&self, buffer: u32) -> Option<&[f32]> {
        self.buffers.get(&buffer).map(|v| v.as_slice())
    }

    /// The array buffer recorded by the attribute pointer of `vao`.
    pub fn vertex_array_buffer(&self, vao: u32) -> Option<u32> {
        self.vertex_arrays.get(&vao).copied().flatten()
    }

    pub fn shader_for_stage(&self, stage: ShaderStage) -> Option<u32> {
        self.shaders
            .iter()
            .find(|(_, s)| s.stage == stage)
            .map(|(id, _)| *id)
    }

    pub fn created_programs(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.programs.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn linked_programs(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self
            .programs
            .iter()
            .filter(|(_, p)| p.linked)
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn draws(&self) -> &[DrawRecord] {
        &self.draws
    }

    fn next_name(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn link(&self, program: &MockProgram) -> Result<Vec<String>, String> {
        let stage_source = |stage: ShaderStage| {
            program
                .attached
                .iter()
                .filter_map(|id| self.shaders.get(id))
                .find(|s| s.stage == stage && s.compiled)
                .map(|s| s.source.as_str())
        };
        let vertex = stage_source(ShaderStage::Vertex)
            .ok_or_else(|| "error: no compiled vertex shader attached".to_string())?;
        let fragment = stage_source(ShaderStage::Fragment)
            .ok_or_else(|| "error: no compiled fragment shader attached".to_string())?;

        let outputs = declarations(vertex, "out");
        for input in declarations(fragment, "in") {
            if !outputs.contains(&input) {
                return Err(format!(
                    "error: fragment shader input `{}` has no matching vertex shader output",
                    input.1
                ));
            }
        }

        let mut uniforms = Vec::new();
        for (_, name) in declarations(vertex, "uniform")
            .into_iter()
            .chain(declarations(fragment, "uniform"))
        {
            if !uniforms.contains(&name) {
                uniforms.push(name);
            }
        }
        Ok(uniforms)
    }
}

/// `(type, name)` pairs of `<qualifier> <type> <name>;` declarations, with
/// any `layout(...)` prefix ignored.
fn declarations(source: &str, qualifier: &str) -> Vec<(String, String)> {
    source
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let line = match line.strip_prefix("layout(") {
                Some(rest) => rest.split_once(')')?.1.trim(),
                None => line,
            };
            let body = line.strip_suffix(';')?;
            let mut words = body.split_whitespace();
            if words.next()? != qualifier {
                return None;
            }
            let ty = words.next()?;
            let name = words.next()?;
            if words.next().is_some() {
                return None;
            }
            Some((ty.to_string(), name.to_string()))
        })
        .collect()
}

fn truncated(mut log: String) -> String {
    if log.len() >= INFO_LOG_CAPACITY {
        let mut end = INFO_LOG_CAPACITY - 1;
        while !log.is_char_boundary(end) {
            end -= 1;
        }
        log.truncate(end);
    }
    log
}

impl GlApi for RecordingGl {
    fn create_shader(&mut self, stage: ShaderStage) -> u32 {
        let id = self.next_name();
        self.shaders.insert(
            id,
            MockShader {
                stage,
                source: String::new(),
                compiled: false,
                log: String::new(),
            },
        );
        self.calls.push(GlCall::CreateShader(stage, id));
        id
    }

    fn shader_source(&mut self, shader: u32, source: &str) {
        if let Some(s) = self.shaders.get_mut(&shader) {
            s.source = source.to_string();
        }
        self.calls.push(GlCall::ShaderSource(shader));
    }

    fn compile_shader(&mut self, shader: u32) {
        if let Some(s) = self.shaders.get_mut(&shader) {
            if !s.source.trim_start().starts_with("#version") {
                s.compiled = false;
                s.log = "0:1(1): error: missing #version directive".to_string();
            } else if !s.source.contains("void main()") {
                s.compiled = false;
                s.log = "0:3(1): error: syntax error, no main() defined".to_string();
            } else {
                s.compiled = true;
                s.log.clear();
            }
        }
        self.calls.push(GlCall::CompileShader(shader));
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.shaders.get(&shader).map_or(false, |s| s.compiled)
    }

    fn shader_info_log(&self, shader: u32) -> String {
        truncated(
            self.shaders
                .get(&shader)
                .map(|s| s.log.clone())
                .unwrap_or_default(),
        )
    }

    fn delete_shader(&mut self, shader: u32) {
        self.calls.push(GlCall::DeleteShader(shader));
    }

    fn create_program(&mut self) -> u32 {
        if self.refuse_program {
            self.calls.push(GlCall::CreateProgram(0));
            return 0;
        }
        let id = self.next_name();
        self.programs.insert(id, MockProgram::default());
        self.calls.push(GlCall::CreateProgram(id));
        id
    }

    fn attach_shader(&mut self, program: u32, shader: u32) {
        if let Some(p) = self.programs.get_mut(&program) {
            p.attached.push(shader);
        }
        self.calls.push(GlCall::AttachShader { program, shader });
    }

    fn link_program(&mut self, program: u32) {
        self.calls.push(GlCall::LinkProgram(program));
        let outcome = match self.programs.get(&program) {
            Some(p) => self.link(p),
            None => return,
        };
        if let Some(p) = self.programs.get_mut(&program) {
            match outcome {
                Ok(uniforms) => {
                    p.linked = true;
                    p.uniforms = uniforms;
                    p.log.clear();
                }
                Err(log) => {
                    p.linked = false;
                    p.uniforms.clear();
                    p.log = log;
                }
            }
        }
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.programs.get(&program).map_or(false, |p| p.linked)
    }

    fn validate_program(&mut self, program: u32) {
        self.calls.push(GlCall::ValidateProgram(program));
        let fail = self.fail_validate;
        if let Some(p) = self.programs.get_mut(&program) {
            p.validated = p.linked && !fail;
            if !p.validated {
                p.log = "error: program is not valid in the current state".to_string();
            }
        }
    }

    fn program_validate_status(&self, program: u32) -> bool {
        self.programs.get(&program).map_or(false, |p| p.validated)
    }

    fn program_info_log(&self, program: u32) -> String {
        truncated(
            self.programs
                .get(&program)
                .map(|p| p.log.clone())
                .unwrap_or_default(),
        )
    }

    fn uniform_location(&mut self, program: u32, name: &CStr) -> i32 {
        let name = name.to_string_lossy().into_owned();
        self.calls.push(GlCall::UniformLocation {
            program,
            name: name.clone(),
        });
        self.programs
            .get(&program)
            .filter(|p| p.linked)
            .and_then(|p| p.uniforms.iter().position(|u| *u == name))
            .map_or(-1, |i| i as i32)
    }

    fn use_program(&mut self, program: u32) {
        self.current_program = program;
        self.calls.push(GlCall::UseProgram(program));
    }

    fn uniform_matrix4(&mut self, location: i32, columns: &[f32; 16]) {
        self.calls.push(GlCall::UniformMatrix4 {
            location,
            columns: *columns,
        });
    }

    fn gen_vertex_array(&mut self) -> u32 {
        if self.refuse_objects {
            return 0;
        }
        let id = self.next_name();
        self.vertex_arrays.insert(id, None);
        self.calls.push(GlCall::GenVertexArray(id));
        id
    }

    fn bind_vertex_array(&mut self, vao: u32) {
        self.bound_vertex_array = vao;
        self.calls.push(GlCall::BindVertexArray(vao));
    }

    fn gen_buffer(&mut self) -> u32 {
        if self.refuse_objects {
            return 0;
        }
        let id = self.next_name();
        self.calls.push(GlCall::GenBuffer(id));
        id
    }

    fn bind_array_buffer(&mut self, buffer: u32) {
        self.bound_array_buffer = buffer;
        self.calls.push(GlCall::BindArrayBuffer(buffer));
    }

    fn array_buffer_data_static(&mut self, data: &[f32]) {
        let buffer = self.bound_array_buffer;
        self.calls.push(GlCall::BufferData {
            buffer,
            data: data.to_vec(),
        });
        if self.out_of_memory {
            self.raise_error(gl::OUT_OF_MEMORY);
            return;
        }
        if buffer == 0 {
            self.raise_error(gl::INVALID_OPERATION);
            return;
        }
        self.buffers.insert(buffer, data.to_vec());
    }

    fn vertex_attrib_pointer(&mut self, layout: &VertexLayout) {
        if let Some(slot) = self.vertex_arrays.get_mut(&self.bound_vertex_array) {
            *slot = Some(self.bound_array_buffer);
        }
        self.calls.push(GlCall::VertexAttribPointer(*layout));
    }

    fn enable_vertex_attrib_array(&mut self, index: u32) {
        self.calls.push(GlCall::EnableVertexAttribArray(index));
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.calls.push(GlCall::Viewport(x, y, width, height));
    }

    fn clear_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.calls.push(GlCall::ClearColor([r, g, b, a]));
    }

    fn clear_color_buffer(&mut self) {
        self.calls.push(GlCall::ClearColorBuffer);
    }

    fn draw_arrays(&mut self, mode: Primitive, first: i32, count: i32) {
        let vertices = self
            .vertex_array_buffer(self.bound_vertex_array)
            .and_then(|b| self.buffers.get(&b))
            .cloned()
            .unwrap_or_default();
        self.draws.push(DrawRecord {
            program: self.current_program,
            vertex_array: self.bound_vertex_array,
            vertices,
            count,
        });
        self.calls.push(GlCall::DrawArrays { mode, first, count });
    }

    fn get_error(&mut self) -> u32 {
        std::mem::replace(&mut self.pending_error, gl::NO_ERROR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declarations_skip_layout_prefix() {
        let decls = declarations(crate::assets::VERTEX_SHADER, "in");
        assert_eq!(decls, vec![("vec3".to_string(), "pos".to_string())]);
    }

    #[test]
    fn long_logs_are_truncated_to_capacity() {
        let log = truncated("e".repeat(4 * INFO_LOG_CAPACITY));
        assert_eq!(log.len(), INFO_LOG_CAPACITY - 1);
    }
}
