use super::error::*;
use super::glutils::*;
use super::math::*;
use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Location of an active uniform. Never holds the `-1` "not found" value;
/// 0 is a real location.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct UniformLocation(i32);

impl UniformLocation {
    pub fn raw(&self) -> i32 {
        self.0
    }
}

/// A linked and validated program plus the uniform locations resolved for it.
#[derive(Debug)]
pub struct ShaderProgram {
    program_id: u32,
    uniforms: Vec<(String, UniformLocation)>,
}

impl ShaderProgram {
    /// Compiles both stages, links, validates and resolves `uniforms`.
    ///
    /// A stage that fails to compile is reported and left out of the
    /// program while the other stage is still compiled, but the build as a
    /// whole fails before linking. Every failure is logged and returned; no
    /// uniform is resolved unless all stages succeed.
    pub fn from_sources(
        gl: &mut impl GlApi,
        vertex_code: &str,
        fragment_code: &str,
        uniforms: &[&str],
    ) -> Result<ShaderProgram> {
        let program_id = gl.create_program();
        if program_id == 0 {
            log::error!("Error creating shader program!");
            return ProgramCreationFailedSnafu.fail();
        }

        let vertex = Self::add_shader(gl, program_id, vertex_code, ShaderStage::Vertex);
        let fragment = Self::add_shader(gl, program_id, fragment_code, ShaderStage::Fragment);
        let (vertex_shader, fragment_shader) = (vertex?, fragment?);

        gl.link_program(program_id);
        if !gl.program_link_status(program_id) {
            let log = gl.program_info_log(program_id);
            log::error!("Error linking program: '{}'", log);
            return ProgramLinkFailedSnafu { log }.fail();
        }

        // not needed anymore
        gl.delete_shader(vertex_shader);
        gl.delete_shader(fragment_shader);

        gl.validate_program(program_id);
        if !gl.program_validate_status(program_id) {
            let log = gl.program_info_log(program_id);
            log::error!("Error validating program: '{}'", log);
            return ProgramValidateFailedSnafu { log }.fail();
        }

        let mut program = ShaderProgram {
            program_id,
            uniforms: Vec::with_capacity(uniforms.len()),
        };
        for name in uniforms {
            let location = program.resolve_uniform(gl, name)?;
            program.uniforms.push((name.to_string(), location));
        }

        log::info!(
            "shader program {} ready ({} uniform(s))",
            program_id,
            program.uniforms.len()
        );
        Ok(program)
    }

    /// Creates and compiles one stage, attaching it to `program_id` only if
    /// compilation succeeded.
    fn add_shader(
        gl: &mut impl GlApi,
        program_id: u32,
        code: &str,
        stage: ShaderStage,
    ) -> Result<u32> {
        let shader = gl.create_shader(stage);
        if shader == 0 {
            log::error!("gl::CreateShader({}) failed", stage);
            return ShaderCreationFailedSnafu { stage }.fail();
        }

        gl.shader_source(shader, code);
        gl.compile_shader(shader);

        if !gl.shader_compile_status(shader) {
            let log = gl.shader_info_log(shader);
            log::error!("Error compiling the {} shader: '{}'", stage, log);
            gl.delete_shader(shader);
            return ShaderCompileFailedSnafu { stage, log }.fail();
        }

        gl.attach_shader(program_id, shader);
        log::debug!("{} shader {} attached to program {}", stage, shader, program_id);
        Ok(shader)
    }

    fn resolve_uniform(&self, gl: &mut impl GlApi, name: &str) -> Result<UniformLocation> {
        let c_name = uniform_cstring(name)?;
        let location = gl.uniform_location(self.program_id, &c_name);
        if location == -1 {
            log::error!(
                "program({}): '{}' is not an active uniform",
                self.program_id,
                name
            );
            return UniformNotFoundSnafu { name }.fail();
        }
        Ok(UniformLocation(location))
    }

    pub fn id(&self) -> u32 {
        self.program_id
    }

    /// Location cached for `name` when the program was built.
    pub fn uniform(&self, name: &str) -> Result<UniformLocation> {
        self.uniforms
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, location)| *location)
            .ok_or_else(|| Error::UniformNotFound {
                name: name.to_string(),
            })
    }

    pub fn use_program(&self, gl: &mut impl GlApi) {
        gl.use_program(self.program_id);
    }

    pub fn set_mat4(&self, gl: &mut impl GlApi, location: UniformLocation, mat: &Mat4x4) {
        gl.uniform_matrix4(location.raw(), &mat.to_cols_array());
    }
}
