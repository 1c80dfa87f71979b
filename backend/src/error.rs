use crate::shaders::ShaderStage;
use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("SDL initialization failed: {}", message))]
    SdlInit { message: String },

    #[snafu(display("Error while building OpenGL window '{}': {}", title, message))]
    WindowCreation { title: String, message: String },

    #[snafu(display("OpenGL context creation failed: {}", message))]
    ContextCreation { message: String },

    #[snafu(display("OpenGL loader could not resolve '{}'", symbol))]
    GlLoad { symbol: &'static str },

    #[snafu(display("Error creating shader program"))]
    ProgramCreationFailed,

    #[snafu(display("gl::CreateShader({}) failed", stage))]
    ShaderCreationFailed { stage: ShaderStage },

    #[snafu(display("Error compiling the {} shader: '{}'", stage, log))]
    ShaderCompileFailed { stage: ShaderStage, log: String },

    #[snafu(display("Error linking program: '{}'", log))]
    ProgramLinkFailed { log: String },

    #[snafu(display("Error validating program: '{}'", log))]
    ProgramValidateFailed { log: String },

    #[snafu(display(
        "'{}' does not correspond to an active uniform variable in program",
        name
    ))]
    UniformNotFound { name: String },

    #[snafu(display("uniform name '{}' contains an interior nul byte", name))]
    InvalidUniformName {
        name: String,
        source: std::ffi::NulError,
    },

    #[snafu(display("GPU allocation failed for {}", what))]
    AllocationFailed { what: &'static str },

    #[snafu(display(
        "{} floats cannot be split into vertices of {} components",
        len,
        components
    ))]
    MalformedVertexData { len: usize, components: i32 },

    #[snafu(display("OpenGL error: 0x{:04x}", code))]
    Gl { code: u32 },

    #[snafu(display("render state has no geometry"))]
    MissingGeometry,

    #[snafu(display("render state has no shader program"))]
    MissingProgram,
}

impl Error {
    /// Failures that happen while the window or context is being brought up.
    pub fn is_initialization(&self) -> bool {
        matches!(
            self,
            Error::SdlInit { .. }
                | Error::WindowCreation { .. }
                | Error::ContextCreation { .. }
                | Error::GlLoad { .. }
        )
    }
}
