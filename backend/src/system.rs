use super::config::WindowConfig;
use super::error::*;
use super::glutils::NativeGl;
use sdl2::event::{Event, WindowEvent};
use sdl2::video::GLProfile;

/// Owns the SDL window and the OpenGL context made current on the thread
/// that created it.
pub struct System {
    pub w: u32,
    pub h: u32,
    pub sdl_context: sdl2::Sdl,
    pub video_subsystem: sdl2::VideoSubsystem,
    pub window: sdl2::video::Window,
    pub gl_ctx: sdl2::video::GLContext,
    event_pump: sdl2::EventPump,
}

impl System {
    pub fn new(config: &WindowConfig) -> Result<System> {
        let sdl_context = sdl2::init().map_err(|message| Error::SdlInit { message })?;
        let video_subsystem = sdl_context
            .video()
            .map_err(|message| Error::SdlInit { message })?;

        let gl_attr = video_subsystem.gl_attr();
        gl_attr.set_context_profile(GLProfile::Core);
        gl_attr.set_context_version(config.gl_version.0, config.gl_version.1);
        if config.forward_compatible {
            gl_attr.set_context_flags().forward_compatible().set();
        }

        let window = video_subsystem
            .window(&config.title, config.width, config.height)
            .opengl()
            .build()
            .map_err(|e| Error::WindowCreation {
                title: config.title.clone(),
                message: e.to_string(),
            })?;

        let gl_ctx = window
            .gl_create_context()
            .map_err(|message| Error::ContextCreation { message })?;
        window
            .gl_make_current(&gl_ctx)
            .map_err(|message| Error::ContextCreation { message })?;

        gl::load_with(|name| video_subsystem.gl_get_proc_address(name) as *const _);
        ensure_loaded()?;

        debug_assert_eq!(gl_attr.context_profile(), GLProfile::Core);

        let event_pump = sdl_context
            .event_pump()
            .map_err(|message| Error::SdlInit { message })?;

        let (w, h) = window.drawable_size();
        let system = System {
            w,
            h,
            sdl_context,
            video_subsystem,
            window,
            gl_ctx,
            event_pump,
        };

        let info = system.gl().context_info();
        log::info!(
            "OpenGL {} (GLSL {}) on {} / {}",
            info.version,
            info.glsl_version,
            info.vendor,
            info.renderer
        );
        log::debug!("framebuffer {}x{}", system.w, system.h);

        Ok(system)
    }

    /// Handle for issuing GL calls against this system's context. It cannot
    /// outlive the system nor leave this thread.
    pub fn gl(&self) -> NativeGl<'_> {
        NativeGl::new(&self.gl_ctx)
    }

    /// Size of the drawable area in pixels, which can differ from the window
    /// size on high-DPI displays.
    pub fn framebuffer_size(&self) -> (u32, u32) {
        self.window.drawable_size()
    }

    /// Drains pending events. Returns `false` once the window was asked to
    /// close.
    pub fn process_io_events(&mut self) -> bool {
        drain_events(&mut self.event_pump)
    }

    pub fn present(&self) {
        self.window.gl_swap_window();
    }

    /// Polls events, calls `frame` and swaps buffers until the window is
    /// closed.
    pub fn run_frames(&mut self, mut frame: impl FnMut(&mut NativeGl<'_>)) {
        let mut gl = NativeGl::new(&self.gl_ctx);
        while drain_events(&mut self.event_pump) {
            frame(&mut gl);
            self.window.gl_swap_window();
        }
    }
}

fn drain_events(event_pump: &mut sdl2::EventPump) -> bool {
    let mut keep_running = true;
    for event in event_pump.poll_iter() {
        match event {
            Event::Quit { .. }
            | Event::Window {
                win_event: WindowEvent::Close,
                ..
            } => keep_running = false,
            _ => {}
        }
    }
    keep_running
}

/// Fails when the loader could not resolve entry points a 3.3 core context
/// must provide.
fn ensure_loaded() -> Result<()> {
    let required = [
        ("glViewport", gl::Viewport::is_loaded()),
        ("glCreateProgram", gl::CreateProgram::is_loaded()),
        ("glGenVertexArrays", gl::GenVertexArrays::is_loaded()),
        ("glUniformMatrix4fv", gl::UniformMatrix4fv::is_loaded()),
        ("glDrawArrays", gl::DrawArrays::is_loaded()),
    ];
    match required.iter().find(|(_, loaded)| !loaded) {
        Some((symbol, _)) => GlLoadSnafu { symbol: *symbol }.fail(),
        None => Ok(()),
    }
}
