use backend::config::WindowConfig;
use backend::logging::{init_logging, LoggingConfig};
use backend::render;
use backend::system::System;
use std::process::ExitCode;

fn main() -> ExitCode {
    init_logging(LoggingConfig::default());

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.is_initialization() {
                log::error!("initialization failure: {e}");
            } else {
                log::error!("setup failed, not entering the render loop: {e}");
            }
            ExitCode::from(1)
        }
    }
}

fn run() -> backend::Result<()> {
    let mut system = System::new(&WindowConfig::default())?;

    let state = render::setup(&mut system.gl(), system.framebuffer_size())?;

    system.run_frames(|gl| state.draw_frame(gl));

    log::info!("window closed");
    Ok(())
}
