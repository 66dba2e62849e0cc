mod cli;
mod error;
mod files;
mod loader;
mod navigator;
mod resync;
mod ui;

#[cfg(test)]
mod testutil;

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use winit::event_loop::EventLoop;

use crate::cli::Cli;
use crate::error::BrowseError;
use crate::loader::ImageDecoder;
use crate::navigator::Navigator;
use crate::ui::state::ViewerState;
use crate::ui::{App, WindowConfig};

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let Some(image) = cli.image.clone() else {
        return ExitCode::SUCCESS;
    };

    match run(&cli, image) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("glance: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Everything up to the first frame must succeed; afterwards the session
/// ends on its own terms and still counts as success.
fn run(cli: &Cli, image: std::path::PathBuf) -> Result<(), BrowseError> {
    let decoder = ImageDecoder;
    let navigator = Navigator::open(&image, &decoder)?;

    let event_loop = EventLoop::new()?;
    let state = ViewerState::new(navigator, decoder, cli.resync_interval, cli.refit);
    let mut app = App::new(
        state,
        WindowConfig {
            width: cli.width,
            height: cli.height,
            tick: Duration::from_secs(1) / cli.tick_rate,
        },
    );

    event_loop.run_app(&mut app)?;
    if let Some(reason) = app.termination() {
        log::info!("Session ended: {reason:?}");
    }
    Ok(())
}
