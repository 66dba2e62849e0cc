use std::path::PathBuf;

use clap::Parser;

use crate::ui::state::RefitPolicy;

pub const PROGRAM: &str = concat!("glance ", env!("CARGO_PKG_VERSION"));

pub const HELP_KEYS: &str = "\
Key Bindings:
  Esc / q            : Quit
  Left / h / Bksp    : Previous image
  Right / l / Space  : Next image
  f                  : Toggle fullscreen
  a                  : Toggle auto-size (fit on navigation)
  r                  : Reload current image from disk
  1 / 2 / 4          : Zoom 1x / 2x / 4x
  3                  : Fit to window
  Left drag          : Pan
  Wheel              : Zoom in / out
";

#[derive(Parser, Debug)]
#[command(name = "glance", version, about = "Browse the images of a directory", after_help = HELP_KEYS)]
pub struct Cli {
    /// Image to start from; its directory is browsed. Nothing happens without one.
    pub image: Option<PathBuf>,

    /// Initial window width in logical pixels
    #[arg(long, default_value = "1920")]
    pub width: u32,

    /// Initial window height in logical pixels
    #[arg(long, default_value = "1080")]
    pub height: u32,

    /// Update ticks per second
    #[arg(long, default_value = "60", value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub tick_rate: u32,

    /// Update ticks between directory rescans
    #[arg(long, default_value = "120", value_parser = clap::value_parser!(u32).range(1..))]
    pub resync_interval: u32,

    /// When auto-size refits the image after navigation
    #[arg(long, value_enum, default_value_t = RefitPolicy::FirstLoad)]
    pub refit: RefitPolicy,
}
