//! Command-line argument parsing.

use clap::Parser;

use crate::renderer::VisualizationMode;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "beatglow")]
#[command(about = "Real-time audio-reactive visualizer", long_about = None)]
pub struct Args {
    /// Run in a window instead of fullscreen
    #[arg(short, long)]
    pub windowed: bool,

    /// Print the available capture devices and exit
    #[arg(long)]
    pub list_devices: bool,

    /// Capture device id to connect at start-up (see --list-devices)
    #[arg(long, value_name = "ID")]
    pub device: Option<String>,

    /// Visualization to start with (overrides the config file)
    #[arg(long, value_enum, value_name = "MODE")]
    pub mode: Option<VisualizationMode>,

    /// Start with post-processing disabled
    #[arg(long)]
    pub no_fx: bool,

    /// Frame pacing target (overrides the config file)
    #[arg(long, value_name = "N")]
    pub fps: Option<f64>,
}

impl Args {
    /// Resolve the start-up mode from the flag, then the config value.
    pub fn start_mode(&self, config_mode: &str) -> VisualizationMode {
        if let Some(mode) = self.mode {
            return mode;
        }
        config_mode.parse().unwrap_or_else(|_| {
            tracing::warn!("Unknown default_mode '{}', using trapnation", config_mode);
            VisualizationMode::TrapNation
        })
    }
}
