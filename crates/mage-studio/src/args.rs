use clap::Parser;

/// Draws a demo triangle (non-indexed) and quad (indexed) on the headless GL
/// backend and prints the recorded GL calls.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "mage-studio", version)]
pub struct StudioArgs {
    /// Number of frames to draw.
    #[arg(long, short = 'n', default_value = "1")]
    pub frames: u32,

    /// Print only the draw summary.
    #[arg(long, short)]
    pub quiet: bool,
}
