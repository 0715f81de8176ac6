use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[clap(
    version = "0.1.0",
    author = "Overdrive Racing Team",
    name = "overdrive",
    about = "A fixed-step arcade race simulator written in Rust"
)]
pub struct SimOpts {
    // FLAGS ---------------------------------------------------------------------------------------
    /// Activate debug logging
    #[clap(short, long)]
    pub debug: bool,

    /// Pace the simulation to real time and stream race snapshots to the console
    #[clap(short = 'l', long)]
    pub live: bool,

    // OPTIONS -------------------------------------------------------------------------------------
    /// Set number of simulation runs, runs are executed in parallel (ignored in live mode)
    #[clap(short, long, default_value = "1")]
    pub no_sim_runs: u32,

    /// Set path to the simulation parameter file (OPTIONAL: if not set, a two-player race on the
    /// selected track is simulated)
    #[clap(short, long)]
    pub parfile_path: Option<PathBuf>,

    /// Set path to a simulation constants file (overrides the constants of the parameter file)
    #[clap(short = 'c', long)]
    pub consts_path: Option<PathBuf>,

    /// Set track id (overrides the track of the parameter file)
    #[clap(short, long)]
    pub track: Option<String>,

    /// Set real-time factor (only relevant in live mode)
    #[clap(short, long, default_value = "1.0")]
    pub realtime_factor: f64,

    /// Set seed of the spawn jitter, runs use consecutive seeds
    #[clap(short, long, default_value = "0")]
    pub seed: u64,

    /// Set path of the leaderboard CSV export
    #[clap(long)]
    pub leaderboard_csv: Option<PathBuf>,

    /// Set path of the race times text export (default output/last_run.txt)
    #[clap(long)]
    pub result_path: Option<PathBuf>,
}
