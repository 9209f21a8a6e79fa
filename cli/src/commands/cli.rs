use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sessionctl", about = "Trading session lifecycle controller")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file to load instead of the default search path.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Overrides `events_out.path`; `stdout:` streams events to stdout.
    #[arg(long, global = true)]
    pub events_out: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Host one session, reading Run/Stop commands as JSON lines from stdin.
    Serve(ServeArgs),
    /// Validate and dispatch a run payload without starting anything.
    Validate(ValidateArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ServeArgs {
    /// JSON file holding the session node this process runs.
    #[arg(long)]
    pub session: PathBuf,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ValidateArgs {
    /// JSON file holding a `Run Session` payload.
    #[arg(long)]
    pub payload: PathBuf,

    /// Reference time for default windows (RFC 3339). Defaults to now.
    #[arg(long)]
    pub now: Option<String>,
}
