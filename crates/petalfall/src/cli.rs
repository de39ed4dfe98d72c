use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "petalfall",
    author,
    version,
    about = "Interactive shader garden: click to grow flowers",
    arg_required_else_help = false
)]
pub struct Args {
    /// Window size (e.g. `1280x800`). Ignored with `--fullscreen`.
    #[arg(long, value_name = "WIDTHxHEIGHT", default_value = "1280x800")]
    pub size: String,

    /// Run in a borderless fullscreen window on the current monitor.
    #[arg(long)]
    pub fullscreen: bool,

    /// Fixed seed for the per-click randomizer; useful for reproducing a
    /// garden. Defaults to entropy.
    #[arg(long, value_name = "SEED", env = "PETALFALL_SEED")]
    pub seed: Option<u64>,
}

pub fn parse() -> Args {
    Args::parse()
}
