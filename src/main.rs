//! gh-recurse: download every git repository under a GitHub organisation, concurrently
//!
//! ```text
//! GITHUB_OAUTH_TOKEN=your-fancy-token gh-recurse github
//! ```

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use gh_recurse::commands::handle_clone_command;
use gh_recurse::core::{CliOverrides, Settings};

#[derive(Parser)]
#[command(name = "gh-recurse")]
#[command(about = "Download every git repo under a github organisation - concurrently")]
#[command(version)]
struct Cli {
    /// Organisation whose repositories are cloned
    organization: String,

    /// Number of repositories cloned in parallel [default: 4]
    #[arg(long, value_parser = clap::value_parser!(usize))]
    concurrency: Option<usize>,

    /// Settings file (default is $HOME/.gh-recurse.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Accept any remote host certificate without verifying it
    #[arg(long)]
    insecure: bool,

    /// Directory the repositories are cloned into (default is the current directory)
    #[arg(long, value_name = "DIR")]
    dest: Option<PathBuf>,

    /// Show debug output
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    // clap exits with status 2 and a help hint on usage errors
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let overrides = CliOverrides {
        concurrency: cli.concurrency,
        insecure: cli.insecure,
        dest: cli.dest,
    };

    let result = match Settings::load(cli.config.as_deref(), &overrides) {
        Ok(settings) => handle_clone_command(&cli.organization, &settings).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        tracing::error!("{e:#}");
        // Exit without waiting for clones abandoned on the blocking pool
        std::process::exit(1);
    }
}
