use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use yurei_bus::Signal;
use yurei_cli::{HostApp, HostError};

/// Yurei ghost host.
#[derive(Parser)]
#[command(name = "yurei", version, about = "Yurei ghost host runtime")]
struct Cli {
    /// Baseware root directory holding ghosts/ and balloons/
    #[arg(long, default_value = "baseware_root")]
    root: PathBuf,

    /// Ghost to launch after boot
    #[arg(long, default_value = "default_ghost")]
    ghost: String,
}

fn main() {
    let cli = Cli::parse();
    tracing_subscriber::fmt().init();
    if let Err(err) = run(cli) {
        tracing::error!(error = %err, "host failed");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), HostError> {
    let app = HostApp::new(cli.root);
    app.boot()?;
    if !app.ghosts().launch_ghost(&cli.ghost)? {
        tracing::warn!(ghost = %cli.ghost, "default ghost not installed; running without one");
    }
    tracing::info!("yurei running; enter a signal kind, 'click', or 'quit'");

    for line in io::stdin().lock().lines() {
        let line = line?;
        let input = line.trim();
        match input {
            "" => continue,
            "quit" => break,
            "click" => app.ghosts().simulate_click(&cli.ghost, 10, 10),
            kind => app.bus().publish(&Signal::new(kind)),
        }
    }

    app.shutdown();
    tracing::info!("yurei shutdown complete");
    Ok(())
}
