// # jukrectl - Control CLI for the Juk.RE DDNS keepalive service
//
// One required selector:
//
//   jukrectl -c status    # derive and print the composed status view
//   jukrectl -c start     # start the background service (needs privilege)
//   jukrectl -c stop      # stop it
//   jukrectl -c restart   # restart it (falls back to stop-then-start)
//
// `status` only reads: it queries the service manager, probes the API
// live and scans the event journal, but never mutates process lifecycle.
// The lifecycle commands shell out to systemd and print remediation
// guidance on failure (unit not installed, insufficient privilege),
// exiting non-zero.

mod render;
mod systemd;

use clap::{Parser, ValueEnum};
use std::process::ExitCode;
use tracing::Level;

use jukre_core::error::Error;
use jukre_core::traits::ServiceControl;
use jukre_core::{HttpApiProbe, Paths, status};
use systemd::{SERVICE_UNIT, SystemdControl};

#[derive(Parser)]
#[command(name = "jukrectl")]
#[command(about = "Control CLI for the Juk.RE DDNS keepalive service", long_about = None)]
#[command(version)]
struct Cli {
    /// Command: start | stop | restart | status
    #[arg(short = 'c', long = "command", value_enum)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Command {
    Start,
    Stop,
    Restart,
    Status,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Diagnostics stay out of the operator-facing output unless they matter.
    tracing_subscriber::fmt()
        .with_max_level(Level::WARN)
        .init();

    let cli = Cli::parse();
    let control = SystemdControl::new(SERVICE_UNIT);

    match cli.command {
        Command::Status => {
            print_status(&control).await;
            ExitCode::SUCCESS
        }
        Command::Start => run_control(control.start().await, "Starting service..."),
        Command::Stop => run_control(control.stop().await, "Stopping service..."),
        Command::Restart => run_control(control.restart().await, "Restarting service..."),
    }
}

/// Report a lifecycle command result, with remediation guidance on failure
fn run_control(result: jukre_core::Result<()>, success_message: &str) -> ExitCode {
    match result {
        Ok(()) => {
            println!("{}", success_message);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Error::Control { remediation, .. } = &e {
                eprintln!("{}", remediation);
            }
            ExitCode::FAILURE
        }
    }
}

/// Derive and render the composed status view
///
/// Status output degrades section by section instead of failing whole: a
/// probe that cannot even be constructed is reported in place of the
/// sections that needed it.
async fn print_status(control: &dyn ServiceControl) {
    let paths = Paths::from_env();

    let probe = match HttpApiProbe::new() {
        Ok(probe) => probe,
        Err(e) => {
            eprintln!("Error: {}", e);
            return;
        }
    };

    let report = status::collect(&paths, &probe, control).await;
    print!("{}", render::render(&report));
}
