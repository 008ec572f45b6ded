// # jukred - Juk.RE DDNS keepalive daemon
//
// The daemon is a thin integration layer:
// 1. Reads configuration from environment variables
// 2. Initializes tracing and the tokio runtime
// 3. Builds the agent (config store, event journal, HTTP probe)
// 4. Runs the scheduler loop until SIGTERM/SIGINT
//
// All check/update logic lives in jukre-core. Operational settings (the
// DDNS token, poll interval) live in the persisted config file and are
// hot-reloaded by the loop; only host-level settings are environment
// variables here.
//
// ## Configuration
//
// - `JUKRE_BASE_DIR`: directory holding config.json and log.txt
//   (default: /var/lib/jukre)
// - `JUKRE_LOG_LEVEL`: trace | debug | info | warn | error (default: info)
//
// ## Example
//
// ```bash
// export JUKRE_BASE_DIR=/var/lib/jukre
// jukred
// ```

use anyhow::Result;
use std::env;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use jukre_core::{Agent, HttpApiProbe, Paths};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DaemonExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DaemonExitCode> for ExitCode {
    fn from(code: DaemonExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn log_level_from_env() -> Result<Level> {
    let raw = env::var("JUKRE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    match raw.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => anyhow::bail!(
            "JUKRE_LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            other
        ),
    }
}

fn main() -> ExitCode {
    let log_level = match log_level_from_env() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DaemonExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DaemonExitCode::ConfigError.into();
    }

    let paths = Paths::from_env();
    info!("Starting jukred daemon");
    info!("Base directory: {}", paths.base_dir.display());

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DaemonExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(paths).await {
            error!("Daemon error: {}", e);
            DaemonExitCode::RuntimeError
        } else {
            DaemonExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Run the agent until a shutdown signal arrives
async fn run_daemon(paths: Paths) -> Result<()> {
    let probe = HttpApiProbe::new()?;
    let agent = Agent::new(&paths, Box::new(probe));

    info!("Agent running, waiting for shutdown signal");
    agent.run().await?;

    info!("Shutting down daemon");
    Ok(())
}
