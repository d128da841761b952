use std::path::Path;
use std::process::ExitCode;

use clap::Parser;

use pentora_core::config::PentoraConfig;
use pentora_daemon::cli::DaemonCli;
use pentora_daemon::daemon::Daemon;
use pentora_daemon::logging;
use pentora_daemon::pidfile;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = DaemonCli::parse();

    let mut config = match PentoraConfig::load(&cli.config).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load {}: {}", cli.config.display(), e);
            return ExitCode::FAILURE;
        }
    };

    // CLI flags win over both config file and environment variables.
    if let Some(level) = cli.log_level {
        config.general.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.general.log_format = format;
    }
    if let Some(pid_file) = cli.pid_file {
        config.general.pid_file = pid_file;
    }

    if let Err(e) = config.validate() {
        eprintln!("invalid configuration: {e}");
        return ExitCode::FAILURE;
    }

    if cli.validate {
        println!("configuration OK: {}", cli.config.display());
        return ExitCode::SUCCESS;
    }

    if let Err(e) = logging::init_tracing(&config.general) {
        eprintln!("failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        "pentora-daemon starting"
    );

    let pid_path = config.general.pid_file.clone();
    if let Err(e) = pidfile::write_pid_file(Path::new(&pid_path)) {
        tracing::error!(error = %e, "failed to write PID file");
        return ExitCode::FAILURE;
    }

    let exit = match Daemon::build_from_config(config) {
        Ok(daemon) => match daemon.run().await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!(error = %e, "daemon exited with error");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            tracing::error!(error = %e, "failed to build daemon");
            ExitCode::FAILURE
        }
    };

    pidfile::remove_pid_file(Path::new(&pid_path));
    exit
}
