//! autosnap CLI - Main entry point.

use autosnap::cli::{Cli, Commands};
use autosnap::config::AutosnapConfig;
use autosnap::discovery::Discovery;
use autosnap::zfs::{CommandRunner, ZfsPropertyDiscovery};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();

    let mut config = match &cli.config {
        Some(path) => AutosnapConfig::from_file(path)?,
        None => AutosnapConfig::default(),
    };
    config.observability.log_level = cli.log_level;

    match cli.command {
        // Per-volume failures are logged and skipped inside the pass; the
        // exit status only reflects failure to start up at all.
        None | Some(Commands::Run) => {
            autosnap::observability::init(&config.observability)?;
            autosnap::run(config).await?;
        }

        Some(Commands::List) => {
            let runner =
                CommandRunner::new(config.zfs.binary.clone(), config.zfs.command_timeout);
            let discovery = ZfsPropertyDiscovery::new(runner, config.snapshot.clone());

            match discovery.list_enabled_schedules().await {
                Ok(schedules) => {
                    for schedule in schedules {
                        println!(
                            "{}  {}  keep={}  time={}  day={}",
                            schedule.name,
                            schedule.frequency,
                            schedule.keep_count,
                            schedule.target_time,
                            schedule.target_day
                        );
                    }
                }
                Err(e) => {
                    eprintln!("Failed to resolve schedules: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Some(Commands::Version) => {
            println!("autosnap v{}", env!("CARGO_PKG_VERSION"));
            println!("Scheduled ZFS snapshots with retention pruning");
        }
    }

    Ok(())
}
