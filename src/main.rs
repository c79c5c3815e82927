use std::{os::unix::process::CommandExt, process::Command, sync::Arc};

use anyhow::{Context, Result};
use dns320ld::{
    arg_parser::ArgsOptions,
    config_manager::load_config,
    daemon_manager::{DaemonManager, TerminalEffect},
    link::SerialLink,
    logger,
    protocol::McuRequest,
    signals::TerminationSignals,
};
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tracing::info;

const POWEROFF: &str = "/sbin/poweroff";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse the command line arguments
    let args_options = ArgsOptions::parse();

    logger::init_logging(args_options.debug);

    // Catch termination signals before touching the MCU
    let signals = TerminationSignals::install()
        .with_context(|| "Failed to install the signal handlers")?;

    let config = load_config(&args_options.config_file_path)
        .with_context(|| "Failed to load the daemon configuration")?;
    let config = Arc::new(config);

    if args_options.print_config {
        println!("{}", config.to_json()?);

        return Ok(());
    }

    let link = SerialLink::open(&config.serial)
        .with_context(|| "Failed to open the MCU serial link")?;

    let mut daemon_manager = DaemonManager::new(config, link);

    // One shot mode, send the request and quit
    if let Some(name) = args_options.send {
        let request: McuRequest = name.parse()?;

        let reply = daemon_manager
            .request(request)
            .with_context(|| format!("Request \"{}\" failed", request.name()))?;

        println!("{reply}");

        return Ok(());
    }

    // This token and tracker will be used to handle graceful shutdown
    let tracker = TaskTracker::new();
    let token = CancellationToken::new();

    {
        let token = token.clone();

        tracker.spawn(async move {
            signals.wait(&token).await;
            token.cancel();
        });
    }

    let effect = daemon_manager.run(token.clone()).await;

    // Stop the signal task and wait for it to finish
    token.cancel();
    tracker.close();
    tracker.wait().await;

    match effect? {
        TerminalEffect::Terminated => Ok(()),
        TerminalEffect::PowerOff => {
            info!("Handing over to {POWEROFF}");

            // Only returns if the process image could not be replaced
            let err = Command::new(POWEROFF).exec();

            Err(err).with_context(|| format!("Failed to execute {POWEROFF}"))
        }
    }
}
