//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod config_cmd;
pub mod devices;
pub mod lock;
pub mod logs;
pub mod util;
pub mod watch;

use solity_core::IntegrationConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch an account-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    config: IntegrationConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Devices(args) => devices::handle(&config, args, global).await,
        Command::Lock(args) => lock::handle(config, lock::LockAction::Lock, &args.device, global).await,
        Command::Unlock(args) => {
            lock::handle(config, lock::LockAction::Unlock, &args.device, global).await
        }
        Command::Open(args) => lock::handle(config, lock::LockAction::Open, &args.device, global).await,
        Command::Logs { device, page } => logs::handle(&config, &device, page, global).await,
        Command::Watch { interval } => watch::handle(config, interval, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
