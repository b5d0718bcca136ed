//! `shelf watch`: print each transition, optionally retrying on a schedule.

use std::time::Duration;

use tracing::info;

use shelf_core::FetchState;

use crate::cli::{GlobalOpts, WatchArgs};
use crate::commands::Session;
use crate::error::CliError;
use crate::output;

pub async fn handle(args: &WatchArgs, session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let (color, quiet) = (session.color, global.quiet);
    let controller = session.controller(move |state| {
        output::print_output(&output::render_transition(state, color), quiet);
    });
    controller.start();

    loop {
        let state = tokio::select! {
            state = controller.settled() => state,
            _ = tokio::signal::ctrl_c() => return Ok(()),
        };

        match state {
            FetchState::Success { .. } => return Ok(()),
            FetchState::Failed { error, attempt } => {
                let Some(every) = args.retry_every else {
                    return Err(CliError::fetch(&error, attempt, &session.target));
                };
                if attempt >= args.max_attempts {
                    return Err(CliError::fetch(&error, attempt, &session.target));
                }

                info!(attempt, delay_secs = every, "scheduling retry");
                tokio::select! {
                    () = tokio::time::sleep(Duration::from_secs(every)) => {}
                    _ = tokio::signal::ctrl_c() => return Ok(()),
                }
                controller.retry();
            }
            FetchState::Idle | FetchState::Loading { .. } => {
                controller.start();
            }
        }
    }
}
