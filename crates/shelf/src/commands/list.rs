//! `shelf list`: fetch once, retry as asked, render the items.

use tracing::warn;

use shelf_core::FetchState;

use crate::cli::{GlobalOpts, ListArgs};
use crate::commands::{Session, util};
use crate::error::CliError;
use crate::output;

pub async fn handle(args: &ListArgs, session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let spinner = util::spinner(global.quiet);
    let progress = spinner.clone();
    let controller = session.controller(move |state| {
        if let FetchState::Loading { attempt } = state {
            progress.set_message(if *attempt == 1 {
                "Fetching catalog...".to_owned()
            } else {
                format!("Fetching catalog (attempt {attempt})...")
            });
        }
    });
    // No-op when auto-start already began the first attempt.
    controller.start();

    let prompt = !args.no_prompt && !global.quiet && util::interactive();
    let mut retries_left = args.retries;

    loop {
        match controller.settled().await {
            FetchState::Success { data } => {
                spinner.finish_and_clear();
                let rendered = output::render_items(session.output, &data)?;
                output::print_output(&rendered, global.quiet);
                return Ok(());
            }
            FetchState::Failed { error, attempt } => {
                if retries_left > 0 {
                    retries_left -= 1;
                    warn!(
                        attempt,
                        kind = error.kind().as_ref(),
                        retries_left,
                        "fetch failed, retrying"
                    );
                    controller.retry();
                    continue;
                }
                if prompt && spinner.suspend(|| util::confirm_retry(&error))? {
                    controller.retry();
                    continue;
                }
                spinner.finish_and_clear();
                return Err(CliError::fetch(&error, attempt, &session.target));
            }
            FetchState::Idle | FetchState::Loading { .. } => {
                controller.start();
            }
        }
    }
}
