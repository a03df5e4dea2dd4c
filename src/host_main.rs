// Started by the browser through native messaging. Stdout carries protocol messages, nothing
// else may be printed there.

use std::env::args;

use anyhow::Result;
use clap::Parser;
use tabtime::{
    host::{args::HostArgs, start_host},
    utils::{
        dir::resolve_application_path,
        logging::{enable_logging, HOST_PREFIX},
        runtime::single_thread_runtime,
    },
};
use tracing::error;

fn main() -> Result<()> {
    let args = HostArgs::parse_from(args().collect::<Vec<_>>());
    run(args).inspect_err(|e| error!("Host failed {e:?}"))
}

fn run(args: HostArgs) -> Result<()> {
    let app_dir = resolve_application_path(args.dir.clone())?;
    enable_logging(HOST_PREFIX, &app_dir.join("logs"), args.log, args.log_console)?;
    let config = args.config();
    let framing = args.framing;
    single_thread_runtime()?.block_on(async move { start_host(app_dir, config, framing).await })?;
    Ok(())
}
