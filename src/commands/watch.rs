use clap::Args;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufReader};

use bridge_callback::config::BridgeConfig;
use bridge_callback::dispatcher::{DispatchSummary, Dispatcher};
use bridge_callback::feed::{self, StreamSummary};
use bridge_callback::step::StepId;
use bridge_callback::Error;

use super::CmdResult;
use crate::tty;

#[derive(Args)]
pub struct WatchArgs {
    /// Event file (JSON lines); `-` or omitted reads stdin
    #[arg(long, short = 'i', value_name = "PATH")]
    pub input: Option<String>,

    /// Bridge server base URL (overrides BRIDGE_SERVER_URL)
    #[arg(long, value_name = "URL")]
    pub bridge_url: Option<String>,

    /// Deployment id (overrides DEPLOYMENT_ID)
    #[arg(long, value_name = "ID")]
    pub deployment_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WatchOutput {
    pub command: &'static str,
    pub config: BridgeConfig,
    pub stream: StreamSummary,
    pub callbacks: DispatchSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_step: Option<StepId>,
}

pub fn run(args: WatchArgs, _global: &super::GlobalArgs) -> CmdResult<WatchOutput> {
    let config = BridgeConfig::from_env().with_overrides(args.bridge_url, args.deployment_id);

    let mut dispatcher = Dispatcher::new(config)?;

    let stream = match args.input.as_deref() {
        None | Some("-") => {
            if tty::is_stdin_tty() {
                return Err(Error::validation_invalid_argument(
                    "input",
                    "Cannot read events from stdin when stdin is a TTY",
                    None,
                    None,
                ));
            }
            bridge_callback::log_status!("watch", "Reading events from stdin");
            let stdin = io::stdin();
            feed::run_event_stream(stdin.lock(), &mut dispatcher)?
        }
        Some(path) => {
            let file = File::open(path).map_err(|e| {
                Error::internal_io(e.to_string(), Some(format!("open {}", path)))
            })?;
            bridge_callback::log_status!("watch", "Reading events from {}", path);
            feed::run_event_stream(BufReader::new(file), &mut dispatcher)?
        }
    };

    Ok((
        WatchOutput {
            command: "watch",
            config: dispatcher.config().clone(),
            stream,
            callbacks: dispatcher.summary(),
            last_step: dispatcher.current_step(),
        },
        0,
    ))
}
