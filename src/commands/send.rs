use clap::Args;
use serde::Serialize;

use bridge_callback::callback::{self, CallbackPayload, CallbackStatus, HttpTransport};
use bridge_callback::config::{BridgeConfig, DEPLOYMENT_ID_ENV};
use bridge_callback::step::StepId;
use bridge_callback::Error;

use super::CmdResult;

#[derive(Args)]
pub struct SendArgs {
    /// Deployment step (route53, load_balancer, k8s_service, ingress, domain_mapping)
    #[arg(long)]
    pub step: String,

    /// Step status (running, completed, failed)
    #[arg(long)]
    pub status: String,

    /// Human-readable message
    #[arg(long, default_value = "")]
    pub message: String,

    /// Bridge server base URL (overrides BRIDGE_SERVER_URL)
    #[arg(long, value_name = "URL")]
    pub bridge_url: Option<String>,

    /// Deployment id (overrides DEPLOYMENT_ID)
    #[arg(long, value_name = "ID")]
    pub deployment_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SendOutput {
    pub command: &'static str,
    pub url: String,
    pub payload: CallbackPayload,
    pub response_status: u16,
    pub response_body: String,
}

pub fn run(args: SendArgs, _global: &super::GlobalArgs) -> CmdResult<SendOutput> {
    let step: StepId = args.step.parse()?;
    let status = CallbackStatus::parse(&args.status)?;

    let config = BridgeConfig::from_env().with_overrides(args.bridge_url, args.deployment_id);
    config.validate()?;

    let deployment_id = config.deployment_id()?.ok_or_else(|| {
        Error::config_missing_key(DEPLOYMENT_ID_ENV, Some("environment".to_string()))
            .with_hint("Set DEPLOYMENT_ID or pass --deployment-id")
    })?;

    let payload = CallbackPayload {
        deployment_id,
        step_name: step,
        status,
        message: args.message,
    };

    let url = config.callback_url();
    bridge_callback::log_status!("send", "Posting {} for step {} to {}", status, step, url);

    let transport = HttpTransport::new()?;
    let response = callback::deliver(&transport, &url, &payload)?;

    Ok((
        SendOutput {
            command: "send",
            url,
            payload,
            response_status: response.status,
            response_body: response.body,
        },
        0,
    ))
}
