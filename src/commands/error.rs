use clap::Args;
use serde::Serialize;

use bridge_callback::error::{self, ErrorCode, Hint};
use bridge_callback::Error;

use super::CmdResult;
use crate::output::exit_code_for_error;

#[derive(Args)]
pub struct ErrorArgs {
    /// Error code to explain (example: `callback.rejected`); omit to list all
    pub code: Option<String>,
}

/// One error code as an operator sees it: what it means and how the CLI exits.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorCodeEntry {
    pub code: &'static str,
    pub summary: String,
    pub exit_code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<Hint>,
}

#[derive(Debug, Serialize)]
pub struct ErrorOutput {
    pub command: &'static str,
    pub codes: Vec<ErrorCodeEntry>,
}

fn entry(code: ErrorCode, detailed: bool) -> ErrorCodeEntry {
    let help = error::explain(code);
    ErrorCodeEntry {
        code: code.as_str(),
        summary: help.summary,
        exit_code: exit_code_for_error(code),
        details_schema: detailed.then_some(help.details_schema),
        hints: if detailed { help.hints } else { Vec::new() },
    }
}

pub fn run(args: ErrorArgs, _global: &super::GlobalArgs) -> CmdResult<ErrorOutput> {
    let codes = match args.code.as_deref() {
        None => error::all_codes()
            .iter()
            .map(|code| entry(*code, false))
            .collect(),
        Some(raw) => {
            let code = error::parse_code(raw)
                .ok_or_else(|| Error::validation_unknown_error_code(raw))?;
            vec![entry(code, true)]
        }
    };

    Ok((
        ErrorOutput {
            command: "error",
            codes,
        },
        0,
    ))
}
