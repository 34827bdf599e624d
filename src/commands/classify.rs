use clap::Args;
use serde::Serialize;

use bridge_callback::step::{self, StepId};

use super::CmdResult;

#[derive(Args)]
pub struct ClassifyArgs {
    /// Task names to classify
    #[arg(required = true)]
    pub task_names: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct Classification {
    pub task_name: String,
    pub step: Option<StepId>,
}

#[derive(Debug, Serialize)]
pub struct ClassifyOutput {
    pub command: &'static str,
    pub matched: usize,
    pub results: Vec<Classification>,
}

pub fn run(args: ClassifyArgs, _global: &super::GlobalArgs) -> CmdResult<ClassifyOutput> {
    let results: Vec<Classification> = args
        .task_names
        .into_iter()
        .map(|task_name| Classification {
            step: step::classify(&task_name),
            task_name,
        })
        .collect();

    let matched = results.iter().filter(|r| r.step.is_some()).count();

    Ok((
        ClassifyOutput {
            command: "classify",
            matched,
            results,
        },
        0,
    ))
}
