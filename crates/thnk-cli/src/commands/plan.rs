//! `thnk plan`: show what `build` would generate, without generating.

use serde::Serialize;
use thnk_adapters::LocalFilesystem;
use thnk_core::prelude::PlanService;

use crate::{
    cli::{GlobalArgs, OutputFormat, PlanArgs},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[derive(Serialize)]
struct PlanView<'a> {
    target: &'a str,
    steps: Vec<&'a str>,
}

pub fn execute(
    args: PlanArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let thnkfile = super::load_thnkfile(&global, &config)?;
    let filesystem = LocalFilesystem::new();
    let plan = PlanService::new(&thnkfile, &filesystem).plan(args.target.as_deref(), args.force)?;

    let view = PlanView {
        target: plan.target(),
        steps: plan.names(),
    };

    match output.format() {
        OutputFormat::Json => output.json(&view)?,
        _ if plan.is_empty() => output.success(&format!("{} is up to date", view.target))?,
        _ => {
            output.header(&format!("Plan for {}:", view.target))?;
            for (index, rule) in plan.steps().iter().enumerate() {
                let detail = output.dim(&format!("({})", rule.kind().as_str()));
                output.print(&format!("  {}. {} {}", index + 1, rule.name(), detail))?;
            }
        }
    }
    Ok(())
}
