//! `thnk targets`: list declared targets.

use serde::Serialize;
use thnk_adapters::LocalFilesystem;
use thnk_core::prelude::{PlanService, Rule, RuleKind};

use crate::{
    cli::{GlobalArgs, ListFormat, TargetsArgs},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[derive(Debug, Serialize)]
struct TargetView<'a> {
    name: &'a str,
    kind: &'static str,
    structured: bool,
    needs: &'a [String],
    fresh: bool,
}

impl<'a> TargetView<'a> {
    fn new(rule: &'a Rule, fresh: bool) -> Self {
        Self {
            name: rule.name(),
            kind: rule.kind().as_str(),
            structured: rule.is_structured(),
            needs: rule.needs(),
            fresh,
        }
    }

    fn label(&self) -> String {
        match (self.kind, self.structured) {
            ("generation", true) => "generation (json)".to_string(),
            (kind, _) => kind.to_string(),
        }
    }
}

pub fn execute(
    args: TargetsArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let thnkfile = super::load_thnkfile(&global, &config)?;
    let filesystem = LocalFilesystem::new();
    let planner = PlanService::new(&thnkfile, &filesystem);

    let views: Vec<_> = thnkfile
        .rules()
        .map(|rule| {
            let fresh = matches!(rule.kind(), RuleKind::NoOp) || planner.is_cache_hit(rule);
            TargetView::new(rule, fresh)
        })
        .collect();

    match args.format {
        ListFormat::Json => output.json(&views)?,
        ListFormat::List => {
            for view in &views {
                println!("{}", view.name);
            }
        }
        ListFormat::Table => {
            output.header(&format!("Targets ({}):", views.len()))?;
            let width = views.iter().map(|v| v.name.len()).max().unwrap_or(0);
            for view in &views {
                let status = if view.fresh { "fresh" } else { "stale" };
                let needs = if view.needs.is_empty() {
                    String::new()
                } else {
                    output.dim(&format!("<- {}", view.needs.join(" ")))
                };
                output.print(&format!(
                    "  {:width$}  {:18} {:5}  {}",
                    view.name,
                    view.label(),
                    status,
                    needs
                ))?;
            }
        }
    }
    Ok(())
}
