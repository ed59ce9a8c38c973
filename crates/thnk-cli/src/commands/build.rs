//! `thnk build`: bring a target up to date.

use thnk_adapters::LocalFilesystem;
use thnk_core::prelude::{BuildOptions, BuildService, Settings};
use tracing::{info, instrument};

use crate::{
    cli::{BuildArgs, GlobalArgs, OutputFormat},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
    progress::BuildProgress,
};

#[instrument(skip_all, fields(rule = args.target.as_deref().unwrap_or("<default>")))]
pub fn execute(
    args: BuildArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let thnkfile = super::load_thnkfile(&global, &config)?;
    let backend = super::backend(&config, args.backend)?;
    let service = BuildService::new(thnkfile, Box::new(LocalFilesystem::new()), backend);

    let mut options = BuildOptions::default();
    if args.force {
        options = options.forced();
    }
    if let Some(runtime) = runtime_scope(&args) {
        options = options.with_runtime(runtime);
    }

    let report = {
        let mut progress = BuildProgress::new(&output);
        service.build(args.target.as_deref(), &options, &mut progress)?
    };
    info!(run_id = %report.run_id, generated = report.generated.len(), "Build finished");

    if output.format() == OutputFormat::Json {
        output.json(&report)?;
    } else {
        output.print(&report.summary())?;
    }
    Ok(())
}

/// Settings from flags, or `None` when no flag was given.
fn runtime_scope(args: &BuildArgs) -> Option<Settings> {
    if args.model.is_none() && args.temperature.is_none() && args.data.is_empty() {
        return None;
    }

    let mut settings = Settings::new();
    if let Some(model) = &args.model {
        settings = settings.with_model(model.clone());
    }
    if let Some(temperature) = args.temperature {
        settings = settings.with_temperature(temperature);
    }
    for (key, value) in &args.data {
        settings = settings.with_data(key.clone(), value.clone());
    }
    Some(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    fn build_args(argv: &[&str]) -> BuildArgs {
        match Cli::parse_from(argv).command {
            Commands::Build(args) => args,
            other => panic!("expected build, got {other:?}"),
        }
    }

    #[test]
    fn no_flags_means_no_runtime_scope() {
        assert!(runtime_scope(&build_args(&["thnk", "build"])).is_none());
    }

    #[test]
    fn flags_become_runtime_scope() {
        let scope = runtime_scope(&build_args(&[
            "thnk", "build", "--model", "gpt-4o", "--data", "name=Jacob",
        ]))
        .unwrap();
        assert_eq!(scope.model.as_deref(), Some("gpt-4o"));
        assert!(scope.temperature.is_none());
        assert_eq!(scope.data.get("name"), Some(&serde_json::json!("Jacob")));
    }
}
