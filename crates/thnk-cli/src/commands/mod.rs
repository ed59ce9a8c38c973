//! Command handlers and the wiring they share.

pub mod build;
pub mod completions;
pub mod config;
pub mod init;
pub mod plan;
pub mod targets;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use thnk_adapters::{
    EchoBackend, LocalFilesystem, OpenAiBackend, OpenAiConfig, SimpleRenderer,
    parser::{self, MAKEFILE_NAME, TOML_NAME},
};
use thnk_core::{
    application::ports::{Filesystem, GenerationBackend},
    domain::Thnkfile,
    error::ThnkError,
};
use tracing::{debug, info, instrument};

use crate::{
    cli::{BackendKind, GlobalArgs},
    config::{AppConfig, Provider},
    error::{CliError, CliResult, IntoCli},
};

/// Find the declaration file: `--file`, then `thnkfile.path`, then
/// `Thnkfile` or `Thnkfile.toml` in the current directory.
pub fn locate_thnkfile(global: &GlobalArgs, config: &AppConfig) -> CliResult<PathBuf> {
    if let Some(path) = global.file.as_ref().or(config.thnkfile.path.as_ref()) {
        return Ok(path.clone());
    }

    let cwd = std::env::current_dir().with_cli_context(|| "Failed to read current directory")?;
    [MAKEFILE_NAME, TOML_NAME]
        .into_iter()
        .map(|name| cwd.join(name))
        .find(|candidate| candidate.is_file())
        .ok_or(CliError::ThnkfileNotFound { searched: cwd })
}

/// Parse and validate the Thnkfile.
///
/// Target paths are relative to the Thnkfile, so the process moves into
/// its directory first.
#[instrument(skip_all)]
pub fn load_thnkfile(global: &GlobalArgs, config: &AppConfig) -> CliResult<Thnkfile> {
    let path = locate_thnkfile(global, config)?;
    let dialect = parser::dialect_for(&path);

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::env::set_current_dir(dir)
            .with_cli_context(|| format!("Failed to enter {}", dir.display()))?;
    }
    let file_name = path.file_name().map_or_else(|| path.clone(), PathBuf::from);
    info!(thnkfile = %path.display(), %dialect, "Loading Thnkfile");

    let filesystem: Arc<dyn Filesystem> = Arc::new(LocalFilesystem::new());
    let source = filesystem.read_to_string(&file_name)?;
    let parser = parser::parser_for(
        dialect,
        Arc::new(SimpleRenderer::new()),
        Arc::clone(&filesystem),
        Path::new(""),
    );

    let mut declaration = parser.parse(&source)?;
    if declaration.defaults.model.is_none() {
        declaration.defaults.model = config.backend.model.clone();
    }

    let thnkfile = Thnkfile::build(declaration).map_err(ThnkError::from)?;
    debug!(rules = thnkfile.len(), "Thnkfile loaded");
    Ok(thnkfile)
}

/// Build the generation backend from config, honouring a per-run override.
pub fn backend(
    config: &AppConfig,
    requested: Option<BackendKind>,
) -> CliResult<Box<dyn GenerationBackend>> {
    let kind = requested.unwrap_or(match config.backend.provider {
        Provider::Openai => BackendKind::Openai,
        Provider::Echo => BackendKind::Echo,
    });

    match kind {
        BackendKind::Echo => Ok(Box::new(EchoBackend::new())),
        BackendKind::Openai => {
            let variable = &config.backend.api_key_env;
            let api_key = std::env::var(variable).map_err(|_| CliError::ConfigError {
                message: format!("environment variable {variable} is not set"),
                source: None,
            })?;
            let backend = OpenAiBackend::new(
                OpenAiConfig::new(api_key)
                    .with_base_url(config.backend.base_url.clone())
                    .with_timeout(Duration::from_secs(config.backend.timeout_secs)),
            )?;
            Ok(Box::new(backend))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;

    fn global(file: Option<&str>) -> GlobalArgs {
        GlobalArgs {
            verbose: 0,
            quiet: false,
            no_color: true,
            config: None,
            file: file.map(PathBuf::from),
            log_file: None,
            output_format: OutputFormat::Plain,
        }
    }

    #[test]
    fn explicit_file_wins_over_config() {
        let mut config = AppConfig::default();
        config.thnkfile.path = Some(PathBuf::from("from-config/Thnkfile"));
        let path = locate_thnkfile(&global(Some("flag/Thnkfile.toml")), &config).unwrap();
        assert_eq!(path, PathBuf::from("flag/Thnkfile.toml"));

        let path = locate_thnkfile(&global(None), &config).unwrap();
        assert_eq!(path, PathBuf::from("from-config/Thnkfile"));
    }

    #[test]
    fn echo_backend_needs_no_key() {
        let backend = backend(&AppConfig::default(), Some(BackendKind::Echo)).unwrap();
        assert_eq!(backend.name(), "echo");
    }

    #[test]
    fn openai_without_key_is_a_config_error() {
        let mut config = AppConfig::default();
        config.backend.api_key_env = "THNK_TEST_KEY_THAT_IS_NEVER_SET".into();
        let err = backend(&config, None).err().unwrap();
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("THNK_TEST_KEY_THAT_IS_NEVER_SET"));
    }
}
