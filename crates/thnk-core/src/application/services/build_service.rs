//! Build Service - main application orchestrator.
//!
//! This service coordinates one build:
//! 1. Plan the requested target
//! 2. Dispatch every planned rule
//! 3. Call the backend for generation requests
//! 4. Write each result before moving on
//!
//! The first failure halts the run. Files written before it are kept, and
//! their mtimes make the next run pick up where this one stopped.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    application::{
        ApplicationError,
        ports::{Filesystem, GenerationBackend, NoopObserver, ProgressObserver},
        services::{DispatchService, PlanService},
    },
    domain::{DomainError, Generation, GenerationOutput, Plan, Rule, Settings, Thnkfile},
    error::{Context, ThnkResult},
};

/// Per-invocation knobs.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Rebuild every reachable rule regardless of mtimes.
    pub force: bool,
    /// Highest-precedence settings scope (CLI flags, API callers).
    pub runtime: Option<Settings>,
}

impl BuildOptions {
    pub fn forced(mut self) -> Self {
        self.force = true;
        self
    }

    pub fn with_runtime(mut self, runtime: Settings) -> Self {
        self.runtime = Some(runtime);
        self
    }
}

/// What one build did.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub target: String,
    /// Rules in the plan, no-ops included.
    pub planned: usize,
    /// Targets written, in order.
    pub generated: Vec<String>,
}

impl BuildReport {
    /// One-line human summary.
    pub fn summary(&self) -> String {
        match self.generated.len() {
            0 => "All files thgt.".to_string(),
            1 => "Thgt 1 file.".to_string(),
            n => format!("Thgt {n} files."),
        }
    }
}

/// Runs plans against injected adapters.
pub struct BuildService {
    thnkfile: Thnkfile,
    filesystem: Box<dyn Filesystem>,
    backend: Box<dyn GenerationBackend>,
}

impl BuildService {
    /// Create a new build service with the given adapters.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use thnk_core::prelude::*;
    ///
    /// let service = BuildService::new(
    ///     thnkfile,   // Thnkfile
    ///     filesystem, // impl Filesystem
    ///     backend,    // impl GenerationBackend
    /// );
    /// ```
    pub fn new(
        thnkfile: Thnkfile,
        filesystem: Box<dyn Filesystem>,
        backend: Box<dyn GenerationBackend>,
    ) -> Self {
        Self {
            thnkfile,
            filesystem,
            backend,
        }
    }

    pub fn thnkfile(&self) -> &Thnkfile {
        &self.thnkfile
    }

    pub fn filesystem(&self) -> &dyn Filesystem {
        self.filesystem.as_ref()
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Dry run: what `build` would execute right now.
    pub fn plan(&self, target: Option<&str>, force: bool) -> ThnkResult<Plan<'_>> {
        self.planner().plan(target, force)
    }

    pub fn is_cache_hit(&self, rule: &Rule) -> bool {
        self.planner().is_cache_hit(rule)
    }

    /// Bring `target` (or the default target) up to date.
    #[instrument(
        skip_all,
        fields(
            rule = target.unwrap_or("<default>"),
            backend = self.backend.name(),
            force = options.force
        )
    )]
    pub fn build(
        &self,
        target: Option<&str>,
        options: &BuildOptions,
        observer: &mut dyn ProgressObserver,
    ) -> ThnkResult<BuildReport> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();

        let plan = self.plan(target, options.force)?;
        info!(%run_id, steps = plan.len(), "Executing plan");

        let dispatcher = DispatchService::new(&self.thnkfile, self.filesystem.as_ref());
        let mut generated = Vec::new();

        for rule in &plan {
            let content = match dispatcher.generation(rule, options.runtime.as_ref())? {
                Generation::Skip => continue,
                Generation::Content(text) => text,
                Generation::Request(request) => {
                    let output = self.backend.generate(&request, observer)?;
                    if output.mode() != request.mode {
                        return Err(ApplicationError::MalformedOutput {
                            target: request.target,
                            reason: format!(
                                "asked for {} output, got {}",
                                request.mode,
                                output.mode()
                            ),
                        }
                        .into());
                    }
                    Self::serialize(output)?
                }
            };

            self.persist(rule.name(), &content)?;
            observer.on_written(rule.name());
            info!(rule = rule.name(), bytes = content.len(), "Written");
            generated.push(rule.name().to_string());
        }

        Ok(BuildReport {
            run_id,
            started_at,
            target: plan.target().to_string(),
            planned: plan.len(),
            generated,
        })
    }

    /// Build `target`, then return its content.
    pub fn text(&self, target: &str, options: &BuildOptions) -> ThnkResult<String> {
        if self.thnkfile.rule(target).is_some_and(Rule::is_noop) {
            return Err(DomainError::NoArtifact {
                target: target.to_string(),
            }
            .into());
        }
        self.build(Some(target), options, &mut NoopObserver)?;
        self.filesystem.read_to_string(Path::new(target))
    }

    /// Build a structured `target`, then return its parsed object.
    pub fn object(&self, target: &str, options: &BuildOptions) -> ThnkResult<Value> {
        let rule = self
            .thnkfile
            .rule(target)
            .ok_or_else(|| DomainError::MissingDependency {
                name: target.to_string(),
                needed_by: None,
            })?;
        if !rule.is_structured() {
            return Err(DomainError::NotStructuredTarget {
                target: target.to_string(),
            }
            .into());
        }

        let raw = self.text(target, options)?;
        serde_json::from_str(&raw).map_err(|e| {
            ApplicationError::MalformedOutput {
                target: target.to_string(),
                reason: format!("stored content is not JSON: {e}"),
            }
            .into()
        })
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    fn planner(&self) -> PlanService<'_> {
        PlanService::new(&self.thnkfile, self.filesystem.as_ref())
    }

    fn serialize(output: GenerationOutput) -> ThnkResult<String> {
        match output {
            GenerationOutput::Text(text) => Ok(text),
            GenerationOutput::Object(value) => {
                serde_json::to_string_pretty(&value).context("serializing object output")
            }
        }
    }

    /// Write `content` to the target path, creating parent directories.
    fn persist(&self, target: &str, content: &str) -> ThnkResult<()> {
        let path = Path::new(target);
        let result = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => self.filesystem.create_dir_all(parent),
            None => Ok(()),
        }
        .and_then(|()| self.filesystem.write_file(path, content));

        result.map_err(|e| {
            warn!(rule = target, error = %e, "Write failed");
            ApplicationError::Persistence {
                target: target.to_string(),
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}
