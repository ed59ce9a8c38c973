//! Dispatch Service - turns one rule into a generation.
//!
//! Input files, delegated prompt files and schema files are read at dispatch
//! time, so a dependency written earlier in the same plan is always seen.

use std::path::Path;

use tracing::{debug, instrument};

use crate::{
    application::ports::Filesystem,
    domain::{
        DomainError, Generation, GenerationRequest, InlinedInput, OutputMode, Rule, RuleKind,
        Schema, Settings, Thnkfile, prompts,
    },
    error::{ThnkError, ThnkResult},
};

pub struct DispatchService<'a> {
    thnkfile: &'a Thnkfile,
    filesystem: &'a dyn Filesystem,
}

impl<'a> DispatchService<'a> {
    pub fn new(thnkfile: &'a Thnkfile, filesystem: &'a dyn Filesystem) -> Self {
        Self {
            thnkfile,
            filesystem,
        }
    }

    /// Decide what `rule` produces, with `runtime` as the last settings scope.
    #[instrument(skip_all, fields(rule = rule.name(), kind = rule.kind().as_str()))]
    pub fn generation(&self, rule: &Rule, runtime: Option<&Settings>) -> ThnkResult<Generation> {
        let effective = match runtime {
            Some(runtime) => rule.settings().overlaid_with(runtime),
            None => rule.settings().clone(),
        };
        effective.validate(rule.name())?;

        match rule.kind() {
            RuleKind::NoOp => Ok(Generation::Skip),
            RuleKind::Content(content) => Ok(Generation::Content(content.resolve(&effective.data)?)),
            RuleKind::Generation {
                prompt_file,
                schema_file,
            } => {
                let prompt = match prompt_file {
                    Some(path) => self.read(path)?,
                    None => effective
                        .prompt
                        .as_ref()
                        .ok_or_else(|| ThnkError::Internal {
                            message: format!("generation rule {} has no prompt", rule.name()),
                        })?
                        .resolve(&effective.data)?,
                };

                let schema = match schema_file {
                    Some(path) => Some(self.read_schema(rule.name(), path)?),
                    None => effective.schema.clone(),
                };

                let inputs = self.inputs(rule)?;
                let mode = if schema.is_some() {
                    OutputMode::Object
                } else {
                    OutputMode::Text
                };
                debug!(inputs = inputs.len(), mode = %mode, "Request assembled");

                Ok(Generation::Request(GenerationRequest {
                    target: rule.name().to_string(),
                    mode,
                    model: effective.model_or_default().to_string(),
                    temperature: effective.temperature_or_default(),
                    system: prompts::system_text(rule.name(), &inputs),
                    prompt,
                    schema,
                }))
            }
        }
    }

    /// Non-special needs, minus no-op rules which have no file to inline.
    fn inputs(&self, rule: &Rule) -> ThnkResult<Vec<InlinedInput>> {
        rule.inputs()
            .iter()
            .filter(|need| !self.thnkfile.rule(need).is_some_and(Rule::is_noop))
            .map(|need| -> ThnkResult<InlinedInput> {
                Ok(InlinedInput::new(need.as_str(), self.read(need)?))
            })
            .collect()
    }

    fn read(&self, path: &str) -> ThnkResult<String> {
        self.filesystem.read_to_string(Path::new(path))
    }

    fn read_schema(&self, target: &str, path: &str) -> ThnkResult<Schema> {
        let raw = self.read(path)?;
        serde_json::from_str(&raw).map(Schema::new).map_err(|e| {
            DomainError::InvalidSettings {
                target: target.to_string(),
                reason: format!("{path} is not valid JSON: {e}"),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::testing::{FakeFs, thnkfile};
    use crate::domain::{
        Dialect, SYSTEM_PREAMBLE, TargetDeclaration, TextSource, ThnkfileDeclaration,
        entities::template::testing::template,
    };
    use serde_json::json;

    fn request(generation: Generation) -> GenerationRequest {
        match generation {
            Generation::Request(request) => request,
            other => panic!("expected a request, got {other:?}"),
        }
    }

    #[test]
    fn greeting_renders_template_against_runtime_data() {
        let thnkfile = Thnkfile::build(
            ThnkfileDeclaration::new(Dialect::Structured).with_target(
                TargetDeclaration::new("greeting").with_prompt(template("Say hi to {{name}}")),
            ),
        )
        .unwrap();
        let fs = FakeFs::default();
        let rule = thnkfile.rule("greeting").unwrap();
        let runtime = Settings::new().with_data("name", "Jacob");

        let req = request(
            DispatchService::new(&thnkfile, &fs)
                .generation(rule, Some(&runtime))
                .unwrap(),
        );
        assert_eq!(req.prompt, "Say hi to Jacob");
        assert_eq!(req.mode, OutputMode::Text);
        assert_eq!(req.model, "gpt-4o-mini");
        assert_eq!(req.temperature, 0.0);
        assert!(req.schema.is_none());
        assert_eq!(
            req.system,
            format!("{SYSTEM_PREAMBLE}\n\nYou need to generate greeting")
        );
    }

    #[test]
    fn schema_file_switches_to_object_mode_and_is_not_inlined() {
        let thnkfile = thnkfile(&[(
            "summary.json",
            &["notes.txt", "summary.schema.json"],
            "Summarise the notes",
        )]);
        let fs = FakeFs::with_files(&[
            ("notes.txt", "buy milk"),
            ("summary.schema.json", r#"{"type":"object"}"#),
        ]);
        let rule = thnkfile.rule("summary.json").unwrap();

        let req = request(DispatchService::new(&thnkfile, &fs).generation(rule, None).unwrap());
        assert_eq!(req.mode, OutputMode::Object);
        assert_eq!(req.schema, Some(Schema::new(json!({"type": "object"}))));
        assert!(req.system.contains("notes.txt:\n```\nbuy milk\n```"));
        assert!(!req.system.contains("summary.schema.json"));
    }

    #[test]
    fn prompt_file_content_is_the_prompt() {
        let thnkfile = thnkfile(&[("out.md", &["in.txt", "out.prompt.md"], "")]);
        let fs = FakeFs::with_files(&[("in.txt", "x"), ("out.prompt.md", "Expand this")]);
        let rule = thnkfile.rule("out.md").unwrap();

        let req = request(DispatchService::new(&thnkfile, &fs).generation(rule, None).unwrap());
        assert_eq!(req.prompt, "Expand this");
        assert!(!req.system.contains("Expand this"));
    }

    #[test]
    fn noop_needs_are_not_inlined() {
        let thnkfile = thnkfile(&[
            ("report.md", &["group", "a.txt"], "Report"),
            ("group", &["a.txt"], ""),
        ]);
        let fs = FakeFs::with_files(&[("a.txt", "alpha")]);
        let rule = thnkfile.rule("report.md").unwrap();

        let req = request(DispatchService::new(&thnkfile, &fs).generation(rule, None).unwrap());
        assert!(!req.system.contains("group:"));
        assert!(req.system.contains("a.txt:\n```\nalpha\n```"));
    }

    #[test]
    fn content_rule_bypasses_the_backend() {
        let thnkfile = Thnkfile::build(
            ThnkfileDeclaration::new(Dialect::Structured)
                .with_defaults(Settings::new().with_data("name", "Ada"))
                .with_target(TargetDeclaration::new("hello.txt").with_content(template("Hi {{name}}"))),
        )
        .unwrap();
        let fs = FakeFs::default();
        let rule = thnkfile.rule("hello.txt").unwrap();

        let generation = DispatchService::new(&thnkfile, &fs).generation(rule, None).unwrap();
        assert_eq!(generation, Generation::Content("Hi Ada".into()));
    }

    #[test]
    fn noop_rule_is_skipped() {
        let thnkfile = thnkfile(&[("all", &[], "")]);
        let fs = FakeFs::default();
        let rule = thnkfile.rule("all").unwrap();
        assert_eq!(
            DispatchService::new(&thnkfile, &fs).generation(rule, None).unwrap(),
            Generation::Skip
        );
    }

    #[test]
    fn runtime_scope_wins_over_declared() {
        let thnkfile = Thnkfile::build(
            ThnkfileDeclaration::new(Dialect::Structured).with_target(
                TargetDeclaration::new("a.txt").with_settings(
                    Settings::new()
                        .with_prompt(TextSource::literal("x"))
                        .with_model("declared")
                        .with_temperature(0.3),
                ),
            ),
        )
        .unwrap();
        let fs = FakeFs::default();
        let rule = thnkfile.rule("a.txt").unwrap();
        let runtime = Settings::new().with_model("runtime");

        let req = request(
            DispatchService::new(&thnkfile, &fs)
                .generation(rule, Some(&runtime))
                .unwrap(),
        );
        assert_eq!(req.model, "runtime");
        assert_eq!(req.temperature, 0.3);
    }

    #[test]
    fn invalid_runtime_temperature_is_rejected() {
        let thnkfile = thnkfile(&[("a.txt", &[], "x")]);
        let fs = FakeFs::default();
        let rule = thnkfile.rule("a.txt").unwrap();
        let runtime = Settings::new().with_temperature(-1.0);
        let err = DispatchService::new(&thnkfile, &fs)
            .generation(rule, Some(&runtime))
            .unwrap_err();
        assert_eq!(err.target(), Some("a.txt"));
    }

    #[test]
    fn malformed_schema_file_is_reported_against_the_target() {
        let thnkfile = thnkfile(&[("out.json", &["schema.json"], "x")]);
        let fs = FakeFs::with_files(&[("schema.json", "{not json")]);
        let rule = thnkfile.rule("out.json").unwrap();
        let err = DispatchService::new(&thnkfile, &fs)
            .generation(rule, None)
            .unwrap_err();
        assert!(err.to_string().contains("schema.json is not valid JSON"));
    }
}
