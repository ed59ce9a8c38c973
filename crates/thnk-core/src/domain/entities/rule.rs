//! The `Rule` entity: one buildable target.
//!
//! A rule is built once from a [`TargetDeclaration`] plus the scopes above
//! it, validated, and never mutated afterwards. Its [`RuleKind`] is derived
//! at construction time:
//!
//! - **Content**: literal or templated content, written without calling the
//!   backend.
//! - **Generation**: has a prompt (inline or from a `*.prompt.md` need) and
//!   is sent to the backend.
//! - **NoOp**: neither; exists only to group needs and cascade settings. It
//!   never produces a file.
//!
//! # Domain purity
//!
//! This module must not import `tracing` or touch the filesystem.

use std::fmt;

use crate::domain::{
    entities::{declaration::TargetDeclaration, settings::Settings, template::TextSource},
    error::DomainError,
    value_objects::{Dialect, NeedKind},
};

/// What a rule does when it is out of date.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleKind {
    Content(TextSource),
    Generation {
        /// Need whose file content is the prompt.
        prompt_file: Option<String>,
        /// Need whose file content is the response schema.
        schema_file: Option<String>,
    },
    NoOp,
}

impl RuleKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Content(_) => "content",
            Self::Generation { .. } => "generation",
            Self::NoOp => "no-op",
        }
    }
}

/// A validated, immutable build rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    name: String,
    needs: Vec<String>,
    inputs: Vec<String>,
    settings: Settings,
    kind: RuleKind,
}

impl Rule {
    /// Build and validate a rule. The first failing check wins:
    ///
    /// 1. settings shape (temperature, model)
    /// 2. conflicting prompt sources
    /// 3. schema on a non-JSON target (Makefile dialect only)
    /// 4. more than one schema-like or prompt-like special need
    pub fn from_declaration(
        decl: &TargetDeclaration,
        global: &Settings,
        dialect: Dialect,
    ) -> Result<Self, DomainError> {
        let name = decl.name.clone();

        let mut schema_files = Vec::new();
        let mut prompt_files = Vec::new();
        let mut inputs = Vec::new();
        for need in &decl.needs {
            match NeedKind::classify(need) {
                NeedKind::Schema => schema_files.push(need.clone()),
                NeedKind::Prompt => prompt_files.push(need.clone()),
                NeedKind::Declaration => {}
                NeedKind::Input => inputs.push(need.clone()),
            }
        }

        let settings = Settings::merge(
            std::iter::once(global)
                .chain(decl.inherited.iter())
                .chain(std::iter::once(&decl.settings)),
        );
        settings.validate(&name)?;

        if decl.group {
            return Ok(Self {
                name,
                needs: decl.needs.clone(),
                inputs,
                settings,
                kind: RuleKind::NoOp,
            });
        }

        // 2. Only the target's own scope can conflict; inherited prompts are
        //    overridden by a prompt file or by content.
        let own_prompt = decl.settings.prompt.is_some();
        if decl.content.is_some() && (own_prompt || !prompt_files.is_empty()) {
            return Err(DomainError::ConflictingPromptSource {
                target: name,
                reason: "Cannot have both content and a prompt".into(),
            });
        }
        if own_prompt && !prompt_files.is_empty() {
            return Err(DomainError::ConflictingPromptSource {
                target: name,
                reason: "Cannot have prompt both in file and in Thnkfile".into(),
            });
        }

        // 3.
        let has_schema = settings.schema.is_some() || !schema_files.is_empty();
        if dialect.requires_json_target_for_schema() && has_schema && !name.ends_with(".json") {
            return Err(DomainError::SchemaOnNonStructuredTarget { target: name });
        }

        // 4.
        if schema_files.len() > 1 || (!schema_files.is_empty() && decl.settings.schema.is_some())
        {
            let mut candidates = schema_files.clone();
            if decl.settings.schema.is_some() {
                candidates.push("inline schema".into());
            }
            return Err(DomainError::AmbiguousSpecialDependency {
                target: name,
                kind: NeedKind::Schema.as_str(),
                candidates: candidates.join(", "),
            });
        }
        if prompt_files.len() > 1 {
            return Err(DomainError::AmbiguousSpecialDependency {
                target: name,
                kind: NeedKind::Prompt.as_str(),
                candidates: prompt_files.join(", "),
            });
        }

        let prompt_file = prompt_files.into_iter().next();
        let schema_file = schema_files.into_iter().next();
        let kind = match &decl.content {
            Some(content) => RuleKind::Content(content.clone()),
            None if settings.prompt.is_some() || prompt_file.is_some() => RuleKind::Generation {
                prompt_file,
                schema_file,
            },
            None => RuleKind::NoOp,
        };

        Ok(Self {
            name,
            needs: decl.needs.clone(),
            inputs,
            settings,
            kind,
        })
    }

    /// Target name; also the path the artifact is written to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All needs in declaration order, special ones included.
    pub fn needs(&self) -> &[String] {
        &self.needs
    }

    /// Needs whose content is inlined into the system text.
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    /// Effective settings after the declaration-time cascade.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn kind(&self) -> &RuleKind {
        &self.kind
    }

    pub fn is_noop(&self) -> bool {
        matches!(self.kind, RuleKind::NoOp)
    }

    pub fn prompt_file(&self) -> Option<&str> {
        match &self.kind {
            RuleKind::Generation { prompt_file, .. } => prompt_file.as_deref(),
            _ => None,
        }
    }

    pub fn schema_file(&self) -> Option<&str> {
        match &self.kind {
            RuleKind::Generation { schema_file, .. } => schema_file.as_deref(),
            _ => None,
        }
    }

    /// Whether the rule's artifact is a schema-shaped JSON object.
    pub fn is_structured(&self) -> bool {
        matches!(self.kind, RuleKind::Generation { .. })
            && (self.settings.schema.is_some() || self.schema_file().is_some())
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.kind.as_str())
    }
}
