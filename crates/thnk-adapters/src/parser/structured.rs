//! Structured (TOML) dialect.
//!
//! # `Thnkfile.toml` format
//!
//! ```toml
//! [defaults]                    # file-scope settings, lowest precedence
//! model       = "gpt-4o-mini"
//! temperature = 0.2
//! data        = { audience = "engineers" }
//!
//! [targets."summary.json"]
//! needs  = ["notes.txt"]
//! prompt = "Summarise the notes for {{ audience }}"
//! schema = { type = "object", properties = { title = { type = "string" } } }
//!
//! [targets."banner.txt"]
//! content = { file = "banner.tpl" }     # written as-is, no backend call
//!
//! [targets.docs]                        # a group: settings cascade down
//! prompt = { template_file = "docs.prompt.tpl" }
//!
//! [targets.docs.targets."docs/intro.md"]
//! needs = ["README.md"]
//! ```
//!
//! Text fields (`prompt`, `content`) accept a plain string (templated when it
//! contains `{{`) or one of `{ literal = … }`, `{ template = … }`,
//! `{ file = … }`, `{ template_file = … }`. Files are read relative to the
//! document's directory. A `schema` table is an inline JSON schema; a
//! `schema` string names a JSON file to include.

use std::path::PathBuf;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use thnk_core::{
    application::{
        ApplicationError,
        ports::{DeclarationParser, Filesystem, TemplateRenderer},
    },
    domain::{Bindings, Dialect, Schema, Settings, TargetDeclaration, TextSource, ThnkfileDeclaration},
    error::{ThnkError, ThnkResult},
};
use tracing::{debug, instrument};

use super::{detect, template};

// ── Document types ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Document {
    #[serde(default)]
    defaults: ScopeEntry,
    #[serde(default)]
    targets: IndexMap<String, TargetEntry>,
}

/// `[defaults]`: settings without target-only keys.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScopeEntry {
    prompt: Option<TextValue>,
    schema: Option<SchemaValue>,
    model: Option<String>,
    temperature: Option<f32>,
    #[serde(default)]
    data: Bindings,
}

/// `[targets.<name>]`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TargetEntry {
    #[serde(default)]
    needs: Vec<String>,
    prompt: Option<TextValue>,
    content: Option<TextValue>,
    schema: Option<SchemaValue>,
    model: Option<String>,
    temperature: Option<f32>,
    #[serde(default)]
    data: Bindings,
    /// Present on groups only.
    targets: Option<IndexMap<String, TargetEntry>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextValue {
    Plain(String),
    Tagged(TaggedText),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum TaggedText {
    Literal(String),
    Template(String),
    File(String),
    TemplateFile(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SchemaValue {
    Include(String),
    Inline(Value),
}

// ── Parser ───────────────────────────────────────────────────────────────────

/// Parser for `Thnkfile.toml`.
pub struct TomlParser {
    renderer: Arc<dyn TemplateRenderer>,
    filesystem: Arc<dyn Filesystem>,
    base_dir: PathBuf,
}

impl TomlParser {
    pub fn new(renderer: Arc<dyn TemplateRenderer>, filesystem: Arc<dyn Filesystem>) -> Self {
        Self {
            renderer,
            filesystem,
            base_dir: PathBuf::new(),
        }
    }

    /// Directory that `file` / `template_file` / schema includes resolve against.
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    fn include(&self, path: &str) -> ThnkResult<String> {
        self.filesystem.read_to_string(&self.base_dir.join(path))
    }

    fn text(&self, value: TextValue) -> ThnkResult<TextSource> {
        Ok(match value {
            TextValue::Plain(text) => detect(text, &self.renderer),
            TextValue::Tagged(TaggedText::Literal(text)) => TextSource::Literal(text),
            TextValue::Tagged(TaggedText::Template(text)) => template(text, &self.renderer),
            TextValue::Tagged(TaggedText::File(path)) => TextSource::Literal(self.include(&path)?),
            TextValue::Tagged(TaggedText::TemplateFile(path)) => {
                template(self.include(&path)?, &self.renderer)
            }
        })
    }

    fn schema(&self, value: SchemaValue, source: &str, owner: &str) -> ThnkResult<Schema> {
        let value = match value {
            SchemaValue::Inline(value) => value,
            SchemaValue::Include(path) => {
                let raw = self.include(&path)?;
                serde_json::from_str(&raw).map_err(|e| {
                    located(source, owner, format!("schema file {path} is not valid JSON: {e}"))
                })?
            }
        };
        if !value.is_object() {
            return Err(located(source, owner, "schema must be a table or a file name"));
        }
        Ok(Schema::new(value))
    }

    fn scope(&self, entry: ScopeEntry, source: &str, owner: &str) -> ThnkResult<Settings> {
        Ok(Settings {
            prompt: entry.prompt.map(|p| self.text(p)).transpose()?,
            schema: entry
                .schema
                .map(|s| self.schema(s, source, owner))
                .transpose()?,
            model: entry.model,
            temperature: entry.temperature,
            data: entry.data,
        })
    }

    /// Flatten one entry (and, for groups, its children) into `out`.
    fn flatten(
        &self,
        name: String,
        entry: TargetEntry,
        inherited: &[Settings],
        source: &str,
        out: &mut Vec<TargetDeclaration>,
    ) -> ThnkResult<()> {
        let TargetEntry {
            mut needs,
            prompt,
            content,
            schema,
            model,
            temperature,
            data,
            targets,
        } = entry;

        let scope = ScopeEntry {
            prompt,
            schema,
            model,
            temperature,
            data,
        };
        let settings = self.scope(scope, source, &name)?;
        let content = content.map(|c| self.text(c)).transpose()?;

        let mut decl = TargetDeclaration {
            name: name.clone(),
            needs: Vec::new(),
            inherited: inherited.to_vec(),
            settings: settings.clone(),
            content,
            group: false,
        };

        let Some(children) = targets else {
            decl.needs = needs;
            out.push(decl);
            return Ok(());
        };

        if decl.content.is_some() {
            return Err(located(source, &name, "a group cannot have content"));
        }
        needs.extend(children.keys().cloned());
        decl.needs = needs;
        decl.group = true;
        out.push(decl);

        let mut scopes = inherited.to_vec();
        scopes.push(settings);
        for (child, entry) in children {
            self.flatten(child, entry, &scopes, source, out)?;
        }
        Ok(())
    }
}

impl DeclarationParser for TomlParser {
    #[instrument(skip_all, fields(len = source.len(), base = %self.base_dir.display()))]
    fn parse(&self, source: &str) -> ThnkResult<ThnkfileDeclaration> {
        let document: Document = toml::from_str(source).map_err(|e| {
            let line = e
                .span()
                .map(|span| line_at(source, span.start))
                .unwrap_or(1);
            ApplicationError::DeclarationSyntax {
                line,
                message: e.message().trim().to_string(),
            }
        })?;

        let defaults = self.scope(document.defaults, source, "defaults")?;

        let mut targets = Vec::new();
        for (name, entry) in document.targets {
            self.flatten(name, entry, &[], source, &mut targets)?;
        }

        debug!(targets = targets.len(), "Parsed Thnkfile.toml");
        Ok(ThnkfileDeclaration {
            dialect: Dialect::Structured,
            defaults,
            targets,
        })
    }
}

fn line_at(source: &str, offset: usize) -> usize {
    source
        .get(..offset)
        .map_or(1, |head| head.matches('\n').count() + 1)
}

/// A syntax error placed on the first line mentioning `owner`.
fn located(source: &str, owner: &str, message: impl Into<String>) -> ThnkError {
    let line = source
        .lines()
        .position(|l| l.contains(owner))
        .map_or(1, |i| i + 1);
    ApplicationError::DeclarationSyntax {
        line,
        message: format!("{owner}: {}", message.into()),
    }
    .into()
}
