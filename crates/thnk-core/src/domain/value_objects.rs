//! Domain value objects: OutputMode, Dialect, NeedKind, Schema.
//!
//! These are pure value types with equality-by-value and no identity. Each
//! carries its string representation and, where the CLI or a parser needs it,
//! a `FromStr` parser.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── OutputMode ───────────────────────────────────────────────────────────────

/// Whether the backend is asked for free text or a schema-shaped object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    Text,
    Object,
}

impl OutputMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Dialect ──────────────────────────────────────────────────────────────────

/// Which declaration syntax a rule set came from.
///
/// The Makefile dialect is the strict legacy one: a schema is only allowed
/// on a target whose name ends in `.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Makefile,
    Structured,
}

impl Dialect {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Makefile => "makefile",
            Self::Structured => "structured",
        }
    }

    pub const fn requires_json_target_for_schema(&self) -> bool {
        matches!(self, Self::Makefile)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "makefile" | "make" => Ok(Self::Makefile),
            "structured" | "toml" => Ok(Self::Structured),
            other => Err(format!("unknown declaration dialect: {other}")),
        }
    }
}

// ── NeedKind ─────────────────────────────────────────────────────────────────

/// Classification of a need by its file name.
///
/// Schema, prompt and declaration files are "special": they steer how a
/// target is generated and are never inlined as input content. They still
/// take part in staleness checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NeedKind {
    Input,
    Schema,
    Prompt,
    Declaration,
}

impl NeedKind {
    /// Classify by the final path component, case-insensitively.
    ///
    /// A name matches a special kind when it *is* the suffix (`schema.json`)
    /// or ends with it after a dot (`user.schema.json`).
    pub fn classify(name: &str) -> Self {
        let file_name = Path::new(name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(name)
            .to_ascii_lowercase();

        let matches = |suffix: &str| {
            file_name == suffix
                || file_name
                    .strip_suffix(suffix)
                    .is_some_and(|head| head.ends_with('.'))
        };

        if matches("schema.json") {
            Self::Schema
        } else if matches("prompt.md") {
            Self::Prompt
        } else if matches("thnkfile") || matches("thnkfile.toml") {
            Self::Declaration
        } else {
            Self::Input
        }
    }

    pub const fn is_special(&self) -> bool {
        !matches!(self, Self::Input)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Schema => "schema.json",
            Self::Prompt => "prompt.md",
            Self::Declaration => "thnkfile",
        }
    }
}

// ── Schema ───────────────────────────────────────────────────────────────────

/// A JSON schema describing the object a structured target must hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema(Value);

impl Schema {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for Schema {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
