//! The fixed record shape every declaration parser produces.
//!
//! Concrete syntaxes (the Makefile-like dialect, the structured TOML
//! document) are reduced to these records by adapters; the core never looks
//! at raw declaration text.

use crate::domain::{
    entities::{settings::Settings, template::TextSource},
    value_objects::Dialect,
};

/// A whole parsed declaration file.
#[derive(Debug, Clone, PartialEq)]
pub struct ThnkfileDeclaration {
    pub dialect: Dialect,
    /// File-scope defaults: the global settings scope.
    pub defaults: Settings,
    /// Targets in declaration order.
    pub targets: Vec<TargetDeclaration>,
}

impl ThnkfileDeclaration {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            defaults: Settings::default(),
            targets: Vec::new(),
        }
    }

    pub fn with_defaults(mut self, defaults: Settings) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_target(mut self, target: TargetDeclaration) -> Self {
        self.targets.push(target);
        self
    }
}

/// One declared target.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetDeclaration {
    pub name: String,
    pub needs: Vec<String>,
    /// Scopes inherited from enclosing groups, outermost first.
    pub inherited: Vec<Settings>,
    /// The target's own scope.
    pub settings: Settings,
    /// Literal or templated content; makes this a content rule.
    pub content: Option<TextSource>,
    /// Declared as a group of nested targets; always a no-op rule.
    pub group: bool,
}

impl TargetDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            needs: Vec::new(),
            inherited: Vec::new(),
            settings: Settings::default(),
            content: None,
            group: false,
        }
    }

    pub fn with_needs<I, S>(mut self, needs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.needs.extend(needs.into_iter().map(Into::into));
        self
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_prompt(mut self, prompt: TextSource) -> Self {
        self.settings.prompt = Some(prompt);
        self
    }

    pub fn with_content(mut self, content: TextSource) -> Self {
        self.content = Some(content);
        self
    }

    pub fn inheriting(mut self, scope: Settings) -> Self {
        self.inherited.push(scope);
        self
    }

    pub fn as_group(mut self) -> Self {
        self.group = true;
        self
    }
}
