//! Settings and the scope cascade.
//!
//! A [`Settings`] value is one configuration scope. Every scalar field is
//! optional so that "not set here" is distinguishable from any concrete
//! value; [`Settings::merge`] folds scopes left to right (global, groups,
//! declared, runtime) with later scopes winning per field. `data` is the
//! exception: it is a shallow key union where later scopes win per key.

use crate::domain::{
    entities::template::{Bindings, TextSource},
    error::DomainError,
    value_objects::Schema,
};

/// Model used when no scope names one.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Sampling temperature used when no scope sets one.
pub const DEFAULT_TEMPERATURE: f32 = 0.0;

/// Inclusive range accepted for `temperature`.
pub const TEMPERATURE_RANGE: std::ops::RangeInclusive<f32> = 0.0..=2.0;

/// One configuration scope.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub prompt: Option<TextSource>,
    pub schema: Option<Schema>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub data: Bindings,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prompt(mut self, prompt: TextSource) -> Self {
        self.prompt = Some(prompt);
        self
    }

    pub fn with_schema(mut self, schema: impl Into<Schema>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Fold `scopes` left to right into a new value. Inputs are untouched.
    pub fn merge<'a>(scopes: impl IntoIterator<Item = &'a Settings>) -> Settings {
        scopes
            .into_iter()
            .fold(Settings::default(), |acc, scope| acc.overlaid_with(scope))
    }

    /// `self` with every field that `over` sets replaced by `over`'s value.
    pub fn overlaid_with(&self, over: &Settings) -> Settings {
        let mut data = self.data.clone();
        for (key, value) in &over.data {
            data.insert(key.clone(), value.clone());
        }

        Settings {
            prompt: over.prompt.clone().or_else(|| self.prompt.clone()),
            schema: over.schema.clone().or_else(|| self.schema.clone()),
            model: over.model.clone().or_else(|| self.model.clone()),
            temperature: over.temperature.or(self.temperature),
            data,
        }
    }

    pub fn model_or_default(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn temperature_or_default(&self) -> f32 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    /// Check field shapes, attributing failures to `target`.
    pub fn validate(&self, target: &str) -> Result<(), DomainError> {
        if let Some(t) = self.temperature {
            if !TEMPERATURE_RANGE.contains(&t) {
                return Err(DomainError::InvalidSettings {
                    target: target.to_string(),
                    reason: format!("temperature {t} is outside 0..=2"),
                });
            }
        }
        if let Some(model) = &self.model {
            if model.trim().is_empty() {
                return Err(DomainError::InvalidSettings {
                    target: target.to_string(),
                    reason: "model name is empty".into(),
                });
            }
        }
        Ok(())
    }
}
