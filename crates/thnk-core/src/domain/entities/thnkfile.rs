//! The `Thnkfile` aggregate: every rule of one declaration file.

use indexmap::IndexMap;

use crate::domain::{
    entities::{declaration::ThnkfileDeclaration, rule::Rule, settings::Settings},
    error::DomainError,
    value_objects::Dialect,
};

/// An immutable, insertion-ordered set of rules plus the global scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Thnkfile {
    dialect: Dialect,
    settings: Settings,
    rules: IndexMap<String, Rule>,
}

impl Thnkfile {
    /// Construct and validate every rule. The first invalid rule aborts the
    /// whole build; nothing partial is returned.
    pub fn build(declaration: ThnkfileDeclaration) -> Result<Self, DomainError> {
        let ThnkfileDeclaration {
            dialect,
            defaults,
            targets,
        } = declaration;

        let mut rules = IndexMap::with_capacity(targets.len());
        for decl in &targets {
            if rules.contains_key(&decl.name) {
                return Err(DomainError::DuplicateTarget {
                    target: decl.name.clone(),
                });
            }
            let rule = Rule::from_declaration(decl, &defaults, dialect)?;
            rules.insert(decl.name.clone(), rule);
        }

        Ok(Self {
            dialect,
            settings: defaults,
            rules,
        })
    }

    /// The first declared target.
    pub fn default_target(&self) -> Result<&str, DomainError> {
        self.rules
            .keys()
            .next()
            .map(String::as_str)
            .ok_or(DomainError::NoRules)
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    /// Rules in declaration order.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// The file-scope defaults.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{declaration::TargetDeclaration, template::TextSource};

    fn generation(name: &str, needs: &[&str]) -> TargetDeclaration {
        TargetDeclaration::new(name)
            .with_needs(needs.iter().copied())
            .with_prompt(TextSource::literal(format!("make {name}")))
    }

    #[test]
    fn default_target_is_first_declared() {
        let thnkfile = Thnkfile::build(
            ThnkfileDeclaration::new(Dialect::Makefile)
                .with_target(generation("b.txt", &["a.txt"]))
                .with_target(generation("a.txt", &[])),
        )
        .unwrap();
        assert_eq!(thnkfile.default_target().unwrap(), "b.txt");
        let names: Vec<_> = thnkfile.rules().map(Rule::name).collect();
        assert_eq!(names, ["b.txt", "a.txt"]);
    }

    #[test]
    fn empty_thnkfile_has_no_default_target() {
        let thnkfile = Thnkfile::build(ThnkfileDeclaration::new(Dialect::Makefile)).unwrap();
        assert!(thnkfile.is_empty());
        assert_eq!(thnkfile.default_target().unwrap_err(), DomainError::NoRules);
    }

    #[test]
    fn duplicate_targets_are_rejected() {
        let err = Thnkfile::build(
            ThnkfileDeclaration::new(Dialect::Makefile)
                .with_target(generation("a.txt", &[]))
                .with_target(generation("a.txt", &[])),
        )
        .unwrap_err();
        assert_eq!(
            err,
            DomainError::DuplicateTarget {
                target: "a.txt".into()
            }
        );
    }

    #[test]
    fn defaults_reach_every_rule() {
        let thnkfile = Thnkfile::build(
            ThnkfileDeclaration::new(Dialect::Structured)
                .with_defaults(Settings::new().with_model("gpt-4o"))
                .with_target(generation("a.txt", &[])),
        )
        .unwrap();
        let rule = thnkfile.rule("a.txt").unwrap();
        assert_eq!(rule.settings().model_or_default(), "gpt-4o");
        assert_eq!(thnkfile.settings().model.as_deref(), Some("gpt-4o"));
    }

    #[test]
    fn first_invalid_rule_aborts() {
        let err = Thnkfile::build(
            ThnkfileDeclaration::new(Dialect::Makefile)
                .with_target(generation("ok.txt", &[]))
                .with_target(generation("bad.txt", &["x.prompt.md"])),
        )
        .unwrap_err();
        assert_eq!(err.target(), Some("bad.txt"));
    }
}
