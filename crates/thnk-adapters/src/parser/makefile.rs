//! Makefile-like dialect.
//!
//! ```text
//! # comment
//! summary.json: notes.txt summary.schema.json
//!     Summarise the notes.
//!     Keep it short.
//!
//! all: summary.json
//! ```
//!
//! Indented lines are the recipe of the rule above them and become its
//! inline prompt. Any leading whitespace counts as indentation.

use std::sync::Arc;

use thnk_core::{
    application::{
        ApplicationError,
        ports::{DeclarationParser, TemplateRenderer},
    },
    domain::{Dialect, TargetDeclaration, ThnkfileDeclaration},
    error::ThnkResult,
};
use tracing::{debug, instrument};

use super::detect;

/// Parser for `Thnkfile`.
pub struct MakefileParser {
    renderer: Arc<dyn TemplateRenderer>,
}

struct PendingRule {
    name: String,
    needs: Vec<String>,
    recipe: Vec<String>,
}

impl MakefileParser {
    pub fn new(renderer: Arc<dyn TemplateRenderer>) -> Self {
        Self { renderer }
    }

    fn finish(&self, rule: PendingRule) -> TargetDeclaration {
        let recipe = rule.recipe.join("\n");
        let recipe = recipe.trim();
        let decl = TargetDeclaration::new(rule.name).with_needs(rule.needs);
        if recipe.is_empty() {
            decl
        } else {
            decl.with_prompt(detect(recipe.to_string(), &self.renderer))
        }
    }
}

impl DeclarationParser for MakefileParser {
    #[instrument(skip_all, fields(len = source.len()))]
    fn parse(&self, source: &str) -> ThnkResult<ThnkfileDeclaration> {
        let source = source.replace("\r\n", "\n");
        let mut declaration = ThnkfileDeclaration::new(Dialect::Makefile);
        let mut current: Option<PendingRule> = None;

        for (index, line) in source.lines().enumerate() {
            let line_no = index + 1;

            if line.starts_with([' ', '\t']) {
                let text = line.trim_start();
                match current.as_mut() {
                    Some(rule) => rule.recipe.push(text.to_string()),
                    None if text.is_empty() || text.starts_with('#') => {}
                    None => return Err(syntax(line_no, "recipe commences before first target")),
                }
                continue;
            }

            if line.is_empty() || line.starts_with('#') {
                // A blank line inside a recipe is kept; trailing ones are trimmed.
                if let Some(rule) = current.as_mut().filter(|_| line.is_empty()) {
                    rule.recipe.push(String::new());
                }
                continue;
            }

            let header = line.split('#').next().unwrap_or_default();
            let Some((targets, needs)) = header.split_once(':') else {
                return Err(syntax(line_no, "expected 'target: needs'"));
            };
            if needs.starts_with(':') {
                return Err(syntax(line_no, "double-colon rules are not supported"));
            }
            let mut names = targets.split_whitespace();
            let Some(name) = names.next() else {
                return Err(syntax(line_no, "missing target name"));
            };
            if names.next().is_some() {
                return Err(syntax(line_no, "only one target per rule is supported"));
            }

            if let Some(done) = current.take() {
                declaration = declaration.with_target(self.finish(done));
            }
            current = Some(PendingRule {
                name: name.to_string(),
                needs: needs.split_whitespace().map(str::to_string).collect(),
                recipe: Vec::new(),
            });
        }

        if let Some(done) = current.take() {
            declaration = declaration.with_target(self.finish(done));
        }

        debug!(targets = declaration.targets.len(), "Parsed Thnkfile");
        Ok(declaration)
    }
}

fn syntax(line: usize, message: &str) -> thnk_core::error::ThnkError {
    ApplicationError::DeclarationSyntax {
        line,
        message: message.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::SimpleRenderer;
    use thnk_core::domain::TextSource;

    fn parse(source: &str) -> ThnkResult<ThnkfileDeclaration> {
        MakefileParser::new(Arc::new(SimpleRenderer::new())).parse(source)
    }

    #[test]
    fn headers_and_recipes() {
        let decl = parse(
            "# Demo\r\noutput.txt: file1.txt file2.txt\r\n    Combine the files.\r\n\tKeep order.\r\n\r\nall: output.txt\r\n",
        )
        .unwrap();
        assert_eq!(decl.dialect, Dialect::Makefile);
        assert_eq!(decl.targets.len(), 2);

        let output = &decl.targets[0];
        assert_eq!(output.name, "output.txt");
        assert_eq!(output.needs, ["file1.txt", "file2.txt"]);
        assert_eq!(
            output.settings.prompt,
            Some(TextSource::literal("Combine the files.\nKeep order."))
        );

        let all = &decl.targets[1];
        assert!(all.needs == ["output.txt"] && all.settings.prompt.is_none());
    }

    #[test]
    fn placeholder_recipe_becomes_template() {
        let decl = parse("greeting:\n\tSay hi to {{name}}\n").unwrap();
        let prompt = decl.targets[0].settings.prompt.as_ref().unwrap();
        assert!(prompt.is_template());
        assert_eq!(prompt.raw(), "Say hi to {{name}}");
    }

    #[test]
    fn recipe_before_target_is_an_error() {
        let err = parse("\n  orphan recipe\nout.txt:\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Thnkfile syntax error on line 2: recipe commences before first target"
        );
    }

    #[test]
    fn empty_target_name_is_an_error() {
        let err = parse("out.txt:\n\tx\n: in.txt\n").unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn line_without_colon_is_an_error() {
        assert!(parse("just words\n").is_err());
    }

    #[test]
    fn double_colon_header_is_an_error() {
        let err = parse("a.txt::\n\tx\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Thnkfile syntax error on line 1: double-colon rules are not supported"
        );
    }

    #[test]
    fn header_comments_are_stripped() {
        let decl = parse("out.txt: in.txt # the input\n\tGo\n").unwrap();
        assert_eq!(decl.targets[0].needs, ["in.txt"]);
    }

    #[test]
    fn empty_source_has_no_targets() {
        assert!(parse("# nothing here\n\n").unwrap().targets.is_empty());
    }
}
