//! Declaration parser adapters.
//!
//! Both dialects reduce their syntax to a
//! [`ThnkfileDeclaration`](thnk_core::domain::ThnkfileDeclaration). Text
//! values containing `{{` become template bindings closed over the injected
//! renderer; everything else stays literal.

mod makefile;
mod structured;

use std::path::Path;
use std::sync::Arc;

use thnk_core::{
    application::ports::{DeclarationParser, Filesystem, TemplateRenderer},
    domain::{Dialect, TemplateBinding, TextSource},
};

pub use makefile::MakefileParser;
pub use structured::TomlParser;

/// Default declaration file names, in lookup order.
pub const MAKEFILE_NAME: &str = "Thnkfile";
pub const TOML_NAME: &str = "Thnkfile.toml";

/// Guess the dialect from a declaration file name.
pub fn dialect_for(path: &Path) -> Dialect {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("toml") => Dialect::Structured,
        _ => Dialect::Makefile,
    }
}

/// Build the parser for `dialect`. Includes in the structured dialect are
/// resolved against `base_dir`.
pub fn parser_for(
    dialect: Dialect,
    renderer: Arc<dyn TemplateRenderer>,
    filesystem: Arc<dyn Filesystem>,
    base_dir: &Path,
) -> Box<dyn DeclarationParser> {
    match dialect {
        Dialect::Makefile => Box::new(MakefileParser::new(renderer)),
        Dialect::Structured => {
            Box::new(TomlParser::new(renderer, filesystem).with_base_dir(base_dir))
        }
    }
}

/// Plain text: templated when it contains a placeholder.
fn detect(text: String, renderer: &Arc<dyn TemplateRenderer>) -> TextSource {
    if text.contains("{{") {
        template(text, renderer)
    } else {
        TextSource::Literal(text)
    }
}

fn template(text: String, renderer: &Arc<dyn TemplateRenderer>) -> TextSource {
    TextSource::Template(TemplateBinding::new(text, Arc::clone(renderer)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialect_follows_extension() {
        assert_eq!(dialect_for(Path::new("Thnkfile")), Dialect::Makefile);
        assert_eq!(dialect_for(Path::new("docs/Thnkfile.toml")), Dialect::Structured);
        assert_eq!(dialect_for(Path::new("build.TOML")), Dialect::Structured);
    }
}
