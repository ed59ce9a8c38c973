pub mod declaration;
pub mod generation;
pub mod plan;
pub mod rule;
pub mod settings;
pub mod template;
pub mod thnkfile;

pub use crate::domain::DomainError;
pub use declaration::{TargetDeclaration, ThnkfileDeclaration};
pub use generation::{Generation, GenerationEvent, GenerationOutput, GenerationRequest};
pub use plan::Plan;
pub use rule::{Rule, RuleKind};
pub use settings::Settings;
pub use template::{Bindings, TemplateBinding, TextSource};
pub use thnkfile::Thnkfile;
