//! System text composition.

/// Fixed instructions sent with every generation request.
pub const SYSTEM_PREAMBLE: &str = "You are a file generator. You get attached input files and \
instructions, and you generate the content of the output file, without any explanations - only \
output the pure file contents and nothing else, not even Markdown fences. Follow the \
instructions you get.";

/// An input file inlined into the system text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlinedInput {
    pub name: String,
    pub content: String,
}

impl InlinedInput {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Compose the system text for `target`. Inputs keep their order.
pub fn system_text(target: &str, inputs: &[InlinedInput]) -> String {
    let mut text = format!("{SYSTEM_PREAMBLE}\n\nYou need to generate {target}");
    if !inputs.is_empty() {
        text.push_str("\n\nThe content of the input files are: \n\n");
        let blocks: Vec<String> = inputs
            .iter()
            .map(|input| format!("{}:\n```\n{}\n```", input.name, input.content))
            .collect();
        text.push_str(&blocks.join("\n\n"));
    }
    text
}
