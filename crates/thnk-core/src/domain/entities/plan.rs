use crate::domain::entities::rule::Rule;

/// The ordered rules one request has to run, dependencies first.
///
/// Borrowed from the [`Thnkfile`](super::thnkfile::Thnkfile) it was planned
/// against and recomputed on every call; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan<'a> {
    target: String,
    steps: Vec<&'a Rule>,
}

impl<'a> Plan<'a> {
    pub fn new(target: impl Into<String>, steps: Vec<&'a Rule>) -> Self {
        Self {
            target: target.into(),
            steps,
        }
    }

    /// The requested target.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn steps(&self) -> &[&'a Rule] {
        &self.steps
    }

    pub fn names(&self) -> Vec<&'a str> {
        self.steps.iter().map(|rule| rule.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Nothing to do: the target is up to date.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl<'a, 'b> IntoIterator for &'b Plan<'a> {
    type Item = &'a Rule;
    type IntoIter = std::iter::Copied<std::slice::Iter<'b, &'a Rule>>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter().copied()
    }
}
