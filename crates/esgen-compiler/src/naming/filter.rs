//! Naming filters: pure `&str → String` functions used for every identifier.

use std::fmt;
use std::sync::Arc;
use serde::{Deserialize, Serialize};

use super::case;

/// One step of a naming filter, as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterStep {
    /// Explicit passthrough.
    Identity,
    Pascal,
    Camel,
    Snake,
    UpperSnake,
    Kebab,
    Lowercase,
    Plural,
    Prefix(String),
    Suffix(String),
    Replace { from: String, to: String },
}

impl FilterStep {
    fn apply(&self, input: &str) -> String {
        match self {
            Self::Identity => input.to_string(),
            Self::Pascal => case::to_pascal_case(input),
            Self::Camel => case::to_camel_case(input),
            Self::Snake => case::to_snake_case(input),
            Self::UpperSnake => case::to_upper_snake_case(input),
            Self::Kebab => case::to_kebab_case(input),
            Self::Lowercase => input.to_lowercase(),
            Self::Plural => case::pluralize(input),
            Self::Prefix(prefix) => format!("{}{}", prefix, input),
            Self::Suffix(suffix) => format!("{}{}", input, suffix),
            Self::Replace { from, to } => input.replace(from.as_str(), to),
        }
    }
}

/// A filter as written in configuration: one step or a chain of steps.
///
/// ```toml
/// class_name = "pascal"
/// event_method = ["pascal", { prefix = "when" }]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterSpec {
    Step(FilterStep),
    Chain(Vec<FilterStep>),
}

impl FilterSpec {
    pub fn steps(&self) -> Vec<FilterStep> {
        match self {
            Self::Step(step) => vec![step.clone()],
            Self::Chain(steps) => steps.clone(),
        }
    }

    pub fn build(&self) -> Filter {
        Filter::from_steps(self.steps())
    }
}

/// A callable naming strategy.
#[derive(Clone)]
pub struct Filter {
    description: String,
    func: Arc<dyn Fn(&str) -> String + Send + Sync>,
}

impl Filter {
    /// Wraps an arbitrary function.
    pub fn new(description: impl Into<String>, func: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self {
            description: description.into(),
            func: Arc::new(func),
        }
    }

    pub fn identity() -> Self {
        Self::from_steps(vec![FilterStep::Identity])
    }

    pub fn from_steps(steps: Vec<FilterStep>) -> Self {
        let description = steps
            .iter()
            .map(|s| format!("{:?}", s))
            .collect::<Vec<_>>()
            .join(" | ");
        Self::new(description, move |input| {
            steps.iter().fold(input.to_string(), |acc, step| step.apply(&acc))
        })
    }

    /// Composes two filters: `self` first, then `next`.
    pub fn then(self, next: Filter) -> Self {
        let description = format!("{} | {}", self.description, next.description);
        Self::new(description, move |input| next.apply(&self.apply(input)))
    }

    pub fn apply(&self, input: &str) -> String {
        (self.func)(input)
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Filter({})", self.description)
    }
}
