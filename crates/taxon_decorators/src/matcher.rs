//! Wildcard matching of command targets.

/// A target filter: one value or a list of alternatives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Filter<'a> {
    /// Matches when the value is among the candidates.
    Value(&'a str),
    /// Matches when any listed value is among the candidates.
    List(&'a [String]),
}

impl<'a> Filter<'a> {
    /// A filter from an optional single value.
    #[must_use]
    pub fn value(value: Option<&'a String>) -> Option<Self> {
        value.map(|v| Self::Value(v))
    }

    /// A filter from an optional list.
    #[must_use]
    pub fn list(values: Option<&'a Vec<String>>) -> Option<Self> {
        values.map(|v| Self::List(v))
    }
}

/// True when `filter` is absent or empty text, when a value filter is one
/// of `candidates`, or when a list filter shares a value with `candidates`.
///
/// ```
/// use taxon_decorators::matcher::{Filter, falsy_or_equal};
///
/// assert!(falsy_or_equal(None, &["x"]));
/// assert!(!falsy_or_equal(Some(Filter::Value("x")), &["y"]));
/// let list = vec!["x".to_string(), "z".to_string()];
/// assert!(falsy_or_equal(Some(Filter::List(&list)), &["x", "y"]));
/// ```
#[must_use]
pub fn falsy_or_equal(filter: Option<Filter<'_>>, candidates: &[&str]) -> bool {
    match filter {
        None | Some(Filter::Value("")) => true,
        Some(Filter::Value(value)) => candidates.contains(&value),
        Some(Filter::List(values)) => values.iter().any(|v| candidates.contains(&v.as_str())),
    }
}
