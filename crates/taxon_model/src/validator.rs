//! Field validators.
//!
//! [`NumberValidator`] enforces inclusive bounds for Integer, Long and
//! Double fields. [`StringValidator`] enforces a length range and a regular
//! expression; length is checked before the pattern.

use std::cmp::Ordering;
use std::fmt;

use regex::{Regex, RegexBuilder};
use taxon_foundation::{Bound, Error, ErrorKind, Result};

use crate::ast::{FieldValidator, LengthValidator, Literal, RegexValidator};

// =============================================================================
// Numbers
// =============================================================================

/// A numeric value or bound.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    /// Integer or Long.
    Integer(i64),
    /// Double.
    Double(f64),
}

impl Number {
    /// The value as a double.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Integer(i) => i as f64,
            Self::Double(d) => d,
        }
    }

    /// Compares two numbers, exactly for integers.
    #[must_use]
    pub fn compare(self, other: Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(&b)),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{i}"),
            Self::Double(d) => write!(f, "{d}"),
        }
    }
}

/// Inclusive bounds on a numeric field.
#[derive(Clone, Debug, PartialEq)]
pub struct NumberValidator {
    field: String,
    lower: Option<Number>,
    upper: Option<Number>,
}

impl NumberValidator {
    /// Creates a validator for `field`.
    ///
    /// # Errors
    ///
    /// Returns `IllegalModel` if both bounds are absent, if the lower bound
    /// exceeds the upper bound, or if `default` lies outside the bounds.
    pub fn new(
        field: impl Into<String>,
        lower: Option<Number>,
        upper: Option<Number>,
        default: Option<&Literal>,
    ) -> Result<Self> {
        let field = field.into();
        if lower.is_none() && upper.is_none() {
            return Err(Error::illegal_model(format!(
                "{field}: a range validator must specify a lower or an upper bound"
            )));
        }
        if let (Some(lo), Some(hi)) = (lower, upper) {
            if lo.compare(hi) == Some(Ordering::Greater) {
                return Err(Error::illegal_model(format!(
                    "{field}: lower bound {lo} must not exceed upper bound {hi}"
                )));
            }
        }
        let validator = Self {
            field,
            lower,
            upper,
        };
        if let Some(default) = default.and_then(literal_number) {
            validator.validate("default value", Some(default)).map_err(|e| {
                Error::illegal_model(format!(
                    "{}: default value {default} violates its validator: {e}",
                    validator.field
                ))
            })?;
        }
        Ok(validator)
    }

    /// Builds the validator for a numeric AST validator, if it is one.
    ///
    /// # Errors
    ///
    /// Propagates construction failures from [`NumberValidator::new`].
    pub fn from_ast(
        field: impl Into<String>,
        validator: &FieldValidator,
        default: Option<&Literal>,
    ) -> Result<Option<Self>> {
        let (lower, upper) = match validator {
            FieldValidator::IntegerDomain(d) | FieldValidator::LongDomain(d) => {
                (d.lower.map(Number::Integer), d.upper.map(Number::Integer))
            }
            FieldValidator::DoubleDomain(d) => {
                (d.lower.map(Number::Double), d.upper.map(Number::Double))
            }
            FieldValidator::StringRegex(_) => return Ok(None),
        };
        Self::new(field, lower, upper, default).map(Some)
    }

    /// The lower bound.
    #[must_use]
    pub const fn lower(&self) -> Option<Number> {
        self.lower
    }

    /// The upper bound.
    #[must_use]
    pub const fn upper(&self) -> Option<Number> {
        self.upper
    }

    /// Checks `lower <= value <= upper`; absent values always pass.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` naming the violated bound.
    pub fn validate(&self, id: &str, value: Option<Number>) -> Result<()> {
        let Some(value) = value else {
            return Ok(());
        };
        let violated = |limit: Number, bound: Bound| {
            Error::new(ErrorKind::OutOfRange {
                field: format!("{} ({id})", self.field),
                value: value.to_string(),
                bound,
                limit: limit.to_string(),
            })
        };
        if let Some(lower) = self.lower {
            if matches!(value.compare(lower), Some(Ordering::Less) | None) {
                return Err(violated(lower, Bound::Lower));
            }
        }
        if let Some(upper) = self.upper {
            if matches!(value.compare(upper), Some(Ordering::Greater) | None) {
                return Err(violated(upper, Bound::Upper));
            }
        }
        Ok(())
    }

    /// Returns true if every value accepted by `prior` is accepted by `self`.
    #[must_use]
    pub fn compatible_with(&self, prior: &Self) -> bool {
        let lower_ok = match (self.lower, prior.lower) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(new), Some(old)) => {
                matches!(new.compare(old), Some(Ordering::Less | Ordering::Equal))
            }
        };
        let upper_ok = match (self.upper, prior.upper) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(new), Some(old)) => {
                matches!(new.compare(old), Some(Ordering::Greater | Ordering::Equal))
            }
        };
        lower_ok && upper_ok
    }
}

fn literal_number(literal: &Literal) -> Option<Number> {
    match literal {
        Literal::Integer(i) => Some(Number::Integer(*i)),
        Literal::Double(d) => Some(Number::Double(*d)),
        Literal::Boolean(_) | Literal::String(_) => None,
    }
}

// =============================================================================
// Strings
// =============================================================================

#[derive(Clone, Debug)]
struct Pattern {
    source: String,
    flags: String,
    regex: Regex,
}

/// Pattern and length constraints on a string field.
#[derive(Clone, Debug)]
pub struct StringValidator {
    field: String,
    pattern: Option<Pattern>,
    min_length: Option<usize>,
    max_length: Option<usize>,
}

impl StringValidator {
    /// Creates a validator for `field`.
    ///
    /// # Errors
    ///
    /// Returns `IllegalModel` for an invalid pattern or flag, a length
    /// validator with neither bound, negative lengths, `minLength >
    /// maxLength`, or a default value violating either constraint.
    pub fn new(
        field: impl Into<String>,
        regex: Option<&RegexValidator>,
        length: Option<&LengthValidator>,
        default: Option<&str>,
    ) -> Result<Self> {
        let field = field.into();
        let pattern = regex.map(|r| compile(&field, r)).transpose()?;

        let (min_length, max_length) = match length {
            None => (None, None),
            Some(length) => {
                if length.min_length.is_none() && length.max_length.is_none() {
                    return Err(Error::illegal_model(format!(
                        "{field}: a length validator must specify minLength or maxLength"
                    )));
                }
                let min = length_bound(&field, "minLength", length.min_length)?;
                let max = length_bound(&field, "maxLength", length.max_length)?;
                if let (Some(min), Some(max)) = (min, max) {
                    if min > max {
                        return Err(Error::illegal_model(format!(
                            "{field}: minLength {min} must not exceed maxLength {max}"
                        )));
                    }
                }
                (min, max)
            }
        };

        if pattern.is_none() && min_length.is_none() && max_length.is_none() {
            return Err(Error::illegal_model(format!(
                "{field}: a string validator needs a pattern or a length range"
            )));
        }

        let validator = Self {
            field,
            pattern,
            min_length,
            max_length,
        };
        if let Some(default) = default {
            validator.validate("default value", Some(default)).map_err(|e| {
                Error::illegal_model(format!(
                    "{}: default value \"{default}\" violates its validator: {e}",
                    validator.field
                ))
            })?;
        }
        Ok(validator)
    }

    /// Builds the validator for a field's AST validators, if any apply.
    ///
    /// # Errors
    ///
    /// Propagates construction failures from [`StringValidator::new`].
    pub fn from_ast(
        field: impl Into<String>,
        validator: Option<&FieldValidator>,
        length: Option<&LengthValidator>,
        default: Option<&Literal>,
    ) -> Result<Option<Self>> {
        let regex = match validator {
            Some(FieldValidator::StringRegex(r)) => Some(r),
            _ => None,
        };
        if regex.is_none() && length.is_none() {
            return Ok(None);
        }
        let default = match default {
            Some(Literal::String(s)) => Some(s.as_str()),
            _ => None,
        };
        Self::new(field, regex, length, default).map(Some)
    }

    /// The pattern source, if any.
    #[must_use]
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_ref().map(|p| p.source.as_str())
    }

    /// Checks length first, then the pattern; absent values always pass.
    ///
    /// # Errors
    ///
    /// Returns `LengthOutOfRange` or `PatternMismatch`.
    pub fn validate(&self, id: &str, value: Option<&str>) -> Result<()> {
        let Some(value) = value else {
            return Ok(());
        };
        let field = || format!("{} ({id})", self.field);
        let length = value.chars().count();
        if let Some(min) = self.min_length {
            if length < min {
                return Err(Error::new(ErrorKind::LengthOutOfRange {
                    field: field(),
                    value: value.to_string(),
                    bound: Bound::Lower,
                    limit: min,
                }));
            }
        }
        if let Some(max) = self.max_length {
            if length > max {
                return Err(Error::new(ErrorKind::LengthOutOfRange {
                    field: field(),
                    value: value.to_string(),
                    bound: Bound::Upper,
                    limit: max,
                }));
            }
        }
        if let Some(pattern) = &self.pattern {
            if !pattern.regex.is_match(value) {
                return Err(Error::new(ErrorKind::PatternMismatch {
                    field: field(),
                    value: value.to_string(),
                    pattern: pattern.source.clone(),
                }));
            }
        }
        Ok(())
    }

    /// Returns true if every value accepted by `prior` is accepted by `self`.
    ///
    /// Patterns and flags must match exactly; length bounds may only widen.
    #[must_use]
    pub fn compatible_with(&self, prior: &Self) -> bool {
        let pattern_ok = match (&self.pattern, &prior.pattern) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(new), Some(old)) => new.source == old.source && new.flags == old.flags,
        };
        let min_ok = match (self.min_length, prior.min_length) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(new), Some(old)) => new <= old,
        };
        let max_ok = match (self.max_length, prior.max_length) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(new), Some(old)) => new >= old,
        };
        pattern_ok && min_ok && max_ok
    }
}

fn length_bound(field: &str, name: &str, value: Option<i64>) -> Result<Option<usize>> {
    value
        .map(|v| {
            usize::try_from(v).map_err(|_| {
                Error::illegal_model(format!("{field}: {name} must not be negative, got {v}"))
            })
        })
        .transpose()
}

fn compile(field: &str, validator: &RegexValidator) -> Result<Pattern> {
    let mut builder = RegexBuilder::new(&validator.pattern);
    for flag in validator.flags.chars() {
        match flag {
            'i' => {
                builder.case_insensitive(true);
            }
            'm' => {
                builder.multi_line(true);
            }
            's' => {
                builder.dot_matches_new_line(true);
            }
            'u' => {
                builder.unicode(true);
            }
            other => {
                return Err(Error::illegal_model(format!(
                    "{field}: unsupported regular expression flag '{other}'"
                )));
            }
        }
    }
    let regex = builder.build().map_err(|e| {
        Error::illegal_model(format!(
            "{field}: invalid regular expression /{}/: {e}",
            validator.pattern
        ))
    })?;
    Ok(Pattern {
        source: validator.pattern.clone(),
        flags: validator.flags.clone(),
        regex,
    })
}
