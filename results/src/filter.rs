use std::ops::Not;

use crate::{Field, ResultRow, Value};

/// Row selection over categorical columns
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Eq(Field, Value),
    In(Field, Vec<Value>),
    Contains(Field, String),
    EndsWith(Field, String),
    IsNull(Field),
    /// Row carries a score error, percentile rows do not
    HasError,
    Not(Box<Predicate>),
    All(Vec<Predicate>),
    Any(Vec<Predicate>),
}

impl Predicate {
    pub fn eq(field: Field, value: impl Into<Value>) -> Self {
        Predicate::Eq(field, value.into())
    }

    pub fn is_in<V: Into<Value>>(field: Field, values: impl IntoIterator<Item = V>) -> Self {
        Predicate::In(field, values.into_iter().map(Into::into).collect())
    }

    pub fn contains(field: Field, needle: impl Into<String>) -> Self {
        Predicate::Contains(field, needle.into())
    }

    pub fn ends_with(field: Field, suffix: impl Into<String>) -> Self {
        Predicate::EndsWith(field, suffix.into())
    }

    pub fn is_null(field: Field) -> Self {
        Predicate::IsNull(field)
    }

    pub fn and(self, other: Predicate) -> Self {
        match self {
            Predicate::All(mut all) => {
                all.push(other);
                Predicate::All(all)
            }
            first => Predicate::All(vec![first, other]),
        }
    }

    pub fn or(self, other: Predicate) -> Self {
        match self {
            Predicate::Any(mut any) => {
                any.push(other);
                Predicate::Any(any)
            }
            first => Predicate::Any(vec![first, other]),
        }
    }

    pub fn matches(&self, row: &ResultRow) -> bool {
        match self {
            Predicate::Eq(field, value) => field.value(row).as_ref() == Some(value),
            Predicate::In(field, values) => field.value(row).is_some_and(|v| values.contains(&v)),
            Predicate::Contains(field, needle) => {
                field.value(row).is_some_and(|v| v.to_string().contains(needle.as_str()))
            }
            Predicate::EndsWith(field, suffix) => {
                field.value(row).is_some_and(|v| v.to_string().ends_with(suffix.as_str()))
            }
            Predicate::IsNull(field) => field.value(row).is_none(),
            Predicate::HasError => row.score_error.is_some(),
            Predicate::Not(inner) => !inner.matches(row),
            Predicate::All(all) => all.iter().all(|p| p.matches(row)),
            Predicate::Any(any) => any.iter().any(|p| p.matches(row)),
        }
    }
}

impl Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Self::Output {
        match self {
            Predicate::Not(inner) => *inner,
            other => Predicate::Not(Box::new(other)),
        }
    }
}
