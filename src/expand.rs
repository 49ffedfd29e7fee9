//! Parameter expansion
//!
//! A sweep lists one or more generators. Each generator is a closed, named rule that yields
//! a finite sequence of values; nothing is evaluated as code. Generators are written either
//! as tagged objects (`{"type": "range", "count": 3, "start": 0.1, "step": 0.1}`) or in the
//! compact call form `rng(3, 0.1, 0.1)`.
//!
//! Expansion concatenates every generator's output, then deduplicates and sorts it when the
//! values are mutually orderable. Mixed or structured values are kept verbatim.

use crate::error::ExpandError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::cmp::Ordering;
use std::str::FromStr;
use tracing::{debug, warn};

const ROUND_DIGITS: i32 = 6;

/// Upper bound on the values a single generator may produce
pub const MAX_GENERATED: usize = 100_000;

/// A named value generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Generator {
    /// `start + i * step` for `i in 0..count`
    Range {
        count: usize,
        start: Number,
        step: Number,
    },
    /// Like `Range`, each value wrapped as `{key: value}`
    RangeObject {
        key: String,
        count: usize,
        start: Number,
        step: Number,
    },
    /// `start * ratio^i` for `i in 0..count`
    Geometric { count: usize, start: f64, ratio: f64 },
    /// Explicit values, verbatim
    List { values: Vec<Value> },
}

impl Generator {
    /// Build a generator from its manifest representation (call string, JSON array, or tagged object).
    pub fn from_value(value: &Value) -> Result<Self, ExpandError> {
        match value {
            Value::String(expr) => expr.parse(),
            Value::Array(values) => Ok(Generator::List {
                values: values.clone(),
            }),
            Value::Object(_) => {
                serde_json::from_value(value.clone()).map_err(|e| ExpandError::Malformed {
                    expr: value.to_string(),
                    reason: e.to_string(),
                })
            }
            other => Err(ExpandError::Malformed {
                expr: other.to_string(),
                reason: "expected a call string, a list, or a tagged object".to_string(),
            }),
        }
    }

    /// Short name used in diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            Generator::Range { .. } => "range",
            Generator::RangeObject { .. } => "range_object",
            Generator::Geometric { .. } => "geometric",
            Generator::List { .. } => "list",
        }
    }

    /// Produce this generator's values in order
    pub fn evaluate(&self) -> Result<Vec<Value>, ExpandError> {
        let count = match self {
            Generator::Range { count, .. }
            | Generator::RangeObject { count, .. }
            | Generator::Geometric { count, .. } => *count,
            Generator::List { values } => values.len(),
        };
        if count > MAX_GENERATED {
            return Err(ExpandError::TooManyValues {
                name: self.name().to_string(),
                count,
                max: MAX_GENERATED,
            });
        }
        match self {
            Generator::Range { count, start, step } => linear(self.name(), *count, start, step)
                .map(|numbers| numbers.into_iter().map(Value::Number).collect()),
            Generator::RangeObject {
                key,
                count,
                start,
                step,
            } => {
                let numbers = linear(self.name(), *count, start, step)?;
                Ok(numbers
                    .into_iter()
                    .map(|n| {
                        let mut map = Map::new();
                        map.insert(key.clone(), Value::Number(n));
                        Value::Object(map)
                    })
                    .collect())
            }
            Generator::Geometric {
                count,
                start,
                ratio,
            } => (0..*count)
                .map(|i| {
                    let value = round_to(start * ratio.powf(i as f64));
                    Number::from_f64(value)
                        .map(Value::Number)
                        .ok_or_else(|| ExpandError::NonFinite {
                            name: self.name().to_string(),
                            step: i,
                        })
                })
                .collect(),
            Generator::List { values } => Ok(values.clone()),
        }
    }
}

fn linear(
    name: &str,
    count: usize,
    start: &Number,
    step: &Number,
) -> Result<Vec<Number>, ExpandError> {
    if let (Some(start), Some(step)) = (start.as_i64(), step.as_i64()) {
        return (0..count)
            .map(|i| {
                i64::try_from(i)
                    .ok()
                    .and_then(|i| i.checked_mul(step))
                    .and_then(|offset| offset.checked_add(start))
                    .map(Number::from)
                    .ok_or_else(|| ExpandError::Overflow {
                        name: name.to_string(),
                        step: i,
                    })
            })
            .collect();
    }

    let (start, step) = match (start.as_f64(), step.as_f64()) {
        (Some(start), Some(step)) => (start, step),
        _ => {
            return Err(ExpandError::NonFinite {
                name: name.to_string(),
                step: 0,
            })
        }
    };
    (0..count)
        .map(|i| {
            Number::from_f64(round_to(start + i as f64 * step)).ok_or_else(|| {
                ExpandError::NonFinite {
                    name: name.to_string(),
                    step: i,
                }
            })
        })
        .collect()
}

fn round_to(value: f64) -> f64 {
    let scale = 10f64.powi(ROUND_DIGITS);
    let scaled = value * scale;
    if scaled.is_finite() {
        scaled.round() / scale
    } else {
        value
    }
}

impl FromStr for Generator {
    type Err = ExpandError;

    fn from_str(expr: &str) -> Result<Self, Self::Err> {
        let trimmed = expr.trim();
        if trimmed.starts_with('[') {
            let values: Vec<Value> =
                serde_json::from_str(trimmed).map_err(|e| ExpandError::Malformed {
                    expr: expr.to_string(),
                    reason: e.to_string(),
                })?;
            return Ok(Generator::List { values });
        }

        let (name, args) = parse_call(trimmed)?;
        match name {
            "rng" | "range" => {
                expect_arity(name, &args, 3)?;
                Ok(Generator::Range {
                    count: count_arg(name, &args, 0)?,
                    start: number_arg(name, &args, 1)?,
                    step: number_arg(name, &args, 2)?,
                })
            }
            "rngobj" | "range_object" => {
                expect_arity(name, &args, 4)?;
                Ok(Generator::RangeObject {
                    key: string_arg(name, &args, 0)?,
                    count: count_arg(name, &args, 1)?,
                    start: number_arg(name, &args, 2)?,
                    step: number_arg(name, &args, 3)?,
                })
            }
            "geo" | "geometric" => {
                expect_arity(name, &args, 3)?;
                Ok(Generator::Geometric {
                    count: count_arg(name, &args, 0)?,
                    start: float_arg(name, &args, 1)?,
                    ratio: float_arg(name, &args, 2)?,
                })
            }
            "list" => Ok(Generator::List { values: args }),
            other => Err(ExpandError::UnknownGenerator(other.to_string())),
        }
    }
}

/// Split `name(arg, ...)` into its name and literal arguments.
fn parse_call(expr: &str) -> Result<(&str, Vec<Value>), ExpandError> {
    let malformed = |reason: &str| ExpandError::Malformed {
        expr: expr.to_string(),
        reason: reason.to_string(),
    };

    let open = expr.find('(').ok_or_else(|| malformed("missing '('"))?;
    if !expr.ends_with(')') {
        return Err(malformed("missing closing ')'"));
    }
    let name = expr[..open].trim();
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(malformed("invalid generator name"));
    }
    let inner = expr[open + 1..expr.len() - 1].trim();
    if inner.is_empty() {
        return Ok((name, Vec::new()));
    }

    let mut args = Vec::new();
    for raw in split_args(inner).ok_or_else(|| malformed("unterminated string literal"))? {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(malformed("empty argument"));
        }
        args.push(parse_literal(raw).ok_or_else(|| malformed(&format!("bad literal '{}'", raw)))?);
    }
    Ok((name, args))
}

fn split_args(inner: &str) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (idx, c) in inner.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, ',') => {
                parts.push(&inner[start..idx]);
                start = idx + 1;
            }
            (None, _) => {}
        }
    }
    if quote.is_some() {
        return None;
    }
    parts.push(&inner[start..]);
    Some(parts)
}

fn parse_literal(raw: &str) -> Option<Value> {
    for q in ['\'', '"'] {
        if raw.len() >= 2 && raw.starts_with(q) && raw.ends_with(q) {
            let body = &raw[1..raw.len() - 1];
            if body.contains(q) {
                return None;
            }
            return Some(Value::String(body.to_string()));
        }
    }
    match raw {
        "true" | "True" => Some(Value::Bool(true)),
        "false" | "False" => Some(Value::Bool(false)),
        _ => serde_json::from_str::<Number>(raw).ok().map(Value::Number),
    }
}

fn expect_arity(name: &str, args: &[Value], expected: usize) -> Result<(), ExpandError> {
    if args.len() == expected {
        return Ok(());
    }
    Err(ExpandError::Arity {
        name: name.to_string(),
        expected,
        got: args.len(),
    })
}

fn count_arg(name: &str, args: &[Value], position: usize) -> Result<usize, ExpandError> {
    args[position]
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| ExpandError::ArgumentType {
            name: name.to_string(),
            position,
            expected: "a non-negative integer count",
        })
}

fn number_arg(name: &str, args: &[Value], position: usize) -> Result<Number, ExpandError> {
    match &args[position] {
        Value::Number(n) => Ok(n.clone()),
        _ => Err(ExpandError::ArgumentType {
            name: name.to_string(),
            position,
            expected: "a number",
        }),
    }
}

fn float_arg(name: &str, args: &[Value], position: usize) -> Result<f64, ExpandError> {
    args[position]
        .as_f64()
        .ok_or_else(|| ExpandError::ArgumentType {
            name: name.to_string(),
            position,
            expected: "a number",
        })
}

fn string_arg(name: &str, args: &[Value], position: usize) -> Result<String, ExpandError> {
    args[position]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ExpandError::ArgumentType {
            name: name.to_string(),
            position,
            expected: "a quoted string",
        })
}

/// Whether a combined value sequence admits a total order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueOrdering {
    Numeric,
    Text,
    Boolean,
    Unordered,
}

impl ValueOrdering {
    /// Decide the ordering capability before any sorting is attempted
    pub fn classify(values: &[Value]) -> Self {
        let mut kind: Option<ValueOrdering> = None;
        for value in values {
            let this = match value {
                Value::Number(_) => ValueOrdering::Numeric,
                Value::String(_) => ValueOrdering::Text,
                Value::Bool(_) => ValueOrdering::Boolean,
                _ => return ValueOrdering::Unordered,
            };
            match kind {
                None => kind = Some(this),
                Some(k) if k != this => return ValueOrdering::Unordered,
                Some(_) => {}
            }
        }
        kind.unwrap_or(ValueOrdering::Numeric)
    }

    pub fn is_ordered(self) -> bool {
        self != ValueOrdering::Unordered
    }

    /// Compare two values of this ordering's kind
    fn compare(self, a: &Value, b: &Value) -> Ordering {
        match (a, b) {
            (Value::Number(a), Value::Number(b)) => compare_numbers(a, b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

fn compare_numbers(a: &Number, b: &Number) -> Ordering {
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        return a.cmp(&b);
    }
    if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
        return a.cmp(&b);
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

/// Expanded, deduplicated parameter values for one sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    values: Vec<Value>,
    generated: Vec<Value>,
    duplicates: Vec<Value>,
    ordering: ValueOrdering,
}

impl ParameterSet {
    /// Final values, one per generated config
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Raw concatenated generator output before deduplication
    pub fn generated(&self) -> &[Value] {
        &self.generated
    }

    /// Values that appeared more than once in the generator output
    pub fn duplicates(&self) -> &[Value] {
        &self.duplicates
    }

    pub fn ordering(&self) -> ValueOrdering {
        self.ordering
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }
}

/// Evaluate every generator, concatenate, then deduplicate and sort when possible.
pub fn expand(generators: &[Generator]) -> Result<ParameterSet, ExpandError> {
    let mut generated = Vec::new();
    for generator in generators {
        let values = generator.evaluate()?;
        debug!(generator = generator.name(), count = values.len(), "Evaluated generator");
        generated.extend(values);
    }

    let ordering = ValueOrdering::classify(&generated);
    if !ordering.is_ordered() {
        let verbatim = Value::Array(generated.clone());
        warn!(
            values = %verbatim,
            "Could not uniquify/sort parameters, using generated order"
        );
        return Ok(ParameterSet {
            values: generated.clone(),
            generated,
            duplicates: Vec::new(),
            ordering,
        });
    }

    let mut sorted = generated.clone();
    sorted.sort_by(|a, b| ordering.compare(a, b));

    let mut values: Vec<Value> = Vec::with_capacity(sorted.len());
    let mut duplicates: Vec<Value> = Vec::new();
    for value in sorted {
        match values.last() {
            Some(last) if ordering.compare(last, &value) == Ordering::Equal => {
                let already_reported = duplicates
                    .last()
                    .map(|d| ordering.compare(d, &value) == Ordering::Equal)
                    .unwrap_or(false);
                if !already_reported {
                    duplicates.push(value);
                }
            }
            _ => values.push(value),
        }
    }

    if values.len() != generated.len() {
        let all = Value::Array(generated.clone());
        let unique = Value::Array(values.clone());
        let repeated = Value::Array(duplicates.clone());
        warn!(
            generated = %all,
            unique = %unique,
            duplicates = %repeated,
            "Some generated parameters overlap"
        );
    }

    Ok(ParameterSet {
        values,
        generated,
        duplicates,
        ordering,
    })
}
