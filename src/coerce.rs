//! Type coercion from elements to values.
//!
//! Each element is classified by its `type` attribute, or by its shape when
//! the attribute is absent or unrecognized, and converted bottom-up into a
//! [`Value`]. The first coercion failure aborts the walk.

use crate::config::ParserConfig;
use crate::error::{Error, Result};
use crate::temporal::{parse_date, parse_datetime};
use crate::tree::Element;
use crate::types::{ValueType, TYPE_ATTRIBUTE};
use crate::value::{Dictionary, Value};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::{debug, trace, warn};

/// Walks an element tree and produces values.
#[derive(Debug, Clone, Copy)]
pub struct Coercer<'c> {
    config: &'c ParserConfig,
}

impl<'c> Coercer<'c> {
    /// Creates a coercer using the given configuration.
    pub fn new(config: &'c ParserConfig) -> Self {
        Self { config }
    }

    /// Coerces the children of a document root into a dictionary.
    ///
    /// The root's own `type` attribute and text are not consulted.
    pub fn coerce_root(&self, root: &Element) -> Result<Dictionary> {
        self.coerce_dictionary(root)
    }

    /// Coerces a single element into a value.
    pub fn coerce_element(&self, element: &Element) -> Result<Value> {
        let value_type = classify(element);
        trace!(element = element.name(), %value_type, "coercing element");
        if !value_type.is_structural() && element.has_children() {
            debug!(
                element = element.name(),
                %value_type,
                children = element.children().len(),
                "scalar type declared on an element with children, children ignored"
            );
        }

        let value = match value_type {
            ValueType::String => Value::String(element.text().to_string()),
            ValueType::Decimal => Value::Decimal(coerce_decimal(element)?),
            ValueType::Integer => Value::Integer(coerce_integer(element)?),
            ValueType::Boolean => Value::Boolean(coerce_boolean(element.text())),
            ValueType::Date => match parse_date(element.text()) {
                Some(date) => Value::Date(date),
                None => {
                    return Err(coercion_failure(Error::invalid_date(
                        element.name(),
                        element.text(),
                    )))
                }
            },
            ValueType::DateTime => match parse_datetime(element.text()) {
                Some(dt) => Value::DateTime(dt),
                None => {
                    return Err(coercion_failure(Error::invalid_datetime(
                        element.name(),
                        element.text(),
                    )))
                }
            },
            ValueType::Array => Value::Array(self.coerce_array(element)?),
            ValueType::Dictionary => Value::Dictionary(self.coerce_dictionary(element)?),
        };

        Ok(value)
    }

    /// Coerces every child in document order, ignoring tag names.
    fn coerce_array(&self, element: &Element) -> Result<Vec<Value>> {
        element
            .children()
            .iter()
            .map(|child| self.coerce_element(child))
            .collect()
    }

    /// Coerces children into a mapping keyed by tag name.
    ///
    /// Names that occur more than once among the siblings become arrays, in
    /// document order, at the position of their first occurrence.
    fn coerce_dictionary(&self, element: &Element) -> Result<Dictionary> {
        let keyed: Vec<(String, &Element)> = element
            .children()
            .iter()
            .map(|child| (self.config.key_for(child.name()), child))
            .collect();

        // Counted per key, so undasherized names that collide fold together too.
        let mut occurrences: HashMap<&str, usize> = HashMap::with_capacity(keyed.len());
        for (key, _) in &keyed {
            *occurrences.entry(key.as_str()).or_insert(0) += 1;
        }

        let mut map = Dictionary::with_capacity(occurrences.len());
        for (key, child) in &keyed {
            let value = self.coerce_element(child)?;
            let count = occurrences.get(key.as_str()).copied().unwrap_or(1);

            if count > 1 {
                let slot = map
                    .entry(key.clone())
                    .or_insert_with(|| Value::Array(Vec::with_capacity(count)));
                if let Value::Array(items) = slot {
                    items.push(value);
                }
            } else {
                map.insert(key.clone(), value);
            }
        }

        Ok(map)
    }
}

/// Determines the type an element will be coerced as.
pub fn classify(element: &Element) -> ValueType {
    if let Some(declared) = element.attribute(TYPE_ATTRIBUTE) {
        match ValueType::from_attribute(declared) {
            Some(value_type) => return value_type,
            None => debug!(
                element = element.name(),
                declared, "unrecognized type attribute, inferring from content"
            ),
        }
    }

    if element.has_children() {
        ValueType::Dictionary
    } else {
        ValueType::String
    }
}

/// `"true"` and `"1"` are true; everything else is false.
#[inline]
pub fn coerce_boolean(text: &str) -> bool {
    matches!(text, "true" | "1")
}

fn coerce_decimal(element: &Element) -> Result<Decimal> {
    let text = element.text();
    parse_decimal(text)
        .ok_or_else(|| coercion_failure(Error::invalid_decimal(element.name(), text)))
}

/// Largest scale a `Decimal` can carry.
const MAX_DECIMAL_SCALE: i64 = 28;
/// Digits in the largest 96-bit mantissa.
const MAX_DECIMAL_DIGITS: usize = 29;

/// Parses `[sign] digits [. digits] [(e|E) [sign] digits]` exactly.
///
/// Returns `None` for anything else, and for values a `Decimal` cannot hold
/// without rounding.
fn parse_decimal(text: &str) -> Option<Decimal> {
    let (negative, unsigned) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    let (number, exponent) = match unsigned.find(['e', 'E']) {
        Some(at) => (&unsigned[..at], Some(&unsigned[at + 1..])),
        None => (unsigned, None),
    };
    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
        return None;
    }
    let exponent: i64 = match exponent {
        Some(exp) => {
            let magnitude = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            if magnitude.is_empty() || !all_digits(magnitude) {
                return None;
            }
            exp.parse().ok()?
        }
        None => 0,
    };

    let mut digits = format!("{whole}{fraction}");
    let mut scale = i64::try_from(fraction.len()).ok()?.checked_sub(exponent)?;
    if scale < 0 {
        let zeros = usize::try_from(scale.unsigned_abs()).ok()?;
        if digits.trim_start_matches('0').len().saturating_add(zeros) > MAX_DECIMAL_DIGITS {
            return None;
        }
        digits.extend(std::iter::repeat('0').take(zeros));
        scale = 0;
    }
    // Trailing zeros past the representable scale carry no value.
    while scale > MAX_DECIMAL_SCALE && digits.ends_with('0') {
        digits.pop();
        scale -= 1;
    }

    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return Decimal::try_from_i128_with_scale(0, scale.min(MAX_DECIMAL_SCALE) as u32).ok();
    }
    if significant.len() > MAX_DECIMAL_DIGITS || scale > MAX_DECIMAL_SCALE {
        return None;
    }

    let mantissa: i128 = significant.parse().ok()?;
    let mantissa = if negative { -mantissa } else { mantissa };
    Decimal::try_from_i128_with_scale(mantissa, u32::try_from(scale).ok()?).ok()
}

fn coerce_integer(element: &Element) -> Result<i64> {
    let text = element.text();
    text.parse::<i64>()
        .map_err(|_| coercion_failure(Error::invalid_integer(element.name(), text)))
}

fn coercion_failure(err: Error) -> Error {
    warn!(error = %err, "coercion failed");
    err
}
