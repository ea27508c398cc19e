//! The default function set: `NUMBER`, `DATETIME` and the `LIST` reducer.
//!
//! These are deliberately minimal implementations: plain decimal rendering
//! with `minimumFractionDigits`, ISO-8601 dates, concatenating list
//! reduction. Full CLDR-grade formatting belongs to replacement factories
//! registered by the host; plural selection, however, is real and backed
//! by CLDR rules via `intl_pluralrules`.

use std::fmt;
use std::sync::Arc;

use intl_pluralrules::operands::PluralOperands;
use intl_pluralrules::{PluralCategory, PluralRuleType, PluralRules};
use unic_langid::LanguageIdentifier;

use crate::errors::FunctionError;
use crate::options::Options;
use crate::registry::{
    FluentFunction, FunctionFactory, Selector, TerminalReducer, Transform, ValueFormatter,
};
use crate::scope::Scope;
use crate::value::{FluentNumber, FluentTemporal, FluentValue};
use ftl_par::ast::{SelectExpression, VariantKey};

// ============================================================================
// NUMBER
// ============================================================================

/// Factory for the implicit and explicit `NUMBER` function.
#[derive(Debug)]
pub struct NumberFactory;

impl FunctionFactory for NumberFactory {
    fn name(&self) -> &'static str {
        "NUMBER"
    }

    fn create(
        &self,
        locale: &LanguageIdentifier,
        options: &Options,
    ) -> Result<Arc<dyn FluentFunction>, FunctionError> {
        Ok(Arc::new(NumberFunction {
            minimum_fraction_digits: options.get_usize("minimumFractionDigits"),
            maximum_fraction_digits: options.get_usize("maximumFractionDigits"),
            minimum_integer_digits: options.get_usize("minimumIntegerDigits"),
            use_grouping: options
                .get("useGrouping")
                .map(|v| v.as_str() == "true")
                .unwrap_or(false),
            rules: PluralRules::create(locale.clone(), PluralRuleType::CARDINAL).ok(),
        }))
    }
}

struct NumberFunction {
    minimum_fraction_digits: Option<usize>,
    maximum_fraction_digits: Option<usize>,
    minimum_integer_digits: Option<usize>,
    use_grouping: bool,
    /// Cardinal rules for the bundle locale; absent when the locale has no
    /// CLDR data, in which case selection falls through to the default
    /// variant.
    rules: Option<PluralRules>,
}

impl fmt::Debug for NumberFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NumberFunction")
            .field("minimum_fraction_digits", &self.minimum_fraction_digits)
            .field("maximum_fraction_digits", &self.maximum_fraction_digits)
            .field("minimum_integer_digits", &self.minimum_integer_digits)
            .field("use_grouping", &self.use_grouping)
            .field("rules", &self.rules.is_some())
            .finish()
    }
}

impl NumberFunction {
    /// Digit-level rendering: rounding and fraction padding, no grouping.
    /// This is also the form plural categorization sees, since the CLDR
    /// operands depend on the visible fraction digits.
    fn render_digits(&self, n: FluentNumber) -> String {
        let base = match (n, self.maximum_fraction_digits) {
            (FluentNumber::Float(f), Some(max)) => round_fraction(f, max),
            _ => n.to_plain_string(),
        };
        match self.minimum_fraction_digits {
            Some(min) => pad_fraction(base, min),
            None => base,
        }
    }

    /// Full display rendering on top of [`NumberFunction::render_digits`]:
    /// integer-digit padding and grouping separators.
    fn render(&self, n: FluentNumber) -> String {
        let mut text = self.render_digits(n);
        if let Some(min) = self.minimum_integer_digits {
            text = pad_integer(text, min);
        }
        if self.use_grouping {
            text = group_integer(text);
        }
        text
    }

    fn category_name(category: PluralCategory) -> &'static str {
        match category {
            PluralCategory::ZERO => "zero",
            PluralCategory::ONE => "one",
            PluralCategory::TWO => "two",
            PluralCategory::FEW => "few",
            PluralCategory::MANY => "many",
            PluralCategory::OTHER => "other",
        }
    }
}

/// Pads the fraction part with zeros up to `min` digits; never truncates.
fn pad_fraction(mut text: String, min: usize) -> String {
    let fraction = match text.find('.') {
        Some(dot) => text.len() - dot - 1,
        None => {
            if min > 0 {
                text.push('.');
            }
            0
        }
    };
    for _ in fraction..min {
        text.push('0');
    }
    text
}

/// Rounds to at most `max` fraction digits without adding any: the padded
/// zeros `{:.N}` produces are trimmed back off.
fn round_fraction(f: f64, max: usize) -> String {
    let mut text = format!("{f:.max$}");
    if text.contains('.') {
        while text.ends_with('0') {
            text.pop();
        }
        if text.ends_with('.') {
            text.pop();
        }
    }
    text
}

/// Left-pads the integer part with zeros up to `min` digits, keeping the
/// sign in front.
fn pad_integer(text: String, min: usize) -> String {
    let (sign, rest) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let integer_len = rest.find('.').unwrap_or(rest.len());
    if integer_len >= min {
        return text;
    }
    format!("{sign}{}{rest}", "0".repeat(min - integer_len))
}

/// Inserts `,` separators every three integer digits.
fn group_integer(text: String) -> String {
    let (sign, rest) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (integer, tail) = match rest.find('.') {
        Some(dot) => rest.split_at(dot),
        None => (rest, ""),
    };
    if integer.len() <= 3 {
        return text;
    }
    let mut grouped = String::with_capacity(text.len() + integer.len() / 3);
    grouped.push_str(sign);
    let lead = integer.len() % 3;
    if lead > 0 {
        grouped.push_str(&integer[..lead]);
    }
    for (i, chunk) in integer.as_bytes()[lead..].chunks(3).enumerate() {
        if i > 0 || lead > 0 {
            grouped.push(',');
        }
        grouped.push_str(std::str::from_utf8(chunk).unwrap_or(""));
    }
    grouped.push_str(tail);
    grouped
}

impl FluentFunction for NumberFunction {
    fn as_transform(&self) -> Option<&dyn Transform> {
        Some(self)
    }
    fn as_formatter(&self) -> Option<&dyn ValueFormatter> {
        Some(self)
    }
    fn as_selector(&self) -> Option<&dyn Selector> {
        Some(self)
    }
}

impl Transform for NumberFunction {
    fn apply(
        &self,
        args: &[FluentValue],
        _scope: &mut Scope,
    ) -> Result<Vec<FluentValue>, FunctionError> {
        match args {
            [FluentValue::Number(n)] => Ok(vec![FluentValue::Str(self.render(*n))]),
            [FluentValue::Str(s)] => {
                let parsed: f64 = s.parse().map_err(|_| {
                    FunctionError::InvalidArgument(format!("not a number: {s:?}"))
                })?;
                Ok(vec![FluentValue::Str(
                    self.render(FluentNumber::Float(parsed)),
                )])
            }
            [FluentValue::Error(marker)] => Ok(vec![FluentValue::Error(marker.clone())]),
            _ => Err(FunctionError::InvalidArgument(
                "expected exactly one numeric argument".to_string(),
            )),
        }
    }
}

impl ValueFormatter for NumberFunction {
    fn format(&self, value: &FluentValue, _scope: &mut Scope) -> Result<String, FunctionError> {
        match value {
            FluentValue::Number(n) => Ok(self.render(*n)),
            _ => Err(FunctionError::InvalidArgument(
                "expected a number".to_string(),
            )),
        }
    }
}

impl Selector for NumberFunction {
    fn select(
        &self,
        values: &[FluentValue],
        select: &SelectExpression,
        _scope: &mut Scope,
    ) -> Result<usize, FunctionError> {
        let number = match values {
            [FluentValue::Number(n)] => *n,
            [FluentValue::Error(_)] => return Ok(select.default_index()),
            _ => {
                return Err(FunctionError::InvalidArgument(
                    "expected exactly one numeric selector value".to_string(),
                ))
            }
        };

        // Exact numeric keys take precedence over plural categories.
        for (index, variant) in select.variants.iter().enumerate() {
            if let VariantKey::Number(key) = &variant.key {
                if key.value.as_f64() == number.as_f64() {
                    return Ok(index);
                }
            }
        }

        if let Some(rules) = &self.rules {
            // Categorize the formatted form: minimumFractionDigits changes
            // the CLDR `v` operand, e.g. "1.00" is `other` in English.
            let rendered = self.render_digits(number);
            if let Ok(operands) = PluralOperands::try_from(rendered.as_str()) {
                if let Ok(category) = rules.select(operands) {
                    let name = Self::category_name(category);
                    for (index, variant) in select.variants.iter().enumerate() {
                        if let VariantKey::Identifier(id) = &variant.key {
                            if id.name == name {
                                return Ok(index);
                            }
                        }
                    }
                }
            }
        }
        Ok(select.default_index())
    }
}

// ============================================================================
// DATETIME
// ============================================================================

/// Factory for the implicit and explicit `DATETIME` function.
#[derive(Debug)]
pub struct TemporalFactory;

impl FunctionFactory for TemporalFactory {
    fn name(&self) -> &'static str {
        "DATETIME"
    }

    fn create(
        &self,
        _locale: &LanguageIdentifier,
        options: &Options,
    ) -> Result<Arc<dyn FluentFunction>, FunctionError> {
        let date_style = options.get("dateStyle").is_some();
        let time_style = options.get("timeStyle").is_some();
        Ok(Arc::new(TemporalFunction {
            components: match (date_style, time_style) {
                (true, false) => TemporalComponents::Date,
                (false, true) => TemporalComponents::Time,
                _ => TemporalComponents::Both,
            },
        }))
    }
}

/// Which parts of a combined date-time render. Giving only `dateStyle` (or
/// only `timeStyle`) at the call site narrows the output to that part;
/// plain dates and times are unaffected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TemporalComponents {
    Date,
    Time,
    Both,
}

#[derive(Debug)]
struct TemporalFunction {
    components: TemporalComponents,
}

impl TemporalFunction {
    fn render(&self, temporal: &FluentTemporal) -> String {
        match temporal {
            FluentTemporal::Date(d) => d.format("%Y-%m-%d").to_string(),
            FluentTemporal::DateTime(dt) => match self.components {
                TemporalComponents::Date => dt.format("%Y-%m-%d").to_string(),
                TemporalComponents::Time => dt.format("%H:%M:%S").to_string(),
                TemporalComponents::Both => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
            },
            FluentTemporal::Zoned(z) => match self.components {
                TemporalComponents::Date => z.format("%Y-%m-%d").to_string(),
                TemporalComponents::Time => z.format("%H:%M:%S%:z").to_string(),
                TemporalComponents::Both => z.to_rfc3339(),
            },
        }
    }
}

impl FluentFunction for TemporalFunction {
    fn as_transform(&self) -> Option<&dyn Transform> {
        Some(self)
    }
    fn as_formatter(&self) -> Option<&dyn ValueFormatter> {
        Some(self)
    }
    fn as_selector(&self) -> Option<&dyn Selector> {
        Some(self)
    }
}

impl Transform for TemporalFunction {
    fn apply(
        &self,
        args: &[FluentValue],
        _scope: &mut Scope,
    ) -> Result<Vec<FluentValue>, FunctionError> {
        match args {
            [FluentValue::Temporal(t)] => Ok(vec![FluentValue::Str(self.render(t))]),
            [FluentValue::Error(marker)] => Ok(vec![FluentValue::Error(marker.clone())]),
            _ => Err(FunctionError::InvalidArgument(
                "expected exactly one temporal argument".to_string(),
            )),
        }
    }
}

impl ValueFormatter for TemporalFunction {
    fn format(&self, value: &FluentValue, _scope: &mut Scope) -> Result<String, FunctionError> {
        match value {
            FluentValue::Temporal(t) => Ok(self.render(t)),
            _ => Err(FunctionError::InvalidArgument(
                "expected a temporal value".to_string(),
            )),
        }
    }
}

impl Selector for TemporalFunction {
    fn select(
        &self,
        values: &[FluentValue],
        select: &SelectExpression,
        _scope: &mut Scope,
    ) -> Result<usize, FunctionError> {
        match values {
            [FluentValue::Temporal(t)] => Ok(select.match_or_default(&self.render(t))),
            [FluentValue::Error(_)] => Ok(select.default_index()),
            _ => Err(FunctionError::InvalidArgument(
                "expected exactly one temporal selector value".to_string(),
            )),
        }
    }
}

// ============================================================================
// LIST
// ============================================================================

/// Factory for the terminal reducer, also callable explicitly as `LIST`.
#[derive(Debug)]
pub struct ListFactory;

impl FunctionFactory for ListFactory {
    fn name(&self) -> &'static str {
        "LIST"
    }

    fn create(
        &self,
        _locale: &LanguageIdentifier,
        _options: &Options,
    ) -> Result<Arc<dyn FluentFunction>, FunctionError> {
        Ok(Arc::new(ListFunction))
    }
}

#[derive(Debug)]
struct ListFunction;

impl ListFunction {
    fn join(values: &[FluentValue], scope: &mut Scope) -> String {
        let registry = scope.registry();
        let parts: Vec<String> = values
            .iter()
            .map(|value| registry.implicit_format(value, scope))
            .collect();
        parts.join(", ")
    }
}

impl FluentFunction for ListFunction {
    fn as_transform(&self) -> Option<&dyn Transform> {
        Some(self)
    }
    fn as_reducer(&self) -> Option<&dyn TerminalReducer> {
        Some(self)
    }
}

impl Transform for ListFunction {
    fn apply(
        &self,
        args: &[FluentValue],
        scope: &mut Scope,
    ) -> Result<Vec<FluentValue>, FunctionError> {
        Ok(vec![FluentValue::Str(Self::join(args, scope))])
    }
}

impl TerminalReducer for ListFunction {
    fn reduce(&self, values: &[FluentValue], scope: &mut Scope) -> Result<String, FunctionError> {
        Ok(Self::join(values, scope))
    }
}
