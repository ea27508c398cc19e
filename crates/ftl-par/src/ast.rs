//! ftl-par - AST Node Definitions
//!
//! This module contains all AST node definitions produced by the parser.
//! Nodes are plain sum types with structural equality; they are built once
//! by the parser and never mutated.

use ftl_util::{ParseError, Span};

/// Parsed FTL document: entries in source order, plus everything the parser
/// could not make sense of.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Resource {
    /// Messages, terms and (in extended mode) comments, in source order.
    pub entries: Vec<Entry>,

    /// Syntax errors, in discovery order.
    pub errors: Vec<ParseError>,

    /// Unparseable regions (extended mode only).
    pub junk: Vec<Junk>,
}

impl Resource {
    /// Messages in source order.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter().filter_map(|e| match e {
            Entry::Message(m) => Some(m),
            _ => None,
        })
    }

    /// Terms in source order.
    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        self.entries.iter().filter_map(|e| match e {
            Entry::Term(t) => Some(t),
            _ => None,
        })
    }
}

/// A region of input skipped during error recovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Junk {
    /// The skipped text, from the failed entry start to the recovery point.
    pub content: String,

    /// The skipped byte range.
    pub span: Span,
}

/// Top-level entry in a resource.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Message(Message),
    Term(Term),
    Comment(Comment),
}

/// `[A-Za-z][A-Za-z0-9_-]*`
///
/// The span covers the identifier's bytes in the source; synthesized
/// identifiers carry [`Span::DUMMY`]. Equality and hashing ignore the
/// span, two identifiers are the same name regardless of where they were
/// written.
#[derive(Debug, Clone, Eq)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            span: Span::DUMMY,
        }
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl std::hash::Hash for Identifier {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// A consumer-facing entry. Either `value` or `attributes` is non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Message name.
    pub id: Identifier,

    /// The message body, absent for attribute-only messages.
    pub value: Option<Pattern>,

    /// Named sub-patterns.
    pub attributes: Vec<Attribute>,

    /// Leading comment attached in extended mode.
    pub comment: Option<Comment>,

    /// Source range of the whole entry.
    pub span: Span,
}

/// A localization-private entry (`-name`). The value is required.
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    /// Term name, without the leading `-`.
    pub id: Identifier,

    /// The term body.
    pub value: Pattern,

    /// Named sub-patterns.
    pub attributes: Vec<Attribute>,

    /// Leading comment attached in extended mode.
    pub comment: Option<Comment>,

    /// Source range of the whole entry, including the leading `-`.
    pub span: Span,
}

/// A named sub-pattern of a message or term.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub id: Identifier,
    pub value: Pattern,

    /// Source range from the leading `.` to the end of the value.
    pub span: Span,
}

/// How many `#` characters opened the comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentLevel {
    /// `#` - attaches to the following message or term.
    Regular,
    /// `##` - section heading.
    Group,
    /// `###` - file heading.
    Resource,
}

impl CommentLevel {
    /// The number of `#` characters, 1 to 3.
    pub fn depth(self) -> usize {
        match self {
            CommentLevel::Regular => 1,
            CommentLevel::Group => 2,
            CommentLevel::Resource => 3,
        }
    }

    pub fn from_depth(depth: usize) -> Option<Self> {
        match depth {
            1 => Some(CommentLevel::Regular),
            2 => Some(CommentLevel::Group),
            3 => Some(CommentLevel::Resource),
            _ => None,
        }
    }
}

/// A comment, with contiguous same-level lines joined by `\n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub level: CommentLevel,
    pub content: String,

    /// Source range of all aggregated lines.
    pub span: Span,
}

/// A non-empty sequence of text and placeables. Patterns are stored
/// dedented: the common indent of continuation lines has been removed and
/// the trailing element trimmed.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub elements: Vec<PatternElement>,
}

impl Pattern {
    pub fn elements(&self) -> &[PatternElement] {
        &self.elements
    }
}

/// One run of a pattern. Text never contains `{`; placeables are always
/// factored out.
#[derive(Debug, Clone, PartialEq)]
pub enum PatternElement {
    Text(String),
    Placeable(Expression),
}

// ============================================================================
// EXPRESSIONS
// ============================================================================

/// An expression inside a placeable or selector position.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// `"text"`, stored unescaped.
    StringLiteral { value: String },

    /// `-?[0-9]+(\.[0-9]+)?`
    NumberLiteral(NumberLiteral),

    /// `NAME(args)`
    FunctionReference {
        id: Identifier,
        arguments: CallArguments,
    },

    /// `msg` or `msg.attr`
    MessageReference {
        id: Identifier,
        attribute: Option<Identifier>,
    },

    /// `-term`, `-term.attr`, `-term(arg: "x")`
    TermReference {
        id: Identifier,
        attribute: Option<Identifier>,
        arguments: Vec<NamedArgument>,
    },

    /// `$var`
    VariableReference { id: Identifier },

    /// A nested `{ ... }`.
    Placeable(Box<Expression>),

    /// `selector -> variants`
    Select(SelectExpression),
}

impl Expression {
    /// Whether a placeable wrapping this expression should be bracketed
    /// with bidi isolates when isolation is enabled: true for message and
    /// term references and for selects over them.
    pub fn needs_isolation(&self) -> bool {
        match self {
            Expression::MessageReference { .. } | Expression::TermReference { .. } => true,
            Expression::Select(select) => matches!(
                select.selector.as_ref(),
                Expression::MessageReference { .. } | Expression::TermReference { .. }
            ),
            _ => false,
        }
    }
}

/// A number literal: the source text plus the narrowest value that
/// represents it. Equality ignores the span.
#[derive(Debug, Clone)]
pub struct NumberLiteral {
    /// The literal as written.
    pub raw: String,
    /// Parsed value.
    pub value: NumberValue,
    /// Source range of the token.
    pub span: Span,
}

impl NumberLiteral {
    pub fn new(raw: impl Into<String>, value: NumberValue) -> Self {
        Self {
            raw: raw.into(),
            value,
            span: Span::DUMMY,
        }
    }
}

impl PartialEq for NumberLiteral {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw && self.value == other.value
    }
}

/// Narrowest-fit numeric value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberValue {
    Int(i64),
    Float(f64),
}

impl NumberValue {
    /// Parses per the literal grammar, integer-first. `None` when the value
    /// does not fit a finite `f64`.
    pub fn parse(raw: &str) -> Option<Self> {
        if !raw.contains('.') {
            if let Ok(i) = raw.parse::<i64>() {
                return Some(NumberValue::Int(i));
            }
        }
        match raw.parse::<f64>() {
            Ok(f) if f.is_finite() => Some(NumberValue::Float(f)),
            _ => None,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            NumberValue::Int(i) => i as f64,
            NumberValue::Float(f) => f,
        }
    }
}

/// Arguments of a function call: ordered positionals followed by uniquely
/// named arguments. Named values are literals.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CallArguments {
    pub positional: Vec<Expression>,
    pub named: Vec<NamedArgument>,
}

/// `name: literal`
#[derive(Debug, Clone, PartialEq)]
pub struct NamedArgument {
    pub name: Identifier,
    /// Restricted by the parser to a string or number literal.
    pub value: Expression,
}

/// `{ selector -> *[key] ... }` with exactly one default variant.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectExpression {
    pub selector: Box<Expression>,
    pub variants: Vec<Variant>,
}

impl SelectExpression {
    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// Index of the default variant.
    pub fn default_index(&self) -> usize {
        self.variants.iter().position(|v| v.default).unwrap_or(0)
    }

    pub fn default_variant(&self) -> &Variant {
        &self.variants[self.default_index()]
    }

    /// Index of the first variant whose key text equals `text`, falling
    /// back to the default variant.
    pub fn match_or_default(&self, text: &str) -> usize {
        self.variants
            .iter()
            .position(|v| v.key.as_str() == text)
            .unwrap_or_else(|| self.default_index())
    }
}

/// One branch of a select expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub key: VariantKey,
    pub value: Pattern,
    /// Whether the branch was marked with `*`.
    pub default: bool,
}

/// A variant key: an identifier or a number literal.
#[derive(Debug, Clone, PartialEq)]
pub enum VariantKey {
    Identifier(Identifier),
    Number(NumberLiteral),
}

impl VariantKey {
    /// The key's source text, used for exact matching.
    pub fn as_str(&self) -> &str {
        match self {
            VariantKey::Identifier(id) => &id.name,
            VariantKey::Number(n) => &n.raw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_pattern(s: &str) -> Pattern {
        Pattern {
            elements: vec![PatternElement::Text(s.to_string())],
        }
    }

    fn select(keys: &[(&str, bool)]) -> SelectExpression {
        SelectExpression {
            selector: Box::new(Expression::VariableReference {
                id: Identifier::new("x"),
            }),
            variants: keys
                .iter()
                .map(|(k, default)| Variant {
                    key: VariantKey::Identifier(Identifier::new(*k)),
                    value: text_pattern(k),
                    default: *default,
                })
                .collect(),
        }
    }

    #[test]
    fn test_match_or_default_exact() {
        let se = select(&[("one", false), ("other", true)]);
        assert_eq!(se.match_or_default("one"), 0);
        assert_eq!(se.match_or_default("other"), 1);
    }

    #[test]
    fn test_match_or_default_fallback() {
        let se = select(&[("one", false), ("other", true)]);
        assert_eq!(se.match_or_default("few"), 1);
        assert_eq!(se.default_variant().key.as_str(), "other");
    }

    #[test]
    fn test_number_value_narrowest_fit() {
        assert_eq!(NumberValue::parse("5"), Some(NumberValue::Int(5)));
        assert_eq!(NumberValue::parse("-17"), Some(NumberValue::Int(-17)));
        assert_eq!(NumberValue::parse("2.5"), Some(NumberValue::Float(2.5)));
        // Wider than i64, still fits f64.
        assert!(matches!(
            NumberValue::parse("92233720368547758080"),
            Some(NumberValue::Float(_))
        ));
    }

    #[test]
    fn test_needs_isolation() {
        let msg_ref = Expression::MessageReference {
            id: Identifier::new("m"),
            attribute: None,
        };
        assert!(msg_ref.needs_isolation());

        let var_ref = Expression::VariableReference {
            id: Identifier::new("v"),
        };
        assert!(!var_ref.needs_isolation());

        let select_on_term = Expression::Select(SelectExpression {
            selector: Box::new(Expression::TermReference {
                id: Identifier::new("t"),
                attribute: Some(Identifier::new("a")),
                arguments: Vec::new(),
            }),
            variants: Vec::new(),
        });
        assert!(select_on_term.needs_isolation());

        let select_on_var = Expression::Select(SelectExpression {
            selector: Box::new(var_ref),
            variants: Vec::new(),
        });
        assert!(!select_on_var.needs_isolation());
    }

    #[test]
    fn test_variant_key_as_str() {
        let k = VariantKey::Number(NumberLiteral::new("1", NumberValue::Int(1)));
        assert_eq!(k.as_str(), "1");
    }
}
