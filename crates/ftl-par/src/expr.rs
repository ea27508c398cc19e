//! Expression parsing - placeables, literals, references, select
//! expressions and call arguments.

use ftl_util::ascii::{is_alpha, is_callee_part, is_digit, EOF_BYTE};
use ftl_util::error::{ErrorCode, ParseResult};

use crate::ast::{
    CallArguments, Expression, NamedArgument, NumberLiteral, NumberValue, SelectExpression,
    Variant, VariantKey,
};
use crate::Parser;

impl Parser<'_> {
    /// `'{' Expression '}'`. Term attribute references are not valid
    /// placeables; they only appear in selector position.
    pub(crate) fn parse_placeable(&mut self) -> ParseResult<Expression> {
        self.stream.expect_byte(b'{')?;
        self.stream.skip_blank();
        let expression = self.parse_expression()?;
        self.stream.skip_blank();
        self.stream.expect_byte(b'}')?;

        if let Expression::TermReference {
            id,
            attribute: Some(_),
            ..
        } = &expression
        {
            return Err(self.stream.error(ErrorCode::E0019, &id.name));
        }
        Ok(expression)
    }

    /// An inline expression, promoted to a select expression when `->`
    /// follows.
    fn parse_expression(&mut self) -> ParseResult<Expression> {
        let selector = self.parse_inline_expression()?;
        self.stream.skip_blank();
        if !(self.stream.is_current(b'-') && self.stream.is_next(b'>')) {
            return Ok(selector);
        }

        match &selector {
            Expression::MessageReference {
                attribute: None, ..
            } => return Err(self.stream.error(ErrorCode::E0016, "")),
            Expression::MessageReference {
                attribute: Some(_), ..
            } => return Err(self.stream.error(ErrorCode::E0018, "")),
            Expression::TermReference {
                attribute: None, ..
            } => return Err(self.stream.error(ErrorCode::E0017, "")),
            Expression::Placeable(_) => return Err(self.stream.error(ErrorCode::E0029, "")),
            _ => {}
        }

        self.stream.inc_by(2);
        self.stream.skip_blank_inline();
        if !self.stream.skip_eol() {
            return Err(self.stream.error(ErrorCode::E0004, "\\n"));
        }

        let variants = self.parse_variants()?;
        Ok(Expression::Select(SelectExpression {
            selector: Box::new(selector),
            variants,
        }))
    }

    /// One or more `'*'? '[' key ']' Pattern` branches with exactly one
    /// default.
    fn parse_variants(&mut self) -> ParseResult<Vec<Variant>> {
        let mut variants: Vec<Variant> = Vec::new();
        let mut has_default = false;

        loop {
            let bookmark = self.stream.snapshot();
            self.stream.skip_blank();
            let default = self.stream.take_byte_if(b'*');
            if !self.stream.is_current(b'[') {
                if default {
                    return Err(self.stream.error(ErrorCode::E0003, "["));
                }
                self.stream.restore(bookmark);
                break;
            }
            if default && has_default {
                return Err(self.stream.error(ErrorCode::E0015, ""));
            }
            self.stream.inc();

            self.stream.skip_blank();
            let key = self.parse_variant_key()?;
            self.stream.skip_blank();
            self.stream.expect_byte(b']')?;

            let value = match self.parse_pattern()? {
                Some(p) => p,
                None => return Err(self.stream.error(ErrorCode::E0012, "")),
            };

            has_default |= default;
            variants.push(Variant {
                key,
                value,
                default,
            });
        }

        if variants.is_empty() {
            return Err(self.stream.error(ErrorCode::E0011, ""));
        }
        if !has_default {
            return Err(self.stream.error(ErrorCode::E0010, ""));
        }
        Ok(variants)
    }

    /// `NumberLiteral | Identifier`.
    fn parse_variant_key(&mut self) -> ParseResult<VariantKey> {
        let b = self.stream.current();
        if b == EOF_BYTE {
            return Err(self.stream.error(ErrorCode::E0013, ""));
        }
        if is_digit(b) || b == b'-' {
            Ok(VariantKey::Number(self.parse_number_literal()?))
        } else if is_alpha(b) {
            Ok(VariantKey::Identifier(self.parse_identifier()?))
        } else {
            Err(self.stream.error(ErrorCode::E0023, ""))
        }
    }

    /// Dispatches on the first byte of an inline expression.
    fn parse_inline_expression(&mut self) -> ParseResult<Expression> {
        match self.stream.current() {
            b'"' => self.parse_string_literal(),
            b'-' => {
                if is_alpha(self.stream.at(self.stream.position() + 1)) {
                    self.parse_term_reference()
                } else {
                    Ok(Expression::NumberLiteral(self.parse_number_literal()?))
                }
            }
            b'$' => {
                self.stream.inc();
                let id = self.parse_identifier()?;
                Ok(Expression::VariableReference { id })
            }
            b'{' => Ok(Expression::Placeable(Box::new(self.parse_placeable()?))),
            b if is_digit(b) => Ok(Expression::NumberLiteral(self.parse_number_literal()?)),
            b if is_alpha(b) => {
                let id = self.parse_identifier()?;
                if self.stream.is_current(b'(') {
                    if !id.name.bytes().all(is_callee_part) {
                        return Err(self.stream.error(ErrorCode::E0008, ""));
                    }
                    let arguments = self.parse_call_arguments()?;
                    Ok(Expression::FunctionReference { id, arguments })
                } else {
                    let attribute = if self.stream.take_byte_if(b'.') {
                        Some(self.parse_identifier()?)
                    } else {
                        None
                    };
                    Ok(Expression::MessageReference { id, attribute })
                }
            }
            _ => Err(self.stream.error(ErrorCode::E0028, "")),
        }
    }

    /// `'-' id ('.' id)? ('(' named-args ')')?`. Terms accept named
    /// arguments only.
    fn parse_term_reference(&mut self) -> ParseResult<Expression> {
        self.stream.expect_byte(b'-')?;
        let id = self.parse_identifier()?;
        let attribute = if self.stream.take_byte_if(b'.') {
            Some(self.parse_identifier()?)
        } else {
            None
        };
        let arguments = if self.stream.is_current(b'(') {
            let args = self.parse_call_arguments()?;
            if !args.positional.is_empty() {
                return Err(self.stream.error(ErrorCode::E0031, &id.name));
            }
            args.named
        } else {
            Vec::new()
        };
        Ok(Expression::TermReference {
            id,
            attribute,
            arguments,
        })
    }

    /// `'(' (argument (',' argument)* ','?)? ')'` where an argument is
    /// `id ':' Literal` or an expression. Positionals may not follow named
    /// arguments and named names are unique.
    fn parse_call_arguments(&mut self) -> ParseResult<CallArguments> {
        self.stream.expect_byte(b'(')?;
        self.stream.skip_blank();

        let mut positional = Vec::new();
        let mut named: Vec<NamedArgument> = Vec::new();

        while !self.stream.is_current(b')') && self.stream.has_remaining() {
            let expression = self.parse_inline_expression()?;
            self.stream.skip_blank();

            if self.stream.is_current(b':') {
                let name = match expression {
                    Expression::MessageReference {
                        id,
                        attribute: None,
                    } => id,
                    _ => return Err(self.stream.error(ErrorCode::E0009, "")),
                };
                self.stream.inc();
                self.stream.skip_blank();

                let value = self.parse_inline_expression()?;
                if !matches!(
                    value,
                    Expression::StringLiteral { .. } | Expression::NumberLiteral(_)
                ) {
                    return Err(self.stream.error(ErrorCode::E0032, &name.name));
                }
                if named.iter().any(|a| a.name.name == name.name) {
                    return Err(self.stream.error(ErrorCode::E0022, &name.name));
                }
                named.push(NamedArgument { name, value });
            } else {
                if !named.is_empty() {
                    return Err(self.stream.error(ErrorCode::E0021, ""));
                }
                positional.push(expression);
            }

            self.stream.skip_blank();
            if !self.stream.take_byte_if(b',') {
                break;
            }
            self.stream.skip_blank();
        }

        self.stream.expect_byte(b')')?;
        Ok(CallArguments { positional, named })
    }

    /// `'"' (text | escape)* '"'`, unescaped during the scan.
    fn parse_string_literal(&mut self) -> ParseResult<Expression> {
        self.stream.expect_byte(b'"')?;
        let mut value = String::new();
        let mut segment = self.stream.position();
        loop {
            if !self.stream.has_remaining() {
                return Err(self.stream.error(ErrorCode::E0020, ""));
            }
            match self.stream.current() {
                b'"' => {
                    value.push_str(&self.stream.substring(segment, self.stream.position()));
                    self.stream.inc();
                    break;
                }
                b'\\' => {
                    value.push_str(&self.stream.substring(segment, self.stream.position()));
                    self.stream.inc();
                    match self.stream.current() {
                        b'\\' => {
                            value.push('\\');
                            self.stream.inc();
                        }
                        b'"' => {
                            value.push('"');
                            self.stream.inc();
                        }
                        b'{' => {
                            value.push('{');
                            self.stream.inc();
                        }
                        b'u' => {
                            self.stream.inc();
                            value.push(self.stream.unicode_escape(4)?);
                        }
                        b'U' => {
                            self.stream.inc();
                            value.push(self.stream.unicode_escape(6)?);
                        }
                        other => {
                            if !self.stream.has_remaining() {
                                return Err(self.stream.error(ErrorCode::E0020, ""));
                            }
                            return Err(self
                                .stream
                                .error(ErrorCode::E0025, &(other as char).to_string()));
                        }
                    }
                    segment = self.stream.position();
                }
                b'\n' => return Err(self.stream.error(ErrorCode::E0020, "")),
                b'\r' if self.stream.is_next(b'\n') => {
                    return Err(self.stream.error(ErrorCode::E0020, ""))
                }
                _ => self.stream.inc(),
            }
        }
        Ok(Expression::StringLiteral { value })
    }

    /// `-?[0-9]+(\.[0-9]+)?` with the narrowest-fit parsed value.
    fn parse_number_literal(&mut self) -> ParseResult<NumberLiteral> {
        let start = self.stream.position();
        self.stream.take_byte_if(b'-');
        if !is_digit(self.stream.current()) {
            return Err(self.stream.error(ErrorCode::E0004, "0-9"));
        }
        while is_digit(self.stream.current()) {
            self.stream.inc();
        }
        if self.stream.is_current(b'.') {
            self.stream.inc();
            if !is_digit(self.stream.current()) {
                return Err(self.stream.error(ErrorCode::E0004, "0-9"));
            }
            while is_digit(self.stream.current()) {
                self.stream.inc();
            }
        }
        let end = self.stream.position();
        let raw = self.stream.substring(start, end);
        let value = match NumberValue::parse(&raw) {
            Some(v) => v,
            None => return Err(self.stream.error(ErrorCode::E0030, &raw)),
        };
        Ok(NumberLiteral {
            raw,
            value,
            span: ftl_util::Span::new(start, end),
        })
    }
}
