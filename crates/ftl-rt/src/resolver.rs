//! The recursive pattern evaluator.
//!
//! Stateless procedures over `(node, scope)`. No failure escapes this
//! module: every error becomes a `{<diagnostic>}` marker in the output and
//! a [`ResolutionError`] in the scope.

use ftl_par::ast::{
    Expression, Identifier, NamedArgument, Pattern, PatternElement, SelectExpression,
};
use rustc_hash::FxHashMap;

use crate::errors::ResolutionError;
use crate::options::{OptionValue, Options};
use crate::scope::Scope;
use crate::value::FluentValue;

/// Unicode FIRST STRONG ISOLATE, opened before an isolated placeable.
pub const FSI: char = '\u{2068}';
/// Unicode POP DIRECTIONAL ISOLATE, closing an isolated placeable.
pub const PDI: char = '\u{2069}';

/// Resolves a pattern to its value list.
pub(crate) fn resolve_pattern(pattern: &Pattern, scope: &mut Scope) -> Vec<FluentValue> {
    match pattern.elements.as_slice() {
        [PatternElement::Text(text)] => vec![FluentValue::Str(text.clone())],
        [PatternElement::Placeable(expression)] => {
            resolve_placeable(expression, pattern, scope)
        }
        elements => {
            let registry = scope.registry();
            let mut built = String::new();
            for element in elements {
                match element {
                    PatternElement::Text(text) => built.push_str(text),
                    PatternElement::Placeable(expression) => {
                        let isolate = scope.isolating() && expression.needs_isolation();
                        let values = resolve_placeable(expression, pattern, scope);
                        let rendered = registry.reduce(&values, scope);
                        if isolate {
                            built.push(FSI);
                            built.push_str(&rendered);
                            built.push(PDI);
                        } else {
                            built.push_str(&rendered);
                        }
                    }
                }
            }
            vec![FluentValue::Str(built)]
        }
    }
}

/// One placeable expansion: counted against the bundle limit, tracked for
/// cycles, then resolved.
fn resolve_placeable(
    expression: &Expression,
    pattern: &Pattern,
    scope: &mut Scope,
) -> Vec<FluentValue> {
    if let Err(error) = scope.increment_and_check_placeables() {
        return error_values(scope, error);
    }
    scope.maybe_track(pattern);
    resolve_expression(expression, scope)
}

/// Records `error` and substitutes its inline marker.
fn error_values(scope: &mut Scope, error: ResolutionError) -> Vec<FluentValue> {
    let marker = error.marker();
    scope.add_error(error);
    vec![FluentValue::Error(marker)]
}

pub(crate) fn resolve_expression(expression: &Expression, scope: &mut Scope) -> Vec<FluentValue> {
    match expression {
        Expression::StringLiteral { value } => vec![FluentValue::Str(value.clone())],
        Expression::NumberLiteral(n) => vec![FluentValue::Number(n.value.into())],
        Expression::Placeable(inner) => resolve_expression(inner, scope),
        Expression::VariableReference { id } => match scope.lookup(&id.name) {
            Some(values) => values,
            None => error_values(scope, ResolutionError::UnknownVariable(id.name.clone())),
        },
        Expression::MessageReference { id, attribute } => {
            resolve_message_reference(id, attribute.as_ref(), scope)
        }
        Expression::TermReference {
            id,
            attribute,
            arguments,
        } => resolve_term_reference(id, attribute.as_ref(), arguments, scope),
        Expression::FunctionReference { id, arguments } => {
            resolve_function_reference(id, &arguments.positional, &arguments.named, scope)
        }
        Expression::Select(select) => resolve_select(select, scope),
    }
}

fn resolve_message_reference(
    id: &Identifier,
    attribute: Option<&Identifier>,
    scope: &mut Scope,
) -> Vec<FluentValue> {
    let Some(message) = scope.bundle().message(&id.name) else {
        return error_values(scope, ResolutionError::UnknownMessage(id.name.clone()));
    };
    match attribute {
        Some(attr) => match message.attributes.iter().find(|a| a.id.name == attr.name) {
            Some(found) => {
                let reference = format!("{}.{}", id.name, attr.name);
                scope.track(&found.value, &reference, |s| {
                    resolve_pattern(&found.value, s)
                })
            }
            None => error_values(
                scope,
                ResolutionError::UnknownAttribute(id.name.clone(), attr.name.clone()),
            ),
        },
        None => match &message.value {
            Some(pattern) => scope.track(pattern, &id.name, |s| resolve_pattern(pattern, s)),
            None => error_values(scope, ResolutionError::NoValue(id.name.clone())),
        },
    }
}

fn resolve_term_reference(
    id: &Identifier,
    attribute: Option<&Identifier>,
    arguments: &[NamedArgument],
    scope: &mut Scope,
) -> Vec<FluentValue> {
    let Some(term) = scope.bundle().term(&id.name) else {
        return error_values(scope, ResolutionError::UnknownTerm(id.name.clone()));
    };

    let mut locals = FxHashMap::default();
    for argument in arguments {
        if let Some(value) = literal_value(&argument.value) {
            locals.insert(argument.name.name.clone(), vec![value]);
        }
    }
    scope.set_local_params(locals);

    let display = format!("-{}", id.name);
    let values = match attribute {
        Some(attr) => match term.attributes.iter().find(|a| a.id.name == attr.name) {
            Some(found) => {
                let reference = format!("{display}.{}", attr.name);
                scope.track(&found.value, &reference, |s| {
                    resolve_pattern(&found.value, s)
                })
            }
            None => error_values(
                scope,
                ResolutionError::UnknownAttribute(display.clone(), attr.name.clone()),
            ),
        },
        None => scope.track(&term.value, &display, |s| resolve_pattern(&term.value, s)),
    };

    scope.clear_local_params();
    values
}

/// The value of a parser-validated literal argument.
fn literal_value(expression: &Expression) -> Option<FluentValue> {
    match expression {
        Expression::StringLiteral { value } => Some(FluentValue::Str(value.clone())),
        Expression::NumberLiteral(n) => Some(FluentValue::Number(n.value.into())),
        _ => None,
    }
}

/// Resolves call arguments: positionals to a flat value list, named
/// literals to options.
fn resolve_call_arguments(
    positional: &[Expression],
    named: &[NamedArgument],
    scope: &mut Scope,
) -> (Vec<FluentValue>, Options) {
    let mut values = Vec::with_capacity(positional.len());
    for expression in positional {
        values.extend(resolve_expression(expression, scope));
    }
    let mut options = Options::new();
    for argument in named {
        match &argument.value {
            Expression::StringLiteral { value } => {
                options.set(&argument.name.name, value.as_str());
            }
            Expression::NumberLiteral(n) => {
                options.set(&argument.name.name, OptionValue::Num(n.raw.clone()));
            }
            _ => {}
        }
    }
    (values, options)
}

fn resolve_function_reference(
    id: &Identifier,
    positional: &[Expression],
    named: &[NamedArgument],
    scope: &mut Scope,
) -> Vec<FluentValue> {
    let registry = scope.registry();
    let Some(factory) = registry.function(&id.name).cloned() else {
        return error_values(scope, ResolutionError::UnknownFunction(id.name.clone()));
    };

    let (values, call_options) = resolve_call_arguments(positional, named, scope);
    let merged = scope.merged_options(&id.name, &call_options);

    let instance = match scope.instance_with(&factory, &merged) {
        Ok(instance) => instance,
        Err(err) => {
            return error_values(
                scope,
                ResolutionError::Function {
                    name: id.name.clone(),
                    message: err.to_string(),
                },
            )
        }
    };
    let Some(transform) = instance.as_transform() else {
        return error_values(
            scope,
            ResolutionError::Function {
                name: id.name.clone(),
                message: "not callable as a transform".to_string(),
            },
        );
    };
    match transform.apply(&values, scope) {
        Ok(result) => result,
        Err(err) => error_values(
            scope,
            ResolutionError::Function {
                name: id.name.clone(),
                message: err.to_string(),
            },
        ),
    }
}

fn resolve_select(select: &SelectExpression, scope: &mut Scope) -> Vec<FluentValue> {
    let index = select_variant(select, scope);
    let variant = &select.variants[index];
    resolve_pattern(&variant.value, scope)
}

/// Picks the variant index for a select expression's selector.
fn select_variant(select: &SelectExpression, scope: &mut Scope) -> usize {
    let registry = scope.registry();

    // An explicit function call in selector position may select directly.
    if let Expression::FunctionReference { id, arguments } = select.selector.as_ref() {
        let Some(factory) = registry.function(&id.name).cloned() else {
            scope.add_error(ResolutionError::UnknownFunction(id.name.clone()));
            return select.default_index();
        };
        let (values, call_options) =
            resolve_call_arguments(&arguments.positional, &arguments.named, scope);
        let merged = scope.merged_options(&id.name, &call_options);
        let instance = match scope.instance_with(&factory, &merged) {
            Ok(instance) => instance,
            Err(err) => {
                scope.add_error(ResolutionError::Function {
                    name: id.name.clone(),
                    message: err.to_string(),
                });
                return select.default_index();
            }
        };
        if let Some(selector) = instance.as_selector() {
            return match selector.select(&values, select, scope) {
                Ok(index) => index,
                Err(err) => {
                    scope.add_error(ResolutionError::Function {
                        name: id.name.clone(),
                        message: err.to_string(),
                    });
                    select.default_index()
                }
            };
        }
        if let Some(transform) = instance.as_transform() {
            return match transform.apply(&values, scope) {
                Ok(result) => implicit_select_or_default(&result, select, scope),
                Err(err) => {
                    scope.add_error(ResolutionError::Function {
                        name: id.name.clone(),
                        message: err.to_string(),
                    });
                    select.default_index()
                }
            };
        }
        scope.add_error(ResolutionError::Function {
            name: id.name.clone(),
            message: "not callable as a selector".to_string(),
        });
        return select.default_index();
    }

    // Implicit selector: resolve the expression, then dispatch on type.
    let values = resolve_expression(&select.selector, scope);
    implicit_select_or_default(&values, select, scope)
}

fn implicit_select_or_default(
    values: &[FluentValue],
    select: &SelectExpression,
    scope: &mut Scope,
) -> usize {
    let registry = scope.registry();
    match registry.implicit_select(values, select, scope) {
        Ok(index) => index,
        Err(err) => {
            scope.add_error(ResolutionError::Selector(err.to_string()));
            select.default_index()
        }
    }
}
