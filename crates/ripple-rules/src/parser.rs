//! Parser for rule `when` expressions.
//!
//! Uses Chumsky for direct string parsing. Expressions outside the grammar
//! are rejected; rules carrying them are dropped at load time.

use chumsky::prelude::*;
use thiserror::Error;

use ripple_model::{Direction, NodeId};

use crate::ast::WhenExpr;

/// Parse error type
type ParseErr<'src> = Rich<'src, char>;

/// A `when` expression that could not be parsed.
#[derive(Debug, Clone, Error)]
#[error("invalid when expression: {message}")]
pub struct WhenParseError {
    pub message: String,
}

/// Parse a `when` expression into its AST.
pub fn parse_when(source: &str) -> Result<WhenExpr, WhenParseError> {
    let (output, errors) = expr().then_ignore(end()).parse(source).into_output_errors();
    match output {
        Some(expr) if errors.is_empty() => Ok(expr),
        _ => Err(WhenParseError {
            message: errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; "),
        }),
    }
}

/// Whitespace
fn ws<'src>() -> impl Parser<'src, &'src str, (), extra::Err<ParseErr<'src>>> + Clone {
    text::whitespace().ignored()
}

/// Identifier
fn ident<'src>() -> impl Parser<'src, &'src str, String, extra::Err<ParseErr<'src>>> + Clone {
    text::ascii::ident().map(|s: &str| s.to_string())
}

/// `<node_id>.up` / `<node_id>.down`
fn node_direction<'src>(
) -> impl Parser<'src, &'src str, WhenExpr, extra::Err<ParseErr<'src>>> + Clone {
    ident()
        .separated_by(just('.'))
        .at_least(2)
        .collect::<Vec<_>>()
        .try_map(|segments: Vec<String>, span| {
            let Some((last, head)) = segments.split_last() else {
                return Err(Rich::custom(span, "expected a node atom"));
            };
            let direction = match last.as_str() {
                "up" => Direction::Up,
                "down" => Direction::Down,
                _ => {
                    return Err(Rich::custom(
                        span,
                        "node atom must end in `.up` or `.down`",
                    ))
                }
            };
            Ok(WhenExpr::NodeDirection {
                node: NodeId::new(head.join(".")),
                direction,
            })
        })
}

/// Expression parser
fn expr<'src>() -> impl Parser<'src, &'src str, WhenExpr, extra::Err<ParseErr<'src>>> + Clone {
    recursive(|expr| {
        let atom = choice((
            text::keyword("true").to(WhenExpr::Literal(true)),
            text::keyword("false").to(WhenExpr::Literal(false)),
            text::keyword("ctx")
                .ignore_then(just('.'))
                .ignore_then(ident())
                .map(WhenExpr::ContextFlag),
            node_direction(),
            expr.clone()
                .padded_by(ws())
                .delimited_by(just('('), just(')')),
        ))
        .padded_by(ws());

        let negation = text::keyword("not")
            .padded_by(ws())
            .repeated()
            .foldr(atom, |_, operand| WhenExpr::Not(Box::new(operand)));

        let conjunction = negation.clone().foldl(
            text::keyword("and")
                .padded_by(ws())
                .ignore_then(negation.clone())
                .repeated(),
            |left, right| WhenExpr::And(Box::new(left), Box::new(right)),
        );

        conjunction.clone().foldl(
            text::keyword("or")
                .padded_by(ws())
                .ignore_then(conjunction.clone())
                .repeated(),
            |left, right| WhenExpr::Or(Box::new(left), Box::new(right)),
        )
    })
}
