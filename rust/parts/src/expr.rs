// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Constraint expressions over part parameters
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! or     := and ("or" and)*
//! and    := not ("and" not)*
//! not    := "not" not | cmp
//! cmp    := sum (("<" | "<=" | ">" | ">=" | "==" | "!=") sum)*
//! sum    := term (("+" | "-") term)*
//! term   := unary (("*" | "/" | "%") unary)*
//! unary  := "-" unary | atom
//! atom   := number | 'text' | "text" | True | False | name | "(" or ")"
//! ```
//!
//! Comparisons chain (`0 < a < b`), `and`/`or` short-circuit and `%` is a
//! floored modulo (the result takes the divisor's sign). Names resolve
//! against the parameter map at evaluation time.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{alpha1, alphanumeric1, char, digit0, digit1, multispace0, one_of},
    combinator::{all_consuming, map, map_res, opt, recognize, verify},
    error::{Error as NomError, ErrorKind},
    multi::many0,
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};
use serde_json::Value;
use sketchpart_model::params::value_as_f64;
use sketchpart_model::ParameterMap;
use thiserror::Error;

/// Deepest nesting of parentheses, `not` and unary minus accepted
pub const MAX_NESTING: usize = 64;

const KEYWORDS: [&str; 3] = ["and", "or", "not"];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("unknown name {0}")]
    UnknownName(String),

    #[error("type error: {0}")]
    Type(String),

    #[error("expression nested deeper than {0} levels")]
    TooDeep(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

/// Parsed expression. Operator chains are kept flat so tree depth follows
/// nesting, not expression length.
#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Num(f64),
    Text(String),
    Bool(bool),
    Name(String),
    Neg(Box<Expr>),
    Not(Box<Expr>),
    Or(Vec<Expr>),
    And(Vec<Expr>),
    Cmp(Box<Expr>, Vec<(CmpOp, Expr)>),
    Arith(Box<Expr>, Vec<(char, Expr)>),
}

#[derive(Debug, Clone, PartialEq)]
enum Scalar {
    Num(f64),
    Bool(bool),
    Text(String),
}

impl Scalar {
    fn truthy(&self) -> bool {
        match self {
            Scalar::Num(v) => *v != 0.0,
            Scalar::Bool(b) => *b,
            Scalar::Text(s) => !s.is_empty(),
        }
    }

    fn number(&self) -> Result<f64, ExprError> {
        match self {
            Scalar::Num(v) => Ok(*v),
            Scalar::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Scalar::Text(s) => Err(ExprError::Type(format!("'{s}' is not a number"))),
        }
    }
}

/// Evaluate `expression` to a truth value
pub fn evaluate(expression: &str, params: &ParameterMap) -> Result<bool, ExprError> {
    let expr = parse(expression)?;
    Ok(eval(&expr, params)?.truthy())
}

fn parse(expression: &str) -> Result<Expr, ExprError> {
    match all_consuming(|i| or_expr(i, 0))(expression) {
        Ok((_, expr)) => Ok(expr),
        Err(nom::Err::Failure(e)) if e.code == ErrorKind::TooLarge => Err(ExprError::TooDeep(MAX_NESTING)),
        Err(e) => Err(ExprError::Syntax(e.to_string())),
    }
}

// ============================================================================
// Parsers
// ============================================================================

/// Skip whitespace around `inner`
fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// Refuse to descend past [`MAX_NESTING`]
fn nesting_guard(input: &str, depth: usize) -> Result<(), nom::Err<NomError<&str>>> {
    if depth > MAX_NESTING {
        Err(nom::Err::Failure(NomError::new(input, ErrorKind::TooLarge)))
    } else {
        Ok(())
    }
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(alt((alpha1, tag("_"))), many0(alt((alphanumeric1, tag("_"))))))(input)
}

fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    ws(verify(identifier, move |s: &str| s == word))
}

/// `12`, `1.5`, `.5`, `2.`, `1e-3`
fn number(input: &str) -> IResult<&str, f64> {
    map_res(
        recognize(tuple((
            alt((
                recognize(pair(digit1, opt(pair(char('.'), digit0)))),
                recognize(pair(char('.'), digit1)),
            )),
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
        ))),
        |s: &str| s.parse::<f64>(),
    )(input)
}

fn string_literal(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('\''), take_while(|c| c != '\''), char('\'')),
        delimited(char('"'), take_while(|c| c != '"'), char('"')),
    ))(input)
}

fn cmp_op(input: &str) -> IResult<&str, CmpOp> {
    alt((
        map(tag("<="), |_| CmpOp::Le),
        map(tag(">="), |_| CmpOp::Ge),
        map(tag("=="), |_| CmpOp::Eq),
        map(tag("!="), |_| CmpOp::Ne),
        map(tag("<"), |_| CmpOp::Lt),
        map(tag(">"), |_| CmpOp::Gt),
    ))(input)
}

fn or_expr(input: &str, depth: usize) -> IResult<&str, Expr> {
    nesting_guard(input, depth)?;
    let (input, first) = and_expr(input, depth)?;
    let (input, rest) = many0(preceded(keyword("or"), |i| and_expr(i, depth)))(input)?;
    Ok((input, flatten(first, rest, Expr::Or)))
}

fn and_expr(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (input, first) = not_expr(input, depth)?;
    let (input, rest) = many0(preceded(keyword("and"), |i| not_expr(i, depth)))(input)?;
    Ok((input, flatten(first, rest, Expr::And)))
}

fn not_expr(input: &str, depth: usize) -> IResult<&str, Expr> {
    nesting_guard(input, depth)?;
    alt((
        map(preceded(keyword("not"), |i| not_expr(i, depth + 1)), |e| {
            Expr::Not(Box::new(e))
        }),
        |i| cmp_expr(i, depth),
    ))(input)
}

fn cmp_expr(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (input, first) = sum_expr(input, depth)?;
    let (input, rest) = many0(pair(ws(cmp_op), |i| sum_expr(i, depth)))(input)?;
    if rest.is_empty() {
        Ok((input, first))
    } else {
        Ok((input, Expr::Cmp(Box::new(first), rest)))
    }
}

fn sum_expr(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (input, first) = term_expr(input, depth)?;
    let (input, rest) = many0(pair(ws(one_of("+-")), |i| term_expr(i, depth)))(input)?;
    Ok((input, arith(first, rest)))
}

fn term_expr(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (input, first) = unary_expr(input, depth)?;
    let (input, rest) = many0(pair(ws(one_of("*/%")), |i| unary_expr(i, depth)))(input)?;
    Ok((input, arith(first, rest)))
}

fn unary_expr(input: &str, depth: usize) -> IResult<&str, Expr> {
    nesting_guard(input, depth)?;
    alt((
        map(preceded(ws(char('-')), |i| unary_expr(i, depth + 1)), |e| {
            Expr::Neg(Box::new(e))
        }),
        |i| atom(i, depth),
    ))(input)
}

fn atom(input: &str, depth: usize) -> IResult<&str, Expr> {
    ws(alt((
        map(number, Expr::Num),
        map(string_literal, |s| Expr::Text(s.to_string())),
        delimited(char('('), |i| or_expr(i, depth + 1), char(')')),
        map(
            verify(identifier, |s: &str| !KEYWORDS.contains(&s)),
            |s| match s {
                "True" | "true" => Expr::Bool(true),
                "False" | "false" => Expr::Bool(false),
                _ => Expr::Name(s.to_string()),
            },
        ),
    )))(input)
}

fn flatten(first: Expr, rest: Vec<Expr>, join: fn(Vec<Expr>) -> Expr) -> Expr {
    if rest.is_empty() {
        return first;
    }
    let mut all = Vec::with_capacity(rest.len() + 1);
    all.push(first);
    all.extend(rest);
    join(all)
}

fn arith(first: Expr, rest: Vec<(char, Expr)>) -> Expr {
    if rest.is_empty() {
        first
    } else {
        Expr::Arith(Box::new(first), rest)
    }
}

// ============================================================================
// Evaluation
// ============================================================================

fn eval(expr: &Expr, params: &ParameterMap) -> Result<Scalar, ExprError> {
    match expr {
        Expr::Num(v) => Ok(Scalar::Num(*v)),
        Expr::Text(s) => Ok(Scalar::Text(s.clone())),
        Expr::Bool(b) => Ok(Scalar::Bool(*b)),
        Expr::Name(name) => lookup(name, params),
        Expr::Neg(inner) => Ok(Scalar::Num(-eval(inner, params)?.number()?)),
        Expr::Not(inner) => Ok(Scalar::Bool(!eval(inner, params)?.truthy())),
        Expr::Or(items) => {
            for item in items {
                if eval(item, params)?.truthy() {
                    return Ok(Scalar::Bool(true));
                }
            }
            Ok(Scalar::Bool(false))
        }
        Expr::And(items) => {
            for item in items {
                if !eval(item, params)?.truthy() {
                    return Ok(Scalar::Bool(false));
                }
            }
            Ok(Scalar::Bool(true))
        }
        Expr::Cmp(first, chain) => {
            let mut lhs = eval(first, params)?;
            for (op, next) in chain {
                let rhs = eval(next, params)?;
                if !compare(*op, &lhs, &rhs)? {
                    return Ok(Scalar::Bool(false));
                }
                lhs = rhs;
            }
            Ok(Scalar::Bool(true))
        }
        Expr::Arith(first, chain) => {
            let mut value = eval(first, params)?;
            for (op, next) in chain {
                let rhs = eval(next, params)?;
                value = apply(*op, &value, &rhs)?;
            }
            Ok(value)
        }
    }
}

fn apply(op: char, lhs: &Scalar, rhs: &Scalar) -> Result<Scalar, ExprError> {
    if let ('+', Scalar::Text(a), Scalar::Text(b)) = (op, lhs, rhs) {
        return Ok(Scalar::Text(format!("{a}{b}")));
    }
    let (a, b) = (lhs.number()?, rhs.number()?);
    if matches!(op, '/' | '%') && b == 0.0 {
        return Err(ExprError::Type("division by zero".into()));
    }
    Ok(Scalar::Num(match op {
        '+' => a + b,
        '-' => a - b,
        '*' => a * b,
        '/' => a / b,
        _ => a - b * (a / b).floor(),
    }))
}

fn lookup(name: &str, params: &ParameterMap) -> Result<Scalar, ExprError> {
    match params.get(name) {
        Some(Value::Bool(b)) => Ok(Scalar::Bool(*b)),
        Some(Value::String(s)) => Ok(Scalar::Text(s.clone())),
        Some(value) => value_as_f64(value)
            .map(Scalar::Num)
            .ok_or_else(|| ExprError::Type(format!("{name} is not a scalar"))),
        None => Err(ExprError::UnknownName(name.to_string())),
    }
}

fn compare(op: CmpOp, lhs: &Scalar, rhs: &Scalar) -> Result<bool, ExprError> {
    if let (Scalar::Text(a), Scalar::Text(b)) = (lhs, rhs) {
        return Ok(ordered(op, a, b));
    }
    if matches!(lhs, Scalar::Text(_)) || matches!(rhs, Scalar::Text(_)) {
        return match op {
            CmpOp::Eq => Ok(false),
            CmpOp::Ne => Ok(true),
            _ => Err(ExprError::Type("cannot order text against a number".into())),
        };
    }
    Ok(ordered(op, &lhs.number()?, &rhs.number()?))
}

fn ordered<T: PartialOrd + ?Sized>(op: CmpOp, a: &T, b: &T) -> bool {
    match op {
        CmpOp::Lt => a < b,
        CmpOp::Le => a <= b,
        CmpOp::Gt => a > b,
        CmpOp::Ge => a >= b,
        CmpOp::Eq => a == b,
        CmpOp::Ne => a != b,
    }
}
