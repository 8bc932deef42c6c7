//! Parse pest pairs into AST nodes

use pest::Parser;
use pest::iterators::{Pair, Pairs};

use crate::ast::*;
use crate::errors::{ParseError, SourceContext};
use crate::{EquationParser, Rule};

/// Parse `lhs = rhs`.
pub fn parse_equation(source: &str) -> Result<Equation, ParseError> {
    let ctx = SourceContext::new("<equation>", source);
    if !source.contains('=') {
        return Err(ParseError::MissingEquals {
            src: ctx.named_source(),
            span: ctx.full_span(),
        });
    }
    let root = parse_root(Rule::equation, &ctx)?;
    let mut inner = root.into_inner();
    let lhs = parse_expr(child(&mut inner, &ctx)?, &ctx)?;
    let rhs = parse_expr(child(&mut inner, &ctx)?, &ctx)?;
    Ok(Equation { lhs, rhs })
}

/// Parse a bare expression such as `a sin(t) + 1`.
pub fn parse_expression(source: &str) -> Result<Expr, ParseError> {
    let ctx = SourceContext::new("<expression>", source);
    let root = parse_root(Rule::expression_input, &ctx)?;
    parse_expr(child(&mut root.into_inner(), &ctx)?, &ctx)
}

fn parse_root<'i>(rule: Rule, ctx: &'i SourceContext) -> Result<Pair<'i, Rule>, ParseError> {
    let mut pairs = EquationParser::parse(rule, &ctx.source).map_err(|e| {
        let span = match e.location {
            pest::error::InputLocation::Pos(p) => (p, 0),
            pest::error::InputLocation::Span((start, end)) => (start, end - start),
        };
        ParseError::Syntax {
            message: e.variant.message().into_owned(),
            src: ctx.named_source(),
            span: span.into(),
        }
    })?;
    child(&mut pairs, ctx)
}

/// Next child pair; the grammar guarantees it, so absence is a syntax error.
fn child<'i>(
    pairs: &mut Pairs<'i, Rule>,
    ctx: &SourceContext,
) -> Result<Pair<'i, Rule>, ParseError> {
    pairs.next().ok_or_else(|| ParseError::Syntax {
        message: "unexpected end of input".to_string(),
        src: ctx.named_source(),
        span: (ctx.source.len(), 0).into(),
    })
}

fn unexpected(pair: &Pair<Rule>, ctx: &SourceContext) -> ParseError {
    let span = pair.as_span();
    ParseError::Syntax {
        message: format!("unexpected {:?}", pair.as_rule()),
        src: ctx.named_source(),
        span: (span.start(), span.end() - span.start()).into(),
    }
}

fn parse_expr(pair: Pair<Rule>, ctx: &SourceContext) -> Result<Expr, ParseError> {
    match pair.as_rule() {
        // expression = { sum }
        Rule::expression => parse_expr(child(&mut pair.into_inner(), ctx)?, ctx),
        Rule::sum => parse_sum(pair, ctx),
        _ => Err(unexpected(&pair, ctx)),
    }
}

fn parse_sum(pair: Pair<Rule>, ctx: &SourceContext) -> Result<Expr, ParseError> {
    // sum = product ~ (add_op ~ product)*
    let mut inner = pair.into_inner();
    let mut result = parse_product(child(&mut inner, ctx)?, ctx)?;

    while let Some(op_pair) = inner.next() {
        let op = match op_pair.as_str() {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            _ => return Err(unexpected(&op_pair, ctx)),
        };
        let rhs = parse_product(child(&mut inner, ctx)?, ctx)?;
        result = Expr::BinaryOp(Box::new(result), op, Box::new(rhs));
    }

    Ok(result)
}

fn parse_product(pair: Pair<Rule>, ctx: &SourceContext) -> Result<Expr, ParseError> {
    // product = unary ~ (mul_op ~ unary | implicit)*
    let mut inner = pair.into_inner();
    let mut result = parse_unary(child(&mut inner, ctx)?, ctx)?;

    while let Some(next) = inner.next() {
        let (op, rhs) = match next.as_rule() {
            Rule::mul_op => {
                let op = if next.as_str() == "/" {
                    BinaryOp::Div
                } else {
                    BinaryOp::Mul
                };
                (op, parse_unary(child(&mut inner, ctx)?, ctx)?)
            }
            Rule::implicit => {
                let power = child(&mut next.into_inner(), ctx)?;
                (BinaryOp::Mul, parse_power(power, ctx)?)
            }
            _ => return Err(unexpected(&next, ctx)),
        };
        result = Expr::BinaryOp(Box::new(result), op, Box::new(rhs));
    }

    Ok(result)
}

fn parse_unary(pair: Pair<Rule>, ctx: &SourceContext) -> Result<Expr, ParseError> {
    // unary = sign* ~ power
    let mut negate = false;
    let mut operand = None;
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::sign => negate ^= inner.as_str() == "-",
            Rule::power => operand = Some(parse_power(inner, ctx)?),
            _ => return Err(unexpected(&inner, ctx)),
        }
    }
    let operand = operand.ok_or_else(|| ParseError::Syntax {
        message: "missing operand".to_string(),
        src: ctx.named_source(),
        span: ctx.full_span(),
    })?;
    Ok(if negate {
        Expr::UnaryOp(UnaryOp::Neg, Box::new(operand))
    } else {
        operand
    })
}

fn parse_power(pair: Pair<Rule>, ctx: &SourceContext) -> Result<Expr, ParseError> {
    // power = primary ~ (pow_op ~ unary)?
    let mut inner = pair.into_inner();
    let base = parse_primary(child(&mut inner, ctx)?, ctx)?;
    match inner.next() {
        Some(_pow_op) => {
            let exponent = parse_unary(child(&mut inner, ctx)?, ctx)?;
            Ok(Expr::BinaryOp(Box::new(base), BinaryOp::Pow, Box::new(exponent)))
        }
        None => Ok(base),
    }
}

fn parse_primary(pair: Pair<Rule>, ctx: &SourceContext) -> Result<Expr, ParseError> {
    match pair.as_rule() {
        Rule::number => parse_number(&pair, ctx),
        Rule::ident => Ok(Expr::Variable(pair.as_str().to_string())),
        Rule::call => parse_call(pair, ctx),
        Rule::expression => parse_expr(pair, ctx),
        _ => Err(unexpected(&pair, ctx)),
    }
}

fn parse_number(pair: &Pair<Rule>, ctx: &SourceContext) -> Result<Expr, ParseError> {
    pair.as_str()
        .parse::<f64>()
        .map(Expr::Number)
        .map_err(|e| ParseError::Syntax {
            message: format!("invalid number: {e}"),
            src: ctx.named_source(),
            span: (pair.as_span().start(), pair.as_str().len()).into(),
        })
}

fn parse_call(pair: Pair<Rule>, ctx: &SourceContext) -> Result<Expr, ParseError> {
    // call = ident ~ "(" ~ expression ~ ")"
    let mut inner = pair.into_inner();
    let name_pair = child(&mut inner, ctx)?;
    let arg = parse_expr(child(&mut inner, ctx)?, ctx)?;
    let name = name_pair.as_str();

    if let Some(func) = Function::from_name(name) {
        return Ok(Expr::FuncCall(FuncCall {
            func,
            arg: Box::new(arg),
        }));
    }
    // `x(y + 1)`: a single letter before parentheses multiplies
    if name.chars().count() == 1 {
        return Ok(Expr::BinaryOp(
            Box::new(Expr::Variable(name.to_string())),
            BinaryOp::Mul,
            Box::new(arg),
        ));
    }
    let span = name_pair.as_span();
    Err(ParseError::UnknownFunction {
        name: name.to_string(),
        src: ctx.named_source(),
        span: (span.start(), span.end() - span.start()).into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(v: f64) -> Box<Expr> {
        Box::new(Expr::Number(v))
    }

    fn var(name: &str) -> Box<Expr> {
        Box::new(Expr::Variable(name.to_string()))
    }

    #[test]
    fn implicit_multiplication_and_power_precedence() {
        let e = parse_expression("2x^2").unwrap();
        assert_eq!(
            e,
            Expr::BinaryOp(
                num(2.0),
                BinaryOp::Mul,
                Box::new(Expr::BinaryOp(var("x"), BinaryOp::Pow, num(2.0)))
            )
        );
    }

    #[test]
    fn caret_and_double_star_agree() {
        assert_eq!(
            parse_expression("x**2").unwrap(),
            parse_expression("x ^ 2").unwrap()
        );
    }

    #[test]
    fn leading_signs_fold() {
        assert_eq!(parse_expression("+x").unwrap(), parse_expression("x").unwrap());
        assert_eq!(parse_expression("--x").unwrap(), parse_expression("x").unwrap());
        assert_eq!(parse_expression("+-x").unwrap(), parse_expression("-x").unwrap());
    }

    #[test]
    fn leading_minus_binds_looser_than_power() {
        let e = parse_expression("-x^2").unwrap();
        assert_eq!(
            e,
            Expr::UnaryOp(
                UnaryOp::Neg,
                Box::new(Expr::BinaryOp(var("x"), BinaryOp::Pow, num(2.0)))
            )
        );
    }

    #[test]
    fn power_is_right_associative() {
        let e = parse_expression("2^3^2").unwrap();
        assert_eq!(
            e,
            Expr::BinaryOp(
                num(2.0),
                BinaryOp::Pow,
                Box::new(Expr::BinaryOp(num(3.0), BinaryOp::Pow, num(2.0)))
            )
        );
    }

    #[test]
    fn calls_and_parenthesised_products() {
        let e = parse_expression("3 sin(t)").unwrap();
        let Expr::BinaryOp(_, BinaryOp::Mul, rhs) = e else {
            panic!("expected a product, got {e:?}");
        };
        assert!(matches!(
            *rhs,
            Expr::FuncCall(FuncCall {
                func: Function::Sin,
                ..
            })
        ));
        let e = parse_expression("x(y + 1)").unwrap();
        assert!(matches!(e, Expr::BinaryOp(_, BinaryOp::Mul, _)));
        assert!(parse_expression("(x - 1)(x + 1)").is_ok());
    }

    #[test]
    fn equation_sides() {
        let eq = parse_equation("y = 2x + 1").unwrap();
        assert_eq!(eq.lhs, Expr::Variable("y".into()));
        assert_eq!(eq.rhs.variables(), vec!["x"]);
    }

    #[test]
    fn errors_carry_spans() {
        assert!(matches!(
            parse_equation("2x + 3y"),
            Err(ParseError::MissingEquals { .. })
        ));
        assert!(matches!(
            parse_equation("2x + = 3"),
            Err(ParseError::Syntax { .. })
        ));
        match parse_expression("1 + foo(2)") {
            Err(ParseError::UnknownFunction { name, span, .. }) => {
                assert_eq!(name, "foo");
                assert_eq!(span.offset(), 4);
                assert_eq!(span.len(), 3);
            }
            other => panic!("expected unknown function, got {other:?}"),
        }
        assert!(parse_equation("x = 1 = 2").is_err());
    }
}
