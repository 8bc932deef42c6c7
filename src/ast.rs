//! Abstract Syntax Tree types for equation strings
//!
//! These types represent the parsed structure of an algebraic expression or
//! an equation `lhs = rhs`.

use std::f64::consts;

use crate::errors::EvalError;

/// A parsed equation `lhs = rhs`
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    pub lhs: Expr,
    pub rhs: Expr,
}

impl Equation {
    /// The equation moved to one side: `lhs - rhs` (= 0).
    pub fn normalized(&self) -> Expr {
        Expr::BinaryOp(
            Box::new(self.lhs.clone()),
            BinaryOp::Sub,
            Box::new(self.rhs.clone()),
        )
    }
}

/// Expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    /// Any identifier that is not a function name
    Variable(String),
    FuncCall(FuncCall),
    BinaryOp(Box<Expr>, BinaryOp, Box<Expr>),
    UnaryOp(UnaryOp, Box<Expr>),
}

impl Expr {
    /// Every identifier in the expression, in first-seen order.
    pub fn variables(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Number(_) => {}
            Expr::Variable(name) => {
                if !out.contains(&name.as_str()) {
                    out.push(name.as_str());
                }
            }
            Expr::FuncCall(call) => call.arg.collect_variables(out),
            Expr::BinaryOp(l, _, r) => {
                l.collect_variables(out);
                r.collect_variables(out);
            }
            Expr::UnaryOp(_, e) => e.collect_variables(out),
        }
    }
}

/// Function call
#[derive(Debug, Clone, PartialEq)]
pub struct FuncCall {
    pub func: Function,
    pub arg: Box<Expr>,
}

/// Built-in functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sqrt,
    Exp,
    Ln,
    Log,
    Abs,
}

impl Function {
    pub fn from_name(name: &str) -> Option<Function> {
        Some(match name {
            "sin" => Function::Sin,
            "cos" => Function::Cos,
            "tan" => Function::Tan,
            "asin" | "arcsin" => Function::Asin,
            "acos" | "arccos" => Function::Acos,
            "atan" | "arctan" => Function::Atan,
            "sqrt" => Function::Sqrt,
            "exp" => Function::Exp,
            "ln" => Function::Ln,
            "log" => Function::Log,
            "abs" => Function::Abs,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Asin => "asin",
            Function::Acos => "acos",
            Function::Atan => "atan",
            Function::Sqrt => "sqrt",
            Function::Exp => "exp",
            Function::Ln => "ln",
            Function::Log => "log",
            Function::Abs => "abs",
        }
    }

    /// Apply to a real argument. `log` is base 10.
    pub fn apply(self, v: f64) -> Result<f64, EvalError> {
        let domain = |ok: bool| {
            if ok {
                Ok(())
            } else {
                Err(EvalError::Domain {
                    function: self.name(),
                    value: v,
                })
            }
        };
        match self {
            Function::Sin => Ok(v.sin()),
            Function::Cos => Ok(v.cos()),
            Function::Tan => Ok(v.tan()),
            Function::Asin => domain((-1.0..=1.0).contains(&v)).map(|_| v.asin()),
            Function::Acos => domain((-1.0..=1.0).contains(&v)).map(|_| v.acos()),
            Function::Atan => Ok(v.atan()),
            Function::Sqrt => domain(v >= 0.0).map(|_| v.sqrt()),
            Function::Exp => Ok(v.exp()),
            Function::Ln => domain(v > 0.0).map(|_| v.ln()),
            Function::Log => domain(v > 0.0).map(|_| v.log10()),
            Function::Abs => Ok(v.abs()),
        }
    }
}

/// Named constants recognised in expressions
pub fn constant(name: &str) -> Option<f64> {
    match name {
        "pi" => Some(consts::PI),
        "e" => Some(consts::E),
        "tau" => Some(consts::TAU),
        _ => None,
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

/// Unary operators. A leading `+` is dropped by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
}
