//! The compiled script: a Timing header followed by an ordered list of statements.
//!
//! `Display` renders the slash-delimited dialect text.

use crate::graph::VariableSlot;
use itertools::Itertools;
use std::fmt;

pub const ENVELOPE: &str = "Modular/";
pub const TIMING_KEYWORD: &str = "TIMING:";
pub const IF_KEYWORD: &str = "IF";
pub const CONTINUE_IF_KEYWORD: &str = "CONTINUEIF";
pub const SEPARATOR: char = '/';

/// A function name applied to already serialized arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallExpr {
    pub name: String,
    pub arguments: Vec<String>,
}

impl CallExpr {
    pub fn new(name: impl Into<String>, arguments: Vec<String>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

impl fmt::Display for CallExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.arguments.iter().join(","))
    }
}

/// The lifecycle trigger the script hangs off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingHeader {
    pub name: String,
    /// `None` for triggers that take no arguments, which render without parentheses.
    pub arguments: Option<Vec<String>>,
}

impl fmt::Display for TimingHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", TIMING_KEYWORD, self.name)?;
        if let Some(arguments) = &self.arguments {
            write!(f, "({})", arguments.iter().join(","))?;
        }
        write!(f, "{}", SEPARATOR)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Call(CallExpr),
    Assign {
        slot: VariableSlot,
        call: CallExpr,
    },
    Conditional {
        condition: String,
        on_true: Vec<Statement>,
        on_false: Option<Vec<Statement>>,
    },
    ContinueIf {
        condition: String,
    },
}

impl Statement {
    /// Number of statements including everything nested in branches.
    pub fn len_recursive(&self) -> usize {
        match self {
            Statement::Conditional {
                on_true, on_false, ..
            } => {
                1 + on_true.iter().map(Statement::len_recursive).sum::<usize>()
                    + on_false
                        .iter()
                        .flatten()
                        .map(Statement::len_recursive)
                        .sum::<usize>()
            }
            _ => 1,
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Call(call) => write!(f, "{}{}", call, SEPARATOR),
            Statement::Assign { slot, call } => write!(f, "{}:{}{}", slot, call, SEPARATOR),
            Statement::Conditional {
                condition,
                on_true,
                on_false,
            } => {
                write!(f, "{}({}):", IF_KEYWORD, condition)?;
                for statement in on_true {
                    write!(f, "{}", statement)?;
                }
                if let Some(on_false) = on_false {
                    write!(f, ":")?;
                    for statement in on_false {
                        write!(f, "{}", statement)?;
                    }
                }
                write!(f, "{}", SEPARATOR)
            }
            Statement::ContinueIf { condition } => {
                write!(f, "{}({}){}", CONTINUE_IF_KEYWORD, condition, SEPARATOR)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub timing: TimingHeader,
    pub statements: Vec<Statement>,
}

impl Script {
    pub fn new(timing: TimingHeader) -> Self {
        Self {
            timing,
            statements: Vec::new(),
        }
    }

    /// Renders the script text.
    pub fn text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", ENVELOPE, self.timing)?;
        for statement in &self.statements {
            write!(f, "{}", statement)?;
        }
        Ok(())
    }
}
