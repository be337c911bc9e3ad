//! Error types for each phase, composed into one top-level [`CompileError`]
//! the same way the assembler's `ParseError`/`AssembleError`/`Error` triad
//! composes: small per-phase enums, `From` impls wiring them into the
//! phase-spanning one, fail-fast rather than accumulated.

use std::fmt;

/// Raised turning a raw, string-tagged AST (as an external parser would
/// hand it over) into the typed internal one. These are "internal
/// consistency" failures: a conforming parser never produces them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LowerError {
    UnknownOperator { found: String },
    WrongArity { kind: &'static str, expected: &'static str, got: usize },
}

impl fmt::Display for LowerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LowerError::UnknownOperator { found } => {
                write!(f, "unknown operator \"{found}\"")
            }
            LowerError::WrongArity { kind, expected, got } => {
                write!(f, "{kind} expects {expected}, got {got} children")
            }
        }
    }
}

/// Name/shape errors raised by the name-binding pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BindError {
    Collision { name: String },
    Unresolved { name: String },
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindError::Collision { name } => {
                write!(f, "\"{name}\" is already declared in this scope")
            }
            BindError::Unresolved { name } => write!(f, "\"{name}\" is not declared"),
        }
    }
}

/// Semantic misuse caught by the code generator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenError {
    NoFunctions,
    NonConstantArrayLength { name: String },
    FunctionUsedAsValue { name: String },
    ArrayUsedAsScalar { name: String },
    IndexTargetNotArray { name: String },
    CallTargetNotFunction { name: String },
    ArgumentCountMismatch { name: String, expected: usize, got: usize },
    BreakOutsideLoop,
}

impl fmt::Display for GenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenError::NoFunctions => write!(f, "program declares no functions"),
            GenError::NonConstantArrayLength { name } => {
                write!(f, "array \"{name}\" does not have a compile-time constant length")
            }
            GenError::FunctionUsedAsValue { name } => {
                write!(f, "function \"{name}\" used as a value")
            }
            GenError::ArrayUsedAsScalar { name } => {
                write!(f, "array \"{name}\" used as a scalar")
            }
            GenError::IndexTargetNotArray { name } => {
                write!(f, "\"{name}\" is not a global array")
            }
            GenError::CallTargetNotFunction { name } => {
                write!(f, "\"{name}\" is not a function")
            }
            GenError::ArgumentCountMismatch { name, expected, got } => write!(
                f,
                "\"{name}\" takes {expected} argument(s), {got} given"
            ),
            GenError::BreakOutsideLoop => write!(f, "break outside of a loop"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompileError {
    Lower(LowerError),
    Bind(BindError),
    Gen(GenError),
}

impl From<LowerError> for CompileError {
    fn from(err: LowerError) -> CompileError {
        CompileError::Lower(err)
    }
}

impl From<BindError> for CompileError {
    fn from(err: BindError) -> CompileError {
        CompileError::Bind(err)
    }
}

impl From<GenError> for CompileError {
    fn from(err: GenError) -> CompileError {
        CompileError::Gen(err)
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Lower(err) => write!(f, "{err}"),
            CompileError::Bind(err) => write!(f, "{err}"),
            CompileError::Gen(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for CompileError {}
