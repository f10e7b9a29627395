//! Lowering of an IR [`Program`](crate::ir::Program) into a `sed -n -E` script.
//!
//! The generated script keeps the operand stack and every namespace in the
//! hold space and does its work in the pattern space. Code is produced by
//! expanding macro templates; see [`expand::Expander`].

pub mod arith;
pub mod assemble;
pub mod control;
pub mod expand;
pub mod labels;
pub mod macros;
pub mod namespace;
pub mod stack;
pub mod tables;

use thiserror::Error;

use crate::ir::{Arity, Span};

pub use assemble::{assemble, verify_labels};
pub use expand::Expander;
pub use macros::Macro;

/// Largest argument count a call site may pass.
pub const MAX_CALL_ARGS: usize = 255;

/// Code generation options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Emit a register dump for every `TRACE` instruction.
    pub trace: bool,
}

#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("unknown macro '{0}'")]
    UnknownMacro(String),
    #[error("{name} expects {expected} argument(s), found {found}")]
    Arity {
        name: String,
        expected: Arity,
        found: usize,
    },
    #[error("call with {argc} arguments exceeds the limit of {MAX_CALL_ARGS}")]
    UnsupportedArity { argc: usize },
    #[error("invalid argument '{arg}' for {name}")]
    InvalidArgument { name: String, arg: String },
    #[error("label '{0}' is declared more than once in the generated script")]
    DuplicateLabel(String),
    #[error("branch to undeclared label '{0}' in the generated script")]
    UndefinedLabel(String),
    #[error("{source}")]
    InInstruction {
        span: Span,
        source: Box<CodegenError>,
    },
}

impl CodegenError {
    /// Span of the IR instruction that failed, when one is known.
    pub fn span(&self) -> Option<&Span> {
        match self {
            CodegenError::InInstruction { span, .. } => Some(span),
            _ => None,
        }
    }
}
