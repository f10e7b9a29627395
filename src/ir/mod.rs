pub mod display;
pub mod parser;

use std::str::FromStr;

use thiserror::Error;

pub use parser::{canonical_integer, is_identifier, parse_program};

/// Byte range of an item in the IR listing, with the text it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub literal: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Label { name: String, span: Span },
    Instruction(Instruction),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub args: Vec<String>,
    pub span: Span,
}

impl Item {
    pub fn span(&self) -> &Span {
        match self {
            Item::Label { span, .. } => span,
            Item::Instruction(inst) => &inst.span,
        }
    }
}

impl Program {
    /// Names declared by `FUNCTION` items, in declaration order.
    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|item| match item {
            Item::Instruction(Instruction {
                opcode: Opcode::Function,
                args,
                ..
            }) => args.first().map(String::as_str),
            _ => None,
        })
    }

    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.items.iter().filter_map(|item| match item {
            Item::Instruction(inst) => Some(inst),
            Item::Label { .. } => None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    LoadConst,
    LoadGlobal,
    StoreGlobal,
    DeleteGlobal,
    LoadFast,
    StoreFast,
    DeleteFast,
    MakeContext,
    PopContext,
    BinaryAdd,
    BinarySubtract,
    BinaryMultiply,
    UnaryPositive,
    UnaryNegative,
    UnaryNot,
    BinaryAnd,
    BinaryOr,
    CompareOp,
    Jump,
    PopJumpIfTrue,
    PopJumpIfFalse,
    JumpIfTrueOrPop,
    JumpIfFalseOrPop,
    Function,
    CallFunction,
    ReturnValue,
    PrintItem,
    PrintNewline,
    RotTwo,
    RotThree,
    DupTop,
    PopTop,
    IsPositive,
    IsOdd,
    DivideByTwo,
    DivideByTen,
    MakeFunction,
    SetupLoop,
    PopBlock,
    Trace,
}

/// Accepted argument counts for an opcode or macro.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    Between(usize, usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count == n,
            Arity::Between(lo, hi) => (lo..=hi).contains(&count),
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl Opcode {
    pub fn arity(self) -> Arity {
        match self {
            Opcode::LoadConst
            | Opcode::LoadGlobal
            | Opcode::StoreGlobal
            | Opcode::DeleteGlobal
            | Opcode::LoadFast
            | Opcode::StoreFast
            | Opcode::DeleteFast
            | Opcode::CompareOp
            | Opcode::Jump
            | Opcode::PopJumpIfTrue
            | Opcode::PopJumpIfFalse
            | Opcode::JumpIfTrueOrPop
            | Opcode::JumpIfFalseOrPop => Arity::Exact(1),
            Opcode::Function => Arity::AtLeast(1),
            Opcode::CallFunction => Arity::Between(1, 2),
            Opcode::MakeFunction | Opcode::SetupLoop => Arity::Between(0, 1),
            Opcode::Trace => Arity::AtLeast(0),
            _ => Arity::Exact(0),
        }
    }

    /// Opcodes whose single argument names a branch target.
    pub fn is_jump(self) -> bool {
        matches!(
            self,
            Opcode::Jump
                | Opcode::PopJumpIfTrue
                | Opcode::PopJumpIfFalse
                | Opcode::JumpIfTrueOrPop
                | Opcode::JumpIfFalseOrPop
        )
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown opcode '{0}'")]
pub struct UnknownOpcode(pub String);

impl FromStr for Opcode {
    type Err = UnknownOpcode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let opcode = match s {
            "LOAD_CONST" => Opcode::LoadConst,
            "LOAD_GLOBAL" | "LOAD_NAME" => Opcode::LoadGlobal,
            "STORE_GLOBAL" | "STORE_NAME" => Opcode::StoreGlobal,
            "DELETE_GLOBAL" | "DELETE_NAME" => Opcode::DeleteGlobal,
            "LOAD_FAST" => Opcode::LoadFast,
            "STORE_FAST" => Opcode::StoreFast,
            "DELETE_FAST" => Opcode::DeleteFast,
            "MAKE_CONTEXT" => Opcode::MakeContext,
            "POP_CONTEXT" => Opcode::PopContext,
            "BINARY_ADD" | "INPLACE_ADD" => Opcode::BinaryAdd,
            "BINARY_SUBTRACT" | "INPLACE_SUBTRACT" => Opcode::BinarySubtract,
            "BINARY_MULTIPLY" | "INPLACE_MULTIPLY" => Opcode::BinaryMultiply,
            "UNARY_POSITIVE" => Opcode::UnaryPositive,
            "UNARY_NEGATIVE" => Opcode::UnaryNegative,
            "UNARY_NOT" => Opcode::UnaryNot,
            "BINARY_AND" => Opcode::BinaryAnd,
            "BINARY_OR" => Opcode::BinaryOr,
            "COMPARE_OP" => Opcode::CompareOp,
            "JUMP" | "JUMP_ABSOLUTE" | "JUMP_FORWARD" => Opcode::Jump,
            "POP_JUMP_IF_TRUE" => Opcode::PopJumpIfTrue,
            "POP_JUMP_IF_FALSE" => Opcode::PopJumpIfFalse,
            "JUMP_IF_TRUE_OR_POP" => Opcode::JumpIfTrueOrPop,
            "JUMP_IF_FALSE_OR_POP" => Opcode::JumpIfFalseOrPop,
            "FUNCTION" => Opcode::Function,
            "CALL_FUNCTION" => Opcode::CallFunction,
            "RETURN_VALUE" => Opcode::ReturnValue,
            "PRINT_ITEM" => Opcode::PrintItem,
            "PRINT_NEWLINE" => Opcode::PrintNewline,
            "ROT_TWO" => Opcode::RotTwo,
            "ROT_THREE" => Opcode::RotThree,
            "DUP_TOP" => Opcode::DupTop,
            "POP_TOP" => Opcode::PopTop,
            "IS_POSITIVE" => Opcode::IsPositive,
            "IS_ODD" => Opcode::IsOdd,
            "DIVIDE_BY_TWO" => Opcode::DivideByTwo,
            "DIVIDE_BY_TEN" => Opcode::DivideByTen,
            "MAKE_FUNCTION" => Opcode::MakeFunction,
            "SETUP_LOOP" => Opcode::SetupLoop,
            "POP_BLOCK" => Opcode::PopBlock,
            "TRACE" => Opcode::Trace,
            other => return Err(UnknownOpcode(other.to_string())),
        };
        Ok(opcode)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IrError {
    #[error("unknown opcode '{name}'")]
    UnknownOpcode { name: String, span: Span },
    #[error("{opcode} expects {expected} argument(s), found {found}")]
    Arity {
        opcode: Opcode,
        expected: Arity,
        found: usize,
        span: Span,
    },
    #[error("'{name}' is not a valid identifier")]
    InvalidName { name: String, span: Span },
    #[error("'{literal}' is neither an integer nor an identifier")]
    InvalidConstant { literal: String, span: Span },
    #[error("unknown comparison operator '{op}'")]
    InvalidCompareOp { op: String, span: Span },
    #[error("argument count '{literal}' is not a non-negative integer")]
    InvalidArgc { literal: String, span: Span },
    #[error("label '{name}' is reserved for generated code")]
    ReservedLabel { name: String, span: Span },
    #[error("label '{name}' already declared")]
    DuplicateLabel { name: String, span: Span },
    #[error("jump to undeclared label '{name}'")]
    UndefinedLabel { name: String, span: Span },
}

impl IrError {
    pub fn span(&self) -> &Span {
        match self {
            IrError::UnknownOpcode { span, .. } => span,
            IrError::Arity { span, .. } => span,
            IrError::InvalidName { span, .. } => span,
            IrError::InvalidConstant { span, .. } => span,
            IrError::InvalidCompareOp { span, .. } => span,
            IrError::InvalidArgc { span, .. } => span,
            IrError::ReservedLabel { span, .. } => span,
            IrError::DuplicateLabel { span, .. } => span,
            IrError::UndefinedLabel { span, .. } => span,
        }
    }
}
