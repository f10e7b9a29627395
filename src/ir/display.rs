use std::fmt;

use super::{Arity, Instruction, Item, Opcode, Program};

impl Opcode {
    /// Canonical IR spelling; aliases print under their primary name.
    pub fn name(self) -> &'static str {
        match self {
            Opcode::LoadConst => "LOAD_CONST",
            Opcode::LoadGlobal => "LOAD_GLOBAL",
            Opcode::StoreGlobal => "STORE_GLOBAL",
            Opcode::DeleteGlobal => "DELETE_GLOBAL",
            Opcode::LoadFast => "LOAD_FAST",
            Opcode::StoreFast => "STORE_FAST",
            Opcode::DeleteFast => "DELETE_FAST",
            Opcode::MakeContext => "MAKE_CONTEXT",
            Opcode::PopContext => "POP_CONTEXT",
            Opcode::BinaryAdd => "BINARY_ADD",
            Opcode::BinarySubtract => "BINARY_SUBTRACT",
            Opcode::BinaryMultiply => "BINARY_MULTIPLY",
            Opcode::UnaryPositive => "UNARY_POSITIVE",
            Opcode::UnaryNegative => "UNARY_NEGATIVE",
            Opcode::UnaryNot => "UNARY_NOT",
            Opcode::BinaryAnd => "BINARY_AND",
            Opcode::BinaryOr => "BINARY_OR",
            Opcode::CompareOp => "COMPARE_OP",
            Opcode::Jump => "JUMP",
            Opcode::PopJumpIfTrue => "POP_JUMP_IF_TRUE",
            Opcode::PopJumpIfFalse => "POP_JUMP_IF_FALSE",
            Opcode::JumpIfTrueOrPop => "JUMP_IF_TRUE_OR_POP",
            Opcode::JumpIfFalseOrPop => "JUMP_IF_FALSE_OR_POP",
            Opcode::Function => "FUNCTION",
            Opcode::CallFunction => "CALL_FUNCTION",
            Opcode::ReturnValue => "RETURN_VALUE",
            Opcode::PrintItem => "PRINT_ITEM",
            Opcode::PrintNewline => "PRINT_NEWLINE",
            Opcode::RotTwo => "ROT_TWO",
            Opcode::RotThree => "ROT_THREE",
            Opcode::DupTop => "DUP_TOP",
            Opcode::PopTop => "POP_TOP",
            Opcode::IsPositive => "IS_POSITIVE",
            Opcode::IsOdd => "IS_ODD",
            Opcode::DivideByTwo => "DIVIDE_BY_TWO",
            Opcode::DivideByTen => "DIVIDE_BY_TEN",
            Opcode::MakeFunction => "MAKE_FUNCTION",
            Opcode::SetupLoop => "SETUP_LOOP",
            Opcode::PopBlock => "POP_BLOCK",
            Opcode::Trace => "TRACE",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{n}"),
            Arity::Between(lo, hi) => write!(f, "{lo} to {hi}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Label { name, .. } => write!(f, ":{name}"),
            Item::Instruction(inst) if inst.opcode == Opcode::Function => write!(f, "{inst}"),
            Item::Instruction(inst) => write!(f, "    {inst}"),
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in &self.items {
            writeln!(f, "{item}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::ir::{parse_program, Item, Opcode};

    const LISTING: &str = r#"
FUNCTION add2 a b
    LOAD_FAST a
    LOAD_FAST b
    INPLACE_ADD
    RETURN_VALUE
:main
    LOAD_CONST add2
    LOAD_CONST +6
    LOAD_CONST 007
    CALL_FUNCTION 2
    COMPARE_OP >=
    POP_JUMP_IF_FALSE main
    TRACE after the call
"#;

    fn rendered(items: &[Item]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn printed_program_parses_back_to_the_same_items() {
        let program = parse_program(LISTING).unwrap();
        let printed = program.to_string();
        let reparsed = parse_program(&printed).unwrap();
        assert_eq!(rendered(&program.items), rendered(&reparsed.items));
    }

    #[test]
    fn aliases_print_canonically() {
        let program = parse_program(LISTING).unwrap();
        insta::assert_snapshot!(program.to_string().trim_end(), @r###"
        FUNCTION add2 a b
            LOAD_FAST a
            LOAD_FAST b
            BINARY_ADD
            RETURN_VALUE
        :main
            LOAD_CONST add2
            LOAD_CONST 6
            LOAD_CONST 7
            CALL_FUNCTION 2
            COMPARE_OP >=
            POP_JUMP_IF_FALSE main
            TRACE after the call
        "###);
    }

    #[test]
    fn every_name_parses_to_itself() {
        let all = [
            Opcode::LoadConst,
            Opcode::StoreFast,
            Opcode::JumpIfFalseOrPop,
            Opcode::DivideByTwo,
            Opcode::DivideByTen,
            Opcode::Trace,
        ];
        for opcode in all {
            assert_eq!(opcode.name().parse::<Opcode>().unwrap(), opcode);
        }
    }
}
