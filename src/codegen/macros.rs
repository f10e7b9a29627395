use std::fmt;
use std::str::FromStr;

use crate::ir::{Arity, Opcode};

/// Every template the expander knows. Internal helpers come first; IR
/// opcodes are wrapped in [`Macro::Op`] and share the opcode's spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Macro {
    Startup,
    Push,
    Pop,
    Push2,
    Pop2,
    Swap,
    FullAdd,
    FullSub,
    FullMul,
    UAdd,
    USub,
    UMul,
    MulByDigit,
    Cmp,
    SCmp,
    SAdd,
    SSub,
    SMul,
    Negative,
    Odd,
    DivBy2,
    Op(Opcode),
}

impl Macro {
    pub fn name(self) -> &'static str {
        match self {
            Macro::Startup => "STARTUP",
            Macro::Push => "PUSH",
            Macro::Pop => "POP",
            Macro::Push2 => "PUSH2",
            Macro::Pop2 => "POP2",
            Macro::Swap => "SWAP",
            Macro::FullAdd => "FULLADD",
            Macro::FullSub => "FULLSUB",
            Macro::FullMul => "FULLMUL",
            Macro::UAdd => "UADD",
            Macro::USub => "USUB",
            Macro::UMul => "UMUL",
            Macro::MulByDigit => "MULBYDIGIT",
            Macro::Cmp => "CMP",
            Macro::SCmp => "SCMP",
            Macro::SAdd => "SADD",
            Macro::SSub => "SSUB",
            Macro::SMul => "SMUL",
            Macro::Negative => "NEGATIVE",
            Macro::Odd => "ODD",
            Macro::DivBy2 => "DIVBY2",
            Macro::Op(opcode) => opcode.name(),
        }
    }

    pub fn arity(self) -> Arity {
        match self {
            Macro::Op(opcode) => opcode.arity(),
            _ => Arity::Exact(0),
        }
    }
}

impl fmt::Display for Macro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Macro {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mac = match s {
            "STARTUP" => Macro::Startup,
            "PUSH" => Macro::Push,
            "POP" => Macro::Pop,
            "PUSH2" => Macro::Push2,
            "POP2" => Macro::Pop2,
            "SWAP" => Macro::Swap,
            "FULLADD" => Macro::FullAdd,
            "FULLSUB" => Macro::FullSub,
            "FULLMUL" => Macro::FullMul,
            "UADD" => Macro::UAdd,
            "USUB" => Macro::USub,
            "UMUL" => Macro::UMul,
            "MULBYDIGIT" => Macro::MulByDigit,
            "CMP" => Macro::Cmp,
            "SCMP" => Macro::SCmp,
            "SADD" => Macro::SAdd,
            "SSUB" => Macro::SSub,
            "SMUL" => Macro::SMul,
            "NEGATIVE" => Macro::Negative,
            "ODD" => Macro::Odd,
            "DIVBY2" => Macro::DivBy2,
            other => Macro::Op(other.parse().map_err(|_| other.to_string())?),
        };
        Ok(mac)
    }
}
