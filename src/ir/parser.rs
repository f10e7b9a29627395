use std::collections::HashMap;

use super::{Arity, Instruction, IrError, Item, Opcode, Program, Span};

/// Label names the generated prologue and epilogue declare themselves.
pub const RESERVED_LABELS: [&str; 4] = ["NameError", "UnknownLabel", "end_of_script", "return"];

/// Comparison operators accepted by `COMPARE_OP`.
pub const COMPARE_OPERATORS: [&str; 6] = ["==", "!=", "<", "<=", ">", ">="];

/// Parse an IR listing: one `OPCODE [args]` or `:label` per line, `#` comments.
pub fn parse_program(source: &str) -> Result<Program, IrError> {
    let mut items = Vec::new();
    let mut offset = 0;

    for raw in source.split_inclusive('\n') {
        let line_start = offset;
        offset += raw.len();

        let content = strip_comment(raw.trim_end_matches(['\n', '\r']));
        let trimmed = content.trim();
        if trimmed.is_empty() {
            continue;
        }
        let start = line_start + (content.len() - content.trim_start().len());
        let span = Span {
            start,
            end: start + trimmed.len(),
            literal: trimmed.to_string(),
        };

        if let Some(name) = trimmed.strip_prefix(':') {
            let name = name.trim();
            check_label(name, &span)?;
            items.push(Item::Label {
                name: name.to_string(),
                span,
            });
            continue;
        }

        items.push(Item::Instruction(parse_instruction(trimmed, span)?));
    }

    let program = Program { items };
    check_labels(&program)?;
    Ok(program)
}

fn parse_instruction(line: &str, span: Span) -> Result<Instruction, IrError> {
    let mut tokens = line.split_whitespace();
    let name = tokens.next().unwrap_or_default();
    let opcode: Opcode = name.parse().map_err(|_| IrError::UnknownOpcode {
        name: name.to_string(),
        span: span.clone(),
    })?;

    let mut args: Vec<String> = tokens.map(str::to_string).collect();
    if opcode == Opcode::Trace && !args.is_empty() {
        args = vec![args.join(" ")];
    }
    check_arity(opcode, opcode.arity(), args.len(), &span)?;

    match opcode {
        Opcode::LoadConst => {
            let literal = &args[0];
            let constant = canonical_integer(literal)
                .or_else(|| is_identifier(literal).then(|| literal.clone()))
                .ok_or_else(|| IrError::InvalidConstant {
                    literal: literal.clone(),
                    span: span.clone(),
                })?;
            args[0] = constant;
        }
        Opcode::LoadGlobal
        | Opcode::StoreGlobal
        | Opcode::DeleteGlobal
        | Opcode::LoadFast
        | Opcode::StoreFast
        | Opcode::DeleteFast
        | Opcode::Jump
        | Opcode::PopJumpIfTrue
        | Opcode::PopJumpIfFalse
        | Opcode::JumpIfTrueOrPop
        | Opcode::JumpIfFalseOrPop => check_name(&args[0], &span)?,
        Opcode::Function => {
            check_label(&args[0], &span)?;
            for param in &args[1..] {
                check_name(param, &span)?;
            }
        }
        Opcode::CompareOp => {
            if !COMPARE_OPERATORS.contains(&args[0].as_str()) {
                return Err(IrError::InvalidCompareOp {
                    op: args[0].clone(),
                    span,
                });
            }
        }
        Opcode::CallFunction => {
            let Some((argc, callee)) = args.split_last() else {
                return Ok(Instruction { opcode, args, span });
            };
            if let Some(callee) = callee.first() {
                check_name(callee, &span)?;
            }
            if argc.parse::<usize>().is_err() {
                return Err(IrError::InvalidArgc {
                    literal: argc.clone(),
                    span,
                });
            }
        }
        _ => {}
    }

    Ok(Instruction { opcode, args, span })
}

fn check_arity(opcode: Opcode, arity: Arity, found: usize, span: &Span) -> Result<(), IrError> {
    if arity.accepts(found) {
        Ok(())
    } else {
        Err(IrError::Arity {
            opcode,
            expected: arity,
            found,
            span: span.clone(),
        })
    }
}

fn check_name(name: &str, span: &Span) -> Result<(), IrError> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(IrError::InvalidName {
            name: name.to_string(),
            span: span.clone(),
        })
    }
}

fn check_label(name: &str, span: &Span) -> Result<(), IrError> {
    check_name(name, span)?;
    if is_reserved_label(name) {
        return Err(IrError::ReservedLabel {
            name: name.to_string(),
            span: span.clone(),
        });
    }
    Ok(())
}

/// Generated code owns `lbl<N>`, `ret<N>` and the handler labels.
pub fn is_reserved_label(name: &str) -> bool {
    if RESERVED_LABELS.contains(&name) {
        return true;
    }
    ["lbl", "ret"].iter().any(|prefix| {
        name.strip_prefix(prefix)
            .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
    })
}

/// Every label is declared once, and every jump lands on a declared label.
fn check_labels(program: &Program) -> Result<(), IrError> {
    let mut declared: HashMap<&str, &Span> = HashMap::new();
    for item in &program.items {
        let name = match item {
            Item::Label { name, .. } => name.as_str(),
            Item::Instruction(inst) if inst.opcode == Opcode::Function => inst.args[0].as_str(),
            Item::Instruction(_) => continue,
        };
        if declared.insert(name, item.span()).is_some() {
            return Err(IrError::DuplicateLabel {
                name: name.to_string(),
                span: item.span().clone(),
            });
        }
    }

    for inst in program.instructions() {
        if inst.opcode.is_jump() && !declared.contains_key(inst.args[0].as_str()) {
            return Err(IrError::UndefinedLabel {
                name: inst.args[0].clone(),
                span: inst.span.clone(),
            });
        }
    }
    Ok(())
}

pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Canonical decimal form of an integer literal: no `+`, no leading zeros, no `-0`.
pub fn canonical_integer(literal: &str) -> Option<String> {
    let (negative, digits) = match literal.as_bytes().first() {
        Some(b'-') => (true, &literal[1..]),
        Some(b'+') => (false, &literal[1..]),
        _ => (false, literal),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let trimmed = digits.trim_start_matches('0');
    Some(match (trimmed.is_empty(), negative) {
        (true, _) => "0".to_string(),
        (false, true) => format!("-{trimmed}"),
        (false, false) => trimmed.to_string(),
    })
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}
