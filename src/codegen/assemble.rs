use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::expand::Expander;
use super::macros::Macro;
use super::{CodegenError, Config};
use crate::ir::{Item, Program};

/// Optional `/regex/` or `/regex/!` address, then a `b` or `t` with a target.
static BRANCH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:/(?:[^/\\]|\\.)*/!?)?[bt]\s+(\S+)$").expect("branch regex")
});

/// Lower a whole program to a script for `sed -n -E`.
pub fn assemble(program: &Program, config: &Config) -> Result<String, CodegenError> {
    let mut expander = Expander::new(config.clone());
    for name in program.function_names() {
        expander.register_function(name);
    }

    let mut script = expander.invoke(Macro::Startup, &[])?;

    for item in &program.items {
        match item {
            Item::Label { name, .. } => {
                script.push(':');
                script.push_str(name);
                script.push('\n');
            }
            Item::Instruction(inst) => {
                debug!(opcode = %inst.opcode, args = ?inst.args, "lowering instruction");
                let args: Vec<&str> = inst.args.iter().map(String::as_str).collect();
                let code = expander
                    .invoke(Macro::Op(inst.opcode), &args)
                    .map_err(|source| CodegenError::InInstruction {
                        span: inst.span.clone(),
                        source: Box::new(source),
                    })?;
                script.push_str(&code);
            }
        }
    }

    script.push_str("q\n:return\n");
    script.push_str(&expander.return_dispatch()?);

    verify_labels(&script)?;

    debug!(
        functions = expander.functions().len(),
        call_sites = expander.returns().len(),
        local_labels = expander.local_labels_issued(),
        lines = script.lines().count(),
        "assembled script"
    );
    Ok(script)
}

/// Check that each label is declared once and each branch has a target.
pub fn verify_labels(script: &str) -> Result<(), CodegenError> {
    let mut declared = HashSet::new();
    for line in script.lines() {
        if let Some(label) = line.strip_prefix(':') {
            if !declared.insert(label) {
                return Err(CodegenError::DuplicateLabel(label.to_string()));
            }
        }
    }

    for line in script.lines() {
        if line.starts_with("s/") || line.starts_with("y/") || line.starts_with("i ") {
            continue;
        }
        if let Some(caps) = BRANCH.captures(line) {
            let target = &caps[1];
            if !declared.contains(target) {
                return Err(CodegenError::UndefinedLabel(target.to_string()));
            }
        }
    }
    Ok(())
}
