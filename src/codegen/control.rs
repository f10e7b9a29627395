//! Branches, comparisons, booleans and the call/return protocol.
//!
//! sed has no computed branch, so a label held in the pattern space is
//! resolved by trying each candidate in turn.

use std::fmt::Write;

use super::CodegenError;

/// Maps the `<`, `=`, `>` outcome of `SCMP` to a boolean per operator.
pub fn compare_outcomes(op: &str) -> Option<&'static str> {
    let outcomes = match op {
        "==" => "010",
        "!=" => "101",
        "<" => "100",
        "<=" => "110",
        ">" => "001",
        ">=" => "011",
        _ => return None,
    };
    Some(outcomes)
}

/// `TOS1 op TOS`.
pub fn compare_op(op: &str) -> Result<String, CodegenError> {
    let outcomes = compare_outcomes(op).ok_or_else(|| CodegenError::InvalidArgument {
        name: "COMPARE_OP".to_string(),
        arg: op.to_string(),
    })?;
    Ok(format!("SWAP\nPOP2\ns/$/;/\nSCMP\ny/<=>/{outcomes}/\nPUSH\n"))
}

pub const UNARY_NOT: &str = r"
g
s/^0;/!;/
s/^[^!;][^;]*;/0;/
s/^!;/1;/
h
";

/// `TOS1 and TOS`: `TOS1` when it is false, else `TOS`.
pub const BINARY_AND: &str = r"
g
/^[^;]*;0;/b .false
s/^([^;]*;)[^;]*;/\1/
b .done
:.false
s/^[^;]*;//
:.done
h
";

/// `TOS1 or TOS`: `TOS` when `TOS1` is false, else `TOS1`.
pub const BINARY_OR: &str = r"
g
/^[^;]*;0;/b .false
s/^[^;]*;//
b .done
:.false
s/^([^;]*;)[^;]*;/\1/
:.done
h
";

pub fn jump(target: &str) -> String {
    format!("b {target}\n")
}

pub fn pop_jump_if_true(target: &str) -> String {
    format!("POP\n/^0$/!b {target}\n")
}

pub fn pop_jump_if_false(target: &str) -> String {
    format!("POP\n/^0$/b {target}\n")
}

pub fn jump_if_true_or_pop(target: &str) -> String {
    format!("g\n/^0;/!b {target}\nPOP\n")
}

pub fn jump_if_false_or_pop(target: &str) -> String {
    format!("g\n/^0;/b {target}\nPOP\n")
}

pub const PRINT_ITEM: &str = r"
POP
p
";

/// Result goes under the return label, which is then popped into PS.
pub const RETURN_VALUE: &str = r"
POP_CONTEXT
SWAP
POP
b return
";

/// Entry label, fresh frame, then arguments bound last to first.
pub fn function(name: &str, params: &[&str]) -> String {
    let mut body = format!(":{name}\nMAKE_CONTEXT\n");
    for param in params.iter().rev() {
        let _ = writeln!(body, "STORE_FAST {param}");
    }
    body
}

/// Branch to whichever of `labels` equals PS, or to `UnknownLabel`.
///
/// The leading no-op substitution clears the `t` flag so that a
/// substitution made before the dispatch cannot trigger the first `t`.
pub fn dispatch<'a>(labels: impl IntoIterator<Item = &'a str>) -> String {
    let mut body = String::from("s/^//\nt .reset\n:.reset\n");
    for label in labels {
        let _ = write!(body, "s/^{label}$//\nt {label}\n");
    }
    body.push_str("b UnknownLabel\n");
    body
}

fn args_pattern(argc: usize) -> String {
    "[^;]+;".repeat(argc)
}

/// Callee label sits beneath `argc` arguments: `ret` goes in its place and
/// the callee is popped into PS for dispatch.
pub fn call_dynamic<'a>(
    argc: usize,
    ret: &str,
    functions: impl IntoIterator<Item = &'a str>,
) -> String {
    let insert = match argc {
        0 => format!("s/^([^;]+;)/\\1{ret};/"),
        _ => format!("s/^({})([^;]+;)/\\2\\1{ret};/", args_pattern(argc)),
    };
    format!("x\n{insert}\nx\nPOP\n{}:{ret}\n", dispatch(functions))
}

/// Call to a label known at compile time. `ret` is slid beneath the
/// arguments. A name that is not a function fails at run time.
pub fn call_static(callee: &str, argc: usize, ret: &str, registered: bool) -> String {
    let insert = match argc {
        0 => format!("s/^/{ret};/"),
        _ => format!("s/^({})/\\1{ret};/", args_pattern(argc)),
    };
    let branch = if registered {
        format!("b {callee}\n")
    } else {
        format!("s/.*/{callee}/\nb UnknownLabel\n")
    };
    format!("x\n{insert}\nx\n{branch}:{ret}\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_strings_cover_every_operator() {
        for (op, expected) in [
            ("==", "010"),
            ("!=", "101"),
            ("<", "100"),
            ("<=", "110"),
            (">", "001"),
            (">=", "011"),
        ] {
            assert_eq!(compare_outcomes(op), Some(expected));
        }
        assert!(compare_op("=>").is_err());
    }

    #[test]
    fn dispatch_tries_labels_in_order() {
        insta::assert_snapshot!(dispatch(["f", "g"]).trim_end(), @r###"
        s/^//
        t .reset
        :.reset
        s/^f$//
        t f
        s/^g$//
        t g
        b UnknownLabel
        "###);
    }

    #[test]
    fn dynamic_call_moves_callee_out_from_under_arguments() {
        let body = call_dynamic(2, "ret0", ["f"]);
        assert!(body.starts_with("x\ns/^([^;]+;[^;]+;)([^;]+;)/\\2\\1ret0;/\nx\nPOP\n"));
        assert!(body.ends_with("b UnknownLabel\n:ret0\n"));
    }

    #[test]
    fn static_call_to_unknown_name_reports_it() {
        insta::assert_snapshot!(call_static("g", 0, "ret3", false).trim_end(), @r###"
        x
        s/^/ret3;/
        x
        s/.*/g/
        b UnknownLabel
        :ret3
        "###);
    }

    #[test]
    fn function_binds_parameters_last_first() {
        assert_eq!(
            function("add2", &["a", "b"]),
            ":add2\nMAKE_CONTEXT\nSTORE_FAST b\nSTORE_FAST a\n"
        );
    }
}
