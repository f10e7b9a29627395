//! Variable frames stored after the operand stack in the hold space:
//! `<stack><innermost>|...|<outermost>|@<globals>`, bindings as `;name;value`.
//!
//! Every pattern walks the frame pair by pair from its start, so a stored
//! value is never mistaken for a name.

/// Bootstrap: install `end_of_script;@`, then skip over the runtime handlers.
pub const STARTUP: &str = r"
x
s/.*/end_of_script;@/
x
b .start
:end_of_script
q
:NameError
s/.*/NameError: name & is not defined/
p
q
:UnknownLabel
s/.*/UnknownLabel: label & is not defined/
p
q
:.start
";

pub const MAKE_CONTEXT: &str = r"
x
s/^([^;|@]+;)*/&|/
x
";

/// Drops the innermost frame; without a local frame nothing matches.
pub const POP_CONTEXT: &str = r"
x
s/^(([^;|@]+;)*)(;[^;|@]+;[^;|@]*)*[|]/\1/
x
";

pub fn load_global(name: &str) -> String {
    format!(
        r"
g
/@(;[^;]+;[^;]*)*;{name};/!{{
s/.*/{name}/
b NameError
}}
s/^.*@(;[^;]+;[^;]*)*;{name};([^;]*).*$/\2;&/
h
"
    )
}

pub fn store_global(name: &str) -> String {
    format!(
        r"
DELETE_GLOBAL {name}
g
s/^([^;]*);(.*)$/\2;{name};\1/
h
"
    )
}

pub fn delete_global(name: &str) -> String {
    format!(
        r"
g
s/(@(;[^;]+;[^;]*)*);{name};[^;]*/\1/
h
"
    )
}

/// Unbound locals read as `0`.
pub fn load_fast(name: &str) -> String {
    format!(
        r"
g
/^([^;|@]+;)*(;[^;|@]+;[^;|@]*)*;{name};/!s/^/0;/
s/^([^;|@]+;)*(;[^;|@]+;[^;|@]*)*;{name};([^;|@]*)/\3;&/
h
"
    )
}

pub fn store_fast(name: &str) -> String {
    format!(
        r"
DELETE_FAST {name}
g
s/^([^;]*);(([^;|@]+;)*)/\2;{name};\1/
h
"
    )
}

pub fn delete_fast(name: &str) -> String {
    format!(
        r"
g
s/^(([^;|@]+;)*(;[^;|@]+;[^;|@]*)*);{name};[^;|@]*/\1/
h
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_global_guards_with_name_error() {
        insta::assert_snapshot!(load_global("x").trim(), @r###"
        g
        /@(;[^;]+;[^;]*)*;x;/!{
        s/.*/x/
        b NameError
        }
        s/^.*@(;[^;]+;[^;]*)*;x;([^;]*).*$/\2;&/
        h
        "###);
    }

    #[test]
    fn fast_access_stays_inside_the_innermost_frame() {
        // `|` and `@` are excluded from every field the pattern may cross.
        for body in [load_fast("v"), store_fast("v"), delete_fast("v")] {
            assert!(body.contains("[^;|@]"), "{body}");
        }
    }
}
