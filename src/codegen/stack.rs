//! Operand stack held in the hold space as `;`-terminated fields, newest first.
//!
//! Templates that only rearrange fields work on a copy of the hold space in
//! the pattern space (`g ... h`), so the previous pattern space is lost.

/// PS onto the stack. PS keeps the pushed value.
pub const PUSH: &str = r"
G
s/\n/;/
h
s/;.*//
";

/// Top of stack into PS.
pub const POP: &str = r"
g
s/^[^;]*;//
x
s/;.*//
";

/// PS `a;b` becomes the two top fields.
pub const PUSH2: &str = r"
G
s/\n/;/
h
s/^([^;]*;[^;]*);.*/\1/
";

/// Two top fields into PS as `top;next`.
pub const POP2: &str = r"
g
s/^[^;]*;[^;]*;//
x
s/^([^;]*;[^;]*);.*/\1/
";

/// Exchange the two top fields without touching PS.
pub const SWAP: &str = r"
x
s/^([^;]*;)([^;]*;)/\2\1/
x
";

pub const ROT_TWO: &str = r"
g
s/^([^;]*;)([^;]*;)/\2\1/
h
";

/// `a;b;c;` becomes `b;c;a;`.
pub const ROT_THREE: &str = r"
g
s/^([^;]*;)([^;]*;)([^;]*;)/\2\3\1/
h
";

pub const DUP_TOP: &str = r"
g
s/^([^;]*;)/\1\1/
h
";

pub const POP_TOP: &str = r"
g
s/^[^;]*;//
h
";

pub fn load_const(value: &str) -> String {
    format!("g\ns/^/{value};/\nh\n")
}
