//! Arbitrary-precision decimal arithmetic, one digit at a time.
//!
//! Operands are `;`-terminated decimal fields at the start of the pattern
//! space. The unsigned operations consume `M;N;` and leave the result field
//! in front of whatever followed. Signed operations work on exactly `A;B;`
//! and leave a bare result. `NaN` in any operand yields `NaN`.

use super::tables;

/// `abc` (digits a, b and carry c) becomes the two-digit sum `TU`.
pub fn full_add() -> String {
    format!(
        "s/$/#{}/\ns/^(...)([^#]*)#.*!\\1(..).*/\\3\\2/\n",
        tables::add_table()
    )
}

/// `abc` becomes `BD`, the borrow and digit of `a - b - c`.
pub fn full_sub() -> String {
    format!(
        "s/$/#{}/\ns/^(...)([^#]*)#.*!\\1(..).*/\\3\\2/\n",
        tables::sub_table()
    )
}

/// `abc` becomes `TU` with `a*b + c = 10*T + U`; here `c` is a full digit.
pub fn full_mul() -> String {
    format!(
        r"
s/$/#{}/
s/^(..)(.)([^#]*)#.*!\1(..).*/\4\2\3/
s/^(.)(.)(.)/\2\30\1/
FULLADD
s/^(.)(.)(.)/\3\10\2/
FULLADD
s/^.(.)(.)/\1\2/
",
        tables::mul_table()
    )
}

/// `M;N;` becomes `M+N;`.
pub const UADD: &str = r"
s/^\d*;\d*;/0;;&/
:.loop
/^.;\d*;;;/b .done
s/^(.;\d*;);/\10;/
s/^(.;\d*;\d+;);/\10;/
s/^(.);(\d*);(\d*)(\d);(\d*)(\d);/\4\6\1;\2;\3;\5;/
FULLADD
s/^(.)(.);/\1;\2/
b .loop
:.done
s/^0;(\d*);;;/\1;/
s/^1;(\d*);;;/1\1;/
s/^0*(\d)/\1/
";

/// `M;N;` becomes `M-N;`, or `NaN;` when `M < N`.
pub const USUB: &str = r"
s/^\d*;\d*;/0;;&/
:.loop
/^.;\d*;;;/b .done
/^.;\d*;;/b .nan
s/^(.;\d*;\d+;);/\10;/
s/^(.);(\d*);(\d*)(\d);(\d*)(\d);/\4\6\1;\2;\3;\5;/
FULLSUB
s/^(.)(.);/\1;\2/
b .loop
:.done
/^1/b .nan
s/^0;(\d*);;;/\1;/
s/^0*(\d)/\1/
b .end
:.nan
s/^.;\d*;\d*;\d*;/NaN;/
:.end
";

/// `dN;` becomes `d*N;` for a single digit `d`.
pub const MULBYDIGIT: &str = r"
s/^(\d)(\d*);/0;;\1;\2;/
:.loop
s/^(.);(\d*);(.);(\d*)(\d);/\5\3\1;\2;\3;\4;/
FULLMUL
s/^(.)(.);/\1;\2/
/^.;\d*;.;\d/b .loop
s/^(.);(\d*);.;;/\1\2;/
s/^0*(\d)/\1/
";

/// `M;N;` becomes `M*N;`: one `MULBYDIGIT` per digit of `N`, shifting the
/// partial sum right as each digit is settled.
pub const UMUL: &str = r"
s/^/0;;/
:.loop
s/^(\d*;\d*;(\d*);\d*)(\d);/\3\2;\1;/
MULBYDIGIT
UADD
s/^(\d*)(\d);/\1;\2/
s/^;/0;/
/^\d*;\d*;\d*;\d/b .loop
s/^(\d*);(\d*);\d*;;/\1\2;/
s/^0*(\d)/\1/
";

/// `A;B;` becomes `<`, `=` or `>`.
pub fn cmp() -> String {
    format!(
        r"
s/;/!;/g
:.align
s/(\d)!(\d*;\d*)(\d)!/!\1\2!\3/
t .align
/^!/!b .gt
/;!/!b .lt
s/!//g
:.strip
s/^(\d)(\d*);\1/\2;/
t .strip
/^;/{{
s/.*/=/
b .end
}}
s/$/#{}/
s/^(.)\d*;(.)[^#]*#.*!\1\2(.).*/\3/
b .end
:.gt
s/.*/>/
b .end
:.lt
s/.*/</
:.end
",
        tables::cmp_table()
    )
}

pub const SCMP: &str = r"
/NaN/{
s/.*/NaN/
b .end
}
/^-\d*;\d/b .lt
/^\d*;-/b .gt
s/^-(\d*);-(\d*);/\2;\1;/
CMP
b .end
:.lt
s/.*/</
b .end
:.gt
s/.*/>/
:.end
";

/// Mixed signs subtract the magnitudes; when that underflows the operands
/// are swapped and the result negated.
pub const SADD: &str = r"
/NaN/{
s/.*/NaN/
b .end
}
/^\d*;\d*;$/b .pos
/^-\d*;-\d*;$/b .neg
s/^-(\d*);(\d*);$/\2;\1;/
s/-//
s/^(\d*);(\d*);$/&\2;\1;/
USUB
/^NaN/!b .keep
s/^NaN;//
USUB
s/^/-/
:.keep
s/^([^;]*);.*/\1/
b .end
:.neg
s/-//g
UADD
s/^/-/
b .trim
:.pos
UADD
:.trim
s/;$//
:.end
s/^-0$/0/
";

pub const SSUB: &str = r"
/^[^;]*;-/b .neg
s/^[^;]*;/&-/
b .add
:.neg
s/^([^;]*);-/\1;/
:.add
SADD
";

pub const SMUL: &str = r"
/NaN/{
s/.*/NaN/
b .end
}
s/^-(\d*);-(\d*);$/\1;\2;/
/-/b .neg
UMUL
b .trim
:.neg
s/-//
UMUL
s/^/-/
:.trim
s/;$//
:.end
s/^-0$/0/
";

/// Flips the sign of the leading field; `0` and `NaN` are left alone.
pub const NEGATIVE: &str = r"
s/^-/!/
s/^\d/-&/
s/^-0;/0;/
s/^!//
";

/// Leading field becomes its parity digit.
pub fn odd() -> String {
    format!(
        "s/^-?\\d*(\\d)/\\1{}/\ns/^(.)[^;]*!\\1(.)[^;]*/\\2/\n",
        tables::parity_table()
    )
}

/// Leading field becomes its floor half, working from the most significant
/// digit down. Negative and `NaN` fields become `NaN`.
pub fn divby2() -> String {
    format!(
        r"
/^\d+;/!b .nan
s/^\d+;/0;&;/
:.loop
/^.;;/b .done
s/;(.)/\1;/
s/^(..)/\1{}/
s/^(..)[^;]*!\1(.)(.)[^;]*;([^;]*);([^;]*);/\2;\4;\5\3;/
b .loop
:.done
s/^.;;0*(\d)/\1/
b .end
:.nan
s/^[^;]*;/NaN;/
:.end
",
        tables::half_table()
    )
}

pub const BINARY_ADD: &str = r"
POP2
s/$/;/
SADD
PUSH
";

/// `TOS1 - TOS`.
pub const BINARY_SUBTRACT: &str = r"
SWAP
POP2
s/$/;/
SSUB
PUSH
";

pub const BINARY_MULTIPLY: &str = r"
POP2
s/$/;/
SMUL
PUSH
";

pub const UNARY_NEGATIVE: &str = r"
g
NEGATIVE
h
";

/// `1` for a non-negative top of stack, `0` otherwise.
pub const IS_POSITIVE: &str = r"
g
s/^\d[^;]*/1/
s/^-[^;]*/0/
h
";

pub const IS_ODD: &str = r"
g
ODD
h
";

pub const DIVIDE_BY_TWO: &str = r"
g
DIVBY2
h
";

/// Drops the last digit of the top of stack; a single digit becomes `0`.
pub const DIVIDE_BY_TEN: &str = r"
g
/^\d+;/!s/^[^;]*;/NaN;/
s/^(\d*)\d;/\1;/
s/^;/0;/
h
";
