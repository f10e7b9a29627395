//! Digit lookup tables embedded in the arithmetic templates.
//!
//! Each table is a run of `!<key><result>` entries. A template appends the
//! table to the pattern space and selects the entry whose key matches the
//! leading characters with a single back-referencing substitution.

use std::fmt::Write;

/// `!abcTU`: `a + b + c = 10*T + U` for digits `a`, `b` and carry `c`.
pub fn add_table() -> String {
    let mut table = String::with_capacity(200 * 6);
    for a in 0..10 {
        for b in 0..10 {
            for c in 0..2 {
                let sum = a + b + c;
                let _ = write!(table, "!{a}{b}{c}{}{}", sum / 10, sum % 10);
            }
        }
    }
    table
}

/// `!abcBD`: `a - b - c`, with `B` the borrow out and `D` the digit.
pub fn sub_table() -> String {
    let mut table = String::with_capacity(200 * 6);
    for a in 0..10i32 {
        for b in 0..10 {
            for c in 0..2 {
                let diff = a - b - c;
                let (borrow, digit) = if diff < 0 { (1, diff + 10) } else { (0, diff) };
                let _ = write!(table, "!{a}{b}{c}{borrow}{digit}");
            }
        }
    }
    table
}

/// `!abTU`: `a * b = 10*T + U`.
pub fn mul_table() -> String {
    let mut table = String::with_capacity(100 * 5);
    for a in 0..10 {
        for b in 0..10 {
            let product = a * b;
            let _ = write!(table, "!{a}{b}{}{}", product / 10, product % 10);
        }
    }
    table
}

/// `!ab<` or `!ab>` for every pair of distinct digits.
pub fn cmp_table() -> String {
    let mut table = String::with_capacity(90 * 4);
    for a in 0..10 {
        for b in 0..10 {
            if a != b {
                let ord = if a > b { '>' } else { '<' };
                let _ = write!(table, "!{a}{b}{ord}");
            }
        }
    }
    table
}

/// `!cnrq`: halving step of long division. `10*c + n = 2*q + r`.
pub fn half_table() -> String {
    let mut table = String::with_capacity(20 * 5);
    for carry in 0..2 {
        for digit in 0..10 {
            let value = 10 * carry + digit;
            let _ = write!(table, "!{carry}{digit}{}{}", value % 2, value / 2);
        }
    }
    table
}

/// `!np`: parity `p` of the digit `n`.
pub fn parity_table() -> String {
    (0..10).map(|n| format!("!{n}{}", n % 2)).collect()
}
