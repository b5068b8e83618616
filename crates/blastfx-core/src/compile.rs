//! Expression compiler for the single-letter operator mini-language
//!
//! Designer-authored field expressions like `"d0.5r2i0.1"` compile into an
//! opcode stream: each mnemonic consumes the numeric literal that follows it
//! as its operand, and a bare literal adds itself to the accumulator. The
//! compiled code for one field always ends with exactly one store carrying
//! the field's byte offset.

use tracing::warn;

use crate::error::{Error, Result};
use crate::interp::SCRATCH_SLOTS;
use crate::opcode::{CodeStream, OpCode};
use crate::schema::ScalarKind;

/// Compile one scalar field expression, appending to `code`
///
/// Tokenizes `script` left to right. Recognized mnemonics: `i` index,
/// `r` rand, `d` damage, `m` sawtooth, `k` discrete, `s` sine, `p` pow,
/// `y` yank, `x` multiply, `a` addbuff, `q` powbuff; a token starting with a
/// digit, `.`, or `-` is a plain add. Unrecognized characters are warned
/// about and skipped; a trailing mnemonic with no operand is dropped.
///
/// The trailing store is selected by the field's declared kind; kinds
/// outside the legal set fail compilation.
pub fn compile_scalar(
    code: &mut CodeStream,
    offset: u16,
    kind: ScalarKind,
    script: &str,
) -> Result<()> {
    let store = match kind {
        ScalarKind::Int | ScalarKind::Bool => OpCode::StoreI,
        ScalarKind::Float => OpCode::StoreF,
        ScalarKind::Byte => OpCode::StoreC,
        other => {
            return Err(Error::UnsupportedFieldType {
                kind: other.name(),
                script: script.to_string(),
            })
        }
    };

    let bytes = script.as_bytes();
    let mut p = 0;

    while p < bytes.len() {
        let c = bytes[p];
        p += 1;

        if c == b' ' {
            continue;
        }

        let (op, reg_operand) = match c {
            b'i' => (OpCode::Index, false),
            b'r' => (OpCode::Rand, false),
            b'd' => (OpCode::Damage, false),
            b'm' => (OpCode::Sawtooth, false),
            b'k' => (OpCode::Discrete, false),
            b's' => (OpCode::Sine, false),
            b'p' => (OpCode::Pow, false),
            b'y' => (OpCode::Yank, true),
            b'x' => (OpCode::Multiply, true),
            b'a' => (OpCode::AddBuff, true),
            b'q' => (OpCode::PowBuff, true),
            b'0'..=b'9' | b'.' | b'-' => {
                // the literal itself is the operand
                p -= 1;
                (OpCode::Add, false)
            }
            other => {
                warn!(
                    script,
                    index = p,
                    "unknown op-code '{}' in expression",
                    other as char
                );
                continue;
            }
        };

        // exit cleanly if there is no operand left for this operator
        if p >= bytes.len() {
            continue;
        }

        if reg_operand {
            let (v, used) = parse_i32_prefix(&script[p..]);
            p += used;
            code.op_reg(op, v.clamp(0, SCRATCH_SLOTS as i32 - 1));
        } else {
            let (v, used) = parse_f32_prefix(&script[p..]);
            if used == 0 && op == OpCode::Add {
                // a lone '.' or '-' never becomes a number; skip it so the
                // scan makes progress
                warn!(script, index = p, "dangling numeric literal in expression");
                p += 1;
                continue;
            }
            p += used;
            code.op_f32(op, v);
        }
    }

    code.op_store(store, offset);
    Ok(())
}

/// Parse the longest numeric prefix of `s` as an f32
///
/// Locale-independent: sign, decimal digits, optional fraction, optional
/// exponent. Returns the value and the number of bytes consumed; a prefix
/// with no digits consumes nothing and yields 0.
fn parse_f32_prefix(s: &str) -> (f32, usize) {
    let b = s.as_bytes();
    let mut i = 0;

    if i < b.len() && (b[i] == b'+' || b[i] == b'-') {
        i += 1;
    }
    let int_start = i;
    while i < b.len() && b[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;
    if i < b.len() && b[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
        digits += i - frac_start;
    }
    if digits == 0 {
        return (0.0, 0);
    }
    if i < b.len() && (b[i] == b'e' || b[i] == b'E') {
        let mut j = i + 1;
        if j < b.len() && (b[j] == b'+' || b[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < b.len() && b[j].is_ascii_digit() {
            j += 1;
        }
        // an exponent marker with no digits is not part of the number
        if j > exp_start {
            i = j;
        }
    }

    match s[..i].parse::<f32>() {
        Ok(v) => (v, i),
        Err(_) => (0.0, 0),
    }
}

/// Parse the longest decimal integer prefix of `s` as an i32
///
/// Overflow saturates, matching C `strtol`; the caller clamps register
/// indices anyway.
fn parse_i32_prefix(s: &str) -> (i32, usize) {
    let b = s.as_bytes();
    let mut i = 0;

    let negative = !b.is_empty() && b[0] == b'-';
    if i < b.len() && (b[i] == b'+' || b[i] == b'-') {
        i += 1;
    }
    let digit_start = i;
    while i < b.len() && b[i].is_ascii_digit() {
        i += 1;
    }
    if i == digit_start {
        return (0, 0);
    }

    match s[..i].parse::<i32>() {
        Ok(v) => (v, i),
        Err(_) => (if negative { i32::MIN } else { i32::MAX }, i),
    }
}
