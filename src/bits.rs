//! Text form of bit sequences: one `'0'` or `'1'` character per bit.

use bitvec::prelude::*;

use crate::error::{Error, Result};

/// Renders bits as a string of binary digits, first bit first.
pub fn to_digits(bits: &BitSlice) -> String {
    bits.iter()
        .by_vals()
        .map(|b| if b { '1' } else { '0' })
        .collect()
}

/// Parses a string of binary digits. Anything besides `'0'` and `'1'` is
/// rejected, including whitespace.
pub fn from_digits(digits: &str) -> Result<BitVec> {
    let mut out = BitVec::with_capacity(digits.len());
    for (position, found) in digits.chars().enumerate() {
        match found {
            '0' => out.push(false),
            '1' => out.push(true),
            _ => return Err(Error::InvalidDigit { found, position }),
        }
    }

    Ok(out)
}
