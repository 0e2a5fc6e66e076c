// SPDX-License-Identifier: Apache-2.0

//! Parser for constant literals.
//!
//! Accepted forms:
//! * plain binary: a string over `{0,1}`, width = string length;
//! * Verilog-style: `<width>'<base><digits>` with base in `{b,o,h,d}`
//!   (unsigned) or `{B,O,H,D}` (signed; sign-extends from the MSb of the
//!   literal's natural width). `_` separators are permitted in the digits.
//!
//! Decimal and hex forms with an explicit out-of-band width are exposed as
//! `parse_decimal` / `parse_hex` / `parse_hex_signed` for the corresponding
//! constructors.

use crate::bits::Bits;

#[derive(Debug)]
pub struct ParseError {
    msg: String,
}

impl ParseError {
    fn new(msg: String) -> Self {
        Self { msg }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ParseError: {}", self.msg)
    }
}

impl std::error::Error for ParseError {}

/// Dispatch: a string containing `'` parses as a Verilog-style literal,
/// anything else must be plain binary.
pub fn parse_literal(s: &str) -> Result<Bits, ParseError> {
    if s.contains('\'') {
        parse_verilog(s)
    } else {
        parse_binary(s)
    }
}

/// Parses a plain binary string; the width is the string length.
pub fn parse_binary(s: &str) -> Result<Bits, ParseError> {
    if s.is_empty() {
        return Err(ParseError::new("empty binary literal".to_string()));
    }
    let mut bools = Vec::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '0' => bools.push(false),
            '1' => bools.push(true),
            _ => {
                return Err(ParseError::new(format!(
                    "invalid character {:?} in binary literal {:?}",
                    c, s
                )))
            }
        }
    }
    // The string is MSb first.
    bools.reverse();
    Ok(Bits::from_lsb_is_0(&bools))
}

/// Parses a non-negative decimal string into `width` bits, truncating
/// modularly when the value does not fit.
pub fn parse_decimal(width: usize, s: &str) -> Result<Bits, ParseError> {
    if width == 0 {
        return Err(ParseError::new("decimal literal with width 0".to_string()));
    }
    let limbs = decimal_limbs(s)?;
    Ok(bits_of_lsb_first(width, &limbs_to_bools(&limbs), false))
}

/// Parses a hex string into `width` bits, zero-extending from the literal's
/// natural 4*n-bit width (truncating modularly when narrower).
pub fn parse_hex(width: usize, s: &str) -> Result<Bits, ParseError> {
    if width == 0 {
        return Err(ParseError::new("hex literal with width 0".to_string()));
    }
    let bools = base_digits_to_bools(s, 4, "hex")?;
    Ok(bits_of_lsb_first(width, &bools, false))
}

/// Parses a hex string into `width` bits, sign-extending from the MSb of the
/// literal's natural 4*n-bit width.
pub fn parse_hex_signed(width: usize, s: &str) -> Result<Bits, ParseError> {
    if width == 0 {
        return Err(ParseError::new("hex literal with width 0".to_string()));
    }
    let bools = base_digits_to_bools(s, 4, "hex")?;
    Ok(bits_of_lsb_first(width, &bools, true))
}

fn parse_verilog(s: &str) -> Result<Bits, ParseError> {
    let tick = s.find('\'').expect("caller checked for a tick");
    let width_str = &s[..tick];
    let rest = &s[tick + 1..];
    let width: usize = width_str
        .parse()
        .map_err(|_| ParseError::new(format!("invalid width {:?} in literal {:?}", width_str, s)))?;
    if width == 0 {
        return Err(ParseError::new(format!("zero width in literal {:?}", s)));
    }
    let mut chars = rest.chars();
    let base = chars
        .next()
        .ok_or_else(|| ParseError::new(format!("missing base character in literal {:?}", s)))?;
    let digits: String = chars.filter(|c| *c != '_').collect();
    if digits.is_empty() {
        return Err(ParseError::new(format!("missing digits in literal {:?}", s)));
    }
    let signed = base.is_ascii_uppercase();
    let bools = match base.to_ascii_lowercase() {
        'b' => base_digits_to_bools(&digits, 1, "binary")?,
        'o' => base_digits_to_bools(&digits, 3, "octal")?,
        'h' => base_digits_to_bools(&digits, 4, "hex")?,
        'd' => limbs_to_bools(&decimal_limbs(&digits)?),
        _ => {
            return Err(ParseError::new(format!(
                "invalid base character {:?} in literal {:?}",
                base, s
            )))
        }
    };
    Ok(bits_of_lsb_first(width, &bools, signed))
}

/// Converts base-2^n digit strings (MSb-digit first) into an lsb-first bool
/// vector of the literal's natural width.
fn base_digits_to_bools(
    digits: &str,
    bits_per_digit: usize,
    base_name: &str,
) -> Result<Vec<bool>, ParseError> {
    if digits.is_empty() {
        return Err(ParseError::new(format!("empty {} literal", base_name)));
    }
    let mut bools = Vec::with_capacity(digits.len() * bits_per_digit);
    for c in digits.chars().rev() {
        let v = c.to_digit(16).ok_or_else(|| {
            ParseError::new(format!("invalid {} digit {:?}", base_name, c))
        })?;
        if v >= 1 << bits_per_digit {
            return Err(ParseError::new(format!(
                "invalid {} digit {:?}",
                base_name, c
            )));
        }
        for i in 0..bits_per_digit {
            bools.push((v >> i) & 1 == 1);
        }
    }
    Ok(bools)
}

/// Accumulates a decimal digit string into 64-bit limbs (arbitrary
/// precision, little-endian limb order).
fn decimal_limbs(s: &str) -> Result<Vec<u64>, ParseError> {
    if s.is_empty() {
        return Err(ParseError::new("empty decimal literal".to_string()));
    }
    let mut limbs: Vec<u64> = vec![0];
    for c in s.chars() {
        let d = c
            .to_digit(10)
            .ok_or_else(|| ParseError::new(format!("invalid decimal digit {:?}", c)))?
            as u64;
        let mut carry = d as u128;
        for limb in limbs.iter_mut() {
            let v = (*limb as u128) * 10 + carry;
            *limb = v as u64;
            carry = v >> 64;
        }
        if carry != 0 {
            limbs.push(carry as u64);
        }
    }
    Ok(limbs)
}

/// The natural-width bool expansion of a limb value: at least one bit, no
/// leading zeros beyond that.
fn limbs_to_bools(limbs: &[u64]) -> Vec<bool> {
    let mut bools = Vec::with_capacity(limbs.len() * 64);
    for limb in limbs {
        for i in 0..64 {
            bools.push((limb >> i) & 1 == 1);
        }
    }
    while bools.len() > 1 && !*bools.last().expect("nonempty") {
        bools.pop();
    }
    bools
}

/// Resizes an lsb-first bool vector to `width`: truncates modularly, or
/// extends with zero (unsigned) / the current MSb (signed).
fn bits_of_lsb_first(width: usize, bools: &[bool], signed: bool) -> Bits {
    let fill = signed && *bools.last().expect("nonempty literal");
    let mut out = Vec::with_capacity(width);
    for i in 0..width {
        out.push(if i < bools.len() { bools[i] } else { fill });
    }
    Bits::from_lsb_is_0(&out)
}
