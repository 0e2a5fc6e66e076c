// SPDX-License-Identifier: Apache-2.0

//! Width-automatic arithmetic views.
//!
//! [`Unsigned`] and [`Signed`] wrap a signal and resize operands before
//! combining so that no result can overflow: `add`/`sub` extend both sides
//! to `max(wa, wb) + 1`, comparisons to `max(wa, wb)`, and multiplication
//! produces `wa + wb` bits. The [`uop`] and [`sop`] modules expose the same
//! operations as free functions returning the raw signal type.

use crate::comb::{check_not_empty, Comb};

#[derive(Debug, Clone, PartialEq)]
pub struct Unsigned<S: Comb>(S);

#[derive(Debug, Clone, PartialEq)]
pub struct Signed<S: Comb>(S);

impl<S: Comb> Unsigned<S> {
    pub fn of_signal(signal: S) -> Self {
        check_not_empty("Unsigned::of_signal", signal.width());
        Unsigned(signal)
    }

    pub fn to_signal(self) -> S {
        self.0
    }

    pub fn signal(&self) -> &S {
        &self.0
    }

    pub fn width(&self) -> usize {
        self.0.width()
    }

    pub fn resize(&self, width: usize) -> Self {
        Unsigned(self.0.uresize(width))
    }

    fn extended(&self, other: &Self, extra: usize) -> (S, S) {
        let width = self.width().max(other.width()) + extra;
        (self.0.uresize(width), other.0.uresize(width))
    }

    pub fn add(&self, other: &Self) -> Self {
        let (a, b) = self.extended(other, 1);
        Unsigned(a.add(&b))
    }

    pub fn sub(&self, other: &Self) -> Self {
        let (a, b) = self.extended(other, 1);
        Unsigned(a.sub(&b))
    }

    pub fn mul(&self, other: &Self) -> Self {
        Unsigned(self.0.umul(&other.0))
    }

    pub fn eq(&self, other: &Self) -> Self {
        let (a, b) = self.extended(other, 0);
        Unsigned(a.cmp_eq(&b))
    }

    pub fn ne(&self, other: &Self) -> Self {
        let (a, b) = self.extended(other, 0);
        Unsigned(a.cmp_ne(&b))
    }

    pub fn lt(&self, other: &Self) -> Self {
        let (a, b) = self.extended(other, 0);
        Unsigned(a.ult(&b))
    }

    pub fn le(&self, other: &Self) -> Self {
        let (a, b) = self.extended(other, 0);
        Unsigned(a.ule(&b))
    }

    pub fn gt(&self, other: &Self) -> Self {
        let (a, b) = self.extended(other, 0);
        Unsigned(a.ugt(&b))
    }

    pub fn ge(&self, other: &Self) -> Self {
        let (a, b) = self.extended(other, 0);
        Unsigned(a.uge(&b))
    }
}

impl<S: Comb> Signed<S> {
    pub fn of_signal(signal: S) -> Self {
        check_not_empty("Signed::of_signal", signal.width());
        Signed(signal)
    }

    pub fn to_signal(self) -> S {
        self.0
    }

    pub fn signal(&self) -> &S {
        &self.0
    }

    pub fn width(&self) -> usize {
        self.0.width()
    }

    pub fn resize(&self, width: usize) -> Self {
        Signed(self.0.sresize(width))
    }

    fn extended(&self, other: &Self, extra: usize) -> (S, S) {
        let width = self.width().max(other.width()) + extra;
        (self.0.sresize(width), other.0.sresize(width))
    }

    pub fn add(&self, other: &Self) -> Self {
        let (a, b) = self.extended(other, 1);
        Signed(a.add(&b))
    }

    pub fn sub(&self, other: &Self) -> Self {
        let (a, b) = self.extended(other, 1);
        Signed(a.sub(&b))
    }

    pub fn mul(&self, other: &Self) -> Self {
        Signed(self.0.smul(&other.0))
    }

    pub fn eq(&self, other: &Self) -> Self {
        let (a, b) = self.extended(other, 0);
        Signed(a.cmp_eq(&b))
    }

    pub fn ne(&self, other: &Self) -> Self {
        let (a, b) = self.extended(other, 0);
        Signed(a.cmp_ne(&b))
    }

    pub fn lt(&self, other: &Self) -> Self {
        let (a, b) = self.extended(other, 0);
        Signed(a.slt(&b))
    }

    pub fn le(&self, other: &Self) -> Self {
        let (a, b) = self.extended(other, 0);
        Signed(a.sle(&b))
    }

    pub fn gt(&self, other: &Self) -> Self {
        let (a, b) = self.extended(other, 0);
        Signed(a.sgt(&b))
    }

    pub fn ge(&self, other: &Self) -> Self {
        let (a, b) = self.extended(other, 0);
        Signed(a.sge(&b))
    }
}

/// Unsigned width-automatic operations on the raw signal type.
pub mod uop {
    use super::Unsigned;
    use crate::comb::Comb;

    macro_rules! raw_binop {
        ($($name:ident),*) => {
            $(
                pub fn $name<S: Comb>(a: &S, b: &S) -> S {
                    Unsigned::of_signal(a.clone())
                        .$name(&Unsigned::of_signal(b.clone()))
                        .to_signal()
                }
            )*
        };
    }

    raw_binop!(add, sub, mul, eq, ne, lt, le, gt, ge);
}

/// Signed width-automatic operations on the raw signal type.
pub mod sop {
    use super::Signed;
    use crate::comb::Comb;

    macro_rules! raw_binop {
        ($($name:ident),*) => {
            $(
                pub fn $name<S: Comb>(a: &S, b: &S) -> S {
                    Signed::of_signal(a.clone())
                        .$name(&Signed::of_signal(b.clone()))
                        .to_signal()
                }
            )*
        };
    }

    raw_binop!(add, sub, mul, eq, ne, lt, le, gt, ge);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::Bits;
    use crate::comb::Comb;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unsigned_add_widths_and_values() {
        let a = Unsigned::of_signal(Bits::from_u64(4, 13));
        let b = Unsigned::of_signal(Bits::from_u64(2, 3));
        let sum = a.add(&b);
        assert_eq!(sum.width(), 5);
        assert_eq!(sum.signal().to_u64(), 16);
    }

    #[test]
    fn test_unsigned_sub_does_not_wrap_below_width() {
        let a = Unsigned::of_signal(Bits::from_u64(4, 3));
        let b = Unsigned::of_signal(Bits::from_u64(4, 5));
        // 3 - 5 in 5 bits: wraps modulo 32, not 16.
        assert_eq!(a.sub(&b).signal().to_u64(), 30);
    }

    #[test]
    fn test_signed_add_sign_extends() {
        let a = Signed::of_signal(Bits::from_i64(4, -3));
        let b = Signed::of_signal(Bits::from_i64(2, 1));
        let sum = a.add(&b);
        assert_eq!(sum.width(), 5);
        assert_eq!(sum.signal().to_i64(), -2);
    }

    #[test]
    fn test_mul_widths() {
        let a = Unsigned::of_signal(Bits::from_u64(4, 9));
        let b = Unsigned::of_signal(Bits::from_u64(3, 5));
        let p = a.mul(&b);
        assert_eq!(p.width(), 7);
        assert_eq!(p.signal().to_u64(), 45);

        let sa = Signed::of_signal(Bits::from_i64(4, -7));
        let sb = Signed::of_signal(Bits::from_i64(3, 3));
        let sp = sa.mul(&sb);
        assert_eq!(sp.width(), 7);
        assert_eq!(sp.signal().to_i64(), -21);
    }

    #[test]
    fn test_mixed_width_compare() {
        let a = Unsigned::of_signal(Bits::from_u64(8, 200));
        let b = Unsigned::of_signal(Bits::from_u64(4, 15));
        assert_eq!(a.gt(&b).signal().to_u64(), 1);

        // As signed values the 8-bit pattern is negative.
        let sa = Signed::of_signal(Bits::from_u64(8, 200));
        let sb = Signed::of_signal(Bits::from_u64(4, 15));
        assert_eq!(sa.lt(&sb).signal().to_u64(), 1);
    }

    #[test]
    fn test_uop_sop_return_raw_signals() {
        let a = Bits::from_u64(4, 7);
        let b = Bits::from_u64(6, 20);
        assert_eq!(uop::add(&a, &b).width(), 7);
        assert_eq!(uop::add(&a, &b).to_u64(), 27);
        assert_eq!(sop::lt(&a, &b).to_u64(), 1);
    }
}
