// SPDX-License-Identifier: Apache-2.0

//! Width-automatic arithmetic, across both backends.

use weft::typed::{sop, uop};
use weft::{Bits, Gates, Signal, Signed, Unsigned};

#[test]
fn test_unsigned_arithmetic_never_overflows() {
    for a in 0..16u64 {
        for b in 0..8u64 {
            let ua = Unsigned::of_signal(Bits::from_u64(4, a));
            let ub = Unsigned::of_signal(Bits::from_u64(3, b));
            let sum = ua.add(&ub);
            assert_eq!(sum.width(), 5);
            assert_eq!(sum.signal().to_u64(), a + b, "a={} b={}", a, b);
            let product = ua.mul(&ub);
            assert_eq!(product.width(), 7);
            assert_eq!(product.signal().to_u64(), a * b, "a={} b={}", a, b);
        }
    }
}

#[test]
fn test_signed_arithmetic_never_overflows() {
    for a in -8i64..8 {
        for b in -4i64..4 {
            let sa = Signed::of_signal(Bits::from_i64(4, a));
            let sb = Signed::of_signal(Bits::from_i64(3, b));
            let sum = sa.add(&sb);
            assert_eq!(sum.width(), 5);
            assert_eq!(sum.signal().to_i64(), a + b, "a={} b={}", a, b);
            let diff = sa.sub(&sb);
            assert_eq!(diff.signal().to_i64(), a - b, "a={} b={}", a, b);
            let product = sa.mul(&sb);
            assert_eq!(product.width(), 7);
            assert_eq!(product.signal().to_i64(), a * b, "a={} b={}", a, b);
        }
    }
}

#[test]
fn test_comparisons_extend_without_arithmetic_headroom() {
    for a in 0..16u64 {
        for b in 0..8u64 {
            let ua = Unsigned::of_signal(Bits::from_u64(4, a));
            let ub = Unsigned::of_signal(Bits::from_u64(3, b));
            assert_eq!(ua.lt(&ub).signal().to_u64(), (a < b) as u64);
            assert_eq!(ua.le(&ub).signal().to_u64(), (a <= b) as u64);
            assert_eq!(ua.gt(&ub).signal().to_u64(), (a > b) as u64);
            assert_eq!(ua.ge(&ub).signal().to_u64(), (a >= b) as u64);
            assert_eq!(ua.eq(&ub).signal().to_u64(), (a == b) as u64);
            assert_eq!(ua.ne(&ub).signal().to_u64(), (a != b) as u64);
        }
    }
    for a in -8i64..8 {
        for b in -4i64..4 {
            let sa = Signed::of_signal(Bits::from_i64(4, a));
            let sb = Signed::of_signal(Bits::from_i64(3, b));
            assert_eq!(sa.lt(&sb).signal().to_u64(), (a < b) as u64, "a={} b={}", a, b);
            assert_eq!(sa.ge(&sb).signal().to_u64(), (a >= b) as u64, "a={} b={}", a, b);
        }
    }
}

#[test]
fn test_view_tags_are_identity() {
    let raw = Bits::from_u64(6, 33);
    let tagged = Unsigned::of_signal(raw.clone());
    assert_eq!(tagged.clone().to_signal(), raw);
    assert_eq!(tagged.width(), 6);
    let signed = Signed::of_signal(raw.clone());
    assert_eq!(signed.to_signal(), raw);
}

#[test]
fn test_resize_views() {
    let u8v = Unsigned::of_signal(Bits::from_u64(4, 9)).resize(8);
    assert_eq!(u8v.signal().to_u64(), 9);
    let s8v = Signed::of_signal(Bits::from_i64(4, -7)).resize(8);
    assert_eq!(s8v.signal().to_i64(), -7);
}

#[test]
fn test_raw_ops_on_symbolic_backend() {
    let a = Signal::input("a", 9);
    let b = Signal::input("b", 5);
    assert_eq!(uop::add(&a, &b).width(), 10);
    assert_eq!(sop::add(&a, &b).width(), 10);
    assert_eq!(uop::mul(&a, &b).width(), 14);
    assert_eq!(uop::lt(&a, &b).width(), 1);
    assert_eq!(sop::ge(&a, &b).width(), 1);
}

#[test]
fn test_raw_ops_values() {
    let a = Bits::from_u64(4, 12);
    let b = Bits::from_u64(2, 3);
    assert_eq!(uop::add(&a, &b).to_u64(), 15);
    assert_eq!(uop::sub(&b, &a).to_u64(), 0b10111); // -9 in 5 bits
    assert_eq!(sop::mul(&a, &b).to_i64(), 4); // -4 * -1
    assert_eq!(uop::mul(&a, &b).to_u64(), 36);
}
