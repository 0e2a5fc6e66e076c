// SPDX-License-Identifier: Apache-2.0

//! The symbolic backend, driven through the same derived API as `Bits`.
//!
//! Because `Signal` keeps only the gate operators natively, everything the
//! blanket layers derive is lowered to structure here. Each test builds an
//! expression over free inputs, evaluates the graph against stimulus, and
//! compares with the native `Bits` computation of the same operator.

use std::collections::HashMap;

use weft::test_utils::eval;
use weft::{Bits, Comb, Gates, Primitives, Signal, WithValid};

fn stimulus(pairs: &[(&str, Bits)]) -> HashMap<String, Bits> {
    pairs
        .iter()
        .map(|(name, bits)| (name.to_string(), bits.clone()))
        .collect()
}

fn ab_env(a: u64, b: u64, width: usize) -> HashMap<String, Bits> {
    stimulus(&[
        ("a", Bits::from_u64(width, a)),
        ("b", Bits::from_u64(width, b)),
    ])
}

#[test]
fn test_synthesized_add_sub_match_bits_exhaustively() {
    let _ = env_logger::builder().is_test(true).try_init();
    let a = Signal::input("a", 4);
    let b = Signal::input("b", 4);
    let sum = a.add(&b);
    let diff = a.sub(&b);
    assert_eq!(sum.width(), 4);
    for av in 0..16u64 {
        for bv in 0..16u64 {
            let env = ab_env(av, bv, 4);
            assert_eq!(eval(&sum, &env).to_u64(), (av + bv) & 0xf, "add {} {}", av, bv);
            assert_eq!(
                eval(&diff, &env).to_u64(),
                av.wrapping_sub(bv) & 0xf,
                "sub {} {}",
                av,
                bv
            );
        }
    }
}

#[test]
fn test_synthesized_compares_match_bits_exhaustively() {
    let a = Signal::input("a", 4);
    let b = Signal::input("b", 4);
    let eq = a.cmp_eq(&b);
    let lt = a.ult(&b);
    let sl = a.slt(&b);
    assert_eq!(eq.width(), 1);
    assert_eq!(lt.width(), 1);
    for av in 0..16u64 {
        for bv in 0..16u64 {
            let env = ab_env(av, bv, 4);
            assert_eq!(eval(&eq, &env).to_u64(), (av == bv) as u64, "eq {} {}", av, bv);
            assert_eq!(eval(&lt, &env).to_u64(), (av < bv) as u64, "ult {} {}", av, bv);
            let (sa, sb) = (
                Bits::from_u64(4, av).to_i64(),
                Bits::from_u64(4, bv).to_i64(),
            );
            assert_eq!(eval(&sl, &env).to_u64(), (sa < sb) as u64, "slt {} {}", av, bv);
        }
    }
}

#[test]
fn test_synthesized_multiplies_match_bits_exhaustively() {
    let a = Signal::input("a", 3);
    let b = Signal::input("b", 3);
    let up = a.umul(&b);
    let sp = a.smul(&b);
    assert_eq!(up.width(), 6);
    assert_eq!(sp.width(), 6);
    for av in 0..8u64 {
        for bv in 0..8u64 {
            let env = ab_env(av, bv, 3);
            assert_eq!(eval(&up, &env).to_u64(), av * bv, "umul {} {}", av, bv);
            let want = Bits::from_u64(3, av)
                .smul(&Bits::from_u64(3, bv))
                .to_u64();
            assert_eq!(eval(&sp, &env).to_u64(), want, "smul {} {}", av, bv);
        }
    }
}

#[test]
fn test_synthesized_mux_selects_and_repeats() {
    let sel = Signal::input("sel", 2);
    let cases: Vec<Signal> = (0..3).map(|i| Signal::of_u64(8, 10 + i)).collect();
    let mux = Signal::mux(&sel, &cases);
    assert_eq!(mux.width(), 8);
    for sv in 0..4u64 {
        let env = stimulus(&[("sel", Bits::from_u64(2, sv))]);
        let want = 10 + sv.min(2);
        assert_eq!(eval(&mux, &env).to_u64(), want, "sel={}", sv);
    }
}

#[test]
fn test_synthesized_tree_ops_match_bits() {
    let a = Signal::input("a", 8);
    let pc = a.popcount(2);
    let lz = a.leading_zeros(2);
    let fl = a.floor_log2(2);
    for av in 0..256u64 {
        let env = stimulus(&[("a", Bits::from_u64(8, av))]);
        assert_eq!(eval(&pc, &env).to_u64(), av.count_ones() as u64, "pc {}", av);
        assert_eq!(
            eval(&lz, &env).to_u64(),
            (av as u8).leading_zeros() as u64,
            "lz {}",
            av
        );
        let valid = eval(&fl.valid, &env).to_u64();
        if av == 0 {
            assert_eq!(valid, 0);
        } else {
            assert_eq!(valid, 1);
            assert_eq!(
                eval(&fl.data, &env).to_u64(),
                63 - av.leading_zeros() as u64,
                "fl {}",
                av
            );
        }
    }
}

#[test]
fn test_synthesized_encodings_round_trip() {
    let a = Signal::input("a", 4);
    let gray_and_back = a.binary_to_gray().gray_to_binary();
    let onehot = a.binary_to_onehot();
    let back = onehot.onehot_to_binary();
    assert_eq!(onehot.width(), 16);
    assert_eq!(back.width(), 4);
    for av in 0..16u64 {
        let env = stimulus(&[("a", Bits::from_u64(4, av))]);
        assert_eq!(eval(&gray_and_back, &env).to_u64(), av, "gray {}", av);
        assert_eq!(eval(&onehot, &env).to_u64(), 1 << av, "onehot {}", av);
        assert_eq!(eval(&back, &env).to_u64(), av, "back {}", av);
    }
}

#[test]
fn test_synthesized_priority_select() {
    let valids = Signal::input("valids", 3);
    let cases: Vec<WithValid<Signal>> = (0..3)
        .map(|i| WithValid {
            valid: valids.bit(i),
            data: Signal::of_u64(8, 50 + i as u64),
        })
        .collect();
    let picked = Signal::priority_select_with_default(2, &cases, &Signal::of_u64(8, 99));
    for v in 0..8u64 {
        let env = stimulus(&[("valids", Bits::from_u64(3, v))]);
        let want = if v & 1 != 0 {
            50
        } else if v & 2 != 0 {
            51
        } else if v & 4 != 0 {
            52
        } else {
            99
        };
        assert_eq!(eval(&picked, &env).to_u64(), want, "valids={:03b}", v);
    }
}

#[test]
fn test_random_stimulus_cross_check() {
    // A wider mixed expression on random vectors, following the
    // interpreter-vs-structure equivalence idiom.
    let mut rng = weft::rng::BitRng::new(0x5eed);
    let a = Signal::input("a", 16);
    let b = Signal::input("b", 16);
    let expr = a
        .add(&b)
        .xor(&a.and(&b.not()))
        .or(&a.ult(&b).mux2(&b.srl(3), &a.sll(1)));
    for round in 0..50 {
        let av = rng.next_bits(16);
        let bv = rng.next_bits(16);
        let want = av
            .add(&bv)
            .xor(&av.and(&bv.not()))
            .or(&av.ult(&bv).mux2(&bv.srl(3), &av.sll(1)));
        let env = stimulus(&[("a", av.clone()), ("b", bv.clone())]);
        assert_eq!(eval(&expr, &env), want, "round={}", round);
    }
}

#[test]
fn test_width_law_on_symbolic_nodes() {
    let a = Signal::input("a", 12);
    let b = Signal::input("b", 12);
    assert_eq!(a.add(&b).width(), 12);
    assert_eq!(a.umul(&b).width(), 24);
    assert_eq!(a.cmp_eq(&b).width(), 1);
    assert_eq!(a.popcount(2).width(), 4);
    assert_eq!(a.uresize(20).width(), 20);
    assert_eq!(a.sresize(6).width(), 6);
    assert_eq!(Signal::concat(&[a.clone(), b.clone()]).width(), 24);
    assert_eq!(a.repeat(3).width(), 36);
    assert_eq!(a.split(5, false).len(), 3);
    assert_eq!(a.binary_to_onehot().width(), 4096);
    assert_eq!(a.bit(3).width(), 1);
}

#[test]
fn test_naming_is_transparent_to_evaluation() {
    let a = Signal::input("a", 8);
    let named = a.with_name("stage1").with_name("stage1_alias");
    assert_eq!(named.width(), 8);
    let expr = named.add_int(1);
    let env = stimulus(&[("a", Bits::from_u64(8, 41))]);
    assert_eq!(eval(&expr, &env).to_u64(), 42);
}

#[test]
fn test_srand_is_a_constant_signal() {
    weft::rng::set_seed(7);
    let s = Signal::srand(32);
    assert!(s.as_constant().is_some());
    assert_eq!(s.width(), 32);
}

#[test]
fn test_shared_subexpression_evaluates_once_per_node() {
    // x ^ x over a deep shared node: evaluation must agree with zero and
    // complete quickly thanks to memoization.
    let a = Signal::input("a", 8);
    let mut deep = a.clone();
    for _ in 0..40 {
        deep = deep.add(&a);
    }
    let expr = deep.xor(&deep);
    let env = stimulus(&[("a", Bits::from_u64(8, 77))]);
    assert_eq!(eval(&expr, &env).to_u64(), 0);
}

#[test]
#[should_panic(expected = "not a constant")]
fn test_to_bstr_on_symbolic_is_fatal() {
    let _ = Signal::input("a", 4).to_bstr();
}
