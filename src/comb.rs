// SPDX-License-Identifier: Apache-2.0

//! The combinational trait tower.
//!
//! * [`Gates`] is the backend contract: constants, width, concatenation,
//!   bit-range selection, naming, and the bitwise operators.
//! * [`Primitives`] adds mux, add, sub, multiplies, equality, and unsigned
//!   less-than. Every method has a provided body synthesized from `Gates`
//!   alone (decoded AND-OR mux, ripple-carry arithmetic, borrow-out
//!   compare); a backend may override any subset natively.
//! * [`Comb`] is the full derived surface, provided entirely as default
//!   methods and blanket-implemented for every `Primitives` type.
//!
//! Width contracts are enforced uniformly through the `check_*` helpers in
//! this module; violations are fatal.

use crate::bits::Bits;
use crate::const_parser;
use crate::rng;

pub(crate) fn check_same_width(op: &str, a: usize, b: usize) {
    assert!(
        a == b,
        "{}: operand width mismatch: {} vs {}",
        op,
        a,
        b
    );
}

pub(crate) fn check_not_empty(op: &str, width: usize) {
    assert!(width != 0, "{}: empty signal operand", op);
}

/// Validates mux preconditions shared by every backend and returns the
/// common case width.
pub(crate) fn check_mux_cases<G: Gates>(sel: &G, cases: &[G]) -> usize {
    check_not_empty("mux", sel.width());
    assert!(
        cases.len() >= 2,
        "mux: requires at least 2 cases, got {}",
        cases.len()
    );
    if sel.width() < usize::BITS as usize {
        assert!(
            cases.len() <= 1usize << sel.width(),
            "mux: {} cases exceed the 2^{} values of the selector",
            cases.len(),
            sel.width()
        );
    }
    let width = cases[0].width();
    for case in cases {
        check_not_empty("mux", case.width());
        check_same_width("mux", width, case.width());
    }
    width
}

/// Ceiling log2: the smallest `k` with `2^k >= n`. `clog2(1) == 0`.
pub(crate) fn clog2(n: usize) -> usize {
    let mut k = 0;
    while (1usize << k) < n {
        k += 1;
    }
    k
}

/// A (1-bit valid, data) pair: optional data of fixed width.
#[derive(Debug, Clone, PartialEq)]
pub struct WithValid<S> {
    pub valid: S,
    pub data: S,
}

/// The minimal operator set a backend must provide.
pub trait Gates: Clone + PartialEq + std::fmt::Debug {
    /// The sole zero-width value.
    fn empty() -> Self;

    fn width(&self) -> usize;

    /// Injects a concrete bit pattern as a constant signal.
    fn of_constant(value: Bits) -> Self;

    /// Concatenation; the head of the list supplies the MSbs. All parts
    /// must be non-empty and the list non-empty.
    fn concat(parts: &[Self]) -> Self;

    /// Inclusive bit range `[hi:lo]`; fails outside `0 <= lo <= hi < width`.
    fn select(&self, hi: usize, lo: usize) -> Self;

    /// Attaches a name; the result is equal in value and width.
    fn with_name(&self, name: &str) -> Self;

    fn and(&self, other: &Self) -> Self;
    fn or(&self, other: &Self) -> Self;
    fn xor(&self, other: &Self) -> Self;
    fn not(&self) -> Self;

    /// The bit pattern, for constant signals only.
    fn as_constant(&self) -> Option<Bits>;

    fn is_empty(&self) -> bool {
        self.width() == 0
    }
}

fn const_of<G: Gates>(width: usize, value: u64) -> G {
    G::of_constant(Bits::from_u64(width, value))
}

fn replicate<G: Gates>(bit: &G, count: usize) -> G {
    G::concat(&vec![bit.clone(); count])
}

/// Balanced binary reduction, splitting the list in half at each level.
fn reduce_tree<G: Gates, F: Fn(&G, &G) -> G>(f: &F, items: &[G]) -> G {
    if items.len() == 1 {
        return items[0].clone();
    }
    let (lo, hi) = items.split_at(items.len() / 2);
    let lhs = reduce_tree(f, lo);
    let rhs = reduce_tree(f, hi);
    f(&lhs, &rhs)
}

/// Bitwise equality from gates: AND-reduce the per-bit XNORs.
fn gates_eq<G: Gates>(a: &G, b: &G) -> G {
    let xnors: Vec<G> = (0..a.width())
        .map(|i| a.select(i, i).xor(&b.select(i, i)).not())
        .collect();
    reduce_tree(&|x: &G, y: &G| x.and(y), &xnors)
}

fn gates_eq_u64<G: Gates>(a: &G, value: u64) -> G {
    gates_eq(a, &const_of(a.width(), value))
}

/// Ripple-carry addition from gates. Returns `(carry_out, sum)`; the sum
/// has the operand width.
fn gates_ripple_add<G: Gates>(a: &G, b: &G, carry_in: G) -> (G, G) {
    let mut carry = carry_in;
    let mut sums = Vec::with_capacity(a.width());
    for i in 0..a.width() {
        // sum = a ^ b ^ cin, cout = maj(a, b, cin)
        let ai = a.select(i, i);
        let bi = b.select(i, i);
        sums.push(ai.xor(&bi).xor(&carry));
        let ab = ai.and(&bi);
        let ac = ai.and(&carry);
        let bc = bi.and(&carry);
        carry = ab.or(&ac).or(&bc);
    }
    sums.reverse();
    (carry, G::concat(&sums))
}

/// Shift-add multiplication from gates, modulo `2^width`. `a` must already
/// be `width` bits wide; one partial product is accumulated per entry of
/// `multiplier_bits` (lsb-first single-bit signals).
fn gates_shift_add_mul<G: Gates>(a: &G, multiplier_bits: &[G], width: usize) -> G {
    let mut acc = const_of(width, 0);
    for (i, bit) in multiplier_bits.iter().enumerate() {
        if i >= width {
            break;
        }
        let shifted = if i == 0 {
            a.clone()
        } else {
            G::concat(&[a.select(width - 1 - i, 0), const_of(i, 0)])
        };
        let masked = shifted.and(&replicate(bit, width));
        acc = gates_ripple_add(&acc, &masked, const_of(1, 0)).1;
    }
    acc
}

/// Gates plus the synthesizable primitive operators. The provided bodies
/// are the reference synthesis from `Gates` alone; `Bits` overrides them
/// with direct bit-level algorithms, the symbolic backend takes them as-is
/// so every built graph is structural.
pub trait Primitives: Gates {
    /// Multiplexer over a list: `cases[sel]`, with selector values past the
    /// end of the list repeating the final case. Requires 2 to
    /// `2^width(sel)` cases of one common width.
    fn mux(sel: &Self, cases: &[Self]) -> Self {
        let width = check_mux_cases(sel, cases);
        let n = cases.len();
        log::trace!("mux synthesis; cases: {} width: {}", n, width);
        // Decode each selector value; the final case absorbs the rest of
        // the address space, which is what repeats it for short lists.
        let mut selected: Vec<Self> = (0..n - 1)
            .map(|i| gates_eq_u64(sel, i as u64))
            .collect();
        let any_lower = reduce_tree(&|a: &Self, b: &Self| a.or(b), &selected);
        selected.push(any_lower.not());
        let masked: Vec<Self> = selected
            .iter()
            .zip(cases)
            .map(|(sel_i, case)| replicate(sel_i, width).and(case))
            .collect();
        reduce_tree(&|a: &Self, b: &Self| a.or(b), &masked)
    }

    /// Modular addition; equal widths, result has the operand width.
    fn add(&self, rhs: &Self) -> Self {
        check_not_empty("add", self.width());
        check_same_width("add", self.width(), rhs.width());
        gates_ripple_add(self, rhs, const_of(1, 0)).1
    }

    /// Modular subtraction, as `a + !b + 1`.
    fn sub(&self, rhs: &Self) -> Self {
        check_not_empty("sub", self.width());
        check_same_width("sub", self.width(), rhs.width());
        gates_ripple_add(self, &rhs.not(), const_of(1, 1)).1
    }

    /// Unsigned multiply; result width is the sum of the operand widths.
    fn umul(&self, rhs: &Self) -> Self {
        check_not_empty("umul", self.width());
        check_not_empty("umul", rhs.width());
        let width = self.width() + rhs.width();
        let a_ext = Self::concat(&[const_of(rhs.width(), 0), self.clone()]);
        let multiplier: Vec<Self> = (0..rhs.width()).map(|i| rhs.select(i, i)).collect();
        gates_shift_add_mul(&a_ext, &multiplier, width)
    }

    /// Signed (two's-complement) multiply; result width is the sum of the
    /// operand widths.
    fn smul(&self, rhs: &Self) -> Self {
        check_not_empty("smul", self.width());
        check_not_empty("smul", rhs.width());
        // Sign-extend both operands to the product width; the low product
        // bits of the extended multiply are the signed product.
        let width = self.width() + rhs.width();
        let a_msb = self.select(self.width() - 1, self.width() - 1);
        let b_msb = rhs.select(rhs.width() - 1, rhs.width() - 1);
        let a_ext = Self::concat(&[replicate(&a_msb, rhs.width()), self.clone()]);
        let b_ext = Self::concat(&[replicate(&b_msb, self.width()), rhs.clone()]);
        let multiplier: Vec<Self> = (0..width).map(|i| b_ext.select(i, i)).collect();
        gates_shift_add_mul(&a_ext, &multiplier, width)
    }

    /// Bitwise equality; equal widths, 1-bit result.
    fn cmp_eq(&self, rhs: &Self) -> Self {
        check_not_empty("cmp_eq", self.width());
        check_same_width("cmp_eq", self.width(), rhs.width());
        gates_eq(self, rhs)
    }

    /// Unsigned less-than via the subtract borrow; equal widths, 1-bit
    /// result.
    fn ult(&self, rhs: &Self) -> Self {
        check_not_empty("ult", self.width());
        check_same_width("ult", self.width(), rhs.width());
        gates_ripple_add(self, &rhs.not(), const_of(1, 1)).0.not()
    }
}

/// Flips the sign bit, turning a signed comparison into an unsigned one.
fn flip_msb<G: Gates>(s: &G) -> G {
    let w = s.width();
    s.xor(&G::of_constant(Bits::single_bit(w, w - 1)))
}

/// Recursive `branching_factor`-ary combining over an arbitrary node type;
/// depth is `ceil(log_b n)`. Single-element chunks pass through unchanged.
fn tree_levels<T: Clone, F: Fn(&[T]) -> T>(branching_factor: usize, f: &F, inputs: &[T]) -> T {
    assert!(
        branching_factor >= 2,
        "tree: branching factor must be >= 2, got {}",
        branching_factor
    );
    assert!(!inputs.is_empty(), "tree: empty input list");
    let mut level: Vec<T> = inputs.to_vec();
    while level.len() > 1 {
        log::trace!("tree level; nodes: {}", level.len());
        level = level
            .chunks(branching_factor)
            .map(|chunk| {
                if chunk.len() == 1 {
                    chunk[0].clone()
                } else {
                    f(chunk)
                }
            })
            .collect();
    }
    level.into_iter().next().expect("tree produced one node")
}

/// The full combinational surface, derived from [`Primitives`].
pub trait Comb: Primitives {
    // --- constants -------------------------------------------------------

    fn zero(width: usize) -> Self {
        Self::of_constant(Bits::zero(width))
    }

    fn ones(width: usize) -> Self {
        Self::of_constant(Bits::all_ones(width))
    }

    fn one(width: usize) -> Self {
        Self::of_u64(width, 1)
    }

    /// 1-bit constant 1.
    fn vdd() -> Self {
        Self::of_u64(1, 1)
    }

    /// 1-bit constant 0.
    fn gnd() -> Self {
        Self::of_u64(1, 0)
    }

    fn of_u64(width: usize, value: u64) -> Self {
        Self::of_constant(Bits::from_u64(width, value))
    }

    fn of_i64(width: usize, value: i64) -> Self {
        Self::of_constant(Bits::from_i64(width, value))
    }

    /// Binary-string constant; width = string length.
    fn of_bstr(s: &str) -> Self {
        match const_parser::parse_binary(s) {
            Ok(bits) => Self::of_constant(bits),
            Err(e) => panic!("bad constant {:?}: {}", s, e),
        }
    }

    /// Decimal-string constant with explicit width.
    fn of_decimal(width: usize, s: &str) -> Self {
        match const_parser::parse_decimal(width, s) {
            Ok(bits) => Self::of_constant(bits),
            Err(e) => panic!("bad constant {:?}: {}", s, e),
        }
    }

    /// Hex-string constant with explicit width, zero-extended.
    fn of_hex(width: usize, s: &str) -> Self {
        match const_parser::parse_hex(width, s) {
            Ok(bits) => Self::of_constant(bits),
            Err(e) => panic!("bad constant {:?}: {}", s, e),
        }
    }

    /// Hex-string constant with explicit width, sign-extended from the
    /// literal's top nibble bit.
    fn of_hex_signed(width: usize, s: &str) -> Self {
        match const_parser::parse_hex_signed(width, s) {
            Ok(bits) => Self::of_constant(bits),
            Err(e) => panic!("bad constant {:?}: {}", s, e),
        }
    }

    /// Constant from either a Verilog-style literal (`8'hff`) or a plain
    /// binary string.
    fn of_string(s: &str) -> Self {
        match const_parser::parse_literal(s) {
            Ok(bits) => Self::of_constant(bits),
            Err(e) => panic!("bad constant {:?}: {}", s, e),
        }
    }

    /// Random constant from the thread-local deterministic PRNG; see
    /// [`crate::rng::set_seed`].
    fn srand(width: usize) -> Self {
        Self::of_constant(rng::random_bits(width))
    }

    // --- conversion ------------------------------------------------------

    /// The bit pattern of a constant signal; fatal on symbolic signals.
    fn expect_constant(&self, op: &str) -> Bits {
        match self.as_constant() {
            Some(bits) => bits,
            None => panic!("{}: signal is not a constant", op),
        }
    }

    fn to_u64(&self) -> u64 {
        self.expect_constant("to_u64").to_u64()
    }

    fn to_i64(&self) -> i64 {
        self.expect_constant("to_i64").to_i64()
    }

    fn to_u32(&self) -> u32 {
        self.expect_constant("to_u32").to_u32()
    }

    fn to_i32(&self) -> i32 {
        self.expect_constant("to_i32").to_i32()
    }

    /// Binary string of a constant signal, MSb first.
    fn to_bstr(&self) -> String {
        self.expect_constant("to_bstr").to_bstr()
    }

    // --- selection / slicing --------------------------------------------

    fn bit(&self, index: usize) -> Self {
        self.select(index, index)
    }

    fn msb(&self) -> Self {
        check_not_empty("msb", self.width());
        self.bit(self.width() - 1)
    }

    fn lsb(&self) -> Self {
        check_not_empty("lsb", self.width());
        self.bit(0)
    }

    /// All bits except the LSb; empty for a 1-bit signal.
    fn msbs(&self) -> Self {
        check_not_empty("msbs", self.width());
        self.select_e(self.width() - 1, 1)
    }

    /// All bits except the MSb; empty for a 1-bit signal.
    fn lsbs(&self) -> Self {
        check_not_empty("lsbs", self.width());
        self.select_e(self.width().wrapping_sub(2), 0)
    }

    fn drop_bottom(&self, n: usize) -> Self {
        check_not_empty("drop_bottom", self.width());
        assert!(
            n <= self.width(),
            "drop_bottom: cannot drop {} bits of a {}-bit signal",
            n,
            self.width()
        );
        self.select_e(self.width().wrapping_sub(1), n)
    }

    fn drop_top(&self, n: usize) -> Self {
        check_not_empty("drop_top", self.width());
        assert!(
            n <= self.width(),
            "drop_top: cannot drop {} bits of a {}-bit signal",
            n,
            self.width()
        );
        self.select_e(self.width().wrapping_sub(n + 1), 0)
    }

    fn sel_bottom(&self, n: usize) -> Self {
        check_not_empty("sel_bottom", self.width());
        assert!(
            n <= self.width(),
            "sel_bottom: cannot take {} bits of a {}-bit signal",
            n,
            self.width()
        );
        self.select_e(n.wrapping_sub(1), 0)
    }

    fn sel_top(&self, n: usize) -> Self {
        check_not_empty("sel_top", self.width());
        assert!(
            n <= self.width(),
            "sel_top: cannot take {} bits of a {}-bit signal",
            n,
            self.width()
        );
        self.select_e(self.width().wrapping_sub(1), self.width() - n)
    }

    /// Replaces bits `[at + width(f) - 1 : at]` of `self` with `f`.
    fn insert(&self, f: &Self, at: usize) -> Self {
        check_not_empty("insert", self.width());
        check_not_empty("insert", f.width());
        assert!(
            at + f.width() <= self.width(),
            "insert: field of {} bits at offset {} does not fit in {} bits",
            f.width(),
            at,
            self.width()
        );
        let bottom = if at == 0 {
            Self::empty()
        } else {
            self.select(at - 1, 0)
        };
        let top = if at + f.width() == self.width() {
            Self::empty()
        } else {
            self.select(self.width() - 1, at + f.width())
        };
        Self::concat_e(&[top, f.clone(), bottom])
    }

    /// Bit reversal.
    fn reverse(&self) -> Self {
        check_not_empty("reverse", self.width());
        Self::concat(&self.bits_lsb_first())
    }

    /// `n` concatenated copies; `n >= 1`.
    fn repeat(&self, n: usize) -> Self {
        check_not_empty("repeat", self.width());
        assert!(n >= 1, "repeat: count must be >= 1");
        Self::concat(&vec![self.clone(); n])
    }

    /// `(bottom, top)` halves; the width must be even.
    fn split_in_half(&self) -> (Self, Self) {
        check_not_empty("split_in_half", self.width());
        assert!(
            self.width() % 2 == 0,
            "split_in_half: width {} is odd",
            self.width()
        );
        let half = self.width() / 2;
        (self.sel_bottom(half), self.sel_top(half))
    }

    /// Splits into parts of `part_width`, LSb-first. With `exact`, the
    /// width must divide evenly; otherwise the final part may be shorter.
    fn split(&self, part_width: usize, exact: bool) -> Vec<Self> {
        check_not_empty("split", self.width());
        assert!(part_width >= 1, "split: part width must be >= 1");
        if exact {
            assert!(
                self.width() % part_width == 0,
                "split: width {} is not a multiple of {}",
                self.width(),
                part_width
            );
        }
        let mut parts = Vec::new();
        let mut lo = 0;
        while lo < self.width() {
            let hi = (lo + part_width - 1).min(self.width() - 1);
            parts.push(self.select(hi, lo));
            lo += part_width;
        }
        parts
    }

    /// Concatenation that first filters out empty parts; the result is
    /// empty when nothing remains.
    fn concat_e(parts: &[Self]) -> Self {
        let nonempty: Vec<Self> = parts.iter().filter(|p| !p.is_empty()).cloned().collect();
        if nonempty.is_empty() {
            Self::empty()
        } else {
            Self::concat(&nonempty)
        }
    }

    /// Selection that returns the empty signal instead of failing on an
    /// out-of-range or inverted range.
    fn select_e(&self, hi: usize, lo: usize) -> Self {
        if self.is_empty() || lo > hi || hi >= self.width() {
            Self::empty()
        } else {
            self.select(hi, lo)
        }
    }

    /// Single-bit signals, MSb first.
    fn bits_msb_first(&self) -> Vec<Self> {
        check_not_empty("bits_msb_first", self.width());
        (0..self.width()).rev().map(|i| self.bit(i)).collect()
    }

    /// Single-bit signals, index 0 = LSb.
    fn bits_lsb_first(&self) -> Vec<Self> {
        check_not_empty("bits_lsb_first", self.width());
        (0..self.width()).map(|i| self.bit(i)).collect()
    }

    // --- resize ----------------------------------------------------------

    /// Zero-extend to grow, keep the low bits to shrink.
    fn uresize(&self, new_width: usize) -> Self {
        check_not_empty("uresize", self.width());
        assert!(new_width >= 1, "uresize: width must be >= 1");
        let w = self.width();
        if new_width == w {
            self.clone()
        } else if new_width < w {
            self.select(new_width - 1, 0)
        } else {
            Self::concat(&[Self::zero(new_width - w), self.clone()])
        }
    }

    /// Sign-extend (MSb replication) to grow, keep the low bits to shrink.
    fn sresize(&self, new_width: usize) -> Self {
        check_not_empty("sresize", self.width());
        assert!(new_width >= 1, "sresize: width must be >= 1");
        let w = self.width();
        if new_width == w {
            self.clone()
        } else if new_width < w {
            self.select(new_width - 1, 0)
        } else {
            Self::concat(&[self.msb().repeat(new_width - w), self.clone()])
        }
    }

    /// Zero-extend by one bit.
    fn ue(&self) -> Self {
        self.uresize(self.width() + 1)
    }

    /// Sign-extend by one bit.
    fn se(&self) -> Self {
        self.sresize(self.width() + 1)
    }

    // --- logical ---------------------------------------------------------

    /// 1-bit test for `self != 0`.
    fn nez(&self) -> Self {
        self.or_reduce()
    }

    /// 1-bit test for `self == 0`.
    fn ez(&self) -> Self {
        self.nez().not()
    }

    /// Reduces both sides through `nez` before combining.
    fn logical_and(&self, other: &Self) -> Self {
        self.nez().and(&other.nez())
    }

    fn logical_or(&self, other: &Self) -> Self {
        self.nez().or(&other.nez())
    }

    fn and_reduce(&self) -> Self {
        check_not_empty("and_reduce", self.width());
        reduce_tree(&|a: &Self, b: &Self| a.and(b), &self.bits_lsb_first())
    }

    fn or_reduce(&self) -> Self {
        check_not_empty("or_reduce", self.width());
        reduce_tree(&|a: &Self, b: &Self| a.or(b), &self.bits_lsb_first())
    }

    fn xor_reduce(&self) -> Self {
        check_not_empty("xor_reduce", self.width());
        reduce_tree(&|a: &Self, b: &Self| a.xor(b), &self.bits_lsb_first())
    }

    // --- relational ------------------------------------------------------

    fn cmp_ne(&self, rhs: &Self) -> Self {
        self.cmp_eq(rhs).not()
    }

    fn ule(&self, rhs: &Self) -> Self {
        rhs.ult(self).not()
    }

    fn ugt(&self, rhs: &Self) -> Self {
        rhs.ult(self)
    }

    fn uge(&self, rhs: &Self) -> Self {
        self.ult(rhs).not()
    }

    /// Signed less-than: unsigned compare with both sign bits flipped.
    fn slt(&self, rhs: &Self) -> Self {
        check_not_empty("slt", self.width());
        check_same_width("slt", self.width(), rhs.width());
        flip_msb(self).ult(&flip_msb(rhs))
    }

    fn sle(&self, rhs: &Self) -> Self {
        rhs.slt(self).not()
    }

    fn sgt(&self, rhs: &Self) -> Self {
        rhs.slt(self)
    }

    fn sge(&self, rhs: &Self) -> Self {
        self.slt(rhs).not()
    }

    // --- integer-promoted variants --------------------------------------

    fn add_int(&self, rhs: i64) -> Self {
        self.add(&Self::of_i64(self.width(), rhs))
    }

    fn sub_int(&self, rhs: i64) -> Self {
        self.sub(&Self::of_i64(self.width(), rhs))
    }

    fn umul_int(&self, rhs: i64) -> Self {
        self.umul(&Self::of_i64(self.width(), rhs))
    }

    fn smul_int(&self, rhs: i64) -> Self {
        self.smul(&Self::of_i64(self.width(), rhs))
    }

    fn and_int(&self, rhs: i64) -> Self {
        self.and(&Self::of_i64(self.width(), rhs))
    }

    fn or_int(&self, rhs: i64) -> Self {
        self.or(&Self::of_i64(self.width(), rhs))
    }

    fn xor_int(&self, rhs: i64) -> Self {
        self.xor(&Self::of_i64(self.width(), rhs))
    }

    fn cmp_eq_int(&self, rhs: i64) -> Self {
        self.cmp_eq(&Self::of_i64(self.width(), rhs))
    }

    fn cmp_ne_int(&self, rhs: i64) -> Self {
        self.cmp_ne(&Self::of_i64(self.width(), rhs))
    }

    fn ult_int(&self, rhs: i64) -> Self {
        self.ult(&Self::of_i64(self.width(), rhs))
    }

    fn ule_int(&self, rhs: i64) -> Self {
        self.ule(&Self::of_i64(self.width(), rhs))
    }

    fn ugt_int(&self, rhs: i64) -> Self {
        self.ugt(&Self::of_i64(self.width(), rhs))
    }

    fn uge_int(&self, rhs: i64) -> Self {
        self.uge(&Self::of_i64(self.width(), rhs))
    }

    fn slt_int(&self, rhs: i64) -> Self {
        self.slt(&Self::of_i64(self.width(), rhs))
    }

    fn sle_int(&self, rhs: i64) -> Self {
        self.sle(&Self::of_i64(self.width(), rhs))
    }

    fn sgt_int(&self, rhs: i64) -> Self {
        self.sgt(&Self::of_i64(self.width(), rhs))
    }

    fn sge_int(&self, rhs: i64) -> Self {
        self.sge(&Self::of_i64(self.width(), rhs))
    }

    // --- shifts ----------------------------------------------------------

    /// Shift left logical by a constant distance; distances >= width give
    /// all-zero.
    fn sll(&self, n: usize) -> Self {
        check_not_empty("sll", self.width());
        let w = self.width();
        if n == 0 {
            self.clone()
        } else if n >= w {
            Self::zero(w)
        } else {
            Self::concat(&[self.select(w - 1 - n, 0), Self::zero(n)])
        }
    }

    /// Shift right logical by a constant distance.
    fn srl(&self, n: usize) -> Self {
        check_not_empty("srl", self.width());
        let w = self.width();
        if n == 0 {
            self.clone()
        } else if n >= w {
            Self::zero(w)
        } else {
            Self::concat(&[Self::zero(n), self.select(w - 1, n)])
        }
    }

    /// Arithmetic shift right: fills with the sign bit.
    fn sra(&self, n: usize) -> Self {
        check_not_empty("sra", self.width());
        let w = self.width();
        if n == 0 {
            self.clone()
        } else if n >= w {
            self.msb().repeat(w)
        } else {
            Self::concat(&[self.msb().repeat(n), self.select(w - 1, n)])
        }
    }

    /// Dynamic shift by recursive halving: for each bit of `distance`,
    /// conditionally applies `op` by `2^i` through a mux2. The circuit
    /// depth is `width(distance)`.
    fn log_shift<F>(&self, op: F, distance: &Self) -> Self
    where
        F: Fn(&Self, usize) -> Self,
    {
        check_not_empty("log_shift", self.width());
        check_not_empty("log_shift", distance.width());
        assert!(
            distance.width() < usize::BITS as usize,
            "log_shift: distance of {} bits cannot be applied",
            distance.width()
        );
        let mut acc = self.clone();
        for i in 0..distance.width() {
            let shifted = op(&acc, 1usize << i);
            acc = distance.bit(i).mux2(&shifted, &acc);
        }
        acc
    }

    // --- mux family ------------------------------------------------------

    /// Two-way mux on a 1-bit selector: `self ? on_true : on_false`.
    fn mux2(&self, on_true: &Self, on_false: &Self) -> Self {
        assert!(
            self.width() == 1,
            "mux2: selector must be 1 bit, got {}",
            self.width()
        );
        Self::mux(self, &[on_false.clone(), on_true.clone()])
    }

    /// Mux over `f(0), ..., f(n - 1)`.
    fn mux_init<F>(sel: &Self, n: usize, mut f: F) -> Self
    where
        F: FnMut(usize) -> Self,
    {
        let cases: Vec<Self> = (0..n).map(&mut f).collect();
        Self::mux(sel, &cases)
    }

    /// Compares `self` against each literal key; the first match wins,
    /// otherwise `default`.
    fn cases(&self, default: &Self, table: &[(u64, Self)]) -> Self {
        check_not_empty("cases", self.width());
        let mut acc = default.clone();
        for (key, value) in table.iter().rev() {
            acc = self
                .cmp_eq(&Self::of_u64(self.width(), *key))
                .mux2(value, &acc);
        }
        acc
    }

    /// Like [`Comb::cases`], but the values may differ in width: all are
    /// resized to the widest via `resize` first. A missing default is zero.
    fn matches_resized<F>(&self, resize: F, default: Option<&Self>, table: &[(u64, Self)]) -> Self
    where
        F: Fn(&Self, usize) -> Self,
    {
        assert!(!table.is_empty(), "matches: empty case table");
        let mut width = default.map(|d| d.width()).unwrap_or(0);
        for (_, value) in table {
            width = width.max(value.width());
        }
        let resized: Vec<(u64, Self)> = table
            .iter()
            .map(|(k, v)| (*k, resize(v, width)))
            .collect();
        let default = match default {
            Some(d) => resize(d, width),
            None => Self::zero(width),
        };
        self.cases(&default, &resized)
    }

    /// [`Comb::matches_resized`] with `uresize`.
    fn matches(&self, default: Option<&Self>, table: &[(u64, Self)]) -> Self {
        self.matches_resized(|s, w| s.uresize(w), default, table)
    }

    /// Priority mux: the value of the first case whose 1-bit condition is
    /// high, else `default`.
    fn pmux(table: &[(Self, Self)], default: &Self) -> Self {
        let mut acc = default.clone();
        for (cond, value) in table.iter().rev() {
            acc = cond.mux2(value, &acc);
        }
        acc
    }

    /// [`Comb::pmux`] without a default; the caller guarantees at most one
    /// condition is high.
    fn pmuxl(table: &[(Self, Self)]) -> Self {
        assert!(!table.is_empty(), "pmuxl: empty case table");
        let (last, rest) = table.split_last().expect("nonempty table");
        Self::pmux(rest, &last.1)
    }

    /// One-hot select: ORs together each value masked by its condition;
    /// zero when no condition is high.
    fn pmux1h(table: &[(Self, Self)]) -> Self {
        assert!(!table.is_empty(), "pmux1h: empty case table");
        let width = table[0].1.width();
        let masked: Vec<Self> = table
            .iter()
            .map(|(cond, value)| {
                assert!(
                    cond.width() == 1,
                    "pmux1h: condition must be 1 bit, got {}",
                    cond.width()
                );
                check_same_width("pmux1h", width, value.width());
                cond.repeat(width).and(value)
            })
            .collect();
        reduce_tree(&|a: &Self, b: &Self| a.or(b), &masked)
    }

    // --- structural generators ------------------------------------------

    /// Recursively partitions `inputs` into chunks of at most
    /// `branching_factor`, applying `f` to each chunk until one element
    /// remains. Depth is `ceil(log_b n)`.
    fn tree<F>(branching_factor: usize, f: F, inputs: &[Self]) -> Self
    where
        F: Fn(&[Self]) -> Self,
    {
        tree_levels(branching_factor, &f, inputs)
    }

    /// Left fold; fails on an empty list.
    fn reduce<F>(f: F, inputs: &[Self]) -> Self
    where
        F: Fn(&Self, &Self) -> Self,
    {
        assert!(!inputs.is_empty(), "reduce: empty input list");
        let mut acc = inputs[0].clone();
        for input in &inputs[1..] {
            acc = f(&acc, input);
        }
        acc
    }

    /// The data of the first valid case in list order, as a valid-tagged
    /// result, built as a tree of the given branching factor.
    fn priority_select(
        branching_factor: usize,
        cases: &[WithValid<Self>],
    ) -> WithValid<Self> {
        assert!(!cases.is_empty(), "priority_select: empty case list");
        let width = cases[0].data.width();
        for case in cases {
            assert!(
                case.valid.width() == 1,
                "priority_select: valid must be 1 bit, got {}",
                case.valid.width()
            );
            check_same_width("priority_select", width, case.data.width());
        }
        tree_levels(
            branching_factor,
            &|chunk: &[WithValid<Self>]| {
                // Pick the leftmost valid child; the combined valid is the
                // OR of the children.
                let mut acc = chunk[0].clone();
                for next in &chunk[1..] {
                    acc = WithValid {
                        data: acc.valid.mux2(&acc.data, &next.data),
                        valid: acc.valid.or(&next.valid),
                    };
                }
                acc
            },
            cases,
        )
    }

    /// [`Comb::priority_select`] collapsed against a default.
    fn priority_select_with_default(
        branching_factor: usize,
        cases: &[WithValid<Self>],
        default: &Self,
    ) -> Self {
        let result = Self::priority_select(branching_factor, cases);
        result.valid.mux2(&result.data, default)
    }

    /// Mask-and-merge select: ORs each case's data under its valid bit;
    /// zero when nothing is valid. The result with two or more valid cases
    /// is unspecified.
    fn onehot_select(branching_factor: usize, cases: &[WithValid<Self>]) -> Self {
        assert!(!cases.is_empty(), "onehot_select: empty case list");
        let width = cases[0].data.width();
        let masked: Vec<Self> = cases
            .iter()
            .map(|case| {
                assert!(
                    case.valid.width() == 1,
                    "onehot_select: valid must be 1 bit, got {}",
                    case.valid.width()
                );
                check_same_width("onehot_select", width, case.data.width());
                case.valid.repeat(width).and(&case.data)
            })
            .collect();
        tree_levels(
            branching_factor,
            &|chunk: &[Self]| Self::reduce(|a, b| a.or(b), chunk),
            &masked,
        )
    }

    /// Population count as a tree sum; result width `clog2(w + 1)`.
    fn popcount(&self, branching_factor: usize) -> Self {
        check_not_empty("popcount", self.width());
        let out_width = clog2(self.width() + 1).max(1);
        let leaves: Vec<Self> = self
            .bits_lsb_first()
            .iter()
            .map(|b| b.uresize(out_width))
            .collect();
        tree_levels(
            branching_factor,
            &|chunk: &[Self]| Self::reduce(|a, b| a.add(b), chunk),
            &leaves,
        )
    }

    /// 1-bit test for exactly one bit set.
    fn is_pow2(&self, branching_factor: usize) -> Self {
        self.popcount(branching_factor).cmp_eq_int(1)
    }

    /// Length of the zero run from the LSb end; result width
    /// `clog2(w + 1)`.
    fn trailing_zeros(&self, branching_factor: usize) -> Self {
        check_not_empty("trailing_zeros", self.width());
        let out_width = clog2(self.width() + 1).max(1);
        let cases: Vec<WithValid<Self>> = (0..self.width())
            .map(|i| WithValid {
                valid: self.bit(i),
                data: Self::of_u64(out_width, i as u64),
            })
            .collect();
        Self::priority_select_with_default(
            branching_factor,
            &cases,
            &Self::of_u64(out_width, self.width() as u64),
        )
    }

    fn trailing_ones(&self, branching_factor: usize) -> Self {
        self.not().trailing_zeros(branching_factor)
    }

    /// Length of the zero run from the MSb end; result width
    /// `clog2(w + 1)`.
    fn leading_zeros(&self, branching_factor: usize) -> Self {
        check_not_empty("leading_zeros", self.width());
        let out_width = clog2(self.width() + 1).max(1);
        let cases: Vec<WithValid<Self>> = (0..self.width())
            .rev()
            .enumerate()
            .map(|(from_top, i)| WithValid {
                valid: self.bit(i),
                data: Self::of_u64(out_width, from_top as u64),
            })
            .collect();
        Self::priority_select_with_default(
            branching_factor,
            &cases,
            &Self::of_u64(out_width, self.width() as u64),
        )
    }

    fn leading_ones(&self, branching_factor: usize) -> Self {
        self.not().leading_zeros(branching_factor)
    }

    /// Index of the highest set bit; invalid when the input is zero. The
    /// data width is `max(1, clog2(w))`.
    fn floor_log2(&self, branching_factor: usize) -> WithValid<Self> {
        check_not_empty("floor_log2", self.width());
        let out_width = clog2(self.width()).max(1);
        let cases: Vec<WithValid<Self>> = (0..self.width())
            .rev()
            .map(|i| WithValid {
                valid: self.bit(i),
                data: Self::of_u64(out_width, i as u64),
            })
            .collect();
        Self::priority_select(branching_factor, &cases)
    }

    /// `ceil(log2(x))`: 0 for x = 1, `floor_log2(x - 1) + 1` otherwise;
    /// invalid when the input is zero. The data width is
    /// `max(1, clog2(w + 1))`.
    fn ceil_log2(&self, branching_factor: usize) -> WithValid<Self> {
        check_not_empty("ceil_log2", self.width());
        let out_width = clog2(self.width() + 1).max(1);
        let floor = self.sub_int(1).floor_log2(branching_factor);
        let data = self.cmp_eq_int(1).mux2(
            &Self::zero(out_width),
            &floor.data.uresize(out_width).add_int(1),
        );
        WithValid {
            valid: self.nez(),
            data,
        }
    }

    // --- encodings -------------------------------------------------------

    /// Decode: a `2^w`-bit vector with bit `self` set.
    fn binary_to_onehot(&self) -> Self {
        check_not_empty("binary_to_onehot", self.width());
        let w = self.width();
        assert!(
            w < usize::BITS as usize,
            "binary_to_onehot: a {}-bit input cannot be decoded",
            w
        );
        let decoded: Vec<Self> = (0..1usize << w)
            .rev()
            .map(|i| self.cmp_eq(&Self::of_u64(w, i as u64)))
            .collect();
        Self::concat(&decoded)
    }

    /// Encode: for each output bit, ORs the one-hot bits whose index has
    /// that bit set.
    fn onehot_to_binary(&self) -> Self {
        check_not_empty("onehot_to_binary", self.width());
        let out_width = clog2(self.width()).max(1);
        let mut out = Vec::with_capacity(out_width);
        for i in (0..out_width).rev() {
            let contributors: Vec<Self> = (0..self.width())
                .filter(|j| (j >> i) & 1 == 1)
                .map(|j| self.bit(j))
                .collect();
            if contributors.is_empty() {
                out.push(Self::gnd());
            } else {
                out.push(reduce_tree(&|a: &Self, b: &Self| a.or(b), &contributors));
            }
        }
        Self::concat(&out)
    }

    fn binary_to_gray(&self) -> Self {
        check_not_empty("binary_to_gray", self.width());
        self.xor(&self.srl(1))
    }

    /// Cumulative XOR from the MSb down.
    fn gray_to_binary(&self) -> Self {
        check_not_empty("gray_to_binary", self.width());
        let gray = self.bits_msb_first();
        let mut out: Vec<Self> = Vec::with_capacity(gray.len());
        for g in gray {
            let next = match out.last() {
                None => g,
                Some(prev) => prev.xor(&g),
            };
            out.push(next);
        }
        Self::concat(&out)
    }

    // --- counters / misc -------------------------------------------------

    /// `self + 1`, wrapping to zero after `max`. When `max` fills the
    /// width the natural overflow does the wrapping.
    fn mod_counter(&self, max: u64) -> Self {
        check_not_empty("mod_counter", self.width());
        let w = self.width();
        let natural = w <= 64 && (max as u128) + 1 == 1u128 << w;
        if natural {
            self.add_int(1)
        } else {
            self.cmp_eq(&Self::of_u64(w, max))
                .mux2(&Self::zero(w), &self.add_int(1))
        }
    }

    /// Two's-complement negation: `0 - self`.
    fn negate(&self) -> Self {
        check_not_empty("negate", self.width());
        Self::zero(self.width()).sub(self)
    }
}

impl<T: Primitives> Comb for T {}
