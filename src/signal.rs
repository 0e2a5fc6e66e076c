// SPDX-License-Identifier: Apache-2.0

//! The symbolic backend: a `Signal` is a handle on an immutable node of an
//! expression DAG. Nodes carry a process-unique id, their width, and their
//! operation; subexpressions are shared freely through `Arc`.
//!
//! `Signal` implements only the `Gates` contract natively and takes the
//! reference synthesis for the primitives, so every graph it builds is
//! structural: muxes become decoded AND-OR trees, adders become ripple
//! chains, exactly as a gate-level lowering would emit them.
//!
//! Constant folding is trivial-only: an operator whose operands are all
//! constants folds to a constant node; everything else allocates.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::bits::Bits;
use crate::comb::{check_not_empty, check_same_width, Gates, Primitives};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

#[derive(Clone)]
pub struct Signal {
    repr: Repr,
}

#[derive(Clone)]
enum Repr {
    Empty,
    Node(Arc<Node>),
}

pub(crate) struct Node {
    pub(crate) id: u64,
    pub(crate) width: usize,
    pub(crate) op: Op,
}

pub(crate) enum Op {
    Input { name: String },
    Const(Bits),
    Named { arg: Signal, name: String },
    Concat(Vec<Signal>),
    Select { arg: Signal, hi: usize, lo: usize },
    Not(Signal),
    And(Signal, Signal),
    Or(Signal, Signal),
    Xor(Signal, Signal),
}

impl Signal {
    fn node(width: usize, op: Op) -> Self {
        debug_assert!(width >= 1);
        Signal {
            repr: Repr::Node(Arc::new(Node {
                id: next_id(),
                width,
                op,
            })),
        }
    }

    /// A free input node of the given width.
    pub fn input(name: &str, width: usize) -> Self {
        assert!(width >= 1, "input: width must be >= 1");
        Self::node(
            width,
            Op::Input {
                name: name.to_string(),
            },
        )
    }

    /// The node id, if this is not the empty signal. Ids are unique and
    /// monotonically allocated within the process.
    pub fn uid(&self) -> Option<u64> {
        match &self.repr {
            Repr::Empty => None,
            Repr::Node(node) => Some(node.id),
        }
    }

    pub(crate) fn as_node(&self) -> Option<&Node> {
        match &self.repr {
            Repr::Empty => None,
            Repr::Node(node) => Some(node),
        }
    }

    fn fold2<F>(&self, other: &Self, f: F) -> Option<Self>
    where
        F: FnOnce(&Bits, &Bits) -> Bits,
    {
        match (self.as_constant(), other.as_constant()) {
            (Some(a), Some(b)) => Some(Self::node(a.width(), Op::Const(f(&a, &b)))),
            _ => None,
        }
    }

    fn op_summary(&self) -> String {
        let operand = |s: &Signal| match s.uid() {
            Some(id) => format!("%{}", id),
            None => "empty".to_string(),
        };
        let node = self.as_node().expect("summaries are for non-empty signals");
        match &node.op {
            Op::Input { name } => format!("input({})", name),
            Op::Const(bits) => format!("const({})", bits.to_bstr()),
            Op::Named { arg, name } => format!("name({}, {:?})", operand(arg), name),
            Op::Concat(parts) => {
                let parts: Vec<String> = parts.iter().map(|p| operand(p)).collect();
                format!("concat({})", parts.join(", "))
            }
            Op::Select { arg, hi, lo } => format!("select({}, {}, {})", operand(arg), hi, lo),
            Op::Not(arg) => format!("not({})", operand(arg)),
            Op::And(a, b) => format!("and({}, {})", operand(a), operand(b)),
            Op::Or(a, b) => format!("or({}, {})", operand(a), operand(b)),
            Op::Xor(a, b) => format!("xor({}, {})", operand(a), operand(b)),
        }
    }
}

/// Node identity: two handles are equal iff they refer to the same node.
impl PartialEq for Signal {
    fn eq(&self, other: &Self) -> bool {
        match (&self.repr, &other.repr) {
            (Repr::Empty, Repr::Empty) => true,
            (Repr::Node(a), Repr::Node(b)) => a.id == b.id,
            _ => false,
        }
    }
}

impl std::fmt::Debug for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.repr {
            Repr::Empty => write!(f, "Signal(empty)"),
            Repr::Node(node) => write!(
                f,
                "Signal(%{}: bits[{}] = {})",
                node.id,
                node.width,
                self.op_summary()
            ),
        }
    }
}

/// Constants display as their binary string (round-trips through
/// `of_string`); other signals display as a node summary.
impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.as_constant() {
            Some(bits) if !bits.is_empty() => write!(f, "{}", bits),
            _ => match &self.repr {
                Repr::Empty => write!(f, "empty"),
                Repr::Node(node) => {
                    write!(f, "%{}: bits[{}] = {}", node.id, node.width, self.op_summary())
                }
            },
        }
    }
}

impl Gates for Signal {
    fn empty() -> Self {
        Signal { repr: Repr::Empty }
    }

    fn width(&self) -> usize {
        match &self.repr {
            Repr::Empty => 0,
            Repr::Node(node) => node.width,
        }
    }

    fn of_constant(value: Bits) -> Self {
        if value.is_empty() {
            Self::empty()
        } else {
            Self::node(value.width(), Op::Const(value))
        }
    }

    fn concat(parts: &[Self]) -> Self {
        assert!(!parts.is_empty(), "concat: empty part list");
        let mut width = 0;
        for part in parts {
            check_not_empty("concat", part.width());
            width += part.width();
        }
        let constants: Option<Vec<Bits>> = parts.iter().map(|p| p.as_constant()).collect();
        if let Some(constants) = constants {
            return Self::of_constant(Bits::concat(&constants));
        }
        Self::node(width, Op::Concat(parts.to_vec()))
    }

    fn select(&self, hi: usize, lo: usize) -> Self {
        check_not_empty("select", self.width());
        assert!(
            lo <= hi && hi < self.width(),
            "select: range [{}:{}] out of bounds for width {}",
            hi,
            lo,
            self.width()
        );
        if lo == 0 && hi == self.width() - 1 {
            return self.clone();
        }
        if let Some(bits) = self.as_constant() {
            return Self::of_constant(bits.select(hi, lo));
        }
        Self::node(
            hi - lo + 1,
            Op::Select {
                arg: self.clone(),
                hi,
                lo,
            },
        )
    }

    fn with_name(&self, name: &str) -> Self {
        check_not_empty("with_name", self.width());
        Self::node(
            self.width(),
            Op::Named {
                arg: self.clone(),
                name: name.to_string(),
            },
        )
    }

    fn and(&self, other: &Self) -> Self {
        check_not_empty("and", self.width());
        check_same_width("and", self.width(), other.width());
        if let Some(folded) = self.fold2(other, |a, b| a.and(b)) {
            return folded;
        }
        Self::node(self.width(), Op::And(self.clone(), other.clone()))
    }

    fn or(&self, other: &Self) -> Self {
        check_not_empty("or", self.width());
        check_same_width("or", self.width(), other.width());
        if let Some(folded) = self.fold2(other, |a, b| a.or(b)) {
            return folded;
        }
        Self::node(self.width(), Op::Or(self.clone(), other.clone()))
    }

    fn xor(&self, other: &Self) -> Self {
        check_not_empty("xor", self.width());
        check_same_width("xor", self.width(), other.width());
        if let Some(folded) = self.fold2(other, |a, b| a.xor(b)) {
            return folded;
        }
        Self::node(self.width(), Op::Xor(self.clone(), other.clone()))
    }

    fn not(&self) -> Self {
        check_not_empty("not", self.width());
        if let Some(bits) = self.as_constant() {
            return Self::of_constant(bits.not());
        }
        Self::node(self.width(), Op::Not(self.clone()))
    }

    fn as_constant(&self) -> Option<Bits> {
        match &self.repr {
            Repr::Empty => None,
            Repr::Node(node) => match &node.op {
                Op::Const(bits) => Some(bits.clone()),
                Op::Named { arg, .. } => arg.as_constant(),
                _ => None,
            },
        }
    }
}

impl Primitives for Signal {}
