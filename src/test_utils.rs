// SPDX-License-Identifier: Apache-2.0

//! Test support: a memoized evaluator for `Signal` graphs.
//!
//! This is not a simulator: it walks a combinational expression DAG once,
//! substituting `Bits` stimulus for the input nodes. Tests use it to check
//! that the structural synthesis of an operator agrees with the native
//! `Bits` implementation of the same operator.

use std::collections::HashMap;

use crate::bits::Bits;
use crate::comb::Gates;
use crate::signal::{Op, Signal};

/// Evaluates `signal` against named input stimulus.
pub fn eval(signal: &Signal, inputs: &HashMap<String, Bits>) -> Bits {
    let mut memo: HashMap<u64, Bits> = HashMap::new();
    eval_memo(signal, inputs, &mut memo)
}

fn eval_memo(
    signal: &Signal,
    inputs: &HashMap<String, Bits>,
    memo: &mut HashMap<u64, Bits>,
) -> Bits {
    let node = match signal.as_node() {
        None => return Bits::empty(),
        Some(node) => node,
    };
    if let Some(value) = memo.get(&node.id) {
        return value.clone();
    }
    let value = match &node.op {
        Op::Input { name } => {
            let value = inputs
                .get(name)
                .unwrap_or_else(|| panic!("eval: no stimulus for input {:?}", name));
            assert!(
                value.width() == node.width,
                "eval: stimulus for {:?} is {} bits, input is {} bits",
                name,
                value.width(),
                node.width
            );
            value.clone()
        }
        Op::Const(bits) => bits.clone(),
        Op::Named { arg, .. } => eval_memo(arg, inputs, memo),
        Op::Concat(parts) => {
            let parts: Vec<Bits> = parts
                .iter()
                .map(|p| eval_memo(p, inputs, memo))
                .collect();
            Bits::concat(&parts)
        }
        Op::Select { arg, hi, lo } => eval_memo(arg, inputs, memo).select(*hi, *lo),
        Op::Not(arg) => eval_memo(arg, inputs, memo).not(),
        Op::And(a, b) => {
            let a = eval_memo(a, inputs, memo);
            let b = eval_memo(b, inputs, memo);
            a.and(&b)
        }
        Op::Or(a, b) => {
            let a = eval_memo(a, inputs, memo);
            let b = eval_memo(b, inputs, memo);
            a.or(&b)
        }
        Op::Xor(a, b) => {
            let a = eval_memo(a, inputs, memo);
            let b = eval_memo(b, inputs, memo);
            a.xor(&b)
        }
    };
    memo.insert(node.id, value.clone());
    value
}
