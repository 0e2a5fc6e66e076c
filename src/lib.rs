// SPDX-License-Identifier: Apache-2.0

//! `weft` is a combinational signal algebra: an embedded DSL for building
//! bit-accurate, width-typed structural circuits as value-level
//! expressions.
//!
//! Two backends implement the same operator surface:
//!
//! * [`Bits`] — a concrete bit-vector value; operators compute bits.
//! * [`Signal`] — a symbolic expression DAG; operators build structure.
//!
//! Backends implement the small [`Gates`] contract; the [`Primitives`] and
//! [`Comb`] layers derive everything else from it.
//!
//! ```
//! use weft::{Bits, Comb, Primitives};
//!
//! let a = Bits::of_string("4'd11");
//! let b = Bits::of_u64(4, 3);
//! assert_eq!(a.add(&b).to_bstr(), "1110");
//! // Widen first to keep the carry.
//! assert_eq!(a.uresize(5).add(&b.uresize(5)).to_u64(), 14);
//! ```

pub mod bits;
pub mod comb;
pub mod const_parser;
pub mod rng;
pub mod signal;
pub mod test_utils;
pub mod typed;

pub use bits::Bits;
pub use comb::{Comb, Gates, Primitives, WithValid};
pub use signal::Signal;
pub use typed::{Signed, Unsigned};
