//! The per-bit-vector sub-theory contract (C10).
//!
//! A sub-theory subscribes to a single bit-vector via
//! [`crate::solver::BvTheory::set_bitvector_theory`] and is invoked
//! synchronously from inside `propagate` and `backtrack*`. It must not
//! re-enter the core during that call except by reading the interval it is
//! handed; both hooks may only read state and register work for later.

use crate::{host::Host, solver::bitvector::BitVal, var::BvId, weight::Weight};

/// A read-only view of a bit-vector's current interval, handed to a
/// sub-theory on refresh.
#[derive(Debug, Clone, Copy)]
pub struct BvView<'a, H: Host, W: Weight> {
	/// The bit-vector this view describes.
	pub bv: BvId,
	/// The tight lower bound on the bit-vector's value.
	pub under: W,
	/// The tight upper bound on the bit-vector's value.
	pub over: W,
	/// The bit-vector's bits, LSB first. Each bit is either a real host
	/// literal or a constant fixed at construction time.
	pub bits: &'a [BitVal<H>],
}

/// A downstream theory registered against a single bit-vector.
///
/// Implementations read `under`, `over`, and `bits` only; they must not call
/// back into the [`crate::solver::BvTheory`] that owns them from within
/// either hook.
pub trait SubTheory<H: Host, W: Weight> {
	/// Called after every interval refresh of the subscribed bit-vector,
	/// once the refresh completed without a conflict.
	fn enqueue_bv(&mut self, view: BvView<'_, H, W>);

	/// Called once per subscribed bit-vector after any trail truncation that
	/// touched it, after the truncation has completed.
	fn backtrack_bv(&mut self, bv: BvId);
}
