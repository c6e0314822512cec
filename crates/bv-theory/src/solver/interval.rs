//! The interval engine (C5): recomputing `[under, over]` for a single
//! bit-vector from its bit assignments and its constant-threshold
//! comparisons.

use tracing::trace;

use crate::{
	cmp::CmpOp,
	host::{Host, LitValue},
	solver::{bitvector::BitVector, comparison::CmpCatalogue},
	weight::Weight,
};

/// Recompute `(under, over)` for a single bit-vector from scratch, per §4.5.
///
/// Step 1 folds in the bit assignments; step 2 folds in every
/// constant-threshold comparison in `bv.compares` whose literal is currently
/// assigned. Bit-vector-to-bit-vector comparisons are deliberately *not*
/// folded in here — they are consumed by the propagator, which refreshes
/// both sides as needed (§4.5's "single-shot" rule).
///
/// Returns `false` if the resulting interval is inverted (`under > over`),
/// which the caller must treat as a conflict.
pub fn update_approximations<H: Host, W: Weight>(
	bv: &mut BitVector<H, W>,
	host: &H,
	catalogue: &CmpCatalogue<H, W>,
) -> bool {
	let (mut under, mut over) = bits_bounds(bv, host);

	for &cmp_id in &bv.compares {
		let record = catalogue.get(cmp_id);
		let value = host.value(record.lit);
		tighten_const(record.op, record.weight, value, &mut under, &mut over);
	}

	bv.dirty = false;
	bv.under = under;
	bv.over = over;

	let ok = under <= over;
	trace!(under = ?under, over = ?over, ok, "updated approximations");
	ok
}

/// Step 1 of §4.5: the raw bounds implied by the bit assignments alone,
/// ignoring every comparison tightener. Also used standalone by the reason
/// builder (§4.7), which needs the bit-only bounds before any sibling
/// comparison is folded in.
pub fn bits_bounds<H: Host, W: Weight>(bv: &BitVector<H, W>, host: &H) -> (W, W) {
	let mut under = W::ZERO;
	let mut over = W::ZERO;
	for (i, bit) in bv.bits.iter().enumerate() {
		let weight = W::bit(i as u32);
		match bit.value(host) {
			LitValue::True => {
				under = under + weight;
				over = over + weight;
			}
			LitValue::Unknown => {
				over = over + weight;
			}
			LitValue::False => {}
		}
	}
	(under, over)
}

/// Fold a single assigned constant-threshold comparison into `(under, over)`,
/// per the table in §4.5.
pub fn tighten_const<W: Weight>(op: CmpOp, w: W, value: LitValue, under: &mut W, over: &mut W) {
	match (op, value) {
		(CmpOp::Lt, LitValue::True) => {
			if *over >= w {
				*over = w.pred();
			}
		}
		(CmpOp::Lt, LitValue::False) => {
			if *under < w {
				*under = w;
			}
		}
		(CmpOp::Leq, LitValue::True) => {
			if *over > w {
				*over = w;
			}
		}
		(CmpOp::Leq, LitValue::False) => {
			if *under <= w {
				*under = w.succ();
			}
		}
		(CmpOp::Gt, LitValue::True) => {
			if *under <= w {
				*under = w.succ();
			}
		}
		(CmpOp::Gt, LitValue::False) => {
			if *over > w {
				*over = w;
			}
		}
		(CmpOp::Geq, LitValue::True) => {
			if *under < w {
				*under = w;
			}
		}
		(CmpOp::Geq, LitValue::False) => {
			if *over >= w {
				*over = w.pred();
			}
		}
		(_, LitValue::Unknown) => {}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn lt_true_tightens_over() {
		let mut under = 0u32;
		let mut over = 15u32;
		tighten_const(CmpOp::Lt, 5, LitValue::True, &mut under, &mut over);
		assert_eq!(over, 4);
	}

	#[test]
	fn lt_false_tightens_under() {
		let mut under = 0u32;
		let mut over = 15u32;
		tighten_const(CmpOp::Lt, 5, LitValue::False, &mut under, &mut over);
		assert_eq!(under, 5);
	}

	#[test]
	fn geq_true_tightens_under() {
		let mut under = 0u32;
		let mut over = 15u32;
		tighten_const(CmpOp::Geq, 5, LitValue::True, &mut under, &mut over);
		assert_eq!(under, 5);
	}

	#[test]
	fn leq_false_tightens_under_past_threshold() {
		let mut under = 0u32;
		let mut over = 15u32;
		tighten_const(CmpOp::Leq, 7, LitValue::False, &mut under, &mut over);
		assert_eq!(under, 8);
	}

	#[test]
	fn unknown_value_is_a_no_op() {
		let mut under = 3u32;
		let mut over = 9u32;
		tighten_const(CmpOp::Lt, 5, LitValue::Unknown, &mut under, &mut over);
		assert_eq!((under, over), (3, 9));
	}
}
