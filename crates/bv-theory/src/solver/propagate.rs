//! The propagator (C7): pure decision logic for which comparison literals
//! are forced by a bit-vector's current interval.
//!
//! These functions are deliberately host- and trail-free: they take bounds
//! and thresholds and return a verdict. [`crate::solver::BvTheory::propagate`]
//! is the stateful driver that calls them, walks the comparison catalogue,
//! and turns a verdict into an `enqueue`/conflict decision.

use crate::{cmp::CmpOp, weight::Weight};

/// What a constant-threshold comparison's interval, if anything, forces the
/// comparison's truth to. `None` means the comparison remains undecided.
///
/// Folds together §4.6 steps 2 and 3 (the "over decides"/"under decides"
/// passes) into the single table both passes jointly describe; which
/// direction actually found the answer is not otherwise observable.
pub fn conclusion_for_threshold<W: Weight>(op: CmpOp, w: W, under: W, over: W) -> Option<bool> {
	match op {
		CmpOp::Lt => {
			if over < w {
				Some(true)
			} else if under >= w {
				Some(false)
			} else {
				None
			}
		}
		CmpOp::Leq => {
			if over <= w {
				Some(true)
			} else if under > w {
				Some(false)
			} else {
				None
			}
		}
		CmpOp::Gt => {
			if under > w {
				Some(true)
			} else if over <= w {
				Some(false)
			} else {
				None
			}
		}
		CmpOp::Geq => {
			if under >= w {
				Some(true)
			} else if over < w {
				Some(false)
			} else {
				None
			}
		}
	}
}

/// What a bit-vector-to-bit-vector comparison's two intervals, if anything,
/// force the comparison's truth to (§4.6 step 4): the same table as
/// [`conclusion_for_threshold`], but with the threshold's role played by the
/// other side's interval.
pub fn conclusion_for_bv<W: Weight>(op: CmpOp, under_b: W, over_b: W, under_c: W, over_c: W) -> Option<bool> {
	match op {
		CmpOp::Lt => {
			if over_b < under_c {
				Some(true)
			} else if under_b >= over_c {
				Some(false)
			} else {
				None
			}
		}
		CmpOp::Leq => {
			if over_b <= under_c {
				Some(true)
			} else if under_b > over_c {
				Some(false)
			} else {
				None
			}
		}
		CmpOp::Gt => {
			if under_b > over_c {
				Some(true)
			} else if over_b <= under_c {
				Some(false)
			} else {
				None
			}
		}
		CmpOp::Geq => {
			if under_b >= over_c {
				Some(true)
			} else if over_b < under_c {
				Some(false)
			} else {
				None
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn lt_forces_true_when_over_below_threshold() {
		assert_eq!(conclusion_for_threshold(CmpOp::Lt, 5u32, 0, 4), Some(true));
	}

	#[test]
	fn lt_forces_false_when_under_at_or_above_threshold() {
		assert_eq!(conclusion_for_threshold(CmpOp::Lt, 5u32, 5, 9), Some(false));
	}

	#[test]
	fn leq_undecided_when_threshold_inside_interval() {
		assert_eq!(conclusion_for_threshold(CmpOp::Leq, 5u32, 2, 8), None);
	}

	#[test]
	fn geq_forces_true_when_under_reaches_threshold() {
		assert_eq!(conclusion_for_threshold(CmpOp::Geq, 5u32, 5, 5), Some(true));
	}

	#[test]
	fn bv_lt_forces_true_when_disjoint_below() {
		assert_eq!(conclusion_for_bv(CmpOp::Lt, 0u32, 6, 8, 15), Some(true));
	}

	#[test]
	fn bv_lt_forces_false_when_disjoint_above() {
		assert_eq!(conclusion_for_bv(CmpOp::Lt, 9u32, 15, 0, 4), Some(false));
	}

	#[test]
	fn bv_geq_undecided_when_intervals_overlap() {
		assert_eq!(conclusion_for_bv(CmpOp::Geq, 3u32, 9, 5, 12), None);
	}
}
