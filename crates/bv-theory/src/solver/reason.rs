//! The reason builder (C8): §4.7's locally-minimal bit/sibling explanation
//! for a constant-threshold conclusion, and §4.8's midpoint-split arithmetic
//! for a bit-vector-to-bit-vector conclusion.
//!
//! Materialising the constant comparison records a midpoint split needs (and
//! recursing into their own §4.7 reasons) requires write access to the
//! catalogue and the ability to allocate a host literal, so that half of
//! §4.8 lives on [`crate::solver::BvTheory::build_reason`] instead; this
//! module only computes the midpoint itself.

use crate::{
	cmp::CmpOp,
	error::BvError,
	host::{Host, LitValue},
	solver::{
		bitvector::{BitVal, BitVector},
		comparison::CmpCatalogue,
		interval::{bits_bounds, tighten_const},
		propagate::conclusion_for_threshold,
	},
	var::CmpId,
	weight::Weight,
};

/// Build the locally-minimal support clause for a constant-threshold
/// conclusion `bv op w == forced`, per §4.7.
///
/// `exclude` is the id of the comparison being explained, skipped when
/// sweeping `bv.compares` for a tightening sibling (a comparison cannot
/// explain itself).
///
/// §4.7 picks which side of the interval drives the bit selection purely
/// from the operator (`<`/`≤` → over, `>`/`≥` → under), which only lines up
/// with `forced` when `forced` is `true`. Explaining a `false` conclusion is
/// the same as explaining the negated operator's `true` conclusion (`¬(b <
/// w)` is `b ≥ w`), so the whole computation is normalised onto that single
/// "conclusion holds" framing up front.
pub fn build_value_reason<H: Host, W: Weight>(
	op: CmpOp,
	w: W,
	exclude: CmpId,
	bv: &BitVector<H, W>,
	catalogue: &CmpCatalogue<H, W>,
	host: &H,
	forced: bool,
) -> Vec<H::Lit> {
	let eff_op = if forced { op } else { op.negate() };
	let compare_over = eff_op.driven_by_over();
	let (u0, o0) = bits_bounds(bv, host);

	if conclusion_for_threshold(eff_op, w, u0, o0) == Some(true) {
		return bit_only_reason(eff_op, w, bv, host, compare_over, u0, o0);
	}

	sibling_reason(eff_op, w, exclude, bv, catalogue, host, u0, o0)
}

/// The bit-dropping half of §4.7: starting from the raw bit-only bounds
/// (already known to decide the conclusion), try to loosen each relevant
/// bit back to unknown; keep only the ones whose removal would flip the
/// conclusion.
///
/// `op`/`w` here are already the normalised `eff_op` and the conclusion
/// being explained is always "holds" (`true`).
fn bit_only_reason<H: Host, W: Weight>(
	op: CmpOp,
	w: W,
	bv: &BitVector<H, W>,
	host: &H,
	compare_over: bool,
	u0: W,
	o0: W,
) -> Vec<H::Lit> {
	let mut under = u0;
	let mut over = o0;
	let mut reason = Vec::new();

	for (i, bit) in bv.bits.iter().enumerate() {
		let weight = W::bit(i as u32);
		let value = bit.value(host);
		let relevant = if compare_over {
			value == LitValue::False
		} else {
			value == LitValue::True
		};
		if !relevant {
			continue;
		}

		let always_omit = match bit {
			BitVal::Const(_) => true,
			BitVal::Lit(lit) => host.level(host.var_of(*lit)) == 0,
		};
		if always_omit {
			continue;
		}

		let (trial_under, trial_over) = if compare_over {
			(under, over + weight)
		} else {
			(under - weight, over)
		};
		if conclusion_for_threshold(op, w, trial_under, trial_over) == Some(true) {
			under = trial_under;
			over = trial_over;
		} else if let BitVal::Lit(lit) = bit {
			reason.push(if compare_over { *lit } else { !*lit });
		}
	}

	reason
}

/// The sibling-sweep half of §4.7: when the raw bit bounds alone don't
/// decide the conclusion, fold in one assigned sibling comparison at a time
/// (catalogue order) until one does; that sibling alone joins the reason.
///
/// `op`/`w` are already the normalised `eff_op`; the conclusion being
/// explained is always "holds" (`true`).
fn sibling_reason<H: Host, W: Weight>(
	op: CmpOp,
	w: W,
	exclude: CmpId,
	bv: &BitVector<H, W>,
	catalogue: &CmpCatalogue<H, W>,
	host: &H,
	u0: W,
	o0: W,
) -> Vec<H::Lit> {
	let mut under = u0;
	let mut over = o0;

	for &sibling_id in &bv.compares {
		if sibling_id == exclude {
			continue;
		}
		let sibling = catalogue.get(sibling_id);
		let value = host.value(sibling.lit);
		if value.is_unknown() {
			continue;
		}
		tighten_const(sibling.op, sibling.weight, value, &mut under, &mut over);
		if conclusion_for_threshold(op, w, under, over) == Some(true) {
			let lit = if value.is_true() { !sibling.lit } else { sibling.lit };
			return vec![lit];
		}
	}

	Vec::new()
}

/// The midpoint and the two derived absolute comparisons computed for a
/// bit-vector-to-bit-vector conclusion, per §4.8.
#[derive(Debug, Clone, Copy)]
pub struct Midpoint<W> {
	/// The threshold strictly between the two bit-vectors' bounds.
	pub m: W,
	/// The absolute comparison to materialise on the `b` side.
	pub b_op: CmpOp,
	/// The absolute comparison to materialise on the `c` side.
	pub c_op: CmpOp,
}

/// Compute the §4.8 midpoint split for conclusion `op` currently forced
/// between bit-vectors `b` (bounds `under_b, over_b`) and `c` (bounds
/// `under_c, over_c`).
///
/// Only ever called once both sides are confirmed non-constant; the caller
/// is responsible for the constant-side short-circuits described in §4.8.
pub fn midpoint_split<W: Weight>(op: CmpOp, under_b: W, over_b: W, under_c: W, over_c: W) -> Result<Midpoint<W>, BvError> {
	let two = W::ONE + W::ONE;
	match op {
		CmpOp::Lt => {
			let m = (under_c - over_b).ceil_div(two)? + over_b;
			Ok(Midpoint { m, b_op: CmpOp::Lt, c_op: CmpOp::Geq })
		}
		CmpOp::Leq => {
			let m = (under_c - over_b).ceil_div(two)? + over_b;
			Ok(Midpoint { m, b_op: CmpOp::Leq, c_op: CmpOp::Geq })
		}
		CmpOp::Geq => {
			let m = (under_b - over_c).floor_div(two)? + over_c;
			Ok(Midpoint { m, b_op: CmpOp::Geq, c_op: CmpOp::Leq })
		}
		CmpOp::Gt => {
			let m = (under_b - over_c).floor_div(two)? + over_c;
			Ok(Midpoint { m, b_op: CmpOp::Gt, c_op: CmpOp::Leq })
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn midpoint_split_lt_matches_spec_example() {
		// S3: over[b]=6, under[c]=8 -> m = ceil((8-6)/2)+6 = 7.
		let split = midpoint_split(CmpOp::Lt, 0u32, 6, 8, 15).unwrap();
		assert_eq!(split.m, 7);
		assert_eq!(split.b_op, CmpOp::Lt);
		assert_eq!(split.c_op, CmpOp::Geq);
	}

	#[test]
	fn midpoint_split_geq_uses_floor() {
		let split = midpoint_split(CmpOp::Geq, 9u32, 15, 0, 4).unwrap();
		// floor((9-4)/2) + 4 = 2 + 4 = 6
		assert_eq!(split.m, 6);
		assert_eq!(split.b_op, CmpOp::Geq);
		assert_eq!(split.c_op, CmpOp::Leq);
	}
}
