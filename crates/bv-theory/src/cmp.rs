//! The comparison operator catalogue (`<`, `≤`, `>`, `≥`) and its algebra.

/// A linear-order comparison operator between a bit-vector and a threshold
/// (or another bit-vector).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
	/// `bv < rhs`
	Lt,
	/// `bv <= rhs`
	Leq,
	/// `bv > rhs`
	Gt,
	/// `bv >= rhs`
	Geq,
}

impl CmpOp {
	/// `~op`: swap the sides of the comparison, i.e. the operator such that
	/// `a op b` iff `b op.flip() a`.
	pub fn flip(self) -> CmpOp {
		match self {
			CmpOp::Lt => CmpOp::Gt,
			CmpOp::Leq => CmpOp::Geq,
			CmpOp::Gt => CmpOp::Lt,
			CmpOp::Geq => CmpOp::Leq,
		}
	}

	/// `-op`: De Morgan negation, i.e. the operator such that `a op b` iff
	/// `!(a op.negate() b)`.
	pub fn negate(self) -> CmpOp {
		match self {
			CmpOp::Lt => CmpOp::Geq,
			CmpOp::Leq => CmpOp::Gt,
			CmpOp::Gt => CmpOp::Leq,
			CmpOp::Geq => CmpOp::Lt,
		}
	}

	/// `true` when the truth of this comparison is decided by the
	/// over-approximation side of the interval (`<` and `≤`); `false` when it
	/// is decided by the under-approximation side (`>` and `≥`).
	pub fn driven_by_over(self) -> bool {
		matches!(self, CmpOp::Lt | CmpOp::Leq)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn flip_is_involution() {
		for op in [CmpOp::Lt, CmpOp::Leq, CmpOp::Gt, CmpOp::Geq] {
			assert_eq!(op.flip().flip(), op);
		}
	}

	#[test]
	fn negate_is_involution() {
		for op in [CmpOp::Lt, CmpOp::Leq, CmpOp::Gt, CmpOp::Geq] {
			assert_eq!(op.negate().negate(), op);
		}
	}

	#[test]
	fn flip_and_negate_relate_lt_geq() {
		assert_eq!(CmpOp::Lt.flip(), CmpOp::Gt);
		assert_eq!(CmpOp::Lt.negate(), CmpOp::Geq);
	}
}
