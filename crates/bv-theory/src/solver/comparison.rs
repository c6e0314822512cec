//! The comparison catalogue (C4).
//!
//! Every comparison literal the theory hands out, for either a constant
//! threshold or another bit-vector, is recorded exactly once here (invariant
//! I3). The catalogue itself only stores and looks records up; keeping the
//! per-bit-vector `compares`/`bv_compares` index sequences sorted is the
//! caller's job, the way the teacher keeps an `IntVarRef`'s activation list
//! sorted at the call site rather than inside the table that owns the
//! records.

use std::collections::HashMap;

use index_vec::IndexVec;

use crate::{cmp::CmpOp, host::Host, var::BvId, var::CmpId, weight::Weight};

/// A single registered comparison literal: either `bv op weight` (a
/// constant-threshold comparison, `other_bv = None`) or `bv op other_bv` (a
/// bit-vector-to-bit-vector comparison).
#[derive(Debug)]
pub struct ComparisonRecord<H: Host, W: Weight> {
	/// The bit-vector this record is filed under (`compares[bv]` or
	/// `bv_compares[bv]`).
	pub bv: BvId,
	/// The comparison operator.
	pub op: CmpOp,
	/// The threshold, meaningful only when `other_bv` is `None`.
	pub weight: W,
	/// The other side of the comparison, for a bit-vector-to-bit-vector
	/// record.
	pub other_bv: Option<BvId>,
	/// The host literal whose truth is definitionally `bv op (weight |
	/// other_bv)`.
	pub lit: H::Lit,
}

// Hand-rolled instead of `#[derive(Clone, Copy)]`: the derive macro adds an
// `H: Clone`/`H: Copy` bound on the *type parameter*, but the only use of
// `H` here is through `H::Lit`, which is already `Copy` via the `Host`
// trait bound.
impl<H: Host, W: Weight> Clone for ComparisonRecord<H, W> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<H: Host, W: Weight> Copy for ComparisonRecord<H, W> {}

/// The table of all comparison records known to the theory, plus the two
/// lookup keys that make [`CmpCatalogue::find_const`] and
/// [`CmpCatalogue::find_bv`] the single source of truth for invariant I3
/// (uniqueness) and P6 (idempotence).
#[derive(Debug)]
pub struct CmpCatalogue<H: Host, W: Weight> {
	records: IndexVec<CmpId, ComparisonRecord<H, W>>,
	by_const: HashMap<(BvId, CmpOp, W), CmpId>,
	by_bv: HashMap<(BvId, CmpOp, BvId), CmpId>,
}

impl<H: Host, W: Weight> Default for CmpCatalogue<H, W> {
	fn default() -> Self {
		CmpCatalogue {
			records: IndexVec::new(),
			by_const: HashMap::new(),
			by_bv: HashMap::new(),
		}
	}
}

impl<H: Host, W: Weight> CmpCatalogue<H, W> {
	/// Borrow the record at `id`.
	pub fn get(&self, id: CmpId) -> &ComparisonRecord<H, W> {
		&self.records[id]
	}

	/// The number of registered comparison records, also the next [`CmpId`]
	/// that [`Self::insert_const`]/[`Self::insert_bv`] will hand out.
	pub fn len(&self) -> usize {
		self.records.len()
	}

	/// `true` iff no comparison has been registered yet.
	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	/// Iterate over every registered comparison id, in registration order.
	pub fn ids(&self) -> impl Iterator<Item = CmpId> {
		(0..self.records.len()).map(CmpId::from_usize)
	}

	/// Look up an existing constant-threshold record for `(bv, op, w)`.
	pub fn find_const(&self, bv: BvId, op: CmpOp, w: W) -> Option<CmpId> {
		self.by_const.get(&(bv, op, w)).copied()
	}

	/// Look up an existing bit-vector-to-bit-vector record for
	/// `(bv, op, other)`. Callers are expected to have already canonicalised
	/// `bv < other`.
	pub fn find_bv(&self, bv: BvId, op: CmpOp, other: BvId) -> Option<CmpId> {
		self.by_bv.get(&(bv, op, other)).copied()
	}

	/// Register a brand-new constant-threshold record.
	///
	/// The caller must have already established, via [`Self::find_const`],
	/// that no equivalent record exists.
	pub fn insert_const(&mut self, bv: BvId, op: CmpOp, w: W, lit: H::Lit) -> CmpId {
		let id = self.records.push(ComparisonRecord {
			bv,
			op,
			weight: w,
			other_bv: None,
			lit,
		});
		let _ = self.by_const.insert((bv, op, w), id);
		id
	}

	/// Register a brand-new bit-vector-to-bit-vector record.
	///
	/// The caller must have already canonicalised `bv < other` and
	/// established, via [`Self::find_bv`], that no equivalent record exists.
	pub fn insert_bv(&mut self, bv: BvId, op: CmpOp, other: BvId, lit: H::Lit) -> CmpId {
		let id = self.records.push(ComparisonRecord {
			bv,
			op,
			weight: W::ZERO,
			other_bv: Some(other),
			lit,
		});
		let _ = self.by_bv.insert((bv, op, other), id);
		id
	}
}
