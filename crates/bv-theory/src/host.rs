//! The contract the embedding CDCL driver must provide to the theory core.
//!
//! The SAT driver itself is out of scope for this crate (see the crate-level
//! docs); [`Host`] is the seam through which the theory core reads and
//! writes the driver's variables, literals, and clause database. The theory
//! is generic over this trait the way the teacher's propagators are generic
//! over its `PropagationActions`/`ExplanationActions` action traits, rather
//! than being hard-wired to one concrete SAT backend.

use std::{fmt::Debug, hash::Hash, ops::Not};

/// The three-valued truth assignment of a literal under the host's current
/// trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LitValue {
	/// The literal is currently assigned `true`.
	True,
	/// The literal is currently assigned `false`.
	False,
	/// The literal has not yet been assigned.
	Unknown,
}

impl LitValue {
	/// Returns `true` iff the value is [`LitValue::True`].
	pub fn is_true(self) -> bool {
		matches!(self, LitValue::True)
	}

	/// Returns `true` iff the value is [`LitValue::False`].
	pub fn is_false(self) -> bool {
		matches!(self, LitValue::False)
	}

	/// Returns `true` iff the value is [`LitValue::Unknown`].
	pub fn is_unknown(self) -> bool {
		matches!(self, LitValue::Unknown)
	}
}

impl From<Option<bool>> for LitValue {
	fn from(value: Option<bool>) -> Self {
		match value {
			Some(true) => LitValue::True,
			Some(false) => LitValue::False,
			None => LitValue::Unknown,
		}
	}
}

/// An opaque token, allocated by the host, that the host attaches to an
/// enqueued literal so that it can later call back into the theory's
/// `build_reason` to explain it.
///
/// The theory core only ever needs a single marker, allocated once, since it
/// has exactly one propagation rule (`comparisonprop_marker` in the source
/// this was distilled from).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReasonMarker(pub u32);

/// The host contract consumed by the theory core.
///
/// `Var` and `Lit` are opaque handles owned by the host; the theory core
/// never interprets their representation beyond the operations exposed here.
pub trait Host {
	/// A host-level Boolean variable.
	type Var: Copy + Eq + Hash + Debug;
	/// A host-level Boolean literal.
	type Lit: Copy + Eq + Hash + Debug + Not<Output = Self::Lit>;

	/// Allocate a fresh host variable.
	fn new_var(&mut self) -> Self::Var;

	/// Return the positive literal of `var`.
	fn lit(&self, var: Self::Var) -> Self::Lit;

	/// Return the variable underlying `lit`.
	fn var_of(&self, lit: Self::Lit) -> Self::Var;

	/// Register `var` so that every assignment the host makes to it is
	/// forwarded to [`crate::solver::BvTheory::enqueue_theory`].
	fn observe(&mut self, var: Self::Var);

	/// Allocate a reason marker owned by this theory.
	fn new_reason_marker(&mut self) -> ReasonMarker;

	/// Enqueue `lit` as now being forced `true`, attributing the cause to
	/// `marker` should the host later ask for an explanation.
	fn enqueue(&mut self, lit: Self::Lit, marker: ReasonMarker);

	/// The current truth value of `lit` under the host's trail.
	fn value(&self, lit: Self::Lit) -> LitValue;

	/// The decision level at which `var` was assigned, or the current
	/// decision level if it is unassigned.
	fn level(&self, var: Self::Var) -> u32;

	/// Add a clause to the host's clause database.
	///
	/// The host is expected to tolerate clauses that are already satisfied,
	/// or empty, at a non-root decision level.
	fn add_clause_safely(&mut self, clause: &[Self::Lit]);
}
