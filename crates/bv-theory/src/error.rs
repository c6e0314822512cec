//! Fatal, non-conflict error conditions raised by the theory core.
//!
//! Ordinary theory conflicts (the formula is currently unsatisfiable under
//! the trail) are *not* represented here; they flow back through
//! [`crate::solver::propagate`]'s `Result<(), Conflict>` return. [`BvError`]
//! is reserved for misuse of the API or genuinely unsupported operations,
//! mirroring the separation the teacher keeps between its `Conflict` struct
//! and its small `ReformulationError` enum.

use thiserror::Error;

use crate::var::BvId;

/// A fatal error raised by the theory core.
///
/// None of these variants are expected to occur in a correctly driven
/// solve; they indicate a bug in the host or in the embedding code, not a
/// property of the search state.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BvError {
	/// [`crate::solver::BvTheory::set_bitvector_theory`] was called on a
	/// bit-vector that already has a registered sub-theory.
	///
	/// Bit-vector ids themselves are allocated by
	/// [`crate::solver::BvTheory::new_bitvector`] and can therefore never
	/// collide; this variant instead guards the one other place the source's
	/// "redefinition" error applies, re-registering already-fixed state.
	#[error("bit-vector {0:?} already has a registered sub-theory")]
	Redefinition(BvId),

	/// A comparison was requested against a bit-vector id that has not been
	/// registered with [`crate::solver::BvTheory::new_bitvector`].
	#[error("bit-vector {0:?} has not been defined")]
	UnknownBv(BvId),

	/// A [`crate::weight::Weight`] operation (currently only ceiling- or
	/// floor-division, used by the midpoint split) could not be carried out
	/// exactly by the instantiated weight type.
	#[error("unsupported weight operation: {op}")]
	UnsupportedWeightOp {
		/// A short, human-readable description of the attempted operation.
		op: &'static str,
	},
}
