//! The [`Conflict`] type returned by a failing propagation pass.

use std::fmt;

use crate::host::Host;

/// A conflict detected during [`crate::solver::BvTheory::propagate`].
///
/// The `clause` is a conjunction of literals, every one of which is
/// currently false, whose negation the host can learn as a clause. This
/// mirrors the teacher's own `Conflict` struct, kept separate from the
/// fatal, non-conflict [`crate::error::BvError`] hierarchy: becoming
/// conflicted is an expected, recoverable outcome of search, not a bug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict<H: Host> {
	/// The literal that could not be consistently propagated, if the
	/// conflict arose while trying to enqueue one. `None` for a root-level
	/// (unconditional) conflict.
	pub subject: Option<H::Lit>,
	/// The supporting literals, every one of which is currently false.
	pub clause: Vec<H::Lit>,
}

impl<H: Host> fmt::Display for Conflict<H> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "conflict: nogood of size {}", self.clause.len())
	}
}
