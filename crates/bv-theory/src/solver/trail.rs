//! The theory's own trail (C6): a log of every theory-relevant literal
//! assignment, kept in step with the host's decision-level structure so a
//! later `backtrack_until` undoes exactly the entries it implies.
//!
//! Unlike the teacher's byte-packed, redo/undo-capable [`Trail`] (which owns
//! the *values* of trailed Boolean and integer state), this trail owns no
//! values at all: the host remains the single source of truth for a
//! literal's current assignment (`Host::value`). This trail only remembers
//! *which* bit-vector each assignment concerned, so that truncating it tells
//! the propagator which bit-vectors to mark dirty and which sub-theories to
//! notify.

use tracing::trace;

use crate::var::{BvId, LocalVarId};

/// A single theory-relevant assignment recorded on the trail (§3's "Trail
/// entry").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrailEntry {
	/// `true` iff `local_var` is a comparison literal; `false` if it is a bit.
	pub is_comparator: bool,
	/// The polarity the literal was assigned to.
	pub polarity: bool,
	/// The bit-vector this assignment concerns.
	pub bv: BvId,
	/// The local variable that was assigned.
	pub local_var: LocalVarId,
}

/// The theory's trail: a flat log of [`TrailEntry`] plus a stack of
/// decision-level marks (`trail_lim` in the source).
#[derive(Debug, Clone, Default)]
pub struct Trail {
	entries: Vec<TrailEntry>,
	trail_lim: Vec<usize>,
}

impl Trail {
	/// Record a freshly observed assignment.
	pub fn push(&mut self, entry: TrailEntry) {
		self.entries.push(entry);
	}

	/// The current decision level: the number of open marks.
	pub fn decision_level(&self) -> u32 {
		self.trail_lim.len() as u32
	}

	/// `newDecisionLevel()`: mark the current trail length as the boundary of
	/// a fresh decision level.
	pub fn new_decision_level(&mut self) {
		self.trail_lim.push(self.entries.len());
	}

	/// `backtrackUntil(level)`: pop every entry recorded since decision level
	/// `level` was opened and shrink `trail_lim` to `level`. Returns the
	/// undone entries, most-recently-pushed first, for the caller to restore.
	///
	/// A `level` at or beyond the current decision level is a no-op: nothing
	/// has been pushed past it yet.
	pub fn backtrack_to_level(&mut self, level: u32) -> Vec<TrailEntry> {
		let level = level as usize;
		if level >= self.trail_lim.len() {
			return Vec::new();
		}
		let mark = self.trail_lim[level];
		self.trail_lim.truncate(level);
		let undone: Vec<TrailEntry> = self.entries.split_off(mark).into_iter().rev().collect();
		trace!(level, undone = undone.len(), "backtrack to level");
		undone
	}

	/// `backtrackUntil(literal p)`: scan back-to-front for the entry matching
	/// `(bv, local_var)` and truncate up to and including it. Returns the
	/// undone entries, most-recently-pushed first.
	///
	/// Any decision-level mark that pointed past the truncated trail is
	/// dropped along with it.
	pub fn backtrack_to_entry(&mut self, bv: BvId, local_var: LocalVarId) -> Vec<TrailEntry> {
		let Some(pos) = self
			.entries
			.iter()
			.rposition(|e| e.bv == bv && e.local_var == local_var)
		else {
			trace!(?bv, "backtrack to entry: not found, trail unchanged");
			return Vec::new();
		};
		while matches!(self.trail_lim.last(), Some(&mark) if mark > pos) {
			let _ = self.trail_lim.pop();
		}
		let undone: Vec<TrailEntry> = self.entries.split_off(pos).into_iter().rev().collect();
		trace!(?bv, undone = undone.len(), "backtrack to entry");
		undone
	}

	/// The number of entries currently on the trail.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// `true` iff no entry has ever been pushed.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn entry(bv: u32, local_var: u32, polarity: bool) -> TrailEntry {
		TrailEntry {
			is_comparator: false,
			polarity,
			bv: BvId::from_usize(bv as usize),
			local_var: LocalVarId::from_usize(local_var as usize),
		}
	}

	#[test]
	fn backtrack_to_level_undoes_only_later_levels() {
		let mut trail = Trail::default();
		trail.push(entry(0, 0, true));
		trail.new_decision_level();
		trail.push(entry(1, 1, true));
		trail.push(entry(2, 2, false));
		trail.new_decision_level();
		trail.push(entry(3, 3, true));

		assert_eq!(trail.decision_level(), 2);
		let undone = trail.backtrack_to_level(1);
		assert_eq!(undone.len(), 2);
		assert_eq!(undone[0].bv, BvId::from_usize(3));
		assert_eq!(undone[1].bv, BvId::from_usize(2));
		assert_eq!(trail.len(), 2);
		assert_eq!(trail.decision_level(), 1);
	}

	#[test]
	fn backtrack_to_level_beyond_current_is_a_no_op() {
		let mut trail = Trail::default();
		trail.push(entry(0, 0, true));
		trail.new_decision_level();
		assert!(trail.backtrack_to_level(5).is_empty());
		assert_eq!(trail.len(), 1);
	}

	#[test]
	fn backtrack_to_entry_truncates_inclusive_and_drops_marks() {
		let mut trail = Trail::default();
		trail.push(entry(0, 0, true));
		trail.new_decision_level();
		trail.push(entry(1, 1, true));
		trail.push(entry(2, 2, false));

		let undone = trail.backtrack_to_entry(BvId::from_usize(1), LocalVarId::from_usize(1));
		assert_eq!(undone.len(), 2);
		assert_eq!(trail.len(), 1);
		assert_eq!(trail.decision_level(), 0);
	}

	#[test]
	fn backtrack_to_entry_missing_is_a_no_op() {
		let mut trail = Trail::default();
		trail.push(entry(0, 0, true));
		assert!(trail
			.backtrack_to_entry(BvId::from_usize(9), LocalVarId::from_usize(9))
			.is_empty());
		assert_eq!(trail.len(), 1);
	}
}
