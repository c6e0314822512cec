//! Theory configuration (C11).
//!
//! The pure bit-vector core reads none of this directly; it exists so that a
//! host embedding this theory alongside other, adjacent theories (e.g. a
//! graph theory that shares the same random seed and polarity convention)
//! can thread shared configuration through without each theory inventing
//! its own copy. No environment variables, no on-disk format.

/// Which side of a comparison's truth value a sub-theory (or adjacent
/// theory) wants to be notified about.
///
/// This mirrors the source's `reportPolarity: {-1,0,1}` convention; it is
/// inert for the bit-vector core itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportPolarity {
	/// Notify only on inclusions (the source's negative polarity).
    Inclusions,
	/// Notify on both inclusions and exclusions (the source's zero polarity).
	#[default]
	Both,
	/// Notify only on exclusions (the source's positive polarity).
	Exclusions,
}

/// Configuration shared by the theory core and any adjacent theories hosted
/// alongside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
	/// Seed used by randomised decision heuristics in adjacent theories.
	///
	/// Inert for the bit-vector core, which never makes a search decision
	/// (see [`crate::solver::BvTheory::decide_theory`]).
	pub rnd_seed: f64,
	/// Notification polarity convention shared with adjacent theories.
	pub report_polarity: ReportPolarity,
}

impl Default for Config {
	fn default() -> Self {
		Config {
			rnd_seed: 91_648_253.0,
			report_polarity: ReportPolarity::default(),
		}
	}
}
