//! # bv-theory — a bit-vector theory solver for CDCL-style SAT drivers
//!
//! This crate implements the order-comparison bit-vector theory described in
//! the design notes this was distilled from: given a bit-vector's individual
//! bit literals, it maintains a tight `[under, over]` integer interval and
//! propagates the truth of `<`/`≤`/`>`/`≥` comparisons — against a constant
//! threshold or against another bit-vector — as those bits and comparisons
//! get assigned during search.
//!
//! The crate never runs a SAT search itself. It is driven entirely through
//! the [`host::Host`] trait: a CDCL driver (or a lazy-clause-generation
//! solver, in the tradition this core was extracted from) owns the literals,
//! the trail, and the clause database, and calls into [`solver::BvTheory`]
//! at the points a theory normally hooks into such a driver — new variable
//! registration, propagation, reason construction, and backtracking.
//!
//! A single bit-vector may additionally subscribe a downstream
//! [`subtheory::SubTheory`] (e.g. an arithmetic or array theory built on top
//! of this one) to be notified whenever its interval changes.
//!
//! ## Non-goals
//!
//! This crate does not implement a SAT driver, does not parse an input
//! language, does not support signed bit-vectors or arithmetic beyond order
//! comparisons, and never makes a search decision of its own
//! ([`solver::BvTheory::decide_theory`] always returns `None`).

pub mod cmp;
pub mod config;
pub mod conflict;
pub mod error;
pub mod host;
pub mod solver;
pub mod subtheory;
pub mod var;
pub mod weight;

pub use cmp::CmpOp;
pub use conflict::Conflict;
pub use error::BvError;
pub use host::{Host, LitValue, ReasonMarker};
pub use solver::BvTheory;
pub use subtheory::{BvView, SubTheory};
pub use var::{BvId, CmpId};
pub use weight::{BigWeight, Weight};
