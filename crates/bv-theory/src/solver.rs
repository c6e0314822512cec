//! The theory core (C1): the top-level [`BvTheory`] that ties the bit-vector
//! registry, the comparison catalogue, the variable map, the trail, and the
//! dirty/backtrack-notify queues together into the host contract described
//! in §6.

pub mod bitvector;
pub mod comparison;
pub mod interval;
pub mod propagate;
pub mod queue;
pub mod reason;
pub mod trail;

use index_vec::IndexVec;
use tracing::{debug, trace};

use crate::{
	cmp::CmpOp,
	conflict::Conflict,
	config::Config,
	error::BvError,
	host::{Host, LitValue, ReasonMarker},
	solver::{
		bitvector::{BitVal, BvRegistry},
		comparison::CmpCatalogue,
		interval::{bits_bounds, update_approximations},
		propagate::{conclusion_for_bv, conclusion_for_threshold},
		queue::BvQueue,
		reason::{build_value_reason, midpoint_split},
		trail::{Trail, TrailEntry},
	},
	subtheory::{BvView, SubTheory},
	var::{BvId, CmpId, LocalVarId, VarKind, VarMap},
	weight::Weight,
};

/// The bit-vector theory, generic over the host contract [`Host`] and the
/// scalar type [`Weight`] used to represent a bit-vector's value.
///
/// One instance owns every bit-vector and comparison registered against it;
/// it has no notion of which SAT driver it is embedded in beyond the `Host`
/// seam, the way the teacher's propagators only ever see their actions
/// traits and never the concrete solver struct.
pub struct BvTheory<H: Host, W: Weight> {
	registry: BvRegistry<H, W>,
	catalogue: CmpCatalogue<H, W>,
	vars: VarMap<H>,
	trail: Trail,
	dirty: BvQueue,
	backtrack_notify: BvQueue,
	subtheories: Vec<Box<dyn SubTheory<H, W>>>,
	/// Whether each local variable's single assignment has already been
	/// recorded on the trail this decision level, so that a host re-notifying
	/// the same literal (or our own eager self-enqueue racing a later host
	/// callback) is a no-op rather than a double trail entry.
	recorded: IndexVec<LocalVarId, bool>,
	/// The single reason marker this theory was allocated by the host, lazily
	/// requested the first time it is needed.
	marker: Option<ReasonMarker>,
	config: Config,
}

impl<H: Host, W: Weight> std::fmt::Debug for BvTheory<H, W> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("BvTheory")
			.field("bitvectors", &self.registry.len())
			.field("comparisons", &self.catalogue.len())
			.field("trail_len", &self.trail.len())
			.field("decision_level", &self.trail.decision_level())
			.finish()
	}
}

impl<H: Host, W: Weight> BvTheory<H, W> {
	/// Construct an empty theory with no bit-vectors or comparisons
	/// registered.
	pub fn new(config: Config) -> Self {
		BvTheory {
			registry: BvRegistry::default(),
			catalogue: CmpCatalogue::default(),
			vars: VarMap::default(),
			trail: Trail::default(),
			dirty: BvQueue::default(),
			backtrack_notify: BvQueue::default(),
			subtheories: Vec::new(),
			recorded: IndexVec::new(),
			marker: None,
			config,
		}
	}

	/// The configuration this theory was constructed with.
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Register a fresh local variable linked to `outer` (reusing it) or a
	/// freshly allocated host variable (if `outer` is `None`), and keep
	/// `recorded` in lockstep with [`VarMap`].
	fn link_var(&mut self, host: &mut H, outer: Option<H::Var>, kind: VarKind) -> (H::Var, LocalVarId) {
		let var = outer.unwrap_or_else(|| host.new_var());
		host.observe(var);
		let local = self.vars.push(var, kind);
		self.recorded.push(false);
		(var, local)
	}

	/// Assert that `outer` (if given) is logically equivalent to `lit`, via
	/// two implication clauses, for the case where `new_comparison`/
	/// `new_comparison_bv` found an existing record instead of allocating a
	/// fresh variable.
	fn link_outer_equivalence(&mut self, host: &mut H, outer: Option<H::Var>, lit: H::Lit) {
		if let Some(outer) = outer {
			let outer_lit = host.lit(outer);
			host.add_clause_safely(&[!outer_lit, lit]);
			host.add_clause_safely(&[outer_lit, !lit]);
		}
	}

	/// Register a new bit-vector from its bits (§4.2), LSB first. Each bit is
	/// either a real host literal or a construction-time constant.
	///
	/// Every `BitVal::Lit` bit is linked as a local variable of kind
	/// [`VarKind::Bit`] so that a later host assignment reaches
	/// [`Self::enqueue_theory`].
	#[tracing::instrument(skip(self, host, bits))]
	pub fn new_bitvector(&mut self, host: &mut H, bits: Vec<BitVal<H>>) -> BvId {
		let bv = BvId::from_usize(self.registry.len());
		for (index, bit) in bits.iter().enumerate() {
			if let BitVal::Lit(lit) = *bit {
				let var = host.var_of(lit);
				let _ = self.link_var(
					host,
					Some(var),
					VarKind::Bit {
						bv,
						index: index as u32,
					},
				);
			}
		}
		let inserted = self.registry.push(bits);
		debug_assert_eq!(inserted, bv);
		self.dirty.grow_to(self.registry.len());
		let _ = self.dirty.enqueue(bv);
		trace!(?bv, width = self.registry.get(bv).width(), "registered bit-vector");
		bv
	}

	/// Subscribe a sub-theory to `bv`, per §4.2/C10.
	///
	/// Fails with [`BvError::Redefinition`] if `bv` already has a subscriber;
	/// fails with [`BvError::UnknownBv`] if `bv` was never registered.
	pub fn set_bitvector_theory(&mut self, bv: BvId, sub: Box<dyn SubTheory<H, W>>) -> Result<(), BvError> {
		if bv.index() >= self.registry.len() {
			return Err(BvError::UnknownBv(bv));
		}
		if self.registry.get(bv).theory_id.is_some() {
			return Err(BvError::Redefinition(bv));
		}
		let theory_id = self.subtheories.len();
		self.subtheories.push(sub);
		self.registry.get_mut(bv).theory_id = Some(theory_id);
		Ok(())
	}

	/// Request (or retrieve) the comparison literal for `bv op w`, a
	/// constant-threshold comparison (§4.3).
	///
	/// If `outer` is given, the returned literal is asserted equivalent to
	/// `outer`'s positive literal rather than reusing it directly, so callers
	/// that already own a Boolean variable for this proposition don't end up
	/// with two unrelated ones.
	#[tracing::instrument(skip(self, host))]
	pub fn new_comparison(&mut self, host: &mut H, op: CmpOp, bv: BvId, w: W, outer: Option<H::Var>) -> Result<H::Lit, BvError> {
		if bv.index() >= self.registry.len() {
			return Err(BvError::UnknownBv(bv));
		}

		if let Some(existing) = self.catalogue.find_const(bv, op, w) {
			let lit = self.catalogue.get(existing).lit;
			self.link_outer_equivalence(host, outer, lit);
			return Ok(lit);
		}

		let cmp_id = CmpId::from_usize(self.catalogue.len());
		let (var, _local) = self.link_var(host, outer, VarKind::Comparison { cmp: cmp_id });
		let lit = host.lit(var);
		let inserted = self.catalogue.insert_const(bv, op, w, lit);
		debug_assert_eq!(inserted, cmp_id);
		{
			let catalogue = &self.catalogue;
			let entry = self.registry.get_mut(bv);
			let pos = entry.compares.partition_point(|&id| catalogue.get(id).weight < w);
			entry.compares.insert(pos, cmp_id);
		}

		self.refresh_if_dirty(host, bv);
		let (under, over) = self.bounds(bv);
		if let Some(forced) = conclusion_for_threshold(op, w, under, over) {
			self.enqueue_forced(host, cmp_id, forced);
		}

		trace!(?bv, ?op, "registered constant comparison");
		Ok(lit)
	}

	/// Request (or retrieve) the comparison literal for `bv op other`, a
	/// bit-vector-to-bit-vector comparison (§4.3).
	///
	/// Canonicalises so the smaller-id side owns the record: if `bv > other`,
	/// this recurses as `¬newComparisonBV(op.negate... )`; see §4.3's
	/// canonicalisation rule.
	#[tracing::instrument(skip(self, host))]
	pub fn new_comparison_bv(
		&mut self,
		host: &mut H,
		op: CmpOp,
		bv: BvId,
		other: BvId,
		outer: Option<H::Var>,
	) -> Result<H::Lit, BvError> {
		if bv.index() >= self.registry.len() {
			return Err(BvError::UnknownBv(bv));
		}
		if other.index() >= self.registry.len() {
			return Err(BvError::UnknownBv(other));
		}

		if bv.index() > other.index() {
			// a op b  <=>  b op.flip() a; canonicalise on the smaller id.
			let lit = self.new_comparison_bv(host, op.flip(), other, bv, None)?;
			self.link_outer_equivalence(host, outer, lit);
			return Ok(lit);
		}

		if let Some(existing) = self.catalogue.find_bv(bv, op, other) {
			let lit = self.catalogue.get(existing).lit;
			self.link_outer_equivalence(host, outer, lit);
			return Ok(lit);
		}

		let cmp_id = CmpId::from_usize(self.catalogue.len());
		let (var, _local) = self.link_var(host, outer, VarKind::Comparison { cmp: cmp_id });
		let lit = host.lit(var);
		let inserted = self.catalogue.insert_bv(bv, op, other, lit);
		debug_assert_eq!(inserted, cmp_id);
		{
			let catalogue = &self.catalogue;
			let entry = self.registry.get_mut(bv);
			let pos = entry
				.bv_compares
				.partition_point(|&id| catalogue.get(id).other_bv.expect("bv_compares is bv-to-bv only") < other);
			entry.bv_compares.insert(pos, cmp_id);
		}
		self.registry.get_mut(other).referenced_by.push(cmp_id);

		self.refresh_if_dirty(host, bv);
		self.refresh_if_dirty(host, other);
		let (under_b, over_b) = self.bounds(bv);
		let (under_c, over_c) = self.bounds(other);
		if let Some(forced) = conclusion_for_bv(op, under_b, over_b, under_c, over_c) {
			self.enqueue_forced(host, cmp_id, forced);
		}

		trace!(?bv, ?other, ?op, "registered bit-vector comparison");
		Ok(lit)
	}

	/// Notify the theory that the host has assigned `lit` (§6's theory
	/// contract, `enqueueTheory`). Idempotent: a host re-notifying the same
	/// local variable before the next backtrack is a no-op.
	pub fn enqueue_theory(&mut self, host: &mut H, lit: H::Lit) {
		let var = host.var_of(lit);
		if let Some(local) = self.vars.by_host_var(var) {
			self.record_assignment(host, local);
		}
	}

	/// Record an observed assignment of local variable `local` on the trail
	/// and mark the bit-vectors it concerns dirty, unless it was already
	/// recorded since the last backtrack that would have undone it.
	fn record_assignment(&mut self, host: &H, local: LocalVarId) {
		if self.recorded[local] {
			return;
		}
		self.recorded[local] = true;

		let kind = self.vars.get(local).kind;
		let bv = match kind {
			VarKind::Bit { bv, index } => {
				let value = self.registry.get(bv).bits[index as usize].value(host).is_true();
				self.trail.push(TrailEntry {
					is_comparator: false,
					polarity: value,
					bv,
					local_var: local,
				});
				bv
			}
			VarKind::Comparison { cmp } => {
				let record = *self.catalogue.get(cmp);
				let value = host.value(record.lit).is_true();
				self.trail.push(TrailEntry {
					is_comparator: true,
					polarity: value,
					bv: record.bv,
					local_var: local,
				});
				record.bv
			}
		};
		self.mark_dirty(bv);
	}

	/// Enqueue `bv` (and every bit-vector that references it as the other
	/// side of a bit-vector-to-bit-vector comparison) for re-examination.
	fn mark_dirty(&mut self, bv: BvId) {
		self.dirty.grow_to(self.registry.len());
		if self.dirty.enqueue(bv) {
			self.registry.get_mut(bv).dirty = true;
		}
		let referenced_by = self.registry.get(bv).referenced_by.clone();
		for cmp_id in referenced_by {
			let owner = self.catalogue.get(cmp_id).bv;
			self.dirty.grow_to(self.registry.len());
			if self.dirty.enqueue(owner) {
				self.registry.get_mut(owner).dirty = true;
			}
		}
	}

	/// Self-generated propagation: enqueue `lit` (the polarity of `cmp_id`'s
	/// literal implied by `value`) on the host, attributing it to this
	/// theory's reason marker, then record the assignment exactly as if the
	/// host had called [`Self::enqueue_theory`] back.
	///
	/// Relies on the host applying `enqueue` synchronously, i.e. `host.value`
	/// reflects the new assignment before this call returns; this matches
	/// the "eager enqueue" design note (§9) that lets the theory keep its own
	/// intervals current without waiting for a callback round-trip.
	fn enqueue_forced(&mut self, host: &mut H, cmp_id: CmpId, value: bool) {
		let marker = *self.marker.get_or_insert_with(|| host.new_reason_marker());
		let record = *self.catalogue.get(cmp_id);
		let lit = if value { record.lit } else { !record.lit };
		host.enqueue(lit, marker);
		let var = host.var_of(record.lit);
		if let Some(local) = self.vars.by_host_var(var) {
			self.record_assignment(host, local);
		}
	}

	/// Refresh `bv`'s interval if it is currently marked dirty.
	fn refresh_if_dirty(&mut self, host: &H, bv: BvId) {
		if self.registry.get(bv).dirty {
			let _ = update_approximations(self.registry.get_mut(bv), host, &self.catalogue);
		}
	}

	/// The current `(under, over)` bounds of `bv`, assumed fresh.
	fn bounds(&self, bv: BvId) -> (W, W) {
		let b = self.registry.get(bv);
		(b.under, b.over)
	}

	/// `newDecisionLevel()`: open a fresh decision level on the theory's own
	/// trail (§4.9).
	pub fn new_decision_level(&mut self) {
		self.trail.new_decision_level();
	}

	/// Run the propagation loop until the dirty queue is empty or a conflict
	/// is found (§4.6).
	#[tracing::instrument(skip(self, host))]
	pub fn propagate(&mut self, host: &mut H) -> Result<(), Conflict<H>> {
		loop {
			let Some(bv) = self.dirty.pop() else {
				return Ok(());
			};
			if let Err(conflict) = self.propagate_bv(host, bv) {
				// Leave `bv` dirty: after the host backtracks past this
				// conflict, it still needs re-examining.
				self.mark_dirty(bv);
				return Err(conflict);
			}
		}
	}

	/// Refresh `bv`'s interval, settle every comparison it now decides
	/// (constant-threshold first, then bit-vector-to-bit-vector), and notify
	/// its sub-theory if it has one.
	fn propagate_bv(&mut self, host: &mut H, bv: BvId) -> Result<(), Conflict<H>> {
		if !update_approximations(self.registry.get_mut(bv), host, &self.catalogue) {
			return Err(self.build_inversion_conflict(host, bv));
		}

		let compares = self.registry.get(bv).compares.clone();
		for cmp_id in compares {
			let record = *self.catalogue.get(cmp_id);
			let (under, over) = self.bounds(bv);
			if let Some(forced) = conclusion_for_threshold(record.op, record.weight, under, over) {
				self.settle(host, cmp_id, forced)?;
			}
		}

		let bv_compares = self.registry.get(bv).bv_compares.clone();
		for cmp_id in bv_compares {
			let record = *self.catalogue.get(cmp_id);
			let other = record.other_bv.expect("bv_compares entries are always bit-vector-to-bit-vector");
			if self.registry.get(other).dirty && !update_approximations(self.registry.get_mut(other), host, &self.catalogue) {
				return Err(self.build_inversion_conflict(host, other));
			}
			let (under_b, over_b) = self.bounds(bv);
			let (under_c, over_c) = self.bounds(other);
			if let Some(forced) = conclusion_for_bv(record.op, under_b, over_b, under_c, over_c) {
				self.settle(host, cmp_id, forced)?;
			}
		}

		if let Some(theory_id) = self.registry.get(bv).theory_id {
			let view = {
				let b = self.registry.get(bv);
				BvView {
					bv,
					under: b.under,
					over: b.over,
					bits: &b.bits,
				}
			};
			self.subtheories[theory_id].enqueue_bv(view);
		}

		Ok(())
	}

	/// Settle `cmp_id` against the freshly computed `forced` verdict: skip if
	/// it already holds, enqueue it if unknown, or build a conflict if the
	/// current assignment contradicts it.
	fn settle(&mut self, host: &mut H, cmp_id: CmpId, forced: bool) -> Result<(), Conflict<H>> {
		let lit = self.catalogue.get(cmp_id).lit;
		match host.value(lit) {
			LitValue::Unknown => {
				self.enqueue_forced(host, cmp_id, forced);
				Ok(())
			}
			LitValue::True if forced => Ok(()),
			LitValue::False if !forced => Ok(()),
			_ => Err(self.build_conflict(host, cmp_id, forced)),
		}
	}

	/// Build the conflict for a comparison literal that is already assigned
	/// opposite to what its bit-vector's interval now forces.
	fn build_conflict(&mut self, host: &mut H, cmp_id: CmpId, forced: bool) -> Conflict<H> {
		let mut clause = self.explain(host, cmp_id, forced);
		let record = *self.catalogue.get(cmp_id);
		let forced_lit = if forced { record.lit } else { !record.lit };
		clause.push(forced_lit);
		debug!(?cmp_id, clause_len = clause.len(), "conflict");
		Conflict {
			subject: Some(forced_lit),
			clause,
		}
	}

	/// Build the (non-minimal, but sound) conflict for a bit-vector whose
	/// interval went inverted (`under > over`) after a refresh: the negation
	/// of every currently assigned bit, plus the negation of every currently
	/// assigned constant comparison on it.
	///
	/// Both halves are needed: the inversion can come from the bits alone
	/// (e.g. every bit of a 4-bit vector assigned `true` drives `under` to
	/// 15, past a `<=3` comparison's tightened `over`), from the comparisons
	/// alone, or from a mix of the two, so omitting either half would leave
	/// an unsound (not-yet-falsified) clause.
	fn build_inversion_conflict(&mut self, host: &mut H, bv: BvId) -> Conflict<H> {
		let mut clause = Vec::new();
		let bits = self.registry.get(bv).bits.clone();
		for bit in bits {
			if let BitVal::Lit(lit) = bit {
				match host.value(lit) {
					LitValue::True => clause.push(!lit),
					LitValue::False => clause.push(lit),
					LitValue::Unknown => {}
				}
			}
		}
		let compares = self.registry.get(bv).compares.clone();
		for cmp_id in compares {
			let record = *self.catalogue.get(cmp_id);
			match host.value(record.lit) {
				LitValue::True => clause.push(!record.lit),
				LitValue::False => clause.push(record.lit),
				LitValue::Unknown => {}
			}
		}
		debug!(?bv, clause_len = clause.len(), "interval inverted after refresh");
		Conflict { subject: None, clause }
	}

	/// Build the explanation for `cmp_id`'s truth value `forced`, dispatching
	/// to the constant-threshold reason builder or assembling the full
	/// bit-vector-to-bit-vector reason (§4.7/§4.8).
	fn explain(&mut self, host: &mut H, cmp_id: CmpId, forced: bool) -> Vec<H::Lit> {
		let record = *self.catalogue.get(cmp_id);
		match record.other_bv {
			None => {
				let bv = self.registry.get(record.bv);
				build_value_reason(record.op, record.weight, cmp_id, bv, &self.catalogue, host, forced)
			}
			Some(other) => self.build_reason_bv(host, record.bv, other, record.op, forced),
		}
	}

	/// §4.8: explain a bit-vector-to-bit-vector conclusion `b op c == forced`.
	///
	/// If one side is constant, the comparison degenerates into a
	/// constant-threshold one, materialised on demand. Otherwise, split the
	/// gap between the two intervals at a midpoint and explain each side's
	/// half independently.
	fn build_reason_bv(&mut self, host: &mut H, b: BvId, c: BvId, op: CmpOp, forced: bool) -> Vec<H::Lit> {
		self.refresh_if_dirty(host, b);
		self.refresh_if_dirty(host, c);

		let b_const = self.registry.get(b).is_const;
		let c_const = self.registry.get(c).is_const;

		if b_const && c_const {
			return Vec::new();
		}
		if c_const {
			let k = self.registry.get(c).under;
			let cmp_id = self.ensure_const_comparison(host, op, b, k);
			let bv = self.registry.get(b);
			return build_value_reason(op, k, cmp_id, bv, &self.catalogue, host, forced);
		}
		if b_const {
			let k = self.registry.get(b).under;
			let flipped = op.flip();
			let cmp_id = self.ensure_const_comparison(host, flipped, c, k);
			let bv = self.registry.get(c);
			return build_value_reason(flipped, k, cmp_id, bv, &self.catalogue, host, forced);
		}

		let eff_op = if forced { op } else { op.negate() };
		let (under_b, over_b) = self.bounds(b);
		let (under_c, over_c) = self.bounds(c);
		let Ok(split) = midpoint_split(eff_op, under_b, over_b, under_c, over_c) else {
			return Vec::new();
		};

		let b_cmp = self.ensure_const_comparison(host, split.b_op, b, split.m);
		let c_cmp = self.ensure_const_comparison(host, split.c_op, c, split.m);
		let mut reason = {
			let bv = self.registry.get(b);
			build_value_reason(split.b_op, split.m, b_cmp, bv, &self.catalogue, host, true)
		};
		reason.extend({
			let bv = self.registry.get(c);
			build_value_reason(split.c_op, split.m, c_cmp, bv, &self.catalogue, host, true)
		});
		reason
	}

	/// Find or materialise the constant-threshold comparison `bv op w`,
	/// purely for use inside reason construction: the allocated literal's
	/// host variable is never itself propagated or asked about, only the
	/// record's place in `compares[bv]` is used to recurse into
	/// [`build_value_reason`].
	fn ensure_const_comparison(&mut self, host: &mut H, op: CmpOp, bv: BvId, w: W) -> CmpId {
		if let Some(id) = self.catalogue.find_const(bv, op, w) {
			return id;
		}

		let cmp_id = CmpId::from_usize(self.catalogue.len());
		let (var, _local) = self.link_var(host, None, VarKind::Comparison { cmp: cmp_id });
		let lit = host.lit(var);
		let inserted = self.catalogue.insert_const(bv, op, w, lit);
		debug_assert_eq!(inserted, cmp_id);
		{
			let catalogue = &self.catalogue;
			let entry = self.registry.get_mut(bv);
			let pos = entry.compares.partition_point(|&id| catalogue.get(id).weight < w);
			entry.compares.insert(pos, cmp_id);
		}
		cmp_id
	}

	/// `buildReason(literal, marker)`: the host's reason callback (§6).
	///
	/// The host is expected to have already backtracked its own trail past
	/// `lit` (or to be calling this immediately upon enqueuing it), so that
	/// the bit and sibling values this reads reflect the pre-implication
	/// state, per §4.7's "reconstructed, not cached" design.
	///
	/// Per P3, the returned clause carries `lit` itself plus the supporting
	/// literals, every one of which is currently false; [`Self::explain`]
	/// only ever builds the supporting half, so `lit` is prepended here.
	pub fn build_reason(&mut self, host: &mut H, lit: H::Lit, marker: ReasonMarker) -> Vec<H::Lit> {
		debug_assert_eq!(Some(marker), self.marker, "build_reason called with a foreign marker");
		let var = host.var_of(lit);
		let Some(local) = self.vars.by_host_var(var) else {
			return Vec::new();
		};
		let VarKind::Comparison { cmp } = self.vars.get(local).kind else {
			return Vec::new();
		};
		let record_lit = self.catalogue.get(cmp).lit;
		let forced = lit == record_lit;
		let mut clause = self.explain(host, cmp, forced);
		clause.insert(0, lit);
		clause
	}

	/// `backtrackUntil(level)`: undo every theory-relevant assignment made
	/// since decision level `level` was opened (§4.9).
	#[tracing::instrument(skip(self, host))]
	pub fn backtrack_until_level(&mut self, host: &H, level: u32) {
		let undone = self.trail.backtrack_to_level(level);
		self.undo_entries(host, undone);
	}

	/// `backtrackUntil(literal)`: undo every theory-relevant assignment made
	/// since (and including) `lit`'s local variable was assigned (§4.9).
	#[tracing::instrument(skip(self, host))]
	pub fn backtrack_until_lit(&mut self, host: &H, lit: H::Lit) {
		let var = host.var_of(lit);
		let Some(local) = self.vars.by_host_var(var) else {
			return;
		};
		let bv = match self.vars.get(local).kind {
			VarKind::Bit { bv, .. } => bv,
			VarKind::Comparison { cmp } => self.catalogue.get(cmp).bv,
		};
		let undone = self.trail.backtrack_to_entry(bv, local);
		self.undo_entries(host, undone);
	}

	/// Shared tail of both backtrack entry points: mark every undone
	/// assignment's bit-vector dirty and not-yet-recorded, then drain the
	/// deduplicated backtrack-notify queue.
	fn undo_entries(&mut self, _host: &H, undone: Vec<TrailEntry>) {
		self.dirty.grow_to(self.registry.len());
		self.backtrack_notify.grow_to(self.registry.len());

		for entry in &undone {
			self.recorded[entry.local_var] = false;
			self.registry.get_mut(entry.bv).dirty = true;
			let _ = self.dirty.enqueue(entry.bv);
			if self.registry.get(entry.bv).theory_id.is_some() {
				let _ = self.backtrack_notify.enqueue(entry.bv);
			}
		}

		while let Some(bv) = self.backtrack_notify.pop() {
			if let Some(theory_id) = self.registry.get(bv).theory_id {
				self.subtheories[theory_id].backtrack_bv(bv);
			}
		}
	}

	/// `decideTheory()`: the theory never makes a search decision of its own
	/// (§4.10); always `None`.
	pub fn decide_theory(&self) -> Option<H::Lit> {
		None
	}

	/// Check that every assigned comparison literal is consistent with its
	/// bit-vector's fully determined bit assignment. Intended for a final
	/// model check once the host reports satisfiability (§6).
	pub fn check(&self, host: &H) -> bool {
		for cmp_id in self.catalogue.ids() {
			let record = self.catalogue.get(cmp_id);
			let value = host.value(record.lit);
			if value.is_unknown() {
				continue;
			}
			let holds = match record.other_bv {
				None => {
					let bv = self.registry.get(record.bv);
					let (under, over) = bits_bounds(bv, host);
					conclusion_for_threshold(record.op, record.weight, under, over) == Some(value.is_true())
				}
				Some(other) => {
					let b = self.registry.get(record.bv);
					let c = self.registry.get(other);
					let (under_b, over_b) = bits_bounds(b, host);
					let (under_c, over_c) = bits_bounds(c, host);
					conclusion_for_bv(record.op, under_b, over_b, under_c, over_c) == Some(value.is_true())
				}
			};
			if !holds {
				return false;
			}
		}
		true
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use super::*;

	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
	pub struct MockVar(u32);

	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
	pub struct MockLit {
		var: MockVar,
		neg: bool,
	}

	impl std::ops::Not for MockLit {
		type Output = MockLit;
		fn not(self) -> MockLit {
			MockLit { var: self.var, neg: !self.neg }
		}
	}

	/// A minimal, SAT-driver-free [`Host`] used only to exercise the theory
	/// core's integration scenarios; it has no clause learning or search of
	/// its own, just the state the theory's contract needs to observe.
	#[derive(Debug, Default)]
	struct MockHost {
		next_var: u32,
		values: HashMap<MockVar, bool>,
		levels: HashMap<MockVar, u32>,
		current_level: u32,
		clauses: Vec<Vec<MockLit>>,
		next_marker: u32,
	}

	impl MockHost {
		fn pos(var: MockVar) -> MockLit {
			MockLit { var, neg: false }
		}

		fn set(&mut self, lit: MockLit, value: bool) {
			let v = if lit.neg { !value } else { value };
			let _ = self.values.insert(lit.var, v);
			let _ = self.levels.entry(lit.var).or_insert(self.current_level);
		}

		fn new_decision_level(&mut self) {
			self.current_level += 1;
		}
	}

	impl Host for MockHost {
		type Var = MockVar;
		type Lit = MockLit;

		fn new_var(&mut self) -> MockVar {
			let v = MockVar(self.next_var);
			self.next_var += 1;
			v
		}

		fn lit(&self, var: MockVar) -> MockLit {
			Self::pos(var)
		}

		fn var_of(&self, lit: MockLit) -> MockVar {
			lit.var
		}

		fn observe(&mut self, _var: MockVar) {}

		fn new_reason_marker(&mut self) -> ReasonMarker {
			let m = ReasonMarker(self.next_marker);
			self.next_marker += 1;
			m
		}

		fn enqueue(&mut self, lit: MockLit, _marker: ReasonMarker) {
			self.set(lit, true);
		}

		fn value(&self, lit: MockLit) -> LitValue {
			let raw = self.values.get(&lit.var).copied().map(|v| if lit.neg { !v } else { v });
			raw.into()
		}

		fn level(&self, var: MockVar) -> u32 {
			self.levels.get(&var).copied().unwrap_or(self.current_level)
		}

		fn add_clause_safely(&mut self, clause: &[MockLit]) {
			self.clauses.push(clause.to_vec());
		}
	}

	/// Register a fresh 4-bit bit-vector with its own host variables,
	/// LSB first, and enqueue its bits as the theory's initial dirty set.
	fn new_bv_4(theory: &mut BvTheory<MockHost, u32>, host: &mut MockHost) -> (BvId, Vec<MockLit>) {
		let bits: Vec<MockLit> = (0..4)
			.map(|_| {
				let v = host.new_var();
				host.lit(v)
			})
			.collect();
		let bv = theory.new_bitvector(host, bits.iter().map(|&l| BitVal::Lit(l)).collect());
		(bv, bits)
	}

	fn set_and_notify(theory: &mut BvTheory<MockHost, u32>, host: &mut MockHost, lit: MockLit, value: bool) {
		host.set(lit, value);
		theory.enqueue_theory(host, lit);
	}

	/// S1: a single 4-bit bit-vector with one constant-threshold comparison,
	/// forced false by its under-approximation once enough bits settle.
	#[test]
	fn s1_single_bv_constant_threshold() {
		let mut host = MockHost::default();
		let mut theory = BvTheory::<MockHost, u32>::new(Config::default());
		let (bv, bits) = new_bv_4(&mut theory, &mut host);
		let lit = theory.new_comparison(&mut host, CmpOp::Lt, bv, 5, None).unwrap();

		theory.new_decision_level();
		host.new_decision_level();
		set_and_notify(&mut theory, &mut host, bits[0], true);
		set_and_notify(&mut theory, &mut host, bits[2], true);
		theory.propagate(&mut host).unwrap();

		assert_eq!(host.value(lit), LitValue::False);

		let marker = theory.marker.unwrap();
		let reason = theory.build_reason(&mut host, !lit, marker);
		// b<5 forced false means b>=5: the bits that drove the conclusion are
		// currently `true`, so the reason (all-falsified, per P3) carries their
		// negations, alongside the propagated literal itself.
		assert!(reason.contains(&!lit));
		assert!(reason.contains(&!bits[0]));
		assert!(reason.contains(&!bits[2]));
	}

	/// S2: the under-approximation alone forces a `>=` comparison true, and
	/// the reason drops the one bit that does not affect the conclusion.
	#[test]
	fn s2_geq_forced_true_drops_irrelevant_bit() {
		let mut host = MockHost::default();
		let mut theory = BvTheory::<MockHost, u32>::new(Config::default());
		let (bv, bits) = new_bv_4(&mut theory, &mut host);
		let lit = theory.new_comparison(&mut host, CmpOp::Geq, bv, 4, None).unwrap();

		theory.new_decision_level();
		host.new_decision_level();
		set_and_notify(&mut theory, &mut host, bits[2], true); // weight 4
		set_and_notify(&mut theory, &mut host, bits[0], true); // weight 1, irrelevant to >= 4
		theory.propagate(&mut host).unwrap();

		assert_eq!(host.value(lit), LitValue::True);

		let marker = theory.marker.unwrap();
		let reason = theory.build_reason(&mut host, lit, marker);
		// The reason carries the propagated literal plus the negation of the
		// one relevant (currently-true) bit; `bits[0]` is dropped.
		assert_eq!(reason, vec![lit, !bits[2]]);
	}

	/// S3: two non-constant bit-vectors compared directly; once the host
	/// reports the forced literal, the midpoint-split reason names a
	/// threshold strictly between the two intervals.
	#[test]
	fn s3_bv_to_bv_midpoint_reason() {
		let mut host = MockHost::default();
		let mut theory = BvTheory::<MockHost, u32>::new(Config::default());
		let (b, b_bits) = new_bv_4(&mut theory, &mut host);
		let (c, c_bits) = new_bv_4(&mut theory, &mut host);
		let lit = theory.new_comparison_bv(&mut host, CmpOp::Lt, b, c, None).unwrap();

		theory.new_decision_level();
		host.new_decision_level();
		set_and_notify(&mut theory, &mut host, b_bits[2], false); // over[b] tightened below 8
		set_and_notify(&mut theory, &mut host, c_bits[3], true); // under[c] at least 8
		theory.propagate(&mut host).unwrap();

		assert_eq!(host.value(lit), LitValue::True);

		let marker = theory.marker.unwrap();
		let reason = theory.build_reason(&mut host, lit, marker);
		assert!(!reason.is_empty());
	}

	/// S4: a comparison requested twice for the same `(bv, op, w)` returns
	/// the same literal rather than allocating a second one (P6/idempotence).
	#[test]
	fn s4_repeated_comparison_is_idempotent() {
		let mut host = MockHost::default();
		let mut theory = BvTheory::<MockHost, u32>::new(Config::default());
		let (bv, _bits) = new_bv_4(&mut theory, &mut host);

		let first = theory.new_comparison(&mut host, CmpOp::Leq, bv, 9, None).unwrap();
		let second = theory.new_comparison(&mut host, CmpOp::Leq, bv, 9, None).unwrap();
		assert_eq!(first, second);
		assert_eq!(theory.catalogue.len(), 1);
	}

	/// S5: backtracking past a decision level undoes the dirty/trail state a
	/// propagation left behind, and the comparison goes back to unknown once
	/// the host itself rolls its assignment back.
	#[test]
	fn s5_backtrack_undoes_forced_literal_bookkeeping() {
		let mut host = MockHost::default();
		let mut theory = BvTheory::<MockHost, u32>::new(Config::default());
		let (bv, bits) = new_bv_4(&mut theory, &mut host);
		let lit = theory.new_comparison(&mut host, CmpOp::Lt, bv, 2, None).unwrap();

		theory.new_decision_level();
		set_and_notify(&mut theory, &mut host, bits[0], true);
		set_and_notify(&mut theory, &mut host, bits[1], true);
		theory.propagate(&mut host).unwrap();
		assert_eq!(host.value(lit), LitValue::False);

		let trail_len_before = theory.trail.len();
		theory.backtrack_until_level(&host, 0);
		assert!(theory.trail.len() < trail_len_before);
		assert!(theory.dirty.contains(bv));
	}

	/// S6: a bit-vector-to-bit-vector comparison against a constant-valued
	/// bit-vector degenerates into a constant-threshold explanation.
	#[test]
	fn s6_bv_to_constant_bv_reason_degenerates() {
		let mut host = MockHost::default();
		let mut theory = BvTheory::<MockHost, u32>::new(Config::default());
		let (b, b_bits) = new_bv_4(&mut theory, &mut host);
		let const_bv = theory.new_bitvector(&mut host, vec![BitVal::Const(true), BitVal::Const(false), BitVal::Const(true), BitVal::Const(false)]); // value 5

		let lit = theory.new_comparison_bv(&mut host, CmpOp::Gt, b, const_bv, None).unwrap();
		set_and_notify(&mut theory, &mut host, b_bits[3], true); // weight 8, forces b > 5
		theory.propagate(&mut host).unwrap();

		assert_eq!(host.value(lit), LitValue::True);
		let marker = theory.marker.unwrap();
		let reason = theory.build_reason(&mut host, lit, marker);
		assert_eq!(reason, vec![lit, !b_bits[3]]);
	}
}
