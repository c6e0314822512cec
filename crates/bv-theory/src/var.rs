//! Identifiers and the bidirectional host/local variable map (C2).

use std::collections::HashMap;

use index_vec::{define_index_type, IndexVec};

use crate::host::Host;

define_index_type! {
	/// Identifies a bit-vector registered with the theory.
	pub struct BvId = u32;
}

define_index_type! {
	/// Identifies a constant-threshold or bit-vector-to-bit-vector comparison
	/// record.
	pub struct CmpId = u32;
}

define_index_type! {
	/// Identifies a local variable: either a bit of some [`BvId`], or a
	/// comparison literal for some [`CmpId`].
	pub struct LocalVarId = u32;
}

/// What role a [`LocalVarId`] plays within the theory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
	/// The variable is bit `index` (0 = LSB) of bit-vector `bv`.
	Bit {
		/// The bit-vector this variable is a bit of.
		bv: BvId,
		/// The bit index within `bv`, 0 = LSB.
		index: u32,
	},
	/// The variable is the comparison literal of `cmp`.
	Comparison {
		/// The comparison record this variable represents.
		cmp: CmpId,
	},
}

/// A local theory variable: the host variable it maps to, plus its role.
#[derive(Debug, Clone, Copy)]
pub struct LocalVar<H: Host> {
	/// The host-level variable this local variable is linked to.
	pub host_var: H::Var,
	/// What this local variable represents within the theory.
	pub kind: VarKind,
}

/// The bidirectional map between local theory variables and host variables.
#[derive(Debug)]
pub struct VarMap<H: Host> {
	/// Local variables, indexed by [`LocalVarId`].
	vars: IndexVec<LocalVarId, LocalVar<H>>,
	/// Reverse lookup from a host variable to its local variable.
	by_host_var: HashMap<H::Var, LocalVarId>,
}

impl<H: Host> Default for VarMap<H> {
	fn default() -> Self {
		VarMap {
			vars: IndexVec::new(),
			by_host_var: HashMap::new(),
		}
	}
}

impl<H: Host> VarMap<H> {
	/// Allocate a new local variable of the given `kind`, linked to
	/// `host_var`.
	pub fn push(&mut self, host_var: H::Var, kind: VarKind) -> LocalVarId {
		let id = self.vars.push(LocalVar { host_var, kind });
		let _ = self.by_host_var.insert(host_var, id);
		id
	}

	/// Look up a local variable by id.
	pub fn get(&self, id: LocalVarId) -> &LocalVar<H> {
		&self.vars[id]
	}

	/// Look up the local variable linked to a given host variable, if any.
	pub fn by_host_var(&self, host_var: H::Var) -> Option<LocalVarId> {
		self.by_host_var.get(&host_var).copied()
	}
}
