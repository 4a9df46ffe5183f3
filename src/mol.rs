use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, HashSet};

use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableUnGraph;
use petgraph::visit::EdgeRef;

use crate::atom::{Atom, Traversal};
use crate::config::{MolConfig, Strictness};
use crate::diagnostics::{Diagnostic, Recovery};
use crate::error::{MolError, MolResult};

/// Highest bond order `add_atom` accepts (quadruple).
pub const MAX_BOND_ORDER: u8 = 4;

/// Maps atom indices of a consumed molecule to their indices after welding.
pub type AtomMap = HashMap<NodeIndex, NodeIndex>;

/// Edge weight. `serial` records creation order, which petgraph's edge
/// indices do not once a freed edge slot is reused.
#[derive(Debug, Clone, Copy)]
struct Bond {
    order: u8,
    serial: u64,
}

/// A mutable molecular graph.
///
/// Atoms live in a stable arena and are identified by [`NodeIndex`]. Removing
/// an atom leaves a vacant slot behind, so other indices keep their meaning
/// and a removed index is never handed out again; it answers
/// [`MolError::UnknownAtom`] from then on. A bond is a single undirected edge
/// weighted by its order, so `bond_order(a, b) == bond_order(b, a)` always
/// holds.
///
/// The arena can also hold *detached* atoms made with
/// [`create_atom`](Self::create_atom). They become members once attached.
///
/// Recovered problems accumulate in [`diagnostics`](Self::diagnostics) until
/// drained with [`take_diagnostics`](Self::take_diagnostics).
///
/// # Examples
///
/// ```
/// use stereomol::{Atom, Molecule};
///
/// let mut mol = Molecule::new(Atom::new("C"));
/// let c = mol.atoms()[0];
/// let o = mol.attach(Atom::new("O"), c, 2).unwrap();
/// assert_eq!(mol.bond_order(c, o), Some(2));
///
/// let added = mol.add_hydrogens().unwrap();
/// assert_eq!(added, 2); // formaldehyde
/// assert_eq!(mol.count_element("H"), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Molecule {
    graph: StableUnGraph<Atom, Bond>,
    members: Vec<NodeIndex>,
    vacant: HashSet<NodeIndex>,
    next_serial: u64,
    config: MolConfig,
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl Molecule {
    pub fn new(seed: Atom) -> Self {
        Self::with_config(seed, MolConfig::default())
    }

    pub fn with_config(seed: Atom, config: MolConfig) -> Self {
        let mut graph = StableUnGraph::default();
        let first = graph.add_node(seed);
        Self {
            graph,
            members: vec![first],
            vacant: HashSet::new(),
            next_serial: 0,
            config,
            diagnostics: RefCell::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &MolConfig {
        &self.config
    }

    pub fn set_strictness(&mut self, strictness: Strictness) {
        self.config.strictness = strictness;
    }

    pub(crate) fn is_strict(&self) -> bool {
        self.config.is_strict()
    }

    /// Member atoms in insertion order.
    pub fn atoms(&self) -> &[NodeIndex] {
        &self.members
    }

    pub fn atom_count(&self) -> usize {
        self.members.len()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, idx: NodeIndex) -> bool {
        self.members.contains(&idx)
    }

    /// # Panics
    ///
    /// Panics if `idx` does not name an atom of this molecule.
    pub fn atom(&self, idx: NodeIndex) -> &Atom {
        match self.get_atom(idx) {
            Some(atom) => atom,
            None => panic!("no atom with index {}", idx.index()),
        }
    }

    /// # Panics
    ///
    /// Panics if `idx` does not name an atom of this molecule.
    pub fn atom_mut(&mut self, idx: NodeIndex) -> &mut Atom {
        if self.vacant.contains(&idx) {
            panic!("no atom with index {}", idx.index());
        }
        &mut self.graph[idx]
    }

    pub fn get_atom(&self, idx: NodeIndex) -> Option<&Atom> {
        if self.vacant.contains(&idx) {
            return None;
        }
        self.graph.node_weight(idx)
    }

    /// Puts `atom` in the arena without attaching it.
    pub fn create_atom(&mut self, atom: Atom) -> NodeIndex {
        self.graph.add_node(atom)
    }

    /// Creates `atom` and attaches it to `target` in one step.
    pub fn attach(&mut self, atom: Atom, target: NodeIndex, bond_order: u8) -> MolResult<NodeIndex> {
        self.ensure_exists(target)?;
        self.validate_add_atom(target, bond_order)?;
        let idx = self.create_atom(atom);
        self.add_atom(idx, target, bond_order)?;
        Ok(idx)
    }

    /// Attaches the not-yet-member atom `new_atom` to the member `target`.
    ///
    /// A bond order of 0 does nothing. If `new_atom` is already a member this
    /// bonds the two atoms through [`add_bond`](Self::add_bond) instead
    /// ([`Recovery::DegradeToBond`]).
    pub fn add_atom(&mut self, new_atom: NodeIndex, target: NodeIndex, bond_order: u8) -> MolResult<()> {
        self.ensure_exists(new_atom)?;
        self.ensure_exists(target)?;
        if bond_order == 0 {
            return Ok(());
        }
        if new_atom == target {
            return Err(MolError::SelfBond(target));
        }
        self.validate_add_atom(target, bond_order)?;
        if !(1..=MAX_BOND_ORDER).contains(&bond_order) {
            self.recover(Recovery::AcceptBondOrder, new_atom);
        }

        if self.contains(new_atom) {
            self.note(Diagnostic::AtomAlreadyMember(new_atom));
            self.recover(Recovery::DegradeToBond, new_atom);
            return self.add_bond(target, new_atom, bond_order);
        }
        self.members.push(new_atom);
        self.add_bond(new_atom, target, bond_order)
    }

    fn validate_add_atom(&self, target: NodeIndex, bond_order: u8) -> MolResult<()> {
        if !self.is_strict() || bond_order == 0 {
            return Ok(());
        }
        if bond_order > MAX_BOND_ORDER {
            return Err(MolError::InvalidBondOrder(bond_order));
        }
        if !self.contains(target) {
            return Err(MolError::AtomNotInMolecule(target));
        }
        Ok(())
    }

    /// Creates or overwrites the bond between `a` and `b`.
    ///
    /// The order is stored as given. Non-member endpoints are an error in
    /// strict mode and are admitted ([`Recovery::AdmitNonMember`]) otherwise.
    /// Bonding an atom to itself is an error in every mode.
    pub fn add_bond(&mut self, a: NodeIndex, b: NodeIndex, bond_order: u8) -> MolResult<()> {
        self.ensure_exists(a)?;
        self.ensure_exists(b)?;
        if a == b {
            return Err(MolError::SelfBond(a));
        }
        self.admit(&[a, b])?;
        self.set_bond(a, b, bond_order);
        Ok(())
    }

    /// Welds `other` into this molecule and bonds `foreign_target` (an index
    /// of `other`) to `self_target`.
    ///
    /// `other` is consumed: its atoms move into this arena, so none is
    /// duplicated. The returned map translates `other`'s indices.
    pub fn add_molecule(
        &mut self,
        other: Molecule,
        foreign_target: NodeIndex,
        self_target: NodeIndex,
        bond_order: u8,
    ) -> MolResult<AtomMap> {
        self.ensure_exists(self_target)?;
        other.ensure_exists(foreign_target)?;
        if self.is_strict() {
            if !self.contains(self_target) {
                return Err(MolError::AtomNotInMolecule(self_target));
            }
            if !other.contains(foreign_target) {
                return Err(MolError::AtomNotInMolecule(foreign_target));
            }
        }

        let Molecule {
            mut graph,
            mut members,
            diagnostics,
            ..
        } = other;
        self.diagnostics.get_mut().extend(diagnostics.into_inner());
        if !members.contains(&foreign_target) {
            members.push(foreign_target);
            self.recover(Recovery::AdmitNonMember, foreign_target);
        }

        let mut edges: Vec<(u64, NodeIndex, NodeIndex, u8)> = graph
            .edge_indices()
            .filter_map(|e| {
                let (a, b) = graph.edge_endpoints(e)?;
                Some((graph[e].serial, a, b, graph[e].order))
            })
            .collect();
        edges.sort_by_key(|&(serial, ..)| serial);

        let mut map = AtomMap::with_capacity(members.len());
        for old in members {
            if let Some(atom) = graph.remove_node(old) {
                let new = self.graph.add_node(atom);
                self.members.push(new);
                map.insert(old, new);
            }
        }
        for (_, a, b, order) in edges {
            if let (Some(&a), Some(&b)) = (map.get(&a), map.get(&b)) {
                self.push_edge(a, b, order);
            }
        }

        let moved: Vec<NodeIndex> = map.values().copied().collect();
        for new in moved {
            self.remap_stereo(new, &map);
            self.graph[new].traversal.reset();
        }

        let foreign = map[&foreign_target];
        self.add_bond(self_target, foreign, bond_order)?;
        Ok(map)
    }

    fn remap_stereo(&mut self, idx: NodeIndex, map: &AtomMap) {
        let lookup = |i: NodeIndex| map.get(&i).copied();
        let atom = &mut self.graph[idx];
        let mut refs: Vec<NodeIndex> = Vec::new();
        if let Some(center) = atom.chirality {
            refs.extend(center.slots().into_iter().flatten());
            atom.chirality = center.remap(lookup);
        }
        if let Some(ct) = atom.cis_trans {
            refs.extend([ct.other, ct.cw, ct.ccw]);
            atom.cis_trans = ct.remap(lookup);
        }
        if let Some(&lost) = refs.iter().find(|r| !map.contains_key(*r)) {
            self.note(Diagnostic::StereoDropped { center: idx, lost });
        }
    }

    /// Removes `target` and every bond to it, returning the detached atom.
    ///
    /// Stereo records and traversal bookkeeping on other atoms that reference
    /// `target` are dropped. The index stays vacant.
    pub fn remove_atom(&mut self, target: NodeIndex) -> MolResult<Atom> {
        self.ensure_exists(target)?;
        if self.is_strict() && !self.contains(target) {
            return Err(MolError::AtomNotInMolecule(target));
        }

        let others: Vec<NodeIndex> = self.graph.node_indices().filter(|&i| i != target).collect();
        for center in others {
            self.drop_stereo_referencing(center, target);
            forget_in_traversal(&mut self.graph[center].traversal, target);
        }
        let edges: Vec<_> = self.graph.edges(target).map(|e| e.id()).collect();
        for edge in edges {
            self.graph.remove_edge(edge);
        }
        self.members.retain(|&m| m != target);
        self.vacant.insert(target);
        Ok(std::mem::replace(&mut self.graph[target], Atom::new("")))
    }

    /// Sets a new bond order. An order of 0 deletes the bond, which must
    /// exist.
    pub fn change_bond(&mut self, a: NodeIndex, b: NodeIndex, new_order: u8) -> MolResult<()> {
        self.ensure_exists(a)?;
        self.ensure_exists(b)?;
        if a == b {
            return Err(MolError::SelfBond(a));
        }
        if self.is_strict() {
            for idx in [a, b] {
                if !self.contains(idx) {
                    return Err(MolError::AtomNotInMolecule(idx));
                }
            }
            if new_order > MAX_BOND_ORDER {
                return Err(MolError::InvalidBondOrder(new_order));
            }
        }

        if new_order == 0 {
            let edge = self.graph.find_edge(a, b).ok_or(MolError::NoSuchBond(a, b))?;
            self.graph.remove_edge(edge);
            self.drop_stereo_referencing(a, b);
            self.drop_stereo_referencing(b, a);
            return Ok(());
        }

        if new_order > MAX_BOND_ORDER {
            self.recover(Recovery::AcceptBondOrder, a);
        }
        self.admit(&[a, b])?;
        self.set_bond(a, b, new_order);
        Ok(())
    }

    pub fn remove_bond(&mut self, a: NodeIndex, b: NodeIndex) -> MolResult<()> {
        self.change_bond(a, b, 0)
    }

    /// Number of member atoms whose symbol is exactly `element`.
    pub fn count_element(&self, element: &str) -> usize {
        self.members
            .iter()
            .filter(|&&idx| self.graph[idx].element == element)
            .count()
    }

    pub fn bond_order(&self, a: NodeIndex, b: NodeIndex) -> Option<u8> {
        self.graph.find_edge(a, b).map(|e| self.graph[e].order)
    }

    /// Neighbors of `idx` with their bond orders, in bond-creation order.
    /// Overwriting a bond's order keeps its place.
    pub fn bonds_of(&self, idx: NodeIndex) -> Vec<(NodeIndex, u8)> {
        if self.get_atom(idx).is_none() {
            return Vec::new();
        }
        let mut edges: Vec<_> = self
            .graph
            .edges(idx)
            .map(|e| {
                let other = if e.source() == idx { e.target() } else { e.source() };
                (e.weight().serial, other, e.weight().order)
            })
            .collect();
        edges.sort_by_key(|&(serial, _, _)| serial);
        edges.into_iter().map(|(_, other, order)| (other, order)).collect()
    }

    pub fn neighbors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.bonds_of(idx).into_iter().map(|(other, _)| other)
    }

    pub fn degree(&self, idx: NodeIndex) -> usize {
        self.bonds_of(idx).len()
    }

    /// Every bond once, as `(low, high, order)` sorted by endpoint index.
    pub fn bonds(&self) -> Vec<(NodeIndex, NodeIndex, u8)> {
        let mut out: Vec<_> = self
            .graph
            .edge_indices()
            .filter_map(|e| {
                let (a, b) = self.graph.edge_endpoints(e)?;
                let (lo, hi) = if a.index() <= b.index() { (a, b) } else { (b, a) };
                Some((lo, hi, self.graph[e].order))
            })
            .collect();
        out.sort();
        out
    }

    /// Sum of the orders of the bonds present on `idx`.
    pub fn total_bond_order(&self, idx: NodeIndex) -> u32 {
        self.bonds_of(idx).iter().map(|&(_, order)| order as u32).sum()
    }

    pub fn neighbor_elements(&self, idx: NodeIndex) -> BTreeSet<&str> {
        self.neighbors(idx)
            .map(|nb| self.graph[nb].element.as_str())
            .collect()
    }

    /// First neighbor of `idx` whose symbol is `element`.
    pub fn select_neighbor_with_element(&self, idx: NodeIndex, element: &str) -> MolResult<NodeIndex> {
        self.ensure_exists(idx)?;
        self.neighbors(idx)
            .find(|&nb| self.graph[nb].element == element)
            .ok_or_else(|| MolError::NoSuchNeighbor {
                symbol: self.graph[idx].element.clone(),
                element: element.to_string(),
                present: self
                    .neighbor_elements(idx)
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            })
    }

    pub fn hydrogen_neighbors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.neighbors(idx)
            .filter(|&nb| self.graph[nb].is_hydrogen())
            .collect()
    }

    /// The atom's token followed by the sorted tokens and bond orders of its
    /// neighbors. Writers use it to order branches deterministically.
    pub fn sort_key(&self, idx: NodeIndex) -> String {
        let mut parts: Vec<String> = self
            .bonds_of(idx)
            .into_iter()
            .map(|(nb, order)| format!("{}{}", self.graph[nb], order))
            .collect();
        parts.sort();
        format!("{}{:?}", self.graph[idx], parts)
    }

    /// Clears writer bookkeeping on every atom.
    pub fn reset_traversal(&mut self) {
        let all: Vec<NodeIndex> = self.graph.node_indices().collect();
        for idx in all {
            self.graph[idx].traversal.reset();
        }
    }

    /// Everything recorded since the last [`take_diagnostics`](Self::take_diagnostics).
    ///
    /// The log only grows. Permissive queries such as
    /// [`chiral_cw_list`](Self::chiral_cw_list) append to it on every
    /// fallback, so long-lived molecules should drain it.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(self.diagnostics.get_mut())
    }

    pub(crate) fn note(&self, diagnostic: Diagnostic) {
        diagnostic.emit();
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    pub(crate) fn recover(&self, policy: Recovery, atom: NodeIndex) {
        self.note(Diagnostic::Recovered { policy, atom });
    }

    pub(crate) fn ensure_exists(&self, idx: NodeIndex) -> MolResult<()> {
        if self.get_atom(idx).is_some() {
            Ok(())
        } else {
            Err(MolError::UnknownAtom(idx))
        }
    }

    pub(crate) fn ensure_member(&self, idx: NodeIndex) -> MolResult<()> {
        self.ensure_exists(idx)?;
        if self.is_strict() && !self.contains(idx) {
            return Err(MolError::AtomNotInMolecule(idx));
        }
        Ok(())
    }

    /// Makes every atom in `atoms` a member, or fails in strict mode before
    /// touching anything.
    fn admit(&mut self, atoms: &[NodeIndex]) -> MolResult<()> {
        if self.is_strict() {
            if let Some(&missing) = atoms.iter().find(|&&idx| !self.contains(idx)) {
                return Err(MolError::AtomNotInMolecule(missing));
            }
            return Ok(());
        }
        for &idx in atoms {
            if !self.contains(idx) {
                self.members.push(idx);
                self.recover(Recovery::AdmitNonMember, idx);
            }
        }
        Ok(())
    }

    fn set_bond(&mut self, a: NodeIndex, b: NodeIndex, bond_order: u8) {
        match self.graph.find_edge(a, b) {
            Some(edge) => self.graph[edge].order = bond_order,
            None => self.push_edge(a, b, bond_order),
        }
        if bond_order != 2 {
            for (center, other) in [(a, b), (b, a)] {
                if self.graph[center].cis_trans.is_some_and(|ct| ct.other == other) {
                    self.graph[center].cis_trans = None;
                    self.note(Diagnostic::StereoDropped { center, lost: other });
                }
            }
        }
    }

    fn push_edge(&mut self, a: NodeIndex, b: NodeIndex, order: u8) {
        let serial = self.next_serial;
        self.next_serial += 1;
        self.graph.add_edge(a, b, Bond { order, serial });
    }

    fn drop_stereo_referencing(&mut self, center: NodeIndex, lost: NodeIndex) {
        let atom = &mut self.graph[center];
        let mut dropped = false;
        if atom.chirality.is_some_and(|c| c.references(lost)) {
            atom.chirality = None;
            dropped = true;
        }
        if atom.cis_trans.is_some_and(|ct| ct.references(lost)) {
            atom.cis_trans = None;
            dropped = true;
        }
        if dropped {
            self.note(Diagnostic::StereoDropped { center, lost });
        }
    }
}

fn forget_in_traversal(traversal: &mut Traversal, lost: NodeIndex) {
    if traversal.parent == Some(lost) {
        traversal.parent = None;
    }
    traversal.ring_flags.retain(|&(_, partner)| partner != lost);
    traversal.non_h_neighbors.retain(|&nb| nb != lost);
}
