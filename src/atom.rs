use std::fmt;

use petgraph::graph::NodeIndex;

use crate::element::is_organic_subset;

/// Tetrahedral chirality stored on a center atom.
///
/// Slot `A` is the reference; `B`, `C`, `D` run clockwise when looking from
/// `A` toward the center. This is the left-hand convention, the mirror of the
/// usual right-hand rule; flipping it inverts every stereocenter.
///
/// A slot may be `None` while the center waits for its implicit hydrogen
/// (the `[C@H]` convention); [`Molecule::add_hydrogens`](crate::Molecule::add_hydrogens)
/// installs the hydrogen into the first open slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TetrahedralCenter {
    slots: [Option<NodeIndex>; 4],
    implicit_h: bool,
}

impl TetrahedralCenter {
    pub fn new(reference: Option<NodeIndex>, clockwise: [Option<NodeIndex>; 3]) -> Self {
        let slots = [reference, clockwise[0], clockwise[1], clockwise[2]];
        Self {
            slots,
            implicit_h: slots.iter().any(Option::is_none),
        }
    }

    pub fn a(&self) -> Option<NodeIndex> {
        self.slots[0]
    }

    pub fn b(&self) -> Option<NodeIndex> {
        self.slots[1]
    }

    pub fn c(&self) -> Option<NodeIndex> {
        self.slots[2]
    }

    pub fn d(&self) -> Option<NodeIndex> {
        self.slots[3]
    }

    pub fn slots(&self) -> [Option<NodeIndex>; 4] {
        self.slots
    }

    /// All four references, or `None` while a slot is still open.
    pub fn complete(&self) -> Option<[NodeIndex; 4]> {
        Some([self.slots[0]?, self.slots[1]?, self.slots[2]?, self.slots[3]?])
    }

    /// Whether an implicit hydrogen still has to be installed.
    pub fn awaits_hydrogen(&self) -> bool {
        self.implicit_h
    }

    pub fn position(&self, atom: NodeIndex) -> Option<usize> {
        self.slots.iter().position(|s| *s == Some(atom))
    }

    pub fn references(&self, atom: NodeIndex) -> bool {
        self.position(atom).is_some()
    }

    pub(crate) fn open_slot(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    pub(crate) fn fill(&mut self, slot: usize, atom: NodeIndex) {
        self.slots[slot] = Some(atom);
        self.implicit_h = false;
    }

    pub(crate) fn remap(&self, map: impl Fn(NodeIndex) -> Option<NodeIndex>) -> Option<Self> {
        let mut slots = [None; 4];
        for (new, old) in slots.iter_mut().zip(self.slots) {
            *new = match old {
                Some(idx) => Some(map(idx)?),
                None => None,
            };
        }
        Some(Self {
            slots,
            implicit_h: self.implicit_h,
        })
    }
}

/// Cis/trans configuration of one end of a double bond.
///
/// With both ends described against the same reference plane, `cw` lies
/// directly clockwise from `other` and `ccw` directly counterclockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CisTrans {
    pub other: NodeIndex,
    pub cw: NodeIndex,
    pub ccw: NodeIndex,
}

impl CisTrans {
    pub fn references(&self, atom: NodeIndex) -> bool {
        self.other == atom || self.cw == atom || self.ccw == atom
    }

    pub(crate) fn remap(&self, map: impl Fn(NodeIndex) -> Option<NodeIndex>) -> Option<Self> {
        Some(Self {
            other: map(self.other)?,
            cw: map(self.cw)?,
            ccw: map(self.ccw)?,
        })
    }
}

/// Scratch state for an external line-notation writer.
///
/// Not part of the atom's chemical identity; reset it between independent
/// traversals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Traversal {
    pub flag: u32,
    /// Ring-closure digits opened or closed at this atom, with the partner.
    pub ring_flags: Vec<(u32, NodeIndex)>,
    /// Neighbors already written.
    pub n_read: usize,
    pub parent: Option<NodeIndex>,
    pub non_h_neighbors: Vec<NodeIndex>,
}

impl Traversal {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A node of a [`Molecule`](crate::Molecule).
///
/// Bonds are not stored here: they are edges of the owning molecule's graph,
/// which keeps both directions of a bond in one place. Stereochemistry is set
/// through the molecule so that its references can be checked against the
/// graph.
///
/// # Examples
///
/// ```
/// use stereomol::Atom;
///
/// let oxide = Atom::charged("O", -1);
/// assert_eq!(oxide.to_string(), "[O-]");
/// assert_eq!(Atom::new("C").to_string(), "C");
/// assert_eq!(Atom::new("Fe").with_charge(3).to_string(), "[Fe+3]");
/// ```
#[derive(Debug, Clone)]
pub struct Atom {
    /// Periodic-table symbol. Case-sensitive: `"Cl"` is chlorine, `"CL"` is
    /// not an element this crate knows.
    pub element: String,
    pub charge: i8,
    /// Mass number; `None` means natural abundance.
    pub isotope: Option<u16>,
    /// Informational only.
    pub is_aromatic: bool,
    /// Explicit hydrogen count from input notation. Overrides valence-based
    /// inference when present.
    pub hcount: Option<u8>,
    /// Atom-class tag (`:n` in line notation).
    pub class: Option<u32>,
    pub traversal: Traversal,
    pub(crate) chirality: Option<TetrahedralCenter>,
    pub(crate) cis_trans: Option<CisTrans>,
}

impl Atom {
    pub fn new(element: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            charge: 0,
            isotope: None,
            is_aromatic: false,
            hcount: None,
            class: None,
            traversal: Traversal::default(),
            chirality: None,
            cis_trans: None,
        }
    }

    pub fn charged(element: impl Into<String>, charge: i8) -> Self {
        Self::new(element).with_charge(charge)
    }

    pub fn with_charge(mut self, charge: i8) -> Self {
        self.charge = charge;
        self
    }

    pub fn with_isotope(mut self, isotope: u16) -> Self {
        self.isotope = Some(isotope);
        self
    }

    pub fn with_hcount(mut self, hcount: u8) -> Self {
        self.hcount = Some(hcount);
        self
    }

    pub fn with_class(mut self, class: u32) -> Self {
        self.class = Some(class);
        self
    }

    pub fn aromatic(mut self) -> Self {
        self.is_aromatic = true;
        self
    }

    pub fn is_hydrogen(&self) -> bool {
        self.element == crate::element::HYDROGEN
    }

    pub fn is_chiral(&self) -> bool {
        self.chirality.is_some()
    }

    pub fn chirality(&self) -> Option<&TetrahedralCenter> {
        self.chirality.as_ref()
    }

    pub fn is_cistrans(&self) -> bool {
        self.cis_trans.is_some()
    }

    pub fn cis_trans(&self) -> Option<&CisTrans> {
        self.cis_trans.as_ref()
    }

    /// Charge as written in line notation: `+`, `-`, `+2`, `-3`, ...
    pub fn charge_string(&self) -> String {
        match self.charge {
            0 => {
                log::warn!("charge_string called on uncharged {} atom", self.element);
                String::new()
            }
            1 => "+".to_string(),
            -1 => "-".to_string(),
            c if c > 0 => format!("+{c}"),
            c => format!("-{}", c.unsigned_abs()),
        }
    }

    fn needs_brackets(&self) -> bool {
        !is_organic_subset(&self.element)
            || self.isotope.is_some()
            || self.is_chiral()
            || self.charge != 0
            || self.class.is_some()
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        self.element == other.element
            && self.charge == other.charge
            && self.isotope == other.isotope
            && self.is_aromatic == other.is_aromatic
            && self.hcount == other.hcount
            && self.class == other.class
            && self.chirality == other.chirality
            && self.cis_trans == other.cis_trans
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        if let Some(isotope) = self.isotope {
            out.push_str(&isotope.to_string());
        }
        out.push_str(&self.element);

        // Stored slots are always clockwise, so the marker is always `@@`.
        if self.is_chiral() {
            out.push_str("@@");
            if self.hcount == Some(1) {
                out.push('H');
            }
        }

        if self.charge != 0 {
            out.push_str(&self.charge_string());
        }

        if let Some(class) = self.class {
            out.push(':');
            out.push_str(&class.to_string());
        }

        if self.needs_brackets() {
            write!(f, "[{out}]")
        } else {
            f.write_str(&out)
        }
    }
}
