//! Error types for molecule mutation and stereochemistry queries.

use petgraph::graph::NodeIndex;
use thiserror::Error;

/// Errors raised by [`Molecule`](crate::Molecule) operations.
///
/// `UnknownAtom`, `SelfBond` and `NoSuchBond` are raised in every mode. The remaining
/// variants are raised only under [`Strictness::Strict`](crate::Strictness);
/// permissive molecules recover through a [`Recovery`](crate::Recovery) policy
/// instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MolError {
    /// Bond order outside 1..=4.
    #[error("invalid bond order: {0}")]
    InvalidBondOrder(u8),

    /// The atom exists but is not a member of the molecule.
    #[error("atom {} is not in the molecule", .0.index())]
    AtomNotInMolecule(NodeIndex),

    /// The index does not name any atom of this molecule.
    #[error("no atom with index {}", .0.index())]
    UnknownAtom(NodeIndex),

    /// A bond from an atom to itself.
    #[error("atom {} cannot bond to itself", .0.index())]
    SelfBond(NodeIndex),

    /// Deleting a bond that does not exist.
    #[error("no bond between atoms {} and {}", .0.index(), .1.index())]
    NoSuchBond(NodeIndex, NodeIndex),

    /// A stereo reference is not one of the center's neighbors or slots.
    #[error("atom {} is not a stereo reference of atom {}", .reference.index(), .center.index())]
    ReferenceNotFound {
        center: NodeIndex,
        reference: NodeIndex,
    },

    #[error("atom {} is not chiral", .0.index())]
    NotChiral(NodeIndex),

    /// A chiral center still has an open slot awaiting its implicit hydrogen.
    #[error("chiral center {} has an unfilled reference slot", .0.index())]
    IncompleteChiralCenter(NodeIndex),

    /// The implicit-hydrogen convention needs exactly one hydrogen neighbor.
    #[error("chiral center {} has {found} hydrogen neighbors, expected exactly 1", .center.index())]
    ChiralHydrogenCount { center: NodeIndex, found: usize },

    /// All four chiral slots are filled but an implicit hydrogen is pending.
    #[error("chiral center {} has no free slot for its implicit hydrogen", .0.index())]
    ChiralSlotsFull(NodeIndex),

    /// A second cis/trans center on one atom would make it an allene center.
    #[error("atom {} already carries cis/trans data (allene)", .0.index())]
    Allene(NodeIndex),

    #[error("no double bond between atoms {} and {}", .center.index(), .other.index())]
    NoDoubleBond { center: NodeIndex, other: NodeIndex },

    /// Inport/outport pair is not among the chiral center's references.
    #[error(
        "atoms {} and {} are not a reference pair of chiral center {}",
        .inport.index(),
        .outport.index(),
        .center.index()
    )]
    RingStereoMismatch {
        center: NodeIndex,
        inport: NodeIndex,
        outport: NodeIndex,
    },

    #[error("no such neighboring atom: {symbol} has no {element} (instead has {present:?})")]
    NoSuchNeighbor {
        symbol: String,
        element: String,
        present: Vec<String>,
    },
}

/// Result type for molecule operations.
pub type MolResult<T> = Result<T, MolError>;
