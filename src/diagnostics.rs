//! Advisory events and permissive-mode recoveries.
//!
//! Every event is logged through the `log` facade and also recorded on the
//! molecule, so callers can check which policy fired without a logger.

use petgraph::graph::NodeIndex;

/// Named repair a permissive molecule applies instead of returning an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recovery {
    /// A non-member atom passed to a bonding operation was appended to the
    /// member list.
    AdmitNonMember,
    /// `add_atom` was given an atom that is already a member; it bonded the
    /// two atoms with `add_bond` instead.
    DegradeToBond,
    /// A stereo query could not be answered from the reference slots and fell
    /// back to the raw neighbor list.
    NeighborScan,
    /// A bond order outside 1..=4 was stored as given.
    AcceptBondOrder,
    /// `new_ct_center` was called without a double bond and did nothing.
    SkipCisTrans,
    /// A second `new_ct_center` on one atom replaced the first.
    OverwriteCisTrans,
    /// Several hydrogens were candidates for a chiral implicit-hydrogen slot;
    /// the first one was used.
    FirstHydrogen,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    Recovered { policy: Recovery, atom: NodeIndex },
    AtomAlreadyMember(NodeIndex),
    NoChiralityToEliminate(NodeIndex),
    NoCisTransToEliminate(NodeIndex),
    /// A stereo record referenced an atom or bond that went away.
    StereoDropped { center: NodeIndex, lost: NodeIndex },
}

impl Diagnostic {
    pub fn recovery(&self) -> Option<Recovery> {
        match self {
            Diagnostic::Recovered { policy, .. } => Some(*policy),
            _ => None,
        }
    }

    pub(crate) fn emit(&self) {
        match self {
            Diagnostic::Recovered { policy, atom } => {
                log::warn!("recovered via {:?} at atom {}", policy, atom.index())
            }
            Diagnostic::AtomAlreadyMember(atom) => {
                log::warn!("new atom {} already in molecule, using add_bond", atom.index())
            }
            Diagnostic::NoChiralityToEliminate(atom) => {
                log::warn!("eliminating nonexistent chirality on atom {}", atom.index())
            }
            Diagnostic::NoCisTransToEliminate(atom) => {
                log::warn!("eliminating nonexistent cis/trans on atom {}", atom.index())
            }
            Diagnostic::StereoDropped { center, lost } => log::warn!(
                "dropped stereo on atom {} after losing atom {}",
                center.index(),
                lost.index()
            ),
        }
    }
}
