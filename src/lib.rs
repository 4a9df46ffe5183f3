//! Molecular graphs for structure editors and reaction engines.
//!
//! A [`Molecule`] owns its atoms in a stable petgraph arena. It supports
//! incremental construction, welding, bond edits, valence-based hydrogen
//! inference, and two stereochemistry layers: tetrahedral chirality and
//! double-bond cis/trans configuration.
//!
//! # Example
//!
//! ```
//! use stereomol::{Atom, MolConfig, Molecule};
//!
//! // (R/S)-bromochlorofluoromethane, [C@@H](F)(Cl)Br
//! let mut mol = Molecule::with_config(Atom::new("C").with_hcount(1), MolConfig::strict());
//! let c = mol.atoms()[0];
//! let f = mol.attach(Atom::new("F"), c, 1).unwrap();
//! let cl = mol.attach(Atom::new("Cl"), c, 1).unwrap();
//! let br = mol.attach(Atom::new("Br"), c, 1).unwrap();
//! mol.new_chiral_center(c, None, [Some(f), Some(cl), Some(br)]).unwrap();
//!
//! let full = mol.with_hydrogens().unwrap();
//! assert_eq!(full.atom_count(), 5);
//! assert_eq!(full.chiral_cw_list(c, None).unwrap(), vec![f, cl, br]);
//! assert_eq!(full.atom(c).to_string(), "[C@@H]");
//! assert_eq!(mol.atom_count(), 4);
//! ```

pub mod atom;
pub mod canonical;
pub mod config;
pub mod diagnostics;
pub mod element;
pub mod error;
pub mod mol;

mod chirality;
mod cistrans;
mod hydrogen;

pub use atom::{Atom, CisTrans, TetrahedralCenter, Traversal};
pub use canonical::{to_canonical, Canonicalizer, IdentityCanonicalizer};
pub use config::{MolConfig, Strictness};
pub use diagnostics::{Diagnostic, Recovery};
pub use error::{MolError, MolResult};
pub use mol::{AtomMap, Molecule, MAX_BOND_ORDER};

pub use petgraph::graph::NodeIndex;
