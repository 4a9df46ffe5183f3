use petgraph::graph::NodeIndex;

use crate::atom::TetrahedralCenter;
use crate::diagnostics::{Diagnostic, Recovery};
use crate::error::{MolError, MolResult};
use crate::mol::Molecule;

/// Slot indices (A=0 .. D=3) of the other three substituents, clockwise when
/// viewed from the slot used as reference.
const CW_FROM: [[usize; 3]; 4] = [[1, 2, 3], [0, 3, 2], [0, 1, 3], [0, 2, 1]];

/// `RING[inport][outport]` is (up, down) for a ring that veers left.
const RING: [[Option<(usize, usize)>; 4]; 4] = [
    [None, Some((2, 3)), Some((3, 1)), Some((1, 2))],
    [Some((3, 2)), None, Some((0, 3)), Some((2, 0))],
    [Some((1, 3)), Some((3, 0)), None, Some((0, 1))],
    [Some((2, 1)), Some((0, 2)), Some((1, 0)), None],
];

impl Molecule {
    /// Makes `center` a tetrahedral stereocenter: `reference` is slot A and
    /// `clockwise` holds B, C, D in clockwise order viewed from A.
    ///
    /// At most one slot may be `None`; it is reserved for the implicit
    /// hydrogen that [`add_hydrogens`](Self::add_hydrogens) will install.
    /// In strict mode every given reference must be a distinct neighbor.
    /// Existing chirality on `center` is replaced.
    pub fn new_chiral_center(
        &mut self,
        center: NodeIndex,
        reference: Option<NodeIndex>,
        clockwise: [Option<NodeIndex>; 3],
    ) -> MolResult<()> {
        self.ensure_member(center)?;
        let stereo = TetrahedralCenter::new(reference, clockwise);
        if self.is_strict() {
            self.validate_chiral_slots(center, &stereo)?;
        }
        self.atom_mut(center).chirality = Some(stereo);
        Ok(())
    }

    fn validate_chiral_slots(&self, center: NodeIndex, stereo: &TetrahedralCenter) -> MolResult<()> {
        let slots = stereo.slots();
        if slots.iter().filter(|s| s.is_none()).count() > 1 {
            return Err(MolError::IncompleteChiralCenter(center));
        }
        for (i, slot) in slots.iter().enumerate() {
            let Some(reference) = *slot else { continue };
            let duplicate = slots[..i].contains(&Some(reference));
            if duplicate || self.bond_order(center, reference).is_none() {
                return Err(MolError::ReferenceNotFound { center, reference });
            }
        }
        Ok(())
    }

    /// The three other substituents of `center`, clockwise when looking down
    /// `reference` (left-hand rule).
    ///
    /// Without a reference the view is from the single attached hydrogen;
    /// having no hydrogen neighbor is always an error.
    ///
    /// ```
    /// use stereomol::{Atom, MolConfig, Molecule};
    ///
    /// let mut mol = Molecule::with_config(Atom::new("C"), MolConfig::strict());
    /// let c = mol.atoms()[0];
    /// let [a, b, cc, d] = ["F", "Cl", "Br", "I"].map(|e| mol.attach(Atom::new(e), c, 1).unwrap());
    /// mol.new_chiral_center(c, Some(a), [Some(b), Some(cc), Some(d)]).unwrap();
    ///
    /// assert_eq!(mol.chiral_cw_list(c, Some(a)).unwrap(), vec![b, cc, d]);
    /// assert_eq!(mol.chiral_cw_list(c, Some(b)).unwrap(), vec![a, d, cc]);
    /// ```
    pub fn chiral_cw_list(&self, center: NodeIndex, reference: Option<NodeIndex>) -> MolResult<Vec<NodeIndex>> {
        self.ensure_exists(center)?;
        let reference = match reference {
            Some(reference) => reference,
            None => self.viewing_hydrogen(center)?,
        };

        let Some(stereo) = self.atom(center).chirality else {
            return self.stereo_fallback(MolError::NotChiral(center), center, &[reference]);
        };
        let Some(slots) = stereo.complete() else {
            return self.stereo_fallback(MolError::IncompleteChiralCenter(center), center, &[reference]);
        };
        match stereo.position(reference) {
            Some(from) => Ok(CW_FROM[from].iter().map(|&i| slots[i]).collect()),
            None => self.stereo_fallback(
                MolError::ReferenceNotFound { center, reference },
                center,
                &[reference],
            ),
        }
    }

    /// Which substituent points up and which down when a ring path enters
    /// `center` from `inport` and leaves toward `outport`, assuming the ring
    /// veers left.
    #[deprecated(note = "use `chiral_cw_list`")]
    pub fn chiral_ring_list(
        &self,
        center: NodeIndex,
        inport: NodeIndex,
        outport: NodeIndex,
    ) -> MolResult<(NodeIndex, NodeIndex)> {
        self.ensure_exists(center)?;
        let mismatch = MolError::RingStereoMismatch {
            center,
            inport,
            outport,
        };

        let lookup = self.atom(center).chirality.and_then(|stereo| {
            let slots = stereo.complete()?;
            let (up, down) = RING[stereo.position(inport)?][stereo.position(outport)?]?;
            Some((slots[up], slots[down]))
        });
        if let Some(pair) = lookup {
            return Ok(pair);
        }

        let error = match self.atom(center).chirality {
            None => MolError::NotChiral(center),
            Some(stereo) if stereo.complete().is_none() => MolError::IncompleteChiralCenter(center),
            Some(_) => mismatch.clone(),
        };
        match self.stereo_fallback(error, center, &[inport, outport])?.as_slice() {
            &[up, down] => Ok((up, down)),
            _ => Err(mismatch),
        }
    }

    /// Clears the chirality of `center`; the neighbors stay bonded.
    pub fn eliminate_chiral(&mut self, center: NodeIndex) -> MolResult<()> {
        self.ensure_exists(center)?;
        if self.atom_mut(center).chirality.take().is_none() {
            self.note(Diagnostic::NoChiralityToEliminate(center));
        }
        Ok(())
    }

    fn viewing_hydrogen(&self, center: NodeIndex) -> MolResult<NodeIndex> {
        let hydrogens = self.hydrogen_neighbors(center);
        match hydrogens.as_slice() {
            [h] => Ok(*h),
            [h, ..] if !self.is_strict() => {
                self.recover(Recovery::FirstHydrogen, center);
                Ok(*h)
            }
            _ => Err(MolError::ChiralHydrogenCount {
                center,
                found: hydrogens.len(),
            }),
        }
    }

    /// Strict: `error`. Permissive: the neighbors of `center` minus `exclude`.
    fn stereo_fallback(
        &self,
        error: MolError,
        center: NodeIndex,
        exclude: &[NodeIndex],
    ) -> MolResult<Vec<NodeIndex>> {
        if self.is_strict() {
            return Err(error);
        }
        self.recover(Recovery::NeighborScan, center);
        Ok(self.neighbors(center).filter(|nb| !exclude.contains(nb)).collect())
    }
}

#[cfg(test)]
#[allow(deprecated)]
mod tests {
    use super::*;
    use crate::atom::Atom;
    use crate::config::MolConfig;

    struct Fixture {
        mol: Molecule,
        center: NodeIndex,
        a: NodeIndex,
        b: NodeIndex,
        c: NodeIndex,
        d: NodeIndex,
    }

    fn fixture(config: MolConfig) -> Fixture {
        let mut mol = Molecule::with_config(Atom::new("C"), config);
        let center = mol.atoms()[0];
        let [a, b, c, d] = ["F", "Cl", "Br", "I"].map(|e| mol.attach(Atom::new(e), center, 1).unwrap());
        mol.new_chiral_center(center, Some(a), [Some(b), Some(c), Some(d)])
            .unwrap();
        Fixture {
            mol,
            center,
            a,
            b,
            c,
            d,
        }
    }

    #[test]
    fn cw_list_rotations() {
        let Fixture {
            mol,
            center,
            a,
            b,
            c,
            d,
        } = fixture(MolConfig::strict());
        assert_eq!(mol.chiral_cw_list(center, Some(a)).unwrap(), vec![b, c, d]);
        assert_eq!(mol.chiral_cw_list(center, Some(b)).unwrap(), vec![a, d, c]);
        assert_eq!(mol.chiral_cw_list(center, Some(c)).unwrap(), vec![a, b, d]);
        assert_eq!(mol.chiral_cw_list(center, Some(d)).unwrap(), vec![a, c, b]);
    }

    #[test]
    fn cw_list_views_are_consistent() {
        // Each view is an even permutation of the canonical slot order.
        let f = fixture(MolConfig::strict());
        let canonical = [f.a, f.b, f.c, f.d];
        for reference in canonical {
            let mut order = vec![reference];
            order.extend(f.mol.chiral_cw_list(f.center, Some(reference)).unwrap());
            let perm: Vec<usize> = order
                .iter()
                .map(|x| canonical.iter().position(|y| y == x).unwrap())
                .collect();
            let mut inversions = 0;
            for i in 0..4 {
                for j in i + 1..4 {
                    if perm[i] > perm[j] {
                        inversions += 1;
                    }
                }
            }
            assert_eq!(inversions % 2, 0, "view from {reference:?}");
        }
    }

    #[test]
    fn cw_list_defaults_to_hydrogen() {
        let mut mol = Molecule::with_config(Atom::new("C"), MolConfig::strict());
        let center = mol.atoms()[0];
        let [h, f, cl, br] = ["H", "F", "Cl", "Br"].map(|e| mol.attach(Atom::new(e), center, 1).unwrap());
        mol.new_chiral_center(center, Some(f), [Some(h), Some(cl), Some(br)])
            .unwrap();
        assert_eq!(mol.chiral_cw_list(center, None).unwrap(), vec![f, br, cl]);
    }

    #[test]
    fn cw_list_without_hydrogen_fails() {
        for config in [MolConfig::strict(), MolConfig::permissive()] {
            let f = fixture(config);
            assert_eq!(
                f.mol.chiral_cw_list(f.center, None),
                Err(MolError::ChiralHydrogenCount {
                    center: f.center,
                    found: 0
                })
            );
        }
    }

    #[test]
    fn cw_list_unknown_reference() {
        let mut f = fixture(MolConfig::strict());
        let stranger = f.mol.attach(Atom::new("O"), f.a, 1).unwrap();
        assert_eq!(
            f.mol.chiral_cw_list(f.center, Some(stranger)),
            Err(MolError::ReferenceNotFound {
                center: f.center,
                reference: stranger
            })
        );

        f.mol.set_strictness(crate::Strictness::Permissive);
        assert_eq!(
            f.mol.chiral_cw_list(f.center, Some(f.a)).unwrap(),
            vec![f.b, f.c, f.d]
        );
        assert_eq!(
            f.mol.chiral_cw_list(f.center, Some(stranger)).unwrap(),
            vec![f.a, f.b, f.c, f.d]
        );
        assert_eq!(f.mol.diagnostics()[0].recovery(), Some(Recovery::NeighborScan));
    }

    #[test]
    fn cw_list_not_chiral() {
        let mut mol = Molecule::with_config(Atom::new("C"), MolConfig::strict());
        let center = mol.atoms()[0];
        let a = mol.attach(Atom::new("F"), center, 1).unwrap();
        let b = mol.attach(Atom::new("Cl"), center, 1).unwrap();
        assert_eq!(mol.chiral_cw_list(center, Some(a)), Err(MolError::NotChiral(center)));
        mol.set_strictness(crate::Strictness::Permissive);
        assert_eq!(mol.chiral_cw_list(center, Some(a)).unwrap(), vec![b]);
    }

    #[test]
    fn incomplete_center_strict() {
        let mut mol = Molecule::with_config(Atom::new("C").with_hcount(1), MolConfig::strict());
        let center = mol.atoms()[0];
        let [f, cl, br] = ["F", "Cl", "Br"].map(|e| mol.attach(Atom::new(e), center, 1).unwrap());
        mol.new_chiral_center(center, None, [Some(f), Some(cl), Some(br)])
            .unwrap();
        assert_eq!(
            mol.chiral_cw_list(center, Some(f)),
            Err(MolError::IncompleteChiralCenter(center))
        );
    }

    #[test]
    fn new_center_validation() {
        let mut f = fixture(MolConfig::strict());
        let far = f.mol.attach(Atom::new("O"), f.a, 1).unwrap();
        assert_eq!(
            f.mol.new_chiral_center(f.center, Some(far), [Some(f.b), Some(f.c), Some(f.d)]),
            Err(MolError::ReferenceNotFound {
                center: f.center,
                reference: far
            })
        );
        assert_eq!(
            f.mol.new_chiral_center(f.center, Some(f.a), [Some(f.b), Some(f.b), Some(f.d)]),
            Err(MolError::ReferenceNotFound {
                center: f.center,
                reference: f.b
            })
        );
        assert_eq!(
            f.mol.new_chiral_center(f.center, None, [None, Some(f.c), Some(f.d)]),
            Err(MolError::IncompleteChiralCenter(f.center))
        );
        // The rejected calls left the original center in place.
        assert_eq!(f.mol.atom(f.center).chirality().unwrap().a(), Some(f.a));
    }

    #[test]
    fn ring_list_table() {
        let Fixture {
            mol,
            center,
            a,
            b,
            c,
            d,
        } = fixture(MolConfig::strict());
        let expected = [
            (a, b, (c, d)),
            (a, c, (d, b)),
            (a, d, (b, c)),
            (b, a, (d, c)),
            (b, c, (a, d)),
            (b, d, (c, a)),
            (c, a, (b, d)),
            (c, b, (d, a)),
            (c, d, (a, b)),
            (d, a, (c, b)),
            (d, b, (a, c)),
            (d, c, (b, a)),
        ];
        for (inport, outport, pair) in expected {
            assert_eq!(mol.chiral_ring_list(center, inport, outport), Ok(pair));
        }
    }

    #[test]
    fn ring_list_mismatch() {
        let f = fixture(MolConfig::strict());
        assert_eq!(
            f.mol.chiral_ring_list(f.center, f.a, f.a),
            Err(MolError::RingStereoMismatch {
                center: f.center,
                inport: f.a,
                outport: f.a
            })
        );

        let mut f = fixture(MolConfig::permissive());
        let stranger = f.mol.attach(Atom::new("O"), f.a, 1).unwrap();
        assert_eq!(
            f.mol.chiral_ring_list(f.center, stranger, f.b),
            Err(MolError::RingStereoMismatch {
                center: f.center,
                inport: stranger,
                outport: f.b
            })
        );
        f.mol.eliminate_chiral(f.center).unwrap();
        assert_eq!(f.mol.chiral_ring_list(f.center, f.a, f.b), Ok((f.c, f.d)));
    }

    #[test]
    fn eliminate_chiral_clears() {
        let mut f = fixture(MolConfig::strict());
        f.mol.eliminate_chiral(f.center).unwrap();
        assert!(!f.mol.atom(f.center).is_chiral());
        assert_eq!(f.mol.degree(f.center), 4);
        assert!(f.mol.diagnostics().is_empty());

        f.mol.eliminate_chiral(f.center).unwrap();
        assert_eq!(
            f.mol.diagnostics(),
            vec![Diagnostic::NoChiralityToEliminate(f.center)]
        );
    }

    #[test]
    fn removing_reference_drops_chirality() {
        let mut f = fixture(MolConfig::strict());
        f.mol.remove_atom(f.d).unwrap();
        assert!(!f.mol.atom(f.center).is_chiral());
        assert_eq!(
            f.mol.diagnostics(),
            vec![Diagnostic::StereoDropped {
                center: f.center,
                lost: f.d
            }]
        );

        let mut f = fixture(MolConfig::strict());
        f.mol.remove_bond(f.center, f.b).unwrap();
        assert!(!f.mol.atom(f.center).is_chiral());
    }
}
