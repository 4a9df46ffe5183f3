use petgraph::graph::NodeIndex;

use crate::atom::CisTrans;
use crate::diagnostics::{Diagnostic, Recovery};
use crate::error::{MolError, MolResult};
use crate::mol::Molecule;

impl Molecule {
    /// Records the cis/trans configuration of `center` across its double
    /// bond to `other`: `cw` sits directly clockwise from `other` and `ccw`
    /// directly counterclockwise.
    ///
    /// Both ends of the double bond need their own call, made against the
    /// same reference plane. A second call on the same atom would describe an
    /// allene center and fails with [`MolError::Allene`] in strict mode.
    pub fn new_ct_center(
        &mut self,
        center: NodeIndex,
        other: NodeIndex,
        cw: NodeIndex,
        ccw: NodeIndex,
    ) -> MolResult<()> {
        for idx in [center, other, cw, ccw] {
            self.ensure_exists(idx)?;
        }
        self.ensure_member(center)?;

        let overwrite = self.atom(center).is_cistrans();
        if overwrite && self.is_strict() {
            return Err(MolError::Allene(center));
        }
        if self.bond_order(center, other) != Some(2) {
            if self.is_strict() {
                return Err(MolError::NoDoubleBond { center, other });
            }
            self.recover(Recovery::SkipCisTrans, center);
            return Ok(());
        }
        if self.is_strict() {
            for reference in [cw, ccw] {
                if reference == other || self.bond_order(center, reference).is_none() {
                    return Err(MolError::ReferenceNotFound { center, reference });
                }
            }
        }

        if overwrite {
            self.recover(Recovery::OverwriteCisTrans, center);
        }
        self.atom_mut(center).cis_trans = Some(CisTrans { other, cw, ccw });
        Ok(())
    }

    /// Clears the cis/trans data of `center`; the neighbors stay bonded.
    pub fn eliminate_ct(&mut self, center: NodeIndex) -> MolResult<()> {
        self.ensure_exists(center)?;
        if self.atom_mut(center).cis_trans.take().is_none() {
            self.note(Diagnostic::NoCisTransToEliminate(center));
        }
        Ok(())
    }

    /// The carbon that `idx` is double-bonded to, if any.
    pub fn find_alkene_bond(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.bonds_of(idx)
            .into_iter()
            .find(|&(nb, order)| order == 2 && self.atom(nb).element == "C")
            .map(|(nb, _)| nb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Atom;
    use crate::config::MolConfig;

    /// F/C(Cl)=C(Br)/I with the left carbon first.
    struct Alkene {
        mol: Molecule,
        left: NodeIndex,
        right: NodeIndex,
        f: NodeIndex,
        cl: NodeIndex,
        br: NodeIndex,
        i: NodeIndex,
    }

    fn alkene(config: MolConfig) -> Alkene {
        let mut mol = Molecule::with_config(Atom::new("C"), config);
        let left = mol.atoms()[0];
        let right = mol.attach(Atom::new("C"), left, 2).unwrap();
        let f = mol.attach(Atom::new("F"), left, 1).unwrap();
        let cl = mol.attach(Atom::new("Cl"), left, 1).unwrap();
        let br = mol.attach(Atom::new("Br"), right, 1).unwrap();
        let i = mol.attach(Atom::new("I"), right, 1).unwrap();
        Alkene {
            mol,
            left,
            right,
            f,
            cl,
            br,
            i,
        }
    }

    #[test]
    fn pair_of_centers() {
        let mut a = alkene(MolConfig::strict());
        a.mol.new_ct_center(a.left, a.right, a.f, a.cl).unwrap();
        a.mol.new_ct_center(a.right, a.left, a.i, a.br).unwrap();

        let left = a.mol.atom(a.left).cis_trans().unwrap();
        assert_eq!((left.other, left.cw, left.ccw), (a.right, a.f, a.cl));
        let right = a.mol.atom(a.right).cis_trans().unwrap();
        assert_eq!(right.other, a.left);
        assert!(a.mol.atom(a.left).is_cistrans());
    }

    #[test]
    fn second_center_is_allene_in_strict_mode() {
        let mut a = alkene(MolConfig::strict());
        a.mol.new_ct_center(a.left, a.right, a.f, a.cl).unwrap();
        assert_eq!(
            a.mol.new_ct_center(a.left, a.right, a.cl, a.f),
            Err(MolError::Allene(a.left))
        );
        assert_eq!(a.mol.atom(a.left).cis_trans().unwrap().cw, a.f);
    }

    #[test]
    fn second_center_overwrites_in_permissive_mode() {
        let mut a = alkene(MolConfig::permissive());
        a.mol.new_ct_center(a.left, a.right, a.f, a.cl).unwrap();
        a.mol.new_ct_center(a.left, a.right, a.cl, a.f).unwrap();
        assert_eq!(a.mol.atom(a.left).cis_trans().unwrap().cw, a.cl);
        assert_eq!(
            a.mol.diagnostics()[0].recovery(),
            Some(Recovery::OverwriteCisTrans)
        );
    }

    #[test]
    fn requires_double_bond() {
        let mut a = alkene(MolConfig::strict());
        assert_eq!(
            a.mol.new_ct_center(a.left, a.f, a.cl, a.right),
            Err(MolError::NoDoubleBond {
                center: a.left,
                other: a.f
            })
        );

        a.mol.set_strictness(crate::Strictness::Permissive);
        a.mol.new_ct_center(a.left, a.f, a.cl, a.right).unwrap();
        assert!(!a.mol.atom(a.left).is_cistrans());
        assert_eq!(a.mol.diagnostics()[0].recovery(), Some(Recovery::SkipCisTrans));
    }

    #[test]
    fn references_must_be_substituents() {
        let mut a = alkene(MolConfig::strict());
        assert_eq!(
            a.mol.new_ct_center(a.left, a.right, a.f, a.br),
            Err(MolError::ReferenceNotFound {
                center: a.left,
                reference: a.br
            })
        );
    }

    #[test]
    fn eliminate_ct_clears() {
        let mut a = alkene(MolConfig::strict());
        a.mol.new_ct_center(a.left, a.right, a.f, a.cl).unwrap();
        a.mol.eliminate_ct(a.left).unwrap();
        assert!(a.mol.atom(a.left).cis_trans().is_none());
        a.mol.new_ct_center(a.left, a.right, a.cl, a.f).unwrap();

        a.mol.eliminate_ct(a.right).unwrap();
        assert_eq!(
            a.mol.diagnostics(),
            vec![Diagnostic::NoCisTransToEliminate(a.right)]
        );
    }

    #[test]
    fn saturating_the_bond_drops_cis_trans() {
        let mut a = alkene(MolConfig::strict());
        a.mol.new_ct_center(a.left, a.right, a.f, a.cl).unwrap();
        a.mol.new_ct_center(a.right, a.left, a.i, a.br).unwrap();
        a.mol.change_bond(a.left, a.right, 1).unwrap();
        assert!(!a.mol.atom(a.left).is_cistrans());
        assert!(!a.mol.atom(a.right).is_cistrans());
    }

    #[test]
    fn alkene_partner() {
        let a = alkene(MolConfig::strict());
        assert_eq!(a.mol.find_alkene_bond(a.left), Some(a.right));
        assert_eq!(a.mol.find_alkene_bond(a.right), Some(a.left));
        assert_eq!(a.mol.find_alkene_bond(a.f), None);
    }

    #[test]
    fn alkene_partner_must_be_carbon() {
        let mut mol = Molecule::new(Atom::new("C"));
        let c = mol.atoms()[0];
        mol.attach(Atom::new("O"), c, 2).unwrap();
        assert_eq!(mol.find_alkene_bond(c), None);
    }

    #[test]
    fn removing_a_reference_drops_cis_trans() {
        let mut a = alkene(MolConfig::strict());
        a.mol.new_ct_center(a.left, a.right, a.f, a.cl).unwrap();
        a.mol.new_ct_center(a.right, a.left, a.i, a.br).unwrap();

        a.mol.remove_atom(a.f).unwrap();
        assert!(!a.mol.atom(a.left).is_cistrans());
        assert!(a.mol.atom(a.right).is_cistrans());
        assert_eq!(
            a.mol.diagnostics(),
            vec![Diagnostic::StereoDropped {
                center: a.left,
                lost: a.f
            }]
        );
    }
}
