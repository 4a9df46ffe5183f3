use petgraph::graph::NodeIndex;

use crate::atom::{Atom, TetrahedralCenter};
use crate::diagnostics::Recovery;
use crate::element::{max_valence, HYDROGEN};
use crate::error::{MolError, MolResult};
use crate::mol::Molecule;

struct HydrogenPlan {
    atom: NodeIndex,
    count: usize,
    fill: Option<SlotFill>,
}

/// Where a chiral center's implicit hydrogen goes once it exists.
struct SlotFill {
    slot: usize,
    /// A bonded hydrogen not yet in any slot; `None` means the first new one.
    existing: Option<NodeIndex>,
    ambiguous: bool,
}

impl Molecule {
    /// Hydrogens [`add_hydrogens`](Self::add_hydrogens) would attach to `idx`,
    /// or `None` if no inference applies to it.
    ///
    /// With an explicit `hcount` this is `hcount` minus the hydrogens already
    /// bonded. Otherwise it is the element's maximum valence minus the current
    /// bond order sum. Over-valent atoms get zero, not a correction.
    pub fn implicit_hydrogens(&self, idx: NodeIndex) -> Option<usize> {
        let atom = self.get_atom(idx)?;
        match atom.hcount {
            Some(hcount) => Some((hcount as usize).saturating_sub(self.hydrogen_neighbors(idx).len())),
            None => {
                let max = max_valence(&atom.element)?;
                Some((max as u32).saturating_sub(self.total_bond_order(idx)) as usize)
            }
        }
    }

    /// Materializes every inferable implicit hydrogen as an explicit `"H"`
    /// atom bonded with order 1, returning how many were added.
    ///
    /// A chiral center waiting for its implicit hydrogen gets that hydrogen
    /// installed in its first open slot (A, then B, C, D). All atoms are
    /// checked before any hydrogen is attached, so an error leaves the
    /// molecule unchanged.
    pub fn add_hydrogens(&mut self) -> MolResult<usize> {
        let plans = self.plan_hydrogens()?;
        let mut added = 0;
        for plan in plans {
            let mut first_new = None;
            for _ in 0..plan.count {
                let h = self.attach(Atom::new(HYDROGEN), plan.atom, 1)?;
                if first_new.is_none() {
                    first_new = Some(h);
                }
            }
            if plan.count > 0 {
                log::debug!("added {} hydrogens to atom {}", plan.count, plan.atom.index());
            }
            added += plan.count;

            let Some(fill) = plan.fill else { continue };
            if fill.ambiguous {
                self.recover(Recovery::FirstHydrogen, plan.atom);
            }
            if let Some(hydrogen) = fill.existing.or(first_new) {
                if let Some(center) = self.atom_mut(plan.atom).chirality.as_mut() {
                    center.fill(fill.slot, hydrogen);
                }
            }
        }
        Ok(added)
    }

    /// Deep copy with hydrogens added; `self` is left untouched.
    ///
    /// Stereo references in the copy point at the copied atoms.
    pub fn with_hydrogens(&self) -> MolResult<Molecule> {
        let mut output = self.clone();
        output.add_hydrogens()?;
        Ok(output)
    }

    fn plan_hydrogens(&self) -> MolResult<Vec<HydrogenPlan>> {
        let mut plans = Vec::new();
        for &idx in self.atoms() {
            let Some(count) = self.implicit_hydrogens(idx) else {
                continue;
            };
            let fill = match self.atom(idx).chirality {
                Some(center) if center.awaits_hydrogen() => self.plan_slot(idx, &center, count)?,
                _ => None,
            };
            if count > 0 || fill.is_some() {
                plans.push(HydrogenPlan {
                    atom: idx,
                    count,
                    fill,
                });
            }
        }
        Ok(plans)
    }

    fn plan_slot(
        &self,
        idx: NodeIndex,
        center: &TetrahedralCenter,
        count: usize,
    ) -> MolResult<Option<SlotFill>> {
        let existing: Vec<NodeIndex> = self
            .hydrogen_neighbors(idx)
            .into_iter()
            .filter(|&h| !center.references(h))
            .collect();
        let found = existing.len() + count;
        if found == 0 || (found > 1 && self.is_strict()) {
            return Err(MolError::ChiralHydrogenCount { center: idx, found });
        }
        let Some(slot) = center.open_slot() else {
            if self.is_strict() {
                return Err(MolError::ChiralSlotsFull(idx));
            }
            return Ok(None);
        };
        Ok(Some(SlotFill {
            slot,
            existing: existing.first().copied(),
            ambiguous: found > 1,
        }))
    }
}
