//! Variable renumbering.
//!
//! Live variables are compacted toward the low indices; assigned and
//! eliminated ones move to the top. The externally visible ("outer")
//! numbering never changes; the two maps translate between the numberings
//! and every variable-indexed structure is permuted in lock step.

use crate::callbacks::Callbacks;
use crate::clause::{Lit, Var};
use crate::propagate::Reason;
use crate::solver::Solver;

/// `arr_new[i] = arr_old[new_to_old[i]]`
pub(crate) fn update_array<T: Clone>(arr: &mut Vec<T>, new_to_old: &[u32]) {
    debug_assert_eq!(arr.len(), new_to_old.len());
    let old = arr.clone();
    for (i, &o) in new_to_old.iter().enumerate() {
        arr[i] = old[o as usize].clone();
    }
}

impl<Cb: Callbacks> Solver<Cb> {
    pub(crate) fn renumber_variables(&mut self) {
        debug_assert_eq!(self.search.prop.decision_level(), 0);
        if !self.search.prop.ok {
            return;
        }
        let n = self.search.prop.num_vars() as usize;
        if n == 0 {
            return;
        }

        // live variables first, assigned/eliminated ones after
        let mut old_to_new = vec![0u32; n];
        let mut new_to_old = vec![0u32; n];
        let mut at = 0usize;
        for i in 0..n {
            if self.search.prop.var_usable(Var::from_idx(i as u32)) {
                old_to_new[i] = at as u32;
                new_to_old[at] = i as u32;
                at += 1;
            }
        }
        for i in 0..n {
            if !self.search.prop.var_usable(Var::from_idx(i as u32)) {
                old_to_new[i] = at as u32;
                new_to_old[at] = i as u32;
                at += 1;
            }
        }
        debug_assert_eq!(at, n);

        if old_to_new.iter().enumerate().all(|(i, &x)| i as u32 == x) {
            return; // already compact
        }
        debug!("renumbering {} variables", n);

        let map_lit = |l: Lit| -> Lit {
            if l == Lit::UNDEF || l == Lit::ERROR {
                l
            } else {
                Lit::new(Var::from_idx(old_to_new[l.var().idx() as usize]), l.sign())
            }
        };
        // per-literal permutation: `new_to_old` blown up to literal indices
        let mut new_to_old2 = vec![0u32; 2 * n];
        for i in 0..n {
            new_to_old2[i * 2] = new_to_old[i] * 2;
            new_to_old2[i * 2 + 1] = new_to_old[i] * 2 + 1;
        }

        // outer<->inner maps
        update_array(&mut self.inter_to_outer, &new_to_old);
        for o in self.outer_to_inter.iter_mut() {
            *o = Var::from_idx(old_to_new[o.idx() as usize]);
        }

        // assignment state
        self.search.prop.vars.assigns.permute(&new_to_old);
        self.search.prop.vars.vardata.permute(&new_to_old);
        for (_, vd) in self.search.prop.vars.vardata.iter_mut() {
            vd.reason = match vd.reason {
                Reason::Decision => Reason::Decision,
                Reason::Bin(a) => Reason::Bin(map_lit(a)),
                Reason::Tri(a, b) => Reason::Tri(map_lit(a), map_lit(b)),
                Reason::Long(cr) => Reason::Long(cr),
            };
        }
        self.search.prop.elimed.permute(&new_to_old);
        for l in self.search.prop.vars.trail.iter_mut() {
            *l = Lit::new(
                Var::from_idx(old_to_new[l.var().idx() as usize]),
                l.sign(),
            );
        }

        // heuristics
        self.search.activity.permute(&new_to_old);
        self.search.polarity.permute(&new_to_old);
        self.search.decision.permute(&new_to_old);
        self.frozen.permute(&new_to_old);

        // the watch index
        self.search.prop.watches.clean_all(&self.search.prop.ca);
        self.search
            .prop
            .watches
            .permute_and_remap(&new_to_old2, map_lit);

        // reachability cache
        update_array_reach(&mut self.search.lit_reachable, &new_to_old2, &map_lit);

        // clause literals and their signatures
        for list in [
            self.search.prop.long_irred.clone(),
            self.search.prop.long_red.clone(),
        ]
        .iter()
        {
            for &cr in list.iter() {
                let mut c = self.search.prop.ca.get_mut(cr);
                if c.mark() == 1 {
                    continue;
                }
                for l in c.lits_mut().iter_mut() {
                    *l = Lit::new(
                        Var::from_idx(old_to_new[l.var().idx() as usize]),
                        l.sign(),
                    );
                }
                c.recalc_abstraction();
            }
        }

        // equivalence table: rows move and entries are rewritten
        {
            let table = &mut self.replacer.table;
            let old = table.clone();
            for i in 0..n {
                table[i] = map_lit(old[new_to_old[i] as usize]);
            }
        }

        // blocked clauses
        for bc in self.elim.blocked.iter_mut() {
            bc.on = map_lit(bc.on);
            for l in bc.lits.iter_mut() {
                *l = map_lit(*l);
            }
        }

        // current assumptions
        for a in self.assumptions.iter_mut() {
            *a = map_lit(*a);
        }

        // scratch is per-call; just make sure nothing stale survives
        for (_, s) in self.search.seen.iter_mut() {
            *s = false;
        }

        self.search.rebuild_order_heap();

        self.search.prop.test_all_clause_attach();
        #[cfg(debug_assertions)]
        self.search.prop.check_stats(false);
    }
}

fn update_array_reach(
    arr: &mut Vec<crate::search::LitReachData>,
    new_to_old2: &[u32],
    map_lit: &dyn Fn(Lit) -> Lit,
) {
    debug_assert_eq!(arr.len(), new_to_old2.len());
    let old = arr.clone();
    for (i, &o) in new_to_old2.iter().enumerate() {
        let mut e = old[o as usize];
        e.lit = map_lit(e.lit);
        arr[i] = e;
    }
}
