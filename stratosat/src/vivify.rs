//! Clause vivification: re-examine long irredundant clauses under unit
//! propagation of their negated prefix; a conflict or an early satisfied
//! literal yields a shorter equivalent clause.

use crate::callbacks::Callbacks;
use crate::clause::{lbool, CRef, Lit};
use crate::propagate::Reason;
use crate::solver::Solver;

impl<Cb: Callbacks> Solver<Cb> {
    pub(crate) fn vivify(&mut self) -> bool {
        debug_assert_eq!(self.search.prop.decision_level(), 0);
        if !self.search.prop.ok {
            return false;
        }
        let old_props = self.search.prop.propagations;
        let budget = self.conf.vivify_prop_budget;
        let mut shortened = 0u64;
        let mut checked = 0u64;

        let todo: Vec<CRef> = self.search.prop.long_irred.clone();
        let mut lits: Vec<Lit> = vec![];
        let mut out: Vec<Lit> = vec![];

        for cr in todo {
            if self.search.prop.propagations - old_props > budget {
                break;
            }
            if self.interrupt_requested() {
                break;
            }
            {
                let c = self.search.prop.ca.get_ref(cr);
                if c.mark() == 1 {
                    continue;
                }
                if self.search.prop.satisfied(c) {
                    continue;
                }
                lits.clear();
                lits.extend_from_slice(c.lits());
            }
            checked += 1;

            // the clause must not take part in its own vivification
            let stats = *self.search.prop.ca.get_ref(cr).stats();
            self.search.prop.remove_long(cr);

            out.clear();
            self.search.prop.vars.new_decision_level();
            for &l in &lits {
                match self.search.prop.value_lit(l) {
                    v if v == lbool::TRUE => {
                        // prefix already implies l: the shortened clause ends here
                        out.push(l);
                        break;
                    }
                    v if v == lbool::FALSE => {
                        // prefix implies ¬l: l is redundant in this clause
                        continue;
                    }
                    _ => {
                        out.push(l);
                        self.search.prop.vars.unchecked_enqueue(!l, Reason::Decision);
                        if self.search.prop.propagate().is_some() {
                            // the prefix alone is contradictory: it forms a
                            // valid (shorter) clause
                            break;
                        }
                    }
                }
            }
            self.search.cancel_until(0);

            if out.len() < lits.len() {
                shortened += 1;
                if let Some(proof) = self.proof.as_mut() {
                    proof.create_clause(&out);
                    proof.delete_clause(&lits);
                }
            }
            self.add_clause_int(&mut out, false, stats);
            if !self.search.prop.ok {
                break;
            }
        }

        let ca = &self.search.prop.ca;
        self.search
            .prop
            .long_irred
            .retain(|&cr| ca.get_ref(cr).mark() != 1);

        if shortened > 0 {
            debug!("vivify: shortened {}/{} clauses", shortened, checked);
        }
        self.search.prop.ok
    }
}
