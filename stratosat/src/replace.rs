//! Equivalent-literal replacement.
//!
//! The table is a forest over variables: `table[v] = l` means the positive
//! literal of `v` is equivalent to `l`. `perform_replace` flattens the
//! forest to height one and substitutes every non-root endpoint out of all
//! attached clauses.

use crate::callbacks::Callbacks;
use crate::clause::{lbool, ClauseStats, Elimed, Lit, Var};
use crate::propagate::Reason;
use crate::solver::{Added, Solver};
use crate::watches::Watcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MergeOutcome {
    AlreadyEq,
    /// The two literals are forced to opposite values; the formula is unsat.
    Contradiction,
    New,
}

#[derive(Debug)]
pub(crate) struct VarReplacer {
    /// `table[v]` is the literal the positive literal of `v` stands for.
    pub table: Vec<Lit>,
    /// Equivalences discovered since the last `perform_replace`.
    pub new_to_replace: u64,
    /// Total variables substituted out so far.
    pub replaced_vars: u64,
}

impl VarReplacer {
    pub fn new() -> Self {
        Self {
            table: vec![],
            new_to_replace: 0,
            replaced_vars: 0,
        }
    }

    pub fn new_var(&mut self) {
        let v = Var::from_idx(self.table.len() as u32);
        self.table.push(Lit::new(v, true));
    }

    /// Follow the forest to the root of `l`, composing signs.
    pub fn find(&self, mut l: Lit) -> Lit {
        loop {
            let e = self.table[l.var().idx() as usize];
            if e.var() == l.var() {
                return l;
            }
            l = e ^ !l.sign();
        }
    }

    /// The image of `l` under the flattened table.
    #[inline]
    pub fn map_lit(&self, l: Lit) -> Lit {
        self.table[l.var().idx() as usize] ^ !l.sign()
    }

    /// Record the equivalence "positive literal of `v` is `r`".
    pub fn merge(&mut self, v: Var, r: Lit) -> MergeOutcome {
        let a = self.find(Lit::new(v, true));
        let b = self.find(r);
        if a.var() == b.var() {
            return if a == b {
                MergeOutcome::AlreadyEq
            } else {
                MergeOutcome::Contradiction
            };
        }
        // attach the larger root below the smaller one
        let (root, child) = if a.var() < b.var() { (a, b) } else { (b, a) };
        self.table[child.var().idx() as usize] = root ^ !child.sign();
        self.new_to_replace += 1;
        MergeOutcome::New
    }
}

impl<Cb: Callbacks> Solver<Cb> {
    /// Substitute every queued equivalence endpoint out of all attached
    /// clauses. Afterwards the table is a forest of height one and no
    /// attached clause mentions a replaced variable.
    ///
    /// Returns `false` iff the formula became unsatisfiable.
    pub(crate) fn perform_replace(&mut self) -> bool {
        debug_assert_eq!(self.search.prop.decision_level(), 0);
        if !self.search.prop.ok {
            return false;
        }
        if self.replacer.new_to_replace == 0 {
            return true;
        }
        debug!("perform_replace: {} new", self.replacer.new_to_replace);

        let n = self.search.prop.num_vars();

        // Flatten the forest to height one.
        for i in 0..n {
            let v = Var::from_idx(i);
            let r = self.replacer.find(Lit::new(v, true));
            self.replacer.table[i as usize] = r;
        }

        // Mark the non-root endpoints and make values consistent.
        for i in 0..n {
            let v = Var::from_idx(i);
            let r = self.replacer.table[i as usize];
            if r.var() == v {
                continue;
            }
            if self.search.prop.elimed[v] != Elimed::None {
                continue;
            }
            debug_assert_eq!(
                self.search.prop.elimed[r.var()],
                Elimed::None,
                "replacement root must be live"
            );
            let vv = self.search.prop.vars.value(v); // value of the positive literal
            let rv = self.search.prop.value_lit(r);
            if vv != lbool::UNDEF && rv == lbool::UNDEF {
                let l = r ^ (vv == lbool::FALSE);
                self.search.prop.vars.unchecked_enqueue(l, Reason::Decision);
            } else if vv != lbool::UNDEF && rv != lbool::UNDEF && vv != rv {
                self.search.prop.ok = false;
                return false;
            }
            if self.frozen[v] {
                self.frozen[r.var()] = true;
            }
            self.search.prop.elimed[v] = Elimed::Replaced;
            self.replacer.replaced_vars += 1;
            self.search.set_decision_var(v, false);
        }

        // assumptions must follow their variables
        for i in 0..self.assumptions.len() {
            let a = self.assumptions[i];
            self.assumptions[i] = self.replacer.map_lit(a);
        }

        if !self.replace_implicit() {
            return false;
        }
        if !self.replace_long() {
            return false;
        }

        self.search.prop.ok &= self.search.prop.propagate().is_none();
        self.replacer.new_to_replace = 0;
        debug_assert!(self.replace_table_is_flat());
        self.search.prop.ok
    }

    /// Rewrite binary and ternary clauses mentioning a replaced variable.
    fn replace_implicit(&mut self) -> bool {
        let is_replaced =
            |s: &Self, v: Var| s.replacer.table[v.idx() as usize].var() != v;

        // Collect each affected clause once, from its smallest literal.
        let mut bins: Vec<(Lit, Lit, bool)> = vec![];
        let mut tris: Vec<(Lit, Lit, Lit, bool)> = vec![];
        let n_lits = self.search.prop.watches.len();
        for i in 0..n_lits {
            let key = Lit::from_idx(i as u32);
            let l0 = !key;
            for idx in 0..self.search.prop.watches[key].len() {
                match self.search.prop.watches[key][idx] {
                    Watcher::Bin { other, learnt } => {
                        if l0 < other && (is_replaced(self, l0.var()) || is_replaced(self, other.var())) {
                            bins.push((l0, other, learnt));
                        }
                    }
                    Watcher::Tri { a, b, learnt } => {
                        if l0 < a
                            && (is_replaced(self, l0.var())
                                || is_replaced(self, a.var())
                                || is_replaced(self, b.var()))
                        {
                            tris.push((l0, a, b, learnt));
                        }
                    }
                    Watcher::Long { .. } => (),
                }
            }
        }

        for &(a, b, learnt) in &bins {
            self.search.prop.detach_bin(a, b, learnt);
        }
        for &(a, b, c, learnt) in &tris {
            self.search.prop.detach_tri(a, b, c, learnt);
        }

        let mut lits = vec![];
        for &(a, b, learnt) in &bins {
            lits.clear();
            lits.push(self.replacer.map_lit(a));
            lits.push(self.replacer.map_lit(b));
            self.add_clause_int(&mut lits, learnt, ClauseStats::default());
            if !self.search.prop.ok {
                return false;
            }
        }
        for &(a, b, c, learnt) in &tris {
            lits.clear();
            lits.push(self.replacer.map_lit(a));
            lits.push(self.replacer.map_lit(b));
            lits.push(self.replacer.map_lit(c));
            self.add_clause_int(&mut lits, learnt, ClauseStats::default());
            if !self.search.prop.ok {
                return false;
            }
        }
        true
    }

    /// Rewrite long clauses mentioning a replaced variable.
    fn replace_long(&mut self) -> bool {
        let mut todo: Vec<crate::clause::CRef> = vec![];
        for list in [&self.search.prop.long_irred, &self.search.prop.long_red].iter() {
            for &cr in list.iter() {
                let c = self.search.prop.ca.get_ref(cr);
                if c.mark() == 1 {
                    continue;
                }
                if c
                    .lits()
                    .iter()
                    .any(|l| self.replacer.table[l.var().idx() as usize].var() != l.var())
                {
                    todo.push(cr);
                }
            }
        }

        let mut lits = vec![];
        for cr in todo {
            let (learnt, stats) = {
                let c = self.search.prop.ca.get_ref(cr);
                lits.clear();
                for &l in c.lits() {
                    lits.push(self.replacer.map_lit(l));
                }
                (c.learnt(), *c.stats())
            };
            self.search.prop.remove_long(cr);
            self.add_clause_int(&mut lits, learnt, stats);
            if !self.search.prop.ok {
                break;
            }
        }
        let ca = &self.search.prop.ca;
        self.search
            .prop
            .long_irred
            .retain(|&cr| ca.get_ref(cr).mark() != 1);
        self.search
            .prop
            .long_red
            .retain(|&cr| ca.get_ref(cr).mark() != 1);
        self.search.prop.ok
    }

    fn replace_table_is_flat(&self) -> bool {
        self.replacer.table.iter().enumerate().all(|(i, &l)| {
            let root = self.replacer.table[l.var().idx() as usize];
            let _ = i;
            root.var() == l.var()
        })
    }
}
