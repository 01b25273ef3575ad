//! Bounded variable elimination.
//!
//! A candidate variable is eliminated when the set of non-tautological
//! pairwise resolvents is no larger (give or take the configured growth
//! allowance) than the clauses it replaces. The replaced clauses are kept
//! in a blocked list so the eliminated variable's value can be recovered
//! from a model of the reduced formula.

use crate::callbacks::Callbacks;
use crate::clause::{lbool, CRef, ClauseStats, Elimed, Lit, Var};
use crate::solver::{Added, Solver};
use crate::watches::Watcher;

/// Total literal growth allowed per elimination commit.
const ELIM_LIT_GROWTH: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Occ {
    Bin(Lit),
    Tri(Lit, Lit),
    Long(CRef),
}

/// A clause removed by elimination, kept for model extension.
#[derive(Debug, Clone)]
pub(crate) struct BlockedClause {
    /// The literal of the eliminated variable inside `lits`.
    pub on: Lit,
    pub lits: Vec<Lit>,
}

#[derive(Debug)]
pub(crate) struct Eliminator {
    pub blocked: Vec<BlockedClause>,
    pub num_elimed: u64,
}

impl Eliminator {
    pub fn new() -> Self {
        Self {
            blocked: vec![],
            num_elimed: 0,
        }
    }
}

struct OccCl {
    lits: Vec<Lit>,
    src: Occ,
}

impl<Cb: Callbacks> Solver<Cb> {
    /// Bounded variable elimination over the irredundant clauses, iterated
    /// until no further variable qualifies.
    pub(crate) fn bounded_var_elim(&mut self) -> bool {
        // pending equivalences must be substituted out first; elimination
        // must never touch an endpoint of a queued replacement
        if self.replacer.new_to_replace > 0 {
            if !self.perform_replace() {
                return false;
            }
        }
        loop {
            let before = self.elim.num_elimed;
            if !self.var_elim_round() {
                return false;
            }
            if self.elim.num_elimed == before || self.interrupt_requested() {
                return true;
            }
        }
    }

    fn var_elim_round(&mut self) -> bool {
        debug_assert_eq!(self.search.prop.decision_level(), 0);
        if !self.search.prop.ok {
            return false;
        }
        self.clean_clauses();
        if !self.search.prop.ok {
            return false;
        }

        let n_lits = self.search.prop.watches.len();
        let mut occ: Vec<Vec<Occ>> = vec![vec![]; n_lits];

        // occurrence lists over the irredundant clauses
        for &cr in &self.search.prop.long_irred {
            let c = self.search.prop.ca.get_ref(cr);
            if c.mark() == 1 {
                continue;
            }
            for &l in c.lits() {
                occ[l.idx() as usize].push(Occ::Long(cr));
            }
        }
        for i in 0..n_lits {
            let key = Lit::from_idx(i as u32);
            let l0 = !key;
            for idx in 0..self.search.prop.watches[key].len() {
                match self.search.prop.watches[key][idx] {
                    Watcher::Bin {
                        other,
                        learnt: false,
                    } => {
                        if l0 < other {
                            occ[l0.idx() as usize].push(Occ::Bin(other));
                            occ[other.idx() as usize].push(Occ::Bin(l0));
                        }
                    }
                    Watcher::Tri {
                        a,
                        b,
                        learnt: false,
                    } => {
                        if l0 < a {
                            occ[l0.idx() as usize].push(Occ::Tri(a, b));
                            occ[a.idx() as usize].push(Occ::Tri(l0, b));
                            occ[b.idx() as usize].push(Occ::Tri(l0, a));
                        }
                    }
                    _ => (),
                }
            }
        }

        // candidates, fewest occurrences first
        let n_vars = self.search.prop.num_vars();
        let mut cands: Vec<(usize, Var)> = vec![];
        for vi in 0..n_vars {
            let v = Var::from_idx(vi);
            if !self.search.prop.var_usable(v) || self.frozen[v] {
                continue;
            }
            let np = occ[Lit::new(v, true).idx() as usize].len();
            let nn = occ[Lit::new(v, false).idx() as usize].len();
            if np + nn == 0 || np > self.conf.elim_occ_limit || nn > self.conf.elim_occ_limit {
                continue;
            }
            cands.push((np + nn, v));
        }
        cands.sort_unstable();

        let mut elimed_now = 0u64;
        let mut resolvent: Vec<Lit> = vec![];
        for &(_, v) in &cands {
            if self.interrupt_requested() {
                break;
            }
            if !self.search.prop.ok {
                return false;
            }
            if !self.search.prop.var_usable(v) {
                continue;
            }

            let pos = self.gather_occ_clauses(&occ, Lit::new(v, true));
            let neg = self.gather_occ_clauses(&occ, Lit::new(v, false));
            if pos.len() > self.conf.elim_occ_limit || neg.len() > self.conf.elim_occ_limit {
                continue;
            }

            // the elimination resolvent set
            let orig_cl = pos.len() + neg.len();
            let orig_lits: usize = pos.iter().chain(neg.iter()).map(|c| c.lits.len()).sum();
            let mut resolvents: Vec<Vec<Lit>> = vec![];
            let mut lit_count = 0usize;
            let mut too_many = false;
            'pairs: for p in &pos {
                for q in &neg {
                    if resolve(&p.lits, &q.lits, v, &mut resolvent) {
                        lit_count += resolvent.len();
                        resolvents.push(resolvent.clone());
                        if resolvents.len() > orig_cl + self.conf.elim_grow_limit as usize
                            || lit_count > orig_lits + ELIM_LIT_GROWTH
                        {
                            too_many = true;
                            break 'pairs;
                        }
                    }
                }
            }
            if too_many {
                continue;
            }

            // commit: save the originals, detach them, add the resolvents
            for (side, cls) in [(true, &pos), (false, &neg)].iter() {
                for c in cls.iter() {
                    self.elim.blocked.push(BlockedClause {
                        on: Lit::new(v, *side),
                        lits: c.lits.clone(),
                    });
                    if let Some(proof) = self.proof.as_mut() {
                        proof.delete_clause(&c.lits);
                    }
                    self.cb.on_delete_clause(&c.lits);
                    match c.src {
                        Occ::Bin(o) => self.search.prop.detach_bin(Lit::new(v, *side), o, false),
                        Occ::Tri(a, b) => {
                            self.search.prop.detach_tri(Lit::new(v, *side), a, b, false)
                        }
                        Occ::Long(cr) => self.search.prop.remove_long(cr),
                    }
                }
            }
            self.search.prop.elimed[v] = Elimed::VarElim;
            self.search.set_decision_var(v, false);
            self.elim.num_elimed += 1;
            elimed_now += 1;

            let mut rr = vec![];
            for r in resolvents {
                rr.clear();
                rr.extend_from_slice(&r);
                let added = self.add_clause_int(&mut rr, false, ClauseStats::default());
                if !self.search.prop.ok {
                    return false;
                }
                match added {
                    Added::Bin => {
                        occ[rr[0].idx() as usize].push(Occ::Bin(rr[1]));
                        occ[rr[1].idx() as usize].push(Occ::Bin(rr[0]));
                    }
                    Added::Tri => {
                        occ[rr[0].idx() as usize].push(Occ::Tri(rr[1], rr[2]));
                        occ[rr[1].idx() as usize].push(Occ::Tri(rr[0], rr[2]));
                        occ[rr[2].idx() as usize].push(Occ::Tri(rr[0], rr[1]));
                    }
                    Added::Long(cr) => {
                        for &l in rr.iter() {
                            occ[l.idx() as usize].push(Occ::Long(cr));
                        }
                    }
                    Added::Unit | Added::NotAdded => (),
                }
            }
        }

        if elimed_now > 0 {
            debug!("var-elim: eliminated {} variables", elimed_now);
            self.purge_learnt_with_elimed();
            let ca = &self.search.prop.ca;
            self.search
                .prop
                .long_irred
                .retain(|&cr| ca.get_ref(cr).mark() != 1);
            self.search
                .prop
                .long_red
                .retain(|&cr| ca.get_ref(cr).mark() != 1);
            self.search.rebuild_order_heap();
        }
        if self.search.prop.ok {
            self.search.prop.ok = self.search.prop.propagate().is_none();
        }
        self.search.prop.ok
    }

    /// Materialize the clauses still attached that contain `l`. Literals
    /// false at top level are folded away; satisfied clauses are kept so a
    /// commit detaches them too.
    fn gather_occ_clauses(&self, occ: &[Vec<Occ>], l: Lit) -> Vec<OccCl> {
        let mut out = vec![];
        for &o in &occ[l.idx() as usize] {
            let mut lits = vec![l];
            match o {
                Occ::Bin(b) => {
                    // verify the clause is still attached
                    let present = self.search.prop.watches[!l].iter().any(|w| {
                        *w == Watcher::Bin {
                            other: b,
                            learnt: false,
                        }
                    });
                    if !present {
                        continue;
                    }
                    if self.search.prop.value_lit(b) != lbool::FALSE {
                        lits.push(b);
                    }
                }
                Occ::Tri(a, b) => {
                    let (x, y) = if a < b { (a, b) } else { (b, a) };
                    let present = self.search.prop.watches[!l].iter().any(|w| {
                        *w == Watcher::Tri {
                            a: x,
                            b: y,
                            learnt: false,
                        }
                    });
                    if !present {
                        continue;
                    }
                    for &m in [a, b].iter() {
                        if self.search.prop.value_lit(m) != lbool::FALSE {
                            lits.push(m);
                        }
                    }
                }
                Occ::Long(cr) => {
                    let c = self.search.prop.ca.get_ref(cr);
                    if c.mark() == 1 {
                        continue;
                    }
                    lits.clear();
                    for &m in c.lits() {
                        if self.search.prop.value_lit(m) != lbool::FALSE {
                            lits.push(m);
                        }
                    }
                }
            }
            lits.sort_unstable();
            out.push(OccCl { lits, src: o });
        }
        out
    }

    /// Learnt clauses may still mention eliminated variables; they are
    /// logically redundant, so drop them.
    fn purge_learnt_with_elimed(&mut self) {
        // long learnt clauses
        let mut todo = vec![];
        for &cr in &self.search.prop.long_red {
            let c = self.search.prop.ca.get_ref(cr);
            if c.mark() == 1 {
                continue;
            }
            if c
                .lits()
                .iter()
                .any(|l| self.search.prop.elimed[l.var()] == Elimed::VarElim)
            {
                todo.push(cr);
            }
        }
        for cr in todo {
            self.search.prop.remove_long(cr);
        }

        // learnt binaries and ternaries
        let n_lits = self.search.prop.watches.len();
        let mut bins = vec![];
        let mut tris = vec![];
        for i in 0..n_lits {
            let key = Lit::from_idx(i as u32);
            let l0 = !key;
            for idx in 0..self.search.prop.watches[key].len() {
                match self.search.prop.watches[key][idx] {
                    Watcher::Bin {
                        other,
                        learnt: true,
                    } => {
                        if l0 < other
                            && (self.search.prop.elimed[l0.var()] == Elimed::VarElim
                                || self.search.prop.elimed[other.var()] == Elimed::VarElim)
                        {
                            bins.push((l0, other));
                        }
                    }
                    Watcher::Tri {
                        a,
                        b,
                        learnt: true,
                    } => {
                        if l0 < a
                            && [l0, a, b]
                                .iter()
                                .any(|l| self.search.prop.elimed[l.var()] == Elimed::VarElim)
                        {
                            tris.push((l0, a, b));
                        }
                    }
                    _ => (),
                }
            }
        }
        for (a, b) in bins {
            self.search.prop.detach_bin(a, b, true);
        }
        for (a, b, c) in tris {
            self.search.prop.detach_tri(a, b, c, true);
        }
    }

    /// Bring eliminated variables back to life by re-adding their blocked
    /// clauses, transitively (a blocked clause may mention further
    /// eliminated variables). Needed when an assumption lands on a
    /// variable a previous solve call eliminated.
    pub(crate) fn uneliminate(&mut self, root: Var) -> bool {
        if self.search.prop.elimed[root] != Elimed::VarElim {
            return self.search.prop.ok;
        }
        let mut work = vec![root];
        let mut to_add: Vec<Vec<Lit>> = vec![];
        while let Some(x) = work.pop() {
            if self.search.prop.elimed[x] != Elimed::VarElim {
                continue;
            }
            self.search.prop.elimed[x] = Elimed::None;
            self.search.set_decision_var(x, true);
            self.elim.num_elimed -= 1;
            let blocked = std::mem::take(&mut self.elim.blocked);
            let mut keep = Vec::with_capacity(blocked.len());
            for bc in blocked {
                if bc.on.var() == x {
                    for &l in &bc.lits {
                        let m = self.replacer.map_lit(l);
                        if self.search.prop.elimed[m.var()] == Elimed::VarElim {
                            work.push(m.var());
                        }
                    }
                    to_add.push(bc.lits);
                } else {
                    keep.push(bc);
                }
            }
            self.elim.blocked = keep;
        }
        for mut lits in to_add {
            for l in lits.iter_mut() {
                *l = self.replacer.map_lit(*l);
            }
            self.add_clause_int(&mut lits, false, ClauseStats::default());
            if !self.search.prop.ok {
                return false;
            }
        }
        self.search.prop.ok
    }

    /// Recover values for eliminated variables by scanning the blocked
    /// clauses in reverse elimination order. `model` is indexed by inner
    /// variable; replaced literals are routed through the equivalence table.
    pub(crate) fn extend_model_with_blocked(&self, model: &mut Vec<lbool>) {
        for bc in self.elim.blocked.iter().rev() {
            let satisfied = bc.lits.iter().any(|&l| {
                let r = self.replacer.map_lit(l);
                let val = model[r.var().idx() as usize] ^ !r.sign();
                val == lbool::TRUE
            });
            if !satisfied {
                // make the blocked literal true
                model[bc.on.var().idx() as usize] = lbool::new(bc.on.sign());
            }
        }
    }
}

/// Resolve `p` and `q` (sorted literal lists) on `v`; returns `false` for a
/// tautology, otherwise leaves the sorted resolvent in `out`.
fn resolve(p: &[Lit], q: &[Lit], v: Var, out: &mut Vec<Lit>) -> bool {
    out.clear();
    let mut i = 0;
    let mut j = 0;
    let mut push = |out: &mut Vec<Lit>, l: Lit| -> bool {
        if let Some(&last) = out.last() {
            if last == l {
                return true; // duplicate
            }
            if last == !l {
                return false; // tautology
            }
        }
        out.push(l);
        true
    };
    while i < p.len() || j < q.len() {
        let next = if j >= q.len() || (i < p.len() && p[i] <= q[j]) {
            let l = p[i];
            i += 1;
            l
        } else {
            let l = q[j];
            j += 1;
            l
        };
        if next.var() == v {
            continue;
        }
        if !push(out, next) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod test {
    use super::resolve;
    use crate::clause::{Lit, Var};

    fn l(i: u32, s: bool) -> Lit {
        Lit::new(Var::from_idx(i), s)
    }

    #[test]
    fn test_resolve_basic() {
        let v = Var::from_idx(0);
        let mut p = vec![l(0, true), l(1, true)];
        let mut q = vec![l(0, false), l(2, false)];
        p.sort_unstable();
        q.sort_unstable();
        let mut out = vec![];
        assert!(resolve(&p, &q, v, &mut out));
        let mut expect = vec![l(1, true), l(2, false)];
        expect.sort_unstable();
        assert_eq!(out, expect);
    }

    #[test]
    fn test_resolve_tautology() {
        let v = Var::from_idx(0);
        let mut p = vec![l(0, true), l(1, true)];
        let mut q = vec![l(0, false), l(1, false)];
        p.sort_unstable();
        q.sort_unstable();
        let mut out = vec![];
        assert!(!resolve(&p, &q, v, &mut out));
    }
}
