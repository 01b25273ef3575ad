/*****************************************************************************************[solver.rs]
Copyright (c) 2003-2006, Niklas Een, Niklas Sorensson (MiniSat)
Copyright (c) 2007-2010, Niklas Sorensson (MiniSat)

Permission is hereby granted, free of charge, to any person obtaining a copy of this software and
associated documentation files (the "Software"), to deal in the Software without restriction,
including without limitation the rights to use, copy, modify, merge, publish, distribute,
sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all copies or
substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT
NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT
OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
**************************************************************************************************/

//! The solver: composition root tying the propagation engine, the searcher
//! and the simplifier components together, plus the public operations.

use crate::callbacks::Callbacks;
use crate::clause::{
    lbool, CRef, ClauseAllocator, ClauseStats, Elimed, Lit, VMap, Var, MAX_CLAUSE_SIZE,
};
use crate::config::{ClauseCleaningType, SolverConf};
use crate::drat::Proof;
use crate::elim::Eliminator;
use crate::probe::ProbeState;
use crate::propagate::Reason;
use crate::replace::VarReplacer;
use crate::search::Searcher;
use crate::watches::Watcher;
use std::io::{self, Write};
use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};

/// What `add_clause_int` turned a clause into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Added {
    /// Satisfied, tautological, or the formula is now unsat.
    NotAdded,
    Unit,
    Bin,
    Tri,
    Long(CRef),
}

/// The main solver structure.
///
/// A `Solver` object contains the whole state of the SAT solver: clause
/// storage, watch index, trail, search heuristics and every inprocessing
/// component. It is parametrized by `Callbacks`.
pub struct Solver<Cb: Callbacks> {
    pub(crate) cb: Cb,
    pub(crate) conf: SolverConf,
    pub(crate) search: Searcher,
    pub(crate) replacer: VarReplacer,
    pub(crate) elim: Eliminator,
    pub(crate) probe: ProbeState,

    /// Externally visible variable index -> internal index.
    pub(crate) outer_to_inter: Vec<Var>,
    /// Internal index -> externally visible index.
    pub(crate) inter_to_outer: Vec<Var>,

    /// If problem is satisfiable, this vector contains the model,
    /// in the outer numbering.
    pub(crate) model: Vec<lbool>,
    pub(crate) proof: Option<Proof>,
    pub(crate) asynch_interrupt: AtomicBool,
    /// Assumptions of the current solve call, in the inner numbering.
    pub(crate) assumptions: Vec<Lit>,
    /// Assumption variables are excluded from elimination while solving.
    pub(crate) frozen: VMap<bool>,

    pub(crate) next_clean_limit: u64,
    pub(crate) next_clean_inc: u64,
    pub(crate) num_simplify: u64,
    pub(crate) solves: u64,
    pub(crate) num_reduce_db: u64,
    pub(crate) zero_lev_assigns_by_cnf: u64,
    pub(crate) stats_scc_found: u64,
}

impl<Cb: Callbacks + Default> Default for Solver<Cb> {
    fn default() -> Self {
        Solver::new(SolverConf::default(), Default::default())
    }
}

impl<Cb: Callbacks> Solver<Cb> {
    /// Create a new solver with the given configuration and callbacks.
    pub fn new(conf: SolverConf, cb: Cb) -> Self {
        assert!(conf.check());
        let proof = if conf.produce_proof {
            Some(Proof::new())
        } else {
            None
        };
        Self {
            cb,
            search: Searcher::new(&conf),
            replacer: VarReplacer::new(),
            elim: Eliminator::new(),
            probe: ProbeState::new(),
            outer_to_inter: vec![],
            inter_to_outer: vec![],
            model: vec![],
            proof,
            asynch_interrupt: AtomicBool::new(false),
            assumptions: vec![],
            frozen: VMap::new(),
            next_clean_limit: 0,
            next_clean_inc: conf.start_clean,
            num_simplify: 0,
            solves: 0,
            num_reduce_db: 0,
            zero_lev_assigns_by_cnf: 0,
            stats_scc_found: 0,
            conf,
        }
    }

    /// Temporary access to the callbacks
    pub fn cb_mut(&mut self) -> &mut Cb {
        &mut self.cb
    }
    pub fn cb(&self) -> &Cb {
        &self.cb
    }

    // ---- interruption & budgets ----

    /// Ask the solver to stop as soon as possible. Safe to call from another
    /// thread; the flag is sticky until the outermost solve returns.
    pub fn set_need_to_interrupt(&self) {
        self.asynch_interrupt.store(true, Ordering::Relaxed);
    }

    pub(crate) fn interrupt_requested(&self) -> bool {
        self.asynch_interrupt.load(Ordering::Relaxed)
    }

    pub(crate) fn within_budget(&self) -> bool {
        !self.interrupt_requested() && !self.cb.stop()
    }

    // ---- variables and clauses ----

    pub(crate) fn new_var_(&mut self, dvar: bool) -> Var {
        let inner = self.search.new_var(dvar);
        self.replacer.new_var();
        self.frozen.push(false);
        let outer = Var::from_idx(self.outer_to_inter.len() as u32);
        self.outer_to_inter.push(inner);
        self.inter_to_outer.push(outer);
        outer
    }

    /// Number of externally visible variables.
    pub fn num_vars(&self) -> u32 {
        self.outer_to_inter.len() as u32
    }

    pub fn is_ok(&self) -> bool {
        self.search.prop.ok
    }

    /// Variables that are neither assigned, eliminated nor replaced.
    pub(crate) fn num_free_vars(&self) -> u64 {
        (0..self.search.prop.num_vars())
            .filter(|&i| self.search.prop.var_usable(Var::from_idx(i)))
            .count() as u64
    }

    /// Translate an externally given literal to the internal numbering,
    /// routed through the equivalence table.
    fn map_outer_lit(&self, l: Lit) -> Lit {
        assert!(
            l.var().idx() < self.num_vars(),
            "literal {:?} out of range: variable not declared",
            l
        );
        let inner = Lit::new(self.outer_to_inter[l.var().idx() as usize], l.sign());
        self.replacer.map_lit(inner)
    }

    /// Add a clause given in the outer numbering; `clause` is modified.
    /// Returns `false` if the solver is already in an unsat state.
    pub(crate) fn add_clause_(&mut self, clause: &mut Vec<Lit>) -> bool {
        debug_assert_eq!(self.search.prop.decision_level(), 0);
        assert!(
            clause.len() <= MAX_CLAUSE_SIZE,
            "clause of length {} exceeds the size limit",
            clause.len()
        );
        if !self.search.prop.ok {
            return false;
        }
        let orig_trail = self.search.prop.vars.trail.len();
        for l in clause.iter_mut() {
            let mapped = self.map_outer_lit(*l);
            assert!(
                self.search.prop.elimed[mapped.var()] != Elimed::VarElim,
                "clause uses variable {:?}, which was eliminated",
                mapped.var()
            );
            *l = mapped;
        }
        self.add_clause_int(clause, false, ClauseStats::default());
        self.zero_lev_assigns_by_cnf +=
            (self.search.prop.vars.trail.len() - orig_trail) as u64;
        self.search.prop.ok
    }

    /// Add a clause over internal literals. Should ONLY be called internally
    /// and never with eliminated or replaced variables inside.
    ///
    /// The clause is sorted; duplicate literals, literals false at top level
    /// and satisfied/tautological clauses are dropped.
    pub(crate) fn add_clause_int(
        &mut self,
        clause: &mut Vec<Lit>,
        learnt: bool,
        stats: ClauseStats,
    ) -> Added {
        if !self.search.prop.ok {
            return Added::NotAdded;
        }
        debug_assert_eq!(self.search.prop.decision_level(), 0);
        clause.sort_unstable();

        let mut last = Lit::ERROR;
        let mut j = 0;
        for i in 0..clause.len() {
            let l = clause[i];
            debug_assert!(
                self.search.prop.elimed[l.var()] == Elimed::None,
                "internal clause with a dead variable"
            );
            let v = self.search.prop.value_lit(l);
            if v == lbool::TRUE || l == !last {
                return Added::NotAdded; // satisfied at top level, or tautology
            }
            if v != lbool::FALSE && l != last {
                last = l;
                clause[j] = l;
                j += 1;
            }
        }
        clause.truncate(j);

        match clause.len() {
            0 => {
                self.search.prop.ok = false;
                Added::NotAdded
            }
            1 => {
                self.search
                    .prop
                    .vars
                    .unchecked_enqueue(clause[0], Reason::Decision);
                self.search.prop.ok = self.search.prop.propagate().is_none();
                Added::Unit
            }
            2 => {
                self.search.prop.attach_bin(clause[0], clause[1], learnt);
                Added::Bin
            }
            3 => {
                self.search
                    .prop
                    .attach_tri(clause[0], clause[1], clause[2], learnt);
                Added::Tri
            }
            _ => {
                let cr = self.search.prop.ca.alloc(clause, learnt, stats);
                if learnt {
                    self.search.prop.long_red.push(cr);
                } else {
                    self.search.prop.long_irred.push(cr);
                }
                self.search.prop.attach_long(cr);
                Added::Long(cr)
            }
        }
    }

    // ---- solving ----

    /// Light top-level simplification: propagate pending facts. With
    /// `do_simplify`, public users get the full pipeline through `solve`.
    pub fn simplify(&mut self) -> bool {
        debug_assert_eq!(self.search.prop.decision_level(), 0);
        if !self.search.prop.ok || self.search.prop.propagate().is_some() {
            self.search.prop.ok = false;
            return false;
        }
        true
    }

    /// Run one full inprocessing round, as `solve` does between bursts.
    pub fn simplify_full(&mut self) -> bool {
        if !self.simplify() {
            return false;
        }
        if self.conf.do_simplify {
            self.simplify_problem() != lbool::FALSE
        } else {
            true
        }
    }

    /// Solve under the given assumptions (outer numbering).
    ///
    /// Returns `lbool::TRUE` (model available), `lbool::FALSE`
    /// (unsatisfiable, possibly under the assumptions), or `lbool::UNDEF`
    /// after an interrupt.
    pub fn solve_limited(&mut self, assumps: &[Lit]) -> lbool {
        self.asynch_interrupt.store(false, Ordering::SeqCst);
        self.assumptions.clear();
        if !self.search.prop.ok {
            return lbool::FALSE;
        }
        for &l in assumps {
            let mapped = self.map_outer_lit(l);
            if self.search.prop.elimed[mapped.var()] == Elimed::VarElim {
                // a previous solve eliminated this variable; bring it back
                if !self.uneliminate(mapped.var()) {
                    return lbool::FALSE;
                }
            }
            self.frozen[mapped.var()] = true;
            self.assumptions.push(mapped);
        }
        let res = self.solve_internal();
        let assumps = mem::take(&mut self.assumptions);
        for &l in &assumps {
            self.frozen[l.var()] = false;
        }
        res
    }

    fn solve_internal(&mut self) -> lbool {
        assert_eq!(self.search.prop.decision_level(), 0);
        self.model.clear();
        self.solves += 1;
        info!("solve.start ({} vars)", self.num_vars());
        self.cb.on_start();

        if self.search.prop.propagate().is_some() {
            self.search.prop.ok = false;
            return lbool::FALSE;
        }

        self.next_clean_limit = self.search.stats.conflicts + self.next_clean_inc;

        let mut status = lbool::UNDEF;
        if self.conf.do_simplify && self.search.prop.num_vars() > 0 {
            status = self.simplify_problem();
        }

        while status == lbool::UNDEF {
            if !self.within_budget() {
                break;
            }

            // search bursts, cleaning the learnt database between them
            let mut cleans_done = 0;
            loop {
                let target = self
                    .next_clean_limit
                    .saturating_sub(self.search.stats.conflicts)
                    .max(1);
                status = self.search(target);
                if status != lbool::UNDEF || !self.within_budget() {
                    break;
                }
                if self.search.stats.conflicts >= self.next_clean_limit {
                    self.full_reduce();
                    cleans_done += 1;
                    if cleans_done >= self.conf.num_clean_between_simplify {
                        break;
                    }
                }
            }

            if status != lbool::UNDEF || !self.within_budget() {
                break;
            }
            if self.conf.do_simplify {
                status = self.simplify_problem();
            }
        }

        if status == lbool::TRUE {
            self.build_model();
            assert!(self.verify_model(), "model fails verification");
        }
        self.search.cancel_until(0);
        self.cb.on_result(status);
        debug!("solve.done: {:?}", status);
        status
    }

    // ---- model construction & verification ----

    /// Total assignment, stored in the outer numbering.
    fn build_model(&mut self) {
        let n = self.search.prop.num_vars() as usize;
        let mut inner: Vec<lbool> = (0..n)
            .map(|i| self.search.prop.vars.value(Var::from_idx(i as u32)))
            .collect();
        for m in inner.iter_mut() {
            if *m == lbool::UNDEF {
                *m = lbool::FALSE;
            }
        }
        // eliminated variables from their blocked clauses, then replaced
        // variables from their roots
        self.extend_model_with_blocked(&mut inner);
        for i in 0..n {
            let v = Var::from_idx(i as u32);
            if self.search.prop.elimed[v] == Elimed::Replaced {
                let r = self.replacer.table[i];
                inner[i] = inner[r.var().idx() as usize] ^ !r.sign();
            }
        }

        self.model = vec![lbool::UNDEF; self.outer_to_inter.len()];
        for (outer, &iv) in self.outer_to_inter.iter().enumerate() {
            self.model[outer] = inner[iv.idx() as usize];
        }
    }

    /// Check the stored model against every attached clause class and
    /// every blocked clause. Valid only after a `TRUE` result; `solve`
    /// itself runs this before reporting satisfiability.
    pub fn verify_model(&self) -> bool {
        let val = |l: Lit| {
            let o = self.inter_to_outer[l.var().idx() as usize];
            self.model
                .get(o.idx() as usize)
                .map_or(lbool::UNDEF, |&x| x)
                ^ !l.sign()
        };
        let mut checked = 0u64;
        let n_lits = self.search.prop.watches.len();
        for i in 0..n_lits {
            let key = Lit::from_idx(i as u32);
            let l0 = !key;
            for w in self.search.prop.watches[key].iter() {
                match *w {
                    Watcher::Bin { other, .. } => {
                        checked += 1;
                        if val(l0) != lbool::TRUE && val(other) != lbool::TRUE {
                            return false;
                        }
                    }
                    Watcher::Tri { a, b, .. } => {
                        checked += 1;
                        if val(l0) != lbool::TRUE
                            && val(a) != lbool::TRUE
                            && val(b) != lbool::TRUE
                        {
                            return false;
                        }
                    }
                    Watcher::Long { .. } => (),
                }
            }
        }
        for list in [&self.search.prop.long_irred, &self.search.prop.long_red].iter() {
            for &cr in list.iter() {
                let c = self.search.prop.ca.get_ref(cr);
                if c.mark() == 1 {
                    continue;
                }
                checked += 1;
                if !c.lits().iter().any(|&l| val(l) == lbool::TRUE) {
                    return false;
                }
            }
        }
        for bc in &self.elim.blocked {
            checked += 1;
            let sat = bc.lits.iter().any(|&l| val(self.replacer.map_lit(l)) == lbool::TRUE);
            if !sat {
                return false;
            }
        }
        if self.conf.verbosity >= 1 {
            println!("c Verified {} clauses.", checked);
        }
        true
    }

    /// Model value of an outer variable; valid only after a `TRUE` result.
    pub fn value_var(&self, v: Var) -> lbool {
        self.model
            .get(v.idx() as usize)
            .map_or(lbool::UNDEF, |&x| x)
    }

    pub fn value_lit(&self, l: Lit) -> lbool {
        self.value_var(l.var()) ^ !l.sign()
    }

    pub fn get_model(&self) -> &[lbool] {
        &self.model
    }

    /// The equivalence representative of an outer variable's positive
    /// literal, in the outer numbering.
    pub fn equiv_root_of(&self, v: Var) -> Lit {
        assert!(v.idx() < self.num_vars());
        let inner = self.outer_to_inter[v.idx() as usize];
        let r = self.replacer.find(Lit::new(inner, true));
        Lit::new(
            self.inter_to_outer[r.var().idx() as usize],
            r.sign(),
        )
    }

    pub fn num_replaced_vars(&self) -> u64 {
        self.replacer.replaced_vars
    }

    pub fn num_elimed_vars(&self) -> u64 {
        self.elim.num_elimed
    }

    // ---- learnt clause database management ----

    /// Remove roughly `ratio_remove_clauses` of the long learnt clauses,
    /// keeping locked ones. The pre-clean step first drops clauses that
    /// were given their chance and never propagated.
    pub(crate) fn reduce_db(&mut self) {
        self.clean_clauses();
        if !self.search.prop.ok {
            return;
        }
        self.num_reduce_db += 1;
        let mut long_red = mem::take(&mut self.search.prop.long_red);
        debug!("reduce_db.start ({} long learnts)", long_red.len());

        if self.conf.do_pre_clause_clean {
            let conflicts = self.search.stats.conflicts;
            let mut j = 0;
            for i in 0..long_red.len() {
                let cr = long_red[i];
                let drop_it = {
                    let c = self.search.prop.ca.get_ref(cr);
                    let s = c.stats();
                    s.prop_confl() < self.conf.pre_clause_clean_prop_and_confl_limit
                        && s.intro_confl + self.conf.pre_clean_min_confl_time < conflicts
                        && !self.search.prop.locked(c)
                };
                if drop_it {
                    self.delete_long_clause(cr);
                } else {
                    long_red[j] = cr;
                    j += 1;
                }
            }
            long_red.truncate(j);
        }

        // order so that the clauses to remove come first
        {
            let ca = &self.search.prop.ca;
            match self.conf.clause_cleaning_type {
                ClauseCleaningType::Glue => long_red.sort_unstable_by(|&x, &y| {
                    let (cx, cy) = (ca.get_ref(x), ca.get_ref(y));
                    (cy.stats().glue, cy.size())
                        .cmp(&(cx.stats().glue, cx.size()))
                }),
                ClauseCleaningType::Size => long_red.sort_unstable_by(|&x, &y| {
                    let (cx, cy) = (ca.get_ref(x), ca.get_ref(y));
                    (cy.size(), cy.stats().glue)
                        .cmp(&(cx.size(), cx.stats().glue))
                }),
                ClauseCleaningType::PropConfl => long_red.sort_unstable_by(|&x, &y| {
                    let (cx, cy) = (ca.get_ref(x), ca.get_ref(y));
                    (cx.stats().prop_confl(), cy.size())
                        .cmp(&(cy.stats().prop_confl(), cx.size()))
                }),
            }
        }

        let remove_num = (long_red.len() as f64 * self.conf.ratio_remove_clauses) as usize;
        let mut removed = 0usize;
        let mut j = 0;
        for i in 0..long_red.len() {
            let cr = long_red[i];
            let locked = {
                let c = self.search.prop.ca.get_ref(cr);
                self.search.prop.locked(c)
            };
            if removed < remove_num && !locked {
                self.delete_long_clause(cr);
                removed += 1;
            } else {
                long_red[j] = cr;
                j += 1;
            }
        }
        long_red.truncate(j);

        if self.conf.clear_stats_every_clean {
            for &cr in &long_red {
                self.search.prop.ca.stats_mut(cr).clear_after_clean();
            }
        }

        debug!("reduce_db.done (removed {})", removed);
        self.search.prop.long_red = long_red;
    }

    fn delete_long_clause(&mut self, cr: CRef) {
        {
            let c = self.search.prop.ca.get_ref(cr);
            self.cb.on_delete_clause(c.lits());
        }
        if let Some(proof) = self.proof.as_mut() {
            let lits: Vec<Lit> = self.search.prop.ca.get_ref(cr).lits().to_vec();
            proof.delete_clause(&lits);
        }
        self.search.prop.remove_long(cr);
    }

    /// Cleaning plus consolidation, and the next-clean cadence update.
    pub(crate) fn full_reduce(&mut self) {
        if self.conf.do_sql {
            // external statistics sink; the callback owns the transport
            self.cb.on_clean_stats(self.num_reduce_db, self.search.stats.conflicts);
        }
        self.reduce_db();
        self.check_garbage();
        if self.conf.clear_stats_every_clean {
            let long_irred = mem::take(&mut self.search.prop.long_irred);
            for &cr in &long_irred {
                self.search.prop.ca.stats_mut(cr).clear_after_clean();
            }
            self.search.prop.long_irred = long_irred;
        }
        self.next_clean_limit += self.next_clean_inc;
        self.next_clean_inc =
            ((self.next_clean_inc as f64) * self.conf.increase_clean).max(1.0) as u64;
    }

    /// Remove satisfied clauses and false literals at top level. Long
    /// clauses shrinking below four literals migrate into the watch index.
    pub(crate) fn clean_clauses(&mut self) {
        debug_assert_eq!(self.search.prop.decision_level(), 0);
        if !self.search.prop.ok {
            return;
        }
        debug_assert_eq!(self.search.prop.qhead, self.search.prop.vars.trail.len());

        // implicit clauses
        let n_lits = self.search.prop.watches.len();
        let mut sat_bins: Vec<(Lit, Lit, bool)> = vec![];
        let mut sat_tris: Vec<(Lit, Lit, Lit, bool)> = vec![];
        let mut shrink_tris: Vec<(Lit, Lit, Lit, bool, Lit, Lit)> = vec![];
        for i in 0..n_lits {
            let key = Lit::from_idx(i as u32);
            let l0 = !key;
            for idx in 0..self.search.prop.watches[key].len() {
                match self.search.prop.watches[key][idx] {
                    Watcher::Bin { other, learnt } => {
                        if l0 < other {
                            let v0 = self.search.prop.value_lit(l0);
                            let v1 = self.search.prop.value_lit(other);
                            if v0 == lbool::TRUE || v1 == lbool::TRUE {
                                sat_bins.push((l0, other, learnt));
                            } else {
                                debug_assert!(v0 == lbool::UNDEF && v1 == lbool::UNDEF);
                            }
                        }
                    }
                    Watcher::Tri { a, b, learnt } => {
                        if l0 < a {
                            let vals = [
                                self.search.prop.value_lit(l0),
                                self.search.prop.value_lit(a),
                                self.search.prop.value_lit(b),
                            ];
                            if vals.iter().any(|&v| v == lbool::TRUE) {
                                sat_tris.push((l0, a, b, learnt));
                            } else if vals.iter().any(|&v| v == lbool::FALSE) {
                                // exactly one false literal: the clause is
                                // effectively binary now
                                let lits = [l0, a, b];
                                let mut keep = lits
                                    .iter()
                                    .zip(vals.iter())
                                    .filter(|(_, &v)| v == lbool::UNDEF)
                                    .map(|(&l, _)| l);
                                let k0 = keep.next().expect("tri fully false");
                                let k1 = keep.next().expect("tri propagated wrong");
                                shrink_tris.push((l0, a, b, learnt, k0, k1));
                            }
                        }
                    }
                    Watcher::Long { .. } => (),
                }
            }
        }
        for &(a, b, learnt) in &sat_bins {
            self.search.prop.detach_bin(a, b, learnt);
        }
        for &(a, b, c, learnt) in &sat_tris {
            self.search.prop.detach_tri(a, b, c, learnt);
        }
        for &(a, b, c, learnt, k0, k1) in &shrink_tris {
            if let Some(proof) = self.proof.as_mut() {
                let shrunk = vec![k0, k1];
                proof.create_clause(&shrunk);
                let old = vec![a, b, c];
                proof.delete_clause(&old);
            }
            self.search.prop.detach_tri(a, b, c, learnt);
            self.search.prop.attach_bin(k0, k1, learnt);
        }

        // long clauses
        for which in 0..2 {
            let mut list = if which == 0 {
                mem::take(&mut self.search.prop.long_irred)
            } else {
                mem::take(&mut self.search.prop.long_red)
            };
            let mut j = 0;
            for i in 0..list.len() {
                let cr = list[i];
                let c = self.search.prop.ca.get_ref(cr);
                if c.mark() == 1 {
                    continue; // freed earlier, drop from the list
                }
                if self.search.prop.satisfied(c) {
                    self.delete_long_clause(cr);
                    continue;
                }
                // Trim false literals (the two watched ones are unassigned).
                let learnt = c.learnt();
                let has_false = c
                    .lits()
                    .iter()
                    .any(|&l| self.search.prop.value_lit(l) == lbool::FALSE);
                if has_false {
                    let mut new_lits: Vec<Lit> = c
                        .lits()
                        .iter()
                        .cloned()
                        .filter(|&l| self.search.prop.value_lit(l) != lbool::FALSE)
                        .collect();
                    debug_assert!(new_lits.len() >= 2);
                    if let Some(proof) = self.proof.as_mut() {
                        proof.create_clause(&new_lits);
                        let old: Vec<Lit> = c.lits().to_vec();
                        proof.delete_clause(&old);
                    }
                    let stats = *c.stats();
                    self.search.prop.remove_long(cr);
                    self.add_clause_int(&mut new_lits, learnt, stats);
                    if !self.search.prop.ok {
                        // push back the rest untouched and bail out
                        list[j] = cr;
                        j += 1;
                        continue;
                    }
                    continue; // re-added clause went to the back of the list
                }
                list[j] = cr;
                j += 1;
            }
            list.truncate(j);
            if which == 0 {
                let mut cur = mem::take(&mut self.search.prop.long_irred);
                list.append(&mut cur);
                self.search.prop.long_irred = list;
            } else {
                let mut cur = mem::take(&mut self.search.prop.long_red);
                list.append(&mut cur);
                self.search.prop.long_red = list;
            }
        }
    }

    // ---- arena consolidation ----

    /// Copy the live clauses into a fresh arena, updating every reference.
    pub(crate) fn consolidate(&mut self) {
        let prop = &mut self.search.prop;
        let mut to = ClauseAllocator::with_start_cap(prop.ca.len() - prop.ca.wasted());

        prop.watches.clean_all(&prop.ca);
        let n_lits = prop.watches.len();
        for i in 0..n_lits {
            let key = Lit::from_idx(i as u32);
            for idx in 0..prop.watches[key].len() {
                if let Watcher::Long { ref mut cref, .. } = prop.watches[key][idx] {
                    prop.ca.reloc(cref, &mut to);
                }
            }
        }

        // reasons on the trail; anything not locked is forgotten
        for i in 0..prop.vars.trail.len() {
            let v = prop.vars.trail[i].var();
            if let Reason::Long(cr) = prop.vars.reason(v) {
                let keep = {
                    let c = prop.ca.get_ref(cr);
                    c.reloced() || prop.locked(c)
                };
                if keep {
                    let mut cr2 = cr;
                    prop.ca.reloc(&mut cr2, &mut to);
                    prop.vars.vardata[v].reason = Reason::Long(cr2);
                } else {
                    prop.vars.vardata[v].reason = Reason::Decision;
                }
            }
        }

        for which in 0..2 {
            let list = if which == 0 {
                &mut prop.long_irred
            } else {
                &mut prop.long_red
            };
            let mut j = 0;
            for i in 0..list.len() {
                let mut cr = list[i];
                if prop.ca.get_ref(cr).mark() != 1 {
                    prop.ca.reloc(&mut cr, &mut to);
                    list[j] = cr;
                    j += 1;
                }
            }
            list.truncate(j);
        }

        self.cb
            .on_gc(prop.ca.len() * 4, to.len() * 4);
        prop.ca = to;
    }

    /// Consolidate when the wasted share of the arena exceeds the threshold.
    pub(crate) fn check_garbage(&mut self) {
        if self.search.prop.ca.wasted() as f64
            > self.search.prop.ca.len() as f64 * self.conf.garbage_frac
        {
            self.consolidate();
        }
    }

    // ---- verifiers ----

    /// Walk the watch index and the clause lists recomputing the implicit
    /// counters; panics on any mismatch.
    pub fn check_stats(&self) {
        self.search.prop.check_stats(false);
    }

    // ---- output ----

    fn outer_int(&self, l: Lit) -> i64 {
        let o = self.inter_to_outer[l.var().idx() as usize];
        let v = (o.idx() + 1) as i64;
        if l.sign() {
            v
        } else {
            -v
        }
    }

    /// Count of irredundant binaries/ternaries in the watch index.
    fn count_implicit(&self, learnt: bool) -> (u64, u64) {
        if learnt {
            (self.search.prop.red_bins, self.search.prop.red_tris)
        } else {
            (self.search.prop.irred_bins, self.search.prop.irred_tris)
        }
    }

    /// Dump the irredundant clauses in DIMACS: units, one binary pair per
    /// known equivalence, the implicit clauses, the long clauses and the
    /// blocked clauses of eliminated variables (after a separator comment).
    pub fn dump_irred_clauses<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        let units = self.search.prop.vars.proved_at_lvl_0().len();
        let mut eq_pairs = 0usize;
        for (i, &r) in self.replacer.table.iter().enumerate() {
            if r.var().idx() != i as u32
                && self.search.prop.elimed[Var::from_idx(i as u32)] == Elimed::Replaced
            {
                eq_pairs += 1;
            }
        }
        let (bins, tris) = self.count_implicit(false);
        let longs = self
            .search
            .prop
            .long_irred
            .iter()
            .filter(|&&cr| self.search.prop.ca.get_ref(cr).mark() != 1)
            .count();
        let num_clauses =
            units + eq_pairs * 2 + bins as usize + tris as usize + longs + self.elim.blocked.len();

        writeln!(w, "p cnf {} {}", self.num_vars(), num_clauses)?;

        writeln!(w, "c ---------")?;
        writeln!(w, "c unitaries")?;
        writeln!(w, "c ---------")?;
        for &l in self.search.prop.vars.proved_at_lvl_0() {
            writeln!(w, "{} 0", self.outer_int(l))?;
        }

        writeln!(w, "c ---------------------------------------")?;
        writeln!(w, "c binary clauses of replaced equivalences")?;
        writeln!(w, "c ---------------------------------------")?;
        for (i, &r) in self.replacer.table.iter().enumerate() {
            let v = Var::from_idx(i as u32);
            if r.var() == v || self.search.prop.elimed[v] != Elimed::Replaced {
                continue;
            }
            let vl = Lit::new(v, true);
            writeln!(w, "{} {} 0", self.outer_int(!vl), self.outer_int(r))?;
            writeln!(w, "{} {} 0", self.outer_int(vl), self.outer_int(!r))?;
        }

        writeln!(w, "c --------------------------")?;
        writeln!(w, "c binary and ternary clauses")?;
        writeln!(w, "c --------------------------")?;
        self.dump_implicit(w, false)?;

        writeln!(w, "c --------------")?;
        writeln!(w, "c normal clauses")?;
        writeln!(w, "c --------------")?;
        for &cr in &self.search.prop.long_irred {
            let c = self.search.prop.ca.get_ref(cr);
            if c.mark() == 1 {
                continue;
            }
            debug_assert!(!c.learnt());
            for &l in c.lits() {
                write!(w, "{} ", self.outer_int(l))?;
            }
            writeln!(w, "0")?;
        }

        writeln!(w, "c -------------------------------")?;
        writeln!(w, "c previously eliminated variables")?;
        writeln!(w, "c -------------------------------")?;
        for bc in &self.elim.blocked {
            let on = self.replacer.map_lit(bc.on);
            writeln!(
                w,
                "c next clause is eliminated/blocked on lit {}",
                self.outer_int(on)
            )?;
            for &l in &bc.lits {
                write!(w, "{} ", self.outer_int(self.replacer.map_lit(l)))?;
            }
            writeln!(w, "0")?;
        }
        Ok(())
    }

    fn dump_implicit<W: Write + ?Sized>(&self, w: &mut W, learnt: bool) -> io::Result<()> {
        let n_lits = self.search.prop.watches.len();
        for i in 0..n_lits {
            let key = Lit::from_idx(i as u32);
            let l0 = !key;
            for wt in self.search.prop.watches[key].iter() {
                match *wt {
                    Watcher::Bin { other, learnt: wl } if wl == learnt => {
                        if l0 < other {
                            writeln!(
                                w,
                                "{} {} 0",
                                self.outer_int(l0),
                                self.outer_int(other)
                            )?;
                        }
                    }
                    Watcher::Tri { a, b, learnt: wl } if wl == learnt => {
                        if l0 < a {
                            writeln!(
                                w,
                                "{} {} {} 0",
                                self.outer_int(l0),
                                self.outer_int(a),
                                self.outer_int(b)
                            )?;
                        }
                    }
                    _ => (),
                }
            }
        }
        Ok(())
    }

    /// Dump the learnt clauses up to `max_size` literals, plus the units
    /// and known equivalences.
    pub fn dump_learnts<W: Write + ?Sized>(&self, w: &mut W, max_size: u32) -> io::Result<()> {
        writeln!(w, "c ---------")?;
        writeln!(w, "c unitaries")?;
        writeln!(w, "c ---------")?;
        for &l in self.search.prop.vars.proved_at_lvl_0() {
            writeln!(w, "{} 0", self.outer_int(l))?;
        }

        writeln!(w, "c ---------------------------------------")?;
        writeln!(w, "c binary clauses of replaced equivalences")?;
        writeln!(w, "c ---------------------------------------")?;
        for (i, &r) in self.replacer.table.iter().enumerate() {
            let v = Var::from_idx(i as u32);
            if r.var() == v || self.search.prop.elimed[v] != Elimed::Replaced {
                continue;
            }
            let vl = Lit::new(v, true);
            writeln!(w, "{} {} 0", self.outer_int(!vl), self.outer_int(r))?;
            writeln!(w, "{} {} 0", self.outer_int(vl), self.outer_int(!r))?;
        }

        if max_size >= 2 {
            writeln!(w, "c --------------------------------")?;
            writeln!(w, "c learnt binary and ternary clauses")?;
            writeln!(w, "c --------------------------------")?;
            self.dump_implicit(w, true)?;
        }

        writeln!(w, "c -------------------")?;
        writeln!(w, "c learnt long clauses")?;
        writeln!(w, "c -------------------")?;
        for &cr in &self.search.prop.long_red {
            let c = self.search.prop.ca.get_ref(cr);
            if c.mark() == 1 || c.size() > max_size {
                continue;
            }
            for &l in c.lits() {
                write!(w, "{} ", self.outer_int(l))?;
            }
            writeln!(w, "0")?;
        }
        Ok(())
    }

    /// The recorded DRAT proof, if proof production is on.
    pub fn proof(&self) -> Option<&Proof> {
        self.proof.as_ref()
    }

    pub fn num_conflicts(&self) -> u64 {
        self.search.stats.conflicts
    }
    pub fn num_propagations(&self) -> u64 {
        self.search.prop.propagations
    }
    pub fn num_decisions(&self) -> u64 {
        self.search.stats.decisions
    }
    pub fn num_restarts(&self) -> u64 {
        self.search.stats.starts
    }

    /// Print statistics in the usual `c`-prefixed table.
    pub fn print_stats(&self) {
        println!("c restarts              : {}", self.search.stats.starts);
        println!("c conflicts             : {:<12}", self.search.stats.conflicts);
        println!(
            "c decisions             : {:<12}   ({:4.2} % random)",
            self.search.stats.decisions,
            self.search.stats.rnd_decisions as f32 * 100.0
                / self.search.stats.decisions.max(1) as f32
        );
        println!("c propagations          : {:<12}", self.search.prop.propagations);
        println!(
            "c conflict literals     : {:<12}   ({:4.2} % deleted)",
            self.search.stats.tot_literals,
            (self.search.stats.max_literals - self.search.stats.tot_literals) as f64 * 100.0
                / self.search.stats.max_literals.max(1) as f64
        );
        println!("c simplify rounds       : {}", self.num_simplify);
        println!("c clause cleanings      : {}", self.num_reduce_db);
        println!("c eq-literals found     : {}", self.stats_scc_found);
        println!("c vars replaced         : {}", self.replacer.replaced_vars);
        println!("c vars eliminated       : {}", self.elim.num_elimed);
        println!("c probe failed lits     : {}", self.probe.num_failed);
        println!("c probe both-same       : {}", self.probe.both_same);
        println!("c hyper-binaries added  : {}", self.probe.bin_added);
        println!("c useless bins removed  : {}", self.probe.useless_bin_removed);
        println!(
            "c 0-depth assigns       : {:<12}   ({:4.2} % vars)",
            self.search.prop.vars.proved_at_lvl_0().len(),
            self.search.prop.vars.proved_at_lvl_0().len() as f64 * 100.0
                / self.search.prop.num_vars().max(1) as f64
        );
    }
}

// the public library surface
impl<Cb: Callbacks> crate::interface::SolverInterface for Solver<Cb> {
    fn num_vars(&self) -> u32 {
        Solver::num_vars(self)
    }
    fn num_clauses(&self) -> u64 {
        let longs = self
            .search
            .prop
            .long_irred
            .iter()
            .filter(|&&cr| self.search.prop.ca.get_ref(cr).mark() != 1)
            .count() as u64;
        self.search.prop.irred_bins + self.search.prop.irred_tris + longs
    }
    fn num_conflicts(&self) -> u64 {
        Solver::num_conflicts(self)
    }
    fn num_propagations(&self) -> u64 {
        Solver::num_propagations(self)
    }
    fn num_decisions(&self) -> u64 {
        Solver::num_decisions(self)
    }
    fn num_restarts(&self) -> u64 {
        Solver::num_restarts(self)
    }

    fn is_ok(&self) -> bool {
        Solver::is_ok(self)
    }

    fn print_stats(&self) {
        Solver::print_stats(self)
    }

    fn new_var(&mut self, dvar: bool) -> Var {
        self.new_var_(dvar)
    }

    fn new_var_default(&mut self) -> Var {
        self.new_var_(true)
    }

    fn var_of_int(&mut self, v_idx: u32) -> Var {
        while v_idx >= self.num_vars() {
            self.new_var_(true);
        }
        let var = Var::from_idx(v_idx);
        debug_assert_eq!(var.idx(), v_idx);
        var
    }

    fn add_clause_reuse(&mut self, clause: &mut Vec<Lit>) -> bool {
        debug!("add toplevel clause {:?}", clause);
        self.add_clause_(clause)
    }

    fn simplify(&mut self) -> bool {
        Solver::simplify(self)
    }

    fn solve_limited(&mut self, assumps: &[Lit]) -> lbool {
        Solver::solve_limited(self, assumps)
    }

    fn set_need_to_interrupt(&self) {
        Solver::set_need_to_interrupt(self)
    }

    fn get_model(&self) -> &[lbool] {
        Solver::get_model(self)
    }

    fn value_var(&self, v: Var) -> lbool {
        Solver::value_var(self, v)
    }

    fn value_lit(&self, l: Lit) -> lbool {
        Solver::value_lit(self, l)
    }

    fn dump_irred_clauses(&self, w: &mut dyn Write) -> io::Result<()> {
        Solver::dump_irred_clauses(self, w)
    }

    fn dump_learnt_clauses(&self, w: &mut dyn Write, max_size: u32) -> io::Result<()> {
        Solver::dump_learnts(self, w, max_size)
    }
}
