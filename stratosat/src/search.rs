/*****************************************************************************************[search.rs]
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

//! CDCL search: decisions, first-UIP conflict analysis, backjumping and
//! glue-driven restarts.

use crate::callbacks::{Callbacks, ProgressStatus};
use crate::clause::{lbool, CRef, ClauseStats, Lit, VMap, Var};
use crate::config::SolverConf;
use crate::heap::ActivityHeap;
use crate::propagate::{Confl, PropEngine, Reason};
use crate::solver::Solver;
use std::mem;

/// A binary-implication dominator of a literal, used as a decision hint.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LitReachData {
    pub lit: Lit,
    pub degree: u32,
}

impl Default for LitReachData {
    fn default() -> Self {
        Self {
            lit: Lit::UNDEF,
            degree: 0,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct SearchStats {
    pub conflicts: u64,
    pub decisions: u64,
    pub rnd_decisions: u64,
    pub starts: u64,
    pub max_literals: u64,
    pub tot_literals: u64,
}

/// Search state layered on top of the propagation engine.
#[derive(Debug)]
pub(crate) struct Searcher {
    pub prop: PropEngine,

    /// A heuristic measurement of the activity of a variable.
    pub activity: VMap<f64>,
    /// Amount to bump next variable with.
    pub var_inc: f64,
    var_decay: f64,
    /// The preferred polarity of each variable (last phase).
    pub polarity: VMap<bool>,
    /// Declares if a variable is eligible for selection in the decision heuristic.
    pub decision: VMap<bool>,
    pub dec_vars: u64,
    /// A priority queue of variables ordered with respect to the variable activity.
    pub order_heap: ActivityHeap,
    /// Per-variable scratch flag; every user must restore it to all-false.
    pub seen: VMap<bool>,
    analyze_toclear: Vec<Lit>,
    minimize_stack: Vec<Lit>,
    tmp_reason: Vec<Lit>,

    // glue (LBD) computation
    level_stamp: Vec<u32>,
    stamp_gen: u32,

    // windowed glue averages driving restarts
    recent_glues: Vec<u32>,
    recent_pos: usize,
    recent_sum: u64,
    glue_window: usize,
    glue_ratio: f64,
    restart_min_confl: u64,
    pub total_glue_sum: u64,
    pub total_glue_cnt: u64,

    /// Binary-implication dominators, refreshed by the reachability pass.
    pub lit_reachable: Vec<LitReachData>,
    pub use_reach: bool,

    pub random_seed: f64,
    random_var_freq: f64,
    phase_saving: i32,
    ccmin_mode: i32,

    pub stats: SearchStats,
}

impl Searcher {
    pub fn new(conf: &SolverConf) -> Self {
        Self {
            prop: PropEngine::new(),
            activity: VMap::new(),
            var_inc: conf.var_inc_start,
            var_decay: conf.var_decay,
            polarity: VMap::new(),
            decision: VMap::new(),
            dec_vars: 0,
            order_heap: ActivityHeap::new(),
            seen: VMap::new(),
            analyze_toclear: vec![],
            minimize_stack: vec![],
            tmp_reason: vec![],
            level_stamp: vec![0],
            stamp_gen: 0,
            recent_glues: Vec::with_capacity(conf.restart_glue_window),
            recent_pos: 0,
            recent_sum: 0,
            glue_window: conf.restart_glue_window,
            glue_ratio: conf.restart_glue_ratio,
            restart_min_confl: conf.restart_min_confl,
            total_glue_sum: 0,
            total_glue_cnt: 0,
            lit_reachable: vec![],
            use_reach: false,
            random_seed: conf.orig_seed,
            random_var_freq: conf.random_var_freq,
            phase_saving: conf.phase_saving,
            ccmin_mode: conf.ccmin_mode,
            stats: SearchStats::default(),
        }
    }

    pub fn new_var(&mut self, dvar: bool) -> Var {
        let v = self.prop.new_var_core();
        self.activity.push(0.0);
        self.polarity.push(false);
        self.decision.push(false);
        self.seen.push(false);
        self.level_stamp.push(0);
        self.lit_reachable.push(LitReachData::default());
        self.lit_reachable.push(LitReachData::default());
        self.set_decision_var(v, dvar);
        v
    }

    pub fn set_decision_var(&mut self, v: Var, b: bool) {
        if b && !self.decision[v] {
            self.dec_vars += 1;
        } else if !b && self.decision[v] {
            self.dec_vars -= 1;
        }
        self.decision[v] = b;
        self.insert_var_order(v);
    }

    pub fn insert_var_order(&mut self, x: Var) {
        if !self.order_heap.in_heap(x) && self.decision[x] && self.prop.var_usable(x) {
            self.order_heap.insert(x, self.activity[x]);
        }
    }

    pub fn rebuild_order_heap(&mut self) {
        let mut vs = vec![];
        for v in (0..self.prop.num_vars()).map(Var::from_idx) {
            if self.decision[v] && self.prop.var_usable(v) {
                vs.push(v);
            }
        }
        let activity = &self.activity;
        self.order_heap.build(&vs, |v| activity[v]);
    }

    pub fn var_decay_activity(&mut self) {
        self.var_inc *= 1.0 / self.var_decay;
    }

    /// Increase a variable with the current 'bump' value.
    pub fn var_bump_activity(&mut self, v: Var) {
        self.activity[v] += self.var_inc;
        if self.activity[v] > 1e100 {
            // Rescale:
            for (_, x) in self.activity.iter_mut() {
                *x *= 1e-100;
            }
            self.var_inc *= 1e-100;
            self.order_heap.rescale(1e-100);
        }

        // Update order_heap with respect to new activity:
        if self.order_heap.in_heap(v) {
            self.order_heap.update(v, self.activity[v]);
        }
    }

    /// Revert to the state at given level (keeping all assignment at `level` but not beyond).
    pub fn cancel_until(&mut self, level: u32) {
        if self.prop.decision_level() <= level {
            return;
        }
        let trail_lim_last = *self
            .prop
            .vars
            .trail_lim
            .last()
            .expect("trail_lim is empty") as usize;
        let trail_lim_level = self.prop.vars.trail_lim[level as usize] as usize;
        let trail_len = self.prop.vars.trail.len();
        for c in (trail_lim_level..trail_len).rev() {
            let p = self.prop.vars.trail[c];
            let x = p.var();
            self.prop.vars.assigns[x] = lbool::UNDEF;
            if self.phase_saving > 1 || (self.phase_saving == 1 && c > trail_lim_last) {
                self.polarity[x] = p.sign();
            }
            self.insert_var_order(x);
        }
        self.prop.qhead = trail_lim_level;
        self.prop.vars.trail.truncate(trail_lim_level);
        self.prop.vars.trail_lim.truncate(level as usize);
    }

    /// Pick a literal to make a decision with.
    pub fn pick_branch_lit(&mut self) -> Lit {
        let mut next = Var::UNDEF;

        // Random decision:
        if utils::drand(&mut self.random_seed) < self.random_var_freq
            && !self.order_heap.is_empty()
        {
            let idx_tmp =
                utils::irand(&mut self.random_seed, self.order_heap.len() as i32) as usize;
            next = self.order_heap.at(idx_tmp);
            if self.prop.var_usable(next) && self.decision[next] {
                self.stats.rnd_decisions += 1;
            }
        }

        // Activity based decision:
        while next == Var::UNDEF || !self.prop.var_usable(next) || !self.decision[next] {
            match self.order_heap.pop_max() {
                None => {
                    next = Var::UNDEF;
                    break;
                }
                Some(v) => next = v,
            }
        }

        if next == Var::UNDEF {
            return Lit::UNDEF;
        }

        let lit = Lit::new(next, self.polarity[next]);

        // Prefer the binary-implication dominator of the chosen literal: it
        // propagates this literal and usually many more.
        if self.use_reach {
            let dom = self.lit_reachable[lit.idx() as usize].lit;
            if dom != Lit::UNDEF && self.prop.var_usable(dom.var()) && self.decision[dom.var()] {
                // the popped variable stays reachable in case the cached
                // implication no longer fires
                self.insert_var_order(next);
                return dom;
            }
        }
        lit
    }

    /// Rough share of the search space already covered, weighted by the
    /// depth at which variables were assigned.
    pub fn progress_estimate(&self) -> f64 {
        let n = self.prop.num_vars() as f64;
        if n == 0.0 {
            return 1.0;
        }
        let f = 1.0 / n;
        let mut progress = 0.0;
        for i in 0..=self.prop.decision_level() {
            let beg: i32 = if i == 0 {
                0
            } else {
                self.prop.vars.trail_lim[i as usize - 1]
            };
            let end: i32 = if i == self.prop.decision_level() {
                self.prop.vars.trail.len() as i32
            } else {
                self.prop.vars.trail_lim[i as usize]
            };
            progress += f64::powi(f, i as i32) * (end - beg) as f64;
        }
        progress / n
    }

    // ---- glue bookkeeping ----

    /// Number of distinct decision levels among `lits`.
    pub fn calc_glue(&mut self, lits: &[Lit]) -> u32 {
        self.stamp_gen += 1;
        let gen = self.stamp_gen;
        let mut glue = 0;
        for &l in lits {
            let lvl = self.prop.vars.level(l.var()) as usize;
            if self.level_stamp[lvl] != gen {
                self.level_stamp[lvl] = gen;
                glue += 1;
            }
        }
        glue
    }

    pub fn note_learnt_glue(&mut self, glue: u32) {
        self.total_glue_sum += glue as u64;
        self.total_glue_cnt += 1;
        if self.recent_glues.len() < self.glue_window {
            self.recent_glues.push(glue);
            self.recent_sum += glue as u64;
        } else {
            self.recent_sum -= self.recent_glues[self.recent_pos] as u64;
            self.recent_glues[self.recent_pos] = glue;
            self.recent_sum += glue as u64;
            self.recent_pos = (self.recent_pos + 1) % self.glue_window;
        }
    }

    pub fn clear_recent_glues(&mut self) {
        self.recent_glues.clear();
        self.recent_pos = 0;
        self.recent_sum = 0;
    }

    /// Restart when the short-window glue average exceeds the long-run
    /// average by the configured ratio.
    pub fn should_restart(&self, conflict_c: u64) -> bool {
        conflict_c >= self.restart_min_confl
            && self.recent_glues.len() == self.glue_window
            && self.total_glue_cnt > 0
            && (self.recent_sum as f64 / self.glue_window as f64)
                > self.glue_ratio * (self.total_glue_sum as f64 / self.total_glue_cnt as f64)
    }

    // ---- conflict analysis ----

    /// Analyze a conflict and produce a learnt clause.
    ///
    /// Pre-conditions: decision level > 0, the conflict clause is false in
    /// the current trail.
    ///
    /// Post-conditions: `out_learnt[0]` is the asserting literal, the
    /// returned level is where it becomes unit, and the returned glue is
    /// the clause's literal block distance.
    pub fn analyze(&mut self, confl: Confl, out_learnt: &mut Vec<Lit>) -> (i32, u32) {
        debug_assert!(self.prop.decision_level() > 0);
        out_learnt.clear();
        out_learnt.push(Lit::UNDEF); // leave room for the asserting literal

        let conflict_level = self.prop.decision_level() as i32;
        let mut path_c: i32 = 0;
        let mut p = Lit::UNDEF;
        let mut index = self.prop.vars.trail.len();
        let mut first = true;

        loop {
            // gather the literals to resolve with
            let mut tmp = mem::take(&mut self.tmp_reason);
            tmp.clear();
            if first {
                self.prop.confl_lits(&confl, &mut tmp);
                if let Confl::Long(cr) = confl {
                    self.prop.ca.stats_mut(cr).used_uip += 1;
                }
            } else {
                match self.prop.vars.reason(p.var()) {
                    Reason::Decision => {
                        panic!("analyze: reached a decision literal {:?}", p)
                    }
                    Reason::Bin(o) => tmp.push(o),
                    Reason::Tri(a, b) => {
                        tmp.push(a);
                        tmp.push(b);
                    }
                    Reason::Long(cr) => {
                        {
                            let c = self.prop.ca.get_ref(cr);
                            debug_assert_eq!(c[0].var(), p.var());
                            tmp.extend_from_slice(&c.lits()[1..]);
                        }
                        self.prop.ca.stats_mut(cr).used_uip += 1;
                    }
                }
            }

            for &q in tmp.iter() {
                let v = q.var();
                let lvl = self.prop.vars.level(v);
                debug_assert!(lvl <= conflict_level);
                if !self.seen[v] && lvl > 0 {
                    self.var_bump_activity(v);
                    self.seen[v] = true;
                    if lvl == conflict_level {
                        path_c += 1;
                    } else {
                        out_learnt.push(q);
                    }
                }
            }
            self.tmp_reason = tmp;
            first = false;

            // Select next literal in the trail to look at:
            while !self.seen[self.prop.vars.trail[index - 1].var()] {
                index -= 1;
            }
            p = self.prop.vars.trail[index - 1];
            index -= 1;
            self.seen[p.var()] = false;
            path_c -= 1;

            if path_c <= 0 {
                break;
            }
        }

        debug_assert_ne!(p, Lit::UNDEF);
        out_learnt[0] = !p;

        self.stats.max_literals += out_learnt.len() as u64;
        self.minimize_conflict(out_learnt);
        self.stats.tot_literals += out_learnt.len() as u64;

        let glue = self.calc_glue(out_learnt);

        // Find correct backtrack level:
        let btlevel = if out_learnt.len() == 1 {
            0
        } else {
            let mut max_i = 1;
            let mut max_level = self.prop.vars.level(out_learnt[max_i].var());
            // Find the first literal assigned at the next-highest level:
            for i in 2..out_learnt.len() {
                let level = self.prop.vars.level(out_learnt[i].var());
                if level > max_level {
                    max_i = i;
                    max_level = level;
                }
            }
            // Swap-in this literal at index 1:
            out_learnt.swap(max_i, 1);
            max_level
        };

        for i in 0..self.analyze_toclear.len() {
            let v = self.analyze_toclear[i].var();
            self.seen[v] = false; // (`seen[]` is now cleared)
        }
        self.analyze_toclear.clear();
        debug_assert!(out_learnt
            .iter()
            .all(|&l| self.prop.vars.value_lit(l) == lbool::FALSE));
        debug_assert!(self.check_seen_clear());

        (btlevel, glue)
    }

    fn check_seen_clear(&self) -> bool {
        self.seen.iter().all(|(_, &s)| !s)
    }

    /// An abstraction of the level of a variable
    #[inline]
    fn abstract_level(&self, v: Var) -> u32 {
        1 << (self.prop.vars.level(v) & 31)
    }

    fn minimize_conflict(&mut self, out_learnt: &mut Vec<Lit>) {
        // Simplify conflict clause:
        self.analyze_toclear.clear();
        self.analyze_toclear.extend_from_slice(&out_learnt);
        let new_size = if self.ccmin_mode == 2 {
            let mut abstract_levels = 0;
            for a in out_learnt[1..].iter() {
                abstract_levels |= self.abstract_level(a.var())
            }

            let mut j = 1;
            for i in 1..out_learnt.len() {
                let lit = out_learnt[i];
                // can eliminate `lit` only if it's redundant *and* not a decision
                if self.prop.vars.reason(lit.var()) == Reason::Decision
                    || !self.lit_redundant(lit, abstract_levels)
                {
                    out_learnt[j] = lit;
                    j += 1;
                }
            }
            j
        } else if self.ccmin_mode == 1 {
            let mut j = 1;
            for i in 1..out_learnt.len() {
                let lit = out_learnt[i];
                let x = lit.var();

                let retain = match self.prop.vars.reason(x) {
                    Reason::Decision => true,
                    Reason::Bin(o) => {
                        let v = o.var();
                        !self.seen[v] && self.prop.vars.level(v) > 0
                    }
                    Reason::Tri(a, b) => [a, b].iter().any(|l| {
                        let v = l.var();
                        !self.seen[v] && self.prop.vars.level(v) > 0
                    }),
                    Reason::Long(cr) => {
                        let c = self.prop.ca.get_ref(cr);
                        c.lits()[1..].iter().any(|l| {
                            let v = l.var();
                            !self.seen[v] && self.prop.vars.level(v) > 0
                        })
                    }
                };
                if retain {
                    out_learnt[j] = lit;
                    j += 1;
                }
            }
            j
        } else {
            out_learnt.len()
        };

        debug_assert!(new_size <= out_learnt.len());
        out_learnt.truncate(new_size);
    }

    /// Check if `p` can be removed from the conflict clause: it can when it
    /// is implied by other literals of the clause through reasons whose
    /// levels all appear in the clause.
    fn lit_redundant(&mut self, p: Lit, abstract_levels: u32) -> bool {
        self.minimize_stack.clear();
        self.minimize_stack.push(p);

        let top = self.analyze_toclear.len();

        while self.minimize_stack.len() > 0 {
            let q = *self.minimize_stack.last().unwrap();
            debug_assert!(self.prop.vars.reason(q.var()) != Reason::Decision);
            self.minimize_stack.pop();

            let mut tmp = mem::take(&mut self.tmp_reason);
            tmp.clear();
            match self.prop.vars.reason(q.var()) {
                Reason::Decision => unreachable!(),
                Reason::Bin(o) => tmp.push(o),
                Reason::Tri(a, b) => {
                    tmp.push(a);
                    tmp.push(b);
                }
                Reason::Long(cr) => {
                    let c = self.prop.ca.get_ref(cr);
                    tmp.extend_from_slice(&c.lits()[1..]);
                }
            }

            let mut failed = false;
            for &l in tmp.iter() {
                let v = l.var();
                // Variable at level 0 or already marked: just skip
                if self.prop.vars.level(v) == 0 || self.seen[v] {
                    continue;
                }

                if self.prop.vars.reason(v) != Reason::Decision
                    && (self.abstract_level(v) & abstract_levels) != 0
                {
                    self.seen[v] = true;
                    self.minimize_stack.push(l);
                    self.analyze_toclear.push(l);
                } else {
                    // cannot remove `l`, cancel
                    failed = true;
                    break;
                }
            }
            self.tmp_reason = tmp;

            if failed {
                for a in self.analyze_toclear[top..].iter() {
                    self.seen[a.var()] = false;
                }
                self.analyze_toclear.truncate(top);
                return false;
            }
        }

        true
    }
}

// the search loop itself, driven by the composition root
impl<Cb: Callbacks> Solver<Cb> {
    /// Search until SAT, UNSAT, or `nof_conflicts` conflicts happened in
    /// this burst.
    ///
    /// Returns `lbool::TRUE` for a model, `lbool::FALSE` for unsatisfiable
    /// (under assumptions), `lbool::UNDEF` when the budget is exhausted or
    /// an interrupt was requested.
    pub(crate) fn search(&mut self, nof_conflicts: u64) -> lbool {
        debug_assert!(self.search.prop.ok);
        let mut conflict_c: u64 = 0;
        self.search.stats.starts += 1;
        self.search.clear_recent_glues();
        let mut tmp_learnt: Vec<Lit> = vec![];

        loop {
            let confl = self.search.prop.propagate();

            if let Some(confl) = confl {
                // conflict analysis
                self.search.stats.conflicts += 1;
                conflict_c += 1;
                if self.search.prop.decision_level() == 0 {
                    self.search.prop.ok = false;
                    return lbool::FALSE;
                }

                let (btlevel, glue) = self.search.analyze(confl, &mut tmp_learnt);
                self.add_learnt_and_backtrack(&tmp_learnt, btlevel, glue);
                self.search.var_decay_activity();
                self.search.note_learnt_glue(glue);
            } else {
                // no conflict
                if conflict_c >= nof_conflicts || !self.within_budget() {
                    // Reached bound on number of conflicts:
                    self.search.cancel_until(0);
                    return lbool::UNDEF;
                }

                if self.search.should_restart(conflict_c) {
                    debug!("search.restart after {} conflicts", conflict_c);
                    let st = self.progress_status();
                    self.cb.on_progress(&st);
                    self.cb.on_restart();
                    self.search.clear_recent_glues();
                    self.search.cancel_until(0);
                    continue;
                }

                // select the next decision (using assumptions, or variable heap)
                let mut next = Lit::UNDEF;
                while (self.search.prop.decision_level() as usize) < self.assumptions.len() {
                    // Perform user provided assumption:
                    let p = self.assumptions[self.search.prop.decision_level() as usize];
                    let v = self.search.prop.value_lit(p);
                    if v == lbool::TRUE {
                        // Dummy decision level, since `p` is true already:
                        self.search.prop.vars.new_decision_level();
                    } else if v == lbool::FALSE {
                        // conflicting assumptions, unsat under them
                        return lbool::FALSE;
                    } else {
                        next = p;
                        break;
                    }
                }

                if next == Lit::UNDEF {
                    // new variable decision:
                    next = self.search.pick_branch_lit();

                    if next == Lit::UNDEF {
                        // every decision variable is assigned: model found
                        return lbool::TRUE;
                    }
                    self.search.stats.decisions += 1;
                }

                debug_assert_ne!(next, Lit::UNDEF);
                debug_assert_eq!(self.search.prop.value_lit(next), lbool::UNDEF);
                self.search.prop.vars.new_decision_level();
                self.search.prop.vars.unchecked_enqueue(next, Reason::Decision);
            }
        }
    }

    /// A snapshot of the clause database and search progress for the
    /// callbacks.
    fn progress_status(&self) -> ProgressStatus {
        let prop = &self.search.prop;
        let longs_irred = prop
            .long_irred
            .iter()
            .filter(|&&cr| prop.ca.get_ref(cr).mark() != 1)
            .count() as u64;
        let longs_red = prop
            .long_red
            .iter()
            .filter(|&&cr| prop.ca.get_ref(cr).mark() != 1)
            .count() as u64;
        let n_learnt = prop.red_bins + prop.red_tris + longs_red;
        ProgressStatus {
            conflicts: self.search.stats.conflicts,
            dec_vars: self.num_free_vars(),
            n_clauses: prop.irred_bins + prop.irred_tris + longs_irred,
            n_clause_lits: prop.irred_lits,
            n_learnt,
            n_learnt_lits: if n_learnt > 0 {
                prop.red_lits as f64 / n_learnt as f64
            } else {
                0.0
            },
            progress_estimate: self.search.progress_estimate() * 100.0,
        }
    }

    /// Attach the learnt clause produced by `analyze`, after backjumping,
    /// and propagate its asserting literal.
    fn add_learnt_and_backtrack(&mut self, learnt: &[Lit], btlevel: i32, glue: u32) {
        self.cb.on_new_clause(learnt, true);
        if let Some(proof) = self.proof.as_mut() {
            proof.create_clause(learnt);
        }
        self.search.cancel_until(btlevel as u32);

        match learnt.len() {
            0 => {
                self.search.prop.ok = false;
            }
            1 => {
                // unit: directly propagate at level 0
                self.search
                    .prop
                    .vars
                    .unchecked_enqueue(learnt[0], Reason::Decision);
            }
            2 => {
                self.search.prop.attach_bin(learnt[0], learnt[1], true);
                self.search
                    .prop
                    .vars
                    .unchecked_enqueue(learnt[0], Reason::Bin(learnt[1]));
            }
            3 => {
                self.search
                    .prop
                    .attach_tri(learnt[0], learnt[1], learnt[2], true);
                self.search
                    .prop
                    .vars
                    .unchecked_enqueue(learnt[0], Reason::Tri(learnt[1], learnt[2]));
            }
            _ => {
                let stats = ClauseStats {
                    glue,
                    ..ClauseStats::new(self.search.stats.conflicts)
                };
                let cr: CRef = self.search.prop.ca.alloc(learnt, true, stats);
                self.search.prop.long_red.push(cr);
                self.search.prop.attach_long(cr);
                self.search
                    .prop
                    .vars
                    .unchecked_enqueue(learnt[0], Reason::Long(cr));
            }
        }
    }
}

pub(crate) mod utils {
    /// Generate a random double:
    pub(crate) fn drand(seed: &mut f64) -> f64 {
        *seed *= 1389796.0;
        let q = (*seed / 2147483647.0) as i32;
        *seed -= q as f64 * 2147483647.0;
        return *seed / 2147483647.0;
    }

    /// Generate a random integer:
    pub(crate) fn irand(seed: &mut f64, size: i32) -> i32 {
        (drand(seed) * size as f64) as i32
    }
}
