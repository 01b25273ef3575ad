//! Failed-literal probing.
//!
//! Both polarities of every candidate variable are assigned and propagated
//! in turn. A conflicting probe fixes the opposite literal; a variable that
//! takes the same value under both probes is implied outright; one that
//! takes opposite values is equivalent (up to sign) to the probed variable.
//! Alongside, hyper-binary resolution adds shortcut binaries for literals
//! reached only through long chains, and binaries subsumed by binary chains
//! are dropped.

use crate::callbacks::Callbacks;
use crate::clause::{lbool, Lit, Var};
use crate::maps::IntMapBool;
use crate::propagate::Reason;
use crate::replace::MergeOutcome;
use crate::search::utils;
use crate::solver::Solver;

/// Propagation budget of the useless-binary sweep.
const USELESS_BIN_PROP_BUDGET: u64 = 3_000_000;

#[derive(Debug)]
pub(crate) struct ProbeState {
    pub finished_last_time: bool,
    pub last_went_until: u32,
    pub num_props_multiplier: f64,
    pub last_time_found_truths: u64,
    pub num_calls: u64,

    // scratch, reset sparsely between probes
    propagated: IntMapBool<Var>,
    prop_value: IntMapBool<Var>,
    set_vars: Vec<Var>,
    cand: IntMapBool<Var>,
    cand_vars: Vec<Var>,
    one_hop: IntMapBool<Lit>,
    lit_degrees: Vec<u32>,

    // statistics
    pub num_failed: u64,
    pub both_same: u64,
    pub bin_added: u64,
    pub useless_bin_removed: u64,
}

impl ProbeState {
    pub fn new() -> Self {
        Self {
            finished_last_time: true,
            last_went_until: 0,
            num_props_multiplier: 1.0,
            last_time_found_truths: 0,
            num_calls: 0,
            propagated: IntMapBool::new(),
            prop_value: IntMapBool::new(),
            set_vars: vec![],
            cand: IntMapBool::new(),
            cand_vars: vec![],
            one_hop: IntMapBool::new(),
            lit_degrees: vec![],
            num_failed: 0,
            both_same: 0,
            bin_added: 0,
            useless_bin_removed: 0,
        }
    }

    fn reserve(&mut self, n_vars: u32) {
        self.propagated.grow_to(n_vars as usize);
        self.prop_value.grow_to(n_vars as usize);
        self.cand.grow_to(n_vars as usize);
        self.one_hop.grow_to(n_vars as usize * 2);
        self.lit_degrees.clear();
        self.lit_degrees.resize(n_vars as usize * 2, 0);
    }

    fn clear_propagated(&mut self) {
        for &v in &self.set_vars {
            self.propagated.set(v, false);
        }
        self.set_vars.clear();
    }

    fn clear_cand(&mut self) {
        for &v in &self.cand_vars {
            self.cand.set(v, false);
        }
        self.cand_vars.clear();
    }
}

impl<Cb: Callbacks> Solver<Cb> {
    /// One probing round over the unassigned decision variables, bounded by
    /// a propagation budget that grows when past rounds were productive.
    pub(crate) fn probe(&mut self) -> bool {
        debug_assert_eq!(self.search.prop.decision_level(), 0);
        if !self.search.prop.ok {
            return false;
        }
        let n_vars = self.search.prop.num_vars();
        self.probe.num_calls += 1;
        self.probe.reserve(n_vars);

        // Saving solver heuristics; restored whatever happens below.
        let backup_activity = self.search.activity.clone();
        let backup_polarity = self.search.polarity.clone();
        let backup_var_inc = self.search.var_inc;

        // If probing is going well, do successively more and more of it.
        let productive = self.probe.last_time_found_truths > 500
            || self.probe.last_time_found_truths as f64 > n_vars as f64 * 0.03;
        self.probe.num_props_multiplier = if productive {
            (self.probe.num_props_multiplier * 1.7).max(5.0)
        } else {
            1.0
        };
        let num_props =
            (self.conf.probe_prop_budget as f64 * self.probe.num_props_multiplier) as u64;

        let orig_trail_size = self.search.prop.vars.trail.len();

        let mut ok = self.order_lits();
        let orig_props = self.search.prop.propagations;
        let max_hyper_props = num_props / 5;
        let mut hyper_props = 0u64;

        if ok {
            let from = if self.probe.finished_last_time || self.probe.last_went_until >= n_vars {
                0
            } else {
                self.probe.last_went_until
            };
            self.probe.finished_last_time = true;
            self.probe.last_went_until = n_vars;

            for vi in from..n_vars {
                let v = Var::from_idx(vi);
                if !self.search.prop.var_usable(v) || !self.search.decision[v] {
                    continue;
                }
                if self.interrupt_requested() {
                    break;
                }
                if self.search.prop.propagations - orig_props >= num_props {
                    self.probe.finished_last_time = false;
                    self.probe.last_went_until = vi;
                    break;
                }
                if !self.try_both(
                    Lit::new(v, true),
                    Lit::new(v, false),
                    &mut hyper_props,
                    max_hyper_props,
                ) {
                    ok = false;
                    break;
                }
            }
        }

        if ok && self.conf.do_rem_useless_bins && !self.interrupt_requested() {
            ok = self.remove_useless_bins();
        }

        self.probe.last_time_found_truths =
            (self.search.prop.vars.trail.len() - orig_trail_size) as u64;

        // Restore heuristics.
        self.search.activity = backup_activity;
        self.search.polarity = backup_polarity;
        self.search.var_inc = backup_var_inc;
        self.search.rebuild_order_heap();

        debug!(
            "probe: failed {} both-same {} hyper-bins {} (found {} truths)",
            self.probe.num_failed,
            self.probe.both_same,
            self.probe.bin_added,
            self.probe.last_time_found_truths
        );
        debug_assert!(ok == self.search.prop.ok);
        ok
    }

    /// Probe both polarities of one variable.
    fn try_both(
        &mut self,
        lit1: Lit,
        lit2: Lit,
        hyper_props: &mut u64,
        max_hyper_props: u64,
    ) -> bool {
        debug_assert_eq!(lit1, !lit2);
        self.probe.clear_propagated();
        self.probe.clear_cand();
        let mut both_same: Vec<Lit> = vec![];

        // first polarity
        self.search.prop.vars.new_decision_level();
        self.search.prop.vars.unchecked_enqueue(lit1, Reason::Decision);
        let failed = self.search.prop.propagate().is_some();
        if failed {
            self.search.cancel_until(0);
            self.probe.num_failed += 1;
            self.search
                .prop
                .vars
                .unchecked_enqueue(!lit1, Reason::Decision);
            self.search.prop.ok = self.search.prop.propagate().is_none();
            return self.search.prop.ok;
        }
        {
            let lim = self.search.prop.vars.trail_lim[0] as usize;
            for c in (lim..self.search.prop.vars.trail.len()).rev() {
                let l = self.search.prop.vars.trail[c];
                let x = l.var();
                self.probe.propagated.set(x, true);
                self.probe.set_vars.push(x);
                self.probe.prop_value.set(x, l.sign());
                self.probe.cand.set(x, true);
                self.probe.cand_vars.push(x);
            }
        }
        self.search.cancel_until(0);

        if *hyper_props < max_hyper_props {
            if !self.add_bin_clauses(lit1, hyper_props) {
                return false;
            }
        } else {
            self.probe.clear_cand();
        }

        // second polarity
        self.search.prop.vars.new_decision_level();
        self.search.prop.vars.unchecked_enqueue(lit2, Reason::Decision);
        let failed = self.search.prop.propagate().is_some();
        if failed {
            self.search.cancel_until(0);
            self.probe.num_failed += 1;
            self.search
                .prop
                .vars
                .unchecked_enqueue(!lit2, Reason::Decision);
            self.search.prop.ok = self.search.prop.propagate().is_none();
            return self.search.prop.ok;
        }
        {
            let lim = self.search.prop.vars.trail_lim[0] as usize;
            for c in (lim..self.search.prop.vars.trail.len()).rev() {
                let l = self.search.prop.vars.trail[c];
                let x = l.var();
                if self.probe.propagated[x] {
                    self.probe.cand.set(x, true);
                    self.probe.cand_vars.push(x);
                    if self.probe.prop_value[x] == l.sign() {
                        // same value under both probes: implied outright
                        if x != lit1.var() {
                            both_same.push(l);
                        }
                    } else if c != lim {
                        // opposite values: x is equivalent to the probed
                        // variable (up to sign)
                        let b1 = self.probe.prop_value[x];
                        let r = lit1 ^ !b1;
                        match self.replacer.merge(x, r) {
                            MergeOutcome::Contradiction => {
                                self.search.prop.ok = false;
                                self.search.cancel_until(0);
                                return false;
                            }
                            _ => (),
                        }
                    }
                }
                self.probe.prop_value.set(x, l.sign());
            }
        }
        self.search.cancel_until(0);

        if *hyper_props < max_hyper_props {
            if !self.add_bin_clauses(lit2, hyper_props) {
                return false;
            }
        } else {
            self.probe.clear_cand();
        }

        for &l in &both_same {
            let v = self.search.prop.value_lit(l);
            if v == lbool::FALSE {
                self.search.prop.ok = false;
                return false;
            }
            if v == lbool::UNDEF {
                self.search.prop.vars.unchecked_enqueue(l, Reason::Decision);
            }
        }
        self.probe.both_same += both_same.len() as u64;
        self.search.prop.ok = self.search.prop.propagate().is_none();
        self.search.prop.ok
    }

    /// Hyper-binary resolution for one probed literal. The candidate set
    /// holds the variables reached by the full propagation; variables also
    /// reachable through binaries alone need no shortcut. The remaining
    /// ones get a binary from a high-degree binary-reachable literal that
    /// implies them.
    fn add_bin_clauses(&mut self, lit: Lit, hyper_props: &mut u64) -> bool {
        let old_props = self.search.prop.propagations;

        // binary-reachable part of the propagation
        self.search.prop.vars.new_decision_level();
        self.search.prop.vars.unchecked_enqueue(lit, Reason::Decision);
        let failed = self.search.prop.propagate_bins_only(false).is_some();
        if failed {
            // the literal fails on binaries alone; handled like a failed probe
            self.search.cancel_until(0);
            self.probe.num_failed += 1;
            self.search.prop.vars.unchecked_enqueue(!lit, Reason::Decision);
            self.search.prop.ok = self.search.prop.propagate().is_none();
            self.probe.clear_cand();
            return self.search.prop.ok;
        }
        let mut to_visit: Vec<Lit> = vec![];
        {
            let lim = self.search.prop.vars.trail_lim[0] as usize;
            for c in (lim..self.search.prop.vars.trail.len()).rev() {
                let l = self.search.prop.vars.trail[c];
                self.probe.cand.set(l.var(), false);
                to_visit.push(l);
            }
        }
        self.search.cancel_until(0);

        let degrees = &self.probe.lit_degrees;
        to_visit.sort_unstable_by(|a, b| {
            degrees[b.idx() as usize].cmp(&degrees[a.idx() as usize])
        });

        let mut implied: Vec<(Var, bool)> = vec![];
        for &l in &to_visit {
            if !self.probe.cand_vars.iter().any(|&x| self.probe.cand[x]) {
                break;
            }
            if self.search.prop.value_lit(l) != lbool::UNDEF {
                continue; // fixed by an earlier failed candidate
            }
            // everything the candidate literal implies by full propagation
            self.search.prop.vars.new_decision_level();
            self.search.prop.vars.unchecked_enqueue(l, Reason::Decision);
            let failed = self.search.prop.propagate().is_some();
            implied.clear();
            {
                let lim = self.search.prop.vars.trail_lim[0] as usize;
                for c in lim + 1..self.search.prop.vars.trail.len() {
                    let q = self.search.prop.vars.trail[c];
                    implied.push((q.var(), q.sign()));
                }
            }
            self.search.cancel_until(0);
            if failed {
                self.probe.num_failed += 1;
                self.search.prop.vars.unchecked_enqueue(!l, Reason::Decision);
                self.search.prop.ok = self.search.prop.propagate().is_none();
                if !self.search.prop.ok {
                    self.probe.clear_cand();
                    return false;
                }
                continue;
            }

            let mut added = false;
            for &(x, val) in &implied {
                if self.probe.cand[x] {
                    // shortcut binary: l implies x
                    self.search.prop.attach_bin(!l, Lit::new(x, val), true);
                    self.probe.bin_added += 1;
                    added = true;
                    break;
                }
            }
            if added {
                for &(x, _) in &implied {
                    self.probe.cand.set(x, false);
                }
            }
        }

        self.probe.clear_cand();
        *hyper_props += self.search.prop.propagations - old_props;
        true
    }

    /// Probe random literals over the binary graph only, counting how often
    /// each literal is set: its degree. High-degree literals are visited
    /// first during hyper-binary resolution so that one shortcut subsumes
    /// many chains.
    fn order_lits(&mut self) -> bool {
        let old_props = self.search.prop.propagations;
        let budget = self.conf.order_lits_prop_budget;

        for _ in 0..1_000_000u32 {
            if self.search.prop.propagations - old_props > budget {
                break;
            }
            if self.search.order_heap.is_empty() {
                break;
            }
            let idx = utils::irand(
                &mut self.search.random_seed,
                self.search.order_heap.len() as i32,
            ) as usize;
            let v = self.search.order_heap.at(idx);
            if !self.search.prop.var_usable(v) || !self.search.decision[v] {
                continue;
            }
            let rand_lit = Lit::new(v, utils::irand(&mut self.search.random_seed, 2) == 0);

            self.search.prop.vars.new_decision_level();
            self.search
                .prop
                .vars
                .unchecked_enqueue(rand_lit, Reason::Decision);
            let failed = self.search.prop.propagate_bins_only(false).is_some();
            if failed {
                self.search.cancel_until(0);
                self.search
                    .prop
                    .vars
                    .unchecked_enqueue(!rand_lit, Reason::Decision);
                self.search.prop.ok = self.search.prop.propagate().is_none();
                if !self.search.prop.ok {
                    return false;
                }
                continue;
            }
            {
                let lim = self.search.prop.vars.trail_lim[0] as usize;
                for c in lim + 1..self.search.prop.vars.trail.len() {
                    let l = self.search.prop.vars.trail[c];
                    self.probe.lit_degrees[l.idx() as usize] += 1;
                }
            }
            self.search.cancel_until(0);
        }

        // degree probing is bookkeeping, not search work
        self.search.prop.propagations = old_props;
        true
    }

    /// Remove binaries implied by a two-step binary chain: with irredundant
    /// binaries `l → m` and `m → n`, a direct binary `l → n` is redundant.
    fn remove_useless_bins(&mut self) -> bool {
        debug_assert_eq!(self.search.prop.decision_level(), 0);
        let old_props = self.search.prop.propagations;
        let n_vars = self.search.prop.num_vars();

        for vi in 0..n_vars {
            if self.search.prop.propagations - old_props > USELESS_BIN_PROP_BUDGET {
                break;
            }
            let v = Var::from_idx(vi);
            if !self.search.prop.var_usable(v) || !self.search.decision[v] {
                continue;
            }
            for &sign in [true, false].iter() {
                let lit = Lit::new(v, sign);
                if self.search.prop.value_lit(lit) != lbool::UNDEF {
                    break; // fixed meanwhile
                }
                if !self.remove_useless_bins_from(lit) {
                    // `lit` failed through binaries alone
                    self.search.cancel_until(0);
                    self.search.prop.vars.unchecked_enqueue(!lit, Reason::Decision);
                    self.search.prop.ok = self.search.prop.propagate().is_none();
                    if !self.search.prop.ok {
                        return false;
                    }
                    break;
                }
            }
        }
        true
    }

    /// Returns `false` iff `lit` turned out to be a failed literal.
    fn remove_useless_bins_from(&mut self, lit: Lit) -> bool {
        self.search.prop.vars.new_decision_level();
        self.search.prop.vars.unchecked_enqueue(lit, Reason::Decision);
        if self.search.prop.propagate_bin_one_level(true).is_some() {
            self.search.cancel_until(0);
            return false;
        }

        let mut one_hop: Vec<Lit> = vec![];
        {
            let lim = self.search.prop.vars.trail_lim[0] as usize;
            for c in lim + 1..self.search.prop.vars.trail.len() {
                let l = self.search.prop.vars.trail[c];
                self.probe.one_hop.set(l, true);
                one_hop.push(l);
            }
        }
        self.search.cancel_until(0);

        let mut wrong: Vec<Lit> = vec![];
        for i in 0..one_hop.len() {
            let m = one_hop[i];
            if self.search.prop.value_lit(m) != lbool::UNDEF {
                continue;
            }
            self.search.prop.vars.new_decision_level();
            self.search.prop.vars.unchecked_enqueue(m, Reason::Decision);
            let failed = self.search.prop.propagate_bins_only(true).is_some();
            if failed {
                // lit implies m, so lit is failed as well
                for &h in &one_hop {
                    self.probe.one_hop.set(h, false);
                }
                self.search.cancel_until(0);
                return false;
            }
            // a cycle back to lit's variable makes the sets ambiguous; skip
            if self.search.prop.vars.value(lit.var()) == lbool::UNDEF {
                let lim = self.search.prop.vars.trail_lim[0] as usize;
                for c in lim + 1..self.search.prop.vars.trail.len() {
                    let x = self.search.prop.vars.trail[c];
                    if self.probe.one_hop.has(x) && self.probe.one_hop[x] {
                        // only drop hops that precede the justifying hop, so
                        // chains of removals stay well-founded even on
                        // not-yet-collapsed equivalence cycles
                        let pos = one_hop.iter().position(|&h| h == x);
                        if pos.map_or(false, |px| px < i) {
                            wrong.push(x);
                            self.probe.one_hop.set(x, false);
                        }
                    }
                }
            }
            self.search.cancel_until(0);
        }

        for &n in &wrong {
            // the direct binary (¬lit ∨ n) is subsumed by the chain
            if let Some(learnt) = self.search.prop.watches.find_bin(lit, n) {
                self.search.prop.detach_bin(!lit, n, learnt);
                self.probe.useless_bin_removed += 1;
            }
        }
        for &h in &one_hop {
            self.probe.one_hop.set(h, false);
        }
        true
    }
}
