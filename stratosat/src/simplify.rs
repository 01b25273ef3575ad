//! The in-processing pipeline run between search bursts, and the
//! subsumption/strengthening of implicit (binary/ternary) clauses.

use crate::callbacks::Callbacks;
use crate::clause::{lbool, ClauseStats, Lit};
use crate::propagate::Reason;
use crate::search::LitReachData;
use crate::solver::Solver;
use crate::watches::{watch_cmp, Watcher};

impl<Cb: Callbacks> Solver<Cb> {
    /// One full simplification round. Returns `lbool::FALSE` if the formula
    /// became unsatisfiable, `lbool::UNDEF` otherwise.
    ///
    /// Every sub-pass checks `ok` and the interrupt flag; a second
    /// consecutive call with no intervening search changes nothing but
    /// statistics counters.
    pub(crate) fn simplify_problem(&mut self) -> lbool {
        debug_assert_eq!(self.search.prop.decision_level(), 0);
        if !self.search.prop.ok {
            return lbool::FALSE;
        }
        if self.proof.is_some() {
            // the passes below are not expressible as DRAT steps
            return lbool::UNDEF;
        }
        self.cb.on_simplify();
        debug!("simplify.start (round {})", self.num_simplify);
        self.search.prop.test_all_clause_attach();
        #[cfg(debug_assertions)]
        self.search.prop.check_stats(false);

        macro_rules! bail_if_needed {
            () => {
                if !self.search.prop.ok {
                    self.num_simplify += 1;
                    return lbool::FALSE;
                }
                if self.interrupt_requested() {
                    self.num_simplify += 1;
                    return lbool::UNDEF;
                }
            };
        }

        if self.num_simplify > 0 && self.conf.do_find_and_replace_eq_lits {
            self.find_equiv_lits();
            bail_if_needed!();
            if self.replacer.new_to_replace as f64 > self.num_free_vars() as f64 * 0.001 {
                self.perform_replace();
                bail_if_needed!();
            }
        }

        self.subsume_strengthen_implicit();
        bail_if_needed!();

        if self.conf.do_probe {
            self.probe();
            bail_if_needed!();
        }

        if self.num_simplify > 0 && self.conf.do_find_and_replace_eq_lits {
            self.find_equiv_lits();
            bail_if_needed!();
            self.perform_replace();
            bail_if_needed!();
        }

        self.subsume_strengthen_implicit();
        bail_if_needed!();

        if self.conf.do_clause_vivif {
            self.vivify();
            bail_if_needed!();
        }

        if self.conf.do_sat_elite {
            self.bounded_var_elim();
            bail_if_needed!();
        }

        if self.conf.do_clause_vivif {
            self.vivify();
            bail_if_needed!();
        }

        if self.conf.do_find_and_replace_eq_lits {
            self.find_equiv_lits();
            bail_if_needed!();
            if self.replacer.new_to_replace > 0 {
                self.perform_replace();
                bail_if_needed!();
            }
        }

        if self.conf.do_stamp && self.conf.do_calc_reach {
            self.calc_reachability();
        }

        if self.conf.do_sort_watched {
            self.sort_watched();
        }

        if self.conf.do_renumber_vars {
            self.renumber_variables();
        }

        self.search.prop.test_all_clause_attach();
        self.search.prop.check_implicit_propagated();
        #[cfg(debug_assertions)]
        self.search.prop.check_stats(false);

        self.num_simplify += 1;
        if !self.search.prop.ok {
            lbool::FALSE
        } else {
            lbool::UNDEF
        }
    }

    /// Sort every watcher sequence into the canonical order.
    pub(crate) fn sort_watched(&mut self) {
        let n = self.search.prop.watches.len();
        for i in 0..n {
            let p = Lit::from_idx(i as u32);
            let mut ws = self.search.prop.watches.take(p);
            ws.sort_unstable_by(watch_cmp);
            self.search.prop.watches.put(p, ws);
        }
    }

    /// Refresh the binary-implication dominator cache used as a decision
    /// hint: for each literal, the highest-degree literal that directly
    /// implies it.
    pub(crate) fn calc_reachability(&mut self) {
        let n = self.search.prop.watches.len();
        let mut degree = vec![0u32; n];
        for i in 0..n {
            let p = Lit::from_idx(i as u32);
            degree[i] = self.search.prop.watches[p]
                .iter()
                .filter(|w| match w {
                    Watcher::Bin { learnt, .. } => !learnt,
                    _ => false,
                })
                .count() as u32;
        }

        for e in self.search.lit_reachable.iter_mut() {
            *e = LitReachData::default();
        }

        for i in 0..n {
            let p = Lit::from_idx(i as u32);
            if !self.search.prop.var_usable(p.var()) || !self.search.decision[p.var()] {
                continue;
            }
            for idx in 0..self.search.prop.watches[p].len() {
                if let Watcher::Bin {
                    other,
                    learnt: false,
                } = self.search.prop.watches[p][idx]
                {
                    if !self.search.prop.var_usable(other.var()) {
                        continue;
                    }
                    let entry = &mut self.search.lit_reachable[other.idx() as usize];
                    if entry.lit == Lit::UNDEF || entry.degree < degree[i] {
                        *entry = LitReachData {
                            lit: p,
                            degree: degree[i],
                        };
                    }
                }
            }
        }
        self.search.use_reach = true;
    }

    /// Subsume and self-subsume the implicit clauses by one linear sweep per
    /// watcher sequence (the sequences are sorted first). Derived units and
    /// binaries are applied at the end under a fresh propagation.
    pub(crate) fn subsume_strengthen_implicit(&mut self) -> bool {
        debug_assert_eq!(self.search.prop.decision_level(), 0);
        if !self.search.prop.ok {
            return false;
        }

        let mut rem_bins = 0u64;
        let mut rem_tris = 0u64;
        let mut to_enqueue: Vec<Lit> = vec![];
        let mut bins_to_add: Vec<(Lit, Lit, bool)> = vec![];

        let n = self.search.prop.watches.len();
        for key_idx in 0..n {
            let p = Lit::from_idx(key_idx as u32);
            let l0 = !p; // the clause literal this sequence stands for
            if self.search.prop.watches[p].len() < 2 {
                continue;
            }

            let mut ws = self.search.prop.watches.take(p);
            ws.sort_unstable_by(watch_cmp);

            // --- subsumption sweep ---
            // `bin_block` records the kept binaries (sorted by other literal).
            let mut bin_block: Vec<(Lit, bool, usize)> = vec![];
            let mut last_tri: Option<(Lit, Lit)> = None;
            let mut j = 0;
            for i in 0..ws.len() {
                let w = ws[i];
                match w {
                    Watcher::Bin { other, learnt } => {
                        if let Some(&(lo, llearnt, _)) = bin_block.last() {
                            if lo == other {
                                // duplicate binary; sorting puts the
                                // irredundant copy first
                                debug_assert!(!(llearnt && !learnt));
                                self.search.prop.watches.remove_bin(!other, l0, learnt);
                                self.note_implicit_bin_removed(learnt);
                                rem_bins += 1;
                                continue;
                            }
                        }
                        bin_block.push((other, learnt, j));
                        ws[j] = w;
                        j += 1;
                    }
                    Watcher::Tri { a, b, learnt } => {
                        // treat each ternary from its smallest literal only
                        if l0 > a {
                            ws[j] = w;
                            j += 1;
                            continue;
                        }
                        // subsumed by one of the binaries (l0, a) / (l0, b)?
                        let sub = Self::bin_block_find(&bin_block, a)
                            .or_else(|| Self::bin_block_find(&bin_block, b));
                        if let Some(bi) = sub {
                            let (_, blearnt, bout) = bin_block[bi];
                            if blearnt && !learnt {
                                // keep irredundancy: promote the binary
                                let bother = bin_block[bi].0;
                                if let Watcher::Bin { learnt: wl, .. } = &mut ws[bout] {
                                    *wl = false;
                                } else {
                                    unreachable!()
                                }
                                self.search.prop.watches.set_bin_learnt(!bother, l0, false);
                                bin_block[bi].1 = false;
                                self.note_implicit_bin_promoted();
                            }
                            self.search.prop.watches.remove_tri(!a, l0, b, learnt);
                            self.search.prop.watches.remove_tri(!b, l0, a, learnt);
                            self.note_implicit_tri_removed(learnt);
                            rem_tris += 1;
                            continue;
                        }
                        // duplicate ternary?
                        if last_tri == Some((a, b)) {
                            self.search.prop.watches.remove_tri(!a, l0, b, learnt);
                            self.search.prop.watches.remove_tri(!b, l0, a, learnt);
                            self.note_implicit_tri_removed(learnt);
                            rem_tris += 1;
                            continue;
                        }
                        last_tri = Some((a, b));
                        ws[j] = w;
                        j += 1;
                    }
                    Watcher::Long { .. } => {
                        ws[j] = w;
                        j += 1;
                    }
                }
            }
            ws.truncate(j);

            // --- strengthening sweep ---
            // binary pair (l0 ∨ x), (l0 ∨ ¬x) forces l0; after deduplication
            // the two sit next to each other in the block.
            for win in bin_block.windows(2) {
                let (o1, _, _) = win[0];
                let (o2, _, _) = win[1];
                if o1.var() == o2.var() {
                    debug_assert_ne!(o1, o2);
                    to_enqueue.push(l0);
                }
            }

            // ternary (l0 ∨ a ∨ b) plus binary (¬l0 ∨ a) or (¬l0 ∨ b)
            // reduces to (a ∨ b)
            let mut j2 = 0;
            for i in 0..ws.len() {
                let w = ws[i];
                if let Watcher::Tri { a, b, learnt } = w {
                    let mut strengthen = false;
                    for w2 in self.search.prop.watches[l0].iter() {
                        if let Watcher::Bin { other, .. } = w2 {
                            if *other == a || *other == b {
                                strengthen = true;
                                break;
                            }
                        }
                    }
                    if strengthen {
                        // remove the other two copies; this one is dropped by
                        // the compaction
                        let (x, y, z) = sort3(l0, a, b);
                        let others: [(Lit, Lit, Lit); 2] = tri_other_copies(l0, x, y, z);
                        for &(k, m1, m2) in others.iter() {
                            self.search.prop.watches.remove_tri(!k, m1, m2, learnt);
                        }
                        self.note_implicit_tri_removed(learnt);
                        rem_tris += 1;
                        bins_to_add.push((a, b, learnt));
                        continue;
                    }
                }
                ws[j2] = w;
                j2 += 1;
            }
            ws.truncate(j2);

            self.search.prop.watches.put(p, ws);
        }

        // Apply delayed units under a fresh propagation.
        for &l in &to_enqueue {
            let v = self.search.prop.value_lit(l);
            if v == lbool::FALSE {
                self.search.prop.ok = false;
                break;
            }
            if v == lbool::UNDEF {
                self.search.prop.vars.unchecked_enqueue(l, Reason::Decision);
            }
        }
        if self.search.prop.ok {
            self.search.prop.ok = self.search.prop.propagate().is_none();
        }

        // Apply delayed binaries.
        if self.search.prop.ok {
            let mut lits = vec![];
            for &(a, b, learnt) in &bins_to_add {
                lits.clear();
                lits.push(a);
                lits.push(b);
                self.add_clause_int(&mut lits, learnt, ClauseStats::default());
                if !self.search.prop.ok {
                    break;
                }
            }
        }

        if rem_bins + rem_tris > 0 {
            debug!(
                "implicit: removed {} bins, {} tris, {} units",
                rem_bins,
                rem_tris,
                to_enqueue.len()
            );
        }
        #[cfg(debug_assertions)]
        {
            if self.search.prop.ok {
                self.search.prop.check_stats(false);
            }
        }
        self.search.prop.ok
    }

    fn bin_block_find(block: &[(Lit, bool, usize)], key: Lit) -> Option<usize> {
        block.binary_search_by(|probe| probe.0.cmp(&key)).ok()
    }

    fn note_implicit_bin_removed(&mut self, learnt: bool) {
        if learnt {
            self.search.prop.red_bins -= 1;
            self.search.prop.red_lits -= 2;
        } else {
            self.search.prop.irred_bins -= 1;
            self.search.prop.irred_lits -= 2;
        }
    }

    fn note_implicit_tri_removed(&mut self, learnt: bool) {
        if learnt {
            self.search.prop.red_tris -= 1;
            self.search.prop.red_lits -= 3;
        } else {
            self.search.prop.irred_tris -= 1;
            self.search.prop.irred_lits -= 3;
        }
    }

    fn note_implicit_bin_promoted(&mut self) {
        self.search.prop.red_bins -= 1;
        self.search.prop.red_lits -= 2;
        self.search.prop.irred_bins += 1;
        self.search.prop.irred_lits += 2;
    }
}

#[inline]
fn sort3(a: Lit, b: Lit, c: Lit) -> (Lit, Lit, Lit) {
    let mut l = [a, b, c];
    l.sort_unstable();
    (l[0], l[1], l[2])
}

/// The two watcher copies of the ternary `{x, y, z}` (sorted) that are not
/// stored under `skip`'s own sequence: `(clause_lit, partner1, partner2)`.
#[inline]
fn tri_other_copies(skip: Lit, x: Lit, y: Lit, z: Lit) -> [(Lit, Lit, Lit); 2] {
    if skip == x {
        [(y, x, z), (z, x, y)]
    } else if skip == y {
        [(x, y, z), (z, x, y)]
    } else {
        [(x, y, z), (y, x, z)]
    }
}
