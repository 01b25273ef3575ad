/*****************************************************************************************[propagate.rs]
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

//! Unit propagation over the heterogeneous watch index.

use crate::clause::{lbool, CRef, ClauseAllocator, ClauseRef, Elimed, Lit, VMap, Var};
use crate::watches::{Watcher, Watches};
use std::ops::IndexMut;

/// Why a variable is assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reason {
    /// Decision, assumption, or top-level fact.
    Decision,
    /// Propagated by a binary clause; the payload is the other (false) literal.
    Bin(Lit),
    /// Propagated by a ternary clause; the payload is the two other literals.
    Tri(Lit, Lit),
    /// Propagated by a long clause.
    Long(CRef),
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct VarData {
    pub reason: Reason,
    pub level: i32,
}

impl Default for VarData {
    fn default() -> Self {
        Self {
            reason: Reason::Decision,
            level: 0,
        }
    }
}

impl VarData {
    #[inline(always)]
    pub(crate) fn new(reason: Reason, level: i32) -> Self {
        Self { reason, level }
    }
}

/// The clause that became false under the current trail.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Confl {
    Bin(Lit, Lit),
    Tri(Lit, Lit, Lit),
    Long(CRef),
}

/// The current assignments and the trail.
#[derive(Debug)]
pub(crate) struct VarState {
    /// Current assignment for each variable.
    pub assigns: VMap<lbool>,
    /// Stores reason and level for each variable.
    pub vardata: VMap<VarData>,
    /// Assignment stack; stores all assigments made in the order they were made.
    pub trail: Vec<Lit>,
    /// Separator indices for different decision levels in `trail`.
    pub trail_lim: Vec<i32>,
}

impl VarState {
    fn new() -> Self {
        Self {
            assigns: VMap::new(),
            vardata: VMap::new(),
            trail: vec![],
            trail_lim: vec![],
        }
    }

    #[inline(always)]
    pub fn num_assigns(&self) -> u32 {
        self.trail.len() as u32
    }

    #[inline(always)]
    pub fn value(&self, x: Var) -> lbool {
        self.assigns[x]
    }

    #[inline(always)]
    pub fn value_lit(&self, x: Lit) -> lbool {
        self.assigns[x.var()] ^ !x.sign()
    }

    #[inline(always)]
    pub fn level(&self, x: Var) -> i32 {
        self.vardata[x].level
    }

    #[inline(always)]
    pub fn reason(&self, x: Var) -> Reason {
        self.vardata[x].reason
    }

    #[inline(always)]
    pub fn decision_level(&self) -> u32 {
        self.trail_lim.len() as u32
    }

    /// Begins a new decision level.
    pub fn new_decision_level(&mut self) {
        let lvl = self.trail.len() as i32;
        self.trail_lim.push(lvl);
    }

    pub fn unchecked_enqueue(&mut self, p: Lit, from: Reason) {
        debug_assert_eq!(
            self.value_lit(p),
            lbool::UNDEF,
            "lit {:?} should be undef",
            p
        );
        self.assigns[p.var()] = lbool::new(p.sign());
        self.vardata[p.var()] = VarData::new(from, self.decision_level() as i32);
        self.trail.push(p);
    }

    /// The level-0 prefix of the trail.
    pub fn proved_at_lvl_0(&self) -> &[Lit] {
        let end = self
            .trail_lim
            .get(0)
            .map_or(self.trail.len(), |&x| x as usize);
        &self.trail[..end]
    }
}

/// The propagation engine: clause storage, watch index and trail. The
/// searcher and every simplification pass drive their propagation through
/// this one structure.
#[derive(Debug)]
pub(crate) struct PropEngine {
    pub ca: ClauseAllocator,
    pub watches: Watches,
    pub vars: VarState,
    /// Elimination state, per variable.
    pub elimed: VMap<Elimed>,
    /// Head of the propagation queue (index into the trail).
    pub qhead: usize,
    /// Long irredundant clauses.
    pub long_irred: Vec<CRef>,
    /// Long learnt clauses.
    pub long_red: Vec<CRef>,

    // Implicit-clause counters; must always match the watch index.
    pub irred_bins: u64,
    pub red_bins: u64,
    pub irred_tris: u64,
    pub red_tris: u64,
    pub irred_lits: u64,
    pub red_lits: u64,

    pub propagations: u64,
    /// If `false`, the constraints are already unsatisfiable. No part of the
    /// solver state may be used!
    pub ok: bool,
    /// Next variable to be created.
    next_var: Var,
}

impl PropEngine {
    pub fn new() -> Self {
        Self {
            ca: ClauseAllocator::new(),
            watches: Watches::new(),
            vars: VarState::new(),
            elimed: VMap::new(),
            qhead: 0,
            long_irred: vec![],
            long_red: vec![],
            irred_bins: 0,
            red_bins: 0,
            irred_tris: 0,
            red_tris: 0,
            irred_lits: 0,
            red_lits: 0,
            propagations: 0,
            ok: true,
            next_var: Var::from_idx(0),
        }
    }

    #[inline(always)]
    pub fn num_vars(&self) -> u32 {
        self.next_var.idx()
    }

    pub fn new_var_core(&mut self) -> Var {
        let v = self.next_var;
        self.next_var = Var::from_idx(v.idx() + 1);
        self.watches.init_var();
        self.vars.assigns.push(lbool::UNDEF);
        self.vars.vardata.push(VarData::default());
        self.elimed.push(Elimed::None);
        v
    }

    #[inline(always)]
    pub fn value_lit(&self, l: Lit) -> lbool {
        self.vars.value_lit(l)
    }

    #[inline(always)]
    pub fn decision_level(&self) -> u32 {
        self.vars.decision_level()
    }

    /// Propagates all enqueued facts over binaries, ternaries and long
    /// clauses. If a conflict arises the falsified clause is returned.
    ///
    /// Post-condition: the propagation queue is empty, even on conflict.
    pub fn propagate(&mut self) -> Option<Confl> {
        let mut confl = None;
        let mut num_props: u32 = 0;

        while self.qhead < self.vars.trail.len() {
            // `p` is the next enqueued fact to propagate.
            let p = self.vars.trail[self.qhead];
            self.qhead += 1;
            num_props += 1;

            let watches_ptr: *mut Watches = self.watches.as_ptr();
            let ws = self.watches.lookup_mut(p, &self.ca);
            let mut i: usize = 0;
            let mut j: usize = 0;
            let end: usize = ws.len();
            'watchers: while i < end {
                match ws[i] {
                    Watcher::Bin { other, .. } => {
                        ws[j] = ws[i];
                        j += 1;
                        i += 1;
                        let v = self.vars.value_lit(other);
                        if v == lbool::TRUE {
                            continue;
                        } else if v == lbool::UNDEF {
                            self.vars.unchecked_enqueue(other, Reason::Bin(!p));
                        } else {
                            confl = Some(Confl::Bin(!p, other));
                            self.qhead = self.vars.trail.len();
                            while i < end {
                                ws[j] = ws[i];
                                j += 1;
                                i += 1;
                            }
                        }
                    }
                    Watcher::Tri { a, b, .. } => {
                        ws[j] = ws[i];
                        j += 1;
                        i += 1;
                        let va = self.vars.value_lit(a);
                        let vb = self.vars.value_lit(b);
                        if va == lbool::TRUE || vb == lbool::TRUE {
                            continue;
                        } else if va == lbool::FALSE && vb == lbool::FALSE {
                            confl = Some(Confl::Tri(!p, a, b));
                            self.qhead = self.vars.trail.len();
                            while i < end {
                                ws[j] = ws[i];
                                j += 1;
                                i += 1;
                            }
                        } else if va == lbool::FALSE {
                            self.vars.unchecked_enqueue(b, Reason::Tri(!p, a));
                        } else if vb == lbool::FALSE {
                            self.vars.unchecked_enqueue(a, Reason::Tri(!p, b));
                        }
                        // both undef: still two non-false literals, nothing to do
                    }
                    Watcher::Long { cref, blocker } => {
                        // Try to avoid inspecting the clause:
                        if self.vars.value_lit(blocker) == lbool::TRUE {
                            ws[j] = ws[i];
                            j += 1;
                            i += 1;
                            continue;
                        }

                        self.ca.stats_mut(cref).looked_at += 1;

                        // Make sure the false literal is data[1]:
                        let mut c = self.ca.get_mut(cref);
                        let false_lit = !p;
                        if c[0] == false_lit {
                            let tmp = c[1];
                            c[0] = tmp;
                            c[1] = false_lit;
                        }
                        debug_assert_eq!(c[1], false_lit);
                        i += 1;

                        // If 0th watch is true, then clause is already satisfied.
                        let first = c[0];
                        let w = Watcher::Long {
                            cref,
                            blocker: first,
                        };
                        if first != blocker && self.vars.value_lit(first) == lbool::TRUE {
                            ws[j] = w;
                            j += 1;
                            continue;
                        }

                        // Look for new watch:
                        let size = c.size();
                        for k in 2..size {
                            if self.vars.value_lit(c[k]) != lbool::FALSE {
                                let tmp = c[k];
                                c[1] = tmp;
                                c[k] = false_lit;

                                // safe because `!c[1] != p`, so the lists are not aliased
                                debug_assert_ne!(!tmp, p);
                                let watches_ref: &mut Watches = unsafe { &mut *watches_ptr };
                                watches_ref.index_mut(!tmp).push(w);
                                continue 'watchers;
                            }
                        }

                        // Did not find watch -- clause is unit under assignment:
                        drop(c);
                        ws[j] = w;
                        j += 1;
                        if self.vars.value_lit(first) == lbool::FALSE {
                            self.ca.stats_mut(cref).confls += 1;
                            confl = Some(Confl::Long(cref));
                            self.qhead = self.vars.trail.len();
                            // Copy the remaining watches:
                            while i < end {
                                ws[j] = ws[i];
                                j += 1;
                                i += 1;
                            }
                        } else {
                            self.ca.stats_mut(cref).props += 1;
                            self.vars.unchecked_enqueue(first, Reason::Long(cref));
                        }
                    }
                }
            }
            ws.truncate(j);
        }
        self.propagations += num_props as u64;

        confl
    }

    /// Propagate following only binary watchers. Used by probing and
    /// useless-binary detection; callers backtrack afterwards, which
    /// restores the queue head.
    pub fn propagate_bins_only(&mut self, irred_only: bool) -> Option<Confl> {
        let mut num_props = 0u32;
        while self.qhead < self.vars.trail.len() {
            let p = self.vars.trail[self.qhead];
            self.qhead += 1;
            num_props += 1;
            let n = self.watches[p].len();
            for idx in 0..n {
                if let Watcher::Bin { other, learnt } = self.watches[p][idx] {
                    if irred_only && learnt {
                        continue;
                    }
                    let v = self.vars.value_lit(other);
                    if v == lbool::FALSE {
                        self.qhead = self.vars.trail.len();
                        self.propagations += num_props as u64;
                        return Some(Confl::Bin(!p, other));
                    } else if v == lbool::UNDEF {
                        self.vars.unchecked_enqueue(other, Reason::Bin(!p));
                    }
                }
            }
        }
        self.propagations += num_props as u64;
        None
    }

    /// Enqueue only the direct binary implications of the current decision,
    /// without following them further.
    pub fn propagate_bin_one_level(&mut self, irred_only: bool) -> Option<Confl> {
        let start = *self.vars.trail_lim.last().expect("no decision level") as usize;
        let p = self.vars.trail[start];
        self.propagations += 1;
        let n = self.watches[p].len();
        for idx in 0..n {
            if let Watcher::Bin { other, learnt } = self.watches[p][idx] {
                if irred_only && learnt {
                    continue;
                }
                let v = self.vars.value_lit(other);
                if v == lbool::FALSE {
                    self.qhead = self.vars.trail.len();
                    return Some(Confl::Bin(!p, other));
                } else if v == lbool::UNDEF {
                    self.vars.unchecked_enqueue(other, Reason::Bin(!p));
                }
            }
        }
        self.qhead = self.vars.trail.len();
        None
    }

    /// The literals of a conflict, in a caller-provided buffer.
    pub fn confl_lits(&self, confl: &Confl, out: &mut Vec<Lit>) {
        out.clear();
        match *confl {
            Confl::Bin(a, b) => {
                out.push(a);
                out.push(b);
            }
            Confl::Tri(a, b, c) => {
                out.push(a);
                out.push(b);
                out.push(c);
            }
            Confl::Long(cref) => {
                out.extend_from_slice(self.ca.get_ref(cref).lits());
            }
        }
    }

    // ---- attach / detach ----

    pub fn attach_bin(&mut self, a: Lit, b: Lit, learnt: bool) {
        debug_assert_ne!(a.var(), b.var());
        self.watches[!a].push(Watcher::Bin { other: b, learnt });
        self.watches[!b].push(Watcher::Bin { other: a, learnt });
        if learnt {
            self.red_bins += 1;
            self.red_lits += 2;
        } else {
            self.irred_bins += 1;
            self.irred_lits += 2;
        }
    }

    pub fn detach_bin(&mut self, a: Lit, b: Lit, learnt: bool) {
        self.watches.remove_bin(!a, b, learnt);
        self.watches.remove_bin(!b, a, learnt);
        if learnt {
            self.red_bins -= 1;
            self.red_lits -= 2;
        } else {
            self.irred_bins -= 1;
            self.irred_lits -= 2;
        }
    }

    /// Attach the ternary clause `{a, b, c}`; the literals are stored sorted.
    pub fn attach_tri(&mut self, a: Lit, b: Lit, c: Lit, learnt: bool) {
        let mut l = [a, b, c];
        l.sort_unstable();
        let [x, y, z] = l;
        debug_assert!(x.var() != y.var() && y.var() != z.var());
        self.watches[!x].push(Watcher::Tri { a: y, b: z, learnt });
        self.watches[!y].push(Watcher::Tri { a: x, b: z, learnt });
        self.watches[!z].push(Watcher::Tri { a: x, b: y, learnt });
        if learnt {
            self.red_tris += 1;
            self.red_lits += 3;
        } else {
            self.irred_tris += 1;
            self.irred_lits += 3;
        }
    }

    pub fn detach_tri(&mut self, a: Lit, b: Lit, c: Lit, learnt: bool) {
        let mut l = [a, b, c];
        l.sort_unstable();
        let [x, y, z] = l;
        self.watches.remove_tri(!x, y, z, learnt);
        self.watches.remove_tri(!y, x, z, learnt);
        self.watches.remove_tri(!z, x, y, learnt);
        if learnt {
            self.red_tris -= 1;
            self.red_lits -= 3;
        } else {
            self.irred_tris -= 1;
            self.irred_lits -= 3;
        }
    }

    /// Attach a long clause to the watch index. The caller keeps the clause
    /// in `long_irred`/`long_red`.
    pub fn attach_long(&mut self, cr: CRef) {
        let (c0, c1, learnt, size) = {
            let c = self.ca.get_ref(cr);
            debug_assert!(c.size() >= 4);
            (c[0], c[1], c.learnt(), c.size())
        };
        self.watches[!c0].push(Watcher::Long {
            cref: cr,
            blocker: c1,
        });
        self.watches[!c1].push(Watcher::Long {
            cref: cr,
            blocker: c0,
        });
        if learnt {
            self.red_lits += size as u64;
        } else {
            self.irred_lits += size as u64;
        }
    }

    /// Detach a long clause from the watch index.
    ///
    /// `strict` removes the watchers eagerly instead of marking the lists dirty.
    pub fn detach_long(&mut self, cr: CRef, strict: bool) {
        let (c0, c1, csize, clearnt) = {
            let c = self.ca.get_ref(cr);
            (c[0], c[1], c.size(), c.learnt())
        };
        debug_assert!(csize >= 4);

        if strict {
            let w0 = Watcher::Long {
                cref: cr,
                blocker: c1,
            };
            let pos = self.watches[!c0]
                .iter()
                .position(|x| *x == w0)
                .expect("watcher not found");
            self.watches[!c0].remove(pos);
            let w1 = Watcher::Long {
                cref: cr,
                blocker: c0,
            };
            let pos = self.watches[!c1]
                .iter()
                .position(|x| *x == w1)
                .expect("watcher not found");
            self.watches[!c1].remove(pos);
        } else {
            self.watches.smudge(!c0);
            self.watches.smudge(!c1);
        }

        if clearnt {
            self.red_lits -= csize as u64;
        } else {
            self.irred_lits -= csize as u64;
        }
    }

    /// Detach and free a long clause. The caller drops it from its list.
    pub fn remove_long(&mut self, cr: CRef) {
        self.detach_long(cr, false);
        {
            let c = self.ca.get_ref(cr);
            // Don't leave pointers to free'd memory!
            if self.locked(c) {
                let v = c[0].var();
                self.vars.vardata[v].reason = Reason::Decision;
            }
        }
        self.ca.get_mut(cr).set_mark(1);
        self.ca.free(cr);
    }

    /// Returns `true` if a clause is a reason for some implication in the current state.
    pub fn locked(&self, c: ClauseRef) -> bool {
        self.vars.value_lit(c[0]) == lbool::TRUE
            && match self.vars.reason(c[0].var()) {
                Reason::Long(r) => self.ca.get_ref(r) == c,
                _ => false,
            }
    }

    pub fn satisfied(&self, c: ClauseRef) -> bool {
        c.iter().any(|&lit| self.vars.value_lit(lit) == lbool::TRUE)
    }

    /// Is variable `v` a candidate for search and simplification?
    #[inline]
    pub fn var_usable(&self, v: Var) -> bool {
        self.vars.value(v) == lbool::UNDEF && self.elimed[v] == Elimed::None
    }

    // ---- verifiers ----

    /// Recompute the implicit-clause counters from the watch index and the
    /// long-clause lists, and compare with the running counters.
    pub fn check_stats(&self, allow_freed: bool) {
        let mut bins = [0u64; 2];
        let mut tris = [0u64; 2];
        for i in 0..self.watches.len() {
            let lit = Lit::from_idx(i as u32);
            for w in self.watches[lit].iter() {
                match w {
                    Watcher::Bin { learnt, .. } => bins[*learnt as usize] += 1,
                    Watcher::Tri { a, b, learnt } => {
                        debug_assert!(a < b);
                        tris[*learnt as usize] += 1;
                    }
                    Watcher::Long { .. } => (),
                }
            }
        }
        assert!(bins[0] % 2 == 0 && bins[1] % 2 == 0);
        assert!(tris[0] % 3 == 0 && tris[1] % 3 == 0);
        assert_eq!(bins[0] / 2, self.irred_bins, "irredundant binary count");
        assert_eq!(bins[1] / 2, self.red_bins, "learnt binary count");
        assert_eq!(tris[0] / 3, self.irred_tris, "irredundant ternary count");
        assert_eq!(tris[1] / 3, self.red_tris, "learnt ternary count");

        let mut irred_lits = self.irred_bins * 2 + self.irred_tris * 3;
        for &cr in &self.long_irred {
            let c = self.ca.get_ref(cr);
            if c.mark() == 1 {
                assert!(allow_freed);
            } else {
                irred_lits += c.size() as u64;
            }
        }
        let mut red_lits = self.red_bins * 2 + self.red_tris * 3;
        for &cr in &self.long_red {
            let c = self.ca.get_ref(cr);
            if c.mark() == 1 {
                assert!(allow_freed);
            } else {
                red_lits += c.size() as u64;
            }
        }
        assert_eq!(irred_lits, self.irred_lits, "irredundant literal count");
        assert_eq!(red_lits, self.red_lits, "learnt literal count");
    }

    /// Every attached long clause must be watched on its first two literals.
    #[allow(dead_code)]
    pub fn test_all_clause_attach(&self) {
        if !cfg!(debug_assertions) {
            return;
        }
        for list in [&self.long_irred, &self.long_red].iter() {
            for &cr in list.iter() {
                let c = self.ca.get_ref(cr);
                if c.mark() == 1 {
                    continue;
                }
                assert_eq!(
                    c.abst(),
                    crate::clause::abstraction(c.lits()),
                    "stale clause signature"
                );
                let w0 = Watcher::Long {
                    cref: cr,
                    blocker: c[1],
                };
                let w1 = Watcher::Long {
                    cref: cr,
                    blocker: c[0],
                };
                assert!(
                    self.watches[!c[0]].iter().any(|w| *w == w0),
                    "clause not watched on first literal"
                );
                assert!(
                    self.watches[!c[1]].iter().any(|w| *w == w1),
                    "clause not watched on second literal"
                );
            }
        }
    }

    /// All implicit clauses must be fully propagated under the current trail.
    #[allow(dead_code)]
    pub fn check_implicit_propagated(&self) {
        if !cfg!(debug_assertions) {
            return;
        }
        for i in 0..self.watches.len() {
            let key = Lit::from_idx(i as u32);
            // clause literal corresponding to this list
            let l0 = !key;
            let v0 = self.vars.value_lit(l0);
            if v0 == lbool::TRUE {
                continue;
            }
            for w in self.watches[key].iter() {
                match *w {
                    Watcher::Bin { other, .. } => {
                        if v0 == lbool::FALSE {
                            assert_eq!(self.vars.value_lit(other), lbool::TRUE);
                        }
                    }
                    Watcher::Tri { a, b, .. } => {
                        let va = self.vars.value_lit(a);
                        let vb = self.vars.value_lit(b);
                        if v0 == lbool::FALSE && va == lbool::FALSE {
                            assert_eq!(vb, lbool::TRUE);
                        }
                        if v0 == lbool::FALSE && vb == lbool::FALSE {
                            assert_eq!(va, lbool::TRUE);
                        }
                    }
                    Watcher::Long { .. } => (),
                }
            }
        }
    }
}
