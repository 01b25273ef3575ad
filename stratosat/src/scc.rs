//! Strongly connected components of the binary implication graph.
//!
//! Nodes are the 2n literals; every irredundant binary clause `(a ∨ b)`
//! contributes the implications `¬a → b` and `¬b → a`. Every component of
//! size > 1 collapses to a single representative literal; a component
//! containing both polarities of a variable makes the formula unsat.

use crate::callbacks::Callbacks;
use crate::clause::Lit;
use crate::replace::MergeOutcome;
use crate::solver::Solver;
use crate::watches::Watcher;

const UNSEEN: u32 = !0;

impl<Cb: Callbacks> Solver<Cb> {
    /// Run Tarjan's algorithm and queue one equivalence per non-root member
    /// of each component. Returns `false` iff a contradiction was found.
    pub(crate) fn find_equiv_lits(&mut self) -> bool {
        debug_assert_eq!(self.search.prop.decision_level(), 0);
        if !self.search.prop.ok {
            return false;
        }

        let n_lits = self.search.prop.watches.len();
        let mut index = vec![UNSEEN; n_lits];
        let mut lowlink = vec![0u32; n_lits];
        let mut on_stack = vec![false; n_lits];
        let mut stack: Vec<u32> = vec![];
        let mut frames: Vec<(u32, usize)> = vec![]; // (lit index, watcher position)
        let mut next_index: u32 = 0;
        let mut found = 0u64;

        for start in 0..n_lits as u32 {
            if index[start as usize] != UNSEEN {
                continue;
            }
            let sl = Lit::from_idx(start);
            if !self.search.prop.var_usable(sl.var()) {
                continue;
            }

            index[start as usize] = next_index;
            lowlink[start as usize] = next_index;
            next_index += 1;
            stack.push(start);
            on_stack[start as usize] = true;
            frames.push((start, 0));

            loop {
                let (v, child) = {
                    let frame = match frames.last_mut() {
                        Some(f) => f,
                        None => break,
                    };
                    let v = frame.0;
                    // successors of literal v follow its binary watchers
                    let ws = &self.search.prop.watches[Lit::from_idx(v)];
                    let mut child = None;
                    while frame.1 < ws.len() {
                        let w = ws[frame.1];
                        frame.1 += 1;
                        if let Watcher::Bin {
                            other,
                            learnt: false,
                        } = w
                        {
                            if self.search.prop.var_usable(other.var()) {
                                child = Some(other.idx());
                                break;
                            }
                        }
                    }
                    (v, child)
                };

                match child {
                    Some(w) => {
                        if index[w as usize] == UNSEEN {
                            index[w as usize] = next_index;
                            lowlink[w as usize] = next_index;
                            next_index += 1;
                            stack.push(w);
                            on_stack[w as usize] = true;
                            frames.push((w, 0));
                        } else if on_stack[w as usize] {
                            lowlink[v as usize] = lowlink[v as usize].min(index[w as usize]);
                        }
                    }
                    None => {
                        frames.pop();
                        if let Some(&mut (parent, _)) = frames.last_mut() {
                            lowlink[parent as usize] =
                                lowlink[parent as usize].min(lowlink[v as usize]);
                        }
                        if lowlink[v as usize] == index[v as usize] {
                            // v is the root of a component
                            let mut members = vec![];
                            loop {
                                let m = stack.pop().expect("tarjan stack empty");
                                on_stack[m as usize] = false;
                                members.push(m);
                                if m == v {
                                    break;
                                }
                            }
                            if members.len() > 1 {
                                let repr = Lit::from_idx(*members.iter().min().unwrap());
                                for &m in &members {
                                    let l = Lit::from_idx(m);
                                    if l == repr {
                                        continue;
                                    }
                                    if l.var() == repr.var() {
                                        // both polarities equivalent: unsat
                                        self.search.prop.ok = false;
                                        return false;
                                    }
                                    // l ≡ repr, expressed on l's variable
                                    let r = repr ^ !l.sign();
                                    match self.replacer.merge(l.var(), r) {
                                        MergeOutcome::Contradiction => {
                                            self.search.prop.ok = false;
                                            return false;
                                        }
                                        MergeOutcome::New => found += 1,
                                        MergeOutcome::AlreadyEq => (),
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }

        if found > 0 {
            debug!("scc: {} new equivalent literals", found);
        }
        self.stats_scc_found += found;
        true
    }
}
