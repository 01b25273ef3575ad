//! The watch index.
//!
//! Every literal has one heterogeneous watcher sequence holding binary
//! clauses, ternary clauses and watched long clauses. A watcher stored
//! under literal `p` belongs to a clause containing `¬p` and is visited
//! when `p` is enqueued. Binary and ternary clauses live only here.

use crate::clause::{CRef, ClauseAllocator, LMap, Lit};
use crate::maps::{AsIndex, IntMapBool};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::mem;
use std::ops;

/// One entry of a watcher sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Watcher {
    /// Binary clause `(¬p ∨ other)`, stored symmetrically under both literals.
    Bin { other: Lit, learnt: bool },
    /// Ternary clause `(¬p ∨ a ∨ b)` with `a < b`, stored under all three literals.
    Tri { a: Lit, b: Lit, learnt: bool },
    /// Long clause reference with a cached blocker literal.
    Long { cref: CRef, blocker: Lit },
}

impl Watcher {
    #[inline(always)]
    pub fn is_bin(&self) -> bool {
        match self {
            Watcher::Bin { .. } => true,
            _ => false,
        }
    }
    #[inline(always)]
    pub fn is_tri(&self) -> bool {
        match self {
            Watcher::Tri { .. } => true,
            _ => false,
        }
    }
    #[inline(always)]
    pub fn is_long(&self) -> bool {
        match self {
            Watcher::Long { .. } => true,
            _ => false,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Watcher::Bin { .. } => 0,
            Watcher::Tri { .. } => 1,
            Watcher::Long { .. } => 2,
        }
    }
}

/// Canonical watcher order: binaries, then ternaries, then long clauses;
/// binaries keyed by their other literal (irredundant before learnt),
/// ternaries by their literal pair. The implicit subsumption sweep relies
/// on this order.
pub(crate) fn watch_cmp(x: &Watcher, y: &Watcher) -> Ordering {
    use self::Watcher::*;
    match (x, y) {
        (
            Bin {
                other: o1,
                learnt: l1,
            },
            Bin {
                other: o2,
                learnt: l2,
            },
        ) => o1.cmp(o2).then(l1.cmp(l2)),
        (
            Tri {
                a: a1,
                b: b1,
                learnt: l1,
            },
            Tri {
                a: a2,
                b: b2,
                learnt: l2,
            },
        ) => a1.cmp(a2).then(b1.cmp(b2)).then(l1.cmp(l2)),
        _ => x.rank().cmp(&y.rank()),
    }
}

pub(crate) type WatchList = SmallVec<[Watcher; 4]>;

/// Watch lists for all literals, with lazy removal of freed long clauses.
#[derive(Debug, Clone)]
pub(crate) struct Watches {
    occs: LMap<WatchList>,
    dirty: IntMapBool<Lit>,
    dirties: Vec<Lit>, // to know what keys to examine in `clean_all`
}

impl Watches {
    pub fn new() -> Self {
        Self {
            occs: LMap::new(),
            dirty: IntMapBool::new(),
            dirties: Vec::new(),
        }
    }

    /// Append the two watcher sequences of a freshly created variable.
    pub fn init_var(&mut self) {
        self.occs.push(WatchList::new());
        self.occs.push(WatchList::new());
        self.dirty.grow_to(self.occs.len());
    }

    pub fn len(&self) -> usize {
        self.occs.raw().len()
    }

    /// Take a list out to mutate it while other lists stay reachable.
    pub fn take(&mut self, lit: Lit) -> WatchList {
        mem::take(&mut self.occs[lit])
    }
    pub fn put(&mut self, lit: Lit, list: WatchList) {
        debug_assert!(self.occs[lit].is_empty());
        self.occs[lit] = list;
    }

    /// Mark `lit`'s sequence as containing freed long-clause watchers.
    pub fn smudge(&mut self, lit: Lit) {
        if !self.dirty[lit] {
            self.dirty.set(lit, true);
            self.dirties.push(lit);
        }
    }

    /// Drop watchers of freed long clauses from all smudged sequences.
    pub fn clean_all(&mut self, ca: &ClauseAllocator) {
        let dirties = mem::take(&mut self.dirties);
        for &lit in &dirties {
            // dirties may contain duplicates
            if self.dirty[lit] {
                self.clean(lit, ca);
            }
        }
    }

    pub fn clean(&mut self, lit: Lit, ca: &ClauseAllocator) {
        self.occs[lit].retain(|w| match w {
            Watcher::Long { cref, .. } => ca.get_ref(*cref).mark() != 1,
            _ => true,
        });
        self.dirty.set(lit, false);
    }

    /// `lit`'s sequence with freed long watchers dropped first.
    pub fn lookup_mut(&mut self, lit: Lit, ca: &ClauseAllocator) -> &mut WatchList {
        if self.dirty[lit] {
            self.clean(lit, ca);
        }
        &mut self.occs[lit]
    }

    /// Raw pointer for the watch-move inside propagation; the caller must
    /// guarantee the pushed-to list differs from the one being walked.
    pub(crate) fn as_ptr(&mut self) -> *mut Watches {
        self
    }

    /// Remove the binary watcher `(other, learnt)` from `lit`'s sequence.
    /// Panics if it is not present.
    pub fn remove_bin(&mut self, lit: Lit, other: Lit, learnt: bool) {
        let ws = &mut self.occs[lit];
        let pos = ws
            .iter()
            .position(|w| {
                *w == Watcher::Bin {
                    other,
                    learnt,
                }
            })
            .expect("binary watcher not found");
        ws.remove(pos);
    }

    /// Remove the ternary watcher `(a, b, learnt)` from `lit`'s sequence.
    pub fn remove_tri(&mut self, lit: Lit, a: Lit, b: Lit, learnt: bool) {
        debug_assert!(a < b);
        let ws = &mut self.occs[lit];
        let pos = ws
            .iter()
            .position(|w| {
                *w == Watcher::Tri {
                    a,
                    b,
                    learnt,
                }
            })
            .expect("ternary watcher not found");
        ws.remove(pos);
    }

    /// Is the binary watcher present under `lit`?
    pub fn find_bin(&self, lit: Lit, other: Lit) -> Option<bool> {
        self.occs[lit].iter().find_map(|w| match w {
            Watcher::Bin { other: o, learnt } if *o == other => Some(*learnt),
            _ => None,
        })
    }

    /// Renumbering support: permute the sequences (`new[i] = old[new_to_old[i]]`)
    /// and rewrite every literal through `map`. All smudges must have been
    /// cleaned beforehand.
    pub fn permute_and_remap<F: Fn(Lit) -> Lit>(&mut self, new_to_old: &[u32], map: F) {
        debug_assert!(self.dirties.is_empty());
        self.occs.permute(new_to_old);
        for i in 0..self.occs.raw().len() {
            let key = Lit::from_index(i);
            for w in self.occs[key].iter_mut() {
                match w {
                    Watcher::Bin { other, .. } => *other = map(*other),
                    Watcher::Tri { a, b, .. } => {
                        let (x, y) = (map(*a), map(*b));
                        if x < y {
                            *a = x;
                            *b = y;
                        } else {
                            *a = y;
                            *b = x;
                        }
                    }
                    Watcher::Long { blocker, .. } => *blocker = map(*blocker),
                }
            }
        }
    }

    /// Flip the learnt flag of the binary watcher under `lit`.
    pub fn set_bin_learnt(&mut self, lit: Lit, other: Lit, learnt: bool) {
        for w in self.occs[lit].iter_mut() {
            if let Watcher::Bin {
                other: o,
                learnt: l,
            } = w
            {
                if *o == other && *l != learnt {
                    *l = learnt;
                    return;
                }
            }
        }
        panic!("binary watcher not found for promotion");
    }
}

impl ops::Index<Lit> for Watches {
    type Output = WatchList;
    #[inline]
    fn index(&self, index: Lit) -> &Self::Output {
        &self.occs[index]
    }
}
impl ops::IndexMut<Lit> for Watches {
    #[inline]
    fn index_mut(&mut self, index: Lit) -> &mut Self::Output {
        &mut self.occs[index]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::clause::Var;

    fn lit(i: u32, sign: bool) -> Lit {
        Lit::new(Var::from_idx(i), sign)
    }

    #[test]
    fn test_watch_order() {
        let b0 = Watcher::Bin {
            other: lit(1, true),
            learnt: false,
        };
        let b1 = Watcher::Bin {
            other: lit(1, true),
            learnt: true,
        };
        let b2 = Watcher::Bin {
            other: lit(2, false),
            learnt: false,
        };
        let t = Watcher::Tri {
            a: lit(0, true),
            b: lit(1, true),
            learnt: false,
        };
        let l = Watcher::Long {
            cref: CRef::UNDEF,
            blocker: lit(0, true),
        };
        let mut ws = vec![l, t, b2, b1, b0];
        ws.sort_unstable_by(watch_cmp);
        assert_eq!(ws, vec![b0, b1, b2, t, l]);
    }
}
