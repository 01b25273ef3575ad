//! DRAT proof recording.
//!
//! Steps are stored structurally (addition or deletion, plus a range into
//! one shared literal buffer) and only rendered to the textual DRAT format
//! when the proof is written out.

use crate::clause::Lit;
use std::fmt;

#[derive(Debug, Clone, Copy)]
struct Step {
    delete: bool,
    start: u32,
    len: u32,
}

/// A proof under construction: the ordered clause additions and deletions
/// derived while solving.
#[derive(Debug, Clone, Default)]
pub struct Proof {
    steps: Vec<Step>,
    lits: Vec<Lit>,
}

impl Proof {
    /// New proof recording structure.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    fn push_step(&mut self, delete: bool, c: &[Lit]) {
        let start = self.lits.len() as u32;
        self.lits.extend_from_slice(c);
        self.steps.push(Step {
            delete,
            start,
            len: c.len() as u32,
        });
    }

    /// Register clause creation.
    pub fn create_clause(&mut self, c: &[Lit]) {
        self.push_step(false, c);
    }

    /// Register clause deletion.
    pub fn delete_clause(&mut self, c: &[Lit]) {
        self.push_step(true, c);
    }

    fn step_lits(&self, s: &Step) -> &[Lit] {
        &self.lits[s.start as usize..(s.start + s.len) as usize]
    }
}

impl fmt::Display for Proof {
    /// Plain-text DRAT: one step per line, deletions prefixed with `d`.
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        for s in &self.steps {
            if s.delete {
                write!(out, "d")?;
            }
            for &lit in self.step_lits(s) {
                let i = (if lit.sign() { 1 } else { -1 }) * ((lit.var().idx() + 1) as i64);
                write!(out, " {}", i)?;
            }
            writeln!(out, " 0")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::clause::Var;

    #[test]
    fn test_text_rendering() {
        let mut p = Proof::new();
        let a = Lit::new(Var::from_idx(0), true);
        let b = Lit::new(Var::from_idx(1), false);
        p.create_clause(&[a, b]);
        p.delete_clause(&[b]);
        assert_eq!(p.len(), 2);
        assert_eq!(p.to_string(), " 1 -2 0\nd -2 0\n");
    }
}
