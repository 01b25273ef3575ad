//! Random 3-CNF instances: the solver must agree with a reference DPLL
//! procedure on every instance, and every model must satisfy the formula.

use stratosat::{lbool, BasicSolver, Lit, SolverInterface, Var};

/// Small deterministic generator.
struct Rng(u64);

impl Rng {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 16
    }
    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }
}

fn random_3cnf(seed: u64, n_vars: u64, n_clauses: u64) -> Vec<Vec<i32>> {
    let mut rng = Rng(seed.wrapping_mul(0x9e3779b97f4a7c15).wrapping_add(1));
    let mut out = vec![];
    for _ in 0..n_clauses {
        let mut vars = vec![];
        while vars.len() < 3 {
            let v = rng.below(n_vars) as i32 + 1;
            if !vars.contains(&v) {
                vars.push(v);
            }
        }
        let clause: Vec<i32> = vars
            .into_iter()
            .map(|v| if rng.below(2) == 0 { v } else { -v })
            .collect();
        out.push(clause);
    }
    out
}

/// Reference solver: plain DPLL with unit propagation.
struct RefSolver {
    clauses: Vec<Vec<i32>>,
    assign: Vec<i8>, // 0 = unknown, 1 = true, -1 = false
}

impl RefSolver {
    fn new(clauses: Vec<Vec<i32>>, n_vars: usize) -> Self {
        Self {
            clauses,
            assign: vec![0; n_vars],
        }
    }

    fn lit_val(&self, l: i32) -> i8 {
        let v = self.assign[(l.abs() - 1) as usize];
        if l > 0 {
            v
        } else {
            -v
        }
    }

    fn set(&mut self, l: i32, trail: &mut Vec<usize>) {
        let idx = (l.abs() - 1) as usize;
        debug_assert_eq!(self.assign[idx], 0);
        self.assign[idx] = if l > 0 { 1 } else { -1 };
        trail.push(idx);
    }

    fn undo(&mut self, trail: &[usize]) {
        for &idx in trail {
            self.assign[idx] = 0;
        }
    }

    fn dpll(&mut self) -> bool {
        let mut trail = vec![];

        // unit propagation
        loop {
            let mut changed = false;
            for ci in 0..self.clauses.len() {
                let mut satisfied = false;
                let mut unassigned = 0;
                let mut last = 0;
                for i in 0..self.clauses[ci].len() {
                    let l = self.clauses[ci][i];
                    match self.lit_val(l) {
                        1 => {
                            satisfied = true;
                            break;
                        }
                        0 => {
                            unassigned += 1;
                            last = l;
                        }
                        _ => (),
                    }
                }
                if satisfied {
                    continue;
                }
                if unassigned == 0 {
                    self.undo(&trail);
                    return false;
                }
                if unassigned == 1 {
                    self.set(last, &mut trail);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        // find a branching literal in some unsatisfied clause
        let mut branch = 0;
        for ci in 0..self.clauses.len() {
            if self.clauses[ci].iter().any(|&l| self.lit_val(l) == 1) {
                continue;
            }
            for &l in &self.clauses[ci] {
                if self.lit_val(l) == 0 {
                    branch = l;
                    break;
                }
            }
            if branch != 0 {
                break;
            }
        }
        if branch == 0 {
            // every clause satisfied
            return true;
        }

        for &l in [branch, -branch].iter() {
            let mut sub = vec![];
            self.set(l, &mut sub);
            if self.dpll() {
                return true;
            }
            self.undo(&sub);
        }
        self.undo(&trail);
        false
    }
}

fn run_comparison(seed: u64, n_vars: u64, n_clauses: u64) {
    let clauses = random_3cnf(seed, n_vars, n_clauses);

    let expected = RefSolver::new(clauses.clone(), n_vars as usize).dpll();

    let mut s = BasicSolver::default();
    for _ in 0..n_vars {
        s.new_var_default();
    }
    let mut ok = true;
    for c in &clauses {
        let mut lits: Vec<Lit> = c
            .iter()
            .map(|&x| Lit::new(Var::from_idx((x.abs() - 1) as u32), x > 0))
            .collect();
        ok = s.add_clause_reuse(&mut lits);
        if !ok {
            break;
        }
    }
    let res = if ok {
        s.solve_limited(&[])
    } else {
        lbool::FALSE
    };
    assert_ne!(res, lbool::UNDEF, "no budget involved, seed {}", seed);
    assert_eq!(
        res == lbool::TRUE,
        expected,
        "verdict mismatch on seed {}",
        seed
    );

    if res == lbool::TRUE {
        for c in &clauses {
            let sat = c.iter().any(|&x| {
                let v = Var::from_idx((x.abs() - 1) as u32);
                s.value_lit(Lit::new(v, x > 0)) == lbool::TRUE
            });
            assert!(sat, "model violates clause {:?} on seed {}", c, seed);
        }
        assert!(s.verify_model(), "verify_model failed on seed {}", seed);
        s.check_stats();
    }
}

#[test]
fn test_random_3cnf_agrees_with_reference() {
    for seed in 0..150 {
        run_comparison(seed, 30, 128);
    }
}

#[test]
fn test_random_3cnf_phase_transition() {
    for seed in 1000..1025 {
        run_comparison(seed, 50, 213);
    }
}

#[test]
fn test_random_3cnf_easy_sat() {
    // under-constrained: almost always satisfiable, good model coverage
    for seed in 2000..2050 {
        run_comparison(seed, 40, 80);
    }
}
