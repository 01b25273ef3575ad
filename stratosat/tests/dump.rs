//! Dumping the irredundant clauses and re-parsing them must preserve
//! satisfiability, and a model of the re-parsed formula must satisfy the
//! original one.

use stratosat::{dimacs, lbool, BasicSolver, Lit, SolverInterface, Var};

fn clauses_of(input: &str) -> Vec<Vec<i32>> {
    let mut out = vec![];
    for line in input.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('p') || line.starts_with('c') {
            continue;
        }
        let lits: Vec<i32> = line
            .split_whitespace()
            .map(|t| t.parse::<i32>().unwrap())
            .take_while(|&x| x != 0)
            .collect();
        if !lits.is_empty() {
            out.push(lits);
        }
    }
    out
}

fn model_satisfies(s: &BasicSolver, clauses: &[Vec<i32>]) -> bool {
    clauses.iter().all(|c| {
        c.iter().any(|&x| {
            let v = Var::from_idx((x.abs() - 1) as u32);
            s.value_lit(Lit::new(v, x > 0)) == lbool::TRUE
        })
    })
}

fn check_roundtrip(cnf: &str) {
    let original = clauses_of(cnf);

    let mut s = BasicSolver::default();
    dimacs::parse_str(cnf, &mut s).unwrap();
    if !s.simplify_full() {
        // simplification already proved unsatisfiability
        assert_eq!(s.solve_limited(&[]), lbool::FALSE);
        return;
    }

    let mut dumped: Vec<u8> = vec![];
    s.dump_irred_clauses(&mut dumped).unwrap();
    let dumped = String::from_utf8(dumped).unwrap();

    let mut fresh = BasicSolver::default();
    dimacs::parse_str(&dumped, &mut fresh).unwrap();

    let r1 = s.solve_limited(&[]);
    let r2 = fresh.solve_limited(&[]);
    assert_eq!(r1, r2, "verdicts differ after dump/re-parse:\n{}", dumped);
    if r2 == lbool::TRUE {
        assert!(
            model_satisfies(&fresh, &original),
            "re-parsed model violates the original formula:\n{}",
            dumped
        );
    }
}

#[test]
fn test_roundtrip_simple_sat() {
    check_roundtrip("p cnf 3 2\n1 -2 0\n2 3 0\n");
}

#[test]
fn test_roundtrip_cycle() {
    check_roundtrip("p cnf 4 4\n-1 2 0\n-2 3 0\n-3 4 0\n-4 1 0\n");
}

#[test]
fn test_roundtrip_mixed() {
    check_roundtrip(
        "p cnf 8 10\n1 2 0\n-2 3 0\n1 2 3 0\n-3 4 5 0\n4 5 6 7 0\n\
         -4 -5 0\n-6 7 8 0\n-7 -8 0\n2 5 -6 -8 0\n1 -3 6 8 0\n",
    );
}

#[test]
fn test_roundtrip_unsat() {
    check_roundtrip(
        "p cnf 3 8\n1 2 3 0\n1 2 -3 0\n1 -2 3 0\n1 -2 -3 0\n\
         -1 2 3 0\n-1 2 -3 0\n-1 -2 3 0\n-1 -2 -3 0\n",
    );
}

#[test]
fn test_roundtrip_header_is_consistent() {
    let cnf = "p cnf 6 9\n1 2 0\n3 4 0\n5 6 0\n-1 -3 0\n-1 -5 0\n-3 -5 0\n\
               -2 -4 0\n-2 -6 0\n-4 -6 0\n";
    let mut s = BasicSolver::default();
    dimacs::parse_str(cnf, &mut s).unwrap();
    assert!(s.simplify_full());
    let mut dumped: Vec<u8> = vec![];
    s.dump_irred_clauses(&mut dumped).unwrap();
    let dumped = String::from_utf8(dumped).unwrap();

    // the declared clause count must match the body
    let header: Vec<&str> = dumped.lines().next().unwrap().split_whitespace().collect();
    assert_eq!(header[0], "p");
    assert_eq!(header[1], "cnf");
    let declared: usize = header[3].parse().unwrap();
    let body = clauses_of(&dumped).len();
    assert_eq!(declared, body, "header clause count mismatch:\n{}", dumped);
}
