//! Properties of the simplification pipeline: idempotence and counter
//! consistency.

use stratosat::{dimacs, lbool, BasicSolver, SolverInterface};

fn solver_for(input: &str) -> BasicSolver {
    let mut s = BasicSolver::default();
    dimacs::parse_str(input, &mut s).expect("parse");
    s
}

fn dump_string(s: &BasicSolver) -> String {
    let mut out: Vec<u8> = vec![];
    s.dump_irred_clauses(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

/// Once simplification reaches its fixpoint, a further round must change
/// nothing except statistics counters.
fn check_simplify_idempotent(cnf: &str) {
    let mut s = solver_for(cnf);
    let mut last = String::new();
    let mut stable = false;
    for _ in 0..4 {
        assert!(s.simplify_full());
        s.check_stats();
        let d = dump_string(&s);
        if d == last {
            stable = true;
            break;
        }
        last = d;
    }
    assert!(stable, "simplification did not reach a fixpoint");
    let replaced = s.num_replaced_vars();
    let elimed = s.num_elimed_vars();
    assert!(s.simplify_full());
    s.check_stats();
    assert_eq!(last, dump_string(&s), "extra simplify changed the clause set");
    assert_eq!(replaced, s.num_replaced_vars());
    assert_eq!(elimed, s.num_elimed_vars());
}

#[test]
fn test_simplify_idempotent_cycle() {
    check_simplify_idempotent("p cnf 4 4\n-1 2 0\n-2 3 0\n-3 4 0\n-4 1 0\n");
}

#[test]
fn test_simplify_idempotent_pigeon() {
    check_simplify_idempotent(
        "p cnf 6 9\n1 2 0\n3 4 0\n5 6 0\n-1 -3 0\n-1 -5 0\n-3 -5 0\n\
         -2 -4 0\n-2 -6 0\n-4 -6 0\n",
    );
}

#[test]
fn test_simplify_idempotent_mixed() {
    // binaries, ternaries and long clauses together
    check_simplify_idempotent(
        "p cnf 8 10\n1 2 0\n-2 3 0\n1 2 3 0\n-3 4 5 0\n4 5 6 7 0\n\
         -4 -5 0\n-6 7 8 0\n-7 -8 0\n2 5 -6 -8 0\n1 -3 6 8 0\n",
    );
}

#[test]
fn test_counters_after_solving() {
    let cnf = "p cnf 8 10\n1 2 0\n-2 3 0\n1 2 3 0\n-3 4 5 0\n4 5 6 7 0\n\
               -4 -5 0\n-6 7 8 0\n-7 -8 0\n2 5 -6 -8 0\n1 -3 6 8 0\n";
    let mut s = solver_for(cnf);
    let r = s.solve_limited(&[]);
    assert_eq!(r, lbool::TRUE);
    s.check_stats();
}

#[test]
fn test_duplicate_binary_removed() {
    use stratosat::{BasicCallbacks, Solver, SolverConf};
    // the same binary twice, plus a subsumed ternary; elimination is off so
    // only the implicit-clause sweep touches the instance
    let mut conf = SolverConf::default();
    conf.do_sat_elite = false;
    let mut s: Solver<BasicCallbacks> = Solver::new(conf, BasicCallbacks::new());
    dimacs::parse_str("p cnf 3 3\n1 2 0\n1 2 0\n1 2 3 0\n", &mut s).unwrap();
    assert_eq!(s.num_clauses(), 3);
    assert!(s.simplify_full());
    s.check_stats();
    assert_eq!(s.num_clauses(), 1, "duplicate and subsumed clauses remain");
    assert_eq!(s.solve_limited(&[]), lbool::TRUE);
}

#[test]
fn test_strengthen_binary_pair_gives_unit() {
    // (1 2) and (1 -2) force 1
    let mut s = solver_for("p cnf 2 2\n1 2 0\n1 -2 0\n");
    assert!(s.simplify_full());
    let mut out: Vec<u8> = vec![];
    s.dump_irred_clauses(&mut out).unwrap();
    let dump = String::from_utf8(out).unwrap();
    assert!(dump.lines().any(|l| l.trim() == "1 0"), "{}", dump);
}
