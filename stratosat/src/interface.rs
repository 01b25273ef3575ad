/* Main Interface */

use crate::clause::{lbool, Lit, Var};
use std::io::{self, Write};

/// Main interface for a solver: it makes it possible to add clauses,
/// allocate variables, and check for satisfiability.
///
/// Clause and model literals use the externally visible variable numbering,
/// which is stable across the solver's internal renumbering.
pub trait SolverInterface {
    fn num_vars(&self) -> u32;
    fn num_clauses(&self) -> u64;
    fn num_conflicts(&self) -> u64;
    fn num_propagations(&self) -> u64;
    fn num_decisions(&self) -> u64;
    fn num_restarts(&self) -> u64;

    fn is_ok(&self) -> bool;

    /// Print some current statistics to standard output.
    fn print_stats(&self);

    /// Creates a new SAT variable in the solver. If 'decision' is cleared,
    /// the variable will not be used as a decision variable (NOTE! This has
    /// effects on the meaning of a SATISFIABLE result).
    fn new_var(&mut self, dvar: bool) -> Var;

    /// Create a new variable with the default (decision) setting.
    fn new_var_default(&mut self) -> Var;

    /// Obtain the variable corresponding to the given external index,
    /// creating fresh ones as needed.
    fn var_of_int(&mut self, v_idx: u32) -> Var;

    /// Add a clause to the solver. Returns `false` if the solver is in
    /// an `UNSAT` state. The vector is mutated.
    fn add_clause_reuse(&mut self, clause: &mut Vec<Lit>) -> bool;

    /// Simplify the clause database according to the current top-level
    /// assignment.
    fn simplify(&mut self) -> bool;

    /// Search for a model that respects the given assumptions.
    ///
    /// Returns `TRUE` (model found), `FALSE` (unsatisfiable under the
    /// assumptions), or `UNDEF` (interrupted or out of budget).
    fn solve_limited(&mut self, assumps: &[Lit]) -> lbool;

    /// Ask the solver to return as soon as possible. Sticky until the
    /// current solve call returns.
    fn set_need_to_interrupt(&self);

    /// Query whole model. Precondition: last result was `TRUE`.
    fn get_model(&self) -> &[lbool];

    /// Query model for var. Precondition: last result was `TRUE`.
    fn value_var(&self, v: Var) -> lbool;

    /// Query model for lit.
    fn value_lit(&self, l: Lit) -> lbool;

    /// Write the irredundant clauses (units, equivalences, implicit and
    /// long clauses, blocked clauses) as DIMACS.
    fn dump_irred_clauses(&self, w: &mut dyn Write) -> io::Result<()>;

    /// Write the learnt clauses of size at most `max_size` as DIMACS.
    fn dump_learnt_clauses(&self, w: &mut dyn Write, max_size: u32) -> io::Result<()>;
}
