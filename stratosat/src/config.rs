//! Solver configuration.

use std::f64;

/// Which ordering `reduce_db` uses to rank learnt clauses for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseCleaningType {
    /// Smaller glue kept first, ties broken by size.
    Glue,
    /// Smaller size kept first, ties broken by glue.
    Size,
    /// More propagations+conflicts kept first, ties broken by size.
    PropConfl,
}

/// All tunables of the solver. `check()` validates ranges.
#[derive(Debug, Clone)]
pub struct SolverConf {
    // Simplification pass toggles:
    /// Master switch for the inter-burst simplification pipeline.
    pub do_simplify: bool,
    pub do_probe: bool,
    pub do_clause_vivif: bool,
    pub do_find_and_replace_eq_lits: bool,
    /// Bounded variable elimination.
    pub do_sat_elite: bool,
    pub do_sort_watched: bool,
    pub do_renumber_vars: bool,
    pub do_stamp: bool,
    pub do_calc_reach: bool,
    /// Offer per-cleaning statistics to the callbacks (external sink).
    pub do_sql: bool,
    /// Remove binaries made redundant by longer binary chains during probing.
    pub do_rem_useless_bins: bool,
    /// Reset per-clause usage counters after each cleaning.
    pub clear_stats_every_clean: bool,

    // Learnt-clause cleaning:
    pub clause_cleaning_type: ClauseCleaningType,
    /// Fraction of long learnt clauses removed per cleaning.
    pub ratio_remove_clauses: f64,
    pub do_pre_clause_clean: bool,
    /// Pre-clean removes clauses with fewer props+confls than this...
    pub pre_clause_clean_prop_and_confl_limit: u64,
    /// ...but only once they are at least this many conflicts old.
    pub pre_clean_min_confl_time: u64,
    /// Conflicts before the first cleaning.
    pub start_clean: u64,
    /// Multiplier on the cleaning interval after each cleaning.
    pub increase_clean: f64,
    /// Cleanings between two simplification rounds.
    pub num_clean_between_simplify: u32,

    // Search:
    pub orig_seed: f64,
    /// Initial variable activity bump.
    pub var_inc_start: f64,
    pub var_decay: f64,
    pub random_var_freq: f64,
    /// Phase saving (0=none, 1=limited, 2=full).
    pub phase_saving: i32,
    /// Conflict clause minimization (0=none, 1=basic, 2=deep).
    pub ccmin_mode: i32,
    /// Width of the recent-glue window used by the restart policy.
    pub restart_glue_window: usize,
    /// Restart when recent average glue exceeds this factor of the long-run average.
    pub restart_glue_ratio: f64,
    /// Minimum conflicts inside a burst before a glue restart may fire.
    pub restart_min_confl: u64,

    // Probing:
    /// Base propagation budget of one probing round; scaled up when
    /// previous rounds were productive.
    pub probe_prop_budget: u64,
    /// Propagation budget of the literal-degree ordering pass.
    pub order_lits_prop_budget: u64,

    // Variable elimination:
    /// Extra resolvents allowed beyond the number of removed clauses.
    pub elim_grow_limit: u32,
    /// Variables with more occurrences than this per polarity are not tried.
    pub elim_occ_limit: usize,

    // Vivification:
    pub vivify_prop_budget: u64,

    /// The fraction of wasted arena memory allowed before consolidation.
    pub garbage_frac: f64,

    /// 0..4
    pub verbosity: i32,
    /// Record a DRAT stream of learnt clause additions/deletions. The
    /// simplifier passes that cannot be expressed as DRAT steps are skipped
    /// while this is on.
    pub produce_proof: bool,
}

impl Default for SolverConf {
    fn default() -> SolverConf {
        Self {
            do_simplify: true,
            do_probe: true,
            do_clause_vivif: true,
            do_find_and_replace_eq_lits: true,
            do_sat_elite: true,
            do_sort_watched: true,
            do_renumber_vars: true,
            do_stamp: false,
            do_calc_reach: true,
            do_sql: false,
            do_rem_useless_bins: true,
            clear_stats_every_clean: true,

            clause_cleaning_type: ClauseCleaningType::Glue,
            ratio_remove_clauses: 0.5,
            do_pre_clause_clean: false,
            pre_clause_clean_prop_and_confl_limit: 2,
            pre_clean_min_confl_time: 10_000,
            start_clean: 10_000,
            increase_clean: 1.1,
            num_clean_between_simplify: 2,

            orig_seed: 91648253.0,
            var_inc_start: 1.0,
            var_decay: 0.95,
            random_var_freq: 0.0,
            phase_saving: 2,
            ccmin_mode: 2,
            restart_glue_window: 50,
            restart_glue_ratio: 1.25,
            restart_min_confl: 50,

            probe_prop_budget: 2_000_000,
            order_lits_prop_budget: 500_000,

            elim_grow_limit: 0,
            elim_occ_limit: 40,

            vivify_prop_budget: 2_000_000,

            garbage_frac: 0.20,

            verbosity: 0,
            produce_proof: false,
        }
    }
}

impl SolverConf {
    /// Check that options are valid.
    pub fn check(&self) -> bool {
        (0.0 <= self.ratio_remove_clauses && self.ratio_remove_clauses <= 1.0)
            && (1.0 <= self.increase_clean)
            && self.start_clean >= 1
            && self.num_clean_between_simplify >= 1
            && (0.0 < self.orig_seed && self.orig_seed < f64::INFINITY)
            && (0.0 < self.var_inc_start)
            && (0.0 < self.var_decay && self.var_decay < 1.0)
            && (0.0 <= self.random_var_freq && self.random_var_freq <= 1.0)
            && (0 <= self.phase_saving && self.phase_saving <= 2)
            && (0 <= self.ccmin_mode && self.ccmin_mode <= 2)
            && self.restart_glue_window >= 1
            && (1.0 < self.restart_glue_ratio)
            && (0.0 < self.garbage_frac && self.garbage_frac < f64::INFINITY)
            && (0 <= self.verbosity && self.verbosity <= 4)
    }
}
