/*****************************************************************************************[main.rs]
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

extern crate clap;
extern crate cpu_time;
extern crate flate2;
extern crate stratosat;

#[cfg(not(feature = "logging"))]
#[macro_use]
pub(crate) mod log {
    macro_rules! debug {
        ($( $x:expr ),*) => {};
    }
}

#[cfg(not(feature = "logging"))]
mod env_logger {
    pub fn init() {}
}

#[cfg(feature = "logging")]
extern crate env_logger;

#[cfg(feature = "logging")]
#[macro_use]
extern crate log;

use clap::{App, Arg};
use flate2::bufread::GzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::mem;
use std::process::exit;
use std::time::Instant;
use stratosat::{
    lbool, Callbacks, ClauseCleaningType, ProgressStatus, Solver, SolverConf, SolverInterface,
};

mod system;

fn main() {
    env_logger::init();
    let exitcode = main2().unwrap_or_else(|err| {
        eprintln!("{}", err);
        exit(1)
    });
    exit(exitcode);
}

/// Printing callbacks
struct CB {
    pub verbosity: i32,
    pub lim: Option<(system::ResourceMeasure, f64)>,
}

impl CB {
    fn new() -> Self {
        CB {
            verbosity: 0,
            lim: None,
        }
    }
}

impl Callbacks for CB {
    fn on_start(&mut self) {
        if self.verbosity >= 1 {
            println!("c ============================[ Search Statistics ]==============================");
            println!("c | Conflicts |          ORIGINAL         |          LEARNT          | Progress |");
            println!("c |           |    Vars  Clauses Literals |  Clauses   Lit/Cl        |          |");
            println!("c ===============================================================================");
        }
    }

    fn on_progress(&mut self, p: &ProgressStatus) {
        if self.verbosity >= 1 {
            println!(
                "c | {:9} | {:7} {:8} {:8} | {:8} {:8.1}        | {:6.3} % |",
                p.conflicts,
                p.dec_vars,
                p.n_clauses,
                p.n_clause_lits,
                p.n_learnt,
                p.n_learnt_lits,
                p.progress_estimate
            );
        }
    }

    fn on_result(&mut self, _: lbool) {
        if self.verbosity >= 1 {
            println!(
                "c ==============================================================================="
            );
        }
    }

    fn on_gc(&mut self, old: usize, new: usize) {
        if self.verbosity >= 2 {
            println!(
                "c |  Consolidation:   {:12} bytes => {:12} bytes                  |",
                old, new
            );
        }
    }

    fn stop(&self) -> bool {
        match self.lim {
            None => false,
            Some((ref r, max_cpu)) => r.cpu_time() > max_cpu,
        }
    }
}

type MSolver = Solver<CB>;

fn main2() -> io::Result<i32> {
    let resource = system::ResourceMeasure::new();

    let matches = App::new("stratosat")
        .version("0.3.1")
        .about("CDCL SAT solver with inprocessing")
        .arg(Arg::with_name("input-file"))
        .arg(Arg::with_name("result-output-file"))
        .arg(
            Arg::with_name("drat")
                .long("drat")
                .takes_value(true)
                .help("write a DRAT proof of unsatisfiability to this path"),
        )
        .arg(
            Arg::with_name("verbosity")
                .long("verb")
                .default_value("1")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("cpu-lim")
                .long("cpu-lim")
                .default_value("-1.0")
                .takes_value(true),
        )
        .arg(Arg::with_name("is-strict").long("strict"))
        .arg(
            Arg::with_name("rnd-seed")
                .long("rnd-seed")
                .help("Seed of the per-instance random generator")
                .default_value("91648253.0")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("var-inc-start")
                .long("var-inc-start")
                .help("Initial variable activity bump")
                .default_value("1.0")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("clean-type")
                .long("clean-type")
                .help("Learnt clause cleaning order (glue, size, propconfl)")
                .default_value("glue")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("ratio-remove")
                .long("ratio-remove")
                .help("Fraction of long learnt clauses removed per cleaning")
                .default_value("0.5")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("start-clean")
                .long("start-clean")
                .help("Conflicts before the first cleaning")
                .default_value("10000")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("increase-clean")
                .long("increase-clean")
                .help("Growth factor of the cleaning interval")
                .default_value("1.1")
                .takes_value(true),
        )
        .arg(Arg::with_name("no-simplify").long("no-simplify"))
        .arg(Arg::with_name("no-probe").long("no-probe"))
        .arg(Arg::with_name("no-vivif").long("no-vivif"))
        .arg(Arg::with_name("no-eq-lits").long("no-eq-lits"))
        .arg(Arg::with_name("no-elim").long("no-elim"))
        .arg(Arg::with_name("no-sort-watched").long("no-sort-watched"))
        .arg(Arg::with_name("no-renumber").long("no-renumber"))
        .arg(Arg::with_name("dump-irred").long("dump-irred").takes_value(true)
             .help("after solving, dump the irredundant clauses to this path"))
        .get_matches();

    let mut conf = SolverConf::default();
    conf.orig_seed = matches
        .value_of("rnd-seed")
        .and_then(|s| s.parse().ok())
        .unwrap_or(conf.orig_seed);
    conf.var_inc_start = matches
        .value_of("var-inc-start")
        .and_then(|s| s.parse().ok())
        .unwrap_or(conf.var_inc_start);
    conf.ratio_remove_clauses = matches
        .value_of("ratio-remove")
        .and_then(|s| s.parse().ok())
        .unwrap_or(conf.ratio_remove_clauses);
    conf.start_clean = matches
        .value_of("start-clean")
        .and_then(|s| s.parse().ok())
        .unwrap_or(conf.start_clean);
    conf.increase_clean = matches
        .value_of("increase-clean")
        .and_then(|s| s.parse().ok())
        .unwrap_or(conf.increase_clean);
    conf.clause_cleaning_type = match matches.value_of("clean-type") {
        Some("size") => ClauseCleaningType::Size,
        Some("propconfl") => ClauseCleaningType::PropConfl,
        _ => ClauseCleaningType::Glue,
    };
    conf.do_simplify = !matches.is_present("no-simplify");
    conf.do_probe = !matches.is_present("no-probe");
    conf.do_clause_vivif = !matches.is_present("no-vivif");
    conf.do_find_and_replace_eq_lits = !matches.is_present("no-eq-lits");
    conf.do_sat_elite = !matches.is_present("no-elim");
    conf.do_sort_watched = !matches.is_present("no-sort-watched");
    conf.do_renumber_vars = !matches.is_present("no-renumber");

    let drat_path = matches.value_of("drat").map(|s| s.to_string());
    conf.produce_proof = drat_path.is_some();

    let verbosity = matches
        .value_of("verbosity")
        .unwrap()
        .parse::<i32>()
        .unwrap_or(0);
    if verbosity < 0 || verbosity > 4 {
        eprintln!(
            "ERROR! value <{}> is invalid for option \"verb\".",
            verbosity
        );
        exit(1);
    }
    conf.verbosity = verbosity;
    if !conf.check() {
        eprintln!("Invalid option value");
        exit(1);
    }

    let input_file = matches.value_of("input-file");
    let result_output_file = matches.value_of("result-output-file");
    let is_strict = matches.is_present("is-strict");
    let cpu_lim = matches
        .value_of("cpu-lim")
        .and_then(|s| s.parse().ok())
        .filter(|x| *x > 0.);

    let mut cb = CB::new();
    cb.verbosity = verbosity;
    if let Some(max_cpu) = cpu_lim {
        assert!(max_cpu > 0.);
        let r = system::ResourceMeasure::new();
        cb.lim = Some((r, max_cpu));
    }

    let mut solver = Solver::new(conf, cb);

    let initial_time = Instant::now();
    if let Some(input_file) = input_file {
        debug!("solve file {}", input_file);
        let file = BufReader::new(File::open(input_file)?);
        read_input_autogz(file, &mut solver, is_strict)?;
    } else {
        println!("c Reading from standard input... Use '--help' for help.");
        let stdin = io::stdin();
        read_input_autogz(stdin.lock(), &mut solver, is_strict)?;
    }

    let mut resfile = if let Some(result_output_file) = result_output_file {
        Some(BufWriter::new(File::create(result_output_file)?))
    } else {
        None
    };

    if solver.cb().verbosity > 0 {
        println!(
            "c |  Number of variables:  {:12}                                         |",
            solver.num_vars()
        );
        println!(
            "c |  Number of clauses:    {:12}                                         |",
            solver.num_clauses()
        );
        let duration = Instant::now() - initial_time;
        println!(
            "c |  Parse time:           {:9}.{:02} s                                       |",
            duration.as_secs(),
            duration.subsec_nanos() / 10_000_000
        );
    }

    if !solver.simplify() {
        if solver.cb().verbosity > 0 {
            println!(
                "c ==============================================================================="
            );
            println!("c Solved by unit propagation");
            solver.print_stats();
        }
        if let Some(resfile) = resfile.as_mut() {
            writeln!(resfile, "s UNSAT")?;
            resfile.flush()?;
        }
        write_proof(&solver, drat_path.as_deref())?;
        println!("s UNSATISFIABLE");
        exit(20);
    }

    let ret = solver.solve_limited(&[]);
    if solver.cb().verbosity > 0 {
        solver.print_stats();
        println!("c CPU time              : {:.3}s", resource.cpu_time());
    }

    if let Some(path) = matches.value_of("dump-irred") {
        let mut out = BufWriter::new(File::create(path)?);
        solver.dump_irred_clauses(&mut out)?;
        out.flush()?;
    }

    if ret == lbool::TRUE {
        println!("s SATISFIABLE");
        print_model(&solver);
    } else if ret == lbool::FALSE {
        println!("s UNSATISFIABLE");
        write_proof(&solver, drat_path.as_deref())?;
    } else {
        println!("s INDETERMINATE");
    }
    if let Some(resfile) = resfile.as_mut() {
        if ret == lbool::TRUE {
            writeln!(resfile, "s SAT")?;
            let model = solver.get_model();
            write!(resfile, "v ")?;
            for (i, &v) in model.iter().enumerate() {
                if v == lbool::TRUE {
                    write!(resfile, "{} ", i + 1)?;
                } else if v == lbool::FALSE {
                    write!(resfile, "-{} ", i + 1)?;
                }
            }
            writeln!(resfile, "0")?;
        } else if ret == lbool::FALSE {
            writeln!(resfile, "s UNSAT")?;
        } else {
            writeln!(resfile, "s INDET")?;
        }
        resfile.flush()?;
    }
    mem::drop(resfile);

    let exitcode = if ret == lbool::TRUE {
        10
    } else if ret == lbool::FALSE {
        20
    } else {
        0
    };

    if !cfg!(debug_assertions) {
        // (faster than "return", which will invoke the destructor for 'Solver')
        exit(exitcode);
    }

    Ok(exitcode)
}

fn print_model(solver: &MSolver) {
    print!("v ");
    for (i, &v) in solver.get_model().iter().enumerate() {
        if v == lbool::TRUE {
            print!("{} ", i + 1);
        } else if v == lbool::FALSE {
            print!("-{} ", i + 1);
        }
    }
    println!("0");
}

fn write_proof(solver: &MSolver, path: Option<&str>) -> io::Result<()> {
    if let (Some(path), Some(proof)) = (path, solver.proof()) {
        let mut out = BufWriter::new(File::create(path)?);
        writeln!(out, "{}", proof)?;
        out.flush()?;
    }
    Ok(())
}

fn read_input_autogz<R: BufRead>(
    mut input: R,
    solver: &mut MSolver,
    is_strict: bool,
) -> io::Result<()> {
    let is_gz = input.fill_buf()?.starts_with(b"\x1F\x8B");
    if is_gz {
        read_input(BufReader::new(GzDecoder::new(input)), solver, is_strict)
    } else {
        read_input(input, solver, is_strict)
    }
}

fn read_input<R: BufRead>(mut input: R, solver: &mut MSolver, is_strict: bool) -> io::Result<()> {
    if solver.cb().verbosity > 0 {
        println!("c ============================[ Problem Statistics ]=============================");
    }
    stratosat::dimacs::parse(&mut input, solver, is_strict)?;
    Ok(())
}
