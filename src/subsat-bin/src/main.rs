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

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::process::exit;

use clap::{App, Arg};
use flate2::bufread::GzDecoder;
use log::debug;
use subsat::{dimacs, lbool, Solver, SolverOpts};

fn main() {
    env_logger::init();
    let exitcode = main2().unwrap_or_else(|err| {
        eprintln!("{}", err);
        if err.kind() == io::ErrorKind::InvalidInput {
            3
        } else {
            1
        }
    });
    exit(exitcode);
}

fn main2() -> io::Result<i32> {
    let matches = App::new("subsat")
        .version("0.3.0")
        .about("CDCL SAT solver with inprocessing subsumption")
        .arg(
            Arg::with_name("input-file")
                .help("DIMACS CNF input (gzip auto-detected); stdin when absent"),
        )
        .arg(
            Arg::with_name("verbosity")
                .long("verb")
                .default_value("0")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("garbage-frac")
                .long("gc-frac")
                .help("The fraction of wasted memory allowed before a garbage collection is triggered")
                .default_value("0.20")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("restart-first")
                .long("rfirst")
                .help("The base restart interval")
                .default_value("100")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("restart-inc")
                .long("rinc")
                .help("Restart interval increase factor")
                .default_value("2.0")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("no-luby")
                .long("no-luby")
                .help("Use geometric restarts instead of the Luby sequence"),
        )
        .arg(
            Arg::with_name("conf-budget")
                .long("conf-budget")
                .help("Give up after this many conflicts (prints UNKNOWN)")
                .default_value("-1")
                .takes_value(true),
        )
        .get_matches();

    let mut opts = SolverOpts::default();
    opts.garbage_frac = matches
        .value_of("garbage-frac")
        .and_then(|s| s.parse().ok())
        .unwrap_or(opts.garbage_frac);
    opts.restart_first = matches
        .value_of("restart-first")
        .and_then(|s| s.parse().ok())
        .unwrap_or(opts.restart_first);
    opts.restart_inc = matches
        .value_of("restart-inc")
        .and_then(|s| s.parse().ok())
        .unwrap_or(opts.restart_inc);
    opts.luby_restart = !matches.is_present("no-luby");
    if !opts.check() {
        eprintln!("Invalid option value");
        exit(1);
    }

    let verbosity: i32 = matches
        .value_of("verbosity")
        .unwrap()
        .parse()
        .unwrap_or(0);
    let conf_budget: i64 = matches
        .value_of("conf-budget")
        .and_then(|s| s.parse().ok())
        .unwrap_or(-1);

    let mut solver = Solver::new(opts);

    if let Some(input_file) = matches.value_of("input-file") {
        debug!("solve file {}", input_file);
        let file = BufReader::new(File::open(input_file)?);
        read_input_autogz(file, &mut solver)?;
    } else {
        let stdin = io::stdin();
        read_input_autogz(stdin.lock(), &mut solver)?;
    }

    if verbosity > 0 {
        println!("c variables             : {}", solver.num_vars());
        println!("c clauses               : {}", solver.num_clauses());
    }

    if !solver.simplify() {
        if verbosity > 0 {
            println!("c solved by unit propagation");
            solver.print_stats();
        }
        println!("UNSAT");
        return Ok(0);
    }

    let ret = solver.solve_limited(&[], conf_budget);
    if verbosity > 0 {
        solver.print_stats();
    }

    if ret == lbool::TRUE {
        println!("SAT");
        let assignment: Vec<String> = solver
            .get_model()
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                if v == lbool::TRUE {
                    format!("{}", i + 1)
                } else {
                    format!("-{}", i + 1)
                }
            })
            .collect();
        println!("{}", assignment.join(" "));
    } else if ret == lbool::FALSE {
        println!("UNSAT");
    } else {
        println!("UNKNOWN");
    }

    Ok(0)
}

fn read_input_autogz<R: BufRead>(mut input: R, solver: &mut Solver) -> io::Result<()> {
    let is_gz = input.fill_buf()?.starts_with(b"\x1F\x8B");
    if is_gz {
        let mut decoded = BufReader::new(GzDecoder::new(input));
        dimacs::parse(&mut decoded, solver)
    } else {
        dimacs::parse(&mut input, solver)
    }
}
