//! End-to-end solver tests: small scenarios, models, assumptions, budgets
//! and garbage-collection equivalence.

use subsat::{lbool, Lit, Solver, SolverOpts};

/// DIMACS-style literal: `3` is the third variable positive, `-3` negated.
fn lit(s: &mut Solver, i: i32) -> Lit {
    assert!(i != 0);
    let v = s.var_of_int((i.abs() - 1) as u32);
    Lit::new(v, i < 0)
}

fn add(s: &mut Solver, c: &[i32]) -> bool {
    let lits: Vec<Lit> = c.iter().map(|&i| lit(s, i)).collect();
    s.add_clause(&lits)
}

#[test]
fn single_unit_is_sat() {
    let mut s = Solver::default();
    assert!(add(&mut s, &[1]));
    assert!(s.solve(&[]));
    assert_eq!(s.get_model()[0], lbool::TRUE);
}

#[test]
fn complementary_units_are_unsat() {
    let mut s = Solver::default();
    assert!(add(&mut s, &[1]));
    assert!(!add(&mut s, &[-1]));
    assert!(!s.is_ok());
    assert!(!s.solve(&[]));
}

#[test]
fn three_clause_instance_is_sat_and_model_checks() {
    let clauses: &[&[i32]] = &[&[1, 2], &[-1, 3], &[-2, -3]];
    let mut s = Solver::default();
    for c in clauses {
        assert!(add(&mut s, c));
    }
    assert!(s.solve(&[]));
    for c in clauses {
        let sat = c.iter().any(|&i| {
            let l = lit(&mut s, i);
            s.model_value_lit(l) == lbool::TRUE
        });
        assert!(sat, "model does not satisfy clause {:?}", c);
    }
}

/// PHP(3,2): three pigeons do not fit into two holes.
#[test]
fn pigeonhole_3_2_is_unsat() {
    let mut s = Solver::default();
    let x = |p: i32, h: i32| p * 2 + h + 1;
    for p in 0..3 {
        assert!(add(&mut s, &[x(p, 0), x(p, 1)]));
    }
    for h in 0..2 {
        for p in 0..3 {
            for q in (p + 1)..3 {
                assert!(add(&mut s, &[-x(p, h), -x(q, h)]));
            }
        }
    }
    assert!(!s.solve(&[]));
}

#[test]
fn tautology_is_discarded_at_ingestion() {
    let mut s = Solver::default();
    assert!(add(&mut s, &[1, -1, 2]));
    assert_eq!(s.num_clauses(), 0);
    assert!(s.solve(&[]));
}

#[test]
fn duplicate_literals_are_collapsed() {
    let mut s = Solver::default();
    assert!(add(&mut s, &[2, 1, 2, 1]));
    assert!(s.solve(&[]));
    // the clause collapsed to a binary one
    assert_eq!(s.num_clauses(), 1);
}

#[test]
fn units_propagate_at_level_zero() {
    let mut s = Solver::default();
    assert!(add(&mut s, &[1]));
    assert!(add(&mut s, &[-1, 2]));
    assert!(add(&mut s, &[-2, 3]));
    // the implication chain is forced without any search
    for i in [1, 2, 3] {
        let l = lit(&mut s, i);
        assert_eq!(s.value_lit(l), lbool::TRUE);
    }
    assert_eq!(s.num_assigns(), 3);
    assert_eq!(s.decision_level(), 0);
}

#[test]
fn failed_assumptions_produce_a_core() {
    let mut s = Solver::default();
    assert!(add(&mut s, &[-1, 2])); // 1 implies 2
    let a1 = lit(&mut s, 1);
    let a2 = lit(&mut s, -2);
    assert_eq!(s.solve_limited(&[a1, a2], -1), lbool::FALSE);

    let core = s.unsat_core().to_vec();
    assert!(!core.is_empty());
    // the core consists of negated assumptions
    for l in &core {
        assert!(*l == !a1 || *l == !a2, "unexpected core literal {:?}", l);
    }
    assert!(core.contains(&!a2));

    // the solver is still usable without the assumptions
    assert!(s.is_ok());
    assert!(s.solve(&[]));
}

#[test]
fn true_assumptions_keep_instance_sat() {
    let mut s = Solver::default();
    assert!(add(&mut s, &[1, 2]));
    let a = lit(&mut s, 1);
    assert!(s.solve(&[a]));
    assert_eq!(s.model_value_lit(a), lbool::TRUE);
}

#[test]
fn conflict_budget_exhaustion_returns_undef() {
    let mut s = Solver::default();
    assert!(add(&mut s, &[1, 2]));
    assert!(add(&mut s, &[-1, 2]));
    assert_eq!(s.solve_limited(&[], 0), lbool::UNDEF);
    // a later unbounded call finishes the job
    assert!(s.solve(&[]));
}

#[test]
fn simplify_reaches_a_fixpoint() {
    let mut s = Solver::default();
    assert!(add(&mut s, &[1]));
    assert!(add(&mut s, &[1, 2, 3]));
    assert!(add(&mut s, &[-1, 2, 4]));
    assert!(s.simplify());
    let clauses_after = s.num_clauses();
    let assigns_after = s.num_assigns();
    assert!(s.simplify());
    assert_eq!(s.num_clauses(), clauses_after);
    assert_eq!(s.num_assigns(), assigns_after);
}

#[test]
fn released_variable_keeps_its_polarity() {
    let mut s = Solver::default();
    assert!(add(&mut s, &[1, 2]));
    let b = lit(&mut s, -2);
    s.release_var(b);
    assert_eq!(s.value_lit(b), lbool::TRUE);
    assert!(s.solve(&[]));
    assert_eq!(s.model_value_lit(b), lbool::TRUE);
}

/// The solver must produce identical verdicts whether the collector runs
/// rarely (default) or after practically every tombstoning.
#[test]
fn gc_pressure_does_not_change_verdicts() {
    let run = |garbage_frac: f64| -> (bool, bool) {
        let mk = || {
            let opts = SolverOpts {
                garbage_frac,
                ..SolverOpts::default()
            };
            Solver::new(opts)
        };

        // a satisfiable instance with redundant clauses to tombstone
        let mut sat = mk();
        assert!(add(&mut sat, &[1, 2, 3]));
        assert!(add(&mut sat, &[1, 2]));
        assert!(add(&mut sat, &[-1, 4]));
        assert!(add(&mut sat, &[-2, -4, 5]));
        assert!(add(&mut sat, &[2, 5]));
        assert!(add(&mut sat, &[-3]));
        let sat_res = sat.solve(&[]);

        let mut unsat = mk();
        let x = |p: i32, h: i32| p * 2 + h + 1;
        for p in 0..3 {
            assert!(add(&mut unsat, &[x(p, 0), x(p, 1)]));
        }
        for h in 0..2 {
            for p in 0..3 {
                for q in (p + 1)..3 {
                    assert!(add(&mut unsat, &[-x(p, h), -x(q, h)]));
                }
            }
        }
        let unsat_res = unsat.solve(&[]);
        (sat_res, unsat_res)
    };

    let (sat_default, unsat_default) = run(0.20);
    let (sat_eager, unsat_eager) = run(1e-9);
    assert!(sat_default && sat_eager);
    assert!(!unsat_default && !unsat_eager);
}

#[test]
fn forced_collection_preserves_state() {
    let mut s = Solver::default();
    assert!(add(&mut s, &[1, 2, 3]));
    assert!(add(&mut s, &[-1, 2]));
    assert!(add(&mut s, &[-2, 3]));
    s.garbage_collect();
    assert!(s.solve(&[]));
    let l = lit(&mut s, 3);
    assert_eq!(s.model_value_lit(l), lbool::TRUE);
}
