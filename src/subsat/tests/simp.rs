//! Subsumption simplifier tests: clause removal, self-subsuming resolution,
//! level-0 strengthening and fixpoint behaviour.

use subsat::{lbool, Lit, Solver, SolverOpts};

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
fn subsumed_clause_is_removed() {
    let mut s = Solver::default();
    assert!(add(&mut s, &[1, 2, 3]));
    assert!(add(&mut s, &[1, 2]));
    assert_eq!(s.num_clauses(), 2);

    assert!(s.reduction_by_subsumption());
    assert_eq!(s.num_clauses(), 1);

    // the verdict is unchanged by the simplification
    assert!(s.solve(&[]));
    let sat = [1, 2].iter().any(|&i| {
        let l = lit(&mut s, i);
        s.model_value_lit(l) == lbool::TRUE
    });
    assert!(sat);
}

#[test]
fn adding_a_clause_twice_reduces_to_one() {
    let mut s = Solver::default();
    assert!(add(&mut s, &[1, 2]));
    assert!(add(&mut s, &[1, 2]));
    assert_eq!(s.num_clauses(), 2);
    assert!(s.reduction_by_subsumption());
    assert_eq!(s.num_clauses(), 1);
    assert!(s.solve(&[]));
}

#[test]
fn self_subsumption_derives_a_unit() {
    let mut s = Solver::default();
    assert!(add(&mut s, &[1, 2]));
    assert!(add(&mut s, &[-1, 2]));
    // pad the occurrence list of 1 so the candidate scan of {1,2} goes
    // through 2, where the resolvable partner lives
    assert!(add(&mut s, &[1, 3, 4]));
    assert!(add(&mut s, &[1, 5, 6]));
    assert!(s.reduction_by_subsumption());

    // resolving the pair leaves the unit 2, forced at level 0
    let l = lit(&mut s, 2);
    assert_eq!(s.value_lit(l), lbool::TRUE);
    assert_eq!(s.decision_level(), 0);

    assert!(s.solve(&[]));
    assert_eq!(s.model_value_lit(l), lbool::TRUE);
}

#[test]
fn level0_strengthening_feeds_subsumption() {
    let mut s = Solver::default();
    assert!(add(&mut s, &[1, 2, 3]));
    assert!(add(&mut s, &[2, 3, 4]));
    assert!(add(&mut s, &[-1]));
    assert_eq!(s.num_clauses(), 2);

    // cleanup strengthens {1,2,3} to {2,3}, which then subsumes {2,3,4}
    assert!(s.reduction_by_subsumption());
    assert_eq!(s.num_clauses(), 1);
    assert!(s.solve(&[]));
}

#[test]
fn reduction_is_a_fixpoint() {
    let mut s = Solver::default();
    assert!(add(&mut s, &[1, 2, 3]));
    assert!(add(&mut s, &[1, 2]));
    assert!(add(&mut s, &[-2, 3]));
    assert!(s.reduction_by_subsumption());
    let after_first = s.num_clauses();
    assert!(s.reduction_by_subsumption());
    assert_eq!(s.num_clauses(), after_first);
}

#[test]
fn reduction_can_prove_unsat() {
    let mut s = Solver::default();
    assert!(add(&mut s, &[1, 2]));
    assert!(add(&mut s, &[-1, 2]));
    assert!(add(&mut s, &[1, -2]));
    assert!(add(&mut s, &[-1, -2]));
    // self-subsuming resolution derives both 2 and -2
    assert!(!s.reduction_by_subsumption());
    assert!(!s.is_ok());
    assert!(!s.solve(&[]));
}

#[test]
fn eager_gc_during_reduction_is_safe() {
    let opts = SolverOpts {
        garbage_frac: 1e-9,
        ..SolverOpts::default()
    };
    let mut s = Solver::new(opts);
    assert!(add(&mut s, &[1, 2, 3]));
    assert!(add(&mut s, &[1, 2]));
    assert!(add(&mut s, &[2, 3, 4]));
    assert!(add(&mut s, &[-1, 4, 5]));
    // {1,2} subsumes {1,2,3}; the tombstone plus the tiny threshold forces a
    // collection while the scan queue still holds live handles
    assert!(s.reduction_by_subsumption());
    assert_eq!(s.num_clauses(), 3);
    assert!(s.solve(&[]));
}
