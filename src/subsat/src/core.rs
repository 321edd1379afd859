/*****************************************************************************************[core.rs]
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

use std::cmp;
use std::mem;

use log::{debug, info, trace};
use smallvec::SmallVec;

use crate::clause::{
    lbool, CRef, ClauseAllocator, ClauseRef, DeletePred, LSet, Lit, OccLists, OccListsData, VMap,
    Var,
};
use crate::intmap::{Comparator, Heap, HeapData};

/// The solver: owns the clause arena, the trail and both occurrence indices.
///
/// All cross-references between subsystems are [`CRef`] handles into the
/// arena; the garbage collector (`reloc_all`) is the only place that rewrites
/// them.
pub struct Solver {
    /// If the problem is satisfiable, this vector contains the model (if any).
    model: Vec<lbool>,
    /// If the problem is unsatisfiable (possibly under assumptions), this
    /// set represents the final conflict clause expressed in the assumptions.
    conflict: LSet,

    /// List of problem clauses.
    pub(crate) clauses: Vec<CRef>,
    /// List of learnt clauses.
    pub(crate) learnts: Vec<CRef>,
    pub(crate) ca: ClauseAllocator,

    pub(crate) vars: VarState,
    /// Head of the propagation queue (an index into the trail).
    qhead: usize,

    /// Number of live original clauses containing each variable; the
    /// branching heuristic maximizes this.
    activity: VMap<u32>,
    /// Last phase tried for each variable, toggled on every pick.
    polarity: VMap<bool>,
    /// The users preferred polarity of each variable.
    user_pol: VMap<lbool>,
    /// Declares if a variable is eligible for selection in the decision
    /// heuristic.
    decision: VMap<bool>,
    order_heap_data: HeapData<Var>,
    dec_vars: u64,

    /// `watches[lit]` watches the clauses to inspect when `lit` becomes true.
    watches_data: OccListsData<Lit, Watcher>,

    // Simplifier indices and pending work (see simp.rs).
    pub(crate) occ_data: OccListsData<Lit, CRef>,
    pub(crate) touched: VMap<bool>,
    pub(crate) touched_list: Vec<Var>,
    pub(crate) added: Vec<CRef>,
    pub(crate) strengthened: Vec<CRef>,
    pub(crate) subsumption_queue: Vec<CRef>,

    /// If `false`, the constraints are already unsatisfiable. No part of the
    /// solver state may be used!
    pub(crate) ok: bool,
    next_var: Var,
    free_vars: Vec<Var>,
    released_vars: Vec<Var>,
    /// Current set of assumptions provided to solve by the user.
    assumptions: Vec<Lit>,
    pub(crate) seen: VMap<bool>,
    add_tmp: Vec<Lit>,

    /// Amount to bump next clause with.
    cla_inc: f64,
    max_learnts: f64,
    learntsize_adjust_confl: f64,
    learntsize_adjust_cnt: i32,

    /// Number of top-level assignments since last execution of `simplify`.
    simp_db_assigns: i32,
    /// Remaining number of propagations before the next `simplify` does work.
    simp_db_props: i64,
    remove_satisfied: bool,

    /// Conflict count at which to stop the search; negative means unbounded.
    conflict_budget: i64,

    // Statistics
    solves: u64,
    starts: u64,
    decisions: u64,
    propagations: u64,
    conflicts: u64,
    num_clauses: u64,
    num_learnts: u64,
    clauses_literals: u64,
    learnts_literals: u64,

    opts: SolverOpts,
}

/// The current assignments: values, reasons/levels and the trail.
pub(crate) struct VarState {
    /// Current assignment for each variable.
    pub(crate) ass: VMap<lbool>,
    /// Stores reason and level for each variable.
    pub(crate) vardata: VMap<VarData>,
    /// Assignment stack; stores all assignments made in the order they were
    /// made.
    pub(crate) trail: Vec<Lit>,
    /// Separator indices for different decision levels in `trail`.
    pub(crate) trail_lim: Vec<i32>,
}

impl Default for Solver {
    fn default() -> Self {
        Solver::new(SolverOpts::default())
    }
}

// public interface
impl Solver {
    pub fn new(opts: SolverOpts) -> Self {
        assert!(opts.check(), "invalid solver options");
        let mut ca = ClauseAllocator::new();
        // every original clause carries its abstraction for the simplifier
        ca.set_extra_clause_field(true);
        Self {
            model: vec![],
            conflict: LSet::new(),
            clauses: vec![],
            learnts: vec![],
            ca,
            vars: VarState::new(),
            qhead: 0,
            activity: VMap::new(),
            polarity: VMap::new(),
            user_pol: VMap::new(),
            decision: VMap::new(),
            order_heap_data: HeapData::new(),
            dec_vars: 0,
            watches_data: OccListsData::new(),
            occ_data: OccListsData::new(),
            touched: VMap::new(),
            touched_list: vec![],
            added: vec![],
            strengthened: vec![],
            subsumption_queue: vec![],
            ok: true,
            next_var: Var::from_idx(0),
            free_vars: vec![],
            released_vars: vec![],
            assumptions: vec![],
            seen: VMap::new(),
            add_tmp: vec![],
            cla_inc: 1.0,
            max_learnts: 0.0,
            learntsize_adjust_confl: 0.0,
            learntsize_adjust_cnt: 0,
            simp_db_assigns: -1,
            simp_db_props: 0,
            remove_satisfied: true,
            conflict_budget: -1,
            solves: 0,
            starts: 0,
            decisions: 0,
            propagations: 0,
            conflicts: 0,
            num_clauses: 0,
            num_learnts: 0,
            clauses_literals: 0,
            learnts_literals: 0,
            opts,
        }
    }

    /// Creates a new SAT variable in the solver. If `dvar` is cleared, the
    /// variable will not be used as a decision variable (NOTE! This has
    /// effects on the meaning of a SATISFIABLE result).
    pub fn new_var(&mut self, upol: lbool, dvar: bool) -> Var {
        let v = self.free_vars.pop().unwrap_or_else(|| {
            let v = self.next_var;
            self.next_var = Var::from_idx(v.idx() + 1);
            v
        });
        self.watches_data.init(Lit::new(v, false));
        self.watches_data.init(Lit::new(v, true));
        self.occ_data.init(Lit::new(v, false));
        self.occ_data.init(Lit::new(v, true));
        self.vars.ass.insert_default(v, lbool::UNDEF);
        self.vars
            .vardata
            .insert_default(v, VarData::new(CRef::UNDEF, 0));
        self.activity.insert_default(v, 0);
        self.seen.insert_default(v, false);
        self.polarity.insert_default(v, false);
        self.user_pol.insert_default(v, upol);
        self.decision.reserve_default(v);
        self.touched.insert_default(v, true);
        self.touched_list.push(v);
        self.set_decision_var(v, dvar);
        v
    }

    pub fn new_var_default(&mut self) -> Var {
        self.new_var(lbool::UNDEF, true)
    }

    /// The variable with index `v_idx`, created on demand.
    pub fn var_of_int(&mut self, v_idx: u32) -> Var {
        while v_idx >= self.num_vars() {
            self.new_var_default();
        }
        Var::from_idx(v_idx)
    }

    /// Make `l` true from now on and promise to never refer to its variable
    /// again. The id is recycled after the next `simplify`.
    pub fn release_var(&mut self, l: Lit) {
        debug_assert_eq!(self.vars.decision_level(), 0);
        if self.vars.value_lit(l) == lbool::UNDEF {
            self.add_clause(&[l]);
        }
        self.set_decision_var(l.var(), false);
        self.released_vars.push(l.var());
    }

    pub fn set_decision_var(&mut self, v: Var, b: bool) {
        if b && !self.decision[v] {
            self.dec_vars += 1;
        } else if !b && self.decision[v] {
            self.dec_vars -= 1;
        }
        self.decision[v] = b;
        self.insert_var_order(v);
    }

    /// Add a clause; the slice is preprocessed (sorted, deduplicated, level-0
    /// values folded in). Returns `false` if the solver became unsatisfiable.
    pub fn add_clause(&mut self, lits: &[Lit]) -> bool {
        let mut tmp = mem::take(&mut self.add_tmp);
        tmp.clear();
        tmp.extend_from_slice(lits);
        let r = self.add_clause_(&mut tmp);
        self.add_tmp = tmp;
        r
    }

    /// Add a clause reusing the caller's buffer (which is clobbered).
    pub fn add_clause_reuse(&mut self, clause: &mut Vec<Lit>) -> bool {
        debug!("add toplevel clause {:?}", clause);
        self.add_clause_(clause)
    }

    /// Search for a model under the given assumptions, with a conflict
    /// budget; a negative budget means unbounded. Returns UNDEF exactly when
    /// the budget was exhausted.
    pub fn solve_limited(&mut self, assumps: &[Lit], conflict_budget: i64) -> lbool {
        self.assumptions.clear();
        self.assumptions.extend_from_slice(assumps);
        self.conflict_budget = if conflict_budget < 0 {
            -1
        } else {
            self.conflicts as i64 + conflict_budget
        };
        self.solve_internal()
    }

    /// Search for a model under the given assumptions, without bounds.
    pub fn solve(&mut self, assumps: &[Lit]) -> bool {
        self.solve_limited(assumps, -1) == lbool::TRUE
    }

    /// The current value of a variable.
    pub fn value_var(&self, x: Var) -> lbool {
        self.vars.value(x)
    }
    /// The current value of a literal.
    pub fn value_lit(&self, p: Lit) -> lbool {
        self.vars.value_lit(p)
    }
    /// The value of a variable in the last model.
    pub fn model_value_var(&self, x: Var) -> lbool {
        self.model
            .get(x.idx() as usize)
            .copied()
            .unwrap_or(lbool::UNDEF)
    }
    /// The value of a literal in the last model.
    pub fn model_value_lit(&self, p: Lit) -> lbool {
        self.model_value_var(p.var()) ^ p.sign()
    }
    pub fn get_model(&self) -> &[lbool] {
        &self.model
    }

    /// The final conflict clause expressed in the assumptions, valid after an
    /// UNSAT answer from `solve(assumps)`.
    pub fn unsat_core(&self) -> &[Lit] {
        self.conflict.as_slice()
    }

    pub fn is_ok(&self) -> bool {
        self.ok
    }
    pub fn num_vars(&self) -> u32 {
        self.next_var.idx()
    }
    pub fn num_free_vars(&self) -> u32 {
        let fixed = self
            .vars
            .trail_lim
            .first()
            .map_or(self.vars.trail.len(), |&l| l as usize);
        (self.dec_vars - fixed as u64) as u32
    }
    pub fn num_clauses(&self) -> u64 {
        self.num_clauses
    }
    pub fn num_learnts(&self) -> u64 {
        self.num_learnts
    }
    pub fn num_assigns(&self) -> u32 {
        self.vars.num_assigns()
    }
    pub fn num_conflicts(&self) -> u64 {
        self.conflicts
    }
    pub fn num_decisions(&self) -> u64 {
        self.decisions
    }
    pub fn num_propagations(&self) -> u64 {
        self.propagations
    }
    pub fn num_restarts(&self) -> u64 {
        self.starts
    }
    pub fn decision_level(&self) -> u32 {
        self.vars.decision_level()
    }

    /// Print some current statistics to standard output.
    pub fn print_stats(&self) {
        println!("c restarts              : {}", self.starts);
        println!("c conflicts             : {:<12}", self.conflicts);
        println!("c decisions             : {:<12}", self.decisions);
        println!("c propagations          : {:<12}", self.propagations);
    }

    /// Simplify the clause database according to the current top-level
    /// assignment: drop satisfied clauses, trim false literals, recycle
    /// released variables.
    pub fn simplify(&mut self) -> bool {
        debug_assert_eq!(self.vars.decision_level(), 0);

        if !self.ok || self.propagate().is_some() {
            self.ok = false;
            return false;
        }

        if self.vars.num_assigns() as i32 == self.simp_db_assigns || self.simp_db_props > 0 {
            return true;
        }

        self.remove_satisfied_learnts();
        if self.remove_satisfied {
            if !self.top_level_cleanup() {
                return false;
            }

            if !self.released_vars.is_empty() {
                // remove released variables from the trail and recycle them
                for i in 0..self.released_vars.len() {
                    let v = self.released_vars[i];
                    debug_assert!(!self.seen[v]);
                    self.seen[v] = true;
                }
                {
                    let seen = &self.seen;
                    self.vars.trail.retain(|l| !seen[l.var()]);
                }
                self.qhead = self.vars.trail.len();
                for i in 0..self.released_vars.len() {
                    let v = self.released_vars[i];
                    self.seen[v] = false;
                }
                self.free_vars.extend_from_slice(&self.released_vars);
                self.released_vars.clear();
            }
        }
        self.check_garbage();
        self.rebuild_order_heap();

        self.simp_db_assigns = self.vars.num_assigns() as i32;
        // (shouldn't depend on stats really, but it will do for now)
        self.simp_db_props = (self.clauses_literals + self.learnts_literals) as i64;

        true
    }

    /// Garbage collect the clause arena by moving alive clauses into another
    /// allocator; every persistent handle holder is rewritten.
    pub fn garbage_collect(&mut self) {
        // Initialize the next region to a size corresponding to the estimated
        // utilization degree; this avoids some unnecessary reallocations for
        // the new region.
        let mut to = ClauseAllocator::with_start_cap(self.ca.len() - self.ca.wasted());
        to.set_extra_clause_field(self.ca.extra_clause_field());
        self.reloc_all(&mut to);
        debug!(
            "garbage collection: {} bytes => {} bytes",
            self.ca.len() * ClauseAllocator::UNIT_SIZE,
            to.len() * ClauseAllocator::UNIT_SIZE
        );
        to.move_to(&mut self.ca);
    }
}

// main algorithm
impl Solver {
    pub(crate) fn watches(&mut self) -> OccLists<Lit, Watcher, WatcherDeleted> {
        self.watches_data.promote(WatcherDeleted { ca: &self.ca })
    }

    pub(crate) fn occs(&mut self) -> OccLists<Lit, CRef, ClauseDeleted> {
        self.occ_data.promote(ClauseDeleted { ca: &self.ca })
    }

    fn order_heap(&mut self) -> Heap<Var, VarOrder> {
        self.order_heap_data.promote(VarOrder {
            activity: &self.activity,
        })
    }

    fn insert_var_order(&mut self, x: Var) {
        if !self.order_heap_data.in_heap(x) && self.decision[x] {
            self.order_heap().insert(x);
        }
    }

    /// One more live original clause mentions `v`.
    pub(crate) fn bump_var_activity(&mut self, v: Var) {
        self.activity[v] += 1;
        if self.order_heap_data.in_heap(v) {
            self.order_heap().decrease(v);
        }
    }

    /// One less live original clause mentions `v`.
    pub(crate) fn drop_var_activity(&mut self, v: Var) {
        debug_assert!(self.activity[v] > 0);
        self.activity[v] -= 1;
        if self.order_heap_data.in_heap(v) {
            self.order_heap().increase(v);
        }
    }

    pub(crate) fn is_removed(&self, cr: CRef) -> bool {
        self.ca.get_ref(cr).mark() == 1
    }

    pub(crate) fn satisfied(&self, c: ClauseRef) -> bool {
        c.iter().any(|&lit| self.vars.value_lit(lit) == lbool::TRUE)
    }

    /// Returns `true` if a clause is a reason for some implication in the
    /// current state.
    fn locked(&self, c: ClauseRef) -> bool {
        let reason = self.vars.reason(c[0].var());
        self.vars.value_lit(c[0]) == lbool::TRUE
            && reason != CRef::UNDEF
            && self.ca.get_ref(reason) == c
    }

    /// Test if `p` contradicts the current state, enqueue otherwise.
    pub(crate) fn enqueue(&mut self, p: Lit, from: CRef) -> bool {
        let v = self.vars.value_lit(p);
        if v != lbool::UNDEF {
            v != lbool::FALSE
        } else {
            self.vars.unchecked_enqueue(p, from);
            true
        }
    }

    /// Add clause; `clause` is clobbered.
    fn add_clause_(&mut self, clause: &mut Vec<Lit>) -> bool {
        debug_assert_eq!(
            self.vars.decision_level(),
            0,
            "clauses may only be added at decision level 0"
        );
        if !self.ok {
            return false;
        }
        clause.sort_unstable();

        // check if the clause is satisfied and remove false/duplicate literals
        let mut last_lit = Lit::UNDEF;
        let mut j = 0;
        for i in 0..clause.len() {
            let lit_i = clause[i];
            let value = self.vars.value_lit(lit_i);
            if value == lbool::TRUE || lit_i == !last_lit {
                return true; // satisfied at level 0, or a tautology
            } else if value != lbool::FALSE && lit_i != last_lit {
                last_lit = lit_i;
                clause[j] = lit_i;
                j += 1;
            }
        }
        clause.truncate(j);

        if clause.is_empty() {
            self.ok = false;
            false
        } else if clause.len() == 1 {
            self.vars.unchecked_enqueue(clause[0], CRef::UNDEF);
            self.ok = self.propagate().is_none();
            self.ok
        } else {
            let cr = self.ca.alloc_with_learnt(clause, false);
            self.clauses.push(cr);
            self.attach_clause(cr);
            self.attach_clause_occs(cr);
            true
        }
    }

    /// Attach a clause to the watcher lists.
    pub(crate) fn attach_clause(&mut self, cr: CRef) {
        let (c0, c1, learnt, size) = {
            let c = self.ca.get_ref(cr);
            debug_assert!(c.size() > 1);
            (c[0], c[1], c.learnt(), c.size())
        };
        self.watches()[!c0].push(Watcher::new(cr, c1));
        self.watches()[!c1].push(Watcher::new(cr, c0));
        if learnt {
            self.num_learnts += 1;
            self.learnts_literals += size as u64;
        } else {
            self.num_clauses += 1;
            self.clauses_literals += size as u64;
            let lits: SmallVec<[Lit; 8]> = self.ca.get_ref(cr).iter().copied().collect();
            for l in lits {
                self.bump_var_activity(l.var());
            }
        }
    }

    /// Detach a clause from the watcher lists.
    ///
    /// `strict` removes the watchers eagerly instead of smudging the two
    /// watched slots; required when the clause stays alive with a different
    /// literal set.
    pub(crate) fn detach_clause(&mut self, cr: CRef, strict: bool) {
        let (c0, c1, csize, clearnt) = {
            let c = self.ca.get_ref(cr);
            (c[0], c[1], c.size(), c.learnt())
        };
        debug_assert!(csize > 1);

        {
            let mut watches = self.watches_data.promote(WatcherDeleted { ca: &self.ca });
            if strict {
                let pos = watches[!c0]
                    .iter()
                    .position(|w| w == &Watcher::new(cr, c1))
                    .expect("watcher not found");
                watches[!c0].remove(pos);
                let pos = watches[!c1]
                    .iter()
                    .position(|w| w == &Watcher::new(cr, c0))
                    .expect("watcher not found");
                watches[!c1].remove(pos);
            } else {
                watches.smudge(!c0);
                watches.smudge(!c1);
            }
        }

        if clearnt {
            self.num_learnts -= 1;
            self.learnts_literals -= csize as u64;
        } else {
            self.num_clauses -= 1;
            self.clauses_literals -= csize as u64;
            let lits: SmallVec<[Lit; 8]> = self.ca.get_ref(cr).iter().copied().collect();
            for l in lits {
                self.drop_var_activity(l.var());
            }
        }
    }

    /// Detach and tombstone a clause; the record is reclaimed by the next GC.
    pub(crate) fn remove_clause(&mut self, cr: CRef) {
        self.detach_clause(cr, false);
        {
            // the literal occurrence lists are cleaned lazily too
            let learnt = self.ca.get_ref(cr).learnt();
            if !learnt {
                let lits: SmallVec<[Lit; 8]> = self.ca.get_ref(cr).iter().copied().collect();
                for l in lits {
                    self.occ_data.smudge(l);
                }
            }
        }
        {
            let c = self.ca.get_ref(cr);
            // don't leave pointers to freed memory
            if self.locked(c) {
                self.vars.vardata[c[0].var()].reason = CRef::UNDEF;
            }
        }
        self.ca.get_mut(cr).set_mark(1); // observed by the lazy filters and the relocator
        self.ca.free(cr);
    }

    /// Revert to the state at the given level (keeping all assignments at
    /// `level` but not beyond); phase memory of the unassigned variables is
    /// reset.
    pub(crate) fn cancel_until(&mut self, level: u32) {
        if self.vars.decision_level() > level {
            let lim = self.vars.trail_lim[level as usize] as usize;
            for c in (lim..self.vars.trail.len()).rev() {
                let x = self.vars.trail[c].var();
                self.vars.ass[x] = lbool::UNDEF;
                self.polarity[x] = false;
                self.insert_var_order(x);
            }
            self.qhead = lim;
            self.vars.trail.truncate(lim);
            self.vars.trail_lim.truncate(level as usize);
        }
    }

    /// Propagates all enqueued facts; processes the trail in FIFO order from
    /// the queue head.
    ///
    /// If a conflict arises, the conflicting clause is returned, otherwise
    /// `None`.
    ///
    /// Post-condition: the propagation queue is empty, even if there was a
    /// conflict.
    pub(crate) fn propagate(&mut self) -> Option<CRef> {
        let mut confl = None;
        let mut num_props: u32 = 0;

        while self.qhead < self.vars.trail.len() {
            // `p` is the enqueued fact to propagate
            let p = self.vars.trail[self.qhead];
            self.qhead += 1;
            let watches_data_ptr: *mut OccListsData<Lit, Watcher> = &mut self.watches_data;
            let ws = self
                .watches_data
                .lookup_mut_pred(p, &WatcherDeleted { ca: &self.ca });
            let mut i: usize = 0;
            let mut j: usize = 0;
            let end: usize = ws.len();
            num_props += 1;
            'clauses: while i < end {
                // try to avoid inspecting the clause
                let blocker = ws[i].blocker;
                if self.vars.value_lit(blocker) == lbool::TRUE {
                    ws[j] = ws[i];
                    j += 1;
                    i += 1;
                    continue;
                }

                // make sure the false literal is data[1]
                let cr = ws[i].cref;
                let mut c = self.ca.get_mut(cr);
                let false_lit = !p;
                if c[0] == false_lit {
                    c[0] = c[1];
                    c[1] = false_lit;
                }
                debug_assert_eq!(c[1], false_lit);
                i += 1;

                // if the 0th watch is true, then the clause is already
                // satisfied
                let first = c[0];
                let w = Watcher::new(cr, first);
                if first != blocker && self.vars.value_lit(first) == lbool::TRUE {
                    ws[j] = w;
                    j += 1;
                    continue;
                }

                // look for a new watch
                for k in 2..c.size() {
                    if self.vars.value_lit(c[k]) != lbool::FALSE {
                        c[1] = c[k];
                        c[k] = false_lit;
                        // safe because `!c[1] != p`, so the lists are not
                        // aliased
                        debug_assert_ne!(!c[1], p);
                        unsafe { &mut (&mut (*watches_data_ptr))[!c[1]] }.push(w);
                        continue 'clauses;
                    }
                }

                // did not find a watch -- clause is unit under assignment
                ws[j] = w;
                j += 1;
                if self.vars.value_lit(first) == lbool::FALSE {
                    confl = Some(cr);
                    self.qhead = self.vars.trail.len();
                    // copy the remaining watches
                    while i < end {
                        ws[j] = ws[i];
                        j += 1;
                        i += 1;
                    }
                } else {
                    self.vars.unchecked_enqueue(first, cr);
                }
            }
            ws.truncate(j);
        }
        self.propagations += num_props as u64;
        self.simp_db_props -= num_props as i64;

        confl
    }

    /// Analyze a conflict and produce a first-UIP reason clause.
    ///
    /// Pre-conditions: the current decision level is greater than the root
    /// level and `confl` is falsified by the current trail.
    ///
    /// Post-conditions: `out_learnt[0]` is the asserting literal at the
    /// returned backtrack level; if `out_learnt.len() > 1` then
    /// `out_learnt[1]` has the greatest decision level of the remaining
    /// literals.
    fn analyze(&mut self, confl: CRef, out_learnt: &mut Vec<Lit>) -> i32 {
        debug_assert_ne!(confl, CRef::UNDEF, "analyze called without a conflict");

        let mut cur = confl;
        let mut path_c: i32 = 0;
        let mut p = Lit::UNDEF;

        out_learnt.clear();
        out_learnt.push(Lit::UNDEF); // leave room for the asserting literal
        let mut index = self.vars.trail.len();
        let conflict_level = self.vars.decision_level() as i32;

        loop {
            if cur == CRef::UNDEF {
                // resolution walked past a literal without a reason: the
                // implication graph is inconsistent
                panic!(
                    "conflict analysis reached {:?} with no reason (path_c={})",
                    p, path_c
                );
            }
            if self.ca.get_ref(cur).learnt() {
                self.cla_bump_activity(cur);
            }

            let c = self.ca.get_ref(cur);
            // for a reason clause, position 0 holds the implied literal `p`
            // itself and is skipped
            let start = if p == Lit::UNDEF { 0 } else { 1 };
            for k in start..c.size() {
                let q = c[k];
                let v = q.var();
                if !self.seen[v] && self.vars.vardata[v].level > 0 {
                    self.seen[v] = true;
                    if self.vars.vardata[v].level >= conflict_level {
                        path_c += 1;
                    } else {
                        out_learnt.push(q);
                    }
                }
            }

            // select the next literal on the trail to look at
            while !self.seen[self.vars.trail[index - 1].var()] {
                index -= 1;
            }
            p = self.vars.trail[index - 1];
            index -= 1;
            cur = self.vars.vardata[p.var()].reason;
            self.seen[p.var()] = false;
            path_c -= 1;

            if path_c <= 0 {
                break;
            }
        }
        out_learnt[0] = !p;
        trace!("analyze: learnt {:?}", out_learnt);

        // find the correct backtrack level
        let btlevel = if out_learnt.len() == 1 {
            0
        } else {
            let mut max_i = 1;
            // find the first literal assigned at the next-highest level
            for i in 2..out_learnt.len() {
                if self.vars.level(out_learnt[i].var()) > self.vars.level(out_learnt[max_i].var())
                {
                    max_i = i;
                }
            }
            // swap-in this literal at index 1
            out_learnt.swap(max_i, 1);
            self.vars.level(out_learnt[1].var())
        };

        // every variable still marked is in the learnt clause; the ones at
        // the conflict level were cleared as they were resolved away
        for i in 0..out_learnt.len() {
            let v = out_learnt[i].var();
            self.seen[v] = false;
        }

        btlevel
    }

    /// Specialized analysis procedure to express the final conflict in terms
    /// of assumptions: collects the assumptions that led to the assignment of
    /// `p` into `out_conflict`.
    fn analyze_final(&mut self, p: Lit, out_conflict: &mut LSet) {
        out_conflict.clear();
        out_conflict.insert(p);

        if self.vars.decision_level() == 0 {
            return;
        }

        self.seen[p.var()] = true;

        for i in (self.vars.trail_lim[0] as usize..self.vars.trail.len()).rev() {
            let lit = self.vars.trail[i];
            let x = lit.var();
            if self.seen[x] {
                let reason = self.vars.vardata[x].reason;
                if reason == CRef::UNDEF {
                    debug_assert!(self.vars.vardata[x].level > 0);
                    out_conflict.insert(!lit);
                } else {
                    let c = self.ca.get_ref(reason);
                    for j in 1..c.size() {
                        let v = c[j].var();
                        if self.vars.vardata[v].level > 0 {
                            self.seen[v] = true;
                        }
                    }
                }
                self.seen[x] = false;
            }
        }

        self.seen[p.var()] = false;
    }

    fn pick_branch_lit(&mut self) -> Lit {
        let mut next = Var::UNDEF;

        // activity-ordered decision, ties broken by smallest index
        while next == Var::UNDEF
            || self.vars.value(next) != lbool::UNDEF
            || !self.decision[next]
        {
            if self.order_heap_data.is_empty() {
                next = Var::UNDEF;
                break;
            }
            next = self.order_heap().remove_min();
        }

        if next == Var::UNDEF {
            Lit::UNDEF
        } else if self.user_pol[next] != lbool::UNDEF {
            Lit::new(next, self.user_pol[next] == lbool::FALSE)
        } else {
            // phase alternates on every pick of this variable
            self.polarity[next] = !self.polarity[next];
            Lit::new(next, !self.polarity[next])
        }
    }

    /// Search for a model for at most `nof_conflicts` conflicts (negative
    /// means no bound).
    fn search(&mut self, nof_conflicts: i32) -> lbool {
        debug_assert!(self.ok);
        let mut conflict_c = 0;
        let mut learnt_clause: Vec<Lit> = vec![];
        self.starts += 1;

        loop {
            let confl = self.propagate();

            if let Some(confl) = confl {
                // conflict
                self.conflicts += 1;
                conflict_c += 1;
                if self.vars.decision_level() == 0 {
                    return lbool::FALSE;
                }

                let btlevel = self.analyze(confl, &mut learnt_clause);
                self.cancel_until(btlevel as u32);

                if learnt_clause.len() == 1 {
                    self.vars.unchecked_enqueue(learnt_clause[0], CRef::UNDEF);
                } else {
                    let cr = self.ca.alloc_with_learnt(&learnt_clause, true);
                    self.learnts.push(cr);
                    self.attach_clause(cr);
                    self.cla_bump_activity(cr);
                    self.vars.unchecked_enqueue(learnt_clause[0], cr);
                }

                self.cla_decay_activity();

                self.learntsize_adjust_cnt -= 1;
                if self.learntsize_adjust_cnt == 0 {
                    self.learntsize_adjust_confl *= self.opts.learntsize_adjust_inc;
                    self.learntsize_adjust_cnt = self.learntsize_adjust_confl as i32;
                    self.max_learnts *= self.opts.learntsize_inc;
                    debug!(
                        "conflicts: {}, learnts: {}/{}",
                        self.conflicts, self.num_learnts, self.max_learnts as u64
                    );
                }
            } else {
                // no conflict
                if (nof_conflicts >= 0 && conflict_c >= nof_conflicts) || !self.within_budget() {
                    // reached the bound on the number of conflicts
                    self.cancel_until(0);
                    return lbool::UNDEF;
                }

                // simplify the set of problem clauses
                if self.vars.decision_level() == 0 && !self.simplify() {
                    return lbool::FALSE;
                }

                if self.learnts.len() as f64 - self.vars.num_assigns() as f64 >= self.max_learnts
                {
                    // reduce the set of learnt clauses
                    self.reduce_db();
                }

                // perform user provided assumptions
                let mut next = Lit::UNDEF;
                while (self.vars.decision_level() as usize) < self.assumptions.len() {
                    let p = self.assumptions[self.vars.decision_level() as usize];
                    let v = self.vars.value_lit(p);
                    if v == lbool::TRUE {
                        // dummy decision level, `p` is true already
                        self.vars.new_decision_level();
                    } else if v == lbool::FALSE {
                        let mut conflict = mem::take(&mut self.conflict);
                        self.analyze_final(!p, &mut conflict);
                        self.conflict = conflict;
                        return lbool::FALSE;
                    } else {
                        next = p;
                        break;
                    }
                }

                if next == Lit::UNDEF {
                    // new variable decision
                    next = self.pick_branch_lit();
                    if next == Lit::UNDEF {
                        // all variables are assigned: model found
                        return lbool::TRUE;
                    }
                    self.decisions += 1;
                }

                // increase the decision level and enqueue `next` with no
                // reason, since it is a decision
                trace!("decide {:?}", next);
                self.vars.new_decision_level();
                self.vars.unchecked_enqueue(next, CRef::UNDEF);
            }
        }
    }

    /// Main solve method (assumptions given in `self.assumptions`).
    fn solve_internal(&mut self) -> lbool {
        debug_assert_eq!(self.vars.decision_level(), 0);
        self.model.clear();
        self.conflict.clear();
        if !self.ok {
            return lbool::FALSE;
        }
        self.solves += 1;

        // inprocessing before the search proper
        if !self.reduction_by_subsumption() {
            return lbool::FALSE;
        }

        self.max_learnts =
            (self.num_clauses as f64 * self.opts.learntsize_factor).max(self.opts.min_learnts_lim as f64);
        self.learntsize_adjust_confl = self.opts.learntsize_adjust_start_confl as f64;
        self.learntsize_adjust_cnt = self.learntsize_adjust_confl as i32;

        info!(
            "search start: {} vars, {} clauses",
            self.num_vars(),
            self.num_clauses
        );

        let mut status = lbool::UNDEF;
        let mut curr_restarts: i32 = 0;
        while status == lbool::UNDEF {
            let rest_base = if self.opts.luby_restart {
                utils::luby(self.opts.restart_inc, curr_restarts)
            } else {
                f64::powi(self.opts.restart_inc, curr_restarts)
            };
            status = self.search((rest_base * self.opts.restart_first as f64) as i32);
            if !self.within_budget() {
                break;
            }
            if status == lbool::UNDEF {
                debug!("restart {}", curr_restarts);
            }
            curr_restarts += 1;
        }

        if status == lbool::TRUE {
            // extend and copy the model
            let num_vars = self.num_vars();
            self.model.resize(num_vars as usize, lbool::UNDEF);
            for i in 0..num_vars {
                self.model[i as usize] = self.vars.value(Var::from_idx(i));
            }
        } else if status == lbool::FALSE && self.conflict.len() == 0 {
            // NOTE: with assumptions we may return FALSE with a non-empty
            // conflict; in that case adding clauses can still succeed later.
            self.ok = false;
        }

        self.cancel_until(0);
        debug!("result: {:?}", status);
        status
    }

    /// Remove half of the learnt clauses, minus the clauses locked by the
    /// current assignment. Binary clauses are never removed.
    fn reduce_db(&mut self) {
        // clauses below this activity go regardless of position
        let extra_lim = self.cla_inc / self.learnts.len() as f64;

        {
            let ca = &self.ca;
            self.learnts.sort_unstable_by(|&x, &y| {
                let x = ca.get_ref(x);
                let y = ca.get_ref(y);
                debug_assert!(x.learnt() && y.learnt());
                Ord::cmp(&(x.size() <= 2), &(y.size() <= 2)).then(
                    PartialOrd::partial_cmp(&x.activity(), &y.activity()).expect("NaN activity"),
                )
            });
        }
        let mut j = 0;
        for i in 0..self.learnts.len() {
            let cr = self.learnts[i];
            let cond = {
                let c = self.ca.get_ref(cr);
                c.size() > 2
                    && !self.locked(c)
                    && (i < self.learnts.len() / 2 || (c.activity() as f64) < extra_lim)
            };
            if cond {
                self.remove_clause(cr);
            } else {
                self.learnts[j] = cr;
                j += 1;
            }
        }
        let deleted = self.learnts.len() - j;
        self.learnts.truncate(j);
        debug!("reduce_db: deleted {}", deleted);

        self.check_garbage();
    }

    /// Shrink the learnt set to non-satisfied clauses, trimming false
    /// literals beyond the watched positions.
    fn remove_satisfied_learnts(&mut self) {
        debug_assert_eq!(self.vars.decision_level(), 0);
        let mut j = 0;
        for i in 0..self.learnts.len() {
            let cr = self.learnts[i];
            if self.satisfied(self.ca.get_ref(cr)) {
                self.remove_clause(cr);
            } else {
                let shaved = {
                    let mut c = self.ca.get_mut(cr);
                    debug_assert_eq!(self.vars.value_lit(c[0]), lbool::UNDEF);
                    debug_assert_eq!(self.vars.value_lit(c[1]), lbool::UNDEF);
                    let orig = c.size();
                    let mut end = orig;
                    let mut k = 2;
                    while k < end {
                        if self.vars.value_lit(c[k]) == lbool::FALSE {
                            end -= 1;
                            c[k] = c[end];
                        } else {
                            k += 1;
                        }
                    }
                    if end < orig {
                        c.shrink(end);
                    }
                    orig - end
                };
                self.ca.free_amount(shaved);
                self.learnts_literals -= shaved as u64;
                self.learnts[j] = cr;
                j += 1;
            }
        }
        self.learnts.truncate(j);
    }

    fn rebuild_order_heap(&mut self) {
        let mut vs = vec![];
        for v in (0..self.num_vars()).map(Var::from_idx) {
            if self.decision[v] && self.vars.value(v) == lbool::UNDEF {
                vs.push(v);
            }
        }
        self.order_heap().build(&vs);
    }

    /// Move every live clause to the allocator `to`, rewriting all persistent
    /// handles: watchers, literal occurrences, reasons, the clause lists and
    /// the simplifier's pending work.
    fn reloc_all(&mut self, to: &mut ClauseAllocator) {
        macro_rules! is_removed {
            ($ca:expr, $cr:expr) => {
                $ca.get_ref($cr).mark() == 1
            };
        }

        // all watchers
        self.watches().clean_all();
        for v in (0..self.num_vars()).map(Var::from_idx) {
            for s in 0..2 {
                let p = Lit::new(v, s != 0);
                for watch in &mut self.watches_data[p] {
                    self.ca.reloc(&mut watch.cref, to);
                }
            }
        }

        // all literal occurrences
        self.occs().clean_all();
        for v in (0..self.num_vars()).map(Var::from_idx) {
            for s in 0..2 {
                let p = Lit::new(v, s != 0);
                for cr in &mut self.occ_data[p] {
                    self.ca.reloc(cr, to);
                }
            }
        }

        // all reasons
        for i in 0..self.vars.trail.len() {
            let v = self.vars.trail[i].var();
            let reason = self.vars.vardata[v].reason;
            if reason != CRef::UNDEF {
                // it is not safe to call `locked` on a relocated clause, and
                // dangling reasons of removed clauses stay behind
                let keep = {
                    let c = self.ca.get_ref(reason);
                    c.reloced() || self.locked(c)
                };
                if keep {
                    debug_assert!(!is_removed!(self.ca, reason));
                    self.ca.reloc(&mut self.vars.vardata[v].reason, to);
                }
            }
        }

        // pending simplifier work survives a mid-fixpoint collection
        for queue in [
            &mut self.subsumption_queue,
            &mut self.added,
            &mut self.strengthened,
        ] {
            let mut q = mem::take(queue);
            q.retain(|&cr| !is_removed!(self.ca, cr));
            for cr in &mut q {
                self.ca.reloc(cr, to);
            }
            *queue = q;
        }

        // all learnt
        {
            let mut j = 0;
            for i in 0..self.learnts.len() {
                let mut cr = self.learnts[i];
                if !is_removed!(self.ca, cr) {
                    self.ca.reloc(&mut cr, to);
                    self.learnts[j] = cr;
                    j += 1;
                }
            }
            self.learnts.truncate(j);
        }

        // all original
        {
            let mut j = 0;
            for i in 0..self.clauses.len() {
                let mut cr = self.clauses[i];
                if !is_removed!(self.ca, cr) {
                    self.ca.reloc(&mut cr, to);
                    self.clauses[j] = cr;
                    j += 1;
                }
            }
            self.clauses.truncate(j);
        }
    }

    pub(crate) fn check_garbage(&mut self) {
        if self.ca.wasted() as f64 > self.ca.len() as f64 * self.opts.garbage_frac {
            self.garbage_collect();
        }
    }

    fn cla_decay_activity(&mut self) {
        self.cla_inc *= 1.0 / self.opts.clause_decay;
    }

    fn cla_bump_activity(&mut self, cr: CRef) {
        let new_activity = {
            let inc = self.cla_inc as f32;
            let mut c = self.ca.get_mut(cr);
            let r = c.activity() + inc;
            c.set_activity(r);
            r
        };
        if new_activity > 1e20 {
            // rescale
            for i in 0..self.learnts.len() {
                let learnt = self.learnts[i];
                let mut c = self.ca.get_mut(learnt);
                let r = c.activity() * 1e-20;
                c.set_activity(r);
            }
            self.cla_inc *= 1e-20;
        }
    }

    fn within_budget(&self) -> bool {
        self.conflict_budget < 0 || (self.conflicts as i64) < self.conflict_budget
    }
}

impl VarState {
    fn new() -> Self {
        Self {
            ass: VMap::new(),
            vardata: VMap::new(),
            trail: vec![],
            trail_lim: vec![],
        }
    }

    #[inline(always)]
    pub(crate) fn num_assigns(&self) -> u32 {
        self.trail.len() as u32
    }

    #[inline(always)]
    pub(crate) fn value(&self, x: Var) -> lbool {
        self.ass[x]
    }

    #[inline(always)]
    pub(crate) fn value_lit(&self, p: Lit) -> lbool {
        self.ass[p.var()] ^ p.sign()
    }

    #[inline(always)]
    pub(crate) fn level(&self, x: Var) -> i32 {
        self.vardata[x].level
    }

    #[inline(always)]
    pub(crate) fn reason(&self, x: Var) -> CRef {
        self.vardata[x].reason
    }

    #[inline(always)]
    pub(crate) fn decision_level(&self) -> u32 {
        self.trail_lim.len() as u32
    }

    pub(crate) fn new_decision_level(&mut self) {
        self.trail_lim.push(self.trail.len() as i32);
    }

    pub(crate) fn unchecked_enqueue(&mut self, p: Lit, from: CRef) {
        debug_assert_eq!(
            self.value_lit(p),
            lbool::UNDEF,
            "lit {:?} is already assigned",
            p
        );
        self.ass[p.var()] = lbool::new(!p.sign());
        self.vardata[p.var()] = VarData::new(from, self.decision_level() as i32);
        self.trail.push(p);
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct VarData {
    pub(crate) reason: CRef,
    pub(crate) level: i32,
}

impl Default for VarData {
    fn default() -> Self {
        Self {
            reason: CRef::UNDEF,
            level: 0,
        }
    }
}

impl VarData {
    #[inline(always)]
    fn new(reason: CRef, level: i32) -> Self {
        Self { reason, level }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Watcher {
    pub(crate) cref: CRef,
    blocker: Lit,
}

impl Watcher {
    fn new(cref: CRef, blocker: Lit) -> Self {
        Self { cref, blocker }
    }
}

impl PartialEq for Watcher {
    #[inline(always)]
    fn eq(&self, rhs: &Self) -> bool {
        self.cref == rhs.cref
    }
}
impl Eq for Watcher {}

/// Orders variables by descending clause-appearance count, then ascending
/// index.
struct VarOrder<'a> {
    activity: &'a VMap<u32>,
}

impl<'a> Comparator<Var> for VarOrder<'a> {
    fn cmp(&self, lhs: &Var, rhs: &Var) -> cmp::Ordering {
        self.activity[*rhs]
            .cmp(&self.activity[*lhs])
            .then(lhs.idx().cmp(&rhs.idx()))
    }
}

/// Predicate to test whether a clause has been removed from some lit's
/// watchlist.
pub(crate) struct WatcherDeleted<'a> {
    ca: &'a ClauseAllocator,
}

impl<'a> DeletePred<Watcher> for WatcherDeleted<'a> {
    #[inline]
    fn deleted(&self, w: &Watcher) -> bool {
        self.ca.get_ref(w.cref).mark() == 1
    }
}

/// Predicate to test whether a clause has been removed from some lit's
/// occurrence list.
pub(crate) struct ClauseDeleted<'a> {
    ca: &'a ClauseAllocator,
}

impl<'a> DeletePred<CRef> for ClauseDeleted<'a> {
    #[inline]
    fn deleted(&self, cr: &CRef) -> bool {
        self.ca.get_ref(*cr).mark() == 1
    }
}

/// Configurable solver parameters.
pub struct SolverOpts {
    /// The clause activity decay factor.
    pub clause_decay: f64,
    /// Use the Luby restart sequence.
    pub luby_restart: bool,
    /// The initial restart limit.
    pub restart_first: i32,
    /// The factor with which the restart limit is multiplied in each restart.
    pub restart_inc: f64,
    /// The fraction of wasted memory allowed before a garbage collection is
    /// triggered.
    pub garbage_frac: f64,
    /// Minimum number to set the learnts limit to.
    pub min_learnts_lim: i32,
    /// The initial limit for learnt clauses as a factor of the original
    /// clauses.
    pub learntsize_factor: f64,
    /// The limit for learnt clauses is multiplied with this factor on a
    /// conflict schedule.
    pub learntsize_inc: f64,

    pub learntsize_adjust_start_confl: i32,
    pub learntsize_adjust_inc: f64,
}

impl Default for SolverOpts {
    fn default() -> SolverOpts {
        Self {
            clause_decay: 0.999,
            luby_restart: true,
            restart_first: 100,
            restart_inc: 2.0,
            garbage_frac: 0.20,
            min_learnts_lim: 0,
            learntsize_factor: 1.0 / 3.0,
            learntsize_inc: 1.1,
            learntsize_adjust_start_confl: 100,
            learntsize_adjust_inc: 1.5,
        }
    }
}

impl SolverOpts {
    /// Check that options are valid.
    pub fn check(&self) -> bool {
        (0.0 < self.clause_decay && self.clause_decay < 1.0)
            && 1 <= self.restart_first
            && (1.0 < self.restart_inc && self.restart_inc < f64::INFINITY)
            && (0.0 < self.garbage_frac && self.garbage_frac < f64::INFINITY)
            && 0 <= self.min_learnts_lim
            && (0.0 < self.learntsize_factor && 1.0 < self.learntsize_inc)
    }
}

mod utils {
    /// Finite subsequences of the Luby-sequence:
    ///
    /// > 0: 1
    /// > 1: 1 1 2
    /// > 2: 1 1 2 1 1 2 4
    /// > 3: 1 1 2 1 1 2 4 1 1 2 1 1 2 4 8
    /// ...
    pub(super) fn luby(y: f64, mut x: i32) -> f64 {
        // find the finite subsequence that contains index `x`, and the size
        // of that subsequence
        let mut size = 1;
        let mut seq = 0;
        while size < x + 1 {
            seq += 1;
            size = 2 * size + 1;
        }

        while size - 1 != x {
            size = (size - 1) >> 1;
            seq -= 1;
            x %= size;
        }

        f64::powi(y, seq)
    }
}
