//! Subsumption and self-subsuming resolution over the literal occurrence
//! lists, run at decision level 0.
//!
//! Work arrives through three channels: `added` (freshly indexed original
//! clauses), `strengthened` (clauses that just lost a literal) and the
//! touched-variable set. `reduction_by_subsumption` drains all three to a
//! fixpoint. The pending vectors and the scan queue hold clause handles, so
//! they are rewritten by `reloc_all` whenever a garbage collection triggers
//! mid-fixpoint.

use std::mem;

use log::debug;
use smallvec::SmallVec;

use crate::clause::{lbool, CRef, Lit, OccVec, Var};
use crate::core::Solver;

impl Solver {
    fn touch_var(&mut self, v: Var) {
        if !self.touched[v] {
            self.touched[v] = true;
            self.touched_list.push(v);
        }
    }

    /// Index a fresh original clause into the literal occurrence lists and
    /// schedule it for subsumption.
    pub(crate) fn attach_clause_occs(&mut self, cr: CRef) {
        debug_assert!(!self.ca.get_ref(cr).learnt());
        let lits: SmallVec<[Lit; 8]> = self.ca.get_ref(cr).iter().copied().collect();
        for &l in &lits {
            self.occ_data[l].push(cr);
            self.touch_var(l.var());
        }
        self.added.push(cr);
    }

    /// Remove `p` from clause `cr`, keeping watchers, occurrences, and the
    /// pending work sets consistent. A clause strengthened to unit length is
    /// removed and its survivor enqueued at level 0; returns `false` when
    /// that propagates to a conflict.
    pub(crate) fn strengthen_clause(&mut self, cr: CRef, p: Lit) -> bool {
        debug_assert_eq!(self.decision_level(), 0);
        debug_assert!(!self.is_removed(cr));
        self.strengthened.push(cr);

        let size = self.ca.get_ref(cr).size();
        if size == 2 {
            // the remainder is a unit fact; the record itself is garbage
            self.remove_clause(cr);
            self.ca.get_mut(cr).strengthen(p);
            let unit = self.ca.get_ref(cr)[0];
            let ok = self.enqueue(unit, CRef::UNDEF) && self.propagate().is_none();
            if !ok {
                self.ok = false;
            }
            ok
        } else {
            // the clause stays alive with a different literal set, so the
            // watcher detach must be strict
            self.detach_clause(cr, true);
            self.ca.get_mut(cr).strengthen(p);
            self.attach_clause(cr);

            let occs = &mut self.occ_data[p];
            let pos = occs
                .iter()
                .position(|&c| c == cr)
                .expect("occurrence not found");
            occs.remove(pos);

            self.ca.free_amount(1);
            self.touch_var(p.var());
            let lits: SmallVec<[Lit; 8]> = self.ca.get_ref(cr).iter().copied().collect();
            for l in lits {
                self.touch_var(l.var());
            }
            true
        }
    }

    /// Level-0 clean-up: tombstone satisfied original clauses, strengthen
    /// FALSE literals out of the unsatisfied rest.
    pub(crate) fn top_level_cleanup(&mut self) -> bool {
        debug_assert_eq!(self.decision_level(), 0);
        let mut i = 0;
        while i < self.clauses.len() {
            let cr = self.clauses[i];
            i += 1;
            if self.is_removed(cr) {
                continue;
            }
            if self.satisfied(self.ca.get_ref(cr)) {
                self.remove_clause(cr);
                continue;
            }
            let false_lits: SmallVec<[Lit; 8]> = {
                let vars = &self.vars;
                self.ca
                    .get_ref(cr)
                    .iter()
                    .copied()
                    .filter(|&l| vars.value_lit(l) == lbool::FALSE)
                    .collect()
            };
            for l in false_lits {
                if !self.strengthen_clause(cr, l) {
                    return false;
                }
                if self.is_removed(cr) {
                    break;
                }
            }
        }
        let ca = &self.ca;
        self.clauses.retain(|&cr| ca.get_ref(cr).mark() != 1);
        true
    }

    /// The literal of `cr` with the fewest occurrences, minimizing the
    /// candidate scan.
    fn min_occurrence_lit(&self, cr: CRef) -> Lit {
        let c = self.ca.get_ref(cr);
        let mut best = c[0];
        for k in 1..c.size() {
            let l = c[k];
            if self.occ_data[l].len() < self.occ_data[best].len() {
                best = l;
            }
        }
        best
    }

    /// Tombstone every other clause subsumed by `cr`.
    fn subsume0(&mut self, cr: CRef) {
        debug_assert!(!self.is_removed(cr));
        let best = self.min_occurrence_lit(cr);
        let cands: OccVec<CRef> = self.occs().lookup_mut(best).clone();
        for &other in &cands {
            if other == cr || self.is_removed(other) {
                continue;
            }
            let res = {
                let c = self.ca.get_ref(cr);
                let d = self.ca.get_ref(other);
                c.subsumes(&d)
            };
            if res == Lit::UNDEF {
                debug!("subsume0: {:?} subsumed by {:?}", other, cr);
                self.remove_clause(other);
            }
        }
        self.check_garbage();
    }

    /// Self-subsuming resolution over a worklist seeded with `cr`: every
    /// candidate sharing the rarest literal that resolves against the current
    /// clause on exactly one pair is strengthened and requeued.
    fn subsume1(&mut self, cr: CRef) -> bool {
        let mut queue: Vec<CRef> = vec![cr];
        while let Some(d) = queue.pop() {
            if self.is_removed(d) {
                continue;
            }
            let best = self.min_occurrence_lit(d);
            let cands: OccVec<CRef> = self.occs().lookup_mut(best).clone();
            for &e in &cands {
                if e == d || self.is_removed(e) {
                    continue;
                }
                let p = {
                    let cd = self.ca.get_ref(d);
                    let ce = self.ca.get_ref(e);
                    cd.subsumes(&ce)
                };
                if p != Lit::UNDEF && p != Lit::ERROR {
                    // `p` is the witness in `d`; its negation leaves `e`
                    debug!("subsume1: strengthen {:?} by {:?}", e, !p);
                    if !self.strengthen_clause(e, !p) {
                        return false;
                    }
                    queue.push(e);
                }
            }
        }
        true
    }

    fn enqueue_subsumption(&mut self, queue: &mut Vec<CRef>, cr: CRef) {
        if self.is_removed(cr) || self.ca.get_ref(cr).mark() == 2 {
            return;
        }
        // mark value 2 transiently tags queued clauses for deduplication
        self.ca.get_mut(cr).set_mark(2);
        queue.push(cr);
    }

    /// Drain the pending work channels into the scan queue.
    fn gather_pending(&mut self) {
        debug_assert!(self.subsumption_queue.is_empty());
        let mut queue = mem::take(&mut self.subsumption_queue);

        let added = mem::take(&mut self.added);
        for cr in added {
            self.enqueue_subsumption(&mut queue, cr);
        }
        let strengthened = mem::take(&mut self.strengthened);
        for cr in strengthened {
            self.enqueue_subsumption(&mut queue, cr);
        }

        // rescan the clauses of every touched variable
        let touched_list = mem::take(&mut self.touched_list);
        for &v in &touched_list {
            if !self.touched[v] {
                continue;
            }
            self.touched[v] = false;
            for s in 0..2 {
                let l = Lit::new(v, s != 0);
                let occs: OccVec<CRef> = self.occs().lookup_mut(l).clone();
                for cr in occs {
                    self.enqueue_subsumption(&mut queue, cr);
                }
            }
        }

        for i in 0..queue.len() {
            let cr = queue[i];
            if self.ca.get_ref(cr).mark() == 2 {
                self.ca.get_mut(cr).set_mark(0);
            }
        }
        self.subsumption_queue = queue;
    }

    /// Run subsumption and self-subsuming resolution to a fixpoint over the
    /// pending work sets. Level 0 only. Returns `false` if the clause set
    /// became unsatisfiable.
    pub fn reduction_by_subsumption(&mut self) -> bool {
        debug_assert_eq!(self.decision_level(), 0);

        if !self.ok || self.propagate().is_some() {
            self.ok = false;
            return false;
        }

        loop {
            // units derived inside a pass can satisfy or falsify literals of
            // clauses scanned earlier, so the clean-up reruns until the trail
            // is stable
            let assigns_before = self.vars.num_assigns();
            if !self.top_level_cleanup() {
                return false;
            }
            self.gather_pending();
            if self.subsumption_queue.is_empty()
                && self.vars.num_assigns() == assigns_before
            {
                break;
            }
            debug!(
                "subsumption pass over {} clauses",
                self.subsumption_queue.len()
            );
            while let Some(cr) = self.subsumption_queue.pop() {
                if self.is_removed(cr) {
                    continue;
                }
                if !self.subsume1(cr) {
                    return false;
                }
                if self.is_removed(cr) {
                    continue;
                }
                self.subsume0(cr);
            }
        }
        debug_assert!(self.added.is_empty() && self.strengthened.is_empty());

        self.check_garbage();
        true
    }
}
