/*****************************************************************************************[lib.rs]
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

//! A CDCL SAT solver over an arena-allocated clause store, with an
//! inprocessing subsumption simplifier.
//!
//! The solver keeps every clause in a single region allocator and refers to
//! clauses exclusively through 32-bit handles ([`clause::CRef`]); a relocating
//! garbage collector is the only component allowed to rewrite handles.
//! Propagation uses two watched literals per clause, conflicts are analyzed to
//! the first unique implication point, and a subsumption/self-subsumption
//! pass over per-literal occurrence lists simplifies the clause database at
//! decision level zero.

pub mod alloc;
pub mod clause;
pub mod core;
pub mod dimacs;
pub mod intmap;
mod simp;

pub use crate::{
    clause::{lbool, LMap, LSet, Lit, VMap, Var},
    core::{Solver, SolverOpts},
};
