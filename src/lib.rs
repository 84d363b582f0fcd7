//! Tinycp is a finite-domain constraint programming solver built on a
//! trail-based reversible state store and depth-first backtracking search.
//!
//! The engine maintains a set of integer variables with finite domains,
//! filters those domains to enforce posted constraints, and explores the
//! remaining combinatorial space exhaustively.
//!
//! # Core Concepts
//!
//! - **[`Trail`]**: an undo log organized into checkpoint levels; every
//!   domain mutation and every piece of constraint state built from
//!   [`ReversibleInt`] cells is rolled back when the search backtracks.
//! - **[`Constraint`]**: a filtering object with a one-time setup phase and
//!   a re-entrant filtering routine, woken through per-variable event
//!   subscriptions (bind, bound change, domain change).
//! - **[`Solver`]**: owns the trail, the variables, and the propagation
//!   queue, and drives constraints to a fixpoint after every mutation.
//! - **[`DFSearch`]**: turns a branching closure into an exhaustive,
//!   statistics-producing depth-first tree walk with optional limits.
//!
//! [`Trail`]: solver::trail::Trail
//! [`ReversibleInt`]: solver::trail::ReversibleInt
//! [`Constraint`]: solver::constraint::Constraint
//! [`Solver`]: solver::engine::Solver
//! [`DFSearch`]: solver::search::DFSearch
//!
//! # Example: two variables that must differ
//!
//! ```
//! use tinycp::solver::constraints::not_equal::NotEqual;
//! use tinycp::solver::engine::Solver;
//! use tinycp::solver::heuristics::first_fail;
//! use tinycp::solver::search::DFSearch;
//!
//! let mut solver = Solver::new();
//! let a = solver.new_variable(0, 2);
//! let b = solver.new_variable(0, 2);
//! solver.post(Box::new(NotEqual::new(a, b))).unwrap();
//!
//! let mut search = DFSearch::new(&mut solver, first_fail(vec![a, b]));
//! let stats = search.start().unwrap();
//!
//! // 3 * 3 assignments, minus the 3 where a == b.
//! assert_eq!(stats.n_solutions, 6);
//! ```
pub mod error;
pub mod solver;
