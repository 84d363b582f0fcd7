use serde::Serialize;
use tracing::debug;

use crate::{
    error::{Error, Result},
    solver::engine::Solver,
};

/// One branch of a search-tree node; applying it narrows the solver state
/// and may raise [`Error::Inconsistency`] through propagation.
pub type Alternative = Box<dyn FnOnce(&mut Solver) -> Result<()>>;

/// Read-only counters reported by a finished (or aborted) search.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SearchStatistics {
    pub n_solutions: usize,
    pub n_failures: usize,
    pub n_nodes: usize,
}

/// Why the recursive walk unwound early. Reaching a limit is not an error:
/// the statistics collected so far remain valid.
enum Unwind {
    LimitReached,
    Fatal(Error),
}

/// Depth-first search driver.
///
/// The branching closure is consulted at every node: it returns the ordered
/// alternatives to try, or an empty list to mark the node as a solution
/// leaf. The driver checkpoints before applying each alternative and rolls
/// back after exploring it, so the branching closure always observes a
/// locally consistent state (the propagation queue is drained before any
/// branching decision).
///
/// Solution and failure listeners fire synchronously, in registration
/// order, before the corresponding rollback; they may inspect the solver
/// but must not retain values past the callback.
pub struct DFSearch<'a> {
    solver: &'a mut Solver,
    branching: Box<dyn FnMut(&mut Solver) -> Vec<Alternative> + 'a>,
    solution_listeners: Vec<Box<dyn FnMut(&Solver) + 'a>>,
    fail_listeners: Vec<Box<dyn FnMut(&Solver) + 'a>>,
}

impl<'a> DFSearch<'a> {
    pub fn new<B>(solver: &'a mut Solver, branching: B) -> Self
    where
        B: FnMut(&mut Solver) -> Vec<Alternative> + 'a,
    {
        Self {
            solver,
            branching: Box::new(branching),
            solution_listeners: Vec::new(),
            fail_listeners: Vec::new(),
        }
    }

    /// Registers a callback invoked on every solution leaf.
    pub fn on_solution<F>(mut self, listener: F) -> Self
    where
        F: FnMut(&Solver) + 'a,
    {
        self.solution_listeners.push(Box::new(listener));
        self
    }

    /// Registers a callback invoked on every failed alternative.
    pub fn on_fail<F>(mut self, listener: F) -> Self
    where
        F: FnMut(&Solver) + 'a,
    {
        self.fail_listeners.push(Box::new(listener));
        self
    }

    /// Exhaustively explores the search tree.
    pub fn start(&mut self) -> Result<SearchStatistics> {
        self.start_with_limit(|_| false)
    }

    /// Explores the search tree until exhaustion or until `limit` returns
    /// true. The limit is evaluated once per node, before expansion. In
    /// every case the trail is restored to its pre-search level, so the
    /// same solver can be searched again.
    pub fn start_with_limit<L>(&mut self, mut limit: L) -> Result<SearchStatistics>
    where
        L: FnMut(&SearchStatistics) -> bool,
    {
        let mut statistics = SearchStatistics::default();
        let level = self.solver.level();
        debug!(level, "starting depth-first search");
        let outcome = self.dfs(&mut statistics, &mut limit);
        self.solver.pop_until(level);
        match outcome {
            Ok(()) | Err(Unwind::LimitReached) => Ok(statistics),
            Err(Unwind::Fatal(e)) => Err(e),
        }
    }

    fn dfs<L>(&mut self, statistics: &mut SearchStatistics, limit: &mut L) -> Result<(), Unwind>
    where
        L: FnMut(&SearchStatistics) -> bool,
    {
        if limit(statistics) {
            return Err(Unwind::LimitReached);
        }
        let alternatives = (self.branching)(self.solver);
        if alternatives.is_empty() {
            statistics.n_solutions += 1;
            for listener in &mut self.solution_listeners {
                listener(self.solver);
            }
            return Ok(());
        }
        for alternative in alternatives {
            self.solver.push();
            statistics.n_nodes += 1;
            match alternative(self.solver) {
                Ok(()) => self.dfs(statistics, limit)?,
                Err(Error::Inconsistency) => {
                    statistics.n_failures += 1;
                    for listener in &mut self.fail_listeners {
                        listener(self.solver);
                    }
                }
                Err(e) => return Err(Unwind::Fatal(e)),
            }
            self.solver.pop();
        }
        Ok(())
    }
}
