use tracing::debug;

use crate::{
    error::Result,
    solver::{
        constraint::{ClosureConstraint, Constraint},
        store::Store,
        trail::Trail,
    },
};

pub type VariableId = usize;
pub type ConstraintId = usize;

/// The solving engine: owns the trail-backed [`Store`] and the registry of
/// posted constraints, and drives the fixpoint propagation loop.
///
/// Posting a constraint runs its one-time setup and then propagates to a
/// fixpoint, so the model is locally consistent before control returns to
/// the caller. The search driver speculates through the checkpoint methods
/// ([`Solver::push`] / [`Solver::pop`]): every domain mutation and every
/// reversible cell a constraint maintains is undone on rollback.
#[derive(Debug)]
pub struct Solver {
    store: Store,
    constraints: Vec<Option<Box<dyn Constraint>>>,
}

impl Solver {
    pub fn new() -> Self {
        Self {
            store: Store::new(),
            constraints: Vec::new(),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    pub fn trail(&self) -> &Trail {
        self.store.trail()
    }

    pub fn trail_mut(&mut self) -> &mut Trail {
        self.store.trail_mut()
    }

    // --- Model construction ---

    /// Creates a variable with domain `{lo..=hi}`.
    pub fn new_variable(&mut self, lo: i64, hi: i64) -> VariableId {
        self.store.new_variable(lo, hi)
    }

    /// Creates `n` variables, each with domain `{lo..=hi}`.
    pub fn new_variables(&mut self, n: usize, lo: i64, hi: i64) -> Vec<VariableId> {
        (0..n).map(|_| self.store.new_variable(lo, hi)).collect()
    }

    /// Registers `constraint`, runs its one-time setup, and propagates to a
    /// fixpoint. On inconsistency the propagation queue is cleared and the
    /// error is returned; reversible state is left for the caller's
    /// checkpoint to roll back.
    pub fn post(&mut self, mut constraint: Box<dyn Constraint>) -> Result<()> {
        let id = self.constraints.len();
        // Reserve the slot first so sub-constraints posted during setup get
        // distinct ids.
        self.constraints.push(None);
        let previous = self.store.set_active(Some(id));
        let setup = constraint.post(self, id);
        self.store.set_active(previous);
        self.constraints[id] = Some(constraint);
        if let Err(e) = setup {
            self.store.clear_pending();
            return Err(e);
        }
        self.fixpoint()
    }

    /// Registers a bind-event callback on `x`. The closure is wrapped in an
    /// anonymous constraint and dispatched through the propagation queue
    /// like any other filtering routine.
    pub fn when_bind<F>(&mut self, x: VariableId, filter: F)
    where
        F: FnMut(&mut Store) -> Result<()> + 'static,
    {
        let id = self.constraints.len();
        self.constraints.push(Some(Box::new(ClosureConstraint::new(filter))));
        self.store.propagate_on_bind(x, id);
    }

    /// Runs pending filtering routines until no constraint is scheduled
    /// (local consistency) or one of them signals inconsistency, in which
    /// case the queue is cleared and the error propagates upward.
    pub fn fixpoint(&mut self) -> Result<()> {
        while let Some(id) = self.store.pop_pending() {
            let Some(mut constraint) = self.constraints[id].take() else {
                continue;
            };
            let previous = self.store.set_active(Some(id));
            let filtered = constraint.propagate(&mut self.store);
            self.store.set_active(previous);
            self.constraints[id] = Some(constraint);
            if let Err(e) = filtered {
                self.store.clear_pending();
                return Err(e);
            }
        }
        debug!("propagation reached a fixpoint");
        Ok(())
    }

    // --- Propagating mutations, used by branching code ---

    /// Fixes `x` to `v` and propagates.
    pub fn assign(&mut self, x: VariableId, v: i64) -> Result<()> {
        self.mutate_and_propagate(|store| store.assign(x, v))
    }

    /// Removes `v` from `x` and propagates.
    pub fn remove(&mut self, x: VariableId, v: i64) -> Result<()> {
        self.mutate_and_propagate(|store| store.remove(x, v))
    }

    /// Removes every value of `x` below `v` and propagates.
    pub fn remove_below(&mut self, x: VariableId, v: i64) -> Result<()> {
        self.mutate_and_propagate(|store| store.remove_below(x, v))
    }

    /// Removes every value of `x` above `v` and propagates.
    pub fn remove_above(&mut self, x: VariableId, v: i64) -> Result<()> {
        self.mutate_and_propagate(|store| store.remove_above(x, v))
    }

    fn mutate_and_propagate<F>(&mut self, op: F) -> Result<()>
    where
        F: FnOnce(&mut Store) -> Result<()>,
    {
        match op(&mut self.store) {
            Ok(()) => self.fixpoint(),
            Err(e) => {
                self.store.clear_pending();
                Err(e)
            }
        }
    }

    // --- Query passthroughs ---

    pub fn min(&self, x: VariableId) -> i64 {
        self.store.min(x)
    }

    pub fn max(&self, x: VariableId) -> i64 {
        self.store.max(x)
    }

    pub fn size(&self, x: VariableId) -> i64 {
        self.store.size(x)
    }

    pub fn is_bound(&self, x: VariableId) -> bool {
        self.store.is_bound(x)
    }

    pub fn contains(&self, x: VariableId, v: i64) -> bool {
        self.store.contains(x, v)
    }

    // --- Checkpointing ---

    /// Opens a checkpoint the search driver can roll back to.
    pub fn push(&mut self) {
        self.store.trail_mut().push();
    }

    /// Rolls back to the most recent checkpoint.
    pub fn pop(&mut self) {
        self.store.trail_mut().pop();
    }

    /// Rolls back until the trail is at `level`.
    pub fn pop_until(&mut self, level: usize) {
        self.store.trail_mut().pop_until(level);
    }

    /// Current checkpoint depth.
    pub fn level(&self) -> usize {
        self.store.trail().level()
    }
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}
