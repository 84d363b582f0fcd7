use crate::{
    error::Result,
    solver::{
        engine::{ConstraintId, Solver},
        store::Store,
    },
};

/// A stateful filtering object.
///
/// `post` runs exactly once, when the constraint is handed to
/// [`Solver::post`]: it prunes whatever can be pruned immediately and
/// registers the events it wants to be woken on, using the `id` the solver
/// assigned to it. `propagate` is the re-entrant filtering routine, invoked
/// by the fixpoint loop whenever a subscribed event fired; it re-derives
/// what changed from the current domain state rather than from the event,
/// and it must only reach other constraints through the propagation queue,
/// never by calling them directly.
pub trait Constraint: std::fmt::Debug {
    fn post(&mut self, solver: &mut Solver, id: ConstraintId) -> Result<()>;

    fn propagate(&mut self, _store: &mut Store) -> Result<()> {
        Ok(())
    }
}

/// An anonymous constraint wrapping a filtering closure.
///
/// This is what [`Solver::when_bind`] registers: the closure becomes the
/// whole filtering routine, so callback-style constraints go through the
/// same queue as everything else.
pub(crate) struct ClosureConstraint {
    filter: Box<dyn FnMut(&mut Store) -> Result<()>>,
}

impl ClosureConstraint {
    pub(crate) fn new<F>(filter: F) -> Self
    where
        F: FnMut(&mut Store) -> Result<()> + 'static,
    {
        Self {
            filter: Box::new(filter),
        }
    }
}

impl std::fmt::Debug for ClosureConstraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ClosureConstraint")
    }
}

impl Constraint for ClosureConstraint {
    fn post(&mut self, _solver: &mut Solver, _id: ConstraintId) -> Result<()> {
        Ok(())
    }

    fn propagate(&mut self, store: &mut Store) -> Result<()> {
        (self.filter)(store)
    }
}
