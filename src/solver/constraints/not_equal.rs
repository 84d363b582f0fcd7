use crate::{
    error::Result,
    solver::{
        constraint::Constraint,
        engine::{ConstraintId, Solver, VariableId},
        store::Store,
    },
};

/// Enforces `x != y`.
///
/// Filtering waits for either side to become bound and then prunes that
/// value from the other side. Nothing can be deduced while both variables
/// still have several candidates.
#[derive(Debug)]
pub struct NotEqual {
    x: VariableId,
    y: VariableId,
}

impl NotEqual {
    pub fn new(x: VariableId, y: VariableId) -> Self {
        Self { x, y }
    }
}

impl Constraint for NotEqual {
    fn post(&mut self, solver: &mut Solver, id: ConstraintId) -> Result<()> {
        let store = solver.store_mut();
        if store.is_bound(self.x) {
            store.remove(self.y, store.min(self.x))?;
        } else if store.is_bound(self.y) {
            store.remove(self.x, store.min(self.y))?;
        } else {
            store.propagate_on_bind(self.x, id);
            store.propagate_on_bind(self.y, id);
        }
        Ok(())
    }

    fn propagate(&mut self, store: &mut Store) -> Result<()> {
        if store.is_bound(self.x) {
            store.remove(self.y, store.min(self.x))?;
        } else {
            store.remove(self.x, store.min(self.y))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn prunes_once_one_side_is_bound() {
        let mut solver = Solver::new();
        let x = solver.new_variable(0, 3);
        let y = solver.new_variable(0, 3);
        solver.post(Box::new(NotEqual::new(x, y))).unwrap();

        assert_eq!(solver.size(y), 4);
        solver.assign(x, 2).unwrap();
        assert!(!solver.contains(y, 2));
        assert_eq!(solver.size(y), 3);
    }

    #[test]
    fn symmetric_when_the_second_side_binds_first() {
        let mut solver = Solver::new();
        let x = solver.new_variable(0, 3);
        let y = solver.new_variable(0, 3);
        solver.post(Box::new(NotEqual::new(x, y))).unwrap();

        solver.assign(y, 0).unwrap();
        assert!(!solver.contains(x, 0));
    }
}
