use crate::{
    error::Result,
    solver::{
        constraint::Constraint,
        constraints::not_equal::NotEqual,
        engine::{ConstraintId, Solver, VariableId},
    },
};

/// Enforces that all variables take pairwise distinct values.
///
/// This is the binary decomposition: setup posts one [`NotEqual`] per pair.
/// It reaches the same fixpoints as a dedicated filtering routine that
/// prunes bound values from peers, at the cost of `n * (n - 1) / 2` small
/// constraints; stronger (matching-based) propagation is deliberately out of
/// scope here.
#[derive(Debug)]
pub struct AllDifferent {
    x: Vec<VariableId>,
}

impl AllDifferent {
    pub fn new(x: Vec<VariableId>) -> Self {
        Self { x }
    }
}

impl Constraint for AllDifferent {
    fn post(&mut self, solver: &mut Solver, _id: ConstraintId) -> Result<()> {
        for i in 0..self.x.len() {
            for j in i + 1..self.x.len() {
                solver.post(Box::new(NotEqual::new(self.x[i], self.x[j])))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::solver::{heuristics::first_fail, search::DFSearch};

    #[test]
    fn bound_values_are_pruned_from_peers() {
        let mut solver = Solver::new();
        let x = solver.new_variables(3, 0, 2);
        solver.post(Box::new(AllDifferent::new(x.clone()))).unwrap();

        solver.assign(x[0], 1).unwrap();
        assert!(!solver.contains(x[1], 1));
        assert!(!solver.contains(x[2], 1));

        solver.assign(x[1], 0).unwrap();
        // x[2] is forced by propagation alone.
        assert!(solver.is_bound(x[2]));
        assert_eq!(solver.min(x[2]), 2);
    }

    #[test]
    fn counts_all_permutations() {
        let mut solver = Solver::new();
        let x = solver.new_variables(4, 0, 3);
        solver.post(Box::new(AllDifferent::new(x.clone()))).unwrap();

        let mut search = DFSearch::new(&mut solver, first_fail(x));
        let stats = search.start().unwrap();
        assert_eq!(stats.n_solutions, 24);
    }
}
