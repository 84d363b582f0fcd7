//! Standard branching strategies for the depth-first search driver.

use crate::solver::{
    engine::{Solver, VariableId},
    search::Alternative,
};

/// The fail-first branching strategy: pick the unbound variable with the
/// smallest remaining domain (lowest position on ties, for determinism) and
/// branch on its minimum value, trying `x == v` before `x != v`.
///
/// Tackling the most constrained variable early tends to surface dead ends
/// near the root, where pruning pays off the most. Returns no alternatives
/// once every variable is bound, which marks the node as a solution leaf.
pub fn first_fail(vars: Vec<VariableId>) -> impl FnMut(&mut Solver) -> Vec<Alternative> {
    move |solver: &mut Solver| {
        let mut selected: Option<(i64, VariableId)> = None;
        for &x in &vars {
            let size = solver.size(x);
            if size > 1 && selected.map_or(true, |(best, _)| size < best) {
                selected = Some((size, x));
            }
        }
        match selected {
            None => Vec::new(),
            Some((_, x)) => {
                let v = solver.min(x);
                vec![
                    Box::new(move |s: &mut Solver| s.assign(x, v)) as Alternative,
                    Box::new(move |s: &mut Solver| s.remove(x, v)),
                ]
            }
        }
    }
}
