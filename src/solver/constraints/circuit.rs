use std::rc::Rc;

use crate::{
    error::Result,
    solver::{
        constraint::Constraint,
        constraints::all_different::AllDifferent,
        engine::{ConstraintId, Solver, VariableId},
        store::Store,
        trail::ReversibleInt,
    },
};

/// Enforces that `x` describes a single Hamiltonian circuit over the nodes
/// `{0..n-1}`, where `x[i]` is the node visited after node `i`.
///
/// Setup posts an [`AllDifferent`] over `x` (the edges form a permutation),
/// removes self-loops, and bounds every successor to `[0, n-1]`. Filtering
/// is incremental: while variables are unbound, the reversible
/// `orig`/`dest`/`length_to_dest` arrays describe a forest of simple paths
/// consistent with every binding made so far; each bind merges two path
/// segments and then forbids every segment end from pointing back at its own
/// segment start until the segment spans all `n` nodes. That cut is what
/// rules out sub-tours: once every variable is bound, the remaining
/// successor relation is necessarily one cycle through every node.
#[derive(Debug)]
pub struct Circuit {
    x: Vec<VariableId>,
}

/// The reversible path-segment forest, shared between the per-node bind
/// handlers. For node `i`: `orig[i]` is the start of the segment containing
/// `i`, `dest[i]` its end, and `length_to_dest[i]` the hop count from `i` to
/// that end.
#[derive(Debug)]
struct PathForest {
    x: Vec<VariableId>,
    orig: Vec<ReversibleInt>,
    dest: Vec<ReversibleInt>,
    length_to_dest: Vec<ReversibleInt>,
}

impl PathForest {
    /// Called when `x[i]` has just become bound to some node `j`: merges
    /// i's segment with j's, re-homing starts and extending ends, then cuts
    /// every too-short segment's closing edge.
    ///
    /// The cut runs in a second pass, after the merge has updated every
    /// node. Interleaving it with the merge would read `length_to_dest`
    /// values the merge has not reached yet and prune valid successors.
    fn bind(&self, store: &mut Store, i: usize) -> Result<()> {
        let n = self.x.len();
        let j = store.min(self.x[i]) as usize;
        let length = self.length_to_dest[j].value(store.trail()) + 1;
        for k in 0..n {
            if self.orig[k].value(store.trail()) == j as i64 {
                let new_orig = self.orig[i].value(store.trail());
                self.orig[k].set_value(store.trail_mut(), new_orig);
            }
            if self.dest[k].value(store.trail()) == i as i64 {
                let new_dest = self.dest[j].value(store.trail());
                self.dest[k].set_value(store.trail_mut(), new_dest);
                let extended = self.length_to_dest[k].value(store.trail()) + length;
                self.length_to_dest[k].set_value(store.trail_mut(), extended);
            }
        }
        for k in 0..n {
            let orig_k = self.orig[k].value(store.trail());
            if self.length_to_dest[k].value(store.trail()) == 0
                && self.length_to_dest[orig_k as usize].value(store.trail()) < (n - 1) as i64
            {
                // k ends a segment that does not yet cover all nodes:
                // closing it back to its own start would make a sub-tour.
                store.remove(self.x[k], orig_k)?;
            }
        }
        Ok(())
    }
}

impl Circuit {
    pub fn new(x: Vec<VariableId>) -> Self {
        Self { x }
    }
}

impl Constraint for Circuit {
    fn post(&mut self, solver: &mut Solver, _id: ConstraintId) -> Result<()> {
        let n = self.x.len();
        solver.post(Box::new(AllDifferent::new(self.x.clone())))?;
        if n <= 1 {
            // A single node is its own (trivial) circuit.
            return Ok(());
        }

        let trail = solver.trail_mut();
        let orig = (0..n)
            .map(|i| ReversibleInt::new(trail, i as i64))
            .collect();
        let dest = (0..n)
            .map(|i| ReversibleInt::new(trail, i as i64))
            .collect();
        let length_to_dest = (0..n).map(|_| ReversibleInt::new(trail, 0)).collect();
        let forest = Rc::new(PathForest {
            x: self.x.clone(),
            orig,
            dest,
            length_to_dest,
        });

        for i in 0..n {
            if solver.is_bound(self.x[i]) {
                forest.bind(solver.store_mut(), i)?;
            } else {
                let store = solver.store_mut();
                store.remove(self.x[i], i as i64)?;
                store.remove_above(self.x[i], (n - 1) as i64)?;
                store.remove_below(self.x[i], 0)?;
                let handler = Rc::clone(&forest);
                solver.when_bind(self.x[i], move |store| handler.bind(store, i));
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

    fn count_circuits(n: usize) -> usize {
        let mut solver = Solver::new();
        let x = solver.new_variables(n, 0, n as i64 - 1);
        solver.post(Box::new(Circuit::new(x.clone()))).unwrap();
        let mut search = DFSearch::new(&mut solver, first_fail(x));
        search.start().unwrap().n_solutions
    }

    #[test]
    fn five_nodes_have_factorial_four_circuits() {
        assert_eq!(count_circuits(5), 24);
    }

    #[test]
    fn three_nodes_have_two_circuits() {
        assert_eq!(count_circuits(3), 2);
    }

    #[test]
    fn a_single_node_is_a_trivial_circuit() {
        assert_eq!(count_circuits(1), 1);
    }

    #[test]
    fn self_loops_are_removed_at_post() {
        let mut solver = Solver::new();
        let x = solver.new_variables(4, 0, 3);
        solver.post(Box::new(Circuit::new(x.clone()))).unwrap();
        for (i, &xi) in x.iter().enumerate() {
            assert!(!solver.contains(xi, i as i64));
        }
    }

    #[test]
    fn a_partial_path_cannot_close_early() {
        let mut solver = Solver::new();
        let x = solver.new_variables(5, 0, 4);
        solver.post(Box::new(Circuit::new(x.clone()))).unwrap();

        // Build the path 0 -> 1 -> 2. Its end (node 2) must not point back
        // to the segment start while the segment covers only 3 of 5 nodes.
        solver.assign(x[0], 1).unwrap();
        solver.assign(x[1], 2).unwrap();
        assert!(!solver.contains(x[2], 0));

        // Extending to 0 -> 1 -> 2 -> 3 -> 4 forces the closing edge.
        solver.assign(x[2], 3).unwrap();
        solver.assign(x[3], 4).unwrap();
        assert!(solver.is_bound(x[4]));
        assert_eq!(solver.min(x[4]), 0);
    }

    #[test]
    fn a_node_bound_by_peer_pruning_keeps_valid_successors() {
        let mut solver = Solver::new();
        let x = solver.new_variables(5, 0, 4);
        solver.post(Box::new(Circuit::new(x.clone()))).unwrap();

        // 0 -> 1 -> 2 -> 3: the distinctness pruning leaves x[4] = {0}, so
        // node 4's bind handler runs before node 3's. The merge for node 3
        // must be complete before any closing edge is cut.
        solver.assign(x[0], 1).unwrap();
        solver.assign(x[1], 2).unwrap();
        solver.assign(x[2], 3).unwrap();

        assert!(solver.is_bound(x[3]));
        assert_eq!(solver.min(x[3]), 4);
        assert!(solver.is_bound(x[4]));
        assert_eq!(solver.min(x[4]), 0);
    }

    #[test]
    fn solutions_are_verified_single_cycles() {
        let n = 4;
        let mut solver = Solver::new();
        let x = solver.new_variables(n, 0, n as i64 - 1);
        solver.post(Box::new(Circuit::new(x.clone()))).unwrap();

        let seen = std::cell::Cell::new(0usize);
        let vars = x.clone();
        let mut search = DFSearch::new(&mut solver, first_fail(x)).on_solution(|s| {
            // Walk the successor relation: it must return to node 0 after
            // exactly n hops, visiting each node once.
            let mut node = 0usize;
            for _ in 0..n {
                node = s.min(vars[node]) as usize;
            }
            assert_eq!(node, 0);
            seen.set(seen.get() + 1);
        });
        let stats = search.start().unwrap();
        assert_eq!(stats.n_solutions, 6);
        assert_eq!(seen.get(), 6);
    }
}
