use crate::{
    error::{Error, Result},
    solver::{
        constraint::Constraint,
        engine::{ConstraintId, Solver, VariableId},
        store::Store,
        trail::{ReversibleInt, Trail},
    },
};

/// Table lookup: enforces `table[x] == y` for a fixed integer table.
///
/// The table is copied once into a list of `(index, value)` pairs sorted by
/// value; that ordering never changes. Two reversible cursors delimit the
/// window of pairs still feasible, and a reversible support counter per
/// index records how many window positions still justify it. Filtering
/// advances the cursors past pairs whose value fell outside `y`'s bounds or
/// whose index left `x`'s domain, removing an index from `x` when its last
/// support is gone, then tightens `y` to the window ends. Work is amortized
/// over permanently excluded entries rather than paid per call.
#[derive(Debug)]
pub struct Element1D {
    x: VariableId,
    y: VariableId,
    n: usize,
    /// `(index, table value)` pairs, sorted by value. Immutable after
    /// construction; only the `low..=up` window over it shrinks.
    xy: Vec<(usize, i64)>,
    low: ReversibleInt,
    up: ReversibleInt,
    n_rows_sup: Vec<ReversibleInt>,
}

impl Element1D {
    pub fn new(trail: &mut Trail, table: &[i64], x: VariableId, y: VariableId) -> Self {
        let mut xy: Vec<(usize, i64)> = table.iter().copied().enumerate().collect();
        xy.sort_by_key(|&(_, v)| v);
        let low = ReversibleInt::new(trail, 0);
        let up = ReversibleInt::new(trail, table.len() as i64 - 1);
        let n_rows_sup = (0..table.len())
            .map(|_| ReversibleInt::new(trail, 1))
            .collect();
        Self {
            x,
            y,
            n: table.len(),
            xy,
            low,
            up,
            n_rows_sup,
        }
    }

    /// A sorted position left the window: its index loses one support, and
    /// an index with no supports left is infeasible for `x`.
    fn update_supports(&self, store: &mut Store, lost_pos: usize) -> Result<()> {
        let index = self.xy[lost_pos].0;
        if self.n_rows_sup[index].decrement(store.trail_mut()) == 0 {
            store.remove(self.x, index as i64)?;
        }
        Ok(())
    }
}

impl Constraint for Element1D {
    fn post(&mut self, solver: &mut Solver, id: ConstraintId) -> Result<()> {
        let store = solver.store_mut();
        store.remove_below(self.x, 0)?;
        store.remove_above(self.x, self.n as i64 - 1)?;
        store.propagate_on_domain_change(self.x, id);
        store.propagate_on_bound_change(self.y, id);
        self.propagate(store)
    }

    fn propagate(&mut self, store: &mut Store) -> Result<()> {
        let mut l = self.low.value(store.trail()) as usize;
        let mut u = self.up.value(store.trail()) as usize;
        let y_min = store.min(self.y);
        let y_max = store.max(self.y);

        loop {
            let (index, value) = self.xy[l];
            if value < y_min || !store.contains(self.x, index as i64) {
                self.update_supports(store, l)?;
                l += 1;
                if l > u {
                    return Err(Error::Inconsistency);
                }
            } else {
                break;
            }
        }
        loop {
            let (index, value) = self.xy[u];
            if value > y_max || !store.contains(self.x, index as i64) {
                self.update_supports(store, u)?;
                if u == l {
                    return Err(Error::Inconsistency);
                }
                u -= 1;
            } else {
                break;
            }
        }

        store.remove_below(self.y, self.xy[l].1)?;
        store.remove_above(self.y, self.xy[u].1)?;
        self.low.set_value(store.trail_mut(), l as i64);
        self.up.set_value(store.trail_mut(), u as i64);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn element_model(table: &[i64]) -> (Solver, VariableId, VariableId) {
        let mut solver = Solver::new();
        let x = solver.new_variable(-3, 12);
        let y = solver.new_variable(-20, 20);
        let element = Element1D::new(solver.trail_mut(), table, x, y);
        solver.post(Box::new(element)).unwrap();
        (solver, x, y)
    }

    #[test]
    fn post_bounds_both_variables() {
        let (solver, x, y) = element_model(&[3, 1, 4, 1, 5]);
        assert_eq!(solver.min(x), 0);
        assert_eq!(solver.max(x), 4);
        assert_eq!(solver.min(y), 1);
        assert_eq!(solver.max(y), 5);
    }

    #[test]
    fn tightening_y_removes_unsupported_indices() {
        let (mut solver, x, y) = element_model(&[3, 1, 4, 1, 5]);

        solver.remove_below(y, 2).unwrap();
        // Both positions with value 1 left the window, so indices 1 and 3
        // lost their only support.
        assert!(!solver.contains(x, 1));
        assert!(!solver.contains(x, 3));
        assert_eq!(solver.min(y), 3);
    }

    #[test]
    fn binding_x_fixes_y_to_the_table_entry() {
        let (mut solver, x, y) = element_model(&[3, 1, 4, 1, 5]);

        solver.assign(x, 2).unwrap();
        assert!(solver.is_bound(y));
        assert_eq!(solver.min(y), 4);
    }

    #[test]
    fn shrinking_x_tightens_y_bounds() {
        let (mut solver, x, y) = element_model(&[10, 2, 7, 9]);

        solver.remove(x, 1).unwrap();
        assert_eq!(solver.min(y), 7);
        solver.remove(x, 0).unwrap();
        assert_eq!(solver.max(y), 9);
    }

    #[test]
    fn unsatisfiable_lookup_fails() {
        let (mut solver, _x, y) = element_model(&[3, 1, 4, 1, 5]);
        let result = solver.remove_below(y, 6);
        assert!(matches!(result, Err(Error::Inconsistency)));
    }

    #[test]
    fn binding_y_to_a_unique_value_binds_x() {
        let (mut solver, x, y) = element_model(&[3, 1, 4, 1, 5]);
        solver.remove_below(y, 5).unwrap();
        assert!(solver.is_bound(x));
        assert_eq!(solver.min(x), 4);
    }
}
