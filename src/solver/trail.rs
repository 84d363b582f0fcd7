//! The reversible-state substrate: an undo log over an arena of integer
//! cells, organized into checkpoint levels so that speculative domain
//! mutations made during search can be rolled back cheaply.

/// Identity of a cell inside the trail's arena.
pub type CellId = usize;

#[derive(Debug, Clone, Copy)]
struct Cell {
    value: i64,
    /// Stamp of the checkpoint interval in which this cell last logged an
    /// undo entry. A cell logs its prior value at most once per interval.
    magic: u64,
}

/// An append-only undo log organized into checkpoint levels.
///
/// All reversible cells of one solver live in this arena; the trail itself
/// only records `(cell, prior value)` pairs, so checkpoint and rollback cost
/// is proportional to the number of cells actually touched, not to the total
/// number of cells.
#[derive(Debug)]
pub struct Trail {
    cells: Vec<Cell>,
    entries: Vec<(CellId, i64)>,
    frames: Vec<usize>,
    magic: u64,
}

impl Trail {
    pub fn new() -> Self {
        Self {
            cells: Vec::new(),
            entries: Vec::new(),
            frames: Vec::new(),
            // Cells start with magic 0, so the first write always logs.
            magic: 1,
        }
    }

    /// Opens a new checkpoint level.
    pub fn push(&mut self) {
        self.frames.push(self.entries.len());
        self.magic += 1;
    }

    /// Undoes every change logged since the most recent checkpoint and
    /// removes it. Does nothing at level zero.
    pub fn pop(&mut self) {
        if let Some(mark) = self.frames.pop() {
            while self.entries.len() > mark {
                if let Some((id, prior)) = self.entries.pop() {
                    self.cells[id].value = prior;
                }
            }
            // A fresh interval begins, so cells restored here log again on
            // their next write.
            self.magic += 1;
        }
    }

    /// Pops checkpoints until the trail is back at `level`.
    pub fn pop_until(&mut self, level: usize) {
        while self.level() > level {
            self.pop();
        }
    }

    /// Current checkpoint depth.
    pub fn level(&self) -> usize {
        self.frames.len()
    }

    fn new_cell(&mut self, value: i64) -> CellId {
        let id = self.cells.len();
        self.cells.push(Cell { value, magic: 0 });
        id
    }

    fn get(&self, id: CellId) -> i64 {
        self.cells[id].value
    }

    fn set(&mut self, id: CellId, value: i64) {
        let cell = &mut self.cells[id];
        if cell.magic != self.magic {
            // First write in this interval: save the value to restore.
            self.entries.push((id, cell.value));
            cell.magic = self.magic;
        }
        cell.value = value;
    }
}

impl Default for Trail {
    fn default() -> Self {
        Self::new()
    }
}

/// A `Copy` handle to a single reversible integer in a [`Trail`] arena.
///
/// Writes are logged lazily, once per checkpoint interval, so rollback
/// restores the value the cell held when the interval was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReversibleInt(CellId);

impl ReversibleInt {
    pub fn new(trail: &mut Trail, value: i64) -> Self {
        Self(trail.new_cell(value))
    }

    pub fn value(&self, trail: &Trail) -> i64 {
        trail.get(self.0)
    }

    pub fn set_value(&self, trail: &mut Trail, value: i64) {
        trail.set(self.0, value);
    }

    /// Adds one and returns the new value.
    pub fn increment(&self, trail: &mut Trail) -> i64 {
        let v = trail.get(self.0) + 1;
        trail.set(self.0, v);
        v
    }

    /// Subtracts one and returns the new value.
    pub fn decrement(&self, trail: &mut Trail) -> i64 {
        let v = trail.get(self.0) - 1;
        trail.set(self.0, v);
        v
    }
}

/// A grow-only stack whose length is reversible.
///
/// Rollback logically truncates the stack; the stale tail is physically
/// dropped on the next push. Used for per-variable subscription lists, so a
/// constraint posted inside a search node is deregistered on backtrack.
#[derive(Debug)]
pub struct ReversibleStack<T> {
    items: Vec<T>,
    len: ReversibleInt,
}

impl<T: Copy> ReversibleStack<T> {
    pub fn new(trail: &mut Trail) -> Self {
        Self {
            items: Vec::new(),
            len: ReversibleInt::new(trail, 0),
        }
    }

    pub fn push(&mut self, trail: &mut Trail, item: T) {
        let n = self.len.value(trail) as usize;
        self.items.truncate(n);
        self.items.push(item);
        self.len.set_value(trail, n as i64 + 1);
    }

    pub fn len(&self, trail: &Trail) -> usize {
        self.len.value(trail) as usize
    }

    pub fn is_empty(&self, trail: &Trail) -> bool {
        self.len(trail) == 0
    }

    /// Returns the item at `index`. Callers must keep `index` below
    /// [`ReversibleStack::len`]; entries past the reversible length are stale.
    pub fn get(&self, index: usize) -> T {
        self.items[index]
    }
}
