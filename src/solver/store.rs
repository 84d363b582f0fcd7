//! The domain store: finite-domain integer variables, their propagation
//! event subscriptions, and the propagation queue. Constraints receive a
//! `&mut Store` during filtering; everything they mutate here is
//! trail-backed and rolled back when search backtracks.

use crate::{
    error::{Error, Result},
    solver::{
        engine::{ConstraintId, VariableId},
        trail::{ReversibleInt, ReversibleStack, Trail},
        work_list::WorkList,
    },
};

/// The event kinds a constraint can subscribe to on a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainEvent {
    /// The variable became fixed to a single value.
    Bind,
    /// The minimum or maximum changed.
    BoundChange,
    /// Any value was removed.
    DomainChange,
}

/// One finite-domain integer variable.
///
/// The domain is its reversible `min`/`max`/`size` cells plus one reversible
/// 0/1 membership flag per value of the initial range. Bounds and membership
/// stay consistent: a bound value is always a member, and `min <= max`
/// whenever the domain is non-empty.
#[derive(Debug)]
struct Variable {
    offset: i64,
    min: ReversibleInt,
    max: ReversibleInt,
    size: ReversibleInt,
    member: Vec<ReversibleInt>,
    on_bind: ReversibleStack<ConstraintId>,
    on_bound: ReversibleStack<ConstraintId>,
    on_domain: ReversibleStack<ConstraintId>,
}

/// Trail, variables, subscriptions, and the propagation queue.
#[derive(Debug)]
pub struct Store {
    trail: Trail,
    vars: Vec<Variable>,
    queue: WorkList,
    /// The constraint currently being filtered; it is excluded from
    /// self-enqueueing while its own mutations fire events.
    active: Option<ConstraintId>,
}

impl Store {
    pub fn new() -> Self {
        Self {
            trail: Trail::new(),
            vars: Vec::new(),
            queue: WorkList::new(),
            active: None,
        }
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    pub fn trail_mut(&mut self) -> &mut Trail {
        &mut self.trail
    }

    /// Creates a variable with domain `{lo..=hi}`.
    ///
    /// # Panics
    ///
    /// Panics if `lo > hi`; an initially empty domain is a modelling error,
    /// not a propagation failure.
    pub fn new_variable(&mut self, lo: i64, hi: i64) -> VariableId {
        assert!(lo <= hi, "variable created with empty domain");
        let min = ReversibleInt::new(&mut self.trail, lo);
        let max = ReversibleInt::new(&mut self.trail, hi);
        let size = ReversibleInt::new(&mut self.trail, hi - lo + 1);
        let member = (lo..=hi)
            .map(|_| ReversibleInt::new(&mut self.trail, 1))
            .collect();
        let on_bind = ReversibleStack::new(&mut self.trail);
        let on_bound = ReversibleStack::new(&mut self.trail);
        let on_domain = ReversibleStack::new(&mut self.trail);
        let id = self.vars.len();
        self.vars.push(Variable {
            offset: lo,
            min,
            max,
            size,
            member,
            on_bind,
            on_bound,
            on_domain,
        });
        id
    }

    // --- Queries ---

    pub fn min(&self, x: VariableId) -> i64 {
        self.vars[x].min.value(&self.trail)
    }

    pub fn max(&self, x: VariableId) -> i64 {
        self.vars[x].max.value(&self.trail)
    }

    pub fn size(&self, x: VariableId) -> i64 {
        self.vars[x].size.value(&self.trail)
    }

    pub fn is_bound(&self, x: VariableId) -> bool {
        self.size(x) == 1
    }

    pub fn contains(&self, x: VariableId, v: i64) -> bool {
        let var = &self.vars[x];
        if v < var.min.value(&self.trail) || v > var.max.value(&self.trail) {
            return false;
        }
        var.member[(v - var.offset) as usize].value(&self.trail) == 1
    }

    /// Membership flag lookup that ignores the current bounds. Only valid
    /// for values inside the initial range.
    fn member_at(&self, x: VariableId, v: i64) -> bool {
        let var = &self.vars[x];
        var.member[(v - var.offset) as usize].value(&self.trail) == 1
    }

    // --- Mutations ---

    /// Removes `v` from the domain of `x`. A no-op if `v` is already absent;
    /// fails if the removal empties the domain. Schedules subscribed
    /// constraints for the events the removal produced.
    pub fn remove(&mut self, x: VariableId, v: i64) -> Result<()> {
        if !self.contains(x, v) {
            return Ok(());
        }
        let var = &self.vars[x];
        let (min_cell, max_cell, size_cell) = (var.min, var.max, var.size);
        let flag = var.member[(v - var.offset) as usize];

        flag.set_value(&mut self.trail, 0);
        let new_size = size_cell.decrement(&mut self.trail);
        if new_size == 0 {
            return Err(Error::Inconsistency);
        }

        let mut bound_changed = false;
        if v == min_cell.value(&self.trail) {
            let mut m = v + 1;
            while !self.member_at(x, m) {
                m += 1;
            }
            min_cell.set_value(&mut self.trail, m);
            bound_changed = true;
        }
        if v == max_cell.value(&self.trail) {
            let mut m = v - 1;
            while !self.member_at(x, m) {
                m -= 1;
            }
            max_cell.set_value(&mut self.trail, m);
            bound_changed = true;
        }

        self.schedule_subscribers(x, DomainEvent::DomainChange);
        if bound_changed {
            self.schedule_subscribers(x, DomainEvent::BoundChange);
        }
        if new_size == 1 {
            self.schedule_subscribers(x, DomainEvent::Bind);
        }
        Ok(())
    }

    /// Removes every value below `v`.
    pub fn remove_below(&mut self, x: VariableId, v: i64) -> Result<()> {
        while self.min(x) < v {
            let m = self.min(x);
            self.remove(x, m)?;
        }
        Ok(())
    }

    /// Removes every value above `v`.
    pub fn remove_above(&mut self, x: VariableId, v: i64) -> Result<()> {
        while self.max(x) > v {
            let m = self.max(x);
            self.remove(x, m)?;
        }
        Ok(())
    }

    /// Fixes `x` to `v`, failing if `v` is not in the domain.
    pub fn assign(&mut self, x: VariableId, v: i64) -> Result<()> {
        if !self.contains(x, v) {
            return Err(Error::Inconsistency);
        }
        if self.is_bound(x) {
            return Ok(());
        }
        let (lo, hi) = (self.min(x), self.max(x));
        for w in lo..=hi {
            if w != v && self.member_at(x, w) {
                let flag = self.vars[x].member[(w - self.vars[x].offset) as usize];
                flag.set_value(&mut self.trail, 0);
            }
        }
        let var = &self.vars[x];
        let (min_cell, max_cell, size_cell) = (var.min, var.max, var.size);
        min_cell.set_value(&mut self.trail, v);
        max_cell.set_value(&mut self.trail, v);
        size_cell.set_value(&mut self.trail, 1);

        self.schedule_subscribers(x, DomainEvent::DomainChange);
        self.schedule_subscribers(x, DomainEvent::BoundChange);
        self.schedule_subscribers(x, DomainEvent::Bind);
        Ok(())
    }

    // --- Subscriptions & scheduling ---

    /// Schedules `id` when `x` becomes bound.
    pub fn propagate_on_bind(&mut self, x: VariableId, id: ConstraintId) {
        self.vars[x].on_bind.push(&mut self.trail, id);
    }

    /// Schedules `id` when the bounds of `x` change.
    pub fn propagate_on_bound_change(&mut self, x: VariableId, id: ConstraintId) {
        self.vars[x].on_bound.push(&mut self.trail, id);
    }

    /// Schedules `id` on any removal from the domain of `x`.
    pub fn propagate_on_domain_change(&mut self, x: VariableId, id: ConstraintId) {
        self.vars[x].on_domain.push(&mut self.trail, id);
    }

    fn schedule_subscribers(&mut self, x: VariableId, event: DomainEvent) {
        let n = match event {
            DomainEvent::Bind => self.vars[x].on_bind.len(&self.trail),
            DomainEvent::BoundChange => self.vars[x].on_bound.len(&self.trail),
            DomainEvent::DomainChange => self.vars[x].on_domain.len(&self.trail),
        };
        for k in 0..n {
            let id = match event {
                DomainEvent::Bind => self.vars[x].on_bind.get(k),
                DomainEvent::BoundChange => self.vars[x].on_bound.get(k),
                DomainEvent::DomainChange => self.vars[x].on_domain.get(k),
            };
            if self.active != Some(id) {
                self.queue.push_back(id);
            }
        }
    }

    pub(crate) fn pop_pending(&mut self) -> Option<ConstraintId> {
        self.queue.pop_front()
    }

    pub(crate) fn clear_pending(&mut self) {
        self.queue.clear();
    }

    pub(crate) fn set_active(&mut self, id: Option<ConstraintId>) -> Option<ConstraintId> {
        let previous = self.active;
        self.active = id;
        previous
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
