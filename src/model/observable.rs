//! Change notification core.
//!
//! Every entity embeds an [`Emitter`] and implements [`Observable`] by handing
//! it out. `notify()` synchronously calls the registered handlers in
//! registration order; there is no batching and no scheduling.
//!
//! Edges between entities are created by [`Derived`]: the downstream entity
//! owns its recompute closure (which holds strong handles to its inputs) and
//! each upstream emitter keeps only a `Weak` pointer to that closure. Dropping
//! or removing the downstream entity therefore detaches it without touching
//! the upstream side, and no reference cycle is formed.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::log::{debug, warn};
use crate::types::Value;

enum Listener {
    /// Registered through `on_change`, lives as long as the emitter
    Owned(Rc<dyn Fn()>),
    /// Recompute closure owned by a downstream entity
    Bound(Weak<dyn Fn()>),
}

impl Listener {
    fn upgrade(&self) -> Option<Rc<dyn Fn()>> {
        match self {
            Listener::Owned(f) => Some(Rc::clone(f)),
            Listener::Bound(w) => w.upgrade(),
        }
    }

    fn is_alive(&self) -> bool {
        match self {
            Listener::Owned(_) => true,
            Listener::Bound(w) => w.strong_count() > 0,
        }
    }
}

/// A dependency edge held by the downstream entity.
struct Binding {
    run: Rc<dyn Fn()>,
    sources: Vec<Rc<dyn Observable>>,
}

/// Handler lists and lifecycle flags of one entity.
#[derive(Default)]
pub struct Emitter {
    listeners: RefCell<Vec<Listener>>,
    destroy: RefCell<Vec<Box<dyn FnOnce()>>>,
    bindings: RefCell<Vec<Binding>>,
    delivering: Cell<bool>,
    removed: Cell<bool>,
}

/// Clears the delivering flag even if a handler unwinds.
pub(crate) struct Delivery<'a>(pub(crate) &'a Cell<bool>);

impl Drop for Delivery<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a change handler. Handlers run in registration order.
    pub fn on_change<F: Fn() + 'static>(&self, handler: F) {
        self.listeners
            .borrow_mut()
            .push(Listener::Owned(Rc::new(handler)));
    }

    /// Register a handler that runs once when the entity is removed.
    pub fn on_remove<F: FnOnce() + 'static>(&self, handler: F) {
        self.destroy.borrow_mut().push(Box::new(handler));
    }

    /// Subscribe a downstream recompute closure without owning it.
    fn attach(&self, run: &Rc<dyn Fn()>) {
        self.listeners
            .borrow_mut()
            .push(Listener::Bound(Rc::downgrade(run)));
    }

    /// Deliver a change notification to every live handler.
    ///
    /// A notify that arrives while this emitter is already delivering (a
    /// dependency cycle, or a handler poking its own entity) is dropped.
    pub fn notify(&self) {
        if self.delivering.get() {
            warn!("re-entrant notify suppressed (dependency cycle?)");
            return;
        }
        // Snapshot so handlers may subscribe further listeners while we run.
        let handlers: Vec<Rc<dyn Fn()>> = {
            let mut listeners = self.listeners.borrow_mut();
            listeners.retain(Listener::is_alive);
            listeners.iter().filter_map(Listener::upgrade).collect()
        };
        self.delivering.set(true);
        let _delivery = Delivery(&self.delivering);
        for handler in handlers {
            handler();
        }
    }

    /// Fire the destroy handlers once, then detach from everything.
    pub fn remove(&self) {
        if self.removed.replace(true) {
            return;
        }
        let handlers = std::mem::take(&mut *self.destroy.borrow_mut());
        for handler in handlers {
            handler();
        }
        self.listeners.borrow_mut().clear();
        self.bindings.borrow_mut().clear();
    }

    pub fn is_removed(&self) -> bool {
        self.removed.get()
    }

    /// Number of live handlers (owned and bound)
    pub fn listener_count(&self) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|l| l.is_alive())
            .count()
    }

    /// Number of upstream entities this entity recomputes from
    pub fn dependency_count(&self) -> usize {
        self.bindings.borrow().iter().map(|b| b.sources.len()).sum()
    }

    fn hold(&self, binding: Binding) {
        self.bindings.borrow_mut().push(binding);
    }
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &self.listener_count())
            .field("dependencies", &self.dependency_count())
            .field("removed", &self.removed.get())
            .finish()
    }
}

/// An entity that can be observed for changes.
pub trait Observable {
    fn emitter(&self) -> &Emitter;

    /// Call every change handler, in registration order.
    fn notify(&self) {
        self.emitter().notify()
    }

    fn on_change<F: Fn() + 'static>(&self, handler: F)
    where
        Self: Sized,
    {
        self.emitter().on_change(handler)
    }

    fn on_remove<F: FnOnce() + 'static>(&self, handler: F)
    where
        Self: Sized,
    {
        self.emitter().on_remove(handler)
    }

    fn remove(&self) {
        self.emitter().remove()
    }

    fn is_removed(&self) -> bool {
        self.emitter().is_removed()
    }
}

/// Create-then-subscribe wiring for a derived entity.
///
/// `build` runs the compute function once against the freshly created target,
/// then subscribes it to every source. On each upstream change the target is
/// recomputed in place and notifies its own listeners, so handles held by
/// downstream consumers stay valid.
pub struct Derived<T: Observable + 'static> {
    target: Rc<T>,
    sources: Vec<Rc<dyn Observable>>,
}

impl<T: Observable + 'static> Derived<T> {
    pub fn new(target: Rc<T>) -> Self {
        Self {
            target,
            sources: Vec::new(),
        }
    }

    /// Recompute whenever `source` changes.
    pub fn on<S: Observable + 'static>(mut self, source: &Rc<S>) -> Self {
        let source: Rc<dyn Observable> = Rc::clone(source) as Rc<dyn Observable>;
        self.sources.push(source);
        self
    }

    /// Recompute whenever the parameter behind `value` changes, if there is one.
    pub fn on_value(mut self, value: &Value) -> Self {
        if let Some(source) = value.source() {
            self.sources.push(source);
        }
        self
    }

    pub fn on_dyn(mut self, source: Rc<dyn Observable>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn build<F>(self, compute: F) -> Rc<T>
    where
        F: Fn(&T) + 'static,
    {
        let Derived { target, sources } = self;
        compute(&target);

        let weak = Rc::downgrade(&target);
        let run: Rc<dyn Fn()> = Rc::new(move || {
            if let Some(target) = weak.upgrade() {
                compute(&target);
                target.notify();
            }
        });
        for source in &sources {
            source.emitter().attach(&run);
        }
        debug!(sources = sources.len(), "derived entity wired");
        target.emitter().hold(Binding { run, sources });
        target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default, Debug)]
    struct Cellish {
        emitter: Emitter,
        value: Cell<i32>,
    }

    impl Observable for Cellish {
        fn emitter(&self) -> &Emitter {
            &self.emitter
        }
    }

    impl Cellish {
        fn set(&self, v: i32) {
            self.value.set(v);
            self.notify();
        }
    }

    #[test]
    fn handlers_run_in_registration_order() {
        let c = Rc::new(Cellish::default());
        let log = Rc::new(RefCell::new(Vec::new()));
        for i in 0..3 {
            let log = Rc::clone(&log);
            c.on_change(move || log.borrow_mut().push(i));
        }
        c.set(1);
        assert_eq!(*log.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn remove_fires_destroy_handlers_once() {
        let c = Rc::new(Cellish::default());
        let count = Rc::new(Cell::new(0));
        let hits = Rc::clone(&count);
        c.on_remove(move || hits.set(hits.get() + 1));
        c.remove();
        c.remove();
        assert_eq!(count.get(), 1);
        assert!(c.is_removed());
    }

    #[test]
    fn derived_recomputes_and_cascades() {
        let a = Rc::new(Cellish::default());
        let a2 = Rc::clone(&a);
        let b = Derived::new(Rc::new(Cellish::default()))
            .on(&a)
            .build(move |b| b.value.set(a2.value.get() * 2));
        let b2 = Rc::clone(&b);
        let c = Derived::new(Rc::new(Cellish::default()))
            .on(&b)
            .build(move |c| c.value.set(b2.value.get() + 1));

        a.set(5);
        assert_eq!(b.value.get(), 10);
        assert_eq!(c.value.get(), 11);
    }

    #[test]
    fn dropped_downstream_detaches() {
        let a = Rc::new(Cellish::default());
        {
            let _b = Derived::new(Rc::new(Cellish::default()))
                .on(&a)
                .build(|_| {});
            assert_eq!(a.emitter().listener_count(), 1);
        }
        assert_eq!(a.emitter().listener_count(), 0);
        a.set(3);
    }

    #[test]
    fn removed_downstream_stops_recomputing() {
        let a = Rc::new(Cellish::default());
        let a2 = Rc::clone(&a);
        let b = Derived::new(Rc::new(Cellish::default()))
            .on(&a)
            .build(move |b| b.value.set(a2.value.get()));
        b.remove();
        a.set(7);
        assert_eq!(b.value.get(), 0);
        assert_eq!(b.emitter().dependency_count(), 0);
    }

    #[test]
    fn cycle_terminates() {
        let a = Rc::new(Cellish::default());
        let b = Rc::new(Cellish::default());
        let b2 = Rc::clone(&b);
        a.on_change(move || b2.set(b2.value.get() + 1));
        let a2 = Rc::clone(&a);
        b.on_change(move || a2.set(a2.value.get() + 1));

        a.set(0);
        // a -> b -> a (suppressed)
        assert_eq!(b.value.get(), 1);
        assert_eq!(a.value.get(), 1);
    }
}
