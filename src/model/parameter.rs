//! Animatable scalar parameters.
//!
//! A parameter notifies on two channels: `on_param_change` handlers receive
//! the raw value, generic `on_change` handlers just learn that something
//! changed. Both fire on every `notify()`, value channel first.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::observable::{Delivery, Derived, Emitter, Observable};
use crate::errors::ModelError;
use crate::log::warn;
use crate::types::finite;

pub struct Parameter {
    emitter: Emitter,
    value: Cell<f64>,
    value_handlers: RefCell<Vec<Rc<dyn Fn(f64)>>>,
    delivering: Cell<bool>,
    computed: bool,
}

impl std::fmt::Debug for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parameter")
            .field("value", &self.value.get())
            .field("computed", &self.computed)
            .field("value_handlers", &self.value_handlers.borrow().len())
            .field("emitter", &self.emitter)
            .finish()
    }
}

impl Observable for Parameter {
    fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    fn notify(&self) {
        if self.delivering.replace(true) {
            warn!("re-entrant parameter notify suppressed (dependency cycle?)");
            return;
        }
        let _delivery = Delivery(&self.delivering);
        let value = self.value.get();
        let handlers: Vec<_> = self.value_handlers.borrow().iter().cloned().collect();
        for handler in handlers {
            handler(value);
        }
        self.emitter.notify();
    }
}

impl Parameter {
    /// A free parameter (unchecked, use `try_new` for user input).
    pub fn new(value: f64) -> Rc<Parameter> {
        Rc::new(Self::with(value, false))
    }

    pub fn try_new(value: f64) -> Result<Rc<Parameter>, ModelError> {
        Ok(Self::new(finite(value)?))
    }

    fn with(value: f64, computed: bool) -> Parameter {
        Parameter {
            emitter: Emitter::new(),
            value: Cell::new(value),
            value_handlers: RefCell::new(Vec::new()),
            delivering: Cell::new(false),
            computed,
        }
    }

    pub(crate) fn computed(value: f64) -> Rc<Parameter> {
        Rc::new(Self::with(value, true))
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.value.get()
    }

    pub fn is_computed(&self) -> bool {
        self.computed
    }

    /// Assign a new value and notify both channels.
    pub fn set_value(&self, value: f64) -> Result<(), ModelError> {
        if self.computed {
            return Err(ModelError::ComputedEntity {
                entity: "parameter",
            });
        }
        self.value.set(finite(value)?);
        self.notify();
        Ok(())
    }

    /// Subscribe to raw value updates.
    pub fn on_param_change<F: Fn(f64) + 'static>(&self, handler: F) {
        self.value_handlers.borrow_mut().push(Rc::new(handler));
    }

    pub(crate) fn store(&self, value: f64) {
        if value.is_finite() {
            self.value.set(value);
        } else {
            warn!(value, "ignoring non-finite recomputed parameter value");
        }
    }

    /// A computed parameter whose value is `f(source)`.
    pub fn map<F>(source: &Rc<Parameter>, f: F) -> Rc<Parameter>
    where
        F: Fn(f64) -> f64 + 'static,
    {
        let source = Rc::clone(source);
        Derived::new(Parameter::computed(0.0))
            .on(&source)
            .build(move |p| p.store(f(source.value())))
    }
}

/// Forwards one parameter's value to any number of sink parameters.
///
/// Forwarding stops once the chain is dropped.
#[derive(Debug)]
pub struct ChainedParameter {
    source: Rc<Parameter>,
    sinks: RefCell<Vec<Rc<Parameter>>>,
}

impl ChainedParameter {
    pub fn new(source: &Rc<Parameter>) -> Rc<ChainedParameter> {
        let chain = Rc::new(ChainedParameter {
            source: Rc::clone(source),
            sinks: RefCell::new(Vec::new()),
        });
        let weak: Weak<ChainedParameter> = Rc::downgrade(&chain);
        source.on_param_change(move |value| {
            if let Some(chain) = weak.upgrade() {
                chain.forward(value);
            }
        });
        chain
    }

    /// Add a sink and bring it up to date immediately.
    pub fn add_sink(&self, sink: &Rc<Parameter>) {
        self.sinks.borrow_mut().push(Rc::clone(sink));
        Self::push_to(sink, self.source.value());
    }

    pub fn source(&self) -> &Rc<Parameter> {
        &self.source
    }

    pub fn sinks(&self) -> Vec<Rc<Parameter>> {
        self.sinks.borrow().clone()
    }

    fn forward(&self, value: f64) {
        let sinks = self.sinks();
        for sink in &sinks {
            Self::push_to(sink, value);
        }
    }

    fn push_to(sink: &Parameter, value: f64) {
        if let Err(err) = sink.set_value(value) {
            warn!(%err, "chained parameter sink rejected value");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_value_fires_both_channels() {
        let p = Parameter::new(0.0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let generic = Rc::new(Cell::new(0));

        let s = Rc::clone(&seen);
        p.on_param_change(move |v| s.borrow_mut().push(v));
        let g = Rc::clone(&generic);
        p.on_change(move || g.set(g.get() + 1));

        p.set_value(1.5).unwrap();
        p.set_value(2.5).unwrap();
        assert_eq!(*seen.borrow(), vec![1.5, 2.5]);
        assert_eq!(generic.get(), 2);
    }

    #[test]
    fn notifications_resume_after_a_handler_panics() {
        let p = Parameter::new(0.0);
        let armed = Rc::new(Cell::new(true));
        let generic = Rc::new(Cell::new(0));

        let a = Rc::clone(&armed);
        p.on_param_change(move |_| {
            if a.replace(false) {
                panic!("handler failure");
            }
        });
        let g = Rc::clone(&generic);
        p.on_change(move || g.set(g.get() + 1));

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| p.set_value(1.0)));
        assert!(result.is_err());
        assert_eq!(generic.get(), 0);

        p.set_value(2.0).unwrap();
        assert_eq!(p.value(), 2.0);
        assert_eq!(generic.get(), 1);
    }

    #[test]
    fn set_value_rejects_nan() {
        let p = Parameter::new(1.0);
        assert!(p.set_value(f64::NAN).is_err());
        assert_eq!(p.value(), 1.0);
    }

    #[test]
    fn map_follows_source_and_rejects_direct_writes() {
        let t = Parameter::new(2.0);
        let sq = Parameter::map(&t, |v| v * v);
        assert_eq!(sq.value(), 4.0);
        t.set_value(3.0).unwrap();
        assert_eq!(sq.value(), 9.0);
        assert!(matches!(
            sq.set_value(1.0),
            Err(ModelError::ComputedEntity { .. })
        ));
    }

    #[test]
    fn chained_parameter_fans_out() {
        let src = Parameter::new(1.0);
        let a = Parameter::new(0.0);
        let b = Parameter::new(0.0);
        let chain = ChainedParameter::new(&src);
        chain.add_sink(&a);
        chain.add_sink(&b);
        assert_eq!(a.value(), 1.0);

        src.set_value(4.0).unwrap();
        assert_eq!(a.value(), 4.0);
        assert_eq!(b.value(), 4.0);

        drop(chain);
        src.set_value(5.0).unwrap();
        assert_eq!(a.value(), 4.0);
    }

    #[test]
    fn mapped_chain_cascades() {
        let t = Parameter::new(0.0);
        let doubled = Parameter::map(&t, |v| 2.0 * v);
        let plus_one = Parameter::map(&doubled, |v| v + 1.0);
        t.set_value(2.0).unwrap();
        assert_eq!(plus_one.value(), 5.0);
    }
}
