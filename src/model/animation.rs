//! Hand-off from parameters to an animation driver.
//!
//! The driver owns time. A [`Tween`] only knows how to turn elapsed time into
//! a parameter value; every tick it pushes lands in `set_value`, so both
//! notification channels fire once per frame.

use std::rc::Rc;

use super::parameter::Parameter;
use crate::errors::ModelError;
use crate::log::debug;

/// Rate functions mapping linear progress in [0, 1] to eased progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    /// Smoothstep: zero velocity at both ends
    #[default]
    Smooth,
    EaseIn,
    EaseOut,
    /// Half cosine
    EaseInOut,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::Smooth => t * t * (3.0 - 2.0 * t),
            Easing::EaseIn => t * t,
            Easing::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOut => 0.5 - 0.5 * (std::f64::consts::PI * t).cos(),
        }
    }
}

/// Animate one parameter from `from` to `to` over `duration` seconds.
#[derive(Clone, Debug)]
pub struct Tween {
    param: Rc<Parameter>,
    from: f64,
    to: f64,
    duration: f64,
    easing: Easing,
}

impl Tween {
    pub fn new(param: &Rc<Parameter>, from: f64, to: f64, duration: f64, easing: Easing) -> Self {
        Self {
            param: Rc::clone(param),
            from,
            to,
            duration: duration.max(0.0),
            easing,
        }
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn param(&self) -> &Rc<Parameter> {
        &self.param
    }

    /// The value the parameter should hold `elapsed` seconds in.
    pub fn value_at(&self, elapsed: f64) -> f64 {
        let progress = if self.duration == 0.0 {
            1.0
        } else {
            elapsed / self.duration
        };
        self.from + (self.to - self.from) * self.easing.apply(progress)
    }

    /// Push the value for `elapsed` into the parameter.
    pub fn seek(&self, elapsed: f64) -> Result<(), ModelError> {
        self.param.set_value(self.value_at(elapsed))
    }
}

/// The external player that advances time.
pub trait AnimationDriver {
    fn run(&mut self, tween: &Tween) -> Result<(), ModelError>;
}

/// Steps a tween synchronously at a fixed frame rate.
#[derive(Clone, Copy, Debug)]
pub struct FixedStepDriver {
    pub fps: f64,
    /// Frames delivered so far
    pub frames: usize,
}

impl FixedStepDriver {
    pub fn new(fps: f64) -> Self {
        Self { fps, frames: 0 }
    }
}

impl Default for FixedStepDriver {
    fn default() -> Self {
        Self::new(60.0)
    }
}

impl AnimationDriver for FixedStepDriver {
    fn run(&mut self, tween: &Tween) -> Result<(), ModelError> {
        let frames = (tween.duration() * self.fps).ceil().max(1.0) as usize;
        debug!(frames, fps = self.fps, "stepping tween");
        for frame in 0..=frames {
            let elapsed = tween.duration() * frame as f64 / frames as f64;
            tween.seek(elapsed)?;
            self.frames += 1;
        }
        Ok(())
    }
}

impl Parameter {
    /// Animate `param` from `from` to `to`, letting `driver` supply the ticks.
    pub fn play(
        param: &Rc<Parameter>,
        from: f64,
        to: f64,
        duration: f64,
        easing: Easing,
        driver: &mut impl AnimationDriver,
    ) -> Result<(), ModelError> {
        driver.run(&Tween::new(param, from, to, duration, easing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Observable;
    use std::cell::RefCell;

    #[test]
    fn easings_fix_endpoints() {
        for e in [
            Easing::Linear,
            Easing::Smooth,
            Easing::EaseIn,
            Easing::EaseOut,
            Easing::EaseInOut,
        ] {
            assert!(e.apply(0.0).abs() < 1e-12, "{e:?}");
            assert!((e.apply(1.0) - 1.0).abs() < 1e-12, "{e:?}");
        }
        assert_eq!(Easing::Linear.apply(2.0), 1.0);
    }

    #[test]
    fn play_ticks_every_frame_and_lands_on_target() {
        let p = Parameter::new(0.0);
        let ticks = Rc::new(RefCell::new(Vec::new()));
        let t = Rc::clone(&ticks);
        p.on_param_change(move |v| t.borrow_mut().push(v));
        let generic = Rc::new(RefCell::new(0usize));
        let g = Rc::clone(&generic);
        p.on_change(move || *g.borrow_mut() += 1);

        let mut driver = FixedStepDriver::new(10.0);
        Parameter::play(&p, 0.0, 2.0, 1.0, Easing::Linear, &mut driver).unwrap();

        assert_eq!(driver.frames, 11);
        assert_eq!(ticks.borrow().len(), 11);
        assert_eq!(*generic.borrow(), 11);
        assert!((p.value() - 2.0).abs() < 1e-12);
        assert!((ticks.borrow()[5] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_duration_jumps() {
        let p = Parameter::new(0.0);
        let tween = Tween::new(&p, 0.0, 3.0, 0.0, Easing::Smooth);
        assert_eq!(tween.value_at(0.0), 3.0);
    }
}
