/// Result of advancing a [`SteppedTween`] by one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TweenStep {
    /// Moved toward the target; not there yet
    Progress(f32),
    /// Snapped exactly onto the target
    Converged(f32),
}

impl TweenStep {
    pub fn value(&self) -> f32 {
        match self {
            TweenStep::Progress(v) | TweenStep::Converged(v) => *v,
        }
    }

    pub fn is_converged(&self) -> bool {
        matches!(self, TweenStep::Converged(_))
    }
}

/// A value moved toward a target by a fixed increment per tick.
///
/// A fixed step bounds the worst-case number of ticks to
/// `ceil(|from - to| / step)` no matter where it starts. The value moves
/// monotonically, never by more than one step per tick, and never passes
/// the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteppedTween {
    current: f32,
    target: f32,
    step: f32,
}

impl SteppedTween {
    pub fn new(from: f32, to: f32, step: f32) -> Self {
        Self {
            current: from,
            target: to,
            step: step.abs(),
        }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn step_size(&self) -> f32 {
        self.step
    }

    pub fn is_rising(&self) -> bool {
        self.target > self.current
    }

    pub fn is_converged(&self) -> bool {
        self.current == self.target
    }

    /// Upper bound on the ticks left before convergence
    pub fn remaining_ticks(&self) -> u32 {
        if self.step == 0.0 {
            return 0;
        }
        ((self.target - self.current).abs() / self.step).ceil() as u32
    }

    pub fn step(&mut self) -> TweenStep {
        let distance = (self.target - self.current).abs();
        if distance < self.step || self.step <= 0.0 {
            self.current = self.target;
            return TweenStep::Converged(self.current);
        }

        self.current = if self.current < self.target {
            (self.current + self.step).min(self.target)
        } else {
            (self.current - self.step).max(self.target)
        };

        if self.current == self.target {
            TweenStep::Converged(self.current)
        } else {
            TweenStep::Progress(self.current)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rising_never_overshoots() {
        let mut tween = SteppedTween::new(0.0, 0.7, 0.25);
        let values: Vec<_> = std::iter::from_fn(|| {
            (!tween.is_converged()).then(|| tween.step())
        })
        .collect();

        assert_eq!(values.len(), 3);
        assert_eq!(values.last(), Some(&TweenStep::Converged(0.7)));
        for pair in values.windows(2) {
            assert!(pair[0].value() <= pair[1].value());
        }
    }

    #[test]
    fn test_falling_snaps_to_zero() {
        let mut tween = SteppedTween::new(1.0, 0.0, 0.25);
        assert!(!tween.is_rising());
        assert_eq!(tween.step(), TweenStep::Progress(0.75));
        assert_eq!(tween.step(), TweenStep::Progress(0.5));
        assert_eq!(tween.step(), TweenStep::Progress(0.25));
        assert_eq!(tween.step(), TweenStep::Converged(0.0));
    }

    #[test]
    fn test_final_gap_smaller_than_step_snaps() {
        let mut tween = SteppedTween::new(0.0, 0.7, 0.25);
        assert_eq!(tween.step(), TweenStep::Progress(0.25));
        assert_eq!(tween.step(), TweenStep::Progress(0.5));
        assert_eq!(tween.step(), TweenStep::Converged(0.7));
    }

    #[test]
    fn test_remaining_ticks() {
        assert_eq!(SteppedTween::new(0.0, 1.0, 0.5).remaining_ticks(), 2);
        assert_eq!(SteppedTween::new(0.4, 0.4, 0.1).remaining_ticks(), 0);
    }
}
