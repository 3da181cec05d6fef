pub mod fade;
pub mod tweening;

// Re-export commonly used types for convenience
pub use fade::{FadeStart, FadeUpdate, OpacityScheduler};
pub use tweening::{SteppedTween, TweenStep};
