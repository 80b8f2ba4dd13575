use crate::geometry::{Point, Rect};
use serde::Serialize;
use serde_with::DeserializeFromStr;
use std::time::Duration;
use strum::{Display as StrumDisplay, EnumString};

/// Overshoot constant shared by the back-in/back-out curves.
const BACK_C1: f64 = 1.70158;
const BACK_C3: f64 = BACK_C1 + 1.0;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, DeserializeFromStr, EnumString, StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    #[strum(serialize = "linear")]
    Linear,
    /// Overshoots past the target, then settles back onto it.
    #[strum(serialize = "back-out", serialize = "backout")]
    BackOut,
    /// Pulls away from the start before accelerating toward the target.
    #[strum(serialize = "back-in", serialize = "backin")]
    BackIn,
}

impl Easing {
    /// Maps linear progress `t` in [0, 1] to eased progress. Back curves may
    /// leave [0, 1] mid-flight but always hit 0 at t=0 and 1 at t=1.
    pub fn apply(self, t: f64) -> f64 {
        match self {
            Easing::Linear => t,
            Easing::BackOut => {
                let u = t - 1.0;
                1.0 + BACK_C3 * u * u * u + BACK_C1 * u * u
            }
            Easing::BackIn => BACK_C3 * t * t * t - BACK_C1 * t * t,
        }
    }
}

pub trait Lerp: Copy {
    fn lerp(from: Self, to: Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(from: Self, to: Self, t: f64) -> Self {
        from + (to - from) * t
    }
}

impl Lerp for Point {
    fn lerp(from: Self, to: Self, t: f64) -> Self {
        Point::new(f64::lerp(from.x, to.x, t), f64::lerp(from.y, to.y, t))
    }
}

impl Lerp for Rect {
    fn lerp(from: Self, to: Self, t: f64) -> Self {
        Rect::new(
            f64::lerp(from.x, to.x, t),
            f64::lerp(from.y, to.y, t),
            f64::lerp(from.width, to.width, t),
            f64::lerp(from.height, to.height, t),
        )
    }
}

/// A property animation advanced once per frame-clock tick. Owning it is the
/// only handle: dropping the tween stops the animation.
#[derive(Debug, Clone)]
pub struct Tween<T: Lerp> {
    from: T,
    to: T,
    duration: Duration,
    elapsed: Duration,
    easing: Easing,
}

impl<T: Lerp> Tween<T> {
    pub fn new(from: T, to: T, duration: Duration, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: Duration::ZERO,
            easing,
        }
    }

    /// Advances by `dt` (saturating at the full duration) and returns the
    /// current value. A zero-duration tween completes on its first advance.
    pub fn advance(&mut self, dt: Duration) -> T {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.value()
    }

    pub fn value(&self) -> T {
        T::lerp(self.from, self.to, self.easing.apply(self.progress()))
    }

    fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            1.0
        } else {
            self.elapsed.as_secs_f64() / self.duration.as_secs_f64()
        }
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_endpoints() {
        for easing in [Easing::Linear, Easing::BackOut, Easing::BackIn] {
            assert!(easing.apply(0.0).abs() < 1e-9, "{easing} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-9, "{easing} at 1");
        }
    }

    #[test]
    fn test_back_out_overshoots_target() {
        let max = (1..100)
            .map(|i| Easing::BackOut.apply(i as f64 / 100.0))
            .fold(f64::MIN, f64::max);
        assert!(max > 1.0);
    }

    #[test]
    fn test_back_in_dips_below_start() {
        let min = (1..100)
            .map(|i| Easing::BackIn.apply(i as f64 / 100.0))
            .fold(f64::MAX, f64::min);
        assert!(min < 0.0);
    }

    #[test]
    fn test_easing_parses_config_spellings() {
        for (s, expected) in [
            ("linear", Easing::Linear),
            ("back-out", Easing::BackOut),
            ("BackOut", Easing::BackOut),
            ("backin", Easing::BackIn),
            ("Back-In", Easing::BackIn),
        ] {
            let parsed: Easing = serde_json::from_str(&format!("\"{s}\"")).unwrap();
            assert_eq!(parsed, expected);
        }
    }

    #[test]
    fn test_tween_advances_and_finishes() {
        let mut tween = Tween::new(0.0, 10.0, Duration::from_millis(500), Easing::Linear);
        assert_eq!(tween.value(), 0.0);
        assert!((tween.advance(Duration::from_millis(250)) - 5.0).abs() < 1e-9);
        assert!(!tween.is_finished());

        // Overshooting the duration clamps to the end value.
        let v = tween.advance(Duration::from_millis(1000));
        assert!((v - 10.0).abs() < 1e-9);
        assert!(tween.is_finished());
    }

    #[test]
    fn test_zero_duration_tween_completes_immediately() {
        let mut tween = Tween::new(1.0, 2.0, Duration::ZERO, Easing::BackOut);
        assert!((tween.advance(Duration::from_millis(1)) - 2.0).abs() < 1e-9);
        assert!(tween.is_finished());
    }

    #[test]
    fn test_rect_lerp_is_componentwise() {
        let from = Rect::new(120.0, 120.0, 60.0, 60.0);
        let to = Rect::new(220.0, 120.0, 60.0, 60.0);
        let mid = Rect::lerp(from, to, 0.5);
        assert_eq!(mid, Rect::new(170.0, 120.0, 60.0, 60.0));
    }

    #[test]
    fn test_back_out_tween_lands_exactly_on_target() {
        let mut tween = Tween::new(
            Rect::new(0.0, 0.0, 60.0, 60.0),
            Rect::new(100.0, 50.0, 60.0, 60.0),
            Duration::from_millis(500),
            Easing::BackOut,
        );
        let end = tween.advance(Duration::from_millis(500));
        assert!((end.x - 100.0).abs() < 1e-9);
        assert!((end.y - 50.0).abs() < 1e-9);
    }
}
