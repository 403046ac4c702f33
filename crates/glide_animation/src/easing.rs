//! Easing functions
//!
//! Curves are named the way motion designers write them: `family.direction`,
//! e.g. `power3.out`, `sine.inOut` or `back.out(1.7)`. Every family is defined
//! by its ease-in curve; the out and in-out variants are derived from it.

use crate::error::AnimationError;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Default overshoot of the `back` family
pub const DEFAULT_OVERSHOOT: f32 = 1.70158;

/// Which end of the curve the easing applies to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EaseDirection {
    In,
    Out,
    InOut,
}

impl EaseDirection {
    fn name(self) -> &'static str {
        match self {
            EaseDirection::In => "in",
            EaseDirection::Out => "out",
            EaseDirection::InOut => "inOut",
        }
    }
}

/// An easing curve mapping linear progress to eased progress
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Easing {
    Linear,
    /// Polynomial ease; `power1` is quadratic, `power4` quintic
    Power { degree: u8, direction: EaseDirection },
    Sine(EaseDirection),
    Expo(EaseDirection),
    /// Overshooting ease; values leave `[0, 1]` briefly
    Back {
        overshoot: f32,
        direction: EaseDirection,
    },
}

impl Default for Easing {
    fn default() -> Self {
        Easing::Power {
            degree: 1,
            direction: EaseDirection::Out,
        }
    }
}

impl Easing {
    pub const fn power(degree: u8, direction: EaseDirection) -> Self {
        Easing::Power { degree, direction }
    }

    pub const fn back_out(overshoot: f32) -> Self {
        Easing::Back {
            overshoot,
            direction: EaseDirection::Out,
        }
    }

    /// Apply the easing to linear progress `t` (clamped to `[0, 1]`)
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Easing::Linear => t,
            Easing::Power { direction, .. }
            | Easing::Sine(direction)
            | Easing::Expo(direction)
            | Easing::Back { direction, .. } => match direction {
                EaseDirection::In => self.ease_in(t),
                EaseDirection::Out => 1.0 - self.ease_in(1.0 - t),
                EaseDirection::InOut => {
                    if t < 0.5 {
                        self.ease_in(t * 2.0) / 2.0
                    } else {
                        1.0 - self.ease_in((1.0 - t) * 2.0) / 2.0
                    }
                }
            },
        }
    }

    fn ease_in(&self, t: f32) -> f32 {
        match *self {
            Easing::Linear => t,
            Easing::Power { degree, .. } => t.powi(i32::from(degree) + 1),
            Easing::Sine(_) => 1.0 - (t * PI / 2.0).cos(),
            Easing::Expo(_) => {
                if t <= 0.0 {
                    0.0
                } else {
                    2f32.powf(10.0 * (t - 1.0))
                }
            }
            Easing::Back { overshoot, .. } => (overshoot + 1.0) * t * t * t - overshoot * t * t,
        }
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Easing::Linear => f.write_str("linear"),
            Easing::Power { degree, direction } => write!(f, "power{}.{}", degree, direction.name()),
            Easing::Sine(direction) => write!(f, "sine.{}", direction.name()),
            Easing::Expo(direction) => write!(f, "expo.{}", direction.name()),
            Easing::Back {
                overshoot,
                direction,
            } => write!(f, "back.{}({})", direction.name(), overshoot),
        }
    }
}

impl FromStr for Easing {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || AnimationError::UnknownEasing(s.to_string());
        let s = s.trim();
        if s == "linear" || s == "none" {
            return Ok(Easing::Linear);
        }

        let (family, rest) = s.split_once('.').unwrap_or((s, "out"));
        let (direction, param) = match rest.split_once('(') {
            Some((dir, param)) => {
                let param = param.strip_suffix(')').ok_or_else(unknown)?;
                let value = param.trim().parse::<f32>().map_err(|_| unknown())?;
                (dir, Some(value))
            }
            None => (rest, None),
        };
        let direction = match direction {
            "in" => EaseDirection::In,
            "out" => EaseDirection::Out,
            "inOut" => EaseDirection::InOut,
            _ => return Err(unknown()),
        };

        match (family, param) {
            ("sine", None) => Ok(Easing::Sine(direction)),
            ("expo", None) => Ok(Easing::Expo(direction)),
            ("back", overshoot) => Ok(Easing::Back {
                overshoot: overshoot.unwrap_or(DEFAULT_OVERSHOOT),
                direction,
            }),
            (family, None) => {
                let degree = family
                    .strip_prefix("power")
                    .and_then(|d| d.parse::<u8>().ok())
                    .filter(|d| (1..=4).contains(d))
                    .ok_or_else(unknown)?;
                Ok(Easing::Power { degree, direction })
            }
            _ => Err(unknown()),
        }
    }
}

impl TryFrom<String> for Easing {
    type Error = AnimationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Easing> for String {
    fn from(easing: Easing) -> Self {
        easing.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        let curves = [
            Easing::Linear,
            Easing::power(3, EaseDirection::Out),
            Easing::Sine(EaseDirection::InOut),
            Easing::Expo(EaseDirection::In),
            Easing::back_out(1.7),
        ];
        for easing in curves {
            assert!(easing.apply(0.0).abs() < 1e-3, "{easing} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-3, "{easing} at 1");
        }
    }

    #[test]
    fn test_out_curves_decelerate() {
        let ease = Easing::power(3, EaseDirection::Out);
        // Most of the distance is covered early
        assert!(ease.apply(0.25) > 0.6);
        assert!(ease.apply(0.5) > 0.9);
    }

    #[test]
    fn test_back_out_overshoots() {
        let ease = Easing::back_out(1.7);
        let peak = (1..100)
            .map(|i| ease.apply(i as f32 / 100.0))
            .fold(f32::MIN, f32::max);
        assert!(peak > 1.0);
    }

    #[test]
    fn test_sine_in_out_symmetric() {
        let ease = Easing::Sine(EaseDirection::InOut);
        assert!((ease.apply(0.5) - 0.5).abs() < 1e-4);
        assert!((ease.apply(0.2) + ease.apply(0.8) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("power3.out".parse::<Easing>().unwrap(), Easing::power(3, EaseDirection::Out));
        assert_eq!("sine.inOut".parse::<Easing>().unwrap(), Easing::Sine(EaseDirection::InOut));
        assert_eq!("back.out(1.7)".parse::<Easing>().unwrap(), Easing::back_out(1.7));
        assert_eq!("power2".parse::<Easing>().unwrap(), Easing::power(2, EaseDirection::Out));
        assert_eq!("none".parse::<Easing>().unwrap(), Easing::Linear);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("bounce.out".parse::<Easing>().is_err());
        assert!("power9.out".parse::<Easing>().is_err());
        assert!("sine.sideways".parse::<Easing>().is_err());
        assert!("back.out(abc)".parse::<Easing>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        let ease = Easing::Sine(EaseDirection::InOut);
        assert_eq!(ease.to_string(), "sine.inOut");
        assert_eq!(ease.to_string().parse::<Easing>().unwrap(), ease);
    }
}
