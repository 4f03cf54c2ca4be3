//! World and platform balance
//!
//! Supplied once at startup and immutable for the rest of the session.
//! Defaults reproduce the shipped game; JSON overrides may set any subset.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Platform difficulty classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DifficultyClass {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl DifficultyClass {
    pub const ALL: [DifficultyClass; 3] = [Self::Easy, Self::Medium, Self::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyClass::Easy => "Easy",
            DifficultyClass::Medium => "Medium",
            DifficultyClass::Hard => "Hard",
        }
    }
}

/// Inclusive float range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f32,
    pub max: f32,
}

impl Range {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, v: f32) -> bool {
        v >= self.min && v <= self.max
    }

    fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }
}

/// Rejected tuning
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("invalid tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must be finite")]
    NotFinite { field: &'static str },
    #[error("{field} must be positive (got {value})")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} must be within [0, 1] (got {value})")]
    NotAFraction { field: &'static str, value: f32 },
    #[error("{field}: min {min} is greater than max {max}")]
    InvertedRange {
        field: &'static str,
        min: f32,
        max: f32,
    },
    #[error("{class} weight must not be negative (got {weight})")]
    NegativeWeight { class: &'static str, weight: f32 },
    #[error("at least one difficulty class needs a positive weight")]
    NoClassWeight,
    #[error("{class} distance.min {min} lets platforms overlap (needs at least {needed})")]
    Overlap {
        class: &'static str,
        min: f32,
        needed: f32,
    },
}

/// Spacing rules for one difficulty class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassRule {
    /// Selection weight (weights are normalized over all classes)
    pub weight: f32,
    /// Horizontal distance added between platform centers
    pub distance: Range,
    /// Vertical delta from the previous platform
    pub height: Range,
}

/// Per-class rules
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassTable {
    pub easy: ClassRule,
    pub medium: ClassRule,
    pub hard: ClassRule,
}

impl Default for ClassTable {
    fn default() -> Self {
        Self {
            easy: ClassRule {
                weight: 0.5,
                distance: Range::new(120.0, 180.0),
                height: Range::new(-30.0, 30.0),
            },
            medium: ClassRule {
                weight: 0.3,
                distance: Range::new(200.0, 260.0),
                height: Range::new(-40.0, 40.0),
            },
            hard: ClassRule {
                weight: 0.2,
                distance: Range::new(280.0, 340.0),
                height: Range::new(-50.0, 50.0),
            },
        }
    }
}

impl ClassTable {
    pub fn rule(&self, class: DifficultyClass) -> &ClassRule {
        match class {
            DifficultyClass::Easy => &self.easy,
            DifficultyClass::Medium => &self.medium,
            DifficultyClass::Hard => &self.hard,
        }
    }

    /// Map a uniform draw in [0, 1) onto a class by cumulative weight.
    ///
    /// With the default weights the thresholds are 0.5 / 0.8 / 1.0.
    pub fn pick(&self, roll: f32) -> DifficultyClass {
        let total = self.easy.weight + self.medium.weight + self.hard.weight;
        if total <= 0.0 {
            return DifficultyClass::Easy;
        }
        let roll = roll * total;
        if roll < self.easy.weight {
            DifficultyClass::Easy
        } else if roll < self.easy.weight + self.medium.weight {
            DifficultyClass::Medium
        } else {
            DifficultyClass::Hard
        }
    }
}

/// Game balance values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === World ===
    pub game_width: f32,
    pub game_height: f32,
    /// Added to vertical velocity every airborne tick
    pub gravity: f32,

    // === Platforms ===
    pub min_platform_width: f32,
    pub max_platform_width: f32,
    pub classes: ClassTable,
    /// Platform tops stay within these fractions of the world height
    pub min_platform_y_frac: f32,
    pub max_platform_y_frac: f32,
    /// Spawn platform height as a fraction of the world height
    pub start_platform_y_frac: f32,

    // === Window ===
    /// Entities this far behind the player are retired
    pub trailing_margin: f32,
    /// Terrain is always generated at least this far ahead
    pub look_ahead_margin: f32,

    // === Power-ups ===
    /// Chance per eligible platform
    pub power_up_chance: f32,
    /// Spacing window, in multiples of the candidate platform's width
    pub power_up_spacing_widths: f32,
    /// Platforms to pass in flight mode
    pub platforms_to_fly: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            game_width: 750.0,
            game_height: 1334.0,
            gravity: 0.4,

            min_platform_width: 120.0,
            max_platform_width: 180.0,
            classes: ClassTable::default(),
            min_platform_y_frac: 0.3,
            max_platform_y_frac: 0.7,
            start_platform_y_frac: 0.6,

            trailing_margin: 400.0,
            look_ahead_margin: 1000.0,

            power_up_chance: 0.1,
            power_up_spacing_widths: 2.0,
            platforms_to_fly: 5,
        }
    }
}

impl Tuning {
    /// Parse overrides from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Check that generation can always make progress without overlaps.
    ///
    /// A platform follows the previous one at `distance + width / 2 +
    /// last.width / 2`, so the narrowest platform after the widest one must
    /// still clear its right edge.
    pub fn validate(&self) -> Result<(), TuningError> {
        let scalars = [
            ("game_width", self.game_width),
            ("game_height", self.game_height),
            ("gravity", self.gravity),
            ("min_platform_width", self.min_platform_width),
            ("max_platform_width", self.max_platform_width),
            ("min_platform_y_frac", self.min_platform_y_frac),
            ("max_platform_y_frac", self.max_platform_y_frac),
            ("start_platform_y_frac", self.start_platform_y_frac),
            ("trailing_margin", self.trailing_margin),
            ("look_ahead_margin", self.look_ahead_margin),
            ("power_up_chance", self.power_up_chance),
            ("power_up_spacing_widths", self.power_up_spacing_widths),
        ];
        if let Some(&(field, _)) = scalars.iter().find(|(_, v)| !v.is_finite()) {
            return Err(TuningError::NotFinite { field });
        }

        let positives = [
            ("game_width", self.game_width),
            ("game_height", self.game_height),
            ("min_platform_width", self.min_platform_width),
            ("trailing_margin", self.trailing_margin),
            ("look_ahead_margin", self.look_ahead_margin),
        ];
        if let Some(&(field, value)) = positives.iter().find(|(_, v)| *v <= 0.0) {
            return Err(TuningError::NotPositive { field, value });
        }

        let unit = Range::new(0.0, 1.0);
        let fractions = [
            ("min_platform_y_frac", self.min_platform_y_frac),
            ("max_platform_y_frac", self.max_platform_y_frac),
            ("start_platform_y_frac", self.start_platform_y_frac),
            ("power_up_chance", self.power_up_chance),
        ];
        if let Some(&(field, value)) = fractions.iter().find(|(_, v)| !unit.contains(*v)) {
            return Err(TuningError::NotAFraction { field, value });
        }

        let widths = Range::new(self.min_platform_width, self.max_platform_width);
        let heights = Range::new(self.min_platform_y_frac, self.max_platform_y_frac);
        let mut ranges = vec![("platform width", widths), ("platform y", heights)];

        let mut total_weight = 0.0;
        for class in DifficultyClass::ALL {
            let rule = self.classes.rule(class);
            if !rule.weight.is_finite() || !rule.distance.is_finite() || !rule.height.is_finite() {
                return Err(TuningError::NotFinite {
                    field: class.as_str(),
                });
            }
            if rule.weight < 0.0 {
                return Err(TuningError::NegativeWeight {
                    class: class.as_str(),
                    weight: rule.weight,
                });
            }
            total_weight += rule.weight;
            ranges.push((class.as_str(), rule.distance));
            ranges.push((class.as_str(), rule.height));
        }
        if total_weight <= 0.0 {
            return Err(TuningError::NoClassWeight);
        }

        if let Some(&(field, range)) = ranges.iter().find(|(_, r)| r.min > r.max) {
            return Err(TuningError::InvertedRange {
                field,
                min: range.min,
                max: range.max,
            });
        }

        let needed = (self.max_platform_width - self.min_platform_width) / 2.0;
        for class in DifficultyClass::ALL {
            let min = self.classes.rule(class).distance.min;
            if min < needed {
                return Err(TuningError::Overlap {
                    class: class.as_str(),
                    min,
                    needed,
                });
            }
        }

        Ok(())
    }

    pub fn min_platform_y(&self) -> f32 {
        self.game_height * self.min_platform_y_frac
    }

    pub fn max_platform_y(&self) -> f32 {
        self.game_height * self.max_platform_y_frac
    }

    pub fn start_platform_y(&self) -> f32 {
        self.game_height * self.start_platform_y_frac
    }
}
