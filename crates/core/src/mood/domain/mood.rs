//! Bounded mood value and the expression-driven transition table.
//!
//! | expression | transition                     |
//! |------------|--------------------------------|
//! | happy      | `+step`, clamped to max        |
//! | neutral    | `-step / 2`, clamped to min    |
//! | sad, angry | reset to min                   |
//! | other      | unchanged                      |

use thiserror::Error;

use crate::mood::domain::expression::Expression;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoodError {
    #[error("mood range is empty: min {min} must be below max {max}")]
    EmptyRange { min: i32, max: i32 },
    #[error("mood step must be positive, got {0}")]
    NonPositiveStep(i32),
}

/// Inclusive `[min, max]` bounds for the mood value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoodRange {
    min: i32,
    max: i32,
}

impl MoodRange {
    pub fn new(min: i32, max: i32) -> Result<Self, MoodError> {
        if min >= max {
            return Err(MoodError::EmptyRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn clamp(&self, value: i32) -> i32 {
        value.clamp(self.min, self.max)
    }
}

/// What a single expression did to the mood.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoodTransition {
    Raised { from: i32, to: i32 },
    Lowered { from: i32, to: i32 },
    Reset { from: i32 },
    /// A known expression whose move was absorbed by the clamp.
    Saturated(i32),
    /// Unrecognized label; mood untouched.
    Ignored(i32),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mood {
    value: i32,
    range: MoodRange,
    step: i32,
}

impl Mood {
    /// `initial` is clamped into the range.
    pub fn new(range: MoodRange, step: i32, initial: i32) -> Result<Self, MoodError> {
        if step <= 0 {
            return Err(MoodError::NonPositiveStep(step));
        }
        Ok(Self {
            value: range.clamp(initial),
            range,
            step,
        })
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn range(&self) -> MoodRange {
        self.range
    }

    pub fn step(&self) -> i32 {
        self.step
    }

    pub fn reset(&mut self, value: i32) {
        self.value = self.range.clamp(value);
    }

    pub fn apply(&mut self, expression: &Expression) -> MoodTransition {
        let from = self.value;
        let target = match expression {
            Expression::Happy => from.saturating_add(self.step),
            Expression::Neutral => from.saturating_sub(self.step / 2),
            Expression::Sad | Expression::Angry => self.range.min,
            Expression::Other(label) => {
                log::debug!("Ignoring unrecognized expression '{label}' (mood {from})");
                return MoodTransition::Ignored(from);
            }
        };
        self.value = self.range.clamp(target);

        match expression {
            Expression::Sad | Expression::Angry if from != self.value => {
                MoodTransition::Reset { from }
            }
            _ if self.value > from => MoodTransition::Raised {
                from,
                to: self.value,
            },
            _ if self.value < from => MoodTransition::Lowered {
                from,
                to: self.value,
            },
            _ => MoodTransition::Saturated(self.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn mood(initial: i32) -> Mood {
        Mood::new(MoodRange::new(0, 180).unwrap(), 10, initial).unwrap()
    }

    #[test]
    fn test_range_rejects_empty() {
        assert_eq!(
            MoodRange::new(5, 5),
            Err(MoodError::EmptyRange { min: 5, max: 5 })
        );
        assert!(MoodRange::new(10, 0).is_err());
    }

    #[test]
    fn test_new_rejects_non_positive_step() {
        let range = MoodRange::new(0, 180).unwrap();
        assert_eq!(Mood::new(range, 0, 0), Err(MoodError::NonPositiveStep(0)));
        assert!(Mood::new(range, -4, 0).is_err());
    }

    #[test]
    fn test_initial_value_is_clamped() {
        assert_eq!(mood(500).value(), 180);
        assert_eq!(mood(-3).value(), 0);
    }

    #[rstest]
    #[case(0, 10)]
    #[case(90, 100)]
    #[case(175, 180)]
    #[case(180, 180)]
    fn test_happy_raises_up_to_max(#[case] start: i32, #[case] expected: i32) {
        let mut m = mood(start);
        m.apply(&Expression::Happy);
        assert_eq!(m.value(), expected);
    }

    #[test]
    fn test_happy_is_idempotent_at_max() {
        let mut m = mood(180);
        assert_eq!(m.apply(&Expression::Happy), MoodTransition::Saturated(180));
        assert_eq!(m.apply(&Expression::Happy), MoodTransition::Saturated(180));
        assert_eq!(m.value(), 180);
    }

    #[rstest]
    #[case(180, 175)]
    #[case(50, 45)]
    #[case(3, 0)]
    #[case(0, 0)]
    fn test_neutral_lowers_by_half_step(#[case] start: i32, #[case] expected: i32) {
        let mut m = mood(start);
        m.apply(&Expression::Neutral);
        assert_eq!(m.value(), expected);
    }

    #[test]
    fn test_neutral_is_idempotent_at_min() {
        let mut m = mood(0);
        assert_eq!(m.apply(&Expression::Neutral), MoodTransition::Saturated(0));
        assert_eq!(m.value(), 0);
    }

    #[test]
    fn test_neutral_uses_integer_half_step() {
        let mut m = Mood::new(MoodRange::new(0, 180).unwrap(), 7, 100).unwrap();
        m.apply(&Expression::Neutral);
        assert_eq!(m.value(), 97);
    }

    #[rstest]
    #[case(Expression::Sad, 0)]
    #[case(Expression::Sad, 77)]
    #[case(Expression::Sad, 180)]
    #[case(Expression::Angry, 0)]
    #[case(Expression::Angry, 123)]
    #[case(Expression::Angry, 180)]
    fn test_sad_and_angry_reset_to_min(#[case] expr: Expression, #[case] start: i32) {
        let mut m = mood(start);
        m.apply(&expr);
        assert_eq!(m.value(), 0);
    }

    #[test]
    fn test_reset_respects_non_zero_min() {
        let mut m = Mood::new(MoodRange::new(20, 60).unwrap(), 10, 50).unwrap();
        assert_eq!(m.apply(&Expression::Angry), MoodTransition::Reset { from: 50 });
        assert_eq!(m.value(), 20);
    }

    #[test]
    fn test_unrecognized_label_is_ignored() {
        let mut m = mood(42);
        let transition = m.apply(&Expression::Other("surprised".into()));
        assert_eq!(transition, MoodTransition::Ignored(42));
        assert_eq!(m.value(), 42);
    }

    #[test]
    fn test_transition_reports_direction() {
        let mut m = mood(100);
        assert_eq!(
            m.apply(&Expression::Happy),
            MoodTransition::Raised { from: 100, to: 110 }
        );
        assert_eq!(
            m.apply(&Expression::Neutral),
            MoodTransition::Lowered { from: 110, to: 105 }
        );
        assert_eq!(m.apply(&Expression::Sad), MoodTransition::Reset { from: 105 });
    }

    #[test]
    fn test_scenario_from_max_through_sad_neutral_and_unknown() {
        let mut m = mood(180);

        m.apply(&Expression::Happy);
        assert_eq!(m.value(), 180);

        m.apply(&Expression::Sad);
        assert_eq!(m.value(), 0);

        m.apply(&Expression::Neutral);
        assert_eq!(m.value(), 0);

        m.apply(&Expression::from_label("surprised"));
        assert_eq!(m.value(), 0);
    }

    #[test]
    fn test_reset_clamps_to_range() {
        let mut m = mood(90);
        m.reset(1000);
        assert_eq!(m.value(), 180);
        m.reset(-5);
        assert_eq!(m.value(), 0);
    }
}
