use std::fmt;

/// Expression label reported by the engine, as far as mood cares about it.
///
/// Labels are matched case-insensitively; anything outside the four known
/// labels is kept verbatim in `Other` so it can be logged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expression {
    Happy,
    Neutral,
    Sad,
    Angry,
    Other(String),
}

impl Expression {
    pub fn from_label(label: &str) -> Self {
        let trimmed = label.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "happy" => Expression::Happy,
            "neutral" => Expression::Neutral,
            "sad" => Expression::Sad,
            "angry" => Expression::Angry,
            _ => Expression::Other(trimmed.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Expression::Happy => "happy",
            Expression::Neutral => "neutral",
            Expression::Sad => "sad",
            Expression::Angry => "angry",
            Expression::Other(label) => label,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Expression::Other(_))
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("happy", Expression::Happy)]
    #[case("Neutral", Expression::Neutral)]
    #[case(" SAD ", Expression::Sad)]
    #[case("angry", Expression::Angry)]
    fn test_known_labels(#[case] label: &str, #[case] expected: Expression) {
        assert_eq!(Expression::from_label(label), expected);
        assert!(expected.is_recognized());
    }

    #[rstest]
    #[case("surprised")]
    #[case("fearful")]
    #[case("disgusted")]
    #[case("")]
    fn test_unknown_labels_are_kept(#[case] label: &str) {
        let expr = Expression::from_label(label);
        assert_eq!(expr, Expression::Other(label.to_string()));
        assert!(!expr.is_recognized());
    }

    #[test]
    fn test_display_uses_canonical_label() {
        assert_eq!(Expression::from_label("HAPPY").to_string(), "happy");
        assert_eq!(Expression::from_label("Surprised").to_string(), "Surprised");
    }
}
