//! Password strength scoring for the registration form.

use serde::Serialize;

/// Minimum length counted towards the length criterion.
pub const STRONG_PASSWORD_MIN_CHARS: usize = 8;

const CRITERIA_COUNT: u8 = 4;

/// Coarse strength classification shown next to the password field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrengthLevel {
    Weak,
    Medium,
    Strong,
}

impl StrengthLevel {
    /// Label rendered under the strength bar.
    pub fn label(self) -> &'static str {
        match self {
            Self::Weak => "Débil",
            Self::Medium => "Media",
            Self::Strong => "Fuerte",
        }
    }
}

/// Result of evaluating a password against the four criteria.
///
/// # Examples
/// ```
/// use idozer::domain::{PasswordStrength, StrengthLevel};
///
/// let strength = PasswordStrength::evaluate("Aa1!aaaa");
/// assert_eq!(strength.level(), StrengthLevel::Strong);
/// assert!((strength.score() - 1.0).abs() < f32::EPSILON);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordStrength {
    long_enough: bool,
    has_uppercase: bool,
    has_digit: bool,
    has_symbol: bool,
}

impl PasswordStrength {
    /// Evaluate `password`. Length is measured in characters, not bytes.
    pub fn evaluate(password: &str) -> Self {
        Self {
            long_enough: password.chars().count() >= STRONG_PASSWORD_MIN_CHARS,
            has_uppercase: password.chars().any(char::is_uppercase),
            has_digit: password.chars().any(|c| c.is_ascii_digit()),
            has_symbol: password
                .chars()
                .any(|c| !c.is_alphanumeric() && !c.is_whitespace()),
        }
    }

    /// Number of criteria the password satisfies.
    pub fn criteria_met(&self) -> u8 {
        [
            self.long_enough,
            self.has_uppercase,
            self.has_digit,
            self.has_symbol,
        ]
        .into_iter()
        .map(u8::from)
        .sum()
    }

    /// Fraction of criteria met, in `0.0..=1.0`.
    pub fn score(&self) -> f32 {
        f32::from(self.criteria_met()) / f32::from(CRITERIA_COUNT)
    }

    /// Strength bucket derived from [`Self::score`].
    pub fn level(&self) -> StrengthLevel {
        match self.criteria_met() {
            0 | 1 => StrengthLevel::Weak,
            met if met < CRITERIA_COUNT => StrengthLevel::Medium,
            _ => StrengthLevel::Strong,
        }
    }

    pub fn is_long_enough(&self) -> bool {
        self.long_enough
    }

    pub fn has_uppercase(&self) -> bool {
        self.has_uppercase
    }

    pub fn has_digit(&self) -> bool {
        self.has_digit
    }

    pub fn has_symbol(&self) -> bool {
        self.has_symbol
    }
}
