//! Rules of thumb for interpreting effect sizes and Bayes factors.

use crate::error::{ReportError, Result};
use serde::{Deserialize, Serialize};

/// Cohen (1988) magnitude classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EffectMagnitude {
    VerySmall,
    Small,
    Medium,
    Large,
}

impl EffectMagnitude {
    /// All classes, smallest first.
    pub const ALL: [EffectMagnitude; 4] = [
        EffectMagnitude::VerySmall,
        EffectMagnitude::Small,
        EffectMagnitude::Medium,
        EffectMagnitude::Large,
    ];

    /// Descriptive name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::VerySmall => "very small",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

impl std::fmt::Display for EffectMagnitude {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Interpret a standardized difference (Cohen's d) by its absolute value.
///
/// Cohen (1988): < 0.2 very small, < 0.5 small, < 0.8 medium, otherwise large.
pub fn interpret_d(d: f64) -> EffectMagnitude {
    let d = d.abs();
    if d < 0.2 {
        EffectMagnitude::VerySmall
    } else if d < 0.5 {
        EffectMagnitude::Small
    } else if d < 0.8 {
        EffectMagnitude::Medium
    } else {
        EffectMagnitude::Large
    }
}

/// Interpret a correlation coefficient by its absolute value (Cohen, 1988).
pub fn interpret_r(r: f64) -> &'static str {
    let r = r.abs();
    if r < 0.1 {
        "very small"
    } else if r < 0.3 {
        "small"
    } else if r < 0.5 {
        "moderate"
    } else {
        "large"
    }
}

/// Interpret an explained-variance (R2) value (Cohen, 1988).
pub fn interpret_r2(r2: f64) -> EffectMagnitude {
    if r2 < 0.02 {
        EffectMagnitude::VerySmall
    } else if r2 < 0.13 {
        EffectMagnitude::Small
    } else if r2 < 0.26 {
        EffectMagnitude::Medium
    } else {
        EffectMagnitude::Large
    }
}

/// Strength of evidence carried by a Bayes factor (Jeffreys, 1961).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BayesFactorEvidence {
    /// `no`, `anecdotal`, `moderate`, `strong`, `very strong` or `extreme`.
    pub strength: &'static str,
    /// Whether the evidence favours the tested hypothesis (BF > 1).
    pub in_favour: bool,
}

impl std::fmt::Display for BayesFactorEvidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.strength == "no" {
            return write!(f, "no evidence");
        }
        let direction = if self.in_favour { "in favour of" } else { "against" };
        write!(f, "{} evidence {}", self.strength, direction)
    }
}

/// Interpret a Bayes factor. Values below 1 are read as evidence against,
/// with the strength of their reciprocal.
pub fn interpret_bf(bf: f64) -> Result<BayesFactorEvidence> {
    if !(bf.is_finite() && bf > 0.0) {
        return Err(ReportError::InvalidParameter(format!(
            "Bayes factor must be positive and finite, got {}",
            bf
        )));
    }
    let in_favour = bf > 1.0;
    let magnitude = if in_favour { bf } else { 1.0 / bf };
    let strength = if magnitude == 1.0 {
        "no"
    } else if magnitude < 3.0 {
        "anecdotal"
    } else if magnitude < 10.0 {
        "moderate"
    } else if magnitude < 30.0 {
        "strong"
    } else if magnitude < 100.0 {
        "very strong"
    } else {
        "extreme"
    };
    Ok(BayesFactorEvidence {
        strength,
        in_favour,
    })
}
