//! Model formula parsing.

use crate::error::{ReportError, Result};
use serde::{Deserialize, Serialize};

/// A term on the right-hand side of a formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Term {
    /// Main effect of a variable.
    Main(String),
    /// Interaction between two or more variables.
    Interaction(Vec<String>),
}

impl Term {
    /// Get the variable names involved in this term.
    pub fn variables(&self) -> Vec<&str> {
        match self {
            Term::Main(v) => vec![v.as_str()],
            Term::Interaction(vs) => vs.iter().map(String::as_str).collect(),
        }
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Main(v) => write!(f, "{}", v),
            Term::Interaction(vs) => write!(f, "{}", vs.join(":")),
        }
    }
}

/// A parsed regression formula.
///
/// Supports R-style formula syntax:
/// - `y ~ x` - response y, intercept + x
/// - `y ~ x + g` - intercept + x + g
/// - `y ~ x * g` - intercept + x + g + x:g
/// - `y ~ 0 + g` - no intercept, g
/// - `y ~ x:g` - intercept + interaction only
/// - `y ~ x + (1 | subject)` - group-level terms are recorded separately
///
/// The response is optional so that one-sided formulas (`~ x`) still parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Formula {
    /// Response (outcome) variable, if given.
    pub response: Option<String>,
    /// Whether to include an intercept.
    pub intercept: bool,
    /// Terms in the formula (excluding intercept).
    pub terms: Vec<Term>,
    /// Group-level terms such as `(1 | subject)`, kept verbatim.
    #[serde(default)]
    pub group_terms: Vec<String>,
    /// Original formula string.
    pub formula_str: String,
}

/// Split on `+` outside parentheses.
fn split_top_level(rhs: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in rhs.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '+' if depth == 0 => {
                parts.push(rhs[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(rhs[start..].trim());
    parts
}

fn split_interaction(term_str: &str, sep: char) -> Result<Vec<String>> {
    let parts: Vec<String> = term_str.split(sep).map(|s| s.trim().to_string()).collect();
    if parts.len() < 2 || parts.iter().any(|p| p.is_empty()) {
        return Err(ReportError::FormulaParse(format!(
            "Invalid interaction term: {}",
            term_str
        )));
    }
    Ok(parts)
}

impl Formula {
    /// Parse a formula string.
    ///
    /// # Examples
    /// ```
    /// use bayes_report::data::Formula;
    /// let f = Formula::parse("y ~ group + age").unwrap();
    /// assert_eq!(f.response.as_deref(), Some("y"));
    /// assert_eq!(f.terms.len(), 2);
    /// ```
    pub fn parse(formula: &str) -> Result<Self> {
        let formula_str = formula.to_string();
        let formula = formula.trim();

        let (lhs, rhs) = formula.split_once('~').ok_or_else(|| {
            ReportError::FormulaParse("Formula must contain '~'".to_string())
        })?;

        let lhs = lhs.trim();
        let response = if lhs.is_empty() {
            None
        } else if lhs.contains(['+', '*', ':', '~']) {
            return Err(ReportError::FormulaParse(format!(
                "Invalid response: {}",
                lhs
            )));
        } else {
            Some(lhs.to_string())
        };

        let rhs = rhs.trim();
        if rhs.is_empty() {
            return Err(ReportError::FormulaParse(
                "Formula right-hand side is empty".to_string(),
            ));
        }

        // Check for explicit no-intercept
        let (intercept, rhs) = if rhs == "0" || rhs == "-1" {
            return Err(ReportError::FormulaParse(
                "Formula must have at least one term".to_string(),
            ));
        } else if rhs.starts_with("0 +") || rhs.starts_with("0+") {
            (false, rhs.trim_start_matches('0').trim_start().trim_start_matches('+').trim())
        } else if rhs.starts_with("-1 +") || rhs.starts_with("-1+") {
            (false, rhs.trim_start_matches("-1").trim_start().trim_start_matches('+').trim())
        } else {
            (true, rhs)
        };

        let mut terms = Vec::new();
        let mut group_terms = Vec::new();
        for term_str in split_top_level(rhs) {
            if term_str.is_empty() || term_str == "1" {
                continue;
            }

            if term_str.starts_with('(') && term_str.contains('|') {
                group_terms.push(term_str.to_string());
                continue;
            }

            if term_str.contains('*') {
                let vars = split_interaction(term_str, '*')?;
                for v in &vars {
                    let main = Term::Main(v.clone());
                    if !terms.contains(&main) {
                        terms.push(main);
                    }
                }
                // all pairwise and higher-order interactions
                for size in 2..=vars.len() {
                    for combo in combinations(&vars, size) {
                        let term = Term::Interaction(combo);
                        if !terms.contains(&term) {
                            terms.push(term);
                        }
                    }
                }
            } else if term_str.contains(':') {
                let term = Term::Interaction(split_interaction(term_str, ':')?);
                if !terms.contains(&term) {
                    terms.push(term);
                }
            } else {
                let term = Term::Main(term_str.to_string());
                if !terms.contains(&term) {
                    terms.push(term);
                }
            }
        }

        if terms.is_empty() && !intercept {
            return Err(ReportError::FormulaParse(
                "Formula must have at least one term".to_string(),
            ));
        }

        Ok(Self {
            response,
            intercept,
            terms,
            group_terms,
            formula_str,
        })
    }

    /// Get all predictor variable names used in the formula.
    pub fn variables(&self) -> Vec<&str> {
        let mut vars: Vec<&str> = self.terms.iter().flat_map(|t| t.variables()).collect();
        vars.sort();
        vars.dedup();
        vars
    }

    /// Check if a variable is used on the right-hand side.
    pub fn uses_variable(&self, name: &str) -> bool {
        self.terms.iter().any(|t| t.variables().contains(&name))
    }

    /// Get the response, failing if the formula is one-sided.
    pub fn require_response(&self) -> Result<&str> {
        self.response.as_deref().ok_or_else(|| {
            ReportError::FormulaParse(format!(
                "Formula '{}' has no response variable",
                self.formula_str.trim()
            ))
        })
    }
}

/// Subsets of `items` with exactly `size` elements, in input order.
fn combinations(items: &[String], size: usize) -> Vec<Vec<String>> {
    if size == 0 {
        return vec![Vec::new()];
    }
    if items.len() < size {
        return Vec::new();
    }
    let mut out = Vec::new();
    for (i, head) in items.iter().enumerate() {
        for mut rest in combinations(&items[i + 1..], size - 1) {
            rest.insert(0, head.clone());
            out.push(rest);
        }
    }
    out
}

impl std::fmt::Display for Formula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref response) = self.response {
            write!(f, "{} ", response)?;
        }
        write!(f, "~ ")?;
        if !self.intercept {
            write!(f, "0 + ")?;
        }
        let mut term_strs: Vec<String> = self.terms.iter().map(|t| t.to_string()).collect();
        term_strs.extend(self.group_terms.iter().cloned());
        if term_strs.is_empty() {
            return write!(f, "1");
        }
        write!(f, "{}", term_strs.join(" + "))
    }
}
