//! Placeholder substitution for scenario and job-script templates.
//!
//! Templates carry `@name@` tokens. Rendering is a single pass over a
//! declared token -> value mapping and is strict in both directions: a
//! declared token that never occurs in the template is an error (a silent
//! substitution no-op would ship a scenario missing a parameter), and an
//! occurring token with no declared value is an error (an unresolved token
//! must never reach the simulator's input).

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

pub type TemplateResult<T> = Result<T, TemplateError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("placeholder @{name}@ does not occur in the template")]
    MissingPlaceholder { name: String },

    #[error("unresolved placeholder @{name}@")]
    UnresolvedPlaceholder { name: String },
}

/// Declared token -> value mapping for one render.
#[derive(Debug, Clone, Default)]
pub struct Substitutions {
    values: BTreeMap<String, String>,
}

impl Substitutions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl ToString) -> &mut Self {
        self.values.insert(name.into(), value.to_string());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn is_token_name(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Substitute every `@name@` token in `template` from `subs`.
///
/// An `@` that does not open an identifier-shaped token passes through as a
/// literal character.
pub fn render(template: &str, subs: &Substitutions) -> TemplateResult<String> {
    let mut out = String::with_capacity(template.len());
    let mut used: BTreeSet<&str> = BTreeSet::new();
    let mut i = 0;

    while let Some(offset) = template[i..].find('@') {
        let start = i + offset;
        out.push_str(&template[i..start]);

        let rest = &template[start + 1..];
        match rest.find('@') {
            Some(end) if is_token_name(&rest[..end]) => {
                let name = &rest[..end];
                let value = subs.get(name).ok_or_else(|| {
                    TemplateError::UnresolvedPlaceholder {
                        name: name.to_string(),
                    }
                })?;
                out.push_str(value);
                used.insert(name);
                i = start + end + 2;
            }
            _ => {
                out.push('@');
                i = start + 1;
            }
        }
    }
    out.push_str(&template[i..]);

    for name in subs.names() {
        if !used.contains(name) {
            return Err(TemplateError::MissingPlaceholder {
                name: name.to_string(),
            });
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subs(pairs: &[(&str, &str)]) -> Substitutions {
        let mut s = Substitutions::new();
        for (name, value) in pairs {
            s.set(*name, value);
        }
        s
    }

    #[test]
    fn substitutes_all_tokens() {
        let out = render(
            "<eir>@eir@</eir><seed>@seed@</seed>",
            &subs(&[("eir", "10"), ("seed", "3")]),
        )
        .unwrap();
        assert_eq!(out, "<eir>10</eir><seed>3</seed>");
    }

    #[test]
    fn repeated_token_is_substituted_everywhere() {
        let out = render("@v@ and @v@", &subs(&[("v", "44")])).unwrap();
        assert_eq!(out, "44 and 44");
    }

    #[test]
    fn unresolved_token_is_an_error() {
        let err = render("<x>@mystery@</x>", &Substitutions::new()).unwrap_err();
        assert_eq!(
            err,
            TemplateError::UnresolvedPlaceholder {
                name: "mystery".to_string()
            }
        );
    }

    #[test]
    fn declared_but_absent_token_is_an_error() {
        let err = render("<x>@eir@</x>", &subs(&[("eir", "1"), ("seed", "0")])).unwrap_err();
        assert_eq!(
            err,
            TemplateError::MissingPlaceholder {
                name: "seed".to_string()
            }
        );
    }

    #[test]
    fn literal_at_signs_pass_through() {
        let out = render("contact a@b.example then @eir@", &subs(&[("eir", "5")])).unwrap();
        assert_eq!(out, "contact a@b.example then 5");
    }

    #[test]
    fn numbered_tokens() {
        let mut s = Substitutions::new();
        for month in 1..=3 {
            s.set(format!("seasonality{month}"), month);
        }
        let out = render("@seasonality1@,@seasonality2@,@seasonality3@", &s).unwrap();
        assert_eq!(out, "1,2,3");
    }
}
