//! Typed option schemas and the validation step every caller-supplied value
//! goes through before a converter sees it.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GlyphError, GlyphResult};

/// Raw option value as supplied by a caller (CLI, TOML, JSON).
///
/// Text values are coerced to the declared type during validation, so
/// `"80"` is an acceptable width.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "\"{v}\""),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

/// Caller-supplied values keyed by option name.
pub type OptionValues = BTreeMap<String, OptionValue>;

/// Declared type of an option, with its default and bounds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OptionKind {
    /// Whole number in `[min, max]`.
    Integer { default: i64, min: i64, max: i64 },
    /// Continuous value in `[min, max]`; `step` is a UI hint only.
    Range {
        default: f64,
        min: f64,
        max: f64,
        step: f64,
    },
    /// Boolean.
    Toggle { default: bool },
    /// One of a fixed list of identifiers.
    Choice {
        default: &'static str,
        choices: &'static [&'static str],
    },
}

/// One entry of a converter's option schema.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct OptionSpec {
    /// Identifier used by callers.
    pub name: &'static str,
    /// Display label.
    pub label: &'static str,
    #[serde(flatten)]
    pub kind: OptionKind,
}

impl OptionSpec {
    /// Default value as a resolved value.
    #[must_use]
    pub fn default_value(&self) -> Resolved {
        match self.kind {
            OptionKind::Integer { default, .. } => Resolved::Int(default),
            OptionKind::Range { default, .. } => Resolved::Float(default),
            OptionKind::Toggle { default } => Resolved::Bool(default),
            OptionKind::Choice { default, .. } => Resolved::Choice(default),
        }
    }

    /// Human readable type/range used in `InvalidOption` messages.
    #[must_use]
    pub fn expected(&self) -> String {
        match self.kind {
            OptionKind::Integer { min, max, .. } => format!("entier dans [{min}, {max}]"),
            OptionKind::Range { min, max, .. } => format!("nombre dans [{min}, {max}]"),
            OptionKind::Toggle { .. } => "booléen (true/false)".to_string(),
            OptionKind::Choice { choices, .. } => format!("un de : {}", choices.join(", ")),
        }
    }

    fn reject(&self) -> GlyphError {
        GlyphError::invalid_option(self.name, self.expected())
    }

    /// Check and coerce one raw value against this spec.
    ///
    /// # Errors
    /// `InvalidOption` for type or range violations, `UnsupportedMode` for a
    /// choice outside the declared list.
    pub fn validate(&self, value: &OptionValue) -> GlyphResult<Resolved> {
        match self.kind {
            OptionKind::Integer { min, max, .. } => {
                let v = match value {
                    OptionValue::Int(i) => Some(*i),
                    OptionValue::Float(f) => integral(*f),
                    OptionValue::Text(s) => {
                        let s = s.trim();
                        s.parse::<i64>()
                            .ok()
                            .or_else(|| s.parse::<f64>().ok().and_then(integral))
                    }
                    OptionValue::Bool(_) => None,
                }
                .ok_or_else(|| self.reject())?;
                if (min..=max).contains(&v) {
                    Ok(Resolved::Int(v))
                } else {
                    Err(self.reject())
                }
            }
            OptionKind::Range { min, max, .. } => {
                let v = match value {
                    OptionValue::Int(i) => Some(*i as f64),
                    OptionValue::Float(f) => Some(*f),
                    OptionValue::Text(s) => s.trim().parse::<f64>().ok(),
                    OptionValue::Bool(_) => None,
                }
                .filter(|v| v.is_finite())
                .ok_or_else(|| self.reject())?;
                if (min..=max).contains(&v) {
                    Ok(Resolved::Float(v))
                } else {
                    Err(self.reject())
                }
            }
            OptionKind::Toggle { .. } => match value {
                OptionValue::Bool(b) => Ok(Resolved::Bool(*b)),
                OptionValue::Int(0) => Ok(Resolved::Bool(false)),
                OptionValue::Int(1) => Ok(Resolved::Bool(true)),
                OptionValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" | "1" | "yes" | "on" => Ok(Resolved::Bool(true)),
                    "false" | "0" | "no" | "off" => Ok(Resolved::Bool(false)),
                    _ => Err(self.reject()),
                },
                OptionValue::Int(_) | OptionValue::Float(_) => Err(self.reject()),
            },
            OptionKind::Choice { choices, .. } => {
                let OptionValue::Text(s) = value else {
                    return Err(self.reject());
                };
                let wanted = s.trim().to_ascii_lowercase();
                choices
                    .iter()
                    .find(|c| **c == wanted)
                    .map(|c| Resolved::Choice(*c))
                    .ok_or_else(|| GlyphError::UnsupportedMode {
                        option: self.name.to_string(),
                        value: s.clone(),
                        supported: choices.join(", "),
                    })
            }
        }
    }
}

fn integral(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15).then_some(f as i64)
}

/// A validated option value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Resolved {
    Int(i64),
    Float(f64),
    Bool(bool),
    Choice(&'static str),
}

/// Every option of a schema, each either caller-supplied (validated) or
/// defaulted. Converters only ever read from this.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedOptions {
    values: Vec<(&'static str, Resolved)>,
}

impl ResolvedOptions {
    /// Validate `values` against `schema`.
    ///
    /// # Errors
    /// `InvalidOption` for unknown names, wrong types or out-of-range
    /// numbers; `UnsupportedMode` for unknown choices. Validation stops at
    /// the first failure.
    ///
    /// # Example
    /// ```
    /// use gc_core::options::{OptionKind, OptionSpec, OptionValues, ResolvedOptions};
    /// static SCHEMA: [OptionSpec; 1] = [OptionSpec {
    ///     name: "width",
    ///     label: "Width",
    ///     kind: OptionKind::Integer { default: 100, min: 1, max: 1000 },
    /// }];
    /// let mut values = OptionValues::new();
    /// values.insert("width".into(), (-5_i64).into());
    /// assert!(ResolvedOptions::resolve(&SCHEMA, &values).is_err());
    /// ```
    pub fn resolve(schema: &[OptionSpec], values: &OptionValues) -> GlyphResult<Self> {
        for name in values.keys() {
            if !schema.iter().any(|s| s.name == name) {
                let known: Vec<&str> = schema.iter().map(|s| s.name).collect();
                return Err(GlyphError::invalid_option(
                    name.clone(),
                    format!("une option déclarée ({})", known.join(", ")),
                ));
            }
        }
        let mut resolved = Vec::with_capacity(schema.len());
        for spec in schema {
            let value = match values.get(spec.name) {
                Some(raw) => spec.validate(raw)?,
                None => spec.default_value(),
            };
            resolved.push((spec.name, value));
        }
        Ok(Self { values: resolved })
    }

    /// Defaults of every option in `schema`.
    #[must_use]
    pub fn defaults(schema: &[OptionSpec]) -> Self {
        Self {
            values: schema.iter().map(|s| (s.name, s.default_value())).collect(),
        }
    }

    fn lookup(&self, name: &str) -> GlyphResult<Resolved> {
        self.values
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
            .ok_or_else(|| GlyphError::invalid_option(name, "une option déclarée"))
    }

    /// Integer option.
    ///
    /// # Errors
    /// `InvalidOption` if `name` is not an integer option of the schema.
    pub fn integer(&self, name: &str) -> GlyphResult<i64> {
        match self.lookup(name)? {
            Resolved::Int(v) => Ok(v),
            _ => Err(GlyphError::invalid_option(name, "entier")),
        }
    }

    /// Continuous option (integers widen).
    ///
    /// # Errors
    /// `InvalidOption` if `name` is not numeric.
    pub fn float(&self, name: &str) -> GlyphResult<f64> {
        match self.lookup(name)? {
            Resolved::Float(v) => Ok(v),
            Resolved::Int(v) => Ok(v as f64),
            _ => Err(GlyphError::invalid_option(name, "nombre")),
        }
    }

    /// Boolean option.
    ///
    /// # Errors
    /// `InvalidOption` if `name` is not a toggle.
    pub fn flag(&self, name: &str) -> GlyphResult<bool> {
        match self.lookup(name)? {
            Resolved::Bool(v) => Ok(v),
            _ => Err(GlyphError::invalid_option(name, "booléen")),
        }
    }

    /// Choice option, as the schema's own identifier.
    ///
    /// # Errors
    /// `InvalidOption` if `name` is not a choice.
    pub fn choice(&self, name: &str) -> GlyphResult<&'static str> {
        match self.lookup(name)? {
            Resolved::Choice(v) => Ok(v),
            _ => Err(GlyphError::invalid_option(name, "choix")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static SCHEMA: [OptionSpec; 4] = [
        OptionSpec {
            name: "width",
            label: "Width",
            kind: OptionKind::Integer {
                default: 100,
                min: 1,
                max: 1000,
            },
        },
        OptionSpec {
            name: "contrast",
            label: "Contrast",
            kind: OptionKind::Range {
                default: 1.0,
                min: 0.5,
                max: 2.0,
                step: 0.1,
            },
        },
        OptionSpec {
            name: "invert",
            label: "Invert",
            kind: OptionKind::Toggle { default: false },
        },
        OptionSpec {
            name: "mode",
            label: "Mode",
            kind: OptionKind::Choice {
                default: "a",
                choices: &["a", "b"],
            },
        },
    ];

    fn values(pairs: &[(&str, OptionValue)]) -> OptionValues {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn defaults_fill_missing_options() {
        let r = ResolvedOptions::resolve(&SCHEMA, &OptionValues::new()).unwrap();
        assert_eq!(r.integer("width").unwrap(), 100);
        assert!((r.float("contrast").unwrap() - 1.0).abs() < f64::EPSILON);
        assert!(!r.flag("invert").unwrap());
        assert_eq!(r.choice("mode").unwrap(), "a");
    }

    #[test]
    fn negative_width_is_rejected() {
        let err = ResolvedOptions::resolve(&SCHEMA, &values(&[("width", (-5_i64).into())]))
            .unwrap_err();
        assert!(matches!(err, GlyphError::InvalidOption { ref name, .. } if name == "width"));
    }

    #[test]
    fn text_values_are_coerced() {
        let r = ResolvedOptions::resolve(
            &SCHEMA,
            &values(&[
                ("width", "80".into()),
                ("contrast", "1.5".into()),
                ("invert", "yes".into()),
                ("mode", "B".into()),
            ]),
        )
        .unwrap();
        assert_eq!(r.integer("width").unwrap(), 80);
        assert!((r.float("contrast").unwrap() - 1.5).abs() < f64::EPSILON);
        assert!(r.flag("invert").unwrap());
        assert_eq!(r.choice("mode").unwrap(), "b");
    }

    #[test]
    fn fractional_integer_is_rejected() {
        assert!(ResolvedOptions::resolve(&SCHEMA, &values(&[("width", 10.5.into())])).is_err());
        assert!(ResolvedOptions::resolve(&SCHEMA, &values(&[("width", 10.0.into())])).is_ok());
    }

    #[test]
    fn out_of_range_float_is_rejected_not_clamped() {
        let err =
            ResolvedOptions::resolve(&SCHEMA, &values(&[("contrast", 3.0.into())])).unwrap_err();
        assert!(matches!(err, GlyphError::InvalidOption { .. }));
    }

    #[test]
    fn unknown_choice_is_unsupported_mode() {
        let err = ResolvedOptions::resolve(&SCHEMA, &values(&[("mode", "z".into())])).unwrap_err();
        assert!(matches!(err, GlyphError::UnsupportedMode { ref option, .. } if option == "mode"));
    }

    #[test]
    fn unknown_option_name_is_rejected() {
        let err = ResolvedOptions::resolve(&SCHEMA, &values(&[("colour", true.into())])).unwrap_err();
        assert!(matches!(err, GlyphError::InvalidOption { ref name, .. } if name == "colour"));
    }

    #[test]
    fn wrong_type_is_rejected() {
        assert!(ResolvedOptions::resolve(&SCHEMA, &values(&[("invert", 0.5.into())])).is_err());
        assert!(ResolvedOptions::resolve(&SCHEMA, &values(&[("mode", 1_i64.into())])).is_err());
    }

    #[test]
    fn untagged_values_deserialize_from_toml() {
        let v: OptionValues = toml::from_str("a = true\nb = 3\nc = 1.5\nd = \"x\"").unwrap();
        assert_eq!(v["a"], OptionValue::Bool(true));
        assert_eq!(v["b"], OptionValue::Int(3));
        assert_eq!(v["c"], OptionValue::Float(1.5));
        assert_eq!(v["d"], OptionValue::Text("x".into()));
    }
}
