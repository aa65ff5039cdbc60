//! ---
//! ssp_section: "02-structure-model"
//! ssp_subsection: "module"
//! ssp_type: "source"
//! ssp_scope: "code"
//! ssp_description: "Typed literal values and parameter sets."
//! ssp_version: "v0.1.0"
//! ssp_owner: "tbd"
//! ---
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::StructureError;

/// Typed literal carried by a parameter entry.
///
/// The untagged representation keeps scenario files natural: a bare
/// integer stays an integer, a decimal becomes a real. Variant order
/// matters for that reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Signed integer literal.
    Integer(i64),
    /// Real (floating point) literal.
    Real(f64),
    /// Boolean literal.
    Boolean(bool),
    /// String literal.
    String(String),
}

impl Value {
    /// Kind tag for this literal.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Real(_) => ValueKind::Real,
            Value::Integer(_) => ValueKind::Integer,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::String(_) => ValueKind::String,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Real(v) => write!(f, "{v}"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v}"),
        }
    }
}

/// Value kinds understood by the SSP parameter and connector vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Real-valued variable.
    Real,
    /// Integer-valued variable.
    Integer,
    /// Boolean-valued variable.
    Boolean,
    /// String-valued variable.
    String,
}

impl ValueKind {
    /// All kinds in canonical order.
    pub const fn all() -> &'static [ValueKind] {
        &[
            ValueKind::Real,
            ValueKind::Integer,
            ValueKind::Boolean,
            ValueKind::String,
        ]
    }

    /// Canonical element spelling used by the SSP schemas.
    pub fn canonical_name(self) -> &'static str {
        match self {
            ValueKind::Real => "Real",
            ValueKind::Integer => "Integer",
            ValueKind::Boolean => "Boolean",
            ValueKind::String => "String",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

impl FromStr for ValueKind {
    type Err = StructureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Real" | "real" => Ok(ValueKind::Real),
            "Integer" | "integer" => Ok(ValueKind::Integer),
            "Boolean" | "boolean" => Ok(ValueKind::Boolean),
            "String" | "string" => Ok(ValueKind::String),
            other => Err(StructureError::UnknownValueKind {
                value: other.to_owned(),
            }),
        }
    }
}

/// Named parameter entry with a typed literal and an optional unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Variable name inside the referenced model.
    pub name: String,
    /// Literal applied before simulation start.
    pub value: Value,
    /// Optional unit annotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Parameter {
    /// Construct a real-valued parameter.
    pub fn real(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value: Value::Real(value),
            unit: None,
        }
    }

    /// Construct an integer-valued parameter.
    pub fn integer(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value: Value::Integer(value),
            unit: None,
        }
    }

    /// Construct a boolean-valued parameter.
    pub fn boolean(name: impl Into<String>, value: bool) -> Self {
        Self {
            name: name.into(),
            value: Value::Boolean(value),
            unit: None,
        }
    }

    /// Construct a string-valued parameter.
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Value::String(value.into()),
            unit: None,
        }
    }

    /// Attach a unit annotation.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

/// Named collection of parameter entries applied together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    /// Set name, e.g. `initialValues`.
    pub name: String,
    /// Entries in declaration order.
    pub parameters: Vec<Parameter>,
}

impl ParameterSet {
    /// Construct an empty set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_kind_tags_match_variants() {
        assert_eq!(Value::Real(0.001).kind(), ValueKind::Real);
        assert_eq!(Value::Integer(40).kind(), ValueKind::Integer);
        assert_eq!(Value::Boolean(true).kind(), ValueKind::Boolean);
        assert_eq!(Value::String("x".into()).kind(), ValueKind::String);
    }

    #[test]
    fn untagged_value_keeps_integers_integer() {
        let v: Value = serde_json::from_str("400").unwrap();
        assert_eq!(v, Value::Integer(400));
        let v: Value = serde_json::from_str("400.0").unwrap();
        assert_eq!(v, Value::Real(400.0));
        let v: Value = serde_json::from_str("true").unwrap();
        assert_eq!(v, Value::Boolean(true));
    }

    #[test]
    fn value_kind_parses_both_spellings() {
        assert_eq!("Real".parse::<ValueKind>().unwrap(), ValueKind::Real);
        assert_eq!("real".parse::<ValueKind>().unwrap(), ValueKind::Real);
        assert!("Complex".parse::<ValueKind>().is_err());
    }

    #[test]
    fn parameter_constructors_set_kind_and_unit() {
        let p = Parameter::real("C.mChassis", 400.0).with_unit("kg");
        assert_eq!(p.value.kind(), ValueKind::Real);
        assert_eq!(p.unit.as_deref(), Some("kg"));
    }
}
