// SPDX-License-Identifier: MIT OR Apache-2.0
//! Portable type taxonomy for native attributes.
//!
//! Classification order matters because several native shapes satisfy more
//! than one test: compound-ness is checked first (a compound may hold array
//! children), then array-ness, then the per-kind tests.

use rigplug_scene::{Attribute, AttributeKind, DataKind, NumericKind, Plug, SceneHost, UnitKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Portable value category of an attribute
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeTag {
    /// Boolean
    Bool,
    /// Integer of any width
    Int,
    /// Single precision float
    Float,
    /// Double precision float
    Double,
    /// 2-component numeric vector
    Vector2,
    /// 3-component numeric vector
    Vector3,
    /// 4-component numeric vector
    Vector4,
    /// Enumeration, read as its raw index
    Enum,
    /// String
    String,
    /// Angle with unit
    Angle,
    /// Distance with unit
    Distance,
    /// Time with unit
    Time,
    /// 4x4 matrix
    Matrix,
    /// Message link
    Message,
    /// Compound record
    Compound,
    /// Array of elements of one tag
    Array(Box<TypeTag>),
    /// No portable representation
    Unsupported,
}

impl TypeTag {
    /// Number of scalar components, for fixed-width tags
    pub fn arity(&self) -> Option<usize> {
        match self {
            Self::Bool
            | Self::Int
            | Self::Float
            | Self::Double
            | Self::Enum
            | Self::Angle
            | Self::Distance
            | Self::Time => Some(1),
            Self::Vector2 => Some(2),
            Self::Vector3 => Some(3),
            Self::Vector4 => Some(4),
            Self::Matrix => Some(16),
            _ => None,
        }
    }

    /// Unit kind of a unit-typed tag
    pub fn unit_kind(&self) -> Option<UnitKind> {
        match self {
            Self::Angle => Some(UnitKind::Angle),
            Self::Distance => Some(UnitKind::Distance),
            Self::Time => Some(UnitKind::Time),
            _ => None,
        }
    }

    /// Whether values carry a unit alongside their magnitude
    pub fn is_unit(&self) -> bool {
        self.unit_kind().is_some()
    }

    /// Whether values may be described by named fields
    pub fn is_enum_capable(&self) -> bool {
        matches!(self, Self::Enum)
    }

    /// Whether this is a fixed-width numeric vector
    pub fn is_vector(&self) -> bool {
        matches!(self, Self::Vector2 | Self::Vector3 | Self::Vector4)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Array(element) => write!(f, "Array<{element}>"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Classify an attribute. Never fails: unknown natives are `Unsupported`.
pub fn classify(attribute: &Attribute) -> TypeTag {
    if attribute.kind == AttributeKind::Compound {
        return TypeTag::Compound;
    }
    if attribute.array {
        return match classify_element(attribute) {
            TypeTag::Unsupported => TypeTag::Unsupported,
            element => TypeTag::Array(Box::new(element)),
        };
    }
    classify_element(attribute)
}

/// Classify one element of an attribute, ignoring array-ness
pub fn classify_element(attribute: &Attribute) -> TypeTag {
    match &attribute.kind {
        AttributeKind::Compound => TypeTag::Compound,
        AttributeKind::Unit(UnitKind::Angle) => TypeTag::Angle,
        AttributeKind::Unit(UnitKind::Distance) => TypeTag::Distance,
        AttributeKind::Unit(UnitKind::Time) => TypeTag::Time,
        AttributeKind::Numeric(kind) => numeric_tag(*kind),
        AttributeKind::Enum(_) => TypeTag::Enum,
        AttributeKind::Typed(data) => typed_tag(*data),
        AttributeKind::Matrix => TypeTag::Matrix,
        AttributeKind::Message => TypeTag::Message,
        AttributeKind::Generic(_) => TypeTag::Unsupported,
    }
}

/// Classify the slot a plug addresses: array plugs, elements and children
pub fn classify_plug<H: SceneHost + ?Sized>(host: &H, plug: &Plug) -> TypeTag {
    match host.attribute(plug) {
        Ok(attribute) if attribute.array && plug.logical_index().is_some() => {
            classify_element(attribute)
        }
        Ok(attribute) => classify(attribute),
        Err(_) => TypeTag::Unsupported,
    }
}

fn numeric_tag(kind: NumericKind) -> TypeTag {
    match kind {
        NumericKind::Boolean => TypeTag::Bool,
        NumericKind::Byte | NumericKind::Short | NumericKind::Int | NumericKind::Long => {
            TypeTag::Int
        }
        NumericKind::Float => TypeTag::Float,
        NumericKind::Double => TypeTag::Double,
        NumericKind::Short2 | NumericKind::Int2 | NumericKind::Float2 | NumericKind::Double2 => {
            TypeTag::Vector2
        }
        NumericKind::Short3 | NumericKind::Int3 | NumericKind::Float3 | NumericKind::Double3 => {
            TypeTag::Vector3
        }
        NumericKind::Double4 => TypeTag::Vector4,
    }
}

fn typed_tag(data: DataKind) -> TypeTag {
    match data {
        DataKind::String => TypeTag::String,
        DataKind::Matrix => TypeTag::Matrix,
        DataKind::IntArray => TypeTag::Array(Box::new(TypeTag::Int)),
        DataKind::DoubleArray => TypeTag::Array(Box::new(TypeTag::Double)),
        DataKind::StringArray => TypeTag::Array(Box::new(TypeTag::String)),
        DataKind::VectorArray => TypeTag::Array(Box::new(TypeTag::Vector3)),
        DataKind::Mesh | DataKind::NurbsCurve => TypeTag::Unsupported,
    }
}

/// Named fields of an enum attribute as ordered `(index, name)` pairs.
///
/// Indices in the declared range without a name are skipped. Non-enum
/// attributes have no fields.
pub fn enum_names(attribute: &Attribute) -> Vec<(i32, String)> {
    let AttributeKind::Enum(spec) = &attribute.kind else {
        return Vec::new();
    };
    (spec.min()..=spec.max())
        .filter_map(|index| spec.field_name(index).map(|name| (index, name.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigplug_scene::EnumSpec;

    #[test]
    fn test_compound_before_array() {
        let compound = Attribute::compound(
            "targets",
            vec![Attribute::numeric("weight", NumericKind::Float).array()],
        )
        .array();
        assert_eq!(classify(&compound), TypeTag::Compound);
    }

    #[test]
    fn test_array_of_numeric() {
        let weights = Attribute::numeric("weights", NumericKind::Float).array();
        assert_eq!(classify(&weights), TypeTag::Array(Box::new(TypeTag::Float)));
        assert_eq!(classify_element(&weights), TypeTag::Float);
    }

    #[test]
    fn test_numeric_widths() {
        assert_eq!(classify(&Attribute::numeric("b", NumericKind::Boolean)), TypeTag::Bool);
        assert_eq!(classify(&Attribute::numeric("s", NumericKind::Short)), TypeTag::Int);
        assert_eq!(classify(&Attribute::numeric("l", NumericKind::Long)), TypeTag::Int);
        assert_eq!(classify(&Attribute::numeric("f", NumericKind::Float)), TypeTag::Float);
        assert_eq!(classify(&Attribute::numeric("v", NumericKind::Float2)), TypeTag::Vector2);
        assert_eq!(classify(&Attribute::numeric("v", NumericKind::Int3)), TypeTag::Vector3);
        assert_eq!(classify(&Attribute::numeric("v", NumericKind::Double4)), TypeTag::Vector4);
    }

    #[test]
    fn test_units_and_data() {
        assert_eq!(classify(&Attribute::unit("r", UnitKind::Angle)), TypeTag::Angle);
        assert_eq!(classify(&Attribute::unit("t", UnitKind::Time)), TypeTag::Time);
        assert_eq!(classify(&Attribute::typed("n", DataKind::String)), TypeTag::String);
        assert_eq!(classify(&Attribute::typed("m", DataKind::Matrix)), TypeTag::Matrix);
        assert_eq!(classify(&Attribute::matrix("wm")), TypeTag::Matrix);
        assert_eq!(
            classify(&Attribute::typed("ids", DataKind::IntArray)),
            TypeTag::Array(Box::new(TypeTag::Int))
        );
        assert_eq!(classify(&Attribute::message("message")), TypeTag::Message);
    }

    #[test]
    fn test_unsupported_fallback() {
        assert_eq!(classify(&Attribute::typed("inMesh", DataKind::Mesh)), TypeTag::Unsupported);
        assert_eq!(classify(&Attribute::generic("x", "lattice")), TypeTag::Unsupported);
        assert_eq!(
            classify(&Attribute::generic("x", "lattice").array()),
            TypeTag::Unsupported
        );
    }

    #[test]
    fn test_enum_names_skip_holes() {
        let spec = EnumSpec::new([(0, "none"), (1, "linear"), (4, "smooth"), (6, "step"), (7, "spline")])
            .with_max(10);
        let names = enum_names(&Attribute::enumeration("interp", spec));
        assert_eq!(
            names,
            vec![
                (0, "none".to_string()),
                (1, "linear".to_string()),
                (4, "smooth".to_string()),
                (6, "step".to_string()),
                (7, "spline".to_string()),
            ]
        );
        assert!(enum_names(&Attribute::numeric("d", NumericKind::Double)).is_empty());
    }

    #[test]
    fn test_tag_metadata() {
        assert_eq!(TypeTag::Vector3.arity(), Some(3));
        assert_eq!(TypeTag::Matrix.arity(), Some(16));
        assert_eq!(TypeTag::Compound.arity(), None);
        assert!(TypeTag::Angle.is_unit());
        assert!(!TypeTag::Double.is_unit());
        assert!(TypeTag::Enum.is_enum_capable());
        assert_eq!(TypeTag::Array(Box::new(TypeTag::Int)).to_string(), "Array<Int>");
    }
}
