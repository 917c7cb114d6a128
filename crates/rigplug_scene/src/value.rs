// SPDX-License-Identifier: MIT OR Apache-2.0
//! Values stored in and read from plugs.

use crate::node::NodeId;
use crate::plug::Plug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical quantity carried by a unit-typed attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    /// Rotation
    Angle,
    /// Linear distance
    Distance,
    /// Time
    Time,
}

impl UnitKind {
    /// Unit that values of this kind are normalized to for comparison
    pub fn base_unit(&self) -> Unit {
        match self {
            Self::Angle => Unit::Radians,
            Self::Distance => Unit::Centimeters,
            Self::Time => Unit::Seconds,
        }
    }
}

/// Concrete unit of a unit-typed value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    /// Radians
    Radians,
    /// Degrees
    Degrees,
    /// Millimeters
    Millimeters,
    /// Centimeters
    Centimeters,
    /// Meters
    Meters,
    /// Inches
    Inches,
    /// Feet
    Feet,
    /// Seconds
    Seconds,
    /// Milliseconds
    Milliseconds,
    /// 24 frames per second
    Film,
    /// 25 frames per second
    Pal,
    /// 30 frames per second
    Ntsc,
}

impl Unit {
    /// Quantity this unit measures
    pub fn kind(&self) -> UnitKind {
        match self {
            Self::Radians | Self::Degrees => UnitKind::Angle,
            Self::Millimeters | Self::Centimeters | Self::Meters | Self::Inches | Self::Feet => {
                UnitKind::Distance
            }
            Self::Seconds | Self::Milliseconds | Self::Film | Self::Pal | Self::Ntsc => {
                UnitKind::Time
            }
        }
    }
}

/// A magnitude together with the unit it was authored in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitValue {
    /// Raw magnitude
    pub magnitude: f64,
    /// Unit of `magnitude`
    pub unit: Unit,
}

impl UnitValue {
    /// Create a new unit value
    pub fn new(magnitude: f64, unit: Unit) -> Self {
        Self { magnitude, unit }
    }

    /// Quantity this value measures
    pub fn kind(&self) -> UnitKind {
        self.unit.kind()
    }
}

/// A value read from or written to a plug.
///
/// Scalars keep the declared width of their attribute. Vectors and matrices are
/// stored as `f64` components, which is lossless for every numeric width the
/// host supports. `List` carries array elements, compound children and typed
/// array data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Boolean
    Bool(bool),
    /// Unsigned byte
    Byte(u8),
    /// 16-bit integer
    Short(i16),
    /// 32-bit integer
    Int(i32),
    /// 64-bit integer
    Long(i64),
    /// Single precision float
    Float(f32),
    /// Double precision float
    Double(f64),
    /// 2D vector
    Vector2([f64; 2]),
    /// 3D vector
    Vector3([f64; 3]),
    /// 4D vector
    Vector4([f64; 4]),
    /// Raw enum index
    Enum(i32),
    /// String
    String(String),
    /// Unit-typed magnitude
    Unit(UnitValue),
    /// 4x4 matrix, row-major
    Matrix([f64; 16]),
    /// Source node of a message connection, if any
    Message(Option<NodeId>),
    /// Plug handle, used to wire message attributes
    Plug(Plug),
    /// Elements of an array, children of a compound, or typed array data
    List(Vec<Value>),
}

impl Value {
    /// Identity matrix
    pub const IDENTITY: [f64; 16] = [
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ];

    /// Short name of the variant, for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Byte(_) => "byte",
            Self::Short(_) => "short",
            Self::Int(_) => "int",
            Self::Long(_) => "long",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::Vector2(_) => "vector2",
            Self::Vector3(_) => "vector3",
            Self::Vector4(_) => "vector4",
            Self::Enum(_) => "enum",
            Self::String(_) => "string",
            Self::Unit(_) => "unit",
            Self::Matrix(_) => "matrix",
            Self::Message(_) => "message",
            Self::Plug(_) => "plug",
            Self::List(_) => "list",
        }
    }

    /// Numeric scalar as `f64`, if this is one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            Self::Byte(v) => Some(f64::from(*v)),
            Self::Short(v) => Some(f64::from(*v)),
            Self::Int(v) | Self::Enum(v) => Some(f64::from(*v)),
            Self::Long(v) => Some(*v as f64),
            Self::Float(v) => Some(f64::from(*v)),
            Self::Double(v) => Some(*v),
            Self::Unit(v) => Some(v.magnitude),
            _ => None,
        }
    }

    /// Integral scalar as `i64`, if this is one
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Bool(v) => Some(i64::from(*v)),
            Self::Byte(v) => Some(i64::from(*v)),
            Self::Short(v) => Some(i64::from(*v)),
            Self::Int(v) | Self::Enum(v) => Some(i64::from(*v)),
            Self::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Floating components of a vector or matrix value
    pub fn components(&self) -> Option<&[f64]> {
        match self {
            Self::Vector2(v) => Some(v.as_slice()),
            Self::Vector3(v) => Some(v.as_slice()),
            Self::Vector4(v) => Some(v.as_slice()),
            Self::Matrix(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Compare two values, allowing `epsilon` drift on floating components.
    ///
    /// Integers, enums, strings and message targets compare exactly. Unit values
    /// must share their unit.
    pub fn approx_eq(&self, other: &Value, epsilon: f64) -> bool {
        let close = |a: f64, b: f64| (a - b).abs() <= epsilon;
        match (self, other) {
            (Self::Float(a), Self::Float(b)) => close(f64::from(*a), f64::from(*b)),
            (Self::Double(a), Self::Double(b)) => close(*a, *b),
            (Self::Unit(a), Self::Unit(b)) => a.unit == b.unit && close(a.magnitude, b.magnitude),
            (Self::List(a), Self::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.approx_eq(y, epsilon))
            }
            _ => match (self.components(), other.components()) {
                (Some(a), Some(b)) if self.kind_name() == other.kind_name() => {
                    a.iter().zip(b).all(|(x, y)| close(*x, *y))
                }
                _ => self == other,
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Byte(v) => write!(f, "{v}"),
            Self::Short(v) => write!(f, "{v}"),
            Self::Int(v) | Self::Enum(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v:?}"),
            Self::Unit(v) => write!(f, "{}{:?}", v.magnitude, v.unit),
            Self::Message(Some(node)) => write!(f, "<{node}>"),
            Self::Message(None) => write!(f, "<none>"),
            Self::Plug(plug) => write!(f, "{plug}"),
            Self::List(items) => write!(f, "[{} items]", items.len()),
            Self::Vector2(_) | Self::Vector3(_) | Self::Vector4(_) | Self::Matrix(_) => {
                write!(f, "{:?}", self.components().unwrap_or_default())
            }
        }
    }
}
