// SPDX-License-Identifier: MIT OR Apache-2.0
//! Attribute schemas: the kind, bounds, default and flags of a named slot.

use crate::value::{UnitKind, UnitValue, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Native numeric storage of a numeric attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumericKind {
    /// Boolean
    Boolean,
    /// Unsigned byte
    Byte,
    /// 16-bit integer
    Short,
    /// 32-bit integer
    Int,
    /// 64-bit integer
    Long,
    /// Single precision float
    Float,
    /// Double precision float
    Double,
    /// Pair of shorts
    Short2,
    /// Pair of ints
    Int2,
    /// Pair of floats
    Float2,
    /// Pair of doubles
    Double2,
    /// Triple of shorts
    Short3,
    /// Triple of ints
    Int3,
    /// Triple of floats
    Float3,
    /// Triple of doubles
    Double3,
    /// Quadruple of doubles
    Double4,
}

impl NumericKind {
    /// Number of components (1 for scalars)
    pub fn arity(&self) -> usize {
        match self {
            Self::Short2 | Self::Int2 | Self::Float2 | Self::Double2 => 2,
            Self::Short3 | Self::Int3 | Self::Float3 | Self::Double3 => 3,
            Self::Double4 => 4,
            _ => 1,
        }
    }

    /// Scalar kind of each component
    pub fn component(&self) -> NumericKind {
        match self {
            Self::Short2 | Self::Short3 => Self::Short,
            Self::Int2 | Self::Int3 => Self::Int,
            Self::Float2 | Self::Float3 => Self::Float,
            Self::Double2 | Self::Double3 | Self::Double4 => Self::Double,
            scalar => *scalar,
        }
    }

    /// Zero value at this kind's exact width (scalars only)
    pub fn zero(&self) -> Option<Value> {
        Some(match self {
            Self::Boolean => Value::Bool(false),
            Self::Byte => Value::Byte(0),
            Self::Short => Value::Short(0),
            Self::Int => Value::Int(0),
            Self::Long => Value::Long(0),
            Self::Float => Value::Float(0.0),
            Self::Double => Value::Double(0.0),
            _ => return None,
        })
    }

    /// Whether `value` is stored at exactly this scalar width
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::Boolean, Value::Bool(_))
                | (Self::Byte, Value::Byte(_))
                | (Self::Short, Value::Short(_))
                | (Self::Int, Value::Int(_))
                | (Self::Long, Value::Long(_))
                | (Self::Float, Value::Float(_))
                | (Self::Double, Value::Double(_))
        )
    }

    /// Whether this scalar kind stores integers
    pub fn is_integral(&self) -> bool {
        matches!(self, Self::Byte | Self::Short | Self::Int | Self::Long)
    }

    /// Build a value of this scalar width from an `f64`.
    ///
    /// Integer widths refuse fractional, non-finite and out-of-range input.
    pub fn value_from_f64(&self, raw: f64) -> Option<Value> {
        // 2^63, the first f64 past i64::MAX
        const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;
        if self.is_integral() {
            if raw.fract() != 0.0 || !(-I64_LIMIT..I64_LIMIT).contains(&raw) {
                return None;
            }
            return self.value_from_i64(raw as i64);
        }
        Some(match self {
            Self::Boolean => Value::Bool(raw != 0.0),
            Self::Float => Value::Float(raw as f32),
            Self::Double => Value::Double(raw),
            _ => return None,
        })
    }

    /// Build a value of this scalar width from an `i64`.
    ///
    /// Integer widths refuse out-of-range input.
    pub fn value_from_i64(&self, raw: i64) -> Option<Value> {
        Some(match self {
            Self::Boolean => Value::Bool(raw != 0),
            Self::Byte => Value::Byte(u8::try_from(raw).ok()?),
            Self::Short => Value::Short(i16::try_from(raw).ok()?),
            Self::Int => Value::Int(i32::try_from(raw).ok()?),
            Self::Long => Value::Long(raw),
            Self::Float => Value::Float(raw as f32),
            Self::Double => Value::Double(raw as f64),
            _ => return None,
        })
    }
}

/// Typed-data payload of a typed attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataKind {
    /// String
    String,
    /// 4x4 matrix
    Matrix,
    /// Array of 32-bit integers
    IntArray,
    /// Array of doubles
    DoubleArray,
    /// Array of strings
    StringArray,
    /// Array of 3D vectors
    VectorArray,
    /// Opaque mesh data
    Mesh,
    /// Opaque curve data
    NurbsCurve,
}

/// Named fields of an enum attribute.
///
/// Indices need not be contiguous: `max` may exceed the highest named field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnumSpec {
    fields: BTreeMap<i32, String>,
    min: i32,
    max: i32,
}

impl EnumSpec {
    /// Create from `(index, name)` pairs; the declared range spans the given indices
    pub fn new<S: Into<String>>(fields: impl IntoIterator<Item = (i32, S)>) -> Self {
        let fields: BTreeMap<i32, String> =
            fields.into_iter().map(|(i, n)| (i, n.into())).collect();
        let min = fields.keys().next().copied().unwrap_or(0).min(0);
        let max = fields.keys().next_back().copied().unwrap_or(0);
        Self { fields, min, max }
    }

    /// Widen the declared maximum index
    pub fn with_max(mut self, max: i32) -> Self {
        self.max = self.max.max(max);
        self
    }

    /// Lowest declared index
    pub fn min(&self) -> i32 {
        self.min
    }

    /// Highest declared index
    pub fn max(&self) -> i32 {
        self.max
    }

    /// Name of a field, if that index is named
    pub fn field_name(&self, index: i32) -> Option<&str> {
        self.fields.get(&index).map(String::as_str)
    }

    /// Index of a named field
    pub fn field_index(&self, name: &str) -> Option<i32> {
        self.fields.iter().find(|(_, n)| *n == name).map(|(i, _)| *i)
    }
}

/// Native kind of an attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeKind {
    /// Numeric scalar or fixed-width numeric vector
    Numeric(NumericKind),
    /// Quantity stored together with its unit
    Unit(UnitKind),
    /// Enumeration
    Enum(EnumSpec),
    /// Typed data (strings, matrices, typed arrays, geometry)
    Typed(DataKind),
    /// Matrix attribute
    Matrix,
    /// Message attribute: connectivity only
    Message,
    /// Compound attribute: an ordered record of children
    Compound,
    /// Native kind with no portable representation
    Generic(String),
}

/// Which bound of a numeric attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bound {
    /// Hard minimum
    Min,
    /// Hard maximum
    Max,
    /// Slider minimum
    SoftMin,
    /// Slider maximum
    SoftMax,
}

/// Optional bounds of a numeric attribute
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    /// Hard minimum
    pub min: Option<f64>,
    /// Hard maximum
    pub max: Option<f64>,
    /// Slider minimum
    pub soft_min: Option<f64>,
    /// Slider maximum
    pub soft_max: Option<f64>,
}

impl Bounds {
    /// Read one bound
    pub fn get(&self, bound: Bound) -> Option<f64> {
        match bound {
            Bound::Min => self.min,
            Bound::Max => self.max,
            Bound::SoftMin => self.soft_min,
            Bound::SoftMax => self.soft_max,
        }
    }

    /// Write one bound
    pub fn set(&mut self, bound: Bound, value: Option<f64>) {
        match bound {
            Bound::Min => self.min = value,
            Bound::Max => self.max = value,
            Bound::SoftMin => self.soft_min = value,
            Bound::SoftMax => self.soft_max = value,
        }
    }
}

/// Schema of a named slot on a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name
    pub name: String,
    /// Native kind
    pub kind: AttributeKind,
    /// Declared children (compounds and numeric vectors)
    pub children: Vec<Attribute>,
    /// Whether this is a sparse array of elements
    pub array: bool,
    /// Declared default (leaves only)
    pub default: Option<Value>,
    /// Numeric bounds
    pub bounds: Bounds,
    /// Keyable by default
    pub keyable: bool,
    /// Shown in the channel box by default
    pub channel_box: bool,
    /// Added to a single node instance rather than defined by its type
    pub dynamic: bool,
}

impl Attribute {
    fn with_kind(name: impl Into<String>, kind: AttributeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            children: Vec::new(),
            array: false,
            default: None,
            bounds: Bounds::default(),
            keyable: false,
            channel_box: false,
            dynamic: false,
        }
    }

    /// Numeric attribute. Vector kinds get one child per component, named
    /// `<name>X`, `<name>Y`, `<name>Z`, `<name>W`.
    pub fn numeric(name: impl Into<String>, kind: NumericKind) -> Self {
        let name = name.into();
        let mut attribute = Self::with_kind(name.clone(), AttributeKind::Numeric(kind));
        if kind.arity() > 1 {
            attribute.children = ["X", "Y", "Z", "W"]
                .iter()
                .take(kind.arity())
                .map(|suffix| Self::numeric(format!("{name}{suffix}"), kind.component()))
                .collect();
        }
        attribute
    }

    /// Numeric vector with explicit child names
    pub fn vector<S: Into<String>>(
        name: impl Into<String>,
        kind: NumericKind,
        children: impl IntoIterator<Item = S>,
    ) -> Self {
        let mut attribute = Self::with_kind(name, AttributeKind::Numeric(kind));
        attribute.children = children
            .into_iter()
            .map(|child| Self::numeric(child, kind.component()))
            .collect();
        attribute
    }

    /// Unit-typed attribute
    pub fn unit(name: impl Into<String>, kind: UnitKind) -> Self {
        Self::with_kind(name, AttributeKind::Unit(kind))
    }

    /// Enum attribute
    pub fn enumeration(name: impl Into<String>, spec: EnumSpec) -> Self {
        Self::with_kind(name, AttributeKind::Enum(spec))
    }

    /// Typed-data attribute
    pub fn typed(name: impl Into<String>, data: DataKind) -> Self {
        Self::with_kind(name, AttributeKind::Typed(data))
    }

    /// Matrix attribute
    pub fn matrix(name: impl Into<String>) -> Self {
        Self::with_kind(name, AttributeKind::Matrix)
    }

    /// Message attribute
    pub fn message(name: impl Into<String>) -> Self {
        Self::with_kind(name, AttributeKind::Message)
    }

    /// Compound attribute
    pub fn compound(name: impl Into<String>, children: Vec<Attribute>) -> Self {
        let mut attribute = Self::with_kind(name, AttributeKind::Compound);
        attribute.children = children;
        attribute
    }

    /// Attribute of a native kind with no portable representation
    pub fn generic(name: impl Into<String>, native: impl Into<String>) -> Self {
        Self::with_kind(name, AttributeKind::Generic(native.into()))
    }

    /// Make this a sparse array attribute
    pub fn array(mut self) -> Self {
        self.array = true;
        self
    }

    /// Set the default. Vector defaults are distributed over the children.
    pub fn with_default(mut self, value: Value) -> Self {
        self.assign_default(value);
        self
    }

    /// Set a bound
    pub fn with_bound(mut self, bound: Bound, value: f64) -> Self {
        self.bounds.set(bound, Some(value));
        self
    }

    /// Set the hard range
    pub fn with_range(self, min: f64, max: f64) -> Self {
        self.with_bound(Bound::Min, min).with_bound(Bound::Max, max)
    }

    /// Keyable by default
    pub fn keyable(mut self) -> Self {
        self.keyable = true;
        self
    }

    /// Shown in the channel box by default
    pub fn channel_box(mut self) -> Self {
        self.channel_box = true;
        self
    }

    /// Mark this attribute and its children as dynamic
    pub(crate) fn mark_dynamic(&mut self) {
        self.dynamic = true;
        for child in &mut self.children {
            child.mark_dynamic();
        }
    }

    /// Store a default, spreading vector components over the children
    pub(crate) fn assign_default(&mut self, value: Value) {
        match value.components() {
            Some(components) if !self.children.is_empty() => {
                let components = components.to_vec();
                for (child, component) in self.children.iter_mut().zip(components) {
                    if let AttributeKind::Numeric(kind) = child.kind {
                        child.default = kind.value_from_f64(component);
                    }
                }
            }
            _ => self.default = Some(value),
        }
    }

    /// Find a declared child by name
    pub fn child(&self, name: &str) -> Option<&Attribute> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Find a declared child by name, mutably
    pub fn child_mut(&mut self, name: &str) -> Option<&mut Attribute> {
        self.children.iter_mut().find(|c| c.name == name)
    }

    /// Whether the attribute has declared children
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Whether bounds exist for this native kind
    pub fn supports_bounds(&self) -> bool {
        match &self.kind {
            AttributeKind::Numeric(kind) => kind.arity() == 1 && *kind != NumericKind::Boolean,
            AttributeKind::Unit(_) => true,
            _ => false,
        }
    }

    /// The value a leaf reads when nothing has been written to it
    pub fn default_value(&self) -> Option<Value> {
        if let Some(default) = &self.default {
            return Some(default.clone());
        }
        match &self.kind {
            AttributeKind::Numeric(kind) => kind.zero(),
            AttributeKind::Unit(kind) => Some(Value::Unit(UnitValue::new(0.0, kind.base_unit()))),
            AttributeKind::Enum(spec) => Some(Value::Enum(spec.min())),
            AttributeKind::Typed(DataKind::String) => Some(Value::String(String::new())),
            AttributeKind::Typed(DataKind::Matrix) | AttributeKind::Matrix => {
                Some(Value::Matrix(Value::IDENTITY))
            }
            AttributeKind::Typed(
                DataKind::IntArray
                | DataKind::DoubleArray
                | DataKind::StringArray
                | DataKind::VectorArray,
            ) => Some(Value::List(Vec::new())),
            _ => None,
        }
    }

    /// Whether a leaf of this attribute can store `value`
    pub fn accepts(&self, value: &Value) -> bool {
        match (&self.kind, value) {
            (AttributeKind::Numeric(kind), _) => kind.accepts(value),
            (AttributeKind::Unit(kind), Value::Unit(v)) => v.kind() == *kind,
            (AttributeKind::Enum(_), Value::Enum(_))
            | (AttributeKind::Typed(DataKind::String), Value::String(_))
            | (AttributeKind::Typed(DataKind::Matrix) | AttributeKind::Matrix, Value::Matrix(_)) => {
                true
            }
            (AttributeKind::Typed(data), Value::List(items)) => items.iter().all(|item| {
                matches!(
                    (data, item),
                    (DataKind::IntArray, Value::Int(_))
                        | (DataKind::DoubleArray, Value::Double(_))
                        | (DataKind::StringArray, Value::String(_))
                        | (DataKind::VectorArray, Value::Vector3(_))
                )
            }) && matches!(
                data,
                DataKind::IntArray
                    | DataKind::DoubleArray
                    | DataKind::StringArray
                    | DataKind::VectorArray
            ),
            _ => false,
        }
    }
}
