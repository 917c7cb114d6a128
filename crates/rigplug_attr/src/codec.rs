// SPDX-License-Identifier: MIT OR Apache-2.0
//! Reading and writing values through plugs.
//!
//! Reads never fail: anything without a portable representation comes back
//! as [`Sample::Unsupported`]. Writes mirror the read dispatch and queue one
//! `SetValue` per leaf plug.

use crate::error::{AttrError, Result};
use crate::transaction::{stage_then_commit, EditOp, EditTransaction};
use crate::types::{classify_plug, TypeTag};
use rigplug_scene::{
    Attribute, AttributeKind, DataKind, EvaluationContext, NodeId, Plug, SceneHost, UnitValue,
    Value,
};
use serde_json::Value as Json;

/// A value read from a plug, together with its type tag
#[derive(Debug, Clone, PartialEq)]
pub enum Sample {
    /// No portable representation
    Unsupported,
    /// A single value
    Leaf {
        /// Type of the value
        tag: TypeTag,
        /// The value
        value: Value,
    },
    /// Array elements in physical order, or compound children in declared order
    Aggregate {
        /// Type of the aggregate
        tag: TypeTag,
        /// One sample per element or child
        elements: Vec<Sample>,
    },
}

impl Sample {
    /// Type tag, `None` when unsupported
    pub fn tag(&self) -> Option<&TypeTag> {
        match self {
            Self::Unsupported => None,
            Self::Leaf { tag, .. } | Self::Aggregate { tag, .. } => Some(tag),
        }
    }

    /// Value, with aggregates folded into `Value::List`.
    ///
    /// An aggregate holding an unsupported element has no list value, since a
    /// shorter list would no longer line up with its elements. Use
    /// [`Sample::element_values`] to read the rest.
    pub fn value(&self) -> Option<Value> {
        match self {
            Self::Unsupported => None,
            Self::Leaf { value, .. } => Some(value.clone()),
            Self::Aggregate { elements, .. } => elements
                .iter()
                .map(Sample::value)
                .collect::<Option<Vec<_>>>()
                .map(Value::List),
        }
    }

    /// Per-element tags of an aggregate, parallel to [`Sample::element_values`]
    pub fn element_tags(&self) -> Vec<Option<TypeTag>> {
        match self {
            Self::Aggregate { elements, .. } => {
                elements.iter().map(|e| e.tag().cloned()).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Per-element values of an aggregate, parallel to [`Sample::element_tags`]
    pub fn element_values(&self) -> Vec<Option<Value>> {
        match self {
            Self::Aggregate { elements, .. } => elements.iter().map(Sample::value).collect(),
            _ => Vec::new(),
        }
    }

    /// Portable JSON form of the value; unsupported values become `null`
    pub fn to_json(&self) -> Json {
        match self {
            Self::Unsupported => Json::Null,
            Self::Leaf { value, .. } => encode_json(value),
            Self::Aggregate { elements, .. } => {
                Json::Array(elements.iter().map(Sample::to_json).collect())
            }
        }
    }
}

/// Whether `plug` addresses a whole array rather than one of its elements
pub(crate) fn is_array_plug(attribute: &Attribute, plug: &Plug) -> bool {
    attribute.array && plug.logical_index().is_none()
}

/// Read the value of any plug
pub fn get_value<H: SceneHost + ?Sized>(
    host: &H,
    plug: &Plug,
    context: &EvaluationContext,
) -> Sample {
    let attribute = match host.attribute(plug) {
        Ok(attribute) => attribute,
        Err(e) => {
            tracing::warn!(plug = %plug, error = %e, "cannot read plug");
            return Sample::Unsupported;
        }
    };
    let tag = classify_plug(host, plug);
    if tag == TypeTag::Unsupported {
        return Sample::Unsupported;
    }

    if is_array_plug(attribute, plug) {
        let indices = host.element_indices(plug).unwrap_or_default();
        let elements = indices
            .into_iter()
            .map(|index| get_value(host, &plug.element(index), context))
            .collect();
        return Sample::Aggregate { tag, elements };
    }

    match tag {
        TypeTag::Compound => {
            let elements = attribute
                .children
                .iter()
                .map(|child| get_value(host, &plug.child(child.name.as_str()), context))
                .collect();
            Sample::Aggregate { tag, elements }
        }
        TypeTag::Vector2 | TypeTag::Vector3 | TypeTag::Vector4 => {
            let components: Option<Vec<f64>> = attribute
                .children
                .iter()
                .map(|child| {
                    host.value(&plug.child(child.name.as_str()), context)
                        .ok()
                        .and_then(|v| v.as_f64())
                })
                .collect();
            match components.and_then(|c| vector_value(&c)) {
                Some(value) => Sample::Leaf { tag, value },
                None => Sample::Unsupported,
            }
        }
        TypeTag::Message => Sample::Leaf {
            tag,
            value: Value::Message(host.source(plug).map(|p| p.node)),
        },
        _ => match host.value(plug, context) {
            Ok(value) => Sample::Leaf { tag, value },
            Err(e) => {
                tracing::warn!(plug = %plug, error = %e, "cannot read plug");
                Sample::Unsupported
            }
        },
    }
}

/// Write a value through a plug.
///
/// With a transaction the edits are queued on it; without one they are
/// applied immediately. Arity errors leave the transaction and the scene
/// untouched.
pub fn set_value<H: SceneHost + ?Sized>(
    host: &mut H,
    plug: &Plug,
    value: Value,
    transaction: Option<&mut EditTransaction>,
) -> Result<()> {
    stage_then_commit(host, transaction, |host, staged| {
        stage_value(host, plug, value, staged)
    })
}

fn stage_value<H: SceneHost + ?Sized>(
    host: &H,
    plug: &Plug,
    value: Value,
    staged: &mut EditTransaction,
) -> Result<()> {
    let attribute = host.attribute(plug)?;
    let tag = classify_plug(host, plug);
    if tag == TypeTag::Unsupported {
        return Err(AttrError::unsupported(plug, "no portable representation"));
    }

    if is_array_plug(attribute, plug) {
        let indices = host.element_indices(plug)?;
        let items = expect_list(plug, value, indices.len())?;
        for (index, item) in indices.into_iter().zip(items) {
            stage_value(host, &plug.element(index), item, staged)?;
        }
        return Ok(());
    }

    match tag {
        TypeTag::Compound => {
            let items = expect_list(plug, value, attribute.children.len())?;
            for (child, item) in attribute.children.iter().zip(items) {
                stage_value(host, &plug.child(child.name.as_str()), item, staged)?;
            }
            Ok(())
        }
        TypeTag::Vector2 | TypeTag::Vector3 | TypeTag::Vector4 => {
            let components = vector_components(plug, &value)?;
            if components.len() != attribute.children.len() {
                return Err(AttrError::arity(plug, attribute.children.len(), components.len()));
            }
            for (child, component) in attribute.children.iter().zip(components) {
                let leaf = match child.kind {
                    AttributeKind::Numeric(kind) => kind.value_from_f64(component),
                    _ => None,
                }
                .ok_or_else(|| {
                    AttrError::unsupported(plug, format!("cannot store {component} in {}", child.name))
                })?;
                staged.push(EditOp::SetValue {
                    plug: plug.child(child.name.as_str()),
                    value: leaf,
                });
            }
            Ok(())
        }
        TypeTag::Message => stage_message(host, plug, value, staged),
        _ => {
            let value = coerce_leaf(attribute, plug, value)?;
            staged.push(EditOp::SetValue {
                plug: plug.clone(),
                value,
            });
            Ok(())
        }
    }
}

fn stage_message<H: SceneHost + ?Sized>(
    host: &H,
    plug: &Plug,
    value: Value,
    staged: &mut EditTransaction,
) -> Result<()> {
    let existing = host.source(plug);
    match value {
        Value::Message(None) => {
            if let Some(source) = existing {
                staged.push(EditOp::Disconnect {
                    source,
                    destination: plug.clone(),
                });
            }
            Ok(())
        }
        Value::Plug(source) => {
            if existing.as_ref() == Some(&source) {
                return Ok(());
            }
            if let Some(existing) = existing {
                staged.push(EditOp::Disconnect {
                    source: existing,
                    destination: plug.clone(),
                });
            }
            staged.push(EditOp::Connect {
                source,
                destination: plug.clone(),
            });
            Ok(())
        }
        other => Err(AttrError::unsupported(
            plug,
            format!("message attributes take a plug or no value, not {}", other.kind_name()),
        )),
    }
}

/// Bring a leaf value to the attribute's exact native width
fn coerce_leaf(attribute: &Attribute, plug: &Plug, value: Value) -> Result<Value> {
    if attribute.accepts(&value) {
        return Ok(value);
    }
    let coerced = match (&attribute.kind, &value) {
        (AttributeKind::Numeric(kind), _) if kind.arity() == 1 => match value.as_i64() {
            Some(raw) => kind.value_from_i64(raw),
            None => value.as_f64().and_then(|raw| kind.value_from_f64(raw)),
        },
        (AttributeKind::Enum(_), Value::Int(index)) => Some(Value::Enum(*index)),
        (AttributeKind::Enum(spec), Value::String(name)) => spec.field_index(name).map(Value::Enum),
        _ => None,
    };
    coerced.ok_or_else(|| {
        AttrError::unsupported(plug, format!("cannot store {} here", value.kind_name()))
    })
}

fn expect_list(plug: &Plug, value: Value, expected: usize) -> Result<Vec<Value>> {
    match value {
        Value::List(items) if items.len() == expected => Ok(items),
        Value::List(items) => Err(AttrError::arity(plug, expected, items.len())),
        other => Err(AttrError::unsupported(
            plug,
            format!("expected a list of {expected}, got {}", other.kind_name()),
        )),
    }
}

fn vector_components(plug: &Plug, value: &Value) -> Result<Vec<f64>> {
    if let Some(components) = value.components() {
        return Ok(components.to_vec());
    }
    if let Value::List(items) = value {
        if let Some(components) = items.iter().map(Value::as_f64).collect::<Option<Vec<_>>>() {
            return Ok(components);
        }
    }
    Err(AttrError::unsupported(
        plug,
        format!("expected a vector, got {}", value.kind_name()),
    ))
}

fn vector_value(components: &[f64]) -> Option<Value> {
    match *components {
        [x, y] => Some(Value::Vector2([x, y])),
        [x, y, z] => Some(Value::Vector3([x, y, z])),
        [x, y, z, w] => Some(Value::Vector4([x, y, z, w])),
        _ => None,
    }
}

/// Portable JSON form of a value
pub fn encode_json(value: &Value) -> Json {
    match value {
        Value::Bool(v) => Json::Bool(*v),
        Value::Byte(v) => Json::from(*v),
        Value::Short(v) => Json::from(*v),
        Value::Int(v) | Value::Enum(v) => Json::from(*v),
        Value::Long(v) => Json::from(*v),
        Value::Float(v) => Json::from(f64::from(*v)),
        Value::Double(v) => Json::from(*v),
        Value::Vector2(_) | Value::Vector3(_) | Value::Vector4(_) | Value::Matrix(_) => {
            Json::from(value.components().unwrap_or_default().to_vec())
        }
        Value::String(v) => Json::String(v.clone()),
        Value::Unit(v) => serde_json::to_value(v).unwrap_or(Json::Null),
        Value::Message(node) => node.map_or(Json::Null, |n| Json::String(n.to_string())),
        Value::Plug(plug) => Json::String(plug.to_string()),
        Value::List(items) => Json::Array(items.iter().map(encode_json).collect()),
    }
}

/// Build a leaf value for `attribute` from its portable JSON form.
///
/// Unit values accept either `{"magnitude", "unit"}` or a bare magnitude in
/// the kind's base unit. Matrices are a flat row-major list of 16 numbers.
pub fn decode_json(attribute: &Attribute, plug: &Plug, json: &Json) -> Result<Value> {
    let malformed = |detail: &str| AttrError::Descriptor {
        plug: plug.to_string(),
        detail: format!("{detail}, got {json}"),
    };
    match &attribute.kind {
        AttributeKind::Numeric(kind) if kind.arity() == 1 => {
            let decoded = match json {
                Json::Bool(b) => kind.value_from_i64(i64::from(*b)),
                Json::Number(n) => match n.as_i64() {
                    Some(raw) => kind.value_from_i64(raw),
                    None => n.as_f64().and_then(|raw| kind.value_from_f64(raw)),
                },
                _ => None,
            };
            decoded.ok_or_else(|| malformed("expected a number that fits the attribute"))
        }
        AttributeKind::Numeric(kind) => {
            let components = json_numbers(json).filter(|c| c.len() == kind.arity());
            components
                .and_then(|c| vector_value(&c))
                .ok_or_else(|| malformed("expected a numeric vector"))
        }
        AttributeKind::Unit(kind) => {
            let unit_value = match json {
                Json::Number(n) => n.as_f64().map(|m| UnitValue::new(m, kind.base_unit())),
                other => serde_json::from_value::<UnitValue>(other.clone()).ok(),
            };
            unit_value
                .filter(|v| v.kind() == *kind)
                .map(Value::Unit)
                .ok_or_else(|| malformed("expected a unit value"))
        }
        AttributeKind::Enum(spec) => match json {
            Json::String(name) => spec.field_index(name),
            other => other.as_i64().and_then(|i| i32::try_from(i).ok()),
        }
        .map(Value::Enum)
        .ok_or_else(|| malformed("expected an enum index")),
        AttributeKind::Typed(DataKind::String) => json
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(|| malformed("expected a string")),
        AttributeKind::Typed(DataKind::Matrix) | AttributeKind::Matrix => json_numbers(json)
            .and_then(|c| <[f64; 16]>::try_from(c).ok())
            .map(Value::Matrix)
            .ok_or_else(|| malformed("expected 16 numbers")),
        AttributeKind::Typed(data) => {
            let items = json.as_array().ok_or_else(|| malformed("expected a list"))?;
            items
                .iter()
                .map(|item| decode_typed_item(*data, item))
                .collect::<Option<Vec<_>>>()
                .map(Value::List)
                .ok_or_else(|| malformed("unexpected typed array element"))
        }
        AttributeKind::Message => match json {
            Json::Null => Ok(Value::Message(None)),
            Json::String(id) => NodeId::parse(id)
                .map(|node| Value::Message(Some(node)))
                .ok_or_else(|| malformed("expected a node id")),
            _ => Err(malformed("expected a node id or null")),
        },
        AttributeKind::Compound | AttributeKind::Generic(_) => Err(AttrError::unsupported(
            plug,
            "no portable leaf representation",
        )),
    }
}

fn decode_typed_item(data: DataKind, item: &Json) -> Option<Value> {
    match data {
        DataKind::IntArray => item.as_i64().and_then(|i| i32::try_from(i).ok()).map(Value::Int),
        DataKind::DoubleArray => item.as_f64().map(Value::Double),
        DataKind::StringArray => item.as_str().map(|s| Value::String(s.to_string())),
        DataKind::VectorArray => json_numbers(item)
            .and_then(|c| <[f64; 3]>::try_from(c).ok())
            .map(Value::Vector3),
        _ => None,
    }
}

fn json_numbers(json: &Json) -> Option<Vec<f64>> {
    json.as_array()?.iter().map(Json::as_f64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigplug_scene::{
        EnumSpec, Node, NodeType, NumericKind, SceneGraph, Unit, UnitKind,
    };

    fn scene() -> (SceneGraph, NodeId) {
        let node_type = NodeType::new("rigNode")
            .with_attribute(Attribute::numeric("visible", NumericKind::Boolean))
            .with_attribute(Attribute::numeric("count", NumericKind::Short))
            .with_attribute(Attribute::numeric("weight", NumericKind::Float))
            .with_attribute(Attribute::numeric("translate", NumericKind::Double3))
            .with_attribute(Attribute::unit("rotateX", UnitKind::Angle))
            .with_attribute(Attribute::enumeration(
                "mode",
                EnumSpec::new([(0, "off"), (2, "on")]),
            ))
            .with_attribute(Attribute::typed("label", DataKind::String))
            .with_attribute(Attribute::matrix("offsetMatrix"))
            .with_attribute(Attribute::typed("ids", DataKind::IntArray))
            .with_attribute(Attribute::message("driver"))
            .with_attribute(Attribute::message("message"))
            .with_attribute(Attribute::numeric("weights", NumericKind::Double).array())
            .with_attribute(Attribute::compound(
                "settings",
                vec![
                    Attribute::numeric("gain", NumericKind::Double),
                    Attribute::typed("tag", DataKind::String),
                ],
            ))
            .with_attribute(Attribute::typed("inMesh", DataKind::Mesh))
            .with_attribute(Attribute::compound(
                "deformer",
                vec![
                    Attribute::numeric("envelope", NumericKind::Double),
                    Attribute::typed("cage", DataKind::Mesh),
                ],
            ));
        let mut scene = SceneGraph::new("test");
        let id = scene.add_node(Node::new(&node_type, "n"));
        (scene, id)
    }

    fn roundtrip(scene: &mut SceneGraph, plug: &Plug, value: Value) -> Value {
        set_value(scene, plug, value, None).unwrap();
        get_value(scene, plug, &EvaluationContext::current()).value().unwrap()
    }

    #[test]
    fn test_scalar_roundtrip_keeps_width() {
        let (mut scene, id) = scene();
        assert_eq!(roundtrip(&mut scene, &Plug::new(id, "visible"), Value::Bool(true)), Value::Bool(true));
        assert_eq!(roundtrip(&mut scene, &Plug::new(id, "count"), Value::Short(-7)), Value::Short(-7));
        assert_eq!(roundtrip(&mut scene, &Plug::new(id, "weight"), Value::Float(0.25)), Value::Float(0.25));
    }

    #[test]
    fn test_vector_roundtrip() {
        let (mut scene, id) = scene();
        let translate = Plug::new(id, "translate");
        let value = roundtrip(&mut scene, &translate, Value::Vector3([1.0, -2.0, 3.5]));
        assert!(value.approx_eq(&Value::Vector3([1.0, -2.0, 3.5]), 1e-12));

        let sample = get_value(&scene, &translate, &EvaluationContext::current());
        assert_eq!(sample.tag(), Some(&TypeTag::Vector3));
    }

    #[test]
    fn test_vector_write_is_one_op_per_child() {
        let (mut scene, id) = scene();
        let mut tx = EditTransaction::new();
        set_value(&mut scene, &Plug::new(id, "translate"), Value::Vector3([1.0, 2.0, 3.0]), Some(&mut tx)).unwrap();
        assert_eq!(tx.len(), 3);
        assert!(tx.ops().iter().all(|op| matches!(op, EditOp::SetValue { .. })));
    }

    #[test]
    fn test_unit_keeps_unit() {
        let (mut scene, id) = scene();
        let value = Value::Unit(UnitValue::new(90.0, Unit::Degrees));
        assert_eq!(roundtrip(&mut scene, &Plug::new(id, "rotateX"), value.clone()), value);
        let wrong_kind = Value::Unit(UnitValue::new(1.0, Unit::Meters));
        assert!(matches!(
            set_value(&mut scene, &Plug::new(id, "rotateX"), wrong_kind, None),
            Err(AttrError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn test_enum_reads_index() {
        let (mut scene, id) = scene();
        let mode = Plug::new(id, "mode");
        assert_eq!(roundtrip(&mut scene, &mode, Value::Enum(2)), Value::Enum(2));
        assert_eq!(roundtrip(&mut scene, &mode, Value::String("off".into())), Value::Enum(0));
    }

    #[test]
    fn test_string_matrix_typed_array() {
        let (mut scene, id) = scene();
        let label = Value::String("spine_01".into());
        assert_eq!(roundtrip(&mut scene, &Plug::new(id, "label"), label.clone()), label);

        let mut m = Value::IDENTITY;
        m[3] = 5.0;
        assert_eq!(roundtrip(&mut scene, &Plug::new(id, "offsetMatrix"), Value::Matrix(m)), Value::Matrix(m));

        let ids = Value::List(vec![Value::Int(4), Value::Int(8)]);
        assert_eq!(roundtrip(&mut scene, &Plug::new(id, "ids"), ids.clone()), ids);
        let sample = get_value(&scene, &Plug::new(id, "ids"), &EvaluationContext::current());
        assert_eq!(sample.tag(), Some(&TypeTag::Array(Box::new(TypeTag::Int))));
    }

    #[test]
    fn test_message_wiring() {
        let (mut scene, id) = scene();
        let locator = NodeType::new("locator").with_attribute(Attribute::message("message"));
        let other_id = scene.add_node(Node::new(&locator, "other"));
        let driver = Plug::new(id, "driver");

        let sample = get_value(&scene, &driver, &EvaluationContext::current());
        assert_eq!(sample.value(), Some(Value::Message(None)));

        set_value(&mut scene, &driver, Value::Plug(Plug::new(other_id, "message")), None).unwrap();
        assert_eq!(
            get_value(&scene, &driver, &EvaluationContext::current()).value(),
            Some(Value::Message(Some(other_id)))
        );

        set_value(&mut scene, &driver, Value::Message(None), None).unwrap();
        assert!(!scene.is_connected(&driver));

        assert!(matches!(
            set_value(&mut scene, &driver, Value::Double(1.0), None),
            Err(AttrError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn test_sparse_array_physical_order() {
        let (mut scene, id) = scene();
        let weights = Plug::new(id, "weights");
        scene.set_value(&weights.element(5), Value::Double(0.5)).unwrap();
        scene.set_value(&weights.element(1), Value::Double(0.1)).unwrap();

        let sample = get_value(&scene, &weights, &EvaluationContext::current());
        assert_eq!(sample.tag(), Some(&TypeTag::Array(Box::new(TypeTag::Double))));
        assert_eq!(sample.element_tags(), vec![Some(TypeTag::Double), Some(TypeTag::Double)]);
        assert_eq!(
            sample.element_values(),
            vec![Some(Value::Double(0.1)), Some(Value::Double(0.5))]
        );

        set_value(&mut scene, &weights, Value::List(vec![Value::Double(1.0), Value::Double(2.0)]), None).unwrap();
        assert_eq!(
            scene.value(&weights.element(5), &EvaluationContext::current()).unwrap(),
            Value::Double(2.0)
        );
    }

    #[test]
    fn test_arity_mismatch_writes_nothing() {
        let (mut scene, id) = scene();
        let weights = Plug::new(id, "weights");
        scene.set_value(&weights.element(0), Value::Double(0.5)).unwrap();
        scene.set_value(&weights.element(1), Value::Double(0.5)).unwrap();

        let mut tx = EditTransaction::new();
        let result = set_value(
            &mut scene,
            &weights,
            Value::List(vec![Value::Double(9.0)]),
            Some(&mut tx),
        );
        assert!(matches!(result, Err(AttrError::ArityMismatch { expected: 2, got: 1, .. })));
        assert!(tx.is_empty());

        let settings = Plug::new(id, "settings");
        let result = set_value(&mut scene, &settings, Value::List(vec![Value::Double(1.0)]), None);
        assert!(matches!(result, Err(AttrError::ArityMismatch { .. })));
        assert_eq!(
            scene.value(&settings.child("gain"), &EvaluationContext::current()).unwrap(),
            Value::Double(0.0)
        );
    }

    #[test]
    fn test_compound_roundtrip() {
        let (mut scene, id) = scene();
        let settings = Plug::new(id, "settings");
        let value = Value::List(vec![Value::Double(2.0), Value::String("fk".into())]);
        assert_eq!(roundtrip(&mut scene, &settings, value.clone()), value);
        let sample = get_value(&scene, &settings, &EvaluationContext::current());
        assert_eq!(sample.element_tags(), vec![Some(TypeTag::Double), Some(TypeTag::String)]);
    }

    #[test]
    fn test_unsupported_reads_nothing() {
        let (mut scene, id) = scene();
        let mesh = Plug::new(id, "inMesh");
        let sample = get_value(&scene, &mesh, &EvaluationContext::current());
        assert_eq!(sample, Sample::Unsupported);
        assert_eq!(sample.tag(), None);
        assert_eq!(sample.value(), None);
        assert!(matches!(
            set_value(&mut scene, &mesh, Value::List(vec![]), None),
            Err(AttrError::UnsupportedType { .. })
        ));
        let missing = Plug::new(id, "doesNotExist");
        assert_eq!(get_value(&scene, &missing, &EvaluationContext::current()), Sample::Unsupported);
    }

    #[test]
    fn test_partly_unsupported_compound_keeps_positions() {
        let (mut scene, id) = scene();
        let deformer = Plug::new(id, "deformer");
        scene.set_value(&deformer.child("envelope"), Value::Double(0.5)).unwrap();

        let sample = get_value(&scene, &deformer, &EvaluationContext::current());
        assert_eq!(sample.tag(), Some(&TypeTag::Compound));
        assert_eq!(sample.value(), None);
        assert_eq!(sample.element_tags(), vec![Some(TypeTag::Double), None]);
        assert_eq!(sample.element_values(), vec![Some(Value::Double(0.5)), None]);
        assert_eq!(sample.to_json(), serde_json::json!([0.5, null]));
    }

    #[test]
    fn test_integer_writes_refuse_lossy_numbers() {
        let (mut scene, id) = scene();
        let count = Plug::new(id, "count");
        assert_eq!(roundtrip(&mut scene, &count, Value::Double(12.0)), Value::Short(12));
        for lossy in [Value::Double(2.7), Value::Double(3e9), Value::Long(40_000)] {
            assert!(matches!(
                set_value(&mut scene, &count, lossy, None),
                Err(AttrError::UnsupportedType { .. })
            ));
        }
        assert_eq!(scene.value(&count, &EvaluationContext::current()).unwrap(), Value::Short(12));

        let json = serde_json::json!(2.5);
        assert!(matches!(
            decode_json(scene.attribute(&count).unwrap(), &count, &json),
            Err(AttrError::Descriptor { .. })
        ));
    }

    #[test]
    fn test_json_codec() {
        let (scene, id) = scene();
        let plug = Plug::new(id, "rotateX");
        let attribute = scene.attribute(&plug).unwrap();
        let json = encode_json(&Value::Unit(UnitValue::new(45.0, Unit::Degrees)));
        assert_eq!(json, serde_json::json!({"magnitude": 45.0, "unit": "Degrees"}));
        assert_eq!(
            decode_json(attribute, &plug, &json).unwrap(),
            Value::Unit(UnitValue::new(45.0, Unit::Degrees))
        );
        assert_eq!(
            decode_json(attribute, &plug, &serde_json::json!(1.5)).unwrap(),
            Value::Unit(UnitValue::new(1.5, Unit::Radians))
        );

        let count = Plug::new(id, "count");
        assert_eq!(
            decode_json(scene.attribute(&count).unwrap(), &count, &serde_json::json!(12)).unwrap(),
            Value::Short(12)
        );
        let matrix = Plug::new(id, "offsetMatrix");
        assert!(decode_json(scene.attribute(&matrix).unwrap(), &matrix, &serde_json::json!([1.0, 2.0])).is_err());
    }
}
