// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-attribute records: the persisted shape of one plug.
//!
//! A record always carries `name`, `Type` and `value`. Everything else is
//! emitted only when it says something: a default that differs from the
//! value (or belongs to a dynamic attribute), bounds that are set, flags that
//! are on, children of compounds and field names of enums.

use crate::codec::{self, decode_json, encode_json, get_value, is_array_plug};
use crate::config::RigplugConfig;
use crate::error::Result;
use crate::lock::with_unlocked;
use crate::types::{classify, classify_plug, enum_names, TypeTag};
use rigplug_scene::{Attribute, Bound, EvaluationContext, NodeId, Plug, SceneHost, Value};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// Serialized form of one plug
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDescriptor {
    /// Plug path, indexed and child-qualified
    #[serde(default)]
    pub name: String,
    /// Portable type
    #[serde(rename = "Type")]
    pub type_tag: TypeTag,
    /// Current value, `null` when there is none
    #[serde(default)]
    pub value: Json,
    /// Declared default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Json>,
    /// Hard minimum
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Hard maximum
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Slider minimum
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soft_min: Option<f64>,
    /// Slider maximum
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soft_max: Option<f64>,
    /// Shown in the channel box
    #[serde(default, skip_serializing_if = "is_false")]
    pub channel_box: bool,
    /// Keyable
    #[serde(default, skip_serializing_if = "is_false")]
    pub keyable: bool,
    /// Locked
    #[serde(default, skip_serializing_if = "is_false")]
    pub locked: bool,
    /// Compound children in declared order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<AttributeDescriptor>>,
    /// Enum fields as `(index, name)` pairs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enums: Option<Vec<(i32, String)>>,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

impl AttributeDescriptor {
    /// Create a record carrying only a name and type
    pub fn new(name: impl Into<String>, type_tag: TypeTag) -> Self {
        Self {
            name: name.into(),
            type_tag,
            value: Json::Null,
            default: None,
            min: None,
            max: None,
            soft_min: None,
            soft_max: None,
            channel_box: false,
            keyable: false,
            locked: false,
            children: None,
            enums: None,
        }
    }

    /// Set the value
    pub fn with_value(mut self, value: Json) -> Self {
        self.value = value;
        self
    }

    /// Set the default
    pub fn with_default(mut self, default: Json) -> Self {
        self.default = Some(default);
        self
    }

    /// Bound stored in this record
    pub fn bound(&self, bound: Bound) -> Option<f64> {
        match bound {
            Bound::Min => self.min,
            Bound::Max => self.max,
            Bound::SoftMin => self.soft_min,
            Bound::SoftMax => self.soft_max,
        }
    }

    /// Encode as a JSON object
    pub fn to_json(&self) -> Json {
        serde_json::to_value(self).unwrap_or(Json::Null)
    }

    /// Decode from a JSON object
    pub fn from_json(json: Json) -> serde_json::Result<Self> {
        serde_json::from_value(json)
    }
}

/// Default a plug reads when nothing was written to it.
///
/// Vectors assemble theirs from the children; aggregates and message plugs
/// have none.
fn declared_default<H: SceneHost + ?Sized>(host: &H, plug: &Plug, tag: &TypeTag) -> Option<Value> {
    let attribute = host.attribute(plug).ok()?;
    if is_array_plug(attribute, plug) {
        return None;
    }
    match tag {
        TypeTag::Vector2 | TypeTag::Vector3 | TypeTag::Vector4 => {
            let components = attribute
                .children
                .iter()
                .map(|child| child.default_value().and_then(|v| v.as_f64()))
                .collect::<Option<Vec<f64>>>()?;
            match components.as_slice() {
                [x, y] => Some(Value::Vector2([*x, *y])),
                [x, y, z] => Some(Value::Vector3([*x, *y, *z])),
                [x, y, z, w] => Some(Value::Vector4([*x, *y, *z, *w])),
                _ => None,
            }
        }
        TypeTag::Compound | TypeTag::Message | TypeTag::Unsupported => None,
        _ => attribute.default_value(),
    }
}

fn unchanged(current: Option<&Value>, default: Option<&Value>, epsilon: f64) -> bool {
    match (current, default) {
        (Some(current), Some(default)) => current.approx_eq(default, epsilon),
        (None, _) | (Some(Value::Message(None)), None) => true,
        _ => false,
    }
}

/// Serialize one plug into its record
pub fn serialize<H: SceneHost + ?Sized>(
    host: &H,
    plug: &Plug,
    config: &RigplugConfig,
) -> Result<AttributeDescriptor> {
    let attribute = host.attribute(plug)?;
    let tag = classify_plug(host, plug);
    let sample = get_value(host, plug, &EvaluationContext::current());
    let mut descriptor = AttributeDescriptor::new(plug.path_name(), tag.clone());
    descriptor.value = sample.to_json();

    let current = sample.value();
    if let Some(default) = declared_default(host, plug, &tag) {
        if attribute.dynamic || !unchanged(current.as_ref(), Some(&default), config.float_epsilon) {
            descriptor.default = Some(encode_json(&default));
        }
    }

    if attribute.supports_bounds() {
        descriptor.min = attribute.bounds.min;
        descriptor.max = attribute.bounds.max;
        descriptor.soft_min = attribute.bounds.soft_min;
        descriptor.soft_max = attribute.bounds.soft_max;
    }

    descriptor.channel_box = host.is_channel_box(plug);
    descriptor.keyable = host.is_keyable(plug);
    descriptor.locked = host.is_locked(plug);

    if tag == TypeTag::Compound {
        // Compound arrays are described by their first element only.
        let parent = if is_array_plug(attribute, plug) {
            let first = host.element_indices(plug)?.first().copied().unwrap_or(0);
            plug.element(first)
        } else {
            plug.clone()
        };
        let children = attribute
            .children
            .iter()
            .map(|child| serialize(host, &parent.child(child.name.as_str()), config))
            .collect::<Result<Vec<_>>>()?;
        descriptor.children = Some(children);
    }

    let element_tag = match &tag {
        TypeTag::Array(element) => element.as_ref(),
        other => other,
    };
    if element_tag.is_enum_capable() {
        descriptor.enums = Some(enum_names(attribute));
    }

    Ok(descriptor)
}

/// Whether a plug can be left out of a node dump.
///
/// Only static, non-array, non-compound attributes still holding their
/// default qualify. Flags do not keep a record alive.
pub fn is_elidable<H: SceneHost + ?Sized>(host: &H, plug: &Plug, config: &RigplugConfig) -> bool {
    let Ok(attribute) = host.attribute(plug) else {
        return false;
    };
    if attribute.dynamic {
        return false;
    }
    let tag = classify_plug(host, plug);
    if matches!(tag, TypeTag::Compound | TypeTag::Array(_)) {
        return false;
    }
    let current = get_value(host, plug, &EvaluationContext::current()).value();
    let default = declared_default(host, plug, &tag);
    unchanged(current.as_ref(), default.as_ref(), config.float_epsilon)
}

/// Serialize every top-level attribute of a node that carries information
pub fn serialize_node<H: SceneHost + ?Sized>(
    host: &H,
    node: NodeId,
    config: &RigplugConfig,
) -> Result<Vec<AttributeDescriptor>> {
    let mut records = Vec::new();
    for name in host.attribute_names(node)? {
        let plug = Plug::new(node, name);
        if is_elidable(host, &plug, config) {
            continue;
        }
        records.push(serialize(host, &plug, config)?);
    }
    tracing::debug!(node = %node, records = records.len(), "serialized node");
    Ok(records)
}

/// Apply a record to a plug.
///
/// Children (or a flat value fanned out over them) go first, then the
/// default, then the value of a leaf, then bounds and flags with `locked`
/// last. Values are written through a scoped unlock.
///
/// On a compound array the children template lands on the first
/// materialized element, or element 0. Other arrays take the value list
/// element by element.
pub fn apply_descriptor<H: SceneHost + ?Sized>(
    host: &mut H,
    plug: &Plug,
    descriptor: &AttributeDescriptor,
) -> Result<()> {
    let attribute = host.attribute(plug)?.clone();
    let tag = classify_plug(host, plug);
    let aggregate = is_array_plug(&attribute, plug);

    if aggregate {
        match &descriptor.children {
            Some(children) if attribute.has_children() => {
                let first = host.element_indices(plug)?.first().copied().unwrap_or(0);
                let element = plug.element(first);
                for (child, record) in attribute.children.iter().zip(children) {
                    apply_descriptor(host, &element.child(child.name.as_str()), record)?;
                }
            }
            _ => apply_elements(host, plug, &attribute, &tag, &descriptor.value)?,
        }
    } else if attribute.has_children() {
        match &descriptor.children {
            Some(children) => {
                for (child, record) in attribute.children.iter().zip(children) {
                    apply_descriptor(host, &plug.child(child.name.as_str()), record)?;
                }
            }
            None => fan_out(host, plug, &attribute, descriptor)?,
        }
    }

    let leaf = !aggregate && !attribute.has_children();
    if leaf && tag != TypeTag::Message && tag != TypeTag::Unsupported {
        if let Some(default) = &descriptor.default {
            let value = decode_json(&attribute, plug, default)?;
            host.set_default(plug, value)?;
        }
        if !descriptor.value.is_null() {
            let value = decode_json(&attribute, plug, &descriptor.value)?;
            with_unlocked(host, plug, |host| codec::set_value(host, plug, value, None))?;
        }
    }

    if attribute.supports_bounds() {
        for bound in [Bound::Min, Bound::Max, Bound::SoftMin, Bound::SoftMax] {
            if let Some(limit) = descriptor.bound(bound) {
                host.set_bound(plug, bound, limit)?;
            }
        }
    }

    if descriptor.channel_box {
        host.set_channel_box(plug, true)?;
    }
    if descriptor.keyable {
        host.set_keyable(plug, true)?;
    }
    if descriptor.locked {
        host.set_locked(plug, true)?;
    }
    Ok(())
}

/// Write an array's value list, reusing the target's logical indices when the
/// counts agree and filling `0..n` otherwise
fn apply_elements<H: SceneHost + ?Sized>(
    host: &mut H,
    plug: &Plug,
    attribute: &Attribute,
    tag: &TypeTag,
    json: &Json,
) -> Result<()> {
    let TypeTag::Array(element_tag) = tag else {
        return Ok(());
    };
    if matches!(**element_tag, TypeTag::Message | TypeTag::Unsupported) {
        return Ok(());
    }
    let Some(items) = json.as_array() else {
        return Ok(());
    };
    let existing = host.element_indices(plug)?;
    let indices: Vec<u32> = if existing.len() == items.len() {
        existing
    } else {
        (0..).take(items.len()).collect()
    };
    for (index, item) in indices.into_iter().zip(items) {
        if item.is_null() {
            continue;
        }
        let element = plug.element(index);
        let value = decode_json(attribute, &element, item)?;
        with_unlocked(host, &element, |host| codec::set_value(host, &element, value, None))?;
    }
    Ok(())
}

/// Spread flat `value` / `default` lists over the children, one entry each
fn fan_out<H: SceneHost + ?Sized>(
    host: &mut H,
    plug: &Plug,
    attribute: &Attribute,
    descriptor: &AttributeDescriptor,
) -> Result<()> {
    let count = attribute.children.len();
    let spread = |json: Option<&Json>| {
        json.and_then(Json::as_array)
            .filter(|items| items.len() == count)
            .cloned()
    };
    let values = spread(Some(&descriptor.value));
    let defaults = spread(descriptor.default.as_ref());
    if values.is_none() && defaults.is_none() {
        return Ok(());
    }

    for (position, child) in attribute.children.iter().enumerate() {
        let child_plug = plug.child(child.name.as_str());
        let mut record = AttributeDescriptor::new(child_plug.path_name(), classify(child));
        if let Some(values) = &values {
            record.value = values[position].clone();
        }
        record.default = defaults.as_ref().map(|d| d[position].clone());
        apply_descriptor(host, &child_plug, &record)?;
    }
    Ok(())
}
