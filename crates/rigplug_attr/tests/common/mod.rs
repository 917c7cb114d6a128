// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use rigplug_scene::{
    Attribute, DataKind, EnumSpec, Node, NodeId, NodeType, NumericKind, SceneGraph, UnitKind,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Route `tracing` output to the test harness. Safe to call from every test.
pub fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("rigplug_attr=debug"));
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

/// A control node type carrying one attribute of every portable kind
pub fn control_type() -> NodeType {
    NodeType::new("rigControl")
        .with_attribute(Attribute::numeric("visible", NumericKind::Boolean).keyable())
        .with_attribute(Attribute::numeric("count", NumericKind::Int))
        .with_attribute(Attribute::numeric("weight", NumericKind::Float))
        .with_attribute(Attribute::numeric("amount", NumericKind::Double).with_range(-5.0, 5.0))
        .with_attribute(Attribute::numeric("uv", NumericKind::Float2))
        .with_attribute(Attribute::numeric("translate", NumericKind::Double3).keyable())
        .with_attribute(Attribute::numeric("orient", NumericKind::Double4))
        .with_attribute(Attribute::enumeration(
            "space",
            EnumSpec::new([(0, "world"), (1, "local"), (3, "parent")]).with_max(5),
        ))
        .with_attribute(Attribute::typed("label", DataKind::String))
        .with_attribute(Attribute::unit("rotateX", UnitKind::Angle))
        .with_attribute(Attribute::unit("length", UnitKind::Distance))
        .with_attribute(Attribute::unit("delay", UnitKind::Time))
        .with_attribute(Attribute::matrix("offsetMatrix"))
        .with_attribute(Attribute::message("message"))
        .with_attribute(Attribute::message("driver"))
        .with_attribute(Attribute::numeric("weights", NumericKind::Double).array())
        .with_attribute(Attribute::typed("ids", DataKind::IntArray))
        .with_attribute(Attribute::compound(
            "settings",
            vec![
                Attribute::numeric("gain", NumericKind::Double),
                Attribute::typed("tag", DataKind::String),
            ],
        ))
        .with_attribute(Attribute::compound(
            "pivot",
            vec![
                Attribute::numeric("pivotX", NumericKind::Double),
                Attribute::numeric("pivotY", NumericKind::Double),
                Attribute::numeric("pivotZ", NumericKind::Double),
            ],
        ))
        .with_attribute(Attribute::typed("inMesh", DataKind::Mesh))
}

/// Scene holding `count` control nodes named `ctrl0`, `ctrl1`, ...
pub fn control_scene(count: usize) -> (SceneGraph, Vec<NodeId>) {
    let control = control_type();
    let mut scene = SceneGraph::new("rig");
    let ids = (0..count)
        .map(|i| scene.add_node(Node::new(&control, format!("ctrl{i}"))))
        .collect();
    (scene, ids)
}
