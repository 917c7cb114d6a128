// SPDX-License-Identifier: MIT OR Apache-2.0
//! Writing a value through a plug and reading it back gives the same value.

mod common;

use rigplug_attr::{get_value, set_value, EditTransaction, RigplugConfig, TypeTag};
use rigplug_scene::{EvaluationContext, Plug, SceneHost, Unit, UnitValue, Value};

fn read(scene: &impl SceneHost, plug: &Plug) -> (Option<TypeTag>, Option<Value>) {
    let sample = get_value(scene, plug, &EvaluationContext::current());
    (sample.tag().cloned(), sample.value())
}

#[test]
fn test_roundtrip_every_tag() {
    common::init_tracing();
    let (mut scene, ids) = common::control_scene(1);
    let id = ids[0];
    let epsilon = RigplugConfig::default().float_epsilon;

    let mut matrix = Value::IDENTITY;
    matrix[12] = 4.0;
    matrix[13] = -1.5;

    let cases = vec![
        ("visible", TypeTag::Bool, Value::Bool(false)),
        ("count", TypeTag::Int, Value::Int(-42)),
        ("weight", TypeTag::Float, Value::Float(0.125)),
        ("amount", TypeTag::Double, Value::Double(3.25)),
        ("uv", TypeTag::Vector2, Value::Vector2([0.25, 0.75])),
        ("translate", TypeTag::Vector3, Value::Vector3([1.0, -2.0, 3.5])),
        ("orient", TypeTag::Vector4, Value::Vector4([0.0, 0.0, 0.0, 1.0])),
        ("space", TypeTag::Enum, Value::Enum(3)),
        ("label", TypeTag::String, Value::String("L_arm_ctrl".into())),
        ("rotateX", TypeTag::Angle, Value::Unit(UnitValue::new(90.0, Unit::Degrees))),
        ("length", TypeTag::Distance, Value::Unit(UnitValue::new(2.5, Unit::Meters))),
        ("delay", TypeTag::Time, Value::Unit(UnitValue::new(12.0, Unit::Film))),
        ("offsetMatrix", TypeTag::Matrix, Value::Matrix(matrix)),
        (
            "ids",
            TypeTag::Array(Box::new(TypeTag::Int)),
            Value::List(vec![Value::Int(3), Value::Int(1), Value::Int(4)]),
        ),
        (
            "settings",
            TypeTag::Compound,
            Value::List(vec![Value::Double(0.5), Value::String("ik".into())]),
        ),
    ];

    for (name, tag, value) in cases {
        let plug = Plug::new(id, name);
        set_value(&mut scene, &plug, value.clone(), None).unwrap();
        let (read_tag, read_value) = read(&scene, &plug);
        assert_eq!(read_tag, Some(tag), "tag of {name}");
        let read_value = read_value.unwrap();
        assert!(
            read_value.approx_eq(&value, epsilon),
            "{name}: wrote {value}, read {read_value}"
        );
    }
}

#[test]
fn test_unit_magnitude_and_unit_survive() {
    let (mut scene, ids) = common::control_scene(1);
    let plug = Plug::new(ids[0], "rotateX");
    set_value(&mut scene, &plug, Value::Unit(UnitValue::new(30.0, Unit::Degrees)), None).unwrap();
    let (_, value) = read(&scene, &plug);
    let Some(Value::Unit(unit_value)) = value else {
        panic!("expected a unit value, got {value:?}");
    };
    assert_eq!(unit_value.unit, Unit::Degrees);
    assert!((unit_value.magnitude - 30.0).abs() < 1e-12);
}

#[test]
fn test_message_roundtrip() {
    let (mut scene, ids) = common::control_scene(2);
    let driver = Plug::new(ids[0], "driver");
    assert_eq!(read(&scene, &driver), (Some(TypeTag::Message), Some(Value::Message(None))));

    set_value(&mut scene, &driver, Value::Plug(Plug::new(ids[1], "message")), None).unwrap();
    assert_eq!(read(&scene, &driver).1, Some(Value::Message(Some(ids[1]))));

    set_value(&mut scene, &driver, Value::Message(None), None).unwrap();
    assert_eq!(read(&scene, &driver).1, Some(Value::Message(None)));
}

#[test]
fn test_sparse_array_roundtrip() {
    let (mut scene, ids) = common::control_scene(1);
    let weights = Plug::new(ids[0], "weights");
    scene.set_value(&weights.element(0), Value::Double(0.0)).unwrap();
    scene.set_value(&weights.element(4), Value::Double(0.0)).unwrap();

    let value = Value::List(vec![Value::Double(0.3), Value::Double(0.7)]);
    set_value(&mut scene, &weights, value.clone(), None).unwrap();
    assert_eq!(read(&scene, &weights), (Some(TypeTag::Array(Box::new(TypeTag::Double))), Some(value)));
}

#[test]
fn test_deferred_writes_apply_in_order() {
    let (mut scene, ids) = common::control_scene(1);
    let amount = Plug::new(ids[0], "amount");
    let translate = Plug::new(ids[0], "translate");

    let mut tx = EditTransaction::new();
    set_value(&mut scene, &amount, Value::Double(1.0), Some(&mut tx)).unwrap();
    set_value(&mut scene, &translate, Value::Vector3([1.0, 1.0, 1.0]), Some(&mut tx)).unwrap();
    set_value(&mut scene, &amount, Value::Double(2.0), Some(&mut tx)).unwrap();
    assert_eq!(tx.len(), 5);
    assert_eq!(read(&scene, &amount).1, Some(Value::Double(0.0)));

    tx.apply(&mut scene).unwrap();
    assert_eq!(read(&scene, &amount).1, Some(Value::Double(2.0)));
    assert_eq!(read(&scene, &translate).1, Some(Value::Vector3([1.0, 1.0, 1.0])));
}

#[test]
fn test_unsupported_reads_as_nothing() {
    let (scene, ids) = common::control_scene(1);
    assert_eq!(read(&scene, &Plug::new(ids[0], "inMesh")), (None, None));
}
