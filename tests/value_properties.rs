//! Behavioural properties of values, descriptors and dumps observed through the public API.

use debugdump::{
    dump::{format_exception, ExpandedProperties, TypeAttribute, ValueAttribute},
    prelude::*,
    value::ArrayDimensions,
};
use strum::IntoEnumIterator;

fn paused_with(locals: &[(&str, &str, ValueData)]) -> Process {
    let mut process = Process::start().unwrap();
    for (name, ty, data) in locals {
        let token = process.resolve_type(ty).unwrap().token();
        process.add_local(name, token, data.clone()).unwrap();
    }
    process.pause(PausedReason::Breakpoint).unwrap();
    process
}

fn ints(values: impl IntoIterator<Item = i32>) -> Vec<ValueData> {
    values
        .into_iter()
        .map(|value| PrimitiveData::I4(value).into())
        .collect()
}

#[test]
fn non_array_accessors_share_one_failure() {
    let process = paused_with(&[
        ("n", "int", PrimitiveData::I4(7).into()),
        ("s", "string", PrimitiveData::String("text".into()).into()),
    ]);
    let frame = process.selected_stack_frame().unwrap();

    for name in ["n", "s"] {
        let value = frame.local_variable_value(name).unwrap();
        let failures = [
            format_exception(&value.array_elements().unwrap_err()),
            format_exception(&value.array_dimensions().unwrap_err()),
            format_exception(&value.array_length().unwrap_err()),
            format_exception(&value.array_rank().unwrap_err()),
        ];
        for failure in &failures {
            assert_eq!(failure, "{Exception: Value is not an array}");
        }
        assert_eq!(value.array_rank().unwrap_err().category(), ErrorCategory::KindMismatch);
    }
}

#[test]
fn array_length_matches_element_count() {
    for n in [0, 1, 5, 17] {
        let process = paused_with(&[("a", "int[]", ValueData::array(ints(0..n)))]);
        let frame = process.selected_stack_frame().unwrap();
        let array = frame.local_variable_value("a").unwrap();

        assert_eq!(array.array_length().unwrap(), n as usize);
        assert_eq!(array.array_elements().unwrap().len(), n as usize);
        assert_eq!(array.get_member_value("Length").unwrap().as_string(), n.to_string());
    }
}

#[test]
fn multi_dimensional_elements_are_row_major() {
    let mut process = Process::start().unwrap();
    let grid = process.resolve_type("int[,]").unwrap().token();
    let data = ArrayData::new(ArrayDimensions::new(vec![2, 3]), ints(0..6)).unwrap();
    process
        .add_local("grid", grid, ValueData::Array(data))
        .unwrap();
    process.pause(PausedReason::Break).unwrap();

    let frame = process.selected_stack_frame().unwrap();
    let grid = frame.local_variable_value("grid").unwrap();
    let expressions: Vec<String> = grid
        .array_elements()
        .unwrap()
        .iter()
        .map(|element| element.expression().to_string())
        .collect();

    assert_eq!(
        expressions,
        vec![
            "grid[0, 0]",
            "grid[0, 1]",
            "grid[0, 2]",
            "grid[1, 0]",
            "grid[1, 1]",
            "grid[1, 2]"
        ]
    );
    assert_eq!(grid.array_dimensions().unwrap().to_string(), "[2, 3]");
    assert_eq!(frame.evaluate("grid[1, 2]").unwrap().as_string(), "5");
    assert!(matches!(
        frame.evaluate("grid[1]"),
        Err(Error::ArrayRankMismatch { rank: 2, given: 1 })
    ));
    assert!(frame.evaluate("grid[2, 0]").is_err());
}

#[test]
fn attributes_are_alphabetical_and_complete() {
    let process = paused_with(&[("a", "int[]", ValueData::array(ints(0..2)))]);
    let frame = process.selected_stack_frame().unwrap();
    let array = frame.local_variable_value("a").unwrap();
    let dumper = ObjectDumper::new(DumpConfig::legacy());

    let value = dumper.dump_value(&array);
    let names: Vec<&str> = value.attributes().keys().map(String::as_str).collect();
    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(names, sorted);
    assert_eq!(names.len(), ValueAttribute::iter().count());
    assert!(names.contains(&"ArrayLenght"));

    let ty = dumper.dump_type(array.debug_type());
    assert_eq!(ty.attributes().len(), TypeAttribute::iter().count());
}

#[test]
fn repeated_dumps_are_identical() {
    let process = paused_with(&[("a", "int[]", ValueData::array(ints(0..5)))]);
    let frame = process.selected_stack_frame().unwrap();
    let array = frame.local_variable_value("a").unwrap();
    let dumper = ObjectDumper::new(DumpConfig::verbose());

    let first = to_xml(&dumper.dump_value(&array)).unwrap();
    let second = to_xml(&dumper.dump_value(&array)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn base_chains_terminate_at_object() {
    let process = Process::start().unwrap();
    for name in ["int[]", "string", "int", "System.Enum", "int[,][]"] {
        let ty = process.resolve_type(name).unwrap();
        let chain: Vec<String> = ty.base_chain().map(|base| base.full_name()).collect();
        assert!(chain.len() < 8, "{name}: {chain:?}");
        assert_eq!(chain.last().map(String::as_str), Some("System.Object"));
    }

    for name in ["System.Collections.IList", "int*"] {
        let ty = process.resolve_type(name).unwrap();
        assert_eq!(ty.base_chain().count(), 1);
    }
}

#[test]
fn array_type_dump_expands_base_chain() {
    let process = Process::start().unwrap();
    let ty = process.resolve_type("System.Int32[]").unwrap();
    let mut config = DumpConfig::legacy();
    config.expanded_properties = ExpandedProperties::BASE_TYPE;

    let node = ObjectDumper::new(config).dump_type(&ty);
    assert_eq!(node.attribute("IsArray"), Some("True"));
    assert_eq!(node.attribute("IsClass"), Some("False"));

    let array = node.child("BaseType").and_then(|base| base.child("DebugType")).unwrap();
    assert_eq!(array.attribute("FullName"), Some("System.Array"));
    let object = array
        .child("BaseType")
        .and_then(|base| base.child("DebugType"))
        .unwrap();
    assert_eq!(object.attribute("FullName"), Some("System.Object"));
    assert_eq!(
        object.child("BaseType").and_then(|base| base.text_content()),
        Some("null")
    );
}

#[test]
fn null_and_invalid_values_render() {
    let process = paused_with(&[("s", "string", ValueData::Null)]);
    let frame = process.selected_stack_frame().unwrap();
    let s = frame.local_variable_value("s").unwrap();

    assert!(s.is_null());
    assert_eq!(s.as_string(), "null");
    assert!(matches!(s.get_member_value("Length"), Err(Error::NullReference)));

    let dumper = ObjectDumper::new(DumpConfig::default());
    assert_eq!(
        dumper.value_attribute(&s, ValueAttribute::PrimitiveValue),
        "null"
    );
    assert_eq!(dumper.value_attribute(&s, ValueAttribute::IsNull), "True");
}

#[test]
fn unloaded_modules_do_not_resolve() {
    let mut process = Process::start().unwrap();
    let point = TypeBuilder::new(process.registry())
        .class("Shapes", "Point")
        .module("Shapes.dll")
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(point.fullname(), "Shapes.Point");

    assert!(matches!(
        process.resolve_type("Shapes.Point[]"),
        Err(Error::ModuleNotLoaded(_))
    ));
    process.load_module("Shapes.dll", false).unwrap();
    assert!(process.resolve_type("Shapes.Point[]").is_ok());
}

#[test]
fn control_characters_stay_well_formed() {
    let mut process = Process::start().unwrap();
    let key = TypeBuilder::new(process.registry())
        .value_type("App", "Key")
        .module("App.exe")
        .unwrap()
        .field("c", PrimitiveKind::Char.token())
        .unwrap()
        .build()
        .unwrap();
    process.load_module("App.exe", false).unwrap();
    let string = process.resolve_type("string").unwrap().token();
    process
        .add_local("k", key.token, ValueData::Object(ObjectData::new()))
        .unwrap();
    process
        .add_local("s", string, PrimitiveData::from("a\nb").into())
        .unwrap();
    process.pause(PausedReason::Break).unwrap();

    let frame = process.selected_stack_frame().unwrap();
    let dumper = ObjectDumper::default();

    let c = to_xml(&dumper.dump_value(&frame.evaluate("k.c").unwrap())).unwrap();
    assert!(!c.contains('\0'));
    assert!(c.contains("AsString=\"\\u0000\""));

    let s = to_xml(&dumper.dump_value(&frame.evaluate("s").unwrap())).unwrap();
    assert!(s.contains("AsString=\"a&#xA;b\""));
}
