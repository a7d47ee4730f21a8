use crate::{
    metadata::typesystem::{PrimitiveData, PrimitiveKind, TypeBuilder},
    session::{PausedReason, Process},
    value::{ObjectData, ValueData},
};

/// A process paused at `Debugger.Break()` with `int[] array = { 0, 1, 2, 3, 4 }` in scope
pub fn array_value_process() -> Process {
    let mut process = Process::start().unwrap();
    process.load_module("ArrayValue.exe", true).unwrap();

    let int_array = process.resolve_type("int[]").unwrap().token();
    let elements = (0..5).map(|i| PrimitiveData::I4(i).into()).collect();
    process
        .add_local("array", int_array, ValueData::array(elements))
        .unwrap();
    process.pause(PausedReason::Break).unwrap();
    process
}

/// A process with a `Point { x, y }` struct local named `point` and a `Point[]` named `points`
pub fn point_process() -> Process {
    let mut process = Process::start().unwrap();
    process.load_module("Points.exe", true).unwrap();

    let point = TypeBuilder::new(process.registry())
        .value_type("Points", "Point")
        .module("Points.exe")
        .unwrap()
        .field("x", PrimitiveKind::I4.token())
        .unwrap()
        .field("y", PrimitiveKind::I4.token())
        .unwrap()
        .build()
        .unwrap()
        .token;
    let points = process.resolve_type("Points.Point[]").unwrap().token();

    let at = |x: i32, y: i32| {
        ValueData::Object(
            ObjectData::new()
                .with("x", PrimitiveData::I4(x).into())
                .with("y", PrimitiveData::I4(y).into()),
        )
    };
    process.add_local("point", point, at(1, 2)).unwrap();
    process
        .add_local("points", points, ValueData::array(vec![at(3, 4), at(5, 6)]))
        .unwrap();
    process.pause(PausedReason::Breakpoint).unwrap();
    process
}

#[test]
fn test_fixture_processes() {
    let process = array_value_process();
    let frame = process.selected_stack_frame().unwrap();
    assert_eq!(frame.local_variable_names().collect::<Vec<_>>(), vec!["array"]);

    let process = point_process();
    let frame = process.selected_stack_frame().unwrap();
    assert_eq!(frame.evaluate("points[1].y").unwrap().as_string(), "6");
    assert_eq!(frame.evaluate("point.x").unwrap().expression(), "point.x");
    assert_eq!(
        frame.evaluate("points[1].y").unwrap().expression(),
        "points[1].y"
    );
}
