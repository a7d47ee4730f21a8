extern crate debugdump;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use debugdump::prelude::*;
use std::hint::black_box;

fn array_process(len: i32) -> Process {
    let mut process = Process::start().unwrap();
    let int_array = process.resolve_type("int[]").unwrap().token();
    let elements = (0..len).map(|i| PrimitiveData::I4(i).into()).collect();
    process
        .add_local("array", int_array, ValueData::array(elements))
        .unwrap();
    process.pause(PausedReason::Break).unwrap();
    process
}

/// Benchmark dumping an int array with every element expanded
///
/// Compares building the dump tree alone against building and rendering it to XML.
fn bench_dump_array(c: &mut Criterion) {
    const LEN: i32 = 1_000;

    let process = array_process(LEN);
    let frame = process.selected_stack_frame().unwrap();
    let array = frame.local_variable_value("array").unwrap();
    let dumper = ObjectDumper::new(DumpConfig::default());

    let mut group = c.benchmark_group("dump_array");
    group.throughput(Throughput::Elements(LEN as u64));
    group.bench_function("dump_value", |b| {
        b.iter(|| black_box(dumper.dump_value(black_box(&array))));
    });
    group.bench_function("dump_value_to_xml", |b| {
        b.iter(|| {
            let node = dumper.dump_value(black_box(&array));
            black_box(to_xml(&node).unwrap())
        });
    });
    group.finish();
}

/// Benchmark dumping type descriptors with their whole BaseType chain expanded
fn bench_dump_type(c: &mut Criterion) {
    let process = Process::start().unwrap();
    let dumper = ObjectDumper::new(DumpConfig::verbose());

    let mut group = c.benchmark_group("dump_type");
    group.bench_function("resolve_and_dump", |b| {
        b.iter(|| {
            let ty = process.resolve_type(black_box("System.Int32[,][]")).unwrap();
            black_box(dumper.dump_type(&ty))
        });
    });
    group.finish();
}

/// Benchmark the golden-output document of the ArrayValue scenario
fn bench_document(c: &mut Criterion) {
    c.bench_function("array_value_document", |b| {
        b.iter(|| {
            let mut process = array_process(5);
            let mut tests = DebuggerTests::new(DumpConfig::legacy());
            let mut test = tests.start_test("ArrayValue.cs");
            test.record_events(&mut process);
            {
                let frame = process.selected_stack_frame().unwrap();
                let array = frame.local_variable_value("array").unwrap();
                test.object_dump_value("array", &array);
                test.object_dump_values("array elements", &array.array_elements().unwrap());
                test.object_dump_type("type", array.debug_type());
            }
            tests.push(test);
            black_box(tests.to_xml().unwrap())
        });
    });
}

criterion_group!(benches, bench_dump_array, bench_dump_type, bench_document);
criterion_main!(benches);
