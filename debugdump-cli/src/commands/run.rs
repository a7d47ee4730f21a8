use std::path::Path;

use anyhow::Context;
use debugdump::{
    dump::DumpConfig,
    harness::{DebuggerTests, TestCase},
    session::Process,
};
use serde::Serialize;

use crate::{
    app::GlobalOptions,
    output::{print_output, write_document},
    scenario::{DumpKind, DumpRequest, Scenario},
};

#[derive(Debug, Serialize)]
struct RunOutput {
    name: String,
    dumps: usize,
    events: usize,
    document: String,
}

pub fn run(
    path: &Path,
    legacy: bool,
    output: Option<&Path>,
    opts: &GlobalOptions,
) -> anyhow::Result<()> {
    let scenario = Scenario::load(path)?;
    let (document, events) = render(&scenario, legacy)?;

    if opts.json {
        let out = RunOutput {
            name: scenario.name.clone(),
            dumps: scenario.dumps.len(),
            events,
            document,
        };
        return print_output(&out, opts, |_| {});
    }
    write_document(&document, output)
}

/// Run `scenario` and render its document; also returns the number of recorded events.
pub fn render(scenario: &Scenario, legacy: bool) -> anyhow::Result<(String, usize)> {
    let config = if legacy || scenario.legacy {
        DumpConfig::legacy()
    } else {
        DumpConfig::default()
    };

    let mut tests = DebuggerTests::new(config);
    if let Some(expand) = &scenario.expand {
        let names: Vec<&str> = expand.iter().map(String::as_str).collect();
        tests.expand_properties(&names)?;
    }

    let mut process = scenario.build_process()?;
    let mut test = tests.start_test(&scenario.name);
    let mut events = process.events().len();
    test.record_events(&mut process);

    for request in &scenario.dumps {
        dump(&mut test, &process, request)
            .with_context(|| format!("failed to dump {}", request.label))?;
    }

    process.exit();
    events += process.events().len();
    test.record_events(&mut process);
    tests.push(test);

    Ok((tests.to_xml()?, events))
}

fn dump(test: &mut TestCase, process: &Process, request: &DumpRequest) -> anyhow::Result<()> {
    let frame = process.selected_stack_frame()?;
    let value = frame.evaluate(request.expression());

    match request.kind {
        DumpKind::Value => test.object_dump_result(&request.label, value)?,
        DumpKind::Elements => match value.and_then(|value| value.array_elements()) {
            Ok(elements) => test.object_dump_values(&request.label, &elements),
            Err(error) => test.object_dump_result(&request.label, Err(error))?,
        },
        DumpKind::Type => match value {
            Ok(value) => test.object_dump_type(&request.label, value.debug_type()),
            Err(error) => test.object_dump_result(&request.label, Err(error))?,
        },
    }
    Ok(())
}
