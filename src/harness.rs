//! Golden-output test documents.
//!
//! [`DebuggerTests`] collects [`TestCase`]s and renders them as a `<DebuggerTests>` XML
//! document. A test case records, in order, the events of a [`Process`] and labelled object
//! dumps; each dump is wrapped in an element named after its label.
//!
//! # Examples
//!
//! ```rust
//! use debugdump::dump::DumpConfig;
//! use debugdump::harness::DebuggerTests;
//! use debugdump::session::{PausedReason, Process};
//!
//! let mut tests = DebuggerTests::new(DumpConfig::legacy());
//! tests.expand_properties(&["DebugType.BaseType"])?;
//!
//! let mut process = Process::start()?;
//! process.pause(PausedReason::Break)?;
//!
//! let mut test = tests.start_test("Types.cs");
//! test.record_events(&mut process);
//! test.object_dump_type("type", &process.resolve_type("System.Object")?);
//! process.exit();
//! test.record_events(&mut process);
//! tests.push(test);
//!
//! let xml = tests.to_xml()?;
//! assert!(xml.contains("<BaseType>null</BaseType>"));
//! assert!(xml.ends_with("    <ProcessExited />\n  </Test>\n</DebuggerTests>"));
//! # Ok::<(), debugdump::Error>(())
//! ```

use crate::{
    dump::{
        format_exception, tag_name, DumpConfig, DumpNode, ExpandedProperties, ObjectDumper,
        XmlDumpWriter,
    },
    metadata::typesystem::DebugType,
    session::{DebuggerEvent, Process},
    value::Value,
    Result,
};

/// One `<Test>` element
pub struct TestCase {
    name: String,
    dumper: ObjectDumper,
    nodes: Vec<DumpNode>,
}

impl TestCase {
    /// An empty test case dumping with the given configuration
    #[must_use]
    pub fn new(name: &str, config: DumpConfig) -> Self {
        TestCase {
            name: name.to_string(),
            dumper: ObjectDumper::new(config),
            nodes: Vec::new(),
        }
    }

    /// The test name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn label(&self, label: &str) -> DumpNode {
        DumpNode::new(&tag_name(label, self.dumper.config().keep_dots_in_tags))
    }

    /// Record the events the process has produced since the last call
    pub fn record_events(&mut self, process: &mut Process) {
        for event in process.take_events() {
            self.record_event(&event);
        }
    }

    /// Record a single event
    pub fn record_event(&mut self, event: &DebuggerEvent) {
        let node = match event.payload() {
            Some(payload) => DumpNode::text(event.name(), &payload),
            None => DumpNode::new(event.name()),
        };
        self.nodes.push(node);
    }

    /// Dump a value under `label`
    pub fn object_dump_value(&mut self, label: &str, value: &Value<'_>) {
        let node = self.label(label).with_children(vec![self.dumper.dump_value(value)]);
        self.nodes.push(node);
    }

    /// Dump a sequence of values under `label`, one `<Item>` per value
    pub fn object_dump_values(&mut self, label: &str, values: &[Value<'_>]) {
        let node = self.label(label).with_children(self.dumper.dump_values(values));
        self.nodes.push(node);
    }

    /// Dump a type descriptor under `label`
    pub fn object_dump_type(&mut self, label: &str, ty: &DebugType<'_>) {
        let node = self.label(label).with_children(vec![self.dumper.dump_type(ty)]);
        self.nodes.push(node);
    }

    /// Dump the outcome of an evaluation under `label`.
    ///
    /// Failures are rendered as `{Exception: <message>}` text.
    ///
    /// # Errors
    /// Returns fatal session errors instead of rendering them.
    pub fn object_dump_result(&mut self, label: &str, result: Result<Value<'_>>) -> Result<()> {
        match result {
            Ok(value) => self.object_dump_value(label, &value),
            Err(error) if error.is_fatal() => return Err(error),
            Err(error) => {
                log::debug!("dumping failure of '{label}': {error}");
                let mut node = self.label(label);
                node.push(DumpNode::text("Exception", &format_exception(&error)));
                self.nodes.push(node);
            }
        }
        Ok(())
    }

    /// The `<Test>` element
    #[must_use]
    pub fn to_node(&self) -> DumpNode {
        DumpNode::new("Test")
            .with_attribute("name", self.name.as_str())
            .with_children(self.nodes.clone())
    }
}

/// A `<DebuggerTests>` document
pub struct DebuggerTests {
    config: DumpConfig,
    tests: Vec<TestCase>,
}

impl DebuggerTests {
    /// An empty document
    #[must_use]
    pub fn new(config: DumpConfig) -> Self {
        DebuggerTests {
            config,
            tests: Vec::new(),
        }
    }

    /// The configuration new test cases start with
    #[must_use]
    pub fn config(&self) -> &DumpConfig {
        &self.config
    }

    /// Set the descriptor properties expanded by test cases started from now on
    ///
    /// # Errors
    /// Returns an error for unknown property names.
    pub fn expand_properties(&mut self, names: &[&str]) -> Result<()> {
        let mut expanded = ExpandedProperties::empty();
        for name in names {
            expanded |= ExpandedProperties::from_property_name(name)
                .ok_or_else(|| malformed_error!("Unknown expandable property {}", name))?;
        }

        self.config.expanded_properties = expanded;
        Ok(())
    }

    /// Start a test case with the current configuration
    #[must_use]
    pub fn start_test(&self, name: &str) -> TestCase {
        log::debug!("starting test {name}");
        TestCase::new(name, self.config)
    }

    /// Add a finished test case
    pub fn push(&mut self, test: TestCase) {
        self.tests.push(test);
    }

    /// The test cases, in order
    #[must_use]
    pub fn tests(&self) -> &[TestCase] {
        &self.tests
    }

    /// The `<DebuggerTests>` element
    #[must_use]
    pub fn to_node(&self) -> DumpNode {
        DumpNode::new("DebuggerTests").with_children(self.tests.iter().map(TestCase::to_node).collect())
    }

    /// The whole document, including the XML declaration
    ///
    /// # Errors
    /// Returns [`crate::Error::Xml`] if writing fails.
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = XmlDumpWriter::new();
        writer.declaration()?;
        writer.write_node(&self.to_node())?;
        writer.into_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        test::{array_value_process, point_process},
        Error,
    };

    #[test]
    fn test_labels_become_tags() {
        let process = point_process();
        let frame = process.selected_stack_frame().unwrap();
        let value = frame.evaluate("point.x").unwrap();

        let mut legacy = TestCase::new("t", DumpConfig::legacy());
        legacy.object_dump_value("point.x", &value);
        let mut default = TestCase::new("t", DumpConfig::default());
        default.object_dump_value("point.x", &value);

        assert_eq!(legacy.to_node().children()[0].name(), "point.x");
        assert_eq!(default.to_node().children()[0].name(), "point_x");
    }

    #[test]
    fn test_dump_result() {
        let process = array_value_process();
        let frame = process.selected_stack_frame().unwrap();

        let mut test = TestCase::new("t", DumpConfig::default());
        test.object_dump_result("array", frame.evaluate("array"))
            .unwrap();
        test.object_dump_result("missing", frame.evaluate("missing"))
            .unwrap();

        let node = test.to_node();
        assert!(node.children()[0].child("Value").is_some());
        let exception = node.children()[1].child("Exception").unwrap();
        assert_eq!(
            exception.text_content(),
            Some("{Exception: Local variable missing not found}")
        );

        assert!(matches!(
            test.object_dump_result("gone", Err(Error::ProcessExited)),
            Err(Error::ProcessExited)
        ));
    }

    #[test]
    fn test_unknown_property() {
        let mut tests = DebuggerTests::new(DumpConfig::default());
        assert!(tests.expand_properties(&["DebugType.Nope"]).is_err());
        tests
            .expand_properties(&["DebugType.Interfaces", "DebugType.ElementType"])
            .unwrap();
        assert_eq!(
            tests.config().expanded_properties,
            ExpandedProperties::INTERFACES | ExpandedProperties::ELEMENT_TYPE
        );
    }
}
