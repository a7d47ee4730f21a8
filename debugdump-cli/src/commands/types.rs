use std::collections::BTreeMap;

use debugdump::{
    dump::{to_xml, DumpConfig, ExpandedProperties, ObjectDumper, TypeAttribute},
    metadata::typesystem::{TypeFlavor, TypeRegistry},
    session::Process,
};
use serde::Serialize;
use strum::IntoEnumIterator;

use crate::{
    app::GlobalOptions,
    output::{print_output, Align, TabWriter},
};

#[derive(Debug, Serialize)]
struct TypeDump {
    attributes: BTreeMap<String, String>,
    xml: String,
}

pub fn dump(name: &str, legacy: bool, expand: &[String], opts: &GlobalOptions) -> anyhow::Result<()> {
    let mut config = if legacy {
        DumpConfig::legacy()
    } else {
        DumpConfig::default()
    };
    for property in expand {
        config.expanded_properties |= ExpandedProperties::from_property_name(property)
            .ok_or_else(|| anyhow::anyhow!("unknown expandable property: {property}"))?;
    }

    let process = Process::start()?;
    let ty = process.resolve_type(name)?;
    let dumper = ObjectDumper::new(config);

    let output = TypeDump {
        attributes: TypeAttribute::iter()
            .map(|attribute| (attribute.to_string(), dumper.type_attribute(&ty, attribute)))
            .collect(),
        xml: to_xml(&dumper.dump_type(&ty))?,
    };

    print_output(&output, opts, |out| println!("{}", out.xml))
}

#[derive(Debug, Serialize)]
struct TypeEntry {
    token: String,
    kind: String,
    name: String,
    base: String,
}

#[derive(Debug, Serialize)]
struct TypesOutput {
    types: Vec<TypeEntry>,
    count: usize,
}

fn kind_name(flavor: TypeFlavor) -> String {
    match flavor {
        TypeFlavor::Void => "void".to_string(),
        TypeFlavor::Primitive(kind) => kind.keyword().unwrap_or("primitive").to_string(),
        TypeFlavor::String => "string".to_string(),
        TypeFlavor::Class => "class".to_string(),
        TypeFlavor::ValueType => "struct".to_string(),
        TypeFlavor::Interface => "interface".to_string(),
        TypeFlavor::Array { rank } => format!("array({rank})"),
        TypeFlavor::Pointer => "pointer".to_string(),
    }
}

pub fn list(namespace: Option<&str>, opts: &GlobalOptions) -> anyhow::Result<()> {
    let registry = TypeRegistry::new()?;

    let mut entries = Vec::new();
    for ty in registry.all_types() {
        if let Some(ns) = namespace {
            if ty.namespace != ns {
                continue;
            }
        }

        let base = ty
            .base
            .and_then(|token| registry.get(&token))
            .map_or_else(|| "-".to_string(), |base| base.fullname());

        entries.push(TypeEntry {
            token: ty.token.to_string(),
            kind: kind_name(ty.flavor),
            name: ty.fullname(),
            base,
        });
    }

    let count = entries.len();
    let output = TypesOutput {
        types: entries,
        count,
    };

    print_output(&output, opts, |out| {
        let mut tw = TabWriter::new(vec![
            ("Token", Align::Right),
            ("Kind", Align::Left),
            ("Name", Align::Left),
            ("Base", Align::Left),
        ]);
        for e in &out.types {
            tw.row(vec![
                e.token.clone(),
                e.kind.clone(),
                e.name.clone(),
                e.base.clone(),
            ]);
        }
        tw.print();
        println!("\n{} type(s) listed.", out.count);
    })
}
