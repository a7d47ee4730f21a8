//! JSON scenario files: a paused debuggee described as types, modules, locals and the dumps
//! to take of them.

use std::{fs, path::Path};

use anyhow::{anyhow, bail, Context};
use debugdump::{
    metadata::{
        token::Token,
        typesystem::{DebugType, PrimitiveData, PrimitiveKind, TypeBuilder, TypeResolver},
    },
    session::{PausedReason, Process},
    value::{ArrayData, ArrayDimensions, ObjectData, ValueData},
};
use serde::Deserialize;
use serde_json::Value as Json;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Name of the `<Test>` element
    pub name: String,
    /// Dump with the legacy configuration regardless of `--legacy`
    #[serde(default)]
    pub legacy: bool,
    /// Expanded descriptor properties; the configuration default when absent
    #[serde(default)]
    pub expand: Option<Vec<String>>,
    /// Types defined by the debuggee, in dependency order
    #[serde(default)]
    pub types: Vec<TypeDef>,
    /// Modules loaded after the core library
    #[serde(default)]
    pub modules: Vec<ModuleDef>,
    /// Debugger log messages received before the pause
    #[serde(default)]
    pub log: Vec<String>,
    /// Locals of the `Main` frame
    #[serde(default)]
    pub locals: Vec<LocalDef>,
    #[serde(default = "default_pause")]
    pub pause: String,
    pub dumps: Vec<DumpRequest>,
}

fn default_pause() -> String {
    PausedReason::Break.to_string()
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeDef {
    pub kind: TypeKind,
    #[serde(default)]
    pub namespace: String,
    pub name: String,
    pub module: String,
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default)]
    pub fields: Vec<MemberDef>,
    #[serde(default)]
    pub properties: Vec<MemberDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemberDef {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleDef {
    pub name: String,
    #[serde(default)]
    pub symbols: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocalDef {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub value: Json,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DumpKind {
    /// The value of the expression
    #[default]
    Value,
    /// One `<Item>` per array element of the expression
    Elements,
    /// The type descriptor of the expression's value
    Type,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DumpRequest {
    pub label: String,
    /// The evaluated expression; the label when absent
    #[serde(default)]
    pub expression: Option<String>,
    #[serde(default)]
    pub kind: DumpKind,
}

impl DumpRequest {
    pub fn expression(&self) -> &str {
        self.expression.as_deref().unwrap_or(&self.label)
    }
}

impl Scenario {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario: {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid scenario: {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Build the paused process the dumps are taken from.
    pub fn build_process(&self) -> anyhow::Result<Process> {
        let mut process = Process::start()?;
        for ty in &self.types {
            register_type(&process, ty)
                .with_context(|| format!("failed to define type {}", ty.name))?;
        }
        for module in &self.modules {
            process.load_module(&module.name, module.symbols)?;
        }
        for text in &self.log {
            process.log_message(text)?;
        }
        for local in &self.locals {
            let (token, data) = {
                let ty = process.resolve_type(&local.ty)?;
                let data = value_data(&ty, &local.value)
                    .with_context(|| format!("invalid value of local {}", local.name))?;
                (ty.token(), data)
            };
            process.add_local(&local.name, token, data)?;
        }

        let reason: PausedReason = self
            .pause
            .parse()
            .with_context(|| format!("unknown pause reason: {}", self.pause))?;
        process.pause(reason)?;
        Ok(process)
    }
}

fn resolve(process: &Process, name: &str) -> anyhow::Result<Token> {
    Ok(TypeResolver::new(process.registry())
        .resolve_name(name)?
        .token())
}

fn register_type(process: &Process, def: &TypeDef) -> anyhow::Result<()> {
    let builder = TypeBuilder::new(process.registry());
    let mut builder = match def.kind {
        TypeKind::Class => builder.class(&def.namespace, &def.name),
        TypeKind::Struct => builder.value_type(&def.namespace, &def.name),
        TypeKind::Interface => builder.interface(&def.namespace, &def.name),
    }
    .module(&def.module)?;

    if let Some(base) = &def.extends {
        builder = builder.extends(resolve(process, base)?)?;
    }
    for interface in &def.implements {
        builder = builder.implements(resolve(process, interface)?)?;
    }
    for field in &def.fields {
        builder = builder.field(&field.name, resolve(process, &field.ty)?)?;
    }
    for property in &def.properties {
        builder = builder.property(&property.name, resolve(process, &property.ty)?)?;
    }

    let registered = builder.build()?;
    log::debug!("defined {} as {}", registered.fullname(), registered.token);
    Ok(())
}

/// Convert a JSON value into data of type `ty`.
///
/// Arrays of rank `n` are nested `n` levels deep; objects map member names to values.
pub fn value_data(ty: &DebugType<'_>, json: &Json) -> anyhow::Result<ValueData> {
    if json.is_null() {
        return Ok(ValueData::Null);
    }

    if let Some(rank) = ty.array_rank() {
        let element_type = ty
            .element_type()
            .ok_or_else(|| anyhow!("array type {ty} has no element type"))?;
        let rank = rank as usize;
        let mut lengths = Vec::with_capacity(rank);
        let mut slots = Vec::new();
        flatten(json, rank, 0, &mut lengths, &mut slots)?;
        lengths.resize(rank, 0);

        let elements = slots
            .into_iter()
            .map(|slot| value_data(&element_type, slot))
            .collect::<anyhow::Result<Vec<_>>>()?;
        return Ok(ValueData::Array(ArrayData::new(
            ArrayDimensions::new(lengths),
            elements,
        )?));
    }

    if ty.is_string() {
        return match json {
            Json::String(text) => Ok(PrimitiveData::String(text.clone()).into()),
            _ => bail!("expected a string for {ty}, got {json}"),
        };
    }

    if let Some(kind) = ty.primitive_kind() {
        return Ok(primitive_data(kind, json)?.into());
    }

    let Json::Object(members) = json else {
        bail!("expected an object for {ty}, got {json}");
    };
    let mut object = ObjectData::new();
    for (name, member) in members {
        let (_, info) = ty
            .find_member(name)
            .ok_or_else(|| anyhow!("{ty} has no member {name}"))?;
        let member_type = ty.registry().describe(info.ty)?;
        object.insert(name, value_data(&member_type, member)?);
    }
    Ok(ValueData::Object(object))
}

fn flatten<'j>(
    json: &'j Json,
    rank: usize,
    depth: usize,
    lengths: &mut Vec<usize>,
    slots: &mut Vec<&'j Json>,
) -> anyhow::Result<()> {
    let Json::Array(items) = json else {
        bail!("expected a nested array of rank {rank}, got {json}");
    };

    match lengths.get(depth) {
        Some(&length) if length != items.len() => bail!(
            "ragged array: dimension {depth} has lengths {length} and {}",
            items.len()
        ),
        Some(_) => {}
        None => lengths.push(items.len()),
    }

    if depth + 1 == rank {
        slots.extend(items);
        return Ok(());
    }
    for item in items {
        flatten(item, rank, depth + 1, lengths, slots)?;
    }
    Ok(())
}

fn float(json: &Json) -> Option<f64> {
    match json {
        Json::String(text) => match text.as_str() {
            "NaN" => Some(f64::NAN),
            "Infinity" => Some(f64::INFINITY),
            "-Infinity" => Some(f64::NEG_INFINITY),
            _ => None,
        },
        _ => json.as_f64(),
    }
}

fn primitive_data(kind: PrimitiveKind, json: &Json) -> anyhow::Result<PrimitiveData> {
    let mismatch = || anyhow!("{json} is not a valid {}", kind.name());
    let signed = || json.as_i64().ok_or_else(mismatch);
    let unsigned = || json.as_u64().ok_or_else(mismatch);

    Ok(match kind {
        PrimitiveKind::Boolean => PrimitiveData::Boolean(json.as_bool().ok_or_else(mismatch)?),
        PrimitiveKind::Char => {
            let text = json.as_str().ok_or_else(mismatch)?;
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => PrimitiveData::Char(c),
                _ => return Err(mismatch()),
            }
        }
        PrimitiveKind::I1 => PrimitiveData::I1(i8::try_from(signed()?)?),
        PrimitiveKind::U1 => PrimitiveData::U1(u8::try_from(unsigned()?)?),
        PrimitiveKind::I2 => PrimitiveData::I2(i16::try_from(signed()?)?),
        PrimitiveKind::U2 => PrimitiveData::U2(u16::try_from(unsigned()?)?),
        PrimitiveKind::I4 => PrimitiveData::I4(i32::try_from(signed()?)?),
        PrimitiveKind::U4 => PrimitiveData::U4(u32::try_from(unsigned()?)?),
        PrimitiveKind::I8 => PrimitiveData::I8(signed()?),
        PrimitiveKind::U8 => PrimitiveData::U8(unsigned()?),
        PrimitiveKind::I => PrimitiveData::I(signed()?),
        PrimitiveKind::U => PrimitiveData::U(unsigned()?),
        #[allow(clippy::cast_possible_truncation)]
        PrimitiveKind::R4 => PrimitiveData::R4(float(json).ok_or_else(mismatch)? as f32),
        PrimitiveKind::R8 => PrimitiveData::R8(float(json).ok_or_else(mismatch)?),
    })
}
