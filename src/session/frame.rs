use crate::{
    metadata::{token::Token, typesystem::TypeRegistry},
    session::expression::Expression,
    value::{Value, ValueData},
    Error::LocalVariableNotFound,
    Result,
};

/// A local variable captured with its frame
#[derive(Debug, Clone)]
pub struct LocalVariable {
    /// Variable name
    pub name: String,
    /// Declared type
    pub ty: Token,
    /// Captured data
    pub data: ValueData,
}

/// The captured state of one stack frame
#[derive(Debug, Clone, Default)]
pub struct FrameData {
    /// Name of the executing method
    pub method: String,
    /// Locals, in declaration order
    pub locals: Vec<LocalVariable>,
}

/// A stack frame of the paused debuggee
#[derive(Clone, Copy)]
pub struct StackFrame<'p> {
    registry: &'p TypeRegistry,
    data: &'p FrameData,
}

impl<'p> StackFrame<'p> {
    pub(crate) fn new(registry: &'p TypeRegistry, data: &'p FrameData) -> Self {
        StackFrame { registry, data }
    }

    /// Name of the executing method
    #[must_use]
    pub fn method_name(&self) -> &'p str {
        &self.data.method
    }

    /// Names of the locals, in declaration order
    pub fn local_variable_names(&self) -> impl Iterator<Item = &'p str> {
        self.data.locals.iter().map(|local| local.name.as_str())
    }

    /// The value of a local variable
    ///
    /// # Errors
    /// Returns [`LocalVariableNotFound`] if the frame has no local of that name.
    pub fn local_variable_value(&self, name: &str) -> Result<Value<'p>> {
        let local = self
            .data
            .locals
            .iter()
            .find(|local| local.name == name)
            .ok_or_else(|| LocalVariableNotFound(name.to_string()))?;

        Value::new(self.registry.describe(local.ty)?, &local.name, local.data.clone())
    }

    /// The values of all locals, in declaration order
    ///
    /// # Errors
    /// Returns an error if a captured local does not fit its type.
    pub fn local_variables(&self) -> Result<Vec<Value<'p>>> {
        self.data
            .locals
            .iter()
            .map(|local| self.local_variable_value(&local.name))
            .collect()
    }

    /// Evaluate an expression against the locals of this frame
    ///
    /// # Errors
    /// Returns [`crate::Error::Expression`] for malformed text, or the failure of the first
    /// step that does not apply.
    pub fn evaluate(&self, expression: &str) -> Result<Value<'p>> {
        log::debug!("evaluating '{expression}' in {}", self.data.method);
        Expression::parse(expression)?.evaluate(self)
    }
}
