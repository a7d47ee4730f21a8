//! Debuggee session snapshot.
//!
//! A [`Process`] is an in-memory stand-in for a debugged process: it owns the
//! [`TypeRegistry`] of the debuggee, the modules loaded so far, the stack frames of the paused
//! thread and an ordered log of [`DebuggerEvent`]s. Values are only handed out while the
//! process is paused, which keeps every dump consistent.
//!
//! # Examples
//!
//! ```rust
//! use debugdump::metadata::typesystem::PrimitiveData;
//! use debugdump::session::{PausedReason, Process};
//! use debugdump::value::ValueData;
//!
//! let mut process = Process::start()?;
//! process.load_module("ArrayValue.exe", true)?;
//!
//! let int_array = process.resolve_type("int[]")?.token();
//! let elements = (0..5).map(|i| PrimitiveData::I4(i).into()).collect();
//! process.add_local("array", int_array, ValueData::array(elements))?;
//! process.pause(PausedReason::Break)?;
//!
//! let frame = process.selected_stack_frame()?;
//! assert_eq!(frame.evaluate("array[2]")?.as_string(), "2");
//! assert_eq!(frame.evaluate("array.Length")?.as_string(), "5");
//! # Ok::<(), debugdump::Error>(())
//! ```

mod expression;
mod frame;

use std::fmt;

use strum::{Display, EnumString, IntoStaticStr};

pub use expression::{Accessor, Expression};
pub use frame::{FrameData, LocalVariable, StackFrame};

use crate::{
    metadata::{
        token::Token,
        typesystem::{DebugType, TypeRegistry, TypeResolver, MAX_RECURSION_DEPTH},
    },
    value::{Value, ValueData},
    Error::{ModuleNotLoaded, NotPaused, ProcessExited, RecursionLimit},
    Result,
};

/// Why the debuggee stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum PausedReason {
    /// `System.Diagnostics.Debugger.Break()` or a break instruction
    Break,
    /// A user breakpoint was hit
    Breakpoint,
    /// A step operation finished
    StepComplete,
    /// An exception was thrown
    Exception,
    /// The debugger interrupted the process
    ForcedBreak,
}

/// A binary loaded into the debuggee
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    /// File name, e.g. `mscorlib.dll`
    pub name: String,
    /// Debug symbols are available
    pub has_symbols: bool,
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbols = if self.has_symbols {
            "Has symbols"
        } else {
            "No symbols"
        };
        write!(f, "{} ({})", self.name, symbols)
    }
}

/// Something the debugger observed, in the order it happened
#[derive(Debug, Clone, PartialEq, Eq, IntoStaticStr)]
pub enum DebuggerEvent {
    /// The process was created
    ProcessStarted,
    /// A binary was loaded
    ModuleLoaded(Module),
    /// The process stopped
    DebuggingPaused(PausedReason),
    /// The debuggee wrote to the debug log
    LogMessage(String),
    /// The process terminated
    ProcessExited,
}

impl DebuggerEvent {
    /// Element name of the event
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// Text body of the event, if it has one
    #[must_use]
    pub fn payload(&self) -> Option<String> {
        match self {
            DebuggerEvent::ProcessStarted | DebuggerEvent::ProcessExited => None,
            DebuggerEvent::ModuleLoaded(module) => Some(module.to_string()),
            DebuggerEvent::DebuggingPaused(reason) => Some(reason.to_string()),
            DebuggerEvent::LogMessage(text) => Some(text.clone()),
        }
    }
}

/// Execution state of the debuggee
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    /// Executing; values can not be read
    Running,
    /// Stopped; values can be read
    Paused(PausedReason),
    /// Terminated
    Exited,
}

/// An in-memory debuggee process
pub struct Process {
    registry: TypeRegistry,
    modules: Vec<Module>,
    state: ProcessState,
    events: Vec<DebuggerEvent>,
    frames: Vec<FrameData>,
}

impl Process {
    /// Start a process with the core library loaded
    ///
    /// # Errors
    /// Returns an error if the core library types can not be registered.
    pub fn start() -> Result<Self> {
        Self::with_registry(TypeRegistry::new()?)
    }

    /// Start a process over an existing registry; its core module is loaded without symbols
    ///
    /// # Errors
    /// Returns an error if the core module can not be loaded.
    pub fn with_registry(registry: TypeRegistry) -> Result<Self> {
        let mut process = Process {
            registry,
            modules: Vec::new(),
            state: ProcessState::Running,
            events: vec![DebuggerEvent::ProcessStarted],
            frames: vec![FrameData {
                method: "Main".to_string(),
                locals: Vec::new(),
            }],
        };

        let core_module = process.registry.core_module().to_string();
        process.load_module(&core_module, false)?;
        Ok(process)
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.state == ProcessState::Exited {
            return Err(ProcessExited);
        }
        Ok(())
    }

    /// The type registry of the debuggee
    #[must_use]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Current execution state
    #[must_use]
    pub fn state(&self) -> ProcessState {
        self.state
    }

    /// Loaded modules, in load order
    #[must_use]
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// True if a module with this name is loaded
    #[must_use]
    pub fn is_module_loaded(&self, name: &str) -> bool {
        self.modules.iter().any(|module| module.name == name)
    }

    /// Load a binary into the process
    ///
    /// # Errors
    /// Returns [`ProcessExited`] after the process has exited.
    pub fn load_module(&mut self, name: &str, has_symbols: bool) -> Result<()> {
        self.ensure_alive()?;
        if self.is_module_loaded(name) {
            log::warn!("module {name} is already loaded");
            return Ok(());
        }

        let module = Module {
            name: name.to_string(),
            has_symbols,
        };
        log::debug!("loaded {module}");
        self.modules.push(module.clone());
        self.events.push(DebuggerEvent::ModuleLoaded(module));
        Ok(())
    }

    /// Enter a new method; the new frame becomes the selected one
    ///
    /// # Errors
    /// Returns [`ProcessExited`] after the process has exited.
    pub fn push_frame(&mut self, method: &str) -> Result<()> {
        self.ensure_alive()?;
        self.frames.push(FrameData {
            method: method.to_string(),
            locals: Vec::new(),
        });
        Ok(())
    }

    /// Add a local variable to the selected frame, checking that `data` fits the type
    ///
    /// # Errors
    /// Returns an error if the type is unknown or the data does not fit it.
    pub fn add_local(&mut self, name: &str, ty: Token, data: ValueData) -> Result<()> {
        self.ensure_alive()?;
        Value::new(self.registry.describe(ty)?, name, data.clone())?;

        let frame = self
            .frames
            .last_mut()
            .ok_or_else(|| malformed_error!("The process has no stack frame"))?;
        frame.locals.retain(|local| local.name != name);
        frame.locals.push(LocalVariable {
            name: name.to_string(),
            ty,
            data,
        });
        Ok(())
    }

    /// Stop the process
    ///
    /// # Errors
    /// Returns [`ProcessExited`] after the process has exited.
    pub fn pause(&mut self, reason: PausedReason) -> Result<()> {
        self.ensure_alive()?;
        self.state = ProcessState::Paused(reason);
        self.events.push(DebuggerEvent::DebuggingPaused(reason));
        Ok(())
    }

    /// Continue the process
    ///
    /// # Errors
    /// Returns [`ProcessExited`] after the process has exited.
    pub fn resume(&mut self) -> Result<()> {
        self.ensure_alive()?;
        self.state = ProcessState::Running;
        Ok(())
    }

    /// Record a debug log message of the debuggee
    ///
    /// # Errors
    /// Returns [`ProcessExited`] after the process has exited.
    pub fn log_message(&mut self, text: &str) -> Result<()> {
        self.ensure_alive()?;
        self.events.push(DebuggerEvent::LogMessage(text.to_string()));
        Ok(())
    }

    /// Terminate the process
    pub fn exit(&mut self) {
        if self.state != ProcessState::Exited {
            self.state = ProcessState::Exited;
            self.events.push(DebuggerEvent::ProcessExited);
        }
    }

    /// Events that have not been taken yet
    #[must_use]
    pub fn events(&self) -> &[DebuggerEvent] {
        &self.events
    }

    /// Take all events recorded so far
    pub fn take_events(&mut self) -> Vec<DebuggerEvent> {
        std::mem::take(&mut self.events)
    }

    /// The innermost stack frame of the paused thread
    ///
    /// # Errors
    /// Returns [`NotPaused`] while running and [`ProcessExited`] after exit.
    pub fn selected_stack_frame(&self) -> Result<StackFrame<'_>> {
        match self.state {
            ProcessState::Running => Err(NotPaused),
            ProcessState::Exited => Err(ProcessExited),
            ProcessState::Paused(_) => {
                let frame = self
                    .frames
                    .last()
                    .ok_or_else(|| malformed_error!("The process has no stack frame"))?;
                Ok(StackFrame::new(&self.registry, frame))
            }
        }
    }

    /// Resolve a type name, requiring the module of the type to be loaded.
    ///
    /// Arrays and pointers are checked through their element types, generic instances through
    /// every type argument, at any nesting depth.
    ///
    /// # Errors
    /// Returns [`ModuleNotLoaded`] if an owning module is not loaded, or the resolver's
    /// failure for unknown names.
    pub fn resolve_type(&self, name: &str) -> Result<DebugType<'_>> {
        let ty = TypeResolver::new(&self.registry).resolve_name(name)?;
        self.check_modules_loaded(&ty, 0)?;
        Ok(ty)
    }

    fn check_modules_loaded(&self, ty: &DebugType<'_>, depth: usize) -> Result<()> {
        if depth >= MAX_RECURSION_DEPTH {
            return Err(RecursionLimit(MAX_RECURSION_DEPTH));
        }

        if let Some(element) = ty.element_type() {
            return self.check_modules_loaded(&element, depth + 1);
        }
        if let Ok(module) = ty.module() {
            if !self.is_module_loaded(module) {
                return Err(ModuleNotLoaded(module.to_string()));
            }
        }
        for argument in ty.generic_arguments() {
            self.check_modules_loaded(&argument, depth + 1)?;
        }
        Ok(())
    }
}
