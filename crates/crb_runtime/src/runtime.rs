//! Runtime core: the interpreter state and its public embedding API.

mod config;
mod exception;
mod frame;
mod gc;
mod native;
mod objects;
mod stack;

pub use config::{ExecResult, Flow, RuntimeConfig};
pub use frame::{CallSite, Frame, FrameRef};
pub(crate) use frame::RecoveryPoint;
pub use stack::ValueStack;

use std::rc::Rc;

use crb_ir::{FuncDef, Name, Program};
use crb_syntax::DiagnosticKind;

use crate::builtins_registry::{NativeFn, NativeProvider, NativeRegistry, StdNativeProvider};
use crate::core::heap::{Heap, ManagedObject, RecordObject, ScopeChain};
use crate::core::scope;
use crate::core::{ClosureId, ObjectId, Symbol, Value};
use crate::errors::{RuntimeError, Unwind};
use crate::util::{FastHashMap, fast_map_new, value_to_string};
use crate::builtins::{FileTable, define_std_streams};

pub(crate) const TOP_LEVEL_NAME: &str = "(top level)";

/// A function the call expression can reach by name.
#[derive(Clone)]
pub(crate) enum Callable {
    User { def: Rc<FuncDef>, file: Rc<str> },
    Native { name: Rc<str>, fun: NativeFn },
}

/// A closure body plus the file it was created in.
pub(crate) struct ClosureDef {
    pub(crate) def: Rc<FuncDef>,
    pub(crate) file: Rc<str>,
}

pub struct Runtime {
    pub(crate) heap: Heap,
    pub(crate) stack: ValueStack,
    pub(crate) frames: Vec<Frame>,
    pub(crate) top_scope: ObjectId,
    pub(crate) functions: FastHashMap<Name, Callable>,
    pub(crate) closures: Vec<ClosureDef>,
    closure_index: FastHashMap<*const FuncDef, ClosureId>,
    symbols: Vec<Name>,
    symbol_index: FastHashMap<Name, Symbol>,
    pub(crate) files: FileTable,
    /// The exception currently propagating, if any.
    pub(crate) thrown: Option<Value>,
    /// Values held only by Rust locals that must survive a collection.
    pub(crate) gc_temp_roots: Vec<Value>,
    pub(crate) output: String,
    pub(crate) config: RuntimeConfig,
}

impl Runtime {
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        let mut heap = Heap::new(config.heap_threshold_step);
        let namespace = heap.alloc(ManagedObject::Record(RecordObject::default()));
        let top_scope = heap.alloc(ManagedObject::Scope(ScopeChain {
            namespace,
            global_refs: Vec::new(),
            prev: None,
            is_closure: false,
        }));
        let mut rt = Self {
            heap,
            stack: ValueStack::new(config.stack_alloc_step),
            frames: vec![Frame {
                scope: top_scope,
                caller_line: 0,
                func_name: Rc::from(TOP_LEVEL_NAME),
                file: Rc::from(""),
            }],
            top_scope,
            functions: fast_map_new(),
            closures: Vec::new(),
            closure_index: fast_map_new(),
            symbols: Vec::new(),
            symbol_index: fast_map_new(),
            files: FileTable::new(),
            thrown: None,
            gc_temp_roots: Vec::new(),
            output: String::new(),
            config,
        };
        rt.install_natives(&StdNativeProvider);
        define_std_streams(&mut rt);
        rt
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Register every native a provider offers.
    pub fn install_natives(&mut self, provider: &dyn NativeProvider) {
        let mut registry = NativeRegistry::new();
        provider.install(&mut registry);
        tracing::debug!(natives = ?registry.names(), "installing natives");
        registry.install_into(self);
    }

    pub fn register_native(&mut self, name: &str, fun: NativeFn) {
        let name: Name = Rc::from(name);
        self.functions
            .insert(name.clone(), Callable::Native { name, fun });
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Run a program against this runtime's globals.
    ///
    /// Functions it defines stay registered afterwards, as do the top-level
    /// variables it creates. A runtime error or uncaught exception ends the
    /// program and resets the stack and call frames; output written so far
    /// remains available through [`Runtime::take_output`].
    #[tracing::instrument(level = "debug", skip_all, fields(file = %program.file))]
    pub fn exec_program(&mut self, program: &Program) -> Result<ExecResult, RuntimeError> {
        for def in program.functions.iter() {
            if let Some(name) = &def.name {
                self.functions.insert(
                    name.clone(),
                    Callable::User {
                        def: def.clone(),
                        file: program.file.clone(),
                    },
                );
            }
        }
        self.frames[0].file = program.file.clone();

        let value = match self.exec_stmts(&program.stmts) {
            Ok(Flow::Return(v)) => Some(v),
            Ok(_) => None,
            Err(Unwind::Throw(exception)) => {
                let err = self.uncaught_exception(exception);
                self.reset_execution();
                return Err(err);
            }
            Err(Unwind::Error(err)) => {
                tracing::debug!(error = %err, "runtime error");
                self.reset_execution();
                return Err(*err);
            }
        };
        debug_assert_eq!(self.stack.len(), 0, "statement left values on the stack");
        Ok(ExecResult {
            value,
            output: std::mem::take(&mut self.output),
        })
    }

    fn reset_execution(&mut self) {
        self.stack.truncate(0);
        self.frames.truncate(1);
        self.thrown = None;
        self.gc_temp_roots.clear();
    }

    pub fn write_output(&mut self, s: &str) {
        self.output.push_str(s);
    }

    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn stack(&self) -> &ValueStack {
        &self.stack
    }

    pub fn call_depth(&self) -> usize {
        self.frames.len()
    }

    // Globals

    pub fn global(&self, name: &str) -> Option<Value> {
        let namespace = self.heap.scope(self.top_scope).namespace;
        self.heap.record(namespace).get(name)
    }

    pub fn define_global(&mut self, name: &str, value: Value) {
        scope::define(&mut self.heap, self.top_scope, &Rc::from(name), value);
    }

    // Inspection

    /// Render a value the way `print` does.
    pub fn display(&self, value: Value) -> String {
        value_to_string(&self.heap, value)
    }

    pub fn str_value(&self, value: Value) -> Option<&str> {
        match value {
            Value::Str(id) => Some(self.heap.str(id)),
            _ => None,
        }
    }

    pub fn array_items(&self, value: Value) -> Option<&[Value]> {
        match value {
            Value::Array(id) => Some(self.heap.array(id)),
            _ => None,
        }
    }

    pub fn member(&self, value: Value, name: &str) -> Option<Value> {
        match value {
            Value::Record(id) => self.heap.record(id).get(name),
            _ => None,
        }
    }

    // Internal helpers

    #[inline]
    pub(crate) fn current_frame(&self) -> &Frame {
        match self.frames.last() {
            Some(frame) => frame,
            None => panic!("call stack is empty"),
        }
    }

    #[inline]
    pub(crate) fn current_scope(&self) -> ObjectId {
        self.current_frame().scope
    }

    /// Build an error located in the current frame's file.
    pub(crate) fn error(&self, kind: DiagnosticKind, line: u32) -> RuntimeError {
        RuntimeError::new(kind, &self.current_frame().file, line)
    }

    pub(crate) fn intern(&mut self, name: &Name) -> Symbol {
        if let Some(sym) = self.symbol_index.get(name) {
            return *sym;
        }
        let sym = Symbol(self.symbols.len() as u32);
        self.symbols.push(name.clone());
        self.symbol_index.insert(name.clone(), sym);
        sym
    }

    pub(crate) fn symbol_name(&self, sym: Symbol) -> &Name {
        &self.symbols[sym.0 as usize]
    }

    /// Stable id for a closure body; the same syntax node always maps to the
    /// same id.
    pub(crate) fn closure_id(&mut self, def: &Rc<FuncDef>) -> ClosureId {
        let key = Rc::as_ptr(def);
        if let Some(id) = self.closure_index.get(&key) {
            return *id;
        }
        let id = ClosureId(self.closures.len() as u32);
        self.closures.push(ClosureDef {
            def: def.clone(),
            file: self.current_frame().file.clone(),
        });
        self.closure_index.insert(key, id);
        id
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}
