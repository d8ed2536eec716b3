use crate::errors::RuntimeError;
use crate::{CallSite, FrameRef, Runtime};

use super::builtins;

/// Native function ABI.
///
/// A native receives the number of arguments the caller pushed and reads them
/// with [`Runtime::arg`]. It must pop exactly those arguments and push one
/// result, usually through [`Runtime::native_return`]. Collection is disabled
/// for the duration of the call.
pub type NativeFn = fn(&mut Runtime, FrameRef, usize, &CallSite) -> Result<(), RuntimeError>;

pub struct NativeRegistry {
    entries: Vec<(String, NativeFn)>,
}

impl NativeRegistry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn register(&mut self, name: &str, fun: NativeFn) {
        self.entries.push((name.to_string(), fun));
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn install_into(self, rt: &mut Runtime) {
        for (name, fun) in self.entries {
            rt.register_native(&name, fun);
        }
    }
}

impl Default for NativeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

pub trait NativeProvider {
    fn install(&self, registry: &mut NativeRegistry);
}

/// The natives every runtime starts with.
pub struct StdNativeProvider;

impl NativeProvider for StdNativeProvider {
    fn install(&self, registry: &mut NativeRegistry) {
        registry.register("print", builtins::native_print);
        registry.register("println", builtins::native_println);
        registry.register("new_array", builtins::native_new_array);
        registry.register("new_object", builtins::native_new_object);
        registry.register("new_exception", builtins::native_new_exception);
        // files
        registry.register("fopen", builtins::native_fopen);
        registry.register("fclose", builtins::native_fclose);
        registry.register("fgets", builtins::native_fgets);
        registry.register("fputs", builtins::native_fputs);
    }
}
