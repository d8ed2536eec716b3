//! Function, closure and fake-method calls.

use std::rc::Rc;

use crb_ir::{CallExpr, ExprKind, FuncDef, Name};
use crb_syntax::DiagnosticKind;

use crate::builtins_registry::NativeFn;
use crate::core::{ObjectId, Value, scope};
use crate::errors::ExecOutcome;
use crate::methods;
use crate::runtime::{CallSite, Callable, Flow};
use crate::Runtime;

/// What a call expression resolved to.
enum Callee {
    User {
        def: Rc<FuncDef>,
        file: Rc<str>,
        /// Scope the closure was created in; `None` for named functions.
        captured: Option<ObjectId>,
        /// A named closure sees itself under its own name.
        self_binding: Option<Value>,
    },
    Native {
        name: Rc<str>,
        fun: NativeFn,
        /// Receiver of a fake method, bound to `this`.
        receiver: Option<Value>,
    },
}

impl Runtime {
    pub(crate) fn eval_call(&mut self, call: &CallExpr, line: u32) -> ExecOutcome<()> {
        let base = self.stack.len();
        let (callee, callee_on_stack) = match &call.callee.kind {
            ExprKind::Ident(name) if self.functions.contains_key(name) => {
                (self.named_callee(name), false)
            }
            ExprKind::Ident(name) if !self.is_variable(name) => {
                return Err(self
                    .error(DiagnosticKind::FunctionNotFound(name.to_string()), line)
                    .into());
            }
            _ => {
                // The callee value stays on the stack so its captured scope or
                // receiver survives argument evaluation.
                self.eval_expr(&call.callee)?;
                let hint = match &call.callee.kind {
                    ExprKind::Ident(name) => &**name,
                    ExprKind::Member(member) => &*member.member,
                    _ => "",
                };
                (self.callee_from_value(self.stack.peek(0), hint, line)?, true)
            }
        };

        for arg in call.args.iter() {
            self.eval_expr(arg)?;
        }
        self.invoke(callee, call.args.len(), line)?;

        if callee_on_stack {
            let result = self.stack.pop();
            self.stack.replace_top(result);
        }
        debug_assert_eq!(self.stack.len(), base + 1, "call must push exactly one value");
        Ok(())
    }

    /// Call a method on `receiver` with no arguments and return its result.
    ///
    /// Record members win over fake methods, so a user object can implement
    /// the iterator protocol with closures. The receiver must already be
    /// rooted; the result is not.
    pub(crate) fn call_method(&mut self, receiver: Value, name: &str, line: u32) -> ExecOutcome<Value> {
        let name: Name = Rc::from(name);
        let method = self.member_value(receiver, &name, line)?;
        self.stack.push(method);
        let callee = self.callee_from_value(method, &name, line)?;
        self.invoke(callee, 0, line)?;
        let result = self.stack.pop();
        self.stack.pop();
        Ok(result)
    }

    fn is_variable(&mut self, name: &Name) -> bool {
        let scope = self.current_scope();
        scope::resolve(&mut self.heap, scope, self.top_scope, name, false).is_some()
    }

    fn named_callee(&self, name: &Name) -> Callee {
        match &self.functions[name] {
            Callable::User { def, file } => Callee::User {
                def: def.clone(),
                file: file.clone(),
                captured: None,
                self_binding: None,
            },
            Callable::Native { name, fun } => Callee::Native {
                name: name.clone(),
                fun: *fun,
                receiver: None,
            },
        }
    }

    fn callee_from_value(&self, value: Value, hint: &str, line: u32) -> ExecOutcome<Callee> {
        match value {
            Value::Closure { func, scope } => {
                let closure = &self.closures[func.0 as usize];
                Ok(Callee::User {
                    def: closure.def.clone(),
                    file: closure.file.clone(),
                    captured: Some(scope),
                    self_binding: closure.def.name.as_ref().map(|_| value),
                })
            }
            Value::FakeMethod { object, method, .. } => {
                let name = self.symbol_name(method).clone();
                let receiver = self.heap.get(object);
                match methods::lookup(receiver, &name) {
                    Some(fun) => Ok(Callee::Native {
                        name,
                        fun,
                        receiver: Some(receiver.value_for(object)),
                    }),
                    None => Err(self
                        .error(DiagnosticKind::NoSuchMethod(name.to_string()), line)
                        .into()),
                }
            }
            _ => Err(self
                .error(DiagnosticKind::FunctionNotFound(hint.to_string()), line)
                .into()),
        }
    }

    /// Run `callee` with `argc` arguments on top of the stack. On success the
    /// arguments are replaced by the return value.
    fn invoke(&mut self, callee: Callee, argc: usize, line: u32) -> ExecOutcome<()> {
        if self.frames.len() >= self.config.max_call_depth {
            return Err(self
                .error(DiagnosticKind::StackOverflow(self.config.max_call_depth), line)
                .into());
        }
        match callee {
            Callee::User {
                def,
                file,
                captured,
                self_binding,
            } => {
                let expected = def.params.len();
                if argc != expected {
                    let name = def.display_name().to_string();
                    let kind = if argc > expected {
                        DiagnosticKind::ArgumentTooMany {
                            name,
                            expected,
                            actual: argc,
                        }
                    } else {
                        DiagnosticKind::ArgumentTooFew {
                            name,
                            expected,
                            actual: argc,
                        }
                    };
                    return Err(self.error(kind, line).into());
                }
                let func_name = match &def.name {
                    Some(name) => name.clone(),
                    None => Rc::from(def.display_name()),
                };
                self.enter_call(captured, line, func_name, file);
                let scope = self.current_scope();
                if let (Some(name), Some(value)) = (&def.name, self_binding) {
                    scope::define(&mut self.heap, scope, name, value);
                }
                for (i, param) in def.params.iter().enumerate() {
                    let value = self.stack.peek(argc - 1 - i);
                    scope::define(&mut self.heap, scope, param, value);
                }
                self.stack.shrink(argc);

                let flow = self.exec_stmts(&def.body)?;
                self.leave_call();
                let result = match flow {
                    Flow::Return(v) => v,
                    _ => Value::Null,
                };
                self.stack.push(result);
            }
            Callee::Native {
                name,
                fun,
                receiver,
            } => {
                let file = self.current_frame().file.clone();
                let frame = self.enter_call(None, line, name, file.clone());
                if let Some(receiver) = receiver {
                    let scope = self.current_scope();
                    scope::define(&mut self.heap, scope, &Runtime::this_name(), receiver);
                }
                let site = CallSite { file, line };
                let base = self.stack.len() - argc;
                self.disable_gc();
                let result = fun(self, frame, argc, &site);
                self.enable_gc();
                result?;
                debug_assert_eq!(
                    self.stack.len(),
                    base + 1,
                    "native {} must replace its arguments with one result",
                    self.current_frame().func_name
                );
                self.leave_call();
            }
        }
        Ok(())
    }
}
