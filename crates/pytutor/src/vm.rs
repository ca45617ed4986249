//! RustPython VM lifecycle for the sandbox.
//!
//! This module owns every RustPython API call. It builds interpreters with the
//! stdlib registered, installs the import gate and the output capture at the
//! start of each run, compiles and executes snippet source, and maps VM-level
//! failures into [`Fault`] values.
//!
//! ## Import gate
//!
//! RustPython resolves imports through `builtins.__import__`, which only
//! exists after `vm.initialize()` — i.e. after the `with_init` closure has
//! run. The gate is therefore installed at the beginning of each
//! [`run_snippet`] call, inside `enter()`. The original `__import__` is stashed
//! under a private builtins attribute on first install so reinstalls on a
//! reused interpreter always delegate to the real resolver, never to a stale
//! hook.
//!
//! Only imports originating from snippet code are gated. Stdlib modules load
//! their own internals freely; denying those would break the very imports the
//! allowlist permits.
//!
//! ## Output capture
//!
//! `sys.stdout` and `sys.stderr` are replaced with minimal writer objects
//! whose `write(s)` delegates to [`CaptureBuffer::push`]. `print()` goes
//! through `sys.stdout.write`, so statement output lands in the buffer in
//! statement order.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use rustpython_vm::{
    builtins::PyBaseExceptionRef,
    compiler::Mode,
    function::FuncArgs,
    AsObject, Interpreter, PyObjectRef, PyResult, VirtualMachine,
};

use crate::capture::{CaptureBuffer, Stream};
use crate::imports::module_allowed;
use crate::types::Fault;

/// Sentinel prefix for the import-gate's ImportError message, recognized when
/// mapping the escaped exception back to a [`Fault::ImportDenied`].
const IMPORT_DENIED_SENTINEL: &str = "ImportDenied:";

/// Builtins attribute under which the real `__import__` is stashed.
const SAVED_IMPORT_ATTR: &str = "__pytutor_original_import__";

// ── Crate-visible types ──────────────────────────────────────────────────────

/// Raw outcome of one run inside the VM, before timing and caching are applied.
pub(crate) struct VmRun {
    pub stdout: String,
    pub stderr: String,
    pub fault: Option<Fault>,
}

/// An interpreter bundled with the import allowlist it enforces.
///
/// Not `Send` — RustPython interpreters must stay on the thread that built
/// them. The slot module keeps each instance on its own dedicated thread.
pub(crate) struct SnippetVm {
    inner: Interpreter,
    allowed: Arc<HashSet<String>>,
}

impl SnippetVm {
    /// Replace the allowlist enforced by the next [`run_snippet`] call.
    ///
    /// The gate re-reads the allowlist on every install, so a warm interpreter
    /// can serve requests with differing `allowed_modules` settings.
    pub(crate) fn set_allowed(&mut self, allowed: HashSet<String>) {
        self.allowed = Arc::new(allowed);
    }
}

// ── Interpreter construction ─────────────────────────────────────────────────

/// Candidate filesystem paths holding a host Python standard library.
///
/// The `freeze-stdlib` feature embeds only the VM's own core modules. Pure
/// Python stdlib modules (collections, functools, string, …) come from a host
/// installation when one is present; native modules registered from
/// `rustpython_stdlib` shadow any compiled extensions on the same paths.
fn host_stdlib_paths() -> Vec<String> {
    let candidates = [
        "/usr/local/lib/python3.13",
        "/usr/local/lib/python3.12",
        "/usr/local/lib/python3.11",
        "/usr/local/lib/python3.10",
        "/usr/lib/python3",
        "/usr/lib/python3.12",
        "/usr/lib/python3.11",
        "/usr/lib/python3.10",
    ];
    candidates
        .iter()
        .filter(|p| std::path::Path::new(p).is_dir())
        .map(|p| p.to_string())
        .collect()
}

/// Build a fresh interpreter with the stdlib registered and `allowed` as its
/// import allowlist.
pub(crate) fn build_vm(allowed: HashSet<String>) -> SnippetVm {
    let mut settings = rustpython_vm::Settings::default();
    for path in host_stdlib_paths() {
        settings.path_list.push(path);
    }

    let inner = Interpreter::with_init(settings, |vm| {
        vm.add_native_modules(rustpython_stdlib::get_module_inits());
    });

    SnippetVm {
        inner,
        allowed: Arc::new(allowed),
    }
}

// ── Running snippets ─────────────────────────────────────────────────────────

/// Compile and execute `source`, capturing output into `capture`.
///
/// Installs the import gate and output capture, compiles (mapping parse
/// failures to [`Fault::Syntax`]), then runs in a scope whose `__name__` is
/// `"__main__"` so the gate can tell snippet imports from stdlib internals.
/// Escaped exceptions become [`Fault::ImportDenied`] or [`Fault::Runtime`];
/// output captured before the fault is preserved either way.
pub(crate) fn run_snippet(interp: &SnippetVm, source: &str, capture: CaptureBuffer) -> VmRun {
    let allowed = Arc::clone(&interp.allowed);

    interp.inner.enter(|vm| {
        install_import_gate(vm, &allowed);
        install_capture(vm, capture.clone());

        let code = match vm.compile(source, Mode::Exec, "<snippet>".to_owned()) {
            Ok(code) => code,
            Err(err) => {
                let (stdout, stderr) = capture.drain();
                return VmRun {
                    stdout,
                    stderr,
                    fault: Some(syntax_fault(err)),
                };
            }
        };

        let scope = vm.new_scope_with_builtins();
        let _ = scope
            .globals
            .set_item("__name__", vm.ctx.new_str("__main__").into(), vm);
        let run = vm.run_code_obj(code, scope);

        let (stdout, stderr) = capture.drain();
        let fault = match run {
            Ok(_) => None,
            Err(exc) => Some(
                import_denied_fault(vm, &exc).unwrap_or_else(|| runtime_fault(vm, exc)),
            ),
        };
        VmRun { stdout, stderr, fault }
    })
}

// ── Import gate ──────────────────────────────────────────────────────────────

/// Whether this `__import__` call originates from snippet code.
///
/// Snippet code runs with `__name__ == "__main__"`; every real module carries
/// its own name. Calls with no usable globals are treated as snippet code, the
/// conservative direction.
fn snippet_originated(args: &FuncArgs, vm: &VirtualMachine) -> bool {
    let globals = match args.args.get(1) {
        Some(g) if !vm.is_none(g) => g,
        _ => return true,
    };
    match vm.call_method(globals, "get", (vm.ctx.new_str("__name__"),)) {
        Ok(name) if !vm.is_none(&name) => match name.str(vm) {
            Ok(s) => s.as_str() == "__main__" || s.as_str().is_empty(),
            Err(_) => true,
        },
        _ => true,
    }
}

/// Replace `builtins.__import__` with a gate that enforces `allowed` for
/// snippet-originated absolute imports and delegates everything else to the
/// real resolver.
///
/// Relative imports (level > 0) pass through: they can only occur inside a
/// package whose top-level import was already gated.
fn install_import_gate(vm: &VirtualMachine, allowed: &Arc<HashSet<String>>) {
    let original = if let Ok(saved) = vm.builtins.get_attr(SAVED_IMPORT_ATTR, vm) {
        saved
    } else {
        let real = match vm.builtins.get_attr("__import__", vm) {
            Ok(f) => f,
            Err(_) => return,
        };
        let _ = vm.builtins.set_attr(SAVED_IMPORT_ATTR, real.clone(), vm);
        real
    };

    // PyObjectRef is not Send+Sync; the closure only ever runs on the VM thread.
    #[allow(clippy::arc_with_non_send_sync)]
    let original = Arc::new(original);
    let allowed = Arc::clone(allowed);

    let gate = vm.new_function(
        "__import__",
        move |args: FuncArgs, vm: &VirtualMachine| -> PyResult<PyObjectRef> {
            // __import__(name, globals=None, locals=None, fromlist=(), level=0)
            let module: String = args
                .args
                .first()
                .and_then(|o| o.str(vm).ok())
                .map(|s| s.as_str().to_owned())
                .unwrap_or_default();

            let level: i64 = args
                .args
                .get(4)
                .and_then(|o| {
                    use rustpython_vm::TryFromObject;
                    i64::try_from_object(vm, o.clone()).ok()
                })
                .unwrap_or(0);

            let gated = level == 0 && snippet_originated(&args, vm);
            if gated && !module_allowed(&module, &allowed) {
                return Err(vm.new_import_error(
                    format!("{IMPORT_DENIED_SENTINEL}{module}"),
                    vm.ctx.new_str(module),
                ));
            }

            original.call(args, vm)
        },
    );

    let _ = vm.builtins.set_attr("__import__", gate, vm);
}

// ── Output capture ───────────────────────────────────────────────────────────

/// Point `sys.stdout` and `sys.stderr` at writer objects backed by `capture`.
fn install_capture(vm: &VirtualMachine, capture: CaptureBuffer) {
    let stdout = writer_object(vm, capture.clone(), Stream::Stdout);
    let stderr = writer_object(vm, capture, Stream::Stderr);
    let _ = vm.sys_module.set_attr("stdout", stdout, vm);
    let _ = vm.sys_module.set_attr("stderr", stderr, vm);
}

/// A minimal Python file-like object whose `write(s)` feeds `capture`.
///
/// A budget-exceeded write surfaces as a Python `RuntimeError`, aborting the
/// snippet at the offending statement.
fn writer_object(vm: &VirtualMachine, capture: CaptureBuffer, stream: Stream) -> PyObjectRef {
    let capture = Arc::new(Mutex::new(capture));
    let for_flush = Arc::clone(&capture);

    let write_fn = vm.new_function(
        "write",
        move |args: FuncArgs, vm: &VirtualMachine| -> PyResult<PyObjectRef> {
            let text: String = args
                .args
                .first()
                .and_then(|o| o.str(vm).ok())
                .map(|s| s.as_str().to_owned())
                .unwrap_or_default();

            let buffer = capture.lock().expect("capture mutex poisoned");
            match buffer.push(stream, text.as_bytes()) {
                Ok(()) => Ok(vm.ctx.new_int(text.len()).into()),
                Err(budget) => Err(vm.new_exception_msg(
                    vm.ctx.exceptions.runtime_error.to_owned(),
                    format!("output budget exceeded: {budget} bytes"),
                )),
            }
        },
    );

    let flush_fn = vm.new_function(
        "flush",
        move |_args: FuncArgs, vm: &VirtualMachine| -> PyResult<PyObjectRef> {
            let _keep_alive = for_flush.lock().expect("capture mutex poisoned");
            Ok(vm.ctx.none())
        },
    );

    let writer = vm.new_module("<capture>", vm.ctx.new_dict(), None);
    let _ = writer.set_attr("write", write_fn, vm);
    let _ = writer.set_attr("flush", flush_fn, vm);
    let _ = writer.set_attr("closed", vm.ctx.new_bool(false), vm);
    let _ = writer.set_attr("encoding", vm.ctx.new_str("utf-8"), vm);
    writer.into()
}

// ── Fault extraction ─────────────────────────────────────────────────────────

fn syntax_fault(err: rustpython_vm::compiler::CompileError) -> Fault {
    let (line, col) = err.python_location();
    Fault::Syntax {
        message: err.to_string(),
        line: line as u32,
        col: col as u32,
    }
}

/// Recognize the import gate's sentinel ImportError; `None` for anything else.
fn import_denied_fault(vm: &VirtualMachine, exc: &PyBaseExceptionRef) -> Option<Fault> {
    let msg = exc.as_object().str(vm).ok()?;
    msg.as_str()
        .strip_prefix(IMPORT_DENIED_SENTINEL)
        .map(|module| Fault::ImportDenied {
            module: module.to_string(),
        })
}

fn runtime_fault(vm: &VirtualMachine, exc: PyBaseExceptionRef) -> Fault {
    let message = exc
        .as_object()
        .str(vm)
        .map(|s| s.as_str().to_owned())
        .unwrap_or_else(|_| "unknown runtime error".to_owned());

    // String implements rustpython's py_io::Write via write_fmt.
    let mut traceback = String::new();
    let _ = vm.write_exception(&mut traceback, &exc);

    Fault::Runtime { message, traceback }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
