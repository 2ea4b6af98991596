//! Emission context
//!
//! Every task receives an explicit [`EmitContext`] handle; it is the only
//! route to the variable table and the accumulator. There is no ambient
//! "current build" state. The context is cheap to clone into a task's
//! future; the scheduler behind it tracks which task is being polled so
//! appended statements are attributed correctly.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use uuid::Uuid;

use crate::value::Ident;

use super::errors::EmitResult;
use super::statement::{Accumulator, Arg, StatementKind, TaskId};
use super::variables::{VariableHandle, VariableTable};

/// Shared state behind every context handle of one pass.
pub(crate) struct SchedulerState {
    pub(crate) pass_id: Uuid,
    pub(crate) variables: VariableTable,
    pub(crate) accumulator: Accumulator,
    /// Task currently being polled; set by the scheduler before each poll.
    pub(crate) current_task: TaskId,
    /// Identifier the current task suspended on, read back by the scheduler
    /// after a pending poll.
    pub(crate) pending_wait: Option<Ident>,
}

impl SchedulerState {
    pub(crate) fn new(pass_id: Uuid) -> Self {
        Self {
            pass_id,
            variables: VariableTable::new(),
            accumulator: Accumulator::new(),
            current_task: TaskId(0),
            pending_wait: None,
        }
    }
}

/// Handle through which an emission task declares variables, resolves
/// references, and appends statements.
#[derive(Clone)]
pub struct EmitContext {
    state: Rc<RefCell<SchedulerState>>,
}

impl EmitContext {
    pub(crate) fn new(state: Rc<RefCell<SchedulerState>>) -> Self {
        Self { state }
    }

    /// Returns the pass correlation id.
    pub fn pass_id(&self) -> Uuid {
        self.state.borrow().pass_id
    }

    /// Declares a variable for `id` without emitting a statement. Never
    /// suspends; a second declaration for the same identifier fails.
    pub fn declare(&self, id: &Ident, ty: &str) -> EmitResult<VariableHandle> {
        self.state.borrow_mut().variables.declare(id.clone(), ty)
    }

    /// Declares a variable and appends its construction statement.
    pub fn construct(&self, id: &Ident, ty: &str, args: Vec<Arg>) -> EmitResult<VariableHandle> {
        let mut state = self.state.borrow_mut();
        let var = state.variables.declare(id.clone(), ty)?;
        let owner = state.current_task;
        state.accumulator.append(
            owner,
            StatementKind::Construct {
                var: var.clone(),
                ty: ty.into(),
                args,
            },
        );
        Ok(var)
    }

    /// Resolves the variable declared for `id`, suspending the calling task
    /// until some task declares it. If the pass finishes without the
    /// declaration, the task fails with an unresolved-reference error.
    pub fn resolve(&self, id: &Ident) -> Resolve {
        Resolve {
            state: Rc::clone(&self.state),
            id: id.clone(),
        }
    }

    /// Appends an arbitrary statement on behalf of the current task.
    pub fn append(&self, kind: StatementKind) {
        let mut state = self.state.borrow_mut();
        let owner = state.current_task;
        state.accumulator.append(owner, kind);
    }

    /// Registers `var` with a named runtime facility.
    pub fn register(&self, var: &VariableHandle, facility: &str) {
        self.append(StatementKind::Register {
            var: var.clone(),
            facility: facility.into(),
        });
    }

    /// Appends a setter invocation on `var`.
    pub fn set_field(&self, var: &VariableHandle, field: &str, args: Vec<Arg>) {
        self.append(StatementKind::SetField {
            var: var.clone(),
            field: field.into(),
            args,
        });
    }

    /// Requests a library at build time.
    pub fn add_library(&self, name: &str) {
        self.append(StatementKind::AddLibrary { name: name.into() });
    }

    /// Requests a preprocessor define.
    pub fn add_define(&self, name: &str, value: Option<&str>) {
        self.append(StatementKind::AddDefine {
            name: name.into(),
            value: value.map(str::to_string),
        });
    }

    /// Requests a raw build flag.
    pub fn add_build_flag(&self, flag: &str) {
        self.append(StatementKind::AddBuildFlag { flag: flag.into() });
    }
}

/// Future returned by [`EmitContext::resolve`]. Completes once the awaited
/// identifier has a declared variable.
pub struct Resolve {
    state: Rc<RefCell<SchedulerState>>,
    id: Ident,
}

impl Future for Resolve {
    type Output = VariableHandle;

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = self.state.borrow_mut();
        if let Some(handle) = state.variables.get(&self.id) {
            return Poll::Ready(handle.clone());
        }
        state.pending_wait = Some(self.id.clone());
        Poll::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::task::noop_waker;

    fn context() -> EmitContext {
        EmitContext::new(Rc::new(RefCell::new(SchedulerState::new(Uuid::new_v4()))))
    }

    #[test]
    fn test_construct_declares_and_appends() {
        let ctx = context();
        let var = ctx
            .construct(&Ident::new("display"), "ST7701S", vec![])
            .unwrap();

        let state = ctx.state.borrow();
        assert_eq!(state.variables.get(&Ident::new("display")), Some(&var));
        assert_eq!(state.accumulator.len(), 1);
        assert!(matches!(
            state.accumulator.all()[0].kind(),
            StatementKind::Construct { ty, .. } if ty == "ST7701S"
        ));
    }

    #[test]
    fn test_declare_never_emits() {
        let ctx = context();
        ctx.declare(&Ident::new("x"), "X").unwrap();
        assert!(ctx.state.borrow().accumulator.is_empty());
    }

    #[test]
    fn test_resolve_ready_when_declared() {
        let ctx = context();
        let var = ctx.declare(&Ident::new("spi_bus"), "SPIBus").unwrap();

        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);
        let mut fut = ctx.resolve(&Ident::new("spi_bus"));
        match Pin::new(&mut fut).poll(&mut cx) {
            Poll::Ready(handle) => assert_eq!(handle, var),
            Poll::Pending => panic!("resolve of a declared variable must not suspend"),
        }
    }

    #[test]
    fn test_resolve_pending_records_awaited_id() {
        let ctx = context();
        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);

        let mut fut = ctx.resolve(&Ident::new("missing"));
        assert!(Pin::new(&mut fut).poll(&mut cx).is_pending());
        assert_eq!(
            ctx.state.borrow_mut().pending_wait.take(),
            Some(Ident::new("missing"))
        );
    }
}
