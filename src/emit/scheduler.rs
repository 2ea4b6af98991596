//! Cooperative emission scheduler
//!
//! One task per descriptor instance, driven on a single logical thread. The
//! scheduler polls tasks in resolver order; the only suspension point is
//! awaiting an undeclared variable. When a declaration lands, tasks
//! suspended on it re-enter the run queue. "No runnable task remains and at
//! least one task is still suspended" is detected at end of pass and every
//! stranded task fails with an unresolved-reference error.
//!
//! A failing task has its statements rolled back; sibling tasks keep theirs.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;
use std::task::{Context, Poll};

use futures_util::future::LocalBoxFuture;
use futures_util::task::noop_waker;
use uuid::Uuid;

use crate::observability::Logger;
use crate::value::{Ident, Node};

use super::context::{EmitContext, SchedulerState};
use super::errors::{EmitError, EmitResult, TaskError};
use super::statement::{Mark, Statement, TaskId};
use super::variables::VariableTable;

/// A descriptor's asynchronous emission procedure.
///
/// Implementations read their validated configuration node, declare and
/// resolve variables through the context, and append statements. Returning
/// early without declaring anything is a legal no-op (an optional exclusive
/// group that is entirely absent).
pub trait EmitProcedure {
    /// Runs the procedure for one instance.
    fn emit(
        self: Rc<Self>,
        ctx: EmitContext,
        config: Node,
    ) -> LocalBoxFuture<'static, EmitResult<()>>;
}

/// Procedure that emits nothing. Useful for descriptors that only exist to
/// gate dependencies, and for tests.
pub struct NoOpProcedure;

impl EmitProcedure for NoOpProcedure {
    fn emit(
        self: Rc<Self>,
        _ctx: EmitContext,
        _config: Node,
    ) -> LocalBoxFuture<'static, EmitResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

/// One schedulable descriptor instance.
pub struct TaskSpec {
    /// Descriptor name, for error attribution
    pub descriptor: String,
    /// Instance identifier
    pub instance: Ident,
    /// Validated configuration node
    pub config: Node,
    /// The descriptor's emission procedure
    pub procedure: Rc<dyn EmitProcedure>,
}

/// Everything a finished scheduler run produced.
pub struct SchedulerOutcome {
    /// Statements in final emission order
    pub statements: Vec<Statement>,
    /// The completed variable table
    pub variables: VariableTable,
    /// Per-task errors; empty means the emission phase succeeded
    pub errors: Vec<TaskError>,
}

struct Task {
    descriptor: String,
    instance: Ident,
    future: Option<LocalBoxFuture<'static, EmitResult<()>>>,
    mark: Mark,
}

/// Drives emission tasks to completion.
pub struct Scheduler {
    pass_id: Uuid,
}

impl Scheduler {
    /// Creates a scheduler for one pass.
    pub fn new(pass_id: Uuid) -> Self {
        Self { pass_id }
    }

    /// Runs every task, in spec order, to completion or failure.
    pub fn run(&self, specs: Vec<TaskSpec>) -> SchedulerOutcome {
        let state = Rc::new(RefCell::new(SchedulerState::new(self.pass_id)));
        let pass_id = self.pass_id.to_string();

        let mut tasks: Vec<Task> = specs
            .into_iter()
            .enumerate()
            .map(|(i, spec)| {
                let ctx = EmitContext::new(Rc::clone(&state));
                let mark = state.borrow().accumulator.mark(TaskId(i));
                Task {
                    descriptor: spec.descriptor,
                    instance: spec.instance,
                    future: Some(spec.procedure.emit(ctx, spec.config)),
                    mark,
                }
            })
            .collect();

        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);

        let mut queue: VecDeque<usize> = (0..tasks.len()).collect();
        // Suspended task index -> identifier it awaits. BTreeMap keeps the
        // wake-up scan deterministic.
        let mut suspended: BTreeMap<usize, Ident> = BTreeMap::new();
        let mut errors: Vec<TaskError> = Vec::new();

        while let Some(i) = queue.pop_front() {
            {
                let mut st = state.borrow_mut();
                st.current_task = TaskId(i);
                st.pending_wait = None;
            }

            let poll = tasks[i]
                .future
                .as_mut()
                .expect("queued task has a live future")
                .as_mut()
                .poll(&mut cx);

            match poll {
                Poll::Ready(Ok(())) => {
                    tasks[i].future = None;
                }
                Poll::Ready(Err(error)) => {
                    tasks[i].future = None;
                    let removed = state.borrow_mut().accumulator.rollback_from(tasks[i].mark);
                    Logger::error(
                        "TASK_FAILED",
                        &[
                            ("pass_id", pass_id.as_str()),
                            ("instance", tasks[i].instance.as_str()),
                            ("descriptor", tasks[i].descriptor.as_str()),
                            ("rolled_back", &removed.to_string()),
                        ],
                    );
                    errors.push(TaskError {
                        instance: tasks[i].instance.clone(),
                        descriptor: tasks[i].descriptor.clone(),
                        error,
                    });
                }
                Poll::Pending => {
                    let wait = state.borrow_mut().pending_wait.take();
                    match wait {
                        Some(awaited) => {
                            Logger::trace(
                                "TASK_SUSPENDED",
                                &[
                                    ("pass_id", pass_id.as_str()),
                                    ("instance", tasks[i].instance.as_str()),
                                    ("awaits", awaited.as_str()),
                                ],
                            );
                            suspended.insert(i, awaited);
                        }
                        None => {
                            // The contract allows suspension only inside
                            // resolve(); anything else would hang the pass.
                            tasks[i].future = None;
                            state.borrow_mut().accumulator.rollback_from(tasks[i].mark);
                            errors.push(TaskError {
                                instance: tasks[i].instance.clone(),
                                descriptor: tasks[i].descriptor.clone(),
                                error: EmitError::failed(
                                    "task suspended outside variable resolution",
                                ),
                            });
                        }
                    }
                }
            }

            // Wake tasks whose awaited variable now exists.
            let woken: Vec<usize> = {
                let st = state.borrow();
                suspended
                    .iter()
                    .filter(|(_, id)| st.variables.contains(id))
                    .map(|(&idx, _)| idx)
                    .collect()
            };
            for idx in woken {
                suspended.remove(&idx);
                queue.push_back(idx);
            }
        }

        // End of pass: every still-suspended task is stranded.
        for (i, awaited) in suspended {
            state.borrow_mut().accumulator.rollback_from(tasks[i].mark);
            Logger::error(
                "TASK_UNRESOLVED",
                &[
                    ("pass_id", pass_id.as_str()),
                    ("instance", tasks[i].instance.as_str()),
                    ("awaits", awaited.as_str()),
                ],
            );
            errors.push(TaskError {
                instance: tasks[i].instance.clone(),
                descriptor: tasks[i].descriptor.clone(),
                error: EmitError::UnresolvedReference(awaited),
            });
        }

        drop(tasks);
        let mut st = state.borrow_mut();
        SchedulerOutcome {
            statements: std::mem::take(&mut st.accumulator).into_statements(),
            variables: std::mem::take(&mut st.variables),
            errors,
        }
    }
}
