//! Statements and the accumulator
//!
//! A statement is an immutable, ordered record of one emission action along
//! with the handles and values it closed over. The core never renders
//! source text; the external emitter consumes the serialized stream. Build
//! flag, define, and library requests are ordinary statement kinds that the
//! external build configuration collector filters out.
//!
//! The accumulator preserves append order and never deduplicates. Rollback
//! is scoped: a mark carries the task it was taken for, and rolling back
//! removes only that task's statements appended since the mark, leaving
//! interleaved statements of other tasks untouched.

use serde::Serialize;

use crate::value::Value;

use super::variables::VariableHandle;

/// Identity of one emission task within a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub(crate) usize);

/// One argument a statement closed over.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Arg {
    /// A literal configuration value
    Literal(Value),
    /// A reference to a declared variable
    Var(VariableHandle),
}

/// The action a statement records.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StatementKind {
    /// Construct the object behind `var` with `args`.
    Construct {
        var: VariableHandle,
        ty: String,
        args: Vec<Arg>,
    },
    /// Register `var` with a named runtime facility (component loop, bus,
    /// poller).
    Register {
        var: VariableHandle,
        facility: String,
    },
    /// Invoke a setter or mutator on `var`.
    SetField {
        var: VariableHandle,
        field: String,
        args: Vec<Arg>,
    },
    /// Request a library at build time.
    AddLibrary { name: String },
    /// Request a preprocessor define.
    AddDefine {
        name: String,
        value: Option<String>,
    },
    /// Request a raw build flag.
    AddBuildFlag { flag: String },
}

impl StatementKind {
    /// Whether this statement is consumed by the external build
    /// configuration collector rather than the text emitter.
    pub fn is_build_request(&self) -> bool {
        matches!(
            self,
            StatementKind::AddLibrary { .. }
                | StatementKind::AddDefine { .. }
                | StatementKind::AddBuildFlag { .. }
        )
    }
}

/// One appended statement. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    /// Position in emission order
    seq: u64,
    #[serde(skip)]
    owner: TaskId,
    #[serde(flatten)]
    kind: StatementKind,
}

impl Statement {
    /// Returns the statement's position in emission order.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Returns the recorded action.
    pub fn kind(&self) -> &StatementKind {
        &self.kind
    }
}

/// A rollback mark, scoped to the task it was taken for.
#[derive(Debug, Clone, Copy)]
pub struct Mark {
    owner: TaskId,
    seq: u64,
}

/// Ordered store of every emitted statement.
#[derive(Debug, Default)]
pub struct Accumulator {
    statements: Vec<Statement>,
    next_seq: u64,
}

impl Accumulator {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a statement on behalf of `owner`.
    pub fn append(&mut self, owner: TaskId, kind: StatementKind) {
        self.statements.push(Statement {
            seq: self.next_seq,
            owner,
            kind,
        });
        self.next_seq += 1;
    }

    /// Returns every statement in emission order. Restartable read; nothing
    /// is consumed.
    pub fn all(&self) -> &[Statement] {
        &self.statements
    }

    /// Returns the number of recorded statements.
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Returns whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Takes a rollback mark for `owner` at the current position.
    pub fn mark(&self, owner: TaskId) -> Mark {
        Mark {
            owner,
            seq: self.next_seq,
        }
    }

    /// Removes every statement the marked task appended since the mark.
    /// Statements of other tasks keep their places. Returns the number
    /// removed.
    pub fn rollback_from(&mut self, mark: Mark) -> usize {
        let before = self.statements.len();
        self.statements
            .retain(|s| s.owner != mark.owner || s.seq < mark.seq);
        before - self.statements.len()
    }

    /// Consumes the accumulator, yielding the ordered statements.
    pub fn into_statements(self) -> Vec<Statement> {
        self.statements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Ident;
    use crate::emit::variables::VariableTable;

    fn handle(table: &mut VariableTable, id: &str, ty: &str) -> VariableHandle {
        table.declare(Ident::new(id), ty).unwrap()
    }

    #[test]
    fn test_append_preserves_order_and_duplicates() {
        let mut acc = Accumulator::new();
        let t = TaskId(0);
        acc.append(t, StatementKind::AddBuildFlag { flag: "-DUSE_HOST".into() });
        acc.append(t, StatementKind::AddBuildFlag { flag: "-DUSE_HOST".into() });

        assert_eq!(acc.len(), 2);
        assert_eq!(acc.all()[0].seq(), 0);
        assert_eq!(acc.all()[1].seq(), 1);
        assert_eq!(acc.all()[0].kind(), acc.all()[1].kind());
    }

    #[test]
    fn test_rollback_removes_only_marked_task() {
        let mut table = VariableTable::new();
        let var_a = handle(&mut table, "a", "A");
        let var_b = handle(&mut table, "b", "B");

        let mut acc = Accumulator::new();
        let t0 = TaskId(0);
        let t1 = TaskId(1);

        acc.append(
            t0,
            StatementKind::Construct { var: var_a.clone(), ty: "A".into(), args: vec![] },
        );
        let mark = acc.mark(t1);
        acc.append(
            t1,
            StatementKind::Construct { var: var_b.clone(), ty: "B".into(), args: vec![] },
        );
        // Interleaved: t0 appends after t1's mark.
        acc.append(
            t0,
            StatementKind::SetField { var: var_a.clone(), field: "set_width".into(), args: vec![] },
        );
        acc.append(
            t1,
            StatementKind::SetField { var: var_b, field: "set_parent".into(), args: vec![] },
        );

        let removed = acc.rollback_from(mark);
        assert_eq!(removed, 2);
        assert_eq!(acc.len(), 2);
        // t0's statements survive in their original order.
        assert!(matches!(acc.all()[0].kind(), StatementKind::Construct { .. }));
        assert!(matches!(acc.all()[1].kind(), StatementKind::SetField { field, .. } if field == "set_width"));
    }

    #[test]
    fn test_rollback_respects_mark_position() {
        let mut acc = Accumulator::new();
        let t = TaskId(0);
        acc.append(t, StatementKind::AddLibrary { name: "esp_lcd".into() });
        let mark = acc.mark(t);
        acc.append(t, StatementKind::AddDefine { name: "BOARD".into(), value: Some("host".into()) });

        assert_eq!(acc.rollback_from(mark), 1);
        assert_eq!(acc.len(), 1);
        assert!(matches!(acc.all()[0].kind(), StatementKind::AddLibrary { .. }));
    }

    #[test]
    fn test_build_request_classification() {
        let mut table = VariableTable::new();
        let var = handle(&mut table, "x", "X");

        assert!(StatementKind::AddLibrary { name: "l".into() }.is_build_request());
        assert!(StatementKind::AddDefine { name: "d".into(), value: None }.is_build_request());
        assert!(StatementKind::AddBuildFlag { flag: "-f".into() }.is_build_request());
        assert!(!StatementKind::Register { var, facility: "component".into() }.is_build_request());
    }
}
