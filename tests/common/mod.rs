// tests/common/mod.rs
// Mock collaborators and fixtures shared by the controller integration tests

#![allow(dead_code)]

use chrono::NaiveDate;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tokio::sync::Notify;

use tablesync::table::collaborators::{
    Collaborators, ConfirmationPrompt, DeleteReceipt, EditSurface, FetchResult,
    FocusScrollSink, NotificationSink, RemoteStore, UpsertReceipt,
};
use tablesync::{
    EditEvent, EngineSettings, RemoteError, Row, RowId, RowState, TableController,
    TableOperationFeedback, TableSchema, Value, WeakTableController,
};

#[derive(Default)]
pub struct MockRemote {
    pub server_rows: RefCell<Vec<Row>>,
    pub upsert_calls: RefCell<Vec<Vec<Row>>>,
    pub delete_calls: RefCell<Vec<Vec<RowId>>>,
    pub log: RefCell<Vec<&'static str>>,
    pub fail_upsert: RefCell<Option<RemoteError>>,
    pub fail_delete: RefCell<Option<RemoteError>>,
    /// When set, `upsert_batch` waits for one notification before answering.
    pub upsert_gate: RefCell<Option<Rc<Notify>>>,
    /// When set, `delete_batch` waits for one notification before answering.
    pub delete_gate: RefCell<Option<Rc<Notify>>>,
}

#[async_trait::async_trait(?Send)]
impl RemoteStore for MockRemote {
    async fn fetch_all(&self) -> Result<FetchResult, RemoteError> {
        self.log.borrow_mut().push("fetch");
        let rows = self.server_rows.borrow().clone();
        let total_count = rows.len() as u64;
        Ok(FetchResult { rows, total_count })
    }

    async fn upsert_batch(&self, rows: &[Row]) -> Result<UpsertReceipt, RemoteError> {
        self.log.borrow_mut().push("upsert");
        self.upsert_calls.borrow_mut().push(rows.to_vec());
        let gate = self.upsert_gate.borrow().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(err) = self.fail_upsert.borrow().clone() {
            return Err(err);
        }
        let saved: Vec<Row> = rows
            .iter()
            .map(|r| Row {
                state: RowState::Persisted,
                ..r.clone()
            })
            .collect();
        *self.server_rows.borrow_mut() = saved.clone();
        Ok(UpsertReceipt {
            total_count: Some(saved.len() as u64),
            rows: saved,
        })
    }

    async fn delete_batch(&self, ids: &[RowId]) -> Result<DeleteReceipt, RemoteError> {
        self.log.borrow_mut().push("delete");
        self.delete_calls.borrow_mut().push(ids.to_vec());
        let gate = self.delete_gate.borrow().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(err) = self.fail_delete.borrow().clone() {
            return Err(err);
        }
        let mut server = self.server_rows.borrow_mut();
        server.retain(|r| !ids.contains(&r.id));
        Ok(DeleteReceipt {
            updated_count: server.len() as u64,
        })
    }
}

/// Edit surface that records requests and, when `auto_settle` is on, answers them
/// immediately by calling back into the controller.
pub struct MockSurface {
    pub controller: RefCell<Option<WeakTableController>>,
    pub auto_settle: Cell<bool>,
    pub enter_requests: RefCell<Vec<(RowId, Option<String>)>>,
    pub exit_requests: RefCell<Vec<(RowId, bool)>>,
}

impl MockSurface {
    pub fn new() -> Self {
        Self {
            controller: RefCell::new(None),
            auto_settle: Cell::new(true),
            enter_requests: RefCell::new(Vec::new()),
            exit_requests: RefCell::new(Vec::new()),
        }
    }

    fn send(&self, event: EditEvent) {
        let controller = self.controller.borrow().as_ref().and_then(|w| w.upgrade());
        if let Some(controller) = controller {
            controller.handle_edit_event(event);
        }
    }
}

impl EditSurface for MockSurface {
    fn request_enter_edit(&self, row_id: &RowId, focus_field: Option<&str>) {
        self.enter_requests
            .borrow_mut()
            .push((row_id.clone(), focus_field.map(str::to_string)));
        if self.auto_settle.get() {
            self.send(EditEvent::Entered {
                row_id: row_id.clone(),
            });
        }
    }

    fn request_exit_edit(&self, row_id: &RowId, discard: bool) {
        self.exit_requests
            .borrow_mut()
            .push((row_id.clone(), discard));
        if self.auto_settle.get() {
            self.send(EditEvent::Exited {
                row_id: row_id.clone(),
                discard,
            });
        }
    }
}

#[derive(Default)]
pub struct MockNotifier {
    pub messages: RefCell<Vec<TableOperationFeedback>>,
}

impl MockNotifier {
    pub fn last(&self) -> Option<TableOperationFeedback> {
        self.messages.borrow().last().cloned()
    }
}

impl NotificationSink for MockNotifier {
    fn notify(&self, feedback: &TableOperationFeedback) {
        self.messages.borrow_mut().push(feedback.clone());
    }
}

#[derive(Default)]
pub struct MockFocus {
    pub calls: RefCell<Vec<(RowId, String)>>,
    pub fail: Cell<bool>,
}

impl FocusScrollSink for MockFocus {
    fn focus(&self, row_id: &RowId, field: &str) -> Result<(), String> {
        self.calls
            .borrow_mut()
            .push((row_id.clone(), field.to_string()));
        if self.fail.get() {
            Err("cell is not rendered".to_string())
        } else {
            Ok(())
        }
    }
}

pub struct MockConfirm {
    pub answer: Cell<bool>,
    pub questions: RefCell<Vec<String>>,
    /// When set, `ask` waits for one notification before answering.
    pub gate: RefCell<Option<Rc<Notify>>>,
}

impl Default for MockConfirm {
    fn default() -> Self {
        Self {
            answer: Cell::new(true),
            questions: RefCell::new(Vec::new()),
            gate: RefCell::new(None),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl ConfirmationPrompt for MockConfirm {
    async fn ask(&self, message: &str) -> bool {
        self.questions.borrow_mut().push(message.to_string());
        let gate = self.gate.borrow().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.answer.get()
    }
}

pub struct Harness {
    pub controller: TableController,
    pub remote: Rc<MockRemote>,
    pub surface: Rc<MockSurface>,
    pub notifier: Rc<MockNotifier>,
    pub focus: Rc<MockFocus>,
    pub confirm: Rc<MockConfirm>,
}

impl Harness {
    pub fn new(schema: TableSchema, rows: Vec<Row>) -> Self {
        Self::with_settings(schema, EngineSettings::default(), rows)
    }

    pub fn with_settings(schema: TableSchema, settings: EngineSettings, rows: Vec<Row>) -> Self {
        let remote = Rc::new(MockRemote::default());
        *remote.server_rows.borrow_mut() = rows.clone();
        let surface = Rc::new(MockSurface::new());
        let notifier = Rc::new(MockNotifier::default());
        let focus = Rc::new(MockFocus::default());
        let confirm = Rc::new(MockConfirm::default());

        let collaborators = Collaborators {
            remote: remote.clone(),
            surface: surface.clone(),
            notifier: notifier.clone(),
            focus: focus.clone(),
            confirm: confirm.clone(),
        };
        let controller = TableController::new(schema, settings, collaborators).unwrap();
        *surface.controller.borrow_mut() = Some(controller.downgrade());
        controller.load(rows, None).unwrap();

        Self {
            controller,
            remote,
            surface,
            notifier,
            focus,
            confirm,
        }
    }

    pub fn upsert_count(&self) -> usize {
        self.remote.upsert_calls.borrow().len()
    }

    pub fn delete_calls(&self) -> Vec<Vec<RowId>> {
        self.remote.delete_calls.borrow().clone()
    }
}

pub fn id(s: &str) -> RowId {
    RowId::from(s)
}

/// A persisted observation that passes validation.
pub fn observation(row_id: &str) -> Row {
    Row::persisted(row_id, TableSchema::observations().blank_fields())
        .with("species", Some(Value::Text("Turdus merula".into())))
        .with("count", Some(Value::Number(3.0)))
        .with(
            "observed_on",
            Some(Value::Date(NaiveDate::from_ymd_opt(2024, 4, 2).unwrap())),
        )
}
