//! In-memory stand-ins for the browser, used by unit tests.

use crate::{
    contact::{FormHandle, FormTransport, TransportError, TransportResponse},
    dom::{Document, Element, Notifier, PreferenceStore, ScrollBehavior},
    logging::{LogLevel, LogSink, Logger},
    outcome::{BestEffort, Ignored},
    timer::{Scheduler, TimerId},
};
use futures_util::future::LocalBoxFuture;
use serde_json::Value;
use std::{
    cell::{Cell, RefCell},
    collections::{BTreeMap, HashMap},
    rc::Rc,
};
use url::Url;

#[derive(Default)]
struct FakeElementState {
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    styles: BTreeMap<String, String>,
    text: String,
    top: f64,
    height: f64,
}

#[derive(Clone, Default)]
pub struct FakeElement {
    state: Rc<RefCell<FakeElementState>>,
}

impl FakeElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(id: &str) -> Self {
        Self::new().attr("id", id)
    }

    pub fn attr(self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn text_content(self, value: &str) -> Self {
        self.set_text(value);
        self
    }

    pub fn bounds(self, top: f64, height: f64) -> Self {
        {
            let mut state = self.state.borrow_mut();
            state.top = top;
            state.height = height;
        }
        self
    }

    pub fn style(&self, property: &str) -> Option<String> {
        self.state.borrow().styles.get(property).cloned()
    }

    pub fn class_name(&self) -> String {
        self.state.borrow().classes.join(" ")
    }
}

impl Element for FakeElement {
    fn attribute(&self, name: &str) -> Option<String> {
        self.state.borrow().attributes.get(name).cloned()
    }

    fn set_attribute(&self, name: &str, value: &str) {
        self.state
            .borrow_mut()
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    fn has_class(&self, class: &str) -> bool {
        self.state.borrow().classes.iter().any(|value| value == class)
    }

    fn add_class(&self, class: &str) {
        if !self.has_class(class) {
            self.state.borrow_mut().classes.push(class.to_string());
        }
    }

    fn remove_class(&self, class: &str) {
        self.state.borrow_mut().classes.retain(|value| value != class);
    }

    fn toggle_class(&self, class: &str) -> bool {
        if self.has_class(class) {
            self.remove_class(class);
            false
        } else {
            self.add_class(class);
            true
        }
    }

    fn set_class_name(&self, value: &str) {
        self.state.borrow_mut().classes = value.split_whitespace().map(ToString::to_string).collect();
    }

    fn set_style(&self, property: &str, value: &str) {
        self.state
            .borrow_mut()
            .styles
            .insert(property.to_string(), value.to_string());
    }

    fn text(&self) -> String {
        self.state.borrow().text.clone()
    }

    fn set_text(&self, value: &str) {
        self.state.borrow_mut().text = value.to_string();
    }

    fn offset_top(&self) -> f64 {
        self.state.borrow().top
    }

    fn offset_height(&self) -> f64 {
        self.state.borrow().height
    }
}

#[derive(Default)]
struct FakeDocumentState {
    elements: RefCell<Vec<FakeElement>>,
    scroll_y: Cell<f64>,
    scrolls: RefCell<Vec<(f64, ScrollBehavior)>>,
    scripts: RefCell<Vec<String>>,
}

#[derive(Clone, Default)]
pub struct FakeDocument {
    state: Rc<FakeDocumentState>,
}

impl FakeDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, element: FakeElement) -> FakeElement {
        self.state.elements.borrow_mut().push(element.clone());
        element
    }

    pub fn set_scroll_y(&self, value: f64) {
        self.state.scroll_y.set(value);
    }

    pub fn scrolls(&self) -> Vec<(f64, ScrollBehavior)> {
        self.state.scrolls.borrow().clone()
    }

    pub fn scripts(&self) -> Vec<String> {
        self.state.scripts.borrow().clone()
    }
}

impl Document for FakeDocument {
    type Element = FakeElement;

    fn element_by_id(&self, id: &str) -> Option<FakeElement> {
        self.state
            .elements
            .borrow()
            .iter()
            .find(|element| element.id().as_deref() == Some(id))
            .cloned()
    }

    fn scroll_y(&self) -> f64 {
        self.state.scroll_y.get()
    }

    fn scroll_to(&self, top: f64, behavior: ScrollBehavior) {
        self.state.scrolls.borrow_mut().push((top, behavior));
        self.state.scroll_y.set(top.max(0.0));
    }

    fn append_script(&self, src: &str) {
        self.state.scripts.borrow_mut().push(src.to_string());
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    values: Rc<RefCell<HashMap<String, String>>>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn with(self, key: &str, value: &str) -> Self {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    pub fn handle(&self) -> Rc<dyn PreferenceStore> {
        Rc::new(self.clone())
    }
}

impl PreferenceStore for MemoryStore {
    fn read(&self, key: &str) -> BestEffort<Option<String>> {
        if self.unavailable {
            return BestEffort::Ignored(Ignored::StorageUnavailable);
        }
        BestEffort::Applied(self.get(key))
    }

    fn write(&self, key: &str, value: &str) -> BestEffort<()> {
        if self.unavailable {
            return BestEffort::Ignored(Ignored::StorageUnavailable);
        }
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        BestEffort::Applied(())
    }
}

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    alerts: Rc<RefCell<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.borrow().clone()
    }

    pub fn handle(&self) -> Rc<dyn Notifier> {
        Rc::new(self.clone())
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_string());
    }
}

#[derive(Clone, Default)]
pub struct RecordingSink {
    lines: Rc<RefCell<Vec<String>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> Rc<dyn LogSink> {
        Rc::new(self.clone())
    }

    pub fn events(&self) -> Vec<Value> {
        self.lines
            .borrow()
            .iter()
            .map(|line| serde_json::from_str(line).expect("log lines are JSON"))
            .collect()
    }

    pub fn event_names(&self) -> Vec<String> {
        self.events()
            .iter()
            .filter_map(|event| event["event"].as_str().map(ToString::to_string))
            .collect()
    }
}

impl LogSink for RecordingSink {
    fn write(&self, _level: LogLevel, line: &str) {
        self.lines.borrow_mut().push(line.to_string());
    }
}

pub fn recording_logger() -> (Logger, RecordingSink) {
    let sink = RecordingSink::new();
    (Logger::new(LogLevel::Debug, sink.handle()), sink)
}

struct PendingTimer {
    id: i32,
    due: u64,
    task: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct SchedulerState {
    now: Cell<u64>,
    next_id: Cell<i32>,
    queue: RefCell<Vec<PendingTimer>>,
}

/// Virtual clock. Timers only fire inside [`ManualScheduler::advance`].
#[derive(Clone, Default)]
pub struct ManualScheduler {
    state: Rc<SchedulerState>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> Rc<dyn Scheduler> {
        Rc::new(self.clone())
    }

    pub fn pending(&self) -> usize {
        self.state.queue.borrow().len()
    }

    pub fn advance(&self, ms: u64) {
        let target = self.state.now.get() + ms;

        loop {
            let next = {
                let mut queue = self.state.queue.borrow_mut();
                let position = queue
                    .iter()
                    .enumerate()
                    .filter(|(_, timer)| timer.due <= target)
                    .min_by_key(|(_, timer)| (timer.due, timer.id))
                    .map(|(position, _)| position);
                position.map(|position| queue.remove(position))
            };

            let Some(timer) = next else {
                break;
            };
            self.state.now.set(timer.due);
            (timer.task)();
        }

        self.state.now.set(target);
    }
}

impl Scheduler for ManualScheduler {
    fn set_timeout(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Option<TimerId> {
        let id = self.state.next_id.get() + 1;
        self.state.next_id.set(id);
        self.state.queue.borrow_mut().push(PendingTimer {
            id,
            due: self.state.now.get() + u64::from(delay_ms),
            task,
        });
        Some(TimerId(id))
    }

    fn clear_timeout(&self, id: TimerId) {
        self.state.queue.borrow_mut().retain(|timer| timer.id != id.0);
    }
}

#[derive(Clone, Default)]
pub struct FakeForm {
    action: Option<String>,
    fields: Rc<RefCell<Vec<(String, String)>>>,
    resets: Rc<Cell<u32>>,
}

impl FakeForm {
    pub fn new(action: Option<&str>, fields: &[(&str, &str)]) -> Self {
        Self {
            action: action.map(ToString::to_string),
            fields: Rc::new(RefCell::new(
                fields
                    .iter()
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .collect(),
            )),
            resets: Rc::new(Cell::new(0)),
        }
    }

    pub fn resets(&self) -> u32 {
        self.resets.get()
    }
}

impl FormHandle for FakeForm {
    fn action(&self) -> Option<String> {
        self.action.clone()
    }

    fn fields(&self) -> Vec<(String, String)> {
        self.fields.borrow().clone()
    }

    fn reset(&self) {
        for (_, value) in self.fields.borrow_mut().iter_mut() {
            value.clear();
        }
        self.resets.set(self.resets.get() + 1);
    }
}

#[derive(Clone)]
pub struct StubTransport {
    reply: Result<TransportResponse, TransportError>,
    requests: Rc<RefCell<Vec<(Url, Vec<(String, String)>)>>>,
}

impl StubTransport {
    pub fn replying(status: u16, body: &str) -> Self {
        Self {
            reply: Ok(TransportResponse {
                status,
                body: body.to_string(),
            }),
            requests: Rc::default(),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(TransportError::Network(message.to_string())),
            requests: Rc::default(),
        }
    }

    pub fn requests(&self) -> Vec<(Url, Vec<(String, String)>)> {
        self.requests.borrow().clone()
    }
}

impl FormTransport for StubTransport {
    fn post(
        &self,
        url: Url,
        fields: Vec<(String, String)>,
    ) -> LocalBoxFuture<'_, Result<TransportResponse, TransportError>> {
        self.requests.borrow_mut().push((url, fields));
        let reply = self.reply.clone();
        Box::pin(async move { reply })
    }
}
