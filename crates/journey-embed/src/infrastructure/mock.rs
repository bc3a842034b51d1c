//! Mock host page for unit and integration testing.
//!
//! [`MockPlatform`] stands in for the browser window: it keeps a registry of
//! message listeners, a virtual clock with a timer queue, and a log of every
//! posted message.  [`MockOverlay`] records create/show/hide/destroy calls in
//! an [`OverlayLog`] shared with the platform, so a test can inspect the
//! overlay after it has been moved into a journey.
//!
//! Nothing here runs on its own: messages are delivered with
//! [`MockPlatform::deliver`] and timers fire only when the test calls
//! [`MockPlatform::advance`].

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use journey_core::{FrameSpec, HostError, TrustedOrigins};
use serde_json::{json, Value};

use super::platform::{InboundMessage, MessageHandler, Overlay, Platform};

/// Virtual clock start: 2023-11-14T22:13:20Z.
pub const MOCK_EPOCH_MS: i64 = 1_700_000_000_000;

/// Identity of a simulated browsing context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MockWindow(pub u64);

/// Counters and state of the most recently created [`MockOverlay`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayLog {
    pub created: u32,
    pub shown: u32,
    pub hidden: u32,
    pub destroyed: u32,
    pub visible: bool,
    /// Frame description passed to the last `create`.
    pub spec: Option<FrameSpec>,
}

/// Failure switches for exercising error paths.
#[derive(Debug, Clone, Default)]
pub struct MockBehaviour {
    pub fail_create: bool,
    pub fail_show: bool,
    pub fail_listen: bool,
    pub fail_post: bool,
    /// Create frames whose content window is never available.
    pub frame_without_window: bool,
}

/// A message recorded by [`Platform::post_message`].
#[derive(Debug, Clone, PartialEq)]
pub struct PostedMessage {
    pub target: MockWindow,
    pub message: Value,
    pub target_origin: String,
}

// ── Frame ─────────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct FrameState {
    spec: FrameSpec,
    window: Option<MockWindow>,
}

/// Handle to a simulated `<iframe>`.
#[derive(Debug, Clone)]
pub struct MockFrame {
    state: Rc<RefCell<FrameState>>,
}

impl MockFrame {
    pub fn spec(&self) -> FrameSpec {
        self.state.borrow().spec.clone()
    }

    pub fn content_window(&self) -> Option<MockWindow> {
        self.state.borrow().window
    }

    /// Simulates the frame being removed from the document.
    pub fn detach(&self) {
        self.state.borrow_mut().window = None;
    }
}

// ── Overlay ───────────────────────────────────────────────────────────────────

/// In-memory [`Overlay`] that records its calls.
pub struct MockOverlay {
    log: Rc<RefCell<OverlayLog>>,
    behaviour: Rc<RefCell<MockBehaviour>>,
    window: MockWindow,
    frame: Option<MockFrame>,
    visible: bool,
}

impl Overlay for MockOverlay {
    type Frame = MockFrame;

    fn create(&mut self, spec: &FrameSpec) -> Result<(), HostError> {
        let behaviour = self.behaviour.borrow().clone();
        if behaviour.fail_create {
            return Err(HostError::Dom("appendChild rejected the overlay".to_string()));
        }

        let window = (!behaviour.frame_without_window).then_some(self.window);
        self.frame = Some(MockFrame {
            state: Rc::new(RefCell::new(FrameState {
                spec: spec.clone(),
                window,
            })),
        });

        let mut log = self.log.borrow_mut();
        log.created += 1;
        log.spec = Some(spec.clone());
        Ok(())
    }

    fn show(&mut self) -> Result<(), HostError> {
        if self.frame.is_none() {
            return Err(HostError::OverlayNotCreated);
        }
        if self.behaviour.borrow().fail_show {
            return Err(HostError::Dom("style update rejected".to_string()));
        }

        self.visible = true;
        let mut log = self.log.borrow_mut();
        log.shown += 1;
        log.visible = true;
        Ok(())
    }

    fn hide(&mut self) -> Result<(), HostError> {
        if self.frame.is_none() {
            return Ok(());
        }

        self.visible = false;
        let mut log = self.log.borrow_mut();
        log.hidden += 1;
        log.visible = false;
        Ok(())
    }

    fn destroy(&mut self) {
        if let Some(frame) = self.frame.take() {
            frame.detach();
        }
        self.visible = false;
        let mut log = self.log.borrow_mut();
        log.destroyed += 1;
        log.visible = false;
    }

    fn frame(&self) -> Option<MockFrame> {
        self.frame.clone()
    }

    fn is_visible(&self) -> bool {
        self.visible
    }
}

// ── Platform ──────────────────────────────────────────────────────────────────

/// Registration token for [`MockPlatform`] listeners.
#[derive(Debug)]
pub struct MockListener(u64);

struct PendingTimer {
    due_ms: i64,
    seq: u64,
    task: Box<dyn FnOnce()>,
}

/// In-memory host page.
pub struct MockPlatform {
    listeners: RefCell<Vec<(u64, MessageHandler<MockWindow>)>>,
    timers: RefCell<Vec<PendingTimer>>,
    posted: RefCell<Vec<PostedMessage>>,
    overlay_log: Rc<RefCell<OverlayLog>>,
    behaviour: Rc<RefCell<MockBehaviour>>,
    frame_window: Cell<Option<MockWindow>>,
    next_id: Cell<u64>,
    now_ms: Cell<i64>,
    registrations: Cell<u32>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self {
            listeners: RefCell::new(Vec::new()),
            timers: RefCell::new(Vec::new()),
            posted: RefCell::new(Vec::new()),
            overlay_log: Rc::new(RefCell::new(OverlayLog::default())),
            behaviour: Rc::new(RefCell::new(MockBehaviour::default())),
            frame_window: Cell::new(None),
            next_id: Cell::new(1),
            now_ms: Cell::new(MOCK_EPOCH_MS),
            registrations: Cell::new(0),
        }
    }

    fn next_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    /// Changes failure switches for subsequent calls.
    pub fn configure(&self, f: impl FnOnce(&mut MockBehaviour)) {
        f(&mut self.behaviour.borrow_mut());
    }

    /// Dispatches `message` to every registered listener, in registration order.
    pub fn deliver(&self, message: InboundMessage<MockWindow>) {
        // Snapshot so listeners may deregister themselves while running.
        let handlers: Vec<MessageHandler<MockWindow>> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect();

        for handler in handlers {
            handler(message.clone());
        }
    }

    /// Delivers `data` as if posted by the journey frame from the primary
    /// trusted origin.
    pub fn deliver_from_frame(&self, data: Value) {
        self.deliver(InboundMessage {
            origin: TrustedOrigins::builtin().primary().to_string(),
            source: self.frame_window.get(),
            data,
        });
    }

    /// Builds a well-formed envelope stamped with the virtual clock.
    pub fn envelope(&self, event_type: &str, session_id: &str, data: Option<Value>) -> Value {
        let mut value = json!({
            "type": event_type,
            "sessionId": session_id,
            "timestamp": self.now_ms.get(),
        });
        if let Some(data) = data {
            value["data"] = data;
        }
        value
    }

    /// Window of the most recently created overlay frame.
    pub fn frame_window(&self) -> Option<MockWindow> {
        self.frame_window.get()
    }

    /// A window that is not the journey frame (another iframe on the page).
    pub fn foreign_window(&self) -> MockWindow {
        MockWindow(self.next_id())
    }

    /// Moves the virtual clock forward and runs every timer that falls due,
    /// in due-time order.  Timers scheduled by a running timer are honoured
    /// if they fall inside the same window.
    pub fn advance(&self, by: Duration) {
        let target = self.now_ms.get() + by.as_millis() as i64;

        loop {
            let next = {
                let mut timers = self.timers.borrow_mut();
                let position = timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due_ms <= target)
                    .min_by_key(|(_, t)| (t.due_ms, t.seq))
                    .map(|(i, _)| i);
                position.map(|i| timers.remove(i))
            };

            let Some(timer) = next else { break };
            self.now_ms.set(timer.due_ms);
            (timer.task)();
        }

        self.now_ms.set(target);
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Total number of successful `add_message_listener` calls.
    pub fn registrations(&self) -> u32 {
        self.registrations.get()
    }

    pub fn posted(&self) -> Vec<PostedMessage> {
        self.posted.borrow().clone()
    }

    pub fn overlay_log(&self) -> OverlayLog {
        self.overlay_log.borrow().clone()
    }
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for MockPlatform {
    type Window = MockWindow;
    type Frame = MockFrame;
    type Overlay = MockOverlay;
    type Listener = MockListener;

    fn new_overlay(&self) -> MockOverlay {
        let window = MockWindow(self.next_id());
        self.frame_window.set(Some(window));
        *self.overlay_log.borrow_mut() = OverlayLog::default();

        MockOverlay {
            log: Rc::clone(&self.overlay_log),
            behaviour: Rc::clone(&self.behaviour),
            window,
            frame: None,
            visible: false,
        }
    }

    fn content_window(&self, frame: &MockFrame) -> Option<MockWindow> {
        frame.content_window()
    }

    fn add_message_listener(
        &self,
        handler: MessageHandler<MockWindow>,
    ) -> Result<MockListener, HostError> {
        if self.behaviour.borrow().fail_listen {
            return Err(HostError::Messaging("addEventListener threw".to_string()));
        }

        let id = self.next_id();
        self.listeners.borrow_mut().push((id, handler));
        self.registrations.set(self.registrations.get() + 1);
        Ok(MockListener(id))
    }

    fn remove_message_listener(&self, listener: MockListener) {
        self.listeners.borrow_mut().retain(|(id, _)| *id != listener.0);
    }

    fn post_message(
        &self,
        target: &MockWindow,
        message: &Value,
        target_origin: &str,
    ) -> Result<(), HostError> {
        if self.behaviour.borrow().fail_post {
            return Err(HostError::Messaging("postMessage threw".to_string()));
        }

        self.posted.borrow_mut().push(PostedMessage {
            target: *target,
            message: message.clone(),
            target_origin: target_origin.to_string(),
        });
        Ok(())
    }

    fn set_timeout(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        let seq = self.next_id();
        self.timers.borrow_mut().push(PendingTimer {
            due_ms: self.now_ms.get() + delay.as_millis() as i64,
            seq,
            task,
        });
    }

    fn now_millis(&self) -> i64 {
        self.now_ms.get()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use journey_core::{validate_connection, EmbedSettings};

    fn make_spec() -> FrameSpec {
        let settings = EmbedSettings::default();
        let conn = validate_connection(
            "https://connect.data.one?token=t",
            "s-1",
            &settings.trusted_origins,
        )
        .unwrap();
        FrameSpec::for_connection(&conn, &settings.trusted_origins, &settings.frame_title)
    }

    #[test]
    fn test_overlay_show_before_create_fails() {
        // Arrange
        let platform = MockPlatform::new();
        let mut overlay = platform.new_overlay();

        // Act
        let result = overlay.show();

        // Assert
        assert_eq!(result, Err(HostError::OverlayNotCreated));
    }

    #[test]
    fn test_overlay_records_lifecycle_calls() {
        let platform = MockPlatform::new();
        let mut overlay = platform.new_overlay();

        overlay.create(&make_spec()).unwrap();
        overlay.show().unwrap();
        assert!(platform.overlay_log().visible);
        overlay.hide().unwrap();
        overlay.destroy();

        let log = platform.overlay_log();
        assert_eq!((log.created, log.shown, log.hidden, log.destroyed), (1, 1, 1, 1));
        assert!(!log.visible);
        assert!(overlay.frame().is_none());
    }

    #[test]
    fn test_destroy_detaches_frame_window() {
        let platform = MockPlatform::new();
        let mut overlay = platform.new_overlay();
        overlay.create(&make_spec()).unwrap();
        let frame = overlay.frame().unwrap();
        assert_eq!(frame.content_window(), platform.frame_window());

        overlay.destroy();

        assert_eq!(frame.content_window(), None);
    }

    #[test]
    fn test_frame_without_window_switch() {
        let platform = MockPlatform::new();
        platform.configure(|b| b.frame_without_window = true);
        let mut overlay = platform.new_overlay();

        overlay.create(&make_spec()).unwrap();

        assert_eq!(platform.content_window(&overlay.frame().unwrap()), None);
    }

    #[test]
    fn test_listener_registration_and_removal() {
        let platform = MockPlatform::new();
        let hits = Rc::new(Cell::new(0));
        let hits_in_handler = Rc::clone(&hits);
        let handler: MessageHandler<MockWindow> =
            Rc::new(move |_msg| hits_in_handler.set(hits_in_handler.get() + 1));

        let listener = platform.add_message_listener(handler).unwrap();
        platform.deliver_from_frame(json!({}));
        platform.remove_message_listener(listener);
        platform.deliver_from_frame(json!({}));

        assert_eq!(hits.get(), 1);
        assert_eq!(platform.listener_count(), 0);
    }

    #[test]
    fn test_timers_fire_in_due_order_only_when_due() {
        // Arrange
        let platform = MockPlatform::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for (label, ms) in [("late", 500_u64), ("early", 100)] {
            let order = Rc::clone(&order);
            platform.set_timeout(
                Duration::from_millis(ms),
                Box::new(move || order.borrow_mut().push(label)),
            );
        }

        // Act / Assert
        platform.advance(Duration::from_millis(99));
        assert!(order.borrow().is_empty());

        platform.advance(Duration::from_millis(1));
        assert_eq!(*order.borrow(), vec!["early"]);

        platform.advance(Duration::from_millis(400));
        assert_eq!(*order.borrow(), vec!["early", "late"]);
        assert_eq!(platform.pending_timers(), 0);
    }

    #[test]
    fn test_clock_advances() {
        let platform = MockPlatform::new();
        platform.advance(Duration::from_secs(2));
        assert_eq!(platform.now_millis(), MOCK_EPOCH_MS + 2_000);
    }

    #[test]
    fn test_envelope_shape() {
        let platform = MockPlatform::new();
        let value = platform.envelope("exit", "s-1", None);
        assert_eq!(value["type"], "exit");
        assert_eq!(value["sessionId"], "s-1");
        assert_eq!(value["timestamp"], MOCK_EPOCH_MS);
        assert!(value.get("data").is_none());
    }
}
