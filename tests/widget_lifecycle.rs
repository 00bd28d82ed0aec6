use std::sync::atomic::{ AtomicBool, Ordering };
use std::sync::{ Arc, Mutex };
use std::time::Duration;

use async_trait::async_trait;
use landmark_chat_widget::config::{ BrandingPatch, ConfigPatch, Position, WidgetConfig };
use landmark_chat_widget::models::{ BotReply, Message, Role, Session, SessionMode };
use landmark_chat_widget::models::wire::SessionHistory;
use landmark_chat_widget::transport::demo::DemoTransport;
use landmark_chat_widget::transport::{ ChatTransport, TransportError };
use landmark_chat_widget::widget::{ AUTO_OPEN_DELAY, ChatWidget, ViewState, Visibility, WidgetView };

#[derive(Default)]
struct RecordingView {
    states: Mutex<Vec<ViewState>>,
    unmounted: AtomicBool,
}

impl RecordingView {
    fn last(&self) -> ViewState {
        self.states.lock().unwrap().last().cloned().expect("nothing rendered")
    }
}

impl WidgetView for RecordingView {
    fn render(&self, state: &ViewState) {
        self.states.lock().unwrap().push(state.clone());
    }

    fn unmount(&self) {
        self.unmounted.store(true, Ordering::SeqCst);
    }
}

/// Counts sessions and records the history sent with every utterance.
#[derive(Default)]
struct ScriptedTransport {
    sessions: Mutex<u32>,
    histories: Mutex<Vec<Vec<Message>>>,
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn initialize_session(&self) -> Session {
        let mut count = self.sessions.lock().unwrap();
        *count += 1;
        Session::new(format!("scripted-{}", *count), SessionMode::Live)
    }

    async fn send_message(
        &self,
        _session: &Session,
        utterance: &str,
        history: &[Message]
    ) -> Result<BotReply, TransportError> {
        self.histories.lock().unwrap().push(history.to_vec());
        if utterance == "fail" {
            return Err(TransportError::Unavailable("scripted failure".into()));
        }
        Ok(BotReply {
            text: format!("ack {}", utterance),
            suggestions: None,
            metadata: None,
        })
    }

    async fn fetch_session_history(&self, session_id: &str) -> Result<SessionHistory, TransportError> {
        Ok(SessionHistory { session_id: session_id.to_string(), messages: vec![] })
    }

    fn describe(&self) -> String {
        "scripted".into()
    }
}

fn instant_demo() -> Arc<DemoTransport> {
    Arc::new(DemoTransport::new().with_delay(Duration::ZERO, Duration::ZERO))
}

async fn eventually(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached in time");
}

#[tokio::test]
async fn init_twice_is_a_no_op() {
    let transport = Arc::new(ScriptedTransport::default());
    let mut widget = ChatWidget::new(WidgetConfig::default(), Arc::new(RecordingView::default()))
        .with_transport(transport.clone());

    widget.init().await;
    let session = widget.controller().unwrap().session().unwrap();
    widget.init().await;

    assert_eq!(widget.controller().unwrap().session().unwrap(), session);
    assert_eq!(*transport.sessions.lock().unwrap(), 1);
}

#[tokio::test]
async fn handle_drives_the_widget() {
    let view = Arc::new(RecordingView::default());
    let mut widget = ChatWidget::new(WidgetConfig::default(), view.clone()).with_transport(instant_demo());
    let handle = widget.handle();
    widget.init().await;
    let controller = widget.controller().unwrap().clone();

    handle.open().unwrap();
    eventually(|| controller.visibility() == Visibility::Open).await;
    assert!(!controller.has_unread());

    handle.send_message("I'd like to book a room").unwrap();
    eventually(|| controller.messages().len() == 3).await;
    let messages = controller.messages();
    assert_eq!(messages[1].role(), Role::User);
    assert_eq!(messages[1].text(), "I'd like to book a room");
    assert!(messages[2].text().contains("Executive Suites"));
    assert!(!view.last().typing);

    handle.close().unwrap();
    eventually(|| controller.visibility() == Visibility::Hidden).await;
    assert_eq!(controller.messages().len(), 3);
}

#[tokio::test]
async fn commands_sent_before_init_are_buffered() {
    let mut widget = ChatWidget::new(WidgetConfig::default(), Arc::new(RecordingView::default()))
        .with_transport(instant_demo());
    let handle = widget.handle();
    handle.open().unwrap();

    widget.init().await;
    let controller = widget.controller().unwrap().clone();
    eventually(|| controller.visibility() == Visibility::Open).await;
}

#[tokio::test]
async fn update_config_keeps_the_conversation() {
    let view = Arc::new(RecordingView::default());
    let mut widget = ChatWidget::new(WidgetConfig::default(), view.clone()).with_transport(instant_demo());
    widget.init().await;
    let controller = widget.controller().unwrap().clone();
    controller.submit("where are you?").await.unwrap();

    let session = controller.session().unwrap();
    let log = controller.messages();

    widget.update_config(
        &(ConfigPatch {
            branding: Some(BrandingPatch { title: Some("Landmark Beach".into()), subtitle: None }),
            position: Some(Position::TopLeft),
            ..Default::default()
        })
    );

    assert_eq!(widget.config().branding.title, "Landmark Beach");
    assert_eq!(widget.config().position, Position::TopLeft);
    assert_eq!(controller.session().unwrap(), session);
    assert_eq!(controller.messages(), log);

    let rendered = view.last();
    assert_eq!(rendered.config.branding.title, "Landmark Beach");
    assert_eq!(rendered.session_id.as_deref(), Some(session.id.as_str()));
    assert_eq!(rendered.messages, log);
}

#[tokio::test]
async fn update_config_before_init_is_applied_at_mount() {
    let mut widget = ChatWidget::new(WidgetConfig::default(), Arc::new(RecordingView::default()))
        .with_transport(instant_demo());
    widget.update_config(&(ConfigPatch { auto_open: Some(false), demo: Some(true), ..Default::default() }));
    assert!(!widget.is_initialized());
    widget.init().await;
    assert!(widget.controller().unwrap().config().demo);
}

#[tokio::test]
async fn destroy_then_init_starts_a_fresh_session() {
    let view = Arc::new(RecordingView::default());
    let transport = Arc::new(ScriptedTransport::default());
    let mut widget = ChatWidget::new(WidgetConfig::default(), view.clone()).with_transport(transport.clone());
    let handle = widget.handle();

    widget.init().await;
    let first = widget.controller().unwrap().session().unwrap();
    widget.controller().unwrap().submit("hello").await.unwrap();

    widget.destroy().await;
    assert!(!widget.is_initialized());
    assert!(widget.controller().is_none());
    assert!(view.unmounted.load(Ordering::SeqCst));

    widget.init().await;
    let controller = widget.controller().unwrap().clone();
    assert_ne!(controller.session().unwrap().id, first.id);
    assert_eq!(controller.messages().len(), 1);

    handle.open().unwrap();
    eventually(|| controller.visibility() == Visibility::Open).await;
}

#[tokio::test]
async fn destroy_without_init_is_harmless() {
    let mut widget = ChatWidget::new(WidgetConfig::default(), Arc::new(RecordingView::default()));
    widget.destroy().await;
    assert!(!widget.is_initialized());
}

#[tokio::test(start_paused = true)]
async fn auto_open_fires_after_delay() {
    let config = WidgetConfig { auto_open: true, ..WidgetConfig::default() };
    let mut widget = ChatWidget::new(config, Arc::new(RecordingView::default())).with_transport(instant_demo());
    widget.init().await;
    let controller = widget.controller().unwrap().clone();
    assert_eq!(controller.visibility(), Visibility::Hidden);

    tokio::time::sleep(AUTO_OPEN_DELAY + Duration::from_millis(10)).await;
    assert_eq!(controller.visibility(), Visibility::Open);
}

#[tokio::test]
async fn auto_init_reads_embed_attributes() {
    let widget = ChatWidget::auto_init(
        vec![
            ("data-demo", "true"),
            ("data-title", "Front Desk"),
            ("data-position", "bottom-left"),
            ("data-primary-color", "#ff0000")
        ],
        Arc::new(RecordingView::default())
    ).await;

    assert!(widget.is_initialized());
    let config = widget.config();
    assert!(config.demo);
    assert_eq!(config.branding.title, "Front Desk");
    assert_eq!(config.position, Position::BottomLeft);
    assert_eq!(config.theme.primary_color, "#ff0000");

    let controller = widget.controller().unwrap();
    let session = controller.session().unwrap();
    assert_eq!(session.mode, SessionMode::Demo);
    assert!(session.id.starts_with("demo_"));
    assert!(controller.messages()[0].text().ends_with("(Demo Mode)"));
}

#[tokio::test]
async fn every_accepted_submit_yields_one_user_and_one_bot_message() {
    let transport = Arc::new(ScriptedTransport::default());
    let mut widget = ChatWidget::new(WidgetConfig::default(), Arc::new(RecordingView::default()))
        .with_transport(transport.clone());
    widget.init().await;
    let controller = widget.controller().unwrap();

    for i in 0..110 {
        let utterance = if i % 7 == 0 { "fail".to_string() } else { format!("q{}", i) };
        let before = controller.messages().len();
        let reply = controller.submit(&utterance).await.unwrap();
        let after = controller.messages();

        assert_eq!(after.len(), before + 2);
        assert_eq!(after[before].role(), Role::User);
        assert_eq!(after[before + 1], reply);
        assert_eq!(reply.is_error(), utterance == "fail");
        assert!(!controller.is_typing());
    }

    let histories = transport.histories.lock().unwrap();
    assert_eq!(histories.len(), 110);
    assert!(histories.iter().all(|h| h.len() <= 10));
    assert_eq!(histories.last().map(Vec::len), Some(10));
}

#[tokio::test]
async fn blank_submits_change_nothing() {
    let mut widget = ChatWidget::new(WidgetConfig::default(), Arc::new(RecordingView::default()))
        .with_transport(instant_demo());
    widget.init().await;
    let controller = widget.controller().unwrap();

    assert!(controller.submit("   ").await.is_none());
    assert!(controller.submit("").await.is_none());
    assert_eq!(controller.messages().len(), 1);
    assert_eq!(controller.session_info().message_count, 1);
}
