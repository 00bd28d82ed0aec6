use log::{ debug, error, info };
use std::sync::atomic::{ AtomicBool, Ordering };
use std::sync::{ Arc, Mutex, MutexGuard, PoisonError, RwLock };
use std::time::Duration;
use crate::config::WidgetConfig;
use crate::models::{ Message, Session, SessionInfo };
use crate::models::wire::SessionHistory;
use crate::store::ConversationStore;
use crate::transport::{ ChatTransport, TransportError };
use super::command::WidgetCommand;
use super::view::{ ViewState, Visibility, WidgetView };

/// Lets the panel finish opening before the input grabs focus.
pub const FOCUS_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug)]
struct UiState {
    visibility: Visibility,
    has_unread: bool,
}

struct Shared {
    config: RwLock<WidgetConfig>,
    store: Mutex<ConversationStore>,
    session: RwLock<Option<Session>>,
    ui: Mutex<UiState>,
    transport: Arc<dyn ChatTransport>,
    view: Arc<dyn WidgetView>,
    attached: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Coordinates visibility, the conversation store and the transport for one
/// mounted widget. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct WidgetController {
    shared: Arc<Shared>,
}

impl WidgetController {
    pub fn new(
        config: WidgetConfig,
        transport: Arc<dyn ChatTransport>,
        view: Arc<dyn WidgetView>
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                config: RwLock::new(config),
                store: Mutex::new(ConversationStore::new()),
                session: RwLock::new(None),
                ui: Mutex::new(UiState {
                    visibility: Visibility::Hidden,
                    has_unread: true,
                }),
                transport,
                view,
                attached: AtomicBool::new(true),
            }),
        }
    }

    /// One-time session handshake; seeds the greeting.
    pub async fn initialize(&self) -> Session {
        let session = self.shared.transport.initialize_session().await;
        info!("Chat session {} ready ({})", session.id, session.mode);

        let greeting = {
            let mut store = lock(&self.shared.store);
            store.start_session(&session.id, session.mode).clone()
        };
        *self.shared.session.write().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());

        self.notify_message(&greeting);
        self.render();
        session
    }

    pub fn session(&self) -> Option<Session> {
        self.shared.session.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn config(&self) -> WidgetConfig {
        self.shared.config.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub(crate) fn set_config(&self, config: WidgetConfig) {
        *self.shared.config.write().unwrap_or_else(PoisonError::into_inner) = config;
        self.render();
    }

    pub fn visibility(&self) -> Visibility {
        lock(&self.shared.ui).visibility
    }

    pub fn has_unread(&self) -> bool {
        lock(&self.shared.ui).has_unread
    }

    pub fn messages(&self) -> Vec<Message> {
        lock(&self.shared.store).messages().to_vec()
    }

    pub fn is_typing(&self) -> bool {
        lock(&self.shared.store).is_typing()
    }

    pub fn session_info(&self) -> SessionInfo {
        lock(&self.shared.store).session_info()
    }

    pub fn clear_messages(&self) {
        lock(&self.shared.store).clear();
        self.render();
    }

    pub fn snapshot(&self) -> ViewState {
        let (visibility, has_unread) = {
            let ui = lock(&self.shared.ui);
            (ui.visibility, ui.has_unread)
        };
        let (messages, typing) = {
            let store = lock(&self.shared.store);
            (store.messages().to_vec(), store.is_typing())
        };
        let session = self.session();

        ViewState {
            config: self.config(),
            visibility,
            has_unread,
            session_id: session.as_ref().map(|s| s.id.clone()),
            session_mode: session.map(|s| s.mode),
            messages,
            typing,
        }
    }

    fn is_attached(&self) -> bool {
        self.shared.attached.load(Ordering::SeqCst)
    }

    pub fn render(&self) {
        if !self.is_attached() {
            return;
        }
        self.shared.view.render(&self.snapshot());
    }

    fn notify_message(&self, message: &Message) {
        if self.is_attached() {
            self.shared.view.on_message(message);
        }
    }

    /// Stops all further rendering and host hooks; in-flight sends still
    /// complete against the store.
    pub(crate) fn detach(&self) {
        self.shared.attached.store(false, Ordering::SeqCst);
    }

    fn set_visibility(&self, visibility: Visibility) -> Visibility {
        let mut ui = lock(&self.shared.ui);
        let previous = ui.visibility;
        ui.visibility = visibility;
        if visibility == Visibility::Open {
            ui.has_unread = false;
        }
        previous
    }

    pub fn open(&self) {
        let previous = self.set_visibility(Visibility::Open);
        self.render();
        if previous != Visibility::Open && self.is_attached() {
            self.shared.view.on_open();
        }
        self.schedule_focus();
    }

    pub fn close(&self) {
        let previous = self.set_visibility(Visibility::Hidden);
        self.render();
        if previous == Visibility::Open && self.is_attached() {
            self.shared.view.on_close();
        }
    }

    pub fn minimize(&self) {
        self.set_visibility(Visibility::Minimized);
        self.render();
    }

    pub fn toggle(&self) {
        if self.visibility() == Visibility::Open {
            self.close();
        } else {
            self.open();
        }
    }

    fn schedule_focus(&self) {
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let controller = self.clone();
                runtime.spawn(async move {
                    tokio::time::sleep(FOCUS_DELAY).await;
                    if controller.visibility() == Visibility::Open && controller.is_attached() {
                        controller.shared.view.focus_input();
                    }
                });
            }
            Err(_) if self.is_attached() => self.shared.view.focus_input(),
            Err(_) => {}
        }
    }

    /// Submits an utterance. Returns the bot message appended in reply, or
    /// `None` when the submit was rejected (blank text, a reply already
    /// pending, or no session yet).
    pub async fn submit(&self, text: &str) -> Option<Message> {
        let text = text.trim();
        let Some(session) = self.session() else {
            debug!("Ignoring utterance before the session is initialized");
            return None;
        };

        let (pending, user_message) = {
            let mut store = lock(&self.shared.store);
            let pending = store.begin_send(text)?;
            let user_message = store.messages().last().cloned();
            (pending, user_message)
        };
        if let Some(message) = &user_message {
            self.notify_message(message);
        }
        self.render();

        let outcome = self.shared.transport.send_message(
            &session,
            &pending.utterance,
            &pending.history
        ).await;
        if let Err(e) = &outcome {
            error!("Failed to send message: {}", e);
        }

        let reply = {
            let mut store = lock(&self.shared.store);
            store.finish_send(outcome).clone()
        };
        self.notify_message(&reply);
        self.render();
        Some(reply)
    }

    /// A suggestion chip click is a submit of the chip's text.
    pub async fn choose_suggestion(&self, suggestion: &str) -> Option<Message> {
        self.submit(suggestion).await
    }

    pub async fn fetch_history(&self) -> Result<SessionHistory, TransportError> {
        let session = self.session().ok_or_else(|| {
            TransportError::Unavailable("no session initialized".to_string())
        })?;
        self.shared.transport.fetch_session_history(&session.id).await
    }

    pub fn dispatch(&self, command: WidgetCommand) {
        match command {
            WidgetCommand::Open => self.open(),
            WidgetCommand::Close => self.close(),
            WidgetCommand::Minimize => self.minimize(),
            WidgetCommand::Toggle => self.toggle(),
            WidgetCommand::Send(text) => {
                let controller = self.clone();
                match tokio::runtime::Handle::try_current() {
                    Ok(runtime) => {
                        runtime.spawn(async move {
                            controller.submit(&text).await;
                        });
                    }
                    Err(_) => error!("Cannot send '{}' outside of an async runtime", text),
                }
            }
        }
    }
}
