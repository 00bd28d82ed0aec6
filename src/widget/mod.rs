pub mod command;
pub mod controller;
pub mod view;

use log::{ error, info, warn };
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{ mpsc, oneshot };
use tokio::task::JoinHandle;
use crate::config::{ ConfigPatch, WidgetConfig };
use crate::config::embed::EmbedConfig;
use crate::transport::{ new_transport, ChatTransport, ClientContext };
use crate::transport::demo::DemoTransport;

pub use command::{ CommandError, WidgetCommand, WidgetHandle };
pub use controller::WidgetController;
pub use view::{ NullView, ViewState, Visibility, WidgetView };

/// Delay between `init()` and the automatic open when `autoOpen` is set.
pub const AUTO_OPEN_DELAY: Duration = Duration::from_secs(1);

struct Mounted {
    controller: WidgetController,
    listener: JoinHandle<mpsc::UnboundedReceiver<WidgetCommand>>,
    shutdown: oneshot::Sender<()>,
    auto_open: Option<JoinHandle<()>>,
}

/// Public lifecycle surface of the embeddable widget.
///
/// The host keeps the `ChatWidget` (and any number of [`WidgetHandle`]s)
/// itself; there is no global instance. Handles obtained before `init()`
/// buffer their commands until the widget is mounted and stay valid across
/// `destroy()`/`init()` cycles.
pub struct ChatWidget {
    config: WidgetConfig,
    client: ClientContext,
    view: Arc<dyn WidgetView>,
    transport: Option<Arc<dyn ChatTransport>>,
    handle: WidgetHandle,
    commands: Option<mpsc::UnboundedReceiver<WidgetCommand>>,
    mounted: Option<Mounted>,
}

impl ChatWidget {
    pub fn new(config: WidgetConfig, view: Arc<dyn WidgetView>) -> Self {
        let (handle, commands) = command::channel();
        Self {
            config,
            client: ClientContext::default(),
            view,
            transport: None,
            handle,
            commands: Some(commands),
            mounted: None,
        }
    }

    /// Builds a widget from script-tag data attributes layered over the
    /// defaults.
    pub fn from_embed_attributes<I, K, V>(attributes: I, view: Arc<dyn WidgetView>) -> Self
        where I: IntoIterator<Item = (K, V)>, K: AsRef<str>, V: AsRef<str>
    {
        let embed = EmbedConfig::from_attributes(attributes);
        if !embed.extra.is_empty() {
            info!("Embed attributes without a config key: {:?}", embed.extra.keys().collect::<Vec<_>>());
        }
        Self::new(WidgetConfig::from_patch(&embed.patch), view)
    }

    /// The embed-script path: configure from data attributes and mount.
    pub async fn auto_init<I, K, V>(attributes: I, view: Arc<dyn WidgetView>) -> Self
        where I: IntoIterator<Item = (K, V)>, K: AsRef<str>, V: AsRef<str>
    {
        let mut widget = Self::from_embed_attributes(attributes, view);
        widget.init().await;
        widget
    }

    /// Substitutes the transport instead of building one from the config.
    pub fn with_transport(mut self, transport: Arc<dyn ChatTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_client_context(mut self, client: ClientContext) -> Self {
        self.client = client;
        self
    }

    pub fn handle(&self) -> WidgetHandle {
        self.handle.clone()
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.mounted.is_some()
    }

    pub fn controller(&self) -> Option<&WidgetController> {
        self.mounted.as_ref().map(|m| &m.controller)
    }

    fn build_transport(&self) -> Arc<dyn ChatTransport> {
        if let Some(transport) = &self.transport {
            return transport.clone();
        }
        match new_transport(&self.config, &self.client) {
            Ok(transport) => transport,
            Err(e) => {
                error!("Failed to configure chat transport: {}. Falling back to demo replies.", e);
                Arc::new(DemoTransport::new())
            }
        }
    }

    /// Mounts the widget, performs the session handshake and starts serving
    /// commands. Calling it on a mounted widget only logs a warning.
    pub async fn init(&mut self) {
        if self.mounted.is_some() {
            warn!("Landmark Chat Widget already initialized");
            return;
        }

        let controller = WidgetController::new(
            self.config.clone(),
            self.build_transport(),
            self.view.clone()
        );
        controller.render();
        controller.initialize().await;

        let commands = match self.commands.take() {
            Some(commands) => commands,
            None => {
                let (handle, commands) = command::channel();
                self.handle = handle;
                commands
            }
        };
        let (shutdown, shutdown_rx) = oneshot::channel();
        let listener = tokio::spawn(command::listen(controller.clone(), commands, shutdown_rx));

        let auto_open = if self.config.auto_open {
            let controller = controller.clone();
            Some(
                tokio::spawn(async move {
                    tokio::time::sleep(AUTO_OPEN_DELAY).await;
                    controller.open();
                })
            )
        } else {
            None
        };

        self.mounted = Some(Mounted { controller, listener, shutdown, auto_open });
        info!("Landmark Chat Widget initialized at {}", self.config.position);
    }

    /// Merges `patch` into the configuration and re-renders. The session and
    /// the conversation log are kept.
    pub fn update_config(&mut self, patch: &ConfigPatch) {
        let next = self.config.merged(patch);
        if let Some(mounted) = &self.mounted {
            if self.transport.is_none() && next.transport_differs(&self.config) {
                info!("Transport settings changed; they take effect on the next init");
            }
            mounted.controller.set_config(next.clone());
        }
        self.config = next;
    }

    /// Detaches the view and releases the listener. Safe to call on a widget
    /// that was never mounted.
    pub async fn destroy(&mut self) {
        let Some(mounted) = self.mounted.take() else {
            return;
        };
        if let Some(task) = mounted.auto_open {
            task.abort();
        }
        mounted.controller.detach();
        let _ = mounted.shutdown.send(());
        match mounted.listener.await {
            Ok(commands) => {
                self.commands = Some(commands);
            }
            Err(e) => {
                error!("Widget command listener ended abnormally: {}", e);
                let (handle, commands) = command::channel();
                self.handle = handle;
                self.commands = Some(commands);
            }
        }
        self.view.unmount();
        info!("Landmark Chat Widget destroyed");
    }
}
