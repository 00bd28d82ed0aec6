use log::{ debug, info };
use thiserror::Error;
use tokio::sync::{ mpsc, oneshot };
use super::controller::WidgetController;

/// Commands a host page can issue without reaching into the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetCommand {
    Open,
    Close,
    Minimize,
    Toggle,
    Send(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("chat widget is no longer listening for commands")]
pub struct CommandError;

/// Cloneable handle for driving a widget from outside its view.
#[derive(Debug, Clone)]
pub struct WidgetHandle {
    tx: mpsc::UnboundedSender<WidgetCommand>,
}

impl WidgetHandle {
    pub fn open(&self) -> Result<(), CommandError> {
        self.dispatch(WidgetCommand::Open)
    }

    pub fn close(&self) -> Result<(), CommandError> {
        self.dispatch(WidgetCommand::Close)
    }

    pub fn minimize(&self) -> Result<(), CommandError> {
        self.dispatch(WidgetCommand::Minimize)
    }

    pub fn toggle(&self) -> Result<(), CommandError> {
        self.dispatch(WidgetCommand::Toggle)
    }

    pub fn send_message(&self, text: impl Into<String>) -> Result<(), CommandError> {
        self.dispatch(WidgetCommand::Send(text.into()))
    }

    pub fn dispatch(&self, command: WidgetCommand) -> Result<(), CommandError> {
        self.tx.send(command).map_err(|_| CommandError)
    }
}

pub(crate) fn channel() -> (WidgetHandle, mpsc::UnboundedReceiver<WidgetCommand>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (WidgetHandle { tx }, rx)
}

/// Feeds commands to `controller` until `shutdown` fires, then hands the
/// receiver back so that a later mount keeps serving existing handles.
pub(crate) async fn listen(
    controller: WidgetController,
    mut rx: mpsc::UnboundedReceiver<WidgetCommand>,
    mut shutdown: oneshot::Receiver<()>
) -> mpsc::UnboundedReceiver<WidgetCommand> {
    info!("Widget command listener started");
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            command = rx.recv() => {
                match command {
                    Some(command) => {
                        debug!("Widget command: {:?}", command);
                        controller.dispatch(command);
                    }
                    None => break,
                }
            }
        }
    }
    info!("Widget command listener stopped");
    rx
}
