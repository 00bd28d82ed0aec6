use crate::config::WidgetConfig;
use crate::models::{ Message, SessionMode };

/// The three mutually exclusive display modes of the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Panel closed, launcher button shown.
    #[default]
    Hidden,
    Open,
    /// Panel collapsed to the launcher button.
    Minimized,
}

impl Visibility {
    /// The launcher button is drawn whenever the panel is not open.
    pub fn shows_button(&self) -> bool {
        !matches!(self, Visibility::Open)
    }
}

/// Everything a renderer needs to draw the widget.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub config: WidgetConfig,
    pub visibility: Visibility,
    pub has_unread: bool,
    pub session_id: Option<String>,
    pub session_mode: Option<SessionMode>,
    pub messages: Vec<Message>,
    pub typing: bool,
}

/// Rendering and host-notification seam. The widget core never draws
/// anything itself; it hands a full [`ViewState`] to the view after every
/// change.
pub trait WidgetView: Send + Sync {
    fn render(&self, state: &ViewState);

    fn focus_input(&self) {}

    /// Release whatever the view mounted.
    fn unmount(&self) {}

    fn on_open(&self) {}

    fn on_close(&self) {}

    fn on_message(&self, _message: &Message) {}
}

/// A view that draws nothing. Useful for headless hosts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullView;

impl WidgetView for NullView {
    fn render(&self, _state: &ViewState) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launcher_button_hides_only_while_open() {
        assert!(Visibility::Hidden.shows_button());
        assert!(Visibility::Minimized.shows_button());
        assert!(!Visibility::Open.shows_button());
    }
}
