use std::sync::Mutex;
use crate::models::{ Message, MessageId, Role };
use crate::widget::{ ViewState, Visibility, WidgetView };

#[derive(Debug, Default)]
struct Rendered {
    last_message: Option<MessageId>,
    visibility: Option<Visibility>,
    typing: bool,
}

/// Prints the widget to stdout: new messages, chips, typing indicator and
/// visibility changes. Messages are printed only once.
#[derive(Debug, Default)]
pub struct TerminalView {
    rendered: Mutex<Rendered>,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }

    fn print_message(state: &ViewState, message: &Message) {
        let time = message.created_at().format("%H:%M");
        let who = match message.role() {
            Role::User => "You".to_string(),
            Role::Bot => state.config.branding.title.clone(),
        };
        let marker = if message.is_error() { " [!]" } else { "" };
        println!("[{}] {}{}:", time, who, marker);
        for line in message.text().lines() {
            println!("    {}", line);
        }
        if let Some(chips) = message.quick_replies() {
            let chips: Vec<String> = chips.iter().map(|c| format!("[{}]", c)).collect();
            println!("    {}", chips.join(" "));
        }
    }
}

impl WidgetView for TerminalView {
    fn render(&self, state: &ViewState) {
        let mut rendered = self.rendered.lock().unwrap_or_else(|e| e.into_inner());

        if rendered.visibility != Some(state.visibility) {
            let label = match state.visibility {
                Visibility::Hidden => "chat closed",
                Visibility::Open => "chat open",
                Visibility::Minimized => "chat minimized",
            };
            // The unread badge sits on the launcher button.
            let badge = if state.visibility.shows_button() && state.has_unread { " (1 unread)" } else { "" };
            println!(
                "-- {}{} | {} - {} --",
                label,
                badge,
                state.config.branding.title,
                state.config.branding.subtitle
            );
            rendered.visibility = Some(state.visibility);
        }

        for message in &state.messages {
            if rendered.last_message.map_or(true, |last| message.id() > last) {
                Self::print_message(state, message);
                rendered.last_message = Some(message.id());
            }
        }

        if state.typing && !rendered.typing {
            println!("    ...");
        }
        rendered.typing = state.typing;
    }

    fn unmount(&self) {
        println!("-- chat widget removed --");
    }
}
