//! The panel abstraction shared by the dashboard.

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};

use crate::action::Action;

/// A keyboard-driven region of the dashboard.
///
/// Lifecycle: (`handle_key_event` | `update` | `render`)*
pub trait Component: Send {
    /// Handle a keyboard event while focused. Return an Action to dispatch.
    fn handle_key_event(&mut self, _key: KeyEvent) -> Result<Option<Action>> {
        Ok(None)
    }

    /// Process a dispatched action. May return a follow-up action.
    fn update(&mut self, _action: &Action) -> Result<Option<Action>> {
        Ok(None)
    }

    /// Render into the provided frame area.
    fn render(&self, frame: &mut Frame, area: Rect);

    fn focused(&self) -> bool {
        false
    }

    fn set_focused(&mut self, _focused: bool) {}

    /// Stable identifier, used in logs.
    fn id(&self) -> &str;
}
