//! Keyboard rendition of the control panel.
//!
//! | Key                 | Effect                                  |
//! |---------------------|-----------------------------------------|
//! | `Up` / `Down`       | tessellation +1 / -1                    |
//! | `Tab` / `Shift+Tab` | select next / previous slider           |
//! | `Right` / `Left`    | nudge the selected slider (Shift: x10)  |
//! | `L`                 | Load Scene (rebuild geometry)           |
//! | `R`                 | Restore to Initial                      |
//! | `Esc`               | quit                                    |

use controls::{ControlPanel, PanelAction, Widget};
use winit::keyboard::{Key, NamedKey};

const COARSE_STEPS: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Tessellation(i32),
    SelectNext,
    SelectPrevious,
    Nudge(i32),
    Action(PanelAction),
    Quit,
}

/// Maps a pressed key to a command.
pub fn command_for(key: &Key, shift: bool) -> Option<KeyCommand> {
    let steps = if shift { COARSE_STEPS } else { 1 };
    match key {
        Key::Named(NamedKey::ArrowUp) => Some(KeyCommand::Tessellation(1)),
        Key::Named(NamedKey::ArrowDown) => Some(KeyCommand::Tessellation(-1)),
        Key::Named(NamedKey::Tab) if shift => Some(KeyCommand::SelectPrevious),
        Key::Named(NamedKey::Tab) => Some(KeyCommand::SelectNext),
        Key::Named(NamedKey::ArrowRight) => Some(KeyCommand::Nudge(steps)),
        Key::Named(NamedKey::ArrowLeft) => Some(KeyCommand::Nudge(-steps)),
        Key::Named(NamedKey::Escape) => Some(KeyCommand::Quit),
        Key::Character(text) => match text.to_ascii_lowercase().as_str() {
            "l" => Some(KeyCommand::Action(PanelAction::LoadScene)),
            "r" => Some(KeyCommand::Action(PanelAction::RestoreDefaults)),
            _ => None,
        },
        _ => None,
    }
}

/// What the host must do after a command was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Handled,
    Rebuild,
    Quit,
}

/// Control panel plus the slider currently selected for nudging.
#[derive(Debug, Clone)]
pub struct KeyboardControls {
    panel: ControlPanel,
    selected: usize,
}

impl KeyboardControls {
    pub fn new(panel: ControlPanel) -> Self {
        Self { panel, selected: 0 }
    }

    pub fn selected(&self) -> Widget {
        Widget::ALL[self.selected]
    }

    pub fn apply(&mut self, command: KeyCommand) -> Outcome {
        match command {
            KeyCommand::Tessellation(steps) => {
                let level = self.panel.nudge(Widget::Tessellation, steps);
                tracing::info!(level, "tessellation");
            }
            KeyCommand::SelectNext => self.select(1),
            KeyCommand::SelectPrevious => self.select(Widget::ALL.len() - 1),
            KeyCommand::Nudge(steps) => {
                let widget = self.selected();
                let value = self.panel.nudge(widget, steps);
                let spec = widget.spec();
                tracing::info!(folder = spec.folder, widget = spec.label, value, "slider moved");
            }
            KeyCommand::Action(action) => {
                if self.panel.trigger(action) == PanelAction::LoadScene {
                    return Outcome::Rebuild;
                }
            }
            KeyCommand::Quit => return Outcome::Quit,
        }
        Outcome::Handled
    }

    fn select(&mut self, offset: usize) {
        self.selected = (self.selected + offset) % Widget::ALL.len();
        let spec = self.selected().spec();
        let value = self.panel.displayed(self.selected());
        tracing::info!(folder = spec.folder, widget = spec.label, value, "selected slider");
    }
}
