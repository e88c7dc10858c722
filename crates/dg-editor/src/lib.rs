pub mod action;
pub mod animation;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod hover;
pub mod input;
pub mod keys;
pub mod moves;
pub mod registry;
pub mod select;
pub mod update;

pub use action::{Action, ElementAndBounds, ElementMove, MoveAction};
pub use animation::{Animation, Animator, MoveAnimation, ResolvedMove};
pub use command::{Command, CommandContext, CommandResult, CommandStack, CommandTarget, Models};
pub use config::EditorConfig;
pub use dispatch::{ActionDispatcher, ActionHandler, PopupModelSource};
pub use error::{DispatchError, WireError};
pub use hover::{HoverListener, PopupState, PopupTimer};
pub use input::{MouseEvent, MouseEventKind, MouseListener, MouseTool};
pub use keys::{KeyEvent, Shortcut, ShortcutMap};
pub use moves::MoveListener;
pub use registry::CommandRegistry;
pub use select::SelectListener;

/// A mouse tool with the stock listeners: selection first, then dragging,
/// then hover feedback and popups.
pub fn default_mouse_tool(config: &EditorConfig) -> MouseTool {
    MouseTool::new()
        .with_listener(Box::new(SelectListener))
        .with_listener(Box::new(MoveListener::new()))
        .with_listener(Box::new(HoverListener::new(config)))
}
