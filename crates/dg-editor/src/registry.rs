//! Action kind → command constructors, configured at startup.

use crate::action::{Action, kind};
use crate::command::Command;
use crate::hover::{HoverCommand, SetPopupModelCommand};
use crate::moves::{MoveCommand, MoveEdgesCommand};
use crate::select::SelectCommand;
use crate::update::{SetBoundsCommand, SetModelCommand};
use std::collections::HashMap;

/// Builds a command from an action, or declines with `None`.
pub type CommandConstructor = fn(&Action) -> Option<Box<dyn Command>>;

#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    constructors: HashMap<&'static str, Vec<CommandConstructor>>,
}

impl CommandRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in command registered under its action kind.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(kind::SET_MODEL, SetModelCommand::from_action);
        registry.register(kind::MOVE, MoveCommand::from_action);
        registry.register(kind::MOVE_EDGES, MoveEdgesCommand::from_action);
        registry.register(kind::HOVER, HoverCommand::from_action);
        registry.register(kind::SET_POPUP_MODEL, SetPopupModelCommand::from_action);
        registry.register(kind::SET_BOUNDS, SetBoundsCommand::from_action);
        registry.register(kind::SELECT, SelectCommand::from_action);
        registry
    }

    /// Several constructors may share a kind; they run in registration order.
    pub fn register(&mut self, kind: &'static str, constructor: CommandConstructor) {
        self.constructors.entry(kind).or_default().push(constructor);
    }

    pub fn handles(&self, kind: &str) -> bool {
        self.constructors.contains_key(kind)
    }

    /// Zero or more commands for `action`.
    pub fn create(&self, action: &Action) -> Vec<Box<dyn Command>> {
        self.constructors
            .get(action.kind())
            .into_iter()
            .flatten()
            .filter_map(|construct| construct(action))
            .collect()
    }
}
