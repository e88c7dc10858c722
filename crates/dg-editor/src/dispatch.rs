//! Action dispatch.
//!
//! The dispatcher is the single entry point for model changes: every action
//! is turned into commands by the registry and run on the command stack.
//! `undo` and `redo` act on the stack directly. Actions no command handles
//! (e.g. `requestPopupModel`) go to `ActionHandler`s, which stand for the
//! model source and may answer with follow-up actions.
//!
//! Dispatch is strictly sequential: follow-up actions are queued behind the
//! action that produced them.

use crate::action::{Action, kind};
use crate::command::CommandStack;
use crate::config::EditorConfig;
use crate::error::DispatchError;
use crate::registry::CommandRegistry;
use dg_core::{ElementId, ElementSchema, ModelFactory, SceneGraph};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

/// Receives actions of a kind and answers with follow-up actions.
pub trait ActionHandler {
    fn handle(&mut self, action: &Action, model: &SceneGraph) -> Vec<Action>;
}

pub struct ActionDispatcher {
    registry: CommandRegistry,
    stack: CommandStack,
    handlers: Vec<(&'static str, Box<dyn ActionHandler>)>,
}

impl std::fmt::Debug for ActionDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionDispatcher")
            .field("stack", &self.stack)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl ActionDispatcher {
    /// A dispatcher over `model` with the built-in commands.
    pub fn new(model: SceneGraph, config: &EditorConfig) -> Self {
        Self {
            registry: CommandRegistry::with_defaults(),
            stack: CommandStack::new(model, config),
            handlers: Vec::new(),
        }
    }

    pub fn with_registry(mut self, registry: CommandRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_factory(mut self, factory: Box<dyn ModelFactory>) -> Self {
        self.stack = self.stack.with_factory(factory);
        self
    }

    pub fn register_handler(&mut self, kind: &'static str, handler: Box<dyn ActionHandler>) {
        self.handlers.push((kind, handler));
    }

    pub fn model(&self) -> &SceneGraph {
        self.stack.model()
    }

    pub fn popup_model(&self) -> &SceneGraph {
        self.stack.popup_model()
    }

    pub fn stack(&self) -> &CommandStack {
        &self.stack
    }

    /// Dispatch `action` and every follow-up it produces, in order.
    ///
    /// Stops at the first fatal error; actions already dispatched stay
    /// applied.
    pub fn dispatch(&mut self, action: Action, now: Duration) -> Result<(), DispatchError> {
        let mut queue = VecDeque::from([action]);
        while let Some(next) = queue.pop_front() {
            let follow_ups = self.dispatch_one(&next, now)?;
            queue.extend(follow_ups);
        }
        Ok(())
    }

    /// Advance animations. Returns `true` while one is still running.
    pub fn tick(&mut self, now: Duration) -> bool {
        self.stack.tick(now)
    }

    pub fn finish_animations(&mut self) {
        self.stack.finish_animations();
    }

    fn dispatch_one(&mut self, action: &Action, now: Duration) -> Result<Vec<Action>, DispatchError> {
        log::trace!("dispatch {}", action.kind());
        match action {
            Action::Undo => {
                self.stack.undo(now);
                return Ok(Vec::new());
            }
            Action::Redo => {
                self.stack.redo(now);
                return Ok(Vec::new());
            }
            _ => {}
        }

        let commands = self.registry.create(action);
        let mut follow_ups = Vec::new();
        let mut handled = !commands.is_empty();
        for (handler_kind, handler) in &mut self.handlers {
            if *handler_kind == action.kind() {
                handled = true;
                follow_ups.extend(handler.handle(action, self.stack.model()));
            }
        }
        if !handled {
            log::warn!("no command or handler for action '{}'", action.kind());
        }

        for command in commands {
            self.stack.execute(command, now)?;
        }
        Ok(follow_ups)
    }
}

/// Answers `requestPopupModel` from a fixed lookup, as a model source would.
#[derive(Debug, Default, Clone)]
pub struct PopupModelSource {
    popups: HashMap<ElementId, ElementSchema>,
}

impl PopupModelSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, element: ElementId, popup: ElementSchema) {
        self.popups.insert(element, popup);
    }

    /// Register with `dispatcher` for popup requests.
    pub fn install(self, dispatcher: &mut ActionDispatcher) {
        dispatcher.register_handler(kind::REQUEST_POPUP_MODEL, Box::new(self));
    }
}

impl ActionHandler for PopupModelSource {
    fn handle(&mut self, action: &Action, _model: &SceneGraph) -> Vec<Action> {
        let Action::RequestPopupModel { element, .. } = action else {
            return Vec::new();
        };
        match self.popups.get(element) {
            Some(popup) => vec![Action::SetPopupModel {
                new_root: popup.clone(),
            }],
            None => {
                log::debug!("no popup for {element}");
                Vec::new()
            }
        }
    }
}
