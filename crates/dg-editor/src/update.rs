//! Commands that replace the diagram model or apply layout results.

use crate::action::{Action, ElementAndBounds, kind};
use crate::command::{Command, CommandContext, CommandResult};
use crate::error::DispatchError;
use dg_core::{Bounds, ElementId, ElementSchema, Feature, SceneGraph};
use std::any::Any;

/// Replaces the diagram with a model built from a schema. A malformed
/// schema fails the command and leaves the current model in place.
#[derive(Debug)]
pub struct SetModelCommand {
    new_root: ElementSchema,
    /// The root not currently shown.
    other: Option<SceneGraph>,
}

impl SetModelCommand {
    pub fn new(new_root: ElementSchema) -> Self {
        Self {
            new_root,
            other: None,
        }
    }

    pub fn from_action(action: &Action) -> Option<Box<dyn Command>> {
        match action {
            Action::SetModel { new_root } => Some(Box::new(Self::new(new_root.clone()))),
            _ => None,
        }
    }

    fn swap(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult {
        if let Some(other) = &mut self.other {
            std::mem::swap(ctx.root, other);
        }
        CommandResult::Model
    }
}

impl Command for SetModelCommand {
    fn kind(&self) -> &'static str {
        kind::SET_MODEL
    }

    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> Result<CommandResult, DispatchError> {
        let new_root = ctx.factory.create_root(&self.new_root)?;
        log::debug!(
            "model replaced: {} ({} elements)",
            new_root.root_element().id(),
            new_root.len()
        );
        self.other = Some(std::mem::replace(ctx.root, new_root));
        Ok(CommandResult::Model)
    }

    fn undo(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult {
        self.swap(ctx)
    }

    fn redo(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult {
        self.swap(ctx)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Applies layout bounds to bounds-aware elements. Layout output is derived
/// data, so it is not recorded in history.
#[derive(Debug)]
pub struct SetBoundsCommand {
    bounds: Vec<ElementAndBounds>,
    /// `(id, old, new)` for every element actually updated.
    changes: Vec<(ElementId, Bounds, Bounds)>,
}

impl SetBoundsCommand {
    pub fn new(bounds: Vec<ElementAndBounds>) -> Self {
        Self {
            bounds,
            changes: Vec::new(),
        }
    }

    pub fn from_action(action: &Action) -> Option<Box<dyn Command>> {
        match action {
            Action::SetBounds { bounds } => Some(Box::new(Self::new(bounds.clone()))),
            _ => None,
        }
    }
}

impl Command for SetBoundsCommand {
    fn kind(&self) -> &'static str {
        kind::SET_BOUNDS
    }

    fn is_recorded(&self) -> bool {
        false
    }

    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> Result<CommandResult, DispatchError> {
        for eb in &self.bounds {
            let Some(element) = ctx.root.get_by_id_mut(eb.element_id) else {
                log::trace!("set bounds: unknown element {}", eb.element_id);
                continue;
            };
            if !element.has_feature(Feature::Bounds) {
                log::trace!("set bounds: {} is not bounds-aware", eb.element_id);
                continue;
            }
            if let Some(old) = element.bounds() {
                element.set_bounds(eb.new_bounds);
                self.changes.push((eb.element_id, old, eb.new_bounds));
            }
        }
        Ok(CommandResult::Model)
    }

    fn undo(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult {
        for &(id, old, _) in self.changes.iter().rev() {
            if let Some(element) = ctx.root.get_by_id_mut(id) {
                element.set_bounds(old);
            }
        }
        CommandResult::Model
    }

    fn redo(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult {
        for &(id, _, new) in &self.changes {
            if let Some(element) = ctx.root.get_by_id_mut(id) {
                element.set_bounds(new);
            }
        }
        CommandResult::Model
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
