//! Selection: the select command and the click-to-select listener.

use crate::action::{Action, kind};
use crate::command::{Command, CommandContext, CommandResult};
use crate::error::DispatchError;
use crate::input::{MouseEvent, MouseListener};
use dg_core::{ElementId, Feature, SceneGraph};
use std::any::Any;

/// Selects and deselects elements. Undo restores the previous flags.
#[derive(Debug)]
pub struct SelectCommand {
    selected: Vec<ElementId>,
    deselected: Vec<ElementId>,
    /// `(id, previous, new)` for every flag actually touched.
    changes: Vec<(ElementId, bool, bool)>,
}

impl SelectCommand {
    pub fn new(selected: Vec<ElementId>, deselected: Vec<ElementId>) -> Self {
        Self {
            selected,
            deselected,
            changes: Vec::new(),
        }
    }

    pub fn from_action(action: &Action) -> Option<Box<dyn Command>> {
        match action {
            Action::Select {
                selected,
                deselected,
            } => Some(Box::new(Self::new(selected.clone(), deselected.clone()))),
            _ => None,
        }
    }
}

impl Command for SelectCommand {
    fn kind(&self) -> &'static str {
        kind::SELECT
    }

    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> Result<CommandResult, DispatchError> {
        let requests = self
            .deselected
            .iter()
            .map(|id| (*id, false))
            .chain(self.selected.iter().map(|id| (*id, true)));
        for (id, flag) in requests {
            match ctx.root.get_by_id_mut(id) {
                Some(element) if element.has_feature(Feature::Select) => {
                    self.changes.push((id, element.selected, flag));
                    element.selected = flag;
                }
                Some(_) => log::trace!("select: {id} is not selectable"),
                None => log::trace!("select: unknown element {id}"),
            }
        }
        Ok(CommandResult::Model)
    }

    fn undo(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult {
        for &(id, previous, _) in self.changes.iter().rev() {
            if let Some(element) = ctx.root.get_by_id_mut(id) {
                element.selected = previous;
            }
        }
        CommandResult::Model
    }

    fn redo(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult {
        for &(id, _, new) in &self.changes {
            if let Some(element) = ctx.root.get_by_id_mut(id) {
                element.selected = new;
            }
        }
        CommandResult::Model
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ─── Listener ────────────────────────────────────────────────────────────

/// Primary-button selection:
/// - click on an unselected element replaces the selection
/// - click on a selected element keeps the selection (so it can be dragged)
/// - Shift+click toggles the element
/// - click on empty canvas clears the selection
#[derive(Debug, Default)]
pub struct SelectListener;

impl SelectListener {
    fn selected_ids(model: &SceneGraph) -> Vec<ElementId> {
        model.all().filter(|e| e.selected).map(|e| e.id()).collect()
    }
}

impl MouseListener for SelectListener {
    fn mouse_down(&mut self, target: ElementId, event: &MouseEvent, model: &SceneGraph) -> Vec<Action> {
        if event.button != 0 {
            return Vec::new();
        }
        let selectable = model
            .index_of(target)
            .and_then(|idx| model.find_ancestor_with_feature(idx, Feature::Select))
            .and_then(|idx| model.element(idx));

        let (selected, deselected) = match selectable {
            Some(element) if event.shift => {
                if element.selected {
                    (vec![], vec![element.id()])
                } else {
                    (vec![element.id()], vec![])
                }
            }
            Some(element) if element.selected => return Vec::new(),
            Some(element) => {
                let others = Self::selected_ids(model)
                    .into_iter()
                    .filter(|id| *id != element.id())
                    .collect();
                (vec![element.id()], others)
            }
            None if event.shift => return Vec::new(),
            None => (vec![], Self::selected_ids(model)),
        };
        if selected.is_empty() && deselected.is_empty() {
            return Vec::new();
        }
        vec![Action::Select {
            selected,
            deselected,
        }]
    }
}
