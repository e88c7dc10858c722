//! Keyboard shortcuts.
//!
//! Maps key + modifier combos to editor actions. On macOS `meta` is ⌘, on
//! other platforms `ctrl` serves the same role.

use crate::action::Action;
use dg_core::{Feature, SceneGraph};

/// What a key combo asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Undo,
    Redo,
    SelectAll,
    Deselect,
}

/// A key press as reported by the host (`KeyboardEvent.key` plus modifiers).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyEvent {
    pub key: String,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// The same key with the platform command modifier held.
    pub fn with_command(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event. Returns `None` if the combo has no binding.
    pub fn resolve(event: &KeyEvent) -> Option<Shortcut> {
        let cmd = event.ctrl || event.meta;
        let key = event.key.to_ascii_lowercase();
        match (key.as_str(), cmd, event.shift) {
            ("z", true, false) => Some(Shortcut::Undo),
            ("z", true, true) | ("y", true, false) => Some(Shortcut::Redo),
            ("a", true, false) => Some(Shortcut::SelectAll),
            ("escape", false, _) => Some(Shortcut::Deselect),
            _ => None,
        }
    }

    /// The action for `event` against the current model, if any.
    pub fn action(event: &KeyEvent, model: &SceneGraph) -> Option<Action> {
        let shortcut = Self::resolve(event)?;
        log::trace!("shortcut {shortcut:?}");
        match shortcut {
            Shortcut::Undo => Some(Action::Undo),
            Shortcut::Redo => Some(Action::Redo),
            Shortcut::SelectAll => Some(Action::Select {
                selected: model
                    .all()
                    .filter(|e| !e.selected && e.has_feature(Feature::Select))
                    .map(|e| e.id())
                    .collect(),
                deselected: Vec::new(),
            }),
            Shortcut::Deselect => Some(Action::Select {
                selected: Vec::new(),
                deselected: model.all().filter(|e| e.selected).map(|e| e.id()).collect(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undo_redo_bindings() {
        let z = KeyEvent::new("z");
        assert_eq!(ShortcutMap::resolve(&z.clone().with_command()), Some(Shortcut::Undo));
        assert_eq!(
            ShortcutMap::resolve(&z.clone().with_command().with_shift()),
            Some(Shortcut::Redo)
        );
        let meta_y = KeyEvent {
            meta: true,
            ..KeyEvent::new("y")
        };
        assert_eq!(ShortcutMap::resolve(&meta_y), Some(Shortcut::Redo));
        assert_eq!(ShortcutMap::resolve(&z), None);
    }

    #[test]
    fn shifted_key_reports_uppercase() {
        // Browsers report "Z" when Shift is held.
        let event = KeyEvent::new("Z").with_command().with_shift();
        assert_eq!(ShortcutMap::resolve(&event), Some(Shortcut::Redo));
    }

    #[test]
    fn escape_deselects_everything_selected() {
        let mut model = SceneGraph::empty();
        let root = model.root();
        let mut element = dg_core::Element::new(
            dg_core::ElementId::intern("k_n"),
            "node",
            dg_core::ElementKind::Node {
                shape: dg_core::Shape::default(),
                layout: None,
            },
        );
        element.selected = true;
        model.add_child(root, element).unwrap();

        assert_eq!(
            ShortcutMap::action(&KeyEvent::new("Escape"), &model),
            Some(Action::Select {
                selected: vec![],
                deselected: vec![dg_core::ElementId::intern("k_n")],
            })
        );
    }
}
