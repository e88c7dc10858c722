//! Pointer input and the mouse tool.
//!
//! Hosts normalize their native pointer events into `MouseEvent` and hand
//! them to the `MouseTool` together with the id of the element under the
//! pointer (from the DOM, or from `dg_core::hit_test`). Every registered
//! listener sees every event; the actions they return are collected in
//! registration order.

use crate::action::Action;
use dg_core::{ElementId, Point, SceneGraph};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseEventKind {
    Down,
    #[default]
    Move,
    Up,
    /// Pointer entered the target.
    Over,
    /// Pointer left the target.
    Out,
}

/// A normalized pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    /// Document coordinates (drag deltas).
    pub page: Point,
    /// Viewport coordinates (popup placement).
    pub client: Point,
    /// Button that changed state; 0 is the primary button.
    pub button: u16,
    /// Bit mask of buttons currently held; 0 means none.
    pub buttons: u16,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
    /// Host clock reading when the event happened.
    pub timestamp: Duration,
    /// For `Out`: the element the pointer moved onto, `None` when it left
    /// the diagram.
    pub related: Option<ElementId>,
}

impl MouseEvent {
    pub fn new(kind: MouseEventKind, at: Point, timestamp: Duration) -> Self {
        Self {
            kind,
            page: at,
            client: at,
            timestamp,
            ..Self::default()
        }
    }

    /// Primary-button press at `at`.
    pub fn down(at: Point, timestamp: Duration) -> Self {
        Self {
            buttons: 1,
            ..Self::new(MouseEventKind::Down, at, timestamp)
        }
    }

    /// Move with the primary button held.
    pub fn drag(at: Point, timestamp: Duration) -> Self {
        Self {
            buttons: 1,
            ..Self::new(MouseEventKind::Move, at, timestamp)
        }
    }

    /// Mark an `Out` event as moving onto `element`.
    pub fn entering(self, element: ElementId) -> Self {
        Self {
            related: Some(element),
            ..self
        }
    }

    /// Platform command modifier: ⌘ on macOS, Ctrl elsewhere.
    pub fn command_modifier(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Reacts to pointer events on diagram elements by producing actions.
///
/// `target` is the element under the pointer; it may be missing from the
/// model (stale host state), in which case listeners do nothing.
pub trait MouseListener: std::fmt::Debug {
    fn mouse_down(&mut self, _target: ElementId, _event: &MouseEvent, _model: &SceneGraph) -> Vec<Action> {
        Vec::new()
    }

    fn mouse_move(&mut self, _target: ElementId, _event: &MouseEvent, _model: &SceneGraph) -> Vec<Action> {
        Vec::new()
    }

    fn mouse_up(&mut self, _target: ElementId, _event: &MouseEvent, _model: &SceneGraph) -> Vec<Action> {
        Vec::new()
    }

    fn mouse_over(&mut self, _target: ElementId, _event: &MouseEvent, _model: &SceneGraph) -> Vec<Action> {
        Vec::new()
    }

    fn mouse_out(&mut self, _target: ElementId, _event: &MouseEvent, _model: &SceneGraph) -> Vec<Action> {
        Vec::new()
    }

    /// Deferred actions whose timers are due at `now`.
    fn poll(&mut self, _now: Duration) -> Vec<Action> {
        Vec::new()
    }
}

/// Fans pointer events out to its listeners.
#[derive(Debug, Default)]
pub struct MouseTool {
    listeners: Vec<Box<dyn MouseListener>>,
}

impl MouseTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listener(mut self, listener: Box<dyn MouseListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn register(&mut self, listener: Box<dyn MouseListener>) {
        self.listeners.push(listener);
    }

    pub fn handle(&mut self, target: ElementId, event: &MouseEvent, model: &SceneGraph) -> Vec<Action> {
        let mut actions = Vec::new();
        for listener in &mut self.listeners {
            let produced = match event.kind {
                MouseEventKind::Down => listener.mouse_down(target, event, model),
                MouseEventKind::Move => listener.mouse_move(target, event, model),
                MouseEventKind::Up => listener.mouse_up(target, event, model),
                MouseEventKind::Over => listener.mouse_over(target, event, model),
                MouseEventKind::Out => listener.mouse_out(target, event, model),
            };
            actions.extend(produced);
        }
        if !actions.is_empty() {
            log::trace!("{:?} on {target}: {} action(s)", event.kind, actions.len());
        }
        actions
    }

    /// Collect deferred actions that are due at `now`.
    pub fn poll(&mut self, now: Duration) -> Vec<Action> {
        self.listeners
            .iter_mut()
            .flat_map(|l| l.poll(now))
            .collect()
    }
}
