//! Hover feedback and delayed popups.
//!
//! `HoverListener` tracks the pointer over popup-capable elements:
//!
//! ```text
//!   Idle ──enter popup target──▶ Pending(id) ──timer due──▶ Open(id)
//!     ▲                              │                         │
//!     └──────── leave ───────────────┘   enter elsewhere ──────┘ (close, re-arm)
//! ```
//!
//! An `Out` that names the element being entered defers to the `Over` that
//! follows it, so crossing from a node onto its own label keeps the timer.
//! An `Out` with no such element means the pointer left the diagram.
//!
//! The delay is a `PopupTimer` value polled against the host clock, so no
//! background task is involved and tests run on a virtual clock.

use crate::action::{Action, kind};
use crate::command::{Command, CommandContext, CommandResult, CommandTarget};
use crate::config::EditorConfig;
use crate::error::DispatchError;
use crate::input::{MouseEvent, MouseListener};
use dg_core::{Bounds, ElementId, ElementSchema, Feature, Point, SceneGraph};
use std::any::Any;
use std::time::Duration;

/// Nearest element on the path from `target` to the root with `feature`.
fn target_with_feature(model: &SceneGraph, target: ElementId, feature: Feature) -> Option<ElementId> {
    let idx = model.index_of(target)?;
    let found = model.find_ancestor_with_feature(idx, feature)?;
    model.element(found).map(|e| e.id())
}

// ─── Timer ───────────────────────────────────────────────────────────────

/// Single-shot, cancelable popup delay.
#[derive(Debug, Clone, Default)]
pub struct PopupTimer {
    armed: Option<ArmedTimer>,
}

#[derive(Debug, Clone, Copy)]
struct ArmedTimer {
    target: ElementId,
    deadline: Duration,
    /// Last known pointer position in viewport coordinates.
    anchor: Point,
}

impl PopupTimer {
    /// Arm for `target`, replacing any armed timer.
    pub fn arm(&mut self, target: ElementId, now: Duration, delay: Duration, anchor: Point) {
        self.armed = Some(ArmedTimer {
            target,
            deadline: now + delay,
            anchor,
        });
    }

    pub fn cancel(&mut self) {
        self.armed = None;
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub fn target(&self) -> Option<ElementId> {
        self.armed.map(|a| a.target)
    }

    /// Track the pointer without moving the deadline.
    pub fn update_anchor(&mut self, anchor: Point) {
        if let Some(armed) = &mut self.armed {
            armed.anchor = anchor;
        }
    }

    /// Fire if due: returns the target and pointer anchor and disarms.
    pub fn poll(&mut self, now: Duration) -> Option<(ElementId, Point)> {
        let armed = self.armed?;
        if now < armed.deadline {
            return None;
        }
        self.armed = None;
        Some((armed.target, armed.anchor))
    }
}

// ─── Listener ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PopupState {
    #[default]
    Idle,
    /// Timer armed for this element.
    Pending(ElementId),
    /// Popup requested for this element.
    Open(ElementId),
}

impl PopupState {
    pub fn target(&self) -> Option<ElementId> {
        match self {
            Self::Idle => None,
            Self::Pending(id) | Self::Open(id) => Some(*id),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HoverListener {
    state: PopupState,
    timer: PopupTimer,
    delay: Duration,
    offset: Point,
}

impl Default for HoverListener {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl HoverListener {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            state: PopupState::Idle,
            timer: PopupTimer::default(),
            delay: config.popup_delay(),
            offset: config.popup_offset,
        }
    }

    pub fn state(&self) -> PopupState {
        self.state
    }

    fn arm(&mut self, target: ElementId, event: &MouseEvent) {
        self.timer.arm(target, event.timestamp, self.delay, event.client);
        self.state = PopupState::Pending(target);
        log::trace!("popup timer armed for {target}");
    }
}

impl MouseListener for HoverListener {
    fn mouse_over(&mut self, target: ElementId, event: &MouseEvent, model: &SceneGraph) -> Vec<Action> {
        let mut actions = Vec::new();
        let popup_target = target_with_feature(model, target, Feature::Popup);

        if popup_target != self.state.target() {
            if let PopupState::Open(_) = self.state {
                actions.push(Action::close_popup());
            }
            self.timer.cancel();
            self.state = PopupState::Idle;
            if let Some(popup_target) = popup_target {
                self.arm(popup_target, event);
            }
        }

        if let Some(hover_target) = target_with_feature(model, target, Feature::HoverFeedback) {
            actions.push(Action::hover(hover_target, true));
        }
        actions
    }

    fn mouse_out(&mut self, target: ElementId, event: &MouseEvent, model: &SceneGraph) -> Vec<Action> {
        let mut actions = Vec::new();
        // Moving onto another element: the `mouse_over` that follows decides
        // whether the popup target changed.
        if event.related.is_none() {
            if let PopupState::Open(_) = self.state {
                actions.push(Action::close_popup());
            }
            self.timer.cancel();
            self.state = PopupState::Idle;
        }
        if let Some(id) = target_with_feature(model, target, Feature::HoverFeedback) {
            actions.push(Action::hover(id, false));
        }
        actions
    }

    fn mouse_move(&mut self, target: ElementId, event: &MouseEvent, model: &SceneGraph) -> Vec<Action> {
        match self.state {
            PopupState::Pending(_) => self.timer.update_anchor(event.client),
            PopupState::Idle => {
                // Pointer already inside when we started listening.
                if let Some(popup_target) = target_with_feature(model, target, Feature::Popup) {
                    self.arm(popup_target, event);
                }
            }
            PopupState::Open(_) => {}
        }
        Vec::new()
    }

    fn poll(&mut self, now: Duration) -> Vec<Action> {
        let Some((element, anchor)) = self.timer.poll(now) else {
            return Vec::new();
        };
        self.state = PopupState::Open(element);
        log::debug!("requesting popup for {element}");
        vec![Action::RequestPopupModel {
            element,
            bounds: Bounds::new(anchor.x + self.offset.x, anchor.y + self.offset.y, -1.0, -1.0),
        }]
    }
}

// ─── Commands ────────────────────────────────────────────────────────────

/// Sets the hover-feedback flag. Not recorded in history.
#[derive(Debug)]
pub struct HoverCommand {
    element: ElementId,
    over: bool,
}

impl HoverCommand {
    pub fn from_action(action: &Action) -> Option<Box<dyn Command>> {
        match action {
            Action::Hover {
                mouseover_element,
                mouse_is_over,
            } => Some(Box::new(Self {
                element: *mouseover_element,
                over: *mouse_is_over,
            })),
            _ => None,
        }
    }
}

impl Command for HoverCommand {
    fn kind(&self) -> &'static str {
        kind::HOVER
    }

    fn is_recorded(&self) -> bool {
        false
    }

    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> Result<CommandResult, DispatchError> {
        match ctx.root.get_by_id_mut(self.element) {
            Some(element) if element.has_feature(Feature::HoverFeedback) => {
                element.hover_feedback = self.over;
            }
            Some(_) => log::trace!("hover: {} has no hover feedback", self.element),
            None => log::trace!("hover: unknown element {}", self.element),
        }
        Ok(CommandResult::Model)
    }

    fn undo(&mut self, _ctx: &mut CommandContext<'_>) -> CommandResult {
        CommandResult::Model
    }

    fn redo(&mut self, _ctx: &mut CommandContext<'_>) -> CommandResult {
        CommandResult::Model
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Replaces the popup model. Undo and redo swap old and new roots.
#[derive(Debug)]
pub struct SetPopupModelCommand {
    new_root: ElementSchema,
    /// The root not currently shown.
    other: Option<SceneGraph>,
}

impl SetPopupModelCommand {
    pub fn from_action(action: &Action) -> Option<Box<dyn Command>> {
        match action {
            Action::SetPopupModel { new_root } => Some(Box::new(Self {
                new_root: new_root.clone(),
                other: None,
            })),
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

impl Command for SetPopupModelCommand {
    fn kind(&self) -> &'static str {
        kind::SET_POPUP_MODEL
    }

    fn target(&self) -> CommandTarget {
        CommandTarget::Popup
    }

    fn is_recorded(&self) -> bool {
        false
    }

    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> Result<CommandResult, DispatchError> {
        let new_root = ctx.factory.create_root(&self.new_root)?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MouseEventKind;
    use dg_core::{ModelFactory, SchemaFactory};
    use pretty_assertions::assert_eq;

    fn model() -> SceneGraph {
        let schema: ElementSchema = serde_json::from_str(
            r#"{ "id": "h_graph", "type": "graph", "children": [
                { "id": "h_a", "type": "node", "children": [
                    { "id": "h_a_label", "type": "label", "text": "A" } ] },
                { "id": "h_b", "type": "node" },
                { "id": "h_c", "type": "comp" }
            ] }"#,
        )
        .unwrap();
        SchemaFactory.create_root(&schema).unwrap()
    }

    fn at(kind: MouseEventKind, ms: u64) -> MouseEvent {
        MouseEvent::new(kind, Point::new(100.0, 50.0), Duration::from_millis(ms))
    }

    fn id(s: &str) -> ElementId {
        ElementId::intern(s)
    }

    fn popup_requests(actions: &[Action]) -> usize {
        actions
            .iter()
            .filter(|a| matches!(a, Action::RequestPopupModel { .. }))
            .count()
    }

    #[test]
    fn timer_fires_only_when_due() {
        let mut timer = PopupTimer::default();
        timer.arm(id("h_a"), Duration::ZERO, Duration::from_millis(700), Point::new(1.0, 2.0));
        assert_eq!(timer.poll(Duration::from_millis(699)), None);
        assert_eq!(
            timer.poll(Duration::from_millis(700)),
            Some((id("h_a"), Point::new(1.0, 2.0)))
        );
        assert!(!timer.is_armed());
    }

    #[test]
    fn popup_is_requested_after_the_delay() {
        let m = model();
        let mut listener = HoverListener::default();
        let actions = listener.mouse_over(id("h_a"), &at(MouseEventKind::Over, 0), &m);
        assert_eq!(actions, vec![Action::hover(id("h_a"), true)]);
        assert_eq!(listener.state(), PopupState::Pending(id("h_a")));

        assert!(listener.poll(Duration::from_millis(300)).is_empty());
        let fired = listener.poll(Duration::from_millis(701));
        assert_eq!(
            fired,
            vec![Action::RequestPopupModel {
                element: id("h_a"),
                bounds: Bounds::new(80.0, 70.0, -1.0, -1.0),
            }]
        );
        assert_eq!(listener.state(), PopupState::Open(id("h_a")));
        assert!(listener.poll(Duration::from_millis(2_000)).is_empty());
    }

    #[test]
    fn leaving_before_the_delay_cancels() {
        let m = model();
        let mut listener = HoverListener::default();
        listener.mouse_over(id("h_a"), &at(MouseEventKind::Over, 0), &m);
        let out = listener.mouse_out(id("h_a"), &at(MouseEventKind::Out, 300), &m);
        assert_eq!(out, vec![Action::hover(id("h_a"), false)]);
        assert_eq!(popup_requests(&listener.poll(Duration::from_secs(5))), 0);
        assert_eq!(listener.state(), PopupState::Idle);
    }

    #[test]
    fn crossing_onto_a_child_keeps_the_pending_timer() {
        let m = model();
        let mut listener = HoverListener::default();
        listener.mouse_over(id("h_a"), &at(MouseEventKind::Over, 0), &m);
        let out = at(MouseEventKind::Out, 300).entering(id("h_a_label"));
        listener.mouse_out(id("h_a"), &out, &m);
        listener.mouse_over(id("h_a_label"), &at(MouseEventKind::Over, 300), &m);
        assert_eq!(listener.state(), PopupState::Pending(id("h_a")));
        assert_eq!(popup_requests(&listener.poll(Duration::from_millis(701))), 1);
    }

    #[test]
    fn leaving_the_diagram_closes_the_open_popup() {
        let m = model();
        let mut listener = HoverListener::default();
        listener.mouse_over(id("h_a"), &at(MouseEventKind::Over, 0), &m);
        listener.poll(Duration::from_millis(700));

        let actions = listener.mouse_out(id("h_a"), &at(MouseEventKind::Out, 900), &m);
        assert_eq!(actions, vec![Action::close_popup(), Action::hover(id("h_a"), false)]);
        assert_eq!(listener.state(), PopupState::Idle);
    }

    #[test]
    fn moving_within_the_target_does_not_restart_the_delay() {
        let m = model();
        let mut listener = HoverListener::default();
        listener.mouse_over(id("h_a"), &at(MouseEventKind::Over, 0), &m);
        listener.mouse_move(id("h_a"), &at(MouseEventKind::Move, 600), &m);
        assert_eq!(popup_requests(&listener.poll(Duration::from_millis(700))), 1);
    }

    #[test]
    fn label_resolves_to_its_popup_capable_parent() {
        let m = model();
        let mut listener = HoverListener::default();
        let actions = listener.mouse_over(id("h_a_label"), &at(MouseEventKind::Over, 0), &m);
        assert_eq!(listener.state(), PopupState::Pending(id("h_a")));
        assert_eq!(actions, vec![Action::hover(id("h_a"), true)]);
    }

    #[test]
    fn entering_another_target_closes_the_open_popup() {
        let m = model();
        let mut listener = HoverListener::default();
        listener.mouse_over(id("h_a"), &at(MouseEventKind::Over, 0), &m);
        listener.poll(Duration::from_millis(700));

        let actions = listener.mouse_over(id("h_b"), &at(MouseEventKind::Over, 900), &m);
        assert_eq!(actions[0], Action::close_popup());
        assert_eq!(listener.state(), PopupState::Pending(id("h_b")));
    }

    #[test]
    fn leaving_all_popup_targets_closes_the_popup() {
        let m = model();
        let mut listener = HoverListener::default();
        listener.mouse_over(id("h_a"), &at(MouseEventKind::Over, 0), &m);
        listener.poll(Duration::from_millis(700));

        // A compartment has neither popup nor hover capability.
        let actions = listener.mouse_over(id("h_c"), &at(MouseEventKind::Over, 900), &m);
        assert_eq!(actions, vec![Action::close_popup()]);
        assert_eq!(listener.state(), PopupState::Idle);
    }

    #[test]
    fn hover_command_respects_capability() {
        let mut m = model();
        let mut ctx = CommandContext {
            root: &mut m,
            factory: &SchemaFactory,
        };
        for target in ["h_a", "h_c"] {
            let action = Action::hover(id(target), true);
            let mut cmd = HoverCommand::from_action(&action).unwrap();
            cmd.execute(&mut ctx).unwrap();
        }
        assert!(m.get_by_id(id("h_a")).unwrap().hover_feedback);
        assert!(!m.get_by_id(id("h_c")).unwrap().hover_feedback);
    }

    #[test]
    fn popup_command_swaps_roots() {
        let mut popup = SceneGraph::empty();
        let schema = ElementSchema::new("h_popup", "html");
        let mut cmd = SetPopupModelCommand::from_action(&Action::SetPopupModel { new_root: schema }).unwrap();
        let mut ctx = CommandContext {
            root: &mut popup,
            factory: &SchemaFactory,
        };
        cmd.execute(&mut ctx).unwrap();
        assert_eq!(ctx.root.root_element().id(), id("h_popup"));
        cmd.undo(&mut ctx);
        assert!(ctx.root.is_empty_root());
        cmd.redo(&mut ctx);
        assert_eq!(ctx.root.root_element().id(), id("h_popup"));
    }
}
