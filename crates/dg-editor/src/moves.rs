//! Moving elements: the move command, edge following, and the drag listener.
//!
//! A move resolves each requested `ElementMove` against the model into a
//! `ResolvedMove` (element + from + to). Animated moves play a
//! `MoveAnimation`; snap moves set positions at once and merge, so a whole
//! drag gesture undoes in one step.
//!
//! Edges follow their endpoints: when both the source and the target of an
//! edge take part in a move, every routing point of that edge is translated
//! by the source's displacement.

use crate::action::{Action, ElementMove, MoveAction, kind};
use crate::animation::{MoveAnimation, ResolvedMove};
use crate::command::{Command, CommandContext, CommandResult};
use crate::error::DispatchError;
use crate::input::{MouseEvent, MouseListener};
use dg_core::{ElementId, ElementKind, Feature, Point, SceneGraph};
use std::any::Any;
use std::collections::{HashMap, HashSet};

/// Resolve `mv` against `model`. Unknown ids and elements that cannot move
/// resolve to `None`.
fn resolve(mv: &ElementMove, model: &SceneGraph) -> Option<ResolvedMove> {
    let Some(element) = model.get_by_id(mv.element_id) else {
        log::trace!("move: unknown element {}", mv.element_id);
        return None;
    };
    if !element.has_feature(Feature::Move) {
        log::trace!("move: {} is not moveable", mv.element_id);
        return None;
    }
    let current = element.position()?;
    Some(ResolvedMove {
        element_id: mv.element_id,
        from: mv.from_position.unwrap_or(current),
        to: mv.to_position,
    })
}

/// Routing-point moves for every edge whose target is in `participants` and
/// whose source has an entry in `displacements`. Routing points that move on
/// their own are left out.
fn follow_edges(
    model: &SceneGraph,
    displacements: &HashMap<ElementId, Point>,
    participants: &HashSet<ElementId>,
) -> Vec<ResolvedMove> {
    let mut out = Vec::new();
    for edge in model.edges() {
        let Some(element) = model.element(edge) else {
            continue;
        };
        let ElementKind::Edge { source, target } = element.kind else {
            continue;
        };
        let (Some(delta), true) = (displacements.get(&source), participants.contains(&target)) else {
            continue;
        };
        for rp in model.routing_points(edge) {
            let Some(point) = model.element(rp) else {
                continue;
            };
            if participants.contains(&point.id()) {
                continue;
            }
            if let Some(from) = point.position() {
                out.push(ResolvedMove {
                    element_id: point.id(),
                    from,
                    to: from.offset(*delta),
                });
            }
        }
    }
    out
}

fn set_positions<'a>(
    model: &mut SceneGraph,
    moves: impl Iterator<Item = &'a ResolvedMove>,
    pick: impl Fn(&ResolvedMove) -> Point,
) {
    for mv in moves {
        if let Some(element) = model.get_by_id_mut(mv.element_id) {
            element.set_position(pick(mv));
        }
    }
}

// ─── Move command ────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct MoveCommand {
    action: MoveAction,
    /// Element moves, in resolution order.
    resolved: Vec<ResolvedMove>,
    /// Routing points dragged along by the element moves.
    edge_moves: Vec<ResolvedMove>,
}

impl MoveCommand {
    pub fn new(action: MoveAction) -> Self {
        Self {
            action,
            resolved: Vec::new(),
            edge_moves: Vec::new(),
        }
    }

    pub fn from_action(action: &Action) -> Option<Box<dyn Command>> {
        match action {
            Action::Move(m) => Some(Box::new(Self::new(m.clone()))),
            _ => None,
        }
    }

    pub fn is_animated(&self) -> bool {
        self.action.animate
    }

    pub fn resolved_moves(&self) -> &[ResolvedMove] {
        &self.resolved
    }

    pub fn edge_moves(&self) -> &[ResolvedMove] {
        &self.edge_moves
    }

    fn all_moves(&self) -> Vec<ResolvedMove> {
        self.resolved.iter().chain(&self.edge_moves).copied().collect()
    }

    /// Insert or update by id; an existing entry keeps its `from`.
    fn absorb(into: &mut Vec<ResolvedMove>, mv: ResolvedMove) {
        match into.iter_mut().find(|m| m.element_id == mv.element_id) {
            Some(existing) => existing.to = mv.to,
            None => into.push(mv),
        }
    }
}

impl Command for MoveCommand {
    fn kind(&self) -> &'static str {
        kind::MOVE
    }

    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> Result<CommandResult, DispatchError> {
        for mv in &self.action.moves {
            if let Some(resolved) = resolve(mv, ctx.root) {
                Self::absorb(&mut self.resolved, resolved);
            }
        }
        let displacements: HashMap<ElementId, Point> = self
            .resolved
            .iter()
            .map(|m| (m.element_id, m.displacement()))
            .collect();
        let participants: HashSet<ElementId> = self.resolved.iter().map(|m| m.element_id).collect();
        self.edge_moves = follow_edges(ctx.root, &displacements, &participants);

        if self.action.animate {
            return Ok(CommandResult::Animation(Box::new(MoveAnimation::new(
                self.all_moves(),
                false,
            ))));
        }
        set_positions(ctx.root, self.resolved.iter().chain(&self.edge_moves), |m| m.to);
        Ok(CommandResult::Model)
    }

    fn undo(&mut self, _ctx: &mut CommandContext<'_>) -> CommandResult {
        CommandResult::Animation(Box::new(MoveAnimation::new(self.all_moves(), true)))
    }

    fn redo(&mut self, _ctx: &mut CommandContext<'_>) -> CommandResult {
        CommandResult::Animation(Box::new(MoveAnimation::new(self.all_moves(), false)))
    }

    /// Snap moves absorb later snap moves. Ids already present keep their
    /// first `from` and take the new `to`; new ids are added as the other
    /// command resolved them against the model it ran on.
    fn merge(&mut self, other: &dyn Command, _ctx: &mut CommandContext<'_>) -> bool {
        if self.action.animate {
            return false;
        }
        let Some(other) = other.as_any().downcast_ref::<MoveCommand>() else {
            return false;
        };
        if other.action.animate {
            return false;
        }
        for mv in &other.resolved {
            Self::absorb(&mut self.resolved, *mv);
        }
        for mv in &other.edge_moves {
            Self::absorb(&mut self.edge_moves, *mv);
        }
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ─── Edge move command ───────────────────────────────────────────────────

/// Translates routing points for a move that has already been applied.
///
/// Only moves with an explicit `from_position` contribute a displacement;
/// any move counts as the target end of an edge.
#[derive(Debug)]
pub struct MoveEdgesCommand {
    move_action: MoveAction,
    moves: Vec<ResolvedMove>,
}

impl MoveEdgesCommand {
    pub fn new(move_action: MoveAction) -> Self {
        Self {
            move_action,
            moves: Vec::new(),
        }
    }

    pub fn from_action(action: &Action) -> Option<Box<dyn Command>> {
        match action {
            Action::MoveEdges { move_action } => Some(Box::new(Self::new(move_action.clone()))),
            _ => None,
        }
    }
}

impl Command for MoveEdgesCommand {
    fn kind(&self) -> &'static str {
        kind::MOVE_EDGES
    }

    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> Result<CommandResult, DispatchError> {
        let displacements: HashMap<ElementId, Point> = self
            .move_action
            .moves
            .iter()
            .filter_map(|m| Some((m.element_id, m.from_position?.delta_to(m.to_position))))
            .collect();
        let participants: HashSet<ElementId> =
            self.move_action.moves.iter().map(|m| m.element_id).collect();
        self.moves = follow_edges(ctx.root, &displacements, &participants);
        set_positions(ctx.root, self.moves.iter(), |m| m.to);
        Ok(CommandResult::Model)
    }

    fn undo(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult {
        set_positions(ctx.root, self.moves.iter().rev(), |m| m.from);
        CommandResult::Model
    }

    fn redo(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult {
        set_positions(ctx.root, self.moves.iter(), |m| m.to);
        CommandResult::Model
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ─── Drag listener ───────────────────────────────────────────────────────

/// Turns a primary-button drag into snap moves of the selected elements.
///
/// The pointer delta is divided by the zoom of the nearest viewport
/// ancestor, so elements track the pointer at any zoom level.
#[derive(Debug, Default)]
pub struct MoveListener {
    /// Page position of the last drag step; `None` when not dragging.
    last_drag_position: Option<Point>,
}

impl MoveListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.last_drag_position.is_some()
    }

    fn zoom(target: ElementId, model: &SceneGraph) -> f64 {
        model
            .index_of(target)
            .and_then(|idx| model.find_ancestor_with_feature(idx, Feature::Viewport))
            .and_then(|idx| model.element(idx))
            .and_then(|viewport| viewport.zoom())
            .filter(|z| *z > 0.0)
            .unwrap_or(1.0)
    }
}

impl MouseListener for MoveListener {
    fn mouse_down(&mut self, target: ElementId, event: &MouseEvent, model: &SceneGraph) -> Vec<Action> {
        if event.button == 0 {
            let moveable = model
                .get_by_id(target)
                .is_some_and(|e| e.has_feature(Feature::Move));
            self.last_drag_position = moveable.then_some(event.page);
        }
        Vec::new()
    }

    fn mouse_move(&mut self, target: ElementId, event: &MouseEvent, model: &SceneGraph) -> Vec<Action> {
        if event.buttons == 0 {
            // The button was released outside of our view.
            return self.mouse_up(target, event, model);
        }
        let Some(last) = self.last_drag_position else {
            return Vec::new();
        };
        let zoom = Self::zoom(target, model);
        let delta = last.delta_to(event.page);
        let (dx, dy) = (delta.x / zoom, delta.y / zoom);

        let moves: Vec<ElementMove> = model
            .all()
            .filter(|e| e.selected && e.has_feature(Feature::Select) && e.has_feature(Feature::Move))
            .filter_map(|e| {
                let from = e.position()?;
                Some(ElementMove::new(
                    e.id(),
                    Some(from),
                    Point::new(from.x + dx, from.y + dy),
                ))
            })
            .collect();
        self.last_drag_position = Some(event.page);

        if moves.is_empty() {
            return Vec::new();
        }
        vec![Action::Move(MoveAction::new(moves, false))]
    }

    fn mouse_up(&mut self, _target: ElementId, _event: &MouseEvent, _model: &SceneGraph) -> Vec<Action> {
        self.last_drag_position = None;
        Vec::new()
    }
}
