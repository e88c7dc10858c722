//! Time-based interpolation of model state.
//!
//! An animation is plain data that maps a normalized time `t ∈ [0, 1]` onto
//! the model (`tween`). The `Animator` owns at most one running animation and
//! steps it from an external frame clock; starting another animation first
//! snaps the running one to its end state.

use crate::command::{CommandTarget, Models};
use dg_core::{ElementId, Point, SceneGraph};
use std::fmt;
use std::time::Duration;

/// Something that can write its state at time `t` into a model.
pub trait Animation: fmt::Debug {
    /// `t` is clamped to `[0, 1]` by the caller.
    fn tween(&mut self, t: f64, model: &mut SceneGraph);
}

// ─── Move animation ──────────────────────────────────────────────────────

/// A move bound to its element: where it was when the move was resolved,
/// and where it goes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedMove {
    pub element_id: ElementId,
    pub from: Point,
    pub to: Point,
}

impl ResolvedMove {
    pub fn displacement(&self) -> Point {
        self.from.delta_to(self.to)
    }
}

/// Linear interpolation of element positions. Forward goes from → to,
/// reverse goes to → from.
#[derive(Debug, Clone)]
pub struct MoveAnimation {
    moves: Vec<ResolvedMove>,
    reverse: bool,
}

impl MoveAnimation {
    pub fn new(moves: Vec<ResolvedMove>, reverse: bool) -> Self {
        Self { moves, reverse }
    }

    pub fn moves(&self) -> &[ResolvedMove] {
        &self.moves
    }

    pub fn is_reverse(&self) -> bool {
        self.reverse
    }

    /// Position of one move at time `t`.
    pub fn position_at(&self, mv: &ResolvedMove, t: f64) -> Point {
        if self.reverse {
            mv.to.lerp(mv.from, t)
        } else {
            mv.from.lerp(mv.to, t)
        }
    }
}

impl Animation for MoveAnimation {
    fn tween(&mut self, t: f64, model: &mut SceneGraph) {
        for mv in &self.moves {
            let position = self.position_at(mv, t);
            match model.get_by_id_mut(mv.element_id) {
                Some(element) => {
                    element.set_position(position);
                }
                None => log::trace!("tween: {} is gone, skipping", mv.element_id),
            }
        }
    }
}

// ─── Driver ──────────────────────────────────────────────────────────────

/// An animation bound to the model it drives and its schedule.
#[derive(Debug)]
pub struct ActiveAnimation {
    animation: Box<dyn Animation>,
    target: CommandTarget,
    started_at: Duration,
    duration: Duration,
}

impl ActiveAnimation {
    /// Normalized progress at `now`, clamped to `[0, 1]`.
    pub fn progress(&self, now: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.started_at);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    pub fn target(&self) -> CommandTarget {
        self.target
    }
}

/// Drives the single active animation of an execution context.
#[derive(Debug, Default)]
pub struct Animator {
    active: Option<ActiveAnimation>,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&ActiveAnimation> {
        self.active.as_ref()
    }

    /// Start `animation`, superseding whatever is running. The superseded
    /// animation jumps to its end state so the model never stays half-way.
    pub fn start(
        &mut self,
        animation: Box<dyn Animation>,
        target: CommandTarget,
        now: Duration,
        duration: Duration,
        models: &mut Models,
    ) {
        if self.active.is_some() {
            log::debug!("animation superseded");
            self.finish(models);
        }
        let mut active = ActiveAnimation {
            animation,
            target,
            started_at: now,
            duration,
        };
        active.animation.tween(0.0, models.get_mut(target));
        log::debug!("animation started ({} ms)", duration.as_millis());
        if duration.is_zero() {
            active.animation.tween(1.0, models.get_mut(target));
        } else {
            self.active = Some(active);
        }
    }

    /// Advance to `now`. Returns `true` while an animation is still running.
    pub fn tick(&mut self, now: Duration, models: &mut Models) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        let t = active.progress(now);
        log::trace!("animation frame t={t:.3}");
        active.animation.tween(t, models.get_mut(active.target));
        if t >= 1.0 {
            log::debug!("animation finished");
            self.active = None;
        }
        self.active.is_some()
    }

    /// Jump the running animation to its end state and drop it.
    pub fn finish(&mut self, models: &mut Models) {
        if let Some(mut active) = self.active.take() {
            active.animation.tween(1.0, models.get_mut(active.target));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dg_core::{ElementSchema, ModelFactory, SchemaFactory};

    fn models() -> Models {
        let schema: ElementSchema = serde_json::from_str(
            r#"{ "id": "a_graph", "type": "graph", "children": [
                { "id": "a_n", "type": "node", "position": { "x": 0, "y": 0 } } ] }"#,
        )
        .unwrap();
        Models::new(SchemaFactory.create_root(&schema).unwrap())
    }

    fn slide() -> MoveAnimation {
        MoveAnimation::new(
            vec![ResolvedMove {
                element_id: ElementId::intern("a_n"),
                from: Point::new(0.0, 0.0),
                to: Point::new(0.3, 100.0),
            }],
            false,
        )
    }

    fn position(models: &Models) -> Point {
        models
            .diagram
            .get_by_id(ElementId::intern("a_n"))
            .and_then(|e| e.position())
            .unwrap()
    }

    #[test]
    fn tween_bounds_are_exact() {
        let mut m = models();
        let mut anim = slide();
        anim.tween(1.0, &mut m.diagram);
        assert_eq!(position(&m), Point::new(0.3, 100.0));
        anim.tween(0.0, &mut m.diagram);
        assert_eq!(position(&m), Point::new(0.0, 0.0));
    }

    #[test]
    fn reverse_tween_runs_backwards() {
        let mut m = models();
        let mut anim = MoveAnimation::new(slide().moves().to_vec(), true);
        anim.tween(0.0, &mut m.diagram);
        assert_eq!(position(&m), Point::new(0.3, 100.0));
        anim.tween(0.25, &mut m.diagram);
        assert!((position(&m).y - 75.0).abs() < 1e-9);
        anim.tween(1.0, &mut m.diagram);
        assert_eq!(position(&m), Point::new(0.0, 0.0));
    }

    #[test]
    fn animator_steps_with_the_clock() {
        let mut m = models();
        let mut animator = Animator::new();
        let start = Duration::from_millis(1_000);
        animator.start(
            Box::new(slide()),
            CommandTarget::Model,
            start,
            Duration::from_millis(200),
            &mut m,
        );
        assert!(animator.tick(start + Duration::from_millis(100), &mut m));
        assert!((position(&m).y - 50.0).abs() < 1e-9);

        // Past the end: clamped to t = 1 and dropped.
        assert!(!animator.tick(start + Duration::from_millis(900), &mut m));
        assert_eq!(position(&m), Point::new(0.3, 100.0));
        assert!(!animator.is_running());
    }

    #[test]
    fn starting_a_new_animation_snaps_the_old_one() {
        let mut m = models();
        let mut animator = Animator::new();
        let start = Duration::ZERO;
        animator.start(
            Box::new(slide()),
            CommandTarget::Model,
            start,
            Duration::from_millis(200),
            &mut m,
        );
        animator.tick(Duration::from_millis(50), &mut m);

        let back = MoveAnimation::new(slide().moves().to_vec(), true);
        animator.start(
            Box::new(back),
            CommandTarget::Model,
            Duration::from_millis(50),
            Duration::from_millis(200),
            &mut m,
        );
        // The new animation starts from the old one's end state.
        assert_eq!(position(&m), Point::new(0.3, 100.0));
        animator.finish(&mut m);
        assert_eq!(position(&m), Point::new(0.0, 0.0));
    }

    #[test]
    fn zero_duration_applies_immediately() {
        let mut m = models();
        let mut animator = Animator::new();
        animator.start(
            Box::new(slide()),
            CommandTarget::Model,
            Duration::ZERO,
            Duration::ZERO,
            &mut m,
        );
        assert!(!animator.is_running());
        assert_eq!(position(&m), Point::new(0.3, 100.0));
    }
}
