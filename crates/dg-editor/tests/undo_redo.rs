//! Integration tests: commands, merging, animation, and undo/redo
//! (dg-editor).
//!
//! Every test dispatches actions through the `ActionDispatcher` against the
//! shared fixture and drives animations with explicit timestamps.

use dg_core::{ElementId, ElementSchema, ModelFactory, Point, SceneGraph, SchemaFactory};
use dg_editor::{Action, ActionDispatcher, EditorConfig, ElementMove, MoveAction};
use pretty_assertions::assert_eq;
use std::time::Duration;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn fixture() -> SceneGraph {
    let schema: ElementSchema =
        serde_json::from_str(include_str!("fixtures/diagram.json")).unwrap();
    SchemaFactory.create_root(&schema).unwrap()
}

fn dispatcher() -> ActionDispatcher {
    init_logger();
    ActionDispatcher::new(fixture(), &EditorConfig::default())
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn pos(d: &ActionDispatcher, id: &str) -> Point {
    d.model()
        .get_by_id(ElementId::intern(id))
        .and_then(|e| e.position())
        .unwrap_or_else(|| panic!("{id} has no position"))
}

fn snap(moves: &[(&str, (f64, f64))]) -> Action {
    moves_action(moves, false)
}

fn animated(moves: &[(&str, (f64, f64))]) -> Action {
    moves_action(moves, true)
}

fn moves_action(moves: &[(&str, (f64, f64))], animate: bool) -> Action {
    Action::Move(MoveAction::new(
        moves
            .iter()
            .map(|(id, (x, y))| ElementMove::new(ElementId::intern(id), None, Point::new(*x, *y))),
        animate,
    ))
}

// ─── Basic undo/redo ────────────────────────────────────────────────────

#[test]
fn execute_undo_redo_round_trips_the_model() {
    let mut d = dispatcher();
    let before = d.model().to_schema();

    d.dispatch(snap(&[("n3", (30.0, 130.0))]), ms(0)).unwrap();
    let after = d.model().to_schema();
    assert_ne!(before, after);

    d.dispatch(Action::Undo, ms(10)).unwrap();
    d.finish_animations();
    assert_eq!(d.model().to_schema(), before);

    d.dispatch(Action::Redo, ms(20)).unwrap();
    d.finish_animations();
    assert_eq!(d.model().to_schema(), after);
}

#[test]
fn undo_with_empty_history_is_a_no_op() {
    let mut d = dispatcher();
    let before = d.model().to_schema();
    d.dispatch(Action::Undo, ms(0)).unwrap();
    d.dispatch(Action::Redo, ms(0)).unwrap();
    assert_eq!(d.model().to_schema(), before);
}

#[test]
fn new_command_after_undo_discards_redo() {
    let mut d = dispatcher();
    d.dispatch(snap(&[("n3", (1.0, 1.0))]), ms(0)).unwrap();
    d.dispatch(Action::Undo, ms(0)).unwrap();
    assert!(d.stack().can_redo());

    d.dispatch(animated(&[("n2", (0.0, 0.0))]), ms(0)).unwrap();
    assert!(!d.stack().can_redo());
}

#[test]
fn mixed_moves_undo_back_to_the_start() {
    let mut d = dispatcher();
    let before = d.model().to_schema();

    d.dispatch(animated(&[("n1", (17.0, 3.0))]), ms(0)).unwrap();
    d.tick(ms(100));
    d.dispatch(snap(&[("n2", (120.5, 7.25))]), ms(120)).unwrap();
    d.dispatch(animated(&[("n1", (-4.0, 9.0)), ("n3", (2.0, 2.0))]), ms(130)).unwrap();
    d.tick(ms(200));

    for step in 0..3 {
        d.dispatch(Action::Undo, ms(300 + step * 10)).unwrap();
    }
    d.finish_animations();
    assert_eq!(d.model().to_schema(), before);
}

// ─── Merging ────────────────────────────────────────────────────────────

#[test]
fn drag_of_snap_moves_is_one_undo_step() {
    let mut d = dispatcher();
    for step in 1..=3u32 {
        let x = f64::from(step);
        d.dispatch(snap(&[("n3", (x, 100.0))]), ms(u64::from(step) * 16)).unwrap();
    }
    assert_eq!(pos(&d, "n3"), Point::new(3.0, 100.0));
    assert_eq!(d.stack().undo_depth(), 1);

    d.dispatch(Action::Undo, ms(100)).unwrap();
    d.finish_animations();
    assert_eq!(pos(&d, "n3"), Point::new(0.0, 100.0));
    assert!(!d.stack().can_undo());

    d.dispatch(Action::Redo, ms(200)).unwrap();
    d.finish_animations();
    assert_eq!(pos(&d, "n3"), Point::new(3.0, 100.0));
    assert!(!d.stack().can_redo());
}

#[test]
fn animated_moves_are_separate_undo_steps() {
    let mut d = dispatcher();
    d.dispatch(animated(&[("n3", (10.0, 100.0))]), ms(0)).unwrap();
    d.dispatch(animated(&[("n3", (20.0, 100.0))]), ms(10)).unwrap();
    assert_eq!(d.stack().undo_depth(), 2);

    d.dispatch(Action::Undo, ms(20)).unwrap();
    d.finish_animations();
    assert_eq!(pos(&d, "n3"), Point::new(10.0, 100.0));
}

#[test]
fn merge_adds_elements_that_join_mid_drag() {
    let mut d = dispatcher();
    d.dispatch(snap(&[("n3", (5.0, 100.0))]), ms(0)).unwrap();
    d.dispatch(snap(&[("n3", (6.0, 100.0)), ("n2", (101.0, 0.0))]), ms(16)).unwrap();
    assert_eq!(d.stack().undo_depth(), 1);

    d.dispatch(Action::Undo, ms(32)).unwrap();
    d.finish_animations();
    assert_eq!(pos(&d, "n3"), Point::new(0.0, 100.0));
    assert_eq!(pos(&d, "n2"), Point::new(100.0, 0.0));
}

#[test]
fn hover_between_drag_steps_does_not_break_the_merge() {
    let mut d = dispatcher();
    d.dispatch(snap(&[("n3", (1.0, 100.0))]), ms(0)).unwrap();
    d.dispatch(Action::hover(ElementId::intern("n3"), true), ms(8)).unwrap();
    d.dispatch(snap(&[("n3", (2.0, 100.0))]), ms(16)).unwrap();
    assert_eq!(d.stack().undo_depth(), 1);
}

// ─── Edge following ─────────────────────────────────────────────────────

#[test]
fn routing_points_follow_when_both_endpoints_move() {
    let mut d = dispatcher();
    d.dispatch(snap(&[("n1", (10.0, 10.0)), ("n2", (100.0, 0.0))]), ms(0)).unwrap();

    assert_eq!(pos(&d, "e1_rp0"), Point::new(15.0, 15.0));
    assert_eq!(pos(&d, "n2"), Point::new(100.0, 0.0));
    // e2 ends at n3, which stayed put.
    assert_eq!(pos(&d, "e2_rp0"), Point::new(0.0, 50.0));

    d.dispatch(Action::Undo, ms(10)).unwrap();
    d.finish_animations();
    assert_eq!(pos(&d, "e1_rp0"), Point::new(5.0, 5.0));
}

#[test]
fn routing_points_stay_when_one_endpoint_moves() {
    let mut d = dispatcher();
    d.dispatch(snap(&[("n1", (10.0, 10.0))]), ms(0)).unwrap();
    assert_eq!(pos(&d, "e1_rp0"), Point::new(5.0, 5.0));
}

#[test]
fn routing_points_follow_a_merged_drag() {
    let mut d = dispatcher();
    for step in 1..=4u32 {
        let delta = f64::from(step);
        d.dispatch(snap(&[("n1", (delta, 0.0)), ("n3", (delta, 100.0))]), ms(u64::from(step) * 16))
            .unwrap();
    }
    assert_eq!(pos(&d, "e2_rp0"), Point::new(4.0, 50.0));
    assert_eq!(pos(&d, "e2_rp1"), Point::new(14.0, 60.0));
    assert_eq!(d.stack().undo_depth(), 1);

    d.dispatch(Action::Undo, ms(100)).unwrap();
    d.finish_animations();
    assert_eq!(pos(&d, "e2_rp0"), Point::new(0.0, 50.0));
    assert_eq!(pos(&d, "e2_rp1"), Point::new(10.0, 60.0));
}

#[test]
fn edge_moved_action_translates_and_undoes() {
    let mut d = dispatcher();
    let move_action = MoveAction::new(
        [
            ElementMove::new(ElementId::intern("n1"), Some(Point::new(0.0, 0.0)), Point::new(2.0, 3.0)),
            ElementMove::new(ElementId::intern("n2"), Some(Point::new(100.0, 0.0)), Point::new(102.0, 3.0)),
        ],
        false,
    );
    d.dispatch(Action::MoveEdges { move_action }, ms(0)).unwrap();
    assert_eq!(pos(&d, "e1_rp0"), Point::new(7.0, 8.0));

    d.dispatch(Action::Undo, ms(10)).unwrap();
    assert_eq!(pos(&d, "e1_rp0"), Point::new(5.0, 5.0));
}

#[test]
fn edge_moved_counts_a_target_without_from() {
    let mut d = dispatcher();
    let move_action = MoveAction::new(
        [
            ElementMove::new(ElementId::intern("n1"), Some(Point::new(0.0, 0.0)), Point::new(2.0, 3.0)),
            ElementMove::new(ElementId::intern("n2"), None, Point::new(100.0, 0.0)),
        ],
        false,
    );
    d.dispatch(Action::MoveEdges { move_action }, ms(0)).unwrap();
    assert_eq!(pos(&d, "e1_rp0"), Point::new(7.0, 8.0));
}

// ─── Animation ──────────────────────────────────────────────────────────

#[test]
fn animated_move_interpolates_between_endpoints() {
    let mut d = dispatcher();
    d.dispatch(animated(&[("n3", (100.0, 100.0))]), ms(1_000)).unwrap();
    assert_eq!(pos(&d, "n3"), Point::new(0.0, 100.0));

    assert!(d.tick(ms(1_125)));
    let mid = pos(&d, "n3");
    assert!((mid.x - 50.0).abs() < 1e-9, "halfway, got {mid:?}");

    assert!(!d.tick(ms(1_250)));
    assert_eq!(pos(&d, "n3"), Point::new(100.0, 100.0));
}

#[test]
fn undo_plays_the_move_backwards() {
    let mut d = dispatcher();
    d.dispatch(animated(&[("n3", (100.0, 100.0))]), ms(0)).unwrap();
    d.tick(ms(250));

    d.dispatch(Action::Undo, ms(300)).unwrap();
    d.tick(ms(350));
    let back = pos(&d, "n3");
    assert!((back.x - 80.0).abs() < 1e-9, "20% back, got {back:?}");

    d.tick(ms(550));
    assert_eq!(pos(&d, "n3"), Point::new(0.0, 100.0));
}

#[test]
fn a_new_animation_snaps_the_running_one_to_its_end() {
    let mut d = dispatcher();
    d.dispatch(animated(&[("n3", (100.0, 100.0))]), ms(0)).unwrap();
    d.tick(ms(50));
    d.dispatch(animated(&[("n2", (200.0, 0.0))]), ms(60)).unwrap();
    assert_eq!(pos(&d, "n3"), Point::new(100.0, 100.0));
    assert!(d.stack().is_animating());
}

// ─── Model replacement ──────────────────────────────────────────────────

#[test]
fn malformed_set_model_is_reported_and_ignored() {
    let mut d = dispatcher();
    let before = d.model().to_schema();
    let mut bad = ElementSchema::new("broken", "graph");
    bad.children.push(ElementSchema::new("dangling", "edge"));

    let err = d.dispatch(Action::SetModel { new_root: bad }, ms(0));
    assert!(err.is_err());
    assert_eq!(d.model().to_schema(), before);
    assert!(!d.stack().can_undo());
}

#[test]
fn set_model_is_undoable() {
    let mut d = dispatcher();
    let before = d.model().to_schema();
    d.dispatch(
        Action::SetModel {
            new_root: ElementSchema::new("other", "graph"),
        },
        ms(0),
    )
    .unwrap();
    assert_eq!(d.model().len(), 1);

    d.dispatch(Action::Undo, ms(0)).unwrap();
    assert_eq!(d.model().to_schema(), before);
}

#[test]
fn history_depth_follows_config() {
    init_logger();
    let config = EditorConfig::from_json(r#"{ "undoHistoryDepth": 2 }"#).unwrap();
    let mut d = ActionDispatcher::new(fixture(), &config);
    for x in [1.0, 2.0, 3.0] {
        d.dispatch(animated(&[("n3", (x, 0.0))]), ms(0)).unwrap();
    }
    assert_eq!(d.stack().undo_depth(), 2);
}
