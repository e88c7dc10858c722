//! Reversible commands and the undo/redo command stack.
//!
//! Every model change runs as a `Command` through the `CommandStack`.
//! A command captures what it needs to reverse itself the first time it
//! executes. Its result is either an in-place model update or an animation
//! that the stack's `Animator` plays out over subsequent ticks.
//!
//! Consecutive compatible commands can **merge**: after a new command
//! executes, the top of the undo stack is offered to absorb it. A drag
//! gesture of many small snap moves therefore undoes in one step.

use crate::animation::{Animation, Animator};
use crate::config::EditorConfig;
use crate::error::DispatchError;
use dg_core::{ModelFactory, SceneGraph, SchemaFactory};
use std::any::Any;
use std::fmt;
use std::time::Duration;

/// Which model a command operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandTarget {
    /// The diagram.
    Model,
    /// The hover popup, kept apart from the diagram.
    Popup,
}

/// The two models owned by an execution context.
#[derive(Debug, Clone)]
pub struct Models {
    pub diagram: SceneGraph,
    pub popup: SceneGraph,
}

impl Models {
    /// A diagram plus a closed (empty) popup.
    pub fn new(diagram: SceneGraph) -> Self {
        Self {
            diagram,
            popup: SceneGraph::empty(),
        }
    }

    pub fn get(&self, target: CommandTarget) -> &SceneGraph {
        match target {
            CommandTarget::Model => &self.diagram,
            CommandTarget::Popup => &self.popup,
        }
    }

    pub fn get_mut(&mut self, target: CommandTarget) -> &mut SceneGraph {
        match target {
            CommandTarget::Model => &mut self.diagram,
            CommandTarget::Popup => &mut self.popup,
        }
    }
}

/// What a command sees while it runs.
pub struct CommandContext<'a> {
    /// The model selected by the command's `target()`.
    pub root: &'a mut SceneGraph,
    pub factory: &'a dyn ModelFactory,
}

/// Outcome of execute / undo / redo.
#[derive(Debug)]
pub enum CommandResult {
    /// The model was updated in place.
    Model,
    /// The model changes over time; the stack drives the animation.
    Animation(Box<dyn Animation>),
}

/// A reversible model change.
pub trait Command: fmt::Debug {
    /// Action kind this command was created for.
    fn kind(&self) -> &'static str;

    fn target(&self) -> CommandTarget {
        CommandTarget::Model
    }

    /// Recorded commands go on the undo stack and invalidate redo.
    /// Unrecorded ones (hover feedback, popups, layout) run and are dropped.
    fn is_recorded(&self) -> bool {
        true
    }

    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> Result<CommandResult, DispatchError>;

    fn undo(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult;

    fn redo(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult;

    /// Absorb `other`, which has just executed. Returns `false` to leave
    /// both commands separate.
    fn merge(&mut self, _other: &dyn Command, _ctx: &mut CommandContext<'_>) -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any;
}

// ─── Stack ───────────────────────────────────────────────────────────────

/// Executes commands, keeps undo/redo history, and drives animations.
pub struct CommandStack {
    models: Models,
    factory: Box<dyn ModelFactory>,
    undo_stack: Vec<Box<dyn Command>>,
    redo_stack: Vec<Box<dyn Command>>,
    /// Maximum undo depth.
    max_depth: usize,
    animator: Animator,
    animation_duration: Duration,
}

impl fmt::Debug for CommandStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandStack")
            .field("undo", &self.undo_stack.len())
            .field("redo", &self.redo_stack.len())
            .field("animating", &self.animator.is_running())
            .finish()
    }
}

fn context<'a>(
    models: &'a mut Models,
    factory: &'a dyn ModelFactory,
    target: CommandTarget,
) -> CommandContext<'a> {
    CommandContext {
        root: models.get_mut(target),
        factory,
    }
}

impl CommandStack {
    pub fn new(model: SceneGraph, config: &EditorConfig) -> Self {
        Self {
            models: Models::new(model),
            factory: Box::new(SchemaFactory),
            undo_stack: Vec::with_capacity(config.undo_history_depth.min(64)),
            redo_stack: Vec::new(),
            max_depth: config.undo_history_depth,
            animator: Animator::new(),
            animation_duration: config.animation_duration(),
        }
    }

    /// Replace the factory used by model-replacing commands.
    pub fn with_factory(mut self, factory: Box<dyn ModelFactory>) -> Self {
        self.factory = factory;
        self
    }

    pub fn model(&self) -> &SceneGraph {
        &self.models.diagram
    }

    pub fn popup_model(&self) -> &SceneGraph {
        &self.models.popup
    }

    pub fn models(&self) -> &Models {
        &self.models
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_running()
    }

    /// Execute `cmd` at time `now`, then merge it into the top of the undo
    /// stack or push it. On failure the model is unchanged and nothing is
    /// recorded.
    pub fn execute(&mut self, mut cmd: Box<dyn Command>, now: Duration) -> Result<(), DispatchError> {
        let recorded = cmd.is_recorded();
        if recorded {
            // History must see settled positions.
            self.animator.finish(&mut self.models);
        }

        let target = cmd.target();
        let result = {
            let mut ctx = context(&mut self.models, self.factory.as_ref(), target);
            cmd.execute(&mut ctx)?
        };
        log::debug!("executed {}", cmd.kind());
        self.apply(result, target, now);

        if !recorded {
            return Ok(());
        }
        self.redo_stack.clear();

        if let Some(top) = self.undo_stack.last_mut() {
            let mut ctx = context(&mut self.models, self.factory.as_ref(), top.target());
            if top.merge(cmd.as_ref(), &mut ctx) {
                log::debug!("merged {} into {}", cmd.kind(), top.kind());
                return Ok(());
            }
        }

        self.undo_stack.push(cmd);
        if self.undo_stack.len() > self.max_depth {
            let evicted = self.undo_stack.remove(0);
            log::trace!("undo history full, dropped {}", evicted.kind());
        }
        Ok(())
    }

    /// Undo the last recorded command. Returns its kind.
    pub fn undo(&mut self, now: Duration) -> Option<&'static str> {
        let Some(mut cmd) = self.undo_stack.pop() else {
            log::debug!("undo: history is empty");
            return None;
        };
        self.animator.finish(&mut self.models);
        let target = cmd.target();
        let result = {
            let mut ctx = context(&mut self.models, self.factory.as_ref(), target);
            cmd.undo(&mut ctx)
        };
        self.apply(result, target, now);
        let kind = cmd.kind();
        log::debug!("undid {kind}");
        self.redo_stack.push(cmd);
        Some(kind)
    }

    /// Redo the last undone command. Returns its kind.
    pub fn redo(&mut self, now: Duration) -> Option<&'static str> {
        let Some(mut cmd) = self.redo_stack.pop() else {
            log::debug!("redo: nothing to redo");
            return None;
        };
        self.animator.finish(&mut self.models);
        let target = cmd.target();
        let result = {
            let mut ctx = context(&mut self.models, self.factory.as_ref(), target);
            cmd.redo(&mut ctx)
        };
        self.apply(result, target, now);
        let kind = cmd.kind();
        log::debug!("redid {kind}");
        self.undo_stack.push(cmd);
        Some(kind)
    }

    /// Advance the running animation. Returns `true` while one is running.
    pub fn tick(&mut self, now: Duration) -> bool {
        self.animator.tick(now, &mut self.models)
    }

    /// Jump the running animation, if any, to its end state.
    pub fn finish_animations(&mut self) {
        self.animator.finish(&mut self.models);
    }

    fn apply(&mut self, result: CommandResult, target: CommandTarget, now: Duration) {
        if let CommandResult::Animation(animation) = result {
            self.animator.start(
                animation,
                target,
                now,
                self.animation_duration,
                &mut self.models,
            );
        }
    }
}
