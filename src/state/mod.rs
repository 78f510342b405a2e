//! Screen stack
//!
//! The top screen is the active one: it alone receives `update`, while every
//! screen renders bottom to top. Hooks never touch the stack; they return a
//! [`Transition`] and the stack applies it once the hook has returned.

use std::collections::VecDeque;

use crate::render::Frame;

/// Longest transition chain applied in one go
pub const MAX_TRANSITIONS: usize = 64;

/// Value a popped screen hands to the one below it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenResult {
    /// Wager accepted
    Wager(u32),
    /// Sub-screen dismissed without an answer
    Cancelled,
}

/// Requested change to the stack
pub enum Transition<C> {
    None,
    Push(Box<dyn Screen<C>>),
    Pop,
    PopWith(ScreenResult),
    /// Pop the top (running its exit) then push
    Replace(Box<dyn Screen<C>>),
    /// Drop everything without exit hooks, then push
    Reset(Box<dyn Screen<C>>),
    Quit,
}

impl<C> Transition<C> {
    fn label(&self) -> &'static str {
        match self {
            Transition::None => "none",
            Transition::Push(_) => "push",
            Transition::Pop => "pop",
            Transition::PopWith(_) => "pop_with",
            Transition::Replace(_) => "replace",
            Transition::Reset(_) => "reset",
            Transition::Quit => "quit",
        }
    }
}

impl<C> std::fmt::Debug for Transition<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transition::Push(s) | Transition::Replace(s) | Transition::Reset(s) => {
                write!(f, "{}({})", self.label(), s.name())
            }
            Transition::PopWith(r) => write!(f, "pop_with({r:?})"),
            _ => f.write_str(self.label()),
        }
    }
}

/// A frame on the stack
pub trait Screen<C> {
    fn name(&self) -> &'static str;

    /// Became the top by being pushed
    fn enter(&mut self, _ctx: &mut C) -> Transition<C> {
        Transition::None
    }

    /// About to be removed
    fn exit(&mut self, _ctx: &mut C) -> Transition<C> {
        Transition::None
    }

    /// Became the top again after the screen above was popped
    fn re_enter(&mut self, _ctx: &mut C, _result: Option<ScreenResult>) -> Transition<C> {
        Transition::None
    }

    fn update(&mut self, ctx: &mut C, dt: f32) -> Transition<C>;

    fn render(&self, ctx: &C, frame: &mut Frame);
}

pub struct StateStack<C> {
    screens: Vec<Box<dyn Screen<C>>>,
    quitting: bool,
}

impl<C> Default for StateStack<C> {
    fn default() -> Self {
        Self {
            screens: Vec::new(),
            quitting: false,
        }
    }
}

impl<C> StateStack<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, screen: Box<dyn Screen<C>>, ctx: &mut C) {
        self.apply(Transition::Push(screen), ctx);
    }

    pub fn pop(&mut self, ctx: &mut C) {
        self.apply(Transition::Pop, ctx);
    }

    pub fn pop_with(&mut self, result: ScreenResult, ctx: &mut C) {
        self.apply(Transition::PopWith(result), ctx);
    }

    pub fn top(&self) -> Option<&dyn Screen<C>> {
        self.screens.last().map(|s| s.as_ref())
    }

    /// Name of the active screen
    pub fn top_name(&self) -> Option<&'static str> {
        self.top().map(|s| s.name())
    }

    /// Screen names bottom to top
    pub fn names(&self) -> Vec<&'static str> {
        self.screens.iter().map(|s| s.name()).collect()
    }

    /// Empty the stack without running exit hooks
    pub fn clear(&mut self) {
        self.screens.clear();
    }

    pub fn len(&self) -> usize {
        self.screens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.screens.is_empty()
    }

    pub fn is_quitting(&self) -> bool {
        self.quitting
    }

    /// Update the top screen only
    pub fn update(&mut self, ctx: &mut C, dt: f32) {
        let Some(top) = self.screens.last_mut() else {
            return;
        };
        let transition = top.update(ctx, dt);
        self.apply(transition, ctx);
    }

    /// Render every screen, bottom to top
    pub fn render(&self, ctx: &C, frame: &mut Frame) {
        for screen in &self.screens {
            screen.render(ctx, frame);
        }
    }

    /// Apply a transition and everything the hooks it triggers ask for, in order
    pub fn apply(&mut self, transition: Transition<C>, ctx: &mut C) {
        let mut queue = VecDeque::from([transition]);
        let mut applied = 0;

        while let Some(transition) = queue.pop_front() {
            if matches!(transition, Transition::None) {
                continue;
            }
            applied += 1;
            if applied > MAX_TRANSITIONS {
                log::error!(
                    "Dropping {} transitions after {MAX_TRANSITIONS} in one chain (next: {transition:?})",
                    queue.len() + 1
                );
                return;
            }
            log::debug!("Stack transition {transition:?}");

            match transition {
                Transition::None => {}
                Transition::Push(screen) => queue.push_back(self.push_now(screen, ctx)),
                Transition::Pop => queue.extend(self.pop_now(ctx, None)),
                Transition::PopWith(result) => queue.extend(self.pop_now(ctx, Some(result))),
                Transition::Replace(screen) => {
                    if let Some(mut top) = self.screens.pop() {
                        queue.push_back(top.exit(ctx));
                    }
                    queue.push_back(self.push_now(screen, ctx));
                }
                Transition::Reset(screen) => {
                    self.screens.clear();
                    queue.push_back(self.push_now(screen, ctx));
                }
                Transition::Quit => self.quitting = true,
            }
        }
    }

    fn push_now(&mut self, screen: Box<dyn Screen<C>>, ctx: &mut C) -> Transition<C> {
        self.screens.push(screen);
        match self.screens.last_mut() {
            Some(top) => top.enter(ctx),
            None => Transition::None,
        }
    }

    /// Exit and remove the top, then re-enter the new top
    fn pop_now(&mut self, ctx: &mut C, result: Option<ScreenResult>) -> Vec<Transition<C>> {
        let Some(mut popped) = self.screens.pop() else {
            log::warn!("Pop on empty stack");
            return Vec::new();
        };
        let mut follow_ups = vec![popped.exit(ctx)];
        if let Some(top) = self.screens.last_mut() {
            follow_ups.push(top.re_enter(ctx, result));
        }
        follow_ups
    }
}
