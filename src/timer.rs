//! Deferred events and tweens
//!
//! Single-threaded and polled: the owner calls [`Timer::update`] once per tick
//! and handles whatever events come back. A timer belongs to the object that
//! consumes its events, so dropping the owner drops its pending tasks.

use serde::{Deserialize, Serialize};

/// Identifier of a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u32);

/// Identifier of a running or finished tween
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TweenId(u32);

/// Tween interpolation curves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Easing {
    #[default]
    Linear,
    EaseOutQuad,
}

impl Easing {
    /// Map normalized time `t` in [0, 1] to progress in [0, 1]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseOutQuad => t * (2.0 - t),
        }
    }
}

#[derive(Debug)]
struct Task<E> {
    id: TaskId,
    delay: f32,
    elapsed: f32,
    event: E,
}

#[derive(Debug)]
struct Tween<E> {
    id: TweenId,
    from: f32,
    to: f32,
    duration: f32,
    elapsed: f32,
    easing: Easing,
    on_complete: Option<E>,
}

impl<E> Tween<E> {
    fn value(&self) -> f32 {
        if self.duration <= 0.0 {
            return self.to;
        }
        let progress = self.easing.apply(self.elapsed / self.duration);
        self.from + (self.to - self.from) * progress
    }

    fn is_done(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Polled task list yielding events of type `E`
#[derive(Debug)]
pub struct Timer<E> {
    tasks: Vec<Task<E>>,
    tweens: Vec<Tween<E>>,
    /// Final values of completed tweens, kept so owners can keep reading them
    settled: Vec<(TweenId, f32)>,
    next_id: u32,
}

impl<E> Default for Timer<E> {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            tweens: Vec::new(),
            settled: Vec::new(),
            next_id: 1,
        }
    }
}

impl<E> Timer<E> {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Fire `event` once, after `delay` seconds have accumulated
    pub fn schedule(&mut self, delay: f32, event: E) -> TaskId {
        let id = TaskId(self.next_id());
        self.tasks.push(Task {
            id,
            delay: delay.max(0.0),
            elapsed: 0.0,
            event,
        });
        id
    }

    /// Drop a pending task; returns false if it already fired or never existed
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.tasks.iter().any(|t| t.id == id)
    }

    /// Animate a value from `from` to `to`, yielding `on_complete` when done
    pub fn tween(
        &mut self,
        from: f32,
        to: f32,
        duration: f32,
        easing: Easing,
        on_complete: Option<E>,
    ) -> TweenId {
        let id = TweenId(self.next_id());
        self.tweens.push(Tween {
            id,
            from,
            to,
            duration: duration.max(0.0),
            elapsed: 0.0,
            easing,
            on_complete,
        });
        id
    }

    /// Current value of a tween (its end value once finished)
    pub fn value(&self, id: TweenId) -> Option<f32> {
        self.tweens
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.value())
            .or_else(|| self.settled.iter().find(|(sid, _)| *sid == id).map(|(_, v)| *v))
    }

    /// Drop a tween whether running or finished; its value reads `None` after
    pub fn forget(&mut self, id: TweenId) {
        self.tweens.retain(|t| t.id != id);
        self.settled.retain(|(sid, _)| *sid != id);
    }

    /// Number of tweens still readable through [`Timer::value`]
    pub fn tracked_tweens(&self) -> usize {
        self.tweens.len() + self.settled.len()
    }

    pub fn is_tweening(&self) -> bool {
        !self.tweens.is_empty()
    }

    /// Number of pending tasks and running tweens
    pub fn pending(&self) -> usize {
        self.tasks.len() + self.tweens.len()
    }

    /// Advance all tasks and tweens; returns events that became due this tick
    ///
    /// Each task or tween yields at most one event per call.
    pub fn update(&mut self, dt: f32) -> Vec<E> {
        let mut fired = Vec::new();

        for task in &mut self.tasks {
            task.elapsed += dt;
        }
        let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.tasks)
            .into_iter()
            .partition(|t| t.elapsed >= t.delay);
        self.tasks = pending;
        fired.extend(due.into_iter().map(|t| t.event));

        for tween in &mut self.tweens {
            tween.elapsed += dt;
        }
        let (done, running): (Vec<_>, Vec<_>) = std::mem::take(&mut self.tweens)
            .into_iter()
            .partition(|t| t.is_done());
        self.tweens = running;
        for tween in done {
            self.settled.push((tween.id, tween.to));
            if let Some(event) = tween.on_complete {
                fired.push(event);
            }
        }

        fired
    }

    /// Drop every task and tween
    pub fn clear(&mut self) {
        self.tasks.clear();
        self.tweens.clear();
        self.settled.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Ev {
        Ping,
        Done,
    }

    #[test]
    fn test_schedule_fires_once_after_delay() {
        let mut timer = Timer::new();
        timer.schedule(1.0, Ev::Ping);

        assert!(timer.update(0.5).is_empty());
        assert_eq!(timer.update(0.5), vec![Ev::Ping]);
        assert!(timer.update(5.0).is_empty(), "tasks are one-shot");
        assert_eq!(timer.pending(), 0);
    }

    #[test]
    fn test_cancelled_task_is_noop() {
        let mut timer = Timer::new();
        let id = timer.schedule(0.1, Ev::Ping);
        assert!(timer.is_pending(id));
        assert!(timer.cancel(id));
        assert!(!timer.cancel(id));
        assert!(timer.update(1.0).is_empty());
    }

    #[test]
    fn test_large_dt_fires_each_task_once() {
        let mut timer = Timer::new();
        timer.schedule(0.1, Ev::Ping);
        timer.schedule(0.2, Ev::Done);
        let fired = timer.update(10.0);
        assert_eq!(fired, vec![Ev::Ping, Ev::Done]);
    }

    #[test]
    fn test_tween_progress_and_completion() {
        let mut timer = Timer::new();
        let id = timer.tween(0.0, 100.0, 1.0, Easing::Linear, Some(Ev::Done));

        assert!(timer.update(0.25).is_empty());
        assert!((timer.value(id).unwrap() - 25.0).abs() < 1e-3);

        assert_eq!(timer.update(1.0), vec![Ev::Done]);
        assert_eq!(timer.value(id), Some(100.0));
        assert!(!timer.is_tweening());
    }

    #[test]
    fn test_ease_out_quad_front_loaded() {
        assert!(Easing::EaseOutQuad.apply(0.5) > Easing::Linear.apply(0.5));
        assert_eq!(Easing::EaseOutQuad.apply(1.0), 1.0);
        assert_eq!(Easing::EaseOutQuad.apply(0.0), 0.0);
    }

    #[test]
    fn test_forget_drops_running_and_settled() {
        let mut timer = Timer::new();
        let done = timer.tween(0.0, 1.0, 0.5, Easing::Linear, Some(Ev::Done));
        timer.update(1.0);
        let running = timer.tween(1.0, 0.0, 2.0, Easing::Linear, Some(Ev::Ping));
        assert_eq!(timer.tracked_tweens(), 2);

        timer.forget(done);
        assert_eq!(timer.value(done), None);
        assert!(timer.value(running).is_some());

        timer.forget(running);
        assert_eq!(timer.tracked_tweens(), 0);
        assert!(timer.update(5.0).is_empty(), "forgotten tween never completes");
    }

    #[test]
    fn test_zero_duration_tween_completes_next_update() {
        let mut timer: Timer<Ev> = Timer::new();
        let id = timer.tween(5.0, 9.0, 0.0, Easing::Linear, Some(Ev::Done));
        assert_eq!(timer.value(id), Some(9.0));
        assert_eq!(timer.update(0.0), vec![Ev::Done]);
    }
}
