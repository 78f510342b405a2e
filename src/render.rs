//! Display list
//!
//! Screens describe what to draw; a host turns the list into pixels. The
//! headless binary only counts it.

use glam::Vec2;

/// Stone panels the screens slide in and out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKind {
    Title,
    Selection,
    Wager,
    Result,
    Help,
    GameOver,
    Victory,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// The playing board; `offset_x` is its slide-in offset from rest
    Board { offset_x: f32 },
    Die {
        position: Vec2,
        angle: f32,
        value: u8,
        rolling: bool,
        held: bool,
    },
    Panel { kind: PanelKind, position: Vec2 },
    Portrait { x: u32, y: u32, position: Vec2 },
    Text { text: String, position: Vec2, alpha: f32 },
    /// Full-canvas black overlay used for fades
    Fade { alpha: f32 },
}

/// One frame's worth of draw commands, bottom to top
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub commands: Vec<DrawCommand>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn text(&mut self, text: impl Into<String>, position: Vec2) {
        self.text_alpha(text, position, 1.0);
    }

    pub fn text_alpha(&mut self, text: impl Into<String>, position: Vec2, alpha: f32) {
        self.commands.push(DrawCommand::Text {
            text: text.into(),
            position,
            alpha: alpha.clamp(0.0, 1.0),
        });
    }

    /// All text drawn this frame
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|t| t.contains(needle))
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}
