//! Presentation seam
//!
//! The game driver talks to the screen only through [`Presenter`], so
//! sessions and the driver run headless in tests.

mod terminal;

pub use terminal::TerminalPresenter;

use std::fmt;

/// Who a rendered message comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Persona,
    /// Game text: story, prompts, errors
    Narrator,
}

/// Screens the game can show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Gallery,
    Chat { persona_id: String },
    Reveal { persona_id: String },
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Gallery => f.write_str("gallery"),
            Route::Chat { persona_id } => write!(f, "chat/{persona_id}"),
            Route::Reveal { persona_id } => write!(f, "reveal/{persona_id}"),
        }
    }
}

/// Rendering surface for the game
pub trait Presenter {
    fn render_message(&mut self, text: &str, sender: Sender);

    fn navigate_to(&mut self, route: &Route);

    fn play_music(&mut self);

    fn pause_music(&mut self);
}
