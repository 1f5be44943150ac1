//! Line-oriented terminal presenter

use super::{Presenter, Route, Sender};
use std::io::Write;

const CHAT_TITLE: &str = "Conversation with a mysterious historical figure";

/// Presenter writing plain text to any writer (stdout in the binary)
pub struct TerminalPresenter<W: Write> {
    out: W,
    music_playing: bool,
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            music_playing: false,
        }
    }

    #[cfg(test)]
    pub fn is_music_playing(&self) -> bool {
        self.music_playing
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{line}").and_then(|()| self.out.flush()) {
            tracing::warn!(error = %e, "Failed to write to terminal");
        }
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn render_message(&mut self, text: &str, sender: Sender) {
        match sender {
            // The terminal already echoed what the player typed
            Sender::User => {}
            Sender::Persona => self.write_line(&format!("Stranger: {text}")),
            Sender::Narrator => self.write_line(text),
        }
    }

    fn navigate_to(&mut self, route: &Route) {
        tracing::debug!(route = %route, "Navigate");
        let title = match route {
            Route::Gallery => "Relic Gallery",
            Route::Chat { .. } => CHAT_TITLE,
            Route::Reveal { .. } => "The Figure Revealed",
        };
        self.write_line("");
        self.write_line(&format!("=== {title} ==="));
    }

    fn play_music(&mut self) {
        if !self.music_playing {
            self.music_playing = true;
            self.write_line("[music playing]");
        }
    }

    fn pause_music(&mut self) {
        if self.music_playing {
            self.music_playing = false;
            self.write_line("[music paused]");
        }
    }
}
