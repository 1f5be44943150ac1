//! Game driver: gallery, chat and reveal screens
//!
//! Reads player lines from any async buffered reader and drives a
//! [`Session`] per chosen relic, rendering through a [`Presenter`].

use crate::config::GameConfig;
use crate::error::GameError;
use crate::llm::LlmService;
use crate::presentation::{Presenter, Route, Sender};
use crate::session::{Session, TurnOutcome};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

const QUIT: &str = "/quit";
const BACK: &str = "/back";

pub(crate) const CHOOSE_PROMPT: &str = "Choose a relic by number (or /quit to leave):";
pub(crate) const CHAT_HINT: &str = "Ask anything. /back returns to the gallery, /quit leaves.";
pub(crate) const START_FAILED: &str =
    "Failed to start the conversation. Check the configuration and network connection.";
pub(crate) const CONNECTION_LOST: &str =
    "Sorry, the connection to the past seems to have been interrupted. Please try again later.";
pub(crate) const NO_DETAILS: &str = "No details are available for this figure yet.";
pub(crate) const RETURN_PROMPT: &str = "Press Enter to return to the gallery.";

/// How a chat screen ended
#[derive(Debug, PartialEq, Eq)]
enum ChatExit {
    Revealed(String),
    Back,
    Quit,
}

pub struct Game<P: Presenter> {
    config: Arc<GameConfig>,
    llm: Arc<dyn LlmService>,
    presenter: P,
}

impl<P: Presenter> Game<P> {
    pub fn new(config: Arc<GameConfig>, llm: Arc<dyn LlmService>, presenter: P) -> Self {
        Self {
            config,
            llm,
            presenter,
        }
    }

    #[cfg(test)]
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Run until the player quits or input ends.
    pub async fn run<R>(&mut self, input: &mut R) -> Result<(), GameError>
    where
        R: AsyncBufRead + Unpin,
    {
        while let Some(persona_id) = self.gallery(input).await? {
            match self.chat(&persona_id, input).await? {
                ChatExit::Revealed(id) => {
                    if !self.reveal(&id, input).await? {
                        break;
                    }
                }
                ChatExit::Back => {}
                ChatExit::Quit => break,
            }
        }

        self.presenter.pause_music();
        tracing::info!("Game finished");
        Ok(())
    }

    /// Show the relics and return the chosen persona id.
    async fn gallery<R>(&mut self, input: &mut R) -> Result<Option<String>, GameError>
    where
        R: AsyncBufRead + Unpin,
    {
        let config = Arc::clone(&self.config);
        self.presenter.navigate_to(&Route::Gallery);
        self.presenter.play_music();

        if let Some(story) = &config.background_story {
            self.presenter.render_message(story.trim(), Sender::Narrator);
        }

        if config.personas().is_empty() {
            self.presenter
                .render_message("No relics are on display.", Sender::Narrator);
            return Ok(None);
        }

        for (i, persona) in config.personas().iter().enumerate() {
            let number = i + 1;
            let caption = persona
                .relic
                .clone()
                .unwrap_or_else(|| format!("Relic #{number}"));
            self.presenter
                .render_message(&format!("  [{number}] {caption}"), Sender::Narrator);
        }

        loop {
            self.presenter.render_message(CHOOSE_PROMPT, Sender::Narrator);
            let Some(line) = read_line(input).await? else {
                return Ok(None);
            };
            let choice = line.trim();
            if choice == QUIT {
                return Ok(None);
            }
            if choice.is_empty() {
                continue;
            }

            if let Some(persona_id) = select(&config, choice) {
                tracing::info!(persona_id = %persona_id, "Relic selected");
                self.presenter.pause_music();
                return Ok(Some(persona_id));
            }
            self.presenter
                .render_message(&format!("There is no relic {choice:?}."), Sender::Narrator);
        }
    }

    async fn chat<R>(&mut self, persona_id: &str, input: &mut R) -> Result<ChatExit, GameError>
    where
        R: AsyncBufRead + Unpin,
    {
        self.presenter.navigate_to(&Route::Chat {
            persona_id: persona_id.to_string(),
        });

        let mut session = Session::new(Arc::clone(&self.config), persona_id, Arc::clone(&self.llm))?;
        match session.start().await {
            Ok(outcome) => self.show(&outcome),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                tracing::error!(
                    session_id = %session.id(),
                    status = ?e.status(),
                    error = %e,
                    "Failed to start session"
                );
                self.presenter.render_message(START_FAILED, Sender::Narrator);
                return Ok(ChatExit::Back);
            }
        }
        self.presenter.render_message(CHAT_HINT, Sender::Narrator);

        loop {
            let Some(line) = read_line(input).await? else {
                return Ok(leave(&session, ChatExit::Quit));
            };
            let text = line.trim();
            match text {
                QUIT => return Ok(leave(&session, ChatExit::Quit)),
                BACK => return Ok(leave(&session, ChatExit::Back)),
                "" => continue,
                _ => self.presenter.render_message(text, Sender::User),
            }

            match session.submit_user_turn(text).await {
                Ok(outcome) => {
                    self.show(&outcome);
                    if let Some(reveal) = outcome.reveal {
                        tokio::time::sleep(reveal.delay).await;
                        return Ok(ChatExit::Revealed(reveal.persona_id));
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        session_id = %session.id(),
                        status = ?e.status(),
                        error = %e,
                        "Turn failed"
                    );
                    self.presenter.render_message(CONNECTION_LOST, Sender::Narrator);
                }
            }
        }
    }

    /// Show who the figure was. Returns false when the player wants to leave.
    async fn reveal<R>(&mut self, persona_id: &str, input: &mut R) -> Result<bool, GameError>
    where
        R: AsyncBufRead + Unpin,
    {
        let config = Arc::clone(&self.config);
        self.presenter.navigate_to(&Route::Reveal {
            persona_id: persona_id.to_string(),
        });

        match config.persona(persona_id) {
            Some(persona) => {
                self.presenter
                    .render_message(&persona.display_name, Sender::Narrator);
                let details = persona.details.as_deref().unwrap_or(NO_DETAILS);
                self.presenter.render_message(details, Sender::Narrator);
            }
            None => {
                tracing::error!(persona_id = %persona_id, "Reveal for unknown persona");
                self.presenter
                    .render_message("Could not find that figure.", Sender::Narrator);
            }
        }

        self.presenter.render_message(RETURN_PROMPT, Sender::Narrator);
        Ok(match read_line(input).await? {
            Some(line) => line.trim() != QUIT,
            None => false,
        })
    }

    fn show(&mut self, outcome: &TurnOutcome) {
        if let Some(text) = outcome.display.as_deref().filter(|t| !t.is_empty()) {
            self.presenter.render_message(text, Sender::Persona);
        }
    }
}

fn leave(session: &Session, exit: ChatExit) -> ChatExit {
    tracing::info!(
        session_id = %session.id(),
        state = session.state().name(),
        messages = session.history().len(),
        exit = ?exit,
        "Leaving chat"
    );
    exit
}

/// Pick a persona by 1-based gallery number or by id.
fn select(config: &GameConfig, choice: &str) -> Option<String> {
    let persona = match choice.parse::<usize>() {
        Ok(number) => number
            .checked_sub(1)
            .and_then(|i| config.personas().get(i)),
        Err(_) => config.persona(choice),
    };
    persona.map(|p| p.id.clone())
}

/// Read one line; `None` at end of input.
async fn read_line<R>(input: &mut R) -> Result<Option<String>, GameError>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    let read = input.read_line(&mut line).await?;
    Ok((read > 0).then_some(line))
}
