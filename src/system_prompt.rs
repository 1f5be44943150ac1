//! System prompt rendering from the config template

use crate::config::Persona;

/// Replaced with the persona's display name
pub const NAME_PLACEHOLDER: &str = "{character_name}";
/// Replaced with the persona's background text
pub const BACKGROUND_PLACEHOLDER: &str = "{character_background}";

/// Render the system prompt for `persona`.
///
/// Every occurrence of both placeholders is substituted. Substituted text is
/// not scanned again, so a name that happens to contain a placeholder token
/// comes through literally.
pub fn render(template: &str, persona: &Persona) -> String {
    template
        .split(NAME_PLACEHOLDER)
        .map(|part| part.replace(BACKGROUND_PLACEHOLDER, &persona.background))
        .collect::<Vec<_>>()
        .join(&persona.display_name)
}
