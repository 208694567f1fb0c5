//! Fluent construction of skill responses.
//!
//! ```rust,ignore
//! let response = ResponseBuilder::new()
//!     .speak("Welcome!")
//!     .ask("What do you want to ask?")
//!     .build();
//! ```

use crate::model::{Card, Directive, OutputSpeech, Reprompt, Response, ResponseEnvelope};

/// Builder for a [`ResponseEnvelope`].
#[derive(Debug, Clone, Default)]
pub struct ResponseBuilder {
    response: Response,
}

impl ResponseBuilder {
    /// Creates a builder for an empty response.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the spoken output. `speech` may be plain text or SSML; it is
    /// wrapped in a single `<speak>` element either way.
    pub fn speak(mut self, speech: impl AsRef<str>) -> Self {
        self.response.output_speech = Some(ssml(speech.as_ref()));
        self
    }

    /// Sets the reprompt and keeps the session open for the user's answer.
    pub fn ask(mut self, reprompt: impl AsRef<str>) -> Self {
        self.response.reprompt = Some(Reprompt {
            output_speech: ssml(reprompt.as_ref()),
        });
        self.response.should_end_session = Some(false);
        self
    }

    /// Sets the companion app card.
    pub fn set_card(mut self, card: Card) -> Self {
        self.response.card = Some(card);
        self
    }

    /// Appends a directive.
    pub fn add_directive(mut self, directive: Directive) -> Self {
        self.response.directives.push(directive);
        self
    }

    /// Explicitly ends or keeps the session.
    pub fn set_should_end_session(mut self, end: bool) -> Self {
        self.response.should_end_session = Some(end);
        self
    }

    /// Returns the response built so far.
    pub fn response(&self) -> &Response {
        &self.response
    }

    /// Finishes the response.
    pub fn build(self) -> ResponseEnvelope {
        ResponseEnvelope::new(self.response)
    }
}

fn ssml(speech: &str) -> OutputSpeech {
    OutputSpeech::Ssml {
        ssml: format!("<speak>{}</speak>", trim_speak_tags(speech)),
    }
}

/// Strips one enclosing `<speak>...</speak>` pair, if present.
fn trim_speak_tags(speech: &str) -> &str {
    let speech = speech.trim();
    match speech
        .strip_prefix("<speak>")
        .and_then(|s| s.strip_suffix("</speak>"))
    {
        Some(inner) => inner.trim(),
        None => speech,
    }
}
