//! Client-side lifecycle of one analysis attempt.
//!
//! [`transition`] is pure: it takes the current state and an event and returns
//! the next state plus at most one [`Effect`] for the caller to execute.
//! Timestamps travel inside events so elapsed time is computed without a clock.

use std::time::Instant;

use crate::models::UploadedImage;

pub const NO_IMAGE_MESSAGE: &str = "Please select an image first";
pub const EXAMPLE_LOAD_MESSAGE: &str = "Error loading example";
pub const GENERIC_FAILURE_MESSAGE: &str = "Error analyzing the image";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    ImageSelected,
    Submitting,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadSessionState {
    pub phase: Phase,
    pub selected_image: Option<UploadedImage>,
    pub preview: Option<String>,
    pub analysis_text: Option<String>,
    pub error_message: Option<String>,
    pub is_loading: bool,
    pub elapsed_seconds: Option<f64>,
    started_at: Option<Instant>,
}

impl Default for UploadSessionState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            selected_image: None,
            preview: None,
            analysis_text: None,
            error_message: None,
            is_loading: false,
            elapsed_seconds: None,
            started_at: None,
        }
    }
}

impl UploadSessionState {
    /// Whether the submit control should be enabled.
    pub fn can_submit(&self) -> bool {
        self.selected_image.is_some() && !self.is_loading
    }

    fn clear_outcome(&mut self) {
        self.analysis_text = None;
        self.error_message = None;
        self.elapsed_seconds = None;
    }

    fn select(mut self, image: UploadedImage, preview: String) -> Self {
        self.clear_outcome();
        self.selected_image = Some(image);
        self.preview = Some(preview);
        // An in-flight request keeps the loading indicator up until it resolves.
        if !self.is_loading {
            self.phase = Phase::ImageSelected;
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    FileSelected { image: UploadedImage, preview: String },
    ExampleRequested { url: String },
    ExampleLoaded { image: UploadedImage, preview: String },
    ExampleFailed,
    SubmitRequested { at: Instant },
    Completed { outcome: Result<String, String>, at: Instant },
}

/// Work the session needs done outside the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchExample { url: String },
    Submit { image: UploadedImage },
}

pub fn transition(
    state: UploadSessionState,
    event: SessionEvent,
) -> (UploadSessionState, Option<Effect>) {
    let mut state = state;
    match event {
        SessionEvent::FileSelected { image, preview }
        | SessionEvent::ExampleLoaded { image, preview } => (state.select(image, preview), None),
        SessionEvent::ExampleRequested { url } => (state, Some(Effect::FetchExample { url })),
        SessionEvent::ExampleFailed => {
            if !state.is_loading {
                state.analysis_text = None;
                state.elapsed_seconds = None;
                state.phase = Phase::Error;
            }
            state.error_message = Some(EXAMPLE_LOAD_MESSAGE.to_string());
            (state, None)
        }
        SessionEvent::SubmitRequested { at } => {
            if state.is_loading {
                return (state, None);
            }
            let Some(image) = state.selected_image.clone() else {
                state.error_message = Some(NO_IMAGE_MESSAGE.to_string());
                return (state, None);
            };
            state.clear_outcome();
            state.is_loading = true;
            state.started_at = Some(at);
            state.phase = Phase::Submitting;
            (state, Some(Effect::Submit { image }))
        }
        SessionEvent::Completed { outcome, at } => {
            if !state.is_loading {
                return (state, None);
            }
            let started_at = state.started_at.take();
            state.is_loading = false;
            state.clear_outcome();
            match outcome {
                Ok(text) => {
                    state.elapsed_seconds = started_at.map(|start| {
                        round_to_hundredths(at.saturating_duration_since(start).as_secs_f64())
                    });
                    state.analysis_text = Some(text);
                    state.phase = Phase::Success;
                }
                Err(message) => {
                    state.error_message = Some(message);
                    state.phase = Phase::Error;
                }
            }
            (state, None)
        }
    }
}

fn round_to_hundredths(seconds: f64) -> f64 {
    (seconds * 100.0).round() / 100.0
}

/// Owns a state and applies events to it in place.
#[derive(Debug, Default)]
pub struct UploadSession {
    state: UploadSessionState,
}

impl UploadSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &UploadSessionState {
        &self.state
    }

    pub fn dispatch(&mut self, event: SessionEvent) -> Option<Effect> {
        let (next, effect) = transition(std::mem::take(&mut self.state), event);
        self.state = next;
        effect
    }
}
