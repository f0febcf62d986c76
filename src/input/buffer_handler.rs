//! Buffer handler for collecting text input
//!
//! Used when a control needs a typed value: a custom drill word or a voice
//! number. Collects characters until Enter, then hands the text to the
//! provided callback. Escape abandons the input.

use super::{HandlerAction, KeyHandler};
use crate::state::App;
use crate::Result;
use log::debug;

/// Callback function type for when input is complete
type OnAcceptFn = Box<dyn FnOnce(String, &mut App) -> Result<()> + Send>;

/// Handler that collects a line of text
pub struct BufferHandler {
    prompt: String,
    buffer: String,
    on_accept: Option<OnAcceptFn>,
}

impl BufferHandler {
    /// The callback is invoked with the collected text on Enter
    pub fn new(prompt: &str, on_accept: OnAcceptFn) -> Self {
        Self {
            prompt: prompt.to_string(),
            buffer: String::new(),
            on_accept: Some(on_accept),
        }
    }

    fn sync_display(&self, app: &mut App) {
        app.input_line = Some((self.prompt.clone(), self.buffer.clone()));
        app.dirty = true;
    }
}

impl KeyHandler for BufferHandler {
    fn process(&mut self, _key: &[u8]) -> Result<HandlerAction> {
        // Needs application state; use process_with_context
        Ok(HandlerAction::Handled)
    }

    fn process_with_context(&mut self, key: &[u8], app: &mut App) -> Result<HandlerAction> {
        match key {
            // Enter - accept input and invoke the callback
            b"\r" | b"\n" => {
                debug!("buffer handler accepting input {:?}", self.buffer);
                app.input_line = None;
                app.dirty = true;
                if let Some(callback) = self.on_accept.take() {
                    callback(std::mem::take(&mut self.buffer), app)?;
                }
                Ok(HandlerAction::Remove)
            }

            // Escape - abandon the input
            b"\x1b" => {
                debug!("buffer handler cancelled");
                app.input_line = None;
                app.dirty = true;
                Ok(HandlerAction::Remove)
            }

            // Backspace - remove last character
            b"\x08" | b"\x7f" => {
                self.buffer.pop();
                self.sync_display(app);
                Ok(HandlerAction::Handled)
            }

            // Regular text - add to buffer
            _ => {
                if let Ok(s) = std::str::from_utf8(key) {
                    // Keep control bytes (arrow key sequences etc.) out
                    if s.chars().all(|c| !c.is_control()) {
                        self.buffer.push_str(s);
                    }
                }
                self.sync_display(app);
                Ok(HandlerAction::Handled)
            }
        }
    }
}
