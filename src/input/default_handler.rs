//! Default key handler
//!
//! Processes the drill's key bindings against the application state.
//! Unrecognized keys are reported as passthrough and ignored by the main
//! loop.

use super::{BufferHandler, HandlerAction, KeyAction, KeyHandler};
use crate::state::App;
use crate::Result;
use log::{debug, trace};
use std::collections::HashMap;

/// Default key handler for drill commands
pub struct DefaultKeyHandler {
    keymap: HashMap<Vec<u8>, KeyAction>,
}

impl DefaultKeyHandler {
    pub fn new(keymap: HashMap<Vec<u8>, KeyAction>) -> Self {
        debug!("creating default key handler with {} bindings", keymap.len());
        Self { keymap }
    }

    /// Process a key against the drill's bindings
    pub fn process_key(&mut self, key: &[u8], app: &mut App) -> Result<HandlerAction> {
        if let Some(action) = self.keymap.get(key).cloned() {
            trace!("key action: {:?}", action);
            return self.execute_action(&action, app);
        }
        Ok(HandlerAction::Passthrough)
    }

    fn execute_action(&mut self, action: &KeyAction, app: &mut App) -> Result<HandlerAction> {
        use KeyAction::*;

        match action {
            PrevPair => {
                app.drill.prev();
                app.dirty = true;
            }
            NextPair => {
                app.drill.next();
                app.dirty = true;
            }

            SpeakLeft => {
                let word = app.drill.selected_pair().map(|(w, _)| w.to_string());
                if let Some(word) = word {
                    app.speak_word(&word);
                }
            }
            SpeakRight => {
                let word = app.drill.selected_pair().map(|(_, w)| w.to_string());
                if let Some(word) = word {
                    app.speak_word(&word);
                }
            }
            SpeakPairRow => {
                let pair = app
                    .drill
                    .selected_pair()
                    .map(|(a, b)| (a.to_string(), b.to_string()));
                if let Some((word1, word2)) = pair {
                    app.speak_pair(&word1, &word2);
                }
            }

            EditFirst => {
                app.handlers.push(Box::new(BufferHandler::new(
                    "first word:",
                    Box::new(|input: String, app: &mut App| {
                        app.custom_first = input;
                        app.dirty = true;
                        Ok(())
                    }),
                )));
                app.input_line = Some(("first word:".to_string(), String::new()));
                app.dirty = true;
            }
            EditSecond => {
                app.handlers.push(Box::new(BufferHandler::new(
                    "second word:",
                    Box::new(|input: String, app: &mut App| {
                        app.custom_second = input;
                        app.dirty = true;
                        Ok(())
                    }),
                )));
                app.input_line = Some(("second word:".to_string(), String::new()));
                app.dirty = true;
            }
            SpeakCustomFirst => {
                let word = app.custom_first.clone();
                app.speak_word(&word);
            }
            SpeakCustomSecond => {
                let word = app.custom_second.clone();
                app.speak_word(&word);
            }
            SpeakCustomPair => {
                let (word1, word2) = (app.custom_first.clone(), app.custom_second.clone());
                app.speak_pair(&word1, &word2);
            }

            PauseShorter => {
                app.pause.decrease();
                app.dirty = true;
            }
            PauseLonger => {
                app.pause.increase();
                app.dirty = true;
            }

            VoiceList => {
                app.show_voices = !app.show_voices;
                app.dirty = true;
            }
            VoicePick => {
                app.handlers.push(Box::new(BufferHandler::new(
                    "voice number:",
                    Box::new(|input: String, app: &mut App| {
                        match input.trim().parse::<usize>() {
                            Ok(index) => app.select_voice_index(index),
                            Err(_) => {
                                app.status = format!("Not a voice number: {:?}", input);
                                app.dirty = true;
                            }
                        }
                        Ok(())
                    }),
                )));
                app.input_line = Some(("voice number:".to_string(), String::new()));
                app.dirty = true;
            }
            RescanVoices => {
                app.rescan_voices();
            }

            Silence => {
                debug!("silence requested");
                app.silence();
            }
            ReloadCatalog => {
                app.reload_catalog();
            }
            Quit => {
                app.quit = true;
            }
        }

        Ok(HandlerAction::Handled)
    }
}

impl KeyHandler for DefaultKeyHandler {
    fn process(&mut self, _key: &[u8]) -> Result<HandlerAction> {
        // Needs application state; the main loop calls process_key
        trace!("DefaultKeyHandler::process called (passthrough)");
        Ok(HandlerAction::Passthrough)
    }
}
