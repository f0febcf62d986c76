//! Default key bindings

use std::collections::HashMap;

/// Key sequence type
pub type KeySequence = Vec<u8>;

/// Action identifier for key bindings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    // Pair list navigation
    PrevPair,
    NextPair,

    // Playback of the selected pair
    SpeakLeft,
    SpeakRight,
    SpeakPairRow,

    // Free-text word slots
    EditFirst,
    EditSecond,
    SpeakCustomFirst,
    SpeakCustomSecond,
    SpeakCustomPair,

    // Pause control
    PauseShorter,
    PauseLonger,

    // Voice control
    VoiceList,
    VoicePick,
    RescanVoices,

    // Misc
    Silence,
    ReloadCatalog,
    Quit,
}

/// Create the default keymap
pub fn create_default_keymap() -> HashMap<KeySequence, KeyAction> {
    let mut map = HashMap::new();

    // Pair navigation: arrows plus vi-style k/j
    map.insert(b"\x1b[A".to_vec(), KeyAction::PrevPair);
    map.insert(b"\x1b[B".to_vec(), KeyAction::NextPair);
    map.insert(b"\x1bOA".to_vec(), KeyAction::PrevPair);
    map.insert(b"\x1bOB".to_vec(), KeyAction::NextPair);
    map.insert(b"k".to_vec(), KeyAction::PrevPair);
    map.insert(b"j".to_vec(), KeyAction::NextPair);

    // Selected pair playback
    map.insert(b",".to_vec(), KeyAction::SpeakLeft);
    map.insert(b".".to_vec(), KeyAction::SpeakRight);
    map.insert(b"\r".to_vec(), KeyAction::SpeakPairRow);
    map.insert(b"\n".to_vec(), KeyAction::SpeakPairRow);
    map.insert(b" ".to_vec(), KeyAction::SpeakPairRow);

    // Free-text word slots
    map.insert(b"e".to_vec(), KeyAction::EditFirst);
    map.insert(b"E".to_vec(), KeyAction::EditSecond);
    map.insert(b"1".to_vec(), KeyAction::SpeakCustomFirst);
    map.insert(b"2".to_vec(), KeyAction::SpeakCustomSecond);
    map.insert(b"3".to_vec(), KeyAction::SpeakCustomPair);

    // Pause control
    map.insert(b"[".to_vec(), KeyAction::PauseShorter);
    map.insert(b"]".to_vec(), KeyAction::PauseLonger);

    // Voice control
    map.insert(b"V".to_vec(), KeyAction::VoiceList);
    map.insert(b"v".to_vec(), KeyAction::VoicePick);
    map.insert(b"g".to_vec(), KeyAction::RescanVoices);

    // Misc
    map.insert(b"x".to_vec(), KeyAction::Silence);
    map.insert(b"r".to_vec(), KeyAction::ReloadCatalog);
    map.insert(b"q".to_vec(), KeyAction::Quit);
    map.insert(b"\x03".to_vec(), KeyAction::Quit); // ctrl+c

    map
}
