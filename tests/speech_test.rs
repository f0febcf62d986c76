//! Speech host integration tests
//!
//! The native backend needs a real engine, so those checks tolerate
//! headless environments. The drill's behavior against a host is covered
//! deterministically through the scripted host.

use minpair::speech::backends::{FakeHost, NativeHost};
use minpair::speech::{SpeechHost, Utterance};

#[test]
fn test_create_native_host() {
    // May fail on systems without a speech engine (e.g. headless CI)
    match NativeHost::new() {
        Ok(host) => {
            println!("native TTS host initialized");
            drop(host);
        }
        Err(e) => {
            println!("TTS initialization failed (may be expected in CI): {}", e);
        }
    }
}

#[test]
fn test_native_host_configuration() {
    if let Ok(mut host) = NativeHost::new() {
        assert!(host.set_rate(50).is_ok(), "should set rate to 50");
        assert!(host.set_rate(0).is_ok(), "should set rate to 0");
        assert!(host.set_rate(100).is_ok(), "should set rate to 100");

        assert!(host.set_volume(50).is_ok(), "should set volume to 50");
        assert!(host.set_volume(0).is_ok(), "should set volume to 0");
        assert!(host.set_volume(100).is_ok(), "should set volume to 100");
    } else {
        println!("skipping configuration tests (TTS not available)");
    }
}

#[test]
fn test_native_host_operations() {
    if let Ok(mut host) = NativeHost::new() {
        // Enumeration may legitimately return an empty set here; the
        // voice manager's retry loop covers that case at runtime
        let voices = host.voices();
        assert!(voices.is_ok(), "voice enumeration should not error");

        let utterance = Utterance::new("integration test", None, "en-US");
        assert!(host.speak(&utterance).is_ok(), "should submit an utterance");
        assert!(host.cancel().is_ok(), "should cancel without error");
    } else {
        println!("skipping operation tests (TTS not available)");
    }
}

#[test]
fn test_fake_host_records_submissions() {
    let mut host = FakeHost::new();

    let utterance = Utterance::new("pat", None, "en-US");
    let first = host.speak(&utterance).unwrap();
    assert!(host.is_speaking());
    assert_eq!(host.spoken_texts(), vec!["pat"]);

    host.finish(first);
    assert!(!host.is_speaking());
    let events = host.drain_events();
    assert_eq!(events.len(), 1);
    assert!(host.drain_events().is_empty(), "events drain once");
}

#[test]
fn test_fake_host_scripted_voice_batches() {
    use minpair::speech::Voice;

    let mut host = FakeHost::with_voice_batches(vec![
        vec![],
        vec![Voice::new("A", "en-US")],
    ]);

    assert!(host.voices().unwrap().is_empty());
    assert_eq!(host.voices().unwrap().len(), 1);
    // The last batch repeats once the script runs out
    assert_eq!(host.voices().unwrap().len(), 1);
}
