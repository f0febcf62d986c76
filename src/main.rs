//! minpair main entry point
//!
//! The main loop watches stdin for keystrokes and wakes up for the two
//! timer deadlines: voice discovery retries and the inter-word pause of a
//! playing pair. Everything runs on one thread; speech engine callbacks
//! are drained through the host once per iteration.

use log::{debug, error, info};
use minpair::input::{create_default_keymap, DefaultKeyHandler, HandlerAction};
use minpair::speech::backends::NativeHost;
use minpair::state::config::Config;
use minpair::state::App;
use minpair::terminal::{restore_termios, set_raw_mode};
use minpair::words::loader::CatalogSource;
use minpair::Result;
use mio::{Events, Interest, Poll, Token};
use nix::libc;
use std::io::{self, Read, Write};
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::PathBuf;
use std::process;
use std::time::{Duration, Instant};

/// Token for stdin in mio poll
const STDIN: Token = Token(0);

fn main() {
    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let debug_mode = args.iter().any(|arg| arg == "--debug" || arg == "-d");

    // Initialize logger
    if debug_mode {
        // Debug mode: write to minpair.log so the display stays clean
        use std::fs::OpenOptions;
        match OpenOptions::new()
            .create(true)
            .append(true)
            .open("minpair.log")
        {
            Ok(log_file) => {
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Debug)
                    .target(env_logger::Target::Pipe(Box::new(log_file)))
                    .init();
            }
            Err(e) => {
                eprintln!("Warning: failed to open minpair.log for debug logging: {}", e);
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Warn)
                    .init();
            }
        }

        info!(
            "minpair version {} starting (debug mode, logging to minpair.log)",
            minpair::VERSION
        );
    } else {
        // Normal mode: errors only to stderr
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Error)
            .init();
    }

    if let Err(e) = run() {
        error!("Fatal error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    debug!("initializing minpair");

    // The host speech capability is the one hard requirement; without it
    // there is nothing to drill, so report and stop before touching the
    // terminal
    let host = match NativeHost::new() {
        Ok(host) => host,
        Err(e) => {
            eprintln!("Error: no speech synthesis capability is available on this system.");
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    // Verify stdin is a TTY; raw-mode key handling needs one
    let stdin_fd = io::stdin().as_raw_fd();
    if unsafe { libc::isatty(stdin_fd) } == 0 {
        eprintln!("Error: minpair requires an interactive terminal (stdin is not a TTY)");
        process::exit(1);
    }

    let config = Config::load()?;
    info!("configuration loaded from {:?}", config.path());
    let source = resolve_source(&config);
    info!("word catalog source: {}", source.label());

    // Raw mode so single keypresses arrive immediately
    let original_termios = set_raw_mode(stdin_fd)?;
    let _guard = TermiosGuard {
        fd: stdin_fd,
        termios: original_termios,
    };

    let mut app = App::new(config, Box::new(host), source);

    let keymap = create_default_keymap();
    info!("key handler initialized with {} bindings", keymap.len());
    let mut default_handler = DefaultKeyHandler::new(keymap);

    // Set up the event loop
    let mut poll = Poll::new()?;
    let mut events = Events::with_capacity(16);
    let mut stdin_source = mio::unix::SourceFd(&stdin_fd);
    poll.registry()
        .register(&mut stdin_source, STDIN, Interest::READABLE)?;

    info!("minpair ready - entering event loop");
    print_frame(&mut app)?;

    loop {
        // Wake up for the nearest timer deadline, or every 100ms
        let now = Instant::now();
        let timeout = app
            .next_deadline(now)
            .map(|d| d.min(Duration::from_millis(100)))
            .or(Some(Duration::from_millis(100)));

        poll.poll(&mut events, timeout)?;

        for event in events.iter() {
            if event.token() == STDIN {
                handle_stdin(&mut app, &mut default_handler)?;
            }
        }

        // Drain host events and fire due timers
        app.tick(Instant::now());

        if app.quit {
            info!("quit requested");
            return Ok(());
        }
        if app.dirty {
            print_frame(&mut app)?;
        }
    }
}

/// Handle user input from stdin
fn handle_stdin(app: &mut App, default_handler: &mut DefaultKeyHandler) -> Result<()> {
    let mut buf = [0u8; 4096];

    let n = io::stdin().read(&mut buf)?;
    if n == 0 {
        return Ok(());
    }
    let input = &buf[..n];

    // Some hosts only report voices or unlock audio after a user gesture
    app.on_user_gesture(Instant::now());

    // Modal handlers first (word entry, voice pick)
    if !app.handlers.is_empty() {
        // Pop the handler while it runs so it can borrow the app freely
        if let Some(mut handler) = app.handlers.pop() {
            let action = handler.process_with_context(input, app)?;
            match action {
                HandlerAction::Remove => {}
                HandlerAction::Passthrough | HandlerAction::Handled => {
                    app.handlers.push(handler);
                }
            }
        }
        return Ok(());
    }

    // Default drill bindings; unbound keys are ignored
    let _ = default_handler.process_key(input, app)?;
    Ok(())
}

/// Paint the current frame
fn print_frame(app: &mut App) -> Result<()> {
    let frame = app.render();
    let mut stdout = io::stdout();
    stdout.write_all(frame.as_bytes())?;
    stdout.flush()?;
    app.dirty = false;
    Ok(())
}

/// Pick the word catalog source: command line first, then configuration,
/// then the built-in sample
fn resolve_source(config: &Config) -> CatalogSource {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut iter = args.iter();
    let mut path: Option<PathBuf> = None;
    let mut url: Option<String> = None;

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--debug" | "-d" => {}
            "--fetch" => url = iter.next().cloned(),
            other => path = Some(PathBuf::from(other)),
        }
    }

    if let Some(url) = url {
        return CatalogSource::Url(url);
    }
    if let Some(path) = path {
        return CatalogSource::File(path);
    }
    if let Some(url) = config.catalog_url() {
        return CatalogSource::Url(url);
    }
    if let Some(path) = config.catalog_path() {
        return CatalogSource::File(path);
    }
    CatalogSource::Builtin
}

/// RAII guard to restore terminal attributes on exit
struct TermiosGuard {
    fd: RawFd,
    termios: libc::termios,
}

impl Drop for TermiosGuard {
    fn drop(&mut self) {
        restore_termios(self.fd, &self.termios);
        debug!("terminal attributes restored");
    }
}
