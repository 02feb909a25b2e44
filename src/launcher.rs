use crate::dispatch::{BatchResult, Dispatcher, OpenMode};
use crate::error::PlatformError;
use crate::mode::LaunchMode;
use crate::platform::Platform;
use crate::resolver::TargetResolver;
use crate::server::{EventLoop, Registrar, ShellServer};
use crate::settings::Settings;
use crate::tokenizer::tokenize;
use std::rc::Rc;

/// Open every file named on the raw command line, waiting for each launch
/// to be dispatched.
pub fn run_one_shot(raw: &str, dispatcher: &Dispatcher) -> BatchResult {
    let paths = tokenize(raw);
    tracing::debug!(count = paths.len(), "opening files from command line");
    dispatcher.open_batch(&paths, OpenMode::Synchronous)
}

/// Register the drop target server and serve until the loop ends.
///
/// Registration failure is returned; otherwise the exit status is 0.
pub fn run_server(
    dispatcher: Rc<Dispatcher>,
    registrar: &mut dyn Registrar,
    event_loop: &mut dyn EventLoop,
) -> Result<i32, PlatformError> {
    let mut server = ShellServer::new(dispatcher);
    server.register(registrar)?;
    Ok(server.run(event_loop))
}

/// Detect the launch mode from `raw` and run it. Returns the process exit
/// status.
pub fn run(raw: &str, settings: &Settings, platform: Platform) -> i32 {
    let Platform {
        opener,
        probe,
        mut registrar,
        mut event_loop,
    } = platform;
    let dispatcher = Dispatcher::new(TargetResolver::new(settings, probe), opener);

    let mode = LaunchMode::detect(raw);
    tracing::debug!(?mode, raw, "launch mode detected");
    match mode {
        LaunchMode::OneShot => run_one_shot(raw, &dispatcher).exit_code(),
        LaunchMode::ResidentServer => {
            match run_server(Rc::new(dispatcher), registrar.as_mut(), event_loop.as_mut()) {
                Ok(code) => code,
                Err(e) => e.code,
            }
        }
    }
}
