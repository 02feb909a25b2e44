use super::Platform;
use crate::dispatch::{OpenMode, Opener};
use crate::error::PlatformError;
use crate::resolver::{FileTarget, StdFileProbe};
use crate::server::{ClassFactory, EventLoop, Registrar, Registration, ServerEvent};
use crate::settings::Settings;
use crate::tokenizer::join_args;
use std::collections::HashMap;
use std::rc::Rc;

pub struct PlatformGuard;

pub fn init() -> Result<PlatformGuard, PlatformError> {
    Ok(PlatformGuard)
}

/// The process receives pre-split arguments here, so rebuild the raw text
/// with the same quoting the tokenizer understands.
pub fn raw_command_line() -> String {
    let args: Vec<String> = std::env::args_os()
        .skip(1)
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    join_args(&args)
}

pub fn native(settings: &Settings) -> Platform {
    Platform {
        opener: Box::new(AppOpener {
            applications: settings.applications.clone(),
        }),
        probe: Box::new(StdFileProbe),
        registrar: Box::new(UnsupportedRegistrar),
        event_loop: Box::new(NoEvents),
    }
}

/// Opens files through the `open` crate, mapping handler identifiers to
/// applications from the settings.
pub struct AppOpener {
    applications: HashMap<String, String>,
}

impl Opener for AppOpener {
    fn open(&self, path: &str, target: &FileTarget, mode: OpenMode) -> Result<(), PlatformError> {
        let app = self.applications.get(&target.handler);
        let result = match (app, mode) {
            (Some(app), OpenMode::Synchronous) => open::with(path, app),
            (Some(app), OpenMode::Asynchronous) => open::with_detached(path, app),
            (None, OpenMode::Synchronous) => open::that(path),
            (None, OpenMode::Asynchronous) => open::that_detached(path),
        };
        result.map_err(PlatformError::from)
    }
}

pub struct UnsupportedRegistrar;

impl Registrar for UnsupportedRegistrar {
    fn register(&mut self, _factory: Rc<ClassFactory>) -> Result<Registration, PlatformError> {
        Err(PlatformError::new(
            PlatformError::E_FAIL,
            "drop target server mode requires Windows",
        ))
    }
}

pub struct NoEvents;

impl EventLoop for NoEvents {
    fn next_event(&mut self) -> Option<ServerEvent> {
        None
    }
}
