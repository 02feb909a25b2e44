//! Shared mocks for the open primitive, filesystem probe and server host.

#![allow(dead_code)]

use pdf_launcher::dispatch::{OpenMode, Opener};
use pdf_launcher::error::PlatformError;
use pdf_launcher::resolver::{FileProbe, FileTarget, StdFileProbe, TargetResolver};
use pdf_launcher::server::{ClassFactory, EventLoop, Registrar, Registration, ServerEvent};
use pdf_launcher::settings::Settings;
use pdf_launcher::Dispatcher;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenCall {
    pub path: String,
    pub target: FileTarget,
    pub mode: OpenMode,
}

pub type CallLog = Rc<RefCell<Vec<OpenCall>>>;

/// Records every open call and fails the paths it was told to fail.
#[derive(Default)]
pub struct RecordingOpener {
    pub calls: CallLog,
    failures: HashMap<String, i32>,
}

impl RecordingOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, path: &str, code: i32) -> Self {
        self.failures.insert(path.to_string(), code);
        self
    }

    pub fn log(&self) -> CallLog {
        Rc::clone(&self.calls)
    }
}

impl Opener for RecordingOpener {
    fn open(&self, path: &str, target: &FileTarget, mode: OpenMode) -> Result<(), PlatformError> {
        self.calls.borrow_mut().push(OpenCall {
            path: path.to_string(),
            target: target.clone(),
            mode,
        });
        match self.failures.get(path) {
            Some(&code) => Err(PlatformError::new(code, format!("cannot open {path}"))),
            None => Ok(()),
        }
    }
}

/// In-memory filesystem: canonical form is the path itself.
#[derive(Default)]
pub struct FakeProbe {
    pub files: HashSet<PathBuf>,
}

impl FakeProbe {
    pub fn with_files(files: &[&str]) -> Self {
        Self {
            files: files.iter().map(PathBuf::from).collect(),
        }
    }
}

impl FileProbe for FakeProbe {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    fn canonicalize(&self, path: &Path) -> Option<PathBuf> {
        Some(path.to_path_buf())
    }
}

pub fn dispatcher(opener: RecordingOpener) -> Dispatcher {
    let settings = Settings::default();
    Dispatcher::new(
        TargetResolver::new(&settings, Box::new(StdFileProbe)),
        Box::new(opener),
    )
}

pub fn paths(calls: &CallLog) -> Vec<String> {
    calls.borrow().iter().map(|c| c.path.clone()).collect()
}

/// Registrar that hands out a fixed cookie, or fails with a code.
pub struct FakeRegistrar {
    pub result: Result<u32, i32>,
    pub registered: Rc<RefCell<Vec<Rc<ClassFactory>>>>,
}

impl FakeRegistrar {
    pub fn ok(cookie: u32) -> Self {
        Self {
            result: Ok(cookie),
            registered: Rc::default(),
        }
    }

    pub fn failing(code: i32) -> Self {
        Self {
            result: Err(code),
            registered: Rc::default(),
        }
    }
}

impl Registrar for FakeRegistrar {
    fn register(&mut self, factory: Rc<ClassFactory>) -> Result<Registration, PlatformError> {
        match self.result {
            Ok(cookie) => {
                self.registered.borrow_mut().push(factory);
                Ok(Registration::new(cookie))
            }
            Err(code) => Err(PlatformError::new(code, "registration refused")),
        }
    }
}

/// Event loop replaying a scripted list of events.
pub struct ScriptedLoop {
    pub events: VecDeque<ServerEvent>,
}

impl ScriptedLoop {
    pub fn new(events: Vec<ServerEvent>) -> Self {
        Self {
            events: events.into(),
        }
    }
}

impl EventLoop for ScriptedLoop {
    fn next_event(&mut self) -> Option<ServerEvent> {
        self.events.pop_front()
    }
}

pub fn dropped(paths: &[&str]) -> Box<Vec<String>> {
    Box::new(paths.iter().map(|p| p.to_string()).collect())
}
