//! Resident drop-target server.
//!
//! The server registers a class factory with the platform and then feeds
//! events from an [`EventLoop`] through [`ShellServer::handle`]. Every drop
//! is forwarded to the [`Dispatcher`] with asynchronous opens. Handler objects
//! are shared through `Rc`: cloning a handle acquires a reference and dropping
//! it releases one.

use crate::dispatch::{BatchResult, Dispatcher, OpenMode};
use crate::error::PlatformError;
use std::ops::BitAnd;
use std::rc::Rc;

/// Drop effect flags, using the shell's bit values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DropEffect(pub u32);

impl DropEffect {
    pub const NONE: DropEffect = DropEffect(0);
    pub const COPY: DropEffect = DropEffect(1);
    pub const MOVE: DropEffect = DropEffect(2);
    pub const LINK: DropEffect = DropEffect(4);

    pub fn contains(self, other: DropEffect) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitAnd for DropEffect {
    type Output = DropEffect;

    fn bitand(self, rhs: DropEffect) -> DropEffect {
        DropEffect(self.0 & rhs.0)
    }
}

/// Closed set of interfaces a handler object can be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Unknown,
    DropTarget,
    ClassFactory,
}

/// Shell transfer payload carrying dropped file names.
pub trait DropPayload {
    fn extract_paths(&self) -> Result<Vec<String>, PlatformError>;
}

impl DropPayload for Vec<String> {
    fn extract_paths(&self) -> Result<Vec<String>, PlatformError> {
        Ok(self.clone())
    }
}

/// Accepts dropped files and opens them.
pub struct DropTarget {
    dispatcher: Rc<Dispatcher>,
}

impl DropTarget {
    pub fn new(dispatcher: Rc<Dispatcher>) -> Rc<Self> {
        Rc::new(Self { dispatcher })
    }

    /// Ask for another capability of this object. Succeeds with a new handle
    /// to the same object.
    pub fn query(self: &Rc<Self>, capability: Capability) -> Result<Rc<Self>, PlatformError> {
        match capability {
            Capability::DropTarget | Capability::Unknown => Ok(Rc::clone(self)),
            Capability::ClassFactory => Err(PlatformError::no_interface()),
        }
    }

    pub fn drag_enter(&self, offered: DropEffect) -> DropEffect {
        offered & DropEffect::COPY
    }

    pub fn drag_over(&self, offered: DropEffect) -> DropEffect {
        offered & DropEffect::COPY
    }

    pub fn drag_leave(&self) {}

    /// Extract the dropped paths and open them without waiting on the shell.
    ///
    /// The returned effect is always reduced to copy, even when extraction
    /// fails.
    pub fn drop_files(
        &self,
        payload: &dyn DropPayload,
        offered: DropEffect,
    ) -> (DropEffect, Result<BatchResult, PlatformError>) {
        let effect = offered & DropEffect::COPY;
        let outcome = payload.extract_paths().map(|paths| {
            tracing::debug!(count = paths.len(), "files dropped");
            self.dispatcher.open_batch(&paths, OpenMode::Asynchronous)
        });
        (effect, outcome)
    }
}

/// Creates [`DropTarget`] instances on behalf of the platform.
pub struct ClassFactory {
    dispatcher: Rc<Dispatcher>,
}

impl ClassFactory {
    pub fn new(dispatcher: Rc<Dispatcher>) -> Rc<Self> {
        Rc::new(Self { dispatcher })
    }

    pub fn create_instance(
        &self,
        aggregate: bool,
        capability: Capability,
    ) -> Result<Rc<DropTarget>, PlatformError> {
        if aggregate {
            return Err(PlatformError::no_aggregation());
        }
        DropTarget::new(Rc::clone(&self.dispatcher)).query(capability)
    }

    /// The process lifetime is owned by the event loop, so lock requests have
    /// nothing to pin.
    pub fn lock_server(&self, _lock: bool) {}
}

/// Opaque token for a standing registration with the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration(u32);

impl Registration {
    pub fn new(cookie: u32) -> Self {
        Self(cookie)
    }

    pub fn cookie(&self) -> u32 {
        self.0
    }
}

/// Publishes the class factory so the shell can find it.
pub trait Registrar {
    fn register(&mut self, factory: Rc<ClassFactory>) -> Result<Registration, PlatformError>;
}

pub enum ServerEvent {
    DragEnter { offered: DropEffect },
    DragOver { offered: DropEffect },
    DragLeave,
    Drop {
        payload: Box<dyn DropPayload>,
        offered: DropEffect,
    },
    Shutdown,
}

/// Source of server events. `None` means the loop has ended.
pub trait EventLoop {
    fn next_event(&mut self) -> Option<ServerEvent>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerState {
    Unregistered,
    Registered(Registration),
    ShuttingDown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Effect(DropEffect),
    Left,
    Delivered { effect: DropEffect, batch: BatchResult },
    ExtractionFailed { effect: DropEffect, error: PlatformError },
    /// Event arrived while not registered.
    Ignored,
    Stopped,
}

pub struct ShellServer {
    state: ServerState,
    factory: Rc<ClassFactory>,
    target: Rc<DropTarget>,
}

impl ShellServer {
    pub fn new(dispatcher: Rc<Dispatcher>) -> Self {
        Self {
            state: ServerState::Unregistered,
            factory: ClassFactory::new(Rc::clone(&dispatcher)),
            target: DropTarget::new(dispatcher),
        }
    }

    pub fn state(&self) -> &ServerState {
        &self.state
    }

    pub fn factory(&self) -> Rc<ClassFactory> {
        Rc::clone(&self.factory)
    }

    /// Register the class factory. Only valid from the unregistered state.
    pub fn register(&mut self, registrar: &mut dyn Registrar) -> Result<Registration, PlatformError> {
        if let ServerState::Registered(registration) = &self.state {
            return Ok(*registration);
        }
        if self.state == ServerState::ShuttingDown {
            return Err(PlatformError::new(PlatformError::E_FAIL, "server is shutting down"));
        }
        match registrar.register(self.factory()) {
            Ok(registration) => {
                tracing::info!(cookie = registration.cookie(), "registered drop target server");
                self.state = ServerState::Registered(registration);
                Ok(registration)
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to register drop target server");
                Err(e)
            }
        }
    }

    pub fn handle(&mut self, event: ServerEvent) -> EventOutcome {
        if let ServerEvent::Shutdown = event {
            if self.state != ServerState::ShuttingDown {
                tracing::info!("server shutting down");
            }
            self.state = ServerState::ShuttingDown;
            return EventOutcome::Stopped;
        }
        if !matches!(self.state, ServerState::Registered(_)) {
            return EventOutcome::Ignored;
        }
        match event {
            ServerEvent::DragEnter { offered } => EventOutcome::Effect(self.target.drag_enter(offered)),
            ServerEvent::DragOver { offered } => EventOutcome::Effect(self.target.drag_over(offered)),
            ServerEvent::DragLeave => {
                self.target.drag_leave();
                EventOutcome::Left
            }
            ServerEvent::Drop { payload, offered } => {
                match self.target.drop_files(payload.as_ref(), offered) {
                    (effect, Ok(batch)) => EventOutcome::Delivered { effect, batch },
                    (effect, Err(error)) => {
                        tracing::warn!(error = %error, "could not read dropped files");
                        EventOutcome::ExtractionFailed { effect, error }
                    }
                }
            }
            ServerEvent::Shutdown => EventOutcome::Stopped,
        }
    }

    /// Drive events until shutdown or until the loop runs dry. Returns the
    /// process exit status.
    pub fn run(&mut self, event_loop: &mut dyn EventLoop) -> i32 {
        while let Some(event) = event_loop.next_event() {
            if let EventOutcome::Stopped = self.handle(event) {
                break;
            }
        }
        self.state = ServerState::ShuttingDown;
        0
    }
}
