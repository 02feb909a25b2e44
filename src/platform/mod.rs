//! Host collaborators: the open primitive, the filesystem probe, server
//! registration and the event loop.

use crate::dispatch::Opener;
use crate::resolver::FileProbe;
use crate::server::{EventLoop, Registrar};
use crate::settings::Settings;

#[cfg(target_os = "windows")]
mod windows;
#[cfg(target_os = "windows")]
use self::windows as imp;

#[cfg(not(target_os = "windows"))]
mod portable;
#[cfg(not(target_os = "windows"))]
use self::portable as imp;

pub use imp::PlatformGuard;

/// Everything the launcher needs from the host.
pub struct Platform {
    pub opener: Box<dyn Opener>,
    pub probe: Box<dyn FileProbe>,
    pub registrar: Box<dyn Registrar>,
    pub event_loop: Box<dyn EventLoop>,
}

/// Prepare process-wide platform state. Keep the guard alive until exit.
pub fn init() -> anyhow::Result<PlatformGuard> {
    Ok(imp::init()?)
}

/// Argument text of this process, without the program name.
pub fn raw_command_line() -> String {
    imp::raw_command_line()
}

pub fn native(settings: &Settings) -> Platform {
    imp::native(settings)
}
