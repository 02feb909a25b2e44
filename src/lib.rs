pub mod dispatch;
pub mod error;
pub mod launcher;
pub mod logging;
pub mod mode;
pub mod platform;
pub mod resolver;
pub mod server;
pub mod settings;
pub mod tokenizer;

pub use dispatch::{BatchResult, Dispatcher, OpenMode, Opener};
pub use error::PlatformError;
pub use mode::LaunchMode;
pub use resolver::{FileProbe, FileTarget, TargetResolver};
