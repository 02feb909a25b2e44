#![cfg_attr(target_os = "windows", windows_subsystem = "windows")]

use pdf_launcher::settings::Settings;
use pdf_launcher::{launcher, logging, platform};
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    let settings_path = Settings::default_path();
    let settings = Settings::load(&settings_path.to_string_lossy())?;
    logging::init(settings.debug_logging, settings.log_file.as_ref().map(PathBuf::from));

    let guard = platform::init()?;
    let raw = platform::raw_command_line();
    let code = launcher::run(&raw, &settings, platform::native(&settings));
    drop(guard);

    std::process::exit(code);
}
