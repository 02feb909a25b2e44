use thiserror::Error;

/// A failure reported by the host platform, carrying its numeric code
/// unchanged so it can become the process exit status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (0x{code:08X})")]
pub struct PlatformError {
    pub code: i32,
    pub message: String,
}

const FACILITY_WIN32: u32 = 7;
const ERROR_BUFFER_OVERFLOW: u32 = 111;

impl PlatformError {
    pub const E_FAIL: i32 = 0x8000_4005_u32 as i32;
    pub const E_NOINTERFACE: i32 = 0x8000_4002_u32 as i32;
    pub const CLASS_E_NOAGGREGATION: i32 = 0x8004_0110_u32 as i32;

    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Wrap a Win32 error number the way `HRESULT_FROM_WIN32` does.
    pub fn from_win32(error: u32, message: impl Into<String>) -> Self {
        Self::new(hresult_from_win32(error), message)
    }

    pub fn no_interface() -> Self {
        Self::new(Self::E_NOINTERFACE, "capability not supported")
    }

    pub fn no_aggregation() -> Self {
        Self::new(Self::CLASS_E_NOAGGREGATION, "aggregation is not supported")
    }

    pub fn buffer_overflow() -> Self {
        Self::from_win32(ERROR_BUFFER_OVERFLOW, "dropped path is too long")
    }
}

pub fn hresult_from_win32(error: u32) -> i32 {
    if error as i32 <= 0 {
        error as i32
    } else {
        ((error & 0x0000_FFFF) | (FACILITY_WIN32 << 16) | 0x8000_0000) as i32
    }
}

impl From<std::io::Error> for PlatformError {
    fn from(err: std::io::Error) -> Self {
        let code = match err.raw_os_error() {
            #[cfg(target_os = "windows")]
            Some(raw) => hresult_from_win32(raw as u32),
            #[cfg(not(target_os = "windows"))]
            Some(raw) => raw,
            None => Self::E_FAIL,
        };
        Self::new(code, err.to_string())
    }
}

#[cfg(target_os = "windows")]
impl From<windows::core::Error> for PlatformError {
    fn from(err: windows::core::Error) -> Self {
        Self::new(err.code().0, err.message())
    }
}

#[cfg(target_os = "windows")]
impl From<PlatformError> for windows::core::Error {
    fn from(err: PlatformError) -> Self {
        windows::core::Error::new(windows::core::HRESULT(err.code), err.message.as_str())
    }
}
