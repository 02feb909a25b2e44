use super::Platform;
use crate::dispatch::{OpenMode, Opener};
use crate::error::PlatformError;
use crate::resolver::{FileProbe, FileTarget};
use crate::server::{
    Capability, ClassFactory, DropEffect, DropPayload, DropTarget, EventLoop, Registrar,
    Registration, ServerEvent,
};
use crate::settings::Settings;
use crate::tokenizer::skip_program_name;
use std::ffi::{c_void, OsString};
use std::os::windows::ffi::OsStringExt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use windows::core::{implement, Interface, GUID, HSTRING, PCWSTR};
use windows::Win32::Foundation::{BOOL, E_INVALIDARG, POINTL};
use windows::Win32::Storage::FileSystem::GetLongPathNameW;
use windows::Win32::System::Com::{
    CoCreateInstance, CoInitializeEx, CoRegisterClassObject, CoUninitialize, IClassFactory,
    IClassFactory_Impl, IDataObject, IGlobalOptions, CLSCTX_INPROC_SERVER, CLSCTX_LOCAL_SERVER,
    CLSID_GlobalOptions, COINIT_APARTMENTTHREADED, COMGLB_EXCEPTION_DONOT_HANDLE_ANY,
    COMGLB_EXCEPTION_HANDLING, DVASPECT_CONTENT, FORMATETC, REGCLS_MULTIPLEUSE, STGMEDIUM,
    TYMED_HGLOBAL,
};
use windows::Win32::System::Environment::GetCommandLineW;
use windows::Win32::System::Ole::{
    IDropTarget, IDropTarget_Impl, ReleaseStgMedium, CF_HDROP, DROPEFFECT,
};
use windows::Win32::System::SystemServices::MODIFIERKEYS_FLAGS;
use windows::Win32::UI::Shell::{
    DragQueryFileW, PathFileExistsW, ShellExecuteExW, HDROP, SEE_MASK_ASYNCOK,
    SEE_MASK_CLASSNAME, SEE_MASK_NOASYNC, SEE_MASK_UNICODE, SHELLEXECUTEINFOW,
};
use windows::Win32::UI::WindowsAndMessaging::{
    DispatchMessageW, GetMessageW, TranslateMessage, MSG, SW_SHOWNORMAL,
};

/// Class id the drop target server registers under.
pub const CLSID_PDF_OPEN_TARGET: GUID = GUID::from_u128(0x82ede266_3bf0_435d_9f9a_21ae88aaef6c);

/// Longest dropped file name accepted, in UTF-16 units.
const MAX_DROPPED_PATH: usize = 290;
const LONG_PATH_BUFFER: usize = 300;

/// Keeps COM initialised for the lifetime of the process.
pub struct PlatformGuard;

impl Drop for PlatformGuard {
    fn drop(&mut self) {
        unsafe { CoUninitialize() };
    }
}

pub fn init() -> Result<PlatformGuard, PlatformError> {
    unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED) }.ok()?;
    let guard = PlatformGuard;
    disable_exception_swallowing()?;
    Ok(guard)
}

/// Let crashes inside COM callbacks surface instead of being swallowed by
/// the RPC layer.
fn disable_exception_swallowing() -> Result<(), PlatformError> {
    let options: IGlobalOptions =
        unsafe { CoCreateInstance(&CLSID_GlobalOptions, None, CLSCTX_INPROC_SERVER)? };
    unsafe {
        options.Set(
            COMGLB_EXCEPTION_HANDLING,
            COMGLB_EXCEPTION_DONOT_HANDLE_ANY.0 as usize,
        )?
    };
    Ok(())
}

pub fn raw_command_line() -> String {
    let full = unsafe { GetCommandLineW().to_string() }.unwrap_or_default();
    skip_program_name(&full).to_string()
}

pub fn native(_settings: &Settings) -> Platform {
    Platform {
        opener: Box::new(ShellOpener),
        probe: Box::new(ShellFileProbe),
        registrar: Box::new(ComRegistrar),
        event_loop: Box::new(MessageLoop),
    }
}

/// Opens files with `ShellExecuteExW` using the handler as the file class.
pub struct ShellOpener;

impl Opener for ShellOpener {
    fn open(&self, path: &str, target: &FileTarget, mode: OpenMode) -> Result<(), PlatformError> {
        let file = HSTRING::from(path);
        let verb = HSTRING::from(target.verb.as_str());
        let class = HSTRING::from(target.handler.as_str());
        let wait = match mode {
            OpenMode::Synchronous => SEE_MASK_NOASYNC,
            OpenMode::Asynchronous => SEE_MASK_ASYNCOK,
        };
        let mut info = SHELLEXECUTEINFOW {
            cbSize: std::mem::size_of::<SHELLEXECUTEINFOW>() as u32,
            fMask: SEE_MASK_CLASSNAME | SEE_MASK_UNICODE | wait,
            lpVerb: PCWSTR(verb.as_ptr()),
            lpFile: PCWSTR(file.as_ptr()),
            lpClass: PCWSTR(class.as_ptr()),
            nShow: SW_SHOWNORMAL.0,
            ..Default::default()
        };
        unsafe { ShellExecuteExW(&mut info)? };
        Ok(())
    }
}

pub struct ShellFileProbe;

impl FileProbe for ShellFileProbe {
    fn exists(&self, path: &Path) -> bool {
        let wide = HSTRING::from(path.as_os_str());
        unsafe { PathFileExistsW(&wide) }.as_bool()
    }

    fn canonicalize(&self, path: &Path) -> Option<PathBuf> {
        let wide = HSTRING::from(path.as_os_str());
        let mut buf = [0u16; LONG_PATH_BUFFER];
        let len = unsafe { GetLongPathNameW(&wide, Some(&mut buf)) } as usize;
        if len == 0 || len >= buf.len() {
            return None;
        }
        Some(PathBuf::from(OsString::from_wide(&buf[..len])))
    }
}

pub struct ComRegistrar;

impl Registrar for ComRegistrar {
    fn register(&mut self, factory: Rc<ClassFactory>) -> Result<Registration, PlatformError> {
        let object: IClassFactory = ComClassFactory { inner: factory }.into();
        let cookie = unsafe {
            CoRegisterClassObject(
                &CLSID_PDF_OPEN_TARGET,
                &object,
                CLSCTX_LOCAL_SERVER,
                REGCLS_MULTIPLEUSE,
            )?
        };
        Ok(Registration::new(cookie))
    }
}

/// Pumps thread messages. COM delivers drops from inside the pump, so the
/// only event this loop reports is the final `WM_QUIT`.
pub struct MessageLoop;

impl EventLoop for MessageLoop {
    fn next_event(&mut self) -> Option<ServerEvent> {
        let mut msg = MSG::default();
        loop {
            let r = unsafe { GetMessageW(&mut msg, None, 0, 0) };
            if r.0 <= 0 {
                return Some(ServerEvent::Shutdown);
            }
            unsafe {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
    }
}

fn capability_of(iid: &GUID) -> Option<Capability> {
    if *iid == IDropTarget::IID {
        Some(Capability::DropTarget)
    } else if *iid == IClassFactory::IID {
        Some(Capability::ClassFactory)
    } else if *iid == windows::core::IUnknown::IID {
        Some(Capability::Unknown)
    } else {
        None
    }
}

#[implement(IClassFactory)]
struct ComClassFactory {
    inner: Rc<ClassFactory>,
}

impl IClassFactory_Impl for ComClassFactory_Impl {
    fn CreateInstance(
        &self,
        punkouter: Option<&windows::core::IUnknown>,
        riid: *const GUID,
        ppvobject: *mut *mut c_void,
    ) -> windows::core::Result<()> {
        if ppvobject.is_null() || riid.is_null() {
            return Err(E_INVALIDARG.into());
        }
        unsafe { *ppvobject = std::ptr::null_mut() };
        let capability =
            capability_of(unsafe { &*riid }).ok_or_else(PlatformError::no_interface)?;
        let target = self.inner.create_instance(punkouter.is_some(), capability)?;
        let object: IDropTarget = ComDropTarget { inner: target }.into();
        unsafe { object.query(riid, ppvobject) }.ok()
    }

    fn LockServer(&self, flock: BOOL) -> windows::core::Result<()> {
        self.inner.lock_server(flock.as_bool());
        Ok(())
    }
}

#[implement(IDropTarget)]
struct ComDropTarget {
    inner: Rc<DropTarget>,
}

fn update_effect(effect: *mut DROPEFFECT, apply: impl FnOnce(DropEffect) -> DropEffect) {
    if effect.is_null() {
        return;
    }
    unsafe {
        let next = apply(DropEffect((*effect).0));
        *effect = DROPEFFECT(next.0);
    }
}

impl IDropTarget_Impl for ComDropTarget_Impl {
    fn DragEnter(
        &self,
        _pdataobj: Option<&IDataObject>,
        _grfkeystate: MODIFIERKEYS_FLAGS,
        _pt: &POINTL,
        pdweffect: *mut DROPEFFECT,
    ) -> windows::core::Result<()> {
        update_effect(pdweffect, |offered| self.inner.drag_enter(offered));
        Ok(())
    }

    fn DragOver(
        &self,
        _grfkeystate: MODIFIERKEYS_FLAGS,
        _pt: &POINTL,
        pdweffect: *mut DROPEFFECT,
    ) -> windows::core::Result<()> {
        update_effect(pdweffect, |offered| self.inner.drag_over(offered));
        Ok(())
    }

    fn DragLeave(&self) -> windows::core::Result<()> {
        self.inner.drag_leave();
        Ok(())
    }

    fn Drop(
        &self,
        pdataobj: Option<&IDataObject>,
        _grfkeystate: MODIFIERKEYS_FLAGS,
        _pt: &POINTL,
        pdweffect: *mut DROPEFFECT,
    ) -> windows::core::Result<()> {
        let Some(data) = pdataobj else {
            return Err(E_INVALIDARG.into());
        };
        let payload = HDropPayload { data: data.clone() };
        let offered = if pdweffect.is_null() {
            DropEffect::COPY
        } else {
            DropEffect(unsafe { (*pdweffect).0 })
        };
        let (effect, result) = self.inner.drop_files(&payload, offered);
        update_effect(pdweffect, |_| effect);
        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                tracing::warn!(error = %e, "could not read dropped files");
                Err(e.into())
            }
        }
    }
}

/// `CF_HDROP` file list carried by a shell data object.
struct HDropPayload {
    data: IDataObject,
}

struct ReleaseMedium(STGMEDIUM);

impl Drop for ReleaseMedium {
    fn drop(&mut self) {
        unsafe { ReleaseStgMedium(&mut self.0) };
    }
}

impl DropPayload for HDropPayload {
    fn extract_paths(&self) -> Result<Vec<String>, PlatformError> {
        let format = FORMATETC {
            cfFormat: CF_HDROP.0,
            ptd: std::ptr::null_mut(),
            dwAspect: DVASPECT_CONTENT.0 as u32,
            lindex: -1,
            tymed: TYMED_HGLOBAL.0 as u32,
        };
        let medium = ReleaseMedium(unsafe { self.data.GetData(&format)? });
        let files = HDROP(unsafe { medium.0.u.hGlobal.0 });

        let count = unsafe { DragQueryFileW(files, u32::MAX, None) };
        let mut paths = Vec::with_capacity(count as usize);
        for index in 0..count {
            let len = unsafe { DragQueryFileW(files, index, None) } as usize;
            if len == 0 {
                return Err(windows::core::Error::from_win32().into());
            }
            if len > MAX_DROPPED_PATH {
                return Err(PlatformError::buffer_overflow());
            }
            let mut buf = vec![0u16; len + 1];
            if unsafe { DragQueryFileW(files, index, Some(&mut buf)) } == 0 {
                return Err(windows::core::Error::from_win32().into());
            }
            paths.push(String::from_utf16_lossy(&buf[..len]));
        }
        Ok(paths)
    }
}
