//! COM apartment lifetime.

#![cfg(windows)]

use std::marker::PhantomData;

use excel_ole::Fault;
use windows::Win32::System::Com::{CoInitializeEx, CoUninitialize, COINIT_APARTMENTTHREADED};

/// Keeps the calling thread in a single-threaded apartment until dropped.
///
/// Every COM object created on this thread must be released before the guard goes.
/// The guard is neither `Send` nor `Sync`: an STA is bound to the thread that
/// entered it.
pub struct ComApartment {
    _not_send: PhantomData<*const ()>,
}

impl ComApartment {
    pub fn enter() -> Result<Self, Fault> {
        unsafe {
            CoInitializeEx(None, COINIT_APARTMENTTHREADED)
                .ok()
                .map_err(|e| Fault::with_code(e.code().0, format!("CoInitializeEx failed: {e}")))?;
        }
        tracing::debug!("COM initialized (STA)");
        Ok(Self {
            _not_send: PhantomData,
        })
    }
}

impl Drop for ComApartment {
    fn drop(&mut self) {
        unsafe { CoUninitialize() };
        tracing::debug!("COM uninitialized");
    }
}
