//! [`Dispatch`] over a COM `IDispatch` pointer.
//!
//! Excel's COM API is accessed through IDispatch, the way VBScript late-binds:
//! names are resolved to DISPIDs with `GetIDsOfNames`, then `Invoke`d.

#![cfg(windows)]

use excel_ole::{Dispatch, Fault};
use excel_ole_core::TaggedValue;
use windows::{
    core::{GUID, HSTRING, PCWSTR},
    Win32::{
        Foundation::DISP_E_EXCEPTION,
        Globalization::GetSystemDefaultLCID,
        System::{
            Com::{
                CLSIDFromProgID, CoCreateInstance, IDispatch, CLSCTX_LOCAL_SERVER, DISPATCH_FLAGS,
                DISPATCH_METHOD, DISPATCH_PROPERTYGET, DISPATCH_PROPERTYPUT, DISPPARAMS, EXCEPINFO,
            },
            Ole::DISPID_PROPERTYPUT,
            Variant::VARIANT,
        },
    },
};

use crate::variant::{dispatch_of, from_variant, to_variant};

/// An owned reference to a COM automation object. Dropping it calls `Release`.
pub struct ComObject {
    inner: IDispatch,
}

impl ComObject {
    /// Instantiate a class by ProgID, e.g. `"Excel.Application"`, in a local server.
    pub fn create(prog_id: &str) -> Result<Self, Fault> {
        unsafe {
            let clsid = CLSIDFromProgID(&HSTRING::from(prog_id))
                .map_err(|e| Fault::with_code(e.code().0, format!("CLSIDFromProgID('{prog_id}') failed: {e}")))?;
            let inner: IDispatch = CoCreateInstance(&clsid, None, CLSCTX_LOCAL_SERVER).map_err(|e| {
                Fault::with_code(e.code().0, format!("CoCreateInstance failed for '{prog_id}': {e}"))
            })?;
            tracing::debug!(prog_id, "created COM object");
            Ok(Self { inner })
        }
    }

    pub fn from_idispatch(inner: IDispatch) -> Self {
        Self { inner }
    }

    fn dispid(&self, name: &str) -> Result<i32, Fault> {
        let wide: Vec<u16> = name.encode_utf16().chain(std::iter::once(0)).collect();
        let names = [PCWSTR(wide.as_ptr())];
        let mut dispid = 0i32;
        unsafe {
            self.inner
                .GetIDsOfNames(&GUID::zeroed(), names.as_ptr(), 1, GetSystemDefaultLCID(), &mut dispid)
                .map_err(|e| Fault::with_code(e.code().0, format!("unknown name '{name}': {e}")))?;
        }
        Ok(dispid)
    }

    /// `Invoke` with arguments in natural order; they are reversed into DISPPARAMS.
    fn invoke(
        &self,
        name: &str,
        flags: DISPATCH_FLAGS,
        args: &[TaggedValue],
    ) -> Result<VARIANT, Fault> {
        let dispid = self.dispid(name)?;
        let mut reversed = args
            .iter()
            .rev()
            .map(to_variant)
            .collect::<Result<Vec<VARIANT>, Fault>>()?;
        let mut named = [DISPID_PROPERTYPUT];
        let is_put = flags == DISPATCH_PROPERTYPUT;
        let params = DISPPARAMS {
            rgvarg: if reversed.is_empty() {
                std::ptr::null_mut()
            } else {
                reversed.as_mut_ptr()
            },
            rgdispidNamedArgs: if is_put {
                named.as_mut_ptr()
            } else {
                std::ptr::null_mut()
            },
            cArgs: reversed.len() as u32,
            cNamedArgs: u32::from(is_put),
        };

        let mut result = VARIANT::default();
        let mut except = EXCEPINFO::default();
        unsafe {
            self.inner
                .Invoke(
                    dispid,
                    &GUID::zeroed(),
                    GetSystemDefaultLCID(),
                    flags,
                    &params,
                    if is_put { None } else { Some(&mut result) },
                    Some(&mut except),
                    None,
                )
                .map_err(|e| invoke_fault(e, &except, name))?;
        }
        Ok(result)
    }

    fn object(result: VARIANT, name: &str) -> Result<Self, Fault> {
        match dispatch_of(&result) {
            Some(inner) => Ok(Self { inner }),
            None => {
                let tv = from_variant(&result)?;
                Err(Fault::new(format!(
                    "'{name}' returned {}, expected an object",
                    tv.kind
                )))
            }
        }
    }
}

impl Dispatch for ComObject {
    fn get_property(&self, name: &str, args: &[TaggedValue]) -> Result<TaggedValue, Fault> {
        let result = self.invoke(name, DISPATCH_PROPERTYGET, args)?;
        from_variant(&result)
    }

    fn get_object(&self, name: &str, args: &[TaggedValue]) -> Result<Self, Fault> {
        let result = self.invoke(name, DISPATCH_PROPERTYGET, args)?;
        Self::object(result, name)
    }

    fn put_property(&self, name: &str, value: TaggedValue) -> Result<(), Fault> {
        self.invoke(name, DISPATCH_PROPERTYPUT, &[value]).map(drop)
    }

    fn call_method(&self, name: &str, args: &[TaggedValue]) -> Result<TaggedValue, Fault> {
        let result = self.invoke(name, DISPATCH_METHOD, args)?;
        from_variant(&result)
    }

    fn call_object(&self, name: &str, args: &[TaggedValue]) -> Result<Self, Fault> {
        let result = self.invoke(name, DISPATCH_METHOD, args)?;
        Self::object(result, name)
    }
}

impl Drop for ComObject {
    fn drop(&mut self) {
        tracing::trace!("releasing IDispatch");
    }
}

/// Describe an Invoke failure, with the EXCEPINFO text for raised exceptions.
fn invoke_fault(err: windows::core::Error, except: &EXCEPINFO, member: &str) -> Fault {
    let code = err.code();
    if code == DISP_E_EXCEPTION {
        let description = if except.bstrDescription.is_empty() {
            String::from("(no description)")
        } else {
            except.bstrDescription.to_string()
        };
        let source = if except.bstrSource.is_empty() {
            String::from("(no source)")
        } else {
            except.bstrSource.to_string()
        };
        let scode = if except.scode != 0 { except.scode } else { code.0 };
        Fault::with_code(
            scode,
            format!("COM exception in '{member}': {description} (source: {source})"),
        )
    } else {
        Fault::with_code(code.0, format!("Invoke('{member}') failed: {err}"))
    }
}
