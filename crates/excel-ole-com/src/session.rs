//! Starting an application session over COM.

#![cfg(windows)]

use std::ops::{Deref, DerefMut};

use excel_ole::{Error, Result, Session, SessionConfig};

use crate::apartment::ComApartment;
use crate::object::ComObject;

/// A [`Session`] over COM, together with the apartment it lives in.
///
/// Dereferences to the session. Dropping it releases every handle before leaving
/// the apartment; use [`ComSession::quit`] to also close the application.
pub struct ComSession {
    // Field order is drop order: handles go before the apartment.
    session: Session<ComObject>,
    _apartment: ComApartment,
}

/// Enter an STA on this thread, create the application and attach to it.
pub fn start(config: SessionConfig) -> Result<ComSession> {
    let init = |source| Error::Initialize {
        operation: "start",
        source,
    };
    let apartment = ComApartment::enter().map_err(init)?;
    let app = ComObject::create(&config.prog_id).map_err(init)?;
    tracing::info!(prog_id = %config.prog_id, "started automation server");
    let session = Session::attach(app, config.options)?;
    Ok(ComSession {
        session,
        _apartment: apartment,
    })
}

impl ComSession {
    /// Close every workbook, quit the application and leave the apartment.
    pub fn quit(self) {
        let ComSession {
            session,
            _apartment,
        } = self;
        session.quit();
    }
}

impl Deref for ComSession {
    type Target = Session<ComObject>;

    fn deref(&self) -> &Self::Target {
        &self.session
    }
}

impl DerefMut for ComSession {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.session
    }
}
