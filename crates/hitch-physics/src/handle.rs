//! Single-owner handles to engine objects.
//!
//! [`Owned`] binds the lifetime of one engine object (world, body or shape)
//! to whoever holds the handle, usually a component slot. It cannot be
//! cloned, moving it transfers ownership, and dropping it releases the
//! object exactly once through [`Release::release`].
//!
//! A handle may be null (`Owned::default()`), which is the state a moved-out
//! slot is left in. Reaching through a null handle with [`Owned::raw`] is a
//! programmer error and panics.

use std::fmt;

use bevy_log::debug;

// ---------------------------------------------------------------------------
// Release
// ---------------------------------------------------------------------------

/// An engine object that knows how to free itself.
///
/// Implementations check their own release preconditions (for example that
/// a body is no longer a world member) and panic when they are violated.
pub trait Release: fmt::Debug + Send + Sync + 'static {
    /// Short name used in log lines and panic messages.
    const KIND: &'static str;

    /// Free the underlying engine object.
    fn release(self);
}

// ---------------------------------------------------------------------------
// Owned
// ---------------------------------------------------------------------------

/// Move-only owner of one engine object.
pub struct Owned<R: Release> {
    raw: Option<R>,
}

impl<R: Release> Owned<R> {
    /// Take ownership of `raw`.
    pub fn new(raw: R) -> Self {
        debug!("wrap {} {raw:?}", R::KIND);
        Self { raw: Some(raw) }
    }

    /// A handle that owns nothing.
    #[must_use]
    pub const fn null() -> Self {
        Self { raw: None }
    }

    pub const fn is_null(&self) -> bool {
        self.raw.is_none()
    }

    /// Borrow the raw engine handle.
    ///
    /// # Panics
    ///
    /// Panics if the handle is null.
    #[track_caller]
    pub fn raw(&self) -> &R {
        match &self.raw {
            Some(raw) => raw,
            None => panic!("{} handle is null", R::KIND),
        }
    }

    /// Borrow the raw engine handle if there is one.
    pub const fn get(&self) -> Option<&R> {
        self.raw.as_ref()
    }

    /// Move ownership out, leaving this handle null.
    #[must_use]
    pub fn take(&mut self) -> Self {
        Self { raw: self.raw.take() }
    }
}

impl<R: Release> Default for Owned<R> {
    fn default() -> Self {
        Self::null()
    }
}

impl<R: Release> Drop for Owned<R> {
    fn drop(&mut self) {
        if let Some(raw) = self.raw.take() {
            debug!("free {} {raw:?}", R::KIND);
            raw.release();
        }
    }
}

impl<R: Release> fmt::Debug for Owned<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.raw {
            Some(raw) => f.debug_tuple("Owned").field(raw).finish(),
            None => write!(f, "Owned(null {})", R::KIND),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
