// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scoped unlock of a plug.

use crate::error::Result;
use rigplug_scene::{Plug, SceneHost};
use std::ops::{Deref, DerefMut};

/// Holds a plug unlocked for as long as the guard lives.
///
/// The lock bit seen on acquisition is put back when the guard drops, on
/// normal return, early `?` exit and unwinding alike. The guard derefs to the
/// host so the guarded work goes through it.
pub struct LockGuard<'h, H: SceneHost + ?Sized> {
    host: &'h mut H,
    plug: Plug,
    was_locked: bool,
}

impl<'h, H: SceneHost + ?Sized> LockGuard<'h, H> {
    /// Record the lock bit of `plug` and unlock it
    pub fn acquire(host: &'h mut H, plug: &Plug) -> Result<Self> {
        let was_locked = host.is_locked(plug);
        if was_locked {
            host.set_locked(plug, false)?;
        }
        Ok(Self {
            host,
            plug: plug.clone(),
            was_locked,
        })
    }

    /// Lock state the plug will be returned to
    pub fn was_locked(&self) -> bool {
        self.was_locked
    }
}

impl<H: SceneHost + ?Sized> Deref for LockGuard<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        &*self.host
    }
}

impl<H: SceneHost + ?Sized> DerefMut for LockGuard<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        &mut *self.host
    }
}

impl<H: SceneHost + ?Sized> Drop for LockGuard<'_, H> {
    fn drop(&mut self) {
        if self.host.is_locked(&self.plug) == self.was_locked {
            return;
        }
        if let Err(e) = self.host.set_locked(&self.plug, self.was_locked) {
            tracing::warn!(plug = %self.plug, error = %e, "failed to restore lock state");
        }
    }
}

/// Run `body` with `plug` unlocked, restoring its lock bit afterwards
pub fn with_unlocked<H, T, F>(host: &mut H, plug: &Plug, body: F) -> Result<T>
where
    H: SceneHost + ?Sized,
    F: FnOnce(&mut H) -> Result<T>,
{
    let mut guard = LockGuard::acquire(host, plug)?;
    body(&mut *guard)
}
