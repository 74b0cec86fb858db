//! Cross-process mutual exclusion around the bus

use std::{
    ffi::CString,
    io,
    sync::{Mutex, MutexGuard, PoisonError, TryLockError},
};

use log::{debug, warn};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LockError {
    #[error("invalid lock name \"{0}\"")]
    InvalidName(String),
    #[error("unable to open bus lock {name}: {source}")]
    Open { name: String, source: io::Error },
    #[error("unable to acquire bus lock {name}: {source}")]
    Acquire { name: String, source: io::Error },
}

/// Exclusive access to the bus, held for as long as the guard lives.
pub trait BusLock {
    type Guard<'a>
    where
        Self: 'a;

    /// Block until the lock is held.
    fn acquire(&self) -> Result<Self::Guard<'_>, LockError>;
}

/// POSIX named semaphore shared by every process on the host.
///
/// The semaphore is created on first use with a count of one and is never
/// unlinked, so it outlives the process.
pub struct NamedSemaphore {
    name: String,
    sem: *mut libc::sem_t,
}

// The handle returned by sem_open may be used from any thread.
unsafe impl Send for NamedSemaphore {}
unsafe impl Sync for NamedSemaphore {}

impl NamedSemaphore {
    pub fn open(name: &str) -> Result<Self, LockError> {
        let c_name = CString::new(name).map_err(|_| LockError::InvalidName(name.to_owned()))?;

        let sem = unsafe {
            libc::sem_open(
                c_name.as_ptr(),
                libc::O_CREAT,
                0o666 as libc::mode_t,
                1 as libc::c_uint,
            )
        };

        if sem == libc::SEM_FAILED {
            return Err(LockError::Open {
                name: name.to_owned(),
                source: io::Error::last_os_error(),
            });
        }

        Ok(Self {
            name: name.to_owned(),
            sem,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> Option<i32> {
        let mut value: libc::c_int = 0;

        match unsafe { libc::sem_getvalue(self.sem, &mut value) } {
            0 => Some(value),
            _ => None,
        }
    }

    fn release(&self) {
        // Never raise the count above one, even if another holder
        // already posted on our behalf.
        if self.value().map_or(true, |value| value < 1) {
            if unsafe { libc::sem_post(self.sem) } != 0 {
                warn!(
                    "unable to release bus lock {}: {}",
                    self.name,
                    io::Error::last_os_error()
                );
                return;
            }
        }

        debug!("released bus lock {}", self.name);
    }
}

impl BusLock for NamedSemaphore {
    type Guard<'a> = SemaphoreGuard<'a>;

    fn acquire(&self) -> Result<SemaphoreGuard<'_>, LockError> {
        loop {
            if unsafe { libc::sem_wait(self.sem) } == 0 {
                break;
            }

            let error = io::Error::last_os_error();

            if error.kind() != io::ErrorKind::Interrupted {
                return Err(LockError::Acquire {
                    name: self.name.clone(),
                    source: error,
                });
            }
        }

        debug!("acquired bus lock {}", self.name);

        Ok(SemaphoreGuard { sem: self })
    }
}

impl Drop for NamedSemaphore {
    fn drop(&mut self) {
        unsafe {
            libc::sem_close(self.sem);
        }
    }
}

/// Posts the semaphore when dropped.
pub struct SemaphoreGuard<'a> {
    sem: &'a NamedSemaphore,
}

impl Drop for SemaphoreGuard<'_> {
    fn drop(&mut self) {
        self.sem.release();
    }
}

/// In-process lock for tests and for embedding the dispatcher in a
/// program that already owns the bus.
#[derive(Default)]
pub struct LocalLock {
    inner: Mutex<()>,
}

impl LocalLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a guard is alive right now.
    pub fn is_held(&self) -> bool {
        matches!(self.inner.try_lock(), Err(TryLockError::WouldBlock))
    }
}

impl BusLock for LocalLock {
    type Guard<'a> = LocalGuard<'a>;

    fn acquire(&self) -> Result<LocalGuard<'_>, LockError> {
        // A handler that panicked cannot leave the bus half-written in a way
        // the lock could fix, so a poisoned lock is still usable.
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        Ok(LocalGuard { _guard: guard })
    }
}

pub struct LocalGuard<'a> {
    _guard: MutexGuard<'a, ()>,
}
