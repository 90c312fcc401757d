//! Executable memory management.
//!
//! Generated code is copied into a fresh process-private anonymous mapping
//! with read, write, and execute permissions and invoked through a typed
//! function pointer. The write permission exists only for the initial copy;
//! nothing writes to the region after [`CompiledFunction::load`] returns.

use std::{io, mem, ptr};

use log::debug;

use crate::error::AllocationError;

/// ABI of the generated entry point: one pointer-sized argument (the tape
/// base) and a 64-bit integer result.
type EntryFn = unsafe extern "sysv64" fn(*mut u8) -> u64;

/// A finished function body living in a private executable mapping.
///
/// Owns the mapping for its whole lifetime; dropping the handle unmaps the
/// region.
#[derive(Debug)]
pub struct CompiledFunction {
    base: *mut libc::c_void,
    len: usize,
}

impl CompiledFunction {
    /// Map a fresh executable region sized to `code` and copy `code` into
    /// it.
    ///
    /// Fails with [`AllocationError`] when the kernel denies the mapping
    /// request (which includes the degenerate empty-`code` case, since a
    /// zero-length mapping is itself invalid).
    pub fn load(code: &[u8]) -> Result<Self, AllocationError> {
        let base = unsafe {
            libc::mmap(
                ptr::null_mut(),
                code.len(),
                libc::PROT_READ | libc::PROT_WRITE | libc::PROT_EXEC,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                -1,
                0,
            )
        };
        if base == libc::MAP_FAILED {
            return Err(AllocationError {
                size: code.len(),
                source: io::Error::last_os_error(),
            });
        }

        // SAFETY: the mapping starts at `base`, spans `code.len()` writable
        // bytes, and cannot overlap `code` (freshly mapped).
        unsafe {
            ptr::copy_nonoverlapping(code.as_ptr(), base.cast::<u8>(), code.len());
        }

        debug!("loaded {} code bytes at {base:p}", code.len());
        Ok(Self {
            base,
            len: code.len(),
        })
    }

    /// Invoke the compiled function with `tape` as its only argument.
    ///
    /// # Safety
    ///
    /// The loaded bytes must be a complete function following the ABI
    /// described by [`CompiledFunction`]'s entry type, generated for the
    /// host (x86-64 Linux), and `tape` must point to at least as many
    /// writable bytes as the program's pointer movement can reach; the
    /// generated code performs no bounds checking.
    pub unsafe fn call(&self, tape: *mut u8) -> u64 {
        let entry: EntryFn = mem::transmute(self.base);
        entry(tape)
    }
}

impl Drop for CompiledFunction {
    fn drop(&mut self) {
        // SAFETY: `base`/`len` describe exactly the mapping created in
        // `load`, which is still live.
        unsafe {
            libc::munmap(self.base, self.len);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_code_is_an_allocation_error() {
        let err = CompiledFunction::load(&[]).expect_err("zero-length mapping must fail");
        assert_eq!(err.size, 0);
    }
}
