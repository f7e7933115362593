//! COM apartment handling for the WinRT OCR calls.

use crate::error::OcrError;

/// Holds a multithreaded COM apartment open on the current thread.
///
/// Every successful [`ComGuard::initialize`] is paired with one
/// `CoUninitialize` when the guard drops, so the guard must stay on the
/// thread that created it. The WinRT engine takes one per blocking task.
pub struct ComGuard;

impl ComGuard {
    /// Enter the MTA on this thread.
    ///
    /// Fails with [`OcrError::Engine`] when the thread is already in an
    /// incompatible apartment.
    pub fn initialize() -> Result<Self, OcrError> {
        unsafe {
            windows::Win32::System::Com::CoInitializeEx(
                Some(std::ptr::null()),
                windows::Win32::System::Com::COINIT_MULTITHREADED,
            )
            .ok()
            .map_err(|e| OcrError::Engine(format!("Failed to initialize COM: {e}")))?;
        }
        Ok(ComGuard)
    }
}

impl Drop for ComGuard {
    fn drop(&mut self) {
        unsafe {
            windows::Win32::System::Com::CoUninitialize();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_can_be_reacquired_after_drop() {
        {
            let _guard = ComGuard::initialize().unwrap();
        }
        assert!(ComGuard::initialize().is_ok());
    }
}
