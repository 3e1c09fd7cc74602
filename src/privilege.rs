/// Reports whether the process may touch privileged targets.
pub trait PrivilegeProbe: Send + Sync {
    fn is_elevated(&self) -> bool;
}

/// Asks the operating system about the current process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessPrivilege;

impl PrivilegeProbe for ProcessPrivilege {
    #[cfg(unix)]
    fn is_elevated(&self) -> bool {
        unsafe { libc::geteuid() == 0 }
    }

    #[cfg(windows)]
    fn is_elevated(&self) -> bool {
        use windows_sys::Win32::Security::{
            CheckTokenMembership, CreateWellKnownSid, WinBuiltinAdministratorsSid,
            SECURITY_MAX_SID_SIZE,
        };

        unsafe {
            // Membership in the built-in Administrators group of the current token
            let mut sid = [0u8; SECURITY_MAX_SID_SIZE as usize];
            let mut sid_size = SECURITY_MAX_SID_SIZE;
            let sid_ptr = sid.as_mut_ptr() as *mut core::ffi::c_void;
            if CreateWellKnownSid(
                WinBuiltinAdministratorsSid,
                std::ptr::null_mut(),
                sid_ptr,
                &mut sid_size,
            ) == 0
            {
                return false;
            }
            let mut is_member = 0;
            if CheckTokenMembership(std::ptr::null_mut(), sid_ptr, &mut is_member) == 0 {
                return false;
            }
            is_member != 0
        }
    }

    #[cfg(not(any(unix, windows)))]
    fn is_elevated(&self) -> bool {
        false
    }
}

/// A probe with a fixed answer.
#[derive(Debug, Clone, Copy)]
pub struct FixedPrivilege(pub bool);

impl PrivilegeProbe for FixedPrivilege {
    fn is_elevated(&self) -> bool {
        self.0
    }
}
