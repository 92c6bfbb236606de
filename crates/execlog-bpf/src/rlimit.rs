use anyhow::Result;

/// Lift the memlock rlimit so BPF programs and maps can be created
///
/// Kernel-pinned BPF memory is accounted against RLIMIT_MEMLOCK; raise
/// it to infinity before loading anything. Calling this more than once
/// is harmless.
pub fn bump_memlock_rlimit() -> Result<()> {
    let rlimit = libc::rlimit {
        rlim_cur: libc::RLIM_INFINITY,
        rlim_max: libc::RLIM_INFINITY,
    };

    let ret = unsafe { libc::setrlimit(libc::RLIMIT_MEMLOCK, &rlimit) };
    if ret != 0 {
        anyhow::bail!(
            "Failed to raise the memlock limit: {}",
            std::io::Error::last_os_error()
        );
    }

    Ok(())
}
