//! End-to-end checks against a live kernel.
//!
//! The ignored tests need root, a BPF-capable kernel, and a compiled
//! probe object:
//!
//!     EXECLOG_BPF_OBJECT=path/to/execlog.bpf.o cargo test -- --ignored

use std::path::{Path, PathBuf};
use std::time::Duration;

use execlog::ebpf::{ExecLogBpf, LogRecord};
use execlog::shutdown::Shutdown;
use execlog_bpf::{EventStream, ReadError, bump_memlock_rlimit};

fn object_path() -> Option<PathBuf> {
    std::env::var_os("EXECLOG_BPF_OBJECT").map(Into::into)
}

#[test]
fn load_fails_cleanly_on_missing_object() {
    let err = ExecLogBpf::load(Path::new("/nonexistent/execlog.bpf.o")).unwrap_err();
    assert!(format!("{err:#}").contains("/nonexistent/execlog.bpf.o"));
}

#[test_log::test]
#[ignore = "requires root, a BPF-capable kernel, and EXECLOG_BPF_OBJECT"]
fn shutdown_while_blocked_reading() -> anyhow::Result<()> {
    let path = object_path().expect("EXECLOG_BPF_OBJECT must point at the probe object");

    bump_memlock_rlimit()?;
    let mut bpf = ExecLogBpf::load(&path)?;
    bpf.attach_execve_tracepoint()?;

    let mut stream = EventStream::new(&bpf.logs_map()?)?;
    let shutdown = Shutdown::new({
        let closer = stream.closer();
        move || closer.close()
    });

    // Cancel shortly after the read blocks; the loop must observe the
    // closed stream promptly even if no record ever arrives.
    let trigger = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(200));
        shutdown.trigger();
    });

    loop {
        match stream.read() {
            Ok(raw) => {
                let record = LogRecord::parse(&raw)?;
                assert!(!record.text.contains('\0'));
            }
            Err(ReadError::Closed) => break,
            Err(err) => panic!("unexpected read fault: {err}"),
        }
    }

    trigger.join().unwrap();
    stream.close();
    bpf.detach();
    Ok(())
}

#[test_log::test]
#[ignore = "requires root, a BPF-capable kernel, and EXECLOG_BPF_OBJECT"]
fn execve_produces_decodable_records() -> anyhow::Result<()> {
    let path = object_path().expect("EXECLOG_BPF_OBJECT must point at the probe object");

    bump_memlock_rlimit()?;
    let mut bpf = ExecLogBpf::load(&path)?;
    bpf.attach_execve_tracepoint()?;
    let stream = EventStream::new(&bpf.logs_map()?)?;

    // Any exec will do.
    std::process::Command::new("true").status()?;

    let raw = stream.read()?;
    let record = LogRecord::parse(&raw)?;
    assert!(!record.text.is_empty());
    Ok(())
}
