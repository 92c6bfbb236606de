use std::env;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use execlog::ebpf::{ExecLogBpf, LogRecord};
use execlog::shutdown::Shutdown;
use execlog_bpf::{EventStream, ReadError, bump_memlock_rlimit};
use log::{error, info, log};

/// Fallback path of the compiled probe object when neither the
/// environment nor the build pipeline provides one.
const DEFAULT_OBJECT_PATH: &str = "execlog.bpf.o";

#[derive(Parser)]
#[command(name = "execlog")]
#[command(about = "Surface kernel probe logs for every execve syscall", long_about = None)]
#[command(version)]
struct Cli {}

fn main() {
    env_logger::builder()
        .parse_env(env_logger::Env::new().filter_or("EXECLOG_LOG", "info"))
        .init();

    let _cli = Cli::parse();

    if let Err(err) = run() {
        error!("{err:#}");
        process::exit(1);
    }
}

/// Where to find the compiled probe object: explicit override first,
/// then the object produced by the bpf-build feature, then the current
/// directory.
fn object_path() -> PathBuf {
    if let Some(path) = env::var_os("EXECLOG_BPF_OBJECT") {
        return path.into();
    }
    if let Some(built) = option_env!("EXECLOG_BPF_OBJECT_OUT") {
        return built.into();
    }
    DEFAULT_OBJECT_PATH.into()
}

fn run() -> Result<()> {
    bump_memlock_rlimit().context("Failed to remove the memlock limit")?;

    let mut bpf = ExecLogBpf::load(&object_path())?;
    bpf.attach_execve_tracepoint()?;
    info!("Attached tracepoint program to the sys_enter_execve hook");

    let mut stream =
        EventStream::new(&bpf.logs_map()?).context("Failed to create ring buffer reader")?;

    let shutdown = Shutdown::new({
        let closer = stream.closer();
        move || closer.close()
    });
    shutdown.install_sigint()?;
    info!("Send SIGINT or press CTRL+C to exit");

    info!("Waiting for events");
    loop {
        match stream.read() {
            Ok(raw) => match LogRecord::parse(&raw) {
                Ok(record) => log!(record.severity(), "{}", record.text),
                Err(err) => error!("Failed to decode ring buffer record: {err}"),
            },
            Err(ReadError::Closed) => break,
            Err(err) => error!("Failed to read from ring buffer: {err}"),
        }
    }

    // Teardown runs in reverse acquisition order; the object drops
    // last.
    stream.close();
    bpf.detach();
    Ok(())
}
