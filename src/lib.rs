pub mod ebpf;
pub mod shutdown;

pub use ebpf::{ExecLogBpf, LogRecord};
pub use shutdown::Shutdown;
