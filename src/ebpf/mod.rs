mod execlog;
pub mod records;

pub use execlog::ExecLogBpf;
pub use records::{DecodeError, LogRecord};
