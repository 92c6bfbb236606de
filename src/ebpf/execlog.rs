use std::path::Path;

use anyhow::{Context, Result, anyhow};
use libbpf_rs::{Link, Map, MapCore, Object, ObjectBuilder, TracepointCategory, TracepointOpts};

const TRACEPOINT_CATEGORY: &str = "syscalls";
const TRACEPOINT_NAME: &str = "sys_enter_execve";

/// Program entry point inside the compiled probe object.
const PROG_NAME: &str = "sys_enter_execve";
/// Ring-buffer map the probe writes log records into.
const LOGS_MAP_NAME: &str = "logs";

/// Owns the loaded probe object and its tracepoint attachments.
#[derive(Debug)]
pub struct ExecLogBpf {
    // Links must go away before the object's programs and maps do;
    // field order keeps that true for implicit drops too.
    probes: Vec<Link>,
    object: Object,
}

impl ExecLogBpf {
    /// Load the compiled probe object into the kernel.
    pub fn load(path: &Path) -> Result<Self> {
        let open_object = ObjectBuilder::default()
            .open_file(path)
            .with_context(|| format!("Failed to open BPF object {}", path.display()))?;
        let object = open_object
            .load()
            .with_context(|| format!("Failed to load BPF object {}", path.display()))?;

        Ok(Self {
            probes: Vec::new(),
            object,
        })
    }

    /// Attach the probe program to the execve entry tracepoint.
    pub fn attach_execve_tracepoint(&mut self) -> Result<()> {
        let link = self
            .object
            .progs_mut()
            .find(|p| p.name() == PROG_NAME)
            .ok_or_else(|| anyhow!("Program {PROG_NAME} not found in BPF object"))?
            .attach_tracepoint_with_opts(
                TracepointCategory::Custom(TRACEPOINT_CATEGORY.to_string()),
                TRACEPOINT_NAME,
                TracepointOpts::default(),
            )
            .with_context(|| {
                format!("Failed to attach the {TRACEPOINT_CATEGORY}:{TRACEPOINT_NAME} tracepoint")
            })?;
        self.probes.push(link);
        Ok(())
    }

    /// The ring-buffer map the probe writes log records into.
    pub fn logs_map(&self) -> Result<Map<'_>> {
        self.object
            .maps()
            .find(|m| m.name() == LOGS_MAP_NAME)
            .ok_or_else(|| anyhow!("Map {LOGS_MAP_NAME} not found in BPF object"))
    }

    /// Detach all attached probes. No-op when nothing was attached.
    pub fn detach(&mut self) {
        self.probes.clear();
    }
}
