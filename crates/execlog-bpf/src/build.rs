//! Build utilities for the BPF probe object
//!
//! To use this from a build.rs, add execlog-bpf with the "build"
//! feature to your [build-dependencies]:
//!
//! ```toml
//! [build-dependencies]
//! execlog-bpf = { path = "crates/execlog-bpf", features = ["build"] }
//! ```
//!
//! Then in your build.rs:
//!
//! ```ignore
//! fn main() {
//!     execlog_bpf::build::build_bpf("execlog", "src/ebpf/c/execlog.bpf.c");
//! }
//! ```

use std::{env, path::PathBuf};

/// Compile a BPF source file into a loadable object
///
/// # Arguments
/// * `program_name` - The name of the BPF program (e.g., "execlog")
/// * `source_file` - The path to the BPF source file
///
/// This function will:
/// 1. Compile the BPF program into OUT_DIR/{program_name}.bpf.o
/// 2. Emit `cargo:rustc-env=EXECLOG_BPF_OBJECT_OUT=<path>` so the
///    consuming binary can bake in the object location
pub fn build_bpf(program_name: &str, source_file: &str) {
    use libbpf_cargo::SkeletonBuilder;

    println!("cargo:rerun-if-changed={source_file}");

    let output =
        PathBuf::from(env::var("OUT_DIR").unwrap()).join(format!("{program_name}.bpf.o"));

    SkeletonBuilder::new()
        .source(source_file)
        .obj(&output)
        .build()
        .expect(&format!("Failed to build {source_file}"));

    println!("cargo:rustc-env=EXECLOG_BPF_OBJECT_OUT={}", output.display());
}
