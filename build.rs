#[cfg(feature = "bpf-build")]
fn main() {
    execlog_bpf::build::build_bpf("execlog", "src/ebpf/c/execlog.bpf.c");
}

#[cfg(not(feature = "bpf-build"))]
fn main() {}
