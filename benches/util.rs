// Timer for the benchmarks. On x86-64 and aarch64, this reads the cycle
// counter (serialized with a fence); elsewhere, it returns nanoseconds
// from the monotonic clock. Only differences between two calls made on
// the same core are meaningful.

#[allow(unreachable_code, unused_unsafe)]
pub fn core_cycles() -> u64 {
    #[cfg(target_arch = "x86_64")]
    return unsafe {
        core::arch::x86_64::_mm_lfence();
        core::arch::x86_64::_rdtsc()
    };

    #[cfg(target_arch = "aarch64")]
    return {
        let mut t: u64;
        unsafe {
            core::arch::asm!("dsb sy", "mrs {}, pmccntr_el0", out(reg) t);
        }
        t
    };

    monotonic_nanos()
}

#[allow(dead_code)]
fn monotonic_nanos() -> u64 {
    use std::sync::OnceLock;
    use std::time::Instant;
    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed().as_nanos() as u64
}
