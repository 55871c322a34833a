/// Accelerated block widths usable on the running host.
///
/// Immutable once built and passed around by value; the inversion engine
/// only consumes it and never probes the CPU itself. The flags can only be
/// set by [`CpuCaps::detect`], so a set flag always corresponds to a width
/// the host genuinely supports — `invert_in_place` relies on that when it
/// dispatches to the vector kernels. The refiners below may clear flags,
/// never set them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuCaps {
    pub(crate) vec32: bool,
    pub(crate) vec16: bool,
}

impl CpuCaps {
    /// Probe the running CPU for accelerated block widths.
    /// Done once per process; everything downstream treats the result as
    /// read-only.
    pub fn detect() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            // The 32-byte kernel uses ymm integer ops, which are AVX2.
            CpuCaps {
                vec32: is_x86_feature_detected!("avx2"),
                vec16: is_x86_feature_detected!("sse2"),
            }
        }

        #[cfg(target_arch = "aarch64")]
        {
            // NEON is architecturally baseline on aarch64.
            CpuCaps {
                vec32: false,
                vec16: true,
            }
        }

        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        {
            CpuCaps::none()
        }
    }

    /// Scalar baseline: no accelerated widths. An all-false set is a normal
    /// input to the stride selector, not a failure.
    pub const fn none() -> Self {
        CpuCaps {
            vec32: false,
            vec16: false,
        }
    }

    /// Copy of this set with the 32-byte width cleared.
    pub const fn without_vec32(self) -> Self {
        CpuCaps {
            vec32: false,
            vec16: self.vec16,
        }
    }

    /// Copy of this set with the 16-byte width cleared.
    pub const fn without_vec16(self) -> Self {
        CpuCaps {
            vec32: self.vec32,
            vec16: false,
        }
    }

    pub const fn has_vec32(self) -> bool {
        self.vec32
    }

    pub const fn has_vec16(self) -> bool {
        self.vec16
    }
}

/// Fixed descending ladder of block widths, in bytes. Each entry is a power
/// of two and each evenly divides the one above it, so shrink-to-fit halving
/// always lands back inside the set.
pub const STRIDE_LADDER: [usize; 6] = [32, 16, 8, 4, 2, 1];

/// Select the initial stride for a capability set: widest available wins.
/// Falls back to 8 bytes — one machine word — when no vector width is
/// usable. Pure and total; never fails.
#[inline]
pub fn initial_stride(caps: CpuCaps) -> usize {
    if caps.vec32 {
        32
    } else if caps.vec16 {
        16
    } else {
        8
    }
}
