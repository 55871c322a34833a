use super::caps::{CpuCaps, initial_stride};

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

#[cfg(target_arch = "aarch64")]
use std::arch::aarch64::*;

/// Complement every bit of `buf` in place, exactly once per byte.
///
/// Walks the buffer front to back in contiguous, non-overlapping blocks of
/// the current stride, starting at the widest width the capability set
/// backs. Before each block the stride is halved until the block fits in
/// the remaining bytes (shrink-to-fit), so the walk never reads or writes
/// past the end; a 1-byte stride fits any remaining length, so the walk
/// always terminates with the cursor exactly at `buf.len()`. The stride
/// never grows back within one pass.
///
/// Applying this twice is the identity, and the per-byte result is
/// bit-identical no matter which kernel processed it. No allocation, no I/O.
/// An empty buffer is a no-op.
pub fn invert_in_place(buf: &mut [u8], caps: CpuCaps) {
    let len = buf.len();
    let mut stride = initial_stride(caps);
    let mut pos = 0usize;

    while pos < len {
        debug_assert!(stride.is_power_of_two() && stride <= 32);

        // Shrink-to-fit: re-derived for every block, since the remaining
        // bytes may have dropped below the stride that just completed.
        while pos + stride > len && stride > 1 {
            stride >>= 1;
        }

        match stride {
            #[cfg(target_arch = "x86_64")]
            // SAFETY: stride 32 only arises from a detected-AVX2 capability
            // set, and the shrink loop guarantees pos + 32 <= len.
            32 => unsafe { invert_block_32(buf, pos) },
            #[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
            // SAFETY: stride 16 only arises from a detected vec16 capability
            // (SSE2/NEON), and the shrink loop guarantees pos + 16 <= len.
            16 => unsafe { invert_block_16(buf, pos) },
            8 => flip_word::<u64>(buf, pos),
            4 => flip_word::<u32>(buf, pos),
            2 => flip_word::<u16>(buf, pos),
            1 => flip_word::<u8>(buf, pos),
            // A stride outside the ladder is an implementation bug, not a
            // runtime input error.
            _ => unreachable!("stride {stride} outside the power-of-two ladder"),
        }

        pos += stride;
    }
}

/// Machine-word view of a block: native-endian load, complement via `!`,
/// native-endian store. One width-parameterized path instead of a
/// duplicated per-type flip.
trait Word: Copy + std::ops::Not<Output = Self> {
    const WIDTH: usize;
    fn load_ne(buf: &[u8], pos: usize) -> Self;
    fn store_ne(self, buf: &mut [u8], pos: usize);
}

macro_rules! impl_word {
    ($($ty:ty),*) => {$(
        impl Word for $ty {
            const WIDTH: usize = size_of::<$ty>();

            #[inline(always)]
            fn load_ne(buf: &[u8], pos: usize) -> Self {
                <$ty>::from_ne_bytes(buf[pos..pos + Self::WIDTH].try_into().unwrap())
            }

            #[inline(always)]
            fn store_ne(self, buf: &mut [u8], pos: usize) {
                buf[pos..pos + Self::WIDTH].copy_from_slice(&self.to_ne_bytes());
            }
        }
    )*};
}

impl_word!(u8, u16, u32, u64);

/// Read one `W`-wide block at `pos`, complement it, write it back.
/// Bitwise NOT on the raw byte pattern — no integer interpretation, so the
/// result matches the vector kernels byte for byte.
#[inline(always)]
fn flip_word<W: Word>(buf: &mut [u8], pos: usize) {
    let w = W::load_ne(buf, pos);
    (!w).store_ne(buf, pos);
}

/// Complement a 32-byte block with one AVX2 XOR. The all-ones operand comes
/// from comparing the register with itself (equal everywhere), which avoids
/// a separate constant broadcast.
///
/// # Safety
/// AVX2 must be available and `pos + 32 <= buf.len()`. Unaligned access is
/// fine: loads/stores are the `loadu`/`storeu` forms.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
#[inline]
unsafe fn invert_block_32(buf: &mut [u8], pos: usize) {
    debug_assert!(pos + 32 <= buf.len());
    unsafe {
        let p = buf.as_mut_ptr().add(pos) as *mut __m256i;
        let v = _mm256_loadu_si256(p);
        let ones = _mm256_cmpeq_epi8(v, v);
        _mm256_storeu_si256(p, _mm256_xor_si256(v, ones));
    }
}

/// Complement a 16-byte block with one SSE2 XOR, same cmpeq-to-self trick
/// as the 32-byte kernel.
///
/// # Safety
/// SSE2 must be available and `pos + 16 <= buf.len()`.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse2")]
#[inline]
unsafe fn invert_block_16(buf: &mut [u8], pos: usize) {
    debug_assert!(pos + 16 <= buf.len());
    unsafe {
        let p = buf.as_mut_ptr().add(pos) as *mut __m128i;
        let v = _mm_loadu_si128(p);
        let ones = _mm_cmpeq_epi8(v, v);
        _mm_storeu_si128(p, _mm_xor_si128(v, ones));
    }
}

/// Complement a 16-byte block with NEON `mvn`.
///
/// # Safety
/// `pos + 16 <= buf.len()`. NEON itself is baseline on aarch64.
#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
#[inline]
unsafe fn invert_block_16(buf: &mut [u8], pos: usize) {
    debug_assert!(pos + 16 <= buf.len());
    unsafe {
        let p = buf.as_mut_ptr().add(pos);
        vst1q_u8(p, vmvnq_u8(vld1q_u8(p)));
    }
}
