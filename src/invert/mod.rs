mod caps;
mod core;
mod file;


pub use self::caps::{CpuCaps, STRIDE_LADDER, initial_stride};
pub use self::core::invert_in_place;
pub use self::file::{FobError, obfuscate_file};
