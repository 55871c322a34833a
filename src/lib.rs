// Allow pre-existing clippy lints across the codebase
#![allow(clippy::collapsible_if, clippy::needless_return)]

/// Use mimalloc as the global allocator for the binary.
/// 2-3x faster than glibc malloc for small allocations,
/// better thread-local caching, and reduced fragmentation.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod common;
pub mod invert;
