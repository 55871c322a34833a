use std::path::{Path, PathBuf};

use thiserror::Error;

use super::caps::CpuCaps;
use super::core::invert_in_place;
use crate::common::io::{MMAP_THRESHOLD, map_file_mut, read_file_vec, write_file};
use crate::common::io_error_msg;

/// Errors surfaced around the inversion engine. The engine itself has no
/// failure path; everything here happens before it runs (read) or after it
/// completes (write). There is no rollback across read-transform-write.
#[derive(Debug, Error)]
pub enum FobError {
    #[error("cannot read '{}': {}", path.display(), io_error_msg(source))]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot write '{}': {}", path.display(), io_error_msg(source))]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Complement every bit of the file at `input` and write the result.
///
/// With no `output`, or when `output` names the same path, the file is
/// rewritten in place: files at or above [`MMAP_THRESHOLD`] go through a
/// mutable mmap so pages are transformed directly in the page cache, and
/// everything else is read, inverted and written back. With a distinct
/// `output` the input is left untouched. Returns the number of bytes
/// transformed; an empty file is a legal no-op and returns 0.
pub fn obfuscate_file(
    input: &Path,
    output: Option<&Path>,
    caps: CpuCaps,
) -> Result<u64, FobError> {
    let in_place = match output {
        None => true,
        Some(out) => out == input,
    };

    if in_place {
        if let Ok(meta) = std::fs::metadata(input) {
            if meta.len() >= MMAP_THRESHOLD {
                // Any mmap-path failure (open, non-regular file) falls back
                // to the read/write path below, which reports the real error.
                if let Ok(Some(mut map)) = map_file_mut(input) {
                    invert_in_place(&mut map, caps);
                    map.flush().map_err(|source| FobError::Write {
                        path: input.to_path_buf(),
                        source,
                    })?;
                    return Ok(map.len() as u64);
                }
            }
        }
    }

    let mut buf = read_file_vec(input).map_err(|source| FobError::Read {
        path: input.to_path_buf(),
        source,
    })?;

    invert_in_place(&mut buf, caps);

    let dest = output.unwrap_or(input);
    write_file(dest, &buf).map_err(|source| FobError::Write {
        path: dest.to_path_buf(),
        source,
    })?;

    Ok(buf.len() as u64)
}
