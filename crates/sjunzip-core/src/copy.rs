//! Entry content copy with a reusable buffer.
//!
//! One `CopyBuffer` lives for a whole extraction job and is shared by every
//! file entry, so decompressed data goes through the same 64KB block.

use std::io;
use std::io::Read;
use std::io::Write;

use crate::ExtractionError;
use crate::ProgressCallback;

/// Buffer size for I/O operations (64KB).
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Reusable fixed-size buffer for copying entry content.
///
/// # Examples
///
/// ```no_run
/// # use sjunzip_core::copy::{CopyBuffer, copy_with_buffer};
/// # use sjunzip_core::ExtractionError;
/// # fn example() -> Result<(), ExtractionError> {
/// let mut buffer = CopyBuffer::new();
/// let mut input = std::fs::File::open("input.txt")?;
/// let mut output = std::fs::File::create("output.txt")?;
///
/// let bytes_copied = copy_with_buffer(&mut input, &mut output, &mut buffer)?;
/// println!("Copied {bytes_copied} bytes");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CopyBuffer {
    #[allow(clippy::large_stack_arrays)]
    buf: [u8; COPY_BUFFER_SIZE],
}

impl CopyBuffer {
    /// Creates a zeroed copy buffer.
    #[inline]
    #[must_use]
    #[allow(clippy::large_stack_arrays)]
    pub fn new() -> Self {
        Self {
            buf: [0u8; COPY_BUFFER_SIZE],
        }
    }

    /// Returns the buffer size in bytes.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        COPY_BUFFER_SIZE
    }
}

impl Default for CopyBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies everything from `reader` to `writer` and returns the byte count.
///
/// # Errors
///
/// Returns `ExtractionError::Io` if reading or writing fails, or if the
/// byte count overflows `u64`.
#[inline]
pub fn copy_with_buffer<R: Read + ?Sized, W: Write + ?Sized>(
    reader: &mut R,
    writer: &mut W,
    buffer: &mut CopyBuffer,
) -> Result<u64, ExtractionError> {
    copy_chunks(reader, writer, buffer, |_| {})
}

/// Like [`copy_with_buffer`], reporting each written chunk to `progress`.
///
/// # Errors
///
/// Same as [`copy_with_buffer`].
pub fn copy_with_progress<R: Read + ?Sized, W: Write + ?Sized>(
    reader: &mut R,
    writer: &mut W,
    buffer: &mut CopyBuffer,
    progress: &mut dyn ProgressCallback,
) -> Result<u64, ExtractionError> {
    copy_chunks(reader, writer, buffer, |n| progress.on_bytes_written(n))
}

fn copy_chunks<R: Read + ?Sized, W: Write + ?Sized>(
    reader: &mut R,
    writer: &mut W,
    buffer: &mut CopyBuffer,
    mut on_chunk: impl FnMut(u64),
) -> Result<u64, ExtractionError> {
    let mut total: u64 = 0;

    loop {
        let bytes_read = match reader.read(&mut buffer.buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(ExtractionError::Io(e)),
        };

        writer
            .write_all(&buffer.buf[..bytes_read])
            .map_err(ExtractionError::Io)?;

        total = total.checked_add(bytes_read as u64).ok_or_else(|| {
            ExtractionError::Io(io::Error::other("copied byte count overflowed u64"))
        })?;
        on_chunk(bytes_read as u64);
    }

    Ok(total)
}
