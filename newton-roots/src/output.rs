use std::fs::{File, OpenOptions};
use std::io::{prelude::*, BufWriter, Result, SeekFrom};
use std::path::Path;

use crate::classify::PixelResult;

pub const HEADER: &str = "root_idx,iterations";

/// Byte length of the header line, i.e. the offset of the first data row.
pub fn header_len() -> u64 {
    HEADER.len() as u64 + 1
}

/// Appends one `root_idx,iterations` line per result.
pub fn serialize(results: &[PixelResult], buffer: &mut Vec<u8>) {
    for result in results {
        // Writing into a Vec cannot fail.
        let _ = writeln!(buffer, "{},{}", result.root_idx, result.iterations);
    }
}

pub fn to_bytes(results: &[PixelResult]) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(results.len() * 8);
    serialize(results, &mut buffer);
    buffer
}

/// Writes the header and every result sequentially.
pub fn write_csv<W: Write>(writer: W, results: &[PixelResult]) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    writeln!(writer, "{HEADER}")?;
    for result in results {
        writeln!(writer, "{},{}", result.root_idx, result.iterations)?;
    }
    writer.flush()
}

/// Creates (truncating) the shared output file and writes the header. Must
/// happen before any shard is written.
pub fn create_shared(path: &Path) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(HEADER.as_bytes())?;
    file.write_all(b"\n")?;
    file.sync_all()
}

/// Sizes the shared output file to `total_len` bytes, the end of the last
/// shard.
pub fn reserve_shared(path: &Path, total_len: u64) -> Result<()> {
    let file = OpenOptions::new().write(true).open(path)?;
    file.set_len(total_len)
}

/// One positioned write of `data` at `offset` into an existing file.
pub fn write_at(path: &Path, offset: u64, data: &[u8]) -> Result<()> {
    let mut file = OpenOptions::new().write(true).open(path)?;
    file.seek(SeekFrom::Start(offset))?;
    file.write_all(data)?;
    file.flush()
}
