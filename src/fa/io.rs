// src/fa/io.rs
//! Table (de)serialization: JSON for inspection, compact binary for
//! shipping precompiled automata.

use std::{
    io::{BufWriter, Write},
    time::Instant,
};

use super::table::{DfaTableEntry, DfaTableTransition};

// -------------------- JSON (de)serialization --------------------

pub fn save_table_json(path: &std::path::Path, table: &[DfaTableEntry]) -> std::io::Result<()> {
    let f = std::fs::File::create(path)?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer(&mut w, table)?;
    w.flush()
}

pub fn load_table_json_bytes(data: &[u8]) -> Result<Vec<DfaTableEntry>, String> {
    serde_json::from_slice(data).map_err(|e| format!("Failed to parse table JSON: {e}"))
}

// -------------------- Compact binary --------------------
//
// Layout:
//   magic: 8 bytes = "RFADFA01"
//   u32:   n_entries
//   per entry:
//     u32: accept symbol id (NO_ACCEPT for non-accepting)
//     u32: n_transitions
//     per transition:
//       u32: dest row
//       u32: n_packed (even)
//       n_packed * u32: chars as scalar values

const BIN_MAGIC: &[u8; 8] = b"RFADFA01";

pub fn save_table_bin(path: &std::path::Path, table: &[DfaTableEntry]) -> std::io::Result<()> {
    let instant = Instant::now();
    let f = std::fs::File::create(path)?;
    let mut w = BufWriter::new(f);

    w.write_all(BIN_MAGIC)?;
    let n = u32::try_from(table.len()).map_err(|_| {
        std::io::Error::new(std::io::ErrorKind::InvalidData, "too many table rows for u32")
    })?;
    w.write_all(&n.to_le_bytes())?;

    for entry in table {
        w.write_all(&entry.accept.to_le_bytes())?;
        w.write_all(&(entry.transitions.len() as u32).to_le_bytes())?;
        for transition in &entry.transitions {
            w.write_all(&transition.dest.to_le_bytes())?;
            w.write_all(&(transition.packed_ranges.len() as u32).to_le_bytes())?;
            for &ch in &transition.packed_ranges {
                w.write_all(&(ch as u32).to_le_bytes())?;
            }
        }
    }

    let flush = w.flush();
    log::debug!(
        "saved {} table rows to {} in {} ms",
        table.len(),
        path.display(),
        instant.elapsed().as_millis()
    );
    flush
}

#[inline]
fn take_u32(buf: &mut &[u8]) -> Result<u32, String> {
    if buf.len() < 4 {
        return Err("truncated u32".into());
    }
    let mut le = [0u8; 4];
    le.copy_from_slice(&buf[..4]);
    *buf = &buf[4..];
    Ok(u32::from_le_bytes(le))
}

#[inline]
fn take_char(buf: &mut &[u8]) -> Result<char, String> {
    let v = take_u32(buf)?;
    char::from_u32(v).ok_or_else(|| format!("invalid scalar value {v:#x} in table .bin"))
}

pub fn load_table_bin_bytes(mut data: &[u8]) -> Result<Vec<DfaTableEntry>, String> {
    if data.len() < 8 + 4 {
        return Err("bin too short".into());
    }
    let mut magic = [0u8; 8];
    magic.copy_from_slice(&data[..8]);
    if &magic != BIN_MAGIC {
        return Err("bad magic in table .bin".into());
    }
    data = &data[8..];

    let n_entries = take_u32(&mut data)? as usize;
    let mut entries = Vec::with_capacity(n_entries);
    for _ in 0..n_entries {
        let accept = take_u32(&mut data)?;
        let n_transitions = take_u32(&mut data)? as usize;
        let mut transitions = Vec::with_capacity(n_transitions);
        for _ in 0..n_transitions {
            let dest = take_u32(&mut data)?;
            let n_packed = take_u32(&mut data)? as usize;
            if n_packed % 2 != 0 {
                return Err("odd packed-range length in table .bin".into());
            }
            let mut packed_ranges = Vec::with_capacity(n_packed);
            for _ in 0..n_packed {
                packed_ranges.push(take_char(&mut data)?);
            }
            transitions.push(DfaTableTransition { packed_ranges, dest });
        }
        entries.push(DfaTableEntry { accept, transitions });
    }
    Ok(entries)
}
