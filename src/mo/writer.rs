use super::{hash, Endianness, HEADER_SIZE, MAGIC, REVISION, STRING_DESCRIPTOR_SIZE};
use crate::catalog::Message;
use crate::impl_prelude::*;
use crate::utils;

use std::convert::TryFrom;
use std::io::{self, Write};

#[derive(Debug, Clone)]
pub struct MoWriterOptions {
  /// Every string starts at a multiple of this many bytes.
  pub alignment: usize,
  pub hash_table: bool,
  pub endianness: Endianness,
}

impl Default for MoWriterOptions {
  fn default() -> Self {
    Self { alignment: 1, hash_table: true, endianness: Endianness::native() }
  }
}

/// A pair of strings as stored in the file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MoEntry {
  /// The msgid, followed by NUL and the plural msgid for plural messages.
  pub key: Vec<u8>,
  /// The plural forms, separated by NUL.
  pub translation: Vec<u8>,
}

impl MoEntry {
  pub fn from_message(message: &Message) -> Self {
    Self { key: message.mo_key(), translation: message.msgstr_bundle() }
  }
}

/// Where everything will be placed in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
  pub orig_table_offset: u32,
  pub trans_table_offset: u32,
  pub hash_table_size: u32,
  pub hash_table_offset: u32,
  pub orig_offsets: Vec<u32>,
  pub trans_offsets: Vec<u32>,
}

impl Layout {
  pub fn compute(entries: &[MoEntry], options: &MoWriterOptions) -> AnyResult<Self> {
    ensure!(options.alignment > 0, "alignment must be a positive number");
    // 0 marks an empty hash bucket, so the last index must still fit once
    // incremented.
    ensure!(
      entries.len() < u32::MAX as usize,
      "too many messages for a single file: {}",
      entries.len(),
    );

    let hash_table_size = if options.hash_table { hash::table_size(entries.len()) } else { 0 };
    let orig_table_offset = HEADER_SIZE;
    let trans_table_offset = orig_table_offset + entries.len() * STRING_DESCRIPTOR_SIZE;
    let hash_table_offset = trans_table_offset + entries.len() * STRING_DESCRIPTOR_SIZE;
    let mut cursor = hash_table_offset + hash_table_size as usize * 4;

    let alignment = options.alignment;
    let orig_offsets = place_strings(entries.iter().map(|e| &e.key[..]), &mut cursor, alignment);
    let trans_offsets =
      place_strings(entries.iter().map(|e| &e.translation[..]), &mut cursor, alignment);

    let too_large = || format_err!("the file would be larger than 4 GiB");
    let to_u32 = |n: usize| u32::try_from(n).map_err(|_| too_large());
    u32::try_from(cursor).map_err(|_| too_large())?;

    Ok(Self {
      orig_table_offset: to_u32(orig_table_offset)?,
      trans_table_offset: to_u32(trans_table_offset)?,
      hash_table_size: u32::try_from(hash_table_size).map_err(|_| too_large())?,
      hash_table_offset: to_u32(hash_table_offset)?,
      orig_offsets: orig_offsets.into_iter().map(to_u32).collect::<AnyResult<_>>()?,
      trans_offsets: trans_offsets.into_iter().map(to_u32).collect::<AnyResult<_>>()?,
    })
  }
}

#[inline]
fn write_u32(writer: &mut dyn Write, endianness: Endianness, n: u32) -> io::Result<()> {
  writer.write_all(&endianness.encode_u32(n))
}

fn place_strings<'a>(
  strings: impl Iterator<Item = &'a [u8]>,
  cursor: &mut usize,
  alignment: usize,
) -> Vec<usize> {
  strings
    .map(|s| {
      let offset = utils::align_up(*cursor, alignment);
      *cursor = offset + s.len() + 1;
      offset
    })
    .collect()
}

/// Writes a complete MO file. Entries are sorted by their keys first, the
/// caller must make sure that the keys are unique.
pub fn write(
  writer: &mut dyn Write,
  mut entries: Vec<MoEntry>,
  options: &MoWriterOptions,
) -> AnyResult<()> {
  entries.sort();
  let layout = Layout::compute(&entries, options)?;
  let endianness = options.endianness;
  let mut position = 0usize;

  for n in &[
    MAGIC,
    REVISION,
    entries.len() as u32,
    layout.orig_table_offset,
    layout.trans_table_offset,
    layout.hash_table_size,
    layout.hash_table_offset,
  ] {
    write_u32(writer, endianness, *n)?;
  }
  position += HEADER_SIZE;

  for (entry, &offset) in entries.iter().zip(&layout.orig_offsets) {
    write_u32(writer, endianness, entry.key.len() as u32)?;
    write_u32(writer, endianness, offset)?;
  }
  for (entry, &offset) in entries.iter().zip(&layout.trans_offsets) {
    write_u32(writer, endianness, entry.translation.len() as u32)?;
    write_u32(writer, endianness, offset)?;
  }
  position += entries.len() * 2 * STRING_DESCRIPTOR_SIZE;

  if layout.hash_table_size > 0 {
    let keys: Vec<&[u8]> = entries.iter().map(|e| &e.key[..]).collect();
    for bucket in hash::build_table(&keys, layout.hash_table_size) {
      write_u32(writer, endianness, bucket)?;
    }
    position += layout.hash_table_size as usize * 4;
  }

  let strings = entries
    .iter()
    .map(|e| &e.key)
    .zip(&layout.orig_offsets)
    .chain(entries.iter().map(|e| &e.translation).zip(&layout.trans_offsets));
  for (string, &offset) in strings {
    let offset = offset as usize;
    utils::write_zeroes(writer, offset - position)?;
    writer.write_all(string)?;
    writer.write_all(b"\0")?;
    position = offset + string.len() + 1;
  }

  writer.flush()?;
  Ok(())
}
