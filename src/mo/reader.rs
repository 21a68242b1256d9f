use super::{Endianness, MAGIC, REVISION, STRING_DESCRIPTOR_SIZE};
use crate::catalog::Message;
use crate::impl_prelude::*;

use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};

#[derive(Debug)]
pub enum MoErrorKind {
  NotMoFormat,
  Truncated,
  NotNulTerminated,
  Seek { offset: u64, source: io::Error },
  Io(io::Error),
}

#[derive(Debug)]
pub struct MoError {
  pub file_name: String,
  pub kind: MoErrorKind,
}

impl MoError {
  fn new(file_name: &str, kind: MoErrorKind) -> Self {
    Self { file_name: file_name.to_owned(), kind }
  }

  fn from_read_error(file_name: &str, error: io::Error) -> Self {
    let kind = if error.kind() == io::ErrorKind::UnexpectedEof {
      MoErrorKind::Truncated
    } else {
      MoErrorKind::Io(error)
    };
    Self::new(file_name, kind)
  }
}

impl fmt::Display for MoError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    let file_name = &self.file_name;
    match &self.kind {
      MoErrorKind::NotMoFormat => write!(f, "file {:?} is not in GNU .mo format", file_name),
      MoErrorKind::Truncated => write!(f, "file {:?} truncated", file_name),
      MoErrorKind::NotNulTerminated => {
        write!(f, "file {:?} contains a not NUL terminated string", file_name)
      }
      MoErrorKind::Seek { offset, .. } => {
        write!(f, "seek {:?} offset {} failed", file_name, offset)
      }
      MoErrorKind::Io(_) => write!(f, "error while reading {:?}", file_name),
    }
  }
}

impl StdError for MoError {
  fn source(&self) -> Option<&(dyn StdError + 'static)> {
    match &self.kind {
      MoErrorKind::Seek { source, .. } => Some(source),
      MoErrorKind::Io(source) => Some(source),
      _ => None,
    }
  }
}

#[derive(Debug, Clone)]
pub struct MoHeader {
  pub endianness: Endianness,
  pub revision: u32,
  pub string_count: u32,
  pub orig_table_offset: u32,
  pub trans_table_offset: u32,
  pub hash_table_size: u32,
  pub hash_table_offset: u32,
}

#[derive(Debug, Clone)]
pub struct MoFile {
  pub header: MoHeader,
  /// In the order of the file, which is sorted by msgid.
  pub messages: Vec<Message>,
}

struct Reader<'r, R> {
  inner: &'r mut R,
  file_name: &'r str,
  endianness: Endianness,
}

impl<'r, R: Read + Seek> Reader<'r, R> {
  fn seek(&mut self, offset: u64) -> Result<(), MoError> {
    match self.inner.seek(SeekFrom::Start(offset)) {
      Ok(_) => Ok(()),
      Err(source) => Err(MoError::new(self.file_name, MoErrorKind::Seek { offset, source })),
    }
  }

  fn read_word(&mut self) -> Result<[u8; 4], MoError> {
    let mut buf = [0; 4];
    self.inner.read_exact(&mut buf).map_err(|e| MoError::from_read_error(self.file_name, e))?;
    Ok(buf)
  }

  fn read_u32(&mut self) -> Result<u32, MoError> {
    let word = self.read_word()?;
    Ok(self.endianness.decode_u32(word))
  }

  /// Reads the string described by the (length, offset) pair at
  /// `descriptor_offset`. The stored length doesn't include the NUL
  /// terminator, which is read and checked too.
  fn read_string(&mut self, descriptor_offset: u64) -> Result<Vec<u8>, MoError> {
    self.seek(descriptor_offset)?;
    let length = self.read_u32()?;
    let offset = self.read_u32()?;

    self.seek(offset as u64)?;
    let mut buf = Vec::new();
    let expected_len = length as u64 + 1;
    (&mut *self.inner)
      .take(expected_len)
      .read_to_end(&mut buf)
      .map_err(|e| MoError::from_read_error(self.file_name, e))?;
    if (buf.len() as u64) < expected_len {
      return Err(MoError::new(self.file_name, MoErrorKind::Truncated));
    }
    if buf.pop() != Some(0) {
      return Err(MoError::new(self.file_name, MoErrorKind::NotNulTerminated));
    }
    Ok(buf)
  }
}

/// Reads every message out of an MO file. The byte order is detected with
/// the magic number.
pub fn read<R: Read + Seek>(reader: &mut R, file_name: &str) -> Result<MoFile, MoError> {
  let mut reader = Reader { inner: reader, file_name, endianness: Endianness::native() };

  reader.seek(0)?;
  let magic_word = reader.read_word()?;
  let endianness = if reader.endianness.decode_u32(magic_word) == MAGIC {
    reader.endianness
  } else if reader.endianness.opposite().decode_u32(magic_word) == MAGIC {
    reader.endianness.opposite()
  } else {
    return Err(MoError::new(file_name, MoErrorKind::NotMoFormat));
  };
  reader.endianness = endianness;

  let revision = reader.read_u32()?;
  if revision != REVISION {
    return Err(MoError::new(file_name, MoErrorKind::NotMoFormat));
  }
  let header = MoHeader {
    endianness,
    revision,
    string_count: reader.read_u32()?,
    orig_table_offset: reader.read_u32()?,
    trans_table_offset: reader.read_u32()?,
    hash_table_size: reader.read_u32()?,
    hash_table_offset: reader.read_u32()?,
  };
  trace!(
    "{:?}: {} byte order, {} strings, {} hash buckets",
    file_name,
    endianness,
    header.string_count,
    header.hash_table_size,
  );

  let mut messages = Vec::new();
  for i in 0..header.string_count as u64 {
    let descriptor_offset = i * STRING_DESCRIPTOR_SIZE as u64;
    let key = reader.read_string(header.orig_table_offset as u64 + descriptor_offset)?;
    let translation = reader.read_string(header.trans_table_offset as u64 + descriptor_offset)?;
    messages.push(Message::from_mo_strings(&key, &translation));
  }

  Ok(MoFile { header, messages })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::mo::writer::{self, MoEntry, MoWriterOptions};

  use std::fs;
  use std::io::{Cursor, Write};

  fn entries() -> Vec<MoEntry> {
    vec![
      MoEntry::from_message(&Message::new(Vec::new(), b"Content-Type: text/plain\n".to_vec())),
      MoEntry::from_message(&Message::new_plural(b"file".to_vec(), b"files".to_vec(), vec![
        b"archivo".to_vec(),
        b"archivos".to_vec(),
      ])),
      MoEntry::from_message(&Message::new(b"hello".to_vec(), b"hola".to_vec())),
    ]
  }

  fn encode(options: &MoWriterOptions) -> Vec<u8> {
    let mut buf = Vec::new();
    writer::write(&mut buf, entries(), options).unwrap();
    buf
  }

  fn decode(bytes: Vec<u8>) -> Result<MoFile, MoError> { read(&mut Cursor::new(bytes), "test.mo") }

  #[test]
  fn test_read_both_byte_orders() {
    for &endianness in &[Endianness::Little, Endianness::Big] {
      let options = MoWriterOptions { endianness, alignment: 4, ..Default::default() };
      let file = decode(encode(&options)).unwrap();
      assert_eq!(file.header.endianness, endianness);
      assert_eq!(file.header.string_count, 3);
      assert_eq!(file.header.hash_table_size, 5);

      let messages = &file.messages;
      assert!(messages[0].is_header());
      assert_eq!(messages[1].msgid, b"file");
      assert_eq!(messages[1].msgid_plural.as_deref(), Some(&b"files"[..]));
      assert_eq!(messages[1].msgstr, vec![b"archivo".to_vec(), b"archivos".to_vec()]);
      assert_eq!(messages[1].msgstr_bundle(), b"archivo\0archivos".to_vec());
      assert_eq!(messages[2].msgstr, vec![b"hola".to_vec()]);
    }
  }

  #[test]
  fn test_reencode_gives_same_layout() {
    let options = MoWriterOptions { alignment: 8, ..Default::default() };
    let first = encode(&options);
    let file = decode(first.clone()).unwrap();
    let entries: Vec<MoEntry> = file.messages.iter().map(MoEntry::from_message).collect();
    let mut second = Vec::new();
    writer::write(&mut second, entries, &options).unwrap();
    assert_eq!(first, second);
  }

  #[test]
  fn test_errors() {
    let err = decode(b"\x00\x01\x02\x03 definitely not a catalog".to_vec()).unwrap_err();
    assert!(matches!(err.kind, MoErrorKind::NotMoFormat));
    assert_eq!(err.to_string(), "file \"test.mo\" is not in GNU .mo format");

    let mut bytes = encode(&MoWriterOptions::default());
    bytes[4] = 1;
    assert!(matches!(decode(bytes).unwrap_err().kind, MoErrorKind::NotMoFormat));

    let bytes = encode(&MoWriterOptions::default());
    let err = decode(bytes[..bytes.len() - 3].to_vec()).unwrap_err();
    assert!(matches!(err.kind, MoErrorKind::Truncated));
    assert_eq!(err.to_string(), "file \"test.mo\" truncated");
    assert!(matches!(decode(bytes[..10].to_vec()).unwrap_err().kind, MoErrorKind::Truncated));

    let mut bytes = encode(&MoWriterOptions::default());
    let last = bytes.len() - 1;
    bytes[last] = b'!';
    assert!(matches!(decode(bytes).unwrap_err().kind, MoErrorKind::NotNulTerminated));
  }

  #[test]
  fn test_read_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&encode(&MoWriterOptions::default())).unwrap();
    file.flush().unwrap();

    let mut opened = fs::File::open(file.path()).unwrap();
    let mo_file = read(&mut opened, "messages.mo").unwrap();
    assert_eq!(mo_file.messages.len(), 3);
  }
}
