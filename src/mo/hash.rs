//! The hash table of MO files: open addressing with double hashing, keyed
//! by the `hashpjw` hash of the msgid.

/// The `hashpjw` function from the dragon book, computed in 32 bits. Hashing
/// stops at the first NUL so that the msgid of a plural entry is used.
pub fn hash_string(text: &[u8]) -> u32 {
  const HASH_WORD_BITS: u32 = 32;
  let mut hval: u32 = 0;
  for &b in text.iter().take_while(|&&b| b != 0) {
    hval = (hval << 4).wrapping_add(b as u32);
    let g = hval & (0xf << (HASH_WORD_BITS - 4));
    if g != 0 {
      hval ^= g >> (HASH_WORD_BITS - 8);
      hval ^= g;
    }
  }
  hval
}

pub fn is_prime(n: u64) -> bool {
  if n < 4 {
    return n >= 2;
  }
  if n % 2 == 0 {
    return false;
  }
  let mut divisor = 3;
  while divisor * divisor <= n {
    if n % divisor == 0 {
      return false;
    }
    divisor += 2;
  }
  true
}

/// The smallest odd prime which is not less than `seed`.
pub fn next_prime(seed: u64) -> u64 {
  let mut n = seed | 1;
  while !is_prime(n) {
    n += 2;
  }
  n
}

/// Picks a table size keeping the load factor under 3/4. The probe
/// increment is computed modulo `size - 2`, so the size is at least 3.
pub fn table_size(entry_count: usize) -> u64 {
  next_prime(entry_count as u64 * 4 / 3).max(3)
}

/// The sequence of buckets visited when looking up a string with the hash
/// `hash` in a table of `size` buckets.
#[derive(Debug, Clone)]
pub struct ProbeSequence {
  index: u32,
  increment: u32,
  size: u32,
}

impl ProbeSequence {
  pub fn new(hash: u32, size: u32) -> Self {
    Self { index: hash % size, increment: 1 + hash % (size - 2), size }
  }
}

impl Iterator for ProbeSequence {
  type Item = u32;
  fn next(&mut self) -> Option<Self::Item> {
    let current = self.index;
    self.index = if self.index >= self.size - self.increment {
      self.index - (self.size - self.increment)
    } else {
      self.index + self.increment
    };
    Some(current)
  }
}

/// Builds the bucket array. Every bucket holds either 0, or the index of
/// the entry plus one.
pub fn build_table(keys: &[&[u8]], size: u32) -> Vec<u32> {
  let mut table = vec![0u32; size as usize];
  for (i, key) in keys.iter().enumerate() {
    let probes = ProbeSequence::new(hash_string(key), size);
    for bucket in probes {
      let slot = &mut table[bucket as usize];
      if *slot == 0 {
        *slot = i as u32 + 1;
        break;
      }
    }
  }
  table
}

/// Looks a msgid up the way the runtime does, returning the entry index.
pub fn lookup(table: &[u32], keys: &[&[u8]], msgid: &[u8]) -> Option<usize> {
  let size = table.len() as u32;
  if size < 3 {
    return None;
  }
  for bucket in ProbeSequence::new(hash_string(msgid), size).take(table.len()) {
    let entry = table[bucket as usize];
    if entry == 0 {
      return None;
    }
    let index = entry as usize - 1;
    let key = keys.get(index)?;
    let key_msgid = &key[..key.iter().position(|&b| b == 0).unwrap_or(key.len())];
    if key_msgid == msgid {
      return Some(index);
    }
  }
  None
}

#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;
  use std::collections::BTreeSet;

  #[test]
  fn test_hash_string() {
    assert_eq!(hash_string(b""), 0);
    assert_eq!(hash_string(b"a"), 0x61);
    assert_eq!(hash_string(b"ab"), 0x672);
    assert_eq!(hash_string(b"file\0files"), hash_string(b"file"));
    // Long enough for the high nibble to be folded back in.
    assert_eq!(hash_string(b"abcdefghij"), 0x0aba_a66a);
  }

  #[test]
  fn test_primes() {
    let primes: Vec<u64> = (0..30).filter(|&n| is_prime(n)).collect();
    assert_eq!(primes, vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
    assert_eq!(next_prime(0), 3);
    assert_eq!(next_prime(8), 11);
    assert_eq!(next_prime(13), 13);
    assert_eq!(table_size(0), 3);
    assert_eq!(table_size(1), 3);
    assert_eq!(table_size(3), 5);
    assert_eq!(table_size(100), 137);
  }

  #[test]
  fn test_probe_sequence_wraps() {
    let probes: Vec<u32> = ProbeSequence::new(4, 7).take(7).collect();
    assert_eq!(probes, vec![4, 2, 0, 5, 3, 1, 6]);
  }

  proptest! {
    #[test]
    fn prop_every_key_is_found(keys in prop::collection::btree_set("[a-z%. ]{0,12}", 0..200)) {
      let keys: BTreeSet<String> = keys;
      let keys: Vec<&[u8]> = keys.iter().map(|k| k.as_bytes()).collect();
      let size = table_size(keys.len()) as u32;
      let table = build_table(&keys, size);
      prop_assert_eq!(table.iter().filter(|&&b| b != 0).count(), keys.len());
      for (i, key) in keys.iter().enumerate() {
        prop_assert_eq!(lookup(&table, &keys, key), Some(i));
      }
    }
  }
}
