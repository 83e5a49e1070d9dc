const WORDS: usize = 256 / 64;

/// Set of 8-bit sequence numbers backed by a 256-bit bitfield.
///
/// Inserting the same sequence twice is a no-op, so a request list with
/// repeats collapses to its distinct members.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SequenceSet {
    bits: [u64; WORDS],
    len: u16,
}

impl SequenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from a request list, dropping duplicates.
    pub fn from_slice(sequences: &[u8]) -> Self {
        let mut set = Self::new();
        for &seq in sequences {
            set.insert(seq);
        }
        set
    }

    /// Add a sequence. Returns true if it was not already present.
    #[inline]
    pub fn insert(&mut self, seq: u8) -> bool {
        let (word, mask) = slot(seq);
        if self.bits[word] & mask != 0 {
            return false;
        }
        self.bits[word] |= mask;
        self.len += 1;
        true
    }

    /// Remove a sequence. Returns true if it was present.
    #[inline]
    pub fn remove(&mut self, seq: u8) -> bool {
        let (word, mask) = slot(seq);
        if self.bits[word] & mask == 0 {
            return false;
        }
        self.bits[word] &= !mask;
        self.len -= 1;
        true
    }

    #[inline]
    pub fn contains(&self, seq: u8) -> bool {
        let (word, mask) = slot(seq);
        self.bits[word] & mask != 0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=u8::MAX).filter(move |seq| self.contains(*seq))
    }
}

impl std::fmt::Debug for SequenceSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[inline]
fn slot(seq: u8) -> (usize, u64) {
    let idx = seq as usize;
    (idx / 64, 1u64 << (idx % 64))
}
