//! occupied cells as a flat packed bit vector, index = row * width + col
//! fingerprint maintained incrementally on every insert/remove

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::{BoardConfig, ConfigError};

/// splitmix64 finalizer - per-cell Zobrist key without a fixed-size table,
/// so any board dimensions hash deterministically across runs.
#[inline(always)]
pub(crate) const fn zobrist_key(index: u64) -> u64 {
    let mut z = index.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

const WORD_BITS: usize = 64;

/// width x height set of occupied cells.
/// Row 0 is the top, row `height - 1` the bottom.
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct CellSet {
    width: usize,
    height: usize,
    words: Vec<u64>,
    hash: u64,
}

impl CellSet {
    pub fn new(width: usize, height: usize) -> Self {
        let bits = width * height;
        Self {
            width,
            height,
            words: vec![0; bits.div_ceil(WORD_BITS)],
            hash: 0,
        }
    }

    pub fn with_config(config: BoardConfig) -> Self {
        Self::new(config.width, config.height)
    }

    #[inline(always)]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline(always)]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Incremental Zobrist fingerprint - O(1), no recomputation
    #[inline(always)]
    pub fn fingerprint(&self) -> u64 {
        self.hash
    }

    #[inline(always)]
    pub fn index(&self, col: i32, row: i32) -> Option<usize> {
        if col < 0 || row < 0 || col as usize >= self.width || row as usize >= self.height {
            return None;
        }
        Some(row as usize * self.width + col as usize)
    }

    #[inline(always)]
    pub fn contains(&self, index: usize) -> bool {
        (self.words[index / WORD_BITS] >> (index % WORD_BITS)) & 1 == 1
    }

    /// false for anything off the board
    #[inline]
    pub fn contains_cell(&self, col: i32, row: i32) -> bool {
        self.index(col, row).is_some_and(|i| self.contains(i))
    }

    #[inline]
    pub fn insert(&mut self, index: usize) {
        let mask = 1u64 << (index % WORD_BITS);
        let word = &mut self.words[index / WORD_BITS];
        if *word & mask == 0 {
            *word |= mask;
            self.hash ^= zobrist_key(index as u64);
        }
    }

    #[inline]
    pub fn remove(&mut self, index: usize) {
        let mask = 1u64 << (index % WORD_BITS);
        let word = &mut self.words[index / WORD_BITS];
        if *word & mask != 0 {
            *word &= !mask;
            self.hash ^= zobrist_key(index as u64);
        }
    }

    /// Returns false (and changes nothing) when the cell is off the board.
    pub fn insert_cell(&mut self, col: i32, row: i32) -> bool {
        match self.index(col, row) {
            Some(i) => {
                self.insert(i);
                true
            }
            None => false,
        }
    }

    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Words per row in the serialized form.
    #[inline]
    fn row_words_len(&self) -> usize {
        self.width.div_ceil(WORD_BITS)
    }

    /// Row packed into 64-column words: bit `x % 64` of word `x / 64` is
    /// column `x`.
    pub fn row_words(&self, row: usize) -> Vec<u64> {
        let start = row * self.width;
        let mut words = vec![0u64; self.row_words_len()];
        for x in (0..self.width).filter(|&x| self.contains(start + x)) {
            words[x / WORD_BITS] |= 1 << (x % WORD_BITS);
        }
        words
    }

    pub fn row_count(&self, row: usize) -> usize {
        let start = row * self.width;
        (start..start + self.width).filter(|&i| self.contains(i)).count()
    }

    pub fn is_row_full(&self, row: usize) -> bool {
        let start = row * self.width;
        (start..start + self.width).all(|i| self.contains(i))
    }

    /// Set indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(w, &word)| {
            let mut bits = word;
            std::iter::from_fn(move || {
                if bits == 0 {
                    return None;
                }
                let b = bits.trailing_zeros() as usize;
                bits &= bits - 1; // clear lowest set bit
                Some(w * WORD_BITS + b)
            })
        })
    }

    /// Remove every full row, shifting everything above it down.
    ///
    /// Single bottom-up compaction pass: a non-full row is reinserted
    /// `eliminated * width` bits further along, a full row only bumps
    /// `eliminated`. Returns the compacted set and the number of rows removed.
    pub fn clear_full_rows(&self) -> (CellSet, usize) {
        let mut out = CellSet::new(self.width, self.height);
        let mut eliminated = 0usize;
        for row in (0..self.height).rev() {
            if self.is_row_full(row) {
                eliminated += 1;
                continue;
            }
            let start = row * self.width;
            let shift = eliminated * self.width;
            for i in (start..start + self.width).filter(|&i| self.contains(i)) {
                out.insert(i + shift);
            }
        }
        (out, eliminated)
    }

    /// Rebuild from `row_words` output concatenated row by row.
    fn from_rows(width: usize, height: usize, rows: &[u64]) -> Result<Self, ConfigError> {
        BoardConfig { width, height }.validate()?;
        let mut set = CellSet::new(width, height);
        let per_row = set.row_words_len();
        if rows.len() != height * per_row {
            return Err(ConfigError::RowCount {
                expected: height * per_row,
                actual: rows.len(),
            });
        }
        // bits past the last column must be clear
        let tail = width % WORD_BITS;
        for (row, words) in rows.chunks(per_row).enumerate() {
            if let Some(&last) = words.last() {
                if tail != 0 && last >> tail != 0 {
                    return Err(ConfigError::RowOverflow { row });
                }
            }
            for x in (0..width).filter(|&x| (words[x / WORD_BITS] >> (x % WORD_BITS)) & 1 == 1) {
                set.insert(row * width + x);
            }
        }
        Ok(set)
    }
}

#[derive(Serialize, Deserialize)]
struct CellSetRepr {
    width: usize,
    height: usize,
    rows: Vec<u64>,
}

impl Serialize for CellSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        CellSetRepr {
            width: self.width,
            height: self.height,
            rows: (0..self.height).flat_map(|y| self.row_words(y)).collect(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CellSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let repr = CellSetRepr::deserialize(deserializer)?;
        CellSet::from_rows(repr.width, repr.height, &repr.rows).map_err(serde::de::Error::custom)
    }
}
