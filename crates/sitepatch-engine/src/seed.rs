//! Reproducible random streams keyed by strings.
//!
//! A key is hashed with SHA-256 and the first eight digest bytes seed a ChaCha8
//! generator, whose output is stable across platforms and crate releases. The
//! same key therefore yields the same draws in every run.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

/// What a stream is used for. Each purpose prefixes the key before hashing so
/// one page gets independent streams per synthesized field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Purpose {
    Title,
    Description,
    Paragraph,
    Keyword,
    CategoryDescription,
    Slogan,
}

impl Purpose {
    pub const ALL: [Purpose; 6] = [
        Purpose::Title,
        Purpose::Description,
        Purpose::Paragraph,
        Purpose::Keyword,
        Purpose::CategoryDescription,
        Purpose::Slogan,
    ];

    pub fn prefix(self) -> &'static str {
        match self {
            Purpose::Title => "t::",
            Purpose::Description => "d::",
            Purpose::Paragraph => "p::",
            Purpose::Keyword => "kw::",
            Purpose::CategoryDescription => "cd::",
            Purpose::Slogan => "sl::",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Purpose::Title => "title",
            Purpose::Description => "description",
            Purpose::Paragraph => "paragraph",
            Purpose::Keyword => "keyword",
            Purpose::CategoryDescription => "category_description",
            Purpose::Slogan => "slogan",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RandomStream {
    rng: ChaCha8Rng,
    seed: u64,
}

/// Stream for a raw key.
pub fn stream(key: &str) -> RandomStream {
    let digest = Sha256::digest(key.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    let seed = u64::from_be_bytes(prefix);
    RandomStream {
        rng: ChaCha8Rng::seed_from_u64(seed),
        seed,
    }
}

/// Stream for `key` under a purpose tag.
pub fn stream_for(purpose: Purpose, key: &str) -> RandomStream {
    stream(&format!("{}{}", purpose.prefix(), key))
}

impl RandomStream {
    /// Uniform index in `0..len`, `None` for an empty range.
    pub fn index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.rng.gen_range(0..len))
    }

    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        let idx = self.index(items.len())?;
        items.get(idx)
    }

    /// Like [`RandomStream::choose`] for string pools, empty string when the pool is empty.
    pub fn choose_str<'a>(&mut self, items: &'a [String]) -> &'a str {
        self.choose(items).map(String::as_str).unwrap_or("")
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Hex form of the seed, handy for logging which stream produced a draw.
    pub fn fingerprint(&self) -> String {
        hex::encode(self.seed.to_be_bytes())
    }
}
