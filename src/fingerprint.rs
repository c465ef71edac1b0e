//! Content fingerprints for cache keys.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::model::{CandidateSite, DemandPoint};

/// SHA-256 digest of canonically encoded content.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", &self.to_hex()[..12])
    }
}

/// Incremental builder. Every field is length- or width-prefixed so distinct
/// field sequences never collide by concatenation.
pub struct Fingerprinter {
    hasher: Sha256,
}

impl Fingerprinter {
    pub fn new(domain: &str) -> Self {
        let mut fingerprinter = Self {
            hasher: Sha256::new(),
        };
        fingerprinter.str(domain);
        fingerprinter
    }

    pub fn str(&mut self, value: &str) -> &mut Self {
        self.u64(value.len() as u64);
        self.hasher.update(value.as_bytes());
        self
    }

    pub fn u64(&mut self, value: u64) -> &mut Self {
        self.hasher.update(value.to_le_bytes());
        self
    }

    /// Floats hash by bit pattern, so `0.0` and `-0.0` differ.
    pub fn f64(&mut self, value: f64) -> &mut Self {
        self.u64(value.to_bits())
    }

    pub fn finish(self) -> Fingerprint {
        let digest = self.hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Fingerprint(bytes)
    }
}

/// Types that can feed their content into a [`Fingerprinter`].
pub trait ContentHash {
    fn content_hash(&self, fp: &mut Fingerprinter);
}

impl ContentHash for DemandPoint {
    fn content_hash(&self, fp: &mut Fingerprinter) {
        fp.str(&self.id).f64(self.lat).f64(self.lon).f64(self.population);
    }
}

impl ContentHash for CandidateSite {
    fn content_hash(&self, fp: &mut Fingerprinter) {
        fp.str(&self.id)
            .str(&self.name)
            .str(&self.category)
            .f64(self.lat)
            .f64(self.lon);
    }
}

impl<T: ContentHash> ContentHash for [T] {
    fn content_hash(&self, fp: &mut Fingerprinter) {
        fp.u64(self.len() as u64);
        for item in self {
            item.content_hash(fp);
        }
    }
}

/// Fingerprint of a full demand + candidate table pair.
pub fn fingerprint_tables(demand: &[DemandPoint], sites: &[CandidateSite]) -> Fingerprint {
    let mut fp = Fingerprinter::new("tables");
    demand.content_hash(&mut fp);
    sites.content_hash(&mut fp);
    fp.finish()
}

/// Fingerprint of one solve's inputs. Order-sensitive, since input order
/// drives tie-breaking.
pub fn fingerprint_request(
    demand: &[DemandPoint],
    sites: &[CandidateSite],
    radius_miles: f64,
    k: usize,
) -> Fingerprint {
    let mut fp = Fingerprinter::new("solve");
    demand.content_hash(&mut fp);
    sites.content_hash(&mut fp);
    fp.f64(radius_miles).u64(k as u64);
    fp.finish()
}
