use crc32fast::Hasher;

/// Derive a stable session seed from a session name using CRC32
pub fn get_session_seed(name: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(name.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential ID generator for nodes within an editing session
///
/// Ids never repeat for the lifetime of the generator, so objects created
/// after an undo cannot collide with ids held in older snapshots.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String, // Session seed (CRC32)
    count: u64,   // Sequential counter
}

impl IdGenerator {
    pub fn new(session_name: &str) -> Self {
        Self {
            seed: get_session_seed(session_name),
            count: 0,
        }
    }

    pub fn from_seed(seed: String) -> Self {
        Self { seed, count: 0 }
    }

    /// Generate next sequential ID
    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    /// Skip past every id already present in restored content
    pub fn advance_past<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        let prefix = format!("{}-", self.seed);
        for id in ids {
            if let Some(n) = id.strip_prefix(&prefix).and_then(|n| n.parse::<u64>().ok()) {
                self.count = self.count.max(n);
            }
        }
    }

    /// Get session seed
    pub fn seed(&self) -> &str {
        &self.seed
    }
}
