use crate::store::LineStore;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct PayloadSet {
    pub name: String,
    pub payloads: Vec<String>,
}

impl PayloadSet {
    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }
}

/// One payload per non-blank line. An unreadable file yields an empty set.
pub fn load_payloads<P: AsRef<Path>>(path: P) -> PayloadSet {
    let payloads = LineStore::new(&path).read_or_empty();

    let name = path
        .as_ref()
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "payloads".to_string());

    PayloadSet { name, payloads }
}
