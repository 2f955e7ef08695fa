use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// A document's position in the corpus array, stable for the process lifetime.
pub type DocId = usize;

/// One coding-practice problem as stored in the corpus file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub url: String,
}

impl Problem {
    /// Text fed to the indexer. The title is counted twice so title terms
    /// outweigh description terms.
    pub fn indexable_text(&self) -> String {
        format!(
            "{} {} {}",
            self.title,
            self.title,
            self.description.as_deref().unwrap_or("")
        )
    }

    /// Hosting platform derived from the URL. The corpus only ever holds
    /// problems from these two sites.
    pub fn platform(&self) -> &'static str {
        if self.url.contains("leetcode.com") {
            "LeetCode"
        } else {
            "Codeforces"
        }
    }
}

/// Load the corpus from a JSON array file. Any failure here is fatal at
/// startup; the server must not come up with a partially loaded corpus.
pub fn load_problems<P: AsRef<Path>>(path: P) -> Result<Vec<Problem>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("opening corpus file {}", path.display()))?;
    let problems: Vec<Problem> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing corpus file {}", path.display()))?;
    Ok(problems)
}
