//! Size profile of the files at HEAD.

use super::language::{distribution, LanguageTable};
use crate::model::{CodeSnapshot, FileSize, SizeDistribution};
use std::collections::HashMap;

/// Upper bound (exclusive) of the small band, in lines.
pub const SMALL_FILE_LINES: u64 = 100;
/// Upper bound (exclusive) of the medium band, in lines.
pub const MEDIUM_FILE_LINES: u64 = 500;

pub fn summarize(mut files: Vec<FileSize>, languages: &LanguageTable) -> CodeSnapshot {
    let mut sizes = SizeDistribution::default();
    let mut language_lines: HashMap<String, u64> = HashMap::new();
    let mut total_lines = 0u64;

    for file in &files {
        total_lines += file.lines;
        match file.lines {
            n if n < SMALL_FILE_LINES => sizes.small += 1,
            n if n < MEDIUM_FILE_LINES => sizes.medium += 1,
            _ => sizes.large += 1,
        }
        *language_lines
            .entry(languages.classify(&file.path).to_string())
            .or_default() += file.lines;
    }

    files.sort_by(|a, b| b.lines.cmp(&a.lines).then_with(|| a.path.cmp(&b.path)));
    let total_files = files.len() as u64;
    let average_lines = if total_files == 0 {
        0.0
    } else {
        total_lines as f64 / total_files as f64
    };

    CodeSnapshot {
        total_files,
        total_lines,
        average_lines,
        size_distribution: sizes,
        languages: distribution(language_lines),
        files,
    }
}
