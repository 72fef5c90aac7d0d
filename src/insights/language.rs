use crate::model::LanguageShare;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

pub const OTHER_LANGUAGE: &str = "Other";

const EXTENSION_LANGUAGES: &[(&str, &str)] = &[
    ("rs", "Rust"),
    ("py", "Python"),
    ("pyi", "Python"),
    ("ipynb", "Jupyter Notebook"),
    ("go", "Go"),
    ("js", "JavaScript"),
    ("mjs", "JavaScript"),
    ("cjs", "JavaScript"),
    ("jsx", "JavaScript"),
    ("ts", "TypeScript"),
    ("mts", "TypeScript"),
    ("cts", "TypeScript"),
    ("tsx", "TypeScript"),
    ("java", "Java"),
    ("kt", "Kotlin"),
    ("kts", "Kotlin"),
    ("scala", "Scala"),
    ("c", "C"),
    ("h", "C"),
    ("cc", "C++"),
    ("cpp", "C++"),
    ("cxx", "C++"),
    ("hpp", "C++"),
    ("hh", "C++"),
    ("hxx", "C++"),
    ("cs", "C#"),
    ("fs", "F#"),
    ("swift", "Swift"),
    ("m", "Objective-C"),
    ("rb", "Ruby"),
    ("rake", "Ruby"),
    ("php", "PHP"),
    ("pl", "Perl"),
    ("lua", "Lua"),
    ("r", "R"),
    ("jl", "Julia"),
    ("dart", "Dart"),
    ("ex", "Elixir"),
    ("exs", "Elixir"),
    ("erl", "Erlang"),
    ("hs", "Haskell"),
    ("ml", "OCaml"),
    ("clj", "Clojure"),
    ("zig", "Zig"),
    ("sh", "Shell"),
    ("bash", "Shell"),
    ("zsh", "Shell"),
    ("ps1", "PowerShell"),
    ("sql", "SQL"),
    ("html", "HTML"),
    ("htm", "HTML"),
    ("css", "CSS"),
    ("scss", "SCSS"),
    ("sass", "SCSS"),
    ("less", "Less"),
    ("vue", "Vue"),
    ("svelte", "Svelte"),
    ("md", "Markdown"),
    ("markdown", "Markdown"),
    ("rst", "reStructuredText"),
    ("txt", "Text"),
    ("json", "JSON"),
    ("yaml", "YAML"),
    ("yml", "YAML"),
    ("toml", "TOML"),
    ("xml", "XML"),
    ("proto", "Protocol Buffers"),
    ("tf", "HCL"),
    ("hcl", "HCL"),
    ("nix", "Nix"),
];

const FILENAME_LANGUAGES: &[(&str, &str)] = &[
    ("makefile", "Makefile"),
    ("gnumakefile", "Makefile"),
    ("dockerfile", "Dockerfile"),
    ("cmakelists.txt", "CMake"),
];

/// Extension to language lookup: the built-in table plus configured overrides.
#[derive(Debug, Clone)]
pub struct LanguageTable {
    by_extension: HashMap<String, String>,
}

impl LanguageTable {
    pub fn new(overrides: &BTreeMap<String, String>) -> Self {
        let mut by_extension: HashMap<String, String> = EXTENSION_LANGUAGES
            .iter()
            .map(|(ext, lang)| (ext.to_string(), lang.to_string()))
            .collect();
        for (ext, lang) in overrides {
            let ext = ext.trim_start_matches('.').to_lowercase();
            by_extension.insert(ext, lang.clone());
        }
        Self { by_extension }
    }

    pub fn classify(&self, path: &str) -> &str {
        let path = Path::new(path);
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();

        if let Some((_, lang)) = FILENAME_LANGUAGES.iter().find(|(name, _)| *name == file_name) {
            return *lang;
        }

        path.extension()
            .and_then(|s| s.to_str())
            .and_then(|ext| self.by_extension.get(&ext.to_lowercase()))
            .map(String::as_str)
            .unwrap_or(OTHER_LANGUAGE)
    }
}

impl Default for LanguageTable {
    fn default() -> Self {
        Self::new(&BTreeMap::new())
    }
}

/// Turns per-language line totals into shares that sum to exactly 100.0.
///
/// Shares are computed in tenths of a percent and the tenths lost to flooring
/// go to the languages with the largest remainders (ties by list order).
pub fn distribution(lines_by_language: HashMap<String, u64>) -> Vec<LanguageShare> {
    let mut entries: Vec<(String, u64)> = lines_by_language
        .into_iter()
        .filter(|(_, lines)| *lines > 0)
        .collect();
    let total: u128 = entries.iter().map(|(_, lines)| *lines as u128).sum();
    if total == 0 {
        return Vec::new();
    }

    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut tenths: Vec<u128> = Vec::with_capacity(entries.len());
    let mut remainders: Vec<(usize, u128)> = Vec::with_capacity(entries.len());
    for (idx, (_, lines)) in entries.iter().enumerate() {
        let scaled = *lines as u128 * 1000;
        tenths.push(scaled / total);
        remainders.push((idx, scaled % total));
    }

    let assigned: u128 = tenths.iter().sum();
    let leftover = 1000u128.saturating_sub(assigned) as usize;
    remainders.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    for (idx, _) in remainders.into_iter().take(leftover) {
        tenths[idx] += 1;
    }

    entries
        .into_iter()
        .zip(tenths)
        .map(|((language, lines), t)| LanguageShare {
            language,
            lines,
            percentage: t as f64 / 10.0,
        })
        .collect()
}
