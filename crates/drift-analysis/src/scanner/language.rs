//! Language detection: extension first, then a small shebang/content
//! heuristic for extensionless scripts.

use serde::{Deserialize, Serialize};

/// The ten languages the engine parses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    TypeScript,
    JavaScript,
    Python,
    Java,
    CSharp,
    Go,
    Rust,
    Ruby,
    Php,
    Kotlin,
}

impl Language {
    pub const ALL: [Language; 10] = [
        Language::TypeScript,
        Language::JavaScript,
        Language::Python,
        Language::Java,
        Language::CSharp,
        Language::Go,
        Language::Rust,
        Language::Ruby,
        Language::Php,
        Language::Kotlin,
    ];

    pub fn from_extension(ext: &str) -> Option<Language> {
        match ext {
            "ts" | "tsx" | "mts" | "cts" => Some(Language::TypeScript),
            "js" | "jsx" | "mjs" | "cjs" => Some(Language::JavaScript),
            "py" | "pyi" => Some(Language::Python),
            "java" => Some(Language::Java),
            "cs" => Some(Language::CSharp),
            "go" => Some(Language::Go),
            "rs" => Some(Language::Rust),
            "rb" | "rake" | "gemspec" => Some(Language::Ruby),
            "php" => Some(Language::Php),
            "kt" | "kts" => Some(Language::Kotlin),
            _ => None,
        }
    }

    /// Content heuristic for files without a recognized extension: shebang
    /// interpreters, then a couple of unmistakable first-line markers.
    pub fn from_content(content: &str) -> Option<Language> {
        let first_line = content.lines().next()?.trim();
        if let Some(shebang) = first_line.strip_prefix("#!") {
            if shebang.contains("python") {
                return Some(Language::Python);
            }
            if shebang.contains("node") {
                return Some(Language::JavaScript);
            }
            if shebang.contains("ruby") {
                return Some(Language::Ruby);
            }
            if shebang.contains("php") {
                return Some(Language::Php);
            }
            return None;
        }
        if first_line.starts_with("<?php") {
            return Some(Language::Php);
        }
        None
    }

    pub fn detect(ext: Option<&str>, content: &str) -> Option<Language> {
        ext.and_then(Self::from_extension)
            .or_else(|| Self::from_content(content))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::Java => "java",
            Language::CSharp => "csharp",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::Ruby => "ruby",
            Language::Php => "php",
            Language::Kotlin => "kotlin",
        }
    }

    pub fn parse_name(name: &str) -> Option<Language> {
        match name {
            "typescript" => Some(Language::TypeScript),
            "javascript" => Some(Language::JavaScript),
            "python" => Some(Language::Python),
            "java" => Some(Language::Java),
            "csharp" | "c#" => Some(Language::CSharp),
            "go" => Some(Language::Go),
            "rust" => Some(Language::Rust),
            "ruby" => Some(Language::Ruby),
            "php" => Some(Language::Php),
            "kotlin" => Some(Language::Kotlin),
            _ => None,
        }
    }

    /// Languages sharing a runtime family resolve against each other; the
    /// rest never cross-resolve.
    pub fn family(&self) -> u8 {
        match self {
            Language::TypeScript | Language::JavaScript => 1,
            Language::Python => 2,
            Language::Java | Language::Kotlin => 3,
            Language::CSharp => 4,
            Language::Go => 5,
            Language::Rust => 6,
            Language::Ruby => 7,
            Language::Php => 8,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_beats_content() {
        let lang = Language::detect(Some("py"), "#!/usr/bin/env node\n");
        assert_eq!(lang, Some(Language::Python));
    }

    #[test]
    fn shebang_fallback() {
        let lang = Language::detect(None, "#!/usr/bin/env python3\nprint('hi')\n");
        assert_eq!(lang, Some(Language::Python));
    }

    #[test]
    fn php_open_tag() {
        assert_eq!(Language::from_content("<?php echo 1;"), Some(Language::Php));
    }

    #[test]
    fn name_round_trip() {
        for lang in Language::ALL {
            assert_eq!(Language::parse_name(lang.name()), Some(lang));
        }
    }
}
