//! C and C++ language support via ast-grep-language.
//!
//! The grammars come from `SupportLang::C` and `SupportLang::Cpp` instead of
//! separate tree-sitter grammar crates, so the grammar version always matches
//! the tree-sitter runtime ast-grep is built against.

use ast_grep_language::{LanguageExt, SupportLang};
use std::fmt;
use std::path::Path;

/// Input dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    C,
    #[default]
    Cpp,
}

impl Dialect {
    /// Infer from a file extension: `.c` and `.h` are C, anything else C++.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("c") | Some("h") => Dialect::C,
            _ => Dialect::Cpp,
        }
    }

    pub fn support_lang(&self) -> SupportLang {
        match self {
            Dialect::C => SupportLang::C,
            Dialect::Cpp => SupportLang::Cpp,
        }
    }

    pub fn ts_language(&self) -> tree_sitter::Language {
        self.support_lang().get_ts_language()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::C => "c",
            Dialect::Cpp => "cpp",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialect_from_extension() {
        assert_eq!(Dialect::from_path(Path::new("main.c")), Dialect::C);
        assert_eq!(Dialect::from_path(Path::new("include/api.h")), Dialect::C);
        assert_eq!(Dialect::from_path(Path::new("foobar.cpp")), Dialect::Cpp);
        assert_eq!(Dialect::from_path(Path::new("widget.hpp")), Dialect::Cpp);
        assert_eq!(Dialect::from_path(Path::new("no_extension")), Dialect::Cpp);
    }

    #[test]
    fn dialect_display() {
        assert_eq!(Dialect::C.to_string(), "c");
        assert_eq!(Dialect::Cpp.to_string(), "cpp");
    }

    #[test]
    fn grammars_load() {
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&Dialect::C.ts_language()).unwrap();
        parser.set_language(&Dialect::Cpp.ts_language()).unwrap();
    }
}
