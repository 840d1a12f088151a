//! Languages that ship with Sapwood.
//!
//! Each language is compiled from its grammar source on first use and
//! shared afterwards; cloning a [`Language`] is cheap.
//!
//! ```ignore
//! let language = sapwood_langs::from_ext("cbnf").unwrap();
//! let tree = Parser::new(language).parse("greeting { \"hello\" name }", None).into_tree();
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use std::sync::LazyLock;

use sapwood_runtime::Language;

pub mod cbnf;

#[cfg(test)]
mod lib_tests;

macro_rules! define_langs {
    (
        $(
            $fn_name:ident => {
                language: $language:expr,
                names: [$($alias:literal),* $(,)?],
                extensions: [$($ext:literal),* $(,)?] $(,)?
            }
        ),* $(,)?
    ) => {
        $(
            pub fn $fn_name() -> Language {
                static LANG: LazyLock<Language> = LazyLock::new(|| $language);
                Language::clone(&LANG)
            }
        )*

        /// Looks a language up by name or alias, ignoring case.
        pub fn from_name(s: &str) -> Option<Language> {
            match s.to_ascii_lowercase().as_str() {
                $($($alias)|* => Some($fn_name()),)*
                _ => None,
            }
        }

        /// Looks a language up by file extension, without the dot.
        pub fn from_ext(ext: &str) -> Option<Language> {
            match ext.to_ascii_lowercase().as_str() {
                $($($ext)|* => Some($fn_name()),)*
                _ => None,
            }
        }

        pub fn all() -> Vec<Language> {
            vec![$($fn_name(),)*]
        }
    };
}

define_langs! {
    cbnf => {
        language: cbnf::language(),
        names: ["cbnf"],
        extensions: ["cbnf"],
    },
}
