//! Parser options and TOML grammar-version handling.

#[cfg(test)]
#[path = "./options_tests.rs"]
mod tests;

/// A resolved TOML grammar version.
///
/// The two versions differ in escape sequences, the unquoted-key charset,
/// the comment charset, inline-table line-breaking and trailing-comma rules,
/// and omitted-seconds time literals.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum TomlVersion {
    /// TOML 1.0.0.
    V1_0,
    /// TOML 1.1.
    #[default]
    V1_1,
}

impl TomlVersion {
    /// Resolves a version option string to a concrete version.
    ///
    /// Accepts `"1.0"`, `"1.0.0"`, `"1.1"`, `"1.1.0"`, `"latest"` and
    /// `"next"`. Anything else falls back to the default (`latest`).
    pub fn resolve(option: Option<&str>) -> TomlVersion {
        match option {
            Some("1.0") | Some("1.0.0") => TomlVersion::V1_0,
            Some("1.1") | Some("1.1.0") | Some("next") => TomlVersion::V1_1,
            Some("latest") | Some(_) | None => TomlVersion::default(),
        }
    }

    /// `\e` and `\xHH` escapes in basic strings.
    #[inline]
    pub(crate) fn allows_extended_escapes(self) -> bool {
        self == TomlVersion::V1_1
    }

    /// Control characters in the raw byte stream of a comment.
    #[inline]
    pub(crate) fn allows_control_chars_in_comments(self) -> bool {
        self == TomlVersion::V1_1
    }

    /// Newlines between the braces of an inline table.
    #[inline]
    pub(crate) fn allows_newlines_in_inline_tables(self) -> bool {
        self == TomlVersion::V1_1
    }

    /// A trailing comma before the closing brace of an inline table.
    #[inline]
    pub(crate) fn allows_trailing_comma_in_inline_tables(self) -> bool {
        self == TomlVersion::V1_1
    }

    /// Whether a dot in a dotted key must be followed by another key part.
    ///
    /// Under 1.0 a dangling dot just ends the key and the surrounding
    /// construct reports whatever it was expecting next.
    #[inline]
    pub(crate) fn requires_key_part_after_dot(self) -> bool {
        self == TomlVersion::V1_1
    }

    /// `HH:MM` time literals with the seconds omitted.
    #[inline]
    pub(crate) fn allows_omitted_seconds(self) -> bool {
        self == TomlVersion::V1_1
    }

    /// Whether `cp` may appear in an unquoted key under this version.
    #[inline]
    pub(crate) fn is_bare_key_char(self, cp: char) -> bool {
        if cp.is_ascii_alphanumeric() || cp == '-' || cp == '_' {
            return true;
        }
        self == TomlVersion::V1_1 && is_unicode_bare_key_char(cp)
    }
}

/// Options accepted by [`parse`](crate::parse).
#[derive(Clone, Debug, Default)]
pub struct ParserOptions {
    /// Path of the parsed file. Opaque to the parser; carried for error
    /// context by lint-tool collaborators.
    pub file_path: Option<String>,
    /// Requested grammar version; see [`TomlVersion::resolve`].
    pub toml_version: Option<String>,
}

impl ParserOptions {
    /// The concrete grammar version these options select.
    pub fn version(&self) -> TomlVersion {
        TomlVersion::resolve(self.toml_version.as_deref())
    }
}

/// The Unicode ranges the TOML 1.1 grammar adds to unquoted keys:
/// superscript and fraction digits, Latin-1 supplement letters, most of the
/// BMP letter blocks, ZWNJ/ZWJ and the undertie/character-tie pair, enclosed
/// alphanumerics, CJK and letterlike blocks, and every supplementary-plane
/// character outside the private-use planes.
fn is_unicode_bare_key_char(cp: char) -> bool {
    let cp = cp as u32;
    matches!(cp,
        0xB2 | 0xB3 | 0xB9
        | 0xBC..=0xBE
        | 0xC0..=0xD6
        | 0xD8..=0xF6
        | 0xF8..=0x37D
        | 0x37F..=0x1FFF
        | 0x200C..=0x200D
        | 0x203F..=0x2040
        | 0x2070..=0x218F
        | 0x2460..=0x24FF
        | 0x2C00..=0x2FEF
        | 0x3001..=0xD7FF
        | 0xF900..=0xFDCF
        | 0xFDF0..=0xFFFD
        | 0x10000..=0xEFFFF)
}
