use std::fmt::{self, Debug, Display, Formatter};

/// Stack-allocated element symbol, up to three ASCII letters.
///
/// Symbols that aren't in the valence table are still representable, so an unknown element can be
/// drawn.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol {
    buf: [u8; 3],
    len: u8,
}
impl Symbol {
    /// Build a symbol at compile time. Panics (at compile time, in a const context) on anything
    /// that isn't one to three ASCII letters.
    pub const fn from_static(sym: &'static str) -> Self {
        let bytes = sym.as_bytes();
        assert!(!bytes.is_empty() && bytes.len() <= 3, "symbols have one to three letters");
        let mut buf = [0u8; 3];
        let mut i = 0;
        while i < bytes.len() {
            assert!(bytes[i].is_ascii_alphabetic(), "symbols are ASCII letters");
            buf[i] = bytes[i];
            i += 1;
        }
        Self {
            buf,
            len: bytes.len() as u8,
        }
    }
    pub fn new(sym: &str) -> Option<Self> {
        let bytes = sym.as_bytes();
        (!bytes.is_empty() && bytes.len() <= 3 && bytes.iter().all(u8::is_ascii_alphabetic)).then(
            || {
                let mut buf = [0u8; 3];
                buf[..bytes.len()].copy_from_slice(bytes);
                Self {
                    buf,
                    len: bytes.len() as u8,
                }
            },
        )
    }
    pub fn as_str(&self) -> &str {
        // only ASCII letters ever get in
        std::str::from_utf8(&self.buf[..(self.len as usize)]).unwrap_or_default()
    }
}
impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
impl Debug for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(self.as_str(), f)
    }
}

/// A wrapper around a byte that prints escape codes.
///
/// The `Display` impl substitutes `\n`, `\r`, `\t`, and hex codes, and wraps the output in single quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextByte(pub u8);
impl Display for TextByte {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.0 {
            c @ 32..=126 => write!(f, "'{}'", c as char),
            b'\n' => f.write_str("'\\n'"),
            b'\r' => f.write_str("'\\r'"),
            b'\t' => f.write_str("'\\t'"),
            _ => write!(f, "'\\x{:0>2x}'", self.0),
        }
    }
}

/// Index printer that doesn't allocate.
///
/// If it holds `usize::MAX`, prints "end of input", else "byte {n}"
pub struct IdxPrint(pub usize);
impl Display for IdxPrint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0 == usize::MAX {
            f.write_str("end of input")
        } else {
            write!(f, "byte {}", self.0)
        }
    }
}
