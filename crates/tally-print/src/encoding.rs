//! Printer code pages
//!
//! Thermal printers do not speak UTF-8. Text is encoded into the code page
//! the printer has been switched to, one byte (or two, for GBK) per
//! character, and column widths are measured in those bytes.
//!
//! Characters the code page cannot represent print as a single `?`, so a
//! line's width never depends on whether its characters were mappable.

use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};

const ESC: u8 = 0x1B;
const FS: u8 = 0x1C;

/// Character table selected on the printer after every reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodePage {
    /// Western European (WPC1252). Covers accented Latin menu names.
    #[default]
    Wpc1252,
    /// Cyrillic (PC866).
    Cp866,
    /// Simplified Chinese, double-byte.
    Gbk,
}

impl CodePage {
    fn encoding(self) -> &'static Encoding {
        match self {
            CodePage::Wpc1252 => encoding_rs::WINDOWS_1252,
            CodePage::Cp866 => encoding_rs::IBM866,
            CodePage::Gbk => encoding_rs::GBK,
        }
    }

    /// Bytes that switch the printer to this code page.
    pub fn select_bytes(self) -> &'static [u8] {
        match self {
            // ESC t 16
            CodePage::Wpc1252 => &[ESC, 0x74, 16],
            // ESC t 17
            CodePage::Cp866 => &[ESC, 0x74, 17],
            // FS & - Chinese character mode
            CodePage::Gbk => &[FS, 0x26],
        }
    }

    /// Appends `text` in this code page to `buf`.
    ///
    /// Control characters and unmappable characters become `?`.
    pub fn encode_into(self, text: &str, buf: &mut Vec<u8>) {
        let encoding = self.encoding();
        let mut scratch = [0u8; 4];
        for c in text.chars() {
            if c.is_control() {
                buf.push(b'?');
                continue;
            }
            // Without this check the encoder would emit an HTML "&#NNNN;"
            // reference for unmappable characters.
            let (bytes, _, had_errors) = encoding.encode(c.encode_utf8(&mut scratch));
            if had_errors {
                buf.push(b'?');
            } else {
                buf.extend_from_slice(&bytes);
            }
        }
    }

    pub fn encode(self, text: &str) -> Vec<u8> {
        let mut buf = Vec::with_capacity(text.len());
        self.encode_into(text, &mut buf);
        buf
    }

    /// Printed width of `text` in columns.
    pub fn width(self, text: &str) -> usize {
        self.encode(text).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wpc1252_keeps_accented_names() {
        assert_eq!(CodePage::Wpc1252.encode("Crème brûlée"), b"Cr\xE8me br\xFBl\xE9e".to_vec());
        assert_eq!(CodePage::Wpc1252.width("Crème brûlée"), 12);
    }

    #[test]
    fn test_unmappable_is_one_column() {
        // Devanagari has no WPC1252 mapping.
        assert_eq!(CodePage::Wpc1252.encode("मोमो x2"), b"???? x2".to_vec());
        assert_eq!(CodePage::Wpc1252.width("मोमो"), 4);
    }

    #[test]
    fn test_control_characters_are_replaced() {
        assert_eq!(CodePage::Wpc1252.encode("a\tb\n"), b"a?b?".to_vec());
    }

    #[test]
    fn test_gbk_is_double_width() {
        assert_eq!(CodePage::Gbk.width("AB中文"), 6);
        let encoded = CodePage::Gbk.encode("饺子 2");
        let (decoded, _, _) = encoding_rs::GBK.decode(&encoded);
        assert_eq!(decoded, "饺子 2");
    }

    #[test]
    fn test_cp866_round_trip() {
        let bytes = CodePage::Cp866.encode("Борщ");
        assert_eq!(bytes.len(), 4);
        let (decoded, _, _) = encoding_rs::IBM866.decode(&bytes);
        assert_eq!(decoded, "Борщ");
    }

    #[test]
    fn test_config_spelling() {
        let page: CodePage = serde_json::from_str("\"gbk\"").unwrap();
        assert_eq!(page, CodePage::Gbk);
    }
}
