//! ESC/POS encoding
//!
//! Turns print primitives into the byte stream thermal printers understand,
//! for transports whose platform side only offers "write these bytes".

use tracing::instrument;

use crate::encoding::CodePage;
use crate::error::PrinterResult;
use crate::job::{Alignment, FontSize, PrintCommand, PrintJob, TextStyle};
use crate::transport::{BluetoothTransport, Device};

const ESC: u8 = 0x1B;
const GS: u8 = 0x1D;

/// Appends the bytes for one primitive to `buf`.
///
/// A reset also drops the printer's code page, so `Init` re-selects it.
pub fn encode_command(command: &PrintCommand, code_page: CodePage, buf: &mut Vec<u8>) {
    match command {
        // ESC @ - Initialize printer
        PrintCommand::Init => {
            buf.extend_from_slice(&[ESC, 0x40]);
            buf.extend_from_slice(code_page.select_bytes());
        }
        PrintCommand::Align(alignment) => encode_align(*alignment, buf),
        PrintCommand::SetFont(style) => encode_style(*style, buf),
        PrintCommand::WriteText(text) => encode_text(text, code_page, buf),
        // ESC d n - Print and feed n lines
        PrintCommand::Feed(lines) => buf.extend_from_slice(&[ESC, 0x64, *lines]),
    }
}

/// Encodes a whole job.
#[instrument(skip(job), fields(kind = %job.kind(), commands = job.len()))]
pub fn encode_job(job: &PrintJob, code_page: CodePage) -> Vec<u8> {
    let mut buf = Vec::with_capacity(512);
    for command in job.commands() {
        encode_command(command, code_page, &mut buf);
    }
    buf
}

fn encode_align(alignment: Alignment, buf: &mut Vec<u8>) {
    // ESC a n
    let n = match alignment {
        Alignment::Left => 0x00,
        Alignment::Center => 0x01,
        Alignment::Right => 0x02,
    };
    buf.extend_from_slice(&[ESC, 0x61, n]);
}

fn encode_style(style: TextStyle, buf: &mut Vec<u8>) {
    // ESC E n - Bold on/off
    buf.extend_from_slice(&[ESC, 0x45, u8::from(style.bold)]);
    // GS ! n - Character size
    let n = match style.size {
        FontSize::Normal => 0x00,
        FontSize::DoubleHeight => 0x01,
        FontSize::DoubleWidth => 0x10,
        FontSize::Double => 0x11,
    };
    buf.extend_from_slice(&[GS, 0x21, n]);
}

/// Text in the selected code page, followed by LF.
fn encode_text(text: &str, code_page: CodePage, buf: &mut Vec<u8>) {
    code_page.encode_into(text, buf);
    buf.push(b'\n');
}

// =============================================================================
// Byte-stream transport
// =============================================================================

/// A platform link that can only move raw bytes.
#[allow(async_fn_in_trait)]
pub trait ByteLink {
    fn is_available(&self) -> bool;
    async fn is_enabled(&mut self) -> PrinterResult<bool>;
    async fn request_permissions(&mut self) -> PrinterResult<bool>;
    async fn scan(&mut self) -> PrinterResult<Vec<Device>>;
    async fn connect(&mut self, address: &str) -> PrinterResult<()>;
    async fn disconnect(&mut self) -> PrinterResult<()>;
    async fn write_all(&mut self, bytes: &[u8]) -> PrinterResult<()>;
}

/// [`BluetoothTransport`] over a [`ByteLink`], one write per primitive.
///
/// `write_text` carries its style, so the style bytes are re-sent only
/// when they change.
#[derive(Debug)]
pub struct EscPosTransport<L> {
    link: L,
    code_page: CodePage,
    style: TextStyle,
}

impl<L: ByteLink> EscPosTransport<L> {
    pub fn new(link: L, code_page: CodePage) -> Self {
        EscPosTransport {
            link,
            code_page,
            style: TextStyle::NORMAL,
        }
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    async fn send(&mut self, command: &PrintCommand) -> PrinterResult<()> {
        let mut buf = Vec::new();
        encode_command(command, self.code_page, &mut buf);
        self.link.write_all(&buf).await
    }
}

impl<L: ByteLink> BluetoothTransport for EscPosTransport<L> {
    fn is_available(&self) -> bool {
        self.link.is_available()
    }

    async fn is_enabled(&mut self) -> PrinterResult<bool> {
        self.link.is_enabled().await
    }

    async fn request_permissions(&mut self) -> PrinterResult<bool> {
        self.link.request_permissions().await
    }

    async fn scan(&mut self) -> PrinterResult<Vec<Device>> {
        self.link.scan().await
    }

    async fn connect(&mut self, address: &str) -> PrinterResult<()> {
        self.link.connect(address).await
    }

    async fn disconnect(&mut self) -> PrinterResult<()> {
        self.link.disconnect().await
    }

    async fn init(&mut self) -> PrinterResult<()> {
        self.style = TextStyle::NORMAL;
        self.send(&PrintCommand::Init).await
    }

    async fn align(&mut self, alignment: Alignment) -> PrinterResult<()> {
        self.send(&PrintCommand::Align(alignment)).await
    }

    async fn write_text(&mut self, text: &str, style: TextStyle) -> PrinterResult<()> {
        let mut buf = Vec::new();
        if style != self.style {
            encode_style(style, &mut buf);
        }
        encode_text(text, self.code_page, &mut buf);
        self.link.write_all(&buf).await?;
        self.style = style;
        Ok(())
    }

    async fn feed(&mut self, lines: u8) -> PrinterResult<()> {
        self.send(&PrintCommand::Feed(lines)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::DocumentKind;

    #[derive(Default)]
    struct MemoryLink {
        bytes: Vec<u8>,
    }

    impl ByteLink for MemoryLink {
        fn is_available(&self) -> bool {
            true
        }
        async fn is_enabled(&mut self) -> PrinterResult<bool> {
            Ok(true)
        }
        async fn request_permissions(&mut self) -> PrinterResult<bool> {
            Ok(true)
        }
        async fn scan(&mut self) -> PrinterResult<Vec<Device>> {
            Ok(vec![Device::new("PT-210", "66:22:B3:4F:10:9A")])
        }
        async fn connect(&mut self, _address: &str) -> PrinterResult<()> {
            Ok(())
        }
        async fn disconnect(&mut self) -> PrinterResult<()> {
            Ok(())
        }
        async fn write_all(&mut self, bytes: &[u8]) -> PrinterResult<()> {
            self.bytes.extend_from_slice(bytes);
            Ok(())
        }
    }

    #[test]
    fn test_encode_primitives() {
        let page = CodePage::Wpc1252;
        let mut buf = Vec::new();
        encode_command(&PrintCommand::Init, page, &mut buf);
        encode_command(&PrintCommand::Align(Alignment::Center), page, &mut buf);
        encode_command(&PrintCommand::SetFont(TextStyle::TITLE), page, &mut buf);
        encode_command(&PrintCommand::WriteText("KOT".into()), page, &mut buf);
        encode_command(&PrintCommand::Feed(3), page, &mut buf);

        assert_eq!(
            buf,
            vec![
                0x1B, 0x40, 0x1B, 0x74, 16, // init + WPC1252
                0x1B, 0x61, 0x01, // center
                0x1B, 0x45, 0x01, 0x1D, 0x21, 0x11, // bold + double size
                b'K', b'O', b'T', b'\n', // text
                0x1B, 0x64, 0x03, // feed
            ]
        );
    }

    #[test]
    fn test_text_is_written_in_the_code_page() {
        let mut buf = Vec::new();
        encode_command(&PrintCommand::WriteText("Café\tRs".into()), CodePage::Wpc1252, &mut buf);
        assert_eq!(buf, b"Caf\xE9?Rs\n".to_vec());
        let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&buf);
        assert_eq!(decoded, "Café?Rs\n");

        let mut buf = Vec::new();
        encode_command(&PrintCommand::WriteText("水饺".into()), CodePage::Gbk, &mut buf);
        let (decoded, _, _) = encoding_rs::GBK.decode(&buf);
        assert_eq!(decoded, "水饺\n");
    }

    #[test]
    fn test_encode_job_concatenates_in_order() {
        let job = PrintJob::builder(DocumentKind::Receipt, 32)
            .align(Alignment::Right)
            .line("40.00")
            .feed(1)
            .build();
        assert_eq!(
            encode_job(&job, CodePage::Gbk),
            vec![0x1B, 0x40, 0x1C, 0x26, 0x1B, 0x61, 0x02, b'4', b'0', b'.', b'0', b'0', b'\n', 0x1B, 0x64, 0x01]
        );
    }

    #[tokio::test]
    async fn test_escpos_transport_sends_style_only_on_change() {
        let mut transport = EscPosTransport::new(MemoryLink::default(), CodePage::Wpc1252);
        transport.init().await.unwrap();
        transport.write_text("a", TextStyle::NORMAL).await.unwrap();
        transport.write_text("b", TextStyle::BOLD).await.unwrap();
        transport.write_text("c", TextStyle::BOLD).await.unwrap();

        assert_eq!(
            transport.link().bytes,
            vec![
                0x1B, 0x40, 0x1B, 0x74, 16, b'a', b'\n', 0x1B, 0x45, 0x01, 0x1D, 0x21, 0x00, b'b', b'\n', b'c',
                b'\n',
            ]
        );
    }
}
