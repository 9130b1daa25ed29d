//! # Print Jobs
//!
//! A [`PrintJob`] is one document as an ordered list of printer primitives.
//!
//! ## Anatomy of a Job
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PrintJob { kind: Kot }                                                 │
//! │                                                                         │
//! │   1. Init                                  ┐                            │
//! │   2. Align(Center)                         │ header                     │
//! │   3. SetFont(double, bold)                 │                            │
//! │   4. WriteText("KOT")                      │                            │
//! │   5. SetFont(normal)                       ┘                            │
//! │   6. Align(Left)                                                        │
//! │   7. WriteText("2 x Chicken Momo")         ┐ body (counted)             │
//! │   8. WriteText("1 x Thukpa")               ┘                            │
//! │   9. Feed(3)                                                            │
//! │                                                                         │
//! │  Atomic in intent: if step 7 fails, nothing is considered printed.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::encoding::CodePage;

// =============================================================================
// Primitive Parameters
// =============================================================================

/// Horizontal alignment for subsequent text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Character size multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontSize {
    #[default]
    Normal,
    DoubleHeight,
    DoubleWidth,
    Double,
}

/// Text options passed with every `write_text` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextStyle {
    pub bold: bool,
    pub size: FontSize,
}

impl TextStyle {
    pub const NORMAL: TextStyle = TextStyle {
        bold: false,
        size: FontSize::Normal,
    };

    pub const BOLD: TextStyle = TextStyle {
        bold: true,
        size: FontSize::Normal,
    };

    pub const TITLE: TextStyle = TextStyle {
        bold: true,
        size: FontSize::Double,
    };
}

// =============================================================================
// Print Command
// =============================================================================

/// One printer primitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "arg", rename_all = "snake_case")]
pub enum PrintCommand {
    Init,
    Align(Alignment),
    /// Changes the style applied to following `WriteText` commands.
    SetFont(TextStyle),
    /// One line of text; the line break is implied.
    WriteText(String),
    Feed(u8),
}

impl PrintCommand {
    /// Short name used in logs and failure reports.
    pub fn name(&self) -> &'static str {
        match self {
            PrintCommand::Init => "init",
            PrintCommand::Align(_) => "align",
            PrintCommand::SetFont(_) => "set_font",
            PrintCommand::WriteText(_) => "write_text",
            PrintCommand::Feed(_) => "feed",
        }
    }
}

// =============================================================================
// Print Job
// =============================================================================

/// What a job prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Receipt,
    Kot,
    Bot,
    CreditStatement,
    DailySummary,
    SettlementReceipt,
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentKind::Receipt => write!(f, "receipt"),
            DocumentKind::Kot => write!(f, "KOT"),
            DocumentKind::Bot => write!(f, "BOT"),
            DocumentKind::CreditStatement => write!(f, "credit statement"),
            DocumentKind::DailySummary => write!(f, "daily summary"),
            DocumentKind::SettlementReceipt => write!(f, "settlement receipt"),
        }
    }
}

/// An ordered, atomic-in-intent sequence of primitives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintJob {
    kind: DocumentKind,
    commands: Vec<PrintCommand>,
    body_lines: usize,
}

impl PrintJob {
    /// Wraps raw commands. Every `WriteText` counts as body.
    pub fn from_commands(kind: DocumentKind, commands: Vec<PrintCommand>) -> Self {
        let body_lines = commands
            .iter()
            .filter(|cmd| matches!(cmd, PrintCommand::WriteText(_)))
            .count();
        PrintJob {
            kind,
            commands,
            body_lines,
        }
    }

    /// Starts a job with the printer reset as its first primitive.
    pub fn builder(kind: DocumentKind, width: usize) -> JobBuilder {
        JobBuilder {
            kind,
            width,
            code_page: CodePage::default(),
            commands: vec![PrintCommand::Init],
            body_lines: 0,
        }
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn commands(&self) -> &[PrintCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// False for a station ticket with no items for that station.
    /// Such jobs are skipped, never transmitted.
    pub fn has_body(&self) -> bool {
        self.body_lines > 0
    }

    /// Every printed line, in order.
    pub fn text_lines(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|cmd| match cmd {
            PrintCommand::WriteText(text) => Some(text.as_str()),
            _ => None,
        })
    }
}

// =============================================================================
// Job Builder
// =============================================================================

/// Fluent builder used by the document composers.
#[derive(Debug)]
pub struct JobBuilder {
    kind: DocumentKind,
    width: usize,
    code_page: CodePage,
    commands: Vec<PrintCommand>,
    body_lines: usize,
}

impl JobBuilder {
    /// Paper width in characters.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Code page the text will be printed in; columns are counted in it.
    pub fn code_page(mut self, code_page: CodePage) -> Self {
        self.code_page = code_page;
        self
    }

    pub fn align(mut self, alignment: Alignment) -> Self {
        self.commands.push(PrintCommand::Align(alignment));
        self
    }

    pub fn font(mut self, style: TextStyle) -> Self {
        self.commands.push(PrintCommand::SetFont(style));
        self
    }

    /// Header/footer text.
    pub fn line(mut self, text: impl Into<String>) -> Self {
        self.commands.push(PrintCommand::WriteText(text.into()));
        self
    }

    /// Text that carries the document's content.
    pub fn body_line(mut self, text: impl Into<String>) -> Self {
        self.body_lines += 1;
        self.line(text)
    }

    /// Left text and right text on one line, padded to the paper width.
    pub fn line_lr(self, left: &str, right: &str) -> Self {
        let text = pad_lr(left, right, self.width, self.code_page);
        self.line(text)
    }

    /// Body variant of [`line_lr`](Self::line_lr).
    pub fn body_lr(self, left: &str, right: &str) -> Self {
        let text = pad_lr(left, right, self.width, self.code_page);
        self.body_line(text)
    }

    /// A full-width rule of `ch`.
    pub fn separator(self, ch: char) -> Self {
        let rule: String = std::iter::repeat(ch).take(self.width).collect();
        self.line(rule)
    }

    pub fn feed(mut self, lines: u8) -> Self {
        self.commands.push(PrintCommand::Feed(lines));
        self
    }

    pub fn build(self) -> PrintJob {
        PrintJob {
            kind: self.kind,
            commands: self.commands,
            body_lines: self.body_lines,
        }
    }
}

/// Pads `left` and `right` apart to `width` printed columns.
///
/// Too-long pairs are joined with one space; the right text is never cut,
/// because it is usually an amount.
fn pad_lr(left: &str, right: &str, width: usize, code_page: CodePage) -> String {
    let used = code_page.width(left) + code_page.width(right);
    if used >= width {
        format!("{} {}", left, right)
    } else {
        format!("{}{}{}", left, " ".repeat(width - used), right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_starts_with_init_and_counts_body() {
        let job = PrintJob::builder(DocumentKind::Kot, 32)
            .align(Alignment::Center)
            .line("KOT")
            .body_line("2 x Momo")
            .feed(3)
            .build();

        assert_eq!(job.commands()[0], PrintCommand::Init);
        assert_eq!(job.len(), 5);
        assert!(job.has_body());
        assert_eq!(job.text_lines().collect::<Vec<_>>(), vec!["KOT", "2 x Momo"]);
    }

    #[test]
    fn test_header_only_job_has_no_body() {
        let job = PrintJob::builder(DocumentKind::Bot, 32).line("BOT").separator('-').build();
        assert!(!job.has_body());
        assert!(!job.is_empty());
    }

    #[test]
    fn test_line_lr_pads_to_width() {
        let job = PrintJob::builder(DocumentKind::Receipt, 20).line_lr("Total", "40.00").build();
        let line = job.text_lines().next().unwrap();
        assert_eq!(line.chars().count(), 20);
        assert!(line.starts_with("Total"));
        assert!(line.ends_with("40.00"));
    }

    #[test]
    fn test_line_lr_overflow_keeps_amount() {
        assert_eq!(
            pad_lr("Chicken Chilli Special", "1250.00", 20, CodePage::Wpc1252),
            "Chicken Chilli Special 1250.00"
        );
    }

    #[test]
    fn test_line_lr_counts_printed_columns() {
        let line = pad_lr("饺子", "80.00", 12, CodePage::Gbk);
        assert_eq!(line, "饺子   80.00");
        assert_eq!(CodePage::Gbk.width(&line), 12);

        let job = PrintJob::builder(DocumentKind::Receipt, 20)
            .code_page(CodePage::Wpc1252)
            .line_lr("Crème brûlée", "4.50")
            .build();
        let line = job.text_lines().next().unwrap();
        assert_eq!(CodePage::Wpc1252.width(line), 20);
        assert!(line.ends_with("    4.50"));
    }

    #[test]
    fn test_command_names() {
        assert_eq!(PrintCommand::Feed(2).name(), "feed");
        assert_eq!(PrintCommand::WriteText("x".into()).name(), "write_text");
    }

    #[test]
    fn test_command_json_shape() {
        let json = serde_json::to_string(&PrintCommand::Align(Alignment::Center)).unwrap();
        assert_eq!(json, r#"{"op":"align","arg":"center"}"#);
        let json = serde_json::to_string(&PrintCommand::Init).unwrap();
        assert_eq!(json, r#"{"op":"init"}"#);
    }
}
