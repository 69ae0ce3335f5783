//! Virtual OLED panel.
//!
//! Simulates the four-line, sixteen-column text panel of the original
//! device. ASCII only: the physical panel's font has no glyphs beyond
//! 0x20-0x7E, and accepting anything wider here would let integrations pass
//! text a real panel cannot show.

use opendoor_access::{AccessDecision, AccessOutcome};
use opendoor_core::{DecodedFrame, Error, Result};

/// Rows on the panel (128x32 SSD1306 at an 8-pixel font).
const DEFAULT_ROWS: usize = 4;

/// Columns on the panel.
const DEFAULT_COLUMNS: usize = 16;

/// Virtual text panel.
///
/// # Examples
///
/// ```
/// use opendoor_emulator::VirtualDisplay;
///
/// let mut display = VirtualDisplay::default();
/// display.set_line(0, "System Ready.").unwrap();
/// display.set_line(1, "Please swipe...").unwrap();
///
/// assert_eq!(display.get_line(0).unwrap().trim_end(), "System Ready.");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualDisplay {
    lines: Vec<String>,
    rows: usize,
    columns: usize,
}

impl Default for VirtualDisplay {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS, DEFAULT_COLUMNS)
    }
}

impl VirtualDisplay {
    /// Panel of the given geometry, starting blank.
    #[must_use]
    pub fn new(rows: usize, columns: usize) -> Self {
        VirtualDisplay {
            lines: vec![" ".repeat(columns); rows],
            rows,
            columns,
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Write one line, left-aligned, space-padded, truncated at the panel
    /// width.
    ///
    /// # Errors
    /// Returns `Error::FieldRange` for a row outside the panel and
    /// `Error::Config` for non-ASCII text.
    pub fn set_line(&mut self, row: usize, text: &str) -> Result<()> {
        if row >= self.rows {
            return Err(Error::FieldRange(format!(
                "row {row} outside {}-line panel",
                self.rows
            )));
        }
        if !text.is_ascii() {
            return Err(Error::Config("display text must be ASCII".to_string()));
        }
        let mut line = text.to_string();
        line.truncate(self.columns);
        let width = self.columns;
        self.lines[row] = format!("{line:<width$}");
        Ok(())
    }

    /// Read one padded line back.
    ///
    /// # Errors
    /// Returns `Error::FieldRange` for a row outside the panel.
    pub fn get_line(&self, row: usize) -> Result<&str> {
        self.lines
            .get(row)
            .map(String::as_str)
            .ok_or_else(|| Error::FieldRange(format!("row {row} outside {}-line panel", self.rows)))
    }

    /// Blank the whole panel.
    pub fn clear(&mut self) {
        for line in &mut self.lines {
            *line = " ".repeat(self.columns);
        }
    }

    /// The panel contents as newline-joined text.
    #[must_use]
    pub fn render(&self) -> String {
        self.lines.join("\n")
    }

    /// Idle prompt between swipes.
    pub fn show_idle(&mut self) {
        self.clear();
        let _ = self.set_line(0, "System Ready.");
        let _ = self.set_line(1, "Please swipe...");
    }

    /// Raw-mode rendering of a decoded frame: facility code, card number,
    /// raw hex, parity verdict.
    pub fn show_frame(&mut self, frame: &DecodedFrame) {
        self.clear();
        let fc_line = if frame.has_facility_code() {
            format!("FC: {}", frame.facility_code)
        } else {
            "FC: N/A".to_string()
        };
        let _ = self.set_line(0, &fc_line);
        let _ = self.set_line(1, &format!("CN: {}", frame.card_number));
        let _ = self.set_line(2, &frame.raw_hex);
        let _ = self.set_line(
            3,
            &format!("Parity: {}", if frame.parity_ok { "PASS" } else { "FAIL" }),
        );
    }

    /// Verdict rendering after an access decision.
    pub fn show_decision(&mut self, decision: &AccessDecision, frame: &DecodedFrame) {
        self.clear();
        match &decision.outcome {
            AccessOutcome::Granted { user } => {
                let _ = self.set_line(0, "Access Granted");
                let _ = self.set_line(1, &user.name);
            }
            AccessOutcome::Denied { reason } => {
                let _ = self.set_line(0, "Access Denied");
                let _ = self.set_line(1, &reason.to_string());
                let detail = if frame.has_facility_code() {
                    format!("FC: {} CN: {}", frame.facility_code, frame.card_number)
                } else {
                    format!("CN: {}", frame.card_number)
                };
                let _ = self.set_line(2, &detail);
            }
        }
    }
}
