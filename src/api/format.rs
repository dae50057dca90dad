//! Render output formats and their download metadata

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output formats the render endpoint accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RenderFormat {
    #[default]
    Pdf,
    Excel,
    Word,
    Csv,
    Xml,
    Image,
}

impl RenderFormat {
    pub const ALL: [RenderFormat; 6] = [
        RenderFormat::Pdf,
        RenderFormat::Excel,
        RenderFormat::Word,
        RenderFormat::Csv,
        RenderFormat::Xml,
        RenderFormat::Image,
    ];

    /// Name used on the wire and in `/render/{format}`
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderFormat::Pdf => "PDF",
            RenderFormat::Excel => "EXCEL",
            RenderFormat::Word => "WORD",
            RenderFormat::Csv => "CSV",
            RenderFormat::Xml => "XML",
            RenderFormat::Image => "IMAGE",
        }
    }

    pub fn file_extension(&self) -> &'static str {
        match self {
            RenderFormat::Pdf => "pdf",
            RenderFormat::Excel => "xlsx",
            RenderFormat::Word => "docx",
            RenderFormat::Csv => "csv",
            RenderFormat::Xml => "xml",
            RenderFormat::Image => "png",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            RenderFormat::Pdf => "application/pdf",
            RenderFormat::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            RenderFormat::Word => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            RenderFormat::Csv => "text/csv",
            RenderFormat::Xml => "application/xml",
            RenderFormat::Image => "image/png",
        }
    }

    /// Human readable label for format pickers
    pub fn label(&self) -> &'static str {
        match self {
            RenderFormat::Pdf => "PDF document",
            RenderFormat::Excel => "Excel workbook",
            RenderFormat::Word => "Word document",
            RenderFormat::Csv => "CSV (comma delimited)",
            RenderFormat::Xml => "XML data file",
            RenderFormat::Image => "PNG image",
        }
    }
}

impl fmt::Display for RenderFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenderFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        RenderFormat::ALL
            .iter()
            .copied()
            .find(|f| {
                f.as_str().eq_ignore_ascii_case(wanted) || f.file_extension().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| {
                format!(
                    "Unknown render format '{}'. Expected one of: PDF, EXCEL, WORD, CSV, XML, IMAGE",
                    s
                )
            })
    }
}
