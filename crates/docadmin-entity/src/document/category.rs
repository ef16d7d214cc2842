//! Document content categories ("tipo").

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse content category derived from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentCategory {
    /// Portable Document Format.
    #[serde(rename = "PDF")]
    Pdf,
    /// Word processor documents (`.doc`, `.docx`).
    Word,
    /// Spreadsheets (`.xls`, `.xlsx`).
    Excel,
    /// Slide decks (`.ppt`, `.pptx`).
    PowerPoint,
    /// Anything else.
    Documento,
}

impl DocumentCategory {
    /// All categories in display order.
    pub const ALL: [Self; 5] = [
        Self::Pdf,
        Self::Word,
        Self::Excel,
        Self::PowerPoint,
        Self::Documento,
    ];

    /// Categorize a lowercase extension without the leading dot.
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            e if e.contains("pdf") => Self::Pdf,
            "doc" | "docx" => Self::Word,
            "xls" | "xlsx" => Self::Excel,
            "ppt" | "pptx" => Self::PowerPoint,
            _ => Self::Documento,
        }
    }

    /// Label used by the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Word => "Word",
            Self::Excel => "Excel",
            Self::PowerPoint => "PowerPoint",
            Self::Documento => "Documento",
        }
    }
}

impl fmt::Display for DocumentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DocumentCategory {
    type Err = docadmin_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "word" => Ok(Self::Word),
            "excel" => Ok(Self::Excel),
            "powerpoint" => Ok(Self::PowerPoint),
            "documento" => Ok(Self::Documento),
            _ => Err(docadmin_core::AppError::validation(format!(
                "Invalid document type: '{s}'. Expected one of: pdf, word, excel, powerpoint, documento"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(DocumentCategory::from_extension("pdf"), DocumentCategory::Pdf);
        assert_eq!(DocumentCategory::from_extension("docx"), DocumentCategory::Word);
        assert_eq!(DocumentCategory::from_extension("xls"), DocumentCategory::Excel);
        assert_eq!(DocumentCategory::from_extension("pptx"), DocumentCategory::PowerPoint);
        assert_eq!(DocumentCategory::from_extension("png"), DocumentCategory::Documento);
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!("PowerPoint".parse::<DocumentCategory>().unwrap(), DocumentCategory::PowerPoint);
        assert!("spreadsheet".parse::<DocumentCategory>().is_err());
    }
}
