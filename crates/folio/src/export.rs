//! Options handed to the PDF export collaborator.
//!
//! Nothing here fetches a stylesheet or renders a page; references are only
//! classified and passed through in the order given, since later stylesheets
//! override earlier ones.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::config::ConverterOptionsSection;
use crate::diagnostics::Diagnostic;
use crate::error::AssemblyError;

/// A stylesheet reference as the author wrote it. The parsed URL of a remote
/// reference is only used for classification; `raw` is what the exporter gets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StylesheetRef {
    Remote { raw: String, url: Url },
    Local(String),
}

impl StylesheetRef {
    pub fn classify(reference: &str) -> Self {
        match Url::parse(reference) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => StylesheetRef::Remote {
                raw: reference.to_string(),
                url,
            },
            _ => StylesheetRef::Local(reference.to_string()),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, StylesheetRef::Remote { .. })
    }

    pub fn as_str(&self) -> &str {
        match self {
            StylesheetRef::Remote { raw, .. } => raw,
            StylesheetRef::Local(path) => path,
        }
    }

    pub fn url(&self) -> Option<&Url> {
        match self {
            StylesheetRef::Remote { url, .. } => Some(url),
            StylesheetRef::Local(_) => None,
        }
    }
}

impl fmt::Display for StylesheetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for StylesheetRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PageFormat {
    A3,
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
    Ledger,
}

impl FromStr for PageFormat {
    type Err = AssemblyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A3" => Ok(PageFormat::A3),
            "A4" => Ok(PageFormat::A4),
            "A5" => Ok(PageFormat::A5),
            "Letter" => Ok(PageFormat::Letter),
            "Legal" => Ok(PageFormat::Legal),
            "Tabloid" => Ok(PageFormat::Tabloid),
            "Ledger" => Ok(PageFormat::Ledger),
            other => Err(AssemblyError::InvalidExport(format!(
                "unknown page format '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl FromStr for Orientation {
    type Err = AssemblyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "portrait" => Ok(Orientation::Portrait),
            "landscape" => Ok(Orientation::Landscape),
            other => Err(AssemblyError::InvalidExport(format!(
                "unknown page orientation '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthUnit {
    Mm,
    Cm,
    In,
    Pt,
    Px,
}

impl LengthUnit {
    fn suffix(self) -> &'static str {
        match self {
            LengthUnit::Mm => "mm",
            LengthUnit::Cm => "cm",
            LengthUnit::In => "in",
            LengthUnit::Pt => "pt",
            LengthUnit::Px => "px",
        }
    }
}

/// A non-negative CSS length. A bare `0` carries no unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    pub value: f64,
    pub unit: Option<LengthUnit>,
}

impl Length {
    pub fn parse(raw: &str) -> Result<Self, AssemblyError> {
        let raw = raw.trim();
        let split = raw
            .find(|c: char| c.is_ascii_alphabetic())
            .unwrap_or(raw.len());
        let (number, suffix) = raw.split_at(split);

        let value: f64 = number
            .parse()
            .map_err(|_| AssemblyError::InvalidExport(format!("invalid length '{}'", raw)))?;
        if !value.is_finite() || value < 0.0 {
            return Err(AssemblyError::InvalidExport(format!(
                "margin '{}' must be non-negative",
                raw
            )));
        }

        let unit = match suffix {
            "mm" => Some(LengthUnit::Mm),
            "cm" => Some(LengthUnit::Cm),
            "in" => Some(LengthUnit::In),
            "pt" => Some(LengthUnit::Pt),
            "px" => Some(LengthUnit::Px),
            "" if value == 0.0 => None,
            _ => {
                return Err(AssemblyError::InvalidExport(format!(
                    "length '{}' needs a unit (mm, cm, in, pt, px)",
                    raw
                )))
            }
        };

        Ok(Self { value, unit })
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            Some(unit) => write!(f, "{}{}", self.value, unit.suffix()),
            None => write!(f, "{}", self.value),
        }
    }
}

impl Serialize for Length {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConverterOptions {
    pub format: PageFormat,
    pub margin_top: Length,
    pub margin_bottom: Length,
    pub margin_right: Length,
    pub margin_left: Length,
    pub page_orientation: Orientation,
}

impl ConverterOptions {
    pub fn parse(section: &ConverterOptionsSection) -> Result<Self, AssemblyError> {
        Ok(Self {
            format: section.format.parse()?,
            margin_top: Length::parse(&section.margin_top)?,
            margin_bottom: Length::parse(&section.margin_bottom)?,
            margin_right: Length::parse(&section.margin_right)?,
            margin_left: Length::parse(&section.margin_left)?,
            page_orientation: section.page_orientation.parse()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportConfiguration {
    pub stylesheets: Vec<StylesheetRef>,
    pub file_name: String,
    pub converter_options: ConverterOptions,
}

/// Validate and assemble the export options.
///
/// An empty file name or a bad margin is fatal. A missing stylesheet set only
/// produces a warning; some callers export raw content on purpose.
pub fn build_export_config<S: AsRef<str>>(
    stylesheets: &[S],
    file_name: &str,
    options: &ConverterOptionsSection,
) -> Result<(ExportConfiguration, Vec<Diagnostic>), AssemblyError> {
    if file_name.trim().is_empty() {
        return Err(AssemblyError::InvalidExport(
            "file name must not be empty".to_string(),
        ));
    }

    let converter_options = ConverterOptions::parse(options)?;

    let mut diagnostics = Vec::new();
    if stylesheets.is_empty() {
        diagnostics.push(Diagnostic::empty_stylesheet_set());
    }

    let stylesheets: Vec<StylesheetRef> = stylesheets
        .iter()
        .map(|reference| StylesheetRef::classify(reference.as_ref()))
        .collect();
    log::debug!(
        "Export configured: {} ({} stylesheets, {} remote)",
        file_name,
        stylesheets.len(),
        stylesheets.iter().filter(|s| s.is_remote()).count()
    );

    Ok((
        ExportConfiguration {
            stylesheets,
            file_name: file_name.to_string(),
            converter_options,
        },
        diagnostics,
    ))
}
