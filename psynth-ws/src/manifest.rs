//! Client-supplied commit manifest
//!
//! The manifest is a structured XML document (distinct from the protocol
//! envelope) carried entity-escaped inside the `CommitSynth` call. The
//! packager only needs three things from it: the aggregate quality score,
//! the free-text description, and the file entry count.

use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

/// Manifest parsing errors
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Malformed manifest XML: {0}")]
    Xml(String),

    #[error("Manifest has no score element")]
    MissingScore,

    #[error("Manifest has no description element")]
    MissingDescription,

    #[error("Manifest score is not a number: {0}")]
    BadScore(String),
}

/// Fields extracted from the commit manifest
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    /// Aggregate collection quality score
    pub score: f64,
    /// Free-text collection description
    pub description: String,
    /// Total `<file>` entries, photos plus the two reserved entries
    pub file_count: usize,
}

impl Manifest {
    pub fn parse(xml: &str) -> Result<Self, ManifestError> {
        let mut reader = Reader::from_str(xml);
        let mut score = None;
        let mut description = None;
        let mut file_count = 0usize;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| ManifestError::Xml(e.to_string()))?;
            match event {
                Event::Start(e) | Event::Empty(e) => match e.name().as_ref() {
                    b"file" => file_count += 1,
                    b"score" => score = value_attribute(&e)?,
                    b"description" => description = value_attribute(&e)?,
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }

        let score = score.ok_or(ManifestError::MissingScore)?;
        let score = score
            .parse::<f64>()
            .map_err(|_| ManifestError::BadScore(score))?;
        let description = description.ok_or(ManifestError::MissingDescription)?;

        Ok(Self {
            score,
            description,
            file_count,
        })
    }

    /// Photo count: the file list carries one entry for the collection and
    /// one for the point cloud; the rest are photos
    pub fn photo_count(&self) -> i64 {
        self.file_count as i64 - 2
    }
}

fn value_attribute(element: &BytesStart<'_>) -> Result<Option<String>, ManifestError> {
    let attribute = element
        .try_get_attribute("value")
        .map_err(|e| ManifestError::Xml(e.to_string()))?;
    match attribute {
        Some(attr) => attr
            .unescape_value()
            .map(|v| Some(v.into_owned()))
            .map_err(|e| ManifestError::Xml(e.to_string())),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"<manifest>
        <score value="0.8"/>
        <description value="trip"/>
        <files>
            <file path="collection.dzc"/>
            <file path="points.bin"/>
            <file path="photo1.jpg"/>
        </files>
    </manifest>"#;

    #[test]
    fn parses_score_description_and_file_count() {
        let manifest = Manifest::parse(MANIFEST).unwrap();
        assert_eq!(manifest.score, 0.8);
        assert_eq!(manifest.description, "trip");
        assert_eq!(manifest.file_count, 3);
        assert_eq!(manifest.photo_count(), 1);
    }

    #[test]
    fn description_entities_are_decoded() {
        let manifest =
            Manifest::parse(r#"<m><score value="1"/><description value="a &amp; b"/></m>"#)
                .unwrap();
        assert_eq!(manifest.description, "a & b");
    }

    #[test]
    fn missing_score_is_an_error() {
        let err = Manifest::parse(r#"<m><description value="x"/></m>"#).unwrap_err();
        assert!(matches!(err, ManifestError::MissingScore));
    }

    #[test]
    fn missing_description_is_an_error() {
        let err = Manifest::parse(r#"<m><score value="0.5"/></m>"#).unwrap_err();
        assert!(matches!(err, ManifestError::MissingDescription));
    }

    #[test]
    fn non_numeric_score_is_an_error() {
        let err =
            Manifest::parse(r#"<m><score value="high"/><description value="x"/></m>"#).unwrap_err();
        assert!(matches!(err, ManifestError::BadScore(_)));
    }

    #[test]
    fn malformed_xml_is_an_error() {
        let err = Manifest::parse("<m><score value=").unwrap_err();
        assert!(matches!(err, ManifestError::Xml(_)));
    }
}
