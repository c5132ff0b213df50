//! Committed-collection descriptor
//!
//! Synthesized once at commit time from the session and the client manifest,
//! then written into the working tree as two artifacts: the flat
//! `properties.json` document and the envelope-shaped `soap.xml` summary.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::manifest::Manifest;
use psynth_common::soap;

/// Flat descriptor artifact name
pub const PROPERTIES_FILE: &str = "properties.json";
/// Envelope-shaped descriptor artifact name
pub const SOAP_FILE: &str = "soap.xml";

/// Synthiness score wrapper, nested under `Synth` in the flat descriptor
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SynthScore {
    pub synthiness_score: f64,
}

/// The flat descriptor, serialized to `properties.json`
///
/// Field set and defaults follow the legacy service: privacy is always
/// Public, counters start at zero, and the three dates share one timestamp
/// captured when the descriptor is synthesized.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Descriptor {
    pub id: Uuid,
    pub status: String,
    pub synth: SynthScore,
    pub name: String,
    pub description: String,
    pub collection_url: String,
    pub thumbnail_url: String,
    pub view_url: String,
    pub edit_url: String,
    pub privacy_level: String,
    pub source_application: String,
    pub upload_date: String,
    pub captured_date: String,
    pub modified_date: String,
    pub image_count: i64,
    pub owner_username: String,
    pub viewings: u32,
    pub favorite_count: u32,
    pub comment_count: u32,
    pub rank: u32,
    pub has_paid_tag: bool,
    pub committed: bool,
}

impl Descriptor {
    /// Combine session identity, manifest-derived fields, derived URLs, and
    /// static defaults into the descriptor
    pub fn synthesize(
        session_id: Uuid,
        display_name: &str,
        manifest: &Manifest,
        now: DateTime<Utc>,
    ) -> Self {
        let stamp = legacy_timestamp(now);
        Self {
            id: session_id,
            status: "Available".to_string(),
            synth: SynthScore {
                synthiness_score: manifest.score,
            },
            name: display_name.to_string(),
            description: manifest.description.clone(),
            collection_url: format!(
                "https://cdn4.ps1.photosynth.net/synth/{}/metadata.dzc",
                session_id
            ),
            thumbnail_url: format!(
                "https://cdn4.ps1.photosynth.net/synth/{}/metadata.synth_files/thumb.jpg",
                session_id
            ),
            view_url: format!("https://photosynth.net/view/{}", session_id),
            edit_url: format!("https://photosynth.net/edit/{}", session_id),
            privacy_level: "Public".to_string(),
            source_application: "Synther".to_string(),
            upload_date: stamp.clone(),
            captured_date: stamp.clone(),
            modified_date: stamp,
            image_count: manifest.photo_count(),
            owner_username: "Unknown".to_string(),
            viewings: 0,
            favorite_count: 0,
            comment_count: 0,
            rank: 0,
            has_paid_tag: false,
            committed: true,
        }
    }

    /// The envelope-shaped summary written to `soap.xml`: collection type,
    /// content URLs, and privacy, as a `GetCollectionData` response
    pub fn collection_data_document(&self) -> String {
        let id = self.id;
        let mut body = String::new();
        body.push_str(r#"<GetCollectionDataResponse xmlns="http://labs.live.com/">"#);
        body.push_str("<GetCollectionDataResult>");
        body.push_str("<Result>OK</Result>");
        body.push_str("<CollectionType>Synth</CollectionType>");
        body.push_str(&format!(
            "<DzcUrl>http://cdn4.ps1.photosynth.net/synth/{}/metadata.dzc</DzcUrl>",
            id
        ));
        body.push_str(&format!(
            "<JsonUrl>http://cdn4.ps1.photosynth.net/synth/{}/metadata.synth_files/0.json</JsonUrl>",
            id
        ));
        body.push_str(&format!(
            "<CollectionRoot>http://cdn4.ps1.photosynth.net/synth/{}/metadata.synth_files/</CollectionRoot>",
            id
        ));
        body.push_str("<PrivacyLevel>Public</PrivacyLevel>");
        body.push_str("</GetCollectionDataResult>");
        body.push_str("</GetCollectionDataResponse>");
        soap::envelope(&body)
    }
}

/// Legacy JSON date form: milliseconds since the epoch with a fixed UTC
/// offset suffix
fn legacy_timestamp(now: DateTime<Utc>) -> String {
    format!("/Date({}+0000)/", now.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_manifest() -> Manifest {
        Manifest {
            score: 0.8,
            description: "trip".to_string(),
            file_count: 3,
        }
    }

    #[test]
    fn descriptor_serializes_with_legacy_field_names() {
        let id = Uuid::new_v4();
        let descriptor = Descriptor::synthesize(id, "trip", &sample_manifest(), Utc::now());
        let value = serde_json::to_value(&descriptor).unwrap();

        assert_eq!(value["Id"], serde_json::json!(id.to_string()));
        assert_eq!(value["Status"], "Available");
        assert_eq!(value["Synth"]["SynthinessScore"], 0.8);
        assert_eq!(value["Name"], "trip");
        assert_eq!(value["ImageCount"], 1);
        assert_eq!(value["PrivacyLevel"], "Public");
        assert_eq!(value["SourceApplication"], "Synther");
        assert_eq!(value["HasPaidTag"], false);
        assert_eq!(value["Committed"], true);
        assert_eq!(value["UploadDate"], value["ModifiedDate"]);
    }

    #[test]
    fn urls_embed_the_session_id() {
        let id = Uuid::new_v4();
        let descriptor = Descriptor::synthesize(id, "trip", &sample_manifest(), Utc::now());

        assert_eq!(
            descriptor.collection_url,
            format!("https://cdn4.ps1.photosynth.net/synth/{}/metadata.dzc", id)
        );
        assert_eq!(
            descriptor.view_url,
            format!("https://photosynth.net/view/{}", id)
        );
    }

    #[test]
    fn collection_data_document_is_enveloped() {
        let id = Uuid::new_v4();
        let descriptor = Descriptor::synthesize(id, "trip", &sample_manifest(), Utc::now());
        let document = descriptor.collection_data_document();

        assert!(document.contains("<soap:Body>"));
        assert!(document.contains("<CollectionType>Synth</CollectionType>"));
        assert!(document.contains(&format!("synth/{}/metadata.dzc", id)));
    }

    #[test]
    fn legacy_timestamp_form() {
        let now = DateTime::from_timestamp(1_400_000_000, 0).unwrap();
        assert_eq!(legacy_timestamp(now), "/Date(1400000000000+0000)/");
    }
}
