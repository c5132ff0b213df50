//! SOAP response body builders
//!
//! Byte-for-byte the response shapes the legacy synther clients expect,
//! wrapped in the fixed envelope. A declined `CreateSynth`/`CommitSynth`
//! answers `UploadsAreDisabled`, which is the only decline code the clients
//! understand.

use psynth_common::soap::envelope;
use uuid::Uuid;

/// Static server capabilities (upload size limits in megabytes)
pub fn server_info() -> String {
    let mut body = String::new();
    body.push_str(r#"<GetServerInfoResponse xmlns="http://labs.live.com/">"#);
    body.push_str("<GetServerInfoResult>");
    body.push_str("<Result>OK</Result>");
    body.push_str("<MaxUploadSize>40</MaxUploadSize>");
    body.push_str("<RecommendUploadSize>30</RecommendUploadSize>");
    body.push_str("<SyntherDownloadUrl></SyntherDownloadUrl>");
    body.push_str("</GetServerInfoResult>");
    body.push_str("</GetServerInfoResponse>");
    envelope(&body)
}

/// Static user and storage-quota status
pub fn user_status() -> String {
    let mut body = String::new();
    body.push_str(r#"<GetUserStatusResponse xmlns="http://labs.live.com/">"#);
    body.push_str("<GetUserStatusResult>OK</GetUserStatusResult>");
    body.push_str("<UserStatus>OK</UserStatus>");
    body.push_str("<StorageQuota>21474836480</StorageQuota>");
    body.push_str("<StorageConsumption>0</StorageConsumption>");
    body.push_str("</GetUserStatusResponse>");
    envelope(&body)
}

/// `CreateSynth` result: the session id and upload URL, or a decline that
/// still carries the in-progress session's id
pub fn create_synth(session_id: Uuid, accepted: bool) -> String {
    let mut body = String::new();
    body.push_str(r#"<CreateSynthResponse xmlns="http://labs.live.com/">"#);
    body.push_str("<CreateSynthResult>");
    body.push_str(&format!(
        "<Result>{}</Result>",
        if accepted { "OK" } else { "UploadsAreDisabled" }
    ));
    body.push_str(&format!("<CollectionId>{}</CollectionId>", session_id));
    body.push_str("<UploadUrl>http://photosynth.net/photosynthws/upload.ashx</UploadUrl>");
    body.push_str("</CreateSynthResult>");
    body.push_str("</CreateSynthResponse>");
    envelope(&body)
}

/// `AddSynthPhoto` result: the issued photo identifier embedded in its
/// externally reported URL
pub fn add_synth_photo(photo_id: Uuid) -> String {
    let mut body = String::new();
    body.push_str(r#"<AddSynthPhotoResponse xmlns="http://labs.live.com/">"#);
    body.push_str("<AddSynthPhotoResult>");
    body.push_str("<Result>OK</Result>");
    body.push_str(&format!(
        "<PhotoUrl>http://photosynth.net/image/{}.dzi</PhotoUrl>",
        photo_id
    ));
    body.push_str("<Action>SEND</Action>");
    body.push_str("</AddSynthPhotoResult>");
    body.push_str("</AddSynthPhotoResponse>");
    envelope(&body)
}

/// `CancelSynth` acknowledgment
pub fn cancel_synth() -> String {
    let mut body = String::new();
    body.push_str(r#"<CancelSynthResponse xmlns="http://labs.live.com/">"#);
    body.push_str("<CancelSynthResult>OK</CancelSynthResult>");
    body.push_str("</CancelSynthResponse>");
    envelope(&body)
}

/// `CommitSynth` result with the collection's view URL
pub fn commit_synth(session_id: Uuid, success: bool) -> String {
    let mut body = String::new();
    body.push_str(r#"<CommitSynthResponse xmlns="http://labs.live.com/">"#);
    body.push_str("<CommitSynthResult>");
    body.push_str(&format!(
        "<Result>{}</Result>",
        if success { "OK" } else { "UploadsAreDisabled" }
    ));
    body.push_str(&format!(
        "<Url>http://photosynth.net/view/{}</Url>",
        session_id
    ));
    body.push_str("</CommitSynthResult>");
    body.push_str("</CommitSynthResponse>");
    envelope(&body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_synth_reports_decline_with_current_id() {
        let id = Uuid::new_v4();
        let accepted = create_synth(id, true);
        assert!(accepted.contains("<Result>OK</Result>"));
        assert!(accepted.contains(&format!("<CollectionId>{}</CollectionId>", id)));

        let declined = create_synth(id, false);
        assert!(declined.contains("<Result>UploadsAreDisabled</Result>"));
        assert!(declined.contains(&format!("<CollectionId>{}</CollectionId>", id)));
    }

    #[test]
    fn add_synth_photo_embeds_photo_url() {
        let id = Uuid::new_v4();
        let body = add_synth_photo(id);
        assert!(body.contains(&format!("http://photosynth.net/image/{}.dzi", id)));
        assert!(body.contains("<Action>SEND</Action>"));
    }

    #[test]
    fn responses_are_enveloped() {
        for body in [server_info(), user_status(), cancel_synth()] {
            assert!(body.starts_with(r#"<?xml version="1.0" encoding="utf-8"?>"#));
            assert!(body.contains("<soap:Body>"));
        }
    }
}
