//! Binary upload endpoint
//!
//! POST /photosynthws/upload.ashx
//!
//! The upload kind is carried in the request's query string: a fixed `t`
//! marker for the two aggregate bundles, or a `fid` fingerprint for a
//! per-photo bundle.

use axum::body::Bytes;
use axum::extract::{Query, State};
use serde::Deserialize;

use crate::error::{ApiResult, SynthError};
use crate::staging::{self, UploadTarget};
use crate::AppState;

/// Query-string addressing for upload.ashx
#[derive(Debug, Deserialize)]
pub struct UploadParams {
    /// Aggregate target marker: `synth.bin` or `dzc`
    pub t: Option<String>,
    /// Photo fingerprint for per-photo uploads
    pub fid: Option<String>,
}

/// POST /photosynthws/upload.ashx
pub async fn upload(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> ApiResult<&'static str> {
    let target = classify(params)?;
    staging::stage_upload(
        &state.registry,
        state.archiver.clone(),
        target,
        body.to_vec(),
    )
    .await?;
    Ok("OK")
}

fn classify(params: UploadParams) -> Result<UploadTarget, SynthError> {
    match params.t.as_deref() {
        Some("synth.bin") => Ok(UploadTarget::PointCloudBundle),
        Some("dzc") => Ok(UploadTarget::CollectionBundle),
        _ => params.fid.map(UploadTarget::PhotoBundle).ok_or_else(|| {
            SynthError::BadRequest("Upload without a target marker or fingerprint".to_string())
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(t: Option<&str>, fid: Option<&str>) -> UploadParams {
        UploadParams {
            t: t.map(str::to_string),
            fid: fid.map(str::to_string),
        }
    }

    #[test]
    fn aggregate_markers_classify_first() {
        assert_eq!(
            classify(params(Some("synth.bin"), None)).unwrap(),
            UploadTarget::PointCloudBundle
        );
        assert_eq!(
            classify(params(Some("dzc"), None)).unwrap(),
            UploadTarget::CollectionBundle
        );
        // Marker wins even when a fingerprint is also present
        assert_eq!(
            classify(params(Some("dzc"), Some("hashA"))).unwrap(),
            UploadTarget::CollectionBundle
        );
    }

    #[test]
    fn fingerprint_classifies_photo_upload() {
        assert_eq!(
            classify(params(None, Some("hashA"))).unwrap(),
            UploadTarget::PhotoBundle("hashA".to_string())
        );
    }

    #[test]
    fn unaddressed_upload_is_rejected() {
        assert!(matches!(
            classify(params(None, None)),
            Err(SynthError::BadRequest(_))
        ));
        // An unrecognized marker without a fingerprint is equally unaddressed
        assert!(matches!(
            classify(params(Some("bogus"), None)),
            Err(SynthError::BadRequest(_))
        ));
    }
}
