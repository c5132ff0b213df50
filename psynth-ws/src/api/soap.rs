//! SOAP service endpoint
//!
//! POST /photosynthws/PhotosynthService.asmx
//!
//! The call name is recognized by substring search on the body and the few
//! request fields are pulled out by tag extraction; the synther clients only
//! ever send well-formed envelopes, so nothing heavier is needed at this
//! boundary.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::{debug, info};

use psynth_common::soap::{extract_tag, unescape};

use crate::api::responses;
use crate::error::{ApiResult, SynthError};
use crate::packager;
use crate::session::CreateOutcome;
use crate::AppState;

/// Call name recognized from the request body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoapAction {
    GetServerInfo,
    GetUserStatus,
    CreateSynth,
    AddSynthPhoto,
    CommitSynth,
    CancelSynth,
    Unknown,
}

impl SoapAction {
    /// Recognize the call by substring search, the way the legacy service did
    pub fn classify(body: &str) -> Self {
        if body.contains("<GetServerInfo") {
            SoapAction::GetServerInfo
        } else if body.contains("<GetUserStatus") {
            SoapAction::GetUserStatus
        } else if body.contains("<CreateSynth") {
            SoapAction::CreateSynth
        } else if body.contains("<AddSynthPhoto") {
            SoapAction::AddSynthPhoto
        } else if body.contains("<CommitSynth") {
            SoapAction::CommitSynth
        } else if body.contains("<CancelSynth") {
            SoapAction::CancelSynth
        } else {
            SoapAction::Unknown
        }
    }
}

/// POST /photosynthws/PhotosynthService.asmx
pub async fn service_endpoint(State(state): State<AppState>, body: String) -> ApiResult<Response> {
    let action = SoapAction::classify(&body);
    debug!(action = ?action, "SOAP call received");

    match action {
        SoapAction::GetServerInfo => Ok(soap_response(responses::server_info())),
        SoapAction::GetUserStatus => Ok(soap_response(responses::user_status())),
        SoapAction::CreateSynth => create_synth(&state, &body).await,
        SoapAction::AddSynthPhoto => add_synth_photo(&state, &body).await,
        SoapAction::CommitSynth => commit_synth(&state, &body).await,
        SoapAction::CancelSynth => {
            // Acknowledged only; session state is deliberately untouched
            info!("CancelSynth acknowledged");
            Ok(soap_response(responses::cancel_synth()))
        }
        SoapAction::Unknown => Ok((StatusCode::NOT_FOUND, "Not found").into_response()),
    }
}

async fn create_synth(state: &AppState, body: &str) -> ApiResult<Response> {
    let name = extract_tag(body, "Name")
        .ok_or_else(|| SynthError::BadRequest("CreateSynth without a Name field".to_string()))?;

    let response = match state.registry.create_session(name).await? {
        CreateOutcome::Created(id) => responses::create_synth(id, true),
        CreateOutcome::Busy(id) => responses::create_synth(id, false),
    };
    Ok(soap_response(response))
}

async fn add_synth_photo(state: &AppState, body: &str) -> ApiResult<Response> {
    let fingerprint = extract_tag(body, "ImageHash").ok_or_else(|| {
        SynthError::BadRequest("AddSynthPhoto without an ImageHash field".to_string())
    })?;

    let record = state.registry.register_photo(fingerprint).await?;
    Ok(soap_response(responses::add_synth_photo(record.photo_id)))
}

async fn commit_synth(state: &AppState, body: &str) -> ApiResult<Response> {
    let manifest = extract_tag(body, "Manifest").ok_or_else(|| {
        SynthError::BadRequest("CommitSynth without a Manifest field".to_string())
    })?;
    // The manifest document travels entity-escaped inside its carrier tag
    let manifest = unescape(manifest).map_err(|e| SynthError::BadRequest(e.to_string()))?;

    let outcome = packager::commit(&state.registry, state.archiver.clone(), manifest).await?;
    Ok(soap_response(responses::commit_synth(
        outcome.session_id,
        outcome.success(),
    )))
}

/// The legacy service labels SOAP responses text/html
fn soap_response(body: String) -> Response {
    ([(header::CONTENT_TYPE, "text/html")], body).into_response()
}
