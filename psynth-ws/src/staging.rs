//! Upload assembler
//!
//! Receives binary payloads tagged by kind and stages each into the active
//! session's working tree. All three kinds share one sub-protocol: persist
//! the raw payload to a temporary archive, extract it, delete the temporary
//! archive, then run the target-specific rename/relocation. Extraction must
//! finish before any rename runs; a failure anywhere fails this call only and
//! leaves other photos' staging untouched.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info};
use walkdir::WalkDir;

use crate::archive::{ArchiveError, Archiver};
use crate::error::SynthError;
use crate::session::SessionRegistry;

/// Marker file the synther places at the root of every uploaded archive
pub const ROOT_MARKER: &str = ".root";
/// Fixed name the collection marker is renamed to
pub const COLLECTION_DESCRIPTOR: &str = "metadata.dsc";
/// Fixed name a photo's marker is renamed to
pub const DEEPZOOM_DESCRIPTOR: &str = "0.dzi";
/// Point-cloud fragments carry this name fragment, at unpredictable depth
const POINTS_PATTERN: &str = "points_";

/// Classification of an inbound binary payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadTarget {
    /// Point-cloud bundle, extracted at the tree root and normalized into
    /// the `points` subdirectory
    PointCloudBundle,
    /// Deep-zoom collection bundle for the `collection` subdirectory
    CollectionBundle,
    /// Deep-zoom image bundle for one registered photo fingerprint
    PhotoBundle(String),
}

/// Stage one uploaded payload into the active session's working tree
pub async fn stage_upload(
    registry: &SessionRegistry,
    archiver: Arc<dyn Archiver>,
    target: UploadTarget,
    payload: Vec<u8>,
) -> Result<(), SynthError> {
    let paths = registry.active_paths().await?;
    let session_id = paths.session_id;
    let points_dir = paths.points_dir();

    // Fingerprint resolution happens before any filesystem work, so an
    // unregistered fingerprint cannot leave stray directories behind.
    let plan = match &target {
        UploadTarget::PointCloudBundle => StagePlan {
            temp_archive: paths.root().join("synth.bin.zip"),
            extract_to: paths.root().to_path_buf(),
            post: PostStep::RelocatePoints,
        },
        UploadTarget::CollectionBundle => StagePlan {
            temp_archive: paths.root().join("collection.zip"),
            extract_to: paths.collection_dir(),
            post: PostStep::RenameMarker(COLLECTION_DESCRIPTOR),
        },
        UploadTarget::PhotoBundle(fingerprint) => {
            let record = registry.resolve_photo(fingerprint).await?;
            StagePlan {
                temp_archive: paths.images_dir().join(format!("{}.zip", record.photo_id)),
                extract_to: paths.images_dir().join(record.photo_id.to_string()),
                post: PostStep::RenameMarker(DEEPZOOM_DESCRIPTOR),
            }
        }
    };

    let staged = tokio::task::spawn_blocking(move || run_plan(&archiver, &plan, &payload, &points_dir))
        .await
        .map_err(|e| SynthError::Other(anyhow::anyhow!("staging task failed: {e}")))?;

    match staged {
        Ok(()) => {
            info!(session_id = %session_id, target = ?target, "Upload staged");
            Ok(())
        }
        Err(e) => {
            error!(session_id = %session_id, target = ?target, error = %e, "Upload staging failed");
            Err(SynthError::UploadStagingFailed(e))
        }
    }
}

struct StagePlan {
    temp_archive: PathBuf,
    extract_to: PathBuf,
    post: PostStep,
}

enum PostStep {
    /// Drop the root marker, then flatten point fragments into `points/`
    RelocatePoints,
    /// Rename the extracted root marker to a fixed descriptor name
    RenameMarker(&'static str),
}

fn run_plan(
    archiver: &Arc<dyn Archiver>,
    plan: &StagePlan,
    payload: &[u8],
    points_dir: &Path,
) -> Result<(), ArchiveError> {
    fs::create_dir_all(&plan.extract_to)?;
    fs::write(&plan.temp_archive, payload)?;

    // Extraction completes (or fails) before any rename/relocation runs
    archiver.extract(&plan.temp_archive, &plan.extract_to)?;
    fs::remove_file(&plan.temp_archive)?;

    match plan.post {
        PostStep::RelocatePoints => {
            remove_if_exists(&plan.extract_to.join(ROOT_MARKER))?;
            relocate_point_fragments(&plan.extract_to, points_dir)?;
        }
        PostStep::RenameMarker(descriptor) => {
            fs::rename(
                plan.extract_to.join(ROOT_MARKER),
                plan.extract_to.join(descriptor),
            )?;
        }
    }
    Ok(())
}

/// Move every file whose name matches the point-cloud-fragment pattern into
/// `points_dir`, out of whatever nesting the archive produced
fn relocate_point_fragments(tree: &Path, points_dir: &Path) -> Result<(), ArchiveError> {
    let mut fragments = Vec::new();
    for entry in WalkDir::new(tree) {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().parent() == Some(points_dir) {
            continue;
        }
        if entry.file_name().to_string_lossy().contains(POINTS_PATTERN) {
            fragments.push(entry.into_path());
        }
    }

    for path in fragments {
        if let Some(name) = path.file_name() {
            fs::rename(&path, points_dir.join(name))?;
        }
    }
    Ok(())
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
