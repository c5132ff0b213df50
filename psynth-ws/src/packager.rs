//! Commit packager
//!
//! Terminal step of a synth session: parse the client manifest, synthesize
//! the descriptor artifacts into the working tree, archive the tree, and
//! release the session. The pipeline is strictly sequential; the archive
//! step must observe a tree that already contains both descriptor files.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info};
use uuid::Uuid;

use crate::archive::Archiver;
use crate::descriptor::{Descriptor, PROPERTIES_FILE, SOAP_FILE};
use crate::error::SynthError;
use crate::manifest::Manifest;
use crate::session::{CommitTicket, SessionRegistry};

/// Result of a commit attempt
///
/// Packaging failure is a defined outcome, not an `Err`: the protocol answers
/// it with a declined response envelope that still names the session.
#[derive(Debug, Clone)]
pub struct CommitOutcome {
    pub session_id: Uuid,
    /// Path of the committed archive; `None` when packaging failed
    pub archive_path: Option<PathBuf>,
}

impl CommitOutcome {
    pub fn success(&self) -> bool {
        self.archive_path.is_some()
    }
}

/// Commit the active synth
///
/// Every path out of `Committing` releases the session, so a failed commit
/// never leaves the service stuck non-idle. On success only the archive
/// remains; on failure the working tree is left in place for diagnosis.
pub async fn commit(
    registry: &SessionRegistry,
    archiver: Arc<dyn Archiver>,
    manifest_xml: String,
) -> Result<CommitOutcome, SynthError> {
    let ticket = registry.begin_commit().await?;
    let session_id = ticket.session_id;

    let packaged = tokio::task::spawn_blocking(move || package(&archiver, &ticket, &manifest_xml))
        .await
        .map_err(|e| anyhow::anyhow!("commit task failed: {e}"));

    let success = matches!(&packaged, Ok(Ok(_)));
    registry.end_commit(success).await;

    match packaged {
        Ok(Ok(archive_path)) => {
            info!(session_id = %session_id, archive = %archive_path.display(), "Synth committed");
            Ok(CommitOutcome {
                session_id,
                archive_path: Some(archive_path),
            })
        }
        Ok(Err(e)) => {
            error!(session_id = %session_id, error = %e, "Commit failed, session released");
            Ok(CommitOutcome {
                session_id,
                archive_path: None,
            })
        }
        Err(e) => Err(SynthError::Other(e)),
    }
}

/// The sequential packaging pipeline
fn package(
    archiver: &Arc<dyn Archiver>,
    ticket: &CommitTicket,
    manifest_xml: &str,
) -> Result<PathBuf, SynthError> {
    let manifest = Manifest::parse(manifest_xml)
        .map_err(|e| SynthError::CommitFailed(format!("manifest: {e}")))?;

    let descriptor = Descriptor::synthesize(
        ticket.session_id,
        &ticket.display_name,
        &manifest,
        chrono::Utc::now(),
    );

    let root = ticket.paths.root();
    let properties = serde_json::to_string(&descriptor)
        .map_err(|e| SynthError::CommitFailed(format!("descriptor: {e}")))?;
    fs::write(root.join(PROPERTIES_FILE), properties)?;
    fs::write(root.join(SOAP_FILE), descriptor.collection_data_document())?;

    let archive_path = ticket.paths.archive_path();
    archiver
        .archive_dir(root, &archive_path)
        .map_err(|e| SynthError::CommitFailed(format!("archive: {e}")))?;

    // Success keeps only the archive
    fs::remove_dir_all(root)?;
    Ok(archive_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{ArchiveError, ZipArchiver};
    use crate::session::{CreateOutcome, SynthState};
    use std::path::Path;

    const MANIFEST: &str = r#"<manifest>
        <score value="0.8"/>
        <description value="trip"/>
        <files><file/><file/><file/></files>
    </manifest>"#;

    async fn active_session() -> (tempfile::TempDir, SessionRegistry, Uuid) {
        let dir = tempfile::tempdir().unwrap();
        let registry = SessionRegistry::new(dir.path());
        let CreateOutcome::Created(id) = registry.create_session("trip").await.unwrap() else {
            panic!("first create must be accepted");
        };
        (dir, registry, id)
    }

    #[tokio::test]
    async fn successful_commit_archives_and_releases() {
        let (dir, registry, id) = active_session().await;

        let outcome = commit(&registry, Arc::new(ZipArchiver), MANIFEST.to_string())
            .await
            .unwrap();

        assert!(outcome.success());
        assert_eq!(outcome.session_id, id);

        let archive = dir.path().join(format!("{}.zip", id));
        assert_eq!(outcome.archive_path.as_deref(), Some(archive.as_path()));
        assert!(archive.is_file());
        // Working tree is gone, only the archive remains
        assert!(!dir.path().join(id.to_string()).exists());
        assert_eq!(registry.state().await, SynthState::Idle);

        // The archive carries both descriptor artifacts
        let mut zip = zip::ZipArchive::new(std::fs::File::open(&archive).unwrap()).unwrap();
        let names: Vec<String> = (0..zip.len())
            .map(|i| zip.by_index(i).unwrap().name().to_string())
            .collect();
        assert!(names.iter().any(|n| n == "properties.json"));
        assert!(names.iter().any(|n| n == "soap.xml"));
    }

    #[tokio::test]
    async fn bad_manifest_fails_commit_but_releases_session() {
        let (dir, registry, id) = active_session().await;

        let outcome = commit(&registry, Arc::new(ZipArchiver), "<m/>".to_string())
            .await
            .unwrap();

        assert!(!outcome.success());
        assert_eq!(outcome.session_id, id);
        // Session released, working tree preserved for diagnosis, no archive
        assert_eq!(registry.state().await, SynthState::Idle);
        assert!(dir.path().join(id.to_string()).is_dir());
        assert!(!dir.path().join(format!("{}.zip", id)).exists());
    }

    #[tokio::test]
    async fn archiver_failure_fails_commit_but_releases_session() {
        struct FailingArchiver;
        impl Archiver for FailingArchiver {
            fn extract(&self, _archive: &Path, _dest: &Path) -> Result<(), ArchiveError> {
                Ok(())
            }
            fn archive_dir(&self, _dir: &Path, _dest: &Path) -> Result<(), ArchiveError> {
                Err(ArchiveError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk full",
                )))
            }
        }

        let (dir, registry, id) = active_session().await;
        let outcome = commit(&registry, Arc::new(FailingArchiver), MANIFEST.to_string())
            .await
            .unwrap();

        assert!(!outcome.success());
        assert_eq!(registry.state().await, SynthState::Idle);
        // Descriptors were written before the archive step failed
        let root = dir.path().join(id.to_string());
        assert!(root.join("properties.json").is_file());
        assert!(root.join("soap.xml").is_file());
    }

    #[tokio::test]
    async fn commit_without_session_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let registry = SessionRegistry::new(dir.path());

        let err = commit(&registry, Arc::new(ZipArchiver), MANIFEST.to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, SynthError::NoActiveSession));
    }
}
