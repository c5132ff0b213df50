//! Synth session registry
//!
//! Holds the single process-wide session slot and enforces the
//! one-synth-at-a-time constraint. The slot is a small state machine
//! (`Idle` → `Active` → `Committing` → `Idle`); all transitions take the
//! registry's write lock for their duration.

use std::path::{Path, PathBuf};

use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::SynthError;
use crate::photos::{PhotoMap, PhotoRecord};

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthState {
    Idle,
    Active,
    Committing,
}

/// One in-progress collection upload
#[derive(Debug)]
pub struct SynthSession {
    pub id: Uuid,
    pub display_name: String,
    pub photos: PhotoMap,
}

/// Filesystem locations of one session's working tree
///
/// The tree lives at `<output_root>/<session_id>/` and exists exactly while
/// the session is `Active` or `Committing`.
#[derive(Debug, Clone)]
pub struct SessionPaths {
    pub session_id: Uuid,
    root: PathBuf,
}

impl SessionPaths {
    fn new(output_root: &Path, session_id: Uuid) -> Self {
        Self {
            session_id,
            root: output_root.join(session_id.to_string()),
        }
    }

    /// Working tree root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Per-photo deep-zoom bundles, one subdirectory per photo identifier
    pub fn images_dir(&self) -> PathBuf {
        self.root.join("images")
    }

    /// Flattened point-cloud fragments
    pub fn points_dir(&self) -> PathBuf {
        self.root.join("points")
    }

    /// Deep-zoom collection bundle
    pub fn collection_dir(&self) -> PathBuf {
        self.root.join("collection")
    }

    /// Final archive location, a sibling of the working tree
    pub fn archive_path(&self) -> PathBuf {
        self.root.with_extension("zip")
    }
}

/// Outcome of a session creation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// New session created and now active
    Created(Uuid),
    /// A synth is already in progress; carries its id so the caller can
    /// answer with the same externally-visible URLs
    Busy(Uuid),
}

/// Everything the commit packager needs from the session it is committing
#[derive(Debug, Clone)]
pub struct CommitTicket {
    pub session_id: Uuid,
    pub display_name: String,
    pub paths: SessionPaths,
}

#[derive(Debug)]
enum Slot {
    Idle,
    Active(SynthSession),
    Committing(SynthSession),
}

impl Slot {
    fn current_id(&self) -> Option<Uuid> {
        match self {
            Slot::Idle => None,
            Slot::Active(s) | Slot::Committing(s) => Some(s.id),
        }
    }
}

#[derive(Debug)]
struct Inner {
    slot: Slot,
    /// Id of the most recently created session, kept after release so the
    /// post-commit confirmation page keeps answering for it
    last_id: Option<Uuid>,
}

/// The single active-session slot
///
/// Instantiable per test; the binary creates exactly one and shares it
/// behind an `Arc`.
#[derive(Debug)]
pub struct SessionRegistry {
    output_root: PathBuf,
    inner: RwLock<Inner>,
}

impl SessionRegistry {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            inner: RwLock::new(Inner {
                slot: Slot::Idle,
                last_id: None,
            }),
        }
    }

    /// Create a session if none is in progress
    ///
    /// Creates the working tree (images/points/collection) atomically with
    /// the session: if the tree cannot be created, no session exists
    /// afterwards. When a synth is already in progress the call is declined
    /// and the in-progress id is returned instead.
    pub async fn create_session(&self, display_name: &str) -> Result<CreateOutcome, SynthError> {
        let mut inner = self.inner.write().await;

        if let Some(current) = inner.slot.current_id() {
            warn!(session_id = %current, "CreateSynth declined: synth already in progress");
            return Ok(CreateOutcome::Busy(current));
        }

        let id = Uuid::new_v4();
        let paths = SessionPaths::new(&self.output_root, id);
        std::fs::create_dir_all(paths.images_dir())?;
        std::fs::create_dir_all(paths.points_dir())?;
        std::fs::create_dir_all(paths.collection_dir())?;

        inner.slot = Slot::Active(SynthSession {
            id,
            display_name: display_name.to_string(),
            photos: PhotoMap::new(),
        });
        inner.last_id = Some(id);

        info!(session_id = %id, name = %display_name, "Synth created");
        Ok(CreateOutcome::Created(id))
    }

    /// Register a photo fingerprint with the active session
    pub async fn register_photo(&self, fingerprint: &str) -> Result<PhotoRecord, SynthError> {
        let mut inner = self.inner.write().await;
        match &mut inner.slot {
            Slot::Active(session) => {
                let record = session.photos.register(fingerprint);
                info!(
                    session_id = %session.id,
                    photo_id = %record.photo_id,
                    ordinal = record.ordinal,
                    "Photo registered"
                );
                Ok(record)
            }
            _ => Err(SynthError::NoActiveSession),
        }
    }

    /// Resolve a fingerprint previously registered in the active session
    pub async fn resolve_photo(&self, fingerprint: &str) -> Result<PhotoRecord, SynthError> {
        let inner = self.inner.read().await;
        match &inner.slot {
            Slot::Active(session) => session
                .photos
                .resolve(fingerprint)
                .ok_or_else(|| SynthError::UnknownFingerprint(fingerprint.to_string())),
            _ => Err(SynthError::NoActiveSession),
        }
    }

    /// Working-tree paths of the active session
    pub async fn active_paths(&self) -> Result<SessionPaths, SynthError> {
        let inner = self.inner.read().await;
        match &inner.slot {
            Slot::Active(session) => Ok(SessionPaths::new(&self.output_root, session.id)),
            _ => Err(SynthError::NoActiveSession),
        }
    }

    /// Transition `Active` → `Committing`
    pub async fn begin_commit(&self) -> Result<CommitTicket, SynthError> {
        let mut inner = self.inner.write().await;
        match std::mem::replace(&mut inner.slot, Slot::Idle) {
            Slot::Active(session) => {
                let ticket = CommitTicket {
                    session_id: session.id,
                    display_name: session.display_name.clone(),
                    paths: SessionPaths::new(&self.output_root, session.id),
                };
                inner.slot = Slot::Committing(session);
                info!(session_id = %ticket.session_id, "Commit started");
                Ok(ticket)
            }
            other => {
                inner.slot = other;
                Err(SynthError::NoActiveSession)
            }
        }
    }

    /// Release the session slot back to `Idle`
    ///
    /// Called on every path out of `Committing`, success or failure, so a
    /// failed commit never leaves the service stuck non-idle.
    pub async fn end_commit(&self, success: bool) {
        let mut inner = self.inner.write().await;
        if let Some(id) = inner.slot.current_id() {
            info!(session_id = %id, success, "Commit ended, session released");
        }
        inner.slot = Slot::Idle;
    }

    /// Current lifecycle state
    pub async fn state(&self) -> SynthState {
        let inner = self.inner.read().await;
        match inner.slot {
            Slot::Idle => SynthState::Idle,
            Slot::Active(_) => SynthState::Active,
            Slot::Committing(_) => SynthState::Committing,
        }
    }

    /// Id of the session currently in progress, if any
    pub async fn current_id(&self) -> Option<Uuid> {
        self.inner.read().await.slot.current_id()
    }

    /// Whether `id` names the in-progress session or the most recent one
    pub async fn is_known_session(&self, id: Uuid) -> bool {
        let inner = self.inner.read().await;
        inner.slot.current_id() == Some(id) || inner.last_id == Some(id)
    }
}
