use super::traits::RigidKinematics;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Application tag stamped into every trajectory store this crate writes.
pub const APP_TAG: &str = "polymelt-v1";
/// Schema version stamped alongside the tag.
pub const SCHEMA_VERSION: &str = "1.0";

#[derive(Debug, Error, PartialEq)]
pub enum FormatError {
    #[error("trajectory store metadata 'app' is '{found}', not '{expected}'")]
    AppMismatch { found: String, expected: &'static str },

    #[error("trajectory store rejected a write: {0}")]
    Store(String),
}

/// One immutable trajectory frame: a timestep plus the four kinematic arrays
/// for the leading rigid-body slots.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryFrame {
    pub timestep: u64,
    pub kinematics: RigidKinematics,
}

/// The narrow seam to a hierarchical key → dataset trajectory store.
///
/// Root-level metadata is a `{app, version}` string pair; frames are appended
/// under monotonically increasing integer keys. The concrete serialization
/// format is entirely the implementor's business.
pub trait FrameStore {
    fn app_tag(&self) -> Option<String>;
    fn set_app_tag(&mut self, tag: &str);

    fn version(&self) -> Option<String>;
    fn set_version(&mut self, version: &str);

    /// Keys of every frame currently in the store.
    fn frame_keys(&self) -> Vec<u64>;

    fn write_frame(&mut self, key: u64, frame: TrajectoryFrame) -> Result<(), FormatError>;

    /// Releases the underlying resource. Idempotent.
    fn close(&mut self);
}

impl<S: FrameStore + ?Sized> FrameStore for &mut S {
    fn app_tag(&self) -> Option<String> {
        (**self).app_tag()
    }
    fn set_app_tag(&mut self, tag: &str) {
        (**self).set_app_tag(tag)
    }
    fn version(&self) -> Option<String> {
        (**self).version()
    }
    fn set_version(&mut self, version: &str) {
        (**self).set_version(version)
    }
    fn frame_keys(&self) -> Vec<u64> {
        (**self).frame_keys()
    }
    fn write_frame(&mut self, key: u64, frame: TrajectoryFrame) -> Result<(), FormatError> {
        (**self).write_frame(key, frame)
    }
    fn close(&mut self) {
        (**self).close()
    }
}

impl<S: FrameStore + ?Sized> FrameStore for Box<S> {
    fn app_tag(&self) -> Option<String> {
        (**self).app_tag()
    }
    fn set_app_tag(&mut self, tag: &str) {
        (**self).set_app_tag(tag)
    }
    fn version(&self) -> Option<String> {
        (**self).version()
    }
    fn set_version(&mut self, version: &str) {
        (**self).set_version(version)
    }
    fn frame_keys(&self) -> Vec<u64> {
        (**self).frame_keys()
    }
    fn write_frame(&mut self, key: u64, frame: TrajectoryFrame) -> Result<(), FormatError> {
        (**self).write_frame(key, frame)
    }
    fn close(&mut self) {
        (**self).close()
    }
}

/// An in-memory frame store: the reference implementation, also used by the
/// dry-run backend and the test suite.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MemoryFrameStore {
    app: Option<String>,
    version: Option<String>,
    frames: BTreeMap<u64, TrajectoryFrame>,
    closed: bool,
}

impl MemoryFrameStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &BTreeMap<u64, TrajectoryFrame> {
        &self.frames
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl FrameStore for MemoryFrameStore {
    fn app_tag(&self) -> Option<String> {
        self.app.clone()
    }

    fn set_app_tag(&mut self, tag: &str) {
        self.app = Some(tag.to_string());
    }

    fn version(&self) -> Option<String> {
        self.version.clone()
    }

    fn set_version(&mut self, version: &str) {
        self.version = Some(version.to_string());
    }

    fn frame_keys(&self) -> Vec<u64> {
        self.frames.keys().copied().collect()
    }

    fn write_frame(&mut self, key: u64, frame: TrajectoryFrame) -> Result<(), FormatError> {
        if self.closed {
            return Err(FormatError::Store("store is closed".to_string()));
        }
        self.frames.insert(key, frame);
        Ok(())
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

/// Scoped writer over a [`FrameStore`].
///
/// Opening validates or stamps the store metadata and computes the next frame
/// index from the maximum existing key, so indexing continues seamlessly across
/// reopens. The store is released on every exit path: [`close`](Self::close)
/// hands it back for reuse, and dropping an unclosed writer releases it too.
#[derive(Debug)]
pub struct TrajectoryWriter<S: FrameStore> {
    store: Option<S>,
    next_frame: u64,
    n_rigid: usize,
}

impl<S: FrameStore> TrajectoryWriter<S> {
    /// Opens `store`, recording the first `n_rigid` entries of each capture.
    ///
    /// # Errors
    ///
    /// [`FormatError::AppMismatch`] when the store already carries a different
    /// application tag; the store is not touched further.
    pub fn open(mut store: S, n_rigid: usize) -> Result<Self, FormatError> {
        match store.app_tag() {
            Some(tag) if tag != APP_TAG => {
                return Err(FormatError::AppMismatch {
                    found: tag,
                    expected: APP_TAG,
                });
            }
            Some(_) => {}
            None => store.set_app_tag(APP_TAG),
        }
        if store.version().is_none() {
            store.set_version(SCHEMA_VERSION);
        }

        let next_frame = store.frame_keys().into_iter().max().map_or(1, |k| k + 1);
        Ok(Self {
            store: Some(store),
            next_frame,
            n_rigid,
        })
    }

    /// Appends one frame under the next index and returns that index.
    ///
    /// Kinematic arrays are truncated to the first `n_rigid` entries.
    pub fn record(
        &mut self,
        timestep: u64,
        mut kinematics: RigidKinematics,
    ) -> Result<u64, FormatError> {
        kinematics.positions.truncate(self.n_rigid);
        kinematics.orientations.truncate(self.n_rigid);
        kinematics.net_forces.truncate(self.n_rigid);
        kinematics.net_torques.truncate(self.n_rigid);

        let key = self.next_frame;
        let store = self
            .store
            .as_mut()
            .expect("store is present until close consumes the writer");
        store.write_frame(
            key,
            TrajectoryFrame {
                timestep,
                kinematics,
            },
        )?;
        self.next_frame += 1;
        debug!(frame = key, timestep, "recorded rigid trajectory frame");
        Ok(key)
    }

    /// Index the next recorded frame will receive.
    pub fn next_frame(&self) -> u64 {
        self.next_frame
    }

    /// Number of leading rigid-body slots captured per frame.
    pub fn n_rigid(&self) -> usize {
        self.n_rigid
    }

    /// Closes the writer and hands the released store back.
    pub fn close(mut self) -> S {
        let mut store = self
            .store
            .take()
            .expect("store is present until close consumes the writer");
        store.close();
        store
    }
}

impl<S: FrameStore> Drop for TrajectoryWriter<S> {
    fn drop(&mut self) {
        if let Some(store) = self.store.as_mut() {
            store.close();
        }
    }
}
