//! Shared path-result handle.
//!
//! One `PathResult` is created per job and cloned into the job, the
//! navigator and whichever behaviour asked for the move.  Status only moves
//! forward:
//!
//! ```text
//! PENDING → COMPUTING → IN_PROGRESS_FOLLOWING → COMPLETE
//!     └──────────┴────────────────┴──────────→ CANCELLED | FAILED
//! ```
//!
//! plus the shortcut `PENDING | COMPUTING → COMPLETE` for a zero-length path
//! that starts where the entity already stands.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use col_core::BlockPos;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum PathStatus {
    Pending,
    Computing,
    InProgressFollowing,
    Complete,
    Cancelled,
    Failed,
}

impl PathStatus {
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, PathStatus::Complete | PathStatus::Cancelled | PathStatus::Failed)
    }

    #[inline]
    pub fn is_computing(self) -> bool {
        matches!(self, PathStatus::Pending | PathStatus::Computing)
    }

    pub fn can_transition_to(self, next: PathStatus) -> bool {
        use PathStatus::*;
        match (self, next) {
            (from, _) if from.is_terminal() => false,
            (_, Cancelled | Failed) => true,
            (Pending, Computing) | (Computing, InProgressFollowing) | (InProgressFollowing, Complete) => true,
            _ => false,
        }
    }
}

#[derive(Debug)]
struct ResultInner {
    status:              Mutex<PathStatus>,
    path_length:         AtomicUsize,
    reaches_destination: AtomicBool,
    target:              Mutex<Option<BlockPos>>,
}

#[derive(Clone, Debug)]
pub struct PathResult {
    inner: Arc<ResultInner>,
}

impl Default for PathResult {
    fn default() -> Self {
        Self::new()
    }
}

impl PathResult {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ResultInner {
                status:              Mutex::new(PathStatus::Pending),
                path_length:         AtomicUsize::new(0),
                reaches_destination: AtomicBool::new(false),
                target:              Mutex::new(None),
            }),
        }
    }

    pub fn status(&self) -> PathStatus {
        *self.inner.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply a legal transition.  Returns `false` (and changes nothing) for
    /// an illegal one.
    pub fn set_status(&self, next: PathStatus) -> bool {
        let mut status = self.inner.status.lock().unwrap_or_else(PoisonError::into_inner);
        if status.can_transition_to(next) {
            *status = next;
            true
        } else {
            false
        }
    }

    /// Zero-length path: the entity is already there.
    pub fn complete_in_place(&self) -> bool {
        let mut status = self.inner.status.lock().unwrap_or_else(PoisonError::into_inner);
        if status.is_computing() {
            *status = PathStatus::Complete;
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn is_computing(&self) -> bool {
        self.status().is_computing()
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.status().is_terminal()
    }

    pub fn failed(&self) -> bool {
        self.status() == PathStatus::Failed
    }

    pub fn path_length(&self) -> usize {
        self.inner.path_length.load(Ordering::Acquire)
    }

    pub fn set_path_length(&self, len: usize) {
        self.inner.path_length.store(len, Ordering::Release);
    }

    pub fn reaches_destination(&self) -> bool {
        self.inner.reaches_destination.load(Ordering::Acquire)
    }

    pub fn set_reaches_destination(&self, value: bool) {
        self.inner.reaches_destination.store(value, Ordering::Release);
    }

    /// Block found by a find-nearest job (the pond, the tree).
    pub fn target(&self) -> Option<BlockPos> {
        *self.inner.target.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_target(&self, target: Option<BlockPos>) {
        *self.inner.target.lock().unwrap_or_else(PoisonError::into_inner) = target;
    }

    /// Both handles refer to the same job.
    #[inline]
    pub fn same_as(&self, other: &PathResult) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
