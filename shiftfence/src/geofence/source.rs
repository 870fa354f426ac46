//! Location source abstraction.
//!
//! The tracker never talks to a platform geolocation API directly — it
//! depends on the [`LocationSource`] trait, and the host supplies whatever
//! implementation its platform offers (browser watch-position, mobile OS
//! location services, a replayed trace).
//!
//! # Design
//!
//! A source has two capabilities, mirroring a watch-position API:
//! permission probing and a start-able watch. Starting the watch hands
//! back a channel of [`SourceUpdate`]s; the source pushes samples into it
//! at its own cadence, and closing the channel signals the watch is gone.
//!
//! [`PushSource`] is the general-purpose bridge: hosts wire their callback
//! into [`PushSource::push`] and hand the source to the tracker. The
//! denied/unavailable sources exist for tests and for hosts that need a
//! stand-in on platforms without location support.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::mpsc;

use super::model::LocationSample;

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Errors from the location source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The user refused the location permission.
    #[error("location permission denied")]
    PermissionDenied,

    /// The platform has no usable location capability.
    #[error("location source unavailable: {0}")]
    Unavailable(String),

    /// The watch was running and then went away (stream terminated,
    /// permission revoked mid-session). Distinct from `Unavailable`:
    /// this was working until now.
    #[error("location source lost: {0}")]
    Lost(String),
}

/// One delivery from a running watch.
#[derive(Debug, Clone)]
pub enum SourceUpdate {
    /// A position fix.
    Sample(LocationSample),
    /// The source hit a fatal condition; no more samples will follow.
    Failed(SourceError),
}

/// A start-able stream of location samples with permission semantics.
///
/// # Implementors
///
/// - [`PushSource`] - bridge for callback-style host APIs
/// - [`DeniedSource`] - testing: permission always refused
/// - [`UnavailableSource`] - testing: capability missing entirely
pub trait LocationSource: Send + Sync {
    /// Probe the location permission without starting a watch.
    ///
    /// Best-effort: `Ok(true)` means a watch would likely start. Must not
    /// change any source or tracker state.
    fn request_permission(&self) -> BoxFuture<'_, Result<bool, SourceError>>;

    /// Start delivering samples.
    ///
    /// # Returns
    ///
    /// The receiving end of the update stream, or why the watch could not
    /// start. The stream stays open until the source fails or the watch is
    /// torn down; the receiver side may be dropped at any time.
    fn start_watch(&self)
        -> BoxFuture<'_, Result<mpsc::UnboundedReceiver<SourceUpdate>, SourceError>>;
}

/// Bridge from a callback-style location API to a [`LocationSource`].
///
/// The host registers its platform callback to call [`PushSource::push`]
/// with each fix; the tracker consumes the other end. `start_watch` opens
/// a fresh channel each time, so one `PushSource` serves any number of
/// start/stop cycles.
///
/// # Example
///
/// ```
/// use shiftfence::geofence::PushSource;
/// use shiftfence::geofence::LocationSample;
/// use shiftfence::coord::Coordinate;
///
/// let source = PushSource::new();
/// // ... hand an Arc of the source to a tracker, start it, then:
/// let delivered = source.push(LocationSample::new(
///     Coordinate::new(40.7589, -73.9851).unwrap(),
/// ));
/// // false here: nothing has started a watch yet.
/// assert!(!delivered);
/// ```
#[derive(Debug, Default)]
pub struct PushSource {
    granted: AtomicBool,
    sender: Mutex<Option<mpsc::UnboundedSender<SourceUpdate>>>,
}

impl PushSource {
    /// Create a source with permission granted.
    pub fn new() -> Self {
        Self {
            granted: AtomicBool::new(true),
            sender: Mutex::new(None),
        }
    }

    /// Flip the simulated permission state.
    ///
    /// Affects future `request_permission`/`start_watch` calls only; a
    /// running watch is not interrupted (use [`PushSource::fail`] for
    /// mid-session revocation).
    pub fn set_permission(&self, granted: bool) {
        self.granted.store(granted, Ordering::Relaxed);
    }

    /// Deliver a sample to the active watch.
    ///
    /// # Returns
    ///
    /// `true` if a watch was active and accepted the sample.
    pub fn push(&self, sample: LocationSample) -> bool {
        let guard = self.sender.lock();
        match guard.as_ref() {
            Some(tx) => tx.send(SourceUpdate::Sample(sample)).is_ok(),
            None => false,
        }
    }

    /// Report a fatal condition to the active watch and tear it down.
    pub fn fail(&self, error: SourceError) {
        let mut guard = self.sender.lock();
        if let Some(tx) = guard.take() {
            let _ = tx.send(SourceUpdate::Failed(error));
        }
    }

    /// Tear the watch down without an explicit error (stream terminated).
    pub fn disconnect(&self) {
        self.sender.lock().take();
    }

    /// Is a watch currently connected?
    pub fn is_watching(&self) -> bool {
        self.sender
            .lock()
            .as_ref()
            .map_or(false, |tx| !tx.is_closed())
    }
}

impl LocationSource for PushSource {
    fn request_permission(&self) -> BoxFuture<'_, Result<bool, SourceError>> {
        Box::pin(async move { Ok(self.granted.load(Ordering::Relaxed)) })
    }

    fn start_watch(
        &self,
    ) -> BoxFuture<'_, Result<mpsc::UnboundedReceiver<SourceUpdate>, SourceError>> {
        Box::pin(async move {
            if !self.granted.load(Ordering::Relaxed) {
                return Err(SourceError::PermissionDenied);
            }
            let (tx, rx) = mpsc::unbounded_channel();
            *self.sender.lock() = Some(tx);
            Ok(rx)
        })
    }
}

/// Testing source whose permission is always refused.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeniedSource;

impl LocationSource for DeniedSource {
    fn request_permission(&self) -> BoxFuture<'_, Result<bool, SourceError>> {
        Box::pin(async { Ok(false) })
    }

    fn start_watch(
        &self,
    ) -> BoxFuture<'_, Result<mpsc::UnboundedReceiver<SourceUpdate>, SourceError>> {
        Box::pin(async { Err(SourceError::PermissionDenied) })
    }
}

/// Testing source for platforms with no location capability at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableSource;

impl LocationSource for UnavailableSource {
    fn request_permission(&self) -> BoxFuture<'_, Result<bool, SourceError>> {
        Box::pin(async { Err(SourceError::Unavailable("no location capability".into())) })
    }

    fn start_watch(
        &self,
    ) -> BoxFuture<'_, Result<mpsc::UnboundedReceiver<SourceUpdate>, SourceError>> {
        Box::pin(async { Err(SourceError::Unavailable("no location capability".into())) })
    }
}
