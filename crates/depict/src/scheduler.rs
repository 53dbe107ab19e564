//! # Frame Scheduling
//!
//! The graph asks a [`FrameScheduler`] for its next frame instead of calling
//! into a compositor. [`ManualScheduler`] hands the pending frame to a
//! [`FrameTicker`], which whoever drives the graph (a worker loop, a test)
//! polls.

use std::cell::RefCell;
use std::rc::Rc;

/// Identifies a requested frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

pub trait FrameScheduler {
    /// Requests one callback on the next frame.
    fn request_frame(&mut self) -> FrameHandle;
    /// Cancels a request. Unknown or already consumed handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

#[derive(Debug, Default)]
struct TickState {
    next: u64,
    pending: Option<FrameHandle>,
    requested: u64,
}

/// Scheduler driven by polling its [`FrameTicker`].
#[derive(Debug, Default)]
pub struct ManualScheduler {
    state: Rc<RefCell<TickState>>,
}

impl ManualScheduler {
    pub fn new() -> (Self, FrameTicker) {
        let scheduler = Self::default();
        let ticker = FrameTicker {
            state: scheduler.state.clone(),
        };
        (scheduler, ticker)
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        let mut state = self.state.borrow_mut();
        state.next += 1;
        state.requested += 1;
        let handle = FrameHandle(state.next);
        state.pending = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let mut state = self.state.borrow_mut();
        if state.pending == Some(handle) {
            state.pending = None;
        }
    }
}

/// Polling side of a [`ManualScheduler`].
#[derive(Debug, Clone)]
pub struct FrameTicker {
    state: Rc<RefCell<TickState>>,
}

impl FrameTicker {
    /// Consumes the pending frame, if any.
    pub fn take(&self) -> Option<FrameHandle> {
        self.state.borrow_mut().pending.take()
    }

    pub fn is_pending(&self) -> bool {
        self.state.borrow().pending.is_some()
    }

    /// Frames requested so far.
    pub fn requested(&self) -> u64 {
        self.state.borrow().requested
    }
}
