//! Caller-frame recovery.
//!
//! A frame reached through a `Pending` link is found by scanning the live
//! frame stack; the call site that created the frame is then flagged so
//! that its later calls hand over a materialized link instead.

use std::rc::Rc;

use super::Engine;
use crate::frame::{CallerFrameAccess, CallerLink, Frame};

/// Performance warning recorded on a site's first slow caller-frame access.
pub const SLOW_CALLER_FRAME_WARNING: &str = "slow caller frame access";

impl Engine {
    /// The frame that called `frame`. At top level this is `frame` itself;
    /// a wrapper frame answers for the frame it runs on behalf of.
    ///
    /// `access` is the state of the site asking (for example a
    /// `parent.frame()` call).
    pub fn caller_frame(&self, frame: &Rc<Frame>, access: &CallerFrameAccess) -> Rc<Frame> {
        match frame.caller() {
            CallerLink::Materialized(caller) => Rc::clone(caller),
            CallerLink::TopLevel => Rc::clone(frame),
            CallerLink::Inherited(owner) => self.caller_frame(owner, access),
            CallerLink::Pending(site) => {
                let first_at_access = access.enter_slow_path();
                let site_flagged = site.set_needs_caller_frame();
                self.bump_stats(|s| s.slow_caller_frame_accesses += 1);
                tracing::debug!(
                    frame = frame.name(),
                    first_at_access,
                    site_flagged,
                    "slow caller frame access"
                );
                if first_at_access && self.config.performance_warnings {
                    self.warnings.push(SLOW_CALLER_FRAME_WARNING);
                }
                self.find_caller_on_stack(frame)
                    .unwrap_or_else(|| Rc::clone(frame))
            }
        }
    }

    /// The frame directly below `frame` on the live stack, or the global
    /// frame when `frame` is the outermost one.
    fn find_caller_on_stack(&self, frame: &Rc<Frame>) -> Option<Rc<Frame>> {
        let frames = self.frames.borrow();
        let index = frames.iter().rposition(|f| Rc::ptr_eq(f, frame))?;
        Some(match index.checked_sub(1) {
            Some(below) => Rc::clone(&frames[below]),
            None => Rc::clone(&self.global_frame),
        })
    }
}
