use std::cell::Cell;

use crate::backend::GlBackend;

/// Tracks which program the driver currently has bound.
///
/// Program switches are the most expensive state change the renderer makes,
/// so every uniform write and draw funnels through [`ProgramBinder::bind`],
/// which only reaches the driver when the active program actually changes.
#[derive(Debug)]
pub struct ProgramBinder<P: Copy + PartialEq> {
    active: Cell<Option<P>>,
}

impl<P: Copy + PartialEq> Default for ProgramBinder<P> {
    fn default() -> Self {
        Self {
            active: Cell::new(None),
        }
    }
}

impl<P: Copy + PartialEq> ProgramBinder<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `program` current. Returns `true` when a bind was issued.
    pub fn bind<B>(&self, backend: &B, program: P) -> bool
    where
        B: GlBackend<Program = P>,
    {
        if self.active.get() == Some(program) {
            return false;
        }
        backend.use_program(Some(program));
        self.active.set(Some(program));
        true
    }

    pub fn active(&self) -> Option<P> {
        self.active.get()
    }

    /// Stops tracking `program` if it is the active one, so a recycled handle
    /// is rebound rather than assumed current.
    pub fn forget(&self, program: P) {
        if self.active.get() == Some(program) {
            self.active.set(None);
        }
    }

    /// Forces the next [`ProgramBinder::bind`] to reach the driver.
    pub fn invalidate(&self) {
        self.active.set(None);
    }
}
