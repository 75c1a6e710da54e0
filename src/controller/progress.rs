/// Synthetic progress shown while a job runs.
///
/// The backend reports no real progress, so this is a UX approximation and
/// not a percentage of work done: it moves by a fixed step per status
/// response, stays at or below a ceiling until the backend reports
/// completion, and only then jumps to 100. It never decreases for the life of
/// one job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct ProgressEstimate(u8);

impl ProgressEstimate {
    pub const COMPLETE: u8 = 100;

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn fraction(self) -> f32 {
        f32::from(self.0) / 100.0
    }

    pub fn is_complete(self) -> bool {
        self.0 >= Self::COMPLETE
    }

    /// One more "still processing" observation.
    pub fn advance(&mut self, step: u8, ceiling: u8) {
        let ceiling = ceiling.min(Self::COMPLETE - 1);
        let next = self.0.saturating_add(step).min(ceiling);
        self.0 = self.0.max(next);
    }

    pub fn complete(&mut self) {
        self.0 = Self::COMPLETE;
    }
}
