/// A trait for reporting progress of long-running operations.
pub trait Progress: Send + Sync {
    /// Set the phase label for the current operation (e.g., "Fetching", "Searching").
    fn set_phase(&self, phase: &str);

    /// Set the number of work items in the current phase.
    fn set_total(&self, total: u64);

    /// Record one completed work item, showing `message` next to the indicator.
    fn advance(&self, message: &str);

    /// Print a message line without disrupting the progress indicator.
    fn println(&self, msg: &str);

    /// Finish and clear the progress indicator.
    fn done(&self);
}
