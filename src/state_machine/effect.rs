//! Effects produced by stage transitions

use super::Direction;

/// Side effects to execute after a transition.
///
/// Each effect yields the upload link that the transition's reply embeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Issue a file-conversion upload token bound to a direction
    IssueUploadLink { direction: Direction },

    /// Issue an image-search upload token
    IssueLensUploadLink,
}
