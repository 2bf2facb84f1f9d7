//! DST transition policies for local booking times.

/// Policy for local times that fall on a DST transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DstPolicy {
    /// Gap times (e.g. 2:30 AM during spring forward) use the offset in force
    /// before the gap, landing one gap-length later on the wall clock.
    /// Repeated fall-back times resolve to the earlier instant.
    #[default]
    Compatible,
    /// Gap and repeated times are errors.
    Reject,
}
