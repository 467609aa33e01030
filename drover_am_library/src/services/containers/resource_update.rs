use crate::rm_api::{Resource, UpdateKind};

/// The RM allocates memory in 1 GiB granularity; comparisons must happen at
/// that resolution or we issue resize requests the RM will reject.
pub const MEMORY_GRANULARITY_MB: u64 = 1024;

/// Decide whether moving `current` to `target` is a resize, and in which
/// direction. `None` means no request should be issued: either side is unset,
/// the resources agree at allocation granularity, or the change mixes
/// directions (one dimension up, another down) and cannot be expressed in a
/// single request — that case waits for a later cycle once the role catalog
/// converges.
pub fn classify(current: &Resource, target: &Resource) -> Option<UpdateKind> {
    if current.is_unset() || target.is_unset() {
        return None;
    }
    let current = current.round_memory_up(MEMORY_GRANULARITY_MB);
    let target = target.round_memory_up(MEMORY_GRANULARITY_MB);
    if current.fits_in(&target) && target.fits_in(&current) {
        return None;
    }
    if target.fits_in(&current) {
        return Some(UpdateKind::Decrease);
    }
    if current.fits_in(&target) {
        return Some(UpdateKind::Increase);
    }
    None
}
