/// Percentage of completed items, rounded to the nearest integer.
///
/// `total` is the post-filter item count; callers must not ask for progress
/// of an empty run.
pub fn progress_percent(completed: usize, total: usize) -> u8 {
    debug_assert!(total > 0, "progress over an empty batch");
    debug_assert!(completed <= total);
    ((completed as f64 / total as f64) * 100.0).round() as u8
}
