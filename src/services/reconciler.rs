use crate::models::SeriesPoint;

/// Number of daily points kept per series.
pub const HISTORY_WINDOW: usize = 7;

/// Merges one observation into a series history.
///
/// Same-day observations overwrite the existing point; a new day appends.
/// The result stays oldest-first and never exceeds [`HISTORY_WINDOW`];
/// truncation drops the oldest entries from the front.
pub fn reconcile(history: &[SeriesPoint], today_key: &str, new_value: f64) -> Vec<SeriesPoint> {
    let mut updated = history.to_vec();

    match updated.iter_mut().find(|point| point.date == today_key) {
        Some(point) => point.value = new_value,
        None => updated.push(SeriesPoint {
            date: today_key.to_string(),
            value: new_value,
        }),
    }

    if updated.len() > HISTORY_WINDOW {
        let excess = updated.len() - HISTORY_WINDOW;
        updated.drain(..excess);
    }

    updated
}

/// Whether a reconciled series differs from what is stored.
pub fn should_persist(old: &[SeriesPoint], new: &[SeriesPoint]) -> bool {
    old != new
}

/// The chart's value sequence, oldest first.
pub fn values(history: &[SeriesPoint]) -> Vec<f64> {
    history.iter().map(|point| point.value).collect()
}

/// The chart's date-label sequence, parallel to [`values`].
pub fn dates(history: &[SeriesPoint]) -> Vec<String> {
    history.iter().map(|point| point.date.clone()).collect()
}
