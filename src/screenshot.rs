use crate::event::model::Screenshot;

/// Cypress puts this into the file name of every screenshot it takes on failure.
pub const FAILURE_MARKER: &str = "(failed";

pub fn is_failure_capture(screenshot: &Screenshot) -> bool {
    screenshot.path.contains(FAILURE_MARKER)
}

/// Picks the failure screenshot of the latest attempt of `test_id`.
///
/// Screenshots without the failure marker were taken by the test itself and
/// are never attached. If two failure screenshots share the highest attempt
/// index the later one in `screenshots` wins.
pub fn select_failure_screenshot<'a>(
    test_id: &str,
    screenshots: &'a [Screenshot],
) -> Option<&'a Screenshot> {
    screenshots
        .iter()
        .filter(|screenshot| screenshot.test_id == test_id)
        .filter(|screenshot| is_failure_capture(screenshot))
        .max_by_key(|screenshot| screenshot.test_attempt_index)
}
