//! Course statistics panel: one `GET /courses` at startup.

use crate::client::Backend;
use crate::messages::CourseStats;
use crate::sanitize::escape_html;
use crate::view::View;

pub const NO_COURSES_HTML: &str = "<span class=\"no-courses\">No courses available</span>";
pub const LOAD_FAILED_HTML: &str = "<span class=\"error\">Failed to load courses</span>";

/// Fetch course stats and fill the count and title regions.
///
/// On failure both regions get safe defaults (`0` and an error placeholder)
/// and `None` is returned; the error never leaves this function.
pub async fn load_course_stats<B, V>(backend: &B, view: &mut V) -> Option<CourseStats>
where
    B: Backend + ?Sized,
    V: View + ?Sized,
{
    match backend.course_stats().await {
        Ok(stats) => {
            tracing::debug!(total = stats.total_courses, "course stats loaded");
            view.set_course_count(&stats.total_courses.to_string());
            view.set_course_titles(&titles_markup(&stats.course_titles));
            Some(stats)
        }
        Err(e) => {
            tracing::warn!("failed to load course stats: {e}");
            view.set_course_count("0");
            view.set_course_titles(LOAD_FAILED_HTML);
            None
        }
    }
}

/// One item per title, or the "no courses" placeholder for an empty list.
pub fn titles_markup(titles: &[String]) -> String {
    if titles.is_empty() {
        return NO_COURSES_HTML.to_string();
    }
    titles
        .iter()
        .map(|t| format!("<div class=\"course-title-item\">{}</div>", escape_html(t)))
        .collect()
}
