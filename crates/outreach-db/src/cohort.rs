use outreach_types::dates::DateWindow;

/// Audience selection for a promotion: users who published exactly one ad
/// inside the window, most recently created first.
///
/// A filter without a valid window selects nobody. Query methods branch on
/// [`CohortFilter::bounds`] and skip the store entirely when it is `None`.
#[derive(Debug, Clone, Copy)]
pub struct CohortFilter {
    window: Option<DateWindow>,
}

impl CohortFilter {
    /// Build a filter from raw request parameters. Absent, blank, or
    /// unparseable bounds produce the empty filter.
    pub fn new(date_from: Option<&str>, date_to: Option<&str>) -> Self {
        Self {
            window: DateWindow::parse(date_from, date_to),
        }
    }

    pub fn from_window(window: DateWindow) -> Self {
        Self {
            window: Some(window),
        }
    }

    /// Full-day text bounds for the query, or `None` for the empty cohort.
    pub fn bounds(&self) -> Option<(String, String)> {
        self.window.map(|w| w.bounds())
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_none()
    }
}

/// Shared FROM/WHERE/GROUP clause of every cohort query. Eligibility is a
/// published ad with its timestamp inside the window, grouped per owner,
/// keeping owners whose in-window count is exactly one — two or more
/// disqualifies. `?1`/`?2` are the window bounds.
pub(crate) const COHORT_FROM: &str = "
     FROM users u
     JOIN ads a ON a.user_id = u.id
     WHERE a.status = 'published'
       AND a.published_at IS NOT NULL
       AND a.published_at BETWEEN ?1 AND ?2
     GROUP BY u.id
     HAVING COUNT(a.id) = 1";

/// Cohort ordering: newest users first, id as the stable tie-break so
/// pagination stays deterministic.
pub(crate) const COHORT_ORDER: &str = " ORDER BY u.created_at DESC, u.id DESC";
