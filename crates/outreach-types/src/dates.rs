use chrono::NaiveDate;

/// Inclusive calendar-date window used to select a promotion's audience.
///
/// Parsing fails closed: a missing, blank, or malformed bound yields no
/// window at all, and no window always means the empty cohort. A bad date
/// must never widen the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateWindow {
    /// Parse both bounds as ISO `%Y-%m-%d` dates. Returns `None` unless
    /// both are present and valid.
    pub fn parse(date_from: Option<&str>, date_to: Option<&str>) -> Option<Self> {
        let from = parse_day(date_from?)?;
        let to = parse_day(date_to?)?;
        Some(Self { from, to })
    }

    /// Full-day text bounds for the store's `YYYY-MM-DD HH:MM:SS`
    /// timestamps: start of `from` through end of `to`, both inclusive.
    pub fn bounds(&self) -> (String, String) {
        (
            format!("{} 00:00:00", self.from.format("%Y-%m-%d")),
            format!("{} 23:59:59", self.to.format("%Y-%m-%d")),
        )
    }
}

fn parse_day(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}
