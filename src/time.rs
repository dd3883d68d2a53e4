use chrono::{DateTime, Datelike, Days, Local, Months, NaiveDate, NaiveTime, TimeZone};

/// Returns the date one calendar month before `date`.
///
/// This is naive year/month arithmetic: the day of month is kept and any
/// overflow rolls into the following month, so `2024-03-31` gives
/// `2024-03-02` (February 2024 has 29 days). It is not a 30-day window.
///
/// Returns `None` only when the result would leave chrono's date range.
pub fn one_month_before(date: NaiveDate) -> Option<NaiveDate> {
    let first = date.with_day(1)?;
    let first = first.checked_sub_months(Months::new(1))?;
    first.checked_add_days(Days::new(u64::from(date.day() - 1)))
}

/// Unix timestamp of local midnight at the start of `date`.
pub fn start_of_day(date: NaiveDate) -> i64 {
    let midnight = date.and_time(NaiveTime::MIN);
    match Local.from_local_datetime(&midnight).earliest() {
        Some(local) => local.timestamp(),
        // Midnight skipped by a DST change in this zone
        None => midnight.and_utc().timestamp(),
    }
}

/// Unix timestamp from which a row counts as created "in the last month".
pub fn last_month_threshold(now: DateTime<Local>) -> Option<i64> {
    one_month_before(now.date_naive()).map(start_of_day)
}

pub fn current_timestamp() -> i64 {
    Local::now().timestamp()
}
