//! US federal holiday calendar used to decide whether the markets trade today.
//!
//! Fixed-date holidays that fall on a weekend are observed on the nearest
//! weekday (Saturday on the Friday before, Sunday on the Monday after).

use chrono::{Datelike, Days, NaiveDate, Weekday};

/// Check whether `date` is a US federal holiday or an observed substitute.
pub fn is_us_holiday(date: NaiveDate) -> bool {
    // New Year's Day observed on Dec 31 belongs to the following year.
    [date.year(), date.year() + 1]
        .into_iter()
        .flat_map(us_holidays)
        .any(|holiday| holiday == date)
}

/// Check whether `date` is Monday to Friday and not a holiday.
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !is_us_holiday(date)
}

/// Every observed federal holiday of `year`.
fn us_holidays(year: i32) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(11);

    let mut fixed = |month, day| {
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            days.push(observed(date));
        }
    };
    fixed(1, 1);
    if year >= 2021 {
        fixed(6, 19);
    }
    fixed(7, 4);
    fixed(11, 11);
    fixed(12, 25);

    let floating = [
        (1, Weekday::Mon, 3),  // Martin Luther King Jr. Day
        (2, Weekday::Mon, 3),  // Washington's Birthday
        (9, Weekday::Mon, 1),  // Labor Day
        (10, Weekday::Mon, 2), // Columbus Day
        (11, Weekday::Thu, 4), // Thanksgiving
    ];
    days.extend(
        floating
            .into_iter()
            .filter_map(|(month, weekday, n)| NaiveDate::from_weekday_of_month_opt(year, month, weekday, n)),
    );
    days.extend(last_weekday_of_month(year, 5, Weekday::Mon)); // Memorial Day

    days
}

fn observed(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sat => date.checked_sub_days(Days::new(1)).unwrap_or(date),
        Weekday::Sun => date.checked_add_days(Days::new(1)).unwrap_or(date),
        _ => date,
    }
}

fn last_weekday_of_month(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, weekday, 5)
        .or_else(|| NaiveDate::from_weekday_of_month_opt(year, month, weekday, 4))
}
