use chrono::{Datelike, Local, NaiveDate, Weekday};

/// NSE/BSE trade Monday through Friday. No exchange-holiday calendar.
pub fn is_market_open(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn is_market_open_today() -> bool {
    is_market_open(Local::now().date_naive())
}
