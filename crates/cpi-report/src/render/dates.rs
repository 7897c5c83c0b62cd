use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};

/// `2025년 11월 06일`
pub fn korean_date(date: NaiveDate) -> String {
    format!(
        "{}년 {:02}월 {:02}일",
        date.year(),
        date.month(),
        date.day()
    )
}

/// `2025년 11월`
pub fn korean_month(date: NaiveDate) -> String {
    format!("{}년 {:02}월", date.year(), date.month())
}

/// `2025년 11월 06일 14시 05분`
pub fn korean_timestamp(at: NaiveDateTime) -> String {
    format!(
        "{} {:02}시 {:02}분",
        korean_date(at.date()),
        at.hour(),
        at.minute()
    )
}

/// `2025. 11. 06.(목)`
pub fn dotted_date_with_weekday(date: NaiveDate) -> String {
    format!(
        "{}. {:02}. {:02}.({})",
        date.year(),
        date.month(),
        date.day(),
        korean_weekday(date.weekday())
    )
}

pub const fn korean_weekday(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "월",
        Weekday::Tue => "화",
        Weekday::Wed => "수",
        Weekday::Thu => "목",
        Weekday::Fri => "금",
        Weekday::Sat => "토",
        Weekday::Sun => "일",
    }
}
