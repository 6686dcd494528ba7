//! Display strings for view counts and publish ages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
    Ko,
}

impl Locale {
    /// Unknown or missing tags fall back to English.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag.map(|t| t.trim().to_lowercase()).as_deref() {
            Some("es") => Locale::Es,
            Some("ko") => Locale::Ko,
            _ => Locale::En,
        }
    }

    fn views_word(self) -> &'static str {
        match self {
            Locale::En => "views",
            Locale::Es => "visualizaciones",
            Locale::Ko => "조회수",
        }
    }
}

pub fn compact_number(n: i64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

pub fn format_views(n: i64, locale: Locale) -> String {
    format!("{} {}", compact_number(n), locale.views_word())
}

enum AgeUnit {
    Days,
    Weeks,
    Months,
}

pub fn format_time_ago(published: DateTime<Utc>, now: DateTime<Utc>, locale: Locale) -> String {
    let seconds = (now - published).num_seconds().unsigned_abs();
    let days = seconds.div_ceil(86_400);

    let (count, unit) = if days < 7 {
        (days, AgeUnit::Days)
    } else if days < 30 {
        (days / 7, AgeUnit::Weeks)
    } else {
        (days / 30, AgeUnit::Months)
    };

    match locale {
        Locale::En => {
            let word = match unit {
                AgeUnit::Days => "days",
                AgeUnit::Weeks => "weeks",
                AgeUnit::Months => "months",
            };
            format!("{} {} ago", count, word)
        }
        Locale::Es => {
            let word = match unit {
                AgeUnit::Days => "días",
                AgeUnit::Weeks => "semanas",
                AgeUnit::Months => "meses",
            };
            format!("hace {} {}", count, word)
        }
        Locale::Ko => {
            let word = match unit {
                AgeUnit::Days => "일",
                AgeUnit::Weeks => "주",
                AgeUnit::Months => "개월",
            };
            format!("{}{} 전", count, word)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn views_are_compacted() {
        assert_eq!(format_views(1_500, Locale::En), "1.5K views");
        assert_eq!(format_views(2_300_000, Locale::En), "2.3M views");
        assert_eq!(format_views(999, Locale::En), "999 views");
        assert_eq!(format_views(1_000, Locale::Es), "1.0K visualizaciones");
        assert_eq!(format_views(12, Locale::Ko), "12 조회수");
    }

    #[test]
    fn age_buckets() {
        let now = Utc::now();
        assert_eq!(format_time_ago(now - Duration::days(3), now, Locale::En), "3 days ago");
        assert_eq!(format_time_ago(now - Duration::hours(30), now, Locale::En), "2 days ago");
        assert_eq!(format_time_ago(now - Duration::days(15), now, Locale::En), "2 weeks ago");
        assert_eq!(format_time_ago(now - Duration::days(95), now, Locale::En), "3 months ago");
    }

    #[test]
    fn localized_ages() {
        let now = Utc::now();
        assert_eq!(format_time_ago(now - Duration::days(14), now, Locale::Es), "hace 2 semanas");
        assert_eq!(format_time_ago(now - Duration::days(60), now, Locale::Ko), "2개월 전");
    }

    #[test]
    fn locale_tags() {
        assert_eq!(Locale::from_tag(Some("ES")), Locale::Es);
        assert_eq!(Locale::from_tag(Some("fr")), Locale::En);
        assert_eq!(Locale::from_tag(None), Locale::En);
    }
}
