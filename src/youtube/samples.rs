//! Built-in catalog ingested when the platform is unreachable and the
//! `sample` failure policy is configured.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;

use crate::entities::NewVideo;

#[derive(Debug, Clone)]
pub struct SampleVideo {
    pub title: &'static str,
    pub description: &'static str,
    pub youtube_id: &'static str,
    pub duration: &'static str,
    pub published_on: (i32, u32, u32),
    pub keywords: &'static [&'static str],
}

impl SampleVideo {
    pub fn thumbnail_url(&self) -> String {
        format!("https://img.youtube.com/vi/{}/maxresdefault.jpg", self.youtube_id)
    }

    fn published_at(&self) -> DateTime<Utc> {
        let (y, m, d) = self.published_on;
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
            .unwrap_or_else(Utc::now)
    }

    pub fn to_new_video(&self, category: &str) -> NewVideo {
        NewVideo {
            title: self.title.to_string(),
            description: Some(self.description.to_string()),
            youtube_id: self.youtube_id.to_string(),
            thumbnail_url: self.thumbnail_url(),
            duration: self.duration.to_string(),
            view_count: None,
            category: category.to_string(),
            keywords: self.keywords.iter().map(|k| k.to_string()).collect(),
            published_at: self.published_at(),
        }
    }

    /// Case-insensitive substring match in either direction against any
    /// category keyword.
    pub fn matches_any(&self, category_keywords: &[String]) -> bool {
        self.keywords.iter().any(|own| {
            let own = own.to_lowercase();
            category_keywords.iter().any(|theirs| {
                let theirs = theirs.trim().to_lowercase();
                !theirs.is_empty() && (own.contains(&theirs) || theirs.contains(&own))
            })
        })
    }
}

static SAMPLES: Lazy<HashMap<&'static str, Vec<SampleVideo>>> = Lazy::new(|| {
    let mut catalog = HashMap::new();
    catalog.insert(
        "music",
        vec![
            SampleVideo {
                title: "Amazing Grace - How Sweet the Sound",
                description: "Classic hymn performance with beautiful orchestral arrangement",
                youtube_id: "CDdvReNKKuk",
                duration: "4:32",
                published_on: (2023, 12, 15),
                keywords: &["worship", "hymn", "grace", "classic"],
            },
            SampleVideo {
                title: "10,000 Reasons (Bless the Lord) - Matt Redman",
                description: "Powerful worship song with lyrics that inspire praise",
                youtube_id: "DXDGE_lRI0E",
                duration: "4:14",
                published_on: (2023, 11, 20),
                keywords: &["praise", "worship", "contemporary", "blessing"],
            },
            SampleVideo {
                title: "How Great Thou Art - Celtic Woman",
                description: "Beautiful rendition of the beloved hymn",
                youtube_id: "gTHy2TZk-WM",
                duration: "5:18",
                published_on: (2023, 10, 10),
                keywords: &["hymn", "celtic", "greatness", "worship"],
            },
            SampleVideo {
                title: "Oceans (Where Feet May Fail) - Hillsong UNITED",
                description: "Inspiring worship song about faith and trust",
                youtube_id: "dy9nwe9_xzw",
                duration: "8:58",
                published_on: (2023, 9, 25),
                keywords: &["faith", "trust", "contemporary", "hillsong"],
            },
            SampleVideo {
                title: "Great Are You Lord - All Sons & Daughters",
                description: "Modern worship song celebrating God's greatness",
                youtube_id: "OhL0zMrOSHQ",
                duration: "5:22",
                published_on: (2023, 8, 12),
                keywords: &["worship", "praise", "greatness", "contemporary"],
            },
        ],
    );
    catalog.insert(
        "sermon",
        vec![
            SampleVideo {
                title: "The Power of Faith - Joel Osteen",
                description: "Inspiring message about the transformative power of faith",
                youtube_id: "5Zc3gJJsKxs",
                duration: "28:45",
                published_on: (2023, 12, 10),
                keywords: &["faith", "inspiration", "transformation", "hope"],
            },
            SampleVideo {
                title: "Walking in God's Purpose - Joyce Meyer",
                description: "Teaching about discovering and living God's purpose for your life",
                youtube_id: "EXz9hMGV3oU",
                duration: "22:15",
                published_on: (2023, 11, 28),
                keywords: &["purpose", "calling", "guidance", "ministry"],
            },
            SampleVideo {
                title: "The Grace of God - Charles Stanley",
                description: "Deep teaching on God's amazing grace and mercy",
                youtube_id: "1uPgQ4T3B2k",
                duration: "35:20",
                published_on: (2023, 10, 15),
                keywords: &["grace", "mercy", "teaching", "salvation"],
            },
            SampleVideo {
                title: "Overcoming Fear with Faith - TD Jakes",
                description: "Powerful sermon about conquering fear through faith",
                youtube_id: "yTCDVfMz15M",
                duration: "42:18",
                published_on: (2023, 9, 5),
                keywords: &["fear", "faith", "courage", "victory"],
            },
            SampleVideo {
                title: "The Heart of Worship - Francis Chan",
                description: "Teaching on what true worship means to God",
                youtube_id: "PgLe1c0Q8YI",
                duration: "31:42",
                published_on: (2023, 8, 20),
                keywords: &["worship", "heart", "devotion", "spirituality"],
            },
        ],
    );
    catalog.insert(
        "other",
        vec![
            SampleVideo {
                title: "My Testimony - From Darkness to Light",
                description: "Personal testimony of transformation and hope",
                youtube_id: "hFZFjoX2cGg",
                duration: "12:30",
                published_on: (2023, 12, 1),
                keywords: &["testimony", "transformation", "hope", "personal"],
            },
            SampleVideo {
                title: "Daily Prayer and Devotion Guide",
                description: "Practical guide for developing a strong prayer life",
                youtube_id: "B14nM3OoA7M",
                duration: "18:45",
                published_on: (2023, 11, 15),
                keywords: &["prayer", "devotion", "daily", "spiritual growth"],
            },
            SampleVideo {
                title: "Biblical Wisdom for Modern Life",
                description: "Applying ancient biblical principles to today's challenges",
                youtube_id: "7eCWNkQB-lE",
                duration: "25:10",
                published_on: (2023, 10, 30),
                keywords: &["wisdom", "biblical", "modern", "application"],
            },
            SampleVideo {
                title: "The Power of Community in Faith",
                description: "Understanding the importance of Christian community",
                youtube_id: "u-1f_MJuy1A",
                duration: "16:22",
                published_on: (2023, 9, 18),
                keywords: &["community", "fellowship", "church", "unity"],
            },
            SampleVideo {
                title: "Finding Peace in Difficult Times",
                description: "Encouragement and guidance for challenging seasons",
                youtube_id: "m8C0V3K6qP0",
                duration: "20:15",
                published_on: (2023, 8, 28),
                keywords: &["peace", "difficult times", "encouragement", "comfort"],
            },
        ],
    );
    catalog
});

/// Samples for a category (by lowercased name) sharing at least one keyword
/// with it. Unknown categories yield nothing.
pub fn matching_samples(category_name: &str, keywords: &[String]) -> Vec<&'static SampleVideo> {
    SAMPLES
        .get(category_name.trim().to_lowercase().as_str())
        .map(|videos| videos.iter().filter(|v| v.matches_any(keywords)).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kw(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn filters_by_keyword_overlap() {
        let picked = matching_samples("Music", &kw(&["Hymn"]));
        let ids: Vec<&str> = picked.iter().map(|v| v.youtube_id).collect();
        assert_eq!(ids, vec!["CDdvReNKKuk", "gTHy2TZk-WM"]);
    }

    #[test]
    fn substring_match_works_both_ways() {
        // "difficult" is contained in the sample keyword "difficult times"
        let picked = matching_samples("other", &kw(&["difficult"]));
        assert_eq!(picked.len(), 1);
        // "spiritual growth journey" contains the sample keyword "spiritual growth"
        let picked = matching_samples("other", &kw(&["spiritual growth journey"]));
        assert_eq!(picked[0].youtube_id, "B14nM3OoA7M");
    }

    #[test]
    fn unknown_category_or_no_overlap_is_empty() {
        assert!(matching_samples("podcasts", &kw(&["worship"])).is_empty());
        assert!(matching_samples("sermon", &kw(&["jazz"])).is_empty());
        assert!(matching_samples("sermon", &kw(&[" "])).is_empty());
    }

    #[test]
    fn converts_to_new_video() {
        let sample = matching_samples("sermon", &kw(&["mercy"]))[0];
        let video = sample.to_new_video("sermon");
        assert_eq!(video.youtube_id, "1uPgQ4T3B2k");
        assert_eq!(video.category, "sermon");
        assert_eq!(
            video.thumbnail_url,
            "https://img.youtube.com/vi/1uPgQ4T3B2k/maxresdefault.jpg"
        );
        assert_eq!(video.published_at.format("%Y-%m-%d").to_string(), "2023-10-15");
    }
}
