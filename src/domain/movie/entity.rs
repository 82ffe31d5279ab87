use serde::{Deserialize, Serialize};

/// Title used when upstream provides neither a title nor an original title.
pub const UNTITLED: &str = "Untitled";

/// Id used when upstream omits the movie id.
pub const UNKNOWN_MOVIE_ID: i64 = -1;

/// Lean movie representation used throughout the app.
/// Immutable once built; favorites persist their own copy of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieSummary {
    pub id: i64,
    pub title: String,
    pub average_rating: f64,
    pub overview: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
}

impl MovieSummary {
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            average_rating: 0.0,
            overview: String::new(),
            poster_path: None,
            release_date: None,
        }
    }

    /// Full poster URL, `<image_base_url><poster_path>`.
    pub fn poster_url(&self, image_base_url: &str) -> Option<String> {
        self.poster_path
            .as_ref()
            .map(|path| format!("{}{}", image_base_url.trim_end_matches('/'), path))
    }
}

impl std::fmt::Display for MovieSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:.1})", self.title, self.average_rating)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poster_url_joins_base_and_path() {
        let mut movie = MovieSummary::new(1, "Heat");
        movie.poster_path = Some("/abc.jpg".to_string());
        assert_eq!(
            movie.poster_url("https://image.tmdb.org/t/p/w200").as_deref(),
            Some("https://image.tmdb.org/t/p/w200/abc.jpg")
        );
    }

    #[test]
    fn test_poster_url_absent_without_poster() {
        assert!(MovieSummary::new(1, "Heat").poster_url("https://img").is_none());
    }

    #[test]
    fn test_optional_fields_omitted_in_json() {
        let json = serde_json::to_string(&MovieSummary::new(7, "Alien")).unwrap();
        assert_eq!(
            json,
            r#"{"id":7,"title":"Alien","averageRating":0.0,"overview":""}"#
        );
    }
}
