use crate::model::{LocationQuery, WeatherResponse};

/// The caller's current location and the name to display for it.
///
/// A coordinate query has no name until a response arrives; the model's
/// answer becomes the canonical name and later queries use that name.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationState {
    query: LocationQuery,
    display_name: Option<String>,
}

impl LocationState {
    pub fn new(query: LocationQuery) -> Self {
        let display_name = match &query {
            LocationQuery::Name(name) => Some(name.trim().to_string()),
            LocationQuery::Coordinates { .. } => None,
        };
        Self { query, display_name }
    }

    pub fn query(&self) -> &LocationQuery {
        &self.query
    }

    /// `None` while a coordinate query is still unresolved.
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Adopt the location name reported in `response`.
    ///
    /// Returns `true` when the state changed. A blank name is ignored.
    pub fn apply(&mut self, response: &WeatherResponse) -> bool {
        let resolved = response.location.trim();
        if resolved.is_empty() || self.display_name.as_deref() == Some(resolved) {
            return false;
        }

        self.display_name = Some(resolved.to_string());
        if self.query.is_coordinates() {
            self.query = LocationQuery::name(resolved);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WeatherDataPoint;

    fn response(location: &str) -> WeatherResponse {
        WeatherResponse {
            location: location.to_string(),
            summary: String::new(),
            alerts: None,
            data: vec![WeatherDataPoint {
                date: "2024-10-27".into(),
                label: "Sun".into(),
                temp_high: 20.0,
                temp_low: 10.0,
                precipitation: None,
                condition: "Sunny".into(),
                humidity: None,
                description: None,
            }],
            grounding_sources: None,
        }
    }

    #[test]
    fn coordinates_adopt_the_resolved_name() {
        let mut state = LocationState::new(LocationQuery::coordinates(31.2, 121.5));
        assert_eq!(state.display_name(), None);

        assert!(state.apply(&response("Shanghai")));
        assert_eq!(state.display_name(), Some("Shanghai"));
        assert_eq!(state.query(), &LocationQuery::name("Shanghai"));
    }

    #[test]
    fn blank_name_leaves_state_unchanged() {
        let mut state = LocationState::new(LocationQuery::coordinates(31.2, 121.5));
        assert!(!state.apply(&response("  ")));
        assert_eq!(state.display_name(), None);
        assert!(state.query().is_coordinates());
    }

    #[test]
    fn name_query_takes_the_canonical_spelling_but_keeps_query() {
        let mut state = LocationState::new(LocationQuery::name("beijing"));
        assert_eq!(state.display_name(), Some("beijing"));

        assert!(state.apply(&response("Beijing")));
        assert_eq!(state.display_name(), Some("Beijing"));
        assert_eq!(state.query(), &LocationQuery::name("beijing"));

        assert!(!state.apply(&response("Beijing")));
    }
}
