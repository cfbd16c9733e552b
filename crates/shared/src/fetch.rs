use crate::geo::{haversine_distance, LatLng};

/// Identifies one issued feature fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// Remembers where features were last fetched and which fetch is newest.
///
/// Responses can arrive out of order; only the newest ticket may replace the
/// overlay layers, so a slow success can never overwrite a later fallback
/// (or the reverse).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchTracker {
    issued: u64,
    last_location: Option<LatLng>,
}

impl FetchTracker {
    /// Record a fetch at `at` and hand out its ticket.
    pub fn begin(&mut self, at: LatLng) -> FetchTicket {
        self.issued += 1;
        self.last_location = Some(at);
        FetchTicket(self.issued)
    }

    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.0 == self.issued
    }

    pub fn last_location(&self) -> Option<LatLng> {
        self.last_location
    }

    /// True before the first fetch, or once `center` has drifted at least
    /// `radius_m * threshold` metres from the last fetch location.
    pub fn should_refetch(&self, center: LatLng, radius_m: f64, threshold: f64) -> bool {
        match self.last_location {
            None => true,
            Some(last) => haversine_distance(center, last) >= radius_m * threshold,
        }
    }
}
