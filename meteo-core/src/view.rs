use crate::model::{City, CurrentConditions, ForecastDay, WeatherReport};

/// Sequence number handed out for each weather request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

/// What the home screen shows. Loading, error and weather are independent
/// fields; the renderer decides how to combine them.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    city: Option<City>,
    current: Option<CurrentConditions>,
    forecast: Vec<ForecastDay>,
    loading: bool,
    error: Option<String>,
    latest: u64,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current selection. Clears any error, leaves loading alone.
    pub fn set_weather(&mut self, city: City, report: WeatherReport) {
        tracing::debug!("View now showing {}", city.name);
        self.city = Some(city);
        self.current = Some(report.current);
        self.forecast = report.forecast;
        self.error = None;
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Issue a ticket newer than every ticket handed out before.
    pub fn begin_request(&mut self) -> RequestTicket {
        self.latest += 1;
        RequestTicket(self.latest)
    }

    /// True while no newer request has been started.
    pub fn is_latest(&self, ticket: RequestTicket) -> bool {
        ticket.0 == self.latest
    }

    pub fn city(&self) -> Option<&City> {
        self.city.as_ref()
    }

    pub fn current(&self) -> Option<&CurrentConditions> {
        self.current.as_ref()
    }

    pub fn forecast(&self) -> &[ForecastDay] {
        &self.forecast
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn has_weather(&self) -> bool {
        self.city.is_some() && self.current.is_some()
    }
}
