use crate::constants::DATE_FORMAT;
use crate::errors::{AppError, AppResult};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Username and password for the identity provider.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Creates credentials, rejecting empty values.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> AppResult<Self> {
        let username = username.into();
        let password = password.into();
        if username.trim().is_empty() {
            return Err(AppError::InvalidInput("Username must not be empty".into()));
        }
        if password.is_empty() {
            return Err(AppError::InvalidInput("Password must not be empty".into()));
        }
        Ok(Self { username, password })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Bearer token issued by the identity provider.
///
/// The expiry is computed from the `expires_in` field of the token response at the
/// moment the token is received. Tokens without a declared lifetime never expire locally.
#[derive(Clone)]
pub struct AccessToken {
    value: String,
    expires_at: Option<Instant>,
}

impl AccessToken {
    pub fn new(value: impl Into<String>, expires_in_secs: Option<u64>) -> Self {
        Self {
            value: value.into(),
            expires_at: expires_in_secs.map(|secs| Instant::now() + Duration::from_secs(secs)),
        }
    }

    /// The raw bearer string.
    pub fn secret(&self) -> &str {
        &self.value
    }

    /// Returns `true` if the token expires within `margin` from now.
    pub fn is_expired(&self, margin: Duration) -> bool {
        match self.expires_at {
            Some(expires_at) => Instant::now() + margin >= expires_at,
            None => false,
        }
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"***")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Closed polygon restricting search results, as (longitude, latitude) pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaOfInterest {
    ring: Vec<(f64, f64)>,
}

impl AreaOfInterest {
    /// Builds a rectangular area from its corner coordinates (WGS-84 degrees).
    ///
    /// The ring starts and ends at `(lon_min, lat_min)` and runs counter-clockwise.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if a coordinate is not finite, out of range, or if
    /// a minimum is not strictly lower than its maximum.
    pub fn rectangle(lon_min: f64, lat_min: f64, lon_max: f64, lat_max: f64) -> AppResult<Self> {
        let coords = [lon_min, lat_min, lon_max, lat_max];
        if coords.iter().any(|c| !c.is_finite()) {
            return Err(AppError::InvalidInput(
                "Area of interest coordinates must be finite numbers".into(),
            ));
        }
        for lon in [lon_min, lon_max] {
            if !(-180.0..=180.0).contains(&lon) {
                return Err(AppError::InvalidInput(format!(
                    "Longitude {lon} is outside [-180, 180]"
                )));
            }
        }
        for lat in [lat_min, lat_max] {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(AppError::InvalidInput(format!(
                    "Latitude {lat} is outside [-90, 90]"
                )));
            }
        }
        if lon_min >= lon_max || lat_min >= lat_max {
            return Err(AppError::InvalidInput(format!(
                "Area of interest is empty: ({lon_min}, {lat_min}) - ({lon_max}, {lat_max})"
            )));
        }

        Ok(Self {
            ring: vec![
                (lon_min, lat_min),
                (lon_max, lat_min),
                (lon_max, lat_max),
                (lon_min, lat_max),
                (lon_min, lat_min),
            ],
        })
    }

    pub fn ring(&self) -> &[(f64, f64)] {
        &self.ring
    }

    /// Renders the polygon as WKT, e.g. `POLYGON((0 0,1 0,1 1,0 1,0 0))`.
    pub fn to_wkt(&self) -> String {
        let points: Vec<String> = self
            .ring
            .iter()
            .map(|(lon, lat)| format!("{lon} {lat}"))
            .collect();
        format!("POLYGON(({}))", points.join(","))
    }
}

/// Calendar date range: `start` is inclusive, `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> AppResult<Self> {
        if start >= end {
            return Err(AppError::InvalidInput(format!(
                "Start date {start} must be before end date {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Parses two `YYYY-MM-DD` dates.
    pub fn parse(start: &str, end: &str) -> AppResult<Self> {
        let start = NaiveDate::parse_from_str(start.trim(), DATE_FORMAT)?;
        let end = NaiveDate::parse_from_str(end.trim(), DATE_FORMAT)?;
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

/// Complete catalog search filter. Only obtainable through [`SearchFilterBuilder::build`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchFilter {
    collection: String,
    name_contains: String,
    area: AreaOfInterest,
    dates: DateRange,
}

impl SearchFilter {
    pub fn builder(collection: impl Into<String>) -> SearchFilterBuilder {
        SearchFilterBuilder {
            collection: collection.into(),
            name_contains: String::new(),
            area: None,
            dates: None,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn name_contains(&self) -> &str {
        &self.name_contains
    }

    pub fn area(&self) -> &AreaOfInterest {
        &self.area
    }

    pub fn dates(&self) -> &DateRange {
        &self.dates
    }
}

#[derive(Debug, Clone)]
pub struct SearchFilterBuilder {
    collection: String,
    name_contains: String,
    area: Option<AreaOfInterest>,
    dates: Option<DateRange>,
}

impl SearchFilterBuilder {
    pub fn name_contains(mut self, substring: impl Into<String>) -> Self {
        self.name_contains = substring.into();
        self
    }

    pub fn area(mut self, area: AreaOfInterest) -> Self {
        self.area = Some(area);
        self
    }

    pub fn dates(mut self, dates: DateRange) -> Self {
        self.dates = Some(dates);
        self
    }

    /// # Errors
    ///
    /// Returns `QueryPrecondition` if the area of interest or the date range was
    /// never set, and `InvalidInput` if the collection name is empty.
    pub fn build(self) -> AppResult<SearchFilter> {
        let area = self.area.ok_or_else(|| {
            AppError::QueryPrecondition("area of interest has not been set".into())
        })?;
        let dates = self
            .dates
            .ok_or_else(|| AppError::QueryPrecondition("date range has not been set".into()))?;
        if self.collection.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Collection name must not be empty".into(),
            ));
        }

        Ok(SearchFilter {
            collection: self.collection,
            name_contains: self.name_contains,
            area,
            dates,
        })
    }
}

/// A product returned by the catalog listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogItem {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "ContentType", default)]
    pub content_type: Option<String>,
}

/// What happened to a single product during a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The archive was written to `path`.
    Written { path: PathBuf, bytes: u64 },
    /// The server answered with something other than an archive.
    SkippedContentType(String),
    /// The archive filename did not contain the requested substring.
    SkippedName(String),
}
