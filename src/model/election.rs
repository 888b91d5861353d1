use std::fmt::{Display, Formatter};

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const ID: &str = "_id";
const TITLE: &str = "title";
const START_DATE: &str = "startDate";
const END_DATE: &str = "endDate";
const POSITIONS: &str = "positions";

/// An election as the backend describes it.
///
/// The backend's object is kept exactly as received and only interpreted
/// through the accessors, so an election always re-serializes to the JSON
/// the server sent. A missing, null or oddly shaped field never stops the
/// election from decoding; the accessor for it just comes back empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Election(Map<String, Value>);

impl Election {
    /// A new election, ready to be submitted for creation.
    pub fn new(
        title: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        positions: Vec<String>,
    ) -> Self {
        let mut attributes = Map::new();
        attributes.insert(TITLE.to_string(), Value::String(title.into()));
        attributes.insert(
            START_DATE.to_string(),
            Value::String(ElectionDate::from(start_date).to_string()),
        );
        attributes.insert(
            END_DATE.to_string(),
            Value::String(ElectionDate::from(end_date).to_string()),
        );
        attributes.insert(
            POSITIONS.to_string(),
            positions.into_iter().map(Value::String).collect(),
        );
        Self(attributes)
    }

    /// Backend-assigned unique ID. Absent on elections not yet created.
    pub fn id(&self) -> Option<&str> {
        self.0.get(ID).and_then(Value::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.0.get(TITLE).and_then(Value::as_str)
    }

    /// First day of voting, if the backend sent a readable date.
    pub fn start_date(&self) -> Option<ElectionDate> {
        self.date(START_DATE)
    }

    /// Last day of voting, if the backend sent a readable date.
    pub fn end_date(&self) -> Option<ElectionDate> {
        self.date(END_DATE)
    }

    /// Positions being elected, in display order. Each entry is whatever the
    /// backend uses to describe a position, usually a plain name.
    pub fn positions(&self) -> &[Value] {
        match self.0.get(POSITIONS) {
            Some(Value::Array(positions)) => positions,
            _ => &[],
        }
    }

    pub fn position_count(&self) -> usize {
        self.positions().len()
    }

    /// Look up an arbitrary attribute.
    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.0.get(attribute)
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_attributes(self) -> Map<String, Value> {
        self.0
    }

    fn date(&self, key: &str) -> Option<ElectionDate> {
        self.0.get(key)?.as_str()?.parse().ok()
    }
}

/// A calendar date that remembers how the backend wrote it.
///
/// The backend sends either plain `YYYY-MM-DD` dates or full RFC 3339
/// timestamps; both are accepted and displayed unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElectionDate {
    date: NaiveDate,
    raw: String,
}

impl ElectionDate {
    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

impl From<NaiveDate> for ElectionDate {
    fn from(date: NaiveDate) -> Self {
        Self {
            date,
            raw: date.format("%Y-%m-%d").to_string(),
        }
    }
}

impl Display for ElectionDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl std::str::FromStr for ElectionDate {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let date = match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            Ok(date) => date,
            Err(_) => DateTime::parse_from_rfc3339(s)?.date_naive(),
        };
        Ok(Self {
            date,
            raw: s.to_string(),
        })
    }
}
