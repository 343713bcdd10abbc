use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::UNSUPPORTED_MARKER;
use crate::error::{BsbLanError, BsbLanResult};

/// The controller accepts at most this many switching periods per day.
pub const MAX_SLOTS_PER_DAY: usize = 3;

/// One switching period within a day; serialized as `HH:MM-HH:MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeSlot {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeSlot {
    pub fn new(start: NaiveTime, end: NaiveTime) -> BsbLanResult<Self> {
        if start >= end {
            return Err(BsbLanError::InvalidTimeSlot(format!(
                "start time {} must be before end time {}",
                start.format("%H:%M"),
                end.format("%H:%M")
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse the device format `HH:MM-HH:MM`.
    pub fn parse(text: &str) -> BsbLanResult<Self> {
        let invalid =
            || BsbLanError::InvalidTimeSlot(format!("Invalid time slot format: '{}'", text));

        let (start, end) = text.trim().split_once('-').ok_or_else(invalid)?;
        let start = NaiveTime::parse_from_str(start.trim(), "%H:%M").map_err(|_| invalid())?;
        let end = NaiveTime::parse_from_str(end.trim(), "%H:%M").map_err(|_| invalid())?;
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

impl TryFrom<String> for TimeSlot {
    type Error = BsbLanError;

    fn try_from(text: String) -> BsbLanResult<Self> {
        Self::parse(&text)
    }
}

impl From<TimeSlot> for String {
    fn from(slot: TimeSlot) -> Self {
        slot.to_string()
    }
}

/// Switching periods of one day
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DaySchedule {
    slots: Vec<TimeSlot>,
}

impl DaySchedule {
    pub fn new(slots: Vec<TimeSlot>) -> BsbLanResult<Self> {
        if slots.len() > MAX_SLOTS_PER_DAY {
            return Err(BsbLanError::InvalidTimeSlot(format!(
                "maximum {} time slots per day, got {}",
                MAX_SLOTS_PER_DAY,
                slots.len()
            )));
        }
        Ok(Self { slots })
    }

    /// Parse `06:00-08:00 17:00-21:00`. Empty text and `---` mean no periods.
    pub fn parse(text: &str) -> BsbLanResult<Self> {
        let text = text.trim();
        if text.is_empty() || text == UNSUPPORTED_MARKER {
            return Ok(Self::default());
        }
        let slots = text
            .split_whitespace()
            .map(TimeSlot::parse)
            .collect::<BsbLanResult<Vec<_>>>()?;
        Self::new(slots)
    }

    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }
}

impl fmt::Display for DaySchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.slots.iter().map(ToString::to_string).collect();
        f.write_str(&parts.join(" "))
    }
}

impl TryFrom<String> for DaySchedule {
    type Error = BsbLanError;

    fn try_from(text: String) -> BsbLanResult<Self> {
        Self::parse(&text)
    }
}

impl From<DaySchedule> for String {
    fn from(day: DaySchedule) -> Self {
        day.to_string()
    }
}

/// Weekly hot water program; days left `None` are not written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DhwSchedule {
    pub monday: Option<DaySchedule>,
    pub tuesday: Option<DaySchedule>,
    pub wednesday: Option<DaySchedule>,
    pub thursday: Option<DaySchedule>,
    pub friday: Option<DaySchedule>,
    pub saturday: Option<DaySchedule>,
    pub sunday: Option<DaySchedule>,
}

impl DhwSchedule {
    pub fn has_any_schedule(&self) -> bool {
        self.days().next().is_some()
    }

    /// Provided days paired with the parameter that stores them (561 Monday .. 567 Sunday).
    pub fn days(&self) -> impl Iterator<Item = (&'static str, &DaySchedule)> {
        [
            ("561", &self.monday),
            ("562", &self.tuesday),
            ("563", &self.wednesday),
            ("564", &self.thursday),
            ("565", &self.friday),
            ("566", &self.saturday),
            ("567", &self.sunday),
        ]
        .into_iter()
        .filter_map(|(id, day)| day.as_ref().map(|d| (id, d)))
    }
}
