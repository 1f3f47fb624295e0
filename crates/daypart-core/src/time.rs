//! The time-state classifier.
//!
//! Everything here is integer arithmetic on seconds. No timezone database, no
//! floating point, no locale: the ledger's encode path and every reader must
//! land on the same state for the same `(instant, offset)` pair.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, offset::TimezoneOffset};

const SECONDS_PER_DAY: i64 = 86_400;

// ─── TimePoint ───────────────────────────────────────────────────────────────

/// Seconds since the Unix epoch, UTC.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize,
  Deserialize,
)]
#[serde(transparent)]
pub struct TimePoint(pub u64);

impl TimePoint {
  pub const EPOCH: Self = Self(0);

  pub fn as_secs(self) -> u64 { self.0 }

  /// Seconds elapsed since UTC midnight.
  fn second_of_day(self) -> i64 {
    // Reduce first so the sum with an offset can never overflow.
    (self.0 % SECONDS_PER_DAY as u64) as i64
  }
}

/// Instants before the epoch clamp to [`TimePoint::EPOCH`].
impl From<DateTime<Utc>> for TimePoint {
  fn from(dt: DateTime<Utc>) -> Self {
    Self(u64::try_from(dt.timestamp()).unwrap_or(0))
  }
}

impl fmt::Display for TimePoint {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let dt = i64::try_from(self.0)
      .ok()
      .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));
    match dt {
      Some(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%SZ")),
      None => write!(f, "{}s", self.0),
    }
  }
}

// ─── Clock ───────────────────────────────────────────────────────────────────

/// Source of "now". Ledgers and refresh sessions take one so tests can pin
/// the instant.
pub trait Clock: Send + Sync {
  fn now(&self) -> TimePoint;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> TimePoint { TimePoint::from(Utc::now()) }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub TimePoint);

impl Clock for FixedClock {
  fn now(&self) -> TimePoint { self.0 }
}

// ─── TimeState ───────────────────────────────────────────────────────────────

/// The discrete mode a token is in at a given instant.
///
/// The discriminants are the wire values the ledger reports from
/// `current_state`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TimeState {
  /// 22:00 to 06:00 local.
  Night   = 0,
  /// 06:00 to 12:00 local.
  Morning = 1,
  /// 12:00 to 22:00 local.
  Day     = 2,
}

impl TimeState {
  pub const ALL: [Self; 3] = [Self::Night, Self::Morning, Self::Day];

  /// Map a local hour to its state. Intervals are half-open: 06:00 is
  /// already Morning, 22:00 is already Night.
  pub fn from_hour(hour: u8) -> Self {
    debug_assert!(hour < 24, "hour out of range: {hour}");
    match hour {
      6..=11 => Self::Morning,
      12..=21 => Self::Day,
      _ => Self::Night,
    }
  }

  pub fn name(self) -> &'static str {
    match self {
      Self::Night => "Night",
      Self::Morning => "Morning",
      Self::Day => "Day",
    }
  }

  /// Parse the display name written into descriptor attributes.
  pub fn from_name(name: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|s| s.name() == name)
  }

  /// The local-time window for this state, as `(start_hour, end_hour)`.
  pub fn window(self) -> (u8, u8) {
    match self {
      Self::Night => (22, 6),
      Self::Morning => (6, 12),
      Self::Day => (12, 22),
    }
  }
}

impl fmt::Display for TimeState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl From<TimeState> for u8 {
  fn from(state: TimeState) -> Self { state as u8 }
}

impl TryFrom<u8> for TimeState {
  type Error = Error;

  fn try_from(value: u8) -> Result<Self> {
    match value {
      0 => Ok(Self::Night),
      1 => Ok(Self::Morning),
      2 => Ok(Self::Day),
      other => Err(Error::UnknownState(other)),
    }
  }
}

// ─── Breakdown ───────────────────────────────────────────────────────────────

/// The derived local-time view of one instant. Never stored; computed fresh
/// by [`classify`] on every query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalTimeBreakdown {
  pub utc_hour:     u8,
  pub utc_minute:   u8,
  pub local_hour:   u8,
  pub local_minute: u8,
  pub offset:       TimezoneOffset,
  pub state:        TimeState,
}

impl LocalTimeBreakdown {
  /// Zero-padded `HH:MM` in the token's offset.
  pub fn local_time(&self) -> String {
    format!("{:02}:{:02}", self.local_hour, self.local_minute)
  }

  /// Zero-padded `HH:MM` in UTC.
  pub fn utc_time(&self) -> String {
    format!("{:02}:{:02}", self.utc_hour, self.utc_minute)
  }
}

/// The ledger's `detailed_time_info` record: a breakdown together with the
/// instant it was evaluated at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailedTimeInfo {
  pub timestamp:    TimePoint,
  pub utc_hour:     u8,
  pub utc_minute:   u8,
  pub local_hour:   u8,
  pub local_minute: u8,
  pub offset:       TimezoneOffset,
  pub state:        TimeState,
  pub state_name:   String,
}

impl DetailedTimeInfo {
  pub fn new(timestamp: TimePoint, b: LocalTimeBreakdown) -> Self {
    Self {
      timestamp,
      utc_hour: b.utc_hour,
      utc_minute: b.utc_minute,
      local_hour: b.local_hour,
      local_minute: b.local_minute,
      offset: b.offset,
      state: b.state,
      state_name: b.state.name().to_owned(),
    }
  }

  pub fn breakdown(&self) -> LocalTimeBreakdown {
    LocalTimeBreakdown {
      utc_hour:     self.utc_hour,
      utc_minute:   self.utc_minute,
      local_hour:   self.local_hour,
      local_minute: self.local_minute,
      offset:       self.offset,
      state:        self.state,
    }
  }
}

// ─── Classifier ──────────────────────────────────────────────────────────────

/// Classify `at` as seen from `offset`.
///
/// Pure and total: the offset is already validated, so there is nothing to
/// reject.
pub fn classify(at: TimePoint, offset: TimezoneOffset) -> LocalTimeBreakdown {
  let utc_sod = at.second_of_day();
  let local_sod = (utc_sod + offset.seconds()).rem_euclid(SECONDS_PER_DAY);

  let (utc_hour, utc_minute) = hour_minute(utc_sod);
  let (local_hour, local_minute) = hour_minute(local_sod);

  LocalTimeBreakdown {
    utc_hour,
    utc_minute,
    local_hour,
    local_minute,
    offset,
    state: TimeState::from_hour(local_hour),
  }
}

/// Split a second-of-day in `0..86_400` into `(hour, minute)`.
fn hour_minute(second_of_day: i64) -> (u8, u8) {
  ((second_of_day / 3600) as u8, ((second_of_day / 60) % 60) as u8)
}
