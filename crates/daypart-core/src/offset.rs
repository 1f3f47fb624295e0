//! Timezone offsets and the policy that validates them.
//!
//! An offset is a fixed, signed number of minutes east of UTC. There is no
//! daylight-saving or calendar logic anywhere in Daypart: a token minted at
//! `UTC+5:30` stays at `UTC+5:30` forever.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Westernmost real-world offset (UTC-12, Baker Island).
pub const MIN_OFFSET_MINUTES: i64 = -720;
/// Easternmost real-world offset (UTC+14, Line Islands).
pub const MAX_OFFSET_MINUTES: i64 = 840;

// ─── TimezoneOffset ──────────────────────────────────────────────────────────

/// A validated offset in whole minutes, within
/// [`MIN_OFFSET_MINUTES`]..=[`MAX_OFFSET_MINUTES`].
///
/// Serialises as a bare integer. Deserialisation re-validates with the
/// default [`OffsetPolicy`].
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
  Deserialize,
)]
#[serde(try_from = "i64", into = "i64")]
pub struct TimezoneOffset(i16);

impl TimezoneOffset {
  pub const UTC: Self = Self(0);

  /// Validate `minutes` with the default one-minute granularity.
  pub fn new(minutes: i64) -> Result<Self> {
    OffsetPolicy::default().validate(minutes)
  }

  pub fn minutes(self) -> i16 { self.0 }

  pub fn seconds(self) -> i64 { i64::from(self.0) * 60 }
}

impl Default for TimezoneOffset {
  fn default() -> Self { Self::UTC }
}

impl TryFrom<i64> for TimezoneOffset {
  type Error = Error;

  fn try_from(minutes: i64) -> Result<Self> { Self::new(minutes) }
}

impl From<TimezoneOffset> for i64 {
  fn from(offset: TimezoneOffset) -> Self { i64::from(offset.0) }
}

/// Formats as `UTC±H[:MM]`. The minutes are omitted when zero, and zero
/// itself is `UTC+0`.
impl fmt::Display for TimezoneOffset {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let sign = if self.0 >= 0 { '+' } else { '-' };
    let abs = self.0.unsigned_abs();
    let (hours, minutes) = (abs / 60, abs % 60);
    if minutes == 0 {
      write!(f, "UTC{sign}{hours}")
    } else {
      write!(f, "UTC{sign}{hours}:{minutes:02}")
    }
  }
}

impl FromStr for TimezoneOffset {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { OffsetPolicy::default().parse(s) }
}

// ─── OffsetPolicy ────────────────────────────────────────────────────────────

/// The granularity an offset must be aligned to.
///
/// Only divisors of 15 minutes are allowed, so every real-world zone
/// (`+5:30`, `+5:45`, `+12:45`) stays representable under any policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct OffsetPolicy {
  granularity_minutes: u16,
}

impl Default for OffsetPolicy {
  fn default() -> Self { Self { granularity_minutes: 1 } }
}

impl OffsetPolicy {
  pub fn with_granularity(minutes: u16) -> Result<Self> {
    if minutes == 0 || 15 % minutes != 0 {
      return Err(Error::InvalidGranularity(minutes));
    }
    Ok(Self { granularity_minutes: minutes })
  }

  pub fn granularity(&self) -> u16 { self.granularity_minutes }

  /// Bounds-check and alignment-check `minutes`.
  pub fn validate(&self, minutes: i64) -> Result<TimezoneOffset> {
    if !(MIN_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&minutes) {
      return Err(Error::OffsetOutOfRange(minutes));
    }
    if minutes.rem_euclid(i64::from(self.granularity_minutes)) != 0 {
      return Err(Error::OffsetMisaligned {
        minutes,
        granularity: self.granularity_minutes,
      });
    }
    // In range, so the narrowing cannot truncate.
    Ok(TimezoneOffset(minutes as i16))
  }

  /// Parse either integer minutes (`"330"`, `"-540"`) or clock notation
  /// (`"UTC+5:30"`, `"+5:30"`, `"UTC-9"`), then [`validate`](Self::validate).
  ///
  /// A bare signed integer is always read as minutes; hours need a `UTC`
  /// prefix or a `:` separator.
  pub fn parse(&self, input: &str) -> Result<TimezoneOffset> {
    let s = input.trim();
    let (prefixed, rest) = match s.get(..3) {
      Some(p) if p.eq_ignore_ascii_case("utc") => (true, &s[3..]),
      _ => (false, s),
    };

    let minutes = if prefixed || rest.contains(':') {
      parse_clock(rest)
    } else {
      rest.parse::<i64>().ok()
    }
    .ok_or_else(|| Error::OffsetNotWholeMinutes(input.to_owned()))?;

    self.validate(minutes)
  }
}

impl TryFrom<u16> for OffsetPolicy {
  type Error = Error;

  fn try_from(minutes: u16) -> Result<Self> { Self::with_granularity(minutes) }
}

impl From<OffsetPolicy> for u16 {
  fn from(policy: OffsetPolicy) -> Self { policy.granularity_minutes }
}

/// `[+|-]H[:MM]` to signed minutes. An empty string is `UTC` itself.
fn parse_clock(s: &str) -> Option<i64> {
  if s.is_empty() {
    return Some(0);
  }
  let (negative, body) = match s.as_bytes()[0] {
    b'+' => (false, &s[1..]),
    b'-' => (true, &s[1..]),
    _ => (false, s),
  };

  let (hours, minutes) = match body.split_once(':') {
    Some((h, m)) => {
      if m.len() != 2 {
        return None;
      }
      (parse_digits(h)?, parse_digits(m)?)
    }
    None => (parse_digits(body)?, 0),
  };
  if minutes >= 60 {
    return None;
  }

  let total = hours.checked_mul(60)?.checked_add(minutes)?;
  Some(if negative { -total } else { total })
}

fn parse_digits(s: &str) -> Option<i64> {
  if s.is_empty() || s.len() > 4 || !s.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  s.parse().ok()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn accepts_real_world_bounds() {
    assert_eq!(TimezoneOffset::new(-720).unwrap().minutes(), -720);
    assert_eq!(TimezoneOffset::new(840).unwrap().minutes(), 840);
    assert_eq!(TimezoneOffset::new(0).unwrap(), TimezoneOffset::UTC);
  }

  #[test]
  fn rejects_out_of_range() {
    assert_eq!(TimezoneOffset::new(-721), Err(Error::OffsetOutOfRange(-721)));
    assert_eq!(TimezoneOffset::new(841), Err(Error::OffsetOutOfRange(841)));
    assert!(TimezoneOffset::new(i64::MIN).unwrap_err().is_invalid_offset());
  }

  #[test]
  fn display_omits_zero_minutes() {
    let fmt = |m| TimezoneOffset::new(m).unwrap().to_string();
    assert_eq!(fmt(0), "UTC+0");
    assert_eq!(fmt(330), "UTC+5:30");
    assert_eq!(fmt(-540), "UTC-9");
    assert_eq!(fmt(345), "UTC+5:45");
    assert_eq!(fmt(-570), "UTC-9:30");
    assert_eq!(fmt(840), "UTC+14");
  }

  #[test]
  fn parses_minutes_and_clock_notation() {
    let parse = |s: &str| s.parse::<TimezoneOffset>().map(|o| o.minutes());
    assert_eq!(parse("330"), Ok(330));
    assert_eq!(parse("-540"), Ok(-540));
    assert_eq!(parse("UTC+5:30"), Ok(330));
    assert_eq!(parse("utc-9"), Ok(-540));
    assert_eq!(parse("+5:45"), Ok(345));
    assert_eq!(parse("-9:30"), Ok(-570));
    assert_eq!(parse("UTC+0"), Ok(0));
    assert_eq!(parse("UTC"), Ok(0));
  }

  #[test]
  fn display_round_trips_through_parse() {
    for m in [-720, -570, -540, 0, 60, 330, 345, 765, 840] {
      let offset = TimezoneOffset::new(m).unwrap();
      assert_eq!(offset.to_string().parse::<TimezoneOffset>(), Ok(offset));
    }
  }

  #[test]
  fn rejects_fractional_and_garbage() {
    for bad in ["330.5", "5.5h", "+5:3", "+5:3x", "UTC+5:60", "UTC++5", "", "-"]
    {
      assert_eq!(
        bad.parse::<TimezoneOffset>(),
        Err(Error::OffsetNotWholeMinutes(bad.to_owned())),
        "input {bad:?}"
      );
    }
  }

  #[test]
  fn parse_still_range_checks() {
    assert_eq!(
      "UTC+15".parse::<TimezoneOffset>(),
      Err(Error::OffsetOutOfRange(900))
    );
  }

  #[test]
  fn granularity_must_divide_quarter_hour() {
    for ok in [1, 3, 5, 15] {
      assert!(OffsetPolicy::with_granularity(ok).is_ok());
    }
    for bad in [0, 2, 30, 60] {
      assert_eq!(
        OffsetPolicy::with_granularity(bad),
        Err(Error::InvalidGranularity(bad))
      );
    }
  }

  #[test]
  fn quarter_hour_policy() {
    let policy = OffsetPolicy::with_granularity(15).unwrap();
    assert!(policy.validate(345).is_ok());
    assert!(policy.validate(-570).is_ok());
    assert_eq!(
      policy.validate(350),
      Err(Error::OffsetMisaligned { minutes: 350, granularity: 15 })
    );
  }

  #[test]
  fn serde_is_bare_integer_and_revalidates() {
    let offset = TimezoneOffset::new(-300).unwrap();
    assert_eq!(serde_json::to_string(&offset).unwrap(), "-300");
    assert_eq!(
      serde_json::from_str::<TimezoneOffset>("-300").unwrap(),
      offset
    );
    assert!(serde_json::from_str::<TimezoneOffset>("900").is_err());
  }
}
