use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::de::{
  self,
  SeqAccess,
  Visitor
};
use serde::ser::SerializeSeq;
use serde::{
  Deserialize,
  Deserializer,
  Serialize,
  Serializer
};

pub const HOURS_PER_DAY: usize = 24;

/// Hourly availability for a single date.
///
/// On the wire this is always a 24 element array of `0`/`1`. Decoding is
/// lenient about the server's default payloads: short arrays are padded
/// with unchecked hours and anything other than `1` reads as unchecked.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
)]
pub struct DayAvailability {
  hours: [bool; HOURS_PER_DAY]
}

impl DayAvailability {
  pub fn new() -> Self {
    Self::default()
  }

  /// Out-of-range hours read as unavailable.
  pub fn is_available(
    &self,
    hour: usize
  ) -> bool {
    self
      .hours
      .get(hour)
      .copied()
      .unwrap_or(false)
  }

  /// Returns `false` when `hour` is out of range and nothing was written.
  pub fn set(
    &mut self,
    hour: usize,
    available: bool
  ) -> bool {
    match self.hours.get_mut(hour) {
      | Some(slot) => {
        *slot = available;
        true
      }
      | None => false
    }
  }

  pub fn available_hours(
    &self
  ) -> impl Iterator<Item = usize> + '_
  {
    self
      .hours
      .iter()
      .enumerate()
      .filter(|(_, on)| **on)
      .map(|(hour, _)| hour)
  }

  pub fn as_bits(
    &self
  ) -> [u8; HOURS_PER_DAY] {
    self.hours.map(u8::from)
  }
}

impl Serialize for DayAvailability {
  fn serialize<S>(
    &self,
    serializer: S
  ) -> Result<S::Ok, S::Error>
  where
    S: Serializer
  {
    let mut seq = serializer
      .serialize_seq(Some(
        HOURS_PER_DAY
      ))?;
    for on in self.hours {
      seq.serialize_element(
        &u8::from(on)
      )?;
    }
    seq.end()
  }
}

struct DayAvailabilityVisitor;

impl<'de> Visitor<'de>
  for DayAvailabilityVisitor
{
  type Value = DayAvailability;

  fn expecting(
    &self,
    f: &mut fmt::Formatter
  ) -> fmt::Result {
    write!(
      f,
      "an array of at most {HOURS_PER_DAY} hour flags"
    )
  }

  fn visit_seq<A>(
    self,
    mut seq: A
  ) -> Result<Self::Value, A::Error>
  where
    A: SeqAccess<'de>
  {
    let mut day =
      DayAvailability::default();
    let mut hour = 0usize;
    while let Some(flag) =
      seq.next_element::<i64>()?
    {
      if hour >= HOURS_PER_DAY {
        return Err(
          de::Error::invalid_length(
            hour + 1,
            &self
          )
        );
      }
      day.hours[hour] = flag == 1;
      hour += 1;
    }
    Ok(day)
  }
}

impl<'de> Deserialize<'de>
  for DayAvailability
{
  fn deserialize<D>(
    deserializer: D
  ) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>
  {
    deserializer.deserialize_seq(
      DayAvailabilityVisitor
    )
  }
}

/// Date to hourly availability mapping exchanged with the server.
#[derive(
  Debug,
  Clone,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(transparent)]
pub struct Schedule {
  days: BTreeMap<NaiveDate, DayAvailability>
}

impl Schedule {
  pub fn new() -> Self {
    Self::default()
  }

  /// Inserts a fully unchecked day if the date is not present yet.
  pub fn day_mut(
    &mut self,
    date: NaiveDate
  ) -> &mut DayAvailability {
    self.days.entry(date).or_default()
  }

  pub fn day(
    &self,
    date: NaiveDate
  ) -> Option<&DayAvailability> {
    self.days.get(&date)
  }

  /// Missing dates and hours count as unchecked.
  pub fn is_available(
    &self,
    date: NaiveDate,
    hour: usize
  ) -> bool {
    self
      .days
      .get(&date)
      .is_some_and(|day| {
        day.is_available(hour)
      })
  }

  pub fn len(&self) -> usize {
    self.days.len()
  }

  pub fn is_empty(&self) -> bool {
    self.days.is_empty()
  }

  pub fn iter(
    &self
  ) -> btree_map::Iter<
    '_,
    NaiveDate,
    DayAvailability
  > {
    self.days.iter()
  }
}

impl<'a> IntoIterator for &'a Schedule {
  type IntoIter = btree_map::Iter<
    'a,
    NaiveDate,
    DayAvailability
  >;
  type Item = (
    &'a NaiveDate,
    &'a DayAvailability
  );

  fn into_iter(self) -> Self::IntoIter {
    self.days.iter()
  }
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
)]
#[serde(transparent)]
pub struct BandId(pub i64);

impl FromStr for BandId {
  type Err = ParseIntError;

  fn from_str(
    raw: &str
  ) -> Result<Self, Self::Err> {
    raw.trim().parse::<i64>().map(BandId)
  }
}

impl fmt::Display for BandId {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Body of `POST /<page>/save`.
#[derive(
  Debug,
  Clone,
  PartialEq,
  Serialize,
  Deserialize,
)]
pub struct SaveRequest {
  pub band_id:  BandId,
  pub schedule: Schedule,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub comment:  Option<String>
}
