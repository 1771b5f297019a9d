//! Daily rollover policy for the cached daily poem.
//!
//! A cached poem goes stale at 04:00 US Eastern time every day. Eastern's
//! UTC offset comes from a [`ZoneOffsetRule`], so the daylight-saving test can
//! be swapped without touching the freshness logic:
//!
//! - [`ObserverDstHeuristic`] infers daylight time from the *observer's* zone
//!   (January vs. July offsets) and applies it to Eastern. This is the
//!   historical behavior and is wrong for observers whose daylight calendar
//!   differs from Eastern's (southern hemisphere, zones without DST).
//! - [`ZoneDatabaseRule`] resolves `America/New_York` from the IANA database.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Local, NaiveDate, NaiveTime, Offset, TimeZone, Utc,
};
use chrono_tz::Tz;

pub const ROLLOVER_HOUR: u32 = 4;

const HOUR_SECS: i32 = 3600;
pub const EASTERN_STANDARD_OFFSET_SECS: i32 = -5 * HOUR_SECS;
pub const EASTERN_DAYLIGHT_OFFSET_SECS: i32 = -4 * HOUR_SECS;

/// Maps an instant to the reference zone's UTC offset at that instant.
pub trait ZoneOffsetRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn offset_at(&self, instant: DateTime<Utc>) -> FixedOffset;
}

/// Eastern's offset, standard or daylight.
pub fn eastern_offset(daylight: bool) -> FixedOffset {
    let secs = if daylight {
        EASTERN_DAYLIGHT_OFFSET_SECS
    } else {
        EASTERN_STANDARD_OFFSET_SECS
    };
    FixedOffset::east_opt(secs).unwrap_or(Utc.fix())
}

/// Whether `observer` is in daylight time at `at`.
///
/// The winter baseline is the westernmost of the observer's offsets at local
/// midnight on January 1 and July 1 of the current year; any offset east of
/// it counts as daylight time.
pub fn observer_in_daylight_time<Z: TimeZone>(observer: &Z, at: DateTime<Utc>) -> bool {
    let year = at.with_timezone(observer).year();
    let offset_on = |month: u32| {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|date| date.and_time(NaiveTime::MIN))
            .and_then(|midnight| observer.from_local_datetime(&midnight).earliest())
            .map(|local| local.offset().fix().local_minus_utc())
    };

    let current = observer
        .offset_from_utc_datetime(&at.naive_utc())
        .fix()
        .local_minus_utc();

    match (offset_on(1), offset_on(7)) {
        (Some(january), Some(july)) => current > january.min(july),
        _ => false,
    }
}

/// Compatibility rule: Eastern is assumed to be in daylight time whenever
/// the observer is.
#[derive(Debug, Clone)]
pub struct ObserverDstHeuristic<Z: TimeZone = Local> {
    observer: Z,
}

impl ObserverDstHeuristic<Local> {
    pub fn local() -> Self {
        Self { observer: Local }
    }
}

impl<Z: TimeZone> ObserverDstHeuristic<Z> {
    pub fn new(observer: Z) -> Self {
        Self { observer }
    }
}

impl<Z: TimeZone + Send + Sync> ZoneOffsetRule for ObserverDstHeuristic<Z> {
    fn name(&self) -> &'static str {
        "observer-heuristic"
    }

    fn offset_at(&self, instant: DateTime<Utc>) -> FixedOffset {
        eastern_offset(observer_in_daylight_time(&self.observer, instant))
    }
}

/// Canonical rule backed by the IANA time-zone database.
#[derive(Debug, Clone, Copy)]
pub struct ZoneDatabaseRule {
    zone: Tz,
}

impl ZoneDatabaseRule {
    pub fn new(zone: Tz) -> Self {
        Self { zone }
    }
}

impl Default for ZoneDatabaseRule {
    fn default() -> Self {
        Self::new(chrono_tz::America::New_York)
    }
}

impl ZoneOffsetRule for ZoneDatabaseRule {
    fn name(&self) -> &'static str {
        "zone-database"
    }

    fn offset_at(&self, instant: DateTime<Utc>) -> FixedOffset {
        self.zone.offset_from_utc_datetime(&instant.naive_utc()).fix()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleReason {
    /// Nothing has ever been fetched
    FirstRun,
    /// A timestamp exists but the poem itself is gone
    MissingPoem,
    /// A rollover boundary passed since the last fetch
    BoundaryCrossed,
}

impl StaleReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstRun => "first_run",
            Self::MissingPoem => "missing_poem",
            Self::BoundaryCrossed => "boundary_crossed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale(StaleReason),
}

impl Freshness {
    pub fn is_stale(&self) -> bool {
        matches!(self, Freshness::Stale(_))
    }
}

/// The boundaries surrounding an instant: `previous <= now < next`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolloverWindow {
    pub previous: DateTime<Utc>,
    pub next: DateTime<Utc>,
}

pub struct RolloverPolicy {
    rule: Box<dyn ZoneOffsetRule>,
    rollover_time: NaiveTime,
}

impl RolloverPolicy {
    pub fn new(rule: impl ZoneOffsetRule + 'static) -> Self {
        Self {
            rule: Box::new(rule),
            rollover_time: NaiveTime::from_hms_opt(ROLLOVER_HOUR, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }

    pub fn observer_heuristic() -> Self {
        Self::new(ObserverDstHeuristic::local())
    }

    pub fn zone_database() -> Self {
        Self::new(ZoneDatabaseRule::default())
    }

    pub fn rule_name(&self) -> &'static str {
        self.rule.name()
    }

    pub fn window(&self, now: DateTime<Utc>) -> RolloverWindow {
        let offset = self.rule.offset_at(now);
        let today = now.with_timezone(&offset).date_naive();
        let todays_boundary = self.boundary_on(today, offset);

        if now >= todays_boundary {
            RolloverWindow {
                previous: todays_boundary,
                next: self.boundary_on(today + Duration::days(1), offset),
            }
        } else {
            RolloverWindow {
                previous: self.boundary_on(today - Duration::days(1), offset),
                next: todays_boundary,
            }
        }
    }

    pub fn next_boundary(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.window(now).next
    }

    pub fn previous_boundary(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.window(now).previous
    }

    /// Decides whether the cached poem can still be served at `now`.
    pub fn evaluate(
        &self,
        now: DateTime<Utc>,
        last_fetch: Option<DateTime<Utc>>,
        has_poem: bool,
    ) -> Freshness {
        let Some(last_fetch) = last_fetch else {
            return Freshness::Stale(StaleReason::FirstRun);
        };
        if !has_poem {
            return Freshness::Stale(StaleReason::MissingPoem);
        }

        let previous = self.previous_boundary(now);
        if last_fetch < previous && now >= previous {
            Freshness::Stale(StaleReason::BoundaryCrossed)
        } else {
            Freshness::Fresh
        }
    }

    /// Rollover instant on a reference-zone calendar date.
    ///
    /// `hint` is the offset at the caller's "now"; the result is corrected
    /// once with the offset in force at the boundary itself, which matters on
    /// the days the reference zone changes offset.
    fn boundary_on(&self, date: NaiveDate, hint: FixedOffset) -> DateTime<Utc> {
        let local = date.and_time(self.rollover_time);
        let to_utc = |offset: FixedOffset| {
            Utc.from_utc_datetime(&(local - Duration::seconds(i64::from(offset.local_minus_utc()))))
        };

        let guess = to_utc(hint);
        to_utc(self.rule.offset_at(guess))
    }
}
