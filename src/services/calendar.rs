//! Generation horizon and promo calendar

use crate::error::{GenError, GenResult};
use crate::services::draws::{clamp_round, DrawService};
use chrono::{Datelike, Duration, Months, NaiveDate};
use rustc_hash::FxHashSet;

/// `[start, end)` in calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Horizon {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Horizon {
    pub fn from_months(start: NaiveDate, months: u32) -> GenResult<Self> {
        if months == 0 {
            return Err(GenError::config("horizon must be at least one month"));
        }
        let end = start
            .checked_add_months(Months::new(months))
            .ok_or_else(|| GenError::config(format!("{} + {} months overflows", start, months)))?;
        Ok(Self { start, end })
    }

    /// Horizon of an exact number of days
    pub fn from_days(start: NaiveDate, days: u32) -> GenResult<Self> {
        if days == 0 {
            return Err(GenError::config("horizon must be at least one day"));
        }
        let end = start
            .checked_add_signed(Duration::days(i64::from(days)))
            .ok_or_else(|| GenError::config(format!("{} + {} days overflows", start, days)))?;
        Ok(Self { start, end })
    }

    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..self.num_days()).map(move |d| start + Duration::days(d))
    }

    /// Monday starts of the weeks beginning inside the horizon.
    ///
    /// Days before the first Monday belong to a week that started before
    /// the horizon; that week is neither a sales week nor a promo candidate.
    pub fn weeks(&self) -> Vec<NaiveDate> {
        let mut week = week_start(self.start);
        if week < self.start {
            week += Duration::days(7);
        }
        let mut weeks = Vec::new();
        while week < self.end {
            weeks.push(week);
            week += Duration::days(7);
        }
        weeks
    }
}

/// Monday on or before `day`
#[inline]
pub fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(i64::from(day.weekday().num_days_from_monday()))
}

/// Weeks flagged for elevated demand/workload.
///
/// Each generator draws its own calendar; they are not meant to agree.
#[derive(Debug, Clone, Default)]
pub struct PromoCalendar {
    weeks: FxHashSet<NaiveDate>,
}

impl PromoCalendar {
    /// Draw `round(weeks * ratio)` distinct weeks, at least two when the
    /// horizon has two weeks
    pub fn draw(weeks: &[NaiveDate], ratio: f64, draws: &mut DrawService) -> Self {
        let n = weeks.len();
        if n == 0 {
            return Self::default();
        }
        let lo = n.min(2) as i64;
        let amount = clamp_round(n as f64 * ratio, lo, n as i64) as usize;
        let weeks = draws.sample_indices(n, amount).into_iter().map(|i| weeks[i]).collect();
        Self { weeks }
    }

    pub fn from_weeks(weeks: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self { weeks: weeks.into_iter().collect() }
    }

    pub fn is_promo_week(&self, week_start: NaiveDate) -> bool {
        self.weeks.contains(&week_start)
    }

    /// Whether the week containing `day` is a promo week
    pub fn covers(&self, day: NaiveDate) -> bool {
        self.is_promo_week(week_start(day))
    }

    pub fn len(&self) -> usize {
        self.weeks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_six_month_horizon() {
        let h = Horizon::from_months(date(2024, 1, 1), 6).unwrap();
        assert_eq!(h.end, date(2024, 7, 1));
        assert_eq!(h.num_days(), 182);
        assert_eq!(h.days().count(), 182);
        assert_eq!(h.days().last(), Some(date(2024, 6, 30)));
    }

    #[test]
    fn test_zero_horizon_rejected() {
        assert!(Horizon::from_months(date(2024, 1, 1), 0).is_err());
        assert!(Horizon::from_days(date(2024, 1, 1), 0).is_err());
    }

    #[test]
    fn test_weeks_are_mondays_covering_horizon() {
        // 2024-01-03 is a Wednesday
        let h = Horizon::from_days(date(2024, 1, 3), 10).unwrap();
        let weeks = h.weeks();
        assert_eq!(weeks, vec![date(2024, 1, 8)]);
        assert!(weeks.iter().all(|w| w.weekday() == chrono::Weekday::Mon));
    }

    #[test]
    fn test_weeks_never_precede_start() {
        for offset in 0..7 {
            let start = date(2024, 1, 1) + Duration::days(offset);
            let h = Horizon::from_months(start, 1).unwrap();
            let weeks = h.weeks();
            assert!(!weeks.is_empty());
            assert!(weeks.iter().all(|w| *w >= h.start && *w < h.end), "start {}", start);
            assert!(weeks[0] - h.start < Duration::days(7));
        }
        // A Monday start keeps its own week
        let h = Horizon::from_days(date(2024, 1, 8), 7).unwrap();
        assert_eq!(h.weeks(), vec![date(2024, 1, 8)]);
    }

    #[test]
    fn test_week_start() {
        assert_eq!(week_start(date(2024, 1, 7)), date(2024, 1, 1));
        assert_eq!(week_start(date(2024, 1, 8)), date(2024, 1, 8));
    }

    #[test]
    fn test_promo_calendar_size() {
        let h = Horizon::from_months(date(2024, 1, 1), 6).unwrap();
        let weeks = h.weeks();
        assert_eq!(weeks.len(), 26);
        let mut draws = DrawService::new(42);
        let cal = PromoCalendar::draw(&weeks, 0.18, &mut draws);
        // round(26 * 0.18) = 5
        assert_eq!(cal.len(), 5);
        assert!(weeks.iter().filter(|w| cal.is_promo_week(**w)).count() == 5);
    }

    #[test]
    fn test_promo_calendar_minimum_two() {
        let weeks: Vec<NaiveDate> = (0..4).map(|i| date(2024, 1, 1) + Duration::days(7 * i)).collect();
        let mut draws = DrawService::new(1);
        assert_eq!(PromoCalendar::draw(&weeks, 0.0, &mut draws).len(), 2);
        assert_eq!(PromoCalendar::draw(&weeks[..1], 0.0, &mut draws).len(), 1);
        assert!(PromoCalendar::draw(&[], 0.5, &mut draws).is_empty());
    }

    #[test]
    fn test_covers_mid_week_day() {
        let cal = PromoCalendar::from_weeks([date(2024, 1, 8)]);
        assert!(cal.covers(date(2024, 1, 10)));
        assert!(cal.covers(date(2024, 1, 14)));
        assert!(!cal.covers(date(2024, 1, 15)));
    }
}
