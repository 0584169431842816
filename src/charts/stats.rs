//! Dataset derivation for the analytics charts: binning, counting,
//! quartiles, axis domains and week-label parsing.

use chrono::{Datelike, Duration, NaiveDate};
use std::collections::HashMap;

use crate::models::genre_tokens;

pub const RATING_MIN: f64 = 0.0;
pub const RATING_MAX: f64 = 10.0;
pub const RATING_BINS: usize = 20;
pub const RATING_BIN_WIDTH: f64 = (RATING_MAX - RATING_MIN) / RATING_BINS as f64;

/// Half-open bucket `[x0, x1)`; the last bucket also holds `x1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    pub x0: f64,
    pub x1: f64,
    pub count: usize,
}

/// Bucket ratings into 20 fixed 0.5-wide bins over [0, 10].
/// Values outside the domain are dropped.
pub fn rating_histogram(ratings: impl IntoIterator<Item = f64>) -> Vec<Bin> {
    let mut bins: Vec<Bin> = (0..RATING_BINS)
        .map(|i| Bin {
            x0: RATING_MIN + i as f64 * RATING_BIN_WIDTH,
            x1: RATING_MIN + (i + 1) as f64 * RATING_BIN_WIDTH,
            count: 0,
        })
        .collect();

    for rating in ratings {
        if !rating.is_finite() || rating < RATING_MIN || rating > RATING_MAX {
            continue;
        }
        let idx = (((rating - RATING_MIN) / RATING_BIN_WIDTH).floor() as usize).min(RATING_BINS - 1);
        bins[idx].count += 1;
    }
    bins
}

/// Tick step for roughly `count` ticks over `[start, stop]`, snapped to
/// 1, 2, 5 or 10 times a power of ten.
pub fn tick_step(start: f64, stop: f64, count: usize) -> f64 {
    let raw = (stop - start) / count.max(1) as f64;
    if !(raw > 0.0) || !raw.is_finite() {
        return 0.0;
    }
    let power = raw.log10().floor();
    let base = 10f64.powf(power);
    let error = raw / base;
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    factor * base
}

/// Extend `[0, max]` outward to a round upper bound.
pub fn nice_max(max: f64) -> f64 {
    if !(max > 0.0) || !max.is_finite() {
        return 1.0;
    }
    let mut stop = max;
    let mut previous = 0.0;
    for _ in 0..10 {
        let step = tick_step(0.0, stop, 10);
        if step == previous || step == 0.0 {
            break;
        }
        stop = (stop / step).ceil() * step;
        previous = step;
    }
    stop
}

/// Round tick values from 0 to `max` inclusive
pub fn ticks(max: f64, count: usize) -> Vec<f64> {
    let step = tick_step(0.0, max, count);
    if step == 0.0 {
        return vec![0.0];
    }
    let n = (max / step + 1e-9).floor() as usize;
    (0..=n).map(|i| i as f64 * step).collect()
}

/// Occurrences of each genre token, most frequent first; ties keep the
/// order in which genres were first seen.
pub fn genre_counts<'a>(genre_lists: impl IntoIterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for list in genre_lists {
        for genre in genre_tokens(list) {
            match index.get(genre) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    index.insert(genre.to_string(), counts.len());
                    counts.push((genre.to_string(), 1));
                }
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Movies per release year, ascending by year
pub fn year_counts(years: impl IntoIterator<Item = i32>) -> Vec<(i32, usize)> {
    let mut counts: Vec<(i32, usize)> = Vec::new();
    for year in years {
        match counts.iter_mut().find(|(y, _)| *y == year) {
            Some(entry) => entry.1 += 1,
            None => counts.push((year, 1)),
        }
    }
    counts.sort_by_key(|(y, _)| *y);
    counts
}

/// Quantile of pre-sorted values, interpolating linearly at `(n - 1) * p`.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    if p <= 0.0 || n == 1 {
        return Some(sorted[0]);
    }
    if p >= 1.0 {
        return Some(sorted[n - 1]);
    }
    let i = (n - 1) as f64 * p;
    let lo = i.floor() as usize;
    let lower = sorted[lo];
    let upper = sorted[lo + 1];
    Some(lower + (upper - lower) * (i - lo as f64))
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub genre: String,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub mean: f64,
}

/// Five-number summary plus mean; `None` when there are no finite runtimes.
pub fn box_stats(genre: &str, runtimes: &[f64]) -> Option<BoxStats> {
    let mut sorted: Vec<f64> = runtimes.iter().copied().filter(|r| r.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    Some(BoxStats {
        genre: genre.to_string(),
        min: sorted[0],
        q1: quantile_sorted(&sorted, 0.25)?,
        median: quantile_sorted(&sorted, 0.5)?,
        q3: quantile_sorted(&sorted, 0.75)?,
        max: sorted[sorted.len() - 1],
        mean: sorted.iter().sum::<f64>() / sorted.len() as f64,
    })
}

/// Parse a "YYYY-WW" (or "YYYY-Www") label as the Monday of that
/// Monday-based week, where week 1 starts on the year's first Monday.
pub fn parse_week_label(label: &str) -> Option<NaiveDate> {
    let (year, week) = label.trim().split_once('-')?;
    let year: i32 = year.parse().ok()?;
    let week: i64 = week.trim_start_matches(['W', 'w']).parse().ok()?;
    if !(0..=53).contains(&week) {
        return None;
    }

    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let jan1_weekday = jan1.weekday().num_days_from_sunday() as i64;
    // Day of the year (zero or negative spills into December) of that Monday
    let day = week * 7 - (jan1_weekday + 5) % 7;
    jan1.checked_add_signed(Duration::days(day - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_has_twenty_half_point_bins() {
        let bins = rating_histogram(vec![]);
        assert_eq!(bins.len(), 20);
        assert_eq!(bins[0].x0, 0.0);
        assert_eq!(bins[0].x1, 0.5);
        assert_eq!(bins[19].x1, 10.0);
    }

    #[test]
    fn test_histogram_bucketing() {
        let bins = rating_histogram(vec![0.0, 0.49, 0.5, 7.3, 7.4, 8.7, 10.0, -1.0, 11.0, f64::NAN]);
        assert_eq!(bins[0].count, 2);
        assert_eq!(bins[1].count, 1);
        assert_eq!(bins[14].count, 2); // 7.0..7.5
        assert_eq!(bins[17].count, 1); // 8.5..9.0
        assert_eq!(bins[19].count, 1); // 10.0 lands in the closed last bin
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 7);
    }

    #[test]
    fn test_nice_max() {
        assert_eq!(nice_max(0.0), 1.0);
        assert_eq!(nice_max(7.0), 7.0);
        assert_eq!(nice_max(13.0), 13.0);
        assert_eq!(nice_max(23.0), 24.0);
        assert_eq!(nice_max(97.0), 100.0);
        assert_eq!(nice_max(172.0), 180.0);
    }

    #[test]
    fn test_ticks() {
        assert_eq!(ticks(10.0, 10), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
        assert_eq!(ticks(180.0, 5), vec![0.0, 50.0, 100.0, 150.0]);
    }

    #[test]
    fn test_genre_counts_order() {
        let counts = genre_counts(vec!["Drama", "Action, Sci-Fi", "Action, Drama", "Comedy"]);
        assert_eq!(
            counts,
            vec![
                ("Drama".to_string(), 2),
                ("Action".to_string(), 2),
                ("Sci-Fi".to_string(), 1),
                ("Comedy".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_year_counts() {
        assert_eq!(year_counts(vec![2003, 1999, 2003]), vec![(1999, 1), (2003, 2)]);
    }

    #[test]
    fn test_quartiles_interpolate() {
        let stats = box_stats("Action", &[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.q1, 1.75);
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.q3, 3.25);
        assert_eq!(stats.max, 4.0);
        assert_eq!(stats.mean, 2.5);
    }

    #[test]
    fn test_box_stats_single_and_empty() {
        let stats = box_stats("Drama", &[136.0]).unwrap();
        assert_eq!((stats.min, stats.q1, stats.median, stats.q3, stats.max), (136.0, 136.0, 136.0, 136.0, 136.0));
        assert!(box_stats("Horror", &[]).is_none());
    }

    #[test]
    fn test_parse_week_label() {
        // 2024-01-01 is a Monday, so week 1 starts that day
        assert_eq!(parse_week_label("2024-01"), NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(parse_week_label("2024-W42"), NaiveDate::from_ymd_opt(2024, 10, 14));
        // 2023-01-01 is a Sunday; week 1 starts Monday 2 January
        assert_eq!(parse_week_label("2023-01"), NaiveDate::from_ymd_opt(2023, 1, 2));
        assert_eq!(parse_week_label("2023-00"), NaiveDate::from_ymd_opt(2022, 12, 26));
        assert_eq!(parse_week_label("October"), None);
        assert_eq!(parse_week_label("2024-60"), None);
    }
}
