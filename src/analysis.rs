use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate};
use chrono_tz::Tz;

use crate::data::{DailySummary, ForecastSample, RainAnalysis};

/// Round to one decimal place, ties to even.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

/// Aggregate the forecast samples of one location into a rain outlook.
///
/// Samples are sorted by time before folding, so the "next rain" timestamp does not depend on
/// the order the provider returned them in. Calendar days are taken in `timezone`. Daily
/// precipitation is summed over the day's windows; a day has rain if any of its windows
/// reaches the threshold. An empty input yields the default (dry) analysis.
pub fn analyze_rain(samples: &[ForecastSample], timezone: Tz) -> RainAnalysis {
    if samples.is_empty() {
        return RainAnalysis::default();
    }

    let mut ordered: Vec<&ForecastSample> = samples.iter().collect();
    ordered.sort_by_key(|s| s.time);

    let mut rain_windows = 0usize;
    let mut next_rain: Option<DateTime<FixedOffset>> = None;
    let mut days: BTreeMap<NaiveDate, DailySummary> = BTreeMap::new();

    for sample in ordered {
        let local = sample.time.with_timezone(&timezone).fixed_offset();
        let is_rain = sample.is_rain();

        if is_rain {
            rain_windows += 1;
            next_rain.get_or_insert(local);
        }

        days.entry(local.date_naive())
            .and_modify(|day| {
                day.min_temp = day.min_temp.min(sample.temp);
                day.max_temp = day.max_temp.max(sample.temp);
                day.precip += sample.precip;
                day.has_rain |= is_rain;
            })
            .or_insert_with(|| DailySummary {
                date: local.date_naive(),
                min_temp: sample.temp,
                max_temp: sample.temp,
                precip: sample.precip,
                has_rain: is_rain,
            });
    }

    let probability = round1(100.0 * rain_windows as f64 / samples.len() as f64);
    let daily: Vec<DailySummary> = days.into_values().collect();
    let rainy_days = daily.iter().filter(|d| d.has_rain).count();

    RainAnalysis {
        rain_expected: rain_windows > 0,
        probability,
        rainy_days,
        next_rain,
        daily,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike, Utc};

    /// Sample at `hour` UTC on 2025-06-`day`.
    fn sample(day: u32, hour: u32, temp: f64, precip: f64) -> ForecastSample {
        ForecastSample {
            time: Utc.with_ymd_and_hms(2025, 6, day, hour, 0, 0).unwrap(),
            temp,
            precip,
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    #[test]
    fn empty_input_is_zero_value() {
        let analysis = analyze_rain(&[], chrono_tz::UTC);
        assert_eq!(analysis, RainAnalysis::default());
        assert!(!analysis.rain_expected);
        assert_eq!(analysis.probability, 0.0);
        assert_eq!(analysis.rainy_days, 0);
        assert!(analysis.next_rain.is_none());
        assert!(analysis.daily.is_empty());
    }

    #[test]
    fn single_day_sums_precipitation() {
        let samples = [
            sample(3, 0, 18.0, 0.0),
            sample(3, 3, 16.5, 1.2),
            sample(3, 6, 17.0, 0.0),
            sample(3, 9, 22.0, 0.5),
        ];
        let analysis = analyze_rain(&samples, chrono_tz::UTC);

        assert!(analysis.rain_expected);
        assert_eq!(analysis.probability, 25.0);
        assert_eq!(analysis.rainy_days, 1);
        assert_eq!(analysis.daily.len(), 1);

        let day = &analysis.daily[0];
        assert_eq!(day.date, date(3));
        assert!(day.has_rain);
        assert!((day.precip - 1.7).abs() < 1e-9);
        assert_eq!(day.min_temp, 16.5);
        assert_eq!(day.max_temp, 22.0);
    }

    #[test]
    fn drizzle_day_has_no_rain() {
        // 0.6 + 0.6 sums above the threshold but no single window reaches it.
        let samples = [sample(3, 0, 20.0, 0.6), sample(3, 3, 20.0, 0.6)];
        let analysis = analyze_rain(&samples, chrono_tz::UTC);
        assert!(!analysis.rain_expected);
        assert_eq!(analysis.rainy_days, 0);
        assert!(!analysis.daily[0].has_rain);
        assert!((analysis.daily[0].precip - 1.2).abs() < 1e-9);
    }

    #[test]
    fn threshold_boundary() {
        let analysis = analyze_rain(&[sample(3, 0, 20.0, 1.0)], chrono_tz::UTC);
        assert_eq!(analysis.probability, 100.0);

        let analysis = analyze_rain(&[sample(3, 0, 20.0, 0.999)], chrono_tz::UTC);
        assert_eq!(analysis.probability, 0.0);
        assert!(analysis.next_rain.is_none());
    }

    #[test]
    fn probability_rounds_to_one_decimal() {
        // 1 of 3 windows -> 33.333... -> 33.3
        let samples = [
            sample(3, 0, 20.0, 2.0),
            sample(3, 3, 20.0, 0.0),
            sample(3, 6, 20.0, 0.0),
        ];
        assert_eq!(analyze_rain(&samples, chrono_tz::UTC).probability, 33.3);

        // 2 of 3 windows -> 66.666... -> 66.7
        let samples = [
            sample(3, 0, 20.0, 2.0),
            sample(3, 3, 20.0, 3.0),
            sample(3, 6, 20.0, 0.0),
        ];
        assert_eq!(analyze_rain(&samples, chrono_tz::UTC).probability, 66.7);
    }

    #[test]
    fn probability_ties_round_to_even() {
        let windows = |rainy: u32, total: u32| -> Vec<ForecastSample> {
            (0..total)
                .map(|i| {
                    let precip = if i < rainy { 1.5 } else { 0.0 };
                    sample(1 + i / 8, (i % 8) * 3, 20.0, precip)
                })
                .collect()
        };
        // 6.25, 31.25 and 1.25 are exact ties.
        assert_eq!(analyze_rain(&windows(1, 16), chrono_tz::UTC).probability, 6.2);
        assert_eq!(analyze_rain(&windows(5, 16), chrono_tz::UTC).probability, 31.2);
        assert_eq!(analyze_rain(&windows(1, 80), chrono_tz::UTC).probability, 1.2);
        assert_eq!(round1(0.75), 0.8);
    }

    #[test]
    fn probability_stays_in_range() {
        for rainy in 0..=40usize {
            let samples: Vec<_> = (0..40u32)
                .map(|i| {
                    let precip = if (i as usize) < rainy { 1.5 } else { 0.0 };
                    sample(1 + i / 8, (i % 8) * 3, 20.0, precip)
                })
                .collect();
            let analysis = analyze_rain(&samples, chrono_tz::UTC);
            assert!((0.0..=100.0).contains(&analysis.probability));
            assert_eq!(analysis.probability, round1(100.0 * rainy as f64 / 40.0));
        }
    }

    #[test]
    fn next_rain_is_earliest_regardless_of_input_order() {
        let samples = [
            sample(5, 12, 25.0, 4.0),
            sample(4, 0, 20.0, 0.0),
            sample(4, 21, 19.0, 1.5),
            sample(4, 9, 23.0, 0.2),
        ];
        let analysis = analyze_rain(&samples, chrono_tz::UTC);
        let next = analysis.next_rain.unwrap();
        assert_eq!(next.date_naive(), date(4));
        assert_eq!(next.hour(), 21);
        assert_eq!(analysis.rainy_days, 2);
        let dates: Vec<_> = analysis.daily.iter().map(|d| d.date).collect();
        assert_eq!(dates, [date(4), date(5)]);
    }

    #[test]
    fn days_follow_timezone() {
        // 03:00 UTC on the 4th is 21:00 on the 3rd in Mexico City (UTC-6).
        let samples = [sample(4, 3, 20.0, 2.0), sample(4, 9, 20.0, 0.0)];

        let utc = analyze_rain(&samples, chrono_tz::UTC);
        assert_eq!(utc.daily.len(), 1);

        let cdmx = analyze_rain(&samples, chrono_tz::America::Mexico_City);
        let dates: Vec<_> = cdmx.daily.iter().map(|d| d.date).collect();
        assert_eq!(dates, [date(3), date(4)]);
        assert!(cdmx.daily[0].has_rain);
        assert!(!cdmx.daily[1].has_rain);

        let next = cdmx.next_rain.unwrap();
        assert_eq!(next.hour(), 21);
        assert_eq!(next.offset().local_minus_utc(), -6 * 3600);
    }

    #[test]
    fn rainy_days_count_distinct_dates() {
        let samples = [
            sample(3, 0, 20.0, 3.0),
            sample(3, 3, 20.0, 3.0),
            sample(4, 0, 20.0, 0.0),
            sample(5, 0, 20.0, 1.0),
        ];
        let analysis = analyze_rain(&samples, chrono_tz::UTC);
        assert_eq!(analysis.rainy_days, 2);
        assert_eq!(analysis.probability, 75.0);
    }
}
