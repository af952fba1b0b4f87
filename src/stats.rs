use std::collections::BTreeMap;

use itertools::Itertools;

use crate::data::LocationResult;
use crate::location::Region;

/// Per-location quantity that can be summarized or correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Temperature,
    Humidity,
    Pressure,
    WindSpeed,
    Probability,
    RainyDays,
}

impl Metric {
    /// Metrics shown in the correlation matrix.
    pub const CORRELATED: [Metric; 6] = [
        Metric::Temperature,
        Metric::Humidity,
        Metric::Pressure,
        Metric::WindSpeed,
        Metric::Probability,
        Metric::RainyDays,
    ];

    /// Metrics shown in the descriptive statistics table.
    pub const DESCRIBED: [Metric; 3] = [Metric::Temperature, Metric::Humidity, Metric::Probability];

    pub fn label(self) -> &'static str {
        match self {
            Metric::Temperature => "Temp (°C)",
            Metric::Humidity => "Humidity (%)",
            Metric::Pressure => "Pressure (hPa)",
            Metric::WindSpeed => "Wind (m/s)",
            Metric::Probability => "Rain prob. (%)",
            Metric::RainyDays => "Rainy days",
        }
    }

    pub fn value(self, result: &LocationResult) -> Option<f64> {
        match self {
            Metric::Temperature => result.current.temp,
            Metric::Humidity => result.current.humidity,
            Metric::Pressure => result.current.pressure,
            Metric::WindSpeed => result.current.wind_speed,
            Metric::Probability => Some(result.rain.probability),
            Metric::RainyDays => Some(result.rain.rainy_days as f64),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionSummary {
    pub region: Region,
    pub mean_probability: f64,
    pub mean_rainy_days: f64,
    pub states: usize,
}

/// Average rain outlook per region. Regions without results are left out.
pub fn regional_summary(results: &[LocationResult]) -> Vec<RegionSummary> {
    let by_region = results.iter().into_group_map_by(|r| r.region());

    Region::ALL
        .iter()
        .filter_map(|region| {
            let group = by_region.get(region)?;
            let n = group.len() as f64;
            Some(RegionSummary {
                region: *region,
                mean_probability: group.iter().map(|r| r.rain.probability).sum::<f64>() / n,
                mean_rainy_days: group.iter().map(|r| r.rain.rainy_days as f64).sum::<f64>() / n,
                states: group.len(),
            })
        })
        .collect()
}

/// Summary statistics of one column. Values are absent when the column has too few entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Description {
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (n - 1 denominator).
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// Linear-interpolation quantile of an ascending, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Describe the present values of a column, ignoring missing ones.
pub fn describe(values: impl IntoIterator<Item = Option<f64>>) -> Description {
    let sorted: Vec<f64> = values
        .into_iter()
        .flatten()
        .sorted_by(f64::total_cmp)
        .collect();
    let count = sorted.len();
    if count == 0 {
        return Description::default();
    }

    let mean = sorted.iter().sum::<f64>() / count as f64;
    let std = (count > 1).then(|| {
        let var = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        var.sqrt()
    });

    Description {
        count,
        mean: Some(mean),
        std,
        min: sorted.first().copied(),
        q25: Some(quantile(&sorted, 0.25)),
        median: Some(quantile(&sorted, 0.5)),
        q75: Some(quantile(&sorted, 0.75)),
        max: sorted.last().copied(),
    }
}

/// Pearson correlation over the pairs where both values are present.
pub fn pearson(pairs: impl IntoIterator<Item = (Option<f64>, Option<f64>)>) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = pairs
        .into_iter()
        .filter_map(|(x, y)| Some((x?, y?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        cov += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x).powi(2);
        var_y += (y - mean_y).powi(2);
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some((cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0))
}

/// Square matrix of pairwise correlations between `metrics`.
pub fn correlation_matrix(results: &[LocationResult], metrics: &[Metric]) -> Vec<Vec<Option<f64>>> {
    metrics
        .iter()
        .map(|&a| {
            metrics
                .iter()
                .map(|&b| pearson(results.iter().map(|r| (a.value(r), b.value(r)))))
                .collect()
        })
        .collect()
}

/// One histogram bin over `[start, end)`; the last bin also includes its end.
#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub counts: BTreeMap<Region, usize>,
}

impl Bin {
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

/// Count rain probabilities into `bins` equal-width bins over 0-100%, per region.
pub fn probability_histogram(results: &[LocationResult], bins: usize) -> Vec<Bin> {
    let bins = bins.max(1);
    let width = 100.0 / bins as f64;
    let mut histogram: Vec<Bin> = (0..bins)
        .map(|i| Bin {
            start: i as f64 * width,
            end: (i + 1) as f64 * width,
            counts: BTreeMap::new(),
        })
        .collect();

    for result in results {
        let index = ((result.rain.probability / width).floor() as usize).min(bins - 1);
        *histogram[index].counts.entry(result.region()).or_default() += 1;
    }
    histogram
}

/// The `n` warmest locations by current temperature, warmest first.
pub fn hottest(results: &[LocationResult], n: usize) -> Vec<&LocationResult> {
    results
        .iter()
        .filter(|r| r.current.temp.is_some())
        .sorted_by(|a, b| by_temp(b, a))
        .take(n)
        .collect()
}

/// The `n` coolest locations by current temperature, coolest first.
pub fn coolest(results: &[LocationResult], n: usize) -> Vec<&LocationResult> {
    results
        .iter()
        .filter(|r| r.current.temp.is_some())
        .sorted_by(|a, b| by_temp(a, b))
        .take(n)
        .collect()
}

fn by_temp(a: &LocationResult, b: &LocationResult) -> std::cmp::Ordering {
    let temp = |r: &LocationResult| r.current.temp.unwrap_or(f64::NAN);
    temp(a).total_cmp(&temp(b))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::{CurrentConditions, RainAnalysis};
    use crate::location::MEXICAN_STATES;

    /// Result for the `index`-th state with the given temperature and rain probability.
    pub(crate) fn result(index: usize, temp: Option<f64>, probability: f64) -> LocationResult {
        LocationResult {
            location: MEXICAN_STATES[index].clone(),
            current: CurrentConditions {
                temp,
                ..Default::default()
            },
            rain: RainAnalysis {
                rain_expected: probability > 0.0,
                probability,
                ..Default::default()
            },
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn regional_means() {
        // 1 = Baja California (Norte), 5 = Chihuahua (Norte), 3 = Campeche (Sur)
        let mut results = vec![result(1, None, 10.0), result(5, None, 30.0), result(3, None, 60.0)];
        results[0].rain.rainy_days = 1;
        results[1].rain.rainy_days = 2;
        results[2].rain.rainy_days = 4;

        let summary = regional_summary(&results);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].region, Region::Norte);
        assert_eq!(summary[0].states, 2);
        assert!(close(summary[0].mean_probability, 20.0));
        assert!(close(summary[0].mean_rainy_days, 1.5));
        assert_eq!(summary[1].region, Region::Sur);
        assert!(close(summary[1].mean_probability, 60.0));
    }

    #[test]
    fn describe_matches_linear_quantiles() {
        let d = describe([Some(1.0), None, Some(4.0), Some(2.0), Some(3.0)]);
        assert_eq!(d.count, 4);
        assert!(close(d.mean.unwrap(), 2.5));
        assert!(close(d.std.unwrap(), (5.0f64 / 3.0).sqrt()));
        assert_eq!(d.min, Some(1.0));
        assert!(close(d.q25.unwrap(), 1.75));
        assert!(close(d.median.unwrap(), 2.5));
        assert!(close(d.q75.unwrap(), 3.25));
        assert_eq!(d.max, Some(4.0));
    }

    #[test]
    fn describe_degenerate_columns() {
        assert_eq!(describe([None, None]), Description::default());
        let single = describe([Some(7.0)]);
        assert_eq!(single.count, 1);
        assert_eq!(single.std, None);
        assert_eq!(single.median, Some(7.0));
    }

    #[test]
    fn pearson_basics() {
        let up = [(Some(1.0), Some(2.0)), (Some(2.0), Some(4.0)), (Some(3.0), Some(6.0))];
        assert!(close(pearson(up).unwrap(), 1.0));

        let down = [(Some(1.0), Some(3.0)), (Some(2.0), Some(2.0)), (Some(3.0), Some(1.0))];
        assert!(close(pearson(down).unwrap(), -1.0));

        // Constant column and too few complete pairs have no correlation.
        let flat = [(Some(1.0), Some(5.0)), (Some(2.0), Some(5.0))];
        assert_eq!(pearson(flat), None);
        let sparse = [(Some(1.0), None), (Some(2.0), Some(5.0))];
        assert_eq!(pearson(sparse), None);
    }

    #[test]
    fn correlation_matrix_is_symmetric() {
        let results = vec![
            result(0, Some(30.0), 10.0),
            result(1, Some(20.0), 40.0),
            result(2, Some(25.0), 20.0),
            result(3, None, 90.0),
        ];
        let metrics = [Metric::Temperature, Metric::Probability];
        let matrix = correlation_matrix(&results, &metrics);
        assert!(close(matrix[0][0].unwrap(), 1.0));
        assert_eq!(matrix[0][1], matrix[1][0]);
        assert!(matrix[0][1].unwrap() < 0.0);
    }

    #[test]
    fn histogram_bins() {
        let results = vec![
            result(0, None, 0.0),
            result(1, None, 4.9),
            result(3, None, 5.0),
            result(4, None, 100.0),
        ];
        let hist = probability_histogram(&results, 20);
        assert_eq!(hist.len(), 20);
        assert_eq!(hist[0].total(), 2);
        assert_eq!(hist[1].total(), 1);
        assert_eq!(hist[19].total(), 1);
        assert_eq!(hist[19].counts.get(&Region::Sur), Some(&1));
        assert_eq!(hist.iter().map(Bin::total).sum::<usize>(), 4);
    }

    #[test]
    fn rankings_skip_missing_temperatures() {
        let results = vec![
            result(0, Some(25.0), 0.0),
            result(1, None, 0.0),
            result(2, Some(31.0), 0.0),
            result(3, Some(12.5), 0.0),
        ];
        let hot: Vec<_> = hottest(&results, 2).iter().map(|r| r.name()).collect();
        assert_eq!(hot, ["Baja California Sur", "Aguascalientes"]);
        let cool: Vec<_> = coolest(&results, 5).iter().map(|r| r.name()).collect();
        assert_eq!(cool, ["Campeche", "Aguascalientes", "Baja California Sur"]);
    }
}
