//! Monthly and interannual aggregates.

use super::inferential::pearson_r;
use crate::models::Reading;
use crate::stations::is_cluster_station;
use chrono::Datelike;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Default)]
struct MeanAccumulator {
    sum: f64,
    count: usize,
}

impl MeanAccumulator {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

fn grouped_means<'a, K: Ord>(
    readings: impl IntoIterator<Item = &'a Reading>,
    key: impl Fn(&Reading) -> K,
) -> BTreeMap<K, f64> {
    let mut groups: BTreeMap<K, MeanAccumulator> = BTreeMap::new();
    for reading in readings {
        groups
            .entry(key(reading))
            .or_default()
            .push(reading.flow as f64);
    }
    groups
        .into_iter()
        .filter_map(|(k, acc)| acc.mean().map(|m| (k, m)))
        .collect()
}

/// Mean flow per calendar month (1-12), pooling all years
pub fn monthly_means<'a>(readings: impl IntoIterator<Item = &'a Reading>) -> BTreeMap<u32, f64> {
    grouped_means(readings, |r| r.date.month())
}

/// Percentage change between consecutive entries; the first entry, and any
/// entry following a zero, has none
pub fn percentage_change<K: Copy + Ord>(series: &BTreeMap<K, f64>) -> Vec<(K, Option<f64>)> {
    let mut previous: Option<f64> = None;
    series
        .iter()
        .map(|(&key, &value)| {
            let change = previous
                .filter(|p| *p != 0.0)
                .map(|p| (value / p - 1.0) * 100.0);
            previous = Some(value);
            (key, change)
        })
        .collect()
}

/// Mean flow per year
pub fn yearly_means<'a>(readings: impl IntoIterator<Item = &'a Reading>) -> BTreeMap<i32, f64> {
    grouped_means(readings, |r| r.date.year())
}

/// Yearly mean flow of cluster and non-cluster readings
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClusterSplit {
    pub non_cluster: Option<f64>,
    pub cluster: Option<f64>,
}

pub fn yearly_means_by_cluster<'a>(
    readings: impl IntoIterator<Item = &'a Reading>,
) -> BTreeMap<i32, ClusterSplit> {
    let means = grouped_means(readings, |r| {
        (r.date.year(), is_cluster_station(&r.station_name))
    });

    let mut split: BTreeMap<i32, ClusterSplit> = BTreeMap::new();
    for ((year, in_cluster), mean) in means {
        let entry = split.entry(year).or_default();
        if in_cluster {
            entry.cluster = Some(mean);
        } else {
            entry.non_cluster = Some(mean);
        }
    }
    split
}

/// Cluster share of the total flow per year, as a percentage; `None` for a
/// year whose total flow is zero
pub fn cluster_share_by_year<'a>(
    readings: impl IntoIterator<Item = &'a Reading>,
) -> BTreeMap<i32, Option<f64>> {
    let mut totals: BTreeMap<i32, (i64, i64)> = BTreeMap::new();
    for reading in readings {
        let (cluster, total) = totals.entry(reading.date.year()).or_default();
        if is_cluster_station(&reading.station_name) {
            *cluster += reading.flow;
        }
        *total += reading.flow;
    }

    totals
        .into_iter()
        .map(|(year, (cluster, total))| {
            let share = (total > 0).then(|| cluster as f64 * 100.0 / total as f64);
            (year, share)
        })
        .collect()
}

/// Pairwise Pearson correlations between cluster stations' daily flows
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub stations: Vec<String>,
    /// Row-major; `None` where fewer than two common dates exist or a
    /// series is constant
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.stations.iter().position(|s| s == a)?;
        let j = self.stations.iter().position(|s| s == b)?;
        self.values[i][j]
    }
}

/// Pivot cluster readings to date × station (mean per cell) and correlate
/// every pair of stations over the dates both report
pub fn cluster_correlation_matrix<'a>(
    readings: impl IntoIterator<Item = &'a Reading>,
) -> CorrelationMatrix {
    let cells = grouped_means(
        readings
            .into_iter()
            .filter(|r| is_cluster_station(&r.station_name)),
        |r| (r.station_name.clone(), r.date),
    );

    let mut series: BTreeMap<String, BTreeMap<chrono::NaiveDate, f64>> = BTreeMap::new();
    for ((station, date), value) in cells {
        series.entry(station).or_default().insert(date, value);
    }

    let stations: Vec<String> = series.keys().cloned().collect();
    let values = stations
        .iter()
        .map(|a| {
            stations
                .iter()
                .map(|b| {
                    let (sa, sb) = (&series[a], &series[b]);
                    let common: BTreeSet<_> =
                        sa.keys().filter(|d| sb.contains_key(*d)).collect();
                    let x: Vec<f64> = common.iter().map(|d| sa[*d]).collect();
                    let y: Vec<f64> = common.iter().map(|d| sb[*d]).collect();
                    pearson_r(&x, &y)
                })
                .collect()
        })
        .collect();

    CorrelationMatrix { stations, values }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::reading;
    use super::*;
    use crate::models::MetroLine;

    #[test]
    fn test_monthly_means_and_change() {
        let readings = vec![
            reading((2024, 1, 1), MetroLine::Azul, "JAB", 100),
            reading((2024, 1, 2), MetroLine::Azul, "JAB", 300),
            reading((2024, 2, 1), MetroLine::Azul, "JAB", 300),
            reading((2024, 3, 1), MetroLine::Azul, "JAB", 150),
        ];

        let monthly = monthly_means(&readings);
        assert_eq!(monthly, BTreeMap::from([(1, 200.0), (2, 300.0), (3, 150.0)]));

        let change = percentage_change(&monthly);
        assert_eq!(change[0], (1, None));
        assert!((change[1].1.unwrap() - 50.0).abs() < 1e-12);
        assert!((change[2].1.unwrap() + 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_change_after_zero_is_undefined() {
        let series = BTreeMap::from([(1u32, 0.0), (2, 10.0)]);
        assert_eq!(percentage_change(&series), vec![(1, None), (2, None)]);
    }

    #[test]
    fn test_interannual_aggregates() {
        let readings = vec![
            reading((2023, 5, 1), MetroLine::Verde, "TRI", 30),
            reading((2023, 5, 1), MetroLine::Azul, "JAB", 70),
            reading((2024, 5, 1), MetroLine::Azul, "JAB", 50),
            reading((2024, 5, 2), MetroLine::Azul, "JAB", 0),
        ];

        assert_eq!(
            yearly_means(&readings),
            BTreeMap::from([(2023, 50.0), (2024, 25.0)])
        );

        let split = yearly_means_by_cluster(&readings);
        assert_eq!(
            split[&2023],
            ClusterSplit {
                non_cluster: Some(70.0),
                cluster: Some(30.0)
            }
        );
        assert_eq!(split[&2024].cluster, None);

        let share = cluster_share_by_year(&readings);
        assert_eq!(share[&2023], Some(30.0));
        assert_eq!(share[&2024], Some(0.0));
    }

    #[test]
    fn test_cluster_correlation_uses_common_dates() {
        let readings = vec![
            reading((2024, 1, 1), MetroLine::Verde, "TRI", 10),
            reading((2024, 1, 2), MetroLine::Verde, "TRI", 20),
            reading((2024, 1, 3), MetroLine::Verde, "TRI", 30),
            reading((2024, 1, 1), MetroLine::Verde, "CNS", 5),
            reading((2024, 1, 2), MetroLine::Verde, "CNS", 4),
            reading((2024, 1, 3), MetroLine::Verde, "CNS", 3),
            reading((2024, 1, 2), MetroLine::Amarela, "PAU", 7),
            reading((2024, 1, 2), MetroLine::Azul, "JAB", 999),
        ];

        let matrix = cluster_correlation_matrix(&readings);
        assert_eq!(matrix.stations, vec!["Consolação", "Paulista", "Trianon-MASP"]);
        assert_eq!(matrix.get("Trianon-MASP", "Consolação"), Some(-1.0));
        assert_eq!(matrix.get("Trianon-MASP", "Trianon-MASP"), Some(1.0));
        // single common date
        assert_eq!(matrix.get("Paulista", "Trianon-MASP"), None);
        assert_eq!(matrix.get("Jabaquara", "Paulista"), None);
    }
}
