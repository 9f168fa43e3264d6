//! Comparative analysis of clean readings.
//!
//! Readings are split into three comparison groups around the station
//! cluster, then described, tested, followed over time and charted.

pub mod charts;
pub mod descriptive;
pub mod inferential;
pub mod temporal;

use crate::constants::CLUSTER_LABEL;
use crate::models::{MetroLine, Reading};
use crate::stations::is_cluster_station;
use std::fmt;

/// Comparison groups of the analysis battery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AnalysisGroup {
    /// Readings of the cluster stations, whatever their line
    Cluster,
    /// Line 2 readings outside the cluster
    Line2WithoutCluster,
    /// Every line other than line 2, cluster stations included
    OtherLines,
}

impl AnalysisGroup {
    pub const ALL: [AnalysisGroup; 3] = [
        AnalysisGroup::Cluster,
        AnalysisGroup::Line2WithoutCluster,
        AnalysisGroup::OtherLines,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AnalysisGroup::Cluster => CLUSTER_LABEL,
            AnalysisGroup::Line2WithoutCluster => "Line 2 (without cluster)",
            AnalysisGroup::OtherLines => "Other lines",
        }
    }

    /// Whether a reading falls in this group; groups may overlap
    pub fn contains(&self, reading: &Reading) -> bool {
        let in_cluster = is_cluster_station(&reading.station_name);
        match self {
            AnalysisGroup::Cluster => in_cluster,
            AnalysisGroup::Line2WithoutCluster => reading.line == MetroLine::Verde && !in_cluster,
            AnalysisGroup::OtherLines => reading.line != MetroLine::Verde,
        }
    }
}

impl fmt::Display for AnalysisGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Borrowed readings of each comparison group
#[derive(Debug, Clone, Default)]
pub struct AnalysisGroups<'a> {
    pub cluster: Vec<&'a Reading>,
    pub line_2_without_cluster: Vec<&'a Reading>,
    pub other_lines: Vec<&'a Reading>,
}

impl<'a> AnalysisGroups<'a> {
    pub fn from_readings(readings: &'a [Reading]) -> Self {
        let select = |group: AnalysisGroup| -> Vec<&'a Reading> {
            readings.iter().filter(|r| group.contains(r)).collect()
        };

        Self {
            cluster: select(AnalysisGroup::Cluster),
            line_2_without_cluster: select(AnalysisGroup::Line2WithoutCluster),
            other_lines: select(AnalysisGroup::OtherLines),
        }
    }

    pub fn get(&self, group: AnalysisGroup) -> &[&'a Reading] {
        match group {
            AnalysisGroup::Cluster => &self.cluster,
            AnalysisGroup::Line2WithoutCluster => &self.line_2_without_cluster,
            AnalysisGroup::OtherLines => &self.other_lines,
        }
    }

    /// Flow values of a group, as floats for the statistics routines
    pub fn flows(&self, group: AnalysisGroup) -> Vec<f64> {
        flows(self.get(group).iter().copied())
    }
}

pub fn flows<'a>(readings: impl IntoIterator<Item = &'a Reading>) -> Vec<f64> {
    readings.into_iter().map(|r| r.flow as f64).collect()
}

/// Lines compared by the one-way ANOVA, in the order of the export blocks
pub const ANOVA_LINES: [MetroLine; 4] = [
    MetroLine::Azul,
    MetroLine::Verde,
    MetroLine::Vermelha,
    MetroLine::Prata,
];

/// Flow values of each requested line, in the order given.
///
/// A line without readings yields an empty group rather than being skipped.
pub fn flows_for_lines(readings: &[Reading], lines: &[MetroLine]) -> Vec<(MetroLine, Vec<f64>)> {
    lines
        .iter()
        .map(|&line| (line, flows(readings.iter().filter(|r| r.line == line))))
        .collect()
}
