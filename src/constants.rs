//! Application constants for the ridership processor
//!
//! Tokens and conventions of the raw operator export, the canonical output
//! column names, and default file naming.

// =============================================================================
// Raw Export Format
// =============================================================================

/// Field delimiter of the raw export
pub const RAW_DELIMITER: u8 = b';';

/// First field of the header row; also the day-counter column name
pub const HEADER_TOKEN: &str = "DIA";

/// Name of the pre-aggregated total column closing each line block
pub const TOTAL_TOKEN: &str = "TOTAL";

/// Prefix given to columns whose header cell is empty
pub const UNNAMED_COLUMN_PREFIX: &str = "Unnamed";

/// Raw value meaning "no data reported"
pub const SENTINEL_DASH: &str = "-";

/// Raw values are expressed in thousands of passengers
pub const FLOW_MULTIPLIER: f64 = 1000.0;

/// Valid day-of-month range
pub const MIN_DAY: u32 = 1;
pub const MAX_DAY: u32 = 31;

// =============================================================================
// Station Resolution
// =============================================================================

/// Marker assigned to station codes missing from the lookup table
pub const UNKNOWN_STATION: &str = "DESCONHECIDA";

/// Display names of the stations forming the comparison cluster
pub const CLUSTER_STATIONS: &[&str] = &["Trianon-MASP", "Brigadeiro", "Consolação", "Paulista"];

/// Human-readable cluster label used in reports
pub const CLUSTER_LABEL: &str = "Cluster Paulista";

// =============================================================================
// Output Format
// =============================================================================

/// Canonical output columns, in order
pub mod columns {
    pub const DATE: &str = "data";
    pub const LINE: &str = "linha";
    pub const STATION_CODE: &str = "sigla";
    pub const STATION_NAME: &str = "estacao";
    pub const FLOW: &str = "fluxo";
    /// Extra column of the multi-year historical file
    pub const YEAR: &str = "ano";

    pub const ORDERED: &[&str] = &[DATE, LINE, STATION_CODE, STATION_NAME, FLOW];
}

/// Date format of the `data` column
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// File Naming
// =============================================================================

/// Glob pattern matching raw yearly exports inside a directory
pub const RAW_FILE_PATTERN: &str = "passageiros_dia_*.csv";

/// Regex extracting the year from a raw export file name
pub const RAW_FILE_YEAR_REGEX: &str = r"passageiros_dia_(\d{4})\.csv$";

/// Default output directory for clean datasets
pub const DEFAULT_OUTPUT_DIR: &str = "data/processed";

/// File name of the clean dataset for one year
pub fn clean_file_name(year: i32) -> String {
    format!("metro_{}_clean.csv", year)
}

/// File name of the concatenated multi-year dataset
pub fn historical_file_name(years: &[i32]) -> String {
    let joined = years
        .iter()
        .map(|y| y.to_string())
        .collect::<Vec<_>>()
        .join("_");
    format!("metro_{}_clean.csv", joined)
}

/// File names of the analysis charts
pub mod charts {
    pub const GROUP_MEANS: &str = "group_means.svg";
    pub const MONTHLY_TRENDS: &str = "monthly_trends.svg";
    pub const CLUSTER_CORRELATION: &str = "cluster_correlation.svg";
    pub const GROUP_BOXPLOT: &str = "group_boxplot.svg";
    pub const INTERANNUAL: &str = "interannual_comparison.svg";
}

// =============================================================================
// Statistics
// =============================================================================

/// Significance level for hypothesis tests
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Sample size above which the Shapiro-Wilk p-value approximation degrades
pub const SHAPIRO_MAX_RELIABLE_N: usize = 5000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_columns_order() {
        assert_eq!(columns::ORDERED, &["data", "linha", "sigla", "estacao", "fluxo"]);
    }

    #[test]
    fn test_file_names() {
        assert_eq!(clean_file_name(2024), "metro_2024_clean.csv");
        assert_eq!(
            historical_file_name(&[2023, 2024, 2025]),
            "metro_2023_2024_2025_clean.csv"
        );
    }
}
