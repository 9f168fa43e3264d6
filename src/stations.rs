//! Static station lookup and cluster membership.
//!
//! Each metro line has a fixed table of short station codes to display
//! names. The tables are compile-time data, never mutated, and safe to share
//! across threads. Codes that are not catalogued resolve to
//! [`UNKNOWN_STATION`] instead of failing.

use crate::constants::{CLUSTER_STATIONS, UNKNOWN_STATION};
use crate::models::MetroLine;

const LINE_1_STATIONS: &[(&str, &str)] = &[
    ("JAB", "Jabaquara"),
    ("CON", "Conceição"),
    ("JUD", "São Judas"),
    ("SAU", "Saúde"),
    ("ARV", "Praça da Árvore"),
    ("SCZ", "Santa Cruz"),
    ("VMN", "Vila Mariana"),
    ("ANR", "Ana Rosa"),
    ("PSO", "Paraíso"),
    ("VGO", "Vergueiro"),
    ("JQM", "Japão-Liberdade"),
    ("LIB", "Liberdade"),
    ("PSE", "Sé"),
    ("BTO", "São Bento"),
    ("LUZ", "Luz"),
    ("TRD", "Tiradentes"),
    ("PPQ", "Armênia"),
    ("TTE", "Tietê"),
    ("CDU", "Carandiru"),
    ("SAN", "Santana"),
    ("JPA", "Jardim São Paulo"),
    ("PIG", "Parada Inglesa"),
    ("TUC", "Tucuruvi"),
];

const LINE_2_STATIONS: &[(&str, &str)] = &[
    ("VPT", "Vila Prudente"),
    ("TTI", "Tamanduateí"),
    ("SAC", "Sacomã"),
    ("AIP", "Alto do Ipiranga"),
    ("IMG", "Imigrantes"),
    ("CKB", "CHácara Klabin"),
    ("ANR", "Ana Rosa"),
    ("PSO", "Paraíso"),
    ("BGD", "Brigadeiro"),
    ("TRI", "Trianon-MASP"),
    ("CNS", "Consolação"),
    ("CLI", "Clínicas"),
    ("SUM", "Sumaré"),
    ("VMD", "Vila Madalena"),
];

const LINE_3_STATIONS: &[(&str, &str)] = &[
    ("ITQ", "Itaquera"),
    ("ART", "Artur Alvim"),
    ("PCA", "Patriarca"),
    ("VPA", "Vila Matilde"),
    ("VTD", "Vila Esperança"),
    ("PEN", "Penha"),
    ("CAR", "Carrão"),
    ("TAT", "Tatuapé"),
    ("BEL", "Belém"),
    ("BRE", "Bresser-Mooca"),
    ("BAS", "Brás"),
    ("PDS", "Pedro II"),
    ("PSE", "Sé"),
    ("GBU", "Guaianases"),
    ("REP", "República"),
    ("CEC", "Corintians-Itaquera"),
    ("DEO", "Dom Bosco"),
    ("BFU", "Barra Funda"),
];

const LINE_4_STATIONS: &[(&str, &str)] = &[
    ("LUZ", "Luz"),
    ("REP", "República"),
    ("HIG", "Higienópolis-Mackenzie"),
    ("PAU", "Paulista"),
    ("PIN", "Pinheiros"),
    ("BUT", "Butantã"),
    ("MOR", "São Paulo-Morumbi"),
];

const LINE_15_STATIONS: &[(&str, &str)] = &[
    ("VPM", "Vila Prudente"),
    ("ORT", "Oratório"),
    ("SLU", "São Lucas"),
    ("CAD", "Camilo Haddad"),
    ("VTL", "Vila Tolstói"),
    ("VUN", "Vila União"),
    ("JPL", "Jardim Planalto"),
    ("SAP", "Sapopemba"),
    ("FJT", "Fazenda da Juta"),
    ("MAT", "São Mateus"),
    ("IGT", "Jardim Colonial"),
];

/// Station table of one line, as (code, display name) pairs
pub fn line_stations(line: MetroLine) -> &'static [(&'static str, &'static str)] {
    match line {
        MetroLine::Azul => LINE_1_STATIONS,
        MetroLine::Verde => LINE_2_STATIONS,
        MetroLine::Vermelha => LINE_3_STATIONS,
        MetroLine::Amarela => LINE_4_STATIONS,
        MetroLine::Prata => LINE_15_STATIONS,
    }
}

/// Display name of a station code on a known line
pub fn resolve_station(line: MetroLine, code: &str) -> &'static str {
    line_stations(line)
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
        .unwrap_or(UNKNOWN_STATION)
}

pub fn is_unknown_station(name: &str) -> bool {
    name == UNKNOWN_STATION
}

/// Whether a station display name belongs to the comparison cluster
pub fn is_cluster_station(name: &str) -> bool {
    CLUSTER_STATIONS.contains(&name)
}

/// Cluster membership as a 0/1 indicator
pub fn cluster_flag(name: &str) -> u8 {
    u8::from(is_cluster_station(name))
}
