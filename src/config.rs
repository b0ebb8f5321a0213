//! Network descriptions stored as TOML.
//!
//! ```toml
//! [lines.Red]
//! stations = [
//!     { name = "Central" },
//!     { name = "Hub", kind = "transition", transfers = [{ station = "Plaza", line = "Blue" }] },
//! ]
//!
//! [lines.Blue]
//! stations = [{ name = "Plaza" }]
//! ```
//!
//! Lines are kept in document order. Building a [`MetroSystem`] from a
//! description runs every line, station and transfer through the same
//! checks as interactive edits, so duplicate names and overfull hubs are
//! rejected here too.

use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde_derive::{Deserialize, Serialize};

use crate::log::{log, log_debug, LogLevel};
use crate::metro::{self, MetroSystem, Station, StationKind, Transfer};
use crate::table::OrderedTable;

/// Directory under the user configuration directory holding the default network.
pub const CONFIG_DIR_NAME: &str = "metro";

/// File name of the default network.
pub const NETWORK_FILE_NAME: &str = "network.toml";

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("failed to read `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid network description: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize network description: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error(transparent)]
    Metro(#[from] metro::Error),

    #[error("could not determine the user configuration directory")]
    NoConfigDir,
}

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default)]
    pub lines: OrderedTable<String, LineConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LineConfig {
    #[serde(default)]
    pub stations: Vec<StationConfig>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StationConfig {
    pub name: String,
    #[serde(default)]
    pub kind: StationKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transfers: Vec<Transfer>,
}

impl FromStr for NetworkConfig {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

impl NetworkConfig {
    /// `<config dir>/metro/network.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push(CONFIG_DIR_NAME);
            p.push(NETWORK_FILE_NAME);
            p
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        log_debug!(LogLevel::Debug, "loading network from {}", path.display());
        let st = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        st.parse()
    }

    /// Loads the network at [`default_path`](Self::default_path). A missing
    /// file is an empty network.
    pub fn load_default() -> Result<Self> {
        let path = Self::default_path().ok_or(Error::NoConfigDir)?;
        if !path.exists() {
            log!(
                LogLevel::Diagnostic,
                "no network at {}, starting empty",
                path.display()
            );
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    /// Builds the described system. Transfers are attached once every line
    /// and station exists, so they may point forward in the document.
    pub fn to_system(&self) -> core::result::Result<MetroSystem, metro::Error> {
        let mut system = MetroSystem::new();

        for (name, line) in &self.lines {
            system.add_line(name)?;
            for station in &line.stations {
                system.add_station_to_line(name, Station::new(station.name.clone(), station.kind))?;
            }
        }

        for (name, line) in &self.lines {
            for station in &line.stations {
                if station.transfers.is_empty() {
                    continue;
                }
                let handle = system.find_station_on_line(name, &station.name)?;
                for transfer in &station.transfers {
                    handle.add_transfer(transfer.station.clone(), transfer.line.clone())?;
                }
            }
        }

        Ok(system)
    }

    /// Describes `system`, with lines in name order.
    pub fn from_system(system: &MetroSystem) -> Self {
        let lines = system
            .lines()
            .map(|line| {
                let stations = line
                    .stations()
                    .iter()
                    .map(|(_, station)| StationConfig {
                        name: station.name().to_string(),
                        kind: station.kind(),
                        transfers: station
                            .hub()
                            .map(|hub| hub.connections().to_vec())
                            .unwrap_or_default(),
                    })
                    .collect();
                (line.name().to_string(), LineConfig { stations })
            })
            .collect();

        Self { lines }
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NETWORK: &str = r#"
        [lines.Red]
        stations = [
            { name = "Central" },
            { name = "Hub", kind = "transition", transfers = [{ station = "Plaza", line = "Blue" }] },
        ]

        [lines.Blue]
        stations = [{ name = "Plaza" }]
    "#;

    #[test]
    fn parses_and_builds() {
        let config: NetworkConfig = NETWORK.parse().unwrap();
        assert_eq!(config.lines.len(), 2);
        assert!(config.lines.contains_key("Red"));
        assert_eq!(config.lines.lookup("Blue").unwrap().stations[0].kind, StationKind::Direct);

        let system = config.to_system().unwrap();
        assert_eq!(system.len(), 2);
        let hub = system.find_transition_station("Hub").unwrap();
        assert_eq!(hub.hub().unwrap().stations_lines_names(), "Plaza-Blue\n");
    }

    #[test]
    fn round_trips_through_toml() {
        let config: NetworkConfig = NETWORK.parse().unwrap();
        let system = config.to_system().unwrap();

        let exported = NetworkConfig::from_system(&system);
        let text = exported.to_toml_string().unwrap();
        let reparsed: NetworkConfig = text.parse().unwrap();
        assert_eq!(reparsed, exported);
        assert_eq!(
            reparsed.to_system().unwrap().description(),
            system.description()
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            "lines = 3".parse::<NetworkConfig>(),
            Err(Error::Parse(_))
        ));
        assert!(matches!(
            r#"[lines.Red]
               stations = [{ name = "A", kind = "express" }]"#
                .parse::<NetworkConfig>(),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn station_kinds_ignore_case() {
        let config: NetworkConfig = r#"
            [lines.Red]
            stations = [
                { name = "A", kind = "Direct" },
                { name = "B", kind = "TRANSITION" },
                { name = "C", kind = "transition" },
            ]
        "#
        .parse()
        .unwrap();

        let kinds: Vec<StationKind> = config
            .lines
            .lookup("Red")
            .unwrap()
            .stations
            .iter()
            .map(|s| s.kind)
            .collect();
        assert_eq!(
            kinds,
            [StationKind::Direct, StationKind::Transition, StationKind::Transition]
        );
        assert_eq!(
            config.to_system().unwrap().description(),
            "Line: Red\nA-Direct\nB-transition\nC-transition\n\n"
        );

        let text = config.to_toml_string().unwrap();
        assert!(text.contains("kind = \"direct\""));
        assert!(text.contains("kind = \"transition\""));
    }

    #[test]
    fn duplicate_station_fails_to_build() {
        let config: NetworkConfig = r#"
            [lines.Red]
            stations = [{ name = "A" }, { name = "A" }]
        "#
        .parse()
        .unwrap();
        assert!(matches!(
            config.to_system(),
            Err(metro::Error::StationExists { .. })
        ));
    }

    #[test]
    fn transfers_from_direct_station_fail_to_build() {
        let config: NetworkConfig = r#"
            [lines.Red]
            stations = [{ name = "A", transfers = [{ station = "B", line = "Red" }] }]
        "#
        .parse()
        .unwrap();
        assert_eq!(
            config.to_system().unwrap_err(),
            metro::Error::NotATransition("A".to_string())
        );
    }

    #[test]
    fn empty_document_is_empty_network() {
        let config: NetworkConfig = "".parse().unwrap();
        assert!(config.lines.is_empty());
        assert!(config.to_system().unwrap().is_empty());
    }
}
