use serde_derive::{Deserialize, Serialize};

/// Most connections a single transfer hub accepts.
pub const MAX_CONNECTIONS: usize = 3;

/// A connection from a transfer hub to a station on another line.
#[derive(Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub station: String,
    pub line: String,
}

impl Transfer {
    pub fn new(station: impl Into<String>, line: impl Into<String>) -> Self {
        Self {
            station: station.into(),
            line: line.into(),
        }
    }
}

impl core::fmt::Display for Transfer {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{}-{}", self.station, self.line)
    }
}

/// Connections from one transition station, in the order they were added.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransferHub {
    connections: Vec<Transfer>,
}

impl TransferHub {
    pub const fn new() -> Self {
        Self {
            connections: Vec::new(),
        }
    }

    /// Adds a connection. When the hub already holds [`MAX_CONNECTIONS`],
    /// the rejected connection is handed back.
    pub fn add_station(
        &mut self,
        station: impl Into<String>,
        line: impl Into<String>,
    ) -> Result<(), Transfer> {
        let transfer = Transfer::new(station, line);
        if self.connections.len() >= MAX_CONNECTIONS {
            return Err(transfer);
        }
        self.connections.push(transfer);
        Ok(())
    }

    pub fn connections(&self) -> &[Transfer] {
        &self.connections
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Keeps only the connections for which `keep` returns true and returns
    /// how many were dropped.
    pub fn retain<F: FnMut(&Transfer) -> bool>(&mut self, keep: F) -> usize {
        let before = self.connections.len();
        self.connections.retain(keep);
        before - self.connections.len()
    }

    fn lines_of<F: Fn(&Transfer) -> String>(&self, f: F) -> String {
        self.connections.iter().fold(String::new(), |mut out, t| {
            out += &f(t);
            out.push('\n');
            out
        })
    }

    /// Connected station names, one per line.
    pub fn station_names(&self) -> String {
        self.lines_of(|t| t.station.clone())
    }

    /// Connected line names, one per line.
    pub fn line_names(&self) -> String {
        self.lines_of(|t| t.line.clone())
    }

    /// `station-line` for every connection, one per line.
    pub fn stations_lines_names(&self) -> String {
        self.lines_of(Transfer::to_string)
    }
}
