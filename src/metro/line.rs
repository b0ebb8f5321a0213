use std::rc::Rc;

use crate::log::{log, LogLevel};
use crate::table::OrderedTable;

use super::station::Station;
use super::{Error, Result};

/// A named line: its stations in the order they were added.
#[derive(Clone, Debug, Default)]
pub struct Line {
    name: String,
    stations: OrderedTable<String, Rc<Station>>,
}

impl Line {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stations: OrderedTable::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Appends `station`, rejecting a name already on this line.
    pub fn add_station(&mut self, station: Station) -> Result<Rc<Station>> {
        let key = station.name();
        if self.stations.find(key) != self.stations.len() {
            return Err(Error::StationExists {
                line: self.name.clone(),
                station: key.to_string(),
            });
        }

        log!(LogLevel::Info, "line `{}`: adding station `{}`", self.name, key);

        let key = key.to_string();
        let station = Rc::new(station);
        self.stations.insert(key, station.clone());
        Ok(station)
    }

    /// Shared handle to the station called `name`.
    pub fn find(&self, name: &str) -> Result<Rc<Station>> {
        let index = self.stations.find(name);
        if index == self.stations.len() {
            return Err(self.not_found(name));
        }
        Ok(self.stations[index].1.clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.stations.contains_key(name)
    }

    pub fn remove_station(&mut self, name: &str) -> Result<()> {
        if !self.stations.erase_key(name) {
            return Err(self.not_found(name));
        }
        log!(LogLevel::Info, "line `{}`: removed station `{}`", self.name, name);
        Ok(())
    }

    fn not_found(&self, name: &str) -> Error {
        Error::StationNotFound {
            line: self.name.clone(),
            station: name.to_string(),
        }
    }

    pub fn stations(&self) -> &OrderedTable<String, Rc<Station>> {
        &self.stations
    }

    /// `name-kind` for every station, one per line, in line order.
    pub fn table_str(&self) -> String {
        let mut res = String::new();
        for (_, station) in &self.stations {
            res += station.name();
            res.push('-');
            res += &station.kind().to_string();
            res.push('\n');
        }
        res
    }
}

impl core::fmt::Display for Line {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(&self.table_str())
    }
}
