use std::rc::Rc;

use hashbrown::HashMap;

use crate::log::{log, trace, LogLevel};

use super::line::Line;
use super::station::{Station, StationKind};
use super::{Error, Result};

/// All lines of the network, keyed by name.
#[derive(Clone, Debug, Default)]
pub struct MetroSystem {
    lines: HashMap<String, Line>,
}

impl MetroSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn add_line(&mut self, name: &str) -> Result<()> {
        if self.lines.contains_key(name) {
            return Err(Error::LineExists(name.to_string()));
        }
        log!(LogLevel::Info, "adding line `{}`", name);
        self.lines.insert(name.to_string(), Line::new(name));
        Ok(())
    }

    /// Removes the line and returns it.
    pub fn remove_line(&mut self, name: &str) -> Result<Line> {
        let line = self
            .lines
            .remove(name)
            .ok_or_else(|| Error::LineNotFound(name.to_string()))?;
        log!(LogLevel::Info, "removed line `{}`", name);
        Ok(line)
    }

    pub fn line(&self, name: &str) -> Result<&Line> {
        self.lines
            .get(name)
            .ok_or_else(|| Error::LineNotFound(name.to_string()))
    }

    fn line_mut(&mut self, name: &str) -> Result<&mut Line> {
        self.lines
            .get_mut(name)
            .ok_or_else(|| Error::LineNotFound(name.to_string()))
    }

    /// Line names in lexicographic order.
    pub fn line_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.lines.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Lines in lexicographic order of their names.
    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.line_names()
            .into_iter()
            .filter_map(move |name| self.lines.get(name))
    }

    pub fn add_station_to_line(&mut self, line: &str, station: Station) -> Result<Rc<Station>> {
        self.line_mut(line)?.add_station(station)
    }

    pub fn remove_station_from_line(&mut self, line: &str, station: &str) -> Result<()> {
        self.line_mut(line)?.remove_station(station)
    }

    /// Replaces `station` on `line` with a fresh station called `new_name` of
    /// kind `new_kind`, appended at the end of the line.
    ///
    /// The replacement starts without transfer connections. If the new name
    /// is taken by another station on the line, nothing changes.
    pub fn modify_station_in_line(
        &mut self,
        line: &str,
        station: &str,
        new_name: &str,
        new_kind: StationKind,
    ) -> Result<Rc<Station>> {
        let line = self.line_mut(line)?;
        line.find(station)?;
        if new_name != station && line.contains(new_name) {
            return Err(Error::StationExists {
                line: line.name().to_string(),
                station: new_name.to_string(),
            });
        }

        line.remove_station(station)?;
        line.add_station(Station::new(new_name, new_kind))
    }

    pub fn find_station_on_line(&self, line: &str, station: &str) -> Result<Rc<Station>> {
        self.line(line)?.find(station)
    }

    /// First transition station called `name`, searching lines in name order.
    pub fn find_transition_station(&self, name: &str) -> Result<Rc<Station>> {
        self.lines()
            .filter_map(|line| line.find(name).ok())
            .find(|station| station.is_transition())
            .ok_or_else(|| Error::TransitionNotFound(name.to_string()))
    }

    fn has_station(&self, line: &str, station: &str) -> bool {
        self.lines
            .get(line)
            .is_some_and(|line| line.contains(station))
    }

    /// Drops every transfer connection that points at a line or station that
    /// does not exist. Returns how many connections were dropped.
    pub fn validate(&mut self) -> usize {
        trace!(MetroSystem::validate);

        let mut pruned = 0;
        for line in self.lines.values() {
            for (_, station) in line.stations() {
                pruned += station.retain_transfers(|transfer| {
                    let keep = self.has_station(&transfer.line, &transfer.station);
                    if !keep {
                        log!(
                            LogLevel::Warning,
                            "dropping transfer from `{}` on `{}` to missing `{}`",
                            station.name(),
                            line.name(),
                            transfer
                        );
                    }
                    keep
                });
            }
        }
        pruned
    }

    /// `Line: <name>` followed by the line's station table, for every line
    /// in name order.
    pub fn description(&self) -> String {
        let mut out = String::new();
        for line in self.lines() {
            out += "Line: ";
            out += line.name();
            out.push('\n');
            out += &line.table_str();
            out.push('\n');
        }
        out
    }
}
