use std::cell::{Ref, RefCell};
use std::str::FromStr;

use serde_derive::{Deserialize, Serialize};

use super::hub::{Transfer, TransferHub};
use super::{Error, Result};

#[derive(Copy, Clone, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum StationKind {
    #[default]
    Direct,
    Transition,
}

impl FromStr for StationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("direct") {
            Ok(StationKind::Direct)
        } else if s.eq_ignore_ascii_case("transition") {
            Ok(StationKind::Transition)
        } else {
            Err(Error::UnknownStationKind(s.to_string()))
        }
    }
}

impl TryFrom<String> for StationKind {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl core::fmt::Display for StationKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(match self {
            StationKind::Direct => "Direct",
            StationKind::Transition => "transition",
        })
    }
}

/// A named station. Transition stations carry a [`TransferHub`].
///
/// Stations are shared between a line and whoever looked them up, so the hub
/// sits behind a `RefCell` and is edited through `&self`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Station {
    name: String,
    hub: Option<RefCell<TransferHub>>,
}

impl Station {
    pub fn new(name: impl Into<String>, kind: StationKind) -> Self {
        Self {
            name: name.into(),
            hub: match kind {
                StationKind::Direct => None,
                StationKind::Transition => Some(RefCell::new(TransferHub::new())),
            },
        }
    }

    pub fn direct(name: impl Into<String>) -> Self {
        Self::new(name, StationKind::Direct)
    }

    pub fn transition(name: impl Into<String>) -> Self {
        Self::new(name, StationKind::Transition)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> StationKind {
        if self.hub.is_some() {
            StationKind::Transition
        } else {
            StationKind::Direct
        }
    }

    pub fn is_transition(&self) -> bool {
        self.hub.is_some()
    }

    /// A fresh station of another kind with this station's name.
    ///
    /// Transfer connections are not carried over.
    pub fn convert(&self, kind: StationKind) -> Station {
        Station::new(self.name.clone(), kind)
    }

    /// The transfer hub, for transition stations.
    ///
    /// # Panics
    ///
    /// Panics if the hub is currently being modified.
    pub fn hub(&self) -> Option<Ref<'_, TransferHub>> {
        self.hub.as_ref().map(RefCell::borrow)
    }

    /// Connects this transition station to `station` on `line`.
    pub fn add_transfer(&self, station: impl Into<String>, line: impl Into<String>) -> Result<()> {
        let hub = self
            .hub
            .as_ref()
            .ok_or_else(|| Error::NotATransition(self.name.clone()))?;

        hub.borrow_mut()
            .add_station(station, line)
            .map_err(|_| Error::HubFull(self.name.clone()))
    }

    /// Drops the connections `keep` rejects; returns how many were dropped.
    /// Direct stations have nothing to drop.
    pub fn retain_transfers<F: FnMut(&Transfer) -> bool>(&self, keep: F) -> usize {
        match &self.hub {
            Some(hub) => hub.borrow_mut().retain(keep),
            None => 0,
        }
    }
}
