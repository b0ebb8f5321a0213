//! Interactive text menu over a [`MetroSystem`].
//!
//! Input is read as whitespace-separated words; whatever follows the menu
//! choice on its line is discarded. End of input ends the session.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use crate::log::{log, LogLevel};
use crate::metro::{MetroSystem, Station, StationKind};

const MENU: &str = "\n=== Metro System Menu ===
1. Add Line
2. Remove Line
3. Add Station to Line
4. Remove Station from Line
5. Modify Station in Line
6. Find Station on Line
7. Find Transition Station by Name
8. Validate System
9. Show System Description
10. Connect Transition Station
0. Exit
Enter your choice: ";

/// Whitespace-separated words from a line-oriented reader.
pub struct Words<R> {
    reader: R,
    pending: VecDeque<String>,
}

impl<R: BufRead> Words<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: VecDeque::new(),
        }
    }

    /// The next word, or `None` at end of input.
    pub fn next_word(&mut self) -> io::Result<Option<String>> {
        let mut buf = String::new();
        while self.pending.is_empty() {
            buf.clear();
            if self.reader.read_line(&mut buf)? == 0 {
                return Ok(None);
            }
            self.pending
                .extend(buf.split_whitespace().map(str::to_string));
        }
        Ok(self.pending.pop_front())
    }

    /// Drops the rest of the current line.
    pub fn discard_line(&mut self) {
        self.pending.clear();
    }
}

enum Flow {
    Continue,
    Quit,
}

pub struct Menu<'a, R, W> {
    system: &'a mut MetroSystem,
    input: Words<R>,
    output: W,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(system: &'a mut MetroSystem, input: R, output: W) -> Self {
        Self {
            system,
            input: Words::new(input),
            output,
        }
    }

    /// Runs until the user exits, enters something that is not a number, or
    /// input ends.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            self.output.write_all(MENU.as_bytes())?;
            self.output.flush()?;

            let Some(word) = self.input.next_word()? else {
                break;
            };
            self.input.discard_line();

            let Ok(choice) = word.parse::<u32>() else {
                log!(LogLevel::Diagnostic, "menu: non-numeric choice `{}`", word);
                break;
            };

            if choice == 0 {
                writeln!(self.output, "Exiting.")?;
                break;
            }

            if let Flow::Quit = self.handle_command(choice)? {
                break;
            }
        }
        self.output.flush()
    }

    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;
        self.input.next_word()
    }

    fn handle_command(&mut self, choice: u32) -> io::Result<Flow> {
        macro_rules! ask {
            ($prompt:expr) => {
                match self.ask($prompt)? {
                    Some(word) => word,
                    None => return Ok(Flow::Quit),
                }
            };
        }

        macro_rules! report {
            ($result:expr, |$val:pat_param| $($fmt:tt)*) => {
                match $result {
                    Ok($val) => writeln!(self.output, $($fmt)*)?,
                    Err(e) => writeln!(self.output, "Error: {}", e)?,
                }
            };
        }

        match choice {
            1 => {
                let line = ask!("Enter line name to add: ");
                report!(self.system.add_line(&line), |_| "Line added.");
            }
            2 => {
                let line = ask!("Enter line name to remove: ");
                report!(self.system.remove_line(&line), |_| "Line removed.");
            }
            3 => {
                let line = ask!("Enter line name: ");
                let station = ask!("Enter station name: ");
                let kind = ask!("Enter station type (Direct/transition): ");
                let result = kind.parse::<StationKind>().and_then(|kind| {
                    self.system
                        .add_station_to_line(&line, Station::new(station, kind))
                });
                report!(result, |_| "Station added to line.");
            }
            4 => {
                let line = ask!("Enter line name: ");
                let station = ask!("Enter station name to remove: ");
                report!(
                    self.system.remove_station_from_line(&line, &station),
                    |_| "Station removed from line."
                );
            }
            5 => {
                let line = ask!("Enter line name: ");
                let station = ask!("Enter station name to modify: ");
                let new_name = ask!("Enter new station name: ");
                let new_kind = ask!("Enter new station type (Direct/transition): ");
                let result = new_kind.parse::<StationKind>().and_then(|kind| {
                    self.system
                        .modify_station_in_line(&line, &station, &new_name, kind)
                });
                report!(result, |_| "Station modified.");
            }
            6 => {
                let line = ask!("Enter line name: ");
                let station = ask!("Enter station name to find: ");
                report!(
                    self.system.find_station_on_line(&line, &station),
                    |st| "Found station: {}, Type: {}",
                    st.name(),
                    st.kind()
                );
            }
            7 => {
                let station = ask!("Enter transition station name to find: ");
                report!(
                    self.system.find_transition_station(&station),
                    |st| "Found transition station: {}",
                    st.name()
                );
            }
            8 => {
                let pruned = self.system.validate();
                writeln!(
                    self.output,
                    "System validated ({} connection(s) removed).",
                    pruned
                )?;
            }
            9 => {
                writeln!(self.output, "{}", self.system.description())?;
            }
            10 => {
                let line = ask!("Enter line name: ");
                let station = ask!("Enter transition station name: ");
                let target_line = ask!("Enter line to connect to: ");
                let target = ask!("Enter station to connect to: ");
                let result = self
                    .system
                    .find_station_on_line(&line, &station)
                    .and_then(|st| st.add_transfer(target, target_line));
                report!(result, |_| "Connection added.");
            }
            _ => {
                writeln!(self.output, "Invalid choice. Try again.")?;
            }
        }
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(system: &mut MetroSystem, input: &str) -> String {
        let mut out = Vec::new();
        Menu::new(system, input.as_bytes(), &mut out).run().unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn words_span_lines() {
        let mut words = Words::new("  a b\n\n c\n".as_bytes());
        assert_eq!(words.next_word().unwrap().as_deref(), Some("a"));
        words.discard_line();
        assert_eq!(words.next_word().unwrap().as_deref(), Some("c"));
        assert_eq!(words.next_word().unwrap(), None);
    }

    #[test]
    fn builds_a_network() {
        let mut system = MetroSystem::new();
        let out = session(
            &mut system,
            "1\nRed\n3\nRed Central Direct\n3\nRed Hub transition\n6\nRed Hub\n9\n0\n",
        );

        assert!(out.contains("Line added."));
        assert_eq!(out.matches("Station added to line.").count(), 2);
        assert!(out.contains("Found station: Hub, Type: transition"));
        assert!(out.contains("Line: Red\nCentral-Direct\nHub-transition\n"));
        assert!(out.ends_with("Exiting.\n"));
        assert_eq!(system.len(), 1);
    }

    #[test]
    fn reports_errors_and_keeps_going() {
        let mut system = MetroSystem::new();
        let out = session(&mut system, "2\nGhost\n1\nRed\n1\nRed\n42\n0\n");

        assert!(out.contains("Error: line `Ghost` not found"));
        assert!(out.contains("Error: a line named `Red` already exists"));
        assert!(out.contains("Invalid choice. Try again."));
        assert_eq!(system.len(), 1);
    }

    #[test]
    fn rejects_unknown_station_kind() {
        let mut system = MetroSystem::new();
        system.add_line("Red").unwrap();
        let out = session(&mut system, "3\nRed\nA\nexpress\n0\n");
        assert!(out.contains("Error: unknown station kind `express`"));
        assert!(system.line("Red").unwrap().is_empty());
    }

    #[test]
    fn connects_and_validates() {
        let mut system = MetroSystem::new();
        let out = session(
            &mut system,
            "1\nRed\n3\nRed\nHub\ntransition\n10\nRed\nHub\nBlue\nPlaza\n8\n7\nHub\n0\n",
        );

        assert!(out.contains("Connection added."));
        assert!(out.contains("System validated (1 connection(s) removed)."));
        assert!(out.contains("Found transition station: Hub"));
    }

    #[test]
    fn stops_on_non_numeric_or_eof() {
        let mut system = MetroSystem::new();
        let out = session(&mut system, "quit\n1\nRed\n");
        assert!(!out.contains("Line added."));
        assert_eq!(system.len(), 0);

        let out = session(&mut system, "1\n");
        assert!(out.ends_with("Enter line name to add: "));
        assert_eq!(system.len(), 0);
    }
}
