//! Operator console: the top-level menu and the per-flow questions.

use std::io::{BufRead, Write};

use crate::app::App;
use crate::column::{TypePrompt, ValueKind};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Create,
    Import,
    Truncate,
    Quit,
}

impl Command {
    fn parse(choice: &str) -> Option<Command> {
        match choice {
            "1" => Some(Command::Create),
            "2" => Some(Command::Import),
            "3" => Some(Command::Truncate),
            "q" => Some(Command::Quit),
            _ => None,
        }
    }
}

pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Console<R, W> {
        Console { input, output }
    }

    /// Prints the question and returns the next non-blank line, trimmed.
    pub fn ask(&mut self, question: &str) -> Result<String> {
        writeln!(self.output, "{}", question)?;
        self.output.flush()?;
        self.read_answer()
    }

    fn read_answer(&mut self) -> Result<String> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                return Err(Error::InputClosed);
            }
            let answer = line.trim();
            if !answer.is_empty() {
                return Ok(answer.to_string());
            }
        }
    }

    pub fn command(&mut self) -> Result<Command> {
        loop {
            let choice = self.ask(
                "What to do?\n\
                 1 - create a new table from a sheet\n\
                 2 - import sheet rows into an existing table\n\
                 3 - delete all rows of a table\n\
                 q - quit",
            )?;
            match Command::parse(&choice) {
                Some(cmd) => return Ok(cmd),
                None => writeln!(self.output, "Invalid input")?,
            }
        }
    }
}

impl<R: BufRead, W: Write> TypePrompt for Console<R, W> {
    fn value_kind(&mut self, header: &str) -> Result<ValueKind> {
        loop {
            let choice = self.ask(&format!(
                "Choose the data type of field {}:\n1 for INT\n2 for VARCHAR\n3 for FLOAT",
                header
            ))?;
            match ValueKind::from_choice(&choice) {
                Some(kind) => return Ok(kind),
                None => writeln!(self.output, "Invalid input, try again")?,
            }
        }
    }
}

/// Serves operator commands until input ends or the operator quits.
///
/// A failed create ends the session with its error; failed imports and
/// truncates are reported and the menu comes back.
pub fn run<R: BufRead, W: Write>(app: &mut App, console: &mut Console<R, W>) -> Result<()> {
    loop {
        let cmd = match console.command() {
            Ok(cmd) => cmd,
            Err(Error::InputClosed) => return Ok(()),
            Err(e) => return Err(e),
        };
        match cmd {
            Command::Create => {
                let sheet_id = console.ask("Enter the spreadsheet id:")?;
                let sheet_title = console.ask("Enter the sheet name:")?;
                let table = console.ask("Enter the SQL table name:")?;
                app.create_table(&sheet_id, &sheet_title, &table, console)?;
            }
            Command::Import => {
                let table = console.ask("Enter the table name:")?;
                if let Err(e) = app.import(&table) {
                    log::error!("import into {} failed: {}", table, e);
                }
            }
            Command::Truncate => {
                let table = console.ask("Enter the table name:")?;
                if let Err(e) = app.truncate(&table) {
                    log::error!("truncate of {} failed: {}", table, e);
                }
            }
            Command::Quit => return Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn console(input: &str) -> Console<Cursor<Vec<u8>>, Vec<u8>> {
        Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn reprompts_until_valid_type() {
        let mut c = console("5\n\nINT\n3\n");
        assert_eq!(c.value_kind("Ціна").unwrap(), ValueKind::Float);
        let out = String::from_utf8(c.output).unwrap();
        assert_eq!(out.matches("Invalid input, try again").count(), 2);
        assert!(out.contains("field Ціна"));
    }

    #[test]
    fn closed_input_is_an_error() {
        let mut c = console("");
        assert!(matches!(c.value_kind("x"), Err(Error::InputClosed)));
    }

    #[test]
    fn menu_skips_unknown_choices() {
        let mut c = console("9\n 2 \n");
        assert_eq!(c.command().unwrap(), Command::Import);
        let out = String::from_utf8(c.output).unwrap();
        assert_eq!(out.matches("Invalid input").count(), 1);
    }

    #[test]
    fn ask_keeps_spaces_inside_answer() {
        let mut c = console("Аркуш 1\n");
        assert_eq!(c.ask("Enter the sheet name:").unwrap(), "Аркуш 1");
    }
}
