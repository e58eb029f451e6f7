//! Masked password entry on the controlling terminal.

use std::io::{Stderr, Write};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal::{self, ClearType},
};

use crate::error::{AppError, Result};

const ATTEMPTS: usize = 3;

/// What a key press did to the buffer being typed.
#[derive(Debug, PartialEq, Eq)]
enum Keystroke {
    Typed,
    Erased,
    Submitted,
    Interrupted,
    Ignored,
}

fn apply_key(buf: &mut String, key: KeyEvent) -> Keystroke {
    let control = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Enter => Keystroke::Submitted,
        KeyCode::Char('c') if control => Keystroke::Interrupted,
        KeyCode::Char(ch) if !control => {
            buf.push(ch);
            Keystroke::Typed
        }
        KeyCode::Backspace if buf.pop().is_some() => Keystroke::Erased,
        _ => Keystroke::Ignored,
    }
}

/// Keeps the terminal in raw mode while alive.
struct RawTerminal {
    out: Stderr,
}

impl RawTerminal {
    fn open() -> Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self {
            out: std::io::stderr(),
        })
    }

    fn read_line(&mut self, prompt: &str) -> Result<String> {
        execute!(
            self.out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print(prompt)
        )?;

        let mut buf = String::new();
        loop {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            match apply_key(&mut buf, key) {
                Keystroke::Typed => execute!(self.out, Print("*"))?,
                Keystroke::Erased => {
                    execute!(self.out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                }
                Keystroke::Submitted => {
                    execute!(self.out, Print("\r\n"))?;
                    return Ok(buf);
                }
                Keystroke::Interrupted => {
                    execute!(self.out, Print("\r\n"))?;
                    return Err(AppError::Terminal("interrupted".to_string()));
                }
                Keystroke::Ignored => {}
            }
            self.out.flush()?;
        }
    }

    fn notice(&mut self, message: &str) -> Result<()> {
        execute!(self.out, Print(message), Print("\r\n"))?;
        Ok(())
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Reads an existing password, echoing `*` for every character.
pub fn password(prompt: &str) -> Result<String> {
    RawTerminal::open()?.read_line(prompt)
}

/// Reads a new non-empty password and its confirmation.
pub fn new_password() -> Result<String> {
    let mut term = RawTerminal::open()?;
    for _ in 0..ATTEMPTS {
        let first = term.read_line("New password: ")?;
        if first.is_empty() {
            term.notice("Password must not be empty.")?;
        } else if term.read_line("Confirm password: ")? == first {
            return Ok(first);
        } else {
            term.notice("Passwords do not match. Try again.")?;
        }
    }
    Err(AppError::Terminal("too many attempts".to_string()))
}
