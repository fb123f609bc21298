use std::error::Error;
use std::io::{BufRead, Write};
use log::info;
use crate::exec::{Interpreter, State};

const HELP: &str = "commands: s(tep), n(ext), c(ontinue), v(ars), bt (backtrace), h(elp), q(uit)";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Command {
    Step,
    Next,
    Continue,
    Variables,
    Backtrace,
    Help,
    Quit,
}

impl Command {
    fn parse(text: &str) -> Option<Command> {
        match text {
            "s" | "step" => Some(Command::Step),
            "n" | "next" => Some(Command::Next),
            "c" | "continue" => Some(Command::Continue),
            "v" | "vars" => Some(Command::Variables),
            "bt" | "backtrace" => Some(Command::Backtrace),
            "h" | "help" => Some(Command::Help),
            "q" | "quit" => Some(Command::Quit),
            _ => None
        }
    }
}

/// Drives `interpreter` from commands read line by line off `input`. An empty line repeats
/// the previous command. Ends on `quit` or end of input; runtime errors end it early.
pub fn session<W: Write>(interpreter: &mut Interpreter<W>, input: impl BufRead, mut console: impl Write) -> Result<(), Box<dyn Error>> {
    writeln!(console, "{HELP}")?;
    let mut last = None;
    let mut lines = input.lines();
    loop {
        write!(console, "(guu) ")?;
        console.flush()?;
        let Some(line) = lines.next() else { break };
        let line = line?;
        let text = line.trim();
        let command = match (text.is_empty(), last) {
            (true, None) => continue,
            (true, Some(previous)) => previous,
            (false, _) => match Command::parse(text) {
                Some(command) => command,
                None => {
                    writeln!(console, "unknown command '{text}', try 'h'")?;
                    continue;
                }
            }
        };
        last = Some(command);
        let stepped = match command {
            Command::Step => interpreter.step_into(),
            Command::Next => interpreter.step_over(),
            Command::Continue => interpreter.run(),
            Command::Variables => {
                interpreter.print_variables(&mut console)?;
                continue;
            }
            Command::Backtrace => {
                interpreter.backtrace(&mut console)?;
                continue;
            }
            Command::Help => {
                writeln!(console, "{HELP}")?;
                continue;
            }
            Command::Quit => break,
        };
        interpreter.output_mut().flush()?;
        stepped?;
        match interpreter.state() {
            State::Running => writeln!(console, "{}() at line {}, depth {}",
                                       interpreter.current_procedure().unwrap_or("?"),
                                       interpreter.current_line().unwrap_or_default(),
                                       interpreter.depth())?,
            State::Ready => writeln!(console, "not started")?,
            State::Finished => writeln!(console, "finished")?,
        }
    }
    info!("debug session closed");
    Ok(())
}
