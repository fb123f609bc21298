use std::collections::{BTreeMap, HashMap};
use std::collections::hash_map::Entry;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{ErrorKind, Write};
use log::{debug, trace};
use crate::ast::{Instruction, Node, Param};

pub const ENTRY_POINT: &str = "main";
pub const STACK_LIMIT: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    ExpectedProgram,
    DuplicateProcedure {
        name: String,
        line: usize
    },
    StatementOutsideProcedure {
        line: usize
    },
    MalformedStatement {
        line: usize
    },
}

impl Display for CompileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::ExpectedProgram => write!(f, "expected a program root node"),
            CompileError::DuplicateProcedure { name, line } => write!(f, "procedure '{name}' declared again on line {line}"),
            CompileError::StatementOutsideProcedure { line } => write!(f, "statement on line {line} is not inside any sub"),
            CompileError::MalformedStatement { line } => write!(f, "malformed statement on line {line}"),
        }
    }
}

impl Error for CompileError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    EntryPointNotFound,
    UndefinedProcedure {
        name: String,
        line: usize
    },
    UndefinedVariable {
        name: String,
        line: usize
    },
    StackOverflow {
        depth: usize,
        line: usize
    },
    InvalidInstruction {
        line: usize
    },
    Output {
        kind: ErrorKind
    },
}

impl Display for RuntimeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeError::EntryPointNotFound => write!(f, "no sub named '{ENTRY_POINT}' to start from"),
            RuntimeError::UndefinedProcedure { name, line } => write!(f, "unknown sub '{name}' called on line {line}"),
            RuntimeError::UndefinedVariable { name, line } => write!(f, "unknown variable '{name}' on line {line}"),
            RuntimeError::StackOverflow { depth, line } => write!(f, "stack overflow at depth {depth} calling on line {line}"),
            RuntimeError::InvalidInstruction { line } => write!(f, "invalid instruction on line {line}"),
            RuntimeError::Output { kind } => write!(f, "failed to write output: {kind}"),
        }
    }
}

impl Error for RuntimeError {}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum State {
    Ready,
    Running,
    Finished,
}

struct Procedure {
    name: String,
    line: usize,
    // Indices into the program's statements.
    body: Vec<usize>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct Position {
    procedure: usize,
    offset: usize,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Frame {
    Entry,
    Return(Position),
}

#[derive(Debug)]
enum Effect {
    Print(i64),
    Call(usize),
    Set(String, i64),
}

pub struct Interpreter<W: Write> {
    statements: Vec<Node>,
    procedures: Vec<Procedure>,
    symbols: HashMap<String, usize>,
    variables: BTreeMap<String, i64>,
    stack: Vec<Frame>,
    position: Position,
    state: State,
    out: W,
}

impl<W: Write> Interpreter<W> {
    /// Splits the program into procedures. Calls are resolved when they execute, so a
    /// sub may call one declared further down or one that does not exist at all.
    pub fn new(program: Node, out: W) -> Result<Self, CompileError> {
        let Node::Root { statements } = program else {
            return Err(CompileError::ExpectedProgram);
        };
        let mut procedures: Vec<Procedure> = Vec::new();
        let mut symbols = HashMap::new();
        for (index, statement) in statements.iter().enumerate() {
            let line = statement.line().unwrap_or_default();
            if let Node::ProcDecl { name, .. } = statement {
                match symbols.entry(name.clone()) {
                    Entry::Occupied(_) => return Err(CompileError::DuplicateProcedure { name: name.clone(), line }),
                    Entry::Vacant(slot) => {
                        debug!("registering sub {name} from line {line}");
                        slot.insert(procedures.len());
                        procedures.push(Procedure { name: name.clone(), line, body: Vec::new() });
                    }
                }
                continue;
            }
            if Instruction::decode(statement).is_none() {
                return Err(CompileError::MalformedStatement { line });
            }
            let Some(procedure) = procedures.last_mut() else {
                return Err(CompileError::StatementOutsideProcedure { line });
            };
            procedure.body.push(index);
        }
        Ok(Self {
            statements,
            procedures,
            symbols,
            variables: BTreeMap::new(),
            stack: Vec::new(),
            position: Position { procedure: 0, offset: 0 },
            state: State::Ready,
            out,
        })
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == State::Finished
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn variable(&self, name: &str) -> Option<i64> {
        self.variables.get(name).copied()
    }

    pub fn output_mut(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Source line of the instruction that executes next.
    pub fn current_line(&self) -> Option<usize> {
        match self.state {
            State::Running => self.line_at(self.position),
            State::Ready | State::Finished => None,
        }
    }

    pub fn current_procedure(&self) -> Option<&str> {
        match self.state {
            State::Running => self.procedures.get(self.position.procedure).map(|p| p.name.as_str()),
            State::Ready | State::Finished => None,
        }
    }

    pub fn run(&mut self) -> Result<(), RuntimeError> {
        while !self.is_finished() {
            self.step_into()?;
        }
        Ok(())
    }

    pub fn step_into(&mut self) -> Result<(), RuntimeError> {
        match self.state {
            State::Finished => return Ok(()),
            State::Ready => self.begin()?,
            State::Running => {}
        }
        if self.state == State::Running {
            self.execute()?;
        }
        Ok(())
    }

    /// Like [`Interpreter::step_into`], but a `call` runs until control is back in the calling frame.
    pub fn step_over(&mut self) -> Result<(), RuntimeError> {
        if self.state == State::Ready {
            self.begin()?;
        }
        let depth = self.stack.len();
        self.step_into()?;
        while self.state == State::Running && self.stack.len() > depth {
            self.step_into()?;
        }
        Ok(())
    }

    pub fn print_variables(&self, w: &mut impl Write) -> std::io::Result<()> {
        for (name, value) in &self.variables {
            writeln!(w, "{name} = {value}")?;
        }
        Ok(())
    }

    /// Innermost frame first. Outer frames report the line of the `call` they are waiting on.
    pub fn backtrace(&self, w: &mut impl Write) -> std::io::Result<()> {
        if self.state != State::Running {
            return Ok(());
        }
        let callers = self.stack.iter().rev().filter_map(|frame| match frame {
            Frame::Entry => None,
            Frame::Return(position) => Some(Position { procedure: position.procedure, offset: position.offset.saturating_sub(1) }),
        });
        for (number, position) in std::iter::once(self.position).chain(callers).enumerate() {
            let Some(procedure) = self.procedures.get(position.procedure) else { continue };
            let line = self.line_at(position).unwrap_or(procedure.line);
            writeln!(w, "#{number} {}() at line {line}", procedure.name)?;
        }
        Ok(())
    }

    fn begin(&mut self) -> Result<(), RuntimeError> {
        let Some(&main) = self.symbols.get(ENTRY_POINT) else {
            return Err(RuntimeError::EntryPointNotFound);
        };
        trace!("entering {ENTRY_POINT}");
        self.stack.push(Frame::Entry);
        self.position = Position { procedure: main, offset: 0 };
        self.state = State::Running;
        self.unwind();
        Ok(())
    }

    fn execute(&mut self) -> Result<(), RuntimeError> {
        let line = self.line_at(self.position).unwrap_or_default();
        let effect = self.effect(line)?;
        trace!("line {line}: {effect:?}");
        match effect {
            Effect::Print(value) => {
                writeln!(self.out, "{value}").map_err(|e| RuntimeError::Output { kind: e.kind() })?;
                self.position.offset += 1;
            }
            Effect::Set(name, value) => {
                self.variables.insert(name, value);
                self.position.offset += 1;
            }
            Effect::Call(procedure) => {
                if self.stack.len() >= STACK_LIMIT {
                    return Err(RuntimeError::StackOverflow { depth: self.stack.len(), line });
                }
                self.stack.push(Frame::Return(Position { procedure: self.position.procedure, offset: self.position.offset + 1 }));
                self.position = Position { procedure, offset: 0 };
            }
        }
        self.unwind();
        Ok(())
    }

    fn effect(&self, line: usize) -> Result<Effect, RuntimeError> {
        let instruction = self.statement_at(self.position).and_then(Instruction::decode);
        match instruction {
            Some(Instruction::Print(param)) => Ok(Effect::Print(self.resolve(param, line)?)),
            Some(Instruction::Set(name, param)) => Ok(Effect::Set(name.to_string(), self.resolve(param, line)?)),
            Some(Instruction::Call(name)) => match self.symbols.get(name) {
                Some(&procedure) => Ok(Effect::Call(procedure)),
                None => Err(RuntimeError::UndefinedProcedure { name: name.to_string(), line }),
            },
            None => Err(RuntimeError::InvalidInstruction { line }),
        }
    }

    fn resolve(&self, param: &Param, line: usize) -> Result<i64, RuntimeError> {
        match param {
            Param::Integer(value) => Ok(*value),
            Param::Variable(name) => self.variable(name).ok_or_else(|| RuntimeError::UndefinedVariable { name: name.clone(), line }),
        }
    }

    // Implicit returns: leave every procedure whose body has run out.
    fn unwind(&mut self) {
        while self.state == State::Running && self.statement_at(self.position).is_none() {
            match self.stack.pop() {
                Some(Frame::Return(position)) => {
                    trace!("returning to {}", self.procedures.get(position.procedure).map_or("?", |p| p.name.as_str()));
                    self.position = position;
                }
                Some(Frame::Entry) | None => {
                    trace!("{ENTRY_POINT} returned");
                    self.stack.clear();
                    self.state = State::Finished;
                }
            }
        }
    }

    fn statement_at(&self, position: Position) -> Option<&Node> {
        let index = self.procedures.get(position.procedure)?.body.get(position.offset)?;
        self.statements.get(*index)
    }

    fn line_at(&self, position: Position) -> Option<usize> {
        self.statement_at(position).and_then(Node::line)
    }
}
