//! DIMACS CNF parser and writer for the Norsat SAT solver.
//!
//! The parser consumes its input in chunks, so a formula can be loaded without buffering the
//! whole file. The writers cover the problem format as well as the `s`/`v` solution line format
//! used by SAT solvers.

use std::{borrow::Borrow, io, mem::replace};

use norsat_formula::{CnfFormula, Lit, Var};

use anyhow::Error;
use thiserror::Error;

/// Possible errors while parsing a DIMACS CNF formula.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("line {line} column {column}: unexpected character '{unexpected}' in DIMACS CNF input")]
    UnexpectedInput {
        line: usize,
        column: usize,
        unexpected: char,
    },
    #[error("line {line} column {column}: literal index out of supported range")]
    LiteralTooLarge { line: usize, column: usize },
    #[error("line {line}: invalid header syntax: {header}")]
    InvalidHeader { line: usize, header: String },
    #[error("line {line}: header declares {var_count} variables, more than supported")]
    VarCountTooLarge { line: usize, var_count: usize },
    #[error("line {line}: unterminated clause")]
    UnterminatedClause { line: usize },
    #[error("formula has {var_count} variables while the header specifies {header_var_count}")]
    VarCount {
        var_count: usize,
        header_var_count: usize,
    },
    #[error("formula has {clause_count} clauses while the header specifies {header_clause_count}")]
    ClauseCount {
        clause_count: usize,
        header_clause_count: usize,
    },
    #[error("parser invoked after a previous error")]
    PreviousError,
}

/// Variable and clause count of a DIMACS CNF header.
#[derive(Copy, Clone, Debug)]
pub struct DimacsHeader {
    pub var_count: usize,
    pub clause_count: usize,
}

/// What the current input line contains.
#[derive(Copy, Clone, Eq, PartialEq)]
enum LineMode {
    Clauses,
    Comment,
    Header,
}

/// Parser for DIMACS CNF files.
///
/// The input can be passed in arbitrary chunks and the parsed clauses can be taken out between
/// chunks, see [`parse_chunk`](DimacsParser::parse_chunk) and
/// [`take_formula`](DimacsParser::take_formula).
pub struct DimacsParser {
    formula: CnfFormula,
    partial_clause: Vec<Lit>,
    header: Option<DimacsHeader>,

    line: usize,
    column: usize,
    clause_count: usize,

    partial_number: usize,
    negate: bool,
    in_number: bool,

    mode: LineMode,
    at_line_start: bool,
    failed: bool,

    header_line: Vec<u8>,
}

impl Default for DimacsParser {
    fn default() -> DimacsParser {
        DimacsParser::new()
    }
}

impl DimacsParser {
    /// Create a new DIMACS CNF parser.
    pub fn new() -> DimacsParser {
        DimacsParser {
            formula: CnfFormula::new(),
            partial_clause: vec![],
            header: None,

            line: 1,
            column: 0,
            clause_count: 0,

            partial_number: 0,
            negate: false,
            in_number: false,

            mode: LineMode::Clauses,
            at_line_start: true,
            failed: false,

            header_line: vec![],
        }
    }

    /// Parse the given input into a single formula and check the header if present.
    pub fn parse(input: impl io::Read) -> Result<CnfFormula, Error> {
        Ok(Self::parse_incremental(input, |_| Ok(()))?.take_formula())
    }

    /// Parse the given input incrementally and check the header if present.
    ///
    /// The callback is invoked after each chunk of input. It can drain the clauses parsed so far
    /// by calling [`take_formula`](DimacsParser::take_formula) on the passed parser.
    pub fn parse_incremental(
        input: impl io::Read,
        mut callback: impl FnMut(&mut DimacsParser) -> Result<(), Error>,
    ) -> Result<DimacsParser, Error> {
        use io::BufRead;

        let mut buffer = io::BufReader::new(input);
        let mut parser = Self::new();

        loop {
            let data = buffer.fill_buf()?;
            if data.is_empty() {
                break;
            }
            parser.parse_chunk(data)?;
            let len = data.len();
            buffer.consume(len);

            callback(&mut parser)?;
        }
        parser.eof()?;
        callback(&mut parser)?;
        parser.check_header()?;

        Ok(parser)
    }

    /// Parse a chunk of input.
    ///
    /// Call [`eof`](DimacsParser::eof) after the last chunk. When this method returns an error
    /// the parser cannot process further input.
    pub fn parse_chunk(&mut self, chunk: &[u8]) -> Result<(), ParserError> {
        if self.failed {
            return Err(ParserError::PreviousError);
        }
        for &byte in chunk.iter() {
            self.column += 1;

            match self.mode {
                LineMode::Comment => {
                    if byte == b'\n' || byte == b'\r' {
                        self.mode = LineMode::Clauses;
                        self.at_line_start = true;
                    }
                }
                LineMode::Header => {
                    if byte == b'\n' || byte == b'\r' {
                        self.mode = LineMode::Clauses;
                        self.at_line_start = true;
                        self.parse_header_line()?;
                    } else {
                        self.header_line.push(byte);
                    }
                }
                LineMode::Clauses => match byte {
                    b'0'..=b'9' => {
                        let digit = (byte - b'0') as usize;

                        // Reject numbers a literal cannot represent before they can overflow.
                        if self.partial_number > (Var::max_count() - digit) / 10 {
                            self.failed = true;
                            return Err(ParserError::LiteralTooLarge {
                                line: self.line,
                                column: self.column,
                            });
                        }

                        self.partial_number = self.partial_number * 10 + digit;
                        self.in_number = true;
                        self.at_line_start = false;
                    }
                    b'-' if !self.negate && !self.in_number => {
                        self.negate = true;
                        self.at_line_start = false;
                    }
                    b' ' | b'\t' | b'\r' | b'\n' => {
                        if self.negate && !self.in_number {
                            // A minus sign has to be followed by digits.
                            self.failed = true;
                            return Err(ParserError::UnexpectedInput {
                                line: self.line,
                                column: self.column,
                                unexpected: byte as char,
                            });
                        }
                        self.finish_number();
                        self.at_line_start = byte != b' ' && byte != b'\t';
                    }
                    b'c' if self.at_line_start => {
                        self.mode = LineMode::Comment;
                    }
                    b'p' if self.at_line_start && self.header.is_none() => {
                        self.mode = LineMode::Header;
                        self.header_line.push(b'p');
                    }
                    _ => {
                        self.failed = true;
                        return Err(ParserError::UnexpectedInput {
                            line: self.line,
                            column: self.column,
                            unexpected: byte as char,
                        });
                    }
                },
            }

            if byte == b'\n' {
                self.line += 1;
                self.column = 0;
            }
        }

        Ok(())
    }

    /// Finish parsing the input.
    ///
    /// This does not compare the formula against the header, use
    /// [`check_header`](DimacsParser::check_header) for that.
    pub fn eof(&mut self) -> Result<(), ParserError> {
        if self.failed {
            return Err(ParserError::PreviousError);
        }

        if self.mode == LineMode::Header {
            self.parse_header_line()?;
        }

        self.finish_number();

        if !self.partial_clause.is_empty() || self.negate {
            self.failed = true;
            return Err(ParserError::UnterminatedClause { line: self.line });
        }

        Ok(())
    }

    /// Verify the header counts when a header is present.
    pub fn check_header(&self) -> Result<(), ParserError> {
        if let Some(header) = self.header {
            let var_count = self.formula.var_count();
            if var_count != header.var_count {
                return Err(ParserError::VarCount {
                    var_count,
                    header_var_count: header.var_count,
                });
            }

            if self.clause_count != header.clause_count {
                return Err(ParserError::ClauseCount {
                    clause_count: self.clause_count,
                    header_clause_count: header.clause_count,
                });
            }
        }

        Ok(())
    }

    /// Remove and return everything parsed since the last call to this method.
    ///
    /// Calling this once after [`eof`](DimacsParser::eof) gives the whole input as a single
    /// [`CnfFormula`]. The returned formula keeps the variable count of the header when that is
    /// larger than the largest variable seen so far.
    pub fn take_formula(&mut self) -> CnfFormula {
        let mut new_formula = CnfFormula::new();
        new_formula.set_var_count(self.formula.var_count());
        replace(&mut self.formula, new_formula)
    }

    /// The DIMACS CNF header data if present.
    pub fn header(&self) -> Option<DimacsHeader> {
        self.header
    }

    /// Number of clauses parsed so far.
    pub fn clause_count(&self) -> usize {
        self.clause_count
    }

    /// Number of variables in the parsed formula.
    pub fn var_count(&self) -> usize {
        self.formula.var_count()
    }

    fn finish_number(&mut self) {
        if self.in_number {
            if self.partial_number == 0 {
                self.formula.add_clause(self.partial_clause.drain(..));
                self.clause_count += 1;
            } else {
                self.partial_clause
                    .push(Var::from_dimacs(self.partial_number as isize).lit(!self.negate));
            }
        }
        self.partial_number = 0;
        self.in_number = false;
        self.negate = false;
    }

    fn parse_header_line(&mut self) -> Result<(), ParserError> {
        let header_line = String::from_utf8_lossy(&self.header_line).into_owned();

        let mut fields = header_line.split_whitespace();

        if fields.next() != Some("p") || fields.next() != Some("cnf") {
            return self.invalid_header(header_line);
        }

        let var_count: usize = match fields.next().and_then(|value| str::parse(value).ok()) {
            None => return self.invalid_header(header_line),
            Some(value) => value,
        };

        if var_count > Var::max_count() {
            self.failed = true;
            return Err(ParserError::VarCountTooLarge {
                line: self.line,
                var_count,
            });
        }

        let clause_count: usize = match fields.next().and_then(|value| str::parse(value).ok()) {
            None => return self.invalid_header(header_line),
            Some(value) => value,
        };

        if fields.next().is_some() {
            return self.invalid_header(header_line);
        }

        self.header = Some(DimacsHeader {
            var_count,
            clause_count,
        });

        self.formula.set_var_count(var_count);

        Ok(())
    }

    fn invalid_header(&mut self, header_line: String) -> Result<(), ParserError> {
        self.failed = true;
        Err(ParserError::InvalidHeader {
            line: self.line,
            header: header_line,
        })
    }
}

/// Write a DIMACS CNF header.
///
/// Can be combined with [`write_dimacs_clauses`] for incremental writing.
pub fn write_dimacs_header(target: &mut impl io::Write, header: DimacsHeader) -> io::Result<()> {
    writeln!(
        target,
        "p cnf {var_count} {clause_count}",
        var_count = header.var_count,
        clause_count = header.clause_count
    )
}

/// Write an iterator of clauses as headerless DIMACS CNF.
///
/// Can be combined with [`write_dimacs_header`] for incremental writing.
pub fn write_dimacs_clauses(
    target: &mut impl io::Write,
    clauses: impl IntoIterator<Item = impl IntoIterator<Item = impl Borrow<Lit>>>,
) -> io::Result<()> {
    for clause in clauses.into_iter() {
        for lit in clause.into_iter() {
            itoa::write(&mut *target, lit.borrow().to_dimacs())?;
            target.write_all(b" ")?;
        }
        target.write_all(b"0\n")?;
    }
    Ok(())
}

/// Write a formula as DIMACS CNF.
pub fn write_dimacs(target: &mut impl io::Write, formula: &CnfFormula) -> io::Result<()> {
    write_dimacs_header(
        &mut *target,
        DimacsHeader {
            var_count: formula.var_count(),
            clause_count: formula.len(),
        },
    )?;
    write_dimacs_clauses(&mut *target, formula.iter())
}

/// Maximum width of emitted solution lines.
const SOLUTION_LINE_WIDTH: usize = 80;

/// Write a solver result in the DIMACS solution format.
///
/// For `Some(model)` this emits `s SATISFIABLE` followed by `v` lines listing the model as
/// signed integers terminated by `0`, wrapped at 80 columns. For `None` it emits
/// `s UNSATISFIABLE`.
pub fn write_solution(target: &mut impl io::Write, model: Option<&[Lit]>) -> io::Result<()> {
    let model = match model {
        None => return target.write_all(b"s UNSATISFIABLE\n"),
        Some(model) => model,
    };

    target.write_all(b"s SATISFIABLE\n")?;

    let mut scratch = vec![];
    let mut line_len = 1;

    target.write_all(b"v")?;

    let values = model.iter().map(|lit| lit.to_dimacs()).chain(Some(0));

    for value in values {
        scratch.clear();
        itoa::write(&mut scratch, value)?;

        if line_len + 1 + scratch.len() > SOLUTION_LINE_WIDTH {
            target.write_all(b"\nv")?;
            line_len = 1;
        }

        target.write_all(b" ")?;
        target.write_all(&scratch)?;
        line_len += 1 + scratch.len();
    }

    target.write_all(b"\n")
}
