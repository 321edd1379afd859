/*****************************************************************************************[dimacs.rs]
Copyright (c) 2003-2006, Niklas Een, Niklas Sorensson (MiniSat)
Copyright (c) 2007-2010, Niklas Sorensson (MiniSat)

Permission is hereby granted, free of charge, to any person obtaining a copy of this software and
associated documentation files (the "Software"), to deal in the Software without restriction,
including without limitation the rights to use, copy, modify, merge, publish, distribute,
sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all copies or
substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT
NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT
OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
**************************************************************************************************/

//! DIMACS CNF reader. Variables are created in the solver on demand, so the
//! declared variable count in the header is not load-bearing; a clause-count
//! mismatch is reported on stderr but is never fatal.

use {
    crate::{core::Solver, Lit},
    std::io::{self, BufRead},
};

/// `parse(input, solver)` adds the content of `input` to the solver.
pub fn parse<R: BufRead>(input: &mut R, solver: &mut Solver) -> io::Result<()> {
    let mut lits = vec![];
    let mut num_clauses = 0;
    let mut num_read_clauses = 0;
    loop {
        skip_whitespace(input)?;
        let ch = next_byte(input)?;
        if ch == Some(b'p') {
            let mut header = [0; 5];
            input.read_exact(&mut header)?;
            if &header != b"p cnf" {
                return parse_error("PARSE ERROR! Unexpected char: p".to_string());
            }
            // the declared variable count is ignored; variables are created
            // on demand
            parse_int(input)?;
            num_clauses = parse_int(input)?;
        } else if ch == Some(b'c') {
            skip_line(input)?;
        } else if ch.is_some() {
            read_clause(input, solver, &mut lits)?;
            solver.add_clause_reuse(&mut lits);
            num_read_clauses += 1;
        } else {
            break;
        }
    }
    if num_clauses != num_read_clauses {
        eprintln!("WARNING! DIMACS header mismatch: wrong number of clauses");
    }
    Ok(())
}

fn read_clause<R: BufRead>(
    input: &mut R,
    solver: &mut Solver,
    lits: &mut Vec<Lit>,
) -> io::Result<()> {
    lits.clear();
    loop {
        let parsed_lit = parse_int(input)?;
        if parsed_lit == 0 {
            return Ok(());
        }
        let var = (parsed_lit.abs() - 1) as u32;
        let lit = Lit::new(solver.var_of_int(var), parsed_lit < 0);
        lits.push(lit);
    }
}

fn parse_int<R: BufRead>(input: &mut R) -> io::Result<i32> {
    skip_whitespace(input)?;
    let ch = next_byte(input)?;
    let neg = if ch == Some(b'+') || ch == Some(b'-') {
        input.consume(1);
        ch == Some(b'-')
    } else {
        false
    };
    match next_byte(input)? {
        Some(ch) if ch.is_ascii_digit() => {}
        Some(ch) => {
            return parse_error(format!("PARSE ERROR! Unexpected char: {}", ch as char));
        }
        None => return parse_error("PARSE ERROR! Unexpected EOF".to_string()),
    }
    let mut val = 0;
    while let Some(ch) = next_byte(input)? {
        if !ch.is_ascii_digit() {
            break;
        }
        input.consume(1);
        val = val * 10 + (ch - b'0') as i32;
    }
    if neg {
        Ok(-val)
    } else {
        Ok(val)
    }
}

#[inline(always)]
fn is_whitespace(ch: Option<u8>) -> bool {
    ch.map(|ch| (b'\x09'..=b'\x0d').contains(&ch) || ch == b' ')
        .unwrap_or(false)
}

fn skip_whitespace<R: BufRead>(input: &mut R) -> io::Result<()> {
    while is_whitespace(next_byte(input)?) {
        input.consume(1);
    }
    Ok(())
}

fn skip_line<R: BufRead>(input: &mut R) -> io::Result<()> {
    loop {
        if let Some(ch) = next_byte(input)? {
            input.consume(1);
            if ch == b'\n' {
                return Ok(());
            }
        } else {
            return Ok(());
        }
    }
}

fn next_byte<R: BufRead>(input: &mut R) -> io::Result<Option<u8>> {
    Ok(input.fill_buf()?.first().copied())
}

fn parse_error<T>(message: String) -> io::Result<T> {
    Err(io::Error::new(io::ErrorKind::InvalidInput, message))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lbool;
    use std::io::Cursor;

    #[test]
    fn test_parse_simple() {
        let mut input = Cursor::new("c a comment\np cnf 2 2\n1 -2 0\n2 0\n");
        let mut s = Solver::default();
        parse(&mut input, &mut s).unwrap();
        assert_eq!(s.num_vars(), 2);
        // the second clause is a unit and propagates at once
        assert_eq!(s.num_clauses(), 1);
        assert!(s.solve(&[]));
    }

    #[test]
    fn test_parse_explicit_plus_and_blank_lines() {
        let mut input = Cursor::new("p cnf 3 2\n\n+1 +2 0\n\t-3 0\n");
        let mut s = Solver::default();
        parse(&mut input, &mut s).unwrap();
        assert_eq!(s.num_vars(), 3);
        assert!(s.solve(&[]));
        assert_eq!(s.model_value_var(crate::Var::from_idx(2)), lbool::FALSE);
    }

    #[test]
    fn test_parse_creates_missing_vars() {
        // header understates the variable count
        let mut input = Cursor::new("p cnf 1 1\n1 5 0\n");
        let mut s = Solver::default();
        parse(&mut input, &mut s).unwrap();
        assert_eq!(s.num_vars(), 5);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let mut input = Cursor::new("p cnf 1 1\n1 x 0\n");
        let mut s = Solver::default();
        let err = parse(&mut input, &mut s).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_clause_count_mismatch_is_not_fatal() {
        // header declares three clauses, the file holds one: warning only
        let mut input = Cursor::new("p cnf 1 3\n1 0\n");
        let mut s = Solver::default();
        assert!(parse(&mut input, &mut s).is_ok());
        assert!(s.solve(&[]));
    }
}
