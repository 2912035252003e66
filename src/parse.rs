//! RFC 8259 parser producing a generic value tree.
//!
//! No inference happens here. Numbers keep their decimal text plus an
//! `is_integer` flag so the int-vs-float decision belongs to the inference
//! step, not to parser rounding. Duplicate object keys are accepted
//! (last one wins) but reported as soft warnings alongside the result.

use indexmap::IndexMap;
use thiserror::Error;

// ------------------------------- Types ------------------------------------ //

/// Generic JSON value tree. Owned by the inference step that consumes it;
/// immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueNode {
    Null,
    Bool(bool),
    /// Lossless decimal text; `is_integer` reflects the lexical form
    /// (no fraction, no exponent).
    Number { text: String, is_integer: bool },
    String(String),
    Array(Vec<ValueNode>),
    Object(IndexMap<String, ValueNode>),
}

/// Parse result: the value tree plus soft warnings (duplicate keys).
#[derive(Debug, Clone)]
pub struct Parsed {
    pub root: ValueNode,
    pub warnings: Vec<String>,
}

#[derive(Debug, Error)]
#[error("malformed JSON at byte {offset}: {kind}")]
pub struct ParseError {
    pub offset: usize,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Error)]
pub enum ParseErrorKind {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("unexpected character `{0}`")]
    UnexpectedChar(char),
    #[error("invalid escape sequence")]
    BadEscape,
    #[error("invalid \\u escape")]
    BadUnicodeEscape,
    #[error("invalid number literal")]
    BadNumber,
    #[error("unescaped control character inside string")]
    ControlInString,
    #[error("trailing characters after top-level value")]
    TrailingGarbage,
    #[error("nesting deeper than {MAX_DEPTH} levels")]
    TooDeep,
}

/// Cap against pathological nesting; well past anything a sample payload
/// legitimately needs.
const MAX_DEPTH: usize = 128;

// ------------------------------- Entry ------------------------------------ //

/// Parse one JSON document. Any top-level value is accepted.
pub fn parse(text: &str) -> Result<Parsed, ParseError> {
    let mut p = Parser { src: text, pos: 0, warnings: Vec::new() };
    p.skip_ws();
    let root = p.value(0)?;
    p.skip_ws();
    if p.pos != p.src.len() {
        return Err(p.err(ParseErrorKind::TrailingGarbage));
    }
    Ok(Parsed { root, warnings: p.warnings })
}

// ------------------------------ Machinery --------------------------------- //

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    warnings: Vec<String>,
}

impl<'a> Parser<'a> {
    fn bytes(&self) -> &'a [u8] {
        self.src.as_bytes()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes().get(self.pos).copied()
    }

    fn err(&self, kind: ParseErrorKind) -> ParseError {
        ParseError { offset: self.pos, kind }
    }

    fn err_here(&self) -> ParseError {
        match self.src[self.pos..].chars().next() {
            Some(c) => self.err(ParseErrorKind::UnexpectedChar(c)),
            None => self.err(ParseErrorKind::UnexpectedEof),
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, b: u8) -> Result<(), ParseError> {
        if self.peek() == Some(b) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.err_here())
        }
    }

    /// Consume a keyword (`true`/`false`/`null`) whose first byte matched.
    fn literal(&mut self, word: &str) -> Result<(), ParseError> {
        if self.src[self.pos..].starts_with(word) {
            self.pos += word.len();
            Ok(())
        } else {
            Err(self.err_here())
        }
    }

    fn value(&mut self, depth: usize) -> Result<ValueNode, ParseError> {
        if depth > MAX_DEPTH {
            return Err(self.err(ParseErrorKind::TooDeep));
        }
        match self.peek() {
            Some(b'{') => self.object(depth),
            Some(b'[') => self.array(depth),
            Some(b'"') => Ok(ValueNode::String(self.string()?)),
            Some(b't') => self.literal("true").map(|_| ValueNode::Bool(true)),
            Some(b'f') => self.literal("false").map(|_| ValueNode::Bool(false)),
            Some(b'n') => self.literal("null").map(|_| ValueNode::Null),
            Some(b'-' | b'0'..=b'9') => self.number(),
            _ => Err(self.err_here()),
        }
    }

    fn object(&mut self, depth: usize) -> Result<ValueNode, ParseError> {
        self.expect(b'{')?;
        let mut map = IndexMap::new();
        self.skip_ws();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            return Ok(ValueNode::Object(map));
        }
        loop {
            self.skip_ws();
            let key_offset = self.pos;
            let key = self.string()?;
            self.skip_ws();
            self.expect(b':')?;
            self.skip_ws();
            let val = self.value(depth + 1)?;
            if map.insert(key.clone(), val).is_some() {
                // Last one wins (standard JSON semantics); first-seen
                // position is kept by IndexMap.
                self.warnings.push(format!(
                    "duplicate object key \"{key}\" at byte {key_offset}; keeping the last value"
                ));
            }
            self.skip_ws();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {
                    self.pos += 1;
                    return Ok(ValueNode::Object(map));
                }
                _ => return Err(self.err_here()),
            }
        }
    }

    fn array(&mut self, depth: usize) -> Result<ValueNode, ParseError> {
        self.expect(b'[')?;
        let mut items = Vec::new();
        self.skip_ws();
        if self.peek() == Some(b']') {
            self.pos += 1;
            return Ok(ValueNode::Array(items));
        }
        loop {
            self.skip_ws();
            items.push(self.value(depth + 1)?);
            self.skip_ws();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {
                    self.pos += 1;
                    return Ok(ValueNode::Array(items));
                }
                _ => return Err(self.err_here()),
            }
        }
    }

    fn string(&mut self) -> Result<String, ParseError> {
        self.expect(b'"')?;
        let mut out = String::new();
        loop {
            let start = self.pos;
            // run of plain bytes; the terminator is always ASCII, so the
            // slice below stays on char boundaries
            while let Some(b) = self.peek() {
                if b == b'"' || b == b'\\' || b < 0x20 {
                    break;
                }
                self.pos += 1;
            }
            out.push_str(&self.src[start..self.pos]);
            match self.peek() {
                None => return Err(self.err(ParseErrorKind::UnexpectedEof)),
                Some(b'"') => {
                    self.pos += 1;
                    return Ok(out);
                }
                Some(b'\\') => {
                    self.pos += 1;
                    self.escape(&mut out)?;
                }
                Some(_) => return Err(self.err(ParseErrorKind::ControlInString)),
            }
        }
    }

    fn escape(&mut self, out: &mut String) -> Result<(), ParseError> {
        let b = self.peek().ok_or_else(|| self.err(ParseErrorKind::UnexpectedEof))?;
        self.pos += 1;
        match b {
            b'"' => out.push('"'),
            b'\\' => out.push('\\'),
            b'/' => out.push('/'),
            b'b' => out.push('\u{0008}'),
            b'f' => out.push('\u{000C}'),
            b'n' => out.push('\n'),
            b'r' => out.push('\r'),
            b't' => out.push('\t'),
            b'u' => {
                let hi = self.hex4()?;
                let c = if (0xD800..=0xDBFF).contains(&hi) {
                    // surrogate pair: a low surrogate must follow
                    if self.peek() != Some(b'\\') {
                        return Err(self.err(ParseErrorKind::BadUnicodeEscape));
                    }
                    self.pos += 1;
                    if self.peek() != Some(b'u') {
                        return Err(self.err(ParseErrorKind::BadUnicodeEscape));
                    }
                    self.pos += 1;
                    let lo = self.hex4()?;
                    if !(0xDC00..=0xDFFF).contains(&lo) {
                        return Err(self.err(ParseErrorKind::BadUnicodeEscape));
                    }
                    let cp = 0x10000 + ((hi - 0xD800) << 10) + (lo - 0xDC00);
                    char::from_u32(cp).ok_or_else(|| self.err(ParseErrorKind::BadUnicodeEscape))?
                } else if (0xDC00..=0xDFFF).contains(&hi) {
                    return Err(self.err(ParseErrorKind::BadUnicodeEscape));
                } else {
                    char::from_u32(hi).ok_or_else(|| self.err(ParseErrorKind::BadUnicodeEscape))?
                };
                out.push(c);
            }
            _ => return Err(self.err(ParseErrorKind::BadEscape)),
        }
        Ok(())
    }

    fn hex4(&mut self) -> Result<u32, ParseError> {
        let end = self.pos + 4;
        let digits = self
            .bytes()
            .get(self.pos..end)
            .ok_or_else(|| self.err(ParseErrorKind::UnexpectedEof))?;
        let mut v: u32 = 0;
        for &d in digits {
            let n = match d {
                b'0'..=b'9' => (d - b'0') as u32,
                b'a'..=b'f' => (d - b'a') as u32 + 10,
                b'A'..=b'F' => (d - b'A') as u32 + 10,
                _ => return Err(self.err(ParseErrorKind::BadUnicodeEscape)),
            };
            v = (v << 4) | n;
        }
        self.pos = end;
        Ok(v)
    }

    fn number(&mut self) -> Result<ValueNode, ParseError> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        // int part: 0 | [1-9][0-9]*
        match self.peek() {
            Some(b'0') => self.pos += 1,
            Some(b'1'..=b'9') => {
                while matches!(self.peek(), Some(b'0'..=b'9')) {
                    self.pos += 1;
                }
            }
            _ => return Err(self.err(ParseErrorKind::BadNumber)),
        }
        let mut is_integer = true;
        if self.peek() == Some(b'.') {
            is_integer = false;
            self.pos += 1;
            self.digits1()?;
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            is_integer = false;
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            self.digits1()?;
        }
        Ok(ValueNode::Number {
            text: self.src[start..self.pos].to_string(),
            is_integer,
        })
    }

    fn digits1(&mut self) -> Result<(), ParseError> {
        if !matches!(self.peek(), Some(b'0'..=b'9')) {
            return Err(self.err(ParseErrorKind::BadNumber));
        }
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        Ok(())
    }
}

// ------------------------------- Tests ------------------------------------ //
