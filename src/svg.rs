//! SVG path data and transform parsers
//!
//! See [SVG Path Specification](https://www.w3.org/TR/SVG11/paths.html#PathData)
use crate::{Anomaly, ColorError, Diagnostics, PI, Scalar, Transform};
use std::{fmt, str::FromStr};

/// Single parsed path command, letter case is preserved (lowercase is relative)
#[derive(Debug, Clone, PartialEq)]
pub struct PathCmd {
    pub op: u8,
    pub args: Vec<Scalar>,
}

impl PathCmd {
    pub fn new(op: u8, args: impl Into<Vec<Scalar>>) -> Self {
        Self {
            op,
            args: args.into(),
        }
    }

    /// Whether arguments are relative to the current point
    pub fn is_relative(&self) -> bool {
        self.op.is_ascii_lowercase()
    }

    /// Command letter in upper case
    pub fn kind(&self) -> u8 {
        self.op.to_ascii_uppercase()
    }

    /// Number of arguments consumed by a single invocation of the command
    pub fn arity(&self) -> usize {
        cmd_arity(self.op).unwrap_or(0)
    }
}

/// Number of arguments per invocation, `None` for unknown commands
pub fn cmd_arity(op: u8) -> Option<usize> {
    match op.to_ascii_uppercase() {
        b'Z' => Some(0),
        b'H' | b'V' => Some(1),
        b'M' | b'L' | b'T' => Some(2),
        b'S' | b'Q' => Some(4),
        b'C' => Some(6),
        b'A' => Some(7),
        _ => None,
    }
}

/// Parse path data into a sequence of commands.
///
/// Never fails: unknown commands and invalid numbers are reported to `diag` and
/// skipped, parsing continues with the rest of the input.
pub fn parse_path_data(text: &str, diag: &mut impl Diagnostics) -> Vec<PathCmd> {
    let mut scanner = Scanner::new(text.as_bytes());
    scanner.parse_separators();
    if scanner.is_eof() {
        diag.report(Anomaly::EmptyPathData);
        return Vec::new();
    }

    let mut cmds = Vec::new();
    let mut current: Option<PathCmd> = None;
    // arguments of an unknown command are dropped together with it
    let mut skipping = false;
    let mut orphans = 0;
    loop {
        scanner.parse_separators();
        let Some(byte) = scanner.current() else {
            break;
        };
        if is_cmd_boundary(byte) {
            let offset = scanner.offset;
            scanner.advance(1);
            cmds.extend(current.take());
            if cmd_arity(byte).is_some() {
                current = Some(PathCmd::new(byte, Vec::new()));
                skipping = false;
            } else {
                diag.report(Anomaly::UnknownCommand {
                    op: byte as char,
                    offset,
                });
                skipping = true;
            }
            continue;
        }
        let start = scanner.offset;
        match scanner.parse_number() {
            Some(value) => match current.as_mut() {
                Some(cmd) => cmd.args.push(value),
                None if !skipping => orphans += 1,
                None => {}
            },
            None => {
                scanner.skip_token();
                diag.report(Anomaly::InvalidNumber {
                    token: String::from_utf8_lossy(&scanner.text[start..scanner.offset])
                        .into_owned(),
                    offset: start,
                });
            }
        }
    }
    cmds.extend(current);
    if orphans != 0 {
        diag.report(Anomaly::OrphanArguments { count: orphans });
    }
    cmds
}

/// Any letter except exponent marker starts a new command
fn is_cmd_boundary(byte: u8) -> bool {
    byte.is_ascii_alphabetic() && !matches!(byte, b'e' | b'E')
}

fn is_separator(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\r' | b'\n' | b',')
}

struct Scanner<'a> {
    // text containing unparsed input
    text: &'a [u8],
    // current offset in the text
    offset: usize,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a [u8]) -> Self {
        Self { text, offset: 0 }
    }

    /// Byte at the current position
    fn current(&self) -> Option<u8> {
        self.text.get(self.offset).copied()
    }

    /// Advance current position by `count` bytes
    fn advance(&mut self, count: usize) {
        self.offset = (self.offset + count).min(self.text.len());
    }

    /// Check if end of input is reached
    fn is_eof(&self) -> bool {
        self.offset >= self.text.len()
    }

    /// Consume insignificant separators
    fn parse_separators(&mut self) {
        while matches!(self.current(), Some(byte) if is_separator(byte)) {
            self.offset += 1;
        }
    }

    /// Consume digits, returns true if at least one was found
    fn parse_digits(&mut self) -> bool {
        let start = self.offset;
        while matches!(self.current(), Some(b'0'..=b'9')) {
            self.offset += 1;
        }
        self.offset != start
    }

    /// Consume `+|-` sign
    fn parse_sign(&mut self) {
        if matches!(self.current(), Some(b'-' | b'+')) {
            self.offset += 1;
        }
    }

    /// Parse single number at the current position.
    ///
    /// Number extent is determined by SVG number grammar so `10-5` and `.5.5` are
    /// two numbers each. On failure nothing is consumed.
    fn parse_number(&mut self) -> Option<Scalar> {
        let start = self.offset;
        self.parse_sign();
        let whole = self.parse_digits();
        let fraction = if self.current() == Some(b'.') {
            self.offset += 1;
            self.parse_digits()
        } else {
            false
        };
        if !whole && !fraction {
            self.offset = start;
            return None;
        }
        if matches!(self.current(), Some(b'e' | b'E')) {
            let mantissa_end = self.offset;
            self.offset += 1;
            self.parse_sign();
            if !self.parse_digits() {
                // not an exponent, leave it to the next token
                self.offset = mantissa_end;
            }
        }
        match lexical_core::parse::<Scalar>(&self.text[start..self.offset]) {
            Ok(value) if value.is_finite() => Some(value),
            _ => {
                self.offset = start;
                None
            }
        }
    }

    /// Skip invalid token up to the next separator or command letter
    fn skip_token(&mut self) {
        self.advance(1);
        while let Some(byte) = self.current() {
            if is_separator(byte) || is_cmd_boundary(byte) {
                break;
            }
            self.offset += 1;
        }
    }

    /// Parse single scalar, skipping leading separators
    fn parse_scalar(&mut self) -> Result<Scalar, SvgParserError> {
        self.parse_separators();
        self.parse_number().ok_or(SvgParserError::InvalidScalar)
    }

    /// Parse ascii identifier
    fn parse_ident(&mut self) -> &'a [u8] {
        let start = self.offset;
        while matches!(self.current(), Some(byte) if byte.is_ascii_alphabetic()) {
            self.offset += 1;
        }
        &self.text[start..self.offset]
    }
}

struct SvgTransformParser<'a> {
    scanner: Scanner<'a>,
}

impl<'a> SvgTransformParser<'a> {
    fn new(text: &'a [u8]) -> Self {
        Self {
            scanner: Scanner::new(text),
        }
    }

    // parse angle in radians
    fn parse_angle(&mut self) -> Result<Scalar, SvgParserError> {
        let value = self.scanner.parse_scalar()?;
        match self.scanner.parse_ident() {
            b"" | b"deg" => Ok(value * PI / 180.0),
            b"rad" => Ok(value),
            _ => Err(SvgParserError::InvalidUnits),
        }
    }

    fn parse_length(&mut self) -> Result<Scalar, SvgParserError> {
        let value = self.scanner.parse_scalar()?;
        match self.scanner.parse_ident() {
            b"" | b"px" => Ok(value),
            _ => Err(SvgParserError::InvalidUnits),
        }
    }

    fn parse_transform(&mut self) -> Result<Option<Transform>, SvgParserError> {
        enum Op {
            Matrix,
            Rotate,
            Translate,
            Scale,
            SkewX,
            SkewY,
        }

        self.scanner.parse_separators();
        if self.scanner.is_eof() {
            return Ok(None);
        }

        let op = match self.scanner.parse_ident() {
            b"matrix" => Op::Matrix,
            b"rotate" => Op::Rotate,
            b"translate" => Op::Translate,
            b"scale" => Op::Scale,
            b"skewX" => Op::SkewX,
            b"skewY" => Op::SkewY,
            _ => return Err(SvgParserError::InvalidTransformOp),
        };

        self.scanner.parse_separators();
        if self.scanner.current() != Some(b'(') {
            return Err(SvgParserError::BracketExpected);
        }
        self.scanner.advance(1);

        let tr = match op {
            Op::Matrix => {
                let m00 = self.scanner.parse_scalar()?;
                let m10 = self.scanner.parse_scalar()?;
                let m01 = self.scanner.parse_scalar()?;
                let m11 = self.scanner.parse_scalar()?;
                let m02 = self.scanner.parse_scalar()?;
                let m12 = self.scanner.parse_scalar()?;
                Transform::new(m00, m01, m02, m10, m11, m12)
            }
            Op::Rotate => {
                let mut tr = Transform::new_rotate(self.parse_angle()?);
                if let Ok(tx) = self.parse_length() {
                    let ty = self.parse_length()?;
                    // rotate around (tx, ty)
                    tr = Transform::new_translate(tx, ty)
                        .pre_concat(tr)
                        .pre_translate(-tx, -ty);
                }
                tr
            }
            Op::Translate => {
                let tx = self.parse_length()?;
                let ty = self.parse_length().unwrap_or(0.0);
                Transform::new_translate(tx, ty)
            }
            Op::Scale => {
                let sx = self.scanner.parse_scalar()?;
                let sy = self.scanner.parse_scalar().unwrap_or(sx);
                Transform::new_scale(sx, sy)
            }
            Op::SkewX => Transform::new_skew(self.parse_angle()?, 0.0),
            Op::SkewY => Transform::new_skew(0.0, self.parse_angle()?),
        };

        self.scanner.parse_separators();
        if self.scanner.current() != Some(b')') {
            return Err(SvgParserError::BracketExpected);
        }
        self.scanner.advance(1);

        Ok(Some(tr))
    }
}

impl FromStr for Transform {
    type Err = SvgParserError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut tr = Transform::identity();
        let mut parser = SvgTransformParser::new(text.as_bytes());
        while let Some(tr_next) = parser.parse_transform()? {
            tr = tr * tr_next;
        }
        Ok(tr)
    }
}

/// Error while parsing SVG attribute values or document input
#[derive(Debug)]
pub enum SvgParserError {
    /// Failed to parse scalar value
    InvalidScalar,
    /// Invalid transform operation
    InvalidTransformOp,
    /// Invalid (Angle|Length) units
    InvalidUnits,
    /// Bracket expected,
    BracketExpected,
    /// Invalid color value
    Color(ColorError),
    /// JSON error
    #[cfg(feature = "serde")]
    Json(serde_json::Error),
}

impl fmt::Display for SvgParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SvgParserError::Color(error) => write!(f, "SvgParser::Color({})", error),
            #[cfg(feature = "serde")]
            SvgParserError::Json(error) => write!(f, "SvgParser::Json({})", error),
            _ => write!(f, "SvgParser::{:?}", self),
        }
    }
}

impl From<ColorError> for SvgParserError {
    fn from(error: ColorError) -> Self {
        Self::Color(error)
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for SvgParserError {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error)
    }
}

impl std::error::Error for SvgParserError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SvgParserError::Color(error) => Some(error),
            #[cfg(feature = "serde")]
            SvgParserError::Json(error) => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AnomalyKind, Point, assert_approx_eq};

    fn parse(text: &str) -> (Vec<PathCmd>, Vec<Anomaly>) {
        let mut anomalies = Vec::new();
        let cmds = parse_path_data(text, &mut anomalies);
        (cmds, anomalies)
    }

    #[test]
    fn test_parse_scalar() -> Result<(), SvgParserError> {
        let mut scanner = Scanner::new(b"1 .22e0.32 3.21e-3-1.24 1e4");
        assert_approx_eq!(scanner.parse_scalar()?, 1.0);
        assert_approx_eq!(scanner.parse_scalar()?, 0.22);
        assert_approx_eq!(scanner.parse_scalar()?, 0.32);
        assert_approx_eq!(scanner.parse_scalar()?, 3.21e-3);
        assert_approx_eq!(scanner.parse_scalar()?, -1.24);
        assert_approx_eq!(scanner.parse_scalar()?, 1e4);
        assert!(scanner.parse_scalar().is_err());
        Ok(())
    }

    #[test]
    fn test_parse_path_data() {
        let (cmds, anomalies) = parse("M0,0 L10,0 l0 10\tZ");
        assert!(anomalies.is_empty());
        assert_eq!(
            cmds,
            vec![
                PathCmd::new(b'M', [0.0, 0.0]),
                PathCmd::new(b'L', [10.0, 0.0]),
                PathCmd::new(b'l', [0.0, 10.0]),
                PathCmd::new(b'Z', []),
            ]
        );
        assert!(cmds[2].is_relative());
        assert_eq!(cmds[2].kind(), b'L');
        assert_eq!(cmds[2].arity(), 2);

        // compact number forms
        let (cmds, anomalies) = parse("M10-5.5.5L1e1,2E-1");
        assert!(anomalies.is_empty());
        assert_eq!(
            cmds,
            vec![
                PathCmd::new(b'M', [10.0, -5.5, 0.5]),
                PathCmd::new(b'L', [10.0, 0.2]),
            ]
        );
    }

    #[test]
    fn test_parse_malformed() {
        let (cmds, anomalies) = parse("M0,0 L10,abc");
        assert_eq!(
            cmds,
            vec![
                PathCmd::new(b'M', [0.0, 0.0]),
                PathCmd::new(b'L', [10.0]),
                PathCmd::new(b'a', []),
                PathCmd::new(b'c', []),
            ]
        );
        assert_eq!(anomalies, vec![Anomaly::UnknownCommand { op: 'b', offset: 10 }]);

        let (cmds, anomalies) = parse("M1 # 2 X 3 4 L5 6");
        assert_eq!(
            cmds,
            vec![PathCmd::new(b'M', [1.0, 2.0]), PathCmd::new(b'L', [5.0, 6.0])]
        );
        assert_eq!(anomalies.len(), 2);
        assert_eq!(
            anomalies[0],
            Anomaly::InvalidNumber {
                token: "#".into(),
                offset: 3
            }
        );
        assert_eq!(anomalies[1].kind(), AnomalyKind::MalformedInput);

        let (cmds, anomalies) = parse("1 2 M3 4");
        assert_eq!(cmds, vec![PathCmd::new(b'M', [3.0, 4.0])]);
        assert_eq!(anomalies, vec![Anomaly::OrphanArguments { count: 2 }]);
    }

    #[test]
    fn test_parse_empty() {
        for text in ["", "  \n\t", ",,"] {
            let (cmds, anomalies) = parse(text);
            assert!(cmds.is_empty());
            assert_eq!(anomalies, vec![Anomaly::EmptyPathData]);
        }
    }

    #[test]
    fn test_parse_transform() -> Result<(), SvgParserError> {
        let tr_str = r#"
            translate(1 2)
            skewX(30deg)
            matrix(1  2 3 4 -3-7)
            scale(2,1)
            rotate(10 1 2)
            rotate(1rad)
        "#;
        let tr_fmt = "matrix(6.56129 5.23393 -1.92617 -2.14614 -5.23999 -4.1231)";
        let tr = Transform::from_str(tr_str)?;
        assert_eq!(format!("{tr:?}"), tr_fmt);
        let tr = Transform::from_str(tr_fmt)?;
        assert_eq!(format!("{tr:?}"), tr_fmt);

        let tr: Transform = "translate(10)".parse()?;
        assert_eq!(tr.apply(Point::new(1.0, 1.0)), Point::new(11.0, 1.0));
        let tr: Transform = "scale(3)".parse()?;
        assert_eq!(tr.apply(Point::new(1.0, 2.0)), Point::new(3.0, 6.0));

        assert!(matches!(
            "shear(1)".parse::<Transform>(),
            Err(SvgParserError::InvalidTransformOp)
        ));
        assert!(matches!(
            "scale 1".parse::<Transform>(),
            Err(SvgParserError::BracketExpected)
        ));
        Ok(())
    }
}
