//! Prerequisite expressions
//!
//! Prerequisites are written as boolean expressions over unit codes and
//! credit-point thresholds, e.g. `(CAB201 or ITD121) and CAB202` or
//! `CAB301 and 96cp`. `and` binds tighter than `or`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A prerequisite requirement
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Prereq {
    /// No requirement
    #[default]
    None,
    /// A unit that must already be completed
    Unit(String),
    /// A minimum number of credit points already completed
    CreditPoints(u32),
    /// All of the requirements
    And(Vec<Prereq>),
    /// At least one of the requirements
    Or(Vec<Prereq>),
}

/// Errors raised while parsing a prerequisite expression
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrereqParseError {
    /// A character that cannot start any token
    #[error("Unexpected character '{ch}' at position {pos}")]
    UnexpectedChar {
        /// Offending character
        ch: char,
        /// Byte offset within the expression
        pos: usize,
    },
    /// A token appeared where it is not allowed
    #[error("Unexpected '{0}'")]
    UnexpectedToken(String),
    /// The expression ended early
    #[error("Unexpected end of expression")]
    UnexpectedEnd,
    /// A number was not followed by `cp`
    #[error("Expected 'cp' after {0}")]
    MissingCreditPoints(u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    LParen,
    RParen,
    And,
    Or,
    Code(String),
    Number(u32),
    Cp,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LParen => write!(f, "("),
            Self::RParen => write!(f, ")"),
            Self::And => write!(f, "and"),
            Self::Or => write!(f, "or"),
            Self::Code(code) => write!(f, "{code}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Cp => write!(f, "cp"),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, PrereqParseError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
        } else if ch == '(' {
            tokens.push(Token::LParen);
            chars.next();
        } else if ch == ')' {
            tokens.push(Token::RParen);
            chars.next();
        } else if ch.is_ascii_digit() {
            let mut digits = String::new();
            while let Some(&(_, d)) = chars.peek() {
                if !d.is_ascii_digit() {
                    break;
                }
                digits.push(d);
                chars.next();
            }
            // "96cp" and "96 cp" are both accepted
            let value = digits
                .parse()
                .map_err(|_| PrereqParseError::UnexpectedToken(digits.clone()))?;
            tokens.push(Token::Number(value));
        } else if ch.is_ascii_alphabetic() {
            let mut word = String::new();
            while let Some(&(_, c)) = chars.peek() {
                if !c.is_ascii_alphanumeric() {
                    break;
                }
                word.push(c);
                chars.next();
            }
            tokens.push(match word.to_ascii_lowercase().as_str() {
                "and" => Token::And,
                "or" => Token::Or,
                "cp" => Token::Cp,
                _ => Token::Code(word.to_ascii_uppercase()),
            });
        } else {
            return Err(PrereqParseError::UnexpectedChar { ch, pos });
        }
    }

    Ok(tokens)
}

/// Recursive-descent parser over the token stream
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expr(&mut self) -> Result<Prereq, PrereqParseError> {
        let mut alternatives = vec![self.term()?];
        while self.peek() == Some(&Token::Or) {
            self.bump();
            alternatives.push(self.term()?);
        }
        Ok(Prereq::or(alternatives))
    }

    fn term(&mut self) -> Result<Prereq, PrereqParseError> {
        let mut parts = vec![self.factor()?];
        while self.peek() == Some(&Token::And) {
            self.bump();
            parts.push(self.factor()?);
        }
        Ok(Prereq::and(parts))
    }

    fn factor(&mut self) -> Result<Prereq, PrereqParseError> {
        match self.bump() {
            Some(Token::LParen) => {
                let inner = self.expr()?;
                match self.bump() {
                    Some(Token::RParen) => Ok(inner),
                    Some(other) => Err(PrereqParseError::UnexpectedToken(other.to_string())),
                    None => Err(PrereqParseError::UnexpectedEnd),
                }
            }
            Some(Token::Code(code)) => Ok(Prereq::Unit(code)),
            Some(Token::Number(n)) => match self.bump() {
                Some(Token::Cp) => Ok(Prereq::CreditPoints(n)),
                _ => Err(PrereqParseError::MissingCreditPoints(n)),
            },
            Some(other) => Err(PrereqParseError::UnexpectedToken(other.to_string())),
            None => Err(PrereqParseError::UnexpectedEnd),
        }
    }
}

impl Prereq {
    /// Combine requirements with `and`, flattening single-element lists
    #[must_use]
    pub fn and(mut parts: Vec<Self>) -> Self {
        if parts.len() == 1 {
            parts.remove(0)
        } else {
            Self::And(parts)
        }
    }

    /// Combine requirements with `or`, flattening single-element lists
    #[must_use]
    pub fn or(mut alternatives: Vec<Self>) -> Self {
        if alternatives.len() == 1 {
            alternatives.remove(0)
        } else {
            Self::Or(alternatives)
        }
    }

    /// Every unit code named anywhere in the expression
    #[must_use]
    pub fn mentions(&self) -> BTreeSet<&str> {
        let mut codes = BTreeSet::new();
        self.collect_mentions(&mut codes);
        codes
    }

    fn collect_mentions<'a>(&'a self, codes: &mut BTreeSet<&'a str>) {
        match self {
            Self::None | Self::CreditPoints(_) => {}
            Self::Unit(code) => {
                codes.insert(code.as_str());
            }
            Self::And(parts) | Self::Or(parts) => {
                for part in parts {
                    part.collect_mentions(codes);
                }
            }
        }
    }

    /// Whether every way of satisfying this expression needs `code`
    #[must_use]
    pub fn requires(&self, code: &str) -> bool {
        match self {
            Self::None | Self::CreditPoints(_) => false,
            Self::Unit(c) => c == code,
            Self::And(parts) => parts.iter().any(|p| p.requires(code)),
            Self::Or(alternatives) => {
                !alternatives.is_empty() && alternatives.iter().all(|p| p.requires(code))
            }
        }
    }

    /// Evaluate the expression
    ///
    /// # Arguments
    /// * `completed` - Whether a unit code has been completed
    /// * `credit_points` - Credit points completed so far
    pub fn is_satisfied<F>(&self, completed: &F, credit_points: u32) -> bool
    where
        F: Fn(&str) -> bool,
    {
        match self {
            Self::None => true,
            Self::Unit(code) => completed(code),
            Self::CreditPoints(n) => credit_points >= *n,
            Self::And(parts) => parts.iter().all(|p| p.is_satisfied(completed, credit_points)),
            Self::Or(alternatives) => alternatives
                .iter()
                .any(|p| p.is_satisfied(completed, credit_points)),
        }
    }

    /// Whether this expression has no requirement
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl FromStr for Prereq {
    type Err = PrereqParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens = tokenize(s)?;
        if tokens.is_empty() {
            return Ok(Self::None);
        }

        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser.expr()?;
        match parser.peek() {
            None => Ok(expr),
            Some(extra) => Err(PrereqParseError::UnexpectedToken(extra.to_string())),
        }
    }
}

impl fmt::Display for Prereq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Unit(code) => write!(f, "{code}"),
            Self::CreditPoints(n) => write!(f, "{n}cp"),
            Self::And(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, " and ")?;
                    }
                    if matches!(part, Self::Or(_)) {
                        write!(f, "({part})")?;
                    } else {
                        write!(f, "{part}")?;
                    }
                }
                Ok(())
            }
            Self::Or(alternatives) => {
                for (i, alt) in alternatives.iter().enumerate() {
                    if i > 0 {
                        write!(f, " or ")?;
                    }
                    write!(f, "{alt}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(code: &str) -> Prereq {
        Prereq::Unit(code.to_string())
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!("".parse::<Prereq>().unwrap(), Prereq::None);
        assert_eq!("   ".parse::<Prereq>().unwrap(), Prereq::None);
    }

    #[test]
    fn test_parse_precedence() {
        let parsed: Prereq = "CAB201 or ITD121 and CAB202".parse().unwrap();
        assert_eq!(
            parsed,
            Prereq::Or(vec![
                unit("CAB201"),
                Prereq::And(vec![unit("ITD121"), unit("CAB202")]),
            ])
        );
    }

    #[test]
    fn test_parse_parentheses_and_credit_points() {
        let parsed: Prereq = "(cab201 OR itd121) and 96cp".parse().unwrap();
        assert_eq!(
            parsed,
            Prereq::And(vec![
                Prereq::Or(vec![unit("CAB201"), unit("ITD121")]),
                Prereq::CreditPoints(96),
            ])
        );

        assert_eq!(
            "48 cp".parse::<Prereq>().unwrap(),
            Prereq::CreditPoints(48)
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "CAB201 and".parse::<Prereq>(),
            Err(PrereqParseError::UnexpectedEnd)
        );
        assert_eq!(
            "(CAB201".parse::<Prereq>(),
            Err(PrereqParseError::UnexpectedEnd)
        );
        assert_eq!(
            "96".parse::<Prereq>(),
            Err(PrereqParseError::MissingCreditPoints(96))
        );
        assert!(matches!(
            "CAB201 & CAB202".parse::<Prereq>(),
            Err(PrereqParseError::UnexpectedChar { ch: '&', .. })
        ));
        assert!(matches!(
            "CAB201 CAB202".parse::<Prereq>(),
            Err(PrereqParseError::UnexpectedToken(_))
        ));
    }

    #[test]
    fn test_display_round_trip() {
        let text = "(CAB201 or ITD121) and CAB202 and 48cp";
        let parsed: Prereq = text.parse().unwrap();
        assert_eq!(parsed.to_string(), text);
        assert_eq!(parsed.to_string().parse::<Prereq>().unwrap(), parsed);
    }

    #[test]
    fn test_mentions() {
        let parsed: Prereq = "(CAB201 or ITD121) and CAB202 and 48cp".parse().unwrap();
        let mentioned: Vec<_> = parsed.mentions().into_iter().collect();
        assert_eq!(mentioned, vec!["CAB201", "CAB202", "ITD121"]);
    }

    #[test]
    fn test_requires() {
        let parsed: Prereq = "(CAB201 or ITD121) and CAB202".parse().unwrap();
        assert!(parsed.requires("CAB202"));
        assert!(!parsed.requires("CAB201"));
        assert!(!parsed.requires("ITD121"));

        let both: Prereq = "(CAB201 and CAB202) or (CAB201 and CAB203)".parse().unwrap();
        assert!(both.requires("CAB201"));
        assert!(!both.requires("CAB202"));
    }

    #[test]
    fn test_is_satisfied() {
        let parsed: Prereq = "(CAB201 or ITD121) and 24cp".parse().unwrap();
        let done = |code: &str| code == "ITD121";
        assert!(parsed.is_satisfied(&done, 24));
        assert!(!parsed.is_satisfied(&done, 12));

        let nothing = |_: &str| false;
        assert!(!parsed.is_satisfied(&nothing, 100));
        assert!(Prereq::None.is_satisfied(&nothing, 0));
    }
}
