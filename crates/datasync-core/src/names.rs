//! Natural-key parsing for proposal and visit names.
//!
//! A proposal name is a two-character code followed by a number (`nt20`).
//! A visit name extends it with a dash and a visit number (`cm12345-6`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Length of the alphabetic code that prefixes every proposal name.
pub const CODE_LEN: usize = 2;

/// Returns the proposal code prefix of a name, or the whole name when shorter.
pub fn code_prefix(name: &str) -> &str {
    match name.char_indices().nth(CODE_LEN) {
        Some((idx, _)) => &name[..idx],
        None => name,
    }
}

fn split_code<'a>(kind: &'static str, value: &'a str) -> Result<(String, &'a str), CoreError> {
    let code = code_prefix(value);
    if code.chars().count() < CODE_LEN || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(CoreError::malformed_name(kind, value));
    }
    Ok((code.to_string(), &value[code.len()..]))
}

fn parse_number(kind: &'static str, value: &str, digits: &str) -> Result<u32, CoreError> {
    digits
        .trim()
        .parse::<u32>()
        .map_err(|_| CoreError::malformed_name(kind, value))
}

/// Proposal natural key (`code` + `number`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProposalName {
    pub code: String,
    pub number: u32,
}

impl ProposalName {
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        let (code, rest) = split_code("proposal", value)?;
        let number = parse_number("proposal", value, rest)?;
        Ok(Self { code, number })
    }
}

impl FromStr for ProposalName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ProposalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.code, self.number)
    }
}

/// Visit natural key (`code` + `number` + `-` + `visit_number`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisitName {
    pub proposal: ProposalName,
    pub visit_number: u32,
}

impl VisitName {
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        let (code, rest) = split_code("visit", value)?;
        let (number, visit) = rest
            .split_once('-')
            .ok_or_else(|| CoreError::malformed_name("visit", value))?;
        Ok(Self {
            proposal: ProposalName {
                code,
                number: parse_number("visit", value, number)?,
            },
            visit_number: parse_number("visit", value, visit)?,
        })
    }
}

impl FromStr for VisitName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VisitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.proposal, self.visit_number)
    }
}
