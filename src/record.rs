// Branch records and the normalization rules shared by reader, index and queries

use crate::constants;
use serde::{Deserialize, Serialize};

/// One normalized spreadsheet row. Serialized with the upstream column names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchRecord {
    #[serde(rename = "BANK")]
    pub bank: String,
    #[serde(rename = "IFSC")]
    pub ifsc: String,
    #[serde(rename = "BRANCH")]
    pub branch: String,
    #[serde(rename = "ADDRESS")]
    pub address: String,
    #[serde(rename = "CITY1")]
    pub city1: String,
    #[serde(rename = "CITY2")]
    pub city2: String,
    #[serde(rename = "STATE")]
    pub state: String,
    #[serde(rename = "STD CODE")]
    pub std_code: String,
    #[serde(rename = "PHONE")]
    pub phone: String,
}

/// Output fields of a [`BranchRecord`], in serialization order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Bank,
    Ifsc,
    Branch,
    Address,
    City1,
    City2,
    State,
    StdCode,
    Phone,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::Bank,
        Field::Ifsc,
        Field::Branch,
        Field::Address,
        Field::City1,
        Field::City2,
        Field::State,
        Field::StdCode,
        Field::Phone,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Bank => "BANK",
            Field::Ifsc => "IFSC",
            Field::Branch => "BRANCH",
            Field::Address => "ADDRESS",
            Field::City1 => "CITY1",
            Field::City2 => "CITY2",
            Field::State => "STATE",
            Field::StdCode => "STD CODE",
            Field::Phone => "PHONE",
        }
    }
}

impl BranchRecord {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Bank => &self.bank,
            Field::Ifsc => &self.ifsc,
            Field::Branch => &self.branch,
            Field::Address => &self.address,
            Field::City1 => &self.city1,
            Field::City2 => &self.city2,
            Field::State => &self.state,
            Field::StdCode => &self.std_code,
            Field::Phone => &self.phone,
        }
    }

    pub fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::Bank => &mut self.bank,
            Field::Ifsc => &mut self.ifsc,
            Field::Branch => &mut self.branch,
            Field::Address => &mut self.address,
            Field::City1 => &mut self.city1,
            Field::City2 => &mut self.city2,
            Field::State => &mut self.state,
            Field::StdCode => &mut self.std_code,
            Field::Phone => &mut self.phone,
        };
        *slot = value;
    }

    /// IFSC prefix (bank code) of this record.
    pub fn prefix(&self) -> Option<&str> {
        ifsc_prefix(&self.ifsc)
    }
}

/// Trim and uppercase a user- or sheet-supplied IFSC.
pub fn normalize_ifsc(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// True for a normalized code of exactly 11 ASCII alphanumerics.
pub fn is_well_formed_ifsc(code: &str) -> bool {
    code.len() == constants::IFSC_LEN && code.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Leading bank-code characters of a normalized IFSC.
pub fn ifsc_prefix(code: &str) -> Option<&str> {
    code.get(..constants::IFSC_PREFIX_LEN)
}

/// Collapse internal whitespace and trim.
pub fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Key used to compare bank names: whitespace collapsed, uppercased.
pub fn bank_key(name: &str) -> String {
    collapse_ws(name).to_uppercase()
}
