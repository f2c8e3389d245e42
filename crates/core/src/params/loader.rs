//! Free-form parameter file parser.
//!
//! The format is line-oriented: `key = value` assignments with `,` between
//! multiple values, `#` comments, and nested `begin stratum` /
//! `begin species` blocks:
//!
//! ```text
//! fireline length = 100
//! incident wind speed = 30        # km/h
//!
//! begin stratum
//! level = canopy
//! plant separation = 8.5
//! begin species
//! name = Eucalyptus delegatensis
//! composition = 100
//! ...
//! end species
//! end stratum
//! ```
//!
//! The parser only tokenizes and checks structure; values stay strings
//! until the builder interprets them.

use std::collections::BTreeMap;

use crate::error::{ModelError, Result};

/// One scope's raw assignments: every occurrence of every key, with the
/// line it came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamBlock {
    entries: BTreeMap<String, Vec<(usize, Vec<String>)>>,
}

impl ParamBlock {
    fn insert(&mut self, line: usize, key: String, values: Vec<String>) {
        self.entries.entry(key).or_default().push((line, values));
    }

    /// First value of the first occurrence of `key`.
    pub fn first(&self, key: &str) -> Option<(usize, &str)> {
        self.entries
            .get(key)
            .and_then(|occurrences| occurrences.first())
            .and_then(|(line, values)| values.first().map(|v| (*line, v.as_str())))
    }

    /// All occurrences of `key` with their value lists.
    pub fn all(&self, key: &str) -> &[(usize, Vec<String>)] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A stratum block with its nested species blocks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawStratum {
    pub params: ParamBlock,
    pub species: Vec<ParamBlock>,
}

/// A parsed parameter file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawParams {
    pub site: ParamBlock,
    pub strata: Vec<RawStratum>,
}

const SITE_KEYS: &[&str] = &[
    "fireline length",
    "incident wind speed",
    "slope",
    "surface dead fuel moisture content",
    "fuel load tonnes per hectare",
    "mean fuel diameter",
    "mean fineness leaves",
    "air temperature",
    "overlapping",
];

const STRATUM_KEYS: &[&str] = &["level", "plant separation"];

const SPECIES_KEYS: &[&str] = &[
    "composition",
    "name",
    "live leaf moisture",
    "dead leaf moisture",
    "ignition temperature",
    "silica free ash proportion",
    "proportion dead",
    "leaf form",
    "leaf thickness",
    "leaf width",
    "leaf length",
    "leaf separation",
    "stem order",
    "clump diameter",
    "clump separation",
    "he",
    "ht",
    "hc",
    "hp",
    "w",
];

/// Lowercase with internal whitespace runs collapsed to single spaces.
fn normalize_key(key: &str) -> String {
    key.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Scope {
    Site,
    Stratum,
    Species,
}

/// Parse the text of a parameter file.
pub fn parse(text: &str) -> Result<RawParams> {
    let mut raw = RawParams::default();
    let mut scope = Scope::Site;

    for (idx, full_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = full_line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        match normalize_key(line).as_str() {
            "begin stratum" => {
                if scope != Scope::Site {
                    return Err(ModelError::Params {
                        line: line_no,
                        message: "`begin stratum` inside another block".to_string(),
                    });
                }
                raw.strata.push(RawStratum::default());
                scope = Scope::Stratum;
                continue;
            }
            "end stratum" => {
                if scope != Scope::Stratum {
                    return Err(ModelError::Params {
                        line: line_no,
                        message: "`end stratum` without an open stratum".to_string(),
                    });
                }
                scope = Scope::Site;
                continue;
            }
            "begin species" => {
                if scope != Scope::Stratum {
                    return Err(ModelError::Params {
                        line: line_no,
                        message: "`begin species` outside a stratum block".to_string(),
                    });
                }
                if let Some(stratum) = raw.strata.last_mut() {
                    stratum.species.push(ParamBlock::default());
                }
                scope = Scope::Species;
                continue;
            }
            "end species" => {
                if scope != Scope::Species {
                    return Err(ModelError::Params {
                        line: line_no,
                        message: "`end species` without an open species".to_string(),
                    });
                }
                scope = Scope::Stratum;
                continue;
            }
            _ => {}
        }

        let Some((key_part, value_part)) = line.split_once('=') else {
            return Err(ModelError::Params {
                line: line_no,
                message: format!("expected `key = value`, got `{line}`"),
            });
        };
        let key = normalize_key(key_part);
        let values: Vec<String> = value_part
            .split(',')
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();
        if values.is_empty() {
            return Err(ModelError::Params {
                line: line_no,
                message: format!("`{key}` has no value"),
            });
        }

        let (allowed, block) = match scope {
            Scope::Site => (SITE_KEYS, &mut raw.site),
            Scope::Stratum => (
                STRATUM_KEYS,
                &mut raw
                    .strata
                    .last_mut()
                    .ok_or(ModelError::Params {
                        line: line_no,
                        message: "assignment outside any stratum".to_string(),
                    })?
                    .params,
            ),
            Scope::Species => (
                SPECIES_KEYS,
                raw.strata
                    .last_mut()
                    .and_then(|s| s.species.last_mut())
                    .ok_or(ModelError::Params {
                        line: line_no,
                        message: "assignment outside any species".to_string(),
                    })?,
            ),
        };
        if !allowed.contains(&key.as_str()) {
            return Err(ModelError::Params {
                line: line_no,
                message: format!("unknown parameter `{key}`"),
            });
        }
        block.insert(line_no, key, values);
    }

    if scope != Scope::Site {
        return Err(ModelError::Params {
            line: text.lines().count(),
            message: "unterminated block at end of file".to_string(),
        });
    }
    Ok(raw)
}
