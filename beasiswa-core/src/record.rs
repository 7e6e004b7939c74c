//! Input records and the key/label derivations applied to them.
//!
//! A [`RawRecord`] is whatever the data-preparation pipeline handed over, with
//! every field optional. [`RawRecord::validate`] turns it into a
//! [`ScholarshipRecord`], from which node keys and display labels are derived.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::error::{RecordError, RecordSourceError};

/// Prefix of student node keys.
pub const STUDENT_PREFIX: &str = "SISWA_";
/// Prefix of scholarship node keys.
pub const SCHOLARSHIP_PREFIX: &str = "BEASISWA_";
/// Prefix of sentiment bucket labels.
pub const SENTIMENT_PREFIX: &str = "Sentiment_";

/// Sentiment as it appears in the input: numeric in JSON, possibly text in CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScoreField {
    Number(f64),
    Text(String),
}

/// An unvalidated input record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub record_index: Option<u64>,
    #[serde(default)]
    pub scholarship_title: Option<String>,
    #[serde(default)]
    pub fund_type: Option<String>,
    #[serde(default)]
    pub study_level: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub sentiment_score: Option<ScoreField>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_recommended: Option<bool>,
}

/// Eligibility flag as exported by the preparation step: a JSON bool, `0`/`1`,
/// or text such as `True`/`False` in CSV files.
#[derive(Deserialize)]
#[serde(untagged)]
enum FlagField {
    Bool(bool),
    Int(i64),
    Text(String),
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let flag = match Option::<FlagField>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(flag) => flag,
    };
    match flag {
        FlagField::Bool(b) => Ok(Some(b)),
        FlagField::Int(1) => Ok(Some(true)),
        FlagField::Int(0) => Ok(Some(false)),
        FlagField::Int(n) => Err(serde::de::Error::custom(format!(
            "invalid is_recommended value {}",
            n
        ))),
        FlagField::Text(t) => match t.trim().to_lowercase().as_str() {
            "" => Ok(None),
            "true" | "1" => Ok(Some(true)),
            "false" | "0" => Ok(Some(false)),
            _ => Err(serde::de::Error::custom(format!(
                "invalid is_recommended value {:?}",
                t
            ))),
        },
    }
}

/// A validated record, ready for the graph builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScholarshipRecord {
    pub record_index: u64,
    pub scholarship_title: String,
    pub fund_type: String,
    pub study_level: String,
    pub location: String,
    pub sentiment_score: f64,
    pub is_recommended: bool,
}

fn required(value: &Option<String>, field: &'static str) -> Result<String, RecordError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(RecordError::MissingField { field }),
    }
}

impl RawRecord {
    /// Check required fields and parse the sentiment score.
    ///
    /// `is_recommended` defaults to `true` when absent.
    pub fn validate(&self) -> Result<ScholarshipRecord, RecordError> {
        let record_index = self.record_index.ok_or(RecordError::MissingField {
            field: "record_index",
        })?;
        let scholarship_title = required(&self.scholarship_title, "scholarship_title")?;
        let fund_type = required(&self.fund_type, "fund_type")?;
        let study_level = required(&self.study_level, "study_level")?;
        let location = required(&self.location, "location")?;

        let sentiment_score = match &self.sentiment_score {
            None => {
                return Err(RecordError::MissingField {
                    field: "sentiment_score",
                })
            }
            Some(ScoreField::Number(n)) => *n,
            Some(ScoreField::Text(t)) if t.trim().is_empty() => {
                return Err(RecordError::MissingField {
                    field: "sentiment_score",
                })
            }
            Some(ScoreField::Text(t)) => {
                t.trim()
                    .parse::<f64>()
                    .map_err(|_| RecordError::InvalidSentiment { value: t.clone() })?
            }
        };

        if !sentiment_score.is_finite() {
            return Err(RecordError::InvalidSentiment {
                value: sentiment_score.to_string(),
            });
        }
        if !(-1.0..=1.0).contains(&sentiment_score) {
            return Err(RecordError::SentimentOutOfRange {
                value: sentiment_score,
            });
        }

        Ok(ScholarshipRecord {
            record_index,
            scholarship_title,
            fund_type,
            study_level,
            location,
            sentiment_score,
            is_recommended: self.is_recommended.unwrap_or(true),
        })
    }
}

impl From<ScholarshipRecord> for RawRecord {
    fn from(record: ScholarshipRecord) -> Self {
        Self {
            record_index: Some(record.record_index),
            scholarship_title: Some(record.scholarship_title),
            fund_type: Some(record.fund_type),
            study_level: Some(record.study_level),
            location: Some(record.location),
            sentiment_score: Some(ScoreField::Number(record.sentiment_score)),
            is_recommended: Some(record.is_recommended),
        }
    }
}

impl ScholarshipRecord {
    /// Create a recommended record.
    pub fn new(
        record_index: u64,
        scholarship_title: &str,
        fund_type: &str,
        study_level: &str,
        location: &str,
        sentiment_score: f64,
    ) -> Self {
        Self {
            record_index,
            scholarship_title: scholarship_title.to_string(),
            fund_type: fund_type.to_string(),
            study_level: study_level.to_string(),
            location: location.to_string(),
            sentiment_score,
            is_recommended: true,
        }
    }

    /// Set the eligibility flag.
    pub fn with_recommended(mut self, is_recommended: bool) -> Self {
        self.is_recommended = is_recommended;
        self
    }

    pub fn student_key(&self) -> String {
        student_key(self.record_index)
    }

    pub fn scholarship_key(&self) -> String {
        scholarship_key(&self.scholarship_title)
    }

    pub fn fund_label(&self) -> String {
        capitalize(&self.fund_type)
    }

    pub fn level_label(&self) -> String {
        capitalize(&self.study_level)
    }

    pub fn location_label(&self) -> String {
        titlecase(&self.location)
    }

    pub fn sentiment_label(&self) -> String {
        sentiment_label(self.sentiment_score)
    }
}

/// `SISWA_<index>`
pub fn student_key(record_index: u64) -> String {
    format!("{}{}", STUDENT_PREFIX, record_index)
}

/// `BEASISWA_<title>` with every whitespace character replaced by `_`.
pub fn scholarship_key(title: &str) -> String {
    let normalized: String = title
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    format!("{}{}", SCHOLARSHIP_PREFIX, normalized)
}

/// First character upper-cased, the rest lower-cased.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Upper-case every letter that follows a non-letter, lower-case the others.
pub fn titlecase(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Bucket a score to two decimals: `0.4249` → `Sentiment_0.42`.
///
/// Rounds the exact binary value half-to-even, so `0.125` and `0.015` land in
/// `Sentiment_0.12` and `Sentiment_0.01`.
pub fn sentiment_label(score: f64) -> String {
    let mut rounded: f64 = format!("{:.2}", score).parse().unwrap_or(score);
    if rounded == 0.0 {
        // folds -0.0 into 0.0
        rounded = 0.0;
    }
    format!("{}{:?}", SENTIMENT_PREFIX, rounded)
}

/// One decoded row: either a record or the reason it could not be decoded.
pub type RecordRow = Result<RawRecord, RecordError>;

/// Read a batch of records, choosing the format by file extension.
///
/// - `.json`: a single array of objects
/// - `.jsonl` / `.ndjson`: one object per line, blank lines ignored
/// - `.csv`: header row naming the record fields
///
/// Rows that fail to decode are returned as [`RecordError::Undecodable`] so the
/// builder's malformed-record policy decides what happens to them.
pub fn read_records(path: &Path) -> Result<Vec<RecordRow>, RecordSourceError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("json") => read_json(File::open(path)?),
        Some("jsonl") | Some("ndjson") => read_json_lines(BufReader::new(File::open(path)?)),
        Some("csv") => read_csv(File::open(path)?),
        _ => Err(RecordSourceError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Decode a JSON array of record objects.
pub fn read_json<R: Read>(reader: R) -> Result<Vec<RecordRow>, RecordSourceError> {
    let values: Vec<serde_json::Value> = serde_json::from_reader(reader)?;
    Ok(values
        .into_iter()
        .map(|v| {
            serde_json::from_value(v).map_err(|e| RecordError::Undecodable {
                message: e.to_string(),
            })
        })
        .collect())
}

/// Decode newline-delimited JSON records.
pub fn read_json_lines<R: BufRead>(reader: R) -> Result<Vec<RecordRow>, RecordSourceError> {
    let mut rows = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        rows.push(
            serde_json::from_str(&line).map_err(|e| RecordError::Undecodable {
                message: e.to_string(),
            }),
        );
    }
    Ok(rows)
}

/// Decode CSV records with a header row.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<RecordRow>, RecordSourceError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    rdr.headers()?;
    Ok(rdr
        .deserialize::<RawRecord>()
        .map(|row| {
            row.map_err(|e| RecordError::Undecodable {
                message: e.to_string(),
            })
        })
        .collect())
}
