//! Candidate queries produced by the upstream generator

use serde::{Deserialize, Serialize};

/// One structurally valid SQL statement answering a request from one
/// physical table or aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Physical table or aggregate the statement reads from
    #[serde(default)]
    pub table: String,
    /// SQL text, opaque to the engine
    pub sql: String,
    /// Number of fields in the table that the request does not use
    pub unmatched_field_count: u32,
}

impl Candidate {
    /// Creates a candidate
    pub fn new(
        table: impl Into<String>,
        sql: impl Into<String>,
        unmatched_field_count: u32,
    ) -> Self {
        Self {
            table: table.into(),
            sql: sql.into(),
            unmatched_field_count,
        }
    }
}

/// Candidates for one request, in producer order.
///
/// Order matters: the selector breaks ties by position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateSet {
    candidates: Vec<Candidate>,
}

impl CandidateSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style append
    pub fn with_candidate(
        mut self,
        table: impl Into<String>,
        sql: impl Into<String>,
        unmatched_field_count: u32,
    ) -> Self {
        self.push(Candidate::new(table, sql, unmatched_field_count));
        self
    }

    /// Appends a candidate after all existing ones
    pub fn push(&mut self, candidate: Candidate) {
        self.candidates.push(candidate);
    }

    /// Looks up the candidate for a table
    pub fn get(&self, table: &str) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.table == table)
    }

    /// Iterates in producer order
    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

impl From<Vec<Candidate>> for CandidateSet {
    fn from(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }
}

impl FromIterator<Candidate> for CandidateSet {
    fn from_iter<I: IntoIterator<Item = Candidate>>(iter: I) -> Self {
        Self {
            candidates: iter.into_iter().collect(),
        }
    }
}
