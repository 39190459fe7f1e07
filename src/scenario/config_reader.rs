use crate::scenario::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioCandidate {
    pub name: String,
    pub votes: i64,
    pub gender: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioParty {
    pub name: String,
    #[serde(rename = "listVotes")]
    pub list_votes: Option<i64>,
    #[serde(default)]
    pub candidates: Vec<ScenarioCandidate>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "partyColumnIndex")]
    _party_column_index: Option<JSValue>,
    #[serde(rename = "nameColumnIndex")]
    _name_column_index: Option<JSValue>,
    #[serde(rename = "votesColumnIndex")]
    _votes_column_index: Option<JSValue>,
    #[serde(rename = "genderColumnIndex")]
    _gender_column_index: Option<JSValue>,
    #[serde(rename = "firstRowIndex")]
    _first_row_index: Option<JSValue>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

impl FileSource {
    /// A source with the default layout: party, name, votes, and a header line.
    pub fn new(provider: &str, file_path: &str) -> FileSource {
        FileSource {
            provider: provider.to_string(),
            file_path: file_path.to_string(),
            _party_column_index: None,
            _name_column_index: None,
            _votes_column_index: None,
            _gender_column_index: None,
            _first_row_index: None,
            excel_worksheet_name: None,
        }
    }

    // All the indices are 1-based in the file and 0-based here.

    pub fn party_column_index(&self) -> ScenarioResult<usize> {
        read_js_index(&self._party_column_index, 1)
    }

    pub fn name_column_index(&self) -> ScenarioResult<usize> {
        read_js_index(&self._name_column_index, 2)
    }

    pub fn votes_column_index(&self) -> ScenarioResult<usize> {
        read_js_index(&self._votes_column_index, 3)
    }

    /// No gender column unless one is given.
    pub fn gender_column_index(&self) -> ScenarioResult<Option<usize>> {
        match &self._gender_column_index {
            None => Ok(None),
            x => read_js_index(x, 0).map(Some),
        }
    }

    /// The first line with data. The default skips a header line.
    pub fn first_row_index(&self) -> ScenarioResult<usize> {
        read_js_index(&self._first_row_index, 2)
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(rename = "contestName")]
    pub contest_name: Option<String>,
    pub quotient: Option<f64>,
    pub seats: Option<u32>,
    #[serde(rename = "eligibilityPercent")]
    pub eligibility_percent: Option<u32>,
    #[serde(rename = "tiebreakMode")]
    pub tiebreak_mode: Option<String>,
    #[serde(rename = "randomSeed")]
    pub random_seed: Option<JSValue>,
    #[serde(rename = "partyOrder")]
    pub party_order: Option<Vec<String>>,
    #[serde(default)]
    pub parties: Vec<ScenarioParty>,
    #[serde(rename = "candidateFileSources", default)]
    pub candidate_file_sources: Vec<FileSource>,
}

impl ScenarioConfig {
    pub fn empty() -> ScenarioConfig {
        ScenarioConfig {
            contest_name: None,
            quotient: None,
            seats: None,
            eligibility_percent: None,
            tiebreak_mode: None,
            random_seed: None,
            party_order: None,
            parties: Vec::new(),
            candidate_file_sources: Vec::new(),
        }
    }
}

pub fn read_config(path: &str) -> ScenarioResult<ScenarioConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: ScenarioConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> ScenarioResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    debug!("read content: {:?}", contents);
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    Ok(js)
}

/// Reads a 1-based index, written as a number or a string.
fn read_js_index(x: &Option<JSValue>, default: usize) -> ScenarioResult<usize> {
    let idx: usize = match x {
        None => default,
        Some(JSValue::Number(n)) => n
            .as_u64()
            .map(|x| x as usize)
            .context(ParsingJsonNumberSnafu {})?,
        Some(JSValue::String(s)) => s.parse::<usize>().ok().context(ParsingJsonNumberSnafu {})?,
        _ => None.context(ParsingJsonNumberSnafu {})?,
    };
    if idx == 0 {
        return None.context(ParsingJsonNumberSnafu {});
    }
    Ok(idx - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_from_numbers_and_strings() {
        let fs: FileSource = serde_json::from_str(
            r#"{"provider": "csv", "filePath": "a.csv", "partyColumnIndex": "2", "nameColumnIndex": 3, "votesColumnIndex": 1}"#,
        )
        .unwrap();
        assert_eq!(fs.party_column_index().unwrap(), 1);
        assert_eq!(fs.name_column_index().unwrap(), 2);
        assert_eq!(fs.votes_column_index().unwrap(), 0);
        assert_eq!(fs.first_row_index().unwrap(), 1);
        assert_eq!(fs.gender_column_index().unwrap(), None);
    }

    #[test]
    fn gender_column() {
        let fs: FileSource = serde_json::from_str(
            r#"{"provider": "csv", "filePath": "a.csv", "genderColumnIndex": 4}"#,
        )
        .unwrap();
        assert_eq!(fs.gender_column_index().unwrap(), Some(3));
    }

    #[test]
    fn zero_index_is_rejected() {
        let fs: FileSource = serde_json::from_str(
            r#"{"provider": "csv", "filePath": "a.csv", "votesColumnIndex": 0}"#,
        )
        .unwrap();
        assert!(fs.votes_column_index().is_err());
    }

    #[test]
    fn minimal_config() {
        let c: ScenarioConfig = serde_json::from_str(
            r#"{"quotient": 190000, "parties": [{"name": "PT", "candidates": [{"name": "ZE", "votes": 1}]}]}"#,
        )
        .unwrap();
        assert_eq!(c.quotient, Some(190_000.0));
        assert_eq!(c.parties[0].list_votes, None);
        assert!(c.candidate_file_sources.is_empty());
    }
}
