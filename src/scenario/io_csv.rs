// Primitives for reading CSV files.

use crate::scenario::{io_common::parse_votes, *};

pub fn read_csv_candidates(
    path: String,
    cfs: &FileSource,
) -> ScenarioResult<Vec<ParsedCandidate>> {
    let party_idx = cfs.party_column_index()?;
    let name_idx = cfs.name_column_index()?;
    let votes_idx = cfs.votes_column_index()?;
    let gender_idx = cfs.gender_column_index()?;
    let first_row = cfs.first_row_index()?;

    let content = fs::read_to_string(&path).context(CsvOpenSnafu { path: path.as_str() })?;
    let mut res: Vec<ParsedCandidate> = Vec::new();
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    for (idx, line_r) in rdr.records().enumerate() {
        let line = line_r.context(CsvLineParseSnafu {})?;
        let lineno = line
            .position()
            .map(|p| line_of_byte(&content, p.byte()))
            .unwrap_or(idx + 1);
        if lineno <= first_row {
            continue;
        }
        debug!("read_csv_candidates: lineno: {:?} row: {:?}", lineno, line);
        // Empty lines at the end of spreadsheets exports.
        if line.iter().all(|s| s.trim().is_empty()) {
            continue;
        }
        let party = line
            .get(party_idx)
            .context(CsvLineTooShortSnafu { lineno })?
            .trim()
            .to_string();
        let name = line
            .get(name_idx)
            .context(CsvLineTooShortSnafu { lineno })?
            .trim()
            .to_string();
        let votes_s = line.get(votes_idx).context(CsvLineTooShortSnafu { lineno })?;
        let votes = parse_votes(votes_s).context(InvalidVoteCountSnafu {
            lineno,
            content: votes_s.to_string(),
        })?;
        let gender = gender_idx
            .and_then(|i| line.get(i))
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());
        res.push(ParsedCandidate {
            party,
            name,
            votes,
            gender,
            lineno,
        });
    }
    Ok(res)
}

/// The 1-based line of the record starting at `byte`. The reader skips
/// blank lines without counting them, so the line is taken from the content.
fn line_of_byte(content: &str, byte: u64) -> usize {
    let bytes = content.as_bytes();
    let mut start = (byte as usize).min(bytes.len());
    // The position may point at the blank lines before the record.
    while start < bytes.len() && (bytes[start] == b'\n' || bytes[start] == b'\r') {
        start += 1;
    }
    bytes[..start].iter().filter(|b| **b == b'\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    fn source(path: &str, extra: &str) -> FileSource {
        serde_json::from_str(&format!(
            r#"{{"provider": "csv", "filePath": {:?}{}}}"#,
            path, extra
        ))
        .unwrap()
    }

    #[test]
    fn default_layout() {
        let f = write_tmp(
            "partido,nome,votos\nPT,ZE,120000\nPT,VOTOS LEGENDA,10.000\n\nPP,ATILA,105000\n",
        );
        let path = f.path().display().to_string();
        let res = read_csv_candidates(path.clone(), &FileSource::new("csv", &path)).unwrap();
        assert_eq!(res.len(), 3);
        assert_eq!(res[0].party, "PT");
        assert_eq!(res[0].lineno, 2);
        assert_eq!(res[1].name, "VOTOS LEGENDA");
        assert_eq!(res[1].votes, 10_000);
        assert_eq!(res[2].lineno, 5);
        assert_eq!(res[2].gender, None);
    }

    #[test]
    fn error_lines_count_blank_lines() {
        let f = write_tmp("partido,nome,votos\n\nPT,ZE,120000\n\r\n\nPT,F COSTA,muitos\n");
        let path = f.path().display().to_string();
        let res = read_csv_candidates(path.clone(), &FileSource::new("csv", &path));
        assert!(matches!(
            res,
            Err(ScenarioError::InvalidVoteCount { lineno: 6, .. })
        ));
    }

    #[test]
    fn first_row_is_a_line_number() {
        let f = write_tmp("Deputado Federal 2026\n\npartido,nome,votos,genero\nPT,ZE,120000,M\n");
        let path = f.path().display().to_string();
        let cfs = source(&path, r#", "firstRowIndex": 4, "genderColumnIndex": 4"#);
        let res = read_csv_candidates(path.clone(), &cfs).unwrap();
        assert_eq!(res.len(), 1);
        assert_eq!(res[0].name, "ZE");
        assert_eq!(res[0].lineno, 4);
        assert_eq!(res[0].gender.as_deref(), Some("M"));
    }

    #[test]
    fn bad_vote_count() {
        let f = write_tmp("partido,nome,votos\nPT,ZE,muitos\n");
        let path = f.path().display().to_string();
        let res = read_csv_candidates(path.clone(), &FileSource::new("csv", &path));
        assert!(matches!(res, Err(ScenarioError::InvalidVoteCount { lineno: 2, .. })));
    }

    #[test]
    fn decimal_vote_count() {
        let f = write_tmp("partido,nome,votos\nPT,ZE,120000.0\nPT,F COSTA,1500.5\n");
        let path = f.path().display().to_string();
        let res = read_csv_candidates(path.clone(), &FileSource::new("csv", &path));
        assert!(matches!(res, Err(ScenarioError::InvalidVoteCount { lineno: 3, .. })));
    }

    #[test]
    fn short_line() {
        let f = write_tmp("partido,nome,votos\nPT,ZE\n");
        let path = f.path().display().to_string();
        let res = read_csv_candidates(path.clone(), &FileSource::new("csv", &path));
        assert!(matches!(res, Err(ScenarioError::CsvLineTooShort { lineno: 2 })));
    }

    #[test]
    fn lines_from_bytes() {
        let content = "a\n\nb\r\nc";
        assert_eq!(line_of_byte(content, 0), 1);
        assert_eq!(line_of_byte(content, 2), 3);
        assert_eq!(line_of_byte(content, 3), 3);
        assert_eq!(line_of_byte(content, 6), 4);
    }
}
