// Primitives for reading Excel (xlsx) candidate lists.

use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::scenario::{io_common::parse_votes, *};

pub fn read_xlsx_candidates(
    path: String,
    cfs: &FileSource,
) -> ScenarioResult<Vec<ParsedCandidate>> {
    let party_idx = cfs.party_column_index()?;
    let name_idx = cfs.name_column_index()?;
    let votes_idx = cfs.votes_column_index()?;
    let gender_idx = cfs.gender_column_index()?;
    let first_row = cfs.first_row_index()?;

    let mut workbook: Xlsx<_> =
        open_workbook(path.as_str()).context(OpeningExcelSnafu { path: path.as_str() })?;
    let wrange = match &cfs.excel_worksheet_name {
        Some(name) => workbook.worksheet_range(name.as_str()),
        None => workbook.worksheet_range_at(0),
    }
    .context(EmptyExcelSnafu { path: path.as_str() })?
    .context(OpeningExcelSnafu { path: path.as_str() })?;

    // The range starts at the first non-empty cell of the sheet.
    let row_start = wrange.start().map(|(r, _)| r as usize).unwrap_or(0);

    let mut res: Vec<ParsedCandidate> = Vec::new();
    for (idx, row) in wrange.rows().enumerate() {
        let lineno = row_start + idx + 1;
        if lineno <= first_row {
            continue;
        }
        debug!("read_xlsx_candidates: lineno: {} row: {:?}", lineno, row);
        if row.iter().all(is_blank) {
            continue;
        }
        let party = read_text(row.get(party_idx), lineno)?;
        let name = read_text(row.get(name_idx), lineno)?;
        let votes = read_votes(row.get(votes_idx), lineno)?;
        let gender = match gender_idx {
            Some(i) => Some(read_text(row.get(i), lineno)?).filter(|s| !s.is_empty()),
            None => None,
        };
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

fn is_blank(cell: &DataType) -> bool {
    match cell {
        DataType::Empty => true,
        DataType::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn read_text(cell: Option<&DataType>, lineno: usize) -> ScenarioResult<String> {
    match cell {
        Some(DataType::String(s)) => Ok(s.trim().to_string()),
        // Numeric party names, like "10".
        Some(DataType::Int(i)) => Ok(i.to_string()),
        Some(DataType::Float(f)) if f.fract() == 0.0 => Ok(format!("{}", *f as i64)),
        Some(DataType::Empty) | None => Ok("".to_string()),
        Some(x) => Err(ScenarioError::ExcelWrongCellType {
            lineno: lineno as u64,
            content: format!("{:?}", x),
        }),
    }
}

fn read_votes(cell: Option<&DataType>, lineno: usize) -> ScenarioResult<i64> {
    match cell {
        Some(DataType::Int(i)) => Ok(*i),
        Some(DataType::Float(f)) if f.is_finite() && f.fract() == 0.0 => Ok(*f as i64),
        Some(DataType::String(s)) => parse_votes(s).context(InvalidVoteCountSnafu {
            lineno,
            content: s.clone(),
        }),
        Some(DataType::Empty) | None => Ok(0),
        Some(x) => Err(ScenarioError::ExcelWrongCellType {
            lineno: lineno as u64,
            content: format!("{:?}", x),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_cells() {
        assert_eq!(read_votes(Some(&DataType::Int(12)), 2).unwrap(), 12);
        assert_eq!(read_votes(Some(&DataType::Float(1500.0)), 2).unwrap(), 1500);
        assert_eq!(
            read_votes(Some(&DataType::String("1.500".to_string())), 2).unwrap(),
            1500
        );
        assert_eq!(read_votes(Some(&DataType::Empty), 2).unwrap(), 0);
        assert!(matches!(
            read_votes(Some(&DataType::Float(1.5)), 3),
            Err(ScenarioError::ExcelWrongCellType { lineno: 3, .. })
        ));
        assert!(matches!(
            read_votes(Some(&DataType::Bool(true)), 4),
            Err(ScenarioError::ExcelWrongCellType { lineno: 4, .. })
        ));
    }

    #[test]
    fn text_cells() {
        assert_eq!(
            read_text(Some(&DataType::String(" PT ".to_string())), 2).unwrap(),
            "PT"
        );
        assert_eq!(read_text(Some(&DataType::Float(10.0)), 2).unwrap(), "10");
        assert_eq!(read_text(None, 2).unwrap(), "");
        assert!(is_blank(&DataType::String("  ".to_string())));
        assert!(!is_blank(&DataType::Int(0)));
    }

    #[test]
    fn missing_file() {
        let res = read_xlsx_candidates(
            "does_not_exist.xlsx".to_string(),
            &FileSource::new("xlsx", "does_not_exist.xlsx"),
        );
        assert!(matches!(res, Err(ScenarioError::OpeningExcel { .. })));
    }
}
