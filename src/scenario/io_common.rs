use std::path::Path;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Reads a vote count as typed in a spreadsheet: `120000`, `120.000`,
/// `120 000` or `120000.0`.
///
/// A `.` or `,` followed by exactly three digits separates thousands. Any
/// other `.` or `,` is a decimal mark: the count is accepted only if the
/// decimals are all zeros. A leading minus sign is kept so that the count
/// can be rejected later with the name of the candidate.
pub fn parse_votes(s: &str) -> Option<i64> {
    let t = s.trim();
    let (negative, digits) = match t.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, t),
    };
    let integral = match digits.rfind(|c| c == '.' || c == ',') {
        Some(pos) => {
            let decimals = &digits[pos + 1..];
            let is_group = decimals.len() == 3 && decimals.chars().all(|c| c.is_ascii_digit());
            if is_group {
                digits
            } else if !decimals.is_empty() && decimals.chars().all(|c| c == '0') {
                &digits[..pos]
            } else {
                return None;
            }
        }
        None => digits,
    };
    let groups: Vec<&str> = integral
        .split(|c| matches!(c, '.' | ',' | ' ' | '_' | '\u{a0}'))
        .collect();
    let well_formed = groups
        .iter()
        .enumerate()
        .all(|(idx, g)| match idx {
            0 if groups.len() == 1 => !g.is_empty(),
            0 => !g.is_empty() && g.len() <= 3,
            _ => g.len() == 3,
        })
        && groups.iter().all(|g| g.chars().all(|c| c.is_ascii_digit()));
    if !well_formed {
        return None;
    }
    let v = groups.concat().parse::<i64>().ok()?;
    Some(if negative { -v } else { v })
}

/// Guesses the provider from the extension of the file.
pub fn infer_provider(path: &str) -> Option<&'static str> {
    let ext = Path::new(path)
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());
    match ext.as_deref() {
        Some("csv") => Some("csv"),
        Some("xlsx") => Some("xlsx"),
        _ => None,
    }
}
