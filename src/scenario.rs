pub mod config_reader;
mod io_common;
mod io_csv;
mod io_xlsx;

use log::{debug, info, warn};

use seat_apportionment::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

pub use crate::scenario::config_reader::*;

#[derive(Debug, Snafu)]
pub enum ScenarioError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error serializing the summary"))]
    WritingJson { source: serde_json::Error },
    #[snafu(display("Error writing the summary to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("No worksheet found in {path}"))]
    EmptyExcel { path: String },
    #[snafu(display("Unexpected cell at line {lineno}: {content}"))]
    ExcelWrongCellType { lineno: u64, content: String },
    #[snafu(display("Error reading file {path}"))]
    CsvOpen {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading a CSV line"))]
    CsvLineParse { source: csv::Error },
    #[snafu(display("Line {lineno} is too short"))]
    CsvLineTooShort { lineno: usize },
    #[snafu(display("Invalid vote count at line {lineno}: {content:?}"))]
    InvalidVoteCount { lineno: usize, content: String },
    #[snafu(display("Missing party name at line {lineno}"))]
    MissingPartyName { lineno: usize },
    #[snafu(display("Expected a positive integer"))]
    ParsingJsonNumber {},
    #[snafu(display("The scenario file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("No quotient given, in the scenario file or with --quotient"))]
    MissingQuotient {},
    #[snafu(display("The scenario has no party"))]
    EmptyScenario {},
    #[snafu(display("Apportionment failed: {source}"))]
    Apportionment { source: ApportionmentErrors },
    #[snafu(display("Difference detected between calculated summary and reference summary"))]
    ReferenceMismatch {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ScenarioResult<T> = Result<T, ScenarioError>;

/// A candidate line, as read from a CSV or Excel file.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedCandidate {
    pub party: String,
    pub name: String,
    pub votes: i64,
    pub gender: Option<String>,
    /// 1-based line in the source file.
    pub lineno: usize,
}

/// Values passed on the command line. They take precedence over the
/// scenario file.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct ScenarioOverrides {
    pub input: Option<String>,
    pub input_type: Option<String>,
    pub quotient: Option<f64>,
    pub seats: Option<u32>,
    pub excel_worksheet_name: Option<String>,
}

fn validate_rules(
    config: &ScenarioConfig,
    overrides: &ScenarioOverrides,
) -> ScenarioResult<ApportionmentRules> {
    let defaults = ApportionmentRules::DEFAULT_RULES;
    let res = ApportionmentRules {
        seat_budget: overrides
            .seats
            .or(config.seats)
            .unwrap_or(defaults.seat_budget),
        eligibility_percent: config
            .eligibility_percent
            .unwrap_or(defaults.eligibility_percent),
        tiebreak_mode: match config.tiebreak_mode.as_deref() {
            None | Some("partyName") => TieBreakMode::PartyName,
            Some("higherVotes") => TieBreakMode::HigherVotes,
            Some("random") => {
                let seed = match &config.random_seed {
                    Some(JSValue::Number(n)) => n.as_u64().and_then(|x| u32::try_from(x).ok()),
                    Some(JSValue::String(s)) => s.parse::<u32>().ok(),
                    _ => None,
                };
                match seed {
                    Some(x) => TieBreakMode::Random(x),
                    None => {
                        whatever!(
                            "Tiebreak mode random needs a randomSeed, got {:?}",
                            config.random_seed
                        )
                    }
                }
            }
            Some(x) => {
                whatever!("Cannot use tiebreak mode {:?} (currently not implemented)", x)
            }
        },
    };
    Ok(res)
}

fn read_candidate_data(path: String, cfs: &FileSource) -> ScenarioResult<Vec<ParsedCandidate>> {
    info!("Attempting to read candidate file {:?}", path);
    let parsed = match cfs.provider.as_str() {
        "csv" => io_csv::read_csv_candidates(path, cfs),
        "xlsx" => io_xlsx::read_xlsx_candidates(path, cfs),
        x => whatever!("Provider not implemented {:?}", x),
    }?;
    debug!(
        "read_candidate_data: {} lines from {}",
        parsed.len(),
        io_common::simplify_file_name(cfs.file_path.as_str())
    );
    Ok(parsed)
}

/// Builds the party snapshot. Parties declared in the scenario come first,
/// in their order. The parties only found in candidate files follow, in
/// order of first appearance.
fn assemble_parties(
    declared: &[ScenarioParty],
    parsed: &[ParsedCandidate],
) -> ScenarioResult<Vec<Party>> {
    let mut parties: Vec<Party> = declared
        .iter()
        .map(|sp| Party {
            name: sp.name.clone(),
            candidates: sp
                .candidates
                .iter()
                .map(|c| Candidate {
                    name: c.name.clone(),
                    votes: c.votes,
                    gender: c.gender.clone(),
                })
                .collect(),
            list_votes: sp.list_votes.unwrap_or(0),
        })
        .collect();

    for pc in parsed.iter() {
        ensure!(
            !pc.party.is_empty(),
            MissingPartyNameSnafu { lineno: pc.lineno }
        );
        let candidate = Candidate {
            name: pc.name.clone(),
            votes: pc.votes,
            gender: pc.gender.clone(),
        };
        match parties.iter_mut().find(|p| p.name == pc.party) {
            Some(p) => p.candidates.push(candidate),
            None => {
                let mut p = Party::new(pc.party.as_str());
                p.candidates.push(candidate);
                parties.push(p);
            }
        }
    }
    Ok(parties)
}

fn format_quotient(x: f64) -> String {
    if x.fract() == 0.0 {
        format!("{:.0}", x)
    } else {
        format!("{:.2}", x)
    }
}

fn seat_type_js(st: SeatType) -> &'static str {
    match st {
        SeatType::Direct => "direct",
        SeatType::Remainder => "remainder",
    }
}

fn condition_to_json(c: &Condition) -> JSValue {
    match c {
        Condition::DirectSeatOverflow {
            direct_seats,
            seat_budget,
        } => json!({
            "type": "directSeatOverflow",
            "directSeats": direct_seats,
            "seatBudget": seat_budget
        }),
        Condition::NoEligibleParties => json!({ "type": "noEligibleParties" }),
        Condition::SeatsExceedCandidates {
            party,
            seats,
            candidates,
        } => json!({
            "type": "seatsExceedCandidates",
            "party": party,
            "seats": seats,
            "candidates": candidates
        }),
    }
}

// The averages are written as strings with two decimals, so that the
// summaries can be compared as text.
fn build_summary_js(
    config: &ScenarioConfig,
    res: &ApportionmentResult,
    party_order: &[String],
) -> JSValue {
    let report = order_results(res, party_order);

    let parties: Vec<JSValue> = report
        .parties
        .iter()
        .map(|p| {
            let history: Vec<String> = p
                .quotient_history
                .iter()
                .map(|q| format!("{:.2}", q))
                .collect();
            json!({
                "name": p.name,
                "candidateVotes": p.candidate_votes,
                "listVotes": p.list_votes,
                "totalVotes": p.total_votes,
                "eligible": p.eligible,
                "projectedSeats": format!("{:.2}", p.projected_seats),
                "directSeats": p.direct_seats,
                "remainderSeats": p.remainder_seats,
                "totalSeats": p.total_seats,
                "quotientHistory": history
            })
        })
        .collect();

    let elected: Vec<JSValue> = report
        .elected
        .iter()
        .map(|e| {
            json!({
                "party": e.party,
                "name": e.name,
                "votes": e.votes,
                "rank": e.rank_within_party + 1,
                "seatType": seat_type_js(e.seat_type),
                "gender": e.gender
            })
        })
        .collect();

    let rounds: Vec<JSValue> = res
        .rounds
        .iter()
        .map(|r| {
            json!({
                "round": r.round,
                "party": r.party,
                "quotient": format!("{:.2}", r.winning_quotient),
                "seatNumber": r.seat_number_awarded,
                "tie": r.tie
            })
        })
        .collect();

    let conditions: Vec<JSValue> = res.conditions.iter().map(condition_to_json).collect();

    json!({
        "config": {
            "contest": config.contest_name.clone().unwrap_or_default(),
            "quotient": format_quotient(res.quotient),
            "seats": res.seat_budget,
            "threshold": format!("{:.2}", res.eligibility_threshold)
        },
        "results": {
            "parties": parties,
            "elected": elected,
            "rounds": rounds,
            "seatsAwarded": res.seats_awarded,
            "seatDeficit": res.seat_deficit,
            "conditions": conditions
        }
    })
}

/// Runs one scenario and writes the summary.
///
/// Arguments:
/// * `config_path` the scenario file. Without it, the candidates must come from `overrides.input`.
/// * `overrides` the values given on the command line
/// * `out_path` where to write the summary. `None` or `stdout` for the standard output.
/// * `check_summary_path` a reference summary. The run fails if the summary differs.
pub fn run_scenario(
    config_path: Option<String>,
    overrides: &ScenarioOverrides,
    out_path: Option<String>,
    check_summary_path: Option<String>,
) -> ScenarioResult<()> {
    let (config, root_p): (ScenarioConfig, PathBuf) = match &config_path {
        Some(p) => {
            let config = read_config(p)?;
            let root = Path::new(p.as_str())
                .parent()
                .context(MissingParentDirSnafu {})?;
            (config, root.to_path_buf())
        }
        None => (ScenarioConfig::empty(), PathBuf::new()),
    };
    info!("config: {:?}", config);

    let rules = validate_rules(&config, overrides)?;
    let quotient = overrides
        .quotient
        .or(config.quotient)
        .context(MissingQuotientSnafu {})?;

    let mut parsed: Vec<ParsedCandidate> = Vec::new();
    for cfs in config.candidate_file_sources.iter() {
        let p: PathBuf = root_p.join(cfs.file_path.as_str());
        let mut file_data = read_candidate_data(p.display().to_string(), cfs)?;
        parsed.append(&mut file_data);
    }
    // The file given on the command line is relative to the working directory.
    if let Some(input) = &overrides.input {
        let provider = match overrides.input_type.as_deref() {
            Some(x) => x,
            None => match io_common::infer_provider(input) {
                Some(x) => x,
                None => whatever!("Cannot infer the type of {:?}, use --input-type", input),
            },
        };
        let mut cfs = FileSource::new(provider, input);
        cfs.excel_worksheet_name = overrides.excel_worksheet_name.clone();
        let mut file_data = read_candidate_data(input.clone(), &cfs)?;
        parsed.append(&mut file_data);
    }

    let parties = assemble_parties(&config.parties, &parsed)?;
    ensure!(!parties.is_empty(), EmptyScenarioSnafu {});

    let result = compute_apportionment(&parties, quotient, &rules).context(ApportionmentSnafu {})?;
    debug!("result: {:?}", result);
    for c in result.conditions.iter() {
        warn!("Incomplete apportionment: {:?}", c);
    }

    let party_order: Vec<String> = match &config.party_order {
        Some(order) => order.clone(),
        None => parties.iter().map(|p| p.name.clone()).collect(),
    };

    // Assemble the final json
    let result_js = build_summary_js(&config, &result, &party_order);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(WritingJsonSnafu {})?;

    match out_path.as_deref() {
        None | Some("stdout") => println!("{}", pretty_js_stats),
        Some(p) => {
            info!("Writing summary to {:?}", p);
            fs::write(p, &pretty_js_stats).context(WritingOutputSnafu { path: p })?;
        }
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = check_summary_path {
        let summary_ref = read_summary(summary_p.as_str())?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(WritingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_str(),
                "\n",
            );
            return ReferenceMismatchSnafu {}.fail();
        }
        info!("Summary matches the reference {:?}", summary_p);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use snafu::ErrorCompat;

    fn demo_path(name: &str) -> String {
        format!("{}/demos/{}", env!("CARGO_MANIFEST_DIR"), name)
    }

    fn run_demo(config: &str, overrides: &ScenarioOverrides) -> ScenarioResult<()> {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("summary.json").display().to_string();
        let res = run_scenario(
            Some(demo_path(config)),
            overrides,
            Some(out),
            Some(demo_path("chapas_2026_expected_summary.json")),
        );
        if let Err(e) = &res {
            eprintln!("An error occurred {}", e);
            if let Some(bt) = ErrorCompat::backtrace(e) {
                eprintln!("trace: {}", bt);
            }
        }
        res
    }

    fn write_config(dir: &tempfile::TempDir, content: &str) -> String {
        let p = dir.path().join("scenario.json");
        fs::write(&p, content).unwrap();
        p.display().to_string()
    }

    #[test]
    fn demo_inline_parties() {
        assert!(run_demo("chapas_2026.json", &ScenarioOverrides::default()).is_ok());
    }

    #[test]
    fn demo_csv_file() {
        assert!(run_demo("chapas_2026_csv.json", &ScenarioOverrides::default()).is_ok());
    }

    #[test]
    fn overrides_change_the_summary() {
        let overrides = ScenarioOverrides {
            seats: Some(9),
            ..ScenarioOverrides::default()
        };
        let res = run_demo("chapas_2026.json", &overrides);
        assert!(matches!(res, Err(ScenarioError::ReferenceMismatch {})));
    }

    #[test]
    fn csv_input_on_command_line() {
        // Same candidates as the reference, but no party order and no gender
        // column: the elected list follows the file order, which is the same.
        let dir = tempfile::tempdir().unwrap();
        let config = write_config(
            &dir,
            r#"{"contestName": "Deputado Federal 2026", "quotient": 190000}"#,
        );
        let out = dir.path().join("summary.json").display().to_string();
        let overrides = ScenarioOverrides {
            input: Some(demo_path("chapas_2026.csv")),
            ..ScenarioOverrides::default()
        };
        run_scenario(Some(config), &overrides, Some(out.clone()), None).unwrap();

        let summary = read_summary(out.as_str()).unwrap();
        let reference = read_summary(&demo_path("chapas_2026_expected_summary.json")).unwrap();
        assert_eq!(summary["config"], reference["config"]);
        assert_eq!(summary["results"]["parties"], reference["results"]["parties"]);
        assert_eq!(summary["results"]["rounds"], reference["results"]["rounds"]);
        let elected = |js: &JSValue| -> Vec<String> {
            js["results"]["elected"]
                .as_array()
                .unwrap()
                .iter()
                .map(|e| e["name"].as_str().unwrap().to_string())
                .collect()
        };
        assert_eq!(elected(&summary), elected(&reference));
        assert_eq!(summary["results"]["elected"][0]["gender"], JSValue::Null);
    }

    #[test]
    fn missing_quotient() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_config(
            &dir,
            r#"{"parties": [{"name": "A", "candidates": [{"name": "X", "votes": 10}]}]}"#,
        );
        let res = run_scenario(
            Some(config),
            &ScenarioOverrides::default(),
            Some("stdout".to_string()),
            None,
        );
        assert!(matches!(res, Err(ScenarioError::MissingQuotient {})));
    }

    #[test]
    fn empty_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_config(&dir, r#"{"quotient": 1000}"#);
        let res = run_scenario(Some(config), &ScenarioOverrides::default(), None, None);
        assert!(matches!(res, Err(ScenarioError::EmptyScenario {})));
    }

    #[test]
    fn negative_votes_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_config(
            &dir,
            r#"{"quotient": 1000, "parties": [{"name": "A", "candidates": [{"name": "X", "votes": -1}]}]}"#,
        );
        let res = run_scenario(Some(config), &ScenarioOverrides::default(), None, None);
        assert!(matches!(
            res,
            Err(ScenarioError::Apportionment {
                source: ApportionmentErrors::InvalidVotes { .. }
            })
        ));
    }

    #[test]
    fn tiebreak_modes() {
        let mut config = ScenarioConfig::empty();
        let overrides = ScenarioOverrides::default();
        assert_eq!(
            validate_rules(&config, &overrides).unwrap(),
            ApportionmentRules::DEFAULT_RULES
        );

        config.tiebreak_mode = Some("higherVotes".to_string());
        assert_eq!(
            validate_rules(&config, &overrides).unwrap().tiebreak_mode,
            TieBreakMode::HigherVotes
        );

        config.tiebreak_mode = Some("random".to_string());
        assert!(validate_rules(&config, &overrides).is_err());
        config.random_seed = Some(json!("42"));
        assert_eq!(
            validate_rules(&config, &overrides).unwrap().tiebreak_mode,
            TieBreakMode::Random(42)
        );

        config.tiebreak_mode = Some("coinFlip".to_string());
        assert!(validate_rules(&config, &overrides).is_err());
    }

    #[test]
    fn file_parties_follow_declared_ones() {
        let declared = vec![ScenarioParty {
            name: "PT".to_string(),
            list_votes: Some(10),
            candidates: vec![],
        }];
        let parsed = vec![
            ParsedCandidate {
                party: "PP".to_string(),
                name: "ATILA".to_string(),
                votes: 5,
                gender: None,
                lineno: 2,
            },
            ParsedCandidate {
                party: "PT".to_string(),
                name: "ZE".to_string(),
                votes: 7,
                gender: Some("M".to_string()),
                lineno: 3,
            },
        ];
        let parties = assemble_parties(&declared, &parsed).unwrap();
        let names: Vec<&str> = parties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["PT", "PP"]);
        assert_eq!(parties[0].list_votes, 10);
        assert_eq!(parties[0].candidates[0].name, "ZE");
        assert_eq!(parties[0].candidates[0].gender.as_deref(), Some("M"));

        let unnamed = vec![ParsedCandidate {
            party: "".to_string(),
            name: "X".to_string(),
            votes: 1,
            gender: None,
            lineno: 4,
        }];
        assert!(matches!(
            assemble_parties(&[], &unnamed),
            Err(ScenarioError::MissingPartyName { lineno: 4 })
        ));
    }
}
