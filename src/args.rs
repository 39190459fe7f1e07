use clap::Parser;

/// This is a seat apportionment program (electoral quotient and D'Hondt leftover seats).
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The scenario file, in JSON. It describes the parties, the quotient and
    /// the number of seats. See the manual of the seat_apportionment crate for the format.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) A reference file containing the expected summary in JSON format. If provided, apportion will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary will be written in JSON format to the given
    /// location. Defaults to the standard output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) A file with the candidates and their votes. It is added to the parties
    /// declared in the scenario file, if any.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (csv or xlsx) The type of the input. If not provided, it is inferred from the file extension.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (number) The electoral quotient. Overrides the value of the scenario file.
    #[clap(short, long, value_parser)]
    pub quotient: Option<f64>,

    /// (number, default 8) The number of seats to distribute. Overrides the value of the scenario file.
    #[clap(short, long, value_parser)]
    pub seats: Option<u32>,

    /// (default: first worksheet) When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
