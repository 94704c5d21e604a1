// Loader - IPUMS CPS/ASEC extract → normalized person records
// Fetches the gzipped CSV, decodes it, and cleans the raw survey fields

use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use serde::Deserialize;
use std::io::Read;

/// IPUMS extract published alongside the state child allowance analysis.
pub const DATA_URL: &str =
    "https://github.com/ngpsu22/State_Child_Allowance_Income_Tax/raw/master/cps_00022.csv.gz";

/// Missing-value sentinels in the IPUMS income fields.
const TAXINC_MISSING: f64 = 9_999_999.0;
const ADJGINC_MISSING: f64 = 99_999_999.0;

/// The extract pools three survey years; weights are divided down so
/// weighted totals represent a single year.
const POOLED_YEARS: f64 = 3.0;

/// One respondent-year observation from the CPS/ASEC extract.
#[derive(Debug, Deserialize, Clone)]
pub struct PersonRecord {
    #[serde(rename = "YEAR")]
    pub year: u16,

    #[serde(rename = "STATEFIP")]
    pub statefip: u8,

    #[serde(rename = "AGE")]
    pub age: u8,

    /// Person-level survey weight.
    #[serde(rename = "ASECWT")]
    pub asecwt: f64,

    /// SPM unit (resource) weight, repeated on every member row.
    #[serde(rename = "SPMWT")]
    pub spmwt: f64,

    #[serde(rename = "TAXINC")]
    pub taxinc: f64,

    #[serde(rename = "ADJGINC")]
    pub adjginc: f64,

    /// SPM family unit identifier; the household grouping key.
    #[serde(rename = "SPMFAMUNIT")]
    pub spmfamunit: u64,

    /// Total SPM unit resources, repeated on every member row.
    #[serde(rename = "SPMTOTRES")]
    pub spmtotres: f64,

    // Derived during normalization
    #[serde(skip)]
    pub state: String,

    #[serde(skip)]
    pub child: bool,
}

impl PersonRecord {
    /// Clean a raw row: zero out missing-value sentinels, divide the pooled
    /// weights down to one year, and derive the child flag and state name.
    fn normalize(&mut self) -> Result<()> {
        if self.taxinc == TAXINC_MISSING {
            self.taxinc = 0.0;
        }
        if self.adjginc == ADJGINC_MISSING {
            self.adjginc = 0.0;
        }
        self.asecwt /= POOLED_YEARS;
        self.spmwt /= POOLED_YEARS;
        self.child = self.age < 18;
        self.state = match state_name(self.statefip) {
            Some(name) => name.to_string(),
            None => bail!("Unknown STATEFIP code {}", self.statefip),
        };
        Ok(())
    }
}

/// Parse person records from an uncompressed CSV stream.
pub fn read_persons<R: Read>(reader: R) -> Result<Vec<PersonRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut persons = Vec::new();

    for result in rdr.deserialize() {
        let mut person: PersonRecord = result.context("Failed to deserialize person record")?;
        person.normalize()?;
        persons.push(person);
    }

    Ok(persons)
}

/// Fetch the gzipped extract over HTTPS and parse it. Not retried; a failed
/// fetch fails the run.
pub fn fetch_persons(url: &str) -> Result<Vec<PersonRecord>> {
    let response = reqwest::blocking::get(url)
        .with_context(|| format!("Failed to fetch {}", url))?
        .error_for_status()
        .context("Source dataset request failed")?;

    read_persons(GzDecoder::new(response))
}

/// Full state name for a census FIPS code (50 states plus DC).
fn state_name(fips: u8) -> Option<&'static str> {
    let name = match fips {
        1 => "Alabama",
        2 => "Alaska",
        4 => "Arizona",
        5 => "Arkansas",
        6 => "California",
        8 => "Colorado",
        9 => "Connecticut",
        10 => "Delaware",
        11 => "District of Columbia",
        12 => "Florida",
        13 => "Georgia",
        15 => "Hawaii",
        16 => "Idaho",
        17 => "Illinois",
        18 => "Indiana",
        19 => "Iowa",
        20 => "Kansas",
        21 => "Kentucky",
        22 => "Louisiana",
        23 => "Maine",
        24 => "Maryland",
        25 => "Massachusetts",
        26 => "Michigan",
        27 => "Minnesota",
        28 => "Mississippi",
        29 => "Missouri",
        30 => "Montana",
        31 => "Nebraska",
        32 => "Nevada",
        33 => "New Hampshire",
        34 => "New Jersey",
        35 => "New Mexico",
        36 => "New York",
        37 => "North Carolina",
        38 => "North Dakota",
        39 => "Ohio",
        40 => "Oklahoma",
        41 => "Oregon",
        42 => "Pennsylvania",
        44 => "Rhode Island",
        45 => "South Carolina",
        46 => "South Dakota",
        47 => "Tennessee",
        48 => "Texas",
        49 => "Utah",
        50 => "Vermont",
        51 => "Virginia",
        53 => "Washington",
        54 => "West Virginia",
        55 => "Wisconsin",
        56 => "Wyoming",
        _ => return None,
    };
    Some(name)
}
