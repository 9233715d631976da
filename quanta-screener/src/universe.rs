//! Instrument universe sources.
//!
//! The universe is the list of suffixed symbols (e.g. `TCS.NS`) considered in
//! one run. The index constituents are downloaded as CSV; when that fails the
//! built-in list is used instead.
//!
//! ```no_run
//! # async fn run() {
//! use quanta_common::Config;
//! use quanta_screener::universe::{load_universe, RemoteUniverse, StaticUniverse};
//!
//! let config = Config::default();
//! let remote = RemoteUniverse::from_config(&config);
//! let fallback = StaticUniverse::new(config.universe.symbol_suffix.clone());
//! let symbols = load_universe(&remote, &fallback).await;
//! # }
//! ```

use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, warn};

use crate::data::ProviderError;

/// Column holding the exchange ticker in the constituents CSV.
const SYMBOL_COLUMN: &str = "Symbol";

/// A source of instrument symbols.
#[async_trait]
pub trait UniverseSource: Send + Sync {
    /// Source name for logging
    fn name(&self) -> &'static str;

    /// Suffixed symbols, in source order.
    async fn symbols(&self) -> Result<Vec<String>, ProviderError>;
}

/// Try `primary`, falling back to `fallback` on any error.
///
/// Never fails; an empty vector is only possible if the fallback itself is empty.
pub async fn load_universe(primary: &dyn UniverseSource, fallback: &dyn UniverseSource) -> Vec<String> {
    match primary.symbols().await {
        Ok(symbols) => {
            info!(source = primary.name(), count = symbols.len(), "Loaded instrument universe");
            symbols
        }
        Err(e) => {
            warn!(
                source = primary.name(),
                fallback = fallback.name(),
                error = %e,
                "Universe fetch failed, using fallback list"
            );
            match fallback.symbols().await {
                Ok(symbols) => symbols,
                Err(e) => {
                    warn!(source = fallback.name(), error = %e, "Fallback universe failed");
                    Vec::new()
                }
            }
        }
    }
}

/// Remove the market suffix (`TCS.NS` → `TCS`).
pub fn strip_suffix<'a>(symbol: &'a str, suffix: &str) -> &'a str {
    if suffix.is_empty() {
        return symbol;
    }
    symbol.strip_suffix(suffix).unwrap_or(symbol)
}

fn with_suffix(bare: &str, suffix: &str) -> String {
    format!("{}{}", bare.trim(), suffix)
}

/// Parse the constituents CSV, reading the `Symbol` column.
pub fn parse_constituents_csv(text: &str, suffix: &str) -> Result<Vec<String>, ProviderError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| ProviderError::Parse(format!("Unreadable CSV header: {e}")))?;
    let column = headers
        .iter()
        .position(|h| h == SYMBOL_COLUMN)
        .ok_or_else(|| ProviderError::Parse(format!("CSV has no '{SYMBOL_COLUMN}' column")))?;

    let mut symbols = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ProviderError::Parse(format!("Bad CSV record: {e}")))?;
        if let Some(bare) = record.get(column).filter(|s| !s.is_empty()) {
            symbols.push(with_suffix(bare, suffix));
        }
    }

    if symbols.is_empty() {
        return Err(ProviderError::DataNotAvailable("Constituents CSV is empty".into()));
    }

    Ok(symbols)
}

// ============================================================================
// Remote Universe
// ============================================================================

/// Index constituents downloaded as CSV.
pub struct RemoteUniverse {
    url: String,
    suffix: String,
    user_agent: String,
    client: reqwest::Client,
}

impl RemoteUniverse {
    pub fn new(
        url: impl Into<String>,
        suffix: impl Into<String>,
        user_agent: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            url: url.into(),
            suffix: suffix.into(),
            user_agent: user_agent.into(),
            client,
        }
    }

    /// Create from config
    pub fn from_config(config: &quanta_common::Config) -> Self {
        Self::new(
            config.universe.csv_url.clone(),
            config.universe.symbol_suffix.clone(),
            config.sources.user_agent.clone(),
            Duration::from_secs(config.universe.timeout_secs),
        )
    }
}

#[async_trait]
impl UniverseSource for RemoteUniverse {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn symbols(&self) -> Result<Vec<String>, ProviderError> {
        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Http {
                status: status.as_u16(),
                body: String::new(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::from_reqwest(&e))?;

        parse_constituents_csv(&text, &self.suffix)
    }
}

// ============================================================================
// Static Universe
// ============================================================================

/// Explicit list of symbols, suffixed on the way out.
pub struct StaticUniverse {
    bare_symbols: Vec<String>,
    suffix: String,
}

impl StaticUniverse {
    /// The built-in Nifty 500 fallback list.
    ///
    /// Maintained by hand; index reconstitutions are not picked up automatically.
    pub fn new(suffix: impl Into<String>) -> Self {
        Self::from_symbols(NIFTY_500_FALLBACK.iter().copied(), suffix)
    }

    /// A caller-supplied list (bare or already suffixed symbols).
    pub fn from_symbols<I, S>(symbols: I, suffix: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let suffix = suffix.into();
        let bare_symbols = symbols
            .into_iter()
            .map(|s| strip_suffix(s.as_ref().trim(), &suffix).to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self { bare_symbols, suffix }
    }

    pub fn len(&self) -> usize {
        self.bare_symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bare_symbols.is_empty()
    }
}

#[async_trait]
impl UniverseSource for StaticUniverse {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn symbols(&self) -> Result<Vec<String>, ProviderError> {
        Ok(self
            .bare_symbols
            .iter()
            .map(|bare| with_suffix(bare, &self.suffix))
            .collect())
    }
}

/// Nifty 500 constituents used when the official list cannot be fetched.
const NIFTY_500_FALLBACK: &[&str] = &[
    "360ONE", "3MINDIA", "ABB", "ACC", "AIAENG", "APLAPOLLO", "AUBANK", "AARTIIND", "AAVAS",
    "ABBOTINDIA", "ADANIENT", "ADANIGREEN", "ADANIPORTS", "ADANIPOWER", "ATGL", "ADANITRANS",
    "ABCAPITAL", "ABFRL", "AEGISCHEM", "AFFLE", "AJANTPHARM", "APLLTD", "ALKEM", "ALKYLAMINE",
    "AMARAJABAT", "AMBER", "AMBUJACEM", "APOLLOHOSP", "APOLLOTYRE", "ASAHIINDIA", "ASHOKLEY",
    "ASIANPAINT", "ASTRAL", "ATUL", "AUROPHARMA", "AVANTIFEED", "DMART", "AXISBANK", "BAJAJ-AUTO",
    "BAJFINANCE", "BAJAJFINSV", "BAJAJHLDNG", "BALKRISIND", "BALRAMCHIN", "BANDHANBNK",
    "BANKBARODA", "BANKINDIA", "MAHABANK", "BATAINDIA", "BAYERCROP", "BERGEPAINT", "BEL",
    "BHARATFORG", "BHEL", "BPCL", "BHARTIARTL", "BIOCON", "BIRLACORPN", "BSOFT", "BLUEDART",
    "BOSCHLTD", "BRITANNIA", "CESC", "CADILAHC", "CANBK", "CANFINHOME", "CASTROLIND", "CEATLTD",
    "CENTURYPLY", "CENTURYTEX", "CERA", "CHALET", "CHAMBLFERT", "CHENNPETRO", "CHOLAFIN", "CIPLA",
    "CUB", "COALINDIA", "COCHINSHIP", "COLPAL", "CONCOR", "COROMANDEL", "CREDITACC", "CRISIL",
    "CROMPTON", "CUMMINSIND", "CYIENT", "DABUR", "DALBHARAT", "DEEPAKNTR", "DELTACORP", "DEVYANI",
    "DIVISLAB", "DIXON", "DLF", "DRREDDY", "ECLERX", "EDELWEISS", "EICHERMOT", "EIDPARRY",
    "EIHOTEL", "ENDURANCE", "ENGINERSIN", "ESCORTS", "EXIDEIND", "FDC", "FEDERALBNK", "FACT",
    "FINCABLES", "FINPIPE", "FORTIS", "GAIL", "GMRINFRA", "GALAXYSURF", "GARFIBRES", "GODFRYPHLP",
    "GODREJAGRO", "GODREJCP", "GODREJIND", "GODREJPROP", "GRANULES", "GRAPHITE", "GRASIM",
    "GESHIP", "GSFC", "GSPL", "GUJALKALI", "GUJGASLTD", "GNFC", "GPPL", "HAVELLS", "HCLTECH",
    "HDFCAMC", "HDFCBANK", "HDFCLIFE", "HEG", "HEROMOTOCO", "HINDALCO", "HINDCOPPER", "HINDPETRO",
    "HINDUNILVR", "HINDZINC", "POWERINDIA", "HONAUT", "HUDCO", "IBULHSGFIN", "ICICIBANK",
    "ICICIGI", "ICICIPRULI", "IDBI", "IDFC", "IDFCFIRSTB", "IFBIND", "INDIAGLYCO", "INDIAMART",
    "INDIANB", "IEX", "INDHOTEL", "INDIGO", "INDUSINDBK", "INDUSTOWER", "NAUKRI", "INFY", "IOB",
    "IPCALAB", "IRB", "IRCON", "ITC", "JSL", "JKCEMENT", "JKLAKSHMI", "JKPAPER", "JMFINANCIL",
    "JSWENERGY", "JSWSTEEL", "JUBILANT", "JUBLFOOD", "JUSTDIAL", "JYOTHYLAB", "KPRMILL", "KEI",
    "KNRCON", "KRBL", "KAJARIACER", "KALPATPOWR", "KALYANKJIL", "KEC", "KOTAKBANK", "L&TFH", "LT",
    "LTIM", "LTTS", "LAURUSLABS", "LAXMIMACH", "LICHSGFIN", "LICI", "LUPIN", "MRF", "MGL", "M&M",
    "M&MFIN", "MANAPPURAM", "MRPL", "MARICO", "MARUTI", "MFSL", "MAXHEALTH", "MAZDOCK", "MEDANTA",
    "METROBRAND", "METROPOLIS", "MOTHERSON", "MPHASIS", "MCX", "MUTHOOTFIN", "NATCOPHARM", "NBCC",
    "NCC", "NESCO", "NESTLEIND", "NAM-INDIA", "NHPC", "NLCINDIA", "NMDC", "NOCIL", "NTPC",
    "OBEROIRLTY", "ONGC", "OFSS", "ORIENTELEC", "PAGEIND", "PERSISTENT", "PETRONET", "PFIZER",
    "PHOENIXLTD", "PIDILITIND", "PEL", "POLYMED", "POONAWALLA", "PFC", "POWERGRID", "PRAJIND",
    "PRESTIGE", "PRINCEPIPE", "PRSMJOHNSN", "PNB", "QUESS", "RBLBANK", "RECLTD", "RITES", "RADICO",
    "RAJESHEXPO", "RALLIS", "RCF", "RATNAMANI", "REDINGTON", "RELAXO", "RELIANCE", "RVNL", "SAIL",
    "SANOFI", "SCHAEFFLER", "SFL", "SHREECEM", "SRF", "SHRIRAMFIN", "SIEMENS", "SOBHA",
    "SOLARINDS", "SONACOMS", "SONATSOFTW", "SBIN", "SBICARD", "SBILIFE", "STARHEALTH", "SJVN",
    "SKFINDIA", "SUNDARMFIN", "SUNDRMFAST", "SUNPHARMA", "SUNTV", "SUPREMEIND", "SUZLON",
    "SYMPHONY", "SYNGENE", "TTKPRESTIG", "TV18BRDCST", "TVSMOTOR", "TANLA", "TATACHEM", "TATACOMM",
    "TCS", "TATACONSUM", "TATAELXSI", "TATAINVEST", "TATAMOTORS", "TATAPOWER", "TATASTEEL",
    "TECHM", "RAMCOCEM", "THERMAX", "TIMKEN", "TITAN", "TORNTPHARM", "TORNTPOWER", "TRENT",
    "TRIDENT", "TRIVENI", "TIINDIA", "UCOBANK", "ULTRACEMCO", "UNIONBANK", "UBL", "UPL", "UTIAMC",
    "VGUARD", "VMART", "VARROC", "VTL", "VEDL", "VENKEYS", "VIJAYA", "VOLTAS", "WELCORP",
    "WELSPUNIND", "WHIRLPOOL", "WIPRO", "YESBANK", "ZEEL", "ZENSARTECH", "ZOMATO", "ZYDUSLIFE",
];
