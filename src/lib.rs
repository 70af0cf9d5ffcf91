//! euro_indicators
//!
//! Fetches socioeconomic indicators for European countries from the World Bank
//! API, builds one immutable long-form table at startup, and answers the
//! dashboard queries over it. Pairs with the `euroind` CLI.
//!
//! ### Features
//! - Paginated, memoized fetching with per-indicator failure isolation
//! - Canonical `(ISO3Code, Country, Year, Value, Indicator)` table
//! - Time series, cross-country comparison and map-snapshot queries
//! - KPI metrics: latest value, year-over-year delta, CAGR, European rank
//! - CSV/JSON export, grouped summary statistics, SVG charts
//!
//! ### Example
//! ```no_run
//! use euro_indicators::{AppConfig, CountryRegistry, Fetcher, IndicatorRegistry};
//! use euro_indicators::{metrics, pipeline};
//!
//! let cfg = AppConfig::default();
//! let fetcher = Fetcher::from_config(&cfg)?;
//! let built = pipeline::build_dataset(
//!     &fetcher,
//!     &CountryRegistry::europe(),
//!     &IndicatorRegistry::dashboard(),
//!     cfg.years,
//!     cfg.per_page,
//! );
//! let m = metrics::compute_metrics(&built.dataset, "GDP per capita (US$)", "Germany", cfg.years);
//! println!("{}", metrics::format_value("GDP per capita (US$)", m.latest_value));
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod dataset;
pub mod error;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod registry;
pub mod stats;
pub mod storage;
pub mod viz;

pub use api::{Fetcher, HttpTransport, RawPage, Transport};
pub use config::AppConfig;
pub use dataset::CanonicalDataset;
pub use error::{FetchError, ShapeError, TransportError};
pub use metrics::MetricsResult;
pub use models::{CanonicalRow, YearRange};
pub use pipeline::{BuildOutput, BuildReport};
pub use registry::{CountryRegistry, IndicatorRegistry};
