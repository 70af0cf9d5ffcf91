//! Static country and indicator registries.
//!
//! Both keep insertion order so fetches, listings and reports are stable.

use crate::error::RegistryError;
use std::collections::HashMap;

/// European countries covered by the dashboard: display name → ISO3.
pub const EUROPEAN_COUNTRIES: &[(&str, &str)] = &[
    ("Albania", "ALB"),
    ("Austria", "AUT"),
    ("Belarus", "BLR"),
    ("Belgium", "BEL"),
    ("Bosnia and Herzegovina", "BIH"),
    ("Bulgaria", "BGR"),
    ("Croatia", "HRV"),
    ("Cyprus", "CYP"),
    ("Czech Republic", "CZE"),
    ("Denmark", "DNK"),
    ("Estonia", "EST"),
    ("Finland", "FIN"),
    ("France", "FRA"),
    ("Germany", "DEU"),
    ("Greece", "GRC"),
    ("Hungary", "HUN"),
    ("Iceland", "ISL"),
    ("Ireland", "IRL"),
    ("Italy", "ITA"),
    ("Latvia", "LVA"),
    ("Lithuania", "LTU"),
    ("Luxembourg", "LUX"),
    ("Malta", "MLT"),
    ("Moldova", "MDA"),
    ("Montenegro", "MNE"),
    ("Netherlands", "NLD"),
    ("North Macedonia", "MKD"),
    ("Norway", "NOR"),
    ("Poland", "POL"),
    ("Portugal", "PRT"),
    ("Romania", "ROU"),
    ("Russia", "RUS"),
    ("Serbia", "SRB"),
    ("Slovakia", "SVK"),
    ("Slovenia", "SVN"),
    ("Spain", "ESP"),
    ("Sweden", "SWE"),
    ("Switzerland", "CHE"),
    ("Turkey", "TUR"),
    ("Ukraine", "UKR"),
    ("United Kingdom", "GBR"),
];

/// Indicators shown on the dashboard: display name → World Bank indicator code.
pub const DASHBOARD_INDICATORS: &[(&str, &str)] = &[
    ("GDP per capita (US$)", "NY.GDP.PCAP.CD"),
    ("Annual Inflation Rate (%)", "FP.CPI.TOTL.ZG"),
    ("Unemployment Rate (%)", "SL.UEM.TOTL.ZS"),
    ("Life Expectancy (years)", "SP.DYN.LE00.IN"),
    ("Health Expenditure per capita (US$)", "SH.XPD.CHEX.PC.CD"),
    ("Access to Electricity (% of population)", "EG.ELC.ACCS.ZS"),
    ("CO2 Emissions (metric tons per capita)", "EN.ATM.CO2E.PC"),
    ("Internet Users (% of population)", "IT.NET.USER.ZS"),
];

/// Bidirectional display name ↔ ISO3 mapping. Names and codes are unique.
#[derive(Debug, Clone)]
pub struct CountryRegistry {
    entries: Vec<(String, String)>,
    by_name: HashMap<String, usize>,
    by_code: HashMap<String, usize>,
}

impl CountryRegistry {
    pub fn new<N, C>(pairs: impl IntoIterator<Item = (N, C)>) -> Result<Self, RegistryError>
    where
        N: Into<String>,
        C: Into<String>,
    {
        let mut reg = Self {
            entries: Vec::new(),
            by_name: HashMap::new(),
            by_code: HashMap::new(),
        };
        for (name, code) in pairs {
            let (name, code) = (name.into(), code.into());
            if reg.by_name.contains_key(&name) {
                return Err(RegistryError::DuplicateName(name));
            }
            if reg.by_code.contains_key(&code) {
                return Err(RegistryError::DuplicateCode(code));
            }
            let idx = reg.entries.len();
            reg.by_name.insert(name.clone(), idx);
            reg.by_code.insert(code.clone(), idx);
            reg.entries.push((name, code));
        }
        Ok(reg)
    }

    /// The built-in European country set.
    pub fn europe() -> Self {
        Self::new(EUROPEAN_COUNTRIES.iter().copied())
            .expect("built-in country registry has unique names and codes")
    }

    /// ISO3 code for a display name.
    pub fn code_of(&self, name: &str) -> Option<&str> {
        self.by_name.get(name).map(|&i| self.entries[i].1.as_str())
    }

    /// Display name for an ISO3 code.
    pub fn name_of(&self, code: &str) -> Option<&str> {
        self.by_code.get(code).map(|&i| self.entries[i].0.as_str())
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, c)| c.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, c)| (n.as_str(), c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Ordered display name → source indicator code mapping.
#[derive(Debug, Clone)]
pub struct IndicatorRegistry {
    entries: Vec<(String, String)>,
}

impl IndicatorRegistry {
    pub fn new<N, C>(pairs: impl IntoIterator<Item = (N, C)>) -> Result<Self, RegistryError>
    where
        N: Into<String>,
        C: Into<String>,
    {
        let mut entries: Vec<(String, String)> = Vec::new();
        for (name, code) in pairs {
            let name = name.into();
            if entries.iter().any(|(n, _)| *n == name) {
                return Err(RegistryError::DuplicateName(name));
            }
            entries.push((name, code.into()));
        }
        Ok(Self { entries })
    }

    /// The built-in dashboard indicator set.
    pub fn dashboard() -> Self {
        Self::new(DASHBOARD_INDICATORS.iter().copied())
            .expect("built-in indicator registry has unique names")
    }

    pub fn code_of(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.code_of(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, c)| (n.as_str(), c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
