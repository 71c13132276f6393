use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{CacheError, Result};

/// The closed set of analyses whose results can live in the cache.
///
/// Each variant knows its canonical name (the `analysis` field of a result
/// record) and which column of its `data` object holds the sequence name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Analysis {
    SignalP3Nn,
    SignalP3Hmm,
    SignalP4,
    SignalP5,
    SignalP6,
    DeepSig,
    Phobius,
    Tmhmm,
    DeepLoc,
    DeepLoc2,
    TargetPPlant,
    TargetPNonPlant,
    EffectorP1,
    EffectorP2,
    EffectorP3,
    ApoplastP,
    Localizer,
    DeepredeffFungiV1,
    DeepredeffOomyceteV1,
    TmBed,
    Kex2Cutsite,
    RxlrLikeMotif,
    Regex,
    PepStats,
    PfamScan,
    DbCan,
    PhiBase,
    EffectorDb,
}

impl Analysis {
    pub const ALL: [Analysis; 28] = [
        Analysis::SignalP3Nn,
        Analysis::SignalP3Hmm,
        Analysis::SignalP4,
        Analysis::SignalP5,
        Analysis::SignalP6,
        Analysis::DeepSig,
        Analysis::Phobius,
        Analysis::Tmhmm,
        Analysis::DeepLoc,
        Analysis::DeepLoc2,
        Analysis::TargetPPlant,
        Analysis::TargetPNonPlant,
        Analysis::EffectorP1,
        Analysis::EffectorP2,
        Analysis::EffectorP3,
        Analysis::ApoplastP,
        Analysis::Localizer,
        Analysis::DeepredeffFungiV1,
        Analysis::DeepredeffOomyceteV1,
        Analysis::TmBed,
        Analysis::Kex2Cutsite,
        Analysis::RxlrLikeMotif,
        Analysis::Regex,
        Analysis::PepStats,
        Analysis::PfamScan,
        Analysis::DbCan,
        Analysis::PhiBase,
        Analysis::EffectorDb,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Analysis::SignalP3Nn => "signalp3_nn",
            Analysis::SignalP3Hmm => "signalp3_hmm",
            Analysis::SignalP4 => "signalp4",
            Analysis::SignalP5 => "signalp5",
            Analysis::SignalP6 => "signalp6",
            Analysis::DeepSig => "deepsig",
            Analysis::Phobius => "phobius",
            Analysis::Tmhmm => "tmhmm",
            Analysis::DeepLoc => "deeploc",
            Analysis::DeepLoc2 => "deeploc2",
            Analysis::TargetPPlant => "targetp_plant",
            Analysis::TargetPNonPlant => "targetp_non_plant",
            Analysis::EffectorP1 => "effectorp1",
            Analysis::EffectorP2 => "effectorp2",
            Analysis::EffectorP3 => "effectorp3",
            Analysis::ApoplastP => "apoplastp",
            Analysis::Localizer => "localizer",
            Analysis::DeepredeffFungiV1 => "deepredeff_fungi_v1",
            Analysis::DeepredeffOomyceteV1 => "deepredeff_oomycete_v1",
            Analysis::TmBed => "tmbed",
            Analysis::Kex2Cutsite => "kex2_cutsite",
            Analysis::RxlrLikeMotif => "rxlr_like_motif",
            Analysis::Regex => "regex",
            Analysis::PepStats => "pepstats",
            Analysis::PfamScan => "pfamscan",
            Analysis::DbCan => "dbcan",
            Analysis::PhiBase => "phibase",
            Analysis::EffectorDb => "effectordb",
        }
    }

    /// The column of the record's `data` object that holds the sequence name.
    pub fn name_field(&self) -> &'static str {
        match self {
            Analysis::PfamScan | Analysis::DbCan | Analysis::PhiBase | Analysis::EffectorDb => {
                "query"
            }
            _ => "name",
        }
    }

    /// Read the sequence name out of a record's `data` object.
    pub fn get_name<'a>(&self, data: &'a Map<String, Value>) -> Option<&'a str> {
        data.get(self.name_field()).and_then(Value::as_str)
    }

    /// Overwrite the sequence name in a record's `data` object.
    pub fn set_name(&self, data: &mut Map<String, Value>, name: &str) {
        data.insert(
            self.name_field().to_string(),
            Value::String(name.to_string()),
        );
    }
}

impl FromStr for Analysis {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        // older pipelines wrote the non-plant TargetP model without the underscore
        if s == "targetp_nonplant" {
            return Ok(Analysis::TargetPNonPlant);
        }

        Analysis::ALL
            .iter()
            .find(|a| a.as_str() == s)
            .copied()
            .ok_or_else(|| CacheError::UnknownAnalysis(s.to_string()))
    }
}

impl TryFrom<String> for Analysis {
    type Error = CacheError;

    fn try_from(value: String) -> Result<Self> {
        Analysis::from_str(&value)
    }
}

impl From<Analysis> for String {
    fn from(value: Analysis) -> Self {
        value.as_str().to_string()
    }
}

impl Display for Analysis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use serde_json::json;

    #[rstest]
    fn test_names_round_trip() {
        for analysis in Analysis::ALL {
            assert_eq!(Analysis::from_str(analysis.as_str()).unwrap(), analysis);
        }
    }

    #[rstest]
    #[case("phobius", Analysis::Phobius)]
    #[case("targetp_nonplant", Analysis::TargetPNonPlant)]
    #[case("pfamscan", Analysis::PfamScan)]
    fn test_from_str(#[case] name: &str, #[case] expected: Analysis) {
        assert_eq!(name.parse::<Analysis>().unwrap(), expected);
    }

    #[rstest]
    fn test_unknown_analysis() {
        let result = "Phobius".parse::<Analysis>();
        assert!(matches!(result, Err(CacheError::UnknownAnalysis(name)) if name == "Phobius"));
    }

    #[rstest]
    fn test_name_field_substitution() {
        let mut data = json!({"query": "SR001", "hmm": "PF00001"})
            .as_object()
            .unwrap()
            .clone();

        Analysis::PfamScan.set_name(&mut data, "sp|P12345");
        assert_eq!(Analysis::PfamScan.get_name(&data), Some("sp|P12345"));
        assert_eq!(Analysis::Phobius.get_name(&data), None);
    }

    #[rstest]
    fn test_serde() {
        let encoded = serde_json::to_string(&Analysis::SignalP3Nn).unwrap();
        assert_eq!(encoded, "\"signalp3_nn\"");

        let decoded: Analysis = serde_json::from_str("\"tmhmm\"").unwrap();
        assert_eq!(decoded, Analysis::Tmhmm);
        assert!(serde_json::from_str::<Analysis>("\"nope\"").is_err());
    }
}
