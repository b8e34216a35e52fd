use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Outcome of a single mutant, per the mutation testing report schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutantStatus {
    Killed,
    Survived,
    NoCoverage,
    Timeout,
    CompileError,
    RuntimeError,
    Ignored,
    Pending,
}

impl MutantStatus {
    /// Mutants the test suite caught. A timeout counts: the suite noticed
    /// something was wrong, even if no assertion fired.
    pub fn is_detected(self) -> bool {
        matches!(self, MutantStatus::Killed | MutantStatus::Timeout)
    }

    /// Mutants the test suite ran against and let through.
    pub fn is_undetected(self) -> bool {
        matches!(self, MutantStatus::Survived)
    }

    /// Whether this outcome counts toward the score denominator.
    /// Uncovered, ignored, and broken (compile/runtime error) mutants say
    /// nothing about the test suite and are excluded entirely.
    pub fn is_valid(self) -> bool {
        self.is_detected() || self.is_undetected()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mutant {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "mutatorName", default, skip_serializing_if = "Option::is_none")]
    pub mutator_name: Option<String>,
    pub status: MutantStatus,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub mutants: Vec<Mutant>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
}

/// A detailed mutation testing result as uploaded by CI. Unknown fields are
/// captured in the `extra` maps so a stored report serves back exactly what
/// was sent, even as the report schema grows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationTestResult {
    #[serde(rename = "schemaVersion", default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    #[serde(default)]
    pub files: BTreeMap<String, FileResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<Thresholds>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Mutation score of a detailed result: detected / valid, as a percentage.
///
/// A result with no valid mutants at all scores exactly 100 — nothing to
/// kill is a perfect score, not an error. Rounds half away from zero:
/// two killed and one survived is 67, one each is 50.
pub fn compute_score(result: &MutationTestResult) -> f64 {
    let mut detected: u64 = 0;
    let mut valid: u64 = 0;

    for file in result.files.values() {
        for mutant in &file.mutants {
            if mutant.status.is_valid() {
                valid += 1;
                if mutant.status.is_detected() {
                    detected += 1;
                }
            }
        }
    }

    if valid == 0 {
        return 100.0;
    }
    (100.0 * detected as f64 / valid as f64).round()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with_statuses(statuses: &[MutantStatus]) -> MutationTestResult {
        let mutants = statuses
            .iter()
            .map(|&status| Mutant {
                id: None,
                mutator_name: None,
                status,
                extra: serde_json::Map::new(),
            })
            .collect();
        let mut files = BTreeMap::new();
        files.insert(
            "src/lib.rs".to_string(),
            FileResult {
                language: None,
                source: None,
                mutants,
                extra: serde_json::Map::new(),
            },
        );
        MutationTestResult {
            schema_version: None,
            files,
            thresholds: None,
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn test_empty_result_scores_100() {
        let result = result_with_statuses(&[]);
        assert_eq!(compute_score(&result), 100.0);
    }

    #[test]
    fn test_no_files_scores_100() {
        let result = MutationTestResult {
            schema_version: None,
            files: BTreeMap::new(),
            thresholds: None,
            extra: serde_json::Map::new(),
        };
        assert_eq!(compute_score(&result), 100.0);
    }

    #[test]
    fn test_only_invalid_statuses_score_100() {
        let result = result_with_statuses(&[
            MutantStatus::NoCoverage,
            MutantStatus::Ignored,
            MutantStatus::CompileError,
            MutantStatus::RuntimeError,
            MutantStatus::Pending,
        ]);
        assert_eq!(compute_score(&result), 100.0);
    }

    #[test]
    fn test_two_killed_one_survived_rounds_to_67() {
        let result = result_with_statuses(&[
            MutantStatus::Killed,
            MutantStatus::Killed,
            MutantStatus::Survived,
        ]);
        assert_eq!(compute_score(&result), 67.0);
    }

    #[test]
    fn test_one_killed_one_survived_is_50() {
        let result = result_with_statuses(&[MutantStatus::Killed, MutantStatus::Survived]);
        assert_eq!(compute_score(&result), 50.0);
    }

    #[test]
    fn test_all_killed_is_100() {
        let result = result_with_statuses(&[MutantStatus::Killed; 4]);
        assert_eq!(compute_score(&result), 100.0);
    }

    #[test]
    fn test_all_survived_is_0() {
        let result = result_with_statuses(&[MutantStatus::Survived; 3]);
        assert_eq!(compute_score(&result), 0.0);
    }

    #[test]
    fn test_timeout_counts_as_detected() {
        let result = result_with_statuses(&[MutantStatus::Timeout, MutantStatus::Survived]);
        assert_eq!(compute_score(&result), 50.0);
    }

    #[test]
    fn test_no_coverage_excluded_from_denominator() {
        // One killed, one survived, three uncovered: 1/2, not 1/5
        let result = result_with_statuses(&[
            MutantStatus::Killed,
            MutantStatus::Survived,
            MutantStatus::NoCoverage,
            MutantStatus::NoCoverage,
            MutantStatus::NoCoverage,
        ]);
        assert_eq!(compute_score(&result), 50.0);
    }

    #[test]
    fn test_score_spans_multiple_files() {
        let mut files = BTreeMap::new();
        for (path, status) in [
            ("a.rs", MutantStatus::Killed),
            ("b.rs", MutantStatus::Killed),
            ("c.rs", MutantStatus::Survived),
        ] {
            files.insert(
                path.to_string(),
                FileResult {
                    language: None,
                    source: None,
                    mutants: vec![Mutant {
                        id: None,
                        mutator_name: None,
                        status,
                        extra: serde_json::Map::new(),
                    }],
                    extra: serde_json::Map::new(),
                },
            );
        }
        let result = MutationTestResult {
            schema_version: None,
            files,
            thresholds: None,
            extra: serde_json::Map::new(),
        };
        assert_eq!(compute_score(&result), 67.0);
    }

    #[test]
    fn test_score_always_in_range() {
        use MutantStatus::*;
        for statuses in [
            vec![Killed],
            vec![Survived],
            vec![Killed, Timeout, Survived, NoCoverage, Ignored],
            vec![CompileError, RuntimeError],
        ] {
            let score = compute_score(&result_with_statuses(&statuses));
            assert!((0.0..=100.0).contains(&score), "score {} out of range", score);
        }
    }

    #[test]
    fn test_result_roundtrip_preserves_unknown_fields() {
        let raw = serde_json::json!({
            "schemaVersion": "1",
            "files": {
                "src/main.rs": {
                    "language": "rust",
                    "mutants": [
                        {"id": "1", "mutatorName": "BooleanLiteral", "status": "Killed",
                         "location": {"start": {"line": 3, "column": 1}}}
                    ]
                }
            },
            "thresholds": {"high": 80.0, "low": 60.0},
            "framework": {"name": "cargo-mutants"}
        });
        let result: MutationTestResult = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(
            result.files["src/main.rs"].mutants[0].status,
            MutantStatus::Killed
        );
        let back = serde_json::to_value(&result).unwrap();
        assert_eq!(back, raw);
    }
}
