use crate::rules::RuleId;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;

/// Which rules run, and the text they insert.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RuleProfile {
    /// Rule names in evaluation order.
    #[serde(default = "default_rules")]
    pub rules: Vec<String>,
    #[serde(default)]
    pub operator: OperatorSettings,
    #[serde(default)]
    pub signature: SignatureSettings,
    #[serde(default)]
    pub annotation: AnnotationSettings,
}

fn default_rules() -> Vec<String> {
    Preset::Augment
        .rules()
        .iter()
        .map(|id| id.as_str().to_string())
        .collect()
}

impl Default for RuleProfile {
    fn default() -> Self {
        Self::preset(Preset::Augment)
    }
}

impl RuleProfile {
    /// Default settings with the rules of `preset`.
    pub fn preset(preset: Preset) -> Self {
        Self {
            rules: preset
                .rules()
                .iter()
                .map(|id| id.as_str().to_string())
                .collect(),
            operator: OperatorSettings::default(),
            signature: SignatureSettings::default(),
            annotation: AnnotationSettings::default(),
        }
    }

    /// Resolve rule names, in order.
    pub fn rule_ids(&self) -> Result<Vec<RuleId>, ValidationError> {
        self.validate()?;
        Ok(self
            .rules
            .iter()
            .filter_map(|name| name.parse().ok())
            .collect())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.rules.is_empty() {
            issues.push(ValidationIssue::EmptyRuleList);
        }

        let mut seen = HashSet::new();
        for name in &self.rules {
            if name.parse::<RuleId>().is_err() {
                issues.push(ValidationIssue::UnknownRule { name: name.clone() });
            } else if !seen.insert(name.as_str()) {
                issues.push(ValidationIssue::DuplicateRule { name: name.clone() });
            }
        }

        if self.signature.parameter.trim().is_empty() {
            issues.push(ValidationIssue::MissingField {
                field: "signature.parameter",
            });
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct OperatorSettings {
    pub additive_marker: String,
    pub multiplicative_open: String,
    pub multiplicative_close: String,
}

impl Default for OperatorSettings {
    fn default() -> Self {
        Self {
            additive_marker: " * d".to_string(),
            multiplicative_open: "(".to_string(),
            multiplicative_close: ") + d".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SignatureSettings {
    /// Parameter appended to every function declaration.
    pub parameter: String,
}

impl Default for SignatureSettings {
    fn default() -> Self {
        Self {
            parameter: "bool b".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct AnnotationSettings {
    pub indent_new_lines: bool,
}

impl Default for AnnotationSettings {
    fn default() -> Self {
        Self {
            indent_new_lines: true,
        }
    }
}

/// Built-in rule selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// Operator rewrite and signature augmentation.
    #[default]
    Augment,
    /// Branch and function annotation.
    Annotate,
    All,
}

impl Preset {
    pub fn rules(&self) -> &'static [RuleId] {
        match self {
            Preset::Augment => &[RuleId::OperatorRewrite, RuleId::SignatureAugmentation],
            Preset::Annotate => &[RuleId::Annotation],
            Preset::All => &RuleId::ALL,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptyRuleList,
    UnknownRule { name: String },
    DuplicateRule { name: String },
    MissingField { field: &'static str },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyRuleList => write!(f, "rule profile enables no rules"),
            ValidationIssue::UnknownRule { name } => write!(
                f,
                "unknown rule '{name}' (expected one of: operator-rewrite, signature-augmentation, annotation)"
            ),
            ValidationIssue::DuplicateRule { name } => {
                write!(f, "rule '{name}' is listed more than once")
            }
            ValidationIssue::MissingField { field } => {
                write!(f, "missing required field '{field}'")
            }
        }
    }
}
