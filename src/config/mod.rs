pub mod loader;
pub mod schema;

pub use loader::{load_from_path, load_from_str, resolve_profile, ConfigError, ProfileOrigin};
pub use schema::{
    AnnotationSettings, OperatorSettings, Preset, RuleProfile, SignatureSettings,
    ValidationError, ValidationIssue,
};
