//! Sets of curves loaded from one file and built together.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use pillar_curves::bootstrap::{build_independent, BootstrapReport};
use pillar_curves::curve::FrozenCurve;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::curve::{CurveConfig, CurveKind};
use crate::error::{ConfigError, ConfigResult, Validate, ValidationError};

/// Every curve defined by a configuration file.
///
/// In TOML each curve is a `[[curves]]` table with its instruments as
/// `[[curves.instruments]]`:
///
/// ```rust
/// use pillar_config::CurveSetConfig;
///
/// let set = CurveSetConfig::from_toml_str(r#"
///     [[curves]]
///     name = "USD"
///     base_date = "2025-01-02"
///
///     [[curves.instruments]]
///     type = "deposit"
///     tenor = "3M"
///     rate = 0.0027
/// "#).unwrap();
///
/// let built = set.build().unwrap();
/// assert_eq!(built.get("USD").unwrap().curve.node_count(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurveSetConfig {
    /// Curve configurations, in any order.
    #[serde(default)]
    pub curves: Vec<CurveConfig>,
}

impl CurveSetConfig {
    /// Creates a set from configurations.
    pub fn new(curves: Vec<CurveConfig>) -> Self {
        Self { curves }
    }

    /// Parses TOML.
    pub fn from_toml_str(s: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Parses JSON.
    pub fn from_json_str(s: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Loads a `.toml` or `.json` file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let parse: fn(&str) -> ConfigResult<Self> = match extension.as_deref() {
            Some("toml") => Self::from_toml_str,
            Some("json") => Self::from_json_str,
            _ => return Err(ConfigError::UnsupportedFormat { path: display }),
        };
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io(&display, &e))?;
        let set = parse(&text)?;
        debug!(path = %path.display(), curves = set.curves.len(), "loaded curve set");
        Ok(set)
    }

    /// Pretty-printed JSON.
    pub fn to_json_string(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Configuration of the curve named `name`.
    pub fn curve(&self, name: &str) -> Option<&CurveConfig> {
        self.curves.iter().find(|c| c.name == name)
    }

    /// Groups curves into levels: every curve only reads curves of
    /// earlier levels, so the curves of one level can be built together.
    ///
    /// # Errors
    ///
    /// - `NotFound` for a reference to an undefined curve
    /// - `Conflict` for circular references
    pub fn build_levels(&self) -> ConfigResult<Vec<Vec<&CurveConfig>>> {
        let index: HashMap<&str, usize> = self
            .curves
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.as_str(), i))
            .collect();
        for curve in &self.curves {
            if let Some(missing) = curve.dependencies().find(|d| !index.contains_key(d)) {
                return Err(ConfigError::not_found(missing));
            }
        }

        let mut placed = vec![false; self.curves.len()];
        let mut levels: Vec<Vec<&CurveConfig>> = Vec::new();
        while placed.iter().any(|p| !p) {
            let ready: Vec<usize> = (0..self.curves.len())
                .filter(|&i| !placed[i])
                .filter(|&i| {
                    self.curves[i]
                        .dependencies()
                        .all(|d| index.get(d).is_some_and(|&j| placed[j]))
                })
                .collect();

            if ready.is_empty() {
                let stuck: Vec<&str> = (0..self.curves.len())
                    .filter(|&i| !placed[i])
                    .map(|i| self.curves[i].name.as_str())
                    .collect();
                return Err(ConfigError::Conflict(format!(
                    "circular curve references among {}",
                    stuck.join(", ")
                )));
            }

            for &i in &ready {
                placed[i] = true;
            }
            levels.push(ready.into_iter().map(|i| &self.curves[i]).collect());
        }
        Ok(levels)
    }

    /// Validates the set and bootstraps every curve.
    ///
    /// Curves of one level are built in parallel; later levels read the
    /// frozen curves of earlier ones.
    ///
    /// # Errors
    ///
    /// Validation errors, or the first curve that fails to build.
    pub fn build(&self) -> ConfigResult<CurveSet> {
        self.validate_or_error()?;
        let levels = self.build_levels()?;
        info!(curves = self.curves.len(), levels = levels.len(), "building curve set");

        let mut frozen: HashMap<String, Arc<FrozenCurve>> = HashMap::new();
        let mut built = Vec::with_capacity(self.curves.len());
        for level in levels {
            let jobs = level
                .iter()
                .map(|config| config.bootstrapper(&frozen))
                .collect::<ConfigResult<Vec<_>>>()?;

            for (config, result) in level.iter().zip(build_independent(jobs)) {
                let output = result.map_err(|e| {
                    error!(curve = %config.name, error = %e, "curve build failed");
                    e
                })?;
                let curve = Arc::new(output.curve);
                frozen.insert(config.name.clone(), Arc::clone(&curve));
                built.push(BuiltCurve {
                    name: config.name.clone(),
                    kind: config.kind,
                    curve,
                    report: output.report,
                });
            }
        }

        Ok(CurveSet { curves: built })
    }
}

impl Validate for CurveSetConfig {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.curves.is_empty() {
            errors.push(ValidationError::with_rule(
                "curves",
                "At least one curve is required",
                "non_empty",
            ));
        }

        let mut seen = HashSet::new();
        for (i, curve) in self.curves.iter().enumerate() {
            let prefix = format!("curves[{i}]");
            errors.extend(curve.validate().into_iter().map(|e| e.nested(&prefix)));

            if !seen.insert(curve.name.as_str()) {
                errors.push(
                    ValidationError::with_rule(
                        "name",
                        format!("Curve '{}' is defined twice", curve.name),
                        "unique_name",
                    )
                    .nested(&prefix),
                );
            }

            if let Some(base) = curve.base_curve.as_deref() {
                match self.curve(base) {
                    None => errors.push(unknown("base_curve", base).nested(&prefix)),
                    Some(b) if b.kind != CurveKind::Zero => errors.push(
                        ValidationError::with_rule(
                            "base_curve",
                            format!("'{base}' is a {} curve, not a zero curve", b.kind),
                            "spread_kind",
                        )
                        .nested(&prefix),
                    ),
                    Some(b) if b.base_date != curve.base_date || b.day_count != curve.day_count => {
                        errors.push(
                            ValidationError::with_rule(
                                "base_curve",
                                format!("'{base}' has a different base date or day count"),
                                "same_time_axis",
                            )
                            .nested(&prefix),
                        );
                    }
                    Some(_) => {}
                }
            }

            if let Some(discount) = curve.discount_curve.as_deref() {
                match self.curve(discount) {
                    None => errors.push(unknown("discount_curve", discount).nested(&prefix)),
                    Some(d) if d.kind != CurveKind::Discount => errors.push(
                        ValidationError::with_rule(
                            "discount_curve",
                            format!("'{discount}' is a {} curve", d.kind),
                            "discount_kind",
                        )
                        .nested(&prefix),
                    ),
                    Some(_) => {}
                }
            }
        }

        if errors.is_empty() {
            if let Err(e) = self.build_levels() {
                errors.push(ValidationError::with_rule("curves", e.to_string(), "acyclic"));
            }
        }

        errors
    }
}

fn unknown(field: &str, name: &str) -> ValidationError {
    ValidationError::with_rule(field, format!("Unknown curve '{name}'"), "known_curve")
}

/// A bootstrapped curve with its build report.
#[derive(Debug, Clone)]
pub struct BuiltCurve {
    /// Curve name.
    pub name: String,
    /// What the nodes hold.
    pub kind: CurveKind,
    /// The frozen curve.
    pub curve: Arc<FrozenCurve>,
    /// Per-node build report.
    pub report: BootstrapReport,
}

/// Curves built from a [`CurveSetConfig`], in build order.
#[derive(Debug, Clone, Default)]
pub struct CurveSet {
    curves: Vec<BuiltCurve>,
}

impl CurveSet {
    /// The curve named `name`.
    pub fn get(&self, name: &str) -> ConfigResult<&BuiltCurve> {
        self.curves
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| ConfigError::not_found(name))
    }

    /// Iterates in build order.
    pub fn iter(&self) -> impl Iterator<Item = &BuiltCurve> {
        self.curves.iter()
    }

    /// Curve names in build order.
    pub fn names(&self) -> Vec<&str> {
        self.curves.iter().map(|c| c.name.as_str()).collect()
    }

    /// Number of curves.
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }
}
