use crate::utils::error::{Result, TutorError};
use crate::utils::validation::{validate_non_empty_string, validate_url, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// `package.yaml` of an action package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageManifest {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub documentation: Option<String>,
    #[serde(default)]
    pub dependencies: Dependencies,
    #[serde(default)]
    pub packaging: Packaging,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dependencies {
    #[serde(rename = "conda-forge", default)]
    pub conda_forge: Vec<String>,
    #[serde(default)]
    pub pypi: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Packaging {
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// `name=version`, `name==version` or a bare `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySpec {
    pub name: String,
    pub version: Option<String>,
}

impl DependencySpec {
    pub fn parse(spec: &str) -> Result<Self> {
        let invalid = |reason: &str| TutorError::InvalidConfigValueError {
            field: "dependencies".to_string(),
            value: spec.to_string(),
            reason: reason.to_string(),
        };

        let (name, version) = match spec.split_once('=') {
            Some((name, version)) => (name, Some(version.trim_start_matches('=').trim())),
            None => (spec, None),
        };
        let name = name.trim();

        let valid_name = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid_name {
            return Err(invalid("Package name may only contain letters, digits, '-', '_' and '.'"));
        }
        if matches!(version, Some("")) {
            return Err(invalid("Version is empty"));
        }

        Ok(Self {
            name: name.to_string(),
            version: version.map(str::to_string),
        })
    }
}

impl PackageManifest {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TutorError::IoError)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| TutorError::ConfigValidationError {
            field: "package.yaml".to_string(),
            message: format!("YAML parsing error: {}", e),
        })
    }

    /// Conda and PyPI dependencies, parsed.
    pub fn dependency_specs(&self) -> Result<Vec<DependencySpec>> {
        self.dependencies
            .conda_forge
            .iter()
            .chain(&self.dependencies.pypi)
            .map(|spec| DependencySpec::parse(spec))
            .collect()
    }

    /// Whether `path` (relative to the package root) is left out of the
    /// package by one of the exclusion globs.
    pub fn is_excluded(&self, path: &str) -> bool {
        let path = normalize(path);
        self.packaging
            .exclude
            .iter()
            .filter_map(|pattern| glob_to_regex(pattern).ok())
            .any(|re| re.is_match(&path))
    }
}

impl Validate for PackageManifest {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("name", &self.name)?;
        validate_non_empty_string("description", &self.description)?;

        if let Some(documentation) = &self.documentation {
            validate_url("documentation", documentation)?;
        }

        self.dependency_specs()?;

        for pattern in &self.packaging.exclude {
            validate_non_empty_string("packaging.exclude", pattern)?;
            glob_to_regex(pattern)?;
        }

        Ok(())
    }
}

fn normalize(path: &str) -> String {
    path.replace('\\', "/").trim_start_matches("./").to_string()
}

/// `**` crosses directories, `*` and `?` stay within one path segment.
pub fn glob_to_regex(pattern: &str) -> Result<Regex> {
    let pattern = normalize(pattern);
    let mut re = String::from("^");
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                if chars.peek() == Some(&'/') {
                    chars.next();
                    re.push_str("(?:.*/)?");
                } else {
                    re.push_str(".*");
                }
            }
            '*' => re.push_str("[^/]*"),
            '?' => re.push_str("[^/]"),
            other => re.push_str(&regex::escape(&other.to_string())),
        }
    }
    re.push('$');

    Regex::new(&re).map_err(|e| TutorError::InvalidConfigValueError {
        field: "packaging.exclude".to_string(),
        value: pattern.clone(),
        reason: e.to_string(),
    })
}
