use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::error::{CoreError, Result};

pub const DEFAULT_PROFILE: &str = "1";
pub const DEFAULT_INPUT_PATH: &str = "data/raw/movies.csv";
pub const DEFAULT_TEXT_COLUMN: &str = "combined_text";

/// Everything that varies between data sets: what to prune, which columns
/// hold record lists, what feeds the combined text and where the result goes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub columns_to_drop: Vec<String>,
    pub output_path: PathBuf,
    #[serde(default = "default_id_column")]
    pub id_column: String,
    /// Columns parsed from literal lists of records.
    #[serde(default)]
    pub structured_fields: Vec<String>,
    /// Subset of `structured_fields` reduced to their record names.
    #[serde(default)]
    pub named_fields: Vec<String>,
    #[serde(default)]
    pub text_fields: Vec<String>,
    #[serde(default = "default_text_column")]
    pub text_column: String,
}

fn default_id_column() -> String {
    "id".to_string()
}

fn default_text_column() -> String {
    DEFAULT_TEXT_COLUMN.to_string()
}

impl Profile {
    pub fn matches(&self, key: &str) -> bool {
        self.id == key || self.aliases.iter().any(|alias| alias == key)
    }

    fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(CoreError::ProfileConfig("profile id must not be empty".into()));
        }
        if self.text_column.trim().is_empty() {
            return Err(CoreError::ProfileConfig(format!(
                "profile '{}' has an empty text_column",
                self.id
            )));
        }
        if let Some(stray) = self
            .named_fields
            .iter()
            .find(|field| !self.structured_fields.contains(field))
        {
            return Err(CoreError::ProfileConfig(format!(
                "profile '{}' names '{}' in named_fields but not in structured_fields",
                self.id, stray
            )));
        }
        Ok(())
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

static BUILTIN_PROFILES: Lazy<Vec<Profile>> = Lazy::new(|| {
    vec![Profile {
        id: DEFAULT_PROFILE.to_string(),
        aliases: strings(&["movies"]),
        description: "TMDB-style movie metadata with embedded genre/keyword/cast/crew lists"
            .to_string(),
        columns_to_drop: strings(&[
            "budget",
            "homepage",
            "original_title",
            "popularity",
            "revenue",
            "status",
            "vote_average",
            "vote_count",
        ]),
        output_path: PathBuf::from("data/modified/movies.csv"),
        id_column: default_id_column(),
        structured_fields: strings(&["genres", "keywords", "cast", "crew"]),
        named_fields: strings(&["genres", "keywords"]),
        text_fields: strings(&["genres", "keywords", "cast", "crew", "overview"]),
        text_column: default_text_column(),
    }]
});

pub fn builtin_profiles() -> &'static [Profile] {
    BUILTIN_PROFILES.as_slice()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProfileFile {
    #[serde(default, rename = "profile")]
    profiles: Vec<Profile>,
}

/// Named profiles available to a run. Lookups by unknown ids fail rather than
/// falling back to a partial pipeline.
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    profiles: Vec<Profile>,
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProfileRegistry {
    pub fn builtin() -> Self {
        Self {
            profiles: builtin_profiles().to_vec(),
        }
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    /// Adds profiles, replacing any existing profile with the same id.
    pub fn merge(&mut self, profiles: Vec<Profile>) -> Result<()> {
        for profile in profiles {
            profile.validate()?;
            match self.profiles.iter_mut().find(|p| p.id == profile.id) {
                Some(existing) => *existing = profile,
                None => self.profiles.push(profile),
            }
        }
        Ok(())
    }

    /// Merges `[[profile]]` tables from a TOML document.
    pub fn merge_toml_str(&mut self, content: &str) -> Result<()> {
        let file: ProfileFile =
            toml::from_str(content).map_err(|err| CoreError::ProfileConfig(err.to_string()))?;
        self.merge(file.profiles)
    }

    pub fn merge_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| CoreError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        self.merge_toml_str(&content)
    }

    pub fn resolve(&self, key: &str) -> Result<&Profile> {
        let key = key.trim();
        self.profiles
            .iter()
            .find(|profile| profile.id == key)
            .or_else(|| self.profiles.iter().find(|profile| profile.matches(key)))
            .ok_or_else(|| CoreError::UnknownProfile(key.to_string()))
    }
}
