//! Image identifiers of the form `[namespace/]repo[:tag]`.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::{CoreError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageName {
    namespace: Option<String>,
    repo: String,
    tag: Option<String>,
}

impl ImageName {
    pub fn parse(value: &str) -> Result<Self> {
        if value.is_empty() {
            return Err(CoreError::config("image name must not be empty"));
        }
        if value.chars().any(char::is_whitespace) {
            return Err(CoreError::config(format!(
                "image name '{value}' must be a single token without whitespace"
            )));
        }

        let (namespace, rest) = match value.split_once('/') {
            Some((namespace, rest)) => (Some(namespace), rest),
            None => (None, value),
        };
        let (repo, tag) = match rest.rsplit_once(':') {
            Some((repo, tag)) => (repo, Some(tag)),
            None => (rest, None),
        };

        if namespace.is_some_and(str::is_empty) {
            return Err(CoreError::config(format!(
                "image name '{value}' has an empty namespace"
            )));
        }
        if repo.is_empty() || repo.contains('/') {
            return Err(CoreError::config(format!(
                "image name '{value}' has an invalid repository"
            )));
        }
        if tag.is_some_and(str::is_empty) {
            return Err(CoreError::config(format!(
                "image name '{value}' has an empty tag"
            )));
        }

        Ok(Self {
            namespace: namespace.map(str::to_string),
            repo: repo.to_string(),
            tag: tag.map(str::to_string),
        })
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Result<Self> {
        let tag = tag.into();
        if tag.is_empty() || tag.contains([':', '/']) || tag.chars().any(char::is_whitespace) {
            return Err(CoreError::config(format!("invalid image tag '{tag}'")));
        }
        self.tag = Some(tag);
        Ok(self)
    }
}

impl fmt::Display for ImageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(namespace) = &self.namespace {
            write!(f, "{namespace}/")?;
        }
        f.write_str(&self.repo)?;
        if let Some(tag) = &self.tag {
            write!(f, ":{tag}")?;
        }
        Ok(())
    }
}

impl FromStr for ImageName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for ImageName {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
