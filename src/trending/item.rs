use serde::{Deserialize, Serialize};

/// One trending entry handed over by a fetch collaborator.
///
/// Field aliases accept the GitHub search API shape directly, so a saved API
/// response can be replayed through `--items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    #[serde(alias = "full_name")]
    pub name: String,
    #[serde(alias = "html_url")]
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "stargazers_count")]
    pub stars: Option<u64>,
    #[serde(default)]
    pub language: Option<String>,
}

impl Item {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            description: None,
            stars: None,
            language: None,
        }
    }
}

#[cfg(test)]
impl Item {
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_stars(mut self, stars: u64) -> Self {
        self.stars = Some(stars);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}
