//! Per-category configuration documents.
//!
//! Documents are YAML text owned by the backend. Nothing here parses the
//! YAML; the only check is the same shallow one the dashboard has always
//! applied before allowing a save.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Category;

/// Config text failed the shallow `key: value` check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} config is empty")]
    Empty(Category),

    #[error("{0} config has no `key: value` line")]
    NoKeyValueLine(Category),
}

/// The YAML configuration for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigDocument {
    pub category: Category,
    pub text: String,
}

impl ConfigDocument {
    pub fn new(category: Category, text: impl Into<String>) -> Self {
        Self {
            category,
            text: text.into(),
        }
    }

    /// The default document shipped for a category.
    pub fn template(category: Category) -> Self {
        Self::new(category, template_text(category))
    }

    /// Valid iff at least one line, once trimmed, contains a colon.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.text.trim().is_empty() {
            return Err(ValidationError::Empty(self.category));
        }
        if self.text.lines().any(|line| line.trim().contains(':')) {
            Ok(())
        } else {
            Err(ValidationError::NoKeyValueLine(self.category))
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// File name used when the document is written to a directory.
    pub fn file_name(category: Category) -> String {
        format!("{}.yaml", category.slug())
    }
}

fn template_text(category: Category) -> &'static str {
    match category {
        Category::Kafka => include_str!("../templates/kafka.yaml"),
        Category::Redis => include_str!("../templates/redis.yaml"),
        Category::Mysql => include_str!("../templates/mysql.yaml"),
        Category::Postgres => include_str!("../templates/postgresql.yaml"),
    }
}

/// All four configuration documents, edited and saved together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSet {
    pub redis: ConfigDocument,
    pub kafka: ConfigDocument,
    pub postgresql: ConfigDocument,
    pub mysql: ConfigDocument,
}

impl ConfigSet {
    /// A set holding the default template for every category.
    pub fn templates() -> Self {
        Self {
            redis: ConfigDocument::template(Category::Redis),
            kafka: ConfigDocument::template(Category::Kafka),
            postgresql: ConfigDocument::template(Category::Postgres),
            mysql: ConfigDocument::template(Category::Mysql),
        }
    }

    pub fn get(&self, category: Category) -> &ConfigDocument {
        match category {
            Category::Redis => &self.redis,
            Category::Kafka => &self.kafka,
            Category::Postgres => &self.postgresql,
            Category::Mysql => &self.mysql,
        }
    }

    /// Replace the text for one category.
    pub fn set(&mut self, category: Category, text: impl Into<String>) {
        let doc = match category {
            Category::Redis => &mut self.redis,
            Category::Kafka => &mut self.kafka,
            Category::Postgres => &mut self.postgresql,
            Category::Mysql => &mut self.mysql,
        };
        doc.text = text.into();
    }

    /// Documents in category tab order.
    pub fn iter(&self) -> impl Iterator<Item = &ConfigDocument> {
        Category::ALL.into_iter().map(move |c| self.get(c))
    }

    /// A whole-set save is only allowed once every document passes.
    pub fn all_valid(&self) -> bool {
        self.iter().all(ConfigDocument::is_valid)
    }

    /// Validation errors for every failing document.
    pub fn errors(&self) -> Vec<ValidationError> {
        self.iter().filter_map(|d| d.validate().err()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colon_line_is_valid() {
        let doc = ConfigDocument::new(Category::Redis, "# comment\n  host: redis-1\n");
        assert!(doc.is_valid());
    }

    #[test]
    fn test_no_colon_is_invalid() {
        let doc = ConfigDocument::new(Category::Kafka, "just some words\nmore words");
        assert_eq!(
            doc.validate(),
            Err(ValidationError::NoKeyValueLine(Category::Kafka))
        );
    }

    #[test]
    fn test_blank_is_invalid() {
        let doc = ConfigDocument::new(Category::Mysql, "   \n\n");
        assert_eq!(doc.validate(), Err(ValidationError::Empty(Category::Mysql)));
    }

    #[test]
    fn test_templates_are_valid() {
        let set = ConfigSet::templates();
        assert!(set.all_valid());
        for (doc, category) in set.iter().zip(Category::ALL) {
            assert_eq!(doc.category, category);
        }
    }

    #[test]
    fn test_one_bad_document_blocks_the_set() {
        let mut set = ConfigSet::templates();
        set.set(Category::Postgres, "oops");

        assert!(!set.all_valid());
        assert_eq!(
            set.errors(),
            vec![ValidationError::NoKeyValueLine(Category::Postgres)]
        );
    }
}
