//! Configuration document service (`/api/v1/config/<slug>`).

use dbwatch_types::{Category, ConfigDocument, ConfigSet};

use crate::{ApiClient, ApiResult};

/// Reads and writes the backend's per-category YAML configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    client: ApiClient,
}

impl ConfigService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Endpoint path for a category.
    pub fn endpoint(category: Category) -> String {
        format!("/api/v1/config/{}", category.slug())
    }

    pub async fn get(&self, category: Category) -> ApiResult<ConfigDocument> {
        let text = self.client.get_text(&Self::endpoint(category)).await?;
        Ok(ConfigDocument::new(category, text))
    }

    /// Store one document. The text is sent as-is.
    pub async fn save(&self, document: &ConfigDocument) -> ApiResult<()> {
        self.client
            .post_config(&Self::endpoint(document.category), &document.text)
            .await
    }

    /// Fetch all four documents concurrently. Any failure fails the whole set.
    pub async fn get_all(&self) -> ApiResult<ConfigSet> {
        let (redis, kafka, postgresql, mysql) = tokio::try_join!(
            self.get(Category::Redis),
            self.get(Category::Kafka),
            self.get(Category::Postgres),
            self.get(Category::Mysql),
        )?;

        Ok(ConfigSet {
            redis,
            kafka,
            postgresql,
            mysql,
        })
    }

    /// Store all four documents concurrently.
    pub async fn save_all(&self, set: &ConfigSet) -> ApiResult<()> {
        tokio::try_join!(
            self.save(&set.redis),
            self.save(&set.kafka),
            self.save(&set.postgresql),
            self.save(&set.mysql),
        )?;
        Ok(())
    }
}
