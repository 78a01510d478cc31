use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{Connector, Folder, Page, WebCrawlerConfiguration};
use crate::storage::ConnectorStore;
use crate::types::{ConfigurationId, ConnectorId, DataSourceConfig, WebCrawlerConfig};

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn configuration_from_row(row: &PgRow) -> Result<WebCrawlerConfiguration> {
    Ok(WebCrawlerConfiguration {
        id: row.get("id"),
        connector_id: row.get("connector_id"),
        url: row.get("url"),
        max_page_to_crawl: row.get("max_page_to_crawl"),
        crawl_mode: row.get::<String, _>("crawl_mode").parse()?,
        depth: row.get("depth"),
        crawl_frequency: row.get::<String, _>("crawl_frequency").parse()?,
        last_crawled_at: row.get("last_crawled_at"),
        headers: serde_json::from_value(row.get("headers")).unwrap_or_default(),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[async_trait]
impl ConnectorStore for PostgresStore {
    async fn create_connector(
        &self,
        data_source: &DataSourceConfig,
        connection_id: &str,
        configuration: &WebCrawlerConfig,
    ) -> Result<(Connector, WebCrawlerConfiguration)> {
        let mut tx = self.pool.begin().await?;

        let connector = sqlx::query_as::<_, Connector>(
            r#"
            INSERT INTO webcrawler_connectors (
                id, workspace_id, data_source_name, connection_id
            ) VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(ConnectorId::new())
        .bind(&data_source.workspace_id)
        .bind(&data_source.data_source_name)
        .bind(connection_id)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to insert connector")?;

        let row = sqlx::query(
            r#"
            INSERT INTO webcrawler_configurations (
                id, connector_id, url, max_page_to_crawl, crawl_mode,
                depth, crawl_frequency, headers
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(ConfigurationId::new())
        .bind(connector.id)
        .bind(&configuration.url)
        .bind(configuration.max_page_to_crawl)
        .bind(configuration.crawl_mode.to_string())
        .bind(configuration.depth)
        .bind(configuration.crawl_frequency.to_string())
        .bind(serde_json::to_value(&configuration.headers)?)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to insert webcrawler configuration")?;
        let config = configuration_from_row(&row)?;

        tx.commit().await?;
        Ok((connector, config))
    }

    async fn fetch_connector(&self, connector_id: ConnectorId) -> Result<Option<Connector>> {
        let connector =
            sqlx::query_as::<_, Connector>("SELECT * FROM webcrawler_connectors WHERE id = $1")
                .bind(connector_id)
                .fetch_optional(&self.pool)
                .await
                .context("Failed to fetch connector")?;
        Ok(connector)
    }

    async fn set_connector_paused(
        &self,
        connector_id: ConnectorId,
        paused: bool,
    ) -> Result<Option<Connector>> {
        let connector = sqlx::query_as::<_, Connector>(
            r#"
            UPDATE webcrawler_connectors
            SET paused = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(connector_id)
        .bind(paused)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to update connector pause state")?;
        Ok(connector)
    }

    async fn delete_connector(&self, connector_id: ConnectorId) -> Result<()> {
        // Configuration, folder, and page rows go with it via FK cascade.
        sqlx::query("DELETE FROM webcrawler_connectors WHERE id = $1")
            .bind(connector_id)
            .execute(&self.pool)
            .await
            .context("Failed to delete connector")?;
        Ok(())
    }

    async fn fetch_configuration(
        &self,
        connector_id: ConnectorId,
    ) -> Result<Option<WebCrawlerConfiguration>> {
        let row = sqlx::query("SELECT * FROM webcrawler_configurations WHERE connector_id = $1")
            .bind(connector_id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch webcrawler configuration")?;
        row.as_ref().map(configuration_from_row).transpose()
    }

    async fn update_configuration(
        &self,
        connector_id: ConnectorId,
        configuration: &WebCrawlerConfig,
    ) -> Result<Option<WebCrawlerConfiguration>> {
        let row = sqlx::query(
            r#"
            UPDATE webcrawler_configurations
            SET
                url = $2,
                max_page_to_crawl = $3,
                crawl_mode = $4,
                depth = $5,
                crawl_frequency = $6,
                headers = $7,
                updated_at = NOW()
            WHERE connector_id = $1
            RETURNING *
            "#,
        )
        .bind(connector_id)
        .bind(&configuration.url)
        .bind(configuration.max_page_to_crawl)
        .bind(configuration.crawl_mode.to_string())
        .bind(configuration.depth)
        .bind(configuration.crawl_frequency.to_string())
        .bind(serde_json::to_value(&configuration.headers)?)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to update webcrawler configuration")?;
        row.as_ref().map(configuration_from_row).transpose()
    }

    async fn mark_crawled(&self, connector_id: ConnectorId, at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE webcrawler_configurations
            SET last_crawled_at = $2, updated_at = NOW()
            WHERE connector_id = $1
            "#,
        )
        .bind(connector_id)
        .bind(at)
        .execute(&self.pool)
        .await
        .context("Failed to stamp last crawl time")?;
        Ok(())
    }

    async fn upsert_folder(
        &self,
        connector_id: ConnectorId,
        configuration_id: ConfigurationId,
        url: &str,
        parent_url: Option<&str>,
        internal_id: &str,
    ) -> Result<Folder> {
        let folder = sqlx::query_as::<_, Folder>(
            r#"
            INSERT INTO webcrawler_folders (
                id, connector_id, configuration_id, url, parent_url, internal_id
            ) VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (connector_id, configuration_id, url) DO UPDATE
            SET parent_url = EXCLUDED.parent_url,
                internal_id = EXCLUDED.internal_id,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(connector_id)
        .bind(configuration_id)
        .bind(url)
        .bind(parent_url)
        .bind(internal_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to upsert folder")?;
        Ok(folder)
    }

    async fn find_folder_by_url(
        &self,
        connector_id: ConnectorId,
        configuration_id: ConfigurationId,
        url: &str,
    ) -> Result<Option<Folder>> {
        let folder = sqlx::query_as::<_, Folder>(
            r#"
            SELECT * FROM webcrawler_folders
            WHERE connector_id = $1 AND configuration_id = $2 AND url = $3
            "#,
        )
        .bind(connector_id)
        .bind(configuration_id)
        .bind(url)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find folder by url")?;
        Ok(folder)
    }

    async fn find_folder_by_internal_id(
        &self,
        connector_id: ConnectorId,
        configuration_id: ConfigurationId,
        internal_id: &str,
    ) -> Result<Option<Folder>> {
        let folder = sqlx::query_as::<_, Folder>(
            r#"
            SELECT * FROM webcrawler_folders
            WHERE connector_id = $1 AND configuration_id = $2 AND internal_id = $3
            "#,
        )
        .bind(connector_id)
        .bind(configuration_id)
        .bind(internal_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find folder by internal id")?;
        Ok(folder)
    }

    async fn find_folders_by_parent(
        &self,
        connector_id: ConnectorId,
        configuration_id: ConfigurationId,
        parent_url: Option<&str>,
    ) -> Result<Vec<Folder>> {
        let folders = sqlx::query_as::<_, Folder>(
            r#"
            SELECT * FROM webcrawler_folders
            WHERE connector_id = $1
              AND configuration_id = $2
              AND parent_url IS NOT DISTINCT FROM $3
            "#,
        )
        .bind(connector_id)
        .bind(configuration_id)
        .bind(parent_url)
        .fetch_all(&self.pool)
        .await
        .context("Failed to find folders by parent url")?;
        Ok(folders)
    }

    async fn find_folders_by_internal_ids(
        &self,
        connector_id: ConnectorId,
        configuration_id: ConfigurationId,
        internal_ids: &[String],
    ) -> Result<Vec<Folder>> {
        let folders = sqlx::query_as::<_, Folder>(
            r#"
            SELECT * FROM webcrawler_folders
            WHERE connector_id = $1 AND configuration_id = $2 AND internal_id = ANY($3)
            "#,
        )
        .bind(connector_id)
        .bind(configuration_id)
        .bind(internal_ids)
        .fetch_all(&self.pool)
        .await
        .context("Failed to find folders by internal id set")?;
        Ok(folders)
    }

    async fn upsert_page(
        &self,
        connector_id: ConnectorId,
        configuration_id: ConfigurationId,
        url: &str,
        parent_url: Option<&str>,
        document_id: &str,
        title: Option<&str>,
    ) -> Result<Page> {
        let page = sqlx::query_as::<_, Page>(
            r#"
            INSERT INTO webcrawler_pages (
                id, connector_id, configuration_id, url, parent_url, document_id, title
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (connector_id, configuration_id, url) DO UPDATE
            SET parent_url = EXCLUDED.parent_url,
                document_id = EXCLUDED.document_id,
                title = EXCLUDED.title,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(connector_id)
        .bind(configuration_id)
        .bind(url)
        .bind(parent_url)
        .bind(document_id)
        .bind(title)
        .fetch_one(&self.pool)
        .await
        .context("Failed to upsert page")?;
        Ok(page)
    }

    async fn find_page_by_document_id(
        &self,
        connector_id: ConnectorId,
        configuration_id: ConfigurationId,
        document_id: &str,
    ) -> Result<Option<Page>> {
        let page = sqlx::query_as::<_, Page>(
            r#"
            SELECT * FROM webcrawler_pages
            WHERE connector_id = $1 AND configuration_id = $2 AND document_id = $3
            "#,
        )
        .bind(connector_id)
        .bind(configuration_id)
        .bind(document_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find page by document id")?;
        Ok(page)
    }

    async fn find_pages_by_parent(
        &self,
        connector_id: ConnectorId,
        configuration_id: ConfigurationId,
        parent_url: Option<&str>,
    ) -> Result<Vec<Page>> {
        let pages = sqlx::query_as::<_, Page>(
            r#"
            SELECT * FROM webcrawler_pages
            WHERE connector_id = $1
              AND configuration_id = $2
              AND parent_url IS NOT DISTINCT FROM $3
            "#,
        )
        .bind(connector_id)
        .bind(configuration_id)
        .bind(parent_url)
        .fetch_all(&self.pool)
        .await
        .context("Failed to find pages by parent url")?;
        Ok(pages)
    }

    async fn find_pages_by_document_ids(
        &self,
        connector_id: ConnectorId,
        configuration_id: ConfigurationId,
        document_ids: &[String],
    ) -> Result<Vec<Page>> {
        let pages = sqlx::query_as::<_, Page>(
            r#"
            SELECT * FROM webcrawler_pages
            WHERE connector_id = $1 AND configuration_id = $2 AND document_id = ANY($3)
            "#,
        )
        .bind(connector_id)
        .bind(configuration_id)
        .bind(document_ids)
        .fetch_all(&self.pool)
        .await
        .context("Failed to find pages by document id set")?;
        Ok(pages)
    }
}
