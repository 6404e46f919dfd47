//! Metadata template repository — CRUD with field-definition validation.
//!
//! Field lists are validated on create and whenever an update replaces them;
//! an invalid list is rejected before anything touches the store.

use chrono::Utc;

use rtk_core::entities::{MetadataTemplate, MetadataTemplateCreate};
use rtk_core::ids::PREFIX_TEMPLATE;
use rtk_core::metadata::validate_fields;

use crate::error::DatabaseError;
use crate::helpers::{ensure_id, parse_datetime, parse_json, to_json};
use crate::service::RiskService;
use crate::updates::metadata_template::MetadataTemplateUpdate;

const TEMPLATE_COLS: &str = "id, name, version, fields, created_at, updated_at";

fn row_to_template(row: &libsql::Row) -> Result<MetadataTemplate, DatabaseError> {
    Ok(MetadataTemplate {
        id: row.get(0)?,
        name: row.get(1)?,
        version: row.get(2)?,
        fields: parse_json(&row.get::<String>(3)?, "metadata_templates.fields")?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
        updated_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

impl RiskService {
    pub async fn create_metadata_template(
        &self,
        payload: MetadataTemplateCreate,
    ) -> Result<MetadataTemplate, DatabaseError> {
        validate_fields(&payload.fields)?;

        let id = self.db().generate_id(PREFIX_TEMPLATE).await?;
        let now = Utc::now();
        self.db()
            .conn()
            .execute(
                "INSERT INTO metadata_templates (id, name, version, fields, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                libsql::params![
                    id.as_str(),
                    payload.name.as_str(),
                    payload.version,
                    to_json(&payload.fields)?,
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        Ok(MetadataTemplate {
            id,
            name: payload.name,
            version: payload.version,
            fields: payload.fields,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_metadata_template(
        &self,
        template_id: &str,
    ) -> Result<MetadataTemplate, DatabaseError> {
        ensure_id(template_id, PREFIX_TEMPLATE)?;
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {TEMPLATE_COLS} FROM metadata_templates WHERE id = ?1"),
                [template_id],
            )
            .await?;
        let row = rows.next().await?.ok_or_else(|| DatabaseError::NotFound {
            entity_type: "Metadata template",
            id: template_id.to_string(),
        })?;
        row_to_template(&row)
    }

    pub async fn list_metadata_templates(&self) -> Result<Vec<MetadataTemplate>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {TEMPLATE_COLS} FROM metadata_templates ORDER BY created_at, id"),
                (),
            )
            .await?;

        let mut templates = Vec::new();
        while let Some(row) = rows.next().await? {
            templates.push(row_to_template(&row)?);
        }
        Ok(templates)
    }

    pub async fn update_metadata_template(
        &self,
        template_id: &str,
        update: MetadataTemplateUpdate,
    ) -> Result<MetadataTemplate, DatabaseError> {
        ensure_id(template_id, PREFIX_TEMPLATE)?;

        if let Some(fields) = &update.fields {
            validate_fields(fields)?;
        }

        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();
        let mut idx = 1;

        if let Some(ref name) = update.name {
            sets.push(format!("name = ?{idx}"));
            params.push(name.as_str().into());
            idx += 1;
        }
        if let Some(version) = update.version {
            sets.push(format!("version = ?{idx}"));
            params.push(version.into());
            idx += 1;
        }
        if let Some(ref fields) = update.fields {
            sets.push(format!("fields = ?{idx}"));
            params.push(to_json(fields)?.into());
            idx += 1;
        }

        if sets.is_empty() {
            return self.get_metadata_template(template_id).await;
        }

        sets.push(format!("updated_at = ?{idx}"));
        params.push(Utc::now().to_rfc3339().into());
        idx += 1;

        let sql = format!(
            "UPDATE metadata_templates SET {} WHERE id = ?{idx}",
            sets.join(", ")
        );
        params.push(template_id.into());

        self.db()
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;

        self.get_metadata_template(template_id).await
    }

    /// Delete a template and return the deleted snapshot.
    pub async fn delete_metadata_template(
        &self,
        template_id: &str,
    ) -> Result<MetadataTemplate, DatabaseError> {
        let existing = self.get_metadata_template(template_id).await?;
        self.db()
            .conn()
            .execute(
                "DELETE FROM metadata_templates WHERE id = ?1",
                [template_id],
            )
            .await?;
        Ok(existing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{select_severity_field, test_service, text_field};
    use crate::updates::metadata_template::MetadataTemplateUpdateBuilder;
    use pretty_assertions::assert_eq;
    use rtk_core::metadata::ValidationError;

    #[tokio::test]
    async fn create_template_roundtrip() {
        let svc = test_service().await;
        let created = svc
            .create_metadata_template(MetadataTemplateCreate {
                name: "Oncology defaults".into(),
                version: 1,
                fields: vec![text_field("phase"), select_severity_field(true)],
            })
            .await
            .unwrap();

        assert!(created.id.starts_with("mdt-"));
        assert_eq!(created.version, 1);

        let fetched = svc.get_metadata_template(&created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn create_rejects_duplicate_field_keys() {
        let svc = test_service().await;
        let err = svc
            .create_metadata_template(MetadataTemplateCreate {
                name: "bad".into(),
                version: 1,
                fields: vec![text_field("phase"), text_field("phase")],
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DatabaseError::Validation(ValidationError::DuplicateFieldKey { .. })
        ));

        // Rejected create leaves the store untouched.
        assert!(svc.list_metadata_templates().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_validates_replaced_fields() {
        let svc = test_service().await;
        let template = svc
            .create_metadata_template(MetadataTemplateCreate {
                name: "t".into(),
                version: 1,
                fields: vec![text_field("phase")],
            })
            .await
            .unwrap();

        let update = MetadataTemplateUpdateBuilder::new()
            .fields(vec![text_field("a"), text_field("a")])
            .build();
        let err = svc
            .update_metadata_template(&template.id, update)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(_)));

        // Original fields preserved.
        let fetched = svc.get_metadata_template(&template.id).await.unwrap();
        assert_eq!(fetched.fields, template.fields);
    }

    #[tokio::test]
    async fn update_is_a_partial_merge() {
        let svc = test_service().await;
        let template = svc
            .create_metadata_template(MetadataTemplateCreate {
                name: "before".into(),
                version: 3,
                fields: vec![text_field("phase")],
            })
            .await
            .unwrap();

        let update = MetadataTemplateUpdateBuilder::new().name("after").build();
        let updated = svc
            .update_metadata_template(&template.id, update)
            .await
            .unwrap();

        assert_eq!(updated.name, "after");
        assert_eq!(updated.version, 3);
        assert_eq!(updated.fields, template.fields);
    }

    #[tokio::test]
    async fn delete_returns_the_deleted_snapshot() {
        let svc = test_service().await;
        let template = svc
            .create_metadata_template(MetadataTemplateCreate {
                name: "t".into(),
                version: 1,
                fields: vec![],
            })
            .await
            .unwrap();

        let deleted = svc.delete_metadata_template(&template.id).await.unwrap();
        assert_eq!(deleted, template);

        let err = svc.get_metadata_template(&template.id).await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[tokio::test]
    async fn malformed_id_is_a_bad_identifier() {
        let svc = test_service().await;
        let err = svc.get_metadata_template("nonsense").await.unwrap_err();
        assert!(matches!(err, DatabaseError::BadIdentifier { .. }));
    }
}
