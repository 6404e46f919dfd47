//! Metadata template update builder.

use rtk_core::entities::MetadataFieldDef;

#[derive(Debug, Clone, Default)]
pub struct MetadataTemplateUpdate {
    pub name: Option<String>,
    pub version: Option<i64>,
    pub fields: Option<Vec<MetadataFieldDef>>,
}

pub struct MetadataTemplateUpdateBuilder(MetadataTemplateUpdate);

impl MetadataTemplateUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(MetadataTemplateUpdate::default())
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.0.name = Some(name.into());
        self
    }

    #[must_use]
    pub const fn version(mut self, version: i64) -> Self {
        self.0.version = Some(version);
        self
    }

    #[must_use]
    pub fn fields(mut self, fields: Vec<MetadataFieldDef>) -> Self {
        self.0.fields = Some(fields);
        self
    }

    #[must_use]
    pub fn build(self) -> MetadataTemplateUpdate {
        self.0
    }
}

impl Default for MetadataTemplateUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
