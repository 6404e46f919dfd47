//! Repository methods, one module per entity, all implemented on
//! [`RiskService`](crate::service::RiskService).

pub mod assessment;
pub mod metadata_template;
pub mod question_pool;
pub mod study;
