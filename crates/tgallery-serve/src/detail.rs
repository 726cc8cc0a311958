//! Detail resolution: one image plus a few random neighbours.

use serde::Serialize;

use crate::error::GalleryError;
use crate::query::{self, ImageRecord};
use crate::store::Store;

/// Maximum number of related images shown next to a detail view.
pub const RELATED_LIMIT: u32 = 4;

/// Everything a detail page needs.
#[derive(Debug, Clone, Serialize)]
pub struct DetailContext {
    /// The requested record.
    pub record: ImageRecord,
    /// First caption line, or the placeholder title.
    pub title: String,
    /// Tag pills, in stored order.
    pub tags: Vec<String>,
    /// Up to [`RELATED_LIMIT`] other records in random order.
    pub related: Vec<ImageRecord>,
}

/// Resolve a detail request for the raw path identifier.
///
/// Identifiers that are not integers cannot exist and are reported as not
/// found. A store fault on the primary lookup is an error; a fault while
/// sampling related images only empties the related list.
pub async fn resolve_detail(store: &Store, raw_id: &str) -> Result<DetailContext, GalleryError> {
    let id: i64 = raw_id
        .parse()
        .map_err(|_| GalleryError::NotFound(format!("image {raw_id}")))?;

    let record = query::fetch_image(store, id)
        .await?
        .ok_or_else(|| GalleryError::NotFound(format!("image {id}")))?;

    let related = match query::fetch_related(store, id, RELATED_LIMIT).await {
        Ok(related) => related,
        Err(e) => {
            tracing::warn!(id, error = %e, "related image sampling failed");
            Vec::new()
        }
    };

    Ok(DetailContext {
        title: record.title().to_string(),
        tags: record.tag_list().into_iter().map(str::to_string).collect(),
        record,
        related,
    })
}
