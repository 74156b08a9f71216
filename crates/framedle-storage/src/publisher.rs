//! Publishing extracted frames to blob storage.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{info, warn};

use framedle_models::constants::{IMAGE_CACHE_CONTROL, IMAGE_CONTENT_TYPE};
use framedle_models::{
    frame_object_key, variant_object_key, ExtractedMoment, PublishedFrame, VideoId,
};

use crate::error::StorageResult;
use crate::sink::BlobSink;

/// Uploads main frames and variants, one moment at a time.
#[derive(Clone)]
pub struct Publisher {
    sink: Option<Arc<dyn BlobSink>>,
}

impl Publisher {
    /// `None` selects degraded mode: nothing is uploaded.
    pub fn new(sink: Option<Arc<dyn BlobSink>>) -> Self {
        Self { sink }
    }

    pub fn is_configured(&self) -> bool {
        self.sink.is_some()
    }

    /// Upload every moment and return its locations keyed by rank.
    ///
    /// A moment appears in the result only once its main image and all of
    /// its variants are stored; the first failed upload aborts the call.
    pub async fn publish(
        &self,
        video_id: &VideoId,
        moments: &[ExtractedMoment],
    ) -> StorageResult<HashMap<u32, PublishedFrame>> {
        let Some(sink) = &self.sink else {
            warn!(
                video_id = %video_id,
                "No blob sink configured, skipping upload of {} frames",
                moments.len()
            );
            return Ok(HashMap::new());
        };

        let mut published = HashMap::with_capacity(moments.len());

        for moment in moments {
            let rank = moment.rank();

            let main_key = frame_object_key(video_id, rank);
            let main_upload = sink.put(
                &main_key,
                moment.frame.bytes.clone(),
                IMAGE_CONTENT_TYPE,
                IMAGE_CACHE_CONTROL,
            );

            let variant_uploads = moment.variants.iter().map(|(name, image)| {
                let key = variant_object_key(video_id, rank, name);
                let sink = Arc::clone(sink);
                let bytes = image.bytes.clone();
                async move {
                    let location = sink
                        .put(&key, bytes, IMAGE_CONTENT_TYPE, IMAGE_CACHE_CONTROL)
                        .await?;
                    StorageResult::Ok((name.clone(), location))
                }
            });

            let (main_location, variant_locations) =
                futures::try_join!(main_upload, try_join_all(variant_uploads))?;

            info!(
                video_id = %video_id,
                rank = rank,
                "Uploaded frame {} with {} variants",
                main_location,
                variant_locations.len()
            );

            published.insert(
                rank,
                PublishedFrame {
                    main_location,
                    variant_locations: variant_locations.into_iter().collect::<BTreeMap<_, _>>(),
                },
            );
        }

        Ok(published)
    }
}
