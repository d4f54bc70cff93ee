//! Lazy ingestion of catalog search results
//!
//! Search hits become local track rows the first time they are seen. A hit
//! whose catalog id is already stored is returned from the local table
//! instead of being inserted again, so repeated searches never duplicate
//! rows. Each hit is handled independently: a failed audio-feature lookup
//! skips that hit and the rest of the batch still lands.

use sqlx::SqlitePool;

use crate::db;
use crate::models::{AudioFeatures, NewTrack, Track};
use crate::services::catalog::{CatalogClient, CatalogError, TrackHit};
use crate::AppResult;

/// What a catalog search produced after ingestion
#[derive(Debug)]
pub struct SearchOutcome {
    /// Local rows for every hit, existing and newly ingested alike
    pub tracks: Vec<Track>,
    /// Hits skipped because their audio features could not be fetched
    pub failed_lookups: usize,
}

/// Run a catalog search and make every hit available locally
///
/// A search failure fails the whole operation. Per-hit feature lookups
/// are independent; a failure there drops only that hit.
pub async fn search_and_ingest(
    pool: &SqlitePool,
    catalog: &CatalogClient,
    query: &str,
) -> AppResult<SearchOutcome> {
    let hits = catalog.search_tracks(query).await?;

    let mut outcome = SearchOutcome {
        tracks: Vec::with_capacity(hits.len()),
        failed_lookups: 0,
    };

    for hit in hits {
        // Known ids skip the features call outright
        if let Some(existing) = db::tracks::find_by_catalog_id(pool, &hit.catalog_id).await? {
            outcome.tracks.push(existing);
            continue;
        }

        let lookup = catalog.audio_features(&hit.catalog_id).await;
        record_hit(pool, &mut outcome, &hit, lookup).await?;
    }

    Ok(outcome)
}

/// Fold one hit and its feature-lookup outcome into the running result
///
/// A successful lookup stores the hit (or reuses the row a concurrent
/// request stored); a failed lookup drops this hit alone and counts it.
/// Storage faults still abort the batch.
async fn record_hit(
    pool: &SqlitePool,
    outcome: &mut SearchOutcome,
    hit: &TrackHit,
    lookup: Result<AudioFeatures, CatalogError>,
) -> AppResult<()> {
    match lookup {
        Ok(features) => {
            let (track, created) = ingest_hit(pool, hit, &features).await?;
            if created {
                tracing::info!(
                    catalog_id = %track.catalog_id,
                    name = %track.name,
                    "Ingested new track from catalog"
                );
            }
            outcome.tracks.push(track);
        }
        Err(e) => {
            tracing::warn!(
                catalog_id = %hit.catalog_id,
                name = %hit.name,
                "Skipping hit, audio features unavailable: {}",
                e
            );
            outcome.failed_lookups += 1;
        }
    }

    Ok(())
}

/// Store one hit locally, unless its catalog id arrived in the meantime
///
/// Returns the local row and whether this call created it.
pub async fn ingest_hit(
    pool: &SqlitePool,
    hit: &TrackHit,
    features: &AudioFeatures,
) -> AppResult<(Track, bool)> {
    // A concurrent request may have stored the same catalog id since the
    // caller's check. The oldest row wins either way.
    if let Some(existing) = db::tracks::find_by_catalog_id(pool, &hit.catalog_id).await? {
        return Ok((existing, false));
    }

    let new_track = NewTrack {
        catalog_id: hit.catalog_id.clone(),
        name: hit.name.clone(),
        artist: hit.artist.clone(),
        album: hit.album.clone(),
        features: features.clone(),
    };

    let track = db::tracks::insert_track(pool, &new_track).await?;
    Ok((track, true))
}
