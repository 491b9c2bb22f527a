//! `wbmedia coords` command.

use wbmedia::cdn::CdnUrls;
use wbmedia::config::ConfigFile;
use wbmedia::coord::{derive_coordinates, ShardNumber, MIN_SHARD};

use super::common::parse_article;
use crate::error::CliError;

/// Print the coordinates of an article and the URL shapes derived from them.
pub fn run(article: &str, config: &ConfigFile) -> Result<(), CliError> {
    let id = parse_article(article)?;
    let coords = derive_coordinates(id);
    let urls = CdnUrls::new(config.cdn.clone());

    let first = ShardNumber::new(MIN_SHARD).map_err(|e| CliError::Config(e.to_string()))?;
    let first_vol = *config.video.hot_volumes.start();

    println!("Article:      {}", id);
    println!("Photo volume: {}", coords.photo_volume);
    println!("Photo part:   {}", coords.photo_part);
    println!("Video part:   {}", coords.video_part);
    println!();
    println!("Photo URL (shard {}):  {}", first, urls.photo_url(id, &coords, first, 1));
    println!(
        "HLS URL (shard {}, vol {}): {}",
        first,
        first_vol,
        urls.hls_url(id, &coords, first, first_vol)
    );
    println!("Legacy video URL:      {}", urls.legacy_video_url(id));
    Ok(())
}
