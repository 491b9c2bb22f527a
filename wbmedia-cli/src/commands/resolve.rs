//! `wbmedia resolve` command.

use clap::Args;
use wbmedia::config::ConfigFile;
use wbmedia::{MediaRequest, MediaResolution};

use super::common::{parse_article, start_app};
use crate::error::CliError;

/// Arguments of `wbmedia resolve`.
#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Article number or product link
    pub article: String,

    /// Do not search for a video
    #[arg(long)]
    pub skip_video: bool,

    /// Do not resolve the photo shard or enumerate photos
    #[arg(long)]
    pub skip_photos: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the resolve command.
pub async fn run(args: ResolveArgs, config: &ConfigFile) -> Result<(), CliError> {
    let id = parse_article(&args.article)?;
    let request = MediaRequest {
        skip_video: args.skip_video,
        skip_photos: args.skip_photos,
    };

    let (app, cancel) = start_app(config).await?;
    let result = app.service().fetch(id, request, None, &cancel).await;
    app.shutdown().await;

    let resolution = result?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
        return Ok(());
    }

    match resolution {
        MediaResolution::Found(media) => {
            println!("Article {}", media.id);
            if !args.skip_photos {
                println!("Photos: {}", media.photos.len());
                for url in &media.photos {
                    println!("  {}", url);
                }
            }
            if !args.skip_video {
                match &media.video {
                    Some(url) => println!("Video:  {}", url),
                    None => println!("Video:  (none)"),
                }
            }
        }
        MediaResolution::NotFound => println!("Article {} was not found on the CDN", id),
        MediaResolution::NoMedia => println!("Article {} has no photos or video", id),
    }

    Ok(())
}
