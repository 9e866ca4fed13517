//! Command handlers.

use crate::error::CliError;
use crate::{Cli, Command};
use chrono::Utc;
use earthshot::caption::format_caption;
use earthshot::config::EarthshotConfig;
use earthshot::history::{PostHistory, PostKey};
use earthshot::http::{Credentials, ReqwestClient};
use earthshot::pipeline::{Acquisition, AcquisitionPipeline, TokioBackoff};
use earthshot::publish::{FilePublisher, Publisher};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use tracing::info;

const USER_ENV: &str = "EARTHSHOT_CATALOG_USER";
const PASSWORD_ENV: &str = "EARTHSHOT_CATALOG_PASSWORD";

pub async fn dispatch(cli: Cli) -> Result<(), CliError> {
    let config = build_config(&cli)?;
    let work_dir = match &cli.work_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            dir.clone()
        }
        None => std::env::temp_dir(),
    };

    // Catalog/preview requests and streamed archive downloads run under
    // separate deadlines; only the latter is allowed to take minutes.
    let http = ReqwestClient::with_timeouts(
        config.retry.request_timeout_secs,
        config.retry.archive_timeout_secs,
    )?;
    let publisher = FilePublisher::new(&cli.output_dir);
    let mut rng = StdRng::from_entropy();

    match cli.command {
        Command::Once { max_attempts } => {
            let mut config = config;
            config.retry = config.retry.with_max_attempts(max_attempts);
            let pipeline = AcquisitionPipeline::new(http, config, TokioBackoff, work_dir);

            let acquisition = pipeline.run_until_success(&mut rng).await?;
            publish_acquisition(&publisher, &acquisition).await?;
            Ok(())
        }
        Command::Run {
            interval_secs,
            history_window,
        } => {
            let pipeline = AcquisitionPipeline::new(http, config, TokioBackoff, work_dir);
            let mut history = PostHistory::new(history_window);

            loop {
                let acquisition = pipeline.run_until_success(&mut rng).await?;

                // Geocoding is an external collaborator; until one is wired
                // in, duplicate avoidance keys on the one-degree cell.
                let key = PostKey::new(
                    &format!(
                        "cell:{:.0}:{:.0}",
                        acquisition.candidate.latitude, acquisition.candidate.longitude
                    ),
                    acquisition.scene.acquisition_date,
                );
                if history.would_repeat(&key) {
                    info!(region = key.region(), "recently posted this area, redrawing");
                    continue;
                }

                publish_acquisition(&publisher, &acquisition).await?;
                history.record(key);

                info!(interval_secs, "sleeping until next cycle");
                tokio::time::sleep(Duration::from_secs(interval_secs)).await;
            }
        }
    }
}

async fn publish_acquisition(
    publisher: &FilePublisher,
    acquisition: &Acquisition,
) -> Result<(), CliError> {
    let caption = format_caption(acquisition, None);
    let name = format!(
        "earthshot-{}-{}",
        acquisition.scene.acquisition_date.format("%Y%m%d"),
        Utc::now().format("%H%M%S"),
    );
    publisher
        .publish(&name, &acquisition.image, &caption, acquisition.band_set)
        .await?;
    info!(
        name,
        attempts = acquisition.attempts,
        false_colour = acquisition.band_set.is_false_colour(),
        "scene published"
    );
    Ok(())
}

fn build_config(cli: &Cli) -> Result<EarthshotConfig, CliError> {
    let user = std::env::var(USER_ENV).map_err(|_| CliError::MissingEnv(USER_ENV))?;
    let password = std::env::var(PASSWORD_ENV).map_err(|_| CliError::MissingEnv(PASSWORD_ENV))?;

    let mut config = EarthshotConfig::new().with_credentials(Credentials::new(user, password));

    if let Some(endpoint) = &cli.endpoint {
        config.catalog = config.catalog.with_search_endpoint(endpoint.clone());
    }
    if let Some(ceiling) = cli.cloud_cover {
        config.catalog = config.catalog.with_cloud_cover_ceiling(ceiling);
    }
    if let Some(probability) = cli.false_colour_probability {
        config.imaging = config.imaging.with_false_colour_probability(probability);
    }
    if let Some(threshold) = cli.preview_threshold {
        config.imaging = config.imaging.with_preview_threshold(threshold);
    }

    Ok(config)
}
