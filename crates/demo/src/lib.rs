//! Event-sourced entity demo.
//!
//! Saves an entity's creation and two renames, loading the entity back from
//! its history after each step.

pub mod config;
pub mod entity;

use chrono::Utc;
use eventsource::{Context, Model, Repository, RepositoryError, Version};

pub use config::Config;
pub use entity::{Entity, EntityCreated, EntityNameSet};

/// Builds a repository for [`Entity`], writing diagnostics to stderr when enabled.
pub fn repository(config: &Config) -> Repository<Entity> {
    let prototype = Model::default();
    let builder = Repository::<Entity>::builder()
        .bind(&EntityCreated {
            model: prototype.clone(),
        })
        .bind(&EntityNameSet {
            model: prototype,
            name: String::new(),
        });
    if config.debug {
        builder.debug(std::io::stderr()).build()
    } else {
        builder.build()
    }
}

/// Runs the create, rename, rename scenario and returns the final entity.
#[tracing::instrument(skip_all, fields(aggregate_id = %config.aggregate_id))]
pub async fn run(config: &Config) -> Result<Entity, RepositoryError> {
    let repository = repository(config);
    let ctx = Context::background();
    let id = config.aggregate_id.as_str();

    repository
        .save(
            &ctx,
            &[
                &EntityCreated {
                    model: Model::new(id, Version::initial(), Utc::now()),
                },
                &EntityNameSet {
                    model: Model::new(id, Version::first(), Utc::now()),
                    name: "Jones".to_string(),
                },
            ],
        )
        .await?;

    let entity = repository.load(&ctx, id).await?;
    tracing::info!(name = %entity.name, version = %entity.version, "entity loaded");

    repository
        .save(
            &ctx,
            &[&EntityNameSet {
                model: Model::new(id, entity.version.next(), Utc::now()),
                name: "Sarah".to_string(),
            }],
        )
        .await?;

    let entity = repository.load(&ctx, id).await?;
    tracing::info!(name = %entity.name, version = %entity.version, "entity loaded");

    Ok(entity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scenario_ends_with_second_name() {
        let config = Config {
            aggregate_id: "demo-1".to_string(),
            ..Config::default()
        };

        let entity = run(&config).await.unwrap();
        assert_eq!(entity.id, "demo-1");
        assert_eq!(entity.name, "Sarah");
        assert_eq!(entity.version, Version::new(2));
        assert!(entity.created_at.is_some());
    }
}
