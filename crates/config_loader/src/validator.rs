//! Configuration validation
//!
//! Rules:
//! - movie id non-empty and unique
//! - movie title non-empty
//! - relay.channel_capacity > 0
//! - relay.write_high_water_bytes > 0
//! - service.metrics_prefix non-empty

use std::collections::HashSet;

use contracts::{ContractError, ServiceBlueprint};

/// Validate ServiceBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &ServiceBlueprint) -> Result<(), ContractError> {
    validate_service(blueprint)?;
    validate_relay(blueprint)?;
    validate_movie_ids(blueprint)?;
    validate_movie_titles(blueprint)?;
    Ok(())
}

fn validate_service(blueprint: &ServiceBlueprint) -> Result<(), ContractError> {
    if blueprint.service.metrics_prefix.trim().is_empty() {
        return Err(ContractError::config_validation(
            "service.metrics_prefix",
            "metrics prefix cannot be empty",
        ));
    }
    Ok(())
}

fn validate_relay(blueprint: &ServiceBlueprint) -> Result<(), ContractError> {
    let relay = &blueprint.relay;

    if relay.channel_capacity == 0 {
        return Err(ContractError::config_validation(
            "relay.channel_capacity",
            "channel_capacity must be > 0",
        ));
    }
    if relay.write_high_water_bytes == 0 {
        return Err(ContractError::config_validation(
            "relay.write_high_water_bytes",
            "write_high_water_bytes must be > 0",
        ));
    }
    Ok(())
}

/// Movie ids must be present and unique across the catalog
fn validate_movie_ids(blueprint: &ServiceBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, movie) in blueprint.movies.iter().enumerate() {
        if movie.id.is_empty() {
            return Err(ContractError::config_validation(
                format!("movies[{}].id", idx),
                "movie id cannot be empty",
            ));
        }
        if !seen.insert(&movie.id) {
            return Err(ContractError::config_validation(
                format!("movies[id={}]", movie.id),
                "duplicate movie id",
            ));
        }
    }
    Ok(())
}

fn validate_movie_titles(blueprint: &ServiceBlueprint) -> Result<(), ContractError> {
    for movie in &blueprint.movies {
        if movie.title.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("movies[id={}].title", movie.id),
                "movie title cannot be empty",
            ));
        }
    }
    Ok(())
}
