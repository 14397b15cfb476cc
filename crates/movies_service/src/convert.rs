//! Movie -> GrpcMovie field mapping

use chrono::NaiveTime;
use contracts::{ContractError, GrpcMovie, Movie};

/// Convert a domain movie into its wire message
///
/// Optional attributes are carried over only when present. A release date
/// becomes the timestamp of its start of day in UTC.
pub fn movie_to_wire(movie: Movie) -> Result<GrpcMovie, ContractError> {
    let duration = prost_types::Duration::try_from(movie.duration)
        .map_err(|e| ContractError::transform(&movie.id, format!("duration: {e}")))?;

    let release_date = movie.release_date.map(|date| {
        let instant = date.and_time(NaiveTime::MIN).and_utc();
        prost_types::Timestamp {
            seconds: instant.timestamp(),
            nanos: 0,
        }
    });

    Ok(GrpcMovie {
        id: movie.id,
        title: movie.title,
        studio: movie.studio,
        content_rating: movie.content_rating,
        genres: movie.genres,
        tagline: movie.tagline,
        summary: movie.summary,
        directors: movie.directors,
        roles: movie.roles,
        critics_rating: movie.critics_rating,
        audience_rating: movie.audience_rating,
        year: movie.year,
        release_date,
        duration: Some(duration),
    })
}
