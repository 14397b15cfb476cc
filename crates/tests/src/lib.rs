//! # Integration Tests
//!
//! End-to-end tests across the workspace crates.
//!
//! Covers:
//! - Contract smoke tests
//! - Config -> catalog -> service -> sink streams
//! - Terminal semantics (completion, source failure, closed sink) with timers

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
    }

    #[test]
    fn test_shipped_config_is_valid() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../media-relay.toml");
        let blueprint = config_loader::ConfigLoader::load_from_path(&path).unwrap();

        assert_eq!(blueprint.service.metrics_prefix, "media_relay.movies");
        assert_eq!(blueprint.movies.len(), 3);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{ContractError, GrpcMovie, MediaService, Movie, SearchRequest};
    use media_source::{CatalogMediaService, ScriptedMediaService};
    use movies_service::MoviesStreamService;
    use observability::TimerRegistry;
    use relay::{ChannelSink, FramedSink, RelayError};
    use tokio::sync::mpsc;

    const CATALOG: &str = r#"
version = "V1"

[service]
metrics_prefix = "e2e.movies"

[relay]
channel_capacity = 2
write_high_water_bytes = 64

[[movies]]
id = "tt0078748"
title = "Alien"
studio = "20th Century Fox"
genres = "Horror, Sci-Fi"
tagline = "In space no one can hear you scream."
year = 1979
release_date = "1979-05-25"
duration_secs = 7020
critics_rating = 9.8

[[movies]]
id = "tt0113277"
title = "Heat"
genres = "Crime, Drama"
summary = "A group of professional bank robbers start to feel the heat."
year = 1995
duration_secs = 10200

[[movies]]
id = "tt0088846"
title = "Brazil"
summary = "A daydreamer escapes into fantasies, far from outer space."
"#;

    fn service_for(media: impl MediaService + 'static) -> (MoviesStreamService, TimerRegistry) {
        let registry = TimerRegistry::new();
        let service = MoviesStreamService::with_registry(Arc::new(media), "e2e.movies", &registry);
        (service, registry)
    }

    async fn collect(mut rx: mpsc::Receiver<GrpcMovie>) -> Vec<GrpcMovie> {
        let mut movies = Vec::new();
        while let Some(movie) = rx.recv().await {
            movies.push(movie);
        }
        movies
    }

    /// Config -> CatalogMediaService -> MoviesStreamService -> ChannelSink
    #[tokio::test]
    async fn test_e2e_catalog_get() {
        let blueprint = ConfigLoader::load_from_str(CATALOG, ConfigFormat::Toml).unwrap();
        let (service, _registry) = service_for(CatalogMediaService::from_blueprint(&blueprint));
        let (sink, rx) = ChannelSink::bounded("e2e", blueprint.relay.channel_capacity);

        let handle = service.get(sink);
        let movies = collect(rx).await;
        let outcome = handle.await.unwrap();

        assert!(outcome.is_completed());
        assert_eq!(outcome.written(), 3);
        let titles: Vec<_> = movies.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Alien", "Heat", "Brazil"]);

        let alien = &movies[0];
        assert_eq!(alien.year, Some(1979));
        assert_eq!(alien.critics_rating, Some(9.8));
        assert_eq!(alien.audience_rating, None);
        assert_eq!(alien.release_date.as_ref().map(|t| t.seconds), Some(296_438_400));
        assert_eq!(alien.duration.as_ref().map(|d| d.seconds), Some(7020));

        let brazil = &movies[2];
        assert_eq!(brazil.year, None);
        assert_eq!(brazil.release_date, None);

        let timer = service.get_timer().snapshot();
        assert_eq!(timer.count, 1);
        assert_eq!(timer.active, 0);
    }

    #[tokio::test]
    async fn test_e2e_catalog_search() {
        let blueprint = ConfigLoader::load_from_str(CATALOG, ConfigFormat::Toml).unwrap();
        let (service, _registry) = service_for(CatalogMediaService::from_blueprint(&blueprint));
        let (sink, rx) = ChannelSink::bounded("e2e", 1);
        let request = SearchRequest {
            search_text: "  Space ".to_string(),
        };

        let handle = service.search(request, sink);
        let ids: Vec<_> = collect(rx).await.into_iter().map(|m| m.id).collect();
        let outcome = handle.await.unwrap();

        assert_eq!(ids, vec!["tt0078748", "tt0088846"]);
        assert!(outcome.is_completed());
        assert_eq!(service.search_timer().snapshot().count, 1);
    }

    /// Source yields A then B and completes
    #[tokio::test]
    async fn test_two_items_then_completion() {
        let media = ScriptedMediaService::new(vec![Movie::new("A", "A"), Movie::new("B", "B")]);
        let (service, _registry) = service_for(media);
        let (sink, rx) = ChannelSink::bounded("scenario", 4);
        let hooks = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&hooks);

        let handle = service.get_with(sink, move |outcome| {
            assert!(outcome.is_completed());
            seen.fetch_add(1, Ordering::SeqCst);
        });
        let ids: Vec<_> = collect(rx).await.into_iter().map(|m| m.id).collect();
        let outcome = handle.await.unwrap();

        // Receiver sees the end of stream only after both items
        assert_eq!(ids, vec!["A", "B"]);
        assert_eq!(outcome.written(), 2);
        assert_eq!(hooks.load(Ordering::SeqCst), 1);

        let timer = service.get_timer().snapshot();
        assert_eq!(timer.count, 1);
        assert_eq!(timer.active, 0);
    }

    /// Source yields one item then an IO error
    #[tokio::test]
    async fn test_one_item_then_io_error() {
        let media = ScriptedMediaService::new(vec![Movie::new("A", "A"), Movie::new("B", "B")])
            .fail_after(1, io::ErrorKind::UnexpectedEof);
        let (service, _registry) = service_for(media);
        let (sink, rx) = ChannelSink::bounded("scenario", 4);
        let hooks = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&hooks);

        let handle = service.get_with(sink, move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        let ids: Vec<_> = collect(rx).await.into_iter().map(|m| m.id).collect();
        let outcome = handle.await.unwrap();

        assert_eq!(ids, vec!["A"]);
        assert_eq!(outcome.written(), 1);
        assert_eq!(hooks.load(Ordering::SeqCst), 1);
        match outcome.error() {
            Some(RelayError::Source(ContractError::Io(e))) => {
                assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof)
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        let timer = service.get_timer().snapshot();
        assert_eq!(timer.count, 1);
        assert_eq!(timer.active, 0);
    }

    #[tokio::test]
    async fn test_empty_source_completes_immediately() {
        let (service, _registry) = service_for(ScriptedMediaService::new(Vec::new()));
        let (sink, rx) = ChannelSink::bounded("empty", 1);

        let handle = service.get(sink);
        assert!(collect(rx).await.is_empty());
        let outcome = handle.await.unwrap();

        assert!(outcome.is_completed());
        assert_eq!(outcome.written(), 0);
        let timer = service.get_timer().snapshot();
        assert_eq!(timer.count, 1);
        assert!(timer.last < Duration::from_secs(1));
    }

    /// A slow consumer never sees reordering or loss
    #[tokio::test]
    async fn test_slow_consumer_backpressure() {
        let movies: Vec<_> = (0..20)
            .map(|i| Movie::new(i.to_string(), format!("Movie {i}")))
            .collect();
        let (service, _registry) = service_for(CatalogMediaService::new(movies).with_buffer(1));
        let (sink, mut rx) = ChannelSink::bounded("slow", 1);

        let handle = service.get(sink);
        let mut ids = Vec::new();
        while let Some(movie) = rx.recv().await {
            if ids.len() % 5 == 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            ids.push(movie.id);
        }
        let outcome = handle.await.unwrap();

        let expected: Vec<_> = (0..20).map(|i| i.to_string()).collect();
        assert_eq!(ids, expected);
        assert_eq!(outcome.written(), 20);
    }

    /// Client hangs up mid-stream
    #[tokio::test]
    async fn test_receiver_dropped_mid_stream() {
        let movies: Vec<_> = (0..10)
            .map(|i| Movie::new(i.to_string(), format!("Movie {i}")))
            .collect();
        let media = ScriptedMediaService::new(movies).with_delay(Duration::from_millis(2));
        let (service, _registry) = service_for(media);
        let (sink, mut rx) = ChannelSink::bounded("hangup", 1);

        let handle = service.get(sink);
        let first = rx.recv().await.unwrap();
        drop(rx);
        let outcome = handle.await.unwrap();

        assert_eq!(first.id, "0");
        assert!(matches!(outcome.error(), Some(RelayError::Sink(_))));
        assert!(outcome.written() < 10);
        assert_eq!(service.get_timer().snapshot().count, 1);
    }

    #[tokio::test]
    async fn test_concurrent_invocations_share_timer() {
        let blueprint = ConfigLoader::load_from_str(CATALOG, ConfigFormat::Toml).unwrap();
        let (service, _registry) = service_for(CatalogMediaService::from_blueprint(&blueprint));

        let mut streams = Vec::new();
        for _ in 0..8 {
            let (sink, rx) = ChannelSink::bounded("concurrent", 1);
            streams.push((service.get(sink), tokio::spawn(collect(rx))));
        }
        for (handle, received) in streams {
            assert_eq!(received.await.unwrap().len(), 3);
            assert!(handle.await.unwrap().is_completed());
        }

        let timer = service.get_timer().snapshot();
        assert_eq!(timer.count, 8);
        assert_eq!(timer.active, 0);
    }

    #[tokio::test]
    async fn test_framed_sink_end_to_end() {
        let blueprint = ConfigLoader::load_from_str(CATALOG, ConfigFormat::Toml).unwrap();
        let (service, _registry) = service_for(CatalogMediaService::from_blueprint(&blueprint));
        let (client, mut server) = tokio::io::duplex(256);
        let sink = FramedSink::new("duplex", client, blueprint.relay.write_high_water_bytes);

        let reader = tokio::spawn(async move {
            use tokio::io::AsyncReadExt;
            let mut bytes = Vec::new();
            server.read_to_end(&mut bytes).await.map(|_| bytes)
        });
        let outcome = service.get(sink).await.unwrap();
        let bytes = reader.await.unwrap().unwrap();

        assert!(outcome.is_completed());
        let movies: Vec<GrpcMovie> = relay::read_frames(&bytes).unwrap();
        assert_eq!(movies.len(), 3);
        assert_eq!(movies[1].title, "Heat");
    }
}
