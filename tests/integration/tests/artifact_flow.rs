//! Artifact issue and resolution tests.

use std::sync::Arc;

use chrono::Duration;
use kc_cache::StorageService;
use kc_core::{EventType, SecurityConfig};
use kc_protocol_saml::artifact::{
    ArtifactIssuer, ArtifactMap, ArtifactResolver, JsonMessageSerializer, StorageArtifactMap,
    ARTIFACT_MAP_PARTITION,
};
use kc_protocol_saml::{ResolutionError, Saml2Artifact};
use serde::{Deserialize, Serialize};

use crate::common::TestEnv;

const IDP: &str = "https://idp.example.org";
const SP: &str = "https://sp.example.org";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Response {
    id: String,
    in_response_to: String,
    status: String,
}

fn response() -> Response {
    Response {
        id: "_r1".to_string(),
        in_response_to: "_a1".to_string(),
        status: "urn:oasis:names:tc:SAML:2.0:status:Success".to_string(),
    }
}

struct Exchange {
    env: TestEnv,
    map: Arc<StorageArtifactMap<Response>>,
    issuer: ArtifactIssuer<Response>,
    resolver: ArtifactResolver<Response>,
}

fn exchange() -> anyhow::Result<Exchange> {
    let env = TestEnv::new(&[]);
    let map = Arc::new(
        StorageArtifactMap::<Response>::builder()
            .storage(env.storage.clone())
            .serializer(Arc::new(JsonMessageSerializer::new()))
            .clock(env.clock.clone())
            .config(&SecurityConfig::default())
            .build()?,
    );
    let issuer = ArtifactIssuer::new(map.clone(), IDP).with_listener(env.recorder.clone());
    let resolver = ArtifactResolver::new(map.clone(), IDP).with_listener(env.recorder.clone());
    Ok(Exchange {
        env,
        map,
        issuer,
        resolver,
    })
}

#[test]
fn artifact_resolves_exactly_once() -> anyhow::Result<()> {
    let x = exchange()?;
    let artifact = x.issuer.issue(SP, &response())?;
    assert!(Saml2Artifact::parse(&artifact)?.is_from(IDP));

    let message = x.resolver.resolve(&artifact, SP)?;
    assert_eq!(*message, response());

    let again = x.resolver.resolve(&artifact, SP);
    assert!(matches!(again, Err(ResolutionError::UnableToResolve)));

    let kinds: Vec<EventType> = x.env.recorder.events().iter().map(|e| e.event_type).collect();
    assert_eq!(
        kinds,
        vec![
            EventType::ArtifactIssued,
            EventType::ArtifactResolved,
            EventType::ArtifactResolutionFailed
        ]
    );
    Ok(())
}

#[test]
fn wrong_requester_burns_the_artifact() -> anyhow::Result<()> {
    let x = exchange()?;
    let artifact = x.issuer.issue(SP, &response())?;

    let err = x.resolver.resolve(&artifact, "https://other-sp.example.org").unwrap_err();
    assert_eq!(err.to_string(), "unable to resolve artifact");
    assert!(!x.map.contains(&artifact)?);

    // The legitimate relying party is now also turned away.
    assert!(x.resolver.resolve(&artifact, SP).is_err());
    Ok(())
}

#[test]
fn expired_artifact_is_unresolvable_and_reaped() -> anyhow::Result<()> {
    let x = exchange()?;
    let artifact = x.issuer.issue(SP, &response())?;
    assert!(x.map.contains(&artifact)?);

    x.env.clock.advance(Duration::seconds(61));
    assert!(matches!(
        x.resolver.resolve(&artifact, SP),
        Err(ResolutionError::UnableToResolve)
    ));

    let another = x.issuer.issue(SP, &response())?;
    x.env.clock.advance(Duration::seconds(61));
    x.env.storage.reap(ARTIFACT_MAP_PARTITION)?;
    assert!(!x.map.contains(&another)?);
    assert!(x.env.storage.is_empty());
    Ok(())
}

#[test]
fn concurrent_resolution_yields_a_single_winner() -> anyhow::Result<()> {
    let x = Arc::new(exchange()?);
    let artifact = x.issuer.issue(SP, &response())?;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let x = Arc::clone(&x);
            let artifact = artifact.clone();
            std::thread::spawn(move || x.resolver.resolve(&artifact, SP).is_ok())
        })
        .collect();

    let winners = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|won| *won)
        .count();
    assert_eq!(winners, 1);
    Ok(())
}
