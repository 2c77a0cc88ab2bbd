use anyhow::Context;
use crosslink_engine::config::EngineConfig;
use crosslink_engine::data::read_snapshot_from_file;
use crosslink_engine::geometry::{analyze, distance, LosResult, OcclusionModel, Vector3};
use crosslink_engine::link::{analyze_link, analyze_link_with_velocity, LinkConfig, LinkReport};
use crosslink_engine::network::{shortest_relay_path, LinkGraph};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use log::{debug, info};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

/// Environment variable naming a compressed snapshot to route over.
const SNAPSHOT_ENV_VAR: &str = "CROSSLINK_SNAPSHOT";

static ENGINE: OnceCell<EngineState> = OnceCell::new();

struct EngineState {
    model: OcclusionModel,
    link: LinkConfig,
    network: LinkGraph,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum EngineRequest {
    Distance {
        a: [f64; 3],
        b: [f64; 3],
    },
    LineOfSight {
        a: [f64; 3],
        b: [f64; 3],
    },
    Link {
        a: [f64; 3],
        b: [f64; 3],
        #[serde(default)]
        velocity_a: Option<[f64; 3]>,
        #[serde(default)]
        velocity_b: Option<[f64; 3]>,
    },
    Route {
        start_id: u32,
        end_id: u32,
    },
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum EngineResponse {
    Distance {
        distance_km: f64,
    },
    LineOfSight {
        result: LosResult,
        clearance_km: f64,
    },
    Link(LinkReport),
    Route {
        hops: Vec<RouteHop>,
        total_km: f64,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Serialize)]
struct RouteHop {
    id: u32,
    name: String,
    cumulative_km: f64,
}

fn finite_pair(a: [f64; 3], b: [f64; 3]) -> Result<(Vector3, Vector3), EngineResponse> {
    let (a, b) = (Vector3::from(a), Vector3::from(b));
    if a.is_finite() && b.is_finite() {
        Ok((a, b))
    } else {
        Err(EngineResponse::Error {
            message: "coordinates must be finite".into(),
        })
    }
}

fn respond(state: &EngineState, req: EngineRequest) -> EngineResponse {
    match req {
        EngineRequest::Distance { a, b } => match finite_pair(a, b) {
            Ok((a, b)) => EngineResponse::Distance {
                distance_km: distance(a, b),
            },
            Err(e) => e,
        },
        EngineRequest::LineOfSight { a, b } => match finite_pair(a, b) {
            Ok((a, b)) => {
                let report = analyze(a, b, &state.model);
                EngineResponse::LineOfSight {
                    result: report.result,
                    clearance_km: report.clearance,
                }
            }
            Err(e) => e,
        },
        EngineRequest::Link {
            a,
            b,
            velocity_a,
            velocity_b,
        } => {
            let (a, b) = match finite_pair(a, b) {
                Ok(pair) => pair,
                Err(e) => return e,
            };
            match (velocity_a, velocity_b) {
                (Some(va), Some(vb)) => match finite_pair(va, vb) {
                    Ok((va, vb)) => EngineResponse::Link(analyze_link_with_velocity(
                        a,
                        b,
                        va,
                        vb,
                        &state.model,
                        &state.link,
                    )),
                    Err(e) => e,
                },
                (None, None) => EngineResponse::Link(analyze_link(a, b, &state.model, &state.link)),
                _ => EngineResponse::Error {
                    message: "velocity_a and velocity_b must be given together".into(),
                },
            }
        }
        EngineRequest::Route { start_id, end_id } => {
            let g = &state.network;
            let Some(start) = g.index_of_id(start_id) else {
                return EngineResponse::Error {
                    message: format!("Unknown start_id {}", start_id),
                };
            };
            let Some(goal) = g.index_of_id(end_id) else {
                return EngineResponse::Error {
                    message: format!("Unknown end_id {}", end_id),
                };
            };
            match shortest_relay_path(g, start, goal) {
                Some(path) => {
                    let total_km = path.last().map(|h| h.cumulative_km).unwrap_or(0.0);
                    let hops = path
                        .into_iter()
                        .map(|hop| {
                            let o = &g.objects[hop.object_index];
                            RouteHop {
                                id: o.id,
                                name: o.name.clone(),
                                cumulative_km: hop.cumulative_km,
                            }
                        })
                        .collect();
                    EngineResponse::Route { hops, total_km }
                }
                None => EngineResponse::Error {
                    message: "No relay path found".into(),
                },
            }
        }
    }
}

async fn handler(event: LambdaEvent<EngineRequest>) -> Result<EngineResponse, Error> {
    let state = ENGINE.get().ok_or("engine state not initialised")?;
    debug!("request: {:?}", event.payload);
    Ok(respond(state, event.payload))
}

fn load_state() -> anyhow::Result<EngineState> {
    let config = EngineConfig::from_env().context("failed to load engine configuration")?;
    let model = config.occlusion_model()?;

    let objects = match std::env::var_os(SNAPSHOT_ENV_VAR) {
        Some(path) => {
            read_snapshot_from_file(&path)
                .with_context(|| format!("failed to read snapshot {:?}", path))?
                .objects
        }
        None => Vec::new(),
    };
    let network = LinkGraph::build(objects, &model, config.link.max_range_km)?;
    info!(
        "crosslink engine ready: R = {:.3} km, {} objects, {} links",
        model.effective_radius(),
        network.len(),
        network.edge_count()
    );

    Ok(EngineState {
        model,
        link: config.link_config(),
        network,
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    let state = load_state()?;
    if ENGINE.set(state).is_err() {
        return Err("engine state initialised twice".into());
    }
    let func = service_fn(handler);
    lambda_runtime::run(func).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crosslink_engine::TrackedObject;

    fn state() -> EngineState {
        let model = OcclusionModel::earth();
        let objects = vec![
            TrackedObject::new(1, "A", Vector3::new(10000.0, 0.0, 0.0)),
            TrackedObject::new(2, "B", Vector3::new(0.0, 10000.0, 0.0)),
            TrackedObject::new(3, "C", Vector3::new(-10000.0, 0.0, 0.0)),
        ];
        EngineState {
            model,
            link: LinkConfig::default(),
            network: LinkGraph::build(objects, &model, None).unwrap(),
        }
    }

    fn request(json: &str) -> EngineRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn line_of_sight_request() {
        let resp = respond(
            &state(),
            request(r#"{"kind":"line_of_sight","a":[10000,0,0],"b":[-10000,0,0]}"#),
        );
        assert!(matches!(
            resp,
            EngineResponse::LineOfSight { result: LosResult::Blocked, .. }
        ));
    }

    #[test]
    fn route_request_relays_through_b() {
        let resp = respond(&state(), request(r#"{"kind":"route","start_id":1,"end_id":3}"#));
        match resp {
            EngineResponse::Route { hops, .. } => {
                let ids: Vec<u32> = hops.iter().map(|h| h.id).collect();
                assert_eq!(ids, vec![1, 2, 3]);
            }
            other => panic!("unexpected response {:?}", other),
        }
    }

    #[test]
    fn unknown_route_endpoint() {
        let resp = respond(&state(), request(r#"{"kind":"route","start_id":1,"end_id":9}"#));
        assert!(matches!(resp, EngineResponse::Error { .. }));
    }

    #[test]
    fn link_requires_both_velocities() {
        let resp = respond(
            &state(),
            request(r#"{"kind":"link","a":[7000,0,0],"b":[0,7000,0],"velocity_a":[0,7.5,0]}"#),
        );
        assert!(matches!(resp, EngineResponse::Error { .. }));
    }

    #[test]
    fn response_is_tagged_json() {
        let resp = respond(
            &state(),
            request(r#"{"kind":"distance","a":[0,0,0],"b":[3,4,0]}"#),
        );
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["kind"], "distance");
        assert_eq!(json["distance_km"], 5.0);
    }
}
