use log::{info, warn};
use rouille::{Request, Response, websocket};
use serde::Deserialize;
use serde_json::json;
use std::thread;

use crate::{
    config::HttpConfig,
    domain::{
        playtype::PlayType,
        track::{Track, TrackId},
    },
    http::error::ApiError,
    playback::{PlaybackController, error::PlaybackError},
};

/// RPC over plain HTTP plus a websocket feed of playback events
pub struct HttpServer {
    controller: PlaybackController,
    pub config: HttpConfig,
}

#[derive(Deserialize)]
struct PlaytypeRequest {
    playtype: PlayType,
}

impl HttpServer {
    pub fn new(controller: PlaybackController, config: HttpConfig) -> Self {
        Self { controller, config }
    }

    pub fn run(self) {
        let addr = format!("{}:{}", self.config.bind_addr, self.config.port);
        rouille::start_server(addr, move |request| self.handle_request(request));
    }

    fn handle_request(&self, request: &Request) -> Response {
        Self::log_request(request);

        let response = rouille::router!(request,
            (GET) (/playlist) => {
                Response::json(&self.controller.get_tracks())
            },
            (POST) (/playlist) => {
                self.handle_add_track(request)
            },
            (DELETE) (/playlist/{id: String}) => {
                Self::status(self.controller.remove_track_from_playlist(&TrackId::new(id)))
            },
            (POST) (/play/{id: String}) => {
                self.control(|c| c.play_track(&TrackId::new(id)))
            },
            (POST) (/play) => {
                self.control(PlaybackController::play)
            },
            (POST) (/next) => {
                self.control(PlaybackController::play_next_track)
            },
            (POST) (/previous) => {
                self.control(PlaybackController::play_previous_track)
            },
            (POST) (/stop) => {
                self.controller.stop();
                Self::status(true)
            },
            (GET) (/status) => {
                Response::json(&self.controller.status())
            },
            (PUT) (/playtype) => {
                self.handle_set_playtype(request)
            },
            (GET) (/events) => {
                self.handle_events(request)
            },
            _ => Response::empty_404()
        );

        info!("Response: {} {}", request.method(), response.status_code);
        response
    }

    fn log_request(request: &Request) {
        info!("{} {}", request.method(), request.url());
    }

    fn status(ok: bool) -> Response {
        Response::json(&json!({ "status": ok }))
    }

    fn control(&self, op: impl FnOnce(&PlaybackController) -> Result<(), PlaybackError>) -> Response {
        match op(&self.controller) {
            Ok(()) => Self::status(true),
            Err(e) => ApiError::from(e).into_response(),
        }
    }

    fn handle_add_track(&self, request: &Request) -> Response {
        match rouille::input::json_input::<Track>(request) {
            Ok(track) => Self::status(self.controller.add_track_to_playlist(track)),
            Err(e) => ApiError::from(e).into_response(),
        }
    }

    fn handle_set_playtype(&self, request: &Request) -> Response {
        match rouille::input::json_input::<PlaytypeRequest>(request) {
            Ok(body) => {
                self.controller.set_playtype(body.playtype);
                Self::status(true)
            }
            Err(e) => ApiError::from(e).into_response(),
        }
    }

    /// upgrades to a websocket and forwards every published event as a json text frame
    fn handle_events(&self, request: &Request) -> Response {
        let (response, websocket) = match websocket::start(request, None::<&'static str>) {
            Ok(upgrade) => upgrade,
            Err(e) => {
                return ApiError::BadRequest(format!("websocket upgrade failed: {e:?}"))
                    .into_response();
            }
        };

        let events = self.controller.subscribe();
        thread::spawn(move || {
            let Ok(mut socket) = websocket.recv() else {
                return;
            };
            info!("event subscriber connected");

            for event in events {
                let text = match serde_json::to_string(&event) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!("could not encode event {:?}: {e}", event.topic);
                        continue;
                    }
                };
                if socket.send_text(&text).is_err() {
                    break;
                }
            }
            info!("event subscriber disconnected");
        });

        response
    }
}

#[cfg(test)]
pub fn parse_json_response<T: serde::de::DeserializeOwned>(
    response: rouille::Response,
) -> anyhow::Result<T> {
    Ok(serde_json::from_reader(
        response.data.into_reader_and_size().0,
    )?)
}
