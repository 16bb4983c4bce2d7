//! In-process test doubles for the transport and navigator seams.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use reqwest::StatusCode;

use shopfront_core::{Email, User, UserPatch};

use crate::error::ClientError;
use crate::interceptor::{Navigator, REFRESH_PATH};
use crate::transport::{ApiRequest, ApiResponse, Transport};

/// Replays canned responses in order and records every request.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    responses: Arc<Mutex<VecDeque<ApiResponse>>>,
    requests: Arc<Mutex<Vec<ApiRequest>>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<ApiResponse>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into())),
            requests: Arc::default(),
        }
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.path.clone())
            .collect()
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| ApiResponse::new(StatusCode::INTERNAL_SERVER_ERROR, "script exhausted")))
    }
}

/// Records every route it is asked to navigate to.
#[derive(Clone, Default)]
pub struct RecordingNavigator {
    routes: Arc<Mutex<Vec<String>>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        self.routes.lock().unwrap().push(route.to_owned());
    }
}

struct FakeState {
    user: User,
    signed_in: bool,
    fail_patches: bool,
    patches: Vec<UserPatch>,
}

/// A minimal stand-in for the account endpoints of the api.
#[derive(Clone)]
pub struct FakeAccountApi {
    state: Arc<Mutex<FakeState>>,
}

impl FakeAccountApi {
    pub fn new(user: User, signed_in: bool) -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState {
                user,
                signed_in,
                fail_patches: false,
                patches: Vec::new(),
            })),
        }
    }

    pub fn signed_in_as(email: &str) -> Self {
        Self::new(User::new(Email::parse(email).unwrap(), "Shopper"), true)
    }

    pub fn user(&self) -> User {
        self.state.lock().unwrap().user.clone()
    }

    pub fn set_user(&self, user: User) {
        self.state.lock().unwrap().user = user;
    }

    pub fn set_signed_in(&self, signed_in: bool) {
        self.state.lock().unwrap().signed_in = signed_in;
    }

    pub fn is_signed_in(&self) -> bool {
        self.state.lock().unwrap().signed_in
    }

    pub fn fail_patches(&self, fail: bool) {
        self.state.lock().unwrap().fail_patches = fail;
    }

    pub fn patches(&self) -> Vec<UserPatch> {
        self.state.lock().unwrap().patches.clone()
    }

    fn json(status: StatusCode, user: &User) -> ApiResponse {
        ApiResponse::new(status, serde_json::to_string(user).unwrap())
    }
}

impl Transport for FakeAccountApi {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        let mut state = self.state.lock().unwrap();
        let user_path = format!("/api/users/{}", state.user.id);

        let response = match (request.method.as_str(), request.path.as_str()) {
            ("POST", REFRESH_PATH) if state.signed_in => {
                ApiResponse::new(StatusCode::NO_CONTENT, "")
            }
            ("POST", "/auth/logout") => {
                state.signed_in = false;
                ApiResponse::new(StatusCode::NO_CONTENT, "")
            }
            _ if !state.signed_in => ApiResponse::new(StatusCode::UNAUTHORIZED, "Unauthorized"),
            ("GET", "/api/users/me") => Self::json(StatusCode::OK, &state.user),
            ("PATCH", path) if path == user_path => {
                if state.fail_patches {
                    return Ok(ApiResponse::new(StatusCode::SERVICE_UNAVAILABLE, "unavailable"));
                }
                let body = request.body.clone().unwrap_or_default();
                let patch: UserPatch = match serde_json::from_value(body) {
                    Ok(patch) => patch,
                    Err(e) => return Ok(ApiResponse::new(StatusCode::BAD_REQUEST, e.to_string())),
                };
                if let Err(e) = patch.validate() {
                    return Ok(ApiResponse::new(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()));
                }
                state.patches.push(patch.clone());
                patch.apply_to(&mut state.user);
                Self::json(StatusCode::OK, &state.user)
            }
            _ => ApiResponse::new(StatusCode::NOT_FOUND, "Not found"),
        };

        Ok(response)
    }
}
