#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use portal_client::api::auth;
use portal_client::models::{ResourceType, Role};
use portal_client::session::SessionStore;
use portal_client::transport::{ApiRequest, ApiResponse, Body, Method, Transport};
use portal_client::{Portal, PortalResult};

pub const ADMIN_ID: &str = "admin01";
pub const STUDENT_ID: &str = "STU001";
pub const PASSWORD: &str = "secret";
pub const STORAGE_PREFIX: &str = "https://storage.example.com/private/";

#[derive(Default)]
struct State {
    users: Vec<(String, String, Role)>,
    tokens: HashMap<String, Role>,
    next_id: u32,
    active: HashMap<ResourceType, Vec<Value>>,
    bin: HashMap<ResourceType, Vec<Value>>,
    students: Vec<Value>,
    expire_sessions: bool,
    overrides: HashMap<String, ApiResponse>,
}

/// In-process stand-in for the portal API.
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<State>,
    log: Mutex<Vec<ApiRequest>>,
}

fn reply(status: u16, body: Value) -> ApiResponse {
    ApiResponse {
        status,
        body: body.to_string(),
    }
}

fn not_found(message: &str) -> ApiResponse {
    reply(404, json!({ "message": message }))
}

fn kind_of(segment: &str) -> Option<ResourceType> {
    match segment {
        "tests" => Some(ResourceType::Test),
        "homework" => Some(ResourceType::Homework),
        "announcements" => Some(ResourceType::Announcement),
        _ => None,
    }
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        let backend = Self::default();
        {
            let mut state = backend.state.lock().unwrap();
            state
                .users
                .push((ADMIN_ID.to_string(), PASSWORD.to_string(), Role::Admin));
            state
                .users
                .push((STUDENT_ID.to_string(), PASSWORD.to_string(), Role::Student));
            state.students.push(json!({
                "_id": "s1",
                "userId": STUDENT_ID,
                "name": "Asha Rao",
                "batch": "Morning",
                "status": "active",
                "photo": format!("{}photos/asha.png", STORAGE_PREFIX)
            }));
        }
        Arc::new(backend)
    }

    /// Every request that reached the backend, in order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.log.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.log.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<ApiRequest> {
        self.log.lock().unwrap().last().cloned()
    }

    /// From now on every authenticated request answers 401.
    pub fn expire_sessions(&self) {
        self.state.lock().unwrap().expire_sessions = true;
    }

    /// Answers every authenticated request for `path` with a fixed response.
    pub fn respond_to(&self, path: &str, status: u16, body: &str) {
        self.state.lock().unwrap().overrides.insert(
            path.to_string(),
            ApiResponse {
                status,
                body: body.to_string(),
            },
        );
    }

    pub fn restore_route(&self, path: &str) {
        self.state.lock().unwrap().overrides.remove(path);
    }

    pub fn active_count(&self, kind: ResourceType) -> usize {
        self.state
            .lock()
            .unwrap()
            .active
            .get(&kind)
            .map_or(0, Vec::len)
    }

    pub fn bin_count(&self, kind: ResourceType) -> usize {
        self.state
            .lock()
            .unwrap()
            .bin
            .get(&kind)
            .map_or(0, Vec::len)
    }

    /// Seeds an active item directly and returns its id.
    pub fn seed(&self, kind: ResourceType, mut item: Value) -> String {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = format!("{}{}", kind.as_str().to_lowercase(), state.next_id);
        item["_id"] = json!(id);
        state.active.entry(kind).or_default().push(item);
        id
    }

    fn handle(&self, request: &ApiRequest) -> ApiResponse {
        let mut state = self.state.lock().unwrap();
        let segments: Vec<&str> = request.path.split('/').collect();

        if request.path == "auth/login" {
            return login(&mut state, &request.body);
        }

        let role = match request.bearer.as_ref().and_then(|t| state.tokens.get(t)) {
            Some(role) if !state.expire_sessions => *role,
            _ => return reply(401, json!({ "message": "Token expired" })),
        };
        if let Some(fixed) = state.overrides.get(&request.path) {
            return fixed.clone();
        }

        match (request.method, segments.as_slice()) {
            (Method::Get, ["dashboard", "admin"]) if role == Role::Admin => reply(
                200,
                json!({
                    "students": state.students.len(),
                    "tests": state.active.get(&ResourceType::Test).map_or(0, Vec::len)
                }),
            ),
            (Method::Get, ["dashboard", "student"]) => reply(200, json!({ "pendingHomework": 0 })),
            (Method::Get, [kind, "admin" | "student"]) if kind_of(kind).is_some() => {
                let kind = kind_of(kind).unwrap_or(ResourceType::Test);
                let items = state.active.get(&kind).cloned().unwrap_or_default();
                reply(200, Value::Array(items))
            }
            (Method::Post, [kind]) if kind_of(kind).is_some() && role == Role::Admin => {
                let kind = kind_of(kind).unwrap_or(ResourceType::Test);
                let mut item = match &request.body {
                    Body::Multipart(form) => {
                        let mut item = serde_json::Map::new();
                        for (name, value) in form.fields() {
                            // numeric form fields are stored as numbers, as the API does
                            let value = match value.parse::<f64>() {
                                Ok(number) if name == "maxMarks" || name == "marks" => json!(number),
                                _ => json!(value),
                            };
                            item.insert(name.clone(), value);
                        }
                        for (name, file) in form.files() {
                            item.insert(
                                name.clone(),
                                json!(format!("{}{}", STORAGE_PREFIX, file.file_name)),
                            );
                        }
                        Value::Object(item)
                    }
                    _ => return reply(400, json!({ "message": "multipart body expected" })),
                };
                state.next_id += 1;
                item["_id"] = json!(format!("{}{}", kind.as_str().to_lowercase(), state.next_id));
                state.active.entry(kind).or_default().push(item);
                reply(201, json!({ "message": "created" }))
            }
            (Method::Patch, ["tests", "delete", id]) => soft_delete(&mut state, ResourceType::Test, id),
            (Method::Delete, ["homework", id]) => soft_delete(&mut state, ResourceType::Homework, id),
            (Method::Delete, ["announcements", id]) => {
                soft_delete(&mut state, ResourceType::Announcement, id)
            }
            (Method::Post, ["homework", "submit", id]) => {
                let items = state.active.entry(ResourceType::Homework).or_default();
                match items.iter_mut().find(|item| item["_id"] == *id) {
                    Some(item) => {
                        item["submitted"] = json!(true);
                        reply(200, json!({ "message": "submitted" }))
                    }
                    None => not_found("Homework not found"),
                }
            }
            (_, ["recycle-bin", ..]) if role != Role::Admin => {
                reply(403, json!({ "message": "Admins only" }))
            }
            (Method::Get, ["recycle-bin"]) => {
                let listing = |kind: ResourceType| {
                    state
                        .bin
                        .get(&kind)
                        .cloned()
                        .unwrap_or_default()
                        .into_iter()
                        .map(|item| {
                            json!({
                                "_id": item["_id"],
                                "title": item["title"],
                                "deletedAt": "2026-01-12T09:30:00Z"
                            })
                        })
                        .collect::<Vec<_>>()
                };
                reply(
                    200,
                    json!({
                        "tests": listing(ResourceType::Test),
                        "homework": listing(ResourceType::Homework),
                        "announcements": listing(ResourceType::Announcement)
                    }),
                )
            }
            (Method::Patch, ["recycle-bin", "restore"]) => match take_from_bin(&mut state, &request.body) {
                Some((kind, item)) => {
                    state.active.entry(kind).or_default().push(item);
                    reply(200, json!({ "message": "restored" }))
                }
                None => not_found("Item not found in recycle bin"),
            },
            (Method::Delete, ["recycle-bin", "permanent"]) => {
                match take_from_bin(&mut state, &request.body) {
                    Some(_) => reply(200, json!({ "message": "deleted" })),
                    None => not_found("Item not found in recycle bin"),
                }
            }
            (Method::Get, ["students"]) if role == Role::Admin => {
                reply(200, Value::Array(state.students.clone()))
            }
            (Method::Get, ["students", "dropdown"]) if role == Role::Admin => {
                let options: Vec<Value> = state
                    .students
                    .iter()
                    .map(|s| json!({ "_id": s["_id"], "name": s["name"], "studentId": s["userId"], "batch": s["batch"] }))
                    .collect();
                reply(200, Value::Array(options))
            }
            (Method::Post, ["students"]) if role == Role::Admin => {
                let Body::Multipart(form) = &request.body else {
                    return reply(400, json!({ "message": "multipart body expected" }));
                };
                state.next_id += 1;
                let student = json!({
                    "_id": format!("s{}", state.next_id),
                    "userId": form.field("userId"),
                    "name": form.field("name"),
                    "batch": form.field("batch"),
                    "status": form.field("status")
                });
                state.students.push(student);
                reply(201, json!({ "message": "created" }))
            }
            (Method::Patch, ["students", "deactivate", id]) if role == Role::Admin => {
                match state.students.iter_mut().find(|s| s["_id"] == *id) {
                    Some(student) => {
                        student["status"] = json!("inactive");
                        reply(200, json!({ "message": "deactivated" }))
                    }
                    None => not_found("Student not found"),
                }
            }
            (Method::Get, ["students", "profile"]) => reply(200, state.students[0].clone()),
            (Method::Patch, ["students", "profile"]) => reply(200, json!({ "message": "updated" })),
            _ => not_found("Route not found"),
        }
    }
}

fn login(state: &mut State, body: &Body) -> ApiResponse {
    let Body::Json(body) = body else {
        return reply(400, json!({ "message": "json body expected" }));
    };
    let user_id = body["userId"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    let role = body["role"].as_str().unwrap_or_default();
    let found = state
        .users
        .iter()
        .find(|(u, p, r)| u == user_id && p == password && r.as_str() == role)
        .map(|(_, _, r)| *r);
    match found {
        Some(role) => {
            let token = format!("token-{}-{}", user_id, state.tokens.len() + 1);
            state.tokens.insert(token.clone(), role);
            reply(200, json!({ "token": token, "role": role.as_str() }))
        }
        None => reply(401, json!({ "message": "Invalid credentials" })),
    }
}

fn soft_delete(state: &mut State, kind: ResourceType, id: &str) -> ApiResponse {
    let items = state.active.entry(kind).or_default();
    match items.iter().position(|item| item["_id"] == *id) {
        Some(pos) => {
            let item = items.remove(pos);
            state.bin.entry(kind).or_default().push(item);
            reply(200, json!({ "message": "moved to recycle bin" }))
        }
        None => not_found("Item not found"),
    }
}

fn take_from_bin(state: &mut State, body: &Body) -> Option<(ResourceType, Value)> {
    let Body::Json(body) = body else {
        return None;
    };
    let kind: ResourceType = body["type"].as_str()?.parse().ok()?;
    let id = body["id"].as_str()?;
    let items = state.bin.get_mut(&kind)?;
    let pos = items.iter().position(|item| item["_id"] == *id)?;
    Some((kind, items.remove(pos)))
}

#[async_trait]
impl Transport for FakeBackend {
    async fn send(&self, request: ApiRequest) -> PortalResult<ApiResponse> {
        self.log.lock().unwrap().push(request.clone());
        Ok(self.handle(&request))
    }
}

pub fn portal(backend: &Arc<FakeBackend>) -> Portal {
    let session = Arc::new(SessionStore::in_memory().expect("in-memory session store"));
    Portal::new(backend.clone(), session)
}

pub async fn logged_in(backend: &Arc<FakeBackend>, role: Role) -> Portal {
    let portal = portal(backend);
    let user = match role {
        Role::Admin => ADMIN_ID,
        Role::Student => STUDENT_ID,
    };
    auth::login(&portal.client, user, PASSWORD, role)
        .await
        .expect("login succeeds");
    portal
}
