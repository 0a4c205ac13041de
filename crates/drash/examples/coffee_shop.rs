use async_trait::async_trait;
use drash::service::{BeforeResourceHook, ErrorHook, Service, StartupContext, StartupHook};
use drash::{Application, HandlerResult, HttpError, MethodHandler, RequestContext, Resource, init_logging};
use http::{Method, Request};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{Level, info};

#[derive(Serialize, Deserialize, Clone, Debug)]
struct Coffee {
    name: String,
    price: u32,
}

#[derive(Default)]
struct Menu {
    coffees: RwLock<HashMap<u32, Coffee>>,
}

struct CoffeeById(Arc<Menu>);

#[async_trait]
impl MethodHandler for CoffeeById {
    async fn handle(&self, ctx: &mut RequestContext) -> HandlerResult {
        let id: u32 = ctx
            .path_param("id")
            .and_then(|id| id.parse().ok())
            .ok_or_else(|| HttpError::new(400, "id must be a number"))?;

        let coffee = self.0.coffees.read().map_err(|_| HttpError::internal())?.get(&id).cloned();
        match coffee {
            Some(coffee) => {
                ctx.response_mut().json(&coffee)?;
                Ok(())
            }
            None => Err(HttpError::new(404, format!("no coffee with id {id}"))),
        }
    }
}

struct AddCoffee(Arc<Menu>);

#[async_trait]
impl MethodHandler for AddCoffee {
    async fn handle(&self, ctx: &mut RequestContext) -> HandlerResult {
        let coffee: Coffee = ctx.request().json()?;
        let id = {
            let mut coffees = self.0.coffees.write().map_err(|_| HttpError::internal())?;
            let id = coffees.keys().max().map_or(1, |id| id + 1);
            coffees.insert(id, coffee);
            id
        };
        ctx.response_mut().set_status(http::StatusCode::CREATED).set_header("location", format!("/coffee/{id}"))?;
        Ok(())
    }
}

struct Users;

#[async_trait]
impl MethodHandler for Users {
    async fn handle(&self, ctx: &mut RequestContext) -> HandlerResult {
        let name = ctx.path_param("name").unwrap_or("stranger").to_string();
        let greeting = match ctx.path_param("age") {
            Some(age) => format!("<p>{name}, {age}</p>"),
            None => format!("<p>{name}</p>"),
        };
        ctx.response_mut().html(greeting);
        Ok(())
    }
}

/// Only lets requests carrying the barista token through.
struct Barista;

#[async_trait]
impl BeforeResourceHook for Barista {
    async fn run_before_resource(&self, ctx: &mut RequestContext) -> HandlerResult {
        match ctx.request().header("authorization") {
            Some("Bearer barista") => Ok(()),
            Some(_) => {
                ctx.response_mut().set_status(http::StatusCode::FORBIDDEN).text("baristas only");
                ctx.mark_ended_early();
                Ok(())
            }
            None => Err(HttpError::new(401, "No token")),
        }
    }
}

struct Tracker;

#[async_trait]
impl StartupHook for Tracker {
    async fn run_at_startup(&self, ctx: &StartupContext<'_>) -> HandlerResult {
        for resource in ctx.resources() {
            info!(resource = resource.name(), paths = ?resource.paths(), "serving");
        }
        Ok(())
    }
}

#[async_trait]
impl ErrorHook for Tracker {
    async fn run_on_error(&self, ctx: &mut RequestContext) -> HandlerResult {
        if let Some(error) = ctx.error() {
            info!(status = error.status().as_u16(), cause = %error, "request failed");
        }
        ctx.response_mut().set_header("x-coffee-shop", "sorry")?;
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    init_logging(Level::DEBUG).expect("no subscriber installed yet");

    let menu = Arc::new(Menu::default());
    let tracker = Arc::new(Tracker);

    let app = Application::builder()
        .resource(
            Resource::builder("coffee")
                .paths(["/coffee/:id", "/drinks/:id"])
                .get(CoffeeById(Arc::clone(&menu)))
                .build(),
        )
        .resource(
            Resource::builder("menu")
                .path("/coffee")
                .post(AddCoffee(Arc::clone(&menu)))
                .service(Method::POST, Service::builder("barista").before_resource(Barista).build())
                .build(),
        )
        .resource(Resource::builder("users").path("/users/:name?/:age?").get(Users).build())
        .service(Service::builder("tracker").at_startup(Arc::clone(&tracker)).on_error(tracker).build())
        .build()
        .await
        .expect("application should build");

    let requests = vec![
        Request::post("/coffee").body(r#"{"name":"flat white","price":4}"#).unwrap(),
        Request::post("/coffee").header("authorization", "Bearer guest").body("{}").unwrap(),
        Request::post("/coffee")
            .header("authorization", "Bearer barista")
            .body(r#"{"name":"flat white","price":4}"#)
            .unwrap(),
        Request::get("/coffee/1").body("").unwrap(),
        Request::get("/coffee/2").body("").unwrap(),
        Request::delete("/coffee/1").body("").unwrap(),
        Request::get("/users/Tom/30").body("").unwrap(),
        Request::get("/tea").body("").unwrap(),
    ];

    for request in requests {
        let line = format!("{} {}", request.method(), request.uri());
        let response = app.handle(request).await;
        println!("{line} -> {} {}", response.status(), String::from_utf8_lossy(response.body().as_bytes()));
    }
}
