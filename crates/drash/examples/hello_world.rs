use drash::{Application, Resource, handler_fn};

#[tokio::main]
async fn main() {
    let app = Application::builder()
        .resource(
            Resource::builder("hello")
                .path("/")
                .get(handler_fn(|ctx| {
                    Box::pin(async move {
                        ctx.response_mut().text("hello world");
                        Ok(())
                    })
                }))
                .build(),
        )
        .build()
        .await
        .unwrap();

    let response = app.handle(http::Request::get("/").body("").unwrap()).await;
    println!("{} {}", response.status(), String::from_utf8_lossy(response.body().as_bytes()));
}
