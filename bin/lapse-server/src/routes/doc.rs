use utoipa::OpenApi;

use crate::routes::{chat, health, session, stage};

#[derive(OpenApi)]
#[openapi(info(
    title = "lapse-server",
    description = "A four-minute conversation with a partner, narrated in four stages",
    version = "0.1.0",
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(chat::ChatApi::openapi());
    root.merge(session::SessionApi::openapi());
    root.merge(stage::StageApi::openapi());
    root
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn docs_list_every_route() {
        let docs = get_docs();
        for path in [
            "/health",
            "/api/chat",
            "/api/stage",
            "/api/glitch",
            "/api/opening",
            "/api/sessions/{id}/messages",
            "/api/sessions/{id}",
        ] {
            assert!(docs.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
