use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web::ServiceConfig, App};
use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Posts `body` to `path` on an app assembled by `configure`, returning the response status and body.
pub async fn post_request<F>(path: &str, body: &str, headers: &[(&str, &str)], configure: F) -> (StatusCode, String)
where
    F: FnOnce(&mut ServiceConfig),
{
    let mut req = TestRequest::post().uri(path).set_payload(body.to_string());
    for (name, value) in headers {
        req = req.insert_header((*name, *value));
    }
    let req = req.to_request();
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    let (_, res) = test::call_service(&service, req).await.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}

pub async fn get_request<F>(path: &str, configure: F) -> (StatusCode, String)
where
    F: FnOnce(&mut ServiceConfig),
{
    let req = TestRequest::get().uri(path).to_request();
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    let (_, res) = test::call_service(&service, req).await.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}

/// The hex HMAC-SHA256 digest of `body` under `secret`, exactly as Splynx signs its deliveries.
pub fn sign(secret: &str, body: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
