//! The toy api served by `sockapi-server`.

use std::convert::Infallible;
use std::sync::Arc;

use http::StatusCode;
use sockapi_http::handler::make_handler;
use sockapi_http::protocol::{ParsedRequest, ResponseSpec};
use tracing::debug;

use crate::router::{Router, RouterError, get, post};
use crate::store::{StoreError, User, UserStore};

const DEFAULT_COLOR1: &str = "red";
const DEFAULT_COLOR2: &str = "blue";

/// Builds the router for every endpoint, backed by `store`.
pub fn router(store: Arc<dyn UserStore>) -> Result<Router, RouterError> {
    let lookup_store = Arc::clone(&store);

    Router::builder()
        .route("/api/randomnumber", get(make_handler(random_number)))
        .route("/randomnumber", get(make_handler(random_number)))
        .route("/colors", get(make_handler(colors)))
        .route("/account", get(make_handler(move |request| lookup_account(Arc::clone(&lookup_store), request))))
        .route("/account", post(make_handler(move |request| create_account(Arc::clone(&store), request))))
        .build()
}

pub async fn random_number(_request: ParsedRequest) -> Result<ResponseSpec, Infallible> {
    let number = fastrand::u8(0..=100);
    let body = serde_json::json!({ "number": number }).to_string();

    Ok(ResponseSpec::ok()
        .with_reason("Here's your number!")
        .header("Content-Type", mime::APPLICATION_JSON.as_ref())
        .body(body))
}

pub async fn colors(request: ParsedRequest) -> Result<ResponseSpec, Infallible> {
    let color1 = request.query_param("color1").unwrap_or(DEFAULT_COLOR1);
    let color2 = request.query_param("color2").unwrap_or(DEFAULT_COLOR2);

    let page = format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
         <title>Just Two Colors</title>\n\
         </head>\n\
         <body>\n\
         <div style=\"color:{color1};\">Color 1</div>\n\
         <div style=\"color:{color2};\">Color 2</div>\n\
         </body>\n\
         </html>\n"
    );

    Ok(ResponseSpec::ok()
        .with_reason("Ooh pretty colors!")
        .header("Content-Type", mime::TEXT_HTML.as_ref())
        .body(page))
}

pub async fn lookup_account(store: Arc<dyn UserStore>, request: ParsedRequest) -> Result<ResponseSpec, StoreError> {
    let Some(user) = account_user(&request) else {
        return Ok(ResponseSpec::bad_request("Bad request"));
    };

    if store.lookup(&user).await? {
        Ok(ResponseSpec::ok().with_reason("User exists"))
    } else {
        Ok(ResponseSpec::not_found("User does not exist"))
    }
}

pub async fn create_account(store: Arc<dyn UserStore>, request: ParsedRequest) -> Result<ResponseSpec, StoreError> {
    let Some(user) = account_user(&request) else {
        return Ok(ResponseSpec::bad_request("Bad request"));
    };

    if store.append(user).await? {
        Ok(ResponseSpec::new(StatusCode::CREATED).with_reason("User created"))
    } else {
        Ok(ResponseSpec::new(StatusCode::CONFLICT).with_reason("User already exists"))
    }
}

/// The user named by the `fname` and `lname` query parameters, percent-decoded.
fn account_user(request: &ParsedRequest) -> Option<User> {
    match request.query_as::<User>() {
        Ok(user) if !user.fname.is_empty() && !user.lname.is_empty() => Some(user),
        Ok(_) => {
            debug!("account parameters are empty");
            None
        }
        Err(e) => {
            debug!(cause = %e, "missing account parameters");
            None
        }
    }
}
